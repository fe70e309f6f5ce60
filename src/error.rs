use thiserror::Error;

/// Configuration rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("re-entry threshold {reentry} must exceed conviction threshold {conviction}")]
    HysteresisBelowConviction { reentry: f64, conviction: f64 },
    #[error("daily trade cap must be at least 1")]
    ZeroTradeCap,
    #[error("freshness horizon must be at least 1 second")]
    ZeroFreshnessHorizon,
    #[error("max freshness penalty {max_penalty} cannot bring confidence down to the floor {floor}")]
    HealthGateUnreachable { max_penalty: f64, floor: f64 },
}

/// Why a signal was dropped at the normaliser boundary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalDefect {
    #[error("{field} is not finite")]
    NotFinite { field: &'static str },
    #[error("{field} = {value} is outside [0, 1]")]
    OutOfUnitRange { field: &'static str, value: f64 },
    #[error("direction {0} is not one of -1, 0, +1")]
    BadDirection(i8),
    #[error("volatility score {0} is outside [0, 100]")]
    BadVolatilityScore(f64),
}
