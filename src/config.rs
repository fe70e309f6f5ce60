// =============================================================================
// Arbiter Configuration — tunable constants with validation and atomic save
// =============================================================================
//
// Every threshold the pipeline consults lives here.  All fields carry
// `#[serde(default)]` so that a partial (or empty) JSON file loads cleanly and
// new fields never break an older file.
//
// Validation happens exactly once, when the `Arbiter` is built.  Evaluations
// trust the configuration they were given.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ConfigError;
use crate::types::Module;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_conviction_threshold() -> f64 {
    0.25
}

fn default_max_theoretical_edge() -> f64 {
    3.0
}

fn default_daily_trade_cap() -> u32 {
    25
}

fn default_cooldown_secs() -> u64 {
    300
}

fn default_reentry_threshold() -> f64 {
    0.6
}

fn default_risk_floor() -> f64 {
    15.0
}

fn default_risk_source_module() -> Module {
    Module::Trend
}

fn default_volatility_baseline() -> f64 {
    0.02
}

fn default_size_penalty_multiplier() -> f64 {
    10.0
}

fn default_size_penalty_cap() -> f64 {
    0.8
}

fn default_min_data_confidence() -> f64 {
    0.5
}

fn default_freshness_horizon_secs() -> u64 {
    60 * 60
}

fn default_max_freshness_penalty() -> f64 {
    0.5
}

fn default_override_module() -> Module {
    Module::Contrarian
}

fn default_override_min_confidence() -> f64 {
    0.8
}

fn default_macro_trend_severity() -> f64 {
    0.5
}

fn default_macro_contrarian_severity() -> f64 {
    0.3
}

// =============================================================================
// ArbiterConfig
// =============================================================================

/// Tunable parameters for one arbiter instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArbiterConfig {
    // --- Edge aggregation ---------------------------------------------------

    /// τ: minimum |normalised edge| required to propose BUY or SELL.
    #[serde(default = "default_conviction_threshold")]
    pub conviction_threshold: f64,

    /// K: theoretical maximum aggregate impact used to normalise the edge.
    #[serde(default = "default_max_theoretical_edge")]
    pub max_theoretical_edge: f64,

    // --- Vetoes -------------------------------------------------------------

    /// Trades per day after which every proposal is vetoed.
    #[serde(default = "default_daily_trade_cap")]
    pub daily_trade_cap: u32,

    // --- Churn --------------------------------------------------------------

    /// Minimum seconds since the last interaction before any new action.
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,

    /// Edge required to BUY straight after a closed SELL.
    #[serde(default = "default_reentry_threshold")]
    pub reentry_threshold: f64,

    /// The single module allowed to override a hysteresis block.
    #[serde(default = "default_override_module")]
    pub override_module: Module,

    /// Override module confidence must be strictly above this value.
    #[serde(default = "default_override_min_confidence")]
    pub override_min_confidence: f64,

    // --- Risk gate & sizing -------------------------------------------------

    /// BUYs are blocked when the risk sub-score (0-100) falls below this.
    #[serde(default = "default_risk_floor")]
    pub risk_floor: f64,

    /// Module whose volatility score feeds the risk gate.
    #[serde(default = "default_risk_source_module")]
    pub risk_source_module: Module,

    /// Daily volatility proxy (ATR / price) below which no size penalty applies.
    #[serde(default = "default_volatility_baseline")]
    pub volatility_baseline: f64,

    #[serde(default = "default_size_penalty_multiplier")]
    pub size_penalty_multiplier: f64,

    #[serde(default = "default_size_penalty_cap")]
    pub size_penalty_cap: f64,

    // --- Data health --------------------------------------------------------

    /// Evaluations whose global confidence reaches this floor are forced to HOLD.
    #[serde(default = "default_min_data_confidence")]
    pub min_data_confidence: f64,

    /// Average signal age (seconds) at which the full freshness penalty applies.
    #[serde(default = "default_freshness_horizon_secs")]
    pub freshness_horizon_secs: u64,

    #[serde(default = "default_max_freshness_penalty")]
    pub max_freshness_penalty: f64,

    // --- Challenge rules ----------------------------------------------------

    /// Severity of the macro risk-off challenge against the trend module.
    #[serde(default = "default_macro_trend_severity")]
    pub macro_trend_severity: f64,

    /// Severity of the macro risk-off challenge against the contrarian module.
    #[serde(default = "default_macro_contrarian_severity")]
    pub macro_contrarian_severity: f64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            conviction_threshold: default_conviction_threshold(),
            max_theoretical_edge: default_max_theoretical_edge(),
            daily_trade_cap: default_daily_trade_cap(),
            cooldown_secs: default_cooldown_secs(),
            reentry_threshold: default_reentry_threshold(),
            override_module: default_override_module(),
            override_min_confidence: default_override_min_confidence(),
            risk_floor: default_risk_floor(),
            risk_source_module: default_risk_source_module(),
            volatility_baseline: default_volatility_baseline(),
            size_penalty_multiplier: default_size_penalty_multiplier(),
            size_penalty_cap: default_size_penalty_cap(),
            min_data_confidence: default_min_data_confidence(),
            freshness_horizon_secs: default_freshness_horizon_secs(),
            max_freshness_penalty: default_max_freshness_penalty(),
            macro_trend_severity: default_macro_trend_severity(),
            macro_contrarian_severity: default_macro_contrarian_severity(),
        }
    }
}

fn finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn within(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    let value = finite(field, value)?;
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

impl ArbiterConfig {
    /// Reject configurations that would make a gate meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        within("conviction_threshold", self.conviction_threshold, f64::MIN_POSITIVE, 1.0)?;
        within("max_theoretical_edge", self.max_theoretical_edge, f64::MIN_POSITIVE, f64::MAX)?;
        within("reentry_threshold", self.reentry_threshold, 0.0, 1.0)?;
        if self.reentry_threshold <= self.conviction_threshold {
            return Err(ConfigError::HysteresisBelowConviction {
                reentry: self.reentry_threshold,
                conviction: self.conviction_threshold,
            });
        }
        if self.daily_trade_cap == 0 {
            return Err(ConfigError::ZeroTradeCap);
        }
        within("override_min_confidence", self.override_min_confidence, 0.0, 1.0)?;
        within("risk_floor", self.risk_floor, 0.0, 100.0)?;
        within("volatility_baseline", self.volatility_baseline, 0.0, f64::MAX)?;
        within("size_penalty_multiplier", self.size_penalty_multiplier, 0.0, f64::MAX)?;
        within("size_penalty_cap", self.size_penalty_cap, 0.0, 1.0)?;
        within("min_data_confidence", self.min_data_confidence, 0.0, 1.0)?;
        within("max_freshness_penalty", self.max_freshness_penalty, 0.0, 1.0)?;
        if self.freshness_horizon_secs == 0 {
            return Err(ConfigError::ZeroFreshnessHorizon);
        }
        // Fully stale data must be able to reach the floor.
        if 1.0 - self.max_freshness_penalty > self.min_data_confidence {
            return Err(ConfigError::HealthGateUnreachable {
                max_penalty: self.max_freshness_penalty,
                floor: self.min_data_confidence,
            });
        }
        within("macro_trend_severity", self.macro_trend_severity, 0.0, 1.0)?;
        within("macro_contrarian_severity", self.macro_contrarian_severity, 0.0, 1.0)?;
        Ok(())
    }

    /// Load configuration from a JSON file at `path`.
    ///
    /// Missing fields fall back to their defaults; the result is validated
    /// before it is returned.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read arbiter config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse arbiter config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid arbiter config in {}", path.display()))?;

        info!(
            path = %path.display(),
            conviction_threshold = config.conviction_threshold,
            reentry_threshold = config.reentry_threshold,
            daily_trade_cap = config.daily_trade_cap,
            cooldown_secs = config.cooldown_secs,
            "arbiter config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise arbiter config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "arbiter config saved (atomic)");
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = ArbiterConfig::default();
        assert!((cfg.conviction_threshold - 0.25).abs() < f64::EPSILON);
        assert!((cfg.max_theoretical_edge - 3.0).abs() < f64::EPSILON);
        assert_eq!(cfg.daily_trade_cap, 25);
        assert_eq!(cfg.cooldown_secs, 300);
        assert!((cfg.reentry_threshold - 0.6).abs() < f64::EPSILON);
        assert!((cfg.risk_floor - 15.0).abs() < f64::EPSILON);
        assert!((cfg.volatility_baseline - 0.02).abs() < f64::EPSILON);
        assert!((cfg.size_penalty_cap - 0.8).abs() < f64::EPSILON);
        assert_eq!(cfg.override_module, Module::Contrarian);
        assert_eq!(cfg.risk_source_module, Module::Trend);
        assert_eq!(cfg.freshness_horizon_secs, 3600);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: ArbiterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, ArbiterConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "conviction_threshold": 0.3, "override_module": "sentiment" }"#;
        let cfg: ArbiterConfig = serde_json::from_str(json).unwrap();
        assert!((cfg.conviction_threshold - 0.3).abs() < f64::EPSILON);
        assert_eq!(cfg.override_module, Module::Sentiment);
        assert_eq!(cfg.daily_trade_cap, 25);
    }

    #[test]
    fn reentry_must_exceed_conviction() {
        let cfg = ArbiterConfig {
            conviction_threshold: 0.6,
            reentry_threshold: 0.6,
            ..ArbiterConfig::default()
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::HysteresisBelowConviction {
                reentry: 0.6,
                conviction: 0.6
            })
        );
    }

    #[test]
    fn health_gate_must_be_reachable() {
        let weak = ArbiterConfig {
            max_freshness_penalty: 0.3,
            ..ArbiterConfig::default()
        };
        assert_eq!(
            weak.validate(),
            Err(ConfigError::HealthGateUnreachable {
                max_penalty: 0.3,
                floor: 0.5
            })
        );

        let low_floor = ArbiterConfig {
            min_data_confidence: 0.2,
            ..ArbiterConfig::default()
        };
        assert!(matches!(
            low_floor.validate(),
            Err(ConfigError::HealthGateUnreachable { .. })
        ));

        let strict = ArbiterConfig {
            max_freshness_penalty: 0.7,
            ..ArbiterConfig::default()
        };
        assert!(strict.validate().is_ok());
    }

    #[test]
    fn rejects_non_finite_and_out_of_range_values() {
        let nan_edge = ArbiterConfig {
            max_theoretical_edge: f64::NAN,
            ..ArbiterConfig::default()
        };
        assert!(matches!(
            nan_edge.validate(),
            Err(ConfigError::NotFinite { field: "max_theoretical_edge", .. })
        ));

        let zero_edge = ArbiterConfig {
            max_theoretical_edge: 0.0,
            ..ArbiterConfig::default()
        };
        assert!(matches!(
            zero_edge.validate(),
            Err(ConfigError::OutOfRange { field: "max_theoretical_edge", .. })
        ));

        let cap = ArbiterConfig {
            size_penalty_cap: 1.5,
            ..ArbiterConfig::default()
        };
        assert!(matches!(
            cap.validate(),
            Err(ConfigError::OutOfRange { field: "size_penalty_cap", .. })
        ));

        let trades = ArbiterConfig {
            daily_trade_cap: 0,
            ..ArbiterConfig::default()
        };
        assert_eq!(trades.validate(), Err(ConfigError::ZeroTradeCap));

        let horizon = ArbiterConfig {
            freshness_horizon_secs: 0,
            ..ArbiterConfig::default()
        };
        assert_eq!(horizon.validate(), Err(ConfigError::ZeroFreshnessHorizon));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = std::env::temp_dir().join(format!("arbiter-{}.json", uuid::Uuid::new_v4()));
        let cfg = ArbiterConfig {
            cooldown_secs: 120,
            daily_trade_cap: 10,
            ..ArbiterConfig::default()
        };
        cfg.save(&path).unwrap();
        let loaded = ArbiterConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!("arbiter-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{ "reentry_threshold": 0.1 }"#).unwrap();
        assert!(ArbiterConfig::load(&path).is_err());
        let _ = std::fs::remove_file(&path);
    }
}
