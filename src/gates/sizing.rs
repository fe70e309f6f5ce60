// =============================================================================
// Size Penalty — volatility-driven position size reduction
// =============================================================================
//
// penalty = min((vol − baseline) × multiplier, cap)   when vol > baseline
//         = 0                                          otherwise
//
// Advisory only: the execution collaborator turns it into a quantity.
// =============================================================================

use tracing::{debug, warn};

use crate::config::ArbiterConfig;

/// Fractional size reduction for a volatility ratio (ATR / price).
pub fn size_penalty(volatility_ratio: f64, config: &ArbiterConfig) -> f64 {
    if volatility_ratio.is_nan() {
        warn!(
            cap = config.size_penalty_cap,
            "volatility ratio is NaN, applying maximum size penalty"
        );
        return config.size_penalty_cap;
    }
    if volatility_ratio <= config.volatility_baseline {
        return 0.0;
    }
    let penalty = ((volatility_ratio - config.volatility_baseline)
        * config.size_penalty_multiplier)
        .clamp(0.0, config.size_penalty_cap);
    debug!(
        volatility_ratio,
        baseline = config.volatility_baseline,
        penalty,
        "size penalty computed"
    );
    penalty
}
