// =============================================================================
// Risk Gate — volatility-derived floor for BUY proposals
// =============================================================================
//
// risk score = 100 − volatility score of the risk source module (0-100).
// A BUY whose risk score is below the floor becomes HOLD, whatever the edge
// and whether or not the churn gate was overridden.  Without a volatility
// reading the gate has nothing to judge and passes.
// =============================================================================

use tracing::{debug, warn};

use crate::config::ArbiterConfig;
use crate::decision::HoldReason;
use crate::signals::Signal;
use crate::types::FinalAction;

pub struct RiskGate;

impl RiskGate {
    /// Risk sub-score (0-100, higher is safer), if the source module
    /// provided a volatility reading.
    pub fn risk_score(signals: &[Signal], config: &ArbiterConfig) -> Option<f64> {
        signals
            .iter()
            .filter(|s| s.module == config.risk_source_module)
            .find_map(|s| s.volatility_score)
            .map(|v| (100.0 - v).clamp(0.0, 100.0))
    }

    /// Returns `Some(reason)` if the proposal must be held.
    pub fn check(
        proposed: FinalAction,
        signals: &[Signal],
        config: &ArbiterConfig,
    ) -> Option<HoldReason> {
        if proposed != FinalAction::Buy {
            return None;
        }
        let Some(score) = Self::risk_score(signals, config) else {
            debug!("risk gate: no volatility reading, passing");
            return None;
        };
        if score < config.risk_floor {
            warn!(score, floor = config.risk_floor, "risk gate blocked buy");
            return Some(HoldReason::RiskGate {
                score,
                floor: config.risk_floor,
            });
        }
        debug!(score, floor = config.risk_floor, "risk gate passed");
        None
    }
}
