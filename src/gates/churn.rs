// =============================================================================
// Churn Gate — cooldown and hysteresis, with a single override path
// =============================================================================
//
// Rules (checked in this order):
//   1. Cooldown   — less than `cooldown_secs` since the last interaction.
//                   Absolute: nothing overrides it.
//   2. Hysteresis — BUY straight after a closed SELL needs an edge of at
//                   least `reentry_threshold`.
//
// Override: the configured override module (contrarian by default) may lift
// a hysteresis block when its own signal is a BUY with confidence strictly
// above `override_min_confidence`.  Cooldown blocks are never eligible.
// =============================================================================

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::ArbiterConfig;
use crate::context::PortfolioContext;
use crate::decision::HoldReason;
use crate::signals::Signal;
use crate::types::{ClosedAction, FinalAction, Module, SignalAction};

/// Result of the churn gate.
#[derive(Debug, Clone, PartialEq)]
pub enum ChurnVerdict {
    Clear,
    Blocked(HoldReason),
    /// A hysteresis block was lifted by `by`.
    Overridden { by: Module, block: HoldReason },
}

pub struct ChurnGate;

impl ChurnGate {
    /// First churn rule that blocks the proposal, if any.
    pub fn check(
        proposed: FinalAction,
        normalized_edge: f64,
        portfolio: &PortfolioContext,
        now: DateTime<Utc>,
        config: &ArbiterConfig,
    ) -> Option<HoldReason> {
        // 1. Cooldown
        if let Some(last) = portfolio.last_interaction {
            let elapsed = ((now - last).num_milliseconds() as f64 / 1000.0).max(0.0);
            let window = config.cooldown_secs as f64;
            if elapsed < window {
                let remaining_secs = (window - elapsed).ceil() as u64;
                debug!(elapsed, remaining_secs, "churn: cooldown active");
                return Some(HoldReason::Cooldown { remaining_secs });
            }
        }

        // 2. Hysteresis for re-entry
        if proposed == FinalAction::Buy
            && portfolio.last_closed_action == Some(ClosedAction::Sell)
            && normalized_edge < config.reentry_threshold
        {
            debug!(
                edge = normalized_edge,
                required = config.reentry_threshold,
                "churn: hysteresis"
            );
            return Some(HoldReason::Hysteresis {
                edge: normalized_edge,
                required: config.reentry_threshold,
            });
        }

        None
    }

    /// Module allowed to lift `block`, if the override conditions hold.
    pub fn override_by(
        block: &HoldReason,
        signals: &[Signal],
        config: &ArbiterConfig,
    ) -> Option<Module> {
        match block {
            HoldReason::Cooldown { .. } => return None,
            HoldReason::Hysteresis { .. } => {}
            _ => return None,
        }

        let signal = signals.iter().find(|s| s.module == config.override_module)?;
        if signal.action == SignalAction::Buy && signal.confidence > config.override_min_confidence
        {
            Some(signal.module)
        } else {
            None
        }
    }

    /// Run both rules and the override check.
    pub fn evaluate(
        proposed: FinalAction,
        normalized_edge: f64,
        portfolio: &PortfolioContext,
        signals: &[Signal],
        now: DateTime<Utc>,
        config: &ArbiterConfig,
    ) -> ChurnVerdict {
        let Some(block) = Self::check(proposed, normalized_edge, portfolio, now, config) else {
            return ChurnVerdict::Clear;
        };
        match Self::override_by(&block, signals, config) {
            Some(by) => {
                info!(module = %by, blocked_by = %block, "churn block overridden");
                ChurnVerdict::Overridden { by, block }
            }
            None => ChurnVerdict::Blocked(block),
        }
    }
}
