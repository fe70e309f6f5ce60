// =============================================================================
// Signal Normaliser — boundary validation and claim construction
// =============================================================================
//
// Malformed signals (NaN or out-of-range strength/confidence, a direction
// outside {-1, 0, +1}) are dropped and logged here so that nothing downstream
// ever sees them.  A bad signal never aborts the evaluation.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{Claim, Signal};
use crate::error::SignalDefect;
use crate::types::Module;

/// A signal rejected at the boundary, kept for the audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedSignal {
    pub module: Module,
    pub defect: String,
}

/// Result of validating one evaluation's signal set.
#[derive(Debug, Clone, Default)]
pub struct NormalizedSignals {
    pub accepted: Vec<Signal>,
    pub dropped: Vec<DroppedSignal>,
}

fn unit(field: &'static str, value: f64) -> Result<(), SignalDefect> {
    if !value.is_finite() {
        return Err(SignalDefect::NotFinite { field });
    }
    if !(0.0..=1.0).contains(&value) {
        return Err(SignalDefect::OutOfUnitRange { field, value });
    }
    Ok(())
}

/// Check a single signal.  Passive (`NoTrade`) signals only need a sane
/// volatility score since their other fields are ignored.
pub fn validate(signal: &Signal) -> Result<(), SignalDefect> {
    if let Some(v) = signal.volatility_score {
        if !v.is_finite() || !(0.0..=100.0).contains(&v) {
            return Err(SignalDefect::BadVolatilityScore(v));
        }
    }
    if !signal.is_active() {
        return Ok(());
    }
    if !matches!(signal.direction, -1..=1) {
        return Err(SignalDefect::BadDirection(signal.direction));
    }
    unit("strength", signal.strength)?;
    unit("confidence", signal.confidence)?;
    Ok(())
}

/// Split a raw signal set into accepted and dropped signals.
pub fn normalize(symbol: &str, signals: &[Signal]) -> NormalizedSignals {
    let mut out = NormalizedSignals::default();
    for signal in signals {
        match validate(signal) {
            Ok(()) => out.accepted.push(signal.clone()),
            Err(defect) => {
                warn!(
                    symbol,
                    module = %signal.module,
                    error = %defect,
                    "dropping malformed signal"
                );
                out.dropped.push(DroppedSignal {
                    module: signal.module,
                    defect: defect.to_string(),
                });
            }
        }
    }
    out
}

/// One claim per active signal, carrying its raw impact.
pub fn build_claims(signals: &[Signal]) -> Vec<Claim> {
    let claims: Vec<Claim> = signals
        .iter()
        .filter(|s| s.is_active())
        .cloned()
        .map(Claim::new)
        .collect();
    debug!(
        claims = claims.len(),
        passive = signals.len() - claims.len(),
        "claims built"
    );
    claims
}
