// =============================================================================
// Edge Aggregator — net conviction and provisional action
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ArbiterConfig;
use crate::signals::Claim;
use crate::types::FinalAction;

/// Aggregated conviction across all effective claims.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeSummary {
    /// Σ effective impact.
    pub net_edge: f64,
    /// clamp(net_edge / K, -1, 1)
    pub normalized_edge: f64,
    /// BUY, SELL or HOLD.
    pub proposed: FinalAction,
}

/// Sum effective claim impacts, normalise by K and map to an action via τ.
pub fn aggregate(claims: &[Claim], config: &ArbiterConfig) -> EdgeSummary {
    let net_edge: f64 = claims.iter().map(|c| c.effective_impact).sum();
    let normalized_edge = (net_edge / config.max_theoretical_edge).clamp(-1.0, 1.0);
    let proposed = propose(normalized_edge, config.conviction_threshold);

    debug!(
        claims = claims.len(),
        net_edge,
        normalized_edge,
        proposed = %proposed,
        "edge aggregated"
    );

    EdgeSummary {
        net_edge,
        normalized_edge,
        proposed,
    }
}

/// BUY above τ, SELL below −τ, HOLD in between (inclusive).
pub fn propose(normalized_edge: f64, threshold: f64) -> FinalAction {
    if normalized_edge > threshold {
        FinalAction::Buy
    } else if normalized_edge < -threshold {
        FinalAction::Sell
    } else {
        FinalAction::Hold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::Signal;
    use crate::types::{Module, SignalAction};
    use chrono::Utc;

    fn claim(direction: i8, strength: f64, confidence: f64) -> Claim {
        Claim::new(Signal::new(
            Module::Trend,
            SignalAction::Buy,
            direction,
            strength,
            confidence,
            Utc::now(),
        ))
    }

    #[test]
    fn single_full_conviction_module_proposes_buy() {
        let e = aggregate(&[claim(1, 1.0, 1.0)], &ArbiterConfig::default());
        assert!((e.net_edge - 1.0).abs() < f64::EPSILON);
        assert!((e.normalized_edge - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(e.proposed, FinalAction::Buy);
    }

    #[test]
    fn mixed_claims_hold() {
        let claims = vec![claim(1, 0.8, 0.9).challenged(0.5), claim(-1, 0.6, 0.8)];
        let e = aggregate(&claims, &ArbiterConfig::default());
        assert!((e.net_edge + 0.12).abs() < 1e-12);
        assert!((e.normalized_edge + 0.04).abs() < 1e-12);
        assert_eq!(e.proposed, FinalAction::Hold);
    }

    #[test]
    fn normalised_edge_is_clamped() {
        let claims: Vec<Claim> = (0..5).map(|_| claim(-1, 1.0, 1.0)).collect();
        let e = aggregate(&claims, &ArbiterConfig::default());
        assert!((e.normalized_edge + 1.0).abs() < f64::EPSILON);
        assert_eq!(e.proposed, FinalAction::Sell);
    }

    #[test]
    fn threshold_is_exclusive() {
        assert_eq!(propose(0.25, 0.25), FinalAction::Hold);
        assert_eq!(propose(-0.25, 0.25), FinalAction::Hold);
        assert_eq!(propose(0.2501, 0.25), FinalAction::Buy);
    }

    #[test]
    fn no_claims_is_flat() {
        let e = aggregate(&[], &ArbiterConfig::default());
        assert_eq!(e.net_edge, 0.0);
        assert_eq!(e.proposed, FinalAction::Hold);
    }
}
