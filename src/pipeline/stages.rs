// =============================================================================
// Pipeline Stages
// =============================================================================
//
// One struct per step of the deliberation.  Each stage reads what earlier
// stages left on the `Deliberation` and either continues or terminates.
// =============================================================================

use tracing::debug;

use super::{Deliberation, Flow, Outcome, Stage};
use crate::arbitration::{edge, ChallengeResolver};
use crate::decision::{ChurnState, HoldReason};
use crate::gates::{size_penalty, ChurnGate, ChurnVerdict, RiskGate, VetoAuthority};
use crate::signals::{health, normalizer};
use crate::types::FinalAction;

/// Drop malformed signals at the boundary.
pub struct NormalizeStage;

impl Stage for NormalizeStage {
    fn name(&self) -> &'static str {
        "normalize"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        let normalized = normalizer::normalize(d.symbol, d.signals);
        d.accepted = normalized.accepted;
        d.dropped = normalized.dropped;
        Flow::Continue
    }
}

/// Force HOLD when the data is too stale to trust.
pub struct HealthStage;

impl Stage for HealthStage {
    fn name(&self) -> &'static str {
        "health"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        let report = health::assess(&d.accepted, d.now, d.config);
        d.confidence = report.confidence;
        if report.passed {
            Flow::Continue
        } else {
            Flow::Terminate(Outcome::Hold(HoldReason::LowDataConfidence {
                confidence: report.confidence,
            }))
        }
    }
}

/// One claim per active signal.
pub struct ClaimStage;

impl Stage for ClaimStage {
    fn name(&self) -> &'static str {
        "claims"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        d.claims = normalizer::build_claims(&d.accepted);
        Flow::Continue
    }
}

/// Apply inter-module challenges to the claims.
pub struct ChallengeStage {
    pub resolver: ChallengeResolver,
}

impl Stage for ChallengeStage {
    fn name(&self) -> &'static str {
        "challenges"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        let claims = std::mem::take(&mut d.claims);
        let resolution = self.resolver.resolve(&d.accepted, claims);
        d.claims = resolution.claims;
        d.challenges = resolution.challenges;
        Flow::Continue
    }
}

/// Aggregate the net edge and propose an action.
pub struct EdgeStage;

impl Stage for EdgeStage {
    fn name(&self) -> &'static str {
        "edge"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        d.edge = Some(edge::aggregate(&d.claims, d.config));
        Flow::Continue
    }
}

/// Hard portfolio-level blocks.
pub struct VetoStage;

impl Stage for VetoStage {
    fn name(&self) -> &'static str {
        "veto"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        match VetoAuthority::check(d.proposed(), d.portfolio, d.config) {
            Some(veto) => Flow::Terminate(Outcome::Blocked(veto)),
            None => Flow::Continue,
        }
    }
}

/// Cooldown and hysteresis, with the contrarian override.
pub struct ChurnStage;

impl Stage for ChurnStage {
    fn name(&self) -> &'static str {
        "churn"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        let verdict = ChurnGate::evaluate(
            d.proposed(),
            d.normalized_edge(),
            d.portfolio,
            &d.accepted,
            d.now,
            d.config,
        );
        match verdict {
            ChurnVerdict::Clear => {
                d.churn_state = ChurnState::Ready;
                Flow::Continue
            }
            ChurnVerdict::Overridden { by, block } => {
                d.churn_state = ChurnState::Overridden { by, lifted: block };
                Flow::Continue
            }
            ChurnVerdict::Blocked(reason) => {
                d.churn_state = ChurnState::Blocked;
                Flow::Terminate(Outcome::Hold(reason))
            }
        }
    }
}

/// Volatility floor for buys.
pub struct RiskStage;

impl Stage for RiskStage {
    fn name(&self) -> &'static str {
        "risk_gate"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        match RiskGate::check(d.proposed(), &d.accepted, d.config) {
            Some(reason) => Flow::Terminate(Outcome::Hold(reason)),
            None => Flow::Continue,
        }
    }
}

/// Advisory size reduction for surviving buys.
pub struct SizingStage;

impl Stage for SizingStage {
    fn name(&self) -> &'static str {
        "size_penalty"
    }

    fn run(&self, d: &mut Deliberation<'_>) -> Flow {
        if d.proposed() == FinalAction::Buy {
            d.size_penalty = size_penalty(d.market.volatility_ratio, d.config);
        } else {
            debug!(proposed = %d.proposed(), "no size penalty for non-buy");
        }
        Flow::Continue
    }
}
