// =============================================================================
// Decision Record — auditable output of one evaluation
// =============================================================================
//
// Every evaluation yields exactly one `DecisionResult`, whichever stage ended
// the pipeline.  The record carries the intermediate claims and challenges,
// the veto or hold reason, and a digest of the inputs so that identical
// evaluations can be recognised during replay.
//
// Reasons are structured enums.  Their `Display` impls give the plain text
// the application layer surfaces verbatim.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;
use uuid::Uuid;

use crate::arbitration::Challenge;
use crate::config::ArbiterConfig;
use crate::context::{MarketContext, PortfolioContext};
use crate::signals::{Claim, DroppedSignal, Signal};
use crate::types::{FinalAction, Module};

// ---------------------------------------------------------------------------
// Reasons
// ---------------------------------------------------------------------------

/// Hard, non-overridable block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Veto {
    DailyTradeLimit { count: u32, cap: u32 },
    MacroRiskOffBuy,
}

impl std::fmt::Display for Veto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DailyTradeLimit { .. } => write!(f, "daily trade limit"),
            Self::MacroRiskOffBuy => write!(f, "macro risk-off, buys disabled"),
        }
    }
}

/// Why a gate turned the decision into HOLD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "gate", rename_all = "snake_case")]
pub enum HoldReason {
    LowDataConfidence { confidence: f64 },
    Cooldown { remaining_secs: u64 },
    Hysteresis { edge: f64, required: f64 },
    RiskGate { score: f64, floor: f64 },
}

impl HoldReason {
    /// Short category tag: "low data confidence", "cooldown", "hysteresis"
    /// or "risk gate".
    pub fn label(&self) -> &'static str {
        match self {
            Self::LowDataConfidence { .. } => "low data confidence",
            Self::Cooldown { .. } => "cooldown",
            Self::Hysteresis { .. } => "hysteresis",
            Self::RiskGate { .. } => "risk gate",
        }
    }
}

impl std::fmt::Display for HoldReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowDataConfidence { confidence } => {
                write!(f, "low data confidence ({:.0}%)", confidence * 100.0)
            }
            Self::Cooldown { remaining_secs } => {
                write!(f, "cooldown ({}s remaining)", remaining_secs)
            }
            Self::Hysteresis { edge, required } => {
                write!(f, "hysteresis (edge {:.2} < {:.2})", edge, required)
            }
            Self::RiskGate { score, floor } => {
                write!(f, "risk gate (risk score {:.1} < {:.1})", score, floor)
            }
        }
    }
}

/// Churn gate state at the end of the evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChurnState {
    /// The pipeline ended before the churn gate ran (health or veto).
    Skipped,
    Ready,
    Blocked,
    /// `lifted` is the block that would have applied without the override.
    Overridden { by: Module, lifted: HoldReason },
}

impl std::fmt::Display for ChurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Skipped => write!(f, "skipped"),
            Self::Ready => write!(f, "ready"),
            Self::Blocked => write!(f, "blocked"),
            Self::Overridden { by, lifted } => write!(f, "overridden by {} ({})", by, lifted),
        }
    }
}

// ---------------------------------------------------------------------------
// DecisionResult
// ---------------------------------------------------------------------------

/// Complete auditable record of one arbitration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionResult {
    pub id: Uuid,
    pub symbol: String,
    pub timestamp: DateTime<Utc>,

    pub final_action: FinalAction,
    /// Provisional action from the edge aggregator, if the pipeline got there.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposed_action: Option<FinalAction>,

    /// Normalised net edge; 0 whenever a gate short-circuited.
    pub net_edge: f64,
    /// Global data confidence from the health gate.
    pub confidence: f64,
    /// Fractional size reduction in [0, cap]; non-zero only for BUY.
    pub size_penalty: f64,

    /// Post-challenge claims (raw impact retained on each).
    pub claims: Vec<Claim>,
    pub challenges: Vec<Challenge>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub veto: Option<Veto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_reason: Option<HoldReason>,
    pub churn_state: ChurnState,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_signals: Vec<DroppedSignal>,

    /// SHA-256 (hex) of the evaluation inputs.
    pub input_digest: String,
}

impl DecisionResult {
    /// Reason text for the application layer, if any gate intervened.
    pub fn reason(&self) -> Option<String> {
        if let Some(veto) = &self.veto {
            return Some(veto.to_string());
        }
        self.hold_reason.as_ref().map(ToString::to_string)
    }

    /// True for BUY or SELL.
    pub fn is_actionable(&self) -> bool {
        matches!(self.final_action, FinalAction::Buy | FinalAction::Sell)
    }

    pub fn was_overridden(&self) -> bool {
        matches!(self.churn_state, ChurnState::Overridden { .. })
    }
}

// ---------------------------------------------------------------------------
// Input digest
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct DigestPayload<'a> {
    symbol: &'a str,
    now: DateTime<Utc>,
    signals: &'a [Signal],
    portfolio: &'a PortfolioContext,
    market: &'a MarketContext,
    config: &'a ArbiterConfig,
}

/// Deterministic SHA-256 over the canonical JSON form of the inputs.
pub fn input_digest(
    symbol: &str,
    now: DateTime<Utc>,
    signals: &[Signal],
    portfolio: &PortfolioContext,
    market: &MarketContext,
    config: &ArbiterConfig,
) -> String {
    let payload = DigestPayload {
        symbol,
        now,
        signals,
        portfolio,
        market,
        config,
    };
    let bytes = serde_json::to_vec(&payload).unwrap_or_else(|e| {
        warn!(symbol, error = %e, "failed to serialise inputs for digest");
        Vec::new()
    });
    hex::encode(Sha256::digest(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalAction;

    #[test]
    fn reasons_render_plain_text() {
        assert_eq!(
            Veto::DailyTradeLimit { count: 25, cap: 25 }.to_string(),
            "daily trade limit"
        );
        assert_eq!(Veto::MacroRiskOffBuy.to_string(), "macro risk-off, buys disabled");
        assert_eq!(
            HoldReason::Cooldown { remaining_secs: 200 }.to_string(),
            "cooldown (200s remaining)"
        );
        assert_eq!(
            HoldReason::Hysteresis { edge: 0.4, required: 0.6 }.to_string(),
            "hysteresis (edge 0.40 < 0.60)"
        );
        assert_eq!(HoldReason::RiskGate { score: 10.0, floor: 15.0 }.label(), "risk gate");
        let overridden = ChurnState::Overridden {
            by: Module::Contrarian,
            lifted: HoldReason::Hysteresis { edge: 0.46, required: 0.6 },
        };
        assert_eq!(
            overridden.to_string(),
            "overridden by contrarian (hysteresis (edge 0.46 < 0.60))"
        );
    }

    #[test]
    fn reasons_serialise_tagged() {
        let json = serde_json::to_string(&HoldReason::Cooldown { remaining_secs: 5 }).unwrap();
        assert_eq!(json, r#"{"gate":"cooldown","remaining_secs":5}"#);
        let json = serde_json::to_string(&Veto::MacroRiskOffBuy).unwrap();
        assert_eq!(json, r#"{"rule":"macro_risk_off_buy"}"#);
        let json = serde_json::to_string(&ChurnState::Overridden {
            by: Module::Contrarian,
            lifted: HoldReason::Hysteresis { edge: 0.5, required: 0.6 },
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"state":"overridden","by":"contrarian","lifted":{"gate":"hysteresis","edge":0.5,"required":0.6}}"#
        );
    }

    #[test]
    fn digest_is_stable_and_input_sensitive() {
        let now = Utc::now();
        let signals = vec![Signal::new(Module::Trend, SignalAction::Buy, 1, 0.5, 0.5, now)];
        let p = PortfolioContext::default();
        let m = MarketContext::default();
        let cfg = ArbiterConfig::default();
        let a = input_digest("AAPL", now, &signals, &p, &m, &cfg);
        let b = input_digest("AAPL", now, &signals, &p, &m, &cfg);
        let c = input_digest("MSFT", now, &signals, &p, &m, &cfg);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
