// =============================================================================
// Signals Module
// =============================================================================
//
// Per-module opinions and their translation into claims:
// - Signal / Evidence: raw inputs from external scoring engines
// - Normaliser: boundary validation and claim construction
// - Health gate: staleness-driven global data confidence

pub mod health;
pub mod normalizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Horizon, Module, SignalAction, TimeframeTag};

pub use health::HealthReport;
pub use normalizer::{DroppedSignal, NormalizedSignals};

/// One piece of reasoning a module attaches to its signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// e.g. "RSI", "pe_ratio".
    pub key: String,
    pub value: String,
    /// Human-readable rule, e.g. "RSI < 30 (oversold)".
    pub rule: String,
    /// 0.0 - 1.0
    #[serde(default)]
    pub weight: f64,
    /// The decision would have gone the other way without this evidence.
    #[serde(default)]
    pub is_counterfactual: bool,
}

/// One module's opinion for one instrument at one instant.
///
/// `direction`, `strength` and `confidence` only carry meaning when
/// `action != NoTrade`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub module: Module,
    pub action: SignalAction,
    /// +1 bullish, -1 bearish, 0 neutral.
    pub direction: i8,
    /// 0.0 - 1.0
    pub strength: f64,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Horizon>,
    #[serde(default)]
    pub timeframe_tag: TimeframeTag,

    /// Volatility component on a 0-100 scale (higher = more volatile).
    /// Only the technical engine is expected to fill this in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volatility_score: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

impl Signal {
    pub fn new(
        module: Module,
        action: SignalAction,
        direction: i8,
        strength: f64,
        confidence: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            module,
            action,
            direction,
            strength,
            confidence,
            timestamp,
            horizon: None,
            timeframe_tag: TimeframeTag::Auto,
            volatility_score: None,
            evidence: Vec::new(),
        }
    }

    /// A passive signal: the module is present but has nothing to say.
    pub fn no_trade(module: Module, timestamp: DateTime<Utc>) -> Self {
        Self::new(module, SignalAction::NoTrade, 0, 0.0, 0.0, timestamp)
    }

    pub fn with_timing(mut self, horizon: Horizon, timeframe_tag: TimeframeTag) -> Self {
        self.horizon = Some(horizon);
        self.timeframe_tag = timeframe_tag;
        self
    }

    pub fn with_volatility_score(mut self, score: f64) -> Self {
        self.volatility_score = Some(score);
        self
    }

    pub fn with_evidence(mut self, evidence: Evidence) -> Self {
        self.evidence.push(evidence);
        self
    }

    pub fn is_active(&self) -> bool {
        self.action != SignalAction::NoTrade
    }

    /// direction × strength × confidence
    pub fn impact(&self) -> f64 {
        f64::from(self.direction) * self.strength * self.confidence
    }
}

/// A signal's contribution to the debate, before and after challenges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub signal: Signal,
    /// direction × strength × confidence.
    pub raw_impact: f64,
    /// Maximum severity among challenges targeting this claim's module.
    pub challenge_severity: f64,
    /// raw_impact × (1 − challenge_severity).
    pub effective_impact: f64,
}

impl Claim {
    pub fn new(signal: Signal) -> Self {
        let raw_impact = signal.impact();
        Self {
            signal,
            raw_impact,
            challenge_severity: 0.0,
            effective_impact: raw_impact,
        }
    }

    pub fn module(&self) -> Module {
        self.signal.module
    }

    /// Re-derive the effective impact under the given challenge severity.
    pub fn challenged(mut self, severity: f64) -> Self {
        let severity = severity.clamp(0.0, 1.0);
        self.challenge_severity = severity;
        self.effective_impact = self.raw_impact * (1.0 - severity);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_is_signed_product() {
        let now = Utc::now();
        let s = Signal::new(Module::Trend, SignalAction::Buy, 1, 0.8, 0.9, now);
        assert!((s.impact() - 0.72).abs() < 1e-12);
        let s = Signal::new(Module::Macro, SignalAction::Sell, -1, 0.6, 0.8, now);
        assert!((s.impact() + 0.48).abs() < 1e-12);
    }

    #[test]
    fn challenged_claim_keeps_raw_impact() {
        let s = Signal::new(Module::Trend, SignalAction::Buy, 1, 0.8, 0.9, Utc::now());
        let c = Claim::new(s).challenged(0.5);
        assert!((c.raw_impact - 0.72).abs() < 1e-12);
        assert!((c.effective_impact - 0.36).abs() < 1e-12);
        assert!((c.challenge_severity - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn timing_and_counterfactual_evidence_survive_json() {
        let s = Signal::new(Module::Trend, SignalAction::Buy, 1, 0.7, 0.8, Utc::now())
            .with_timing(Horizon::Short, TimeframeTag::M15)
            .with_evidence(Evidence {
                key: "RSI".into(),
                value: "24.5".into(),
                rule: "RSI < 30 (oversold)".into(),
                weight: 0.9,
                is_counterfactual: true,
            });
        let json = serde_json::to_string(&s).unwrap();
        assert!(json.contains(r#""horizon":"SHORT""#));
        assert!(json.contains(r#""timeframe_tag":"15M""#));
        let back: Signal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(back.evidence[0].is_counterfactual);
    }

    #[test]
    fn signal_deserialises_without_optional_fields() {
        let json = r#"{
            "module": "trend", "action": "BUY", "direction": 1,
            "strength": 0.5, "confidence": 0.5,
            "timestamp": "2026-01-02T03:04:05Z"
        }"#;
        let s: Signal = serde_json::from_str(json).unwrap();
        assert_eq!(s.module, Module::Trend);
        assert!(s.volatility_score.is_none());
        assert!(s.evidence.is_empty());
        assert!(s.horizon.is_none());
        assert_eq!(s.timeframe_tag, TimeframeTag::Auto);
        assert!(s.is_active());
    }
}
