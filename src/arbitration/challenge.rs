// =============================================================================
// Challenge Resolver — soft, severity-weighted conflicts between modules
// =============================================================================
//
// Rules are pure functions of the validated signal set.  For each claim, the
// maximum severity among challenges aimed at its module is applied:
//
//   effective = raw × (1 − max_severity)
//
// Challenges against the same module never stack.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ArbiterConfig;
use crate::signals::{Claim, Signal};
use crate::types::Module;

/// A directed conflict assertion from one module against another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Challenge {
    pub from: Module,
    pub against: Module,
    pub reason: String,
    /// 0.0 - 1.0
    pub severity: f64,
}

/// A deterministic challenge-generating rule.
pub trait ChallengeRule: Send + Sync {
    /// Stable identifier used in logs.
    fn name(&self) -> &'static str;
    fn challenges(&self, signals: &[Signal]) -> Vec<Challenge>;
}

/// Macro risk-off discounts trend-following, and contrarian setups to a
/// lesser degree.
#[derive(Debug, Clone)]
pub struct MacroRiskOffRule {
    pub trend_severity: f64,
    pub contrarian_severity: f64,
}

impl MacroRiskOffRule {
    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self {
            trend_severity: config.macro_trend_severity,
            contrarian_severity: config.macro_contrarian_severity,
        }
    }
}

impl Default for MacroRiskOffRule {
    fn default() -> Self {
        Self::from_config(&ArbiterConfig::default())
    }
}

impl ChallengeRule for MacroRiskOffRule {
    fn name(&self) -> &'static str {
        "macro_risk_off"
    }

    fn challenges(&self, signals: &[Signal]) -> Vec<Challenge> {
        let bearish_macro = signals
            .iter()
            .find(|s| s.module == Module::Macro && s.is_active())
            .map_or(false, |s| s.direction < 0);
        if !bearish_macro {
            return Vec::new();
        }
        vec![
            Challenge {
                from: Module::Macro,
                against: Module::Trend,
                reason: "risk-off regime pressure".to_string(),
                severity: self.trend_severity,
            },
            Challenge {
                from: Module::Macro,
                against: Module::Contrarian,
                reason: "risk-off regime pressure".to_string(),
                severity: self.contrarian_severity,
            },
        ]
    }
}

/// Claims after challenge resolution, plus the challenges that were raised.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub claims: Vec<Claim>,
    pub challenges: Vec<Challenge>,
}

/// Ordered list of challenge rules.
pub struct ChallengeResolver {
    rules: Vec<Box<dyn ChallengeRule>>,
}

impl ChallengeResolver {
    pub fn new(rules: Vec<Box<dyn ChallengeRule>>) -> Self {
        Self { rules }
    }

    /// The standard rule set.
    pub fn from_config(config: &ArbiterConfig) -> Self {
        Self::new(vec![Box::new(MacroRiskOffRule::from_config(config))])
    }

    pub fn push_rule(&mut self, rule: Box<dyn ChallengeRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Raise every challenge the rules produce for this signal set.
    pub fn raise(&self, signals: &[Signal]) -> Vec<Challenge> {
        let mut out = Vec::new();
        for rule in &self.rules {
            let raised = rule.challenges(signals);
            if !raised.is_empty() {
                debug!(rule = rule.name(), count = raised.len(), "challenges raised");
            }
            out.extend(raised);
        }
        out
    }

    /// Apply the strongest challenge against each claim's module.
    pub fn resolve(&self, signals: &[Signal], claims: Vec<Claim>) -> Resolution {
        let challenges = self.raise(signals);
        let claims = claims
            .into_iter()
            .map(|claim| {
                let severity = max_severity_against(&challenges, claim.module());
                claim.challenged(severity)
            })
            .collect();
        Resolution { claims, challenges }
    }
}

impl std::fmt::Debug for ChallengeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeResolver")
            .field("rules", &self.rule_names())
            .finish()
    }
}

/// Maximum severity among challenges targeting `module`, 0 if none.
pub fn max_severity_against(challenges: &[Challenge], module: Module) -> f64 {
    challenges
        .iter()
        .filter(|c| c.against == module)
        .map(|c| c.severity)
        .fold(0.0, f64::max)
}
