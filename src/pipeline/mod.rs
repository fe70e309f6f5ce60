// =============================================================================
// Arbiter — the deliberation pipeline
// =============================================================================
//
// One evaluation = one symbol, one cycle, one pass through an ordered list of
// named stages:
//
//   normalize -> health -> claims -> challenges -> edge
//             -> veto -> churn -> risk_gate -> size_penalty
//
// Any stage may terminate with HOLD or BLOCKED; nothing loops back.  The
// arbiter holds no mutable state, so a single instance can be shared across
// tasks and evaluated for many symbols in parallel.
// =============================================================================

mod stages;


use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::arbitration::{Challenge, ChallengeResolver, EdgeSummary};
use crate::config::ArbiterConfig;
use crate::context::{MarketContext, MarketReader, PortfolioContext, PortfolioReader, SignalSource};
use crate::decision::{input_digest, ChurnState, DecisionResult, HoldReason, Veto};
use crate::error::ConfigError;
use crate::signals::{Claim, DroppedSignal, Signal};
use crate::types::FinalAction;

pub use stages::{
    ChallengeStage, ChurnStage, ClaimStage, EdgeStage, HealthStage, NormalizeStage, RiskStage,
    SizingStage, VetoStage,
};

// =============================================================================
// Stage contract
// =============================================================================

/// How a terminating stage ends the evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Hold(HoldReason),
    Blocked(Veto),
}

/// Result of running one stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    Continue,
    Terminate(Outcome),
}

/// A named step of the pipeline.
pub trait Stage: Send + Sync {
    fn name(&self) -> &'static str;
    fn run(&self, deliberation: &mut Deliberation<'_>) -> Flow;
}

// =============================================================================
// Deliberation (per-evaluation working state)
// =============================================================================

/// Inputs and intermediate results of a single evaluation.
pub struct Deliberation<'a> {
    pub symbol: &'a str,
    pub signals: &'a [Signal],
    pub portfolio: &'a PortfolioContext,
    pub market: &'a MarketContext,
    pub config: &'a ArbiterConfig,
    pub now: DateTime<Utc>,

    pub accepted: Vec<Signal>,
    pub dropped: Vec<DroppedSignal>,
    pub confidence: f64,
    pub claims: Vec<Claim>,
    pub challenges: Vec<Challenge>,
    pub edge: Option<EdgeSummary>,
    pub churn_state: ChurnState,
    pub size_penalty: f64,
}

impl<'a> Deliberation<'a> {
    pub fn new(
        symbol: &'a str,
        signals: &'a [Signal],
        portfolio: &'a PortfolioContext,
        market: &'a MarketContext,
        config: &'a ArbiterConfig,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            signals,
            portfolio,
            market,
            config,
            now,
            accepted: Vec::new(),
            dropped: Vec::new(),
            confidence: 0.0,
            claims: Vec::new(),
            challenges: Vec::new(),
            edge: None,
            churn_state: ChurnState::Skipped,
            size_penalty: 0.0,
        }
    }

    /// Provisional action; HOLD until the edge stage has run.
    pub fn proposed(&self) -> FinalAction {
        self.edge.map_or(FinalAction::Hold, |e| e.proposed)
    }

    pub fn normalized_edge(&self) -> f64 {
        self.edge.map_or(0.0, |e| e.normalized_edge)
    }

    /// Decision Assembler: package whatever the pipeline reached.
    fn assemble(self, outcome: Option<Outcome>) -> DecisionResult {
        let input_digest = input_digest(
            self.symbol,
            self.now,
            self.signals,
            self.portfolio,
            self.market,
            self.config,
        );
        let proposed_action = self.edge.map(|e| e.proposed);

        let (final_action, net_edge, veto, hold_reason) = match outcome {
            None => (self.proposed(), self.normalized_edge(), None, None),
            Some(Outcome::Hold(reason)) => (FinalAction::Hold, 0.0, None, Some(reason)),
            Some(Outcome::Blocked(veto)) => (FinalAction::Blocked, 0.0, Some(veto), None),
        };
        let size_penalty = if final_action == FinalAction::Buy {
            self.size_penalty
        } else {
            0.0
        };

        DecisionResult {
            id: Uuid::new_v4(),
            symbol: self.symbol.to_string(),
            timestamp: self.now,
            final_action,
            proposed_action,
            net_edge,
            confidence: self.confidence,
            size_penalty,
            claims: self.claims,
            challenges: self.challenges,
            veto,
            hold_reason,
            churn_state: self.churn_state,
            dropped_signals: self.dropped,
            input_digest,
        }
    }
}

// =============================================================================
// Arbiter
// =============================================================================

/// Stateless arbitration service.  Build once, evaluate many times.
pub struct Arbiter {
    config: ArbiterConfig,
    stages: Vec<Box<dyn Stage>>,
}

impl Arbiter {
    /// Validate `config` and build the standard pipeline.
    pub fn new(config: ArbiterConfig) -> Result<Self, ConfigError> {
        let resolver = ChallengeResolver::from_config(&config);
        Self::with_resolver(config, resolver)
    }

    /// Build the standard pipeline with a custom challenge rule set.
    pub fn with_resolver(
        config: ArbiterConfig,
        resolver: ChallengeResolver,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            conviction_threshold = config.conviction_threshold,
            max_theoretical_edge = config.max_theoretical_edge,
            reentry_threshold = config.reentry_threshold,
            cooldown_secs = config.cooldown_secs,
            daily_trade_cap = config.daily_trade_cap,
            rules = ?resolver.rule_names(),
            "Arbiter initialised"
        );
        let stages: Vec<Box<dyn Stage>> = vec![
            Box::new(NormalizeStage),
            Box::new(HealthStage),
            Box::new(ClaimStage),
            Box::new(ChallengeStage { resolver }),
            Box::new(EdgeStage),
            Box::new(VetoStage),
            Box::new(ChurnStage),
            Box::new(RiskStage),
            Box::new(SizingStage),
        ];
        Ok(Self { config, stages })
    }

    pub fn config(&self) -> &ArbiterConfig {
        &self.config
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Evaluate one symbol at instant `now`.
    pub fn evaluate(
        &self,
        symbol: &str,
        signals: &[Signal],
        portfolio: &PortfolioContext,
        market: &MarketContext,
        now: DateTime<Utc>,
    ) -> DecisionResult {
        let mut d = Deliberation::new(symbol, signals, portfolio, market, &self.config, now);

        let mut outcome = None;
        for stage in &self.stages {
            if let Flow::Terminate(o) = stage.run(&mut d) {
                debug!(symbol, stage = stage.name(), outcome = ?o, "pipeline terminated");
                outcome = Some(o);
                break;
            }
        }

        let decision = d.assemble(outcome);
        debug!(
            symbol,
            action = %decision.final_action,
            net_edge = decision.net_edge,
            confidence = decision.confidence,
            size_penalty = decision.size_penalty,
            churn = %decision.churn_state,
            reason = ?decision.reason(),
            "decision assembled"
        );
        decision
    }

    /// Evaluate one symbol stamped with the current time.
    pub fn evaluate_now(
        &self,
        symbol: &str,
        signals: &[Signal],
        portfolio: &PortfolioContext,
        market: &MarketContext,
    ) -> DecisionResult {
        self.evaluate(symbol, signals, portfolio, market, Utc::now())
    }

    /// Gather inputs from the collaborators, then evaluate.
    ///
    /// A collaborator failure means the arbiter is never invoked.
    pub fn evaluate_from(
        &self,
        symbol: &str,
        source: &dyn SignalSource,
        portfolio: &dyn PortfolioReader,
        market: &dyn MarketReader,
    ) -> Result<DecisionResult> {
        let signals = source
            .signals(symbol)
            .with_context(|| format!("failed to read signals for {}", symbol))?;
        let portfolio = portfolio
            .portfolio(symbol)
            .with_context(|| format!("failed to read portfolio for {}", symbol))?;
        let market = market
            .market(symbol)
            .with_context(|| format!("failed to read market data for {}", symbol))?;
        Ok(self.evaluate_now(symbol, &signals, &portfolio, &market))
    }
}

impl std::fmt::Debug for Arbiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arbiter")
            .field("config", &self.config)
            .field("stages", &self.stage_names())
            .finish()
    }
}
