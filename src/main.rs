// =============================================================================
// Agora Arbiter — Host Entry Point
// =============================================================================
//
// Demonstrates the in-process contract: read a scenario feed, evaluate every
// symbol once on its own task, hand each decision to the audit log and print
// it.  One task per symbol keeps evaluations of the same symbol serialised
// while different symbols run in parallel.
// =============================================================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use chrono::{Duration, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use agora_arbiter::{
    Arbiter, ArbiterConfig, ClosedAction, DecisionSink, Evidence, Horizon, InMemoryAuditLog,
    MarketContext, MarketReader, Module, PortfolioContext, PortfolioReader, Signal, SignalAction,
    SignalSource, TimeframeTag,
};

// =============================================================================
// Scenario feed (stands in for the scoring, portfolio and market collaborators)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
struct SymbolScenario {
    symbol: String,
    #[serde(default)]
    signals: Vec<Signal>,
    #[serde(default)]
    portfolio: PortfolioContext,
    #[serde(default)]
    market: MarketContext,
}

#[derive(Debug, Default)]
struct ScenarioFeed {
    scenarios: HashMap<String, SymbolScenario>,
}

impl ScenarioFeed {
    fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario feed from {}", path.display()))?;
        let list: Vec<SymbolScenario> = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scenario feed from {}", path.display()))?;
        Ok(Self::from_list(list))
    }

    fn from_list(list: Vec<SymbolScenario>) -> Self {
        Self {
            scenarios: list.into_iter().map(|s| (s.symbol.clone(), s)).collect(),
        }
    }

    /// A small built-in feed covering the common outcomes.
    fn demo() -> Self {
        let now = Utc::now();
        let trend = |strength: f64, confidence: f64| {
            Signal::new(Module::Trend, SignalAction::Buy, 1, strength, confidence, now)
        };
        Self::from_list(vec![
            SymbolScenario {
                symbol: "AAPL".into(),
                signals: vec![
                    trend(1.0, 1.0)
                        .with_timing(Horizon::Mid, TimeframeTag::D1)
                        .with_volatility_score(40.0)
                        .with_evidence(Evidence {
                            key: "EMA".into(),
                            value: "50 > 200".into(),
                            rule: "golden cross".into(),
                            weight: 0.8,
                            is_counterfactual: false,
                        }),
                    Signal::new(Module::Fundamental, SignalAction::Buy, 1, 0.6, 0.7, now),
                ],
                portfolio: PortfolioContext::default(),
                market: MarketContext {
                    price: 190.0,
                    volatility_ratio: 0.035,
                },
            },
            SymbolScenario {
                symbol: "MSFT".into(),
                signals: vec![
                    trend(0.8, 0.9),
                    Signal::new(Module::Macro, SignalAction::Sell, -1, 0.6, 0.8, now),
                ],
                portfolio: PortfolioContext::default(),
                market: MarketContext {
                    price: 410.0,
                    volatility_ratio: 0.015,
                },
            },
            SymbolScenario {
                symbol: "TSLA".into(),
                signals: vec![
                    trend(1.0, 1.0),
                    Signal::new(Module::Fundamental, SignalAction::Buy, 1, 0.4, 0.5, now),
                    Signal::new(Module::Contrarian, SignalAction::Buy, 1, 0.2, 0.9, now),
                ],
                portfolio: PortfolioContext {
                    last_interaction: Some(now - Duration::minutes(20)),
                    last_closed_action: Some(ClosedAction::Sell),
                    ..PortfolioContext::default()
                },
                market: MarketContext {
                    price: 250.0,
                    volatility_ratio: 0.05,
                },
            },
            SymbolScenario {
                symbol: "NVDA".into(),
                signals: vec![trend(1.0, 1.0)],
                portfolio: PortfolioContext {
                    daily_trade_count: 25,
                    ..PortfolioContext::default()
                },
                market: MarketContext {
                    price: 120.0,
                    volatility_ratio: 0.02,
                },
            },
        ])
    }

    fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.scenarios.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    fn scenario(&self, symbol: &str) -> Result<&SymbolScenario> {
        self.scenarios
            .get(symbol)
            .ok_or_else(|| anyhow!("no scenario for {}", symbol))
    }
}

impl SignalSource for ScenarioFeed {
    fn signals(&self, symbol: &str) -> Result<Vec<Signal>> {
        Ok(self.scenario(symbol)?.signals.clone())
    }
}

impl PortfolioReader for ScenarioFeed {
    fn portfolio(&self, symbol: &str) -> Result<PortfolioContext> {
        Ok(self.scenario(symbol)?.portfolio.clone())
    }
}

impl MarketReader for ScenarioFeed {
    fn market(&self, symbol: &str) -> Result<MarketContext> {
        Ok(self.scenario(symbol)?.market.clone())
    }
}

// =============================================================================
// Entry point
// =============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // ── 2. Configuration ─────────────────────────────────────────────────
    let config_path =
        std::env::var("ARBITER_CONFIG").unwrap_or_else(|_| "arbiter_config.json".to_string());
    let config = ArbiterConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(path = %config_path, error = %e, "Failed to load config, using defaults");
        ArbiterConfig::default()
    });
    let arbiter = Arc::new(Arbiter::new(config).context("arbiter configuration rejected")?);

    // ── 3. Collaborators ─────────────────────────────────────────────────
    let feed = match std::env::var("ARBITER_SCENARIO") {
        Ok(path) => ScenarioFeed::load(&path)?,
        Err(_) => {
            info!("ARBITER_SCENARIO not set, using built-in demo feed");
            ScenarioFeed::demo()
        }
    };
    let feed = Arc::new(feed);
    let audit = Arc::new(InMemoryAuditLog::new());

    // ── 4. One task per symbol ───────────────────────────────────────────
    let symbols = feed.symbols();
    info!(symbols = ?symbols, "Evaluating symbols");

    let mut handles = Vec::with_capacity(symbols.len());
    for symbol in symbols {
        let arbiter = arbiter.clone();
        let feed = feed.clone();
        let audit = audit.clone();
        handles.push(tokio::spawn(async move {
            let decision =
                arbiter.evaluate_from(&symbol, feed.as_ref(), feed.as_ref(), feed.as_ref())?;
            audit.record(&decision)?;
            Ok::<_, anyhow::Error>(decision)
        }));
    }

    // ── 5. Report ────────────────────────────────────────────────────────
    for handle in handles {
        match handle.await {
            Ok(Ok(decision)) => {
                info!(
                    symbol = %decision.symbol,
                    action = %decision.final_action,
                    net_edge = decision.net_edge,
                    size_penalty = decision.size_penalty,
                    churn = %decision.churn_state,
                    reason = %decision.reason().unwrap_or_default(),
                    "decision"
                );
                println!("{}", serde_json::to_string_pretty(&decision)?);
            }
            Ok(Err(e)) => error!(error = %e, "evaluation skipped"),
            Err(e) => error!(error = %e, "evaluation task panicked"),
        }
    }

    info!(records = audit.len(), "done");
    Ok(())
}
