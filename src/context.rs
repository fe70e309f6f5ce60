// =============================================================================
// External Contexts — read-only snapshots supplied by collaborators
// =============================================================================
//
// The arbiter never mutates these.  The host takes one snapshot per
// evaluation and updates portfolio state only after acting on the decision.
// =============================================================================

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::signals::Signal;
use crate::types::ClosedAction;

/// Portfolio-level state owned by the bookkeeping collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioContext {
    #[serde(default)]
    pub daily_trade_count: u32,
    /// Macro risk-off regime flag; disables all buys.
    #[serde(default)]
    pub risk_off: bool,
    #[serde(default)]
    pub last_interaction: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_closed_action: Option<ClosedAction>,
    /// Current position quantity (units held).
    #[serde(default)]
    pub position_quantity: f64,
}

/// Market snapshot owned by the market-data collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    #[serde(default)]
    pub price: f64,
    /// ATR / price.
    #[serde(default)]
    pub volatility_ratio: f64,
}

// ---------------------------------------------------------------------------
// Collaborator boundaries
// ---------------------------------------------------------------------------

/// Produces the current signal set for a symbol (one per scoring module).
pub trait SignalSource: Send + Sync {
    fn signals(&self, symbol: &str) -> Result<Vec<Signal>>;
}

/// Produces an atomically-read portfolio snapshot.
pub trait PortfolioReader: Send + Sync {
    fn portfolio(&self, symbol: &str) -> Result<PortfolioContext>;
}

/// Produces price and volatility for a symbol.
pub trait MarketReader: Send + Sync {
    fn market(&self, symbol: &str) -> Result<MarketContext>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_gives_neutral_contexts() {
        let p: PortfolioContext = serde_json::from_str("{}").unwrap();
        assert_eq!(p, PortfolioContext::default());
        assert!(p.last_interaction.is_none());
        let m: MarketContext = serde_json::from_str("{}").unwrap();
        assert_eq!(m.volatility_ratio, 0.0);
    }

    #[test]
    fn portfolio_parses_closed_action() {
        let json = r#"{ "daily_trade_count": 3, "last_closed_action": "SELL",
                        "last_interaction": "2026-03-01T10:00:00Z" }"#;
        let p: PortfolioContext = serde_json::from_str(json).unwrap();
        assert_eq!(p.daily_trade_count, 3);
        assert_eq!(p.last_closed_action, Some(ClosedAction::Sell));
        assert!(p.last_interaction.is_some());
    }
}
