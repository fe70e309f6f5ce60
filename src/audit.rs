// =============================================================================
// Audit Sink — hand-off point for decision records
// =============================================================================
//
// The arbiter does not persist anything.  Hosts pass each `DecisionResult`
// to a `DecisionSink`; the in-memory log below keeps records keyed by
// (symbol, timestamp) for replay and tests.
// =============================================================================

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

use crate::decision::DecisionResult;

/// Consumer of finished decisions (audit, persistence, replay).
pub trait DecisionSink: Send + Sync {
    fn record(&self, decision: &DecisionResult) -> Result<()>;
}

/// Thread-safe in-memory audit log.
#[derive(Default)]
pub struct InMemoryAuditLog {
    records: RwLock<BTreeMap<(String, DateTime<Utc>), Vec<DecisionResult>>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All decisions for `symbol`, oldest first.
    pub fn for_symbol(&self, symbol: &str) -> Vec<DecisionResult> {
        self.records
            .read()
            .iter()
            .filter(|((s, _), _)| s == symbol)
            .flat_map(|(_, v)| v.iter().cloned())
            .collect()
    }

    /// Most recent decision for `symbol`.
    pub fn latest(&self, symbol: &str) -> Option<DecisionResult> {
        self.records
            .read()
            .iter()
            .rev()
            .find(|((s, _), _)| s == symbol)
            .and_then(|(_, v)| v.last().cloned())
    }

    /// Decisions recorded for `symbol` at exactly `timestamp`.
    pub fn get(&self, symbol: &str, timestamp: DateTime<Utc>) -> Vec<DecisionResult> {
        self.records
            .read()
            .get(&(symbol.to_string(), timestamp))
            .cloned()
            .unwrap_or_default()
    }
}

impl DecisionSink for InMemoryAuditLog {
    fn record(&self, decision: &DecisionResult) -> Result<()> {
        let mut records = self.records.write();
        records
            .entry((decision.symbol.clone(), decision.timestamp))
            .or_default()
            .push(decision.clone());
        debug!(
            symbol = %decision.symbol,
            id = %decision.id,
            action = %decision.final_action,
            "decision recorded"
        );
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryAuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryAuditLog")
            .field("records", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ArbiterConfig;
    use crate::context::{MarketContext, PortfolioContext};
    use crate::pipeline::Arbiter;
    use crate::signals::Signal;
    use crate::types::{Module, SignalAction};
    use chrono::Duration;

    fn decide(arbiter: &Arbiter, symbol: &str, now: DateTime<Utc>) -> DecisionResult {
        let signals = vec![Signal::new(Module::Trend, SignalAction::Buy, 1, 1.0, 1.0, now)];
        arbiter.evaluate(
            symbol,
            &signals,
            &PortfolioContext::default(),
            &MarketContext::default(),
            now,
        )
    }

    #[test]
    fn records_are_keyed_by_symbol_and_time() {
        let arbiter = Arbiter::new(ArbiterConfig::default()).unwrap();
        let log = InMemoryAuditLog::new();
        assert!(log.is_empty());

        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(60);
        log.record(&decide(&arbiter, "AAPL", t0)).unwrap();
        log.record(&decide(&arbiter, "AAPL", t1)).unwrap();
        log.record(&decide(&arbiter, "MSFT", t0)).unwrap();

        assert_eq!(log.len(), 3);
        assert_eq!(log.for_symbol("AAPL").len(), 2);
        assert_eq!(log.latest("AAPL").unwrap().timestamp, t1);
        assert_eq!(log.get("MSFT", t0).len(), 1);
        assert!(log.get("MSFT", t1).is_empty());
        assert!(log.latest("TSLA").is_none());
    }
}
