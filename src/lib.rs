// =============================================================================
// Agora Arbiter — multi-module trade arbitration engine
// =============================================================================
//
// Turns independent, possibly conflicting module signals into one auditable
// decision per symbol per cycle:
//
//   normalise -> health -> claims -> challenges -> edge
//             -> veto -> churn -> risk gate -> size penalty
//
// The core is synchronous and stateless.  Market data, portfolio state and
// persistence belong to collaborators (see `context` and `audit`).
// =============================================================================

pub mod arbitration;
pub mod audit;
pub mod config;
pub mod context;
pub mod decision;
pub mod error;
pub mod gates;
pub mod pipeline;
pub mod signals;
pub mod types;

pub use audit::{DecisionSink, InMemoryAuditLog};
pub use config::ArbiterConfig;
pub use context::{MarketContext, MarketReader, PortfolioContext, PortfolioReader, SignalSource};
pub use decision::{ChurnState, DecisionResult, HoldReason, Veto};
pub use error::{ConfigError, SignalDefect};
pub use pipeline::Arbiter;
pub use signals::{Claim, Evidence, Signal};
pub use types::{ClosedAction, FinalAction, Horizon, Module, SignalAction, TimeframeTag};
