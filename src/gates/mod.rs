// =============================================================================
// Gates Module
// =============================================================================
//
// Everything that can stop or shrink a provisional action:
// - Veto authority (hard blocks -> BLOCKED)
// - Churn gate (cooldown, hysteresis, contrarian override)
// - Risk gate (volatility floor for buys)
// - Size penalty (advisory sizing reduction)

pub mod churn;
pub mod risk;
pub mod sizing;
pub mod veto;

pub use churn::{ChurnGate, ChurnVerdict};
pub use risk::RiskGate;
pub use sizing::size_penalty;
pub use veto::VetoAuthority;
