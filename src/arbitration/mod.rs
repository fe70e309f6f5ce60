// =============================================================================
// Arbitration Module
// =============================================================================
//
// The debate itself:
// - Challenge resolution (soft discounts between modules)
// - Edge aggregation (net conviction -> provisional action)

pub mod challenge;
pub mod edge;

pub use challenge::{Challenge, ChallengeResolver, ChallengeRule, MacroRiskOffRule, Resolution};
pub use edge::EdgeSummary;
