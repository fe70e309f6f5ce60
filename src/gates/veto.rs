// =============================================================================
// Veto Authority — hard, portfolio-level blocks
// =============================================================================
//
// Vetoes:
//   1. Daily Trade Limit — daily trade count has reached the cap.
//   2. Macro Risk-Off    — no buys while the portfolio is in risk-off mode.
//
// A veto ends the evaluation with BLOCKED.  Nothing can override it and the
// churn gate, risk gate and sizing never run afterwards.
// =============================================================================

use tracing::warn;

use crate::config::ArbiterConfig;
use crate::context::PortfolioContext;
use crate::decision::Veto;
use crate::types::FinalAction;

pub struct VetoAuthority;

impl VetoAuthority {
    /// Returns `None` if the proposal may proceed, or the first veto that
    /// applies.
    pub fn check(
        proposed: FinalAction,
        portfolio: &PortfolioContext,
        config: &ArbiterConfig,
    ) -> Option<Veto> {
        // 1. Daily trade limit
        if portfolio.daily_trade_count >= config.daily_trade_cap {
            warn!(
                count = portfolio.daily_trade_count,
                cap = config.daily_trade_cap,
                proposed = %proposed,
                "veto: daily trade limit"
            );
            return Some(Veto::DailyTradeLimit {
                count: portfolio.daily_trade_count,
                cap: config.daily_trade_cap,
            });
        }

        // 2. Macro risk-off + buy
        if proposed == FinalAction::Buy && portfolio.risk_off {
            warn!("veto: macro risk-off, buys disabled");
            return Some(Veto::MacroRiskOffBuy);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trade_cap_vetoes_any_proposal() {
        let cfg = ArbiterConfig::default();
        let p = PortfolioContext {
            daily_trade_count: 25,
            ..PortfolioContext::default()
        };
        for proposed in [FinalAction::Buy, FinalAction::Sell, FinalAction::Hold] {
            assert_eq!(
                VetoAuthority::check(proposed, &p, &cfg),
                Some(Veto::DailyTradeLimit { count: 25, cap: 25 })
            );
        }
    }

    #[test]
    fn below_cap_is_clear() {
        let cfg = ArbiterConfig::default();
        let p = PortfolioContext {
            daily_trade_count: 24,
            ..PortfolioContext::default()
        };
        assert_eq!(VetoAuthority::check(FinalAction::Buy, &p, &cfg), None);
    }

    #[test]
    fn risk_off_only_blocks_buys() {
        let cfg = ArbiterConfig::default();
        let p = PortfolioContext {
            risk_off: true,
            ..PortfolioContext::default()
        };
        assert_eq!(
            VetoAuthority::check(FinalAction::Buy, &p, &cfg),
            Some(Veto::MacroRiskOffBuy)
        );
        assert_eq!(VetoAuthority::check(FinalAction::Sell, &p, &cfg), None);
        assert_eq!(VetoAuthority::check(FinalAction::Hold, &p, &cfg), None);
    }

    #[test]
    fn trade_cap_takes_precedence_over_risk_off() {
        let cfg = ArbiterConfig::default();
        let p = PortfolioContext {
            daily_trade_count: 30,
            risk_off: true,
            ..PortfolioContext::default()
        };
        assert!(matches!(
            VetoAuthority::check(FinalAction::Buy, &p, &cfg),
            Some(Veto::DailyTradeLimit { .. })
        ));
    }
}
