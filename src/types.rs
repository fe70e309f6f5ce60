// =============================================================================
// Shared types used across the Agora arbitration engine
// =============================================================================

use serde::{Deserialize, Serialize};

/// Identity of an independent signal source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    /// Technical / trend-following engine.
    Trend,
    /// Fundamentals engine.
    Fundamental,
    /// Macro regime engine (risk-on / risk-off).
    Macro,
    /// News and sentiment engine.
    Sentiment,
    /// Portfolio risk / governance engine.
    Risk,
    /// Dip-hunting reversal engine.
    Contrarian,
}

impl std::fmt::Display for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trend => write!(f, "trend"),
            Self::Fundamental => write!(f, "fundamental"),
            Self::Macro => write!(f, "macro"),
            Self::Sentiment => write!(f, "sentiment"),
            Self::Risk => write!(f, "risk"),
            Self::Contrarian => write!(f, "contrarian"),
        }
    }
}

/// Holding period the module's view is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Horizon {
    /// Scalp.
    Short,
    /// Swing.
    Mid,
    /// Investment.
    Long,
}

impl std::fmt::Display for Horizon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "SHORT"),
            Self::Mid => write!(f, "MID"),
            Self::Long => write!(f, "LONG"),
        }
    }
}

/// Candle timeframe the module analysed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeframeTag {
    #[default]
    #[serde(rename = "AUTO")]
    Auto,
    #[serde(rename = "1M")]
    M1,
    #[serde(rename = "5M")]
    M5,
    #[serde(rename = "15M")]
    M15,
    #[serde(rename = "1H")]
    H1,
    #[serde(rename = "4H")]
    H4,
    #[serde(rename = "1D")]
    D1,
    #[serde(rename = "1W")]
    W1,
}

impl std::fmt::Display for TimeframeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Self::Auto => "AUTO",
            Self::M1 => "1M",
            Self::M5 => "5M",
            Self::M15 => "15M",
            Self::H1 => "1H",
            Self::H4 => "4H",
            Self::D1 => "1D",
            Self::W1 => "1W",
        };
        write!(f, "{}", tag)
    }
}

/// What a module asks for. `NoTrade` marks a passive module whose other
/// fields carry no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SignalAction {
    Buy,
    Sell,
    NoTrade,
}

impl std::fmt::Display for SignalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::NoTrade => write!(f, "NO_TRADE"),
        }
    }
}

/// Action emitted by the arbiter.
///
/// `Hold` means "no conviction" (or a soft gate stopped the trade), while
/// `Blocked` means conviction may exist but a veto forbids acting on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FinalAction {
    Buy,
    Sell,
    Hold,
    Blocked,
}

impl Default for FinalAction {
    fn default() -> Self {
        Self::Hold
    }
}

impl std::fmt::Display for FinalAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
            Self::Blocked => write!(f, "BLOCKED"),
        }
    }
}

/// Last closed action as recorded by the portfolio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosedAction {
    Buy,
    Sell,
}

impl std::fmt::Display for ClosedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_serialises_snake_case() {
        let json = serde_json::to_string(&Module::Contrarian).unwrap();
        assert_eq!(json, "\"contrarian\"");
        let m: Module = serde_json::from_str("\"macro\"").unwrap();
        assert_eq!(m, Module::Macro);
    }

    #[test]
    fn actions_serialise_upper_case() {
        assert_eq!(serde_json::to_string(&SignalAction::NoTrade).unwrap(), "\"NO_TRADE\"");
        assert_eq!(serde_json::to_string(&FinalAction::Blocked).unwrap(), "\"BLOCKED\"");
        assert_eq!(FinalAction::default(), FinalAction::Hold);
        assert_eq!(FinalAction::Blocked.to_string(), "BLOCKED");
    }

    #[test]
    fn timeframe_tags_use_candle_notation() {
        assert_eq!(serde_json::to_string(&TimeframeTag::H4).unwrap(), "\"4H\"");
        let tf: TimeframeTag = serde_json::from_str("\"15M\"").unwrap();
        assert_eq!(tf, TimeframeTag::M15);
        assert_eq!(TimeframeTag::default().to_string(), "AUTO");
        assert_eq!(serde_json::to_string(&Horizon::Mid).unwrap(), "\"MID\"");
    }
}
