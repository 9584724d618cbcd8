//! Signal classification — left-side (contrarian) and right-side (trend)
//! signals plus the trade setup, all derived from the latest indicator rows.
//!
//! Both sides are independent rule chains (see `rules`); they may disagree.

pub mod rules;
pub mod setup;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::indicators::{IndicatorRow, IndicatorTable};
use rules::{
    evaluate_chain, RuleInput, LEFT_SIDE_RULES, LEFT_SIDE_RULES_CONSERVATIVE, RIGHT_SIDE_RULES,
    RIGHT_SIDE_RULES_CONSERVATIVE,
};
pub use rules::Rule;
pub use setup::{trade_setup, TradeSetup};

/// Signal strength tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SignalTier {
    Neutral,
    Conservative,
    Moderate,
    Extreme,
}

/// What the signal recommends. Serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalAction {
    #[serde(rename = "strong buy")]
    StrongBuy,
    #[serde(rename = "buy")]
    Buy,
    #[serde(rename = "probe buy")]
    ProbeBuy,
    #[serde(rename = "strong sell")]
    StrongSell,
    #[serde(rename = "sell")]
    Sell,
    #[serde(rename = "reduce")]
    Reduce,
    #[serde(rename = "chase (add aggressively)")]
    Chase,
    #[serde(rename = "add position")]
    AddPosition,
    #[serde(rename = "buy the dip")]
    BuyTheDip,
    #[serde(rename = "exit fully")]
    ExitFully,
    #[serde(rename = "exit")]
    Exit,
    #[serde(rename = "hold")]
    Hold,
}

impl SignalAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::StrongBuy => "strong buy",
            Self::Buy => "buy",
            Self::ProbeBuy => "probe buy",
            Self::StrongSell => "strong sell",
            Self::Sell => "sell",
            Self::Reduce => "reduce",
            Self::Chase => "chase (add aggressively)",
            Self::AddPosition => "add position",
            Self::BuyTheDip => "buy the dip",
            Self::ExitFully => "exit fully",
            Self::Exit => "exit",
            Self::Hold => "hold",
        }
    }
}

impl fmt::Display for SignalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which chain produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalSide {
    Left,
    Right,
}

/// One classification outcome. `rule` names the rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Signal {
    pub tier: SignalTier,
    pub action: SignalAction,
    pub rule: &'static str,
    pub rationale: &'static str,
}

impl Signal {
    pub fn is_neutral(&self) -> bool {
        self.tier == SignalTier::Neutral
    }
}

/// Both signals and the trade setup for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub left: Signal,
    pub right: Signal,
    pub setup: TradeSetup,
}

impl Classification {
    pub fn signal(&self, side: SignalSide) -> &Signal {
        match side {
            SignalSide::Left => &self.left,
            SignalSide::Right => &self.right,
        }
    }
}

/// Classifier options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Enable the Conservative-tier rules on both sides.
    pub conservative_tier: bool,
}

impl ClassifierConfig {
    fn left_rules(&self) -> &'static [Rule] {
        if self.conservative_tier {
            LEFT_SIDE_RULES_CONSERVATIVE
        } else {
            LEFT_SIDE_RULES
        }
    }

    fn right_rules(&self) -> &'static [Rule] {
        if self.conservative_tier {
            RIGHT_SIDE_RULES_CONSERVATIVE
        } else {
            RIGHT_SIDE_RULES
        }
    }
}

/// Left-side (contrarian) signal under the default chain.
pub fn left_side_signal(latest: &IndicatorRow) -> Signal {
    evaluate_chain(
        LEFT_SIDE_RULES,
        &RuleInput {
            latest,
            previous: None,
        },
    )
}

/// Right-side (trend-following) signal under the default chain.
/// `previous` is needed for the MACD crossover rule.
pub fn right_side_signal(latest: &IndicatorRow, previous: Option<&IndicatorRow>) -> Signal {
    evaluate_chain(RIGHT_SIDE_RULES, &RuleInput { latest, previous })
}

/// Classify with the default chains.
pub fn classify_signals(latest: &IndicatorRow, previous: Option<&IndicatorRow>) -> Classification {
    classify_with(&ClassifierConfig::default(), latest, previous)
}

/// Classify with explicit options.
pub fn classify_with(
    config: &ClassifierConfig,
    latest: &IndicatorRow,
    previous: Option<&IndicatorRow>,
) -> Classification {
    let input = RuleInput { latest, previous };
    Classification {
        left: evaluate_chain(config.left_rules(), &input),
        right: evaluate_chain(config.right_rules(), &input),
        setup: trade_setup(latest),
    }
}

/// Classify the last row of a table against the row before it.
pub fn classify_table(config: &ClassifierConfig, table: &IndicatorTable) -> Classification {
    classify_with(config, table.latest(), table.previous())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(close: f64) -> IndicatorRow {
        IndicatorRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            close,
            ma_short: Some(close),
            ma_mid: Some(close),
            ma_long: None,
            rsi: None,
            bb_upper: Some(close),
            bb_lower: Some(close),
            macd: Some(0.0),
            macd_signal: Some(0.0),
            macd_hist: Some(0.0),
            atr: Some(0.0),
        }
    }

    #[test]
    fn flat_row_holds_on_both_sides() {
        let r = row(100.0);
        let c = classify_signals(&r, Some(&r));
        assert_eq!(c.left.action, SignalAction::Hold);
        assert_eq!(c.right.action, SignalAction::Hold);
        assert!(c.left.is_neutral() && c.right.is_neutral());
        assert_eq!(c.setup.stop_loss_price, 100.0);
    }

    #[test]
    fn sides_can_disagree() {
        // Above the upper band: contrarian sells, trend follower chases.
        let mut r = row(110.0);
        r.bb_upper = Some(105.0);
        r.bb_lower = Some(95.0);
        r.ma_mid = Some(100.0);
        let c = classify_signals(&r, None);
        assert_eq!(c.left.action, SignalAction::StrongSell);
        assert_eq!(c.right.action, SignalAction::Chase);
        assert_eq!(c.signal(SignalSide::Left).tier, SignalTier::Extreme);
    }

    #[test]
    fn right_side_exits_below_baseline() {
        let mut r = row(98.0);
        r.ma_mid = Some(100.0);
        r.bb_upper = Some(104.0);
        r.bb_lower = Some(96.0);
        assert_eq!(right_side_signal(&r, None).action, SignalAction::Exit);
        r.close = 95.0;
        assert_eq!(right_side_signal(&r, None).action, SignalAction::ExitFully);
    }

    #[test]
    fn conservative_tier_is_opt_in() {
        // RSI 35 and close above the 5-bar average.
        let mut r = row(101.0);
        r.rsi = Some(35.0);
        r.ma_short = Some(100.0);
        r.ma_mid = Some(100.0);
        r.bb_upper = Some(110.0);
        r.bb_lower = Some(90.0);

        assert_eq!(left_side_signal(&r).action, SignalAction::Hold);
        let config = ClassifierConfig {
            conservative_tier: true,
        };
        let c = classify_with(&config, &r, None);
        assert_eq!(c.left.action, SignalAction::ProbeBuy);
        assert_eq!(c.left.tier, SignalTier::Conservative);
        // Close 1% above the baseline: inside the dip-buy zone.
        assert_eq!(c.right.action, SignalAction::BuyTheDip);
    }

    #[test]
    fn action_serializes_as_label() {
        let json = serde_json::to_string(&SignalAction::Chase).unwrap();
        assert_eq!(json, "\"chase (add aggressively)\"");
        assert_eq!(SignalAction::AddPosition.to_string(), "add position");
    }

    #[test]
    fn tiers_order_by_strength() {
        assert!(SignalTier::Extreme > SignalTier::Moderate);
        assert!(SignalTier::Moderate > SignalTier::Conservative);
        assert!(SignalTier::Conservative > SignalTier::Neutral);
    }
}
