//! Ordered rule tables for the left-side and right-side signals.
//!
//! A chain is evaluated top to bottom and the first rule whose guard holds
//! wins. Every chain ends with an always-true hold rule. Guards read
//! undefined indicator values as "condition not met", except RSI which
//! reads as neutral 50.

use super::{Signal, SignalAction, SignalTier};
use crate::indicators::IndicatorRow;

/// Oversold / overbought RSI thresholds.
pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Weaker thresholds used by the conservative tier.
pub const RSI_SOFT_OVERSOLD: f64 = 40.0;
pub const RSI_SOFT_OVERBOUGHT: f64 = 60.0;
/// Conservative dip-buy zone: close within this fraction above the baseline.
pub const PULLBACK_BAND: f64 = 0.02;

/// What a guard sees: the latest row and, for crossovers, the one before.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub latest: &'a IndicatorRow,
    pub previous: Option<&'a IndicatorRow>,
}

/// One guarded entry in a priority chain.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub tier: SignalTier,
    pub action: SignalAction,
    pub rationale: &'static str,
    pub guard: fn(&RuleInput<'_>) -> bool,
}

impl Rule {
    pub fn matches(&self, input: &RuleInput<'_>) -> bool {
        (self.guard)(input)
    }

    pub fn signal(&self) -> Signal {
        Signal {
            tier: self.tier,
            action: self.action,
            rule: self.name,
            rationale: self.rationale,
        }
    }
}

/// Evaluate a chain; first match wins.
pub fn evaluate_chain(rules: &[Rule], input: &RuleInput<'_>) -> Signal {
    rules
        .iter()
        .find(|rule| rule.matches(input))
        .map(Rule::signal)
        .unwrap_or_else(|| HOLD.signal())
}

// ── Guards ───────────────────────────────────────────────────────────

pub fn close_below_lower_band(input: &RuleInput<'_>) -> bool {
    let row = input.latest;
    row.bb_lower.is_some_and(|lower| row.close < lower)
}

pub fn close_above_upper_band(input: &RuleInput<'_>) -> bool {
    let row = input.latest;
    row.bb_upper.is_some_and(|upper| row.close > upper)
}

pub fn rsi_oversold(input: &RuleInput<'_>) -> bool {
    input.latest.rsi_or_neutral() < RSI_OVERSOLD
}

pub fn rsi_overbought(input: &RuleInput<'_>) -> bool {
    input.latest.rsi_or_neutral() > RSI_OVERBOUGHT
}

/// Soft oversold and back above the 5-bar average (selling is drying up).
pub fn rsi_soft_oversold_above_short_ma(input: &RuleInput<'_>) -> bool {
    let row = input.latest;
    row.rsi_or_neutral() < RSI_SOFT_OVERSOLD && row.ma_short.is_some_and(|ma| row.close > ma)
}

/// Soft overbought and back below the 5-bar average (rally is stalling).
pub fn rsi_soft_overbought_below_short_ma(input: &RuleInput<'_>) -> bool {
    let row = input.latest;
    row.rsi_or_neutral() > RSI_SOFT_OVERBOUGHT && row.ma_short.is_some_and(|ma| row.close < ma)
}

pub fn close_above_baseline(input: &RuleInput<'_>) -> bool {
    let row = input.latest;
    row.ma_mid.is_some_and(|ma| row.close > ma)
}

pub fn close_below_baseline(input: &RuleInput<'_>) -> bool {
    let row = input.latest;
    row.ma_mid.is_some_and(|ma| row.close < ma)
}

/// MACD above its signal line on the latest row.
pub fn macd_above_signal(input: &RuleInput<'_>) -> bool {
    match (input.latest.macd, input.latest.macd_signal) {
        (Some(macd), Some(signal)) => macd > signal,
        _ => false,
    }
}

/// MACD crossed above its signal line between the previous and latest row.
pub fn macd_golden_cross(input: &RuleInput<'_>) -> bool {
    let Some(prev) = input.previous else {
        return false;
    };
    let was_below = match (prev.macd, prev.macd_signal) {
        (Some(macd), Some(signal)) => macd <= signal,
        _ => false,
    };
    was_below && macd_above_signal(input)
}

pub fn golden_cross_above_baseline(input: &RuleInput<'_>) -> bool {
    close_above_baseline(input) && macd_golden_cross(input)
}

pub fn macd_bullish_above_baseline(input: &RuleInput<'_>) -> bool {
    close_above_baseline(input) && macd_above_signal(input)
}

/// Close strictly above the baseline but within `PULLBACK_BAND` of it.
pub fn pullback_to_baseline(input: &RuleInput<'_>) -> bool {
    let row = input.latest;
    row.ma_mid
        .is_some_and(|ma| row.close > ma && row.close <= ma * (1.0 + PULLBACK_BAND))
}

fn always(_: &RuleInput<'_>) -> bool {
    true
}

// ── Rules ────────────────────────────────────────────────────────────

pub const HOLD: Rule = Rule {
    name: "hold",
    tier: SignalTier::Neutral,
    action: SignalAction::Hold,
    rationale: "Indicators sit in the middle of their ranges; no actionable setup.",
    guard: always,
};

pub const STRONG_BUY_BELOW_LOWER_BAND: Rule = Rule {
    name: "strong_buy_below_lower_band",
    tier: SignalTier::Extreme,
    action: SignalAction::StrongBuy,
    rationale: "Close broke below the lower Bollinger band; deeply oversold.",
    guard: close_below_lower_band,
};

pub const BUY_RSI_OVERSOLD: Rule = Rule {
    name: "buy_rsi_oversold",
    tier: SignalTier::Moderate,
    action: SignalAction::Buy,
    rationale: "RSI below 30; price is in the oversold zone, scale in gradually.",
    guard: rsi_oversold,
};

pub const PROBE_BUY_STABILIZING: Rule = Rule {
    name: "probe_buy_stabilizing",
    tier: SignalTier::Conservative,
    action: SignalAction::ProbeBuy,
    rationale: "RSI below 40 with close back above the 5-bar average; selling is fading.",
    guard: rsi_soft_oversold_above_short_ma,
};

pub const STRONG_SELL_ABOVE_UPPER_BAND: Rule = Rule {
    name: "strong_sell_above_upper_band",
    tier: SignalTier::Extreme,
    action: SignalAction::StrongSell,
    rationale: "Close broke above the upper Bollinger band; deeply overbought.",
    guard: close_above_upper_band,
};

pub const SELL_RSI_OVERBOUGHT: Rule = Rule {
    name: "sell_rsi_overbought",
    tier: SignalTier::Moderate,
    action: SignalAction::Sell,
    rationale: "RSI above 70; price is in the overbought zone, take profits gradually.",
    guard: rsi_overbought,
};

pub const REDUCE_STALLING: Rule = Rule {
    name: "reduce_stalling",
    tier: SignalTier::Conservative,
    action: SignalAction::Reduce,
    rationale: "RSI above 60 with close back below the 5-bar average; the rally is stalling.",
    guard: rsi_soft_overbought_below_short_ma,
};

pub const CHASE_ABOVE_UPPER_BAND: Rule = Rule {
    name: "chase_above_upper_band",
    tier: SignalTier::Extreme,
    action: SignalAction::Chase,
    rationale: "Close broke above the upper Bollinger band; momentum is very strong.",
    guard: close_above_upper_band,
};

pub const ADD_ON_GOLDEN_CROSS: Rule = Rule {
    name: "add_on_golden_cross",
    tier: SignalTier::Moderate,
    action: SignalAction::AddPosition,
    rationale: "MACD crossed above its signal line with close above the baseline trend line.",
    guard: golden_cross_above_baseline,
};

pub const ADD_ON_MACD_ABOVE_SIGNAL: Rule = Rule {
    name: "add_on_macd_above_signal",
    tier: SignalTier::Moderate,
    action: SignalAction::AddPosition,
    rationale: "MACD above its signal line with close above the baseline trend line.",
    guard: macd_bullish_above_baseline,
};

pub const BUY_THE_DIP_AT_BASELINE: Rule = Rule {
    name: "buy_the_dip_at_baseline",
    tier: SignalTier::Conservative,
    action: SignalAction::BuyTheDip,
    rationale: "Uptrend pulling back to within 2% of the baseline trend line.",
    guard: pullback_to_baseline,
};

pub const EXIT_FULLY_BELOW_LOWER_BAND: Rule = Rule {
    name: "exit_fully_below_lower_band",
    tier: SignalTier::Extreme,
    action: SignalAction::ExitFully,
    rationale: "Close broke below the lower Bollinger band; the trend has collapsed.",
    guard: close_below_lower_band,
};

pub const EXIT_BELOW_BASELINE: Rule = Rule {
    name: "exit_below_baseline",
    tier: SignalTier::Moderate,
    action: SignalAction::Exit,
    rationale: "Close fell below the baseline trend line; the medium-term trend is weakening.",
    guard: close_below_baseline,
};

// ── Chains ───────────────────────────────────────────────────────────

pub const LEFT_SIDE_RULES: &[Rule] = &[
    STRONG_BUY_BELOW_LOWER_BAND,
    BUY_RSI_OVERSOLD,
    STRONG_SELL_ABOVE_UPPER_BAND,
    SELL_RSI_OVERBOUGHT,
    HOLD,
];

pub const LEFT_SIDE_RULES_CONSERVATIVE: &[Rule] = &[
    STRONG_BUY_BELOW_LOWER_BAND,
    BUY_RSI_OVERSOLD,
    PROBE_BUY_STABILIZING,
    STRONG_SELL_ABOVE_UPPER_BAND,
    SELL_RSI_OVERBOUGHT,
    REDUCE_STALLING,
    HOLD,
];

pub const RIGHT_SIDE_RULES: &[Rule] = &[
    CHASE_ABOVE_UPPER_BAND,
    ADD_ON_GOLDEN_CROSS,
    ADD_ON_MACD_ABOVE_SIGNAL,
    EXIT_FULLY_BELOW_LOWER_BAND,
    EXIT_BELOW_BASELINE,
    HOLD,
];

pub const RIGHT_SIDE_RULES_CONSERVATIVE: &[Rule] = &[
    CHASE_ABOVE_UPPER_BAND,
    ADD_ON_GOLDEN_CROSS,
    ADD_ON_MACD_ABOVE_SIGNAL,
    BUY_THE_DIP_AT_BASELINE,
    EXIT_FULLY_BELOW_LOWER_BAND,
    EXIT_BELOW_BASELINE,
    HOLD,
];
