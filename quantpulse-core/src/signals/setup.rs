//! Trade setup: stop-loss and re-entry levels from the latest indicator row.

use serde::Serialize;

use crate::indicators::IndicatorRow;

/// Stop distance in ATR multiples below the close.
pub const STOP_ATR_MULTIPLE: f64 = 2.0;

/// ATR stand-in, as a fraction of the close, while ATR is still undefined.
pub const FALLBACK_ATR_FRACTION: f64 = 0.03;

pub const SUPPORT_BASELINE: &str = "baseline trend line (20-bar average)";
pub const SUPPORT_FALLBACK: &str = "latest close (baseline undefined)";
pub const RE_ENTRY_PULLBACK: &str = "pullback to baseline trend line";
pub const RE_ENTRY_BOUNCE: &str = "bounce off lower band";

/// Risk levels derived from one indicator row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TradeSetup {
    pub stop_loss_price: f64,
    pub support_reference_price: f64,
    pub support_description: &'static str,
    pub re_entry_target_price: f64,
    pub re_entry_description: &'static str,
    /// ATR value the stop was sized with (after the fallback, if any).
    pub atr_used: f64,
}

/// Derive the trade setup from the latest row.
///
/// - stop = close - 2 * ATR
/// - support reference = 20-bar average
/// - uptrend (close above the average): re-enter on a pullback to the average
/// - otherwise: re-enter on a bounce off the lower band
pub fn trade_setup(row: &IndicatorRow) -> TradeSetup {
    let atr = row.atr.unwrap_or(row.close * FALLBACK_ATR_FRACTION);
    let (support, support_description) = match row.ma_mid {
        Some(ma) => (ma, SUPPORT_BASELINE),
        None => (row.close, SUPPORT_FALLBACK),
    };

    let uptrend = row.ma_mid.is_some_and(|ma| row.close > ma);
    let (re_entry, re_entry_description) = if uptrend {
        (support, RE_ENTRY_PULLBACK)
    } else {
        (row.bb_lower.unwrap_or(support), RE_ENTRY_BOUNCE)
    };

    TradeSetup {
        stop_loss_price: row.close - STOP_ATR_MULTIPLE * atr,
        support_reference_price: support,
        support_description,
        re_entry_target_price: re_entry,
        re_entry_description,
        atr_used: atr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(close: f64) -> IndicatorRow {
        IndicatorRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            close,
            ma_short: None,
            ma_mid: None,
            ma_long: None,
            rsi: None,
            bb_upper: None,
            bb_lower: None,
            macd: None,
            macd_signal: None,
            macd_hist: None,
            atr: None,
        }
    }

    #[test]
    fn uptrend_re_enters_at_baseline() {
        let mut r = row(110.0);
        r.ma_mid = Some(100.0);
        r.bb_lower = Some(92.0);
        r.atr = Some(2.5);
        let setup = trade_setup(&r);
        assert_eq!(setup.stop_loss_price, 105.0);
        assert_eq!(setup.support_reference_price, 100.0);
        assert_eq!(setup.re_entry_target_price, 100.0);
        assert_eq!(setup.re_entry_description, RE_ENTRY_PULLBACK);
    }

    #[test]
    fn downtrend_re_enters_at_lower_band() {
        let mut r = row(95.0);
        r.ma_mid = Some(100.0);
        r.bb_lower = Some(92.0);
        r.atr = Some(1.0);
        let setup = trade_setup(&r);
        assert_eq!(setup.stop_loss_price, 93.0);
        assert_eq!(setup.re_entry_target_price, 92.0);
        assert_eq!(setup.re_entry_description, RE_ENTRY_BOUNCE);
        assert_eq!(setup.support_description, SUPPORT_BASELINE);
    }

    #[test]
    fn close_equal_to_baseline_is_not_uptrend() {
        let mut r = row(100.0);
        r.ma_mid = Some(100.0);
        r.bb_lower = Some(100.0);
        r.atr = Some(0.0);
        let setup = trade_setup(&r);
        assert_eq!(setup.stop_loss_price, 100.0);
        assert_eq!(setup.re_entry_description, RE_ENTRY_BOUNCE);
    }

    #[test]
    fn undefined_inputs_fall_back() {
        let setup = trade_setup(&row(200.0));
        // ATR stand-in 3% of close → stop 12 below
        assert!((setup.atr_used - 6.0).abs() < 1e-12);
        assert!((setup.stop_loss_price - 188.0).abs() < 1e-12);
        assert_eq!(setup.support_reference_price, 200.0);
        assert_eq!(setup.support_description, SUPPORT_FALLBACK);
        assert_eq!(setup.re_entry_target_price, 200.0);
    }
}
