// =============================================================================
// Trend rules: LSMA turns and bullish stacking
// =============================================================================
//
// Lines:
//   fast = LSMA(9), slow = LSMA(25), base = SMA(20)
//
// Rules:
//   fast / slow reversal : line[t] > line[t-1] and line[t-1] <= line[t-2]
//   bullish stack        : fast > slow > base
//   first bullish day    : stacked at t, not stacked at t-1
//
// Each check returns `None` when a value it needs is missing.

use crate::indicators::{from_end, lsma, sma, Series};

pub const FAST_PERIOD: usize = 9;
pub const SLOW_PERIOD: usize = 25;
pub const BASE_PERIOD: usize = 20;

/// The three stacking lines computed over one close series.
#[derive(Debug, Clone)]
pub struct StackLines {
    pub fast: Series,
    pub slow: Series,
    pub base: Series,
}

impl StackLines {
    pub fn compute(closes: &[f64]) -> Self {
        Self {
            fast: lsma(closes, FAST_PERIOD),
            slow: lsma(closes, SLOW_PERIOD),
            base: sma(closes, BASE_PERIOD),
        }
    }

    /// Stacking state `back` bars before the last one.
    pub fn stacked_at(&self, back: usize) -> Option<bool> {
        Some(is_stacked(
            from_end(&self.fast, back)?,
            from_end(&self.slow, back)?,
            from_end(&self.base, back)?,
        ))
    }
}

/// fast > slow > base.
pub fn is_stacked(fast: f64, slow: f64, base: f64) -> bool {
    fast > slow && slow > base
}

/// The line rose today after falling (or holding) yesterday.
pub fn turned_up(line: &[Option<f64>]) -> Option<bool> {
    let cur = from_end(line, 0)?;
    let prev = from_end(line, 1)?;
    let prev2 = from_end(line, 2)?;
    Some(cur > prev && prev <= prev2)
}

pub fn fast_reversal(closes: &[f64]) -> Option<bool> {
    turned_up(&lsma(closes, FAST_PERIOD))
}

pub fn slow_reversal(closes: &[f64]) -> Option<bool> {
    turned_up(&lsma(closes, SLOW_PERIOD))
}

pub fn bullish_stack(closes: &[f64]) -> Option<bool> {
    StackLines::compute(closes).stacked_at(0)
}

pub fn first_bullish_day(closes: &[f64]) -> Option<bool> {
    let lines = StackLines::compute(closes);
    let today = lines.stacked_at(0)?;
    let yesterday = lines.stacked_at(1)?;
    Some(today && !yesterday)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::tests::pre_breakout;

    fn decline_then_jump(jump: f64) -> Vec<f64> {
        let mut closes: Vec<f64> = (0..39).map(|i| 100.0 - 0.5 * i as f64).collect();
        let last = closes[38];
        closes.push(last + jump);
        closes
    }

    #[test]
    fn stacking_predicate() {
        assert!(is_stacked(110.0, 105.0, 100.0));
        assert!(!is_stacked(95.0, 105.0, 100.0));
        assert!(!is_stacked(110.0, 100.0, 105.0));
        assert!(!is_stacked(105.0, 105.0, 100.0));
    }

    #[test]
    fn fast_line_turns_up_after_jump() {
        assert_eq!(fast_reversal(&decline_then_jump(5.0)), Some(true));
    }

    #[test]
    fn slow_line_turns_up_after_big_jump() {
        assert_eq!(slow_reversal(&decline_then_jump(12.0)), Some(true));
    }

    #[test]
    fn steady_rise_is_not_a_reversal() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + 0.5 * i as f64).collect();
        assert_eq!(fast_reversal(&closes), Some(false));
        assert_eq!(slow_reversal(&closes), Some(false));
    }

    #[test]
    fn flat_then_up_counts_as_turn() {
        let mut closes = vec![100.0; 39];
        closes.push(105.0);
        assert_eq!(fast_reversal(&closes), Some(true));
    }

    #[test]
    fn turn_needs_three_values() {
        assert_eq!(turned_up(&[None, Some(1.0), Some(2.0)]), None);
        assert_eq!(turned_up(&[Some(1.0), Some(2.0)]), None);
    }

    #[test]
    fn first_bullish_day_detected() {
        let mut closes = pre_breakout(0.726);
        assert_eq!(bullish_stack(&closes), Some(false));
        let last = closes[closes.len() - 1];
        closes.push(last * 1.01);
        assert_eq!(bullish_stack(&closes), Some(true));
        assert_eq!(first_bullish_day(&closes), Some(true));

        // A second stacked day is no longer the first.
        let convex: Vec<f64> = (0..40).map(|i| 100.0 + 0.05 * (i * i) as f64).collect();
        assert_eq!(bullish_stack(&convex), Some(true));
        assert_eq!(first_bullish_day(&convex), Some(false));
    }

    #[test]
    fn stacking_needs_slow_window() {
        let closes: Vec<f64> = (0..24).map(|i| 100.0 + i as f64).collect();
        assert_eq!(bullish_stack(&closes), None);
    }
}
