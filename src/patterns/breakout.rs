// =============================================================================
// Breakout prediction: minimum next-day rise that completes the stack
// =============================================================================
//
// Preconditions: the stack lines are valid today and NOT stacked, and the
// latest close is positive.
//
// Search: for pct = 0, step, 2*step, ..., max (ascending), append a synthetic
// close at last * (1 + pct / 100), recompute LSMA(9) / LSMA(25) / SMA(20) on
// the extended series and test the stack at the synthetic bar.  The first pct
// that stacks is the answer; nothing is solved in closed form.
//
// Cost: up to `candidates().len()` full passes of the three lines.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::trend::StackLines;
use super::{MatchVerdict, MIN_PRICE_POINTS};

/// Largest grid `candidates` will build.
pub const MAX_CANDIDATES: usize = 1_000;

fn default_max_pct() -> f64 {
    3.0
}

fn default_step_pct() -> f64 {
    0.5
}

/// Grid of hypothetical next-day moves, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakoutSearch {
    /// Largest move tested (inclusive).
    #[serde(default = "default_max_pct")]
    pub max_pct: f64,

    /// Spacing between tested moves.
    #[serde(default = "default_step_pct")]
    pub step_pct: f64,
}

impl Default for BreakoutSearch {
    fn default() -> Self {
        Self {
            max_pct: default_max_pct(),
            step_pct: default_step_pct(),
        }
    }
}

impl BreakoutSearch {
    /// Tested moves in ascending order, starting at 0.
    ///
    /// Built from integer multiples of the step so that accumulated rounding
    /// never drops the last candidate.  A non-positive step, a negative
    /// maximum or a grid of more than [`MAX_CANDIDATES`] points tests nothing.
    pub fn candidates(&self) -> Vec<f64> {
        if !(self.step_pct > 0.0) || !self.step_pct.is_finite() {
            return Vec::new();
        }
        if !(self.max_pct >= 0.0) || !self.max_pct.is_finite() {
            return Vec::new();
        }
        let steps = (self.max_pct / self.step_pct + 1e-9).floor();
        if !(steps < MAX_CANDIDATES as f64) {
            warn!(
                max_pct = self.max_pct,
                step_pct = self.step_pct,
                "breakout grid too fine, skipping search"
            );
            return Vec::new();
        }
        (0..=steps as usize).map(|i| i as f64 * self.step_pct).collect()
    }
}

/// Evaluate the breakout rule.  The verdict's auxiliary value is the
/// smallest stacking move in percent, rounded to one decimal.
pub fn predict(closes: &[f64], search: &BreakoutSearch) -> MatchVerdict {
    match StackLines::compute(closes).stacked_at(0) {
        Some(false) => {}
        Some(true) => {
            trace!("already stacked, not a breakout candidate");
            return MatchVerdict::no_match();
        }
        None => return MatchVerdict::no_match(),
    }

    match min_rise_for_stack(closes, search) {
        Some(pct) => MatchVerdict::matched_with(pct),
        None => MatchVerdict::no_match(),
    }
}

/// Smallest tested next-day rise (percent, one decimal) after which the
/// stack holds, or `None` if no tested move stacks.
///
/// Does not check today's state; see [`predict`] for the full rule.
pub fn min_rise_for_stack(closes: &[f64], search: &BreakoutSearch) -> Option<f64> {
    if closes.len() < MIN_PRICE_POINTS {
        return None;
    }
    let last = *closes.last()?;
    if !(last > 0.0) || !last.is_finite() {
        return None;
    }

    let mut extended = Vec::with_capacity(closes.len() + 1);
    extended.extend_from_slice(closes);
    extended.push(last);

    for pct in search.candidates() {
        if let Some(tomorrow) = extended.last_mut() {
            *tomorrow = last * (1.0 + pct / 100.0);
        }
        if StackLines::compute(&extended).stacked_at(0) == Some(true) {
            trace!(pct, "stack forms");
            return Some(round_one_decimal(pct));
        }
    }
    None
}

fn round_one_decimal(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
