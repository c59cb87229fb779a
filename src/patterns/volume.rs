// =============================================================================
// OBV reversal rule
// =============================================================================
//
// Lines: obv = OBV(lookback), s30 = SMA(obv, 30), s60 = SMA(obv, 60)
//
// All three must hold at the last bar:
//   (a) obv > s30
//   (b) s30 > s60, or s30 within 1% of s60
//   (c) the lowest OBV of the trailing 20 bars sits at least two bars back
//       and today's OBV is at least 2% above it

use crate::indicators::{from_end, obv, sma, Series};

const FAST_SMA: usize = 30;
const SLOW_SMA: usize = 60;
const TROUGH_WINDOW: usize = 20;
const NEAR_TOLERANCE: f64 = 0.01;
const MIN_REBOUND: f64 = 0.02;

/// Apply the OBV reversal rule at the last bar.
///
/// `None` when OBV or either of its averages is missing there, including
/// when `volumes` is not aligned with `closes`.
pub fn obv_reversal(closes: &[f64], volumes: &[Option<f64>], lookback: usize) -> Option<bool> {
    let line = obv(closes, volumes, lookback);
    let cur = from_end(&line, 0)?;
    let s30 = from_end(&sma(&line, FAST_SMA), 0)?;
    let s60 = from_end(&sma(&line, SLOW_SMA), 0)?;

    Some(cur > s30 && near_or_above(s30, s60) && rebounds_from_trough(&line))
}

/// `fast` above `slow`, or close enough to count as a breakout.
fn near_or_above(fast: f64, slow: f64) -> bool {
    fast > slow || (fast - slow).abs() <= NEAR_TOLERANCE * slow.abs()
}

/// The trailing-window low is at least two bars old and the last value has
/// climbed at least `MIN_REBOUND` off it.
///
/// The low is taken over the whole window, today and yesterday included, so
/// a window whose lowest bar is yesterday fails rather than falling back to
/// an older, higher trough.
fn rebounds_from_trough(line: &Series) -> bool {
    let n = line.len();
    let Some(cur) = from_end(line, 0) else {
        return false;
    };

    let start = n.saturating_sub(TROUGH_WINDOW);
    let mut low: Option<(usize, f64)> = None;
    for (i, v) in line.iter().enumerate().skip(start) {
        if let Some(v) = *v {
            if low.map_or(true, |(_, m)| v < m) {
                low = Some((i, v));
            }
        }
    }

    match low {
        Some((idx, min)) if idx + 2 < n => cur > min && cur - min >= MIN_REBOUND * min.abs(),
        _ => false,
    }
}
