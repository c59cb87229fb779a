// =============================================================================
// Directional Movement Index (DMI / ADX / ADXR)
// =============================================================================
//
// +DI / -DI measure trend direction, ADX its strength, ADXR the average of
// ADX now and `period` bars ago.
//
// Calculation pipeline (all series aligned with the input bars):
//   1. TR  = max(high - low, |high - prevClose|, |low - prevClose|)
//   2. +DM = upMove   if upMove > downMove and upMove > 0, else 0
//      -DM = downMove if downMove > upMove and downMove > 0, else 0
//      with upMove = high - prevHigh, downMove = prevLow - low
//   3. Wilder's smoothing of TR, +DM, -DM.  The seed at index `period` is the
//      plain sum over bars 1..=period (at most one hole tolerated), then
//        s[i] = s[i-1] - s[i-1] / period + raw[i]
//      A missing raw value breaks the chain; it restarts with a fresh sum as
//      soon as the trailing `period` bars hold at most one hole again.
//   4. +DI = 100 * s(+DM) / s(TR),  -DI = 100 * s(-DM) / s(TR)
//   5. DX  = 100 * |+DI - -DI| / (+DI + -DI)
//   6. ADX seeded at 2*period with the mean DX over period..2*period-1, then
//        ADX[i] = (ADX[i-1] * (period - 1) + DX[i]) / period
//      restarting after a gap from the mean of the previous `period` DX.
//   7. ADXR[i] = (ADX[i] + ADX[i - period]) / 2
//
// Invalid inputs yield `None` at that bar and until a chain can restart.
// =============================================================================

use super::{finite, Sample, Series};

/// Default Wilder period.
pub const DEFAULT_PERIOD: usize = 14;

/// Offset applied by [`synthetic_range`] on each side of the close.
const SYNTHETIC_RANGE_PCT: f64 = 0.01;

/// Latest readings of each DMI line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DmiSnapshot {
    /// +DI at the final bar.
    pub plus_di: Option<f64>,
    /// -DI at the final bar.
    pub minus_di: Option<f64>,
    /// Last non-null ADX, scanning back from the end.
    pub adx: Option<f64>,
    /// Last non-null ADXR, scanning back from the end.
    pub adxr: Option<f64>,
}

/// Full DMI computation result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DmiResult {
    pub plus_di: Series,
    pub minus_di: Series,
    pub adx: Series,
    pub adxr: Series,
    pub snapshot: DmiSnapshot,
}

impl DmiResult {
    fn all_null(len: usize) -> Self {
        Self {
            plus_di: vec![None; len],
            minus_di: vec![None; len],
            adx: vec![None; len],
            adxr: vec![None; len],
            snapshot: DmiSnapshot::default(),
        }
    }
}

/// Compute +DI, -DI, ADX and ADXR for the given bars.
///
/// Returns an all-null result (with empty series when the slice lengths
/// disagree) when:
/// - `period` is zero.
/// - The slices have different lengths.
/// - There are fewer than `2 * period` bars.
pub fn dmi<H: Sample, L: Sample, C: Sample>(
    highs: &[H],
    lows: &[L],
    closes: &[C],
    period: usize,
) -> DmiResult {
    let n = closes.len();
    if highs.len() != n || lows.len() != n {
        return DmiResult::default();
    }
    if period == 0 || n < 2 * period {
        return DmiResult::all_null(n);
    }

    let period_f = period as f64;

    // ------------------------------------------------------------------
    // Step 1 & 2: raw TR, +DM, -DM per bar (bar 0 has no predecessor)
    // ------------------------------------------------------------------
    let mut tr: Series = vec![None; n];
    let mut plus_dm: Series = vec![None; n];
    let mut minus_dm: Series = vec![None; n];

    for i in 1..n {
        let high = highs[i].value();
        let low = lows[i].value();
        let prev_high = highs[i - 1].value();
        let prev_low = lows[i - 1].value();
        let prev_close = closes[i - 1].value();

        if let (Some(h), Some(l), Some(pc)) = (high, low, prev_close) {
            tr[i] = finite((h - l).max((h - pc).abs()).max((l - pc).abs()));
        }

        if let (Some(h), Some(l), Some(ph), Some(pl)) = (high, low, prev_high, prev_low) {
            let (pdm, mdm) = directional_movement(h - ph, pl - l);
            plus_dm[i] = Some(pdm);
            minus_dm[i] = Some(mdm);
        }
    }

    // ------------------------------------------------------------------
    // Step 3: Wilder's smoothing
    // ------------------------------------------------------------------
    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus = wilder_smooth(&plus_dm, period);
    let smooth_minus = wilder_smooth(&minus_dm, period);

    // ------------------------------------------------------------------
    // Step 4 & 5: +DI, -DI, DX
    // ------------------------------------------------------------------
    let mut plus_di: Series = vec![None; n];
    let mut minus_di: Series = vec![None; n];
    let mut dx: Series = vec![None; n];

    for i in 0..n {
        let Some(s_tr) = smooth_tr[i] else { continue };
        if s_tr <= 0.0 {
            continue;
        }
        if let Some(sp) = smooth_plus[i] {
            plus_di[i] = finite(100.0 * sp / s_tr);
        }
        if let Some(sm) = smooth_minus[i] {
            minus_di[i] = finite(100.0 * sm / s_tr);
        }
        if let (Some(p), Some(m)) = (plus_di[i], minus_di[i]) {
            dx[i] = compute_dx(p, m);
        }
    }

    // ------------------------------------------------------------------
    // Step 6: ADX
    // ------------------------------------------------------------------
    let mut adx: Series = vec![None; n];
    for i in 2 * period..n {
        adx[i] = match adx[i - 1] {
            Some(prev) => dx[i].and_then(|d| finite((prev * (period_f - 1.0) + d) / period_f)),
            None => seed(&dx[i - period..i], period)
                .and_then(|(sum, count)| finite(sum / count as f64)),
        };
    }

    // ------------------------------------------------------------------
    // Step 7: ADXR
    // ------------------------------------------------------------------
    let mut adxr: Series = vec![None; n];
    for i in period..n {
        if let (Some(now), Some(then)) = (adx[i], adx[i - period]) {
            adxr[i] = finite((now + then) / 2.0);
        }
    }

    let snapshot = DmiSnapshot {
        plus_di: plus_di.last().copied().flatten(),
        minus_di: minus_di.last().copied().flatten(),
        adx: last_valid(&adx),
        adxr: last_valid(&adxr),
    };

    DmiResult {
        plus_di,
        minus_di,
        adx,
        adxr,
        snapshot,
    }
}

/// Approximate highs/lows as ±1% of each close.
///
/// Only meant for histories that carry no genuine high/low data.
pub fn synthetic_range(closes: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let highs = closes.iter().map(|c| c * (1.0 + SYNTHETIC_RANGE_PCT)).collect();
    let lows = closes.iter().map(|c| c * (1.0 - SYNTHETIC_RANGE_PCT)).collect();
    (highs, lows)
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Split a bar-to-bar move into (+DM, -DM).
fn directional_movement(up_move: f64, down_move: f64) -> (f64, f64) {
    let pdm = if up_move > down_move && up_move > 0.0 {
        up_move
    } else {
        0.0
    };
    let mdm = if down_move > up_move && down_move > 0.0 {
        down_move
    } else {
        0.0
    };
    (pdm, mdm)
}

/// Wilder's running sum.  Seeded at `period` from bars 1..=period and
/// re-seeded the same way from the trailing window after any gap.
fn wilder_smooth(raw: &[Option<f64>], period: usize) -> Series {
    let n = raw.len();
    let mut out: Series = vec![None; n];
    if period == 0 || period >= n {
        return out;
    }

    let period_f = period as f64;
    for i in period..n {
        out[i] = match out[i - 1] {
            Some(prev) => raw[i].and_then(|r| finite(prev - prev / period_f + r)),
            None => seed(&raw[i + 1 - period..=i], period).and_then(|(sum, _)| finite(sum)),
        };
    }
    out
}

/// Sum and count of the valid values in a seed window, provided at most one
/// of the `period` slots is missing.
fn seed(window: &[Option<f64>], period: usize) -> Option<(f64, usize)> {
    let (sum, count) = window
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0 && count + 1 >= period).then_some((sum, count))
}

/// DX from the two DI values.  Both zero means no directional movement.
fn compute_dx(plus_di: f64, minus_di: f64) -> Option<f64> {
    let di_sum = plus_di + minus_di;
    if di_sum == 0.0 {
        return Some(0.0);
    }
    finite((plus_di - minus_di).abs() / di_sum * 100.0)
}

fn last_valid(series: &[Option<f64>]) -> Option<f64> {
    series.iter().rev().find_map(|v| *v)
}
