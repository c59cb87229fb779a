// =============================================================================
// Next-day what-if simulation
// =============================================================================
//
// Appends one hypothetical bar closing `pct` percent away from the last close
// and reports where each indicator would land, with its direction versus the
// bar before.  Pure: the caller's bars are never touched.
//
// OBV is only re-run on the extended history when the move is non-trivial
// (|pct| > 0.01).  The synthetic bar trades no volume, so a flat day would
// only slide the accumulation window and shift the seed.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::bollinger::{DEFAULT_NUM_STD, DEFAULT_PERIOD as BB_PERIOD};
use crate::indicators::{bollinger, dmi, from_end, lsma, obv, sma};
use crate::market_data::bar::{self, Bar};
use crate::patterns::trend::{FAST_PERIOD, SLOW_PERIOD};
use crate::patterns::RuleParams;

/// Smallest |pct| that re-runs OBV on the extended history.
const OBV_MIN_MOVE_PCT: f64 = 0.01;

const OBV_FAST_SMA: usize = 30;
const OBV_SLOW_SMA: usize = 60;

/// Direction of a reading versus the previous bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trend {
    Up,
    Down,
}

/// Latest value of one indicator line plus its direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: Option<f64>,
    /// `Up` when strictly above the previous value, `Down` otherwise, `None`
    /// when either value is missing.
    pub trend: Option<Trend>,
}

impl Reading {
    pub fn latest(series: &[Option<f64>]) -> Self {
        let value = from_end(series, 0);
        let trend = match (value, from_end(series, 1)) {
            (Some(cur), Some(prev)) if cur > prev => Some(Trend::Up),
            (Some(_), Some(_)) => Some(Trend::Down),
            _ => None,
        };
        Self { value, trend }
    }
}

/// Indicator readings as of the hypothetical next day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextDaySnapshot {
    /// Applied move in percent (non-finite input becomes 0).
    pub pct: f64,
    pub bar: Bar,

    pub lsma_fast: Reading,
    pub lsma_slow: Reading,

    pub bb_upper: Reading,
    pub bb_mid: Reading,
    pub bb_lower: Reading,

    pub obv: Reading,
    pub obv_sma30: Reading,
    pub obv_sma60: Reading,

    pub plus_di: Reading,
    pub minus_di: Reading,
    pub adx: Reading,
    pub adxr: Reading,
}

/// Simulate a next-day close `pct` percent away from the last bar.
///
/// Returns `None` only for an empty history.
pub fn simulate_next_day(bars: &[Bar], pct: f64, params: &RuleParams) -> Option<NextDaySnapshot> {
    let last = bars.last()?;
    let pct = if pct.is_finite() { pct } else { 0.0 };
    let next = last.next_day(last.close * (1.0 + pct / 100.0));

    let mut extended = Vec::with_capacity(bars.len() + 1);
    extended.extend_from_slice(bars);
    extended.push(next.clone());

    let closes = bar::closes(&extended);
    let bands = bollinger(&closes, BB_PERIOD, DEFAULT_NUM_STD);

    let obv_source: &[Bar] = if pct.abs() > OBV_MIN_MOVE_PCT {
        &extended
    } else {
        bars
    };
    let obv_line = obv(
        &bar::closes(obv_source),
        &bar::volumes(obv_source),
        params.obv_lookback,
    );

    // The synthetic bar always has a range; the history decides the source.
    let directional = if bar::has_range_data(bars) {
        dmi(
            &bar::highs(&extended),
            &bar::lows(&extended),
            &closes,
            params.dmi_period,
        )
    } else {
        let (highs, lows) = dmi::synthetic_range(&closes);
        dmi(&highs, &lows, &closes, params.dmi_period)
    };

    debug!(pct, close = next.close, bars = extended.len(), "next-day simulation");

    Some(NextDaySnapshot {
        pct,
        bar: next,
        lsma_fast: Reading::latest(&lsma(&closes, FAST_PERIOD)),
        lsma_slow: Reading::latest(&lsma(&closes, SLOW_PERIOD)),
        bb_upper: Reading::latest(&bands.upper),
        bb_mid: Reading::latest(&bands.mid),
        bb_lower: Reading::latest(&bands.lower),
        obv: Reading::latest(&obv_line),
        obv_sma30: Reading::latest(&sma(&obv_line, OBV_FAST_SMA)),
        obv_sma60: Reading::latest(&sma(&obv_line, OBV_SLOW_SMA)),
        plus_di: Reading::latest(&directional.plus_di),
        minus_di: Reading::latest(&directional.minus_di),
        adx: Reading::latest(&directional.adx),
        adxr: Reading::latest(&directional.adxr),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;

    fn history(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: 1_700_000_000 + i as i64 * DAY,
                open: Some(c),
                high: Some(c + 1.0),
                low: Some(c - 1.0),
                close: c,
                volume: Some(1_000.0),
            })
            .collect()
    }

    #[test]
    fn empty_history_has_no_snapshot() {
        assert!(simulate_next_day(&[], 1.0, &RuleParams::default()).is_none());
    }

    #[test]
    fn synthetic_bar_shape() {
        let bars = history(&[100.0; 40]);
        let snap = simulate_next_day(&bars, 2.0, &RuleParams::default()).unwrap();
        assert!((snap.bar.close - 102.0).abs() < 1e-9);
        assert_eq!(snap.bar.open, Some(100.0));
        assert_eq!(snap.bar.volume, Some(0.0));
        assert_eq!(snap.bar.timestamp, bars[39].timestamp + DAY);
    }

    #[test]
    fn non_finite_move_is_flat() {
        let bars = history(&[100.0; 40]);
        let snap = simulate_next_day(&bars, f64::NAN, &RuleParams::default()).unwrap();
        assert_eq!(snap.pct, 0.0);
        assert_eq!(snap.bar.close, 100.0);
    }

    #[test]
    fn price_lines_follow_the_move() {
        let bars = history(&[100.0; 40]);
        let params = RuleParams::default();

        let up = simulate_next_day(&bars, 2.0, &params).unwrap();
        assert_eq!(up.lsma_fast.trend, Some(Trend::Up));
        assert_eq!(up.lsma_slow.trend, Some(Trend::Up));
        assert_eq!(up.bb_mid.trend, Some(Trend::Up));
        assert_eq!(up.bb_upper.trend, Some(Trend::Up));

        let down = simulate_next_day(&bars, -2.0, &params).unwrap();
        assert_eq!(down.lsma_fast.trend, Some(Trend::Down));
        assert_eq!(down.bb_lower.trend, Some(Trend::Down));
    }

    #[test]
    fn flat_day_keeps_baseline_obv() {
        let closes: Vec<f64> = (0..130).map(|i| 100.0 + i as f64 * 0.1).collect();
        let bars = history(&closes);
        let params = RuleParams::default();

        let baseline = obv(&closes, &bar::volumes(&bars), params.obv_lookback);
        let snap = simulate_next_day(&bars, 0.0, &params).unwrap();
        assert_eq!(snap.obv.value, from_end(&baseline, 0));
        assert_eq!(snap.obv.trend, Some(Trend::Up));
    }

    #[test]
    fn zero_volume_day_holds_obv() {
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + i as f64 * 0.1).collect();
        let bars = history(&closes);
        let snap = simulate_next_day(&bars, 3.0, &RuleParams::default()).unwrap();
        // 79 up days of 1000 from a zero seed, then an up day on no volume.
        assert_eq!(snap.obv.value, Some(79_000.0));
        assert_eq!(snap.obv.trend, Some(Trend::Down));
        assert!(snap.obv_sma60.value.is_some());
    }

    #[test]
    fn short_history_still_reports() {
        let bars = history(&[100.0, 101.0, 102.0]);
        let snap = simulate_next_day(&bars, 1.0, &RuleParams::default()).unwrap();
        assert_eq!(snap.lsma_fast, Reading::default());
        assert_eq!(snap.adx.value, None);
        assert!(snap.obv.value.is_some());
    }

    #[test]
    fn directional_readings_on_long_history() {
        let closes: Vec<f64> = (0..60)
            .map(|i| 100.0 + i as f64 * 0.5 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let snap = simulate_next_day(&history(&closes), 1.0, &RuleParams::default()).unwrap();
        assert!(snap.plus_di.value.is_some());
        assert!(snap.minus_di.value.is_some());
        assert!(snap.adx.value.is_some());
        assert!(snap.adxr.value.is_some());
    }

    #[test]
    fn reading_direction() {
        assert_eq!(
            Reading::latest(&[Some(1.0), Some(2.0)]).trend,
            Some(Trend::Up)
        );
        assert_eq!(
            Reading::latest(&[Some(2.0), Some(2.0)]).trend,
            Some(Trend::Down)
        );
        assert_eq!(Reading::latest(&[None, Some(2.0)]).trend, None);
        assert_eq!(Reading::latest(&[]), Reading::default());
    }
}
