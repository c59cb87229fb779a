// =============================================================================
// DMI bullish rules
// =============================================================================
//
// Bullish        : +DI > -DI, ADX > ADXR, and +DI, ADX, ADXR all strictly
//                  higher than yesterday.
// BullishStrict  : Bullish plus -DI strictly lower than yesterday.
//
// The two are separate rules; neither is a refinement the caller can swap
// in silently for the other.

use serde::{Deserialize, Serialize};

use crate::indicators::{dmi, from_end, DmiResult, Sample};

/// Which DMI bullish rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DmiRule {
    Bullish,
    BullishStrict,
}

/// Today's and yesterday's value of each DMI line.
#[derive(Debug, Clone, Copy, PartialEq)]
struct TwoDay {
    plus_di: (f64, f64),
    minus_di: (f64, f64),
    adx: (f64, f64),
    adxr: (f64, f64),
}

impl TwoDay {
    fn from_result(res: &DmiResult) -> Option<Self> {
        let pair = |s: &[Option<f64>]| Some((from_end(s, 0)?, from_end(s, 1)?));
        Some(Self {
            plus_di: pair(&res.plus_di[..])?,
            minus_di: pair(&res.minus_di[..])?,
            adx: pair(&res.adx[..])?,
            adxr: pair(&res.adxr[..])?,
        })
    }
}

/// Run the DMI pipeline and apply `rule` at the last bar.
///
/// `None` when any of the eight values the rule reads is missing.
pub fn check<H: Sample, L: Sample>(
    highs: &[H],
    lows: &[L],
    closes: &[f64],
    rule: DmiRule,
    period: usize,
) -> Option<bool> {
    let d = TwoDay::from_result(&dmi(highs, lows, closes, period))?;
    let (pdi, pdi_prev) = d.plus_di;
    let (mdi, mdi_prev) = d.minus_di;
    let (adx, adx_prev) = d.adx;
    let (adxr, adxr_prev) = d.adxr;

    let bullish = pdi > mdi
        && adx > adxr
        && pdi > pdi_prev
        && adx > adx_prev
        && adxr > adxr_prev;

    Some(match rule {
        DmiRule::Bullish => bullish,
        DmiRule::BullishStrict => bullish && mdi < mdi_prev,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `flat` sideways bars around 100, then `up` bars climbing 1.0 each.
    /// A choppy base alternates closes between 99 and 101.
    fn base_then_climb(flat: usize, up: usize, choppy: bool) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let mut h = Vec::new();
        let mut l = Vec::new();
        let mut c = Vec::new();
        for i in 0..flat {
            let base = match (choppy, i % 2 == 1) {
                (false, _) => 100.0,
                (true, true) => 101.0,
                (true, false) => 99.0,
            };
            h.push(base + 1.0);
            l.push(base - 1.0);
            c.push(base);
        }
        for j in 0..up {
            let base = 100.0 + (j + 1) as f64;
            h.push(base + 1.0);
            l.push(base - 1.0);
            c.push(base);
        }
        (h, l, c)
    }

    #[test]
    fn climb_from_quiet_base_is_bullish_but_not_strict() {
        // No down moves ever: -DI sits at 0 and cannot fall.
        let (h, l, c) = base_then_climb(30, 20, false);
        assert_eq!(check(&h, &l, &c, DmiRule::Bullish, 14), Some(true));
        assert_eq!(check(&h, &l, &c, DmiRule::BullishStrict, 14), Some(false));
    }

    #[test]
    fn climb_from_choppy_base_passes_both() {
        for (flat, up) in [(30, 20), (35, 15), (40, 12)] {
            let (h, l, c) = base_then_climb(flat, up, true);
            assert_eq!(check(&h, &l, &c, DmiRule::Bullish, 14), Some(true));
            assert_eq!(check(&h, &l, &c, DmiRule::BullishStrict, 14), Some(true));
        }
    }

    #[test]
    fn flat_market_is_not_bullish() {
        let (h, l, c) = base_then_climb(60, 0, false);
        assert_eq!(check(&h, &l, &c, DmiRule::Bullish, 14), Some(false));
    }

    #[test]
    fn falling_market_is_not_bullish() {
        let c: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let h: Vec<f64> = c.iter().map(|x| x + 1.0).collect();
        let l: Vec<f64> = c.iter().map(|x| x - 1.0).collect();
        assert_eq!(check(&h, &l, &c, DmiRule::Bullish, 14), Some(false));
    }

    #[test]
    fn too_short_for_adxr_history() {
        // ADXR needs 3 * period bars plus one day of history.
        let (h, l, c) = base_then_climb(20, 23, false);
        assert_eq!(c.len(), 43);
        assert_eq!(check(&h, &l, &c, DmiRule::Bullish, 14), None);
    }
}
