// =============================================================================
// On-Balance Volume (OBV)
// =============================================================================
//
// Running cumulative volume signed by the daily price direction:
//   close up   => +volume
//   close down => -volume
//   flat / any invalid datum => carry the previous total
//
// Only the trailing `lookback` bars are accumulated; the total is seeded at 0
// on the first bar of that window.  Because the seed moves with the window,
// a baseline and any what-if variant of it must use the same `lookback`.

use super::{Sample, Series};

/// Default accumulation window in trading days.
pub const DEFAULT_LOOKBACK: usize = 120;

/// Compute the OBV series.
///
/// The output is aligned with `prices`: indices before the accumulation
/// window are `None`.  Mismatched input lengths or empty input yield an empty
/// `Vec`.  A `lookback` of zero is treated as one bar.
pub fn obv<P: Sample, V: Sample>(prices: &[P], volumes: &[V], lookback: usize) -> Series {
    if prices.len() != volumes.len() || prices.is_empty() {
        return Vec::new();
    }

    let lookback = lookback.max(1);
    let start = prices.len().saturating_sub(lookback);

    let mut out: Series = vec![None; start];
    out.reserve(prices.len() - start);

    let mut total = 0.0;
    out.push(Some(total));

    for i in start + 1..prices.len() {
        if let (Some(prev), Some(cur), Some(vol)) =
            (prices[i - 1].value(), prices[i].value(), volumes[i].value())
        {
            if cur > prev {
                total += vol;
            } else if cur < prev {
                total -= vol;
            }
        }
        out.push(Some(total));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obv_documented_sequence() {
        let prices = [10.0, 11.0, 9.0, 9.0, 12.0];
        let volumes = [0.0, 100.0, 50.0, 0.0, 200.0];
        let out = obv(&prices, &volumes, DEFAULT_LOOKBACK);
        assert_eq!(
            out,
            vec![Some(0.0), Some(100.0), Some(50.0), Some(50.0), Some(250.0)]
        );
    }

    #[test]
    fn obv_monotonic_step_on_rising_prices() {
        let prices: Vec<f64> = (0..50).map(|i| 10.0 + i as f64).collect();
        let volumes = vec![1_000.0; 50];
        let out = obv(&prices, &volumes, 30);
        let start = 50 - 30;
        assert!(out[..start].iter().all(Option::is_none));
        assert_eq!(out[start], Some(0.0));
        for i in start + 1..50 {
            assert_eq!(out[i].unwrap() - out[i - 1].unwrap(), 1_000.0);
        }
    }

    #[test]
    fn obv_carries_on_invalid_data() {
        let prices = vec![Some(10.0), Some(11.0), None, Some(12.0), Some(13.0)];
        let volumes = vec![Some(5.0), Some(5.0), Some(5.0), Some(5.0), None];
        let out = obv(&prices, &volumes, 10);
        // rise, invalid price, invalid prev, invalid volume
        assert_eq!(
            out,
            vec![Some(0.0), Some(5.0), Some(5.0), Some(5.0), Some(5.0)]
        );
    }

    #[test]
    fn obv_window_reseeds_total() {
        let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
        let volumes = [10.0; 5];
        let full = obv(&prices, &volumes, 5);
        let short = obv(&prices, &volumes, 3);
        assert_eq!(full[4], Some(40.0));
        assert_eq!(short, vec![None, None, Some(0.0), Some(10.0), Some(20.0)]);
    }

    #[test]
    fn obv_rejects_mismatched_lengths() {
        assert!(obv(&[1.0, 2.0], &[1.0], 10).is_empty());
        assert!(obv::<f64, f64>(&[], &[], 10).is_empty());
    }

    #[test]
    fn obv_zero_lookback_keeps_length() {
        let out = obv(&[1.0, 2.0, 3.0], &[1.0, 1.0, 1.0], 0);
        assert_eq!(out, vec![None, None, Some(0.0)]);
    }
}
