// =============================================================================
// Simple Moving Average (SMA)
// =============================================================================
//
// Arithmetic mean over a trailing window.  Holes in the window are tolerated:
// the mean is taken over the valid values actually present, and only a
// window with no valid value at all yields `None`.

use super::{finite, Sample, Series};

/// Compute the SMA series for `data` over `window` bars.
///
/// The output has the same length as `data`; the first `window - 1`
/// positions are `None`.  Returns an empty `Vec` when `window` is zero or
/// `data` is empty.
pub fn sma<T: Sample>(data: &[T], window: usize) -> Series {
    if window == 0 || data.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        if i + 1 < window {
            out.push(None);
            continue;
        }

        let mut sum = 0.0;
        let mut count = 0usize;
        for sample in &data[i + 1 - window..=i] {
            if let Some(v) = sample.value() {
                sum += v;
                count += 1;
            }
        }

        if count == 0 {
            out.push(None);
        } else {
            out.push(finite(sum / count as f64));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_pads_the_unfilled_window() {
        let data: Vec<f64> = (1..=10).map(|x| x as f64).collect();
        let out = sma(&data, 4);
        assert_eq!(out.len(), data.len());
        assert!(out[..3].iter().all(Option::is_none));
        // mean(1,2,3,4)
        assert!((out[3].unwrap() - 2.5).abs() < 1e-12);
        // mean(7,8,9,10)
        assert!((out[9].unwrap() - 8.5).abs() < 1e-12);
    }

    #[test]
    fn sma_matches_window_mean_everywhere() {
        let data: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).sin() * 5.0 + 50.0).collect();
        let w = 7;
        let out = sma(&data, w);
        for i in (w - 1)..data.len() {
            let expected: f64 = data[i + 1 - w..=i].iter().sum::<f64>() / w as f64;
            assert!((out[i].unwrap() - expected).abs() < 1e-9, "index {i}");
        }
    }

    #[test]
    fn sma_divides_by_valid_count_only() {
        let data = vec![Some(2.0), None, Some(4.0), Some(f64::NAN)];
        let out = sma(&data, 4);
        // (2 + 4) / 2, not / 4
        assert_eq!(out[3], Some(3.0));
    }

    #[test]
    fn sma_all_invalid_window_is_none() {
        let data = vec![Some(1.0), None, None, None];
        let out = sma(&data, 3);
        assert_eq!(out[2], Some(1.0));
        assert_eq!(out[3], None);
    }

    #[test]
    fn sma_zero_window_or_empty_input() {
        assert!(sma(&[1.0, 2.0], 0).is_empty());
        assert!(sma::<f64>(&[], 5).is_empty());
    }

    #[test]
    fn sma_window_longer_than_series() {
        let out = sma(&[1.0, 2.0, 3.0], 5);
        assert_eq!(out, vec![None, None, None]);
    }

    #[test]
    fn sma_is_idempotent() {
        let data: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64).cos()).collect();
        let a = sma(&data, 20);
        let b = sma(&data, 20);
        assert_eq!(a, b);
    }
}
