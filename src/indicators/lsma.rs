// =============================================================================
// Least-Squares Moving Average (LSMA)
// =============================================================================
//
// For each bar, fit an ordinary least-squares line y = m*x + b over the last
// `window` points (x = 0 .. window-1, oldest first) and evaluate it at the
// newest point, x = window - 1.
//
// Only valid points take part in the fit.  The result is `None` when fewer
// than two valid points remain or when the regression denominator
//   count * Σx² - (Σx)²
// collapses below `DEGENERATE_EPS`.
// =============================================================================

use super::{finite, Sample, Series};

/// Denominators below this magnitude are treated as a degenerate fit.
const DEGENERATE_EPS: f64 = 1e-6;

/// Compute the LSMA series for `data` over `window` bars.
///
/// Returns an empty `Vec` when `window < 2` (a line needs two points) or when
/// `data` is empty.
pub fn lsma<T: Sample>(data: &[T], window: usize) -> Series {
    if window < 2 || data.is_empty() {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(data.len());
    for i in 0..data.len() {
        if i + 1 < window {
            out.push(None);
            continue;
        }
        out.push(project(&data[i + 1 - window..=i]));
    }
    out
}

/// Fit the window and project the line to its last x position.
fn project<T: Sample>(window: &[T]) -> Option<f64> {
    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_x2 = 0.0;
    let mut count = 0usize;

    for (j, sample) in window.iter().enumerate() {
        if let Some(y) = sample.value() {
            let x = j as f64;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
            count += 1;
        }
    }

    if count < 2 {
        return None;
    }

    let n = count as f64;
    let denominator = n * sum_x2 - sum_x * sum_x;
    if denominator.abs() < DEGENERATE_EPS {
        return None;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / denominator;
    let intercept = (sum_y - slope * sum_x) / n;

    finite(slope * (window.len() - 1) as f64 + intercept)
}
