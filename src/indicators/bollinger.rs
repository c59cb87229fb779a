// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the population standard deviation
// of the valid values in the same window.

use super::sma::sma;
use super::{finite, Sample, Series};

/// Default look-back for the middle band.
pub const DEFAULT_PERIOD: usize = 20;

/// Default band width in standard deviations.
pub const DEFAULT_NUM_STD: f64 = 2.0;

/// Three aligned band series from one computation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BollingerBands {
    pub upper: Series,
    pub mid: Series,
    pub lower: Series,
}

/// Calculate Bollinger Bands for `data`.
///
/// - `mid`   = SMA(`period`)
/// - `upper` = mid + `num_std` * σ
/// - `lower` = mid - `num_std` * σ
///
/// `upper`/`lower` are `None` wherever the window has fewer than two valid
/// points or `mid` is `None`.  Empty input or `period == 0` yields three empty
/// series.
pub fn bollinger<T: Sample>(data: &[T], period: usize, num_std: f64) -> BollingerBands {
    if period == 0 || data.is_empty() {
        return BollingerBands::default();
    }

    let mid = sma(data, period);
    let mut upper = Vec::with_capacity(data.len());
    let mut lower = Vec::with_capacity(data.len());

    for (i, m) in mid.iter().enumerate() {
        let Some(m) = *m else {
            upper.push(None);
            lower.push(None);
            continue;
        };

        let mut sq = 0.0;
        let mut count = 0usize;
        for sample in &data[i + 1 - period..=i] {
            if let Some(v) = sample.value() {
                sq += (v - m).powi(2);
                count += 1;
            }
        }

        if count < 2 {
            upper.push(None);
            lower.push(None);
            continue;
        }

        let std_dev = (sq / count as f64).sqrt();
        upper.push(finite(m + num_std * std_dev));
        lower.push(finite(m - num_std * std_dev));
    }

    BollingerBands { upper, mid, lower }
}
