// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators the scanner rules
// are built on.  Every function returns a full `Series` aligned with its
// input: positions that cannot be computed (short look-back, invalid data,
// degenerate maths) are `None`, never `NaN`.

pub mod bollinger;
pub mod dmi;
pub mod lsma;
pub mod obv;
pub mod sma;

pub use bollinger::{bollinger, BollingerBands};
pub use dmi::{dmi, DmiResult, DmiSnapshot};
pub use lsma::lsma;
pub use obv::obv;
pub use sma::sma;

/// A derived indicator series, index-aligned with the input it came from.
pub type Series = Vec<Option<f64>>;

/// One input sample.  Prices arrive as plain `f64`, derived series (e.g. OBV)
/// as `Option<f64>`; both feed the same window maths.
pub trait Sample {
    /// The sample as a usable number, or `None` when missing or non-finite.
    fn value(&self) -> Option<f64>;
}

impl Sample for f64 {
    fn value(&self) -> Option<f64> {
        finite(*self)
    }
}

impl Sample for Option<f64> {
    fn value(&self) -> Option<f64> {
        self.and_then(finite)
    }
}

/// Normalise a computed value: non-finite results become `None`.
pub(crate) fn finite(v: f64) -> Option<f64> {
    if v.is_finite() {
        Some(v)
    } else {
        None
    }
}

/// Value `back` positions before the last element (`0` = last element).
pub(crate) fn from_end(series: &[Option<f64>], back: usize) -> Option<f64> {
    let len = series.len();
    if back >= len {
        return None;
    }
    series[len - 1 - back]
}
