use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One trading day of OHLCV data.
///
/// `close` is always present and finite; the other fields may be missing in
/// the upstream feed and are only needed by some indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Unix seconds.
    pub timestamp: i64,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

impl Bar {
    /// Calendar date of the bar (UTC).
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp(self.timestamp, 0).map(|dt| dt.date_naive())
    }

    /// Build the hypothetical next-day bar closing at `close`.
    ///
    /// It opens at this bar's close, spans both prices, trades no volume and
    /// is stamped one calendar day later.
    pub fn next_day(&self, close: f64) -> Bar {
        Bar {
            timestamp: self.timestamp + Duration::days(1).num_seconds(),
            open: Some(self.close),
            high: Some(self.close.max(close)),
            low: Some(self.close.min(close)),
            close,
            volume: Some(0.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Column views
// ---------------------------------------------------------------------------

pub fn closes(bars: &[Bar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

pub fn highs(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.high).collect()
}

pub fn lows(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.low).collect()
}

pub fn volumes(bars: &[Bar]) -> Vec<Option<f64>> {
    bars.iter().map(|b| b.volume).collect()
}

/// True when any bar carries a usable high and low.  Isolated gaps are
/// left to the indicators; only a feed without range data at all needs a
/// synthetic one.
pub fn has_range_data(bars: &[Bar]) -> bool {
    bars.iter().any(|b| {
        matches!((b.high, b.low), (Some(h), Some(l)) if h.is_finite() && l.is_finite())
    })
}

/// Drop bars whose close is not a finite number.
pub fn retain_valid(bars: Vec<Bar>) -> Vec<Bar> {
    bars.into_iter().filter(|b| b.close.is_finite()).collect()
}
