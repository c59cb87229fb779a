// =============================================================================
// Pattern Evaluator: named setups over the latest bars
// =============================================================================
//
// Every entry point is a pure function of its input window and returns a
// `MatchVerdict`.  Insufficient or unusable data is a plain non-match; nothing
// here returns an error or panics, so a scan over a large universe simply
// skips what cannot be computed.
//
// Minimum history:
//   - 30 closes for every rule evaluated through `evaluate*`
//   - 29 bars for the DMI rules when called directly
//   - 60 bars for the OBV rule
// =============================================================================

pub mod breakout;
pub mod directional;
pub mod trend;
pub mod volume;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::indicators::{dmi, obv, Sample};
use crate::market_data::bar::{self, Bar};
use crate::types::ScanMode;

pub use breakout::BreakoutSearch;
pub use directional::DmiRule;

/// Minimum closes for any rule.
pub const MIN_PRICE_POINTS: usize = 30;

/// Minimum bars for the DMI rules.
pub const MIN_DMI_POINTS: usize = 29;

/// Minimum bars for the OBV rule.
pub const MIN_OBV_POINTS: usize = 60;

// =============================================================================
// MatchVerdict
// =============================================================================

/// Outcome of one (ticker, rule) evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchVerdict {
    pub is_match: bool,
    /// Rule-specific extra value; only the breakout rule sets it (minimum
    /// next-day rise in percent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auxiliary: Option<f64>,
}

impl MatchVerdict {
    pub fn no_match() -> Self {
        Self::default()
    }

    pub fn matched() -> Self {
        Self {
            is_match: true,
            auxiliary: None,
        }
    }

    pub fn matched_with(auxiliary: f64) -> Self {
        Self {
            is_match: true,
            auxiliary: Some(auxiliary),
        }
    }

    /// Match iff `cond` is `Some(true)`.
    pub fn from_check(cond: Option<bool>) -> Self {
        if cond == Some(true) {
            Self::matched()
        } else {
            Self::no_match()
        }
    }
}

// =============================================================================
// RuleParams
// =============================================================================

fn default_obv_lookback() -> usize {
    obv::DEFAULT_LOOKBACK
}

fn default_dmi_period() -> usize {
    dmi::DEFAULT_PERIOD
}

/// Tunable inputs shared by the rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleParams {
    /// OBV accumulation window in bars.
    #[serde(default = "default_obv_lookback")]
    pub obv_lookback: usize,

    /// Wilder period for the DMI rules.
    #[serde(default = "default_dmi_period")]
    pub dmi_period: usize,

    /// Candidate next-day moves for the breakout rule.
    #[serde(default)]
    pub breakout: BreakoutSearch,
}

impl Default for RuleParams {
    fn default() -> Self {
        Self {
            obv_lookback: default_obv_lookback(),
            dmi_period: default_dmi_period(),
            breakout: BreakoutSearch::default(),
        }
    }
}

// =============================================================================
// Entry points
// =============================================================================

/// Evaluate `mode` against a close-only history with default parameters.
///
/// The DMI rules fall back to a synthetic ±1% high/low range here; the OBV
/// rule needs volume and never matches on closes alone.
pub fn evaluate(closes: &[f64], mode: ScanMode) -> MatchVerdict {
    evaluate_with(closes, mode, &RuleParams::default())
}

/// [`evaluate`] with explicit parameters.
pub fn evaluate_with(closes: &[f64], mode: ScanMode, params: &RuleParams) -> MatchVerdict {
    if closes.len() < MIN_PRICE_POINTS {
        debug!(
            mode = %mode,
            closes = closes.len(),
            "insufficient history (need >= {MIN_PRICE_POINTS})"
        );
        return MatchVerdict::no_match();
    }

    match mode {
        ScanMode::FastReversal => MatchVerdict::from_check(trend::fast_reversal(closes)),
        ScanMode::SlowReversal => MatchVerdict::from_check(trend::slow_reversal(closes)),
        ScanMode::BullishStack => MatchVerdict::from_check(trend::bullish_stack(closes)),
        ScanMode::FirstBullishDay => MatchVerdict::from_check(trend::first_bullish_day(closes)),
        ScanMode::BreakoutPrediction => breakout::predict(closes, &params.breakout),
        ScanMode::DmiBullish | ScanMode::DmiBullishStrict => {
            let (highs, lows) = dmi::synthetic_range(closes);
            evaluate_dmi(&highs, &lows, closes, dmi_rule(mode), params.dmi_period)
        }
        ScanMode::ObvReversal => {
            debug!("OBV rule needs volume; use evaluate_obv or evaluate_bars");
            MatchVerdict::no_match()
        }
    }
}

/// Evaluate a DMI rule on genuine high/low/close data.
pub fn evaluate_dmi<H: Sample, L: Sample>(
    highs: &[H],
    lows: &[L],
    closes: &[f64],
    rule: DmiRule,
    period: usize,
) -> MatchVerdict {
    if closes.len() < MIN_DMI_POINTS {
        debug!(bars = closes.len(), "DMI rule: insufficient history");
        return MatchVerdict::no_match();
    }
    MatchVerdict::from_check(directional::check(highs, lows, closes, rule, period))
}

/// Evaluate the OBV reversal rule.
pub fn evaluate_obv(closes: &[f64], volumes: &[Option<f64>], lookback: usize) -> MatchVerdict {
    if closes.len() < MIN_OBV_POINTS {
        debug!(bars = closes.len(), "OBV rule: insufficient history");
        return MatchVerdict::no_match();
    }
    MatchVerdict::from_check(volume::obv_reversal(closes, volumes, lookback))
}

/// Evaluate `mode` against full bars, using genuine high/low/volume where
/// the rule needs them.
///
/// The DMI rules use the bars' own high/low, gaps included, whenever the
/// history carries any; the synthetic ±1% range only stands in when none do.
pub fn evaluate_bars(bars: &[Bar], mode: ScanMode, params: &RuleParams) -> MatchVerdict {
    let closes = bar::closes(bars);
    if closes.len() < MIN_PRICE_POINTS {
        debug!(mode = %mode, bars = bars.len(), "insufficient history");
        return MatchVerdict::no_match();
    }

    match mode {
        ScanMode::DmiBullish | ScanMode::DmiBullishStrict => {
            if bar::has_range_data(bars) {
                evaluate_dmi(
                    &bar::highs(bars),
                    &bar::lows(bars),
                    &closes,
                    dmi_rule(mode),
                    params.dmi_period,
                )
            } else {
                debug!(mode = %mode, "no genuine high/low, using synthetic range");
                evaluate_with(&closes, mode, params)
            }
        }
        ScanMode::ObvReversal => evaluate_obv(&closes, &bar::volumes(bars), params.obv_lookback),
        _ => evaluate_with(&closes, mode, params),
    }
}

fn dmi_rule(mode: ScanMode) -> DmiRule {
    if mode == ScanMode::DmiBullishStrict {
        DmiRule::BullishStrict
    } else {
        DmiRule::Bullish
    }
}
