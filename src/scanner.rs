// =============================================================================
// Scan orchestration: one rule over a ticker universe
// =============================================================================
//
// `ScanSession` owns everything a scan produces: the hits, the counters and
// the active ordering.  `run_scan` drives it sequentially from the chart
// client with a fixed pause between requests; a ticker that fails to fetch
// is logged and skipped, never fatal.
// =============================================================================

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::market_data::{Bar, ChartClient};
use crate::patterns::{self, RuleParams, MIN_PRICE_POINTS};
use crate::runtime_config::ScannerConfig;
use crate::types::{ScanMode, SortMode};

// =============================================================================
// ScanHit
// =============================================================================

/// A ticker that matched the active rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanHit {
    pub code: String,
    pub name: String,
    pub close_price: f64,
    /// Last close versus the one before, in percent.
    pub change_percent: f64,
    /// Breakout rule only: smallest next-day rise that completes the stack.
    pub min_required_percent: Option<f64>,
    /// Leading numeric part of `code`, for code ordering.
    pub code_number: u64,
    pub last_bar: Bar,
}

impl fmt::Display for ScanHit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let date = self
            .last_bar
            .date()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        write!(
            f,
            "{:<10} {:<18} {} {:>10.2} {:>+7.2}%",
            self.code, self.name, date, self.close_price, self.change_percent
        )?;
        if let Some(pct) = self.min_required_percent {
            write!(f, "  needs +{pct:.1}%")?;
        }
        Ok(())
    }
}

/// First run of ASCII digits in `code`, or 0 when there is none (or it does
/// not fit a `u64`).
pub fn extract_code_number(code: &str) -> u64 {
    code.split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())
        .and_then(|run| run.parse().ok())
        .unwrap_or(0)
}

/// Day-over-day change of the last two bars in percent; 0 when there is no
/// usable previous close.
pub fn change_percent(bars: &[Bar]) -> f64 {
    match bars {
        [.., prev, last] if prev.close != 0.0 => (last.close - prev.close) / prev.close * 100.0,
        _ => 0.0,
    }
}

fn compare_hits(sort: SortMode, a: &ScanHit, b: &ScanHit) -> Ordering {
    match sort {
        SortMode::Code => a
            .code_number
            .cmp(&b.code_number)
            .then_with(|| a.code.cmp(&b.code)),
        SortMode::Change => b.change_percent.total_cmp(&a.change_percent),
        SortMode::Price => b.close_price.total_cmp(&a.close_price),
    }
}

// =============================================================================
// ScanSession
// =============================================================================

/// Results and counters of one scan.
#[derive(Debug, Clone)]
pub struct ScanSession {
    pub mode: ScanMode,
    pub sort: SortMode,
    params: RuleParams,
    min_data_points: usize,

    /// Histories that were evaluated.
    pub scanned: usize,
    /// Histories that matched.
    pub matched: usize,
    /// Histories too short to evaluate.
    pub skipped: usize,
    /// Tickers whose fetch failed.
    pub failed: usize,

    hits: Vec<ScanHit>,
}

impl ScanSession {
    pub fn new(mode: ScanMode) -> Self {
        Self::with_params(mode, RuleParams::default(), MIN_PRICE_POINTS)
    }

    /// Session with explicit rule parameters and minimum history length.
    ///
    /// A minimum below the rules' own floor is raised to it.
    pub fn with_params(mode: ScanMode, params: RuleParams, min_data_points: usize) -> Self {
        Self {
            mode,
            sort: SortMode::default(),
            params,
            min_data_points: min_data_points.max(MIN_PRICE_POINTS),
            scanned: 0,
            matched: 0,
            skipped: 0,
            failed: 0,
            hits: Vec::new(),
        }
    }

    /// Evaluate the session's rule on one ticker's history and record a hit
    /// on a match.  Bars with a non-finite close are ignored.
    ///
    /// Returns whether the ticker matched.
    pub fn evaluate_history(&mut self, code: &str, name: &str, bars: &[Bar]) -> bool {
        let bars: Vec<Bar> = bars.iter().filter(|b| b.close.is_finite()).cloned().collect();

        if bars.len() < self.min_data_points {
            debug!(
                symbol = code,
                bars = bars.len(),
                need = self.min_data_points,
                "history too short, skipped"
            );
            self.skipped += 1;
            return false;
        }

        self.scanned += 1;
        let verdict = patterns::evaluate_bars(&bars, self.mode, &self.params);
        if !verdict.is_match {
            return false;
        }

        let Some(last_bar) = bars.last().cloned() else {
            return false;
        };

        let hit = ScanHit {
            code: code.to_string(),
            name: name.to_string(),
            close_price: last_bar.close,
            change_percent: change_percent(&bars),
            min_required_percent: verdict.auxiliary,
            code_number: extract_code_number(code),
            last_bar,
        };
        info!(
            symbol = code,
            close = hit.close_price,
            change_pct = hit.change_percent,
            mode = %self.mode,
            "match"
        );

        self.matched += 1;
        self.hits.push(hit);
        true
    }

    /// Change the ordering used by [`sorted`](Self::sorted).
    pub fn sort_by(&mut self, sort: SortMode) {
        self.sort = sort;
    }

    /// Hits in the active ordering.
    pub fn sorted(&self) -> Vec<&ScanHit> {
        let mut out: Vec<&ScanHit> = self.hits.iter().collect();
        out.sort_by(|a, b| compare_hits(self.sort, a, b));
        out
    }

    /// Hits in the order they were found.
    pub fn hits(&self) -> &[ScanHit] {
        &self.hits
    }
}

// =============================================================================
// Driver
// =============================================================================

/// Fetch and evaluate every ticker in `config.symbols` against `mode`.
pub async fn run_scan(client: &ChartClient, config: &ScannerConfig, mode: ScanMode) -> ScanSession {
    let mut session =
        ScanSession::with_params(mode, config.rule_params.clone(), config.min_data_points);
    session.sort_by(config.sort);

    let delay = Duration::from_millis(config.request_delay_ms);
    info!(mode = %mode, tickers = config.symbols.len(), "scan started");

    for (i, ticker) in config.symbols.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match client.fetch_history(&ticker.code).await {
            Ok(bars) => {
                session.evaluate_history(&ticker.code, &ticker.name, &bars);
            }
            Err(e) => {
                session.failed += 1;
                warn!(symbol = %ticker.code, error = %e, "fetch failed, skipping");
            }
        }
    }

    info!(
        mode = %mode,
        scanned = session.scanned,
        matched = session.matched,
        skipped = session.skipped,
        failed = session.failed,
        "scan finished"
    );
    session
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::tests::pre_breakout;
    use crate::runtime_config::TickerEntry;

    fn history(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar {
                timestamp: 1_700_000_000 + i as i64 * 86_400,
                open: Some(c),
                high: Some(c * 1.005),
                low: Some(c * 0.995),
                close: c,
                volume: Some(1_000.0),
            })
            .collect()
    }

    fn convex() -> Vec<f64> {
        (0..40).map(|i| 100.0 + 0.05 * (i * i) as f64).collect()
    }

    fn hit(code: &str, close: f64, change: f64) -> ScanHit {
        ScanHit {
            code: code.to_string(),
            name: String::new(),
            close_price: close,
            change_percent: change,
            min_required_percent: None,
            code_number: extract_code_number(code),
            last_bar: history(&[close]).remove(0),
        }
    }

    #[test]
    fn code_numbers() {
        assert_eq!(extract_code_number("2330.TW"), 2330);
        assert_eq!(extract_code_number("0050.TW"), 50);
        assert_eq!(extract_code_number("AB12CD34"), 12);
        assert_eq!(extract_code_number("AAPL"), 0);
        assert_eq!(extract_code_number("99999999999999999999999"), 0);
    }

    #[test]
    fn change_from_last_two_bars() {
        let bars = history(&[100.0, 102.0]);
        assert!((change_percent(&bars) - 2.0).abs() < 1e-9);
        assert_eq!(change_percent(&history(&[0.0, 5.0])), 0.0);
        assert_eq!(change_percent(&history(&[5.0])), 0.0);
    }

    #[test]
    fn session_records_match() {
        let mut session = ScanSession::new(ScanMode::BullishStack);
        assert!(session.evaluate_history("2330.TW", "TSMC", &history(&convex())));
        assert!(!session.evaluate_history("2317.TW", "Hon Hai", &history(&pre_breakout(0.726))));

        assert_eq!(session.scanned, 2);
        assert_eq!(session.matched, 1);
        let hit = &session.hits()[0];
        assert_eq!(hit.code_number, 2330);
        assert_eq!(hit.close_price, convex()[39]);
        assert_eq!(hit.min_required_percent, None);
    }

    #[test]
    fn breakout_hit_carries_required_rise() {
        let mut session = ScanSession::new(ScanMode::BreakoutPrediction);
        assert!(session.evaluate_history("1101.TW", "", &history(&pre_breakout(0.726))));
        assert_eq!(session.hits()[0].min_required_percent, Some(1.0));
        assert!(session.hits()[0].to_string().contains("needs +1.0%"));
    }

    #[test]
    fn hit_line_shows_last_bar_date() {
        let line = hit("2330.TW", 1000.0, 1.25).to_string();
        assert!(line.starts_with("2330.TW"));
        assert!(line.contains("2023-11-14"));
        assert!(line.contains("+1.25%"));
        assert!(!line.contains("needs"));
    }

    #[test]
    fn short_and_invalid_histories_are_skipped() {
        let mut session = ScanSession::new(ScanMode::BullishStack);
        let mut bars = history(&convex()[..31]);
        for b in bars.iter_mut().take(5) {
            b.close = f64::NAN;
        }
        assert!(!session.evaluate_history("9999.TW", "", &bars));
        assert_eq!(session.skipped, 1);
        assert_eq!(session.scanned, 0);
    }

    #[test]
    fn minimum_history_is_never_below_rule_floor() {
        let mut session = ScanSession::with_params(ScanMode::BullishStack, RuleParams::default(), 5);
        assert!(!session.evaluate_history("1.TW", "", &history(&convex()[..20])));
        assert_eq!(session.skipped, 1);
    }

    #[test]
    fn sort_orders() {
        let mut session = ScanSession::new(ScanMode::BullishStack);
        session.hits = vec![
            hit("2454.TW", 900.0, 1.5),
            hit("0050.TW", 150.0, -0.5),
            hit("2330.TW", 1000.0, 3.0),
            hit("2330.TWO", 50.0, 0.0),
        ];

        let codes = |s: &ScanSession| s.sorted().iter().map(|h| h.code.clone()).collect::<Vec<_>>();

        assert_eq!(codes(&session), ["0050.TW", "2330.TW", "2330.TWO", "2454.TW"]);

        session.sort_by(SortMode::Change);
        assert_eq!(codes(&session), ["2330.TW", "2454.TW", "2330.TWO", "0050.TW"]);

        session.sort_by(SortMode::Price);
        assert_eq!(codes(&session), ["2330.TW", "2454.TW", "0050.TW", "2330.TWO"]);

        // Insertion order is untouched.
        assert_eq!(session.hits()[0].code, "2454.TW");
    }

    #[tokio::test]
    async fn unreachable_feed_counts_failures() {
        let client = ChartClient::new("http://127.0.0.1:9", "1y", "1d").unwrap();
        let config = ScannerConfig {
            symbols: vec![TickerEntry::new("2330.TW", "TSMC"), TickerEntry::new("2317.TW", "")],
            request_delay_ms: 0,
            ..ScannerConfig::default()
        };
        let session = run_scan(&client, &config, ScanMode::BullishStack).await;
        assert_eq!(session.failed, 2);
        assert_eq!(session.scanned, 0);
        assert!(session.sorted().is_empty());
    }
}
