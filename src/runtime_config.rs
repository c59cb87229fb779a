// =============================================================================
// Runtime Configuration: scanner settings with atomic save
// =============================================================================
//
// Ticker universe, default scan/sort modes, fetch pacing and rule parameters.
// Every field carries a serde default so an older or partial config file
// still loads; an empty `{}` is a valid config.
//
// Persistence uses tmp + rename so a crash mid-write leaves the previous file
// intact.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::market_data::yahoo::DEFAULT_BASE_URL;
use crate::patterns::{RuleParams, MIN_PRICE_POINTS};
use crate::types::{ScanMode, SortMode};

// =============================================================================
// Default-value helpers
// =============================================================================

fn default_symbols() -> Vec<TickerEntry> {
    [
        ("2330.TW", "TSMC"),
        ("2317.TW", "Hon Hai"),
        ("2454.TW", "MediaTek"),
        ("2308.TW", "Delta Electronics"),
        ("2881.TW", "Fubon Financial"),
        ("2882.TW", "Cathay Financial"),
        ("2412.TW", "Chunghwa Telecom"),
        ("1301.TW", "Formosa Plastics"),
        ("2002.TW", "China Steel"),
        ("3711.TW", "ASE Technology"),
    ]
    .into_iter()
    .map(|(code, name)| TickerEntry::new(code, name))
    .collect()
}

fn default_history_range() -> String {
    "1y".to_string()
}

fn default_history_interval() -> String {
    "1d".to_string()
}

fn default_chart_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_request_delay_ms() -> u64 {
    300
}

fn default_min_data_points() -> usize {
    MIN_PRICE_POINTS
}

// =============================================================================
// TickerEntry
// =============================================================================

/// One ticker in the scan universe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    /// Feed symbol, e.g. `2330.TW`.
    pub code: String,
    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,
}

impl TickerEntry {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// ScannerConfig
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    // --- Universe -----------------------------------------------------------

    /// Tickers scanned in order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<TickerEntry>,

    // --- Modes --------------------------------------------------------------

    /// Rule applied when none is given on the command line.
    #[serde(default)]
    pub mode: ScanMode,

    /// Ordering of the printed hits.
    #[serde(default)]
    pub sort: SortMode,

    // --- Fetching -----------------------------------------------------------

    /// History window requested per ticker (e.g. `1y`).
    #[serde(default = "default_history_range")]
    pub history_range: String,

    /// Bar size (e.g. `1d`).
    #[serde(default = "default_history_interval")]
    pub history_interval: String,

    #[serde(default = "default_chart_base_url")]
    pub chart_base_url: String,

    /// Pause between consecutive ticker requests.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Histories shorter than this are skipped without evaluation.
    #[serde(default = "default_min_data_points")]
    pub min_data_points: usize,

    // --- Rules --------------------------------------------------------------

    #[serde(default)]
    pub rule_params: RuleParams,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            mode: ScanMode::default(),
            sort: SortMode::default(),
            history_range: default_history_range(),
            history_interval: default_history_interval(),
            chart_base_url: default_chart_base_url(),
            request_delay_ms: default_request_delay_ms(),
            min_data_points: default_min_data_points(),
            rule_params: RuleParams::default(),
        }
    }
}

impl ScannerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing file is an error; the caller decides whether to fall back
    /// to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scanner config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse scanner config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            mode = %config.mode,
            sort = %config.sort,
            "scanner config loaded"
        );

        Ok(config)
    }

    /// Persist to `path` via a `.tmp` sibling and a rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise scanner config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "scanner config saved (atomic)");
        Ok(())
    }

    /// Replace the universe with bare codes, e.g. from a comma-separated
    /// override.  Blank entries are ignored.
    pub fn set_symbols_from_list(&mut self, list: &str) {
        self.symbols = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|code| TickerEntry::new(code, ""))
            .collect();
    }
}
