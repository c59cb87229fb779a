// =============================================================================
// Setup Scanner: Main Entry Point
// =============================================================================
//
// Loads the scanner config, applies environment overrides, runs one scan and
// prints the hits in the configured order.
//
// Environment:
//   SCANNER_CONFIG        config path (default scanner_config.json)
//   SCANNER_MODE          rule tag A..H
//   SCANNER_SORT          code | change | price
//   SCANNER_SYMBOLS       comma-separated ticker codes
//   SCANNER_WHATIF_PCT    also print next-day readings for each hit
//   RUST_LOG              tracing filter (default info)
// =============================================================================

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use setup_scanner::market_data::ChartClient;
use setup_scanner::runtime_config::ScannerConfig;
use setup_scanner::scanner::{self, ScanHit};
use setup_scanner::simulation::{self, Reading, Trend};
use setup_scanner::{ScanMode, SortMode};

const DEFAULT_CONFIG_PATH: &str = "scanner_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("SCANNER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

    let mut config = ScannerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        ScannerConfig::default()
    });

    // ── 2. Overrides ─────────────────────────────────────────────────────
    if let Ok(tag) = std::env::var("SCANNER_MODE") {
        match ScanMode::from_tag(&tag) {
            Some(mode) => config.mode = mode,
            None => warn!(value = %tag, "unknown SCANNER_MODE, keeping {}", config.mode),
        }
    }
    if let Ok(s) = std::env::var("SCANNER_SORT") {
        match SortMode::parse(&s) {
            Some(sort) => config.sort = sort,
            None => warn!(value = %s, "unknown SCANNER_SORT, keeping {}", config.sort),
        }
    }
    if let Ok(list) = std::env::var("SCANNER_SYMBOLS") {
        config.set_symbols_from_list(&list);
    }
    let whatif_pct = std::env::var("SCANNER_WHATIF_PCT")
        .ok()
        .and_then(|v| v.trim().parse::<f64>().ok());

    if config.symbols.is_empty() {
        warn!("no symbols configured, nothing to scan");
        return Ok(());
    }

    info!(
        mode = %config.mode,
        sort = %config.sort,
        tickers = config.symbols.len(),
        range = %config.history_range,
        "Setup Scanner starting"
    );

    // ── 3. Scan ──────────────────────────────────────────────────────────
    let client = ChartClient::new(
        config.chart_base_url.as_str(),
        config.history_range.as_str(),
        config.history_interval.as_str(),
    )?;

    let session = scanner::run_scan(&client, &config, config.mode).await;

    // ── 4. Report ────────────────────────────────────────────────────────
    println!(
        "{} | scanned {} | matched {} | skipped {} | failed {} | sort {}",
        session.mode, session.scanned, session.matched, session.skipped, session.failed, session.sort
    );
    for hit in session.sorted() {
        println!("{hit}");
        if let Some(pct) = whatif_pct {
            print_whatif(&client, hit, pct, &config).await;
        }
    }

    Ok(())
}

async fn print_whatif(client: &ChartClient, hit: &ScanHit, pct: f64, config: &ScannerConfig) {
    let bars = match client.fetch_history(&hit.code).await {
        Ok(bars) => bars,
        Err(e) => {
            warn!(symbol = %hit.code, error = %e, "what-if refetch failed");
            return;
        }
    };
    let Some(snap) = simulation::simulate_next_day(&bars, pct, &config.rule_params) else {
        return;
    };
    println!(
        "    next day {:+.2}% -> {:.2} | LSMA9 {} | LSMA25 {} | BB mid {} | OBV {} | +DI {} | ADX {}",
        snap.pct,
        snap.bar.close,
        fmt_reading(&snap.lsma_fast),
        fmt_reading(&snap.lsma_slow),
        fmt_reading(&snap.bb_mid),
        fmt_reading(&snap.obv),
        fmt_reading(&snap.plus_di),
        fmt_reading(&snap.adx),
    );
}

fn fmt_reading(r: &Reading) -> String {
    match (r.value, r.trend) {
        (Some(v), Some(Trend::Up)) => format!("{v:.2} up"),
        (Some(v), Some(Trend::Down)) => format!("{v:.2} down"),
        (Some(v), None) => format!("{v:.2}"),
        (None, _) => "-".to_string(),
    }
}
