// =============================================================================
// Setup Scanner: technical-indicator pattern scanner
// =============================================================================
//
// Layers, bottom-up:
//   indicators   series maths (SMA, LSMA, Bollinger, OBV, DMI)
//   patterns     named setups evaluated on the latest bar
//   simulation   what-if readings for a hypothetical next day
//   market_data  bars and the chart feed client
//   scanner      one rule over a ticker universe
// =============================================================================

pub mod indicators;
pub mod market_data;
pub mod patterns;
pub mod runtime_config;
pub mod scanner;
pub mod simulation;
pub mod types;

pub use market_data::Bar;
pub use patterns::{evaluate, evaluate_bars, MatchVerdict, RuleParams};
pub use types::{ScanMode, SortMode};
