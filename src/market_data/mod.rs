pub mod bar;
pub mod yahoo;

// Re-export for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::Bar;
pub use yahoo::ChartClient;
