//! # Core Types
//!
//! The shared vocabulary of the workspace: price series, price tables and the
//! request enums every other crate speaks. Pure data, no I/O.

pub mod enums;
pub mod error;
pub mod series;
pub mod table;

// Re-export the core types to provide a clean public API.
pub use enums::{Interval, Period, PriceRange, RebalanceFrequency, StrategyId, WeightMode};
pub use error::CoreError;
pub use series::{OhlcSeries, PriceInput, PriceSeries, ReturnSeries};
pub use table::{Bar, PriceTable, SymbolHistory};

use serde::{Deserialize, Serialize};

/// What to ask the price provider for. Also the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRequest {
    pub symbols: Vec<String>,
    pub range: PriceRange,
    pub interval: Interval,
}

impl PriceRequest {
    pub fn new(symbols: Vec<String>, range: PriceRange, interval: Interval) -> Self {
        Self { symbols, range, interval }
    }
}

/// Splits a comma-separated ticker list, trimming and upper-casing each entry.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}
