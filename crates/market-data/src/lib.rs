//! # Market Data
//!
//! Historical price retrieval. [`PriceProvider`] is the seam every engine
//! depends on; [`YahooClient`] implements it over HTTP and
//! [`CachedPriceProvider`] wraps any provider with a TTL cache.

pub mod cache;
pub mod error;
pub mod provider;
pub mod responses;
pub mod yahoo;

pub use cache::CachedPriceProvider;
pub use error::MarketDataError;
pub use provider::PriceProvider;
pub use yahoo::{YahooClient, parse_chart};
