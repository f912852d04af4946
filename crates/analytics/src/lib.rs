//! # Analytics
//!
//! Performance and risk metrics for strategy and portfolio backtests.
//!
//! - **Pure functions:** everything in [`metrics`] is a stateless function over
//!   `f64` slices with a documented convention for degenerate input.
//! - **Injected capability:** [`MetricsProvider`] is what the backtesting
//!   engines depend on; [`AnalyticsEngine`] is the standard implementation.

pub mod engine;
pub mod error;
pub mod metrics;
pub mod report;

pub use engine::{AnalyticsEngine, MetricsProvider};
pub use error::AnalyticsError;
pub use report::MetricsReport;
