//! # Portfolio Backtester
//!
//! Multi-asset portfolio analysis: weight assignment, periodic rebalancing,
//! return aggregation, risk metrics and correlation.
//!
//! The [`PortfolioManager`] receives its price provider and metrics
//! capability at construction; everything below it is a pure function.

pub mod backtest;
pub mod correlation;
pub mod data_handler;
pub mod error;
pub mod manager;
pub mod rebalance;
pub mod weights;

pub use backtest::{PortfolioBacktest, backtest_portfolio};
pub use correlation::CorrelationMatrix;
pub use data_handler::{MIN_ASSETS, ReturnTable, compute_returns, load_and_prepare_data};
pub use error::PortfolioError;
pub use manager::{PortfolioManager, PortfolioOutcome, PortfolioRequest};
pub use rebalance::{rebalance_dates, rebalance_indices};
pub use weights::{WeightSchedule, WeightScheme, equal_weights, normalize_weights};
