//! # Strategy Library
//!
//! Single-asset signal generation and the lagged backtest that turns signals
//! into an equity curve.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O. Depends on `core-types`, `analytics` and
//!   `configuration` only.
//! - **Strategy agnostic backtest:** [`run_backtest`] works on any
//!   [`Strategy`], so adding a model means a new module, a `StrategyId`
//!   variant and a line in the [`factory`].
//! - **Advisory regime:** [`EfficiencyRatio`] suggests a strategy but never
//!   picks one by itself.

pub mod adx;
pub mod backtest;
pub mod error;
pub mod factory;
pub mod indicators;
pub mod momentum;
pub mod regime;

pub use adx::{DirectionalIndicators, DirectionalMovement};
pub use backtest::{BacktestResult, run_backtest};
pub use error::StrategyError;
pub use factory::create_strategy;
pub use indicators::WilderSmoother;
pub use momentum::SmaCrossover;
pub use regime::{EfficiencyRatio, Regime, RegimeAssessment};

// Re-export StrategyId from core_types
pub use core_types::StrategyId;

use core_types::PriceInput;

/// Per-bar exposure produced by a strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    /// One value in `{0.0, 1.0}` per input bar.
    pub signals: Vec<f64>,
    /// Index of the first bar whose signal rests on fully defined indicators.
    pub warmup: usize,
}

/// The core trait that all strategies implement.
///
/// `generate_signals` must be causal: the signal at bar `t` may only depend
/// on bars `..=t`. The `Send + Sync` bounds let the web server share boxed
/// strategies across request tasks.
pub trait Strategy: Send + Sync {
    fn id(&self) -> StrategyId;

    fn generate_signals(&self, input: &PriceInput) -> Result<SignalFrame, StrategyError>;
}
