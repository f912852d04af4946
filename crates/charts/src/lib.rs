//! # Charts
//!
//! Plotly-compatible JSON figures for the dashboard, with the light and dark
//! palettes applied.

pub mod figure;
pub mod plots;
pub mod theme;

pub use figure::Figure;
pub use plots::{
    correlation_heatmap, drawdown_chart, performance_chart, portfolio_value_chart, prices_chart,
};
pub use theme::{ThemeMode, apply_theme};
