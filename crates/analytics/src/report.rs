use serde::{Deserialize, Serialize};

/// The standard set of performance metrics for one return stream.
///
/// Undefined metrics follow the conventions of the functions in
/// [`crate::metrics`]: `NaN` where the input is empty, `0.0` for ratios whose
/// deviation is zero. `NaN` serialises as `null` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub cumulative_return: f64,
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    /// Always `<= 0`.
    pub max_drawdown: f64,
}

impl MetricsReport {
    /// The report of a series with no observations.
    pub fn undefined() -> Self {
        Self {
            cumulative_return: 0.0,
            annualized_return: f64::NAN,
            annualized_volatility: f64::NAN,
            sharpe_ratio: f64::NAN,
            sortino_ratio: f64::NAN,
            max_drawdown: 0.0,
        }
    }

    /// `(label, value)` pairs in display order, for tables and text output.
    pub fn rows(&self) -> [(&'static str, f64); 6] {
        [
            ("Cumulative Return", self.cumulative_return),
            ("Annual Return", self.annualized_return),
            ("Annual Volatility", self.annualized_volatility),
            ("Sharpe Ratio", self.sharpe_ratio),
            ("Sortino Ratio", self.sortino_ratio),
            ("Max Drawdown", self.max_drawdown),
        ]
    }
}

impl Default for MetricsReport {
    fn default() -> Self {
        Self::undefined()
    }
}
