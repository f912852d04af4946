use crate::error::AnalyticsError;
use crate::metrics;
use crate::report::MetricsReport;
use core_types::ReturnSeries;

/// The capability the backtesting engines need from this crate.
///
/// Engines receive it at construction instead of calling the metric functions
/// directly, so alternative metric sets can be swapped in.
pub trait MetricsProvider: Send + Sync {
    /// Computes the report for a return stream and the value curve it produced.
    fn report(
        &self,
        returns: &[f64],
        values: &[f64],
        risk_free_rate: f64,
    ) -> Result<MetricsReport, AnalyticsError>;
}

/// A stateless calculator for deriving performance metrics from a return stream.
#[derive(Debug, Clone, Copy)]
pub struct AnalyticsEngine {
    /// Threshold below which excess returns count as downside for Sortino.
    pub sortino_target: f64,
}

impl Default for AnalyticsEngine {
    fn default() -> Self {
        Self { sortino_target: 0.0 }
    }
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating performance metrics.
    ///
    /// # Arguments
    ///
    /// * `returns` - Period returns of the strategy or portfolio.
    /// * `values` - The value (equity) curve, either aligned with `returns` or
    ///   one element longer when it carries its starting value.
    /// * `risk_free_rate` - Annual risk-free rate, e.g. `0.02`.
    pub fn calculate(
        &self,
        returns: &[f64],
        values: &[f64],
        risk_free_rate: f64,
    ) -> Result<MetricsReport, AnalyticsError> {
        if returns.is_empty() || values.is_empty() {
            return Err(AnalyticsError::NotEnoughData(
                "metrics need at least one return and one value".to_string(),
            ));
        }
        if values.len() != returns.len() && values.len() != returns.len() + 1 {
            return Err(AnalyticsError::LengthMismatch {
                returns: returns.len(),
                values: values.len(),
            });
        }

        let report = MetricsReport {
            cumulative_return: metrics::cumulative_return(values),
            annualized_return: metrics::annualized_return(returns),
            annualized_volatility: metrics::annualized_volatility(returns),
            sharpe_ratio: metrics::sharpe_ratio(returns, risk_free_rate),
            sortino_ratio: metrics::sortino_ratio(returns, risk_free_rate, self.sortino_target),
            max_drawdown: metrics::max_drawdown(values),
        };
        tracing::debug!(?report, observations = returns.len(), "metrics calculated");
        Ok(report)
    }

    /// Convenience wrapper compounding `series` from a 1.0 base.
    pub fn calculate_series(
        &self,
        series: &ReturnSeries,
        risk_free_rate: f64,
    ) -> Result<MetricsReport, AnalyticsError> {
        let mut values = Vec::with_capacity(series.values.len() + 1);
        values.push(1.0);
        values.extend(metrics::equity_curve(&series.values));
        self.calculate(&series.values, &values, risk_free_rate)
    }
}

impl MetricsProvider for AnalyticsEngine {
    fn report(
        &self,
        returns: &[f64],
        values: &[f64],
        risk_free_rate: f64,
    ) -> Result<MetricsReport, AnalyticsError> {
        self.calculate(returns, values, risk_free_rate)
    }
}
