use crate::backtest::{PortfolioBacktest, backtest_portfolio};
use crate::correlation::CorrelationMatrix;
use crate::data_handler::{ReturnTable, compute_returns, load_and_prepare_data};
use crate::error::PortfolioError;
use crate::weights::{WeightSchedule, WeightScheme};
use analytics::{MetricsProvider, MetricsReport, metrics};
use chrono::{DateTime, Utc};
use configuration::PortfolioSettings;
use core_types::{Interval, PriceRange, PriceTable, RebalanceFrequency, WeightMode};
use market_data::PriceProvider;
use serde::Serialize;
use std::sync::Arc;

/// Everything one portfolio run needs. Built explicitly per request.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioRequest {
    pub symbols: Vec<String>,
    pub range: PriceRange,
    pub interval: Interval,
    pub weights: WeightScheme,
    pub rebalance: RebalanceFrequency,
    pub risk_free_rate: f64,
}

impl PortfolioRequest {
    pub fn from_settings(settings: &PortfolioSettings) -> Self {
        let weights = match settings.weight_mode {
            WeightMode::Equal => WeightScheme::Equal,
            WeightMode::Custom => WeightScheme::Custom(settings.custom_weights.clone()),
        };
        Self {
            symbols: settings.symbols.clone(),
            range: PriceRange::Period(settings.period),
            interval: settings.interval,
            weights,
            rebalance: settings.rebalance,
            risk_free_rate: settings.risk_free_rate,
        }
    }
}

/// The complete result of a portfolio run.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioOutcome {
    pub prices: PriceTable,
    pub returns: ReturnTable,
    pub backtest: PortfolioBacktest,
    pub metrics: MetricsReport,
    pub drawdown: Vec<f64>,
    pub correlation: CorrelationMatrix,
    /// The last five rows of the weight schedule.
    pub latest_weights: WeightSchedule,
}

impl PortfolioOutcome {
    pub fn last_date(&self) -> Option<DateTime<Utc>> {
        self.prices.last_date()
    }

    /// Portfolio value on the last date, base 1.
    pub fn final_value(&self) -> Option<f64> {
        self.backtest.values.last().copied()
    }
}

/// Orchestrates a portfolio backtest: load, clean, aggregate, measure.
///
/// Both collaborators are injected so the manager can run against cached,
/// live or mock data and any metrics implementation.
pub struct PortfolioManager {
    provider: Arc<dyn PriceProvider>,
    metrics: Arc<dyn MetricsProvider>,
}

impl PortfolioManager {
    pub fn new(provider: Arc<dyn PriceProvider>, metrics: Arc<dyn MetricsProvider>) -> Self {
        Self { provider, metrics }
    }

    pub async fn run(&self, request: &PortfolioRequest) -> Result<PortfolioOutcome, PortfolioError> {
        tracing::info!(
            symbols = ?request.symbols,
            range = %request.range,
            rebalance = %request.rebalance,
            "running portfolio backtest"
        );

        let prices = load_and_prepare_data(self.provider.as_ref(), request).await?;
        let returns = compute_returns(&prices);
        let backtest = backtest_portfolio(&returns, &request.weights, request.rebalance);

        let curve = backtest.based_values();
        let report = self.metrics.report(&backtest.returns.values, &curve, request.risk_free_rate)?;
        // Aligned with the return dates; the base point itself is dropped.
        let drawdown: Vec<f64> = metrics::drawdown_series(&curve).into_iter().skip(1).collect();
        let correlation = CorrelationMatrix::from_returns(&returns);
        let latest_weights = backtest.weights.tail(5);

        Ok(PortfolioOutcome {
            prices,
            returns,
            backtest,
            metrics: report,
            drawdown,
            correlation,
            latest_weights,
        })
    }
}
