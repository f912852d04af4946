use crate::data_handler::ReturnTable;
use crate::rebalance::rebalance_indices;
use crate::weights::{WeightScheme, WeightSchedule};
use analytics::metrics;
use chrono::{DateTime, Utc};
use core_types::{RebalanceFrequency, ReturnSeries};
use serde::Serialize;

/// A portfolio's return stream, its value curve and the weights behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioBacktest {
    pub returns: ReturnSeries,
    /// `cumprod(1 + r)`, aligned with `returns`.
    pub values: Vec<f64>,
    pub weights: WeightSchedule,
    pub rebalance_dates: Vec<DateTime<Utc>>,
}

impl PortfolioBacktest {
    /// `values` with the 1.0 starting value prepended, so the first
    /// period's return counts toward cumulative return and drawdown.
    pub fn based_values(&self) -> Vec<f64> {
        std::iter::once(1.0).chain(self.values.iter().copied()).collect()
    }
}

/// Combines asset returns into a portfolio.
///
/// Weights are recomputed from `scheme` on every rebalance date and held
/// constant in between. Holdings do not drift with prices between
/// rebalances, which is an approximation of a real buy-and-hold sleeve.
pub fn backtest_portfolio(
    returns: &ReturnTable,
    scheme: &WeightScheme,
    frequency: RebalanceFrequency,
) -> PortfolioBacktest {
    let rebalances = rebalance_indices(&returns.dates, frequency);

    let mut rows = Vec::with_capacity(returns.len());
    let mut current = scheme.weights_for(&returns.symbols);
    let mut next_rebalance = rebalances.iter().peekable();
    for row in 0..returns.len() {
        if next_rebalance.next_if(|&&i| i == row).is_some() {
            current = scheme.weights_for(&returns.symbols);
        }
        rows.push(current.clone());
    }

    let portfolio_returns: Vec<f64> = rows
        .iter()
        .enumerate()
        .map(|(row, w)| returns.row(row).iter().zip(w).map(|(r, w)| r * w).sum())
        .collect();
    let values = metrics::equity_curve(&portfolio_returns);

    tracing::debug!(
        rows = returns.len(),
        rebalances = rebalances.len(),
        %frequency,
        "portfolio backtest complete"
    );

    PortfolioBacktest {
        returns: ReturnSeries {
            dates: returns.dates.clone(),
            values: portfolio_returns,
        },
        values,
        weights: WeightSchedule {
            dates: returns.dates.clone(),
            symbols: returns.symbols.clone(),
            rows,
        },
        rebalance_dates: rebalances.iter().map(|&i| returns.dates[i]).collect(),
    }
}
