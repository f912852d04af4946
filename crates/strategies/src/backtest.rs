use crate::Strategy;
use crate::error::StrategyError;
use analytics::{MetricsProvider, MetricsReport, metrics};
use chrono::{DateTime, Utc};
use core_types::{PriceInput, StrategyId};
use serde::Serialize;

/// The outcome of running one strategy over one price history, alongside a
/// buy-and-hold benchmark over the same bars.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestResult {
    pub strategy: StrategyId,
    /// Retained bars: everything from the first bar with a defined signal.
    pub dates: Vec<DateTime<Utc>>,
    pub closes: Vec<f64>,
    pub signals: Vec<f64>,
    /// `0.0` on the first retained bar, then `signal[t-1] * return[t]`.
    pub strategy_returns: Vec<f64>,
    /// Starts at `1.0`.
    pub equity_curve: Vec<f64>,
    pub drawdown: Vec<f64>,
    pub benchmark_returns: Vec<f64>,
    /// Close prices rebased to `1.0` on the first retained bar.
    pub benchmark_curve: Vec<f64>,
    pub metrics: MetricsReport,
    pub benchmark: MetricsReport,
}

impl BacktestResult {
    /// Strategy metrics minus benchmark metrics, row by row.
    pub fn excess_over_benchmark(&self) -> MetricsReport {
        let (s, b) = (&self.metrics, &self.benchmark);
        MetricsReport {
            cumulative_return: s.cumulative_return - b.cumulative_return,
            annualized_return: s.annualized_return - b.annualized_return,
            annualized_volatility: s.annualized_volatility - b.annualized_volatility,
            sharpe_ratio: s.sharpe_ratio - b.sharpe_ratio,
            sortino_ratio: s.sortino_ratio - b.sortino_ratio,
            max_drawdown: s.max_drawdown - b.max_drawdown,
        }
    }
}

/// Runs `strategy` over `input` with a one-bar execution lag.
///
/// A signal observed at the close of bar `t` is earned on bar `t + 1`, so
/// later prices can never influence earlier positions. Bars before
/// `max(1, warmup)` are dropped; the first retained bar is the 1.0 base.
pub fn run_backtest(
    strategy: &dyn Strategy,
    input: &PriceInput,
    metrics_provider: &dyn MetricsProvider,
    risk_free_rate: f64,
) -> Result<BacktestResult, StrategyError> {
    let frame = strategy.generate_signals(input)?;
    let closes = input.closes();
    if frame.signals.len() != closes.len() {
        return Err(StrategyError::IndicatorError(format!(
            "{} signals for {} bars",
            frame.signals.len(),
            closes.len()
        )));
    }

    let start = frame.warmup.max(1);
    if start >= closes.len() {
        return Err(StrategyError::NotEnoughData(format!(
            "{} needs more than {} bars, got {}",
            strategy.id(),
            start,
            closes.len()
        )));
    }

    let mut strategy_returns = Vec::with_capacity(closes.len() - start);
    let mut benchmark_returns = Vec::with_capacity(closes.len() - start);
    strategy_returns.push(0.0);
    benchmark_returns.push(0.0);
    for t in start + 1..closes.len() {
        let bar_return = closes[t] / closes[t - 1] - 1.0;
        strategy_returns.push(frame.signals[t - 1] * bar_return);
        benchmark_returns.push(bar_return);
    }

    let equity_curve = metrics::equity_curve(&strategy_returns);
    let benchmark_curve: Vec<f64> = closes[start..].iter().map(|c| c / closes[start]).collect();

    let result = BacktestResult {
        strategy: strategy.id(),
        dates: input.dates()[start..].to_vec(),
        closes: closes[start..].to_vec(),
        signals: frame.signals[start..].to_vec(),
        drawdown: metrics::drawdown_series(&equity_curve),
        metrics: metrics_provider.report(&strategy_returns, &equity_curve, risk_free_rate)?,
        benchmark: metrics_provider.report(&benchmark_returns, &benchmark_curve, risk_free_rate)?,
        strategy_returns,
        equity_curve,
        benchmark_returns,
        benchmark_curve,
    };

    tracing::debug!(
        strategy = %result.strategy,
        bars = result.dates.len(),
        total_return = result.metrics.cumulative_return,
        "backtest complete"
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adx::DirectionalMovement;
    use crate::momentum::SmaCrossover;
    use crate::tests::close_only;
    use analytics::AnalyticsEngine;
    use configuration::{AdxParams, MomentumParams};

    fn zig_zag_uptrend(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + i as f64 * 0.5 + if i % 3 == 0 { -1.0 } else { 1.0 })
            .collect()
    }

    fn crossover() -> SmaCrossover {
        SmaCrossover::new(MomentumParams { short_window: 3, long_window: 8 }).unwrap()
    }

    #[test]
    fn equity_starts_at_one_and_stays_non_negative() {
        let closes = zig_zag_uptrend(60);
        let result = run_backtest(&crossover(), &close_only(&closes), &AnalyticsEngine::new(), 0.0).unwrap();

        assert_eq!(result.equity_curve[0], 1.0);
        assert_eq!(result.benchmark_curve[0], 1.0);
        assert!(result.equity_curve.iter().all(|v| *v >= 0.0));
        assert_eq!(result.dates.len(), 60 - 7);
        assert_eq!(result.equity_curve.len(), result.strategy_returns.len());
    }

    #[test]
    fn returns_use_the_previous_bar_signal() {
        let closes = zig_zag_uptrend(40);
        let result = run_backtest(&crossover(), &close_only(&closes), &AnalyticsEngine::new(), 0.0).unwrap();
        for t in 1..result.closes.len() {
            let bar_return = result.closes[t] / result.closes[t - 1] - 1.0;
            assert!((result.strategy_returns[t] - result.signals[t - 1] * bar_return).abs() < 1e-15);
        }
    }

    #[test]
    fn future_prices_do_not_change_past_signals() {
        let closes = zig_zag_uptrend(80);
        let strategy = crossover();
        let full = strategy.generate_signals(&close_only(&closes)).unwrap();
        let mut shocked = closes[..50].to_vec();
        shocked.extend(closes[50..].iter().map(|c| c * 0.3));
        let altered = strategy.generate_signals(&close_only(&shocked)).unwrap();
        assert_eq!(full.signals[..50], altered.signals[..50]);
    }

    #[test]
    fn future_prices_do_not_change_past_adx_positions() {
        let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + f64::from(i)).collect();
        closes.extend((1..=20).map(|i| 159.0 - 3.0 * f64::from(i)));
        let strategy = DirectionalMovement::new(AdxParams { window: 14, threshold: 25.0 }).unwrap();
        let full = strategy.generate_signals(&close_only(&closes)).unwrap();

        // Cut the history short and replace the tail with a crash.
        let mut shocked = closes[..45].to_vec();
        shocked.extend((1..=35).map(|i| 144.0 - 4.0 * f64::from(i)));
        let altered = strategy.generate_signals(&close_only(&shocked)).unwrap();

        assert!(full.signals[..45].contains(&1.0));
        assert_eq!(full.signals[..45], altered.signals[..45]);
        assert_ne!(full.signals[45..], altered.signals[45..]);
    }

    #[test]
    fn too_short_history_is_an_error() {
        let closes = zig_zag_uptrend(5);
        let err = run_backtest(&crossover(), &close_only(&closes), &AnalyticsEngine::new(), 0.0);
        assert!(matches!(err, Err(StrategyError::NotEnoughData(_))));
    }

    #[test]
    fn excess_is_strategy_minus_benchmark() {
        let closes = zig_zag_uptrend(60);
        let result = run_backtest(&crossover(), &close_only(&closes), &AnalyticsEngine::new(), 0.0).unwrap();
        let excess = result.excess_over_benchmark();
        let expected = result.metrics.cumulative_return - result.benchmark.cumulative_return;
        assert!((excess.cumulative_return - expected).abs() < 1e-15);
    }
}
