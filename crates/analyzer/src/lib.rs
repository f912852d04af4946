use crate::error::AnalyzerError;
use analytics::{MetricsProvider, MetricsReport};
use chrono::NaiveDate;
use configuration::{AnalysisSettings, ForecastParams, MomentumParams, Strategies, StrategyChoice};
use core_types::{Interval, PriceRange, PriceRequest, StrategyId};
use forecast::{ArimaForecaster, Forecast, forecast_best_effort};
use market_data::PriceProvider;
use serde::Serialize;
use std::sync::Arc;
use strategies::{BacktestResult, EfficiencyRatio, RegimeAssessment, create_strategy, run_backtest};

pub mod error;

/// One single-asset analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub symbol: String,
    pub range: PriceRange,
    pub interval: Interval,
    /// Inclusive bounds applied after fetching.
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub strategy: StrategyChoice,
    pub tune_windows: bool,
    pub risk_free_rate: f64,
    pub forecast: ForecastParams,
}

impl AnalysisRequest {
    pub fn from_settings(settings: &AnalysisSettings) -> Self {
        Self {
            symbol: settings.symbol.clone(),
            range: PriceRange::Period(settings.period),
            interval: settings.interval,
            start: None,
            end: None,
            strategy: settings.strategy,
            tune_windows: settings.tune_windows,
            risk_free_rate: settings.risk_free_rate,
            forecast: settings.forecast,
        }
    }
}

/// Everything the dashboard shows for one asset.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutcome {
    pub symbol: String,
    pub current_price: f64,
    pub regime: RegimeAssessment,
    /// The strategy that actually ran.
    pub strategy: StrategyId,
    /// Windows used when the momentum strategy ran.
    pub momentum_windows: Option<MomentumParams>,
    pub backtest: BacktestResult,
    /// Strategy minus buy and hold, metric by metric.
    pub excess: MetricsReport,
    pub forecast: Option<Forecast>,
}

/// The single-asset analysis engine: fetch, classify, backtest, forecast.
pub struct Analyzer {
    provider: Arc<dyn PriceProvider>,
    metrics: Arc<dyn MetricsProvider>,
    strategies: Strategies,
}

impl Analyzer {
    pub fn new(
        provider: Arc<dyn PriceProvider>,
        metrics: Arc<dyn MetricsProvider>,
        strategies: Strategies,
    ) -> Self {
        Self { provider, metrics, strategies }
    }

    pub async fn run(&self, request: &AnalysisRequest) -> Result<AnalysisOutcome, AnalyzerError> {
        // 1. Fetch
        let price_request = PriceRequest::new(vec![request.symbol.clone()], request.range, request.interval);
        let table = self.provider.fetch(&price_request).await.clean();
        let input = table
            .price_input(&request.symbol)
            .map(|input| input.between(request.start, request.end))
            .filter(|input| !input.is_empty())
            .ok_or_else(|| AnalyzerError::NoData(request.symbol.clone()))?;
        let current_price = input.closes()[input.len() - 1];

        // 2. Classify
        let regime = EfficiencyRatio::new(self.strategies.regime)?.assess(input.closes());
        let strategy_id = request.strategy.resolve(regime.suggested);

        let mut params = self.strategies.clone();
        if request.tune_windows {
            params.momentum = MomentumParams::suggested(regime.efficiency_ratio);
        }
        let momentum_windows = (strategy_id == StrategyId::Momentum).then_some(params.momentum);

        tracing::info!(
            symbol = %request.symbol,
            efficiency_ratio = regime.efficiency_ratio,
            regime = %regime.regime,
            strategy = %strategy_id,
            bars = input.len(),
            "running analysis"
        );

        // 3. Backtest
        let strategy = create_strategy(strategy_id, &params)?;
        let backtest = run_backtest(strategy.as_ref(), &input, self.metrics.as_ref(), request.risk_free_rate)?;

        // 4. Forecast
        let forecast = if request.forecast.enabled {
            match ArimaForecaster::new(&request.forecast) {
                Ok(forecaster) => forecast_best_effort(&forecaster, &input.close_series()),
                Err(e) => {
                    tracing::warn!(error = %e, "forecast disabled");
                    None
                }
            }
        } else {
            None
        };

        Ok(AnalysisOutcome {
            symbol: request.symbol.clone(),
            current_price,
            regime,
            strategy: strategy_id,
            momentum_windows,
            excess: backtest.excess_over_benchmark(),
            backtest,
            forecast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analytics::AnalyticsEngine;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use core_types::{Bar, Period, PriceTable, SymbolHistory};
    use strategies::Regime;

    struct OneSymbol {
        symbol: &'static str,
        closes: Vec<f64>,
    }

    fn day(i: usize) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap() + Duration::days(i as i64)
    }

    #[async_trait]
    impl PriceProvider for OneSymbol {
        async fn fetch(&self, request: &PriceRequest) -> PriceTable {
            if !request.symbols.iter().any(|s| s == self.symbol) {
                return PriceTable::empty();
            }
            PriceTable::from_histories(vec![SymbolHistory {
                symbol: self.symbol.to_string(),
                dates: (0..self.closes.len()).map(day).collect(),
                bars: self.closes.iter().map(|c| Bar::from_close(*c)).collect(),
            }])
        }
    }

    fn analyzer(closes: Vec<f64>) -> Analyzer {
        Analyzer::new(
            Arc::new(OneSymbol { symbol: "BTC-USD", closes }),
            Arc::new(AnalyticsEngine::new()),
            Strategies::default(),
        )
    }

    fn request(symbol: &str) -> AnalysisRequest {
        AnalysisRequest {
            symbol: symbol.to_string(),
            range: PriceRange::Period(Period::OneYear),
            interval: Interval::Daily,
            start: None,
            end: None,
            strategy: StrategyChoice::Auto,
            tune_windows: true,
            risk_free_rate: 0.0,
            forecast: ForecastParams { enabled: false, ..ForecastParams::default() },
        }
    }

    fn trend(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[tokio::test]
    async fn trending_market_runs_tuned_momentum() {
        let outcome = analyzer(trend(120)).run(&request("BTC-USD")).await.unwrap();

        assert_eq!(outcome.regime.regime, Regime::Trending);
        assert_eq!(outcome.strategy, StrategyId::Momentum);
        assert_eq!(outcome.momentum_windows, Some(MomentumParams { short_window: 5, long_window: 20 }));
        assert_eq!(outcome.current_price, 219.0);
        assert_eq!(outcome.backtest.equity_curve[0], 1.0);
        assert!(outcome.forecast.is_none());
    }

    #[tokio::test]
    async fn explicit_choice_overrides_suggestion() {
        let mut req = request("BTC-USD");
        req.strategy = StrategyChoice::Adx;
        let outcome = analyzer(trend(120)).run(&req).await.unwrap();

        assert_eq!(outcome.strategy, StrategyId::Adx);
        assert!(outcome.momentum_windows.is_none());
    }

    #[tokio::test]
    async fn unknown_symbol_or_empty_window_is_no_data() {
        let result = analyzer(trend(120)).run(&request("ZZZ")).await;
        assert!(matches!(result, Err(AnalyzerError::NoData(_))));

        let mut req = request("BTC-USD");
        req.start = NaiveDate::from_ymd_opt(2030, 1, 1);
        let result = analyzer(trend(120)).run(&req).await;
        assert!(matches!(result, Err(AnalyzerError::NoData(_))));
    }

    #[tokio::test]
    async fn too_short_history_surfaces_strategy_error() {
        let mut req = request("BTC-USD");
        req.strategy = StrategyChoice::Momentum;
        req.tune_windows = false;
        let result = analyzer(trend(30)).run(&req).await;
        assert!(matches!(
            result,
            Err(AnalyzerError::Strategy(strategies::StrategyError::NotEnoughData(_)))
        ));
    }
}
