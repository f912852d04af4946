use crate::{AppState, error::AppError};
use analyzer::{AnalysisOutcome, AnalysisRequest};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use charts::{Figure, ThemeMode};
use chrono::NaiveDate;
use configuration::{
    AnalysisSettings, PortfolioSettings, ReportSettings, Strategies, StrategyChoice,
};
use core_types::{Interval, Period, PriceRange, RebalanceFrequency, WeightMode, parse_symbols};
use portfolio_backtester::{PortfolioOutcome, PortfolioRequest, WeightScheme};
use reporter::{ParsedReport, ReportEntry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub analysis: AnalysisSettings,
    pub portfolio: PortfolioSettings,
    pub report: ReportSettings,
    pub strategies: Strategies,
    /// How often the dashboard should re-query, in seconds.
    pub refresh_interval_secs: u64,
    pub cache_ttl_secs: u64,
    pub periods: Vec<&'static str>,
    pub intervals: Vec<&'static str>,
}

/// # GET /api/config
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        analysis: config.analysis.clone(),
        portfolio: config.portfolio.clone(),
        report: config.report.clone(),
        strategies: config.strategies.clone(),
        refresh_interval_secs: config.server.refresh_interval.as_secs(),
        cache_ttl_secs: config.data.cache_ttl.as_secs(),
        periods: Period::ALL.iter().map(|p| p.as_str()).collect(),
        intervals: vec![Interval::Daily.as_str(), Interval::Hourly.as_str()],
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisQuery {
    pub symbol: Option<String>,
    pub period: Option<String>,
    pub interval: Option<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub strategy: Option<StrategyChoice>,
    pub tune: Option<bool>,
    pub rf: Option<f64>,
    pub forecast: Option<bool>,
    pub theme: Option<ThemeMode>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    #[serde(flatten)]
    pub outcome: AnalysisOutcome,
    pub chart: Figure,
}

/// # GET /api/analysis
/// Single-asset regime check, backtest and forecast. Unset parameters fall
/// back to `[analysis]` in the configuration.
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let mut request = AnalysisRequest::from_settings(&state.config.analysis);
    if let Some(symbol) = query.symbol.as_deref() {
        request.symbol = symbol.trim().to_uppercase();
    }
    if let Some(period) = query.period.as_deref() {
        request.range = PriceRange::Period(period.parse()?);
    }
    if let Some(interval) = query.interval.as_deref() {
        request.interval = interval.parse()?;
    }
    if let (Some(start), Some(end)) = (query.start, query.end) {
        if start > end {
            return Err(AppError::BadRequest(format!("start {} is after end {}", start, end)));
        }
    }
    request.start = query.start;
    request.end = query.end;
    request.strategy = query.strategy.unwrap_or(request.strategy);
    request.tune_windows = query.tune.unwrap_or(request.tune_windows);
    request.risk_free_rate = query.rf.unwrap_or(request.risk_free_rate);
    request.forecast.enabled = query.forecast.unwrap_or(request.forecast.enabled);

    let outcome = state.analyzer.run(&request).await?;
    let chart = charts::performance_chart(
        &outcome.backtest,
        outcome.forecast.as_ref(),
        query.theme.unwrap_or_default(),
    );
    Ok(Json(AnalysisResponse { outcome, chart }))
}

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    /// Comma-separated tickers.
    pub symbols: Option<String>,
    pub period: Option<String>,
    pub interval: Option<String>,
    /// `equal` or `custom`.
    pub weights: Option<String>,
    /// `AAPL:2,MSFT:1`; raw values, normalised by the engine.
    pub custom: Option<String>,
    pub rebalance: Option<String>,
    pub rf: Option<f64>,
    pub theme: Option<ThemeMode>,
}

#[derive(Debug, Serialize)]
pub struct PortfolioCharts {
    pub prices: Figure,
    pub value: Figure,
    pub drawdown: Figure,
    pub correlation: Figure,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    #[serde(flatten)]
    pub outcome: PortfolioOutcome,
    pub final_value: Option<f64>,
    pub charts: PortfolioCharts,
}

/// # GET /api/portfolio
pub async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PortfolioQuery>,
) -> Result<Json<PortfolioResponse>, AppError> {
    let mut request = PortfolioRequest::from_settings(&state.config.portfolio);
    if let Some(symbols) = query.symbols.as_deref() {
        request.symbols = parse_symbols(symbols);
    }
    if let Some(period) = query.period.as_deref() {
        request.range = PriceRange::Period(period.parse()?);
    }
    if let Some(interval) = query.interval.as_deref() {
        request.interval = interval.parse()?;
    }
    if let Some(mode) = query.weights.as_deref() {
        request.weights = match mode.parse::<WeightMode>()? {
            WeightMode::Equal => WeightScheme::Equal,
            WeightMode::Custom => WeightScheme::Custom(match query.custom.as_deref() {
                Some(raw) => parse_custom_weights(raw)?,
                None => state.config.portfolio.custom_weights.clone(),
            }),
        };
    }
    if let Some(rebalance) = query.rebalance.as_deref() {
        request.rebalance = rebalance.parse::<RebalanceFrequency>()?;
    }
    request.risk_free_rate = query.rf.unwrap_or(request.risk_free_rate);

    let outcome = state.portfolio.run(&request).await?;
    let theme = query.theme.unwrap_or_default();
    let dates = &outcome.backtest.returns.dates;
    let charts = PortfolioCharts {
        prices: charts::prices_chart(&outcome.prices, theme),
        value: charts::portfolio_value_chart(dates, &outcome.backtest.values, theme),
        drawdown: charts::drawdown_chart(dates, &outcome.drawdown, theme),
        correlation: charts::correlation_heatmap(&outcome.correlation, theme),
    };
    Ok(Json(PortfolioResponse {
        final_value: outcome.final_value(),
        outcome,
        charts,
    }))
}

/// Parses `SYMBOL:weight` pairs separated by commas.
pub fn parse_custom_weights(raw: &str) -> Result<BTreeMap<String, f64>, AppError> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (symbol, weight) = pair
                .split_once(':')
                .ok_or_else(|| AppError::BadRequest(format!("expected SYMBOL:weight, got '{}'", pair)))?;
            let weight: f64 = weight
                .trim()
                .parse()
                .map_err(|_| AppError::BadRequest(format!("invalid weight in '{}'", pair)))?;
            Ok((symbol.trim().to_uppercase(), weight))
        })
        .collect()
}

/// # GET /api/reports
/// Saved daily reports, newest first.
pub async fn get_reports(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ReportEntry>>, AppError> {
    let reports = reporter::list_reports(&state.config.report.output_dir).await?;
    Ok(Json(reports))
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub name: String,
    pub text: String,
    /// `None` when the file does not follow the report layout.
    pub parsed: Option<ParsedReport>,
}

/// # GET /api/reports/:name
pub async fn get_report(
    Path(name): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReportResponse>, AppError> {
    let text = reporter::read_report(&state.config.report.output_dir, &name).await?;
    let parsed = match reporter::parse_report(&text) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!(%name, error = %e, "saved report does not parse");
            None
        }
    };
    Ok(Json(ReportResponse { name, text, parsed }))
}

/// # POST /api/cache/refresh
/// Drops every cached price table so the next request refetches.
pub async fn refresh_cache(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    state.cache.invalidate_all().await;
    Json(serde_json::json!({ "status": "refreshed" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use configuration::Config;
    use core_types::{Bar, PriceRequest, PriceTable, SymbolHistory};
    use market_data::PriceProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves a few synthetic symbols and counts upstream calls.
    struct SyntheticProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PriceProvider for SyntheticProvider {
        async fn fetch(&self, request: &PriceRequest) -> PriceTable {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
            let histories = request
                .symbols
                .iter()
                .filter(|s| s.as_str() != "ZZZ")
                .enumerate()
                .map(|(k, symbol)| SymbolHistory {
                    symbol: symbol.clone(),
                    dates: (0..90).map(|i| start + Duration::days(i)).collect(),
                    bars: (0..90)
                        .map(|i| {
                            let wiggle = if (i + k) % 3 == 0 { -0.5 } else { 0.7 };
                            Bar::from_close(50.0 + 10.0 * k as f64 + i as f64 * 0.2 + wiggle)
                        })
                        .collect(),
                })
                .collect();
            PriceTable::from_histories(histories)
        }
    }

    fn state(report_dir: &std::path::Path) -> Arc<AppState> {
        let mut config = Config::default();
        config.report.output_dir = report_dir.to_path_buf();
        Arc::new(AppState::new(config, Arc::new(SyntheticProvider { calls: AtomicUsize::new(0) })))
    }

    #[test]
    fn custom_weights_parse_and_reject_garbage() {
        let weights = parse_custom_weights("aapl:2, MSFT:1").unwrap();
        assert_eq!(weights["AAPL"], 2.0);
        assert_eq!(weights["MSFT"], 1.0);
        assert!(parse_custom_weights("AAPL=2").is_err());
        assert!(parse_custom_weights("AAPL:x").is_err());
    }

    #[tokio::test]
    async fn portfolio_endpoint_returns_outcome_and_charts() {
        let dir = tempfile::tempdir().unwrap();
        let query = PortfolioQuery {
            symbols: Some("AAA,BBB,CCC".to_string()),
            weights: Some("custom".to_string()),
            custom: Some("AAA:1,BBB:1,CCC:2".to_string()),
            rebalance: Some("W".to_string()),
            ..PortfolioQuery::default()
        };
        let Json(response) = get_portfolio(State(state(dir.path())), Query(query)).await.unwrap();

        assert_eq!(response.outcome.returns.len(), 89);
        assert_eq!(response.outcome.correlation.symbols.len(), 3);
        assert_eq!(response.charts.prices.data.len(), 3);
        let latest = response.outcome.latest_weights.rows.last().unwrap();
        assert!((latest[2] - 0.5).abs() < 1e-12);
    }

    #[tokio::test]
    async fn portfolio_with_two_known_symbols_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let query = PortfolioQuery { symbols: Some("AAA,BBB,ZZZ".to_string()), ..PortfolioQuery::default() };
        let err = get_portfolio(State(state(dir.path())), Query(query)).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn bad_enum_parameters_are_bad_requests() {
        let dir = tempfile::tempdir().unwrap();
        let query = PortfolioQuery { period: Some("3y".to_string()), ..PortfolioQuery::default() };
        let err = get_portfolio(State(state(dir.path())), Query(query)).await.unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn analysis_endpoint_runs_requested_strategy() {
        let dir = tempfile::tempdir().unwrap();
        let query = AnalysisQuery {
            symbol: Some("aaa".to_string()),
            strategy: Some(StrategyChoice::Adx),
            forecast: Some(false),
            ..AnalysisQuery::default()
        };
        let Json(response) = get_analysis(State(state(dir.path())), Query(query)).await.unwrap();
        assert_eq!(response.outcome.symbol, "AAA");
        assert_eq!(response.outcome.strategy, core_types::StrategyId::Adx);
        assert_eq!(response.chart.data.len(), 2);
    }

    #[tokio::test]
    async fn cache_refresh_forces_refetch() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = Arc::new(SyntheticProvider { calls: AtomicUsize::new(0) });
        let state = Arc::new(AppState::new(
            Config { report: ReportSettings { output_dir: dir.path().to_path_buf(), ..ReportSettings::default() }, ..Config::default() },
            upstream.clone(),
        ));

        let query = || PortfolioQuery { symbols: Some("AAA,BBB,CCC".to_string()), ..PortfolioQuery::default() };
        get_portfolio(State(state.clone()), Query(query())).await.unwrap();
        get_portfolio(State(state.clone()), Query(query())).await.unwrap();
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 1);

        refresh_cache(State(state.clone())).await;
        get_portfolio(State(state), Query(query())).await.unwrap();
        assert_eq!(upstream.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn reports_are_listed_and_served() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("daily_report_2024-06-05.txt"), "no layout here\n")
            .await
            .unwrap();
        let state = state(dir.path());

        let Json(listed) = get_reports(State(state.clone())).await.unwrap();
        assert_eq!(listed.len(), 1);

        let Json(report) = get_report(Path("daily_report_2024-06-05.txt".to_string()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(report.text, "no layout here\n");

        let err = get_report(Path("daily_report_2024-06-06.txt".to_string()), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
