use analytics::{AnalyticsEngine, MetricsProvider};
use analyzer::Analyzer;
use axum::{
    Router,
    routing::{get, post},
};
use configuration::Config;
use market_data::{CachedPriceProvider, PriceProvider, YahooClient};
use portfolio_backtester::PortfolioManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer, ExposeHeaders},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub config: Config,
    /// Shared by both engines; the refresh endpoint clears it.
    pub cache: Arc<CachedPriceProvider>,
    pub analyzer: Analyzer,
    pub portfolio: PortfolioManager,
}

impl AppState {
    /// Wires both engines to one cache in front of `upstream`.
    pub fn new(config: Config, upstream: Arc<dyn PriceProvider>) -> Self {
        let cache = Arc::new(CachedPriceProvider::new(upstream, config.data.cache_ttl));
        let provider: Arc<dyn PriceProvider> = cache.clone();
        let metrics: Arc<dyn MetricsProvider> = Arc::new(AnalyticsEngine::new());

        Self {
            analyzer: Analyzer::new(provider.clone(), metrics.clone(), config.strategies.clone()),
            portfolio: PortfolioManager::new(provider, metrics),
            cache,
            config,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any())
        .expose_headers(ExposeHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/config", get(handlers::get_config))
        .route("/api/analysis", get(handlers::get_analysis))
        .route("/api/portfolio", get(handlers::get_portfolio))
        .route("/api/reports", get(handlers::get_reports))
        .route("/api/reports/:name", get(handlers::get_report))
        .route("/api/cache/refresh", post(handlers::refresh_cache))
        .with_state(state)
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
}

/// The main function to configure and run the web server.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let upstream: Arc<dyn PriceProvider> = Arc::new(YahooClient::new(&config.data)?);
    let app = build_router(Arc::new(AppState::new(config, upstream)));

    tracing::info!("Web server listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
