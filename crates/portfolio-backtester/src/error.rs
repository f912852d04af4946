use analytics::AnalyticsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortfolioError {
    #[error("No price data returned for {0}")]
    NoData(String),

    #[error("Portfolio needs at least {required} assets with data, got {found}")]
    InsufficientAssets { found: usize, required: usize },

    #[error("Metrics calculation failed: {0}")]
    Metrics(#[from] AnalyticsError),
}
