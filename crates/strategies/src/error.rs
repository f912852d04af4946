use analytics::AnalyticsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrategyError {
    #[error("Strategy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("An error occurred during indicator calculation: {0}")]
    IndicatorError(String),

    #[error("Not enough data: {0}")]
    NotEnoughData(String),

    #[error("Metrics calculation failed: {0}")]
    Metrics(#[from] AnalyticsError),
}
