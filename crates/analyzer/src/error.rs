use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("No price data for {0}")]
    NoData(String),

    #[error("Strategy error: {0}")]
    Strategy(#[from] strategies::StrategyError),
}
