use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Provider returned status {status} for {symbol}")]
    Status { symbol: String, status: u16 },

    #[error("Provider error for {symbol}: {message}")]
    Upstream { symbol: String, message: String },

    #[error("Invalid data format from provider: {0}")]
    InvalidData(String),
}
