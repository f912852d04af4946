use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("No price data available: {0}")]
    DataUnavailable(String),

    #[error("Report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed report line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("Not a report file name: {0}")]
    InvalidName(String),
}
