use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    #[error("Not enough data to perform calculation: {0}")]
    NotEnoughData(String),

    #[error("Series length mismatch: {returns} returns against {values} values")]
    LengthMismatch { returns: usize, values: usize },
}
