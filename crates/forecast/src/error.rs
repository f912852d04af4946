use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("Not enough data to fit the model: {0}")]
    NotEnoughData(String),

    #[error("Invalid model parameters: {0}")]
    InvalidParameters(String),

    #[error("The least-squares system is singular")]
    Singular,

    #[error("The fit produced non-finite values")]
    NonFinite,
}
