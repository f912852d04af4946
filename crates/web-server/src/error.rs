use analyzer::error::AnalyzerError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use portfolio_backtester::PortfolioError;
use reporter::ReportError;
use serde_json::json;
use strategies::StrategyError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalyzerError),
    #[error("Portfolio error: {0}")]
    Portfolio(#[from] PortfolioError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<core_types::CoreError> for AppError {
    fn from(e: core_types::CoreError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Analysis(AnalyzerError::NoData(_)) => StatusCode::NOT_FOUND,
            AppError::Analysis(AnalyzerError::Strategy(e)) => match e {
                StrategyError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
                StrategyError::NotEnoughData(_) => StatusCode::UNPROCESSABLE_ENTITY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Portfolio(PortfolioError::NoData(_)) => StatusCode::NOT_FOUND,
            AppError::Portfolio(PortfolioError::InsufficientAssets { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Portfolio(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Report(ReportError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            AppError::Report(ReportError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::Report(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed.");
            "An internal error occurred".to_string()
        } else {
            tracing::warn!(error = %self, "Request rejected.");
            self.to_string()
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
