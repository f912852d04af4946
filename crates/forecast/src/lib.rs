//! # Forecast
//!
//! Short-horizon price forecasts from an autoregressive model on differenced
//! prices. The forecast is best effort: callers that only want to decorate a
//! chart use [`forecast_best_effort`] and get `None` on any failure.

pub mod arima;
pub mod error;

pub use arima::{ArimaForecaster, ArimaModel, Forecast, difference, forecast_best_effort};
pub use error::ForecastError;
