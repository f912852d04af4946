use crate::error::ForecastError;
use chrono::{DateTime, Duration, Utc};
use configuration::ForecastParams;
use core_types::PriceSeries;
use nalgebra::{DMatrix, DVector};
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal};

/// Differences `values` `d` times.
pub fn difference(values: &[f64], d: usize) -> Vec<f64> {
    let mut out = values.to_vec();
    for _ in 0..d {
        out = out.windows(2).map(|w| w[1] - w[0]).collect();
    }
    out
}

/// A fitted ARIMA(p, d, 0) model without constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArimaModel {
    /// `phi[i]` multiplies the differenced value `i + 1` steps back.
    pub phi: Vec<f64>,
    pub d: usize,
    /// Residual variance of the differenced fit.
    pub sigma2: f64,
}

impl ArimaModel {
    /// Point forecasts of the level, `horizon` steps after `history`.
    pub fn predict(&self, history: &[f64], horizon: usize) -> Vec<f64> {
        let p = self.phi.len();

        // One differenced series per order, so each level can be integrated back.
        let mut levels: Vec<Vec<f64>> = vec![history.to_vec()];
        for _ in 0..self.d {
            let next = difference(levels.last().map(Vec::as_slice).unwrap_or_default(), 1);
            levels.push(next);
        }

        let mut forecasts = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let Some(diffs) = levels.last_mut() else {
                break;
            };
            let n = diffs.len();
            let step: f64 = (0..p.min(n)).map(|i| self.phi[i] * diffs[n - 1 - i]).sum();
            diffs.push(step);

            // Undo each differencing: level[k] gains last(level[k]) + new diff.
            let mut carry = step;
            for k in (0..self.d).rev() {
                let prev = levels[k].last().copied().unwrap_or(0.0);
                carry += prev;
                levels[k].push(carry);
            }
            forecasts.push(carry);
        }
        forecasts
    }

    /// Forecast error variance for each step `1..=horizon`, from the psi
    /// weights of the model written on levels.
    pub fn error_variances(&self, horizon: usize) -> Vec<f64> {
        // (1 - phi(B)) (1 - B)^d as polynomial coefficients in B.
        let mut poly: Vec<f64> = std::iter::once(1.0).chain(self.phi.iter().map(|c| -c)).collect();
        for _ in 0..self.d {
            let mut next = vec![0.0; poly.len() + 1];
            for (i, c) in poly.iter().enumerate() {
                next[i] += c;
                next[i + 1] -= c;
            }
            poly = next;
        }
        let theta: Vec<f64> = poly[1..].iter().map(|c| -c).collect();

        let mut psi = Vec::with_capacity(horizon);
        psi.push(1.0);
        for j in 1..horizon {
            let w: f64 = (1..=j.min(theta.len())).map(|i| theta[i - 1] * psi[j - i]).sum();
            psi.push(w);
        }

        psi.iter()
            .scan(0.0, |acc, w| {
                *acc += w * w;
                Some(self.sigma2 * *acc)
            })
            .collect()
    }
}

/// A price forecast with a symmetric confidence band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    /// Calendar days after the last observation.
    pub dates: Vec<DateTime<Utc>>,
    pub mean: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub confidence: f64,
}

/// Fits an ARIMA(p, 1, 0) by conditional least squares and forecasts a few
/// days ahead.
#[derive(Debug, Clone)]
pub struct ArimaForecaster {
    order: usize,
    differencing: usize,
    horizon: usize,
    confidence: f64,
}

impl Default for ArimaForecaster {
    fn default() -> Self {
        Self { order: 5, differencing: 1, horizon: 7, confidence: 0.95 }
    }
}

impl ArimaForecaster {
    pub fn new(params: &ForecastParams) -> Result<Self, ForecastError> {
        if params.order == 0 || params.horizon == 0 {
            return Err(ForecastError::InvalidParameters(
                "order and horizon must be positive".to_string(),
            ));
        }
        if !(params.confidence > 0.0 && params.confidence < 1.0) {
            return Err(ForecastError::InvalidParameters(format!(
                "confidence must be within (0, 1), got {}",
                params.confidence
            )));
        }
        Ok(Self {
            order: params.order,
            differencing: 1,
            horizon: params.horizon,
            confidence: params.confidence,
        })
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Least-squares AR fit on the differenced series, no intercept.
    pub fn fit(&self, values: &[f64]) -> Result<ArimaModel, ForecastError> {
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite);
        }
        let p = self.order;
        let diffs = difference(values, self.differencing);
        // Need more regression rows than coefficients to estimate the variance.
        if diffs.len() <= 2 * p {
            return Err(ForecastError::NotEnoughData(format!(
                "{} observations for an AR({}) on {} differences",
                values.len(),
                p,
                self.differencing
            )));
        }

        let rows = diffs.len() - p;
        let x = DMatrix::from_fn(rows, p, |r, c| diffs[p + r - 1 - c]);
        let y = DVector::from_iterator(rows, diffs[p..].iter().copied());

        let xtx = x.transpose() * &x;
        let xty = x.transpose() * &y;
        let beta = xtx.lu().solve(&xty).ok_or(ForecastError::Singular)?;

        let residuals = &y - &x * &beta;
        let sigma2 = residuals.norm_squared() / (rows - p) as f64;
        let phi: Vec<f64> = beta.iter().copied().collect();
        if !sigma2.is_finite() || phi.iter().any(|c| !c.is_finite()) {
            return Err(ForecastError::NonFinite);
        }

        tracing::debug!(?phi, sigma2, rows, "AR coefficients fitted");
        Ok(ArimaModel { phi, d: self.differencing, sigma2 })
    }

    /// Fits on `series` and forecasts `horizon` calendar days after its last
    /// date.
    pub fn forecast(&self, series: &PriceSeries) -> Result<Forecast, ForecastError> {
        let (last_date, _) = series
            .last()
            .ok_or_else(|| ForecastError::NotEnoughData("empty series".to_string()))?;
        let model = self.fit(series.values())?;

        let mean = model.predict(series.values(), self.horizon);
        let z = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameters(e.to_string()))?
            .inverse_cdf(0.5 + self.confidence / 2.0);
        let half_widths: Vec<f64> = model
            .error_variances(self.horizon)
            .into_iter()
            .map(|v| z * v.sqrt())
            .collect();

        let lower: Vec<f64> = mean.iter().zip(&half_widths).map(|(m, w)| m - w).collect();
        let upper: Vec<f64> = mean.iter().zip(&half_widths).map(|(m, w)| m + w).collect();
        if mean.iter().chain(&lower).chain(&upper).any(|v| !v.is_finite()) {
            return Err(ForecastError::NonFinite);
        }

        let dates = (1..=self.horizon as i64).map(|i| last_date + Duration::days(i)).collect();
        Ok(Forecast { dates, mean, lower, upper, confidence: self.confidence })
    }
}

/// Runs the forecast and swallows any failure, logging it as a warning.
pub fn forecast_best_effort(forecaster: &ArimaForecaster, series: &PriceSeries) -> Option<Forecast> {
    match forecaster.forecast(series) {
        Ok(forecast) => Some(forecast),
        Err(e) => {
            tracing::warn!(error = %e, "forecast skipped");
            None
        }
    }
}
