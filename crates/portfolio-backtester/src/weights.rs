use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How weights are assigned at each rebalance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScheme {
    /// `1 / N` for every asset.
    #[default]
    Equal,
    /// Raw user weights per symbol; missing symbols get 0. Normalised at use.
    Custom(BTreeMap<String, f64>),
}

impl WeightScheme {
    /// The target weights for `symbols`, in the same order.
    pub fn weights_for(&self, symbols: &[String]) -> Vec<f64> {
        match self {
            WeightScheme::Equal => equal_weights(symbols.len()),
            WeightScheme::Custom(raw) => {
                let w: Vec<f64> = symbols
                    .iter()
                    .map(|s| raw.get(s).copied().unwrap_or(0.0))
                    .collect();
                normalize_weights(&w)
            }
        }
    }
}

pub fn equal_weights(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    vec![1.0 / n as f64; n]
}

/// Long-only normalisation: negatives are clamped to zero, then the vector
/// is scaled to sum to one. A vector with no positive mass is returned
/// clamped but unscaled (all zeros).
pub fn normalize_weights(weights: &[f64]) -> Vec<f64> {
    let clamped: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = clamped.iter().sum();
    if total <= 0.0 {
        tracing::warn!(?weights, "weights have no positive mass; portfolio will hold cash");
        return clamped;
    }
    clamped.into_iter().map(|w| w / total).collect()
}

/// Weights in force on each return date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightSchedule {
    pub dates: Vec<DateTime<Utc>>,
    pub symbols: Vec<String>,
    /// One row per date, one entry per symbol.
    pub rows: Vec<Vec<f64>>,
}

impl WeightSchedule {
    /// The last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> WeightSchedule {
        let start = self.rows.len().saturating_sub(n);
        WeightSchedule {
            dates: self.dates[start..].to_vec(),
            symbols: self.symbols.clone(),
            rows: self.rows[start..].to_vec(),
        }
    }

    pub fn latest(&self) -> Option<&[f64]> {
        self.rows.last().map(Vec::as_slice)
    }
}
