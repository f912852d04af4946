use crate::error::StrategyError;
use analytics::metrics::hurst_exponent;
use configuration::RegimeParams;
use core_types::StrategyId;
use serde::Serialize;
use std::fmt;

/// The market state suggested by the efficiency ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Trending,
    Ranging,
}

impl Regime {
    /// The strategy that suits this regime.
    pub fn suggested_strategy(&self) -> StrategyId {
        match self {
            Regime::Trending => StrategyId::Momentum,
            Regime::Ranging => StrategyId::Adx,
        }
    }
}

impl fmt::Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regime::Trending => f.write_str("Trend"),
            Regime::Ranging => f.write_str("Trend Strength"),
        }
    }
}

/// Advisory output of the regime classifier. Never changes which strategy
/// actually runs unless the caller asks for it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegimeAssessment {
    /// `NaN` when the series is shorter than the period or has no movement.
    pub efficiency_ratio: f64,
    pub regime: Regime,
    pub suggested: StrategyId,
    /// `> 0.5` trending, `< 0.5` mean reverting.
    pub hurst: f64,
}

/// Kaufman's efficiency ratio classifier: net move over summed absolute moves.
#[derive(Debug, Clone)]
pub struct EfficiencyRatio {
    period: usize,
    threshold: f64,
    hurst_max_lag: usize,
}

impl EfficiencyRatio {
    pub fn new(params: RegimeParams) -> Result<Self, StrategyError> {
        if params.period == 0 {
            return Err(StrategyError::InvalidParameters(
                "Efficiency ratio period cannot be zero".to_string(),
            ));
        }
        Ok(Self {
            period: params.period,
            threshold: params.threshold,
            hurst_max_lag: params.hurst_max_lag,
        })
    }

    /// The ratio at the latest point of `closes`.
    pub fn latest(&self, closes: &[f64]) -> f64 {
        let n = closes.len();
        if n <= self.period {
            return f64::NAN;
        }
        let window = &closes[n - 1 - self.period..];
        let change = (window[self.period] - window[0]).abs();
        let path: f64 = window.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
        if path == 0.0 { f64::NAN } else { change / path }
    }

    /// Classifies the latest market state. An undefined ratio counts as
    /// ranging.
    pub fn assess(&self, closes: &[f64]) -> RegimeAssessment {
        let efficiency_ratio = self.latest(closes);
        let regime = if efficiency_ratio > self.threshold {
            Regime::Trending
        } else {
            Regime::Ranging
        };
        RegimeAssessment {
            efficiency_ratio,
            regime,
            suggested: regime.suggested_strategy(),
            hurst: hurst_exponent(closes, self.hurst_max_lag),
        }
    }
}
