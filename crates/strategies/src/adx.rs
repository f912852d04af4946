use crate::error::StrategyError;
use crate::indicators::WilderSmoother;
use crate::{SignalFrame, Strategy};
use configuration::AdxParams;
use core_types::{OhlcSeries, PriceInput, StrategyId};
use serde::Serialize;

/// The directional movement indicator columns, one value per bar.
/// Undefined values are `NaN`.
#[derive(Debug, Clone, Serialize)]
pub struct DirectionalIndicators {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
}

impl DirectionalIndicators {
    /// Computes +DI, -DI and ADX with Wilder smoothing over `window` bars.
    ///
    /// The true range of the first bar is its high-low range and its
    /// directional movements are zero.
    pub fn compute(ohlc: &OhlcSeries, window: usize) -> Result<Self, StrategyError> {
        let (high, low, close) = (ohlc.high(), ohlc.low(), ohlc.close());
        let n = close.len();

        let mut true_range = Vec::with_capacity(n);
        let mut plus_dm = Vec::with_capacity(n);
        let mut minus_dm = Vec::with_capacity(n);
        for i in 0..n {
            if i == 0 {
                true_range.push(high[0] - low[0]);
                plus_dm.push(0.0);
                minus_dm.push(0.0);
                continue;
            }
            let prev_close = close[i - 1];
            true_range.push(
                (high[i] - low[i])
                    .max((high[i] - prev_close).abs())
                    .max((low[i] - prev_close).abs()),
            );
            let up = high[i] - high[i - 1];
            let down = low[i - 1] - low[i];
            plus_dm.push(if up > down && up > 0.0 { up } else { 0.0 });
            minus_dm.push(if down > up && down > 0.0 { down } else { 0.0 });
        }

        let smooth = |values: &[f64]| {
            WilderSmoother::smooth(window, values)
                .map_err(|e| StrategyError::InvalidParameters(format!("ADX window: {e:?}")))
        };
        let tr_smooth = smooth(&true_range)?;
        let plus_smooth = smooth(&plus_dm)?;
        let minus_smooth = smooth(&minus_dm)?;

        let ratio = |dm: f64, tr: f64| if tr == 0.0 { f64::NAN } else { 100.0 * dm / tr };
        let plus_di: Vec<f64> = plus_smooth.iter().zip(&tr_smooth).map(|(d, t)| ratio(*d, *t)).collect();
        let minus_di: Vec<f64> = minus_smooth.iter().zip(&tr_smooth).map(|(d, t)| ratio(*d, *t)).collect();

        let dx: Vec<f64> = plus_di
            .iter()
            .zip(&minus_di)
            .map(|(p, m)| {
                let sum = p + m;
                if sum.is_nan() || sum == 0.0 {
                    f64::NAN
                } else {
                    100.0 * (p - m).abs() / sum
                }
            })
            .collect();
        let adx = smooth(&dx)?;

        Ok(Self { plus_di, minus_di, adx })
    }

    /// Index of the first bar after the last one with any undefined column.
    pub fn first_defined(&self) -> usize {
        (0..self.adx.len())
            .rev()
            .find(|&i| self.adx[i].is_nan() || self.plus_di[i].is_nan() || self.minus_di[i].is_nan())
            .map_or(0, |i| i + 1)
    }
}

/// Long when +DI is above -DI and ADX confirms a strong trend; flat when -DI
/// takes over; otherwise the previous position is held.
#[derive(Debug, Clone)]
pub struct DirectionalMovement {
    window: usize,
    threshold: f64,
}

impl DirectionalMovement {
    pub fn new(params: AdxParams) -> Result<Self, StrategyError> {
        if params.window == 0 {
            return Err(StrategyError::InvalidParameters(
                "ADX window cannot be zero".to_string(),
            ));
        }
        if !params.threshold.is_finite() {
            return Err(StrategyError::InvalidParameters(
                "ADX threshold must be finite".to_string(),
            ));
        }
        Ok(Self {
            window: params.window,
            threshold: params.threshold,
        })
    }
}

impl Strategy for DirectionalMovement {
    fn id(&self) -> StrategyId {
        StrategyId::Adx
    }

    fn generate_signals(&self, input: &PriceInput) -> Result<SignalFrame, StrategyError> {
        let indicators = DirectionalIndicators::compute(&input.to_ohlc(), self.window)?;

        let mut position = 0.0;
        let signals: Vec<f64> = (0..indicators.adx.len())
            .map(|i| {
                let (plus, minus, adx) = (indicators.plus_di[i], indicators.minus_di[i], indicators.adx[i]);
                if plus > minus && adx > self.threshold {
                    position = 1.0;
                } else if minus > plus {
                    position = 0.0;
                }
                position
            })
            .collect();

        let warmup = indicators.first_defined();
        tracing::debug!(
            window = self.window,
            threshold = self.threshold,
            warmup,
            "DirectionalMovement: signals generated"
        );
        Ok(SignalFrame { signals, warmup })
    }
}
