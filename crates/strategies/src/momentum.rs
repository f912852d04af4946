use crate::error::StrategyError;
use crate::{SignalFrame, Strategy};
use configuration::MomentumParams;
use core_types::{PriceInput, StrategyId};
use ta::Next;
use ta::indicators::SimpleMovingAverage as Sma;

/// Long while the short simple moving average is above the long one, flat
/// otherwise.
#[derive(Debug, Clone)]
pub struct SmaCrossover {
    short_window: usize,
    long_window: usize,
}

impl SmaCrossover {
    /// Creates a new `SmaCrossover`, rejecting windows that do not satisfy
    /// `0 < short < long`.
    pub fn new(params: MomentumParams) -> Result<Self, StrategyError> {
        if params.short_window == 0 {
            return Err(StrategyError::InvalidParameters(
                "Short MA window cannot be zero".to_string(),
            ));
        }
        if params.short_window >= params.long_window {
            return Err(StrategyError::InvalidParameters(
                "Short MA window must be less than Long MA window".to_string(),
            ));
        }
        Ok(Self {
            short_window: params.short_window,
            long_window: params.long_window,
        })
    }

    pub fn short_window(&self) -> usize {
        self.short_window
    }

    pub fn long_window(&self) -> usize {
        self.long_window
    }
}

impl Strategy for SmaCrossover {
    fn id(&self) -> StrategyId {
        StrategyId::Momentum
    }

    fn generate_signals(&self, input: &PriceInput) -> Result<SignalFrame, StrategyError> {
        let mut short = Sma::new(self.short_window)
            .map_err(|e| StrategyError::IndicatorError(format!("short SMA: {e:?}")))?;
        let mut long = Sma::new(self.long_window)
            .map_err(|e| StrategyError::IndicatorError(format!("long SMA: {e:?}")))?;

        // `ta` averages over whatever it has seen so far; rows before the long
        // window is full are masked to flat.
        let warmup = self.long_window - 1;
        let signals: Vec<f64> = input
            .closes()
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let fast = short.next(close);
                let slow = long.next(close);
                if i >= warmup && fast > slow { 1.0 } else { 0.0 }
            })
            .collect();

        tracing::debug!(
            short = self.short_window,
            long = self.long_window,
            bars = signals.len(),
            long_bars = signals.iter().filter(|s| **s > 0.0).count(),
            "SmaCrossover: signals generated"
        );
        Ok(SignalFrame { signals, warmup })
    }
}
