//! Indicator building blocks not provided by `ta`.

use ta::{Next, Reset};

/// Wilder's smoothing: an exponential average with `alpha = 1 / period`,
/// seeded with the first observation.
///
/// Missing (`NaN`) inputs before the first observation yield `NaN`. After
/// that, a missing input repeats the current average while the weight of the
/// history keeps decaying, so the next real observation counts for more.
#[derive(Debug, Clone)]
pub struct WilderSmoother {
    alpha: f64,
    average: Option<f64>,
    history_weight: f64,
}

impl WilderSmoother {
    pub fn new(period: usize) -> Result<Self, ta::errors::TaError> {
        if period == 0 {
            return Err(ta::errors::TaError::InvalidParameter);
        }
        Ok(Self {
            alpha: 1.0 / period as f64,
            average: None,
            history_weight: 1.0,
        })
    }

    /// Smooths a whole column.
    pub fn smooth(period: usize, values: &[f64]) -> Result<Vec<f64>, ta::errors::TaError> {
        let mut smoother = Self::new(period)?;
        Ok(values.iter().map(|v| smoother.next(*v)).collect())
    }
}

impl Next<f64> for WilderSmoother {
    type Output = f64;

    fn next(&mut self, input: f64) -> f64 {
        let Some(average) = self.average else {
            if input.is_nan() {
                return f64::NAN;
            }
            self.average = Some(input);
            self.history_weight = 1.0;
            return input;
        };

        self.history_weight *= 1.0 - self.alpha;
        if input.is_nan() {
            return average;
        }
        let updated = (self.history_weight * average + self.alpha * input)
            / (self.history_weight + self.alpha);
        self.history_weight = 1.0;
        self.average = Some(updated);
        updated
    }
}

impl Reset for WilderSmoother {
    fn reset(&mut self) {
        self.average = None;
        self.history_weight = 1.0;
    }
}
