//! Pure performance and risk metrics over plain `f64` slices.
//!
//! Each function documents its own convention for degenerate input. Prices
//! and equity values are levels; returns are simple period returns.

/// Trading days per year used for every annualisation.
pub const TRADING_DAYS: f64 = 252.0;

/// Deviations at or below this are treated as zero.
const ZERO_DEVIATION: f64 = 1e-15;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1). `NaN` for fewer than two points.
pub fn sample_std(values: &[f64]) -> f64 {
    deviation(values, 1)
}

/// Population standard deviation (ddof = 0). `NaN` when empty.
pub fn population_std(values: &[f64]) -> f64 {
    deviation(values, 0)
}

fn deviation(values: &[f64], ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(values);
    let ss: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    (ss / (n - ddof) as f64).sqrt()
}

/// Converts an annual risk-free rate into its compounded daily equivalent.
pub fn daily_risk_free(rf_annual: f64) -> f64 {
    (1.0 + rf_annual).powf(1.0 / TRADING_DAYS) - 1.0
}

/// `last / first - 1`. `0.0` for an empty series.
pub fn cumulative_return(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) => last / first - 1.0,
        _ => 0.0,
    }
}

/// Sample standard deviation of the returns scaled by `sqrt(252)`.
/// `NaN` when fewer than two returns are available.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    sample_std(returns) * TRADING_DAYS.sqrt()
}

/// Geometric annual return `prod(1 + r)^(252 / n) - 1`. `NaN` when empty.
pub fn annualized_return(returns: &[f64]) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let growth: f64 = returns.iter().map(|r| 1.0 + r).product();
    growth.powf(TRADING_DAYS / returns.len() as f64) - 1.0
}

/// Annualised mean excess return over its sample deviation.
///
/// `NaN` for empty input, `0.0` when the deviation is zero or undefined.
pub fn sharpe_ratio(returns: &[f64], rf_annual: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let rf = daily_risk_free(rf_annual);
    let excess: Vec<f64> = returns.iter().map(|r| r - rf).collect();
    let std = sample_std(&excess);
    if !std.is_finite() || std <= ZERO_DEVIATION {
        return 0.0;
    }
    mean(&excess) / std * TRADING_DAYS.sqrt()
}

/// Like [`sharpe_ratio`] but the denominator is the sample deviation of the
/// excess returns that fall strictly below `target`.
///
/// `NaN` for empty input, `0.0` when fewer than two returns fall below the
/// target or they do not vary.
pub fn sortino_ratio(returns: &[f64], rf_annual: f64, target: f64) -> f64 {
    if returns.is_empty() {
        return f64::NAN;
    }
    let rf = daily_risk_free(rf_annual);
    let excess: Vec<f64> = returns.iter().map(|r| r - rf).collect();
    let downside: Vec<f64> = excess.iter().copied().filter(|r| *r < target).collect();
    let std = sample_std(&downside);
    if !std.is_finite() || std <= ZERO_DEVIATION {
        return 0.0;
    }
    mean(&excess) / std * TRADING_DAYS.sqrt()
}

/// Compounds returns into an equity curve: `v[t] = prod(1 + r[..=t])`.
pub fn equity_curve(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |value, r| {
            *value *= 1.0 + r;
            Some(*value)
        })
        .collect()
}

/// `v[t] / max(v[..=t]) - 1` at every point. Non-finite values are skipped
/// when tracking the running peak.
pub fn drawdown_series(values: &[f64]) -> Vec<f64> {
    let mut peak = f64::NAN;
    values
        .iter()
        .map(|&v| {
            peak = peak.max(v);
            v / peak - 1.0
        })
        .collect()
}

/// Largest peak-to-trough decline, as a non-positive fraction.
/// `0.0` for an empty or monotone non-decreasing series.
pub fn max_drawdown(values: &[f64]) -> f64 {
    drawdown_series(values)
        .into_iter()
        .filter(|d| d.is_finite())
        .fold(0.0, f64::min)
}

/// Maximum drawdown of `cumprod(1 + r)`, without prepending a 1.0 base.
/// A loss on the very first return is therefore not counted.
pub fn max_drawdown_from_returns(returns: &[f64]) -> f64 {
    max_drawdown(&equity_curve(returns))
}

/// Estimates the Hurst exponent from the scaling of lagged price differences.
///
/// Uses lags `2..max_lag`. Returns `0.5` (a random walk) whenever the
/// estimate cannot be formed.
pub fn hurst_exponent(prices: &[f64], max_lag: usize) -> f64 {
    const RANDOM_WALK: f64 = 0.5;

    if max_lag < 4 || prices.len() <= max_lag || prices.iter().any(|p| !p.is_finite() || *p <= 0.0) {
        return RANDOM_WALK;
    }

    let mut log_lags = Vec::with_capacity(max_lag - 2);
    let mut log_tau = Vec::with_capacity(max_lag - 2);
    for lag in 2..max_lag {
        let diffs: Vec<f64> = prices[lag..]
            .iter()
            .zip(prices)
            .map(|(later, earlier)| later - earlier)
            .collect();
        let tau = population_std(&diffs).sqrt();
        if !tau.is_finite() || tau <= 0.0 {
            return RANDOM_WALK;
        }
        log_lags.push((lag as f64).ln());
        log_tau.push(tau.ln());
    }

    let x_mean = mean(&log_lags);
    let y_mean = mean(&log_tau);
    let sxx: f64 = log_lags.iter().map(|x| (x - x_mean).powi(2)).sum();
    let sxy: f64 = log_lags
        .iter()
        .zip(&log_tau)
        .map(|(x, y)| (x - x_mean) * (y - y_mean))
        .sum();
    let hurst = sxy / sxx * 2.0;
    if hurst.is_finite() { hurst } else { RANDOM_WALK }
}

/// Pearson correlation over the common prefix of `a` and `b`.
/// `NaN` when either side has zero variance or fewer than two points.
pub fn pearson_correlation(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return f64::NAN;
    }
    let (a, b) = (&a[..n], &b[..n]);
    let (ma, mb) = (mean(a), mean(b));
    let mut cov = 0.0;
    let mut va = 0.0;
    let mut vb = 0.0;
    for (x, y) in a.iter().zip(b) {
        cov += (x - ma) * (y - mb);
        va += (x - ma).powi(2);
        vb += (y - mb).powi(2);
    }
    if va <= ZERO_DEVIATION || vb <= ZERO_DEVIATION {
        return f64::NAN;
    }
    cov / (va.sqrt() * vb.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn max_drawdown_matches_hand_computed_value() {
        let dd = max_drawdown(&[1.0, 1.1, 1.05, 1.2]);
        assert!((dd - (1.05 / 1.1 - 1.0)).abs() < 1e-12);
        assert!((dd + 0.0455).abs() < 1e-4);
    }

    #[test]
    fn max_drawdown_is_zero_for_monotone_and_empty_series() {
        assert_eq!(max_drawdown(&[1.0, 2.0, 3.0, 3.0, 4.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn max_drawdown_is_never_positive() {
        let values = [3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0];
        assert!(max_drawdown(&values) <= 0.0);
        assert!(drawdown_series(&values).iter().all(|d| *d <= 0.0));
    }

    #[test]
    fn ratios_are_zero_when_returns_do_not_vary() {
        let flat = [0.01; 20];
        assert_eq!(sharpe_ratio(&flat, 0.0), 0.0);
        assert_eq!(sortino_ratio(&flat, 0.0, 0.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.02], 0.0), 0.0);
    }

    #[test]
    fn empty_input_conventions() {
        assert!(sharpe_ratio(&[], 0.0).is_nan());
        assert!(sortino_ratio(&[], 0.0, 0.0).is_nan());
        assert!(annualized_volatility(&[]).is_nan());
        assert!(annualized_volatility(&[0.01]).is_nan());
        assert!(annualized_return(&[]).is_nan());
        assert_eq!(cumulative_return(&[]), 0.0);
    }

    #[test]
    fn sharpe_uses_daily_excess_over_sample_deviation() {
        let returns = [0.01, -0.005, 0.007, 0.002, -0.001];
        let m = mean(&returns);
        let s = sample_std(&returns);
        assert!(close(sharpe_ratio(&returns, 0.0), m / s * TRADING_DAYS.sqrt()));

        // A positive risk-free rate can only lower the ratio.
        assert!(sharpe_ratio(&returns, 0.05) < sharpe_ratio(&returns, 0.0));
    }

    #[test]
    fn sortino_only_counts_returns_below_target() {
        let returns = [0.02, -0.01, 0.03, -0.03, 0.01];
        let downside = [-0.01, -0.03];
        let expected = mean(&returns) / sample_std(&downside) * TRADING_DAYS.sqrt();
        assert!(close(sortino_ratio(&returns, 0.0, 0.0), expected));
    }

    #[test]
    fn equity_curve_compounds_and_drawdown_from_returns_has_no_base() {
        let curve = equity_curve(&[0.1, -0.5, 0.2]);
        assert!(close(curve[0], 1.1));
        assert!(close(curve[1], 0.55));
        assert!(close(curve[2], 0.66));
        // An initial loss is not a drawdown without a 1.0 base row.
        assert_eq!(max_drawdown_from_returns(&[-0.2, 0.1]), 0.0);
    }

    #[test]
    fn annualized_return_of_constant_daily_return() {
        let returns = vec![0.001; 252];
        assert!(close(annualized_return(&returns), 1.001f64.powf(252.0) - 1.0));
    }

    #[test]
    fn hurst_falls_back_to_random_walk() {
        assert_eq!(hurst_exponent(&[1.0, 2.0, 3.0], 20), 0.5);
        assert_eq!(hurst_exponent(&[1.0; 40], 20), 0.5);
        let mut with_zero: Vec<f64> = (1..50).map(f64::from).collect();
        with_zero[10] = 0.0;
        assert_eq!(hurst_exponent(&with_zero, 20), 0.5);
    }

    #[test]
    fn hurst_of_a_random_walk_is_near_one_half() {
        // Deterministic LCG steps of +/-1 around a positive level.
        let mut state: u64 = 42;
        let mut price = 1_000.0;
        let prices: Vec<f64> = (0..2_000)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                price += if (state >> 33) & 1 == 0 { 1.0 } else { -1.0 };
                price
            })
            .collect();
        let h = hurst_exponent(&prices, 20);
        assert!((0.2..0.8).contains(&h), "hurst = {h}");
    }

    #[test]
    fn correlation_bounds_and_degenerate_cases() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [4.0, 3.0, 2.0, 1.0];
        assert!(close(pearson_correlation(&a, &b), 1.0));
        assert!(close(pearson_correlation(&a, &c), -1.0));
        assert!(pearson_correlation(&a, &[5.0; 4]).is_nan());
    }
}
