use core_types::{Interval, Period, RebalanceFrequency, StrategyId, WeightMode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
///
/// Every section has defaults, so an empty or missing `config.toml` yields a
/// runnable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataSettings,
    pub strategies: Strategies,
    pub analysis: AnalysisSettings,
    pub portfolio: PortfolioSettings,
    pub report: ReportSettings,
    pub logging: LoggingSettings,
    pub server: ServerSettings,
}

/// Market data provider and cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Root of the chart API, without a trailing slash.
    pub base_url: String,
    /// How long a fetched price table stays valid in the cache.
    #[serde(with = "humantime_serde")]
    pub cache_ttl: Duration,
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            cache_ttl: Duration::from_secs(300),
            request_timeout: Duration::from_secs(15),
        }
    }
}

/// Contains the parameter sets for all available strategies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Strategies {
    pub momentum: MomentumParams,
    pub adx: AdxParams,
    pub regime: RegimeParams,
}

/// Parameters for the moving average crossover strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for MomentumParams {
    fn default() -> Self {
        Self { short_window: 20, long_window: 50 }
    }
}

impl MomentumParams {
    /// Windows scaled to how noisy the market is: a low efficiency ratio
    /// (choppy prices) asks for slower averages.
    pub fn suggested(efficiency_ratio: f64) -> Self {
        let er = if efficiency_ratio.is_finite() {
            efficiency_ratio.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let smooth = 1.0 - er;
        let short_window = (5.0 + 45.0 * smooth) as usize;
        let mut long_window = (20.0 + 180.0 * smooth) as usize;
        if long_window <= short_window {
            long_window = short_window + 10;
        }
        Self { short_window, long_window }
    }
}

/// Parameters for the ADX / directional movement strategy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdxParams {
    /// Wilder smoothing window.
    pub window: usize,
    /// Minimum ADX for a long entry.
    pub threshold: f64,
}

impl Default for AdxParams {
    fn default() -> Self {
        Self { window: 14, threshold: 25.0 }
    }
}

/// Parameters for the efficiency ratio regime classifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegimeParams {
    pub period: usize,
    /// ER strictly above this is a trending market.
    pub threshold: f64,
    /// Largest lag used for the Hurst exponent hint.
    pub hurst_max_lag: usize,
}

impl Default for RegimeParams {
    fn default() -> Self {
        Self { period: 30, threshold: 0.3, hurst_max_lag: 20 }
    }
}

/// Which single-asset strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    /// Follow the regime classifier's suggestion.
    #[default]
    Auto,
    Momentum,
    Adx,
}

impl StrategyChoice {
    pub fn resolve(self, suggested: StrategyId) -> StrategyId {
        match self {
            StrategyChoice::Auto => suggested,
            StrategyChoice::Momentum => StrategyId::Momentum,
            StrategyChoice::Adx => StrategyId::Adx,
        }
    }
}

/// Defaults for a single-asset analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub symbol: String,
    pub period: Period,
    pub interval: Interval,
    pub strategy: StrategyChoice,
    /// Derive momentum windows from the efficiency ratio instead of
    /// `[strategies.momentum]`.
    pub tune_windows: bool,
    pub risk_free_rate: f64,
    pub forecast: ForecastParams,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            symbol: "BTC-USD".to_string(),
            period: Period::TwoYears,
            interval: Interval::Daily,
            strategy: StrategyChoice::Auto,
            tune_windows: true,
            risk_free_rate: 0.0,
            forecast: ForecastParams::default(),
        }
    }
}

/// Parameters for the autoregressive price forecast.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastParams {
    pub enabled: bool,
    /// Autoregressive order of the differenced model.
    pub order: usize,
    pub horizon: usize,
    /// Coverage of the forecast band, e.g. `0.95`.
    pub confidence: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self { enabled: true, order: 5, horizon: 7, confidence: 0.95 }
    }
}

/// Defaults for a portfolio backtest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioSettings {
    pub symbols: Vec<String>,
    pub period: Period,
    pub interval: Interval,
    pub weight_mode: WeightMode,
    /// Raw weights used when `weight_mode = "custom"`; normalised at use.
    pub custom_weights: BTreeMap<String, f64>,
    pub rebalance: RebalanceFrequency,
    pub risk_free_rate: f64,
}

impl Default for PortfolioSettings {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string(), "MSFT".to_string(), "GOOGL".to_string()],
            period: Period::FiveYears,
            interval: Interval::Daily,
            weight_mode: WeightMode::Equal,
            custom_weights: BTreeMap::new(),
            rebalance: RebalanceFrequency::Monthly,
            risk_free_rate: 0.0,
        }
    }
}

/// Settings for the daily report batch job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub symbols: Vec<String>,
    pub period: Period,
    pub interval: Interval,
    pub output_dir: PathBuf,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            symbols: vec!["AAPL".to_string(), "MSFT".to_string(), "GOOGL".to_string()],
            period: Period::SixMonths,
            interval: Interval::Daily,
            output_dir: PathBuf::from("reports"),
        }
    }
}

/// Log filtering and the optional rolling log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub level: String,
    /// Directory for daily-rolling log files. Stdout only when unset.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "quantdash.log".to_string(),
        }
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// How often the dashboard should re-query. Advertised to clients only.
    #[serde(with = "humantime_serde")]
    pub refresh_interval: Duration,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            refresh_interval: Duration::from_secs(300),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suggested_windows_follow_efficiency_ratio() {
        assert_eq!(
            MomentumParams::suggested(0.0),
            MomentumParams { short_window: 50, long_window: 200 }
        );
        assert_eq!(
            MomentumParams::suggested(1.0),
            MomentumParams { short_window: 5, long_window: 20 }
        );
        let mid = MomentumParams::suggested(0.5);
        assert_eq!(mid, MomentumParams { short_window: 27, long_window: 110 });
        assert!(MomentumParams::suggested(f64::NAN).long_window > MomentumParams::suggested(f64::NAN).short_window);
    }

    #[test]
    fn auto_choice_defers_to_suggestion() {
        assert_eq!(StrategyChoice::Auto.resolve(StrategyId::Adx), StrategyId::Adx);
        assert_eq!(StrategyChoice::Momentum.resolve(StrategyId::Adx), StrategyId::Momentum);
    }
}
