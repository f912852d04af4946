use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    AdxParams, AnalysisSettings, Config, DataSettings, ForecastParams, LoggingSettings,
    MomentumParams, PortfolioSettings, RegimeParams, ReportSettings, ServerSettings,
    Strategies, StrategyChoice,
};

/// Prefix of the environment variables that override file settings, e.g.
/// `QUANTDASH__ANALYSIS__SYMBOL=ETH-USD`.
pub const ENV_PREFIX: &str = "QUANTDASH";

/// Loads the application configuration.
///
/// Values are layered: built-in defaults, then the TOML file at `path` (if it
/// exists), then `QUANTDASH__SECTION__KEY` environment variables. The result
/// is validated before it is returned.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("portfolio.symbols")
                .with_list_parse_key("report.symbols")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;
    tracing::debug!(path = %path.as_ref().display(), "configuration loaded");
    Ok(config)
}

/// Checks cross-field constraints that serde cannot express.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let fail = |msg: String| Err(ConfigError::ValidationError(msg));

    let m = &config.strategies.momentum;
    if m.short_window == 0 || m.short_window >= m.long_window {
        return fail(format!(
            "momentum windows must satisfy 0 < short < long (got {} / {})",
            m.short_window, m.long_window
        ));
    }
    let adx = &config.strategies.adx;
    if adx.window == 0 {
        return fail("adx window cannot be zero".to_string());
    }
    if !(0.0..=100.0).contains(&adx.threshold) {
        return fail(format!("adx threshold must be within 0..=100 (got {})", adx.threshold));
    }
    let regime = &config.strategies.regime;
    if regime.period == 0 {
        return fail("regime period cannot be zero".to_string());
    }

    let forecast = &config.analysis.forecast;
    if forecast.order == 0 || forecast.horizon == 0 {
        return fail("forecast order and horizon must be positive".to_string());
    }
    if !(forecast.confidence > 0.0 && forecast.confidence < 1.0) {
        return fail(format!(
            "forecast confidence must be within (0, 1) (got {})",
            forecast.confidence
        ));
    }

    if config.portfolio.symbols.len() < 3 {
        return fail(format!(
            "portfolio needs at least 3 symbols (got {})",
            config.portfolio.symbols.len()
        ));
    }
    if config.report.symbols.is_empty() {
        return fail("report needs at least one symbol".to_string());
    }
    if config.data.cache_ttl.is_zero() {
        return fail("data.cache_ttl must be positive".to_string());
    }
    Ok(())
}
