use analytics::{AnalyticsEngine, MetricsProvider};
use analyzer::{AnalysisRequest, Analyzer};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use configuration::{Config, StrategyChoice, init_tracing, load_config};
use core_types::{Interval, Period, PriceRange, RebalanceFrequency, WeightMode, parse_symbols};
use indicatif::{ProgressBar, ProgressStyle};
use market_data::{PriceProvider, YahooClient};
use portfolio_backtester::{PortfolioManager, PortfolioRequest, WeightScheme};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

mod output;

/// The main entry point for the quantdash research tool.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file, if there is one.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    let _guard = init_tracing(&config.logging)?;

    match cli.command {
        Commands::Analyze(args) => handle_analyze(args, config).await,
        Commands::Portfolio(args) => handle_portfolio(args, config).await,
        Commands::Report(args) => handle_report(args, config).await,
        Commands::Serve(args) => handle_serve(args, config).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Strategy backtests, portfolio analytics and daily reports over historical prices.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify the market regime, backtest a strategy and forecast one asset.
    Analyze(AnalyzeArgs),
    /// Backtest a rebalanced multi-asset portfolio.
    Portfolio(PortfolioArgs),
    /// Write today's daily report file.
    Report(ReportArgs),
    /// Run the HTTP API for the dashboard.
    Serve(ServeArgs),
}

#[derive(Parser)]
struct AnalyzeArgs {
    /// Ticker to analyze (e.g., "BTC-USD").
    #[arg(long)]
    symbol: Option<String>,

    /// Look-back period: 1mo, 6mo, 1y, 2y, 5y, 10y or max.
    #[arg(long)]
    period: Option<Period>,

    /// Bar size: 1d or 1h.
    #[arg(long)]
    interval: Option<Interval>,

    /// Strategy to run; `auto` follows the regime classifier.
    #[arg(long, value_enum)]
    strategy: Option<StrategyChoice>,

    /// Only keep bars on or after this date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Only keep bars on or before this date (YYYY-MM-DD).
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Use the configured momentum windows instead of ER-tuned ones.
    #[arg(long)]
    no_tune: bool,

    /// Annual risk-free rate, e.g. 0.02.
    #[arg(long)]
    risk_free: Option<f64>,

    /// Skip the price forecast.
    #[arg(long)]
    no_forecast: bool,
}

#[derive(Parser)]
struct PortfolioArgs {
    /// Comma-separated tickers, at least three.
    #[arg(long)]
    symbols: Option<String>,

    #[arg(long)]
    period: Option<Period>,

    #[arg(long)]
    interval: Option<Interval>,

    /// `equal` or `custom`.
    #[arg(long)]
    weights: Option<WeightMode>,

    /// Raw custom weight as SYMBOL=VALUE; repeatable. Implies custom weights.
    #[arg(long = "weight", value_parser = parse_weight)]
    custom: Vec<(String, f64)>,

    /// none, weekly or monthly.
    #[arg(long)]
    rebalance: Option<RebalanceFrequency>,

    #[arg(long)]
    risk_free: Option<f64>,
}

#[derive(Parser)]
struct ReportArgs {
    /// Directory for the report file; overrides `[report].output_dir`.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Parser)]
struct ServeArgs {
    #[arg(long)]
    port: Option<u16>,
}

fn parse_weight(raw: &str) -> Result<(String, f64), String> {
    let (symbol, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SYMBOL=VALUE, got '{raw}'"))?;
    let value: f64 = value.trim().parse().map_err(|e| format!("invalid weight '{value}': {e}"))?;
    Ok((symbol.trim().to_uppercase(), value))
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

fn provider(config: &Config) -> anyhow::Result<Arc<dyn PriceProvider>> {
    Ok(Arc::new(YahooClient::new(&config.data)?))
}

// ==============================================================================
// Command Logic
// ==============================================================================

async fn handle_analyze(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let mut request = AnalysisRequest::from_settings(&config.analysis);
    if let Some(symbol) = args.symbol {
        request.symbol = symbol.trim().to_uppercase();
    }
    if let Some(period) = args.period {
        request.range = PriceRange::Period(period);
    }
    request.interval = args.interval.unwrap_or(request.interval);
    request.strategy = args.strategy.unwrap_or(request.strategy);
    request.start = args.start;
    request.end = args.end;
    request.tune_windows &= !args.no_tune;
    request.risk_free_rate = args.risk_free.unwrap_or(request.risk_free_rate);
    request.forecast.enabled &= !args.no_forecast;

    let metrics: Arc<dyn MetricsProvider> = Arc::new(AnalyticsEngine::new());
    let analyzer = Analyzer::new(provider(&config)?, metrics, config.strategies.clone());

    let pb = spinner(&format!("Analyzing {}...", request.symbol))?;
    let outcome = analyzer.run(&request).await;
    pb.finish_and_clear();

    output::print_analysis(&outcome?);
    Ok(())
}

async fn handle_portfolio(args: PortfolioArgs, config: Config) -> anyhow::Result<()> {
    let mut request = PortfolioRequest::from_settings(&config.portfolio);
    if let Some(symbols) = args.symbols.as_deref() {
        request.symbols = parse_symbols(symbols);
    }
    if let Some(period) = args.period {
        request.range = PriceRange::Period(period);
    }
    request.interval = args.interval.unwrap_or(request.interval);
    if !args.custom.is_empty() {
        request.weights = WeightScheme::Custom(args.custom.into_iter().collect());
    } else if let Some(mode) = args.weights {
        request.weights = match mode {
            WeightMode::Equal => WeightScheme::Equal,
            WeightMode::Custom => WeightScheme::Custom(config.portfolio.custom_weights.clone()),
        };
    }
    request.rebalance = args.rebalance.unwrap_or(request.rebalance);
    request.risk_free_rate = args.risk_free.unwrap_or(request.risk_free_rate);

    let metrics: Arc<dyn MetricsProvider> = Arc::new(AnalyticsEngine::new());
    let manager = PortfolioManager::new(provider(&config)?, metrics);

    let pb = spinner(&format!("Backtesting {}...", request.symbols.join(", ")))?;
    let outcome = manager.run(&request).await;
    pb.finish_and_clear();

    output::print_portfolio(&outcome?);
    Ok(())
}

async fn handle_report(args: ReportArgs, config: Config) -> anyhow::Result<()> {
    let mut settings = config.report.clone();
    if let Some(dir) = args.output_dir {
        settings.output_dir = dir;
    }
    let provider = provider(&config)?;

    let pb = spinner("Generating daily report...")?;
    let result = reporter::generate_daily_report(provider.as_ref(), &settings, Local::now().naive_local()).await;
    pb.finish_and_clear();

    let path = result?;
    println!("Report written to: {}", path.display());
    Ok(())
}

async fn handle_serve(args: ServeArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    web_server::run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_arguments_parse() {
        assert_eq!(parse_weight("aapl=0.5").unwrap(), ("AAPL".to_string(), 0.5));
        assert!(parse_weight("AAPL:0.5").is_err());
    }

    #[test]
    fn cli_parses_portfolio_flags() {
        let cli = Cli::try_parse_from([
            "quantdash", "portfolio", "--symbols", "AAPL,MSFT,GOOGL", "--rebalance", "W", "--weight", "AAPL=2",
        ])
        .unwrap();
        let Commands::Portfolio(args) = cli.command else {
            panic!("expected the portfolio command");
        };
        assert_eq!(args.rebalance, Some(RebalanceFrequency::Weekly));
        assert_eq!(args.custom, vec![("AAPL".to_string(), 2.0)]);
    }
}
