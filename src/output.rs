//! Terminal tables for the CLI commands.

use analytics::MetricsReport;
use analyzer::AnalysisOutcome;
use comfy_table::{Table, presets::UTF8_FULL};
use portfolio_backtester::PortfolioOutcome;

const PERCENT_ROWS: [&str; 4] = ["Cumulative Return", "Annual Return", "Annual Volatility", "Max Drawdown"];

fn metric(name: &str, value: f64) -> String {
    if !value.is_finite() {
        "n/a".to_string()
    } else if PERCENT_ROWS.contains(&name) {
        format!("{:+.2}%", value * 100.0)
    } else {
        format!("{:.2}", value)
    }
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    table
}

pub fn metrics_table(report: &MetricsReport) -> Table {
    let mut t = table(vec!["Metric", "Value"]);
    for (name, value) in report.rows() {
        t.add_row(vec![name.to_string(), metric(name, value)]);
    }
    t
}

pub fn print_analysis(outcome: &AnalysisOutcome) {
    let regime = &outcome.regime;
    println!("{} last close {:.2}", outcome.symbol, outcome.current_price);
    println!(
        "Efficiency ratio {:.2} ({}), Hurst {:.2}, suggested: {}",
        regime.efficiency_ratio, regime.regime, regime.hurst, regime.suggested
    );
    match outcome.momentum_windows {
        Some(w) => println!("Ran {} with windows {}/{}", outcome.strategy, w.short_window, w.long_window),
        None => println!("Ran {}", outcome.strategy),
    }

    let backtest = &outcome.backtest;
    let mut t = table(vec!["Metric", "Strategy", "Buy & Hold", "Difference"]);
    let rows = backtest
        .metrics
        .rows()
        .into_iter()
        .zip(backtest.benchmark.rows())
        .zip(outcome.excess.rows());
    for (((name, strategy), (_, benchmark)), (_, excess)) in rows {
        t.add_row(vec![
            name.to_string(),
            metric(name, strategy),
            metric(name, benchmark),
            metric(name, excess),
        ]);
    }
    println!("{t}");

    if let Some(forecast) = &outcome.forecast {
        let label = format!("{:.0}% band", forecast.confidence * 100.0);
        let mut t = table(vec!["Date", "Forecast", "Lower", "Upper"]);
        for i in 0..forecast.dates.len() {
            t.add_row(vec![
                forecast.dates[i].format("%Y-%m-%d").to_string(),
                format!("{:.2}", forecast.mean[i]),
                format!("{:.2}", forecast.lower[i]),
                format!("{:.2}", forecast.upper[i]),
            ]);
        }
        println!("Forecast ({label})");
        println!("{t}");
    }
}

pub fn print_portfolio(outcome: &PortfolioOutcome) {
    if let (Some(first), Some(last)) = (outcome.prices.first_date(), outcome.last_date()) {
        println!(
            "{} from {} to {}",
            outcome.prices.symbols().join(", "),
            first.format("%Y-%m-%d"),
            last.format("%Y-%m-%d")
        );
    }
    if let Some(value) = outcome.final_value() {
        println!("Final value (base 1): {:.4}", value);
    }
    println!("{}", metrics_table(&outcome.metrics));

    let weights = &outcome.latest_weights;
    let mut header = vec!["Date"];
    header.extend(weights.symbols.iter().map(String::as_str));
    let mut t = table(header);
    for (date, row) in weights.dates.iter().zip(&weights.rows) {
        let mut cells = vec![date.format("%Y-%m-%d").to_string()];
        cells.extend(row.iter().map(|w| format!("{:.1}%", w * 100.0)));
        t.add_row(cells);
    }
    println!("Latest weights");
    println!("{t}");

    let corr = &outcome.correlation;
    let mut header = vec![""];
    header.extend(corr.symbols.iter().map(String::as_str));
    let mut t = table(header);
    for (symbol, row) in corr.symbols.iter().zip(&corr.values) {
        let mut cells = vec![symbol.clone()];
        cells.extend(row.iter().map(|c| if c.is_finite() { format!("{:.2}", c) } else { "n/a".to_string() }));
        t.add_row(cells);
    }
    println!("Correlation of daily returns");
    println!("{t}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentages_and_ratios_format_differently() {
        assert_eq!(metric("Max Drawdown", -0.1234), "-12.34%");
        assert_eq!(metric("Sharpe Ratio", 1.234), "1.23");
        assert_eq!(metric("Sortino Ratio", f64::NAN), "n/a");
    }
}
