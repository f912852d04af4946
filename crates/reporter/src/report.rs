use crate::error::ReportError;
use analytics::metrics;
use chrono::{NaiveDate, NaiveDateTime};
use core_types::PriceTable;
use serde::Serialize;

const RULE_WIDTH: usize = 70;

/// Latest prices and trailing risk for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolSnapshot {
    pub symbol: String,
    pub open: f64,
    pub close: f64,
    pub volatility: f64,
    pub max_drawdown: f64,
}

/// Annualized volatility and max drawdown of a return series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskFigures {
    pub volatility: f64,
    pub max_drawdown: f64,
}

impl RiskFigures {
    /// Both figures are `NaN` for an empty series.
    pub fn from_returns(returns: &[f64]) -> Self {
        if returns.is_empty() {
            return Self { volatility: f64::NAN, max_drawdown: f64::NAN };
        }
        Self {
            volatility: metrics::annualized_volatility(returns),
            max_drawdown: metrics::max_drawdown_from_returns(returns),
        }
    }
}

/// The daily snapshot written to `daily_report_<date>.txt`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReport {
    pub generated_at: NaiveDateTime,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub snapshots: Vec<SymbolSnapshot>,
    /// Equal-weight rollup of every symbol's daily returns.
    pub portfolio: RiskFigures,
}

impl DailyReport {
    /// Builds the report from an open/close table.
    ///
    /// The table is cleaned first, so only dates where every symbol has a
    /// close are used.
    pub fn compute(table: &PriceTable, generated_at: NaiveDateTime) -> Result<Self, ReportError> {
        let cleaned = table.clean();
        let (Some(first), Some(last)) = (cleaned.first_date(), cleaned.last_date()) else {
            return Err(ReportError::DataUnavailable(
                "no date has a close for every symbol".to_string(),
            ));
        };
        if cleaned.symbols().is_empty() {
            return Err(ReportError::DataUnavailable("no symbols".to_string()));
        }

        let mut snapshots = Vec::with_capacity(cleaned.symbols().len());
        let mut return_columns = Vec::with_capacity(cleaned.symbols().len());
        for symbol in cleaned.symbols() {
            let Some(column) = cleaned.column(symbol) else {
                continue;
            };
            let returns: Vec<f64> = column.windows(2).map(|w| w[1].close / w[0].close - 1.0).collect();
            let risk = RiskFigures::from_returns(&returns);
            let latest = column[column.len() - 1];

            snapshots.push(SymbolSnapshot {
                symbol: symbol.clone(),
                open: latest.open,
                close: latest.close,
                volatility: risk.volatility,
                max_drawdown: risk.max_drawdown,
            });
            return_columns.push(returns);
        }

        let n = return_columns.len() as f64;
        let rows = return_columns.first().map_or(0, Vec::len);
        let portfolio_returns: Vec<f64> = (0..rows)
            .map(|i| return_columns.iter().map(|col| col[i]).sum::<f64>() / n)
            .collect();

        Ok(Self {
            generated_at,
            window_start: first.date_naive(),
            window_end: last.date_naive(),
            snapshots,
            portfolio: RiskFigures::from_returns(&portfolio_returns),
        })
    }

    pub fn date(&self) -> NaiveDate {
        self.generated_at.date()
    }

    pub fn file_name(&self) -> String {
        crate::store::report_file_name(self.date())
    }

    /// Renders the fixed text layout the downstream parser expects.
    pub fn render(&self) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        let tickers: Vec<&str> = self.snapshots.iter().map(|s| s.symbol.as_str()).collect();

        let mut lines = vec![
            heavy.clone(),
            "DAILY FINANCIAL REPORT".to_string(),
            heavy,
            format!("Generated: {}", self.generated_at.format("%Y-%m-%d %H:%M:%S")),
            format!("Tickers: {}", tickers.join(", ")),
            format!("Data window: {} -> {}", self.window_start, self.window_end),
            String::new(),
        ];

        lines.push(light.clone());
        lines.push("OPEN / CLOSE (latest trading day)".to_string());
        lines.push(light.clone());
        lines.push(format!("Last date: {}\n", self.window_end));
        for s in &self.snapshots {
            lines.push(format!(
                "{:<6} | Open: {} | Close: {}",
                s.symbol,
                fixed(s.open),
                fixed(s.close)
            ));
        }
        lines.push(String::new());

        lines.push(light.clone());
        lines.push("RISK METRICS (based on daily returns)".to_string());
        lines.push(light.clone());
        for s in &self.snapshots {
            lines.push(format!(
                "{:<6} | Vol (ann.): {} | Max Drawdown: {}",
                s.symbol,
                percent(s.volatility),
                percent(s.max_drawdown)
            ));
        }
        lines.push(String::new());

        lines.push(light.clone());
        lines.push("BONUS: EQUAL-WEIGHT PORTFOLIO".to_string());
        lines.push(light);
        lines.push(format!(
            "Portfolio | Vol (ann.): {} | Max Drawdown: {}",
            percent(self.portfolio.volatility),
            percent(self.portfolio.max_drawdown)
        ));
        lines.push(String::new());

        lines.join("\n")
    }
}

fn non_finite(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("nan")
    } else if value == f64::INFINITY {
        Some("inf")
    } else if value == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

/// Width 10, four decimals.
fn fixed(value: f64) -> String {
    match non_finite(value) {
        Some(text) => format!("{:>10}", text),
        None => format!("{:10.4}", value),
    }
}

/// Width 8, two decimals, as a percentage.
fn percent(value: f64) -> String {
    let text = match non_finite(value) {
        Some(text) => format!("{}%", text),
        None => format!("{:.2}%", value * 100.0),
    };
    format!("{:>8}", text)
}
