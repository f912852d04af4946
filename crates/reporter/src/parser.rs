use crate::error::ReportError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceLine {
    pub symbol: String,
    pub open: f64,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskLine {
    pub symbol: String,
    pub volatility: f64,
    pub max_drawdown: f64,
}

/// The fields a saved report carries, read back from its text.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedReport {
    pub generated_at: Option<NaiveDateTime>,
    pub last_date: Option<NaiveDate>,
    pub tickers: Vec<String>,
    pub prices: Vec<PriceLine>,
    pub risk: Vec<RiskLine>,
    pub portfolio: Option<RiskLine>,
}

/// Splits every `|` line into its fields. Percentages come back as
/// fractions; `nan` stays `NaN`.
pub fn parse_report(text: &str) -> Result<ParsedReport, ReportError> {
    let mut report = ParsedReport::default();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if let Some(rest) = line.strip_prefix("Generated: ") {
            report.generated_at = NaiveDateTime::parse_from_str(rest.trim(), "%Y-%m-%d %H:%M:%S").ok();
            continue;
        }
        if let Some(rest) = line.strip_prefix("Tickers: ") {
            report.tickers = rest.split(',').map(|t| t.trim().to_string()).filter(|t| !t.is_empty()).collect();
            continue;
        }
        if let Some(rest) = line.strip_prefix("Last date: ") {
            report.last_date = NaiveDate::parse_from_str(rest.trim(), "%Y-%m-%d").ok();
            continue;
        }

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() != 3 {
            continue;
        }
        let symbol = fields[0].to_string();
        let (label, first) = labelled(fields[1], line_no)?;
        let (_, second) = labelled(fields[2], line_no)?;

        match label {
            "Open" => report.prices.push(PriceLine {
                symbol,
                open: number(first, line_no)?,
                close: number(second, line_no)?,
            }),
            "Vol (ann.)" => {
                let risk = RiskLine {
                    symbol,
                    volatility: fraction(first, line_no)?,
                    max_drawdown: fraction(second, line_no)?,
                };
                if risk.symbol == "Portfolio" {
                    report.portfolio = Some(risk);
                } else {
                    report.risk.push(risk);
                }
            }
            other => {
                return Err(ReportError::Parse {
                    line: line_no,
                    reason: format!("unknown field '{}'", other),
                });
            }
        }
    }

    Ok(report)
}

fn labelled(field: &str, line: usize) -> Result<(&str, &str), ReportError> {
    field
        .split_once(':')
        .map(|(label, value)| (label.trim(), value.trim()))
        .ok_or_else(|| ReportError::Parse { line, reason: format!("expected 'label: value', got '{}'", field) })
}

fn number(value: &str, line: usize) -> Result<f64, ReportError> {
    value
        .parse::<f64>()
        .map_err(|e| ReportError::Parse { line, reason: format!("'{}': {}", value, e) })
}

fn fraction(value: &str, line: usize) -> Result<f64, ReportError> {
    let digits = value.strip_suffix('%').ok_or_else(|| ReportError::Parse {
        line,
        reason: format!("expected a percentage, got '{}'", value),
    })?;
    Ok(number(digits, line)? / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::DailyReport;
    use crate::report::tests::{fixture_table, generated_at};

    #[test]
    fn report_round_trips_through_text() {
        let report = DailyReport::compute(&fixture_table(), generated_at()).unwrap();
        let parsed = parse_report(&report.render()).unwrap();

        assert_eq!(parsed.generated_at, Some(generated_at()));
        assert_eq!(parsed.last_date, Some(report.window_end));
        assert_eq!(parsed.tickers, vec!["AAPL", "MSFT", "GOOGL"]);
        assert_eq!(parsed.prices.len(), 3);
        assert_eq!(parsed.risk.len(), 3);

        for (snapshot, (price, risk)) in report.snapshots.iter().zip(parsed.prices.iter().zip(&parsed.risk)) {
            assert_eq!(price.symbol, snapshot.symbol);
            assert!((price.open - snapshot.open).abs() <= 5e-5);
            assert!((price.close - snapshot.close).abs() <= 5e-5);
            assert!((risk.volatility - snapshot.volatility).abs() <= 5e-5);
            assert!((risk.max_drawdown - snapshot.max_drawdown).abs() <= 5e-5);
        }
        let portfolio = parsed.portfolio.unwrap();
        assert!((portfolio.volatility - report.portfolio.volatility).abs() <= 5e-5);
    }

    #[test]
    fn nan_fields_parse_back_as_nan() {
        let parsed = parse_report("XYZ    | Vol (ann.):     nan% | Max Drawdown:     nan%\n").unwrap();
        assert!(parsed.risk[0].volatility.is_nan());
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse_report("XYZ | Foo: 1 | Bar: 2").unwrap_err();
        assert!(matches!(err, ReportError::Parse { line: 1, .. }));
    }
}
