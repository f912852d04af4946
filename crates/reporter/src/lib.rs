//! # Reporter
//!
//! The daily report job: a snapshot of latest open/close prices, trailing
//! volatility and drawdown per symbol, plus an equal-weight portfolio rollup,
//! persisted as a fixed-layout text file that downstream tooling parses.

pub mod error;
pub mod parser;
pub mod report;
pub mod store;

pub use error::ReportError;
pub use parser::{ParsedReport, PriceLine, RiskLine, parse_report};
pub use report::{DailyReport, RiskFigures, SymbolSnapshot};
pub use store::{ReportEntry, list_reports, read_report, report_date, report_file_name, write_report};

use chrono::NaiveDateTime;
use configuration::ReportSettings;
use core_types::{PriceRange, PriceRequest};
use market_data::PriceProvider;
use std::path::PathBuf;

/// Fetches prices, computes the report and writes it.
///
/// Nothing is written unless every step before the write succeeds.
pub async fn generate_daily_report(
    provider: &dyn PriceProvider,
    settings: &ReportSettings,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, ReportError> {
    let request = PriceRequest::new(
        settings.symbols.clone(),
        PriceRange::Period(settings.period),
        settings.interval,
    );
    let table = provider.fetch(&request).await.select(&settings.symbols);
    if table.is_empty() {
        return Err(ReportError::DataUnavailable(format!(
            "provider returned nothing for {}",
            settings.symbols.join(", ")
        )));
    }

    let report = DailyReport::compute(&table, generated_at)?;
    write_report(&settings.output_dir, &report).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_types::PriceTable;
    use report::tests::{fixture_table, generated_at};

    struct StaticProvider(PriceTable);

    #[async_trait]
    impl PriceProvider for StaticProvider {
        async fn fetch(&self, _request: &PriceRequest) -> PriceTable {
            self.0.clone()
        }
    }

    fn settings(dir: &std::path::Path) -> ReportSettings {
        ReportSettings { output_dir: dir.to_path_buf(), ..ReportSettings::default() }
    }

    #[tokio::test]
    async fn generates_report_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = generate_daily_report(&StaticProvider(fixture_table()), &settings(dir.path()), generated_at())
            .await
            .unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.starts_with("======"));
        assert_eq!(parse_report(&text).unwrap().prices.len(), 3);
    }

    #[tokio::test]
    async fn empty_data_aborts_without_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("reports");
        let result =
            generate_daily_report(&StaticProvider(PriceTable::empty()), &settings(&out), generated_at()).await;

        assert!(matches!(result, Err(ReportError::DataUnavailable(_))));
        assert!(!out.exists());
    }
}
