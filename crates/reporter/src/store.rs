use crate::error::ReportError;
use crate::report::DailyReport;
use chrono::NaiveDate;
use serde::Serialize;
use std::path::{Path, PathBuf};

const PREFIX: &str = "daily_report_";
const SUFFIX: &str = ".txt";

pub fn report_file_name(date: NaiveDate) -> String {
    format!("{}{}{}", PREFIX, date.format("%Y-%m-%d"), SUFFIX)
}

/// The date encoded in a report file name, if `name` is one.
pub fn report_date(name: &str) -> Option<NaiveDate> {
    let date = name.strip_prefix(PREFIX)?.strip_suffix(SUFFIX)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub name: String,
    pub date: NaiveDate,
}

/// Writes the rendered report into `dir`, replacing any report of the same
/// day. The text goes to a temporary file first and is renamed into place.
pub async fn write_report(dir: &Path, report: &DailyReport) -> Result<PathBuf, ReportError> {
    let text = report.render();
    let name = report.file_name();
    let target = dir.join(&name);
    let staging = dir.join(format!(".{}.tmp", name));

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&staging, text).await?;
    if let Err(e) = tokio::fs::rename(&staging, &target).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(e.into());
    }

    tracing::info!(path = %target.display(), "report written");
    Ok(target)
}

/// Saved reports in `dir`, newest first. A missing directory has none.
pub async fn list_reports(dir: &Path) -> Result<Vec<ReportEntry>, ReportError> {
    let mut entries = Vec::new();
    let mut read_dir = match tokio::fs::read_dir(dir).await {
        Ok(read_dir) => read_dir,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
        Err(e) => return Err(e.into()),
    };

    while let Some(entry) = read_dir.next_entry().await? {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        if let Some(date) = report_date(&name) {
            entries.push(ReportEntry { name, date });
        }
    }

    entries.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(entries)
}

/// Reads one saved report. Only well-formed report names are accepted.
pub async fn read_report(dir: &Path, name: &str) -> Result<String, ReportError> {
    if report_date(name).is_none() {
        return Err(ReportError::InvalidName(name.to_string()));
    }
    Ok(tokio::fs::read_to_string(dir.join(name)).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tests::{fixture_table, generated_at};

    #[test]
    fn file_names_round_trip_dates() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 5).unwrap();
        assert_eq!(report_date(&report_file_name(date)), Some(date));
        assert_eq!(report_date("daily_report_garbage.txt"), None);
        assert_eq!(report_date("../daily_report_2024-06-05.txt"), None);
    }

    #[tokio::test]
    async fn writes_lists_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let report = DailyReport::compute(&fixture_table(), generated_at()).unwrap();

        let path = write_report(dir.path(), &report).await.unwrap();
        assert_eq!(path, dir.path().join("daily_report_2024-06-05.txt"));
        tokio::fs::write(dir.path().join("daily_report_2024-06-07.txt"), "x").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "x").await.unwrap();

        let listed = list_reports(dir.path()).await.unwrap();
        let names: Vec<&str> = listed.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["daily_report_2024-06-07.txt", "daily_report_2024-06-05.txt"]);

        let text = read_report(dir.path(), "daily_report_2024-06-05.txt").await.unwrap();
        assert_eq!(text, report.render());
        assert!(matches!(
            read_report(dir.path(), "notes.txt").await,
            Err(ReportError::InvalidName(_))
        ));
    }

    #[tokio::test]
    async fn missing_directory_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let listed = list_reports(&dir.path().join("absent")).await.unwrap();
        assert!(listed.is_empty());
    }
}
