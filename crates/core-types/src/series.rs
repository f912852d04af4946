use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

fn check_index(field: &str, dates: &[DateTime<Utc>], len: usize) -> Result<(), CoreError> {
    if dates.len() != len {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            format!("{} dates but {} values", dates.len(), len),
        ));
    }
    if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
        return Err(CoreError::InvalidInput(
            field.to_string(),
            format!("dates must be strictly increasing ({} then {})", pair[0], pair[1]),
        ));
    }
    Ok(())
}

fn in_range(date: &DateTime<Utc>, start: Option<NaiveDate>, end: Option<NaiveDate>) -> bool {
    let day = date.date_naive();
    start.is_none_or(|s| day >= s) && end.is_none_or(|e| day <= e)
}

/// A date-indexed sequence of prices for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    dates: Vec<DateTime<Utc>>,
    values: Vec<f64>,
}

impl PriceSeries {
    /// Builds a series, rejecting mismatched lengths and non-increasing dates.
    pub fn new(dates: Vec<DateTime<Utc>>, values: Vec<f64>) -> Result<Self, CoreError> {
        check_index("price_series", &dates, values.len())?;
        Ok(Self { dates, values })
    }

    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn last(&self) -> Option<(DateTime<Utc>, f64)> {
        Some((*self.dates.last()?, *self.values.last()?))
    }

    /// Simple returns `p[t]/p[t-1] - 1`, indexed by the later date.
    pub fn returns(&self) -> ReturnSeries {
        let values = self.values.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        ReturnSeries {
            dates: self.dates.iter().skip(1).copied().collect(),
            values,
        }
    }

    /// Keeps only the observations whose calendar day falls in `[start, end]`.
    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let (dates, values) = self
            .dates
            .iter()
            .zip(&self.values)
            .filter(|(d, _)| in_range(d, start, end))
            .map(|(d, v)| (*d, *v))
            .unzip();
        Self { dates, values }
    }
}

/// Period-over-period simple returns. One element shorter than its source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSeries {
    pub dates: Vec<DateTime<Utc>>,
    pub values: Vec<f64>,
}

/// Open/high/low/close columns sharing one date index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OhlcSeries {
    dates: Vec<DateTime<Utc>>,
    open: Vec<f64>,
    high: Vec<f64>,
    low: Vec<f64>,
    close: Vec<f64>,
}

impl OhlcSeries {
    pub fn new(
        dates: Vec<DateTime<Utc>>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    ) -> Result<Self, CoreError> {
        check_index("ohlc_series", &dates, close.len())?;
        if open.len() != close.len() || high.len() != close.len() || low.len() != close.len() {
            return Err(CoreError::InvalidInput(
                "ohlc_series".to_string(),
                "open/high/low/close columns differ in length".to_string(),
            ));
        }
        Ok(Self { dates, open, high, low, close })
    }

    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    pub fn open(&self) -> &[f64] {
        &self.open
    }

    pub fn high(&self) -> &[f64] {
        &self.high
    }

    pub fn low(&self) -> &[f64] {
        &self.low
    }

    pub fn close(&self) -> &[f64] {
        &self.close
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }

    fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| in_range(&self.dates[i], start, end))
            .collect();
        let pick = |col: &[f64]| keep.iter().map(|&i| col[i]).collect::<Vec<_>>();
        Self {
            dates: keep.iter().map(|&i| self.dates[i]).collect(),
            open: pick(&self.open),
            high: pick(&self.high),
            low: pick(&self.low),
            close: pick(&self.close),
        }
    }
}

/// Price data handed to a single-asset strategy.
///
/// Strategies that need a high/low range call [`PriceInput::to_ohlc`], which
/// synthesises `open = high = low = close` for close-only data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PriceInput {
    CloseOnly(PriceSeries),
    Ohlc(OhlcSeries),
}

impl PriceInput {
    pub fn dates(&self) -> &[DateTime<Utc>] {
        match self {
            PriceInput::CloseOnly(s) => s.dates(),
            PriceInput::Ohlc(o) => o.dates(),
        }
    }

    pub fn closes(&self) -> &[f64] {
        match self {
            PriceInput::CloseOnly(s) => s.values(),
            PriceInput::Ohlc(o) => o.close(),
        }
    }

    pub fn len(&self) -> usize {
        self.closes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes().is_empty()
    }

    /// The close column as a standalone series.
    pub fn close_series(&self) -> PriceSeries {
        match self {
            PriceInput::CloseOnly(s) => s.clone(),
            PriceInput::Ohlc(o) => PriceSeries {
                dates: o.dates.clone(),
                values: o.close.clone(),
            },
        }
    }

    pub fn to_ohlc(&self) -> OhlcSeries {
        match self {
            PriceInput::Ohlc(o) => o.clone(),
            PriceInput::CloseOnly(s) => OhlcSeries {
                dates: s.dates.clone(),
                open: s.values.clone(),
                high: s.values.clone(),
                low: s.values.clone(),
                close: s.values.clone(),
            },
        }
    }

    pub fn between(&self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        match self {
            PriceInput::CloseOnly(s) => PriceInput::CloseOnly(s.between(start, end)),
            PriceInput::Ohlc(o) => PriceInput::Ohlc(o.between(start, end)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn days(n: usize) -> Vec<DateTime<Utc>> {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        (0..n).map(|i| start + Duration::days(i as i64)).collect()
    }

    #[test]
    fn rejects_duplicate_dates() {
        let mut dates = days(3);
        dates[2] = dates[1];
        assert!(PriceSeries::new(dates, vec![1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn returns_are_one_shorter_and_aligned_to_later_date() {
        let series = PriceSeries::new(days(3), vec![100.0, 110.0, 99.0]).unwrap();
        let r = series.returns();
        assert_eq!(r.values.len(), 2);
        assert_eq!(r.dates[0], series.dates()[1]);
        assert!((r.values[0] - 0.1).abs() < 1e-12);
        assert!((r.values[1] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn close_only_synthesises_flat_bars() {
        let input = PriceInput::CloseOnly(PriceSeries::new(days(2), vec![5.0, 6.0]).unwrap());
        let ohlc = input.to_ohlc();
        assert_eq!(ohlc.high(), ohlc.close());
        assert_eq!(ohlc.low(), ohlc.close());
    }

    #[test]
    fn between_filters_by_calendar_day() {
        let series = PriceSeries::new(days(5), vec![1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let start = NaiveDate::from_ymd_opt(2024, 1, 2);
        let end = NaiveDate::from_ymd_opt(2024, 1, 4);
        assert_eq!(series.between(start, end).values(), &[2.0, 3.0, 4.0]);
    }
}
