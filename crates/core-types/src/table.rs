use crate::series::{OhlcSeries, PriceInput, PriceSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// One price observation. Missing fields are `NaN`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub const MISSING: Bar = Bar {
        open: f64::NAN,
        high: f64::NAN,
        low: f64::NAN,
        close: f64::NAN,
    };

    pub fn from_close(close: f64) -> Self {
        Self { open: f64::NAN, high: f64::NAN, low: f64::NAN, close }
    }

    pub fn has_close(&self) -> bool {
        self.close.is_finite()
    }

    fn fields(&self) -> [f64; 4] {
        [self.open, self.high, self.low, self.close]
    }

    fn fill_from(&mut self, prev: &Bar) {
        for (field, prev) in [
            (&mut self.open, prev.open),
            (&mut self.high, prev.high),
            (&mut self.low, prev.low),
            (&mut self.close, prev.close),
        ] {
            if !field.is_finite() {
                *field = prev;
            }
        }
    }
}

/// Two missing fields compare equal, so tables with partial bars still equal
/// their clones.
impl PartialEq for Bar {
    fn eq(&self, other: &Self) -> bool {
        self.fields()
            .iter()
            .zip(other.fields().iter())
            .all(|(a, b)| a == b || (a.is_nan() && b.is_nan()))
    }
}

/// The raw history the provider returns for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolHistory {
    pub symbol: String,
    pub dates: Vec<DateTime<Utc>>,
    pub bars: Vec<Bar>,
}

/// Date × symbol table of bars on a shared, strictly increasing date index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceTable {
    dates: Vec<DateTime<Utc>>,
    symbols: Vec<String>,
    /// One column per symbol, each `dates.len()` long.
    columns: Vec<Vec<Bar>>,
}

impl PriceTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Outer-joins per-symbol histories on their dates. Dates a symbol lacks
    /// become `Bar::MISSING`; a repeated date keeps the last observation.
    pub fn from_histories(histories: Vec<SymbolHistory>) -> Self {
        let index: BTreeSet<DateTime<Utc>> = histories
            .iter()
            .flat_map(|h| h.dates.iter().copied())
            .collect();
        let dates: Vec<DateTime<Utc>> = index.into_iter().collect();
        let position: BTreeMap<DateTime<Utc>, usize> =
            dates.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut symbols = Vec::with_capacity(histories.len());
        let mut columns = Vec::with_capacity(histories.len());
        for history in histories {
            let mut column = vec![Bar::MISSING; dates.len()];
            for (date, bar) in history.dates.iter().zip(history.bars) {
                column[position[date]] = bar;
            }
            symbols.push(history.symbol);
            columns.push(column);
        }

        Self { dates, symbols, columns }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.symbols.is_empty()
    }

    pub fn dates(&self) -> &[DateTime<Utc>] {
        &self.dates
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn first_date(&self) -> Option<DateTime<Utc>> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<DateTime<Utc>> {
        self.dates.last().copied()
    }

    pub fn column(&self, symbol: &str) -> Option<&[Bar]> {
        let idx = self.symbols.iter().position(|s| s == symbol)?;
        Some(&self.columns[idx])
    }

    /// Close prices, one `Vec` per symbol in `symbols()` order.
    pub fn close_columns(&self) -> Vec<Vec<f64>> {
        self.columns
            .iter()
            .map(|col| col.iter().map(|b| b.close).collect())
            .collect()
    }

    /// Drops rows with no close at all, forward-fills each field per symbol,
    /// then drops the rows where some symbol still has no close (the leading
    /// rows before that symbol's first observation).
    pub fn clean(&self) -> Self {
        let keep_any: Vec<usize> = (0..self.dates.len())
            .filter(|&row| self.columns.iter().any(|col| col[row].has_close()))
            .collect();

        let mut columns: Vec<Vec<Bar>> = self
            .columns
            .iter()
            .map(|col| {
                let mut filled: Vec<Bar> = keep_any.iter().map(|&row| col[row]).collect();
                for i in 1..filled.len() {
                    let prev = filled[i - 1];
                    filled[i].fill_from(&prev);
                }
                filled
            })
            .collect();
        let mut dates: Vec<DateTime<Utc>> = keep_any.iter().map(|&row| self.dates[row]).collect();

        let complete: Vec<usize> = (0..dates.len())
            .filter(|&row| columns.iter().all(|col| col[row].has_close()))
            .collect();
        if complete.len() != dates.len() {
            dates = complete.iter().map(|&row| dates[row]).collect();
            for col in &mut columns {
                *col = complete.iter().map(|&row| col[row]).collect();
            }
        }

        Self {
            dates,
            symbols: self.symbols.clone(),
            columns,
        }
    }

    /// Keeps the requested symbols that are present, in request order.
    pub fn select(&self, symbols: &[String]) -> Self {
        let mut selected = Self {
            dates: self.dates.clone(),
            symbols: Vec::new(),
            columns: Vec::new(),
        };
        for symbol in symbols {
            if let Some(idx) = self.symbols.iter().position(|s| s == symbol) {
                if !selected.symbols.contains(symbol) {
                    selected.symbols.push(symbol.clone());
                    selected.columns.push(self.columns[idx].clone());
                }
            }
        }
        selected
    }

    /// Close prices of one symbol, skipping rows where it has no close.
    pub fn close_series(&self, symbol: &str) -> Option<PriceSeries> {
        let column = self.column(symbol)?;
        let (dates, values) = self
            .dates
            .iter()
            .zip(column)
            .filter(|(_, bar)| bar.has_close())
            .map(|(d, bar)| (*d, bar.close))
            .unzip();
        PriceSeries::new(dates, values).ok()
    }

    /// Strategy input for one symbol: OHLC when every retained bar carries a
    /// finite high and low, close-only otherwise.
    pub fn price_input(&self, symbol: &str) -> Option<PriceInput> {
        let column = self.column(symbol)?;
        let rows: Vec<(DateTime<Utc>, Bar)> = self
            .dates
            .iter()
            .zip(column)
            .filter(|(_, bar)| bar.has_close())
            .map(|(d, bar)| (*d, *bar))
            .collect();
        if rows.is_empty() {
            return None;
        }

        let has_range = rows.iter().all(|(_, b)| b.high.is_finite() && b.low.is_finite());
        let dates: Vec<DateTime<Utc>> = rows.iter().map(|(d, _)| *d).collect();
        let close: Vec<f64> = rows.iter().map(|(_, b)| b.close).collect();
        if !has_range {
            return PriceSeries::new(dates, close).ok().map(PriceInput::CloseOnly);
        }

        let open = rows
            .iter()
            .map(|(_, b)| if b.open.is_finite() { b.open } else { b.close })
            .collect();
        let high = rows.iter().map(|(_, b)| b.high).collect();
        let low = rows.iter().map(|(_, b)| b.low).collect();
        OhlcSeries::new(dates, open, high, low, close).ok().map(PriceInput::Ohlc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn day(i: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap() + Duration::days(i)
    }

    fn history(symbol: &str, points: &[(i64, f64)]) -> SymbolHistory {
        SymbolHistory {
            symbol: symbol.to_string(),
            dates: points.iter().map(|(d, _)| day(*d)).collect(),
            bars: points.iter().map(|(_, c)| Bar::from_close(*c)).collect(),
        }
    }

    #[test]
    fn clean_forward_fills_and_drops_leading_gaps() {
        let table = PriceTable::from_histories(vec![
            history("AAA", &[(0, 10.0), (1, 11.0), (2, f64::NAN), (3, 13.0)]),
            history("BBB", &[(1, 20.0), (2, 21.0), (3, 22.0)]),
        ]);
        assert_eq!(table.len(), 4);

        let cleaned = table.clean();
        assert_eq!(cleaned.dates(), &[day(1), day(2), day(3)]);
        let aaa: Vec<f64> = cleaned.column("AAA").unwrap().iter().map(|b| b.close).collect();
        assert_eq!(aaa, vec![11.0, 11.0, 13.0]);
    }

    #[test]
    fn select_keeps_request_order_and_skips_unknown() {
        let table = PriceTable::from_histories(vec![
            history("AAA", &[(0, 1.0)]),
            history("BBB", &[(0, 2.0)]),
        ]);
        let picked = table.select(&["BBB".to_string(), "ZZZ".to_string(), "AAA".to_string()]);
        assert_eq!(picked.symbols(), &["BBB".to_string(), "AAA".to_string()]);
    }

    #[test]
    fn tables_with_missing_fields_equal_their_clones() {
        let table = PriceTable::from_histories(vec![
            history("AAA", &[(0, 1.0), (2, 3.0)]),
            history("BBB", &[(1, 2.0)]),
        ]);
        assert_eq!(table, table.clone());
        assert_eq!(Bar::MISSING, Bar::MISSING);
        assert_ne!(Bar::from_close(1.0), Bar::from_close(2.0));
        assert_ne!(Bar::from_close(1.0), Bar::MISSING);
    }

    #[test]
    fn price_input_is_close_only_without_ranges() {
        let table = PriceTable::from_histories(vec![history("AAA", &[(0, 1.0), (1, 2.0)])]);
        assert!(matches!(table.price_input("AAA"), Some(PriceInput::CloseOnly(_))));
        assert!(table.price_input("ZZZ").is_none());
    }
}
