use crate::error::MarketDataError;
use crate::provider::PriceProvider;
use crate::responses::{ChartResponse, ChartResult};
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use configuration::DataSettings;
use core_types::{Bar, Interval, PriceRange, PriceRequest, PriceTable, SymbolHistory};
use futures::future::join_all;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) quantdash/0.1";

/// Price provider backed by the Yahoo Finance chart API.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(settings: &DataSettings) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Downloads one symbol's history.
    pub async fn fetch_symbol(
        &self,
        symbol: &str,
        range: PriceRange,
        interval: Interval,
    ) -> Result<SymbolHistory, MarketDataError> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let mut query: Vec<(&str, String)> = vec![
            ("interval", interval.as_str().to_string()),
            ("events", "div,splits".to_string()),
            ("includeAdjustedClose", "true".to_string()),
        ];
        match range {
            PriceRange::Period(period) => query.push(("range", period.as_str().to_string())),
            PriceRange::Dates { start, end } => {
                let from = Utc.from_utc_datetime(&start.and_time(NaiveTime::MIN));
                // The end date is inclusive.
                let to = Utc.from_utc_datetime(&end.and_time(NaiveTime::MIN)) + Duration::days(1);
                query.push(("period1", from.timestamp().to_string()));
                query.push(("period2", to.timestamp().to_string()));
            }
        }

        tracing::debug!(%symbol, %range, %interval, "requesting chart");
        let response = self.client.get(&url).query(&query).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MarketDataError::Status {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.json::<ChartResponse>().await?;
        parse_chart(symbol, body, interval)
    }
}

#[async_trait]
impl PriceProvider for YahooClient {
    async fn fetch(&self, request: &PriceRequest) -> PriceTable {
        let downloads = request
            .symbols
            .iter()
            .map(|symbol| self.fetch_symbol(symbol, request.range, request.interval));
        let results = join_all(downloads).await;

        let mut histories = Vec::with_capacity(results.len());
        for (symbol, result) in request.symbols.iter().zip(results) {
            match result {
                Ok(history) if history.bars.iter().any(Bar::has_close) => histories.push(history),
                Ok(_) => tracing::warn!(%symbol, "no prices returned"),
                Err(e) => tracing::warn!(%symbol, error = %e, "price download failed"),
            }
        }

        tracing::info!(
            requested = request.symbols.len(),
            received = histories.len(),
            range = %request.range,
            "fetched price histories"
        );
        PriceTable::from_histories(histories)
    }
}

/// Converts a chart response into bars adjusted for splits and dividends.
///
/// Daily bars are dated at midnight UTC of the exchange-local trading day;
/// intraday bars keep their timestamp.
pub fn parse_chart(
    symbol: &str,
    response: ChartResponse,
    interval: Interval,
) -> Result<SymbolHistory, MarketDataError> {
    if let Some(error) = response.chart.error {
        return Err(MarketDataError::Upstream {
            symbol: symbol.to_string(),
            message: format!("{}: {}", error.code, error.description),
        });
    }
    let result: ChartResult = response
        .chart
        .result
        .and_then(|mut results| if results.is_empty() { None } else { Some(results.remove(0)) })
        .ok_or_else(|| MarketDataError::InvalidData(format!("empty chart result for {}", symbol)))?;

    let n = result.timestamp.len();
    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();
    let field = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten().unwrap_or(f64::NAN);

    let mut dates = Vec::with_capacity(n);
    let mut bars = Vec::with_capacity(n);
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let date = bar_date(ts, result.meta.gmtoffset, interval).ok_or_else(|| {
            MarketDataError::InvalidData(format!("invalid timestamp {} for {}", ts, symbol))
        })?;

        let close = field(&quote.close, i);
        let adjusted = field(&adjclose, i);
        let factor = if adjusted.is_finite() && close.is_finite() && close != 0.0 {
            adjusted / close
        } else {
            1.0
        };

        dates.push(date);
        bars.push(Bar {
            open: field(&quote.open, i) * factor,
            high: field(&quote.high, i) * factor,
            low: field(&quote.low, i) * factor,
            close: close * factor,
        });
    }

    Ok(SymbolHistory { symbol: symbol.to_string(), dates, bars })
}

fn bar_date(timestamp: i64, gmtoffset: i64, interval: Interval) -> Option<DateTime<Utc>> {
    let instant = Utc.timestamp_opt(timestamp, 0).single()?;
    match interval {
        Interval::Hourly => Some(instant),
        Interval::Daily => {
            let local_day = (instant + Duration::seconds(gmtoffset)).date_naive();
            Some(Utc.from_utc_datetime(&local_day.and_time(NaiveTime::MIN)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart(json: &str) -> ChartResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn parses_and_adjusts_daily_bars() {
        // 2024-01-02 14:30 UTC and 2024-01-03 14:30 UTC, New York offset.
        let body = chart(
            r#"{"chart":{"result":[{
                "meta":{"gmtoffset":-18000},
                "timestamp":[1704205800,1704292200],
                "indicators":{
                    "quote":[{"open":[10.0,11.0],"high":[12.0,13.0],"low":[9.0,10.0],"close":[10.0,null]}],
                    "adjclose":[{"adjclose":[5.0,null]}]
                }}],"error":null}}"#,
        );
        let history = parse_chart("AAA", body, Interval::Daily).unwrap();

        assert_eq!(history.dates[0], Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(history.dates[1], Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
        assert_eq!(history.bars[0], Bar { open: 5.0, high: 6.0, low: 4.5, close: 5.0 });
        assert!(!history.bars[1].has_close());
        assert_eq!(history.bars[1].open, 11.0);
    }

    #[test]
    fn upstream_error_is_reported() {
        let body = chart(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#,
        );
        let err = parse_chart("ZZZ", body, Interval::Daily).unwrap_err();
        assert!(matches!(err, MarketDataError::Upstream { ref symbol, .. } if symbol == "ZZZ"));
    }

    #[test]
    fn hourly_bars_keep_their_timestamp() {
        let date = bar_date(1704205800, -18000, Interval::Hourly).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2024, 1, 2, 14, 30, 0).unwrap());
    }
}
