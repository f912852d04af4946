use crate::error::PortfolioError;
use crate::manager::PortfolioRequest;
use chrono::{DateTime, Utc};
use core_types::{PriceRequest, PriceTable};
use market_data::PriceProvider;
use serde::Serialize;

/// The minimum number of assets a portfolio backtest accepts.
pub const MIN_ASSETS: usize = 3;

/// Daily simple returns for every symbol, on the price table's dates minus
/// the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnTable {
    pub dates: Vec<DateTime<Utc>>,
    pub symbols: Vec<String>,
    /// One column per symbol.
    pub columns: Vec<Vec<f64>>,
}

impl ReturnTable {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// The returns of every symbol on row `row`.
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.columns.iter().map(|col| col[row]).collect()
    }

    /// The last `n` rows, oldest first.
    pub fn tail(&self, n: usize) -> ReturnTable {
        let start = self.len().saturating_sub(n);
        ReturnTable {
            dates: self.dates[start..].to_vec(),
            symbols: self.symbols.clone(),
            columns: self.columns.iter().map(|c| c[start..].to_vec()).collect(),
        }
    }
}

/// Loads the prices of a portfolio through the injected provider and cleans
/// them into a rectangular table.
///
/// Rows are sorted, all-missing rows dropped, gaps forward-filled and
/// leading incomplete rows dropped. Only requested symbols the provider
/// actually returned are kept, in request order.
pub async fn load_and_prepare_data(
    provider: &dyn PriceProvider,
    request: &PortfolioRequest,
) -> Result<PriceTable, PortfolioError> {
    let price_request = PriceRequest::new(request.symbols.clone(), request.range, request.interval);
    let raw = provider.fetch(&price_request).await;
    if raw.is_empty() {
        return Err(PortfolioError::NoData(request.symbols.join(",")));
    }

    let prices = raw.select(&request.symbols).clean();
    let missing: Vec<&String> = request
        .symbols
        .iter()
        .filter(|s| !prices.symbols().contains(*s))
        .collect();
    if !missing.is_empty() {
        tracing::warn!(?missing, "provider returned no data for some symbols");
    }

    if prices.symbols().len() < MIN_ASSETS {
        return Err(PortfolioError::InsufficientAssets {
            found: prices.symbols().len(),
            required: MIN_ASSETS,
        });
    }
    if prices.len() < 2 {
        return Err(PortfolioError::NoData(format!(
            "{} complete rows after cleaning",
            prices.len()
        )));
    }

    tracing::info!(
        symbols = prices.symbols().len(),
        rows = prices.len(),
        "portfolio prices prepared"
    );
    Ok(prices)
}

/// Simple returns of every close column. The first row has no return and is
/// dropped.
pub fn compute_returns(prices: &PriceTable) -> ReturnTable {
    let columns = prices
        .close_columns()
        .into_iter()
        .map(|col| col.windows(2).map(|w| w[1] / w[0] - 1.0).collect())
        .collect();
    ReturnTable {
        dates: prices.dates().iter().skip(1).copied().collect(),
        symbols: prices.symbols().to_vec(),
        columns,
    }
}
