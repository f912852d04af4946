use async_trait::async_trait;
use core_types::{PriceRequest, PriceTable};

/// The source of historical prices.
///
/// Fetching never fails from the caller's point of view: an unknown symbol,
/// a network error or an empty period all surface as missing columns or an
/// empty table, and the implementation logs what went wrong.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    async fn fetch(&self, request: &PriceRequest) -> PriceTable;
}
