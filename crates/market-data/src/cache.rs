use crate::provider::PriceProvider;
use async_trait::async_trait;
use core_types::{PriceRequest, PriceTable};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct CacheEntry {
    table: PriceTable,
    fetched_at: Instant,
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// A time-bounded memo in front of another provider.
///
/// Entries are keyed by the full request. Each key has its own async lock, so
/// concurrent callers asking for the same key wait for a single upstream
/// fetch while unrelated keys proceed in parallel. Empty results are not
/// stored.
pub struct CachedPriceProvider {
    inner: Arc<dyn PriceProvider>,
    ttl: Duration,
    slots: Mutex<HashMap<PriceRequest, Slot>>,
}

impl CachedPriceProvider {
    pub fn new(inner: Arc<dyn PriceProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drops every cached table. The next request for any key goes upstream.
    pub async fn invalidate_all(&self) {
        let mut slots = self.slots.lock().await;
        let dropped = slots.len();
        slots.clear();
        tracing::info!(dropped, "price cache invalidated");
    }

    /// Number of keys currently holding a table.
    pub async fn cached_keys(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().await.values().cloned().collect();
        let mut filled = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                filled += 1;
            }
        }
        filled
    }

    async fn slot(&self, request: &PriceRequest) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(request.clone()).or_default().clone()
    }
}

#[async_trait]
impl PriceProvider for CachedPriceProvider {
    async fn fetch(&self, request: &PriceRequest) -> PriceTable {
        let slot = self.slot(request).await;
        let mut entry = slot.lock().await;

        if let Some(cached) = entry.as_ref() {
            if cached.fetched_at.elapsed() < self.ttl {
                tracing::debug!(symbols = ?request.symbols, "price cache hit");
                return cached.table.clone();
            }
        }

        tracing::debug!(symbols = ?request.symbols, "price cache miss");
        let table = self.inner.fetch(request).await;
        *entry = if table.is_empty() {
            None
        } else {
            Some(CacheEntry {
                table: table.clone(),
                fetched_at: Instant::now(),
            })
        };
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use core_types::{Bar, Interval, Period, PriceRange, SymbolHistory};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        empty: bool,
    }

    impl CountingProvider {
        fn new(empty: bool) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), empty })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceProvider for CountingProvider {
        async fn fetch(&self, request: &PriceRequest) -> PriceTable {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            if self.empty {
                return PriceTable::empty();
            }
            let histories = request
                .symbols
                .iter()
                .map(|s| SymbolHistory {
                    symbol: s.clone(),
                    dates: vec![Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()],
                    bars: vec![Bar::from_close(1.0)],
                })
                .collect();
            PriceTable::from_histories(histories)
        }
    }

    fn request(symbol: &str) -> PriceRequest {
        PriceRequest::new(vec![symbol.to_string()], PriceRange::Period(Period::OneYear), Interval::Daily)
    }

    #[tokio::test(start_paused = true)]
    async fn serves_from_cache_until_ttl_expires() {
        let upstream = CountingProvider::new(false);
        let cache = CachedPriceProvider::new(upstream.clone(), Duration::from_secs(300));

        cache.fetch(&request("AAA")).await;
        cache.fetch(&request("AAA")).await;
        assert_eq!(upstream.calls(), 1);

        cache.fetch(&request("BBB")).await;
        assert_eq!(upstream.calls(), 2);

        tokio::time::advance(Duration::from_secs(301)).await;
        cache.fetch(&request("AAA")).await;
        assert_eq!(upstream.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let upstream = CountingProvider::new(false);
        let cache = CachedPriceProvider::new(upstream.clone(), Duration::from_secs(300));
        let req = request("AAA");

        let (a, b) = tokio::join!(cache.fetch(&req), cache.fetch(&req));
        assert!(!a.is_empty());
        assert_eq!(a, b);
        assert_eq!(upstream.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_all_forces_refetch() {
        let upstream = CountingProvider::new(false);
        let cache = CachedPriceProvider::new(upstream.clone(), Duration::from_secs(300));

        cache.fetch(&request("AAA")).await;
        assert_eq!(cache.cached_keys().await, 1);
        cache.invalidate_all().await;
        assert_eq!(cache.cached_keys().await, 0);

        cache.fetch(&request("AAA")).await;
        assert_eq!(upstream.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_results_are_not_cached() {
        let upstream = CountingProvider::new(true);
        let cache = CachedPriceProvider::new(upstream.clone(), Duration::from_secs(300));

        assert!(cache.fetch(&request("AAA")).await.is_empty());
        cache.fetch(&request("AAA")).await;
        assert_eq!(upstream.calls(), 2);
    }
}
