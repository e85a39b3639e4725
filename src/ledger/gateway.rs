// Ledger gateway - rate-limited submits and a cached wholesale evaluate
//
// Wraps any `RecordStore`. Writes wait on a governor quota; `read_all` is
// served from a short-lived moka cache that every successful write clears.
// A read that overlaps a write never repopulates the cache with its result.

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use moka::future::Cache;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::error::StoreError;
use crate::ledger::store::RecordStore;
use crate::model::Record;
use crate::observability::LedgerMetrics;

const ALL_RECORDS: &str = "all-records";

/// Submit quota and evaluate-cache lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayLimits {
    pub submit_rate_per_second: u32,
    pub submit_burst: u32,
    pub evaluate_cache_ttl: Duration,
}

impl Default for GatewayLimits {
    fn default() -> Self {
        Self {
            submit_rate_per_second: 50,
            submit_burst: 100,
            evaluate_cache_ttl: Duration::from_millis(500),
        }
    }
}

pub struct LedgerGateway {
    store: Arc<dyn RecordStore>,
    rate_limiter: Arc<DefaultDirectRateLimiter>,
    cache: Cache<&'static str, Arc<Vec<Record>>>,
    // bumped on every invalidation
    generation: AtomicU64,
    metrics: Arc<LedgerMetrics>,
}

impl std::fmt::Debug for LedgerGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerGateway")
            .field("cached_entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl LedgerGateway {
    pub fn new(store: Arc<dyn RecordStore>, limits: GatewayLimits, metrics: Arc<LedgerMetrics>) -> Self {
        let rate = NonZeroU32::new(limits.submit_rate_per_second).unwrap_or(NonZeroU32::MIN);
        let burst = NonZeroU32::new(limits.submit_burst).unwrap_or(rate);
        let quota = Quota::per_second(rate).allow_burst(burst);

        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(limits.evaluate_cache_ttl)
            .build();

        Self {
            store,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            cache,
            generation: AtomicU64::new(0),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<LedgerMetrics> {
        &self.metrics
    }

    /// Drop the cached evaluate result
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cache.invalidate(ALL_RECORDS).await;
        debug!("Evaluate cache invalidated");
    }

    fn observe<T>(&self, id: &str, result: &Result<T, StoreError>) {
        if let Err(StoreError::VersionConflict { .. }) = result {
            self.metrics.record_conflict(id);
        }
    }
}

#[async_trait]
impl RecordStore for LedgerGateway {
    async fn read(&self, id: &str) -> Result<Record, StoreError> {
        self.metrics.record_read();
        self.store.read(id).await
    }

    async fn read_all(&self) -> Result<Vec<Record>, StoreError> {
        if let Some(cached) = self.cache.get(ALL_RECORDS).await {
            self.metrics.record_cache_hit();
            return Ok(cached.as_ref().clone());
        }
        self.metrics.record_cache_miss();
        self.metrics.record_read();

        let generation = self.generation.load(Ordering::SeqCst);
        let records = self.store.read_all().await?;
        if self.generation.load(Ordering::SeqCst) == generation {
            self.cache.insert(ALL_RECORDS, Arc::new(records.clone())).await;
            // a write may have cleared the cache between the check and the insert
            if self.generation.load(Ordering::SeqCst) != generation {
                self.cache.invalidate(ALL_RECORDS).await;
            }
        } else {
            debug!("Ledger changed during evaluate, result not cached");
        }
        Ok(records)
    }

    async fn write(
        &self,
        id: &str,
        record: &Record,
        expected_version: Option<u64>,
    ) -> Result<(), StoreError> {
        self.rate_limiter.until_ready().await;
        let result = self.store.write(id, record, expected_version).await;
        self.observe(id, &result);
        if result.is_ok() {
            self.metrics.record_write();
            self.invalidate().await;
        }
        result
    }

    async fn delete(&self, id: &str, expected_version: u64) -> Result<(), StoreError> {
        self.rate_limiter.until_ready().await;
        let result = self.store.delete(id, expected_version).await;
        self.observe(id, &result);
        if result.is_ok() {
            self.metrics.record_delete();
            self.invalidate().await;
        }
        result
    }

    async fn insert_raw(&self, id: &str, document: Value) -> Result<bool, StoreError> {
        let inserted = self.store.insert_raw(id, document).await?;
        if inserted {
            self.metrics.record_write();
            self.invalidate().await;
        }
        Ok(inserted)
    }
}
