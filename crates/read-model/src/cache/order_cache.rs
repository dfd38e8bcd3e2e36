use chrono::{DateTime, Utc};
use common::metrics;
use domain::{OrderIdentifier, OrderRecord};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};

use super::KeyValueStore;

const KEY_PREFIX: &str = "order_lookup";

/// Cached order plus the wall-clock time it was written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub order_data: OrderRecord,
    pub cached_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(order_data: OrderRecord, cached_at: DateTime<Utc>) -> Self {
        Self {
            order_data,
            cached_at,
        }
    }

    /// Valid while `now - cached_at < ttl`. A timestamp in the future counts as age zero.
    pub fn is_valid_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let age = (now - self.cached_at).to_std().unwrap_or_default();
        age < ttl
    }
}

/// Time-boxed order cache over a [`KeyValueStore`].
///
/// Reads fail open: any store or decoding error is a miss. Validity is
/// re-checked on every read regardless of whether the store has evicted the
/// key yet.
#[derive(Clone)]
pub struct OrderCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl OrderCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn cache_key(order_id: &OrderIdentifier) -> String {
        format!("{}:{}", KEY_PREFIX, order_id)
    }

    pub async fn read(&self, order_id: &OrderIdentifier) -> Option<OrderRecord> {
        self.read_at(order_id, Utc::now()).await
    }

    /// Read, judging validity against `now`
    pub async fn read_at(
        &self,
        order_id: &OrderIdentifier,
        now: DateTime<Utc>,
    ) -> Option<OrderRecord> {
        let key = Self::cache_key(order_id);

        let raw = match self.store.get(&key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Cache miss for key: {}", key);
                metrics::record_cache_request(self.backend(), false);
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for key {}, treating as miss: {}", key, e);
                metrics::record_cache_request(self.backend(), false);
                return None;
            }
        };

        let entry = match serde_json::from_str::<CacheEntry>(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                error!("Failed to deserialize cached value for {}: {}", key, e);
                metrics::record_cache_request(self.backend(), false);
                return None;
            }
        };

        if !entry.is_valid_at(now, self.ttl) {
            debug!("Cache entry for {} expired (cached_at: {})", key, entry.cached_at);
            metrics::record_cache_request(self.backend(), false);
            return None;
        }

        if !entry.order_data.is_fetched() || entry.order_data.order_id != *order_id {
            warn!("Ignoring unusable cache entry for key: {}", key);
            metrics::record_cache_request(self.backend(), false);
            return None;
        }

        debug!("Cache hit for key: {}", key);
        metrics::record_cache_request(self.backend(), true);
        Some(entry.order_data)
    }

    /// Store a successful fetch, stamped with the current wall-clock time
    pub async fn write(&self, order_id: &OrderIdentifier, record: &OrderRecord) {
        self.write_at(order_id, record, Utc::now()).await
    }

    pub async fn write_at(
        &self,
        order_id: &OrderIdentifier,
        record: &OrderRecord,
        cached_at: DateTime<Utc>,
    ) {
        let key = Self::cache_key(order_id);

        if !record.is_fetched() {
            debug!("Not caching unsuccessful fetch for key: {}", key);
            return;
        }

        let entry = CacheEntry::new(record.clone(), cached_at);
        let json = match serde_json::to_string(&entry) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize value for cache key {}: {}", key, e);
                return;
            }
        };

        match self.store.put(&key, json, self.ttl).await {
            Ok(()) => debug!("Cached value for key: {} with TTL: {}s", key, self.ttl.as_secs()),
            Err(e) => error!("Failed to set cache for key {}: {}", key, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, ReadModelError};
    use async_trait::async_trait;
    use domain::LineItem;
    use rust_decimal::Decimal;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    fn order_id() -> OrderIdentifier {
        OrderIdentifier::parse("123-4567890-1234567").unwrap()
    }

    fn fetched() -> OrderRecord {
        OrderRecord::fetched(
            order_id(),
            None,
            Decimal::new(2599, 2),
            "Shipped",
            vec![LineItem::new("Headphones", Decimal::new(2599, 2), 1)],
        )
    }

    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, ReadModelError> {
            Err(ReadModelError::CacheError("connection refused".to_string()))
        }

        async fn put(
            &self,
            _key: &str,
            _value: String,
            _ttl: Duration,
        ) -> Result<(), ReadModelError> {
            Err(ReadModelError::CacheError("connection refused".to_string()))
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let cache = OrderCache::new(Arc::new(MemoryStore::new()), DAY);
        cache.write(&order_id(), &fetched()).await;

        assert_eq!(cache.read(&order_id()).await, Some(fetched()));
    }

    #[tokio::test]
    async fn test_entry_older_than_ttl_is_absent() {
        let store = Arc::new(MemoryStore::new());
        let cache = OrderCache::new(store.clone(), DAY);

        let stale = Utc::now() - chrono::Duration::hours(25);
        cache.write_at(&order_id(), &fetched(), stale).await;

        // The store still holds the key, the cache must not return it.
        assert!(store.get(&OrderCache::cache_key(&order_id())).await.unwrap().is_some());
        assert!(cache.read(&order_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_entry_just_inside_ttl_is_returned() {
        let cache = OrderCache::new(Arc::new(MemoryStore::new()), DAY);
        let cached_at = Utc::now();
        cache.write_at(&order_id(), &fetched(), cached_at).await;

        let now = cached_at + chrono::Duration::hours(23) + chrono::Duration::minutes(59);
        assert!(cache.read_at(&order_id(), now).await.is_some());

        let now = cached_at + chrono::Duration::hours(24);
        assert!(cache.read_at(&order_id(), now).await.is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_is_never_cached() {
        let store = Arc::new(MemoryStore::new());
        let cache = OrderCache::new(store.clone(), DAY);

        cache.write(&order_id(), &OrderRecord::failed(order_id(), "timeout")).await;
        cache.write(&order_id(), &OrderRecord::not_found(order_id())).await;
        cache.write(&order_id(), &OrderRecord::source_unavailable(order_id())).await;

        assert!(store.is_empty().await);
        assert!(cache.read(&order_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_store_errors_fail_open() {
        let cache = OrderCache::new(Arc::new(BrokenStore), DAY);

        cache.write(&order_id(), &fetched()).await;
        assert!(cache.read(&order_id()).await.is_none());
    }

    #[tokio::test]
    async fn test_garbage_entry_is_a_miss() {
        let store = Arc::new(MemoryStore::new());
        store
            .put(&OrderCache::cache_key(&order_id()), "not json".to_string(), DAY)
            .await
            .unwrap();

        let cache = OrderCache::new(store, DAY);
        assert!(cache.read(&order_id()).await.is_none());
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let now = Utc::now();
        let entry = CacheEntry::new(fetched(), now + chrono::Duration::minutes(5));
        assert!(entry.is_valid_at(now, DAY));
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(
            OrderCache::cache_key(&order_id()),
            "order_lookup:123-4567890-1234567"
        );
    }
}
