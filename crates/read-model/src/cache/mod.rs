pub mod memory_store;
pub mod order_cache;
pub mod redis_store;

use async_trait::async_trait;
use std::time::Duration;

use crate::ReadModelError;

/// Minimal key-value store with expiring writes
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, ReadModelError>;

    /// Store `value` under `key`; the store may evict it after `ttl`
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), ReadModelError>;

    /// Backend label used in logs and metrics
    fn backend(&self) -> &'static str;
}
