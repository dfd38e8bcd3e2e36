use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

use super::KeyValueStore;
use crate::ReadModelError;

/// Redis-backed key-value store
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis
    pub async fn new(redis_url: &str) -> Result<Self, ReadModelError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| {
                ReadModelError::CacheError(format!("Failed to create Redis client: {}", e))
            })?;

        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| ReadModelError::CacheError(format!("Failed to connect to Redis: {}", e)))?;

        info!("Redis store connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ReadModelError> {
        let value: Option<String> = self
            .conn
            .clone()
            .get(key)
            .await
            .map_err(|e| ReadModelError::CacheError(format!("Redis GET {} failed: {}", key, e)))?;

        debug!("Redis GET {} -> {}", key, if value.is_some() { "hit" } else { "miss" });
        Ok(value)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), ReadModelError> {
        // SET EX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);

        let result: Result<(), redis::RedisError> =
            self.conn.clone().set_ex(key, value, seconds).await;
        result.map_err(|e| ReadModelError::CacheError(format!("Redis SET {} failed: {}", key, e)))?;

        debug!("Redis SET {} with TTL: {}s", key, seconds);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore] // Requires Redis to be running
    async fn test_store_operations() {
        let store = RedisStore::new("redis://localhost:6379")
            .await
            .expect("Failed to connect to Redis");

        let key = format!(
            "order_lookup:test:{}",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        );

        store
            .put(&key, "{\"test\":\"data\"}".to_string(), Duration::from_secs(30))
            .await
            .unwrap();

        let cached = store.get(&key).await.unwrap();
        assert_eq!(cached.as_deref(), Some("{\"test\":\"data\"}"));

        let missing = store.get("order_lookup:test:missing").await.unwrap();
        assert!(missing.is_none());
    }
}
