use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::ReadModelError;

/// In-process key-value store for development and tests.
///
/// Expired keys are dropped on read and swept on every write. A TTL too
/// large to represent as an `Instant` never expires.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

fn is_live(expires_at: Option<Instant>, now: Instant) -> bool {
    expires_at.map_or(true, |at| at > now)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, ReadModelError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if is_live(*expires_at, now) => {
                    return Ok(Some(value.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), ReadModelError> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl);

        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, at)| is_live(*at, now));
        entries.insert(key.to_string(), (value, expires_at));
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
