pub mod cache;
pub mod repositories;

pub use cache::memory_store::MemoryStore;
pub use cache::order_cache::{CacheEntry, OrderCache};
pub use cache::redis_store::RedisStore;
pub use cache::KeyValueStore;
pub use repositories::{OrderRepository, PostgresOrderRepository, StoredOrder};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadModelError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Refusing to store unsuccessful fetch for order: {0}")]
    UnsuccessfulRecord(String),
}
