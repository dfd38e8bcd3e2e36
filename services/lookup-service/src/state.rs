use common::config::{AppConfig, CacheConfig, DatabaseConfig};
use lookup::OrderLookupService;
use order_source::HttpOrderSource;
use read_model::{
    KeyValueStore, MemoryStore, OrderCache, OrderRepository, PostgresOrderRepository,
    ReadModelError, RedisStore,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<OrderLookupService>,
    pub api_key: Option<Arc<str>>,
}

impl AppState {
    pub fn new(service: OrderLookupService, api_key: Option<String>) -> Self {
        Self {
            service: Arc::new(service),
            api_key: api_key.map(Arc::from),
        }
    }

    /// Wire collaborators from configuration.
    ///
    /// A collaborator that fails to connect is logged and left out; the
    /// service still starts.
    pub async fn from_config(config: &AppConfig) -> Self {
        info!("Initializing application state...");

        let mut service = OrderLookupService::new().with_credentials(config.has_credentials());

        if let Some(cache_config) = &config.cache {
            match connect_cache(cache_config).await {
                Ok(store) => {
                    info!("Cache connected ({})", store.backend());
                    service = service.with_cache(OrderCache::new(store, cache_config.ttl()));
                }
                Err(e) => warn!("Failed to connect to cache: {}. Continuing without cache.", e),
            }
        }

        if let Some(database_config) = &config.database {
            match connect_database(database_config).await {
                Ok(repository) => {
                    info!("Database connected");
                    service = service.with_repository(repository);
                }
                Err(e) => {
                    warn!("Failed to connect to database: {}. Continuing without persistence.", e)
                }
            }
        }

        if let Some(source_config) = &config.source {
            match HttpOrderSource::new(source_config) {
                Ok(source) => {
                    service = service
                        .with_source(Arc::new(source))
                        .with_circuit_breaker(source_config.circuit_breaker());
                }
                Err(e) => {
                    warn!("Invalid order source configuration: {}. Continuing without source.", e)
                }
            }
        } else {
            warn!("ORDER_SOURCE_URL not set; lookups will return placeholder data");
        }

        Self::new(service, config.api_key.clone())
    }
}

async fn connect_cache(config: &CacheConfig) -> Result<Arc<dyn KeyValueStore>, ReadModelError> {
    if config.is_memory() {
        return Ok(Arc::new(MemoryStore::new()));
    }

    info!("Connecting to Redis...");
    let store = RedisStore::new(&config.url).await?;
    Ok(Arc::new(store))
}

async fn connect_database(
    config: &DatabaseConfig,
) -> Result<Arc<dyn OrderRepository>, ReadModelError> {
    info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await?;

    Ok(Arc::new(PostgresOrderRepository::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_config_starts_without_collaborators() {
        let state = AppState::from_config(&AppConfig::default()).await;
        let report = state.service.health();

        assert!(!report.has_cache);
        assert!(!report.has_database);
        assert!(!report.source_available);
        assert!(state.api_key.is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_and_source() {
        let config = AppConfig {
            cache: Some(CacheConfig {
                url: common::config::MEMORY_CACHE_URL.to_string(),
                ttl_seconds: 60,
            }),
            source: Some(common::config::SourceConfig {
                base_url: "http://localhost:9100".to_string(),
                email: Some("buyer@example.com".to_string()),
                password: Some("secret".to_string()),
                timeout_seconds: 5,
                failure_threshold: 3,
            }),
            ..AppConfig::default()
        };

        let report = AppState::from_config(&config).await.service.health();
        assert!(report.has_cache);
        assert!(report.source_available);
        assert!(report.has_credentials);
    }

    #[tokio::test]
    async fn test_bad_source_url_is_skipped() {
        let config = AppConfig {
            source: Some(common::config::SourceConfig {
                base_url: "not a url".to_string(),
                email: None,
                password: None,
                timeout_seconds: 5,
                failure_threshold: 3,
            }),
            ..AppConfig::default()
        };

        let report = AppState::from_config(&config).await.service.health();
        assert!(!report.source_available);
    }
}
