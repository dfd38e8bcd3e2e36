use serde::Deserialize;
use std::time::Duration;

use crate::circuit_breaker::CircuitBreakerConfig;

pub const DEFAULT_PORT: u16 = 8787;
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 24 * 60 * 60;
pub const MEMORY_CACHE_URL: &str = "memory://";

/// Relational store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Key-value cache configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// `redis://…` or [`MEMORY_CACHE_URL`] for the in-process store
    pub url: String,
    pub ttl_seconds: u64,
}

impl CacheConfig {
    pub fn is_memory(&self) -> bool {
        self.url == MEMORY_CACHE_URL
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// Upstream order source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub base_url: String,
    pub email: Option<String>,
    pub password: Option<String>,
    pub timeout_seconds: u64,
    pub failure_threshold: u32,
}

impl SourceConfig {
    pub fn has_credentials(&self) -> bool {
        self.email.as_deref().map_or(false, |e| !e.is_empty())
    }

    pub fn circuit_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            timeout: Duration::from_secs(self.timeout_seconds),
            ..CircuitBreakerConfig::default()
        }
    }
}

/// Logging and tracing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetrySettings {
    pub log_level: String,
    pub enable_jaeger: bool,
    pub jaeger_endpoint: Option<String>,
}

/// Application configuration.
///
/// Every collaborator section is optional: an absent section means the
/// service runs without that collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub port: u16,
    pub api_key: Option<String>,
    pub database: Option<DatabaseConfig>,
    pub cache: Option<CacheConfig>,
    pub source: Option<SourceConfig>,
    pub telemetry: TelemetrySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            api_key: None,
            database: None,
            cache: None,
            source: None,
            telemetry: TelemetrySettings {
                log_level: "info".to_string(),
                enable_jaeger: false,
                jaeger_endpoint: None,
            },
        }
    }
}

impl AppConfig {
    /// Build configuration from process environment (after `.env` loading)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let parsed = |key: &str, default: u64| -> u64 {
            var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
        };
        // Counts must be positive and fit in a u32
        let count = |key: &str, default: u32| -> u32 {
            var(key)
                .and_then(|v| v.parse::<u64>().ok())
                .and_then(|n| u32::try_from(n).ok())
                .filter(|n| *n > 0)
                .unwrap_or(default)
        };

        let database = var("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections: count("DATABASE_MAX_CONNECTIONS", 5),
        });

        let cache = var("REDIS_URL").map(|url| CacheConfig {
            url,
            ttl_seconds: parsed("CACHE_TTL_SECONDS", DEFAULT_CACHE_TTL_SECONDS),
        });

        let source = var("ORDER_SOURCE_URL").map(|base_url| SourceConfig {
            base_url,
            email: var("ORDER_SOURCE_EMAIL"),
            password: var("ORDER_SOURCE_PASSWORD"),
            timeout_seconds: parsed("ORDER_SOURCE_TIMEOUT_SECONDS", 30),
            failure_threshold: count("ORDER_SOURCE_FAILURE_THRESHOLD", 5),
        });

        Self {
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(DEFAULT_PORT),
            api_key: var("API_KEY"),
            database,
            cache,
            source,
            telemetry: TelemetrySettings {
                log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
                enable_jaeger: var("ENABLE_JAEGER")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(false),
                jaeger_endpoint: var("JAEGER_ENDPOINT"),
            },
        }
    }

    pub fn has_credentials(&self) -> bool {
        self.source.as_ref().map_or(false, SourceConfig::has_credentials)
    }
}
