use common::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};
use common::metrics;
use domain::{extract_from_statement, extract_with_format, OrderIdentifier, OrderRecord};
use order_source::{OrderSource, SourceError};
use read_model::{OrderCache, OrderRepository, StoredOrder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::errors::{LookupError, Result};
use crate::responses::{
    BulkItem, BulkResponse, HealthReport, LookupResponse, ParseResponse, StatementParseResponse,
};

pub const SERVICE_NAME: &str = "order-lookup";
pub const CIRCUIT_OPEN_MESSAGE: &str = "Order source temporarily unavailable (circuit open)";
pub const TIMEOUT_MESSAGE: &str = "Order source timed out";

/// Resolves order identifiers to order records.
///
/// Every collaborator is optional. A missing cache means every fetch goes
/// to the source, a missing source yields placeholder records, and a missing
/// repository skips persistence.
pub struct OrderLookupService {
    cache: Option<OrderCache>,
    source: Option<Arc<dyn OrderSource>>,
    repository: Option<Arc<dyn OrderRepository>>,
    breaker: Arc<CircuitBreaker>,
    has_credentials: bool,
}

impl Default for OrderLookupService {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderLookupService {
    pub fn new() -> Self {
        Self {
            cache: None,
            source: None,
            repository: None,
            breaker: Arc::new(CircuitBreaker::new("order_source", CircuitBreakerConfig::default())),
            has_credentials: false,
        }
    }

    pub fn with_cache(mut self, cache: OrderCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_source(mut self, source: Arc<dyn OrderSource>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_repository(mut self, repository: Arc<dyn OrderRepository>) -> Self {
        self.repository = Some(repository);
        self
    }

    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.breaker = Arc::new(CircuitBreaker::new("order_source", config));
        self
    }

    pub fn with_credentials(mut self, has_credentials: bool) -> Self {
        self.has_credentials = has_credentials;
        self
    }

    /// Pull an order identifier out of one merchant description
    pub fn extract(&self, merchant: &str) -> ParseResponse {
        let start = Instant::now();
        let extracted = extract_with_format(merchant);
        metrics::record_extraction(extracted.as_ref().map(|(_, format)| format.as_str()));
        metrics::record_operation("parse", true, start.elapsed().as_secs_f64());

        match extracted {
            Some((order_id, format)) => {
                debug!("Extracted order id {} ({}) from merchant text", order_id, format.as_str());
                ParseResponse {
                    success: true,
                    merchant: merchant.to_string(),
                    order_id: Some(order_id),
                    found: true,
                    format: Some(format),
                }
            }
            None => ParseResponse {
                success: true,
                merchant: merchant.to_string(),
                order_id: None,
                found: false,
                format: None,
            },
        }
    }

    /// First identifier found on any line of a statement
    pub fn extract_statement(&self, statement: &str) -> StatementParseResponse {
        let start = Instant::now();
        let order_id = extract_from_statement(statement);
        metrics::record_extraction(order_id.as_ref().map(|id| id.format().as_str()));
        metrics::record_operation("parse_statement", true, start.elapsed().as_secs_f64());

        StatementParseResponse {
            success: true,
            found: order_id.is_some(),
            order_id,
        }
    }

    /// Resolve an order: cache first, then the source.
    ///
    /// Never fails; problems are carried in the record's outcome. Only
    /// successful fetches are written to the cache.
    #[instrument(skip_all, fields(order_id = %order_id))]
    pub async fn fetch(&self, order_id: &OrderIdentifier) -> OrderRecord {
        if let Some(cache) = &self.cache {
            if let Some(record) = cache.read(order_id).await {
                debug!("Serving order {} from cache", order_id);
                metrics::record_fetch_outcome("cache_hit");
                return record;
            }
        }

        let Some(source) = &self.source else {
            warn!("No order source configured, returning placeholder for {}", order_id);
            metrics::record_fetch_outcome("source_unavailable");
            return OrderRecord::source_unavailable(order_id.clone());
        };

        let start = Instant::now();
        let result = self.breaker.call(source.get_order(order_id)).await;
        metrics::record_source_call(result.is_ok(), start.elapsed().as_secs_f64());

        match result {
            Ok(Some(raw)) => {
                let record = raw.into_record(order_id.clone());
                info!("Fetched order {} from {} source", order_id, source.name());
                metrics::record_fetch_outcome("fetched");

                if let Some(cache) = &self.cache {
                    cache.write(order_id, &record).await;
                }
                record
            }
            Ok(None) => {
                info!("Order {} not found at source", order_id);
                metrics::record_fetch_outcome("not_found");
                OrderRecord::not_found(order_id.clone())
            }
            Err(e) => {
                let message = failure_message(e);
                error!("Failed to fetch order {}: {}", order_id, message);
                metrics::record_fetch_outcome("failed");
                OrderRecord::failed(order_id.clone(), message)
            }
        }
    }

    /// Fetch, then persist successful results.
    ///
    /// Persistence errors are logged and do not change the response.
    pub async fn lookup(&self, order_id: &OrderIdentifier) -> LookupResponse {
        let start = Instant::now();
        let record = self.fetch(order_id).await;

        if record.is_fetched() {
            if let Some(repository) = &self.repository {
                if let Err(e) = repository.upsert(&record).await {
                    error!("Failed to persist order {}: {}", order_id, e);
                }
            }
        }

        metrics::record_operation("lookup", record.is_fetched(), start.elapsed().as_secs_f64());
        LookupResponse::from(&record)
    }

    /// Parse the raw path segment, then [`Self::lookup`]
    pub async fn lookup_raw(&self, raw_order_id: &str) -> Result<LookupResponse> {
        let order_id = OrderIdentifier::parse(raw_order_id)?;
        Ok(self.lookup(&order_id).await)
    }

    /// Extract from each merchant string, optionally resolving each id.
    ///
    /// Results keep input order. Items are processed one after another and
    /// one item's outcome never affects another.
    pub async fn bulk(&self, merchants: &[String], fetch_details: bool) -> BulkResponse {
        let start = Instant::now();
        let mut results = Vec::with_capacity(merchants.len());

        for merchant in merchants {
            let parsed = self.extract(merchant);

            let order_details = match (&parsed.order_id, fetch_details) {
                (Some(order_id), true) => Some(self.lookup(order_id).await.data),
                _ => None,
            };

            results.push(BulkItem {
                merchant: parsed.merchant,
                found: parsed.found,
                order_id: parsed.order_id,
                order_details,
            });
        }

        debug!(
            "Bulk request processed {} merchants (fetch_details: {})",
            results.len(),
            fetch_details
        );
        metrics::record_operation("bulk", true, start.elapsed().as_secs_f64());

        BulkResponse {
            success: true,
            results,
        }
    }

    /// Configuration snapshot; performs no I/O
    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: "healthy".to_string(),
            service: SERVICE_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            has_credentials: self.has_credentials,
            has_cache: self.cache.is_some(),
            has_database: self.repository.is_some(),
            source_available: self.source.is_some(),
        }
    }

    /// Read back the durable row for an order
    pub async fn stored(&self, order_id: &OrderIdentifier) -> Result<Option<StoredOrder>> {
        let repository = self.repository.as_ref().ok_or(LookupError::DatabaseUnavailable)?;
        let stored = repository.get_by_id(order_id).await?;
        Ok(stored)
    }
}

fn failure_message(error: CircuitBreakerError<SourceError>) -> String {
    match error {
        CircuitBreakerError::Open => CIRCUIT_OPEN_MESSAGE.to_string(),
        CircuitBreakerError::Timeout => TIMEOUT_MESSAGE.to_string(),
        CircuitBreakerError::CallFailed(e) => e.to_string(),
    }
}
