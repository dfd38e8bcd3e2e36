use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_gauge_vec, CounterVec,
    Encoder, HistogramVec, IntGaugeVec, TextEncoder,
};

lazy_static! {
    // Boundary operation metrics
    pub static ref OPERATION_COUNTER: CounterVec = register_counter_vec!(
        "order_lookup_operations_total",
        "Total number of boundary operations processed",
        &["operation", "status"]
    )
    .expect("metric cannot be created");

    pub static ref OPERATION_DURATION: HistogramVec = register_histogram_vec!(
        "order_lookup_operation_duration_seconds",
        "Boundary operation duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    )
    .expect("metric cannot be created");

    // Extraction metrics
    pub static ref EXTRACTION_COUNTER: CounterVec = register_counter_vec!(
        "order_lookup_extractions_total",
        "Identifier extraction attempts by matched format",
        &["format"]
    )
    .expect("metric cannot be created");

    // Fetch metrics
    pub static ref FETCH_OUTCOME_COUNTER: CounterVec = register_counter_vec!(
        "order_lookup_fetch_outcomes_total",
        "Order fetch results by outcome",
        &["outcome"]
    )
    .expect("metric cannot be created");

    pub static ref SOURCE_DURATION: HistogramVec = register_histogram_vec!(
        "order_lookup_source_duration_seconds",
        "External order source call duration in seconds",
        &["status"],
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0]
    )
    .expect("metric cannot be created");

    // Cache metrics
    pub static ref CACHE_HIT_COUNTER: CounterVec = register_counter_vec!(
        "order_lookup_cache_requests_total",
        "Total number of cache requests",
        &["cache_type", "status"]
    )
    .expect("metric cannot be created");

    // Persistence metrics
    pub static ref PERSISTENCE_COUNTER: CounterVec = register_counter_vec!(
        "order_lookup_persistence_operations_total",
        "Total number of durable store operations",
        &["operation", "status"]
    )
    .expect("metric cannot be created");

    // Circuit breaker metrics
    pub static ref CIRCUIT_BREAKER_STATE: IntGaugeVec = register_int_gauge_vec!(
        "order_lookup_circuit_breaker_state",
        "Circuit breaker state (0=closed, 1=open, 2=half-open)",
        &["service"]
    )
    .expect("metric cannot be created");

    pub static ref CIRCUIT_BREAKER_COUNTER: CounterVec = register_counter_vec!(
        "order_lookup_circuit_breaker_total",
        "Total number of circuit breaker state changes",
        &["service", "from_state", "to_state"]
    )
    .expect("metric cannot be created");
}

/// Get all metrics in Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Helper function to record a boundary operation
pub fn record_operation(operation: &str, success: bool, duration_secs: f64) {
    let status = if success { "success" } else { "error" };
    OPERATION_COUNTER
        .with_label_values(&[operation, status])
        .inc();
    OPERATION_DURATION
        .with_label_values(&[operation])
        .observe(duration_secs);
}

/// Helper function to record which pattern matched, or "none"
pub fn record_extraction(format: Option<&str>) {
    EXTRACTION_COUNTER
        .with_label_values(&[format.unwrap_or("none")])
        .inc();
}

/// Helper function to record a fetch outcome
pub fn record_fetch_outcome(outcome: &str) {
    FETCH_OUTCOME_COUNTER.with_label_values(&[outcome]).inc();
}

/// Helper function to record an external source call
pub fn record_source_call(success: bool, duration_secs: f64) {
    let status = if success { "success" } else { "error" };
    SOURCE_DURATION
        .with_label_values(&[status])
        .observe(duration_secs);
}

/// Helper function to record cache hit/miss
pub fn record_cache_request(cache_type: &str, hit: bool) {
    let status = if hit { "hit" } else { "miss" };
    CACHE_HIT_COUNTER
        .with_label_values(&[cache_type, status])
        .inc();
}

/// Helper function to record a durable store operation
pub fn record_persistence(operation: &str, success: bool) {
    let status = if success { "success" } else { "error" };
    PERSISTENCE_COUNTER
        .with_label_values(&[operation, status])
        .inc();
}

/// Helper function to record circuit breaker state
pub fn record_circuit_breaker_state(service: &str, state: CircuitBreakerState) {
    let state_value = match state {
        CircuitBreakerState::Closed => 0,
        CircuitBreakerState::Open => 1,
        CircuitBreakerState::HalfOpen => 2,
    };
    CIRCUIT_BREAKER_STATE
        .with_label_values(&[service])
        .set(state_value);
}

/// Helper function to record circuit breaker state change
pub fn record_circuit_breaker_transition(
    service: &str,
    from: CircuitBreakerState,
    to: CircuitBreakerState,
) {
    CIRCUIT_BREAKER_COUNTER
        .with_label_values(&[service, &format!("{:?}", from), &format!("{:?}", to)])
        .inc();
}

#[derive(Debug, Clone, Copy)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}
