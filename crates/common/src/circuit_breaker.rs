use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::metrics::{
    record_circuit_breaker_state, record_circuit_breaker_transition,
    CircuitBreakerState as MetricsState,
};

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitBreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl From<CircuitBreakerState> for MetricsState {
    fn from(state: CircuitBreakerState) -> Self {
        match state {
            CircuitBreakerState::Closed => MetricsState::Closed,
            CircuitBreakerState::Open => MetricsState::Open,
            CircuitBreakerState::HalfOpen => MetricsState::HalfOpen,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the breaker
    pub failure_threshold: u32,
    /// Successful half-open trial calls needed to close it again
    pub success_threshold: u32,
    /// Upper bound on a single call
    pub timeout: Duration,
    /// How long an open breaker rejects calls before probing
    pub half_open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            timeout: Duration::from_secs(30),
            half_open_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct Tracker {
    state: CircuitBreakerState,
    consecutive_failures: u32,
    trial_successes: u32,
    opened_at: Option<Instant>,
}

/// Guards calls to an external collaborator.
///
/// After `failure_threshold` consecutive failures the breaker opens and calls
/// are rejected without touching the collaborator until `half_open_timeout`
/// has elapsed. Every call is bounded by `timeout`. Nothing is retried.
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    tracker: Mutex<Tracker>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        record_circuit_breaker_state(&name, MetricsState::Closed);

        Self {
            name,
            config,
            tracker: Mutex::new(Tracker {
                state: CircuitBreakerState::Closed,
                consecutive_failures: 0,
                trial_successes: 0,
                opened_at: None,
            }),
        }
    }

    /// Run `f` under breaker protection and the configured timeout
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        if !self.admit().await {
            tracing::debug!(service = %self.name, "Circuit breaker rejected call");
            return Err(CircuitBreakerError::Open);
        }

        let start = Instant::now();
        match tokio::time::timeout(self.config.timeout, f).await {
            Ok(Ok(value)) => {
                self.record_success().await;
                tracing::debug!(
                    service = %self.name,
                    duration_ms = %start.elapsed().as_millis(),
                    "Guarded call succeeded"
                );
                Ok(value)
            }
            Ok(Err(err)) => {
                self.record_failure().await;
                tracing::warn!(
                    service = %self.name,
                    duration_ms = %start.elapsed().as_millis(),
                    "Guarded call failed"
                );
                Err(CircuitBreakerError::CallFailed(err))
            }
            Err(_) => {
                self.record_failure().await;
                tracing::error!(
                    service = %self.name,
                    timeout_ms = %self.config.timeout.as_millis(),
                    "Guarded call timed out"
                );
                Err(CircuitBreakerError::Timeout)
            }
        }
    }

    /// Whether a call may proceed. Moves an expired open breaker to half-open.
    async fn admit(&self) -> bool {
        let mut tracker = self.tracker.lock().await;

        if tracker.state != CircuitBreakerState::Open {
            return true;
        }

        let cooled_down = tracker
            .opened_at
            .map_or(true, |at| at.elapsed() >= self.config.half_open_timeout);
        if cooled_down {
            tracker.trial_successes = 0;
            self.move_to(&mut tracker, CircuitBreakerState::HalfOpen);
        }
        cooled_down
    }

    async fn record_success(&self) {
        let mut tracker = self.tracker.lock().await;
        tracker.consecutive_failures = 0;

        if tracker.state == CircuitBreakerState::HalfOpen {
            tracker.trial_successes += 1;
            if tracker.trial_successes >= self.config.success_threshold {
                tracker.trial_successes = 0;
                tracker.opened_at = None;
                self.move_to(&mut tracker, CircuitBreakerState::Closed);
            }
        }
    }

    async fn record_failure(&self) {
        let mut tracker = self.tracker.lock().await;
        tracker.consecutive_failures += 1;

        let trips = match tracker.state {
            CircuitBreakerState::Closed => {
                tracker.consecutive_failures >= self.config.failure_threshold
            }
            // a failed trial call reopens immediately
            CircuitBreakerState::HalfOpen => true,
            CircuitBreakerState::Open => false,
        };

        if trips {
            tracker.opened_at = Some(Instant::now());
            tracing::warn!(
                service = %self.name,
                failures = %tracker.consecutive_failures,
                "Circuit breaker opened"
            );
            self.move_to(&mut tracker, CircuitBreakerState::Open);
        }
    }

    fn move_to(&self, tracker: &mut Tracker, to: CircuitBreakerState) {
        let from = tracker.state;
        tracker.state = to;
        record_circuit_breaker_transition(&self.name, from.into(), to.into());
        record_circuit_breaker_state(&self.name, to.into());
        tracing::info!(
            service = %self.name,
            from = ?from,
            to = ?to,
            "Circuit breaker transitioned"
        );
    }

    pub async fn get_state(&self) -> CircuitBreakerState {
        self.tracker.lock().await.state
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    #[error("Circuit breaker is open")]
    Open,

    #[error("Call timed out")]
    Timeout,

    #[error("{0}")]
    CallFailed(E),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("Test error")]
    struct TestError;

    #[tokio::test]
    async fn test_circuit_breaker_success() {
        let cb = CircuitBreaker::new("test-source", CircuitBreakerConfig::default());

        let result = cb.call(async { Ok::<_, TestError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_call_failed_keeps_inner_message() {
        let cb = CircuitBreaker::new("test-source", CircuitBreakerConfig::default());

        let result = cb.call(async { Err::<i32, _>(TestError) }).await;
        let err = result.unwrap_err();
        assert!(matches!(err, CircuitBreakerError::CallFailed(_)));
        assert_eq!(err.to_string(), "Test error");
    }

    #[tokio::test]
    async fn test_circuit_breaker_timeout() {
        let cb = CircuitBreaker::new(
            "test-source",
            CircuitBreakerConfig {
                timeout: Duration::from_millis(50),
                ..Default::default()
            },
        );

        let result = cb
            .call(async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, TestError>(42)
            })
            .await;

        assert!(matches!(result, Err(CircuitBreakerError::Timeout)));
    }

    #[tokio::test]
    async fn test_open_breaker_rejects_without_calling() {
        let cb = CircuitBreaker::new(
            "test-source",
            CircuitBreakerConfig {
                failure_threshold: 3,
                ..Default::default()
            },
        );

        for _ in 0..3 {
            let _ = cb.call(async { Err::<i32, _>(TestError) }).await;
        }
        assert_eq!(cb.get_state().await, CircuitBreakerState::Open);

        let called = AtomicBool::new(false);
        let result = cb
            .call(async {
                called.store(true, Ordering::SeqCst);
                Ok::<_, TestError>(1)
            })
            .await;

        assert!(matches!(result, Err(CircuitBreakerError::Open)));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_half_open_success_closes_breaker() {
        let cb = CircuitBreaker::new(
            "test-source",
            CircuitBreakerConfig {
                failure_threshold: 1,
                success_threshold: 1,
                half_open_timeout: Duration::from_secs(0),
                ..Default::default()
            },
        );

        let _ = cb.call(async { Err::<i32, _>(TestError) }).await;
        assert_eq!(cb.get_state().await, CircuitBreakerState::Open);

        let result = cb.call(async { Ok::<_, TestError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(cb.get_state().await, CircuitBreakerState::Closed);
    }
}
