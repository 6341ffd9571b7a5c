//! Integration tests for resilience module
//!
//! Exercises the circuit breaker and breaker registry through the public API
//! with failing operations, concurrent callers and a mock clock.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use declarations_common::resilience::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerRegistry, CircuitState, MockClock,
    ResilienceError,
};
use futures::future::join_all;

/// Custom error type for testing
#[derive(Debug, Clone)]
struct TestError {
    message: String,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for TestError {}

fn failure() -> Result<(), TestError> {
    Err(TestError { message: "Failure".to_string() })
}

fn breaker_with_clock(
    threshold: u64,
    cool_down: Duration,
) -> (CircuitBreaker<MockClock>, MockClock) {
    let clock = MockClock::new();
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(threshold)
        .cool_down(cool_down)
        .build()
        .expect("Failed to build config");
    let breaker = CircuitBreaker::with_clock(config, clock.clone())
        .expect("Failed to create circuit breaker");
    (breaker, clock)
}

/// Validates circuit breaker opens after consecutive failures.
///
/// # Test Steps
/// 1. Create circuit breaker with failure threshold of 3
/// 2. Trigger 3 consecutive failures
/// 3. Verify circuit transitions to Open state
/// 4. Attempt call while open and confirm the operation never runs
#[tokio::test(flavor = "multi_thread")]
async fn test_circuit_breaker_basic() {
    let (breaker, _clock) = breaker_with_clock(3, Duration::from_secs(60));
    assert_eq!(breaker.state(), CircuitState::Closed);

    for _ in 0..3 {
        let _ = breaker.execute(|| async { failure() }).await;
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    let invoked = AtomicU32::new(0);
    let result = breaker
        .execute(|| async {
            invoked.fetch_add(1, Ordering::SeqCst);
            Ok::<_, TestError>("Should not execute")
        })
        .await;

    assert!(matches!(result, Err(ResilienceError::CircuitOpen)));
    assert_eq!(invoked.load(Ordering::SeqCst), 0);
}

/// Validates complete state machine cycle Closed -> Open -> HalfOpen -> Closed.
///
/// # Test Steps
/// 1. Open the circuit with two failures
/// 2. Confirm calls are rejected before the cool-down elapses
/// 3. Advance the mock clock past the cool-down
/// 4. Successful probe closes the circuit
#[tokio::test(flavor = "multi_thread")]
async fn test_circuit_breaker_state_transitions() {
    let (breaker, clock) = breaker_with_clock(2, Duration::from_millis(100));

    for _ in 0..2 {
        let _ = breaker.execute(|| async { failure() }).await;
    }
    assert_eq!(breaker.state(), CircuitState::Open);

    clock.advance_millis(50);
    let early = breaker.execute(|| async { Ok::<_, TestError>("early") }).await;
    assert!(matches!(early, Err(ResilienceError::CircuitOpen)));

    clock.advance_millis(50);
    let result = breaker.execute(|| async { Ok::<_, TestError>("Success") }).await;
    assert_eq!(result.expect("probe should run"), "Success");
    assert_eq!(breaker.state(), CircuitState::Closed);
}

/// Validates that a failed probe re-opens the circuit for a full cool-down.
#[tokio::test(flavor = "multi_thread")]
async fn test_failed_probe_restarts_cool_down() {
    let (breaker, clock) = breaker_with_clock(1, Duration::from_secs(10));
    let _ = breaker.execute(|| async { failure() }).await;

    clock.advance(Duration::from_secs(10));
    let probe = breaker.execute(|| async { failure() }).await;
    assert!(matches!(probe, Err(ResilienceError::OperationFailed { .. })));
    assert_eq!(breaker.state(), CircuitState::Open);

    clock.advance(Duration::from_secs(9));
    let rejected = breaker.execute(|| async { Ok::<_, TestError>(()) }).await;
    assert!(matches!(rejected, Err(ResilienceError::CircuitOpen)));
}

/// Validates circuit breaker tracks operation metrics accurately.
///
/// # Test Steps
/// 1. Execute 3 successful and 2 failed operations
/// 2. Open the circuit and make one rejected call
/// 3. Verify successes, failures, admitted and rejected counts
#[tokio::test(flavor = "multi_thread")]
async fn test_circuit_breaker_metrics() {
    let (breaker, _clock) = breaker_with_clock(3, Duration::from_secs(60));

    for _ in 0..3 {
        let _ = breaker.execute(|| async { Ok::<_, TestError>("Success") }).await;
    }
    for _ in 0..3 {
        let _ = breaker.execute(|| async { failure() }).await;
    }
    let _ = breaker.execute(|| async { Ok::<_, TestError>("rejected") }).await;

    let metrics = breaker.metrics();
    assert_eq!(metrics.successes, 3);
    assert_eq!(metrics.failures, 3);
    assert_eq!(metrics.total_calls, 6);
    assert_eq!(metrics.rejected_calls, 1);
    assert_eq!(metrics.state, CircuitState::Open);
    assert!(metrics.opened_at.is_some());
}

/// Validates that many callers arriving after the cool-down admit one probe.
///
/// # Test Steps
/// 1. Open the circuit and advance past the cool-down
/// 2. Poll 10 calls together; the probe yields while the rest are polled
/// 3. Confirm exactly one operation ran and the others were rejected
/// 4. Confirm the successful probe closed the circuit
#[tokio::test]
async fn test_concurrent_callers_single_probe() {
    let (breaker, clock) = breaker_with_clock(1, Duration::from_secs(5));
    let _ = breaker.execute(|| async { failure() }).await;
    clock.advance(Duration::from_secs(5));

    let invoked = Arc::new(AtomicU32::new(0));
    let calls = (0..10).map(|_| {
        let invoked = Arc::clone(&invoked);
        let breaker = breaker.clone();
        async move {
            breaker
                .execute(|| async move {
                    invoked.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    Ok::<_, TestError>(())
                })
                .await
        }
    });

    let results = join_all(calls).await;

    let rejected =
        results.iter().filter(|r| matches!(r, Err(ResilienceError::CircuitOpen))).count();
    assert_eq!(invoked.load(Ordering::SeqCst), 1);
    assert_eq!(rejected, 9);
    assert_eq!(breaker.state(), CircuitState::Closed);
}

/// Validates that a slow call admitted while closed cannot close a circuit
/// that tripped while it was in flight.
#[tokio::test]
async fn test_stale_result_is_ignored() {
    let (breaker, _clock) = breaker_with_clock(1, Duration::from_secs(60));

    let slow = breaker.try_acquire().expect("closed circuit admits");
    let _ = breaker.execute(|| async { failure() }).await;
    assert_eq!(breaker.state(), CircuitState::Open);

    slow.succeeded();
    assert_eq!(breaker.state(), CircuitState::Open);
}

/// Validates that breakers obtained from a registry are isolated per key.
#[tokio::test]
async fn test_registry_isolates_keys() {
    let clock = MockClock::new();
    let config = CircuitBreakerConfig::builder()
        .failure_threshold(1)
        .cool_down(Duration::from_secs(30))
        .build()
        .expect("Failed to build config");
    let registry = CircuitBreakerRegistry::with_clock(config, clock.clone())
        .expect("Failed to create registry");

    let _ = registry.breaker(&"legacy").execute(|| async { failure() }).await;

    let modernized =
        registry.breaker(&"modernized").execute(|| async { Ok::<_, TestError>(()) }).await;
    assert!(modernized.is_ok());
    assert_eq!(registry.metrics(&"legacy").map(|m| m.state), Some(CircuitState::Open));
    assert_eq!(registry.metrics(&"modernized").map(|m| m.state), Some(CircuitState::Closed));
}
