//! Circuit breaker for fail-fast protection of unhealthy downstreams
//!
//! The breaker moves between three states:
//! - **Closed**: every call is attempted; consecutive failures are counted and
//!   a success resets the count. Reaching the threshold opens the circuit.
//! - **Open**: calls are rejected immediately, without invoking the
//!   operation, until the cool-down has elapsed.
//! - **Half-open**: exactly one probe call is admitted. Its success closes the
//!   circuit, its failure re-opens it and restarts the cool-down.
//!
//! All state lives behind a single mutex so that counting, transitions and
//! probe admission are one atomic step for concurrent callers. Each
//! transition bumps a generation number; results from calls admitted under an
//! older generation only update statistics.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

//==============================================================================
// Time Abstraction for Testability
//==============================================================================

/// Trait for time operations to enable deterministic testing
///
/// Production breakers use [`SystemClock`]; tests drive cool-downs with
/// [`MockClock`] instead of sleeping.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient cloning
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Clones share the same elapsed time, so a test can keep one handle and
/// advance the clock seen by every breaker built from another.
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        *self.elapsed.lock() += duration;
    }

    /// Advance the mock clock by milliseconds (convenience method)
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Get the current elapsed time
    pub fn elapsed(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + *self.elapsed.lock()
    }
}

//==============================================================================
// Error Types
//==============================================================================

/// Simple configuration error for validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors that can occur in resilience operations
///
/// Generic over the underlying operation error type `E` so the original
/// error is preserved as the source.
#[derive(Debug, Error)]
pub enum ResilienceError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    /// Circuit breaker is open, rejecting calls
    #[error("Circuit breaker is open, rejecting calls")]
    CircuitOpen,

    /// The underlying operation failed
    #[error("Operation failed")]
    OperationFailed {
        #[source]
        source: E,
    },
}

/// Result type for resilience operations
pub type ResilienceResult<T, E> = Result<T, ResilienceError<E>>;

/// Configuration result type using simple config errors
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Circuit breaker states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Circuit is closed, allowing requests
    Closed,
    /// Circuit is open, rejecting requests
    Open,
    /// A single probe call is in flight to test recovery
    HalfOpen,
}

impl fmt::Display for CircuitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CircuitState::Closed => write!(f, "CLOSED"),
            CircuitState::Open => write!(f, "OPEN"),
            CircuitState::HalfOpen => write!(f, "HALF_OPEN"),
        }
    }
}

//==============================================================================
// Configuration
//==============================================================================

/// Configuration for circuit breaker behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Number of consecutive failures before opening the circuit
    pub failure_threshold: u64,
    /// Time to wait in the open state before admitting a probe call
    pub cool_down: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self { failure_threshold: 5, cool_down: Duration::from_secs(60) }
    }
}

impl CircuitBreakerConfig {
    /// Create a configuration builder
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.failure_threshold == 0 {
            return Err(ConfigError::Invalid {
                message: "failure_threshold must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Builder for CircuitBreakerConfig
#[derive(Debug, Default)]
pub struct CircuitBreakerConfigBuilder {
    config: CircuitBreakerConfig,
}

impl CircuitBreakerConfigBuilder {
    pub fn new() -> Self {
        Self { config: CircuitBreakerConfig::default() }
    }

    pub fn failure_threshold(mut self, threshold: u64) -> Self {
        self.config.failure_threshold = threshold;
        self
    }

    pub fn cool_down(mut self, cool_down: Duration) -> Self {
        self.config.cool_down = cool_down;
        self
    }

    pub fn build(self) -> ConfigResult<CircuitBreakerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

//==============================================================================
// Circuit Breaker
//==============================================================================

/// Circuit breaker metrics for monitoring
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircuitBreakerMetrics {
    pub state: CircuitState,
    pub consecutive_failures: u64,
    /// Calls admitted through the breaker
    pub total_calls: u64,
    /// Calls rejected without invoking the operation
    pub rejected_calls: u64,
    pub successes: u64,
    pub failures: u64,
    pub opened_at: Option<Instant>,
}

#[derive(Debug)]
struct BreakerInner {
    state: CircuitState,
    consecutive_failures: u64,
    opened_at: Option<Instant>,
    generation: u64,
}

impl BreakerInner {
    fn trip(&mut self, now: Instant) {
        self.state = CircuitState::Open;
        self.opened_at = Some(now);
        self.generation += 1;
    }

    fn close(&mut self) {
        self.state = CircuitState::Closed;
        self.consecutive_failures = 0;
        self.opened_at = None;
        self.generation += 1;
    }
}

#[derive(Debug, Default)]
struct BreakerStats {
    total_calls: AtomicU64,
    rejected_calls: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
}

/// Generic circuit breaker
///
/// Clones share state: every clone observes and drives the same circuit.
pub struct CircuitBreaker<C: Clock = SystemClock> {
    config: CircuitBreakerConfig,
    inner: Arc<Mutex<BreakerInner>>,
    stats: Arc<BreakerStats>,
    clock: Arc<C>,
}

impl<C: Clock> fmt::Debug for CircuitBreaker<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("CircuitBreaker")
            .field("config", &self.config)
            .field("state", &inner.state)
            .field("consecutive_failures", &inner.consecutive_failures)
            .finish()
    }
}

impl<C: Clock> Clone for CircuitBreaker<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            inner: Arc::clone(&self.inner),
            stats: Arc::clone(&self.stats),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl CircuitBreaker<SystemClock> {
    /// Create a new circuit breaker with the given configuration using system
    /// clock
    pub fn new(config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> CircuitBreaker<C> {
    /// Create a new circuit breaker with a custom clock (useful for testing)
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_validated(config, clock))
    }

    pub(crate) fn from_validated(config: CircuitBreakerConfig, clock: C) -> Self {
        Self {
            config,
            inner: Arc::new(Mutex::new(BreakerInner {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                opened_at: None,
                generation: 0,
            })),
            stats: Arc::new(BreakerStats::default()),
            clock: Arc::new(clock),
        }
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Ask the breaker for permission to make one call.
    ///
    /// Returns `None` when the call must be short-circuited. The first caller
    /// after the cool-down receives the probe permit; everyone else is
    /// rejected until the probe resolves.
    pub fn try_acquire(&self) -> Option<CallPermit<'_, C>> {
        let mut inner = self.inner.lock();

        let probe = match inner.state {
            CircuitState::Closed => false,
            CircuitState::Open => {
                let now = self.clock.now();
                let opened_at = inner.opened_at.unwrap_or(now);
                if now.duration_since(opened_at) < self.config.cool_down {
                    self.stats.rejected_calls.fetch_add(1, Ordering::Relaxed);
                    return None;
                }
                inner.state = CircuitState::HalfOpen;
                inner.generation += 1;
                info!("Circuit breaker half-open, admitting probe call");
                true
            }
            CircuitState::HalfOpen => {
                self.stats.rejected_calls.fetch_add(1, Ordering::Relaxed);
                return None;
            }
        };

        self.stats.total_calls.fetch_add(1, Ordering::Relaxed);
        Some(CallPermit { breaker: self, generation: inner.generation, probe, resolved: false })
    }

    /// Execute an operation with circuit breaker protection
    ///
    /// When the circuit is open the operation is never invoked and
    /// [`ResilienceError::CircuitOpen`] is returned immediately.
    #[instrument(skip(self, operation), fields(state = %self.state()))]
    pub async fn execute<F, Fut, T, E>(&self, operation: F) -> ResilienceResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let Some(permit) = self.try_acquire() else {
            debug!("Circuit breaker rejecting call - state: {}", self.state());
            return Err(ResilienceError::CircuitOpen);
        };

        match operation().await {
            Ok(result) => {
                permit.succeeded();
                debug!("Circuit breaker: operation succeeded");
                Ok(result)
            }
            Err(error) => {
                permit.failed();
                warn!(error = %error, "Circuit breaker: operation failed");
                Err(ResilienceError::OperationFailed { source: error })
            }
        }
    }

    fn record_success(&self, generation: u64, probe: bool) {
        self.stats.successes.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock();

        if inner.generation != generation {
            debug!("Circuit breaker: ignoring success from an earlier state");
            return;
        }

        match inner.state {
            CircuitState::Closed => inner.consecutive_failures = 0,
            CircuitState::HalfOpen if probe => {
                inner.close();
                info!("Circuit breaker closed after successful probe");
            }
            _ => {}
        }
    }

    fn record_failure(&self, generation: u64, probe: bool) {
        self.stats.failures.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock();

        if inner.generation != generation {
            debug!("Circuit breaker: ignoring failure from an earlier state");
            return;
        }

        match inner.state {
            CircuitState::Closed => {
                inner.consecutive_failures += 1;
                if inner.consecutive_failures >= self.config.failure_threshold {
                    let failures = inner.consecutive_failures;
                    inner.trip(self.clock.now());
                    warn!(failures, "Circuit breaker opened after {} failures", failures);
                }
            }
            CircuitState::HalfOpen if probe => {
                inner.trip(self.clock.now());
                warn!("Circuit breaker re-opened after failed probe");
            }
            _ => {}
        }
    }

    /// Current state as last recorded.
    ///
    /// An open circuit whose cool-down has elapsed still reports `Open` until
    /// the next call claims the probe.
    pub fn state(&self) -> CircuitState {
        self.inner.lock().state
    }

    /// Get circuit breaker metrics
    pub fn metrics(&self) -> CircuitBreakerMetrics {
        let inner = self.inner.lock();
        CircuitBreakerMetrics {
            state: inner.state,
            consecutive_failures: inner.consecutive_failures,
            total_calls: self.stats.total_calls.load(Ordering::Relaxed),
            rejected_calls: self.stats.rejected_calls.load(Ordering::Relaxed),
            successes: self.stats.successes.load(Ordering::Relaxed),
            failures: self.stats.failures.load(Ordering::Relaxed),
            opened_at: inner.opened_at,
        }
    }

    /// Reset the circuit breaker to closed state
    pub fn reset(&self) {
        self.inner.lock().close();
        info!("Circuit breaker manually reset to closed state");
    }
}

/// Permission to make one protected call.
///
/// Resolve it with [`CallPermit::succeeded`] or [`CallPermit::failed`]. A
/// probe permit dropped unresolved counts as a failed probe, so an abandoned
/// call can never hold the half-open slot.
#[must_use = "a permit must be resolved with succeeded() or failed()"]
pub struct CallPermit<'a, C: Clock> {
    breaker: &'a CircuitBreaker<C>,
    generation: u64,
    probe: bool,
    resolved: bool,
}

impl<C: Clock> CallPermit<'_, C> {
    /// Whether this permit is the single half-open probe.
    pub fn is_probe(&self) -> bool {
        self.probe
    }

    pub fn succeeded(mut self) {
        self.resolved = true;
        self.breaker.record_success(self.generation, self.probe);
    }

    pub fn failed(mut self) {
        self.resolved = true;
        self.breaker.record_failure(self.generation, self.probe);
    }
}

impl<C: Clock> Drop for CallPermit<'_, C> {
    fn drop(&mut self) {
        if !self.resolved && self.probe {
            warn!("Circuit breaker probe abandoned before completion");
            self.breaker.record_failure(self.generation, self.probe);
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for circuit breaker state transitions, configuration
    //! validation and concurrent probe admission.

    use std::io;
    use std::sync::atomic::AtomicU32;

    use super::*;

    fn breaker(threshold: u64, cool_down: Duration) -> (CircuitBreaker<MockClock>, MockClock) {
        let clock = MockClock::new();
        let config = CircuitBreakerConfig::builder()
            .failure_threshold(threshold)
            .cool_down(cool_down)
            .build()
            .unwrap();
        (CircuitBreaker::with_clock(config, clock.clone()).unwrap(), clock)
    }

    fn fail<C: Clock>(breaker: &CircuitBreaker<C>) {
        breaker.try_acquire().expect("permit").failed();
    }

    // =========================================================================
    // Clock Tests
    // =========================================================================

    #[test]
    fn test_mock_clock_advance() {
        let clock = MockClock::new();
        let start = clock.now();

        clock.advance(Duration::from_secs(5));
        clock.advance_millis(250);

        assert_eq!(clock.now().duration_since(start), Duration::from_millis(5250));
        assert_eq!(clock.elapsed(), Duration::from_millis(5250));
    }

    #[test]
    fn test_mock_clock_clones_share_time() {
        let clock = MockClock::new();
        let other = clock.clone();

        clock.advance(Duration::from_secs(1));
        assert_eq!(other.elapsed(), Duration::from_secs(1));
    }

    // =========================================================================
    // Configuration Tests
    // =========================================================================

    #[test]
    fn test_config_builder_validation_fails() {
        let result = CircuitBreakerConfig::builder().failure_threshold(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_error_display() {
        let err = CircuitBreakerConfig::builder().failure_threshold(0).build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration: failure_threshold must be greater than 0"
        );
    }

    // =========================================================================
    // State Machine Tests
    // =========================================================================

    #[test]
    fn test_starts_closed() {
        let (breaker, _) = breaker(3, Duration::from_secs(10));
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.try_acquire().is_some());
    }

    #[test]
    fn test_opens_after_threshold() {
        let (breaker, _) = breaker(3, Duration::from_secs(10));

        fail(&breaker);
        fail(&breaker);
        assert_eq!(breaker.state(), CircuitState::Closed);

        fail(&breaker);
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.try_acquire().is_none());
    }

    #[test]
    fn test_success_resets_consecutive_failures() {
        let (breaker, _) = breaker(3, Duration::from_secs(10));

        fail(&breaker);
        fail(&breaker);
        breaker.try_acquire().unwrap().succeeded();
        assert_eq!(breaker.metrics().consecutive_failures, 0);

        fail(&breaker);
        fail(&breaker);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }

    #[test]
    fn test_cool_down_not_elapsed_keeps_rejecting() {
        let (breaker, clock) = breaker(1, Duration::from_secs(30));
        fail(&breaker);

        clock.advance(Duration::from_secs(29));
        assert!(breaker.try_acquire().is_none());
        assert_eq!(breaker.metrics().rejected_calls, 1);
    }

    #[test]
    fn test_single_probe_after_cool_down() {
        let (breaker, clock) = breaker(1, Duration::from_secs(30));
        fail(&breaker);
        clock.advance(Duration::from_secs(30));

        let probe = breaker.try_acquire().expect("probe admitted");
        assert!(probe.is_probe());
        assert_eq!(breaker.state(), CircuitState::HalfOpen);
        assert!(breaker.try_acquire().is_none(), "second caller must not become a probe");

        probe.succeeded();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.metrics().consecutive_failures, 0);
    }

    #[test]
    fn test_failed_probe_restarts_cool_down() {
        let (breaker, clock) = breaker(1, Duration::from_secs(30));
        fail(&breaker);
        clock.advance(Duration::from_secs(30));

        breaker.try_acquire().unwrap().failed();
        assert_eq!(breaker.state(), CircuitState::Open);

        clock.advance(Duration::from_secs(29));
        assert!(breaker.try_acquire().is_none());

        clock.advance(Duration::from_secs(1));
        assert!(breaker.try_acquire().unwrap().is_probe());
    }

    #[test]
    fn test_abandoned_probe_reopens() {
        let (breaker, clock) = breaker(1, Duration::from_secs(5));
        fail(&breaker);
        clock.advance(Duration::from_secs(5));

        drop(breaker.try_acquire().unwrap());
        assert_eq!(breaker.state(), CircuitState::Open);
        assert!(breaker.try_acquire().is_none());
    }

    #[test]
    fn test_stale_success_does_not_close_open_circuit() {
        let (breaker, _) = breaker(1, Duration::from_secs(5));

        let slow = breaker.try_acquire().unwrap();
        fail(&breaker);
        assert_eq!(breaker.state(), CircuitState::Open);

        slow.succeeded();
        assert_eq!(breaker.state(), CircuitState::Open);
        assert_eq!(breaker.metrics().successes, 1);
    }

    #[test]
    fn test_stale_failure_does_not_reopen_after_probe_success() {
        let (breaker, clock) = breaker(1, Duration::from_secs(5));

        let slow = breaker.try_acquire().unwrap();
        fail(&breaker);
        clock.advance(Duration::from_secs(5));
        breaker.try_acquire().unwrap().succeeded();

        slow.failed();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert_eq!(breaker.metrics().consecutive_failures, 0);
    }

    #[test]
    fn test_reset() {
        let (breaker, _) = breaker(1, Duration::from_secs(60));
        fail(&breaker);

        breaker.reset();
        assert_eq!(breaker.state(), CircuitState::Closed);
        assert!(breaker.try_acquire().is_some());
    }

    #[test]
    fn test_clone_shares_state() {
        let (breaker, _) = breaker(1, Duration::from_secs(60));
        let clone = breaker.clone();

        fail(&breaker);
        assert_eq!(clone.state(), CircuitState::Open);
    }

    // =========================================================================
    // Async Execution Tests
    // =========================================================================

    #[tokio::test]
    async fn test_execute_success() {
        let (breaker, _) = breaker(2, Duration::from_secs(60));

        let result = breaker.execute(|| async { Ok::<_, io::Error>(42) }).await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(breaker.metrics().total_calls, 1);
    }

    #[tokio::test]
    async fn test_execute_failure_wraps_source() {
        let (breaker, _) = breaker(2, Duration::from_secs(60));

        let result =
            breaker.execute(|| async { Err::<(), _>(io::Error::other("downstream 503")) }).await;

        match result {
            Err(ResilienceError::OperationFailed { source }) => {
                assert_eq!(source.to_string(), "downstream 503");
            }
            other => panic!("expected operation failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_execute_rejects_without_invoking_operation() {
        let (breaker, _) = breaker(1, Duration::from_secs(60));
        fail(&breaker);

        let invoked = AtomicU32::new(0);
        let result = breaker
            .execute(|| async {
                invoked.fetch_add(1, Ordering::SeqCst);
                Ok::<_, io::Error>(())
            })
            .await;

        assert!(matches!(result, Err(ResilienceError::CircuitOpen)));
        assert_eq!(invoked.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_admit_single_probe() {
        let (breaker, clock) = breaker(1, Duration::from_secs(5));
        fail(&breaker);
        clock.advance(Duration::from_secs(5));

        let admitted = Arc::new(AtomicU32::new(0));
        let (release_tx, release_rx) = tokio::sync::watch::channel(false);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let breaker = breaker.clone();
                let admitted = Arc::clone(&admitted);
                let mut release = release_rx.clone();
                tokio::spawn(async move {
                    breaker
                        .execute(|| async move {
                            admitted.fetch_add(1, Ordering::SeqCst);
                            let _ = release.wait_for(|go| *go).await;
                            Ok::<_, io::Error>(())
                        })
                        .await
                        .is_ok()
                })
            })
            .collect();

        while breaker.metrics().rejected_calls < 15 {
            tokio::task::yield_now().await;
        }
        release_tx.send(true).unwrap();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(admitted.load(Ordering::SeqCst), 1);
        assert_eq!(successes, 1);
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
