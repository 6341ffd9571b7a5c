//! Resilience patterns for fault tolerance
//!
//! - **Circuit Breaker**: stops calling a downstream that keeps failing and
//!   admits a single probe call once its cool-down has elapsed
//! - **Registry**: one independent breaker per key, so each downstream
//!   integration trips on its own failures only
//!
//! Both are generic over the clock, which lets tests drive cool-downs with
//! [`MockClock`] instead of sleeping.

pub mod circuit_breaker;
pub mod registry;

// Re-export circuit breaker types
pub use circuit_breaker::{
    CallPermit, CircuitBreaker, CircuitBreakerConfig, CircuitBreakerConfigBuilder,
    CircuitBreakerMetrics, CircuitState, Clock, ConfigError, ConfigResult, MockClock,
    ResilienceError, ResilienceResult, SystemClock,
};
pub use registry::CircuitBreakerRegistry;
