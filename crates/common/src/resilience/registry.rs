//! Keyed collection of independent circuit breakers.

use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;

use super::circuit_breaker::{
    CircuitBreaker, CircuitBreakerConfig, CircuitBreakerMetrics, Clock, ConfigResult, SystemClock,
};

/// Lazily creates one breaker per key, all sharing a configuration and clock.
///
/// Breakers for different keys never influence each other. Handles returned
/// by [`CircuitBreakerRegistry::breaker`] share state with the registry entry.
pub struct CircuitBreakerRegistry<K, C = SystemClock>
where
    K: Eq + Hash + Clone,
    C: Clock + Clone,
{
    config: CircuitBreakerConfig,
    clock: C,
    breakers: DashMap<K, CircuitBreaker<C>>,
}

impl<K> CircuitBreakerRegistry<K, SystemClock>
where
    K: Eq + Hash + Clone,
{
    pub fn new(config: CircuitBreakerConfig) -> ConfigResult<Self> {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, C> CircuitBreakerRegistry<K, C>
where
    K: Eq + Hash + Clone,
    C: Clock + Clone,
{
    pub fn with_clock(config: CircuitBreakerConfig, clock: C) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self { config, clock, breakers: DashMap::new() })
    }

    /// Breaker for `key`, created closed on first use.
    pub fn breaker(&self, key: &K) -> CircuitBreaker<C> {
        if let Some(existing) = self.breakers.get(key) {
            return existing.value().clone();
        }

        self.breakers
            .entry(key.clone())
            .or_insert_with(|| {
                CircuitBreaker::from_validated(self.config.clone(), self.clock.clone())
            })
            .value()
            .clone()
    }

    /// Metrics for `key`, or `None` if no call has used it yet.
    pub fn metrics(&self, key: &K) -> Option<CircuitBreakerMetrics> {
        self.breakers.get(key).map(|breaker| breaker.metrics())
    }

    pub fn reset_all(&self) {
        for entry in self.breakers.iter() {
            entry.value().reset();
        }
    }

    pub fn len(&self) -> usize {
        self.breakers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakers.is_empty()
    }
}

impl<K, C> fmt::Debug for CircuitBreakerRegistry<K, C>
where
    K: Eq + Hash + Clone,
    C: Clock + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("config", &self.config)
            .field("breakers", &self.breakers.len())
            .finish()
    }
}
