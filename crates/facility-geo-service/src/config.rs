//! Configuration types for the analysis service.

use std::time::Duration;

use facility_geo_engine::EngineConfig;

/// Configuration for the analysis service.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use facility_geo_service::{CacheConfig, RateGuardConfig, ServiceConfig};
///
/// let config = ServiceConfig::builder()
///     .with_rate_guard(RateGuardConfig {
///         max_requests: 5,
///         window: Duration::from_secs(60),
///         ..RateGuardConfig::default()
///     })
///     .with_cache(CacheConfig::default())
///     .build();
/// assert_eq!(config.rate_guard.max_requests, 5);
/// assert!(config.cache.is_some());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceConfig {
    /// Settings handed to every analysis engine.
    pub engine: EngineConfig,
    /// Admission control settings.
    pub rate_guard: RateGuardConfig,
    /// Gap-report cache (None = disabled).
    pub cache: Option<CacheConfig>,
}

impl ServiceConfig {
    /// Creates a new builder for ServiceConfig.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }
}

/// Sliding-window admission settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateGuardConfig {
    /// Admissions allowed per key within one window.
    pub max_requests: usize,
    /// Length of the sliding window.
    pub window: Duration,
    /// How often idle keys are dropped.
    pub prune_interval: Duration,
}

impl Default for RateGuardConfig {
    fn default() -> Self {
        Self {
            max_requests: 30,
            window: Duration::from_secs(60),
            prune_interval: Duration::from_secs(60),
        }
    }
}

/// Gap-report cache settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of cached reports.
    pub max_entries: usize,
    /// Time-to-live for cached reports.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            ttl: Duration::from_secs(300),
        }
    }
}

/// Builder for ServiceConfig.
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Sets the engine configuration.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.config.engine = engine;
        self
    }

    /// Sets the rate guard configuration.
    pub fn with_rate_guard(mut self, rate_guard: RateGuardConfig) -> Self {
        self.config.rate_guard = rate_guard;
        self
    }

    /// Enables the gap-report cache.
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.config.cache = Some(cache);
        self
    }

    /// Disables the gap-report cache.
    pub fn without_cache(mut self) -> Self {
        self.config.cache = None;
        self
    }

    /// Builds the ServiceConfig.
    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_config_default() {
        let config = ServiceConfig::default();
        assert_eq!(config.rate_guard.max_requests, 30);
        assert_eq!(config.rate_guard.window, Duration::from_secs(60));
        assert_eq!(config.rate_guard.prune_interval, Duration::from_secs(60));
        assert!(config.cache.is_none());
    }

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 256);
        assert_eq!(config.ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_service_config_builder() {
        let config = ServiceConfig::builder()
            .with_engine(EngineConfig::builder().with_max_results(5).build())
            .with_cache(CacheConfig {
                max_entries: 8,
                ttl: Duration::from_secs(10),
            })
            .build();
        assert_eq!(config.engine.proximity.max_results, 5);
        assert_eq!(config.cache.as_ref().map(|c| c.max_entries), Some(8));

        let config = ServiceConfig::builder()
            .with_cache(CacheConfig::default())
            .without_cache()
            .build();
        assert!(config.cache.is_none());
    }
}
