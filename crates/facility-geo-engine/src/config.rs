//! Configuration types for the analysis engine.
//!
//! Every tunable policy constant (default radius, result cap, grid spacing,
//! basin merging, severity buckets, population density) lives here rather
//! than in the algorithms.

use crate::result::GapSeverity;

/// Mean population density of Ghana, people per square kilometre.
pub const GHANA_MEAN_DENSITY_PER_KM2: f64 = 137.0;

/// Configuration for the analysis engine.
///
/// # Example
///
/// ```rust
/// use facility_geo_engine::EngineConfig;
///
/// let config = EngineConfig::builder()
///     .with_max_results(10)
///     .with_default_threshold_km(40.0)
///     .with_max_grid_points(5_000)
///     .with_parallel(true)
///     .build();
/// assert_eq!(config.proximity.max_results, 10);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineConfig {
    /// Proximity search settings.
    pub proximity: ProximityConfig,
    /// Coverage-gap detection settings.
    pub gaps: GapConfig,
    /// Enable parallel gap scans (requires `parallel` feature).
    pub parallel: bool,
}

impl EngineConfig {
    /// Creates a new builder for EngineConfig.
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }
}

/// Proximity search settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityConfig {
    /// Radius used when the caller gives none.
    pub default_radius_km: f64,
    /// Largest radius accepted.
    pub max_radius_km: f64,
    /// Maximum number of results returned.
    pub max_results: usize,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            default_radius_km: 50.0,
            max_radius_km: 1_000.0,
            max_results: 20,
        }
    }
}

/// Coverage-gap detection settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GapConfig {
    /// Grid spacing used when the caller gives none.
    pub default_grid_resolution_km: f64,
    /// Distance threshold used when the caller gives none.
    pub default_threshold_km: f64,
    /// Largest grid accepted; finer requests are rejected.
    pub max_grid_points: usize,
    /// Maximum number of zones returned.
    pub max_zones: usize,
    /// A basin whose core rises less than this many grid cells above the
    /// point where it meets a deeper basin is merged into that basin.
    pub core_prominence_cells: f64,
    /// Severity bucket boundaries.
    pub severity: SeverityPolicy,
    /// Density used for population estimates (None = no estimate).
    pub population_density_per_km2: Option<f64>,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            default_grid_resolution_km: 10.0,
            default_threshold_km: 30.0,
            max_grid_points: 10_000,
            max_zones: 50,
            core_prominence_cells: 1.0,
            severity: SeverityPolicy::default(),
            population_density_per_km2: Some(GHANA_MEAN_DENSITY_PER_KM2),
        }
    }
}

/// Maps nearest-facility distance to a severity bucket.
///
/// With `ratio = distance / threshold`:
///
/// | Ratio | Severity |
/// |-------|----------|
/// | `<= severe_ratio` | moderate |
/// | `<= critical_ratio` | severe |
/// | above, or no facility | critical |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityPolicy {
    /// Upper ratio bound for `moderate`.
    pub severe_ratio: f64,
    /// Upper ratio bound for `severe`.
    pub critical_ratio: f64,
}

impl Default for SeverityPolicy {
    fn default() -> Self {
        Self {
            severe_ratio: 1.5,
            critical_ratio: 2.0,
        }
    }
}

impl SeverityPolicy {
    /// Classifies a gap. `None` means no qualifying facility exists.
    pub fn classify(&self, nearest_km: Option<f64>, threshold_km: f64) -> GapSeverity {
        let Some(distance) = nearest_km else {
            return GapSeverity::Critical;
        };
        let ratio = distance / threshold_km;
        if ratio <= self.severe_ratio {
            GapSeverity::Moderate
        } else if ratio <= self.critical_ratio {
            GapSeverity::Severe
        } else {
            GapSeverity::Critical
        }
    }
}

/// Builder for EngineConfig.
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Sets the default search radius.
    pub fn with_default_radius_km(mut self, radius_km: f64) -> Self {
        self.config.proximity.default_radius_km = radius_km;
        self
    }

    /// Sets the largest accepted search radius.
    pub fn with_max_radius_km(mut self, radius_km: f64) -> Self {
        self.config.proximity.max_radius_km = radius_km;
        self
    }

    /// Sets the maximum number of proximity results.
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.config.proximity.max_results = max_results;
        self
    }

    /// Sets the default grid spacing.
    pub fn with_default_grid_resolution_km(mut self, resolution_km: f64) -> Self {
        self.config.gaps.default_grid_resolution_km = resolution_km;
        self
    }

    /// Sets the default gap threshold.
    pub fn with_default_threshold_km(mut self, threshold_km: f64) -> Self {
        self.config.gaps.default_threshold_km = threshold_km;
        self
    }

    /// Sets the grid size cap.
    pub fn with_max_grid_points(mut self, max_points: usize) -> Self {
        self.config.gaps.max_grid_points = max_points;
        self
    }

    /// Sets the maximum number of zones.
    pub fn with_max_zones(mut self, max_zones: usize) -> Self {
        self.config.gaps.max_zones = max_zones;
        self
    }

    /// Sets the basin merge prominence, in grid cells.
    pub fn with_core_prominence_cells(mut self, cells: f64) -> Self {
        self.config.gaps.core_prominence_cells = cells;
        self
    }

    /// Sets the severity policy.
    pub fn with_severity_policy(mut self, policy: SeverityPolicy) -> Self {
        self.config.gaps.severity = policy;
        self
    }

    /// Sets or clears the population density.
    pub fn with_population_density(mut self, density_per_km2: Option<f64>) -> Self {
        self.config.gaps.population_density_per_km2 = density_per_km2;
        self
    }

    /// Enables or disables parallel gap scans.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    /// Builds the EngineConfig.
    pub fn build(self) -> EngineConfig {
        self.config
    }
}
