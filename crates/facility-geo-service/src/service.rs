//! Tool-call dispatcher over the analysis engine.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use facility_geo::Gazetteer;
use facility_geo_engine::{AnalysisEngine, AnomalyScorer, GapReport, InMemoryStore};

use crate::cache::{gap_cache_key, CacheStats, ReportCache};
use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::rate_guard::RateGuard;
use crate::snapshot::{FacilitySnapshot, SnapshotStore};
use crate::tools::{
    DetectAnomaliesArgs, ErrorOutput, FindDesertsArgs, FindDesertsOutput, FindNearbyArgs,
    FindNearbyOutput, DETECT_ANOMALIES, FIND_MEDICAL_DESERTS, FIND_NEARBY,
};

/// Counters accumulated across dispatches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    /// Calls that reached an operation.
    pub calls: u64,
    /// Calls refused by the rate guard.
    pub rate_limited: u64,
    /// Calls that returned an error payload, rate limits included.
    pub errors: u64,
    /// Gap reports served from the cache.
    pub cache_hits: u64,
    /// Gap reports computed.
    pub cache_misses: u64,
}

/// Answers named tool calls with JSON.
///
/// Every call is admitted by the shared [`RateGuard`] first, then runs
/// against one pinned [`FacilitySnapshot`]. Failures never escape as
/// panics or `Err`: they come back as `{"error": ..., "kind": ...}`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use facility_geo::{Facility, Gazetteer};
/// use facility_geo_engine::InMemoryStore;
/// use facility_geo_service::{FacilityAnalysisService, ServiceConfig};
/// use serde_json::json;
///
/// let store = InMemoryStore::new(vec![
///     Facility::new(7, "Tamale Teaching Hospital")
///         .with_location(9.4075, -0.8533)
///         .with_specialties(["Pediatrics"]),
/// ]);
/// let service =
///     FacilityAnalysisService::from_data(store, Gazetteer::ghana(), ServiceConfig::default());
///
/// let found = service.dispatch("agent", "findNearby", json!({"city": "Tamale", "radiusKm": 20}));
/// assert_eq!(found["count"], 1);
///
/// let missing = service.dispatch("agent", "findNearby", json!({"city": "Atlantis"}));
/// assert!(missing["error"].as_str().unwrap().contains("Atlantis"));
/// assert_eq!(missing["kind"], "not_found");
/// ```
pub struct FacilityAnalysisService {
    snapshots: Arc<SnapshotStore>,
    rate_guard: Arc<RateGuard>,
    scorer: Arc<AnomalyScorer>,
    cache: Option<ReportCache>,
    config: ServiceConfig,
    stats: RwLock<ServiceStats>,
}

impl FacilityAnalysisService {
    /// Creates a service over shared snapshot and rate-guard instances.
    pub fn new(
        snapshots: Arc<SnapshotStore>,
        rate_guard: Arc<RateGuard>,
        config: ServiceConfig,
    ) -> Self {
        let cache = config.cache.clone().map(ReportCache::new);
        Self {
            snapshots,
            rate_guard,
            scorer: Arc::new(AnomalyScorer::default()),
            cache,
            config,
            stats: RwLock::new(ServiceStats::default()),
        }
    }

    /// Creates a service that owns its data and rate guard.
    pub fn from_data(store: InMemoryStore, gazetteer: Gazetteer, config: ServiceConfig) -> Self {
        let snapshots = Arc::new(SnapshotStore::new(store, gazetteer));
        let rate_guard = Arc::new(RateGuard::new(config.rate_guard.clone()));
        Self::new(snapshots, rate_guard, config)
    }

    /// Replaces the anomaly scorer.
    pub fn with_scorer(mut self, scorer: Arc<AnomalyScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Replaces the gap-report cache.
    pub fn with_cache(mut self, cache: ReportCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Returns the snapshot store.
    pub fn snapshots(&self) -> &Arc<SnapshotStore> {
        &self.snapshots
    }

    /// Returns the rate guard.
    pub fn rate_guard(&self) -> &Arc<RateGuard> {
        &self.rate_guard
    }

    /// Returns the service configuration.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Returns accumulated counters.
    pub fn stats(&self) -> ServiceStats {
        *self.stats.read()
    }

    /// Returns gap-report cache statistics, if the cache is enabled.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ReportCache::stats)
    }

    /// Installs new facility data and drops cached reports.
    pub fn reload(&self, store: InMemoryStore, gazetteer: Gazetteer) -> u64 {
        let generation = self.snapshots.replace(store, gazetteer);
        if let Some(cache) = &self.cache {
            cache.clear();
        }
        generation
    }

    /// Runs a named operation for `caller` and returns its JSON result or
    /// an error payload.
    pub fn dispatch(&self, caller: &str, operation: &str, args: Value) -> Value {
        let start = Instant::now();
        let outcome = self.call(caller, operation, args);

        {
            let mut stats = self.stats.write();
            match &outcome {
                Ok(_) => stats.calls += 1,
                Err(ServiceError::RateLimited { .. }) => {
                    stats.rate_limited += 1;
                    stats.errors += 1;
                }
                Err(_) => {
                    stats.calls += 1;
                    stats.errors += 1;
                }
            }
        }

        debug!(
            caller,
            operation,
            ok = outcome.is_ok(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "tool call dispatched"
        );

        outcome.unwrap_or_else(|err| error_value(&err))
    }

    /// Runs a named operation, returning errors as values of `Err`.
    ///
    /// # Errors
    ///
    /// * `RateLimited` when the caller is over budget
    /// * `UnknownOperation` for an unrecognised name
    /// * `InvalidArguments` when `args` does not fit the operation
    /// * any analysis error from the engine
    pub fn call(&self, caller: &str, operation: &str, args: Value) -> ServiceResult<Value> {
        if !self.rate_guard.check(caller) {
            return Err(ServiceError::RateLimited {
                caller: caller.to_string(),
            });
        }

        match operation {
            FIND_NEARBY => self.find_nearby(parse_args(args)?),
            FIND_MEDICAL_DESERTS => self.find_medical_deserts(parse_args(args)?),
            DETECT_ANOMALIES => self.detect_anomalies(parse_args(args)?),
            other => Err(ServiceError::UnknownOperation(other.to_string())),
        }
    }

    /// `findNearby` without rate limiting.
    pub fn find_nearby(&self, args: FindNearbyArgs) -> ServiceResult<Value> {
        let query = args.into_query()?;
        let snapshot = self.snapshots.current();
        let engine = self.engine(&snapshot);
        let report = engine.find_nearby(&query)?;
        encode(&FindNearbyOutput::from(&report))
    }

    /// `findMedicalDeserts` without rate limiting.
    pub fn find_medical_deserts(&self, args: FindDesertsArgs) -> ServiceResult<Value> {
        let query = args.into_query()?;
        let snapshot = self.snapshots.current();
        let engine = self.engine(&snapshot);
        let params = engine.gap_params(&query)?;

        let report: Arc<GapReport> = match &self.cache {
            Some(cache) => {
                let key = gap_cache_key(snapshot.generation, &params);
                match cache.get(&key) {
                    Some(hit) => {
                        self.stats.write().cache_hits += 1;
                        hit
                    }
                    None => {
                        let report = Arc::new(engine.scan_gaps(params)?);
                        cache.set(key, Arc::clone(&report));
                        self.stats.write().cache_misses += 1;
                        report
                    }
                }
            }
            None => Arc::new(engine.scan_gaps(params)?),
        };

        encode(&FindDesertsOutput::from(report.as_ref()))
    }

    /// `detectAnomalies` without rate limiting.
    pub fn detect_anomalies(&self, args: DetectAnomaliesArgs) -> ServiceResult<Value> {
        let snapshot = self.snapshots.current();
        let report = self.engine(&snapshot).detect_anomalies(args.facility_id)?;
        encode(&report)
    }

    fn engine<'s>(&self, snapshot: &'s FacilitySnapshot) -> AnalysisEngine<'s> {
        let config = self.config.engine.clone();
        AnalysisEngine::with_config(&snapshot.store, &snapshot.gazetteer, config)
            .with_scorer(Arc::clone(&self.scorer))
    }
}

impl std::fmt::Debug for FacilityAnalysisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FacilityAnalysisService")
            .field("generation", &self.snapshots.generation())
            .field("cache", &self.cache)
            .field("stats", &self.stats())
            .finish()
    }
}

/// Decodes an argument object; `null` reads as `{}`.
fn parse_args<T: DeserializeOwned>(args: Value) -> ServiceResult<T> {
    let args = match args {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    serde_json::from_value(args).map_err(|e| ServiceError::invalid_arguments(e.to_string()))
}

fn encode<T: Serialize>(output: &T) -> ServiceResult<Value> {
    serde_json::to_value(output).map_err(ServiceError::Encode)
}

/// Renders an error as `{"error": ..., "kind": ...}`.
pub fn error_value(err: &ServiceError) -> Value {
    let output = ErrorOutput {
        error: err.to_string(),
        kind: err.kind(),
    };
    serde_json::to_value(&output).unwrap_or_else(|_| {
        serde_json::json!({ "error": output.error.clone(), "kind": output.kind.as_str() })
    })
}
