//! Analysis engine.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use facility_geo::{Facility, FacilityId, Gazetteer};

use crate::anomaly::AnomalyScorer;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::gaps::{self, GapParams, GapQuery};
use crate::proximity::{self, validate_radius, ProximityQuery};
use crate::result::{AnomalyReport, GapReport, ProximityReport, ScanStats};
use crate::traits::FacilityStore;

/// Entry point for every analysis over one facility store.
///
/// The engine borrows the store and gazetteer and never mutates either, so
/// any number of engines may share them.
///
/// # Example
///
/// ```rust
/// use facility_geo::{Facility, Gazetteer};
/// use facility_geo_engine::{AnalysisEngine, InMemoryStore, ProximityQuery};
///
/// let store = InMemoryStore::new(vec![
///     Facility::new(1, "Ridge Hospital")
///         .with_location(5.5600, -0.1969)
///         .with_specialties(["Cardiology"]),
/// ]);
/// let gazetteer = Gazetteer::ghana();
/// let engine = AnalysisEngine::new(&store, &gazetteer);
///
/// let report = engine
///     .find_nearby(&ProximityQuery::near_place("Accra").with_specialty("Cardiology"))
///     .unwrap();
/// assert_eq!(report.ids(), vec![1]);
/// ```
pub struct AnalysisEngine<'a> {
    /// Facility collection.
    store: &'a dyn FacilityStore,
    /// Place and region lookup.
    gazetteer: &'a Gazetteer,
    /// Engine configuration.
    config: EngineConfig,
    /// Plausibility scorer.
    scorer: Arc<AnomalyScorer>,
}

impl<'a> AnalysisEngine<'a> {
    /// Creates an engine with default configuration and rules.
    pub fn new(store: &'a dyn FacilityStore, gazetteer: &'a Gazetteer) -> Self {
        Self::with_config(store, gazetteer, EngineConfig::default())
    }

    /// Creates an engine with custom configuration.
    pub fn with_config(
        store: &'a dyn FacilityStore,
        gazetteer: &'a Gazetteer,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            gazetteer,
            config,
            scorer: Arc::new(AnomalyScorer::default()),
        }
    }

    /// Replaces the anomaly scorer.
    pub fn with_scorer(mut self, scorer: Arc<AnomalyScorer>) -> Self {
        self.scorer = scorer;
        self
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the active scorer.
    pub fn scorer(&self) -> &AnomalyScorer {
        &self.scorer
    }

    /// Ranks facilities near a point or named place.
    ///
    /// # Errors
    ///
    /// * `InvalidQuery` for a bad radius or coordinates
    /// * `PlaceNotFound` when the place name is not in the gazetteer
    pub fn find_nearby(&self, query: &ProximityQuery) -> EngineResult<ProximityReport<'a>> {
        let start = Instant::now();
        let settings = &self.config.proximity;

        let radius_km = query.radius_km.unwrap_or(settings.default_radius_km);
        validate_radius(radius_km, settings.max_radius_km)?;

        let center = query.center.resolve(self.gazetteer)?;
        let specialty = query
            .specialty
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let results =
            proximity::search(self.store, center, radius_km, specialty, settings.max_results);
        let stats = ScanStats::new(start.elapsed(), self.store.len());

        debug!(
            center = %center,
            radius_km,
            specialty = specialty.unwrap_or(""),
            results = results.len(),
            elapsed_us = stats.duration.as_micros() as u64,
            "proximity search complete"
        );

        Ok(ProximityReport {
            center,
            radius_km,
            specialty: specialty.map(str::to_string),
            results,
            stats,
        })
    }

    /// Finds underserved zones for a specialty.
    ///
    /// # Errors
    ///
    /// * `InvalidQuery` for a blank specialty, bad numbers, an invalid box or
    ///   a grid finer than the configured limit
    /// * `RegionNotFound` for an unknown region name
    pub fn find_gaps(&self, query: &GapQuery) -> EngineResult<GapReport> {
        let params = self.gap_params(query)?;
        self.scan_gaps(params)
    }

    /// Resolves a gap query's scope and fills in configured defaults.
    ///
    /// # Errors
    ///
    /// * `RegionNotFound` for an unknown region name
    /// * `InvalidQuery` for an invalid bounding box
    pub fn gap_params<'q>(&self, query: &'q GapQuery) -> EngineResult<GapParams<'q>> {
        let settings = &self.config.gaps;
        Ok(GapParams {
            specialty: query.specialty.trim(),
            scope: query.scope.resolve(self.gazetteer)?,
            grid_resolution_km: query
                .grid_resolution_km
                .unwrap_or(settings.default_grid_resolution_km),
            threshold_km: query.threshold_km.unwrap_or(settings.default_threshold_km),
        })
    }

    /// Runs a gap scan on already resolved parameters.
    ///
    /// # Errors
    ///
    /// * `InvalidQuery` for a blank specialty, bad numbers or a grid finer
    ///   than the configured limit
    pub fn scan_gaps(&self, params: GapParams<'_>) -> EngineResult<GapReport> {
        gaps::find_gaps(self.store, params, &self.config.gaps, self.config.parallel)
    }

    /// Scores a facility by id.
    ///
    /// # Errors
    ///
    /// * `FacilityNotFound` when no facility has the id
    pub fn detect_anomalies(&self, id: FacilityId) -> EngineResult<AnomalyReport> {
        let facility = self.store.get(id).ok_or(EngineError::FacilityNotFound(id))?;
        Ok(self.score(facility))
    }

    /// Scores a facility record directly.
    pub fn score(&self, facility: &Facility) -> AnomalyReport {
        let report = self.scorer.score(facility);
        debug!(
            facility_id = facility.id,
            completeness = report.completeness_score,
            violations = report.violations.len(),
            "facility scored"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use crate::{Claim, KeywordSet, PlausibilityRule, Prerequisite, ViolationSeverity};
    use facility_geo::Coordinates;

    fn create_store() -> InMemoryStore {
        InMemoryStore::new(vec![
            Facility::new(1, "Korle Bu")
                .with_location(5.5365, -0.2277)
                .with_specialties(["Cardiology"])
                .with_capacity(2000),
            Facility::new(2, "Komfo Anokye")
                .with_location(6.6970, -1.6300)
                .with_specialties(["Cardiology"]),
            Facility::new(3, "Paper only").with_specialties(["Cardiology"]),
        ])
    }

    #[test]
    fn test_find_nearby_by_place() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        let report = engine.find_nearby(&ProximityQuery::near_place("accra")).unwrap();
        assert_eq!(report.ids(), vec![1]);
        assert_eq!(report.radius_km, 50.0);
        assert_eq!(report.results[0].rank, 1);
    }

    #[test]
    fn test_find_nearby_unknown_place() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        let err = engine
            .find_nearby(&ProximityQuery::near_place("Atlantis"))
            .unwrap_err();
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn test_find_nearby_blank_specialty_is_no_filter() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        let query = ProximityQuery::around(Coordinates { lat: 5.6037, lng: -0.1870 })
            .with_radius_km(300.0)
            .with_specialty("  ");
        let report = engine.find_nearby(&query).unwrap();
        assert_eq!(report.ids(), vec![1, 2]);
        assert!(report.specialty.is_none());
    }

    #[test]
    fn test_find_nearby_radius_too_large() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        let query = ProximityQuery::near_place("Accra").with_radius_km(5_000.0);
        assert!(matches!(
            engine.find_nearby(&query),
            Err(EngineError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_find_gaps_uses_config_defaults() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let config = EngineConfig::builder()
            .with_default_grid_resolution_km(20.0)
            .with_default_threshold_km(60.0)
            .build();
        let engine = AnalysisEngine::with_config(&store, &gazetteer, config);

        let report = engine
            .find_gaps(&GapQuery::in_region("Cardiology", "Greater Accra"))
            .unwrap();
        assert_eq!(report.grid_resolution_km, 20.0);
        assert_eq!(report.threshold_km, 60.0);
        assert_eq!(report.qualifying_facilities, 2);
    }

    #[test]
    fn test_gap_params_then_scan_matches_find_gaps() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        let query = GapQuery::in_region(" Cardiology ", "Northern").with_grid_resolution_km(25.0);
        let params = engine.gap_params(&query).unwrap();
        assert_eq!(params.specialty, "Cardiology");
        assert_eq!(params.threshold_km, 30.0);

        let direct = engine.find_gaps(&query).unwrap();
        let staged = engine.scan_gaps(params).unwrap();
        assert_eq!(direct.zones, staged.zones);
    }

    #[test]
    fn test_find_gaps_unknown_region() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        let err = engine
            .find_gaps(&GapQuery::in_region("Cardiology", "Atlantis"))
            .unwrap_err();
        assert_eq!(err, EngineError::RegionNotFound("Atlantis".to_string()));
    }

    #[test]
    fn test_detect_anomalies_unknown_id() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        assert_eq!(
            engine.detect_anomalies(99).unwrap_err(),
            EngineError::FacilityNotFound(99)
        );
    }

    #[test]
    fn test_detect_anomalies_flags_cardiology() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);

        let report = engine.detect_anomalies(1).unwrap();
        assert_eq!(report.facility_id, 1);
        assert_eq!(report.violations.len(), 2);
        assert!(report.violations.iter().all(|v| v.rule == "capacity_mismatch"));
    }

    #[test]
    fn test_custom_scorer() {
        let store = create_store();
        let gazetteer = Gazetteer::ghana();
        let scorer = AnomalyScorer::with_rules(vec![PlausibilityRule::new(
            "capacity_check",
            "cardiology listed",
            ViolationSeverity::Low,
            Claim::Specialty(KeywordSet::new(["cardiology"])),
        )
        .requires(Prerequisite::MinCapacity(10_000))]);
        let engine = AnalysisEngine::new(&store, &gazetteer).with_scorer(Arc::new(scorer));

        let report = engine.detect_anomalies(1).unwrap();
        assert_eq!(report.violations.len(), 1);
        assert_eq!(engine.scorer().rules().len(), 1);
    }
}
