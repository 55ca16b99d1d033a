//! End-to-end tests of the tool-call boundary.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use facility_geo::{Facility, Gazetteer};
use facility_geo_engine::InMemoryStore;
use facility_geo_service::{
    load_facilities, parse_facilities, CacheConfig, FacilityAnalysisService, ManualClock, RateGuard,
    RateGuardConfig, ServiceConfig, SnapshotStore,
};
use serde_json::{json, Value};
use tempfile::NamedTempFile;

const DATASET: &str = r#"[
    {"id": 101, "name": "Korle Bu Teaching Hospital",
     "location": {"lat": 5.5365, "lng": -0.2277}, "region": "Greater Accra", "city": "Accra",
     "facilityType": "hospital", "specialties": ["Cardiology", "Ophthalmology"],
     "procedures": ["cataract surgery"], "equipment": ["ECG machine"],
     "numDoctors": 300, "capacity": 2000},
    {"id": 102, "name": "Ridge Hospital",
     "location": {"lat": 5.5600, "lng": -0.1969}, "city": "Accra",
     "facilityType": "hospital", "specialties": ["Cardiology"]},
    {"id": 201, "name": "Komfo Anokye Teaching Hospital",
     "location": {"lat": 6.6970, "lng": -1.6300}, "city": "Kumasi",
     "facilityType": "hospital", "specialties": ["Cardiology", "Pediatrics"]},
    {"id": 301, "name": "Tamale Teaching Hospital",
     "location": {"lat": 9.4075, "lng": -0.8533}, "city": "Tamale",
     "facilityType": "hospital", "specialties": ["Pediatrics"]},
    {"id": 501, "name": "Unmapped Clinic", "facilityType": "clinic",
     "specialties": ["Cardiology"]}
]"#;

fn dataset_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(DATASET.as_bytes()).unwrap();
    file
}

fn create_service(config: ServiceConfig) -> FacilityAnalysisService {
    let file = dataset_file();
    let store = load_facilities(file.path()).unwrap();
    FacilityAnalysisService::from_data(store, Gazetteer::ghana(), config)
}

fn manual_guard(max_requests: usize) -> (Arc<RateGuard>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let config = RateGuardConfig {
        max_requests,
        window: Duration::from_secs(60),
        prune_interval: Duration::from_secs(60),
    };
    (Arc::new(RateGuard::with_clock(config, clock.clone())), clock)
}

// =============================================================================
// findNearby
// =============================================================================

#[test]
fn test_find_nearby_from_loaded_dataset() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch(
        "agent",
        "findNearby",
        json!({"city": "Accra", "specialty": "Cardiology"}),
    );

    assert_eq!(value["count"], 2);
    let facilities = value["facilities"].as_array().unwrap();
    let distances: Vec<f64> = facilities
        .iter()
        .map(|f| f["distanceKm"].as_f64().unwrap())
        .collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(facilities[0]["rank"], 1);
    assert_eq!(facilities[1]["rank"], 2);
}

#[test]
fn test_find_nearby_unknown_city_names_it() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch("agent", "findNearby", json!({"city": "Atlantis"}));

    assert!(value.get("facilities").is_none());
    assert!(value["error"].as_str().unwrap().contains("Atlantis"));
    assert_eq!(value["kind"], "not_found");
}

#[test]
fn test_find_nearby_coordinates_beat_city() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch(
        "agent",
        "findNearby",
        json!({"city": "Accra", "lat": 9.4075, "lng": -0.8533, "radiusKm": 5}),
    );
    assert_eq!(value["count"], 1);
    assert_eq!(value["facilities"][0]["id"], 301);
}

#[test]
fn test_find_nearby_lowercase_filter_matches_nothing() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch(
        "agent",
        "findNearby",
        json!({"city": "Accra", "specialty": "cardiology"}),
    );
    assert_eq!(value["count"], 0);
}

// =============================================================================
// findMedicalDeserts
// =============================================================================

#[test]
fn test_find_deserts_reports_data_absence() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch(
        "agent",
        "findMedicalDeserts",
        json!({"specialty": "Cardiology", "region": "Upper West", "gridResolutionKm": 20}),
    );

    assert_eq!(value["dataAbsent"], true);
    let zones = value["zones"].as_array().unwrap();
    assert_eq!(zones.len(), 1);
    assert_eq!(zones[0]["severity"], "critical");
    assert_eq!(zones[0]["kind"], "noGeocodedFacilities");
    assert!(value["notes"][0]
        .as_str()
        .unwrap()
        .contains("no geocoded facilities"));
}

#[test]
fn test_find_deserts_bounding_box_string() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch(
        "agent",
        "findMedicalDeserts",
        json!({
            "specialty": "Cardiology",
            "boundingBox": "8.5, -2.0, 10.2, 0.6",
            "gridResolutionKm": 25,
            "thresholdKm": 40
        }),
    );

    assert_eq!(value["dataAbsent"], false);
    assert_eq!(value["qualifyingFacilities"], 3);
    assert!(!value["zones"].as_array().unwrap().is_empty());
}

#[test]
fn test_find_deserts_threshold_monotonic() {
    let service = create_service(ServiceConfig::default());
    let mut previous = usize::MAX;
    for threshold in [20, 40, 80, 160, 320] {
        let value = service.dispatch(
            "agent",
            "findMedicalDeserts",
            json!({
                "specialty": "Pediatrics",
                "region": "Northern",
                "gridResolutionKm": 25,
                "thresholdKm": threshold
            }),
        );
        let count = value["zones"].as_array().unwrap().len();
        assert!(count <= previous, "threshold {threshold}: {count} > {previous}");
        previous = count;
    }
}

#[test]
fn test_find_deserts_grid_too_fine() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch(
        "agent",
        "findMedicalDeserts",
        json!({"specialty": "Cardiology", "region": "Northern", "gridResolutionKm": 0.5}),
    );
    assert_eq!(value["kind"], "invalid_query");
}

// =============================================================================
// detectAnomalies
// =============================================================================

#[test]
fn test_detect_anomalies_report_shape() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch("agent", "detectAnomalies", json!({"facilityId": 101}));

    let completeness = value["completenessScore"].as_u64().unwrap();
    let confidence = value["confidenceScore"].as_u64().unwrap();
    assert!(completeness <= 100);
    assert!(confidence <= completeness);
    assert_eq!(value["trackedFieldsVersion"], 1);
    assert!(value["violations"]
        .as_array()
        .unwrap()
        .iter()
        .any(|v| v["rule"] == "equipment_mismatch"));
}

#[test]
fn test_detect_anomalies_unknown_facility() {
    let service = create_service(ServiceConfig::default());
    let value = service.dispatch("agent", "detectAnomalies", json!({"facilityId": 9999}));
    assert_eq!(value["kind"], "not_found");
    assert!(value["error"].as_str().unwrap().contains("9999"));
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_identical_calls_are_byte_identical() {
    let service = create_service(ServiceConfig::default());
    let calls: [(&str, Value); 3] = [
        ("findNearby", json!({"city": "Kumasi", "radiusKm": 300})),
        (
            "findMedicalDeserts",
            json!({"specialty": "Cardiology", "region": "Northern", "gridResolutionKm": 25}),
        ),
        ("detectAnomalies", json!({"facilityId": 101})),
    ];

    for (operation, args) in calls {
        let first = service.dispatch("agent", operation, args.clone());
        let second = service.dispatch("agent", operation, args);
        let first = serde_json::to_string(&first).unwrap();
        let second = serde_json::to_string(&second).unwrap();
        assert_eq!(first, second, "{operation} not deterministic");
    }
}

#[test]
fn test_cached_report_matches_computed() {
    let uncached = create_service(ServiceConfig::default());
    let cached =
        create_service(ServiceConfig::builder().with_cache(CacheConfig::default()).build());
    let args = json!({"specialty": "Pediatrics", "region": "Ashanti", "gridResolutionKm": 20});

    let expected = uncached.dispatch("agent", "findMedicalDeserts", args.clone());
    cached.dispatch("agent", "findMedicalDeserts", args.clone());
    let hit = cached.dispatch("agent", "findMedicalDeserts", args);

    assert_eq!(expected, hit);
    assert_eq!(cached.stats().cache_hits, 1);
}

#[test]
fn test_cache_separates_specialties_differing_in_whitespace() {
    let dataset = r#"[
        {"id": 1, "name": "Tamale Teaching Hospital",
         "location": {"lat": 9.4075, "lng": -0.8533},
         "facilityType": "hospital", "specialties": ["Internal Medicine"]}
    ]"#;
    let build = |config: ServiceConfig| {
        let store = parse_facilities(dataset).unwrap();
        FacilityAnalysisService::from_data(store, Gazetteer::ghana(), config)
    };
    let uncached = build(ServiceConfig::default());
    let cached = build(ServiceConfig::builder().with_cache(CacheConfig::default()).build());

    let args = |specialty: &str| {
        json!({"specialty": specialty, "region": "Northern", "gridResolutionKm": 25})
    };
    let exact = args("Internal Medicine");
    let spaced = args("Internal  Medicine");

    let expected = uncached.dispatch("agent", "findMedicalDeserts", spaced.clone());
    cached.dispatch("agent", "findMedicalDeserts", exact);
    let actual = cached.dispatch("agent", "findMedicalDeserts", spaced);

    assert_eq!(expected["specialty"], "Internal  Medicine");
    assert_eq!(expected["qualifyingFacilities"], 0);
    assert_eq!(expected, actual);
    assert_eq!(cached.stats().cache_hits, 0);
}

// =============================================================================
// Rate guard
// =============================================================================

#[test]
fn test_rate_guard_through_service() {
    let (guard, clock) = manual_guard(5);
    let snapshots = Arc::new(SnapshotStore::new(
        InMemoryStore::new(vec![Facility::new(1, "Ridge").with_location(5.56, -0.1969)]),
        Gazetteer::ghana(),
    ));
    let service = FacilityAnalysisService::new(snapshots, guard, ServiceConfig::default());
    let args = json!({"city": "Accra"});

    for _ in 0..5 {
        assert!(service.dispatch("agent", "findNearby", args.clone()).get("error").is_none());
    }
    let refused = service.dispatch("agent", "findNearby", args.clone());
    assert_eq!(refused["kind"], "rate_limited");

    // Other callers have their own budget.
    assert!(service.dispatch("other", "findNearby", args.clone()).get("error").is_none());

    clock.advance(Duration::from_secs(60));
    assert!(service.dispatch("agent", "findNearby", args).get("error").is_none());
}

#[test]
fn test_rate_guard_shared_between_services() {
    let (guard, _clock) = manual_guard(3);
    let snapshots = Arc::new(SnapshotStore::new(InMemoryStore::default(), Gazetteer::ghana()));
    let a =
        FacilityAnalysisService::new(snapshots.clone(), guard.clone(), ServiceConfig::default());
    let b = FacilityAnalysisService::new(snapshots, guard, ServiceConfig::default());

    a.dispatch("agent", "findNearby", json!({"city": "Accra"}));
    b.dispatch("agent", "findNearby", json!({"city": "Accra"}));
    a.dispatch("agent", "findNearby", json!({"city": "Accra"}));
    let refused = b.dispatch("agent", "findNearby", json!({"city": "Accra"}));
    assert_eq!(refused["kind"], "rate_limited");
}

#[test]
fn test_concurrent_checks_never_over_admit() {
    let (guard, _clock) = manual_guard(30);
    let admitted = AtomicUsize::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                for _ in 0..10 {
                    if guard.check("shared-agent") {
                        admitted.fetch_add(1, Ordering::SeqCst);
                    }
                }
            });
        }
    });

    assert_eq!(admitted.load(Ordering::SeqCst), 30);
}

// =============================================================================
// Snapshots
// =============================================================================

#[test]
fn test_reload_swaps_data() {
    let service = create_service(ServiceConfig::default());
    let before = service.dispatch("agent", "detectAnomalies", json!({"facilityId": 301}));
    assert!(before.get("error").is_none());

    let generation = service.reload(
        InMemoryStore::new(vec![Facility::new(7, "Bolgatanga Regional Hospital")]),
        Gazetteer::ghana(),
    );
    assert_eq!(generation, 2);

    let after = service.dispatch("agent", "detectAnomalies", json!({"facilityId": 301}));
    assert_eq!(after["kind"], "not_found");
    let new = service.dispatch("agent", "detectAnomalies", json!({"facilityId": 7}));
    assert_eq!(new["facilityId"], 7);
}

#[test]
fn test_pinned_snapshot_survives_concurrent_reload() {
    let service = create_service(ServiceConfig::default());
    let pinned = service.snapshots().current();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            service.reload(InMemoryStore::default(), Gazetteer::ghana());
        });
    });

    assert_eq!(pinned.store.facilities().len(), 5);
    assert_eq!(pinned.generation, 1);
    assert_eq!(service.snapshots().generation(), 2);
}
