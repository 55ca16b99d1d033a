use std::sync::Arc;
use std::time::Duration;

use facility_geo::{Facility, Gazetteer};
use facility_geo_engine::InMemoryStore;
use facility_geo_service::{
    FacilityAnalysisService, ManualClock, RateGuard, RateGuardConfig, ServiceConfig,
};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    // Replays a random call schedule and checks every sliding window against
    // an independent count of the admissions.
    #[test]
    fn rate_guard_never_exceeds_budget(
        max_requests in 1usize..8,
        gaps in prop::collection::vec(0u64..40, 1..120),
    ) {
        let clock = Arc::new(ManualClock::new());
        let window = Duration::from_secs(60);
        let guard = RateGuard::with_clock(
            RateGuardConfig { max_requests, window, prune_interval: Duration::from_secs(15) },
            clock.clone(),
        );

        let mut elapsed = 0u64;
        let mut admitted: Vec<u64> = Vec::new();
        for gap in gaps {
            clock.advance(Duration::from_secs(gap));
            elapsed += gap;

            let in_window = admitted.iter().filter(|&&t| elapsed - t < 60).count();
            let expected = in_window < max_requests;
            prop_assert_eq!(guard.check("agent"), expected);
            if expected {
                admitted.push(elapsed);
            }
        }
    }

    #[test]
    fn dispatch_never_panics_on_arbitrary_arguments(
        operation in prop::sample::select(vec![
            "findNearby",
            "findMedicalDeserts",
            "detectAnomalies",
            "other",
        ]),
        city in proptest::option::of("[A-Za-z ]{0,12}"),
        lat in proptest::option::of(-100.0f64..100.0),
        lng in proptest::option::of(-200.0f64..200.0),
        radius in proptest::option::of(-10.0f64..2000.0),
        facility_id in 0u64..5,
    ) {
        let store = InMemoryStore::new(vec![
            Facility::new(1, "Ridge").with_location(5.56, -0.1969).with_specialties(["Cardiology"]),
        ]);
        let service =
            FacilityAnalysisService::from_data(store, Gazetteer::ghana(), ServiceConfig::default());
        let args = json!({
            "city": city.clone(),
            "lat": lat,
            "lng": lng,
            "radiusKm": radius,
            "specialty": "Cardiology",
            "region": city.clone(),
            "facilityId": facility_id,
            "gridResolutionKm": 50,
        });

        let value = service.dispatch("agent", operation, args);
        prop_assert!(value.is_object());
        if let Some(kind) = value.get("kind") {
            prop_assert!(matches!(
                kind.as_str(),
                Some("invalid_query" | "not_found" | "rate_limited")
            ));
            prop_assert!(value["error"].is_string());
        }
    }
}
