use facility_geo::{BoundingBox, Coordinates, Facility, Gazetteer};
use facility_geo_engine::{AnalysisEngine, AnomalyScorer, GapQuery, InMemoryStore, ProximityQuery};
use proptest::prelude::*;

const SPECIALTIES: [&str; 3] = ["Cardiology", "Pediatrics", "Surgery"];

fn facility_strategy() -> impl Strategy<Value = Facility> {
    (
        1u64..500,
        5.0f64..7.0,
        -1.5f64..0.5,
        0usize..SPECIALTIES.len(),
        proptest::option::of(0u32..500),
        proptest::option::of(0u32..500),
        proptest::option::of("[a-z ]{0,8}"),
    )
        .prop_map(|(id, lat, lng, spec, doctors, capacity, email)| {
            let mut facility = Facility::new(id, format!("F{id}"))
                .with_location(lat, lng)
                .with_specialties([SPECIALTIES[spec]]);
            facility.num_doctors = doctors;
            facility.capacity = capacity;
            facility.email = email;
            facility
        })
}

fn store_strategy() -> impl Strategy<Value = InMemoryStore> {
    prop::collection::vec(facility_strategy(), 1..60).prop_map(InMemoryStore::new)
}

proptest! {
    #[test]
    fn proximity_sorted_and_capped(store in store_strategy(), radius in 1.0f64..400.0) {
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);
        let center = Coordinates { lat: 6.0, lng: -0.5 };

        let report = engine
            .find_nearby(&ProximityQuery::around(center).with_radius_km(radius))
            .unwrap();

        prop_assert!(report.count() <= 20);
        for pair in report.results.windows(2) {
            prop_assert!(pair[0].distance_km <= pair[1].distance_km);
            if pair[0].distance_km == pair[1].distance_km {
                prop_assert!(pair[0].facility.id < pair[1].facility.id);
            }
        }
        for (i, result) in report.results.iter().enumerate() {
            prop_assert_eq!(result.rank, i + 1);
            prop_assert!(result.distance_km <= radius + 0.05);
        }
    }

    #[test]
    fn completeness_in_range(facility in facility_strategy()) {
        let report = AnomalyScorer::default().score(&facility);
        prop_assert!(report.completeness_score <= 100);
        prop_assert!(report.confidence_score <= report.completeness_score);
    }

    #[test]
    fn gap_zone_count_monotonic_in_threshold(
        store in store_strategy(),
        low in 5.0f64..80.0,
        extra in 0.0f64..120.0,
    ) {
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);
        let scope = BoundingBox::new(5.0, -1.5, 7.0, 0.5).unwrap();

        let scan = |threshold: f64| {
            engine
                .find_gaps(
                    &GapQuery::in_bounds("Cardiology", scope)
                        .with_grid_resolution_km(20.0)
                        .with_threshold_km(threshold),
                )
                .unwrap()
        };
        let tight = scan(low);
        let loose = scan(low + extra);

        prop_assert!(loose.zone_count() <= tight.zone_count());
        prop_assert!(loose.gap_points <= tight.gap_points);
    }

    #[test]
    fn gap_scan_idempotent(store in store_strategy(), threshold in 10.0f64..100.0) {
        let gazetteer = Gazetteer::ghana();
        let engine = AnalysisEngine::new(&store, &gazetteer);
        let query = GapQuery::in_region("Surgery", "Eastern")
            .with_grid_resolution_km(25.0)
            .with_threshold_km(threshold);

        let first = engine.find_gaps(&query).unwrap();
        let second = engine.find_gaps(&query).unwrap();
        prop_assert_eq!(first.zones, second.zones);
    }
}
