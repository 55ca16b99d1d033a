//! # facility-geo-service
//!
//! JSON tool-call boundary for facility analysis.
//!
//! An orchestration layer (for example an LLM agent) invokes one of three
//! named operations with a JSON argument object and receives a JSON result
//! or a structured error payload:
//!
//! | Operation | Arguments | Result |
//! |-----------|-----------|--------|
//! | `findNearby` | `city?`, `lat?`, `lng?`, `radiusKm?`, `specialty?` | `{center, radiusKm, count, facilities}` |
//! | `findMedicalDeserts` | `specialty`, `region` or `boundingBox`, `gridResolutionKm?`, `thresholdKm?` | gap report plus `dataAbsent` and `notes` |
//! | `detectAnomalies` | `facilityId` | anomaly report |
//!
//! Errors always come back as `{"error": message, "kind": kind}` with `kind`
//! one of `invalid_query`, `not_found` or `rate_limited`.
//!
//! ## Quick Start
//!
//! ```rust
//! use facility_geo::Gazetteer;
//! use facility_geo_service::{parse_facilities, FacilityAnalysisService, ServiceConfig};
//! use serde_json::json;
//!
//! let store = parse_facilities(r#"[
//!     {"id": 1, "name": "Ridge Hospital",
//!      "location": {"lat": 5.5600, "lng": -0.1969},
//!      "facilityType": "hospital", "specialties": ["Cardiology"]}
//! ]"#).unwrap();
//! let service =
//!     FacilityAnalysisService::from_data(store, Gazetteer::ghana(), ServiceConfig::default());
//!
//! let nearby = service.dispatch(
//!     "agent-1",
//!     "findNearby",
//!     json!({"city": "Accra", "specialty": "Cardiology"}),
//! );
//! assert_eq!(nearby["facilities"][0]["name"], "Ridge Hospital");
//!
//! let deserts = service.dispatch(
//!     "agent-1",
//!     "findMedicalDeserts",
//!     json!({"specialty": "Cardiology", "region": "Upper East", "gridResolutionKm": 20}),
//! );
//! assert!(deserts["zones"].as_array().is_some());
//! ```
//!
//! ## Shared state
//!
//! - [`RateGuard`] - sliding-window admission per caller, shared as `Arc`
//! - [`SnapshotStore`] - the current facility data, swapped atomically
//! - [`ReportCache`] - optional LRU cache of gap reports per data generation
//!
//! ## Feature Flags
//!
//! - `parallel` - Parallel gap scans in the engine

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod cache;
mod config;
mod error;
mod loader;
mod rate_guard;
mod service;
mod snapshot;
pub mod tools;

// Public re-exports
pub use cache::{gap_cache_key, CacheStats, ReportCache};
pub use config::{CacheConfig, RateGuardConfig, ServiceConfig, ServiceConfigBuilder};
pub use error::{ServiceError, ServiceResult};
pub use loader::{load_facilities, load_gazetteer_extension, parse_facilities};
pub use rate_guard::{Clock, ManualClock, RateGuard, SystemClock};
pub use service::{error_value, FacilityAnalysisService, ServiceStats};
pub use snapshot::{FacilitySnapshot, SnapshotStore};
pub use tools::{
    BoundingBoxArg, DetectAnomaliesArgs, ErrorOutput, FindDesertsArgs, FindDesertsOutput,
    FindNearbyArgs, FindNearbyOutput, NearbyFacility,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _config = ServiceConfig::default();
        let _guard = RateGuard::new(RateGuardConfig::default());
        let _cache = ReportCache::new(CacheConfig::default());
        let _: Option<ServiceResult<()>> = None;
        assert_eq!(tools::FIND_NEARBY, "findNearby");
    }
}
