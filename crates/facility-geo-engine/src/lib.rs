//! # facility-geo-engine
//!
//! Geospatial and data-quality analysis over healthcare facility records.
//!
//! This crate answers three questions about a facility collection held
//! behind the [`FacilityStore`] trait:
//!
//! - **Where is the nearest care?** Proximity search around a point or a
//!   named place, ranked by great-circle distance.
//! - **Where is care missing?** Coverage-gap detection that samples a region
//!   on a grid and reports underserved zones for a specialty.
//! - **Can this record be trusted?** Completeness scoring and plausibility
//!   rules that flag claims the listed equipment or capacity cannot support.
//!
//! ## Quick Start
//!
//! ```rust
//! use facility_geo::{Facility, Gazetteer};
//! use facility_geo_engine::{AnalysisEngine, GapQuery, InMemoryStore, ProximityQuery};
//!
//! let store = InMemoryStore::new(vec![
//!     Facility::new(1, "Korle Bu Teaching Hospital")
//!         .with_location(5.5365, -0.2277)
//!         .with_specialties(["Cardiology"]),
//!     Facility::new(2, "Tamale Teaching Hospital")
//!         .with_location(9.4075, -0.8533)
//!         .with_specialties(["Pediatrics"]),
//! ]);
//! let gazetteer = Gazetteer::ghana();
//! let engine = AnalysisEngine::new(&store, &gazetteer);
//!
//! let nearby = engine
//!     .find_nearby(&ProximityQuery::near_place("Accra").with_radius_km(25.0))
//!     .unwrap();
//! assert_eq!(nearby.ids(), vec![1]);
//!
//! let deserts = engine
//!     .find_gaps(&GapQuery::in_region("Cardiology", "Northern").with_grid_resolution_km(25.0))
//!     .unwrap();
//! assert!(deserts.zone_count() >= 1);
//!
//! let report = engine.detect_anomalies(1).unwrap();
//! assert!(report.completeness_score <= 100);
//! ```
//!
//! ## Configuration
//!
//! ```rust
//! use facility_geo_engine::{EngineConfig, SeverityPolicy};
//!
//! let config = EngineConfig::builder()
//!     .with_default_radius_km(25.0)
//!     .with_max_grid_points(20_000)
//!     .with_severity_policy(SeverityPolicy { severe_ratio: 1.25, critical_ratio: 1.75 })
//!     .with_population_density(None)
//!     .build();
//! assert_eq!(config.gaps.max_grid_points, 20_000);
//! ```
//!
//! ## Feature Flags
//!
//! - `parallel` - Computes per-point nearest distances in gap scans with rayon
//! - `serde` - Serialize/deserialize support for requests and reports
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    facility-geo-engine                       │
//! │                                                              │
//! │  AnalysisEngine                                              │
//! │  ├── resolve center / scope (Gazetteer, facility-geo)       │
//! │  ├── proximity::search    → ProximityReport                 │
//! │  ├── gaps::find_gaps      → GapReport (grid + basins)       │
//! │  └── AnomalyScorer::score → AnomalyReport (rules as data)   │
//! │                                                              │
//! │  Store access only through the FacilityStore trait:          │
//! │  ├── scan(SpatialPredicate)                                 │
//! │  └── get(FacilityId)                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod anomaly;
mod config;
mod engine;
mod error;
pub mod gaps;
mod grid;
pub mod proximity;
mod result;
mod store;
mod traits;

// Public re-exports
pub use anomaly::{
    default_rules, AnomalyScorer, Claim, KeywordSet, PlausibilityRule, Prerequisite, TrackedField,
    TRACKED_FIELDS, TRACKED_FIELDS_VERSION,
};
pub use config::{
    EngineConfig, EngineConfigBuilder, GapConfig, ProximityConfig, SeverityPolicy,
    GHANA_MEAN_DENSITY_PER_KM2,
};
pub use engine::AnalysisEngine;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use gaps::{GapParams, GapQuery, GapScope};
pub use grid::SampleGrid;
pub use proximity::{CenterSpec, ProximityQuery};
pub use result::{
    AnomalyReport, GapKind, GapReport, GapSeverity, GapZone, ProximityReport, ProximityResult,
    ScanStats, Violation, ViolationSeverity,
};
pub use store::InMemoryStore;
pub use traits::{FacilityStore, SpatialPredicate};
