//! Facility store accessor.
//!
//! This module defines the [`FacilityStore`] trait that any facility
//! collection must implement to be analysed. The engine only ever needs two
//! capabilities: scanning with a spatial predicate and fetching by id, so the
//! store can be an in-memory vector, a database table or a document
//! collection without the query language leaking into the engine.
//!
//! # Example: Implementing FacilityStore for a custom collection
//!
//! ```ignore
//! use facility_geo::{Facility, FacilityId};
//! use facility_geo_engine::{FacilityStore, SpatialPredicate};
//!
//! struct RegistryTable {
//!     rows: Vec<Facility>,
//! }
//!
//! impl FacilityStore for RegistryTable {
//!     fn scan(&self, predicate: SpatialPredicate) -> Box<dyn Iterator<Item = &Facility> + '_> {
//!         Box::new(self.rows.iter().filter(move |f| predicate.matches(f)))
//!     }
//!
//!     fn get(&self, id: FacilityId) -> Option<&Facility> {
//!         self.rows.iter().find(|f| f.id == id)
//!     }
//!
//!     fn len(&self) -> usize {
//!         self.rows.len()
//!     }
//! }
//! ```

use facility_geo::{BoundingBox, Coordinates, Facility, FacilityId};

/// Spatial filter applied while scanning a store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpatialPredicate {
    /// Every facility, including those without coordinates.
    All,
    /// Facilities with a valid location strictly closer than `radius_km`.
    Within {
        /// Search center.
        center: Coordinates,
        /// Exclusive radius in kilometres.
        radius_km: f64,
    },
    /// Facilities with a valid location inside the box (edges included).
    InBounds(BoundingBox),
}

impl SpatialPredicate {
    /// Returns true if the facility satisfies the predicate.
    ///
    /// Spatial variants never match facilities without a valid location.
    pub fn matches(&self, facility: &Facility) -> bool {
        match self {
            SpatialPredicate::All => true,
            SpatialPredicate::Within { center, radius_km } => facility
                .spatial_location()
                .is_some_and(|loc| center.distance_km(&loc) < *radius_km),
            SpatialPredicate::InBounds(bounds) => facility
                .spatial_location()
                .is_some_and(|loc| bounds.contains(&loc)),
        }
    }
}

/// Read-only access to a facility collection.
///
/// Implementations must be safe to read concurrently. The engine never
/// writes through this trait.
///
/// # Required Methods
///
/// - [`scan`](Self::scan) - Iterate facilities matching a spatial predicate
/// - [`get`](Self::get) - Fetch a facility by id
/// - [`len`](Self::len) - Number of facilities
pub trait FacilityStore: Send + Sync {
    /// Iterates over facilities matching the predicate, in ascending id order.
    fn scan(&self, predicate: SpatialPredicate) -> Box<dyn Iterator<Item = &Facility> + '_>;

    /// Fetches a facility by id.
    fn get(&self, id: FacilityId) -> Option<&Facility>;

    /// Total number of facilities, geocoded or not.
    fn len(&self) -> usize;

    /// Returns true if the store holds no facilities.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of facilities with a valid location inside `bounds`.
    fn count_geocoded_in(&self, bounds: &BoundingBox) -> usize {
        self.scan(SpatialPredicate::InBounds(*bounds)).count()
    }
}
