//! # facility-geo
//!
//! Core types for analysing healthcare facilities in Ghana.
//!
//! This crate provides:
//! - **Facility records**: [`Facility`] with location, tags, staffing and contact fields
//! - **Geometry**: [`Coordinates`], [`BoundingBox`] and [`haversine_km`]
//! - **Geocoding**: [`Gazetteer`], a fixed, case-insensitive place and region lookup
//! - **Parsing**: nom parsers for coordinate pairs, bounding boxes and gazetteer text
//!
//! ## Usage
//!
//! ```rust
//! use facility_geo::{haversine_km, Facility, Gazetteer};
//!
//! let gazetteer = Gazetteer::ghana();
//! let accra = gazetteer.resolve("Accra").unwrap();
//! let kumasi = gazetteer.resolve("Kumasi").unwrap();
//!
//! let km = accra.distance_km(&kumasi);
//! assert!((km - 197.0).abs() < 1.0);
//!
//! let clinic = Facility::new(1, "Ridge Clinic")
//!     .with_location(5.56, -0.20)
//!     .with_specialties(["Pediatrics"]);
//! assert!(clinic.spatial_location().is_some());
//! ```
//!
//! ## Literal Formats
//!
//! | Literal | Example |
//! |---------|---------|
//! | Coordinates | `5.6037, -0.1870` |
//! | Bounding box | `4.7, -3.3, 11.2, 1.2` (south, west, north, east) |
//! | Gazetteer city | `city \| Accra \| 5.6037 \| -0.1870` |
//! | Gazetteer region | `region \| Ashanti \| 5.8 \| -2.6 \| 7.6 \| -0.5` |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod coord;
mod error;
mod facility;
mod gazetteer;
mod parser;

pub use coord::{
    haversine_km, round_tenth, BoundingBox, Coordinates, EARTH_RADIUS_KM, KM_PER_DEGREE,
};
pub use error::{GeoError, GeoResult};
pub use facility::{Facility, FacilityType};
pub use gazetteer::{Gazetteer, PlaceEntry, RegionEntry};
pub use parser::{parse_bounding_box, parse_coordinates, parse_gazetteer, GazetteerRecord};

/// Facility identifier.
pub type FacilityId = u64;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _: Option<Facility> = None;
        let _: Option<BoundingBox> = None;
        let _: Option<GeoResult<()>> = None;
        let _id: FacilityId = 42;
    }
}
