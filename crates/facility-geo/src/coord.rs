//! Coordinates, bounding boxes and great-circle distance.

use crate::error::{GeoError, GeoResult};

/// Mean Earth radius used for all distance computations, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Length of one degree of latitude on the [`EARTH_RADIUS_KM`] sphere.
pub const KM_PER_DEGREE: f64 = 2.0 * std::f64::consts::PI * EARTH_RADIUS_KM / 360.0;

/// A latitude/longitude pair in decimal degrees.
///
/// The fields are public so that records deserialized from external data
/// can carry whatever the source contained. Use [`Coordinates::new`] to
/// build validated values and [`Coordinates::is_valid`] to check foreign ones.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinates {
    /// Latitude in degrees, -90..=90.
    pub lat: f64,
    /// Longitude in degrees, -180..=180.
    pub lng: f64,
}

impl Coordinates {
    /// Creates validated coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidLatitude`] or [`GeoError::InvalidLongitude`]
    /// for non-finite or out-of-range values.
    pub fn new(lat: f64, lng: f64) -> GeoResult<Self> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Returns true if both components are finite and within range.
    pub fn is_valid(&self) -> bool {
        Self::new(self.lat, self.lng).is_ok()
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_km(self.lat, self.lng, other.lat, other.lng)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4},{:.4}", self.lat, self.lng)
    }
}

/// Haversine distance between two points in kilometres.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rounds a distance to one decimal place.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// An axis-aligned latitude/longitude rectangle.
///
/// Boxes crossing the antimeridian are not supported.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Southern edge latitude.
    pub south: f64,
    /// Western edge longitude.
    pub west: f64,
    /// Northern edge latitude.
    pub north: f64,
    /// Eastern edge longitude.
    pub east: f64,
}

impl BoundingBox {
    /// Creates a validated bounding box.
    ///
    /// # Errors
    ///
    /// Fails if any edge is out of range or if `south >= north` or `west >= east`.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> GeoResult<Self> {
        Coordinates::new(south, west)?;
        Coordinates::new(north, east)?;
        if south >= north {
            return Err(GeoError::InvalidBoundingBox(format!(
                "south {south} must be less than north {north}"
            )));
        }
        if west >= east {
            return Err(GeoError::InvalidBoundingBox(format!(
                "west {west} must be less than east {east}"
            )));
        }
        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Re-validates a box that may have come from untrusted input.
    pub fn validated(self) -> GeoResult<Self> {
        Self::new(self.south, self.west, self.north, self.east)
    }

    /// Returns true if the point lies inside or on the edge of the box.
    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.south..=self.north).contains(&point.lat)
            && (self.west..=self.east).contains(&point.lng)
    }

    /// The geometric center of the box.
    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.south + self.north) / 2.0,
            lng: (self.west + self.east) / 2.0,
        }
    }

    /// The south-west corner.
    pub fn south_west(&self) -> Coordinates {
        Coordinates {
            lat: self.south,
            lng: self.west,
        }
    }

    /// North-south extent in kilometres.
    pub fn height_km(&self) -> f64 {
        (self.north - self.south) * KM_PER_DEGREE
    }

    /// East-west extent in kilometres, measured along the middle parallel.
    pub fn width_km(&self) -> f64 {
        let mid_lat = (self.south + self.north) / 2.0;
        (self.east - self.west) * KM_PER_DEGREE * mid_lat.to_radians().cos()
    }

    /// Distance from the center to the farthest corner.
    pub fn half_diagonal_km(&self) -> f64 {
        let center = self.center();
        [
            (self.south, self.west),
            (self.south, self.east),
            (self.north, self.west),
            (self.north, self.east),
        ]
        .iter()
        .map(|&(lat, lng)| haversine_km(center.lat, center.lng, lat, lng))
        .fold(0.0, f64::max)
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.4},{:.4},{:.4},{:.4}",
            self.south, self.west, self.north, self.east
        )
    }
}
