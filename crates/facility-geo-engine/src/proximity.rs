//! Proximity search.
//!
//! Ranks facilities by great-circle distance from a center point. Facilities
//! without a usable location never take part. Ranking uses the reported
//! (0.1 km) distance with ties broken by ascending id, so equal displayed
//! distances always appear in id order.

use facility_geo::{Coordinates, Facility, FacilityId, Gazetteer};

use crate::error::{EngineError, EngineResult};
use crate::result::ProximityResult;
use crate::traits::{FacilityStore, SpatialPredicate};

/// Where a proximity search is centered.
#[derive(Debug, Clone, PartialEq)]
pub enum CenterSpec {
    /// Explicit coordinates.
    Coordinates(Coordinates),
    /// A place name to geocode.
    Place(String),
}

impl CenterSpec {
    /// Builds a center from optional tool arguments.
    ///
    /// An explicit lat/lng pair takes precedence over a city name. Giving
    /// only one of lat/lng, or nothing usable at all, is an invalid query.
    pub fn from_parts(
        city: Option<&str>,
        lat: Option<f64>,
        lng: Option<f64>,
    ) -> EngineResult<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => {
                let coords = Coordinates::new(lat, lng)?;
                Ok(CenterSpec::Coordinates(coords))
            }
            (Some(_), None) | (None, Some(_)) => Err(EngineError::invalid(
                "both lat and lng are required when giving coordinates",
            )),
            (None, None) => match city.map(str::trim) {
                Some(name) if !name.is_empty() => Ok(CenterSpec::Place(name.to_string())),
                _ => Err(EngineError::invalid(
                    "no usable center: provide a city name or lat/lng",
                )),
            },
        }
    }

    /// Resolves the center to coordinates.
    pub fn resolve(&self, gazetteer: &Gazetteer) -> EngineResult<Coordinates> {
        match self {
            CenterSpec::Coordinates(coords) => Ok(*coords),
            CenterSpec::Place(name) => Ok(gazetteer.resolve(name)?),
        }
    }
}

/// A proximity search request.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityQuery {
    /// Search center.
    pub center: CenterSpec,
    /// Radius in kilometres (None = configured default).
    pub radius_km: Option<f64>,
    /// Exact, case-sensitive specialty tag filter.
    pub specialty: Option<String>,
}

impl ProximityQuery {
    /// Creates a query around explicit coordinates.
    pub fn around(center: Coordinates) -> Self {
        Self {
            center: CenterSpec::Coordinates(center),
            radius_km: None,
            specialty: None,
        }
    }

    /// Creates a query around a named place.
    pub fn near_place(name: impl Into<String>) -> Self {
        Self {
            center: CenterSpec::Place(name.into()),
            radius_km: None,
            specialty: None,
        }
    }

    /// Sets the radius.
    pub fn with_radius_km(mut self, radius_km: f64) -> Self {
        self.radius_km = Some(radius_km);
        self
    }

    /// Sets the specialty filter.
    pub fn with_specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }
}

/// Checks a radius against the accepted range.
pub(crate) fn validate_radius(radius_km: f64, max_radius_km: f64) -> EngineResult<()> {
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(EngineError::invalid(format!(
            "radiusKm must be a positive number, got {radius_km}"
        )));
    }
    if radius_km > max_radius_km {
        return Err(EngineError::invalid(format!(
            "radiusKm {radius_km} exceeds the maximum of {max_radius_km}"
        )));
    }
    Ok(())
}

/// Distance in tenths of a kilometre, the unit results are reported in.
fn tenths(distance_km: f64) -> u64 {
    (distance_km * 10.0).round() as u64
}

/// Finds facilities strictly within `radius_km` of `center`.
///
/// Results are sorted by reported distance then id and truncated to
/// `max_results`. An empty vector means nothing matched.
pub fn search<'a>(
    store: &'a dyn FacilityStore,
    center: Coordinates,
    radius_km: f64,
    specialty: Option<&str>,
    max_results: usize,
) -> Vec<ProximityResult<'a>> {
    let mut hits: Vec<(u64, FacilityId, &'a Facility)> = store
        .scan(SpatialPredicate::Within { center, radius_km })
        .filter(|f| specialty.map_or(true, |tag| f.has_specialty(tag)))
        .filter_map(|f| {
            let location = f.spatial_location()?;
            let distance = center.distance_km(&location);
            (distance < radius_km).then(|| (tenths(distance), f.id, f))
        })
        .collect();

    hits.sort_by_key(|&(distance, id, _)| (distance, id));
    hits.truncate(max_results);

    hits.into_iter()
        .enumerate()
        .map(|(position, (distance, _, facility))| ProximityResult {
            facility,
            distance_km: distance as f64 / 10.0,
            rank: position + 1,
        })
        .collect()
}
