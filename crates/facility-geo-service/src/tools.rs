//! JSON argument and result shapes for the tool-call boundary.
//!
//! Field names are camelCase on the wire. Argument types convert into engine
//! queries; result types are borrowed views over engine reports, so
//! serializing them never copies facility records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use facility_geo::{
    parse_bounding_box, BoundingBox, Coordinates, Facility, FacilityId, FacilityType,
};
use facility_geo_engine::{
    CenterSpec, EngineError, EngineResult, ErrorKind, GapKind, GapQuery, GapReport, GapScope,
    ProximityQuery, ProximityReport, ProximityResult,
};

/// Operation names accepted by the dispatcher.
pub const FIND_NEARBY: &str = "findNearby";
/// See [`FIND_NEARBY`].
pub const FIND_MEDICAL_DESERTS: &str = "findMedicalDeserts";
/// See [`FIND_NEARBY`].
pub const DETECT_ANOMALIES: &str = "detectAnomalies";

// =============================================================================
// findNearby
// =============================================================================

/// Arguments of `findNearby`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNearbyArgs {
    /// Place name, used when no coordinates are given.
    #[serde(default)]
    pub city: Option<String>,
    /// Center latitude.
    #[serde(default)]
    pub lat: Option<f64>,
    /// Center longitude.
    #[serde(default)]
    pub lng: Option<f64>,
    /// Search radius (None = configured default).
    #[serde(default)]
    pub radius_km: Option<f64>,
    /// Exact specialty tag to filter on.
    #[serde(default)]
    pub specialty: Option<String>,
}

impl FindNearbyArgs {
    /// Converts the arguments into a proximity query.
    ///
    /// Coordinates take precedence over a city name.
    pub fn into_query(self) -> EngineResult<ProximityQuery> {
        let center = CenterSpec::from_parts(self.city.as_deref(), self.lat, self.lng)?;
        Ok(ProximityQuery {
            center,
            radius_km: self.radius_km,
            specialty: self.specialty,
        })
    }
}

/// One facility in a `findNearby` result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyFacility<'a> {
    /// Facility id.
    pub id: FacilityId,
    /// Display name.
    pub name: &'a str,
    /// Facility kind.
    pub facility_type: FacilityType,
    /// City label.
    pub city: Option<&'a str>,
    /// Region label.
    pub region: Option<&'a str>,
    /// Facility location.
    pub location: Option<Coordinates>,
    /// Specialty tags.
    pub specialties: &'a BTreeSet<String>,
    /// Distance from the center, rounded to 0.1 km.
    pub distance_km: f64,
    /// 1-based rank.
    pub rank: usize,
}

impl<'a> From<&ProximityResult<'a>> for NearbyFacility<'a> {
    fn from(result: &ProximityResult<'a>) -> Self {
        let facility: &'a Facility = result.facility;
        Self {
            id: facility.id,
            name: &facility.name,
            facility_type: facility.facility_type,
            city: facility.city.as_deref(),
            region: facility.region.as_deref(),
            location: facility.location,
            specialties: &facility.specialties,
            distance_km: result.distance_km,
            rank: result.rank,
        }
    }
}

/// Result of `findNearby`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNearbyOutput<'a> {
    /// Resolved search center.
    pub center: Coordinates,
    /// Radius used.
    pub radius_km: f64,
    /// Number of facilities returned.
    pub count: usize,
    /// Facilities, nearest first.
    pub facilities: Vec<NearbyFacility<'a>>,
}

impl<'a> From<&ProximityReport<'a>> for FindNearbyOutput<'a> {
    fn from(report: &ProximityReport<'a>) -> Self {
        Self {
            center: report.center,
            radius_km: report.radius_km,
            count: report.count(),
            facilities: report.results.iter().map(NearbyFacility::from).collect(),
        }
    }
}

// =============================================================================
// findMedicalDeserts
// =============================================================================

/// A bounding box given as an object or as a `"south,west,north,east"` string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum BoundingBoxArg {
    /// `{south, west, north, east}`.
    Edges {
        /// Southern edge.
        south: f64,
        /// Western edge.
        west: f64,
        /// Northern edge.
        north: f64,
        /// Eastern edge.
        east: f64,
    },
    /// `"south,west,north,east"`.
    Literal(String),
}

impl BoundingBoxArg {
    /// Validates the box.
    pub fn to_bounds(&self) -> EngineResult<BoundingBox> {
        let bounds = match self {
            BoundingBoxArg::Edges {
                south,
                west,
                north,
                east,
            } => BoundingBox::new(*south, *west, *north, *east)?,
            BoundingBoxArg::Literal(text) => parse_bounding_box(text)?,
        };
        Ok(bounds)
    }
}

/// Arguments of `findMedicalDeserts`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindDesertsArgs {
    /// Exact specialty tag.
    pub specialty: String,
    /// Region name; exclusive with `bounding_box`.
    #[serde(default)]
    pub region: Option<String>,
    /// Explicit scope; exclusive with `region`.
    #[serde(default)]
    pub bounding_box: Option<BoundingBoxArg>,
    /// Grid spacing (None = configured default).
    #[serde(default)]
    pub grid_resolution_km: Option<f64>,
    /// Distance threshold (None = configured default).
    #[serde(default)]
    pub threshold_km: Option<f64>,
}

impl FindDesertsArgs {
    /// Converts the arguments into a gap query.
    pub fn into_query(self) -> EngineResult<GapQuery> {
        let region = self
            .region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let scope = match (region, self.bounding_box) {
            (Some(_), Some(_)) => {
                return Err(EngineError::invalid(
                    "give either region or boundingBox, not both",
                ))
            }
            (Some(region), None) => GapScope::Region(region),
            (None, Some(bbox)) => GapScope::BoundingBox(bbox.to_bounds()?),
            (None, None) => {
                return Err(EngineError::invalid("a region or boundingBox is required"))
            }
        };
        Ok(GapQuery {
            specialty: self.specialty,
            scope,
            grid_resolution_km: self.grid_resolution_km,
            threshold_km: self.threshold_km,
        })
    }
}

/// Result of `findMedicalDeserts`: the report plus caller-facing notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FindDesertsOutput<'a> {
    /// The gap report.
    #[serde(flatten)]
    pub report: &'a GapReport,
    /// True when the scope holds no geocoded facilities at all.
    pub data_absent: bool,
    /// One note per distinct zone kind, in zone order.
    pub notes: Vec<&'static str>,
}

impl<'a> From<&'a GapReport> for FindDesertsOutput<'a> {
    fn from(report: &'a GapReport) -> Self {
        let mut kinds: Vec<GapKind> = Vec::new();
        for zone in &report.zones {
            if !kinds.contains(&zone.kind) {
                kinds.push(zone.kind);
            }
        }
        Self {
            report,
            data_absent: report.is_data_absent(),
            notes: kinds.iter().map(GapKind::note).collect(),
        }
    }
}

// =============================================================================
// detectAnomalies
// =============================================================================

/// Arguments of `detectAnomalies`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectAnomaliesArgs {
    /// Facility to assess.
    pub facility_id: FacilityId,
}

// =============================================================================
// Errors
// =============================================================================

/// Error payload returned in place of a result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorOutput {
    /// User-facing message.
    pub error: String,
    /// Machine-readable classification.
    pub kind: ErrorKind,
}

#[cfg(test)]
mod tests {
    use super::*;
    use facility_geo_engine::{GapSeverity, GapZone, ScanStats};
    use serde_json::json;

    #[test]
    fn test_nearby_args_coordinates_win() {
        let args: FindNearbyArgs =
            serde_json::from_value(json!({"city": "Accra", "lat": 6.69, "lng": -1.62})).unwrap();
        let query = args.into_query().unwrap();
        assert!(matches!(query.center, CenterSpec::Coordinates(_)));
    }

    #[test]
    fn test_nearby_args_city_only() {
        let args: FindNearbyArgs =
            serde_json::from_value(json!({"city": "Tamale", "radiusKm": 10.0})).unwrap();
        let query = args.into_query().unwrap();
        assert_eq!(query.center, CenterSpec::Place("Tamale".to_string()));
        assert_eq!(query.radius_km, Some(10.0));
    }

    #[test]
    fn test_nearby_args_missing_center() {
        let args: FindNearbyArgs = serde_json::from_value(json!({})).unwrap();
        let err = args.into_query().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidQuery);
    }

    #[test]
    fn test_bounding_box_object_and_string() {
        let object: BoundingBoxArg =
            serde_json::from_value(json!({"south": 9.0, "west": -1.0, "north": 10.0, "east": 0.0}))
                .unwrap();
        let literal: BoundingBoxArg =
            serde_json::from_value(json!("9.0, -1.0, 10.0, 0.0")).unwrap();
        assert_eq!(object.to_bounds().unwrap(), literal.to_bounds().unwrap());
    }

    #[test]
    fn test_bounding_box_inverted_rejected() {
        let arg = BoundingBoxArg::Literal("10.0,-1.0,9.0,0.0".to_string());
        assert_eq!(arg.to_bounds().unwrap_err().kind(), ErrorKind::InvalidQuery);
    }

    #[test]
    fn test_deserts_args_scope_rules() {
        let both: FindDesertsArgs = serde_json::from_value(json!({
            "specialty": "Cardiology",
            "region": "Northern",
            "boundingBox": "9,-1,10,0"
        }))
        .unwrap();
        assert!(both.into_query().is_err());

        let neither: FindDesertsArgs =
            serde_json::from_value(json!({"specialty": "Cardiology"})).unwrap();
        assert!(neither.into_query().is_err());

        let region: FindDesertsArgs = serde_json::from_value(json!({
            "specialty": "Cardiology",
            "region": " Northern ",
            "thresholdKm": 40.0
        }))
        .unwrap();
        let query = region.into_query().unwrap();
        assert_eq!(query.scope, GapScope::Region("Northern".to_string()));
        assert_eq!(query.threshold_km, Some(40.0));
    }

    #[test]
    fn test_deserts_args_require_specialty() {
        let result: Result<FindDesertsArgs, _> =
            serde_json::from_value(json!({"region": "Northern"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_deserts_output_flattens_report() {
        let report = GapReport {
            specialty: "Cardiology".to_string(),
            scope: BoundingBox::new(9.0, -1.0, 10.0, 0.0).unwrap(),
            grid_resolution_km: 10.0,
            threshold_km: 30.0,
            sample_points: 12,
            gap_points: 12,
            qualifying_facilities: 0,
            zones: vec![GapZone {
                center: Coordinates { lat: 9.5, lng: -0.5 },
                radius_km: 80.0,
                nearest_facility_distance_km: None,
                severity: GapSeverity::Critical,
                estimated_population_affected: None,
                sample_points: 0,
                kind: GapKind::NoGeocodedFacilities,
            }],
            stats: ScanStats::default(),
        };
        let value = serde_json::to_value(FindDesertsOutput::from(&report)).unwrap();
        assert_eq!(value["specialty"], "Cardiology");
        assert_eq!(value["gridResolutionKm"], 10.0);
        assert_eq!(value["dataAbsent"], true);
        assert_eq!(value["zones"][0]["severity"], "critical");
        assert_eq!(value["notes"].as_array().unwrap().len(), 1);
        assert!(value.get("stats").is_none());
    }

    #[test]
    fn test_detect_args() {
        let args: DetectAnomaliesArgs =
            serde_json::from_value(json!({"facilityId": 42})).unwrap();
        assert_eq!(args.facility_id, 42);
        assert!(serde_json::from_value::<DetectAnomaliesArgs>(json!({"id": 42})).is_err());
    }

    #[test]
    fn test_error_output_shape() {
        let output = ErrorOutput {
            error: "place not found".to_string(),
            kind: ErrorKind::NotFound,
        };
        assert_eq!(
            serde_json::to_value(output).unwrap(),
            json!({"error": "place not found", "kind": "not_found"})
        );
    }
}
