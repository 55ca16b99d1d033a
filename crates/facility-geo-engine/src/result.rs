//! Result types returned by the analysis components.
//!
//! All results are plain values computed on demand; nothing here is
//! persisted or shared between invocations.

use std::time::Duration;

use facility_geo::{BoundingBox, Coordinates, Facility, FacilityId};

/// Statistics from one analysis run.
///
/// Not serialized, so that repeated runs produce identical payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScanStats {
    /// Wall-clock duration.
    pub duration: Duration,
    /// Facilities read from the store.
    pub facilities_scanned: usize,
}

impl ScanStats {
    /// Creates new stats.
    pub fn new(duration: Duration, facilities_scanned: usize) -> Self {
        Self {
            duration,
            facilities_scanned,
        }
    }
}

// =============================================================================
// Proximity
// =============================================================================

/// One ranked facility from a proximity search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProximityResult<'a> {
    /// The matching facility.
    pub facility: &'a Facility,
    /// Distance from the search center, rounded to 0.1 km.
    pub distance_km: f64,
    /// 1-based position in the result list.
    pub rank: usize,
}

/// Outcome of a proximity search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProximityReport<'a> {
    /// Resolved search center.
    pub center: Coordinates,
    /// Radius used, in kilometres.
    pub radius_km: f64,
    /// Specialty filter applied, if any.
    pub specialty: Option<String>,
    /// Ranked results, nearest first.
    pub results: Vec<ProximityResult<'a>>,
    /// Execution statistics.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub stats: ScanStats,
}

impl ProximityReport<'_> {
    /// Number of results.
    pub fn count(&self) -> usize {
        self.results.len()
    }

    /// Returns true if nothing matched.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Ids in rank order.
    pub fn ids(&self) -> Vec<FacilityId> {
        self.results.iter().map(|r| r.facility.id).collect()
    }
}

// =============================================================================
// Coverage gaps
// =============================================================================

/// How badly a zone is underserved.
///
/// Ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GapSeverity {
    /// Nearest facility somewhat beyond the threshold.
    Moderate,
    /// Nearest facility well beyond the threshold.
    Severe,
    /// Nearest facility far beyond the threshold, or none at all.
    Critical,
}

impl GapSeverity {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            GapSeverity::Moderate => "moderate",
            GapSeverity::Severe => "severe",
            GapSeverity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for GapSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a zone was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum GapKind {
    /// Sample points whose nearest qualifying facility is beyond the threshold.
    Underserved,
    /// Facilities exist in scope, but none anywhere offers the specialty.
    NoQualifyingFacility,
    /// No facility with usable coordinates lies in scope: absence of data,
    /// not verified absence of care.
    NoGeocodedFacilities,
}

impl GapKind {
    /// Human-readable note for the caller.
    pub fn note(&self) -> &'static str {
        match self {
            GapKind::Underserved => "nearest qualifying facility is beyond the distance threshold",
            GapKind::NoQualifyingFacility => "no facility in the dataset lists this specialty",
            GapKind::NoGeocodedFacilities => {
                "no geocoded facilities in scope; coverage cannot be assessed from the data"
            }
        }
    }
}

/// A region judged underserved for a specialty.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GapZone {
    /// Centroid of the zone's sample points.
    pub center: Coordinates,
    /// Radius covering every sample point of the zone, rounded to 0.1 km.
    pub radius_km: f64,
    /// Distance from the zone's deepest point to the nearest qualifying
    /// facility, rounded to 0.1 km. Absent when no qualifying facility exists.
    pub nearest_facility_distance_km: Option<f64>,
    /// Severity bucket.
    pub severity: GapSeverity,
    /// Rough population estimate, if a density is configured.
    pub estimated_population_affected: Option<u64>,
    /// Number of grid sample points merged into this zone.
    pub sample_points: usize,
    /// Why the zone was reported.
    pub kind: GapKind,
}

/// Outcome of a coverage-gap scan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct GapReport {
    /// Specialty searched for.
    pub specialty: String,
    /// Resolved scope.
    pub scope: BoundingBox,
    /// Grid spacing used.
    pub grid_resolution_km: f64,
    /// Distance threshold used.
    pub threshold_km: f64,
    /// Total sample points in the grid.
    pub sample_points: usize,
    /// Sample points judged to be gaps.
    pub gap_points: usize,
    /// Geocoded facilities offering the specialty, anywhere in the dataset.
    pub qualifying_facilities: usize,
    /// Reported zones, most severe first.
    pub zones: Vec<GapZone>,
    /// Execution statistics.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub stats: ScanStats,
}

impl GapReport {
    /// Number of zones.
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }

    /// Returns true if the report signals missing data rather than a gap.
    pub fn is_data_absent(&self) -> bool {
        self.zones
            .iter()
            .any(|z| z.kind == GapKind::NoGeocodedFacilities)
    }
}

// =============================================================================
// Anomalies
// =============================================================================

/// Severity of a plausibility violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ViolationSeverity {
    /// Minor inconsistency.
    Low,
    /// Claim needs corroboration.
    Medium,
    /// Claim is very unlikely as recorded.
    High,
}

impl ViolationSeverity {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationSeverity::Low => "low",
            ViolationSeverity::Medium => "medium",
            ViolationSeverity::High => "high",
        }
    }
}

/// One flagged mismatch between a claim and supporting infrastructure.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Violation {
    /// Rule tag, e.g. `equipment_mismatch`.
    pub rule: String,
    /// How serious the mismatch is.
    pub severity: ViolationSeverity,
    /// Explanation citing the missing prerequisite.
    pub explanation: String,
}

/// Data-quality assessment of one facility.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AnomalyReport {
    /// Facility assessed.
    pub facility_id: FacilityId,
    /// Percentage of tracked fields present, 0..=100.
    pub completeness_score: u8,
    /// Completeness reduced by violation penalties, 0..=100.
    pub confidence_score: u8,
    /// Version of the tracked-field list used for completeness.
    pub tracked_fields_version: u32,
    /// Violations in rule order.
    pub violations: Vec<Violation>,
}

impl AnomalyReport {
    /// Returns true if no rule fired.
    pub fn is_plausible(&self) -> bool {
        self.violations.is_empty()
    }

    /// Highest violation severity, if any.
    pub fn max_severity(&self) -> Option<ViolationSeverity> {
        self.violations.iter().map(|v| v.severity).max()
    }
}
