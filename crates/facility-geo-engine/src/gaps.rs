//! Coverage-gap ("medical desert") detection.
//!
//! A scope is sampled on a uniform grid. Every sample point gets the distance
//! to its nearest qualifying facility; points farther than the threshold are
//! gaps. Gap points are grouped into zones by desert basin: regions around a
//! local maximum of distance (the zone's core), with basins whose core barely
//! rises above its surroundings folded into their deeper neighbour.
//!
//! Basins are computed without reference to the threshold, so a higher
//! threshold can only drop points and cores, never split a zone.
//!
//! Zones therefore follow basins rather than gap-point adjacency:
//!
//! - One contiguous desert with two prominent cores is reported as two
//!   adjacent zones, split along the saddle between the cores.
//! - A shallow basin absorbed into a deeper neighbour stays in that
//!   neighbour's zone even when the saddle between them is below the
//!   threshold, so a zone's gap points need not touch each other.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::time::Instant;

use tracing::debug;

use facility_geo::{round_tenth, BoundingBox, Coordinates, Gazetteer};

use crate::config::GapConfig;
use crate::error::{EngineError, EngineResult};
use crate::grid::SampleGrid;
use crate::result::{GapKind, GapReport, GapSeverity, GapZone, ScanStats};
use crate::traits::{FacilityStore, SpatialPredicate};

/// Area a gap scan covers.
#[derive(Debug, Clone, PartialEq)]
pub enum GapScope {
    /// A named administrative region.
    Region(String),
    /// An explicit box.
    BoundingBox(BoundingBox),
}

impl GapScope {
    /// Resolves the scope to a validated bounding box.
    pub fn resolve(&self, gazetteer: &Gazetteer) -> EngineResult<BoundingBox> {
        match self {
            GapScope::Region(name) => Ok(gazetteer.resolve_region(name)?),
            GapScope::BoundingBox(bounds) => Ok(bounds.validated()?),
        }
    }
}

/// A coverage-gap request.
#[derive(Debug, Clone, PartialEq)]
pub struct GapQuery {
    /// Exact specialty tag.
    pub specialty: String,
    /// Area to scan.
    pub scope: GapScope,
    /// Grid spacing (None = configured default).
    pub grid_resolution_km: Option<f64>,
    /// Distance threshold (None = configured default).
    pub threshold_km: Option<f64>,
}

impl GapQuery {
    /// Creates a query with default grid and threshold.
    pub fn new(specialty: impl Into<String>, scope: GapScope) -> Self {
        Self {
            specialty: specialty.into(),
            scope,
            grid_resolution_km: None,
            threshold_km: None,
        }
    }

    /// Creates a query over a named region.
    pub fn in_region(specialty: impl Into<String>, region: impl Into<String>) -> Self {
        Self::new(specialty, GapScope::Region(region.into()))
    }

    /// Creates a query over a bounding box.
    pub fn in_bounds(specialty: impl Into<String>, bounds: BoundingBox) -> Self {
        Self::new(specialty, GapScope::BoundingBox(bounds))
    }

    /// Sets the grid spacing.
    pub fn with_grid_resolution_km(mut self, resolution_km: f64) -> Self {
        self.grid_resolution_km = Some(resolution_km);
        self
    }

    /// Sets the distance threshold.
    pub fn with_threshold_km(mut self, threshold_km: f64) -> Self {
        self.threshold_km = Some(threshold_km);
        self
    }
}

/// Fully resolved scan parameters.
#[derive(Debug, Clone, Copy)]
pub struct GapParams<'q> {
    /// Exact specialty tag.
    pub specialty: &'q str,
    /// Validated scope.
    pub scope: BoundingBox,
    /// Grid spacing in kilometres.
    pub grid_resolution_km: f64,
    /// Distance threshold in kilometres.
    pub threshold_km: f64,
}

/// Scans a scope for coverage gaps.
///
/// Rejects oversized grids before reading the store.
pub fn find_gaps(
    store: &dyn FacilityStore,
    params: GapParams<'_>,
    config: &GapConfig,
    parallel: bool,
) -> EngineResult<GapReport> {
    let start = Instant::now();

    if params.specialty.trim().is_empty() {
        return Err(EngineError::invalid("specialty must not be blank"));
    }
    if !params.threshold_km.is_finite() || params.threshold_km <= 0.0 {
        return Err(EngineError::invalid(format!(
            "thresholdKm must be a positive number, got {}",
            params.threshold_km
        )));
    }

    let grid = SampleGrid::plan(&params.scope, params.grid_resolution_km, config.max_grid_points)?;

    let candidates: Vec<Coordinates> = store
        .scan(SpatialPredicate::All)
        .filter(|f| f.has_specialty(params.specialty))
        .filter_map(|f| f.spatial_location())
        .collect();

    let mut report = GapReport {
        specialty: params.specialty.to_string(),
        scope: params.scope,
        grid_resolution_km: params.grid_resolution_km,
        threshold_km: params.threshold_km,
        sample_points: grid.len(),
        gap_points: 0,
        qualifying_facilities: candidates.len(),
        zones: Vec::new(),
        stats: ScanStats::default(),
    };

    if store.count_geocoded_in(&params.scope) == 0 {
        report.zones.push(whole_scope_zone(
            &params.scope,
            grid.len(),
            None,
            GapKind::NoGeocodedFacilities,
        ));
    } else if candidates.is_empty() {
        report.gap_points = grid.len();
        let population = estimate_population(grid.len(), &grid, config);
        report.zones.push(whole_scope_zone(
            &params.scope,
            grid.len(),
            population,
            GapKind::NoQualifyingFacility,
        ));
    } else {
        let points = grid.points();
        let distances = nearest_distances(&points, &candidates, parallel);
        let min_prominence_km = config.core_prominence_cells * grid.resolution_km();
        let basins = group_by_core(&grid, &distances, params.threshold_km, min_prominence_km);
        report.gap_points = basins.values().map(Vec::len).sum();

        let mut zones: Vec<(usize, GapZone)> = basins
            .into_iter()
            .map(|(core, members)| {
                let zone = build_zone(
                    &grid,
                    &points,
                    &members,
                    distances[core],
                    params.threshold_km,
                    config,
                );
                (core, zone)
            })
            .collect();

        zones.sort_by(|(core_a, a), (core_b, b)| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| {
                    let da = a.nearest_facility_distance_km.unwrap_or(f64::INFINITY);
                    let db = b.nearest_facility_distance_km.unwrap_or(f64::INFINITY);
                    db.total_cmp(&da)
                })
                .then_with(|| core_a.cmp(core_b))
        });
        zones.truncate(config.max_zones);
        report.zones = zones.into_iter().map(|(_, zone)| zone).collect();
    }

    report.stats = ScanStats::new(start.elapsed(), store.len());

    debug!(
        specialty = params.specialty,
        sample_points = report.sample_points,
        gap_points = report.gap_points,
        zones = report.zones.len(),
        qualifying = report.qualifying_facilities,
        elapsed_us = report.stats.duration.as_micros() as u64,
        "gap scan complete"
    );

    Ok(report)
}

fn whole_scope_zone(
    scope: &BoundingBox,
    sample_points: usize,
    population: Option<u64>,
    kind: GapKind,
) -> GapZone {
    GapZone {
        center: scope.center(),
        radius_km: round_tenth(scope.half_diagonal_km()),
        nearest_facility_distance_km: None,
        severity: GapSeverity::Critical,
        estimated_population_affected: population,
        sample_points,
        kind,
    }
}

fn estimate_population(points: usize, grid: &SampleGrid, config: &GapConfig) -> Option<u64> {
    config
        .population_density_per_km2
        .map(|density| (points as f64 * grid.cell_area_km2() * density).round() as u64)
}

fn nearest(point: &Coordinates, candidates: &[Coordinates]) -> f64 {
    candidates
        .iter()
        .map(|c| point.distance_km(c))
        .fold(f64::INFINITY, f64::min)
}

/// Nearest-candidate distance for every point, in point order.
fn nearest_distances(
    points: &[Coordinates],
    candidates: &[Coordinates],
    parallel: bool,
) -> Vec<f64> {
    #[cfg(feature = "parallel")]
    if parallel {
        use rayon::prelude::*;
        return points.par_iter().map(|p| nearest(p, candidates)).collect();
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    points.iter().map(|p| nearest(p, candidates)).collect()
}

/// Returns true if point `a` is deeper than point `b`.
///
/// Depth is nearest-facility distance; ties go to the lower index so that
/// the order is total.
fn deeper(distances: &[f64], a: usize, b: usize) -> bool {
    match distances[a].total_cmp(&distances[b]) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => a < b,
    }
}

/// Union-find over grid points where every root remembers its basin's core.
struct Basins {
    parent: Vec<usize>,
    core: Vec<usize>,
}

impl Basins {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            core: (0..len).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }
}

/// Partitions the grid into desert basins and returns the gap members of
/// each, keyed by core index.
///
/// Points are visited from deepest to shallowest. A point joins the basin of
/// its deepest already-visited neighbour, or starts a new basin if it has
/// none. Where two basins meet, the shallower one is absorbed if its core
/// rises less than `min_prominence_km` above the meeting point. None of this
/// depends on the threshold, which only selects members.
fn group_by_core(
    grid: &SampleGrid,
    distances: &[f64],
    threshold_km: f64,
    min_prominence_km: f64,
) -> BTreeMap<usize, Vec<usize>> {
    let mut order: Vec<usize> = (0..grid.len()).collect();
    order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]).then(a.cmp(&b)));

    let mut basins = Basins::new(grid.len());
    let mut visited = vec![false; grid.len()];
    let mut roots: Vec<usize> = Vec::with_capacity(8);

    for &point in &order {
        roots.clear();
        for neighbour in grid.neighbours(point) {
            if visited[neighbour] {
                let root = basins.find(neighbour);
                if !roots.contains(&root) {
                    roots.push(root);
                }
            }
        }
        visited[point] = true;

        let Some(&main) = roots
            .iter()
            .reduce(|a, b| if deeper(distances, basins.core[*b], basins.core[*a]) { b } else { a })
        else {
            continue;
        };

        for &other in roots.iter().filter(|&&r| r != main) {
            if distances[basins.core[other]] - distances[point] < min_prominence_km {
                basins.parent[other] = main;
            }
        }
        basins.parent[point] = main;
    }

    let mut grouped: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for point in (0..grid.len()).filter(|&i| distances[i] > threshold_km) {
        let root = basins.find(point);
        grouped.entry(basins.core[root]).or_default().push(point);
    }
    grouped
}

fn build_zone(
    grid: &SampleGrid,
    points: &[Coordinates],
    members: &[usize],
    core_distance_km: f64,
    threshold_km: f64,
    config: &GapConfig,
) -> GapZone {
    let count = members.len() as f64;
    let (lat_sum, lng_sum) = members
        .iter()
        .fold((0.0, 0.0), |(lat, lng), &i| (lat + points[i].lat, lng + points[i].lng));
    let center = Coordinates {
        lat: lat_sum / count,
        lng: lng_sum / count,
    };

    let spread = members
        .iter()
        .map(|&i| center.distance_km(&points[i]))
        .fold(0.0, f64::max);

    let nearest_km = round_tenth(core_distance_km);

    GapZone {
        center,
        radius_km: round_tenth(spread + grid.resolution_km() / 2.0),
        nearest_facility_distance_km: Some(nearest_km),
        severity: config.severity.classify(Some(nearest_km), threshold_km),
        estimated_population_affected: estimate_population(members.len(), grid, config),
        sample_points: members.len(),
        kind: GapKind::Underserved,
    }
}
