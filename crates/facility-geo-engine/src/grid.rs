//! Uniform sample grids over a bounding box.

use facility_geo::{BoundingBox, Coordinates, KM_PER_DEGREE};

use crate::error::{EngineError, EngineResult};

/// A row-major grid of sample points anchored at a box's south-west corner.
///
/// Latitude spacing is exact; longitude spacing is scaled by the cosine of
/// the box's mid-latitude so that cells are roughly square on the ground.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleGrid {
    origin: Coordinates,
    rows: usize,
    cols: usize,
    d_lat: f64,
    d_lng: f64,
    resolution_km: f64,
}

impl SampleGrid {
    /// Plans a grid, rejecting it if it would exceed `max_points`.
    ///
    /// The size check happens before any point is generated.
    pub fn plan(scope: &BoundingBox, resolution_km: f64, max_points: usize) -> EngineResult<Self> {
        if !resolution_km.is_finite() || resolution_km <= 0.0 {
            return Err(EngineError::invalid(format!(
                "gridResolutionKm must be a positive number, got {resolution_km}"
            )));
        }

        let rows = (scope.height_km() / resolution_km).floor() + 1.0;
        let cols = (scope.width_km() / resolution_km).floor() + 1.0;
        let total = rows * cols;
        if !total.is_finite() || total > max_points as f64 {
            return Err(EngineError::invalid(format!(
                "resolution too fine for scope: {total:.0} sample points exceeds the limit of {max_points}"
            )));
        }

        let mid_lat = scope.center().lat.to_radians();
        Ok(Self {
            origin: scope.south_west(),
            rows: rows as usize,
            cols: cols as usize,
            d_lat: resolution_km / KM_PER_DEGREE,
            d_lng: resolution_km / (KM_PER_DEGREE * mid_lat.cos()),
            resolution_km,
        })
    }

    /// Number of sample points.
    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    /// Returns true if the grid has no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of rows (latitude steps).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (longitude steps).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Grid spacing in kilometres.
    pub fn resolution_km(&self) -> f64 {
        self.resolution_km
    }

    /// Ground area represented by one sample point, in km².
    pub fn cell_area_km2(&self) -> f64 {
        self.resolution_km * self.resolution_km
    }

    /// Coordinates of the point at `index`.
    pub fn point(&self, index: usize) -> Coordinates {
        let row = index / self.cols;
        let col = index % self.cols;
        Coordinates {
            lat: self.origin.lat + row as f64 * self.d_lat,
            lng: self.origin.lng + col as f64 * self.d_lng,
        }
    }

    /// All points in index order.
    pub fn points(&self) -> Vec<Coordinates> {
        (0..self.len()).map(|i| self.point(i)).collect()
    }

    /// Indices of the up to eight points adjacent to `index`.
    pub fn neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let row = (index / self.cols) as isize;
        let col = (index % self.cols) as isize;
        (-1isize..=1)
            .flat_map(move |dr| (-1isize..=1).map(move |dc| (row + dr, col + dc)))
            .filter(move |&(r, c)| {
                (r, c) != (row, col)
                    && r >= 0
                    && c >= 0
                    && (r as usize) < self.rows
                    && (c as usize) < self.cols
            })
            .map(move |(r, c)| r as usize * self.cols + c as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_box() -> BoundingBox {
        // Roughly 22 km tall and 22 km wide around Accra.
        BoundingBox::new(5.5, -0.3, 5.7, -0.1).unwrap()
    }

    #[test]
    fn test_plan_dimensions() {
        let grid = SampleGrid::plan(&small_box(), 10.0, 10_000).unwrap();
        assert_eq!(grid.rows(), 3);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.len(), 9);
        assert_eq!(grid.cell_area_km2(), 100.0);
    }

    #[test]
    fn test_points_stay_inside_scope() {
        let scope = small_box();
        let grid = SampleGrid::plan(&scope, 3.0, 10_000).unwrap();
        for point in grid.points() {
            assert!(scope.contains(&point), "{point} outside {scope}");
        }
        assert_eq!(grid.point(0), scope.south_west());
    }

    #[test]
    fn test_spacing_matches_resolution() {
        let grid = SampleGrid::plan(&small_box(), 5.0, 10_000).unwrap();
        let north = grid.point(grid.cols()).distance_km(&grid.point(0));
        let east = grid.point(1).distance_km(&grid.point(0));
        assert!((north - 5.0).abs() < 0.01);
        assert!((east - 5.0).abs() < 0.05);
    }

    #[test]
    fn test_too_fine_rejected() {
        let ghana = BoundingBox::new(4.5, -3.5, 11.5, 1.5).unwrap();
        let err = SampleGrid::plan(&ghana, 0.5, 10_000).unwrap_err();
        assert!(err.to_string().contains("resolution too fine"));
    }

    #[test]
    fn test_invalid_resolution() {
        assert!(SampleGrid::plan(&small_box(), 0.0, 100).is_err());
        assert!(SampleGrid::plan(&small_box(), f64::INFINITY, 100).is_err());
    }

    #[test]
    fn test_neighbours() {
        let grid = SampleGrid::plan(&small_box(), 10.0, 10_000).unwrap();
        let mut corner: Vec<usize> = grid.neighbours(0).collect();
        corner.sort_unstable();
        assert_eq!(corner, vec![1, 3, 4]);
        assert_eq!(grid.neighbours(4).count(), 8);
        assert_eq!(grid.neighbours(5).count(), 5);
    }

    #[test]
    fn test_box_smaller_than_cell_has_one_point() {
        let tiny = BoundingBox::new(6.0, -1.0, 6.01, -0.99).unwrap();
        let grid = SampleGrid::plan(&tiny, 10.0, 10).unwrap();
        assert_eq!(grid.len(), 1);
    }
}
