//! Locality-sorted copy of the input points.
//!
//! Points are bucketed into a coarse grid and read back cell by cell along a
//! zig-zag row order, so that consecutive insertions touch nearby
//! neighbourhoods.  `orig_index` maps every sorted id back to the caller's
//! point order.

use crate::core::collections::{FastHashMap, PointId, fast_hash_map_with_capacity};
use crate::core::triangulation::TriangulationError;
use crate::geometry::point::Point;
use crate::geometry::predicates::{Orientation, orientation};
use num_traits::cast;

/// Cell side of the locality grid, in units of the mean point spacing.
pub const CELL_SIDE: f64 = 6.0;

/// Reordered points plus the mapping back to caller ids.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointList {
    points: Vec<Point>,
    orig_index: Vec<PointId>,
}

impl PointList {
    /// Sorts `points` into the locality order.
    ///
    /// Never fails; an empty input produces an empty list.
    #[must_use]
    pub fn new(points: &[Point]) -> Self {
        let n = points.len();
        if n == 0 {
            return Self::default();
        }

        let grid = LocalityGrid::covering(points);
        let cells: Vec<usize> = points.iter().map(|&pt| grid.cell_of(pt)).collect();

        // Counting sort: cell sizes, prefix sums, then scatter.
        let mut cell_index = vec![0_usize; grid.ncells() + 1];
        for &cell in &cells {
            cell_index[cell + 1] += 1;
        }
        for i in 1..cell_index.len() {
            cell_index[i] += cell_index[i - 1];
        }

        let mut sorted = vec![Point::default(); n];
        let mut orig_index = vec![0; n];
        for (i, (&pt, &cell)) in points.iter().zip(&cells).enumerate() {
            let pos = cell_index[cell];
            sorted[pos] = pt;
            orig_index[pos] = i;
            cell_index[cell] += 1;
        }

        Self {
            points: sorted,
            orig_index,
        }
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` for an empty list.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points in locality order.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Caller id of each sorted point.
    #[inline]
    #[must_use]
    pub fn orig_index(&self) -> &[PointId] {
        &self.orig_index
    }

    /// Caller id of sorted point `id`.
    #[inline]
    #[must_use]
    pub fn original_id(&self, id: PointId) -> PointId {
        self.orig_index[id]
    }

    /// Moves a point that is not collinear with the first two into position 2
    /// so the first triangle is proper.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::DegenerateInput`] when all points are
    /// collinear.
    pub fn ensure_initial_triangle(&mut self) -> Result<(), TriangulationError> {
        if self.len() < 3 {
            return Err(TriangulationError::InsufficientPoints { count: self.len() });
        }
        let (a, b) = (self.points[0], self.points[1]);
        let k = (2..self.len())
            .find(|&k| orientation(a, b, self.points[k]) != Orientation::DEGENERATE)
            .ok_or_else(|| TriangulationError::DegenerateInput {
                message: "all points are collinear".to_string(),
            })?;
        if k != 2 {
            self.points.swap(2, k);
            self.orig_index.swap(2, k);
        }
        Ok(())
    }
}

/// Rejects non-finite coordinates and coincident points.
///
/// # Errors
///
/// Returns [`TriangulationError::NonFiniteCoordinate`] or
/// [`TriangulationError::DegenerateInput`] naming the first offending caller
/// index.
pub fn validate_points(points: &[Point]) -> Result<(), TriangulationError> {
    let mut seen: FastHashMap<(u64, u64), usize> = fast_hash_map_with_capacity(points.len());
    for (index, pt) in points.iter().enumerate() {
        if !pt.is_finite() {
            return Err(TriangulationError::NonFiniteCoordinate { index });
        }
        // Adding 0.0 folds -0.0 onto +0.0.
        let key = ((pt.x + 0.0).to_bits(), (pt.y + 0.0).to_bits());
        if let Some(first) = seen.insert(key, index) {
            return Err(TriangulationError::DegenerateInput {
                message: format!(
                    "points {first} and {index} coincide at ({}, {})",
                    pt.x, pt.y
                ),
            });
        }
    }
    Ok(())
}

// =============================================================================
// LOCALITY GRID
// =============================================================================

#[derive(Clone, Copy, Debug)]
struct LocalityGrid {
    xmin: f64,
    ymin: f64,
    step: f64,
    xres: usize,
    yres: usize,
}

impl LocalityGrid {
    fn covering(points: &[Point]) -> Self {
        let (mut xmin, mut xmax) = (points[0].x, points[0].x);
        let (mut ymin, mut ymax) = (points[0].y, points[0].y);
        for pt in &points[1..] {
            xmin = xmin.min(pt.x);
            xmax = xmax.max(pt.x);
            ymin = ymin.min(pt.y);
            ymax = ymax.max(pt.y);
        }

        let xreal = xmax - xmin;
        let yreal = ymax - ymin;
        let sqrt_n = cast::<usize, f64>(points.len()).unwrap_or(1.0).sqrt();
        let xr = xreal / sqrt_n * CELL_SIDE;
        let yr = yreal / sqrt_n * CELL_SIDE;

        // The shorter nonzero extent fixes the (square) cell size.
        let mean_spacing = (xreal * yreal / (sqrt_n * sqrt_n)).sqrt();
        let step = match (xr > 0.0, yr > 0.0) {
            (true, true) if xr <= yr => xreal / (xreal / xr).ceil(),
            (true, true) | (false, true) => yreal / (yreal / yr).ceil(),
            (true, false) => xreal / (xreal / xr).ceil(),
            (false, false) => 1.0,
        }
        // Keeps the cell count linear in n for extreme aspect ratios.
        .max(mean_spacing)
        .max(xreal.max(yreal) / (sqrt_n * sqrt_n));
        let cells_along = |extent: f64| {
            cast::<f64, usize>((extent / step).ceil())
                .unwrap_or(1)
                .max(1)
        };

        Self {
            xmin,
            ymin,
            step,
            xres: cells_along(xreal),
            yres: cells_along(yreal),
        }
    }

    const fn ncells(&self) -> usize {
        self.xres * self.yres
    }

    fn cell_of(&self, pt: Point) -> usize {
        let along = |offset: f64, res: usize| {
            cast::<f64, usize>((offset / self.step).floor())
                .unwrap_or(0)
                .min(res - 1)
        };
        let mut ix = along(pt.x - self.xmin, self.xres);
        let iy = along(pt.y - self.ymin, self.yres);
        // Zig-zag through the rows.
        if iy % 2 == 1 {
            ix = self.xres - 1 - ix;
        }
        iy * self.xres + ix
    }
}

// =============================================================================
// TESTS
// =============================================================================
