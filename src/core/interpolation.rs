//! Scattered-data interpolation onto points and regular grids.
//!
//! Two modes are provided:
//!
//! - [`InterpolationType::Round`] locates the query in the combined
//!   Delaunay–Voronoi graph and returns the value of the input point whose
//!   Voronoi cell contains it.
//! - [`InterpolationType::Linear`] locates the query in the Delaunay graph
//!   and blends the three corner values barycentrically.  Outside the hull it
//!   finds the nearest hull side by walking the corner bisectors along the
//!   boundary and interpolates along that side, clamped to its endpoints.
//!
//! A grid is filled row by row, reusing the last located triangle as the
//! start of the next walk.  Any failed sample aborts the whole fill.

use crate::core::algorithms::locate::{LocateError, WalkOutcome, make_valid_triangle, walk};
use crate::core::boundary::Boundary;
use crate::core::collections::PointId;
use crate::core::triangulation::Triangulation;
use crate::geometry::point::Point;
use crate::geometry::predicates::{
    ccw_angle_convex_within, find_side_section, point_on_right_side, polar_angle,
    side_intersection_distance,
};
use crate::geometry::triangle::Triangle;
use num_traits::cast;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slack of the hull wedge tests, in radians or side half-lengths.
///
/// Neighbouring wedges share their bounding rays; a query on one must fall in
/// at least one of them.
const WEDGE_TOLERANCE: f64 = 1e-12;

// =============================================================================
// CONFIGURATION
// =============================================================================

/// How values between input points are computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterpolationType {
    /// Value of the nearest input point.
    Round,
    /// Piecewise linear over the Delaunay triangles.
    #[default]
    Linear,
}

/// A regular output grid: `yres` rows of `xres` samples covering
/// `[xoff, xoff + xreal) × [yoff, yoff + yreal)`, sampled at pixel centres.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::core::interpolation::GridSpecBuilder;
///
/// let grid = GridSpecBuilder::default()
///     .xres(4)
///     .yres(2)
///     .xreal(2.0)
///     .yreal(1.0)
///     .build()
///     .unwrap();
/// assert_eq!(grid.len(), 8);
/// assert_eq!(grid.xoff, 0.0);
///
/// assert!(GridSpecBuilder::default().xres(0).yres(1).xreal(1.0).yreal(1.0).build().is_err());
/// ```
#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct GridSpec {
    /// Number of columns.
    pub xres: usize,
    /// Number of rows.
    pub yres: usize,
    /// Physical width.
    pub xreal: f64,
    /// Physical height.
    pub yreal: f64,
    /// Left edge.
    #[builder(default)]
    #[serde(default)]
    pub xoff: f64,
    /// Top edge.
    #[builder(default)]
    #[serde(default)]
    pub yoff: f64,
}

impl GridSpecBuilder {
    fn validate(&self) -> Result<(), String> {
        if self.xres == Some(0) || self.yres == Some(0) {
            return Err("resolutions must be at least 1".to_string());
        }
        for (name, value) in [("xreal", self.xreal), ("yreal", self.yreal)] {
            if let Some(value) = value.filter(|v| !(v.is_finite() && *v > 0.0)) {
                return Err(format!("{name} must be finite and positive, got {value}"));
            }
        }
        for (name, value) in [("xoff", self.xoff), ("yoff", self.yoff)] {
            if let Some(value) = value.filter(|v| !v.is_finite()) {
                return Err(format!("{name} must be finite, got {value}"));
            }
        }
        Ok(())
    }
}

impl GridSpec {
    /// Number of samples.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.xres * self.yres
    }

    /// Returns `true` for a grid without samples.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Location of the sample in row `i`, column `j`.
    #[must_use]
    pub fn sample(&self, i: usize, j: usize) -> Point {
        let qx = self.xreal / cast::<usize, f64>(self.xres).unwrap_or(1.0);
        let qy = self.yreal / cast::<usize, f64>(self.yres).unwrap_or(1.0);
        Point::new(
            self.xoff + qx * (cast::<usize, f64>(j).unwrap_or(0.0) + 0.5),
            self.yoff + qy * (cast::<usize, f64>(i).unwrap_or(0.0) + 0.5),
        )
    }

    fn check(&self) -> Result<(), InterpolationError> {
        let valid = self.xres > 0
            && self.yres > 0
            && self.xreal.is_finite()
            && self.xreal > 0.0
            && self.yreal.is_finite()
            && self.yreal > 0.0
            && self.xoff.is_finite()
            && self.yoff.is_finite();
        if valid {
            Ok(())
        } else {
            Err(InterpolationError::InvalidGrid {
                message: format!("{self:?}"),
            })
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Errors that can occur during interpolation.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum InterpolationError {
    /// Nothing has been triangulated.
    #[error("Cannot interpolate over an empty triangulation")]
    EmptyTriangulation,

    /// The triangulated points carried no values.
    #[error("Triangulated points carry no values")]
    MissingValues,

    /// The grid specification is unusable.
    #[error("Invalid grid: {message}")]
    InvalidGrid {
        /// Description of the problem.
        message: String,
    },

    /// A triangle or boundary walk exceeded its step cap.
    #[error("Walk did not converge after {steps} steps")]
    WalkDivergence {
        /// Number of steps taken.
        steps: usize,
    },

    /// Round mode located a triangle without an input point.
    #[error("No input point found near ({x}, {y})")]
    NoDataVertex {
        /// Query abscissa.
        x: f64,
        /// Query ordinate.
        y: f64,
    },

    /// Linear mode left the hull through a side that is not on the boundary.
    #[error("No boundary side found for ({x}, {y})")]
    NoBoundarySide {
        /// Query abscissa.
        x: f64,
        /// Query ordinate.
        y: f64,
    },
}

impl From<LocateError> for InterpolationError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::CycleDetected { steps } => Self::WalkDivergence { steps },
            LocateError::NoValidTriangle { .. } => Self::EmptyTriangulation,
        }
    }
}

// =============================================================================
// INTERPOLATION
// =============================================================================

/// Walk state carried from one sample to the next.
struct Sampler<'a> {
    triangulation: &'a Triangulation,
    boundary: &'a Boundary,
    values: &'a [f64],
    mode: InterpolationType,
    triangle: Triangle,
}

impl<'a> Sampler<'a> {
    fn new(
        triangulation: &'a Triangulation,
        mode: InterpolationType,
    ) -> Result<Self, InterpolationError> {
        let boundary = triangulation
            .boundary()
            .ok_or(InterpolationError::EmptyTriangulation)?;
        let values = triangulation
            .values()
            .ok_or(InterpolationError::MissingValues)?;
        let triangle = match mode {
            InterpolationType::Linear => make_valid_triangle(&triangulation.delaunay_graph(), 0)?,
            InterpolationType::Round => make_valid_triangle(&triangulation.combined_graph(), 0)?,
        };
        Ok(Self {
            triangulation,
            boundary,
            values,
            mode,
            triangle,
        })
    }

    fn sample(&mut self, pt: Point) -> Result<f64, InterpolationError> {
        match self.mode {
            InterpolationType::Linear => self.linear(pt),
            InterpolationType::Round => self.round(pt),
        }
    }

    fn round(&mut self, pt: Point) -> Result<f64, InterpolationError> {
        let graph = self.triangulation.combined_graph();
        // Leaving through an outer side is fine; the triangle still touches
        // the nearest cell.
        walk(&graph, &mut self.triangle, pt)?;
        let npoints = self.triangulation.number_of_points();
        self.triangle
            .ids
            .iter()
            .find(|&&id| id < npoints)
            .map(|&id| self.values[id])
            .ok_or(InterpolationError::NoDataVertex { x: pt.x, y: pt.y })
    }

    fn linear(&mut self, pt: Point) -> Result<f64, InterpolationError> {
        let graph = self.triangulation.delaunay_graph();
        match walk(&graph, &mut self.triangle, pt)? {
            WalkOutcome::Inside => {
                let values = self.triangle.ids.map(|id| self.values[id]);
                Ok(self.triangle.blend(values))
            }
            WalkOutcome::Outside => {
                // A corner triangle has more than one hull side; each is a
                // start for the boundary walk.
                let [a, b, c] = self.triangle.ids;
                let mut result = Err(InterpolationError::NoBoundarySide { x: pt.x, y: pt.y });
                for start in [[a, b], [b, c], [c, a]] {
                    if !self.boundary.is_side(start[0], start[1]) {
                        continue;
                    }
                    result = self.nearest_side(start, pt);
                    if result.is_ok() {
                        break;
                    }
                }
                let [ia, ib] = result?;
                Ok(self.along_side(ia, ib, pt))
            }
        }
    }

    /// Walks the hull from side `start` to the side whose bisector wedge
    /// contains `pt`.
    fn nearest_side(
        &self,
        start: [PointId; 2],
        pt: Point,
    ) -> Result<[PointId; 2], InterpolationError> {
        let boundary = self.boundary;
        let points = self.triangulation.points();
        let blen = boundary.len();
        let Some(mut k) = boundary.position_of(start[0]) else {
            return Err(InterpolationError::NoBoundarySide { x: pt.x, y: pt.y });
        };

        let mut steps = 0;
        loop {
            let (ip, ia) = (boundary.prev(k), boundary.points()[k]);
            let (ib, in_) = (boundary.next(k), boundary.next((k + 1) % blen));
            let (p, a, b, n) = (points[ip], points[ia], points[ib], points[in_]);

            let (forw, back) = match find_side_section(p, a, b, n) {
                Some(origin) => {
                    let phi = polar_angle(origin, pt);
                    (
                        ccw_angle_convex_within(polar_angle(origin, a), phi, WEDGE_TOLERANCE),
                        ccw_angle_convex_within(phi, polar_angle(origin, b), WEDGE_TOLERANCE),
                    )
                }
                // Straight run of hull points: the wedge is a strip.
                None => {
                    let d = side_intersection_distance(a, b, pt);
                    (d >= -1.0 - WEDGE_TOLERANCE, d <= 1.0 + WEDGE_TOLERANCE)
                }
            };
            if forw && back && point_on_right_side(a, b, pt) {
                return Ok([ia, ib]);
            }

            k = if forw { (k + 1) % blen } else { (k + blen - 1) % blen };
            steps += 1;
            if steps >= blen {
                return Err(InterpolationError::WalkDivergence { steps });
            }
        }
    }

    fn along_side(&self, ia: PointId, ib: PointId, pt: Point) -> f64 {
        let points = self.triangulation.points();
        let (za, zb) = (self.values[ia], self.values[ib]);
        let d = side_intersection_distance(points[ia], points[ib], pt);
        if d <= -1.0 {
            za
        } else if d >= 1.0 {
            zb
        } else {
            0.5 * ((d + 1.0) * zb + (1.0 - d) * za)
        }
    }
}

impl Triangulation {
    /// Interpolated value at (`x`, `y`).
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError::EmptyTriangulation`] or
    /// [`InterpolationError::MissingValues`] when there is nothing to
    /// interpolate, and a walk error when the query cannot be located.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use planar_delaunay::prelude::*;
    ///
    /// let points = [(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (0.0, 1.0, 2.0)];
    /// let triangulation = Triangulation::new(&points).unwrap();
    ///
    /// let z = triangulation.interpolate_at(InterpolationType::Linear, 0.25, 0.25).unwrap();
    /// assert!((z - 0.75).abs() < 1e-12);
    /// assert_eq!(triangulation.interpolate_at(InterpolationType::Round, 0.9, 0.05).unwrap(), 1.0);
    /// ```
    pub fn interpolate_at(
        &self,
        mode: InterpolationType,
        x: f64,
        y: f64,
    ) -> Result<f64, InterpolationError> {
        Sampler::new(self, mode)?.sample(Point::new(x, y))
    }

    /// Fills `grid` row by row.
    ///
    /// # Errors
    ///
    /// Returns [`InterpolationError::InvalidGrid`] for an unusable grid and
    /// the first sample error otherwise; no partial grid is returned.
    pub fn interpolate(
        &self,
        mode: InterpolationType,
        grid: &GridSpec,
    ) -> Result<Vec<f64>, InterpolationError> {
        grid.check()?;
        let mut sampler = Sampler::new(self, mode)?;
        let mut data = Vec::with_capacity(grid.len());
        for i in 0..grid.yres {
            for j in 0..grid.xres {
                data.push(sampler.sample(grid.sample(i, j))?);
            }
        }
        tracing::debug!(?mode, xres = grid.xres, yres = grid.yres, "grid filled");
        Ok(data)
    }
}

// =============================================================================
// TESTS
// =============================================================================
