//! The triangulation object: input points, the Delaunay graph, its hull and
//! the Voronoi dual.
//!
//! A [`Triangulation`] is either empty or holds a complete, validated
//! result.  [`Triangulation::triangulate`] replaces the contents wholesale and
//! resets to empty on any failure, so a partial state is never observable.
//! All views borrow the immutable result; nothing is cached behind `&self`.

use crate::core::adjacency::{Csr, PositionedGraph};
use crate::core::algorithms::incremental_insertion::Triangulator;
use crate::core::algorithms::locate::LocateError;
use crate::core::algorithms::repair::{RepairReport, repair};
use crate::core::algorithms::voronoi::{Voronoi, delaunay_to_voronoi};
use crate::core::boundary::Boundary;
use crate::core::collections::PointId;
use crate::core::point_list::{PointList, validate_points};
use crate::core::util::validation::{delaunay_triangles, validate_delaunay_graph};
use crate::geometry::point::{PlanarPoint, Point};
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors that can occur while building a triangulation.
///
/// Every error is fatal to the call that produced it; the triangulation is
/// left empty.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TriangulationError {
    /// Fewer than three points were given.
    #[error("Insufficient points for a planar triangulation: got {count}, need at least 3")]
    InsufficientPoints {
        /// Number of points supplied.
        count: usize,
    },

    /// A coordinate is NaN or infinite.
    #[error("Point {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Caller index of the offending point.
        index: usize,
    },

    /// Duplicate or collinear points.
    #[error("Degenerate input: {message}")]
    DegenerateInput {
        /// Description of the degeneracy.
        message: String,
    },

    /// A triangle walk exceeded its step cap.
    #[error("Triangle walk did not converge after {steps} steps")]
    WalkDivergence {
        /// Number of steps taken.
        steps: usize,
    },

    /// A link is recorded on one side only.
    #[error("Point {point} lists {neighbour} as a neighbour, but not vice versa")]
    ReflexivityViolation {
        /// Point listing the link.
        point: PointId,
        /// Neighbour missing the reverse link.
        neighbour: PointId,
    },

    /// The neighbourhood of a point collapsed during insertion.
    #[error("Neighbourhood of point {point} became empty")]
    EmptyWorkspace {
        /// Caller index of the point.
        point: PointId,
    },

    /// A positively oriented triangle is too flat for a circumcentre.
    #[error("Circumcentre of triangle ({a}, {b}, {c}) is numerically singular")]
    GeometricSingularity {
        /// First vertex.
        a: PointId,
        /// Second vertex.
        b: PointId,
        /// Third vertex.
        c: PointId,
    },

    /// A combinatorial identity or size check failed.
    #[error("Combinatorial mismatch in {what}: expected {expected}, found {found}")]
    CombinatorialMismatch {
        /// What was being counted.
        what: String,
        /// Value required by the identities.
        expected: usize,
        /// Value actually found.
        found: usize,
    },
}

impl From<LocateError> for TriangulationError {
    fn from(err: LocateError) -> Self {
        match err {
            LocateError::CycleDetected { steps } => Self::WalkDivergence { steps },
            LocateError::NoValidTriangle { point } => Self::EmptyWorkspace { point },
        }
    }
}

// =============================================================================
// VERTEX REFERENCES
// =============================================================================

/// A vertex of the combined Delaunay–Voronoi graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexRef {
    /// Input point, by caller index.
    Delaunay(PointId),
    /// Voronoi vertex, by index into [`Voronoi::vpoints`].
    Voronoi(usize),
}

// =============================================================================
// TRIANGULATION
// =============================================================================

/// Delaunay triangulation of a planar point set with its hull and Voronoi
/// dual.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::prelude::*;
///
/// let points = [(0.0, 0.0, 0.0), (1.0, 0.0, 1.0), (0.0, 1.0, 2.0)];
/// let triangulation = Triangulation::new(&points).unwrap();
///
/// assert_eq!(triangulation.number_of_points(), 3);
/// assert_eq!(triangulation.number_of_triangles(), 1);
/// assert_eq!(triangulation.boundary_len(), 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Triangulation {
    points: Vec<Point>,
    values: Option<Vec<f64>>,
    delaunay: Csr,
    boundary: Boundary,
    voronoi: Voronoi,
    repair: RepairReport,
}

impl Triangulation {
    /// Creates an empty triangulation.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Triangulates `points`.
    ///
    /// # Errors
    ///
    /// See [`Triangulation::triangulate`].
    pub fn new<P: PlanarPoint>(points: &[P]) -> Result<Self, TriangulationError> {
        let mut triangulation = Self::empty();
        triangulation.triangulate(points)?;
        Ok(triangulation)
    }

    /// Replaces the contents with the triangulation of `points`.
    ///
    /// Values are kept when every point carries one.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::NonFiniteCoordinate`] or
    /// [`TriangulationError::DegenerateInput`] for invalid input,
    /// [`TriangulationError::InsufficientPoints`] for fewer than three points,
    /// and any construction or validation failure.  The triangulation is
    /// empty afterwards.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use planar_delaunay::prelude::*;
    ///
    /// let mut triangulation = Triangulation::new(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]).unwrap();
    /// let duplicate = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 0.0)];
    ///
    /// assert!(matches!(
    ///     triangulation.triangulate(&duplicate),
    ///     Err(TriangulationError::DegenerateInput { .. })
    /// ));
    /// assert!(triangulation.is_empty());
    /// ```
    pub fn triangulate<P: PlanarPoint>(&mut self, points: &[P]) -> Result<(), TriangulationError> {
        *self = Self::empty();
        match Self::build(points) {
            Ok(triangulation) => {
                *self = triangulation;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(points = points.len(), error = %err, "triangulation failed, reset to empty");
                Err(err)
            }
        }
    }

    fn build<P: PlanarPoint>(input: &[P]) -> Result<Self, TriangulationError> {
        let points: Vec<Point> = input.iter().map(PlanarPoint::xy).collect();
        let values: Option<Vec<f64>> = input.iter().map(PlanarPoint::z).collect();
        validate_points(&points)?;

        let mut list = PointList::new(&points);
        list.ensure_initial_triangle()?;
        tracing::debug!(points = list.len(), "point list built");

        let mut blocks = Triangulator::new(&list).run()?;
        let report = repair(list.points(), &mut blocks);
        let delaunay = Csr::compactify(&list, &blocks)?;
        validate_delaunay_graph(&delaunay, &points)?;

        let boundary = Boundary::find(&delaunay, &points)?;
        let voronoi = delaunay_to_voronoi(&delaunay, &boundary, &points)?;

        let triangulation = Self {
            points,
            values,
            delaunay,
            boundary,
            voronoi,
            repair: report,
        };
        tracing::debug!(
            points = triangulation.number_of_points(),
            edges = triangulation.number_of_edges(),
            triangles = triangulation.number_of_triangles(),
            boundary = triangulation.boundary_len(),
            vpoints = triangulation.voronoi.len(),
            "triangulation built"
        );
        Ok(triangulation)
    }

    /// Returns `true` when nothing has been triangulated.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of input points.
    #[inline]
    #[must_use]
    pub fn number_of_points(&self) -> usize {
        self.points.len()
    }

    /// Number of Delaunay edges.
    #[inline]
    #[must_use]
    pub fn number_of_edges(&self) -> usize {
        self.delaunay.nsize() / 2
    }

    /// Number of Delaunay triangles, `h − (v − 1)`.
    #[must_use]
    pub fn number_of_triangles(&self) -> usize {
        if self.is_empty() {
            return 0;
        }
        self.number_of_edges() + 1 - self.number_of_points()
    }

    /// Number of hull points.
    #[inline]
    #[must_use]
    pub fn boundary_len(&self) -> usize {
        self.boundary.len()
    }

    /// Input point locations in caller order.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Input values in caller order, when every point carried one.
    #[inline]
    #[must_use]
    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    /// The Delaunay graph, with neighbours of every point sorted
    /// counter-clockwise.
    #[must_use]
    pub fn delaunay(&self) -> Option<&Csr> {
        (!self.is_empty()).then_some(&self.delaunay)
    }

    /// The convex hull.
    #[must_use]
    pub fn boundary(&self) -> Option<&Boundary> {
        (!self.is_empty()).then_some(&self.boundary)
    }

    /// The Voronoi dual and the combined graph.
    #[must_use]
    pub fn voronoi(&self) -> Option<&Voronoi> {
        (!self.is_empty()).then_some(&self.voronoi)
    }

    /// What the consistency repair changed while building.
    #[inline]
    #[must_use]
    pub const fn repair_report(&self) -> RepairReport {
        self.repair
    }

    /// Resolves a combined-graph id, `None` when out of range.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use planar_delaunay::prelude::*;
    ///
    /// let triangulation = Triangulation::new(&[(0.0, 0.0), (2.0, 0.0), (0.0, 2.0)]).unwrap();
    /// assert_eq!(triangulation.vertex_ref(1), Some(VertexRef::Delaunay(1)));
    /// assert_eq!(triangulation.vertex_ref(3), Some(VertexRef::Voronoi(0)));
    /// assert_eq!(triangulation.vertex_ref(7), None);
    /// ```
    #[must_use]
    pub fn vertex_ref(&self, id: usize) -> Option<VertexRef> {
        let npoints = self.number_of_points();
        if id < npoints {
            Some(VertexRef::Delaunay(id))
        } else if id < npoints + self.voronoi.len() {
            Some(VertexRef::Voronoi(id - npoints))
        } else {
            None
        }
    }

    /// Location of a vertex of the combined graph.
    #[must_use]
    pub fn vertex_position(&self, vertex: VertexRef) -> Option<Point> {
        match vertex {
            VertexRef::Delaunay(id) => self.points.get(id).copied(),
            VertexRef::Voronoi(id) => self.voronoi.vpoints().get(id).copied(),
        }
    }

    /// Iterates over the counter-clockwise Delaunay triangles, each listed
    /// once.
    pub fn triangles(&self) -> impl Iterator<Item = [PointId; 3]> + '_ {
        delaunay_triangles(&self.delaunay, &self.points)
    }

    /// Re-runs the structural checks on the finished graph.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::ReflexivityViolation`] or
    /// [`TriangulationError::CombinatorialMismatch`] for a broken graph.
    pub fn validate(&self) -> Result<(), TriangulationError> {
        validate_delaunay_graph(&self.delaunay, &self.points)?;
        let boundary = Boundary::find(&self.delaunay, &self.points)?;
        if boundary != self.boundary {
            return Err(TriangulationError::CombinatorialMismatch {
                what: "stored boundary".to_string(),
                expected: boundary.len(),
                found: self.boundary.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn delaunay_graph(&self) -> PositionedGraph<'_> {
        PositionedGraph::new(&self.delaunay, &self.points)
    }

    pub(crate) fn combined_graph(&self) -> PositionedGraph<'_> {
        PositionedGraph::with_extra(self.voronoi.graph(), &self.points, self.voronoi.vpoints())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::{DataPoint, PointXYZ};

    fn square_with_centre() -> Vec<PointXYZ> {
        vec![
            PointXYZ::new(0.0, 0.0, 0.0),
            PointXYZ::new(1.0, 0.0, 1.0),
            PointXYZ::new(1.0, 1.0, 2.0),
            PointXYZ::new(0.0, 1.0, 1.0),
            PointXYZ::new(0.5, 0.5, 1.0),
        ]
    }

    #[test]
    fn empty_triangulation_has_no_views() {
        let triangulation = Triangulation::empty();
        assert!(triangulation.is_empty());
        assert_eq!(triangulation.number_of_triangles(), 0);
        assert!(triangulation.delaunay().is_none());
        assert!(triangulation.boundary().is_none());
        assert!(triangulation.voronoi().is_none());
        assert_eq!(triangulation.triangles().count(), 0);
    }

    #[test]
    fn square_with_centre_counts() {
        let triangulation = Triangulation::new(&square_with_centre()).unwrap();
        assert_eq!(triangulation.number_of_points(), 5);
        assert_eq!(triangulation.number_of_edges(), 8);
        assert_eq!(triangulation.number_of_triangles(), 4);
        assert_eq!(triangulation.boundary_len(), 4);
        assert_eq!(triangulation.voronoi().map(Voronoi::len), Some(8));
        assert_eq!(triangulation.delaunay().map(|d| d.block(4).len()), Some(4));
        assert_eq!(triangulation.values(), Some(&[0.0, 1.0, 2.0, 1.0, 1.0][..]));
        assert!(triangulation.validate().is_ok());

        let mut triangles: Vec<_> = triangulation.triangles().collect();
        triangles.sort_unstable();
        assert_eq!(triangles, vec![[0, 1, 4], [0, 4, 3], [1, 2, 4], [2, 3, 4]]);
    }

    #[test]
    fn failure_resets_to_empty() {
        let mut triangulation = Triangulation::new(&square_with_centre()).unwrap();
        let collinear = [(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)];
        assert!(matches!(
            triangulation.triangulate(&collinear),
            Err(TriangulationError::DegenerateInput { .. })
        ));
        assert!(triangulation.is_empty());
        assert_eq!(triangulation, Triangulation::empty());
    }

    #[test]
    fn too_few_points() {
        assert_eq!(
            Triangulation::new(&[(0.0, 0.0), (1.0, 0.0)]),
            Err(TriangulationError::InsufficientPoints { count: 2 })
        );
        assert_eq!(
            Triangulation::new::<(f64, f64)>(&[]),
            Err(TriangulationError::InsufficientPoints { count: 0 })
        );
    }

    #[test]
    fn values_require_every_point() {
        let mixed = [
            DataPoint::new(0.0, 0.0, Some(1.0), ()),
            DataPoint::new(1.0, 0.0, None, ()),
            DataPoint::new(0.0, 1.0, Some(2.0), ()),
        ];
        let triangulation = Triangulation::new(&mixed).unwrap();
        assert_eq!(triangulation.values(), None);
    }

    #[test]
    fn vertex_refs_cover_the_combined_graph() {
        let triangulation = Triangulation::new(&square_with_centre()).unwrap();
        assert_eq!(triangulation.vertex_ref(4), Some(VertexRef::Delaunay(4)));
        assert_eq!(triangulation.vertex_ref(5), Some(VertexRef::Voronoi(0)));
        assert_eq!(triangulation.vertex_ref(12), Some(VertexRef::Voronoi(7)));
        assert_eq!(triangulation.vertex_ref(13), None);
        assert_eq!(
            triangulation.vertex_position(VertexRef::Delaunay(2)),
            Some(Point::new(1.0, 1.0))
        );
        assert_eq!(triangulation.vertex_position(VertexRef::Voronoi(8)), None);
    }

    #[test]
    fn locate_errors_convert() {
        assert_eq!(
            TriangulationError::from(LocateError::CycleDetected { steps: 9 }),
            TriangulationError::WalkDivergence { steps: 9 }
        );
        assert_eq!(
            TriangulationError::from(LocateError::NoValidTriangle { point: 3 }),
            TriangulationError::EmptyWorkspace { point: 3 }
        );
    }

    #[test]
    fn error_messages() {
        let err = TriangulationError::CombinatorialMismatch {
            what: "boundary length".to_string(),
            expected: 4,
            found: 3,
        };
        assert_eq!(
            err.to_string(),
            "Combinatorial mismatch in boundary length: expected 4, found 3"
        );
    }
}
