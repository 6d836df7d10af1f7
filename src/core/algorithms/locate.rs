//! Point location by walking across triangles.
//!
//! The walk starts from any counter-clockwise triangle and repeatedly crosses
//! the side the query point violates most, until the point lies inside or the
//! side to cross is on the convex hull.  It only needs each vertex's
//! counter-clockwise neighbour fan, so the same code walks the Delaunay graph
//! under construction, the finished Delaunay graph and the combined
//! Delaunay–Voronoi graph.
//!
//! # References
//!
//! - O. Devillers, S. Pion, and M. Teillaud, "Walking in a Triangulation",
//!   International Journal of Foundations of Computer Science, 2001.

use crate::core::collections::{PointId, find_neighbour, next_neighbour, prev_neighbour};
use crate::geometry::point::Point;
use crate::geometry::predicates::{not_left_of, signed_area2};
use crate::geometry::triangle::{Side, Triangle};
use thiserror::Error;

/// A planar graph whose vertex fans are sorted counter-clockwise.
pub trait TriangleGraph {
    /// Neighbours of `id` in counter-clockwise order.
    fn neighbours(&self, id: PointId) -> &[PointId];

    /// Location of vertex `id`.
    fn position(&self, id: PointId) -> Point;

    /// Maximum number of moves a single walk may take.
    fn step_limit(&self) -> usize;
}

/// Result of a successful walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkOutcome {
    /// The query point lies in the final triangle (possibly on its boundary).
    Inside,
    /// The walk stopped at a hull side; the point is outside the hull.
    Outside,
}

/// Error during point location.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LocateError {
    /// The hint vertex has no counter-clockwise pair of neighbours.
    #[error("Vertex {point} is not a corner of any counter-clockwise triangle")]
    NoValidTriangle {
        /// The hint vertex.
        point: PointId,
    },

    /// The walk did not converge (numerical issues).
    #[error("Cycle detected after {steps} steps - possible numerical degeneracy")]
    CycleDetected {
        /// Number of steps before giving up.
        steps: usize,
    },
}

/// Builds the triangle with the given vertex ids.
#[inline]
#[must_use]
pub fn make_triangle<G: TriangleGraph + ?Sized>(graph: &G, ids: [PointId; 3]) -> Triangle {
    Triangle::new(ids, ids.map(|id| graph.position(id)))
}

/// Initialises a counter-clockwise triangle with a corner at `hint`.
///
/// # Errors
///
/// Returns [`LocateError::NoValidTriangle`] when no two consecutive
/// neighbours of `hint` form a strictly counter-clockwise triangle with it.
pub fn make_valid_triangle<G: TriangleGraph + ?Sized>(
    graph: &G,
    hint: PointId,
) -> Result<Triangle, LocateError> {
    let a = graph.position(hint);
    let neighbours = graph.neighbours(hint);
    (0..neighbours.len())
        .map(|i| (neighbours[i], next_neighbour(neighbours, i)))
        .find(|&(ib, ic)| signed_area2(a, graph.position(ib), graph.position(ic)) > 0.0)
        .map(|(ib, ic)| make_triangle(graph, [hint, ib, ic]))
        .ok_or(LocateError::NoValidTriangle { point: hint })
}

/// The vertex across side `from`–`to` from `opposite`, if there is one.
///
/// Both fans must agree on the vertex and it must not lie clearly on the
/// same side as `opposite`; otherwise the side is on the hull (or the fans are
/// inconsistent) and `None` is returned.  A vertex on the line itself is
/// accepted, which lets a walk pass through flat triangles.
#[must_use]
pub fn find_the_other_neighbour<G: TriangleGraph + ?Sized>(
    graph: &G,
    from: PointId,
    to: PointId,
    opposite: PointId,
) -> Option<PointId> {
    let from_fan = graph.neighbours(from);
    let to_prev = prev_neighbour(from_fan, find_neighbour(from_fan, to)?);
    let to_fan = graph.neighbours(to);
    let from_next = next_neighbour(to_fan, find_neighbour(to_fan, from)?);

    // In tiny triangulations the opposite vertex itself can show up here.
    if from_next != to_prev || from_next == opposite {
        return None;
    }
    not_left_of(graph.position(from), graph.position(to), graph.position(to_prev))
        .then_some(to_prev)
}

/// Flips the triangle across `side`.  Returns `false` when that side is on
/// the hull.
pub fn move_triangle<G: TriangleGraph + ?Sized>(
    graph: &G,
    triangle: &mut Triangle,
    side: Side,
) -> bool {
    let [a, b, c] = triangle.ids;
    let ids = match side {
        Side::A => find_the_other_neighbour(graph, b, c, a).map(|d| [d, c, b]),
        Side::B => find_the_other_neighbour(graph, c, a, b).map(|d| [c, d, a]),
        Side::C => find_the_other_neighbour(graph, a, b, c).map(|d| [b, a, d]),
    };
    let Some(ids) = ids else {
        return false;
    };
    *triangle = make_triangle(graph, ids);
    true
}

/// Walks `triangle` towards `pt`.
///
/// # Errors
///
/// Returns [`LocateError::CycleDetected`] when the walk exceeds the graph's
/// step limit.
pub fn walk<G: TriangleGraph + ?Sized>(
    graph: &G,
    triangle: &mut Triangle,
    pt: Point,
) -> Result<WalkOutcome, LocateError> {
    let limit = graph.step_limit();
    let mut steps = 0;
    while !triangle.contains(pt) {
        if !move_triangle(graph, triangle, triangle.most_violated_side()) {
            return Ok(WalkOutcome::Outside);
        }
        steps += 1;
        if steps > limit {
            return Err(LocateError::CycleDetected { steps });
        }
    }
    Ok(WalkOutcome::Inside)
}

// =============================================================================
// TESTS
// =============================================================================
