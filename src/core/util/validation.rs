//! Structural checks of a finished Delaunay graph.
//!
//! A planar triangulation with `v` points, `h` edges, `t` triangles and `b`
//! hull points satisfies `t = h − (v − 1)` and `b = 3(v − 1) − h`.  These
//! helpers check those identities together with link symmetry and the
//! counter-clockwise order of every fan.

use crate::core::adjacency::Csr;
use crate::core::collections::{PointId, next_neighbour};
use crate::core::triangulation::TriangulationError;
use crate::geometry::point::Point;
use crate::geometry::predicates::{polar_angle, signed_area2};

// =============================================================================
// TRIANGLES
// =============================================================================

/// Iterates over the counter-clockwise triangles of a Delaunay graph, each
/// listed once starting from its lowest id.
pub fn delaunay_triangles<'a>(
    csr: &'a Csr,
    points: &'a [Point],
) -> impl Iterator<Item = [PointId; 3]> + 'a {
    csr.blocks().flat_map(move |(i, fan)| {
        (0..fan.len()).filter_map(move |k| {
            let (j, l) = (fan[k], next_neighbour(fan, k));
            (j > i
                && l > i
                && csr.block(j).contains(&l)
                && signed_area2(points[i], points[j], points[l]) > 0.0)
                .then_some([i, j, l])
        })
    })
}

// =============================================================================
// CHECKS
// =============================================================================

/// Every link must be recorded on both ends and never point to itself.
///
/// # Errors
///
/// Returns [`TriangulationError::ReflexivityViolation`] for the first
/// offending pair.
pub fn check_reflexivity(csr: &Csr) -> Result<(), TriangulationError> {
    for (point, fan) in csr.blocks() {
        for &neighbour in fan {
            if neighbour == point || !csr.block(neighbour).contains(&point) {
                return Err(TriangulationError::ReflexivityViolation { point, neighbour });
            }
        }
    }
    Ok(())
}

/// Every fan must be sorted by strictly increasing direction angle.
///
/// # Errors
///
/// Returns [`TriangulationError::CombinatorialMismatch`] naming the point
/// whose fan is out of order; `found` is the position of the first neighbour
/// that breaks the order.
pub fn check_angular_order(csr: &Csr, points: &[Point]) -> Result<(), TriangulationError> {
    for (i, fan) in csr.blocks() {
        let origin = points[i];
        for k in 1..fan.len() {
            if polar_angle(origin, points[fan[k - 1]]) >= polar_angle(origin, points[fan[k]]) {
                return Err(TriangulationError::CombinatorialMismatch {
                    what: format!("counter-clockwise order of the neighbours of point {i}"),
                    expected: fan.len(),
                    found: k,
                });
            }
        }
    }
    Ok(())
}

/// Checks the edge/triangle/hull identities.
///
/// # Errors
///
/// Returns [`TriangulationError::CombinatorialMismatch`] when the triangle
/// count differs from `h − (v − 1)` or fewer than three hull points remain.
pub fn check_identities(csr: &Csr, points: &[Point]) -> Result<(), TriangulationError> {
    let v = points.len();
    if v < 3 {
        return Ok(());
    }
    let h = csr.nsize() / 2;
    let found = delaunay_triangles(csr, points).count();
    let expected = h.checked_sub(v - 1).unwrap_or(0);
    if found != expected || expected == 0 {
        return Err(TriangulationError::CombinatorialMismatch {
            what: "triangles".to_string(),
            expected,
            found,
        });
    }
    let hull = (3 * (v - 1)).checked_sub(h).unwrap_or(0);
    if hull < 3 {
        return Err(TriangulationError::CombinatorialMismatch {
            what: "hull points".to_string(),
            expected: 3,
            found: hull,
        });
    }
    Ok(())
}

/// Runs every check.
///
/// # Errors
///
/// Returns the first failure of [`check_reflexivity`],
/// [`check_angular_order`] or [`check_identities`].
pub fn validate_delaunay_graph(csr: &Csr, points: &[Point]) -> Result<(), TriangulationError> {
    check_reflexivity(csr)?;
    check_angular_order(csr, points)?;
    check_identities(csr, points)
}

// =============================================================================
// TESTS
// =============================================================================
