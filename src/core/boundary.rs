//! Convex hull extraction from a finished Delaunay graph.
//!
//! The leftmost point is always on the hull and its first neighbour (lowest
//! direction angle) is the next hull point counter-clockwise.  From then on,
//! the next hull point is the neighbour following the previous hull point in
//! the current point's fan.

use crate::core::adjacency::Csr;
use crate::core::collections::{PointId, find_neighbour, next_neighbour};
use crate::core::triangulation::TriangulationError;
use crate::geometry::point::Point;

/// Hull points in counter-clockwise order and the reverse lookup.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Boundary {
    points: Vec<PointId>,
    index: Vec<Option<usize>>,
}

impl Boundary {
    /// Walks the hull of the Delaunay graph `csr` over `points`.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::CombinatorialMismatch`] when the walk
    /// does not close after exactly `3(v − 1) − h` points, `h` being the edge
    /// count, or a hull point's fan does not list its predecessor.
    pub fn find(csr: &Csr, points: &[Point]) -> Result<Self, TriangulationError> {
        let n = points.len();
        let mut boundary = Self {
            points: Vec::new(),
            index: vec![None; n],
        };
        if n == 0 {
            return Ok(boundary);
        }

        let expected = (3 * (n - 1)).checked_sub(csr.nsize() / 2).ok_or_else(|| {
            TriangulationError::CombinatorialMismatch {
                what: "edges of a planar triangulation".to_string(),
                expected: 3 * (n - 1),
                found: csr.nsize() / 2,
            }
        })?;

        let mut start = 0;
        for (i, pt) in points.iter().enumerate().skip(1) {
            if pt.x < points[start].x {
                start = i;
            }
        }
        boundary.push(start);
        if n == 1 {
            return Ok(boundary);
        }

        let Some(&second) = csr.block(start).first() else {
            return Err(mismatch(expected, boundary.len()));
        };
        boundary.push(second);
        if n == 2 {
            return Ok(boundary);
        }

        let mut current = second;
        loop {
            let previous = boundary.points[boundary.len() - 2];
            let fan = csr.block(current);
            let pos = find_neighbour(fan, previous)
                .ok_or_else(|| mismatch(expected, boundary.len()))?;
            let next = next_neighbour(fan, pos);
            if next == start {
                break;
            }
            if boundary.len() == expected || boundary.index[next].is_some() {
                return Err(mismatch(expected, boundary.len() + 1));
            }
            boundary.push(next);
            current = next;
        }

        if boundary.len() != expected {
            return Err(mismatch(expected, boundary.len()));
        }
        Ok(boundary)
    }

    fn push(&mut self, id: PointId) {
        self.index[id] = Some(self.points.len());
        self.points.push(id);
    }

    /// Number of hull points.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` when there is no hull.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Hull point ids in counter-clockwise order, starting at the leftmost.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[PointId] {
        &self.points
    }

    /// Position of `id` in the hull sequence, or `None` for interior points.
    #[inline]
    #[must_use]
    pub fn position_of(&self, id: PointId) -> Option<usize> {
        self.index.get(id).copied().flatten()
    }

    /// Per-point hull positions (`None` for interior points).
    #[inline]
    #[must_use]
    pub fn index(&self) -> &[Option<usize>] {
        &self.index
    }

    /// Hull point after position `k`.
    #[inline]
    #[must_use]
    pub fn next(&self, k: usize) -> PointId {
        self.points[(k + 1) % self.len()]
    }

    /// Hull point before position `k`.
    #[inline]
    #[must_use]
    pub fn prev(&self, k: usize) -> PointId {
        self.points[(k + self.len() - 1) % self.len()]
    }

    /// Returns `true` when `b` directly follows `a` along the hull.
    #[must_use]
    pub fn is_side(&self, a: PointId, b: PointId) -> bool {
        self.position_of(a)
            .is_some_and(|k| self.position_of(b).is_some() && self.next(k) == b)
    }
}

fn mismatch(expected: usize, found: usize) -> TriangulationError {
    TriangulationError::CombinatorialMismatch {
        what: "boundary length".to_string(),
        expected,
        found,
    }
}

// =============================================================================
// TESTS
// =============================================================================
