//! Ephemeral triangles used while walking a triangulation.
//!
//! A [`Triangle`] caches the half-plane equation of each side so that
//! containment tests and the choice of the side to cross are O(1).  The
//! signed side distances are normalised to the distance of the opposite
//! vertex, which makes them directly usable as barycentric weights.
//!
//! A flat triangle has no such normalisation.  Its distances are left
//! unnormalised, which keeps their signs and still points a walk across the
//! right side.

use crate::geometry::point::Point;
use crate::geometry::predicates::is_flat;

/// Normalised side distance down to which a point still counts as inside.
///
/// Absorbs the rounding of side equations evaluated exactly at a vertex,
/// where neighbouring triangles would otherwise both reject the point.
pub const EDGE_TOLERANCE: f64 = 1e-12;

/// Half-plane equation of one triangle side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriangleSide {
    centre: Point,
    outer_normal: Point,
    norm: f64,
}

impl TriangleSide {
    /// Side from `from` to `to` of a counter-clockwise triangle whose third
    /// vertex is `opposite`.
    #[inline]
    #[must_use]
    pub fn new(from: Point, to: Point, opposite: Point) -> Self {
        let centre = from.midpoint(to);
        let outer_normal = Point::new(to.y - from.y, from.x - to.x);
        let norm = (opposite - centre).dot(outer_normal);
        Self {
            centre,
            outer_normal,
            norm,
        }
    }

    /// Signed distance of `pt` from the side: positive inside, 1 at the
    /// opposite vertex, negative outside.
    #[inline]
    #[must_use]
    pub fn distance(&self, pt: Point) -> f64 {
        (pt - self.centre).dot(self.outer_normal) / self.norm
    }

    /// Unnormalised signed distance, positive on the inner side of a
    /// counter-clockwise triangle.
    #[inline]
    #[must_use]
    pub fn offset(&self, pt: Point) -> f64 {
        -(pt - self.centre).dot(self.outer_normal)
    }
}

/// One of the three sides of a [`Triangle`], named by the opposite vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// Side `b`–`c`.
    A,
    /// Side `c`–`a`.
    B,
    /// Side `a`–`b`.
    C,
}

/// A counter-clockwise triangle with precomputed side equations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    /// Vertex ids `a`, `b`, `c` in counter-clockwise order.
    pub ids: [usize; 3],
    vertices: [Point; 3],
    sides: [TriangleSide; 3],
    distances: [f64; 3],
    flat: bool,
}

impl Triangle {
    /// Builds a triangle from vertex ids and their positions, which must be in
    /// counter-clockwise order.
    #[must_use]
    pub fn new(ids: [usize; 3], vertices: [Point; 3]) -> Self {
        let [a, b, c] = vertices;
        Self {
            ids,
            vertices,
            sides: [
                TriangleSide::new(b, c, a),
                TriangleSide::new(c, a, b),
                TriangleSide::new(a, b, c),
            ],
            distances: [0.0; 3],
            flat: is_flat(a, b, c),
        }
    }

    /// Returns `true` for a triangle too flat to normalise its distances.
    #[inline]
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.flat
    }

    /// Vertex positions in counter-clockwise order.
    #[inline]
    #[must_use]
    pub const fn vertices(&self) -> [Point; 3] {
        self.vertices
    }

    /// Side distances computed by the last [`Triangle::contains`] call.
    #[inline]
    #[must_use]
    pub const fn distances(&self) -> [f64; 3] {
        self.distances
    }

    /// Tests whether `pt` lies inside or on the triangle, up to
    /// [`EDGE_TOLERANCE`].
    ///
    /// All three distances are always evaluated; the caller inspects them to
    /// decide where to move when the point is outside.  A flat triangle
    /// contains only points on its line.
    pub fn contains(&mut self, pt: Point) -> bool {
        for (distance, side) in self.distances.iter_mut().zip(&self.sides) {
            *distance = if self.flat {
                side.offset(pt)
            } else {
                side.distance(pt)
            };
        }
        self.distances.iter().all(|&d| d >= -EDGE_TOLERANCE)
    }

    /// The most violated side for the last query.
    #[must_use]
    pub fn most_violated_side(&self) -> Side {
        let [da, db, dc] = self.distances;
        if da <= db {
            if da <= dc { Side::A } else { Side::C }
        } else if db <= dc {
            Side::B
        } else {
            Side::C
        }
    }

    /// Barycentric blend of per-vertex values using the last query's
    /// distances.
    #[must_use]
    pub fn blend(&self, values: [f64; 3]) -> f64 {
        let [da, db, dc] = self.distances;
        (da * values[0] + db * values[1] + dc * values[2]) / (da + db + dc)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_triangle() -> Triangle {
        Triangle::new(
            [0, 1, 2],
            [
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(0.0, 1.0),
            ],
        )
    }

    #[test]
    fn side_distance_is_normalised_to_opposite_vertex() {
        let side = TriangleSide::new(Point::new(1.0, 0.0), Point::new(0.0, 1.0), Point::new(0.0, 0.0));
        assert_relative_eq!(side.distance(Point::new(0.0, 0.0)), 1.0);
        assert_relative_eq!(side.distance(Point::new(0.5, 0.5)), 0.0);
        assert!(side.distance(Point::new(1.0, 1.0)) < 0.0);
    }

    #[test]
    fn containment_and_barycentric_weights() {
        let mut triangle = unit_triangle();
        assert!(triangle.contains(Point::new(0.25, 0.25)));
        let [da, db, dc] = triangle.distances();
        assert_relative_eq!(da, 0.5, epsilon = 1e-15);
        assert_relative_eq!(db, 0.25, epsilon = 1e-15);
        assert_relative_eq!(dc, 0.25, epsilon = 1e-15);
        assert_relative_eq!(triangle.blend([0.0, 1.0, 2.0]), 0.75, epsilon = 1e-15);
    }

    #[test]
    fn points_on_edges_are_contained() {
        let mut triangle = unit_triangle();
        assert!(triangle.contains(Point::new(0.5, 0.0)));
        assert!(triangle.contains(Point::new(0.5, 0.5)));
        assert!(triangle.contains(Point::new(0.0, 0.0)));
        assert!(triangle.contains(Point::new(0.5, -1e-15)));
        assert!(!triangle.contains(Point::new(0.5, -1e-9)));
    }

    #[test]
    fn most_violated_side_points_towards_query() {
        let mut triangle = unit_triangle();
        assert!(!triangle.contains(Point::new(2.0, 2.0)));
        assert_eq!(triangle.most_violated_side(), Side::A);
        assert!(!triangle.contains(Point::new(-1.0, 0.2)));
        assert_eq!(triangle.most_violated_side(), Side::B);
        assert!(!triangle.contains(Point::new(0.2, -1.0)));
        assert_eq!(triangle.most_violated_side(), Side::C);
    }

    #[test]
    fn flat_triangle_still_orients_the_walk() {
        // Two coincident corners, as left by equal circumcentres.
        let corner = Point::new(1.0, 1.0);
        let mut triangle = Triangle::new([0, 1, 2], [Point::new(0.0, 0.0), corner, corner]);
        assert!(triangle.is_flat());
        assert!(!unit_triangle().is_flat());

        assert!(!triangle.contains(Point::new(2.0, 0.0)));
        assert!(triangle.distances().iter().all(|d| d.is_finite()));
        assert_eq!(triangle.most_violated_side(), Side::C);
        assert!(!triangle.contains(Point::new(0.0, 2.0)));
        assert_eq!(triangle.most_violated_side(), Side::B);
        assert!(triangle.contains(Point::new(0.5, 0.5)));
    }
}
