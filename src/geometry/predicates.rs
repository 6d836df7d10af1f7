//! Geometric predicates for planar triangulation.
//!
//! Angular tests used by the neighbourhood workspaces, orientation and
//! in-circle classification, circumcentres of Delaunay triangles and the
//! helpers used to find the hull side nearest to an outside query.

use crate::geometry::point::Point;
use std::f64::consts::{PI, TAU};
use thiserror::Error;

/// Relative size of a sine below which a triangle is treated as flat.
pub const SINGULAR_SINE: f64 = 1e-12;

/// Relative tolerance of the in-circle classification.
const IN_CIRCLE_TOLERANCE: f64 = 1e-12;

/// Represents the position of a point relative to a circumcircle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InCircle {
    /// The point is outside the circumcircle
    OUTSIDE,
    /// The point is on the circumcircle (within numerical tolerance)
    BOUNDARY,
    /// The point is inside the circumcircle
    INSIDE,
}

impl std::fmt::Display for InCircle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OUTSIDE => write!(f, "OUTSIDE"),
            Self::BOUNDARY => write!(f, "BOUNDARY"),
            Self::INSIDE => write!(f, "INSIDE"),
        }
    }
}

/// Represents the orientation of a triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Clockwise
    NEGATIVE,
    /// Collinear (within numerical tolerance)
    DEGENERATE,
    /// Counter-clockwise
    POSITIVE,
}

impl std::fmt::Display for Orientation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NEGATIVE => write!(f, "NEGATIVE"),
            Self::DEGENERATE => write!(f, "DEGENERATE"),
            Self::POSITIVE => write!(f, "POSITIVE"),
        }
    }
}

/// Errors from circumcentre computation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CircumcenterError {
    /// The triangle is not counter-clockwise at its first vertex.
    #[error("Triangle is not counter-clockwise at its first vertex")]
    NotCounterClockwise,
    /// The triangle is too flat for a meaningful circumcentre.
    #[error("Circumcentre determinant is numerically zero")]
    Singular,
}

/// Returns `true` when turning counter-clockwise from `phi1` to `phi2` takes
/// at most a half turn.
#[inline]
#[must_use]
pub fn ccw_angle_convex(phi1: f64, phi2: f64) -> bool {
    (phi2 - phi1).rem_euclid(TAU) <= PI
}

/// [`ccw_angle_convex`] that also accepts a turn of up to `tolerance`
/// radians past either end of the half turn.
#[inline]
#[must_use]
pub fn ccw_angle_convex_within(phi1: f64, phi2: f64, tolerance: f64) -> bool {
    let turn = (phi2 - phi1).rem_euclid(TAU);
    turn <= PI + tolerance || turn >= TAU - tolerance
}

/// Polar angle of `pt` as seen from `origin`, in (−π, π].
#[inline]
#[must_use]
pub fn polar_angle(origin: Point, pt: Point) -> f64 {
    (pt.y - origin.y).atan2(pt.x - origin.x)
}

/// Twice the signed area of triangle `a`, `b`, `c`; positive when counter-clockwise.
#[inline]
#[must_use]
pub fn signed_area2(a: Point, b: Point, c: Point) -> f64 {
    (b - a).cross(c - a)
}

/// Classifies the orientation of triangle `a`, `b`, `c`.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::geometry::point::Point;
/// use planar_delaunay::geometry::predicates::{Orientation, orientation};
///
/// let a = Point::new(0.0, 0.0);
/// let b = Point::new(1.0, 0.0);
/// assert_eq!(orientation(a, b, Point::new(0.0, 1.0)), Orientation::POSITIVE);
/// assert_eq!(orientation(a, b, Point::new(2.0, 0.0)), Orientation::DEGENERATE);
/// ```
#[must_use]
pub fn orientation(a: Point, b: Point, c: Point) -> Orientation {
    let ba = b - a;
    let ca = c - a;
    let area = ba.cross(ca);
    let scale = ba.norm() * ca.norm();
    if area.abs() <= SINGULAR_SINE * scale {
        Orientation::DEGENERATE
    } else if area > 0.0 {
        Orientation::POSITIVE
    } else {
        Orientation::NEGATIVE
    }
}

/// Returns `true` if `pt` lies on the right side of the line from `a` to `b`
/// (points on the line count as right).
#[inline]
#[must_use]
pub fn point_on_right_side(a: Point, b: Point, pt: Point) -> bool {
    let c = pt - a.midpoint(b);
    let v = b - a;
    c.x * v.y - c.y * v.x >= 0.0
}

/// Returns `true` unless `pt` lies clearly left of the line from `a` to `b`.
///
/// Unlike [`point_on_right_side`] the test is anchored at `a`, so a `pt`
/// equal to `a` or `b` is exactly on the line.  Turns with a sine below
/// [`SINGULAR_SINE`], relative to the longer of `b − a` and `pt − a`, count
/// as on the line.
#[inline]
#[must_use]
pub fn not_left_of(a: Point, b: Point, pt: Point) -> bool {
    let ab = b - a;
    let ap = pt - a;
    ab.cross(ap) <= SINGULAR_SINE * (ab.norm_squared() + ap.norm_squared())
}

/// Returns `true` when `a`, `b`, `c` is clockwise or too flat to orient.
///
/// Coincident circumcentres of cocircular Delaunay triangles make such
/// triangles in the combined Delaunay–Voronoi graph.
#[inline]
#[must_use]
pub fn is_flat(a: Point, b: Point, c: Point) -> bool {
    let ba = b - a;
    let ca = c - a;
    ba.cross(ca) <= SINGULAR_SINE * (ba.norm_squared() + ca.norm_squared())
}

/// Circumcentre of a triangle that is counter-clockwise at `a`.
///
/// The origin is shifted to `a` to keep the formula short.
///
/// # Errors
///
/// Returns [`CircumcenterError::NotCounterClockwise`] when the turn from `b`
/// to `c` around `a` is not strictly positive and
/// [`CircumcenterError::Singular`] when the triangle is numerically flat.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::geometry::point::Point;
/// use planar_delaunay::geometry::predicates::circumcenter;
///
/// let centre = circumcenter(
///     Point::new(0.0, 0.0),
///     Point::new(2.0, 0.0),
///     Point::new(0.0, 2.0),
/// )
/// .unwrap();
/// assert_eq!(centre, Point::new(1.0, 1.0));
/// ```
pub fn circumcenter(a: Point, b: Point, c: Point) -> Result<Point, CircumcenterError> {
    let ba = b - a;
    let ca = c - a;
    let area = ba.cross(ca);
    if area <= 0.0 {
        return Err(CircumcenterError::NotCounterClockwise);
    }
    if area <= SINGULAR_SINE * ba.norm() * ca.norm() {
        return Err(CircumcenterError::Singular);
    }

    let ba2 = ba.norm_squared();
    let ca2 = ca.norm_squared();
    let det = -2.0 * area;
    Ok(Point::new(
        a.x + (ba.y * ca2 - ca.y * ba2) / det,
        a.y + (ca.x * ba2 - ba.x * ca2) / det,
    ))
}

/// Classifies `d` against the circumcircle of the counter-clockwise triangle
/// `a`, `b`, `c`.
#[must_use]
pub fn in_circle(a: Point, b: Point, c: Point, d: Point) -> InCircle {
    let ad = a - d;
    let bd = b - d;
    let cd = c - d;
    let (a2, b2, c2) = (ad.norm_squared(), bd.norm_squared(), cd.norm_squared());

    let t1 = a2 * bd.cross(cd);
    let t2 = b2 * cd.cross(ad);
    let t3 = c2 * ad.cross(bd);
    let det = t1 + t2 + t3;
    let permanent = a2 * (bd.x * cd.y).abs().max((bd.y * cd.x).abs())
        + b2 * (cd.x * ad.y).abs().max((cd.y * ad.x).abs())
        + c2 * (ad.x * bd.y).abs().max((ad.y * bd.x).abs());

    if det.abs() <= IN_CIRCLE_TOLERANCE * permanent {
        InCircle::BOUNDARY
    } else if det > 0.0 {
        InCircle::INSIDE
    } else {
        InCircle::OUTSIDE
    }
}

/// Returns `true` when segments `a`–`b` and `c`–`d` cross at a point interior
/// to both.  Segments sharing an endpoint never cross.
#[must_use]
pub fn segments_cross(a: Point, b: Point, c: Point, d: Point) -> bool {
    if a == c || a == d || b == c || b == d {
        return false;
    }
    let strictly_opposite = |p: Point, q: Point, r: Point, s: Point| {
        let o1 = orientation(p, q, r);
        let o2 = orientation(p, q, s);
        matches!(
            (o1, o2),
            (Orientation::POSITIVE, Orientation::NEGATIVE)
                | (Orientation::NEGATIVE, Orientation::POSITIVE)
        )
    };
    strictly_opposite(a, b, c, d) && strictly_opposite(c, d, a, b)
}

/// Projection parameter of `pt` onto side `a`–`b`: a number in [−1, 1] means
/// within the side, smaller means behind `a`, larger means beyond `b`.
#[inline]
#[must_use]
pub fn side_intersection_distance(a: Point, b: Point, pt: Point) -> f64 {
    let c = pt - a.midpoint(b);
    let v = b - a;
    2.0 * c.dot(v) / v.norm_squared()
}

/// Intersection of the corner bisectors at `a` and `b` in the boundary
/// sequence `p`, `a`, `b`, `n`.
///
/// Returns `None` when the bisectors are (numerically) parallel, which happens
/// when the four points are collinear.
#[must_use]
pub fn find_side_section(p: Point, a: Point, b: Point, n: Point) -> Option<Point> {
    let unit = |v: Point| v * v.norm().recip();
    let pa = unit(a - p);
    let ab = unit(b - a);
    let bn = unit(n - b);

    let ma = pa + ab;
    let mb = ab + bn;
    let det = ma.cross(mb);
    if !det.is_finite() || det.abs() <= SINGULAR_SINE {
        return None;
    }

    let rhsa = a.dot(ma);
    let rhsb = b.dot(mb);
    Some(Point::new(
        (rhsa * mb.y - rhsb * ma.y) / det,
        (rhsb * ma.x - rhsa * mb.x) / det,
    ))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn convex_angles_wrap_around() {
        assert!(ccw_angle_convex(0.0, FRAC_PI_2));
        assert!(!ccw_angle_convex(FRAC_PI_2, 0.0));
        assert!(ccw_angle_convex(3.0, -3.0));
        assert!(ccw_angle_convex(0.0, PI));
        assert!(ccw_angle_convex(0.0, 0.0));
    }

    #[test]
    fn orientation_classification() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(orientation(a, b, Point::new(0.5, 1.0)), Orientation::POSITIVE);
        assert_eq!(orientation(a, b, Point::new(0.5, -1.0)), Orientation::NEGATIVE);
        assert_eq!(orientation(a, b, Point::new(7.0, 0.0)), Orientation::DEGENERATE);
        assert_eq!(Orientation::POSITIVE.to_string(), "POSITIVE");
    }

    #[test]
    fn right_side_test_includes_line() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!(point_on_right_side(a, b, Point::new(0.5, -1.0)));
        assert!(point_on_right_side(a, b, Point::new(3.0, 0.0)));
        assert!(!point_on_right_side(a, b, Point::new(0.5, 1.0)));
    }

    #[test]
    fn tolerant_side_and_angle_tests() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!(not_left_of(a, b, Point::new(0.5, -1.0)));
        assert!(not_left_of(a, b, b));
        assert!(not_left_of(a, b, Point::new(0.5, 1e-14)));
        assert!(!not_left_of(a, b, Point::new(0.5, 1e-6)));
        // Nearly coincident with `b`: the turn is measured against `b − a`.
        assert!(not_left_of(a, b, Point::new(1.0, 1e-16)));

        assert!(ccw_angle_convex_within(0.0, -1e-14, 1e-12));
        assert!(!ccw_angle_convex_within(0.0, -1e-10, 1e-12));
        assert!(ccw_angle_convex_within(0.0, PI + 1e-14, 1e-12));
    }

    #[test]
    fn flat_triangles() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert!(!is_flat(a, b, Point::new(0.0, 1.0)));
        assert!(is_flat(a, Point::new(0.0, 1.0), b));
        assert!(is_flat(a, b, b));
        assert!(is_flat(a, b, Point::new(1.0, 1e-15)));
        assert!(is_flat(a, b, Point::new(3.0, 0.0)));
    }

    #[test]
    fn circumcenter_of_right_triangle_is_hypotenuse_midpoint() {
        let centre =
            circumcenter(Point::new(1.0, 1.0), Point::new(4.0, 1.0), Point::new(1.0, 5.0))
                .unwrap();
        assert_relative_eq!(centre.x, 2.5, epsilon = 1e-12);
        assert_relative_eq!(centre.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn circumcenter_rejects_clockwise_and_flat() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        assert_eq!(
            circumcenter(a, Point::new(0.0, 1.0), b),
            Err(CircumcenterError::NotCounterClockwise)
        );
        assert_eq!(
            circumcenter(a, b, Point::new(2.0, 0.0)),
            Err(CircumcenterError::NotCounterClockwise)
        );
        assert_eq!(
            circumcenter(a, b, Point::new(2.0, 1e-14)),
            Err(CircumcenterError::Singular)
        );
    }

    #[test]
    fn in_circle_classification() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(1.0, 1.0);
        assert_eq!(in_circle(a, b, c, Point::new(0.5, 0.5)), InCircle::INSIDE);
        assert_eq!(in_circle(a, b, c, Point::new(0.0, 1.0)), InCircle::BOUNDARY);
        assert_eq!(in_circle(a, b, c, Point::new(-1.0, 2.0)), InCircle::OUTSIDE);
    }

    #[test]
    fn crossing_segments() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 1.0);
        let c = Point::new(1.0, 0.0);
        let d = Point::new(0.0, 1.0);
        assert!(segments_cross(a, b, c, d));
        assert!(!segments_cross(a, c, b, d));
        assert!(!segments_cross(a, b, a, d));
        assert!(!segments_cross(a, Point::new(2.0, 0.0), Point::new(1.0, 0.0), d));
    }

    #[test]
    fn side_distance_parameterisation() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(2.0, 0.0);
        assert_relative_eq!(side_intersection_distance(a, b, Point::new(0.0, 5.0)), -1.0);
        assert_relative_eq!(side_intersection_distance(a, b, Point::new(2.0, -5.0)), 1.0);
        assert_relative_eq!(side_intersection_distance(a, b, Point::new(1.0, 3.0)), 0.0);
        assert_relative_eq!(side_intersection_distance(a, b, Point::new(4.0, 0.0)), 3.0);
    }

    #[test]
    fn side_section_of_square_is_centre() {
        let origin = find_side_section(
            Point::new(0.0, 1.0),
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        )
        .unwrap();
        assert_relative_eq!(origin.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(origin.y, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn side_section_of_collinear_run_is_none() {
        assert!(
            find_side_section(
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(2.0, 0.0),
                Point::new(3.0, 0.0),
            )
            .is_none()
        );
    }
}
