//! Planar point types accepted by the triangulation.
//!
//! The triangulation only ever reads `x`, `y` and, for interpolation, an
//! optional value `z`.  Callers can hand in any record implementing
//! [`PlanarPoint`]; the crate provides [`Point`], [`PointXYZ`] and the
//! payload-carrying [`DataPoint`] plus implementations for plain tuples and
//! arrays.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// A point in the plane.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::geometry::point::Point;
///
/// let p = Point::new(1.0, 2.0);
/// let q = Point::new(4.0, 6.0);
/// assert_eq!((q - p).norm(), 5.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point from its coordinates.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns `true` when both coordinates are finite.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Scalar product with another vector.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the cross product with another vector.
    #[inline]
    #[must_use]
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Euclidean length.
    #[inline]
    #[must_use]
    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Squared Euclidean length.
    #[inline]
    #[must_use]
    pub fn norm_squared(self) -> f64 {
        self.dot(self)
    }

    /// Midpoint of the segment between `self` and `other`.
    #[inline]
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    /// Lexicographic (x, then y) comparison key.
    #[inline]
    #[must_use]
    pub(crate) fn lexicographic_lt(self, other: Self) -> bool {
        self.x < other.x || (self.x == other.x && self.y < other.y)
    }
}

impl Add for Point {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

/// A point carrying a scalar value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointXYZ {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Value sampled at (`x`, `y`).
    pub z: f64,
}

impl PointXYZ {
    /// Creates a valued point.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar location of the point.
    #[inline]
    #[must_use]
    pub const fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A caller record with an optional value and an arbitrary payload.
///
/// The payload is never inspected; it rides along so callers do not have to
/// split their records before triangulating.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::geometry::point::{DataPoint, PlanarPoint};
///
/// let p = DataPoint::new(0.5, 1.5, Some(3.0), "station-7");
/// assert_eq!(p.z(), Some(3.0));
/// assert_eq!(p.payload, "station-7");
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DataPoint<T> {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
    /// Optional value sampled at (`x`, `y`).
    #[serde(default)]
    pub z: Option<f64>,
    /// Opaque caller data.
    pub payload: T,
}

impl<T> DataPoint<T> {
    /// Creates a record.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: Option<f64>, payload: T) -> Self {
        Self { x, y, z, payload }
    }
}

/// Anything that can be triangulated: a location and an optional value.
pub trait PlanarPoint {
    /// Horizontal coordinate.
    fn x(&self) -> f64;

    /// Vertical coordinate.
    fn y(&self) -> f64;

    /// Value used by interpolation, if the record has one.
    fn z(&self) -> Option<f64> {
        None
    }

    /// Planar location.
    fn xy(&self) -> Point {
        Point::new(self.x(), self.y())
    }
}

impl PlanarPoint for Point {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl PlanarPoint for PointXYZ {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn z(&self) -> Option<f64> {
        Some(self.z)
    }
}

impl<T> PlanarPoint for DataPoint<T> {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }

    fn z(&self) -> Option<f64> {
        self.z
    }
}

impl PlanarPoint for (f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }

    fn y(&self) -> f64 {
        self.1
    }
}

impl PlanarPoint for (f64, f64, f64) {
    fn x(&self) -> f64 {
        self.0
    }

    fn y(&self) -> f64 {
        self.1
    }

    fn z(&self) -> Option<f64> {
        Some(self.2)
    }
}

impl PlanarPoint for [f64; 2] {
    fn x(&self) -> f64 {
        self[0]
    }

    fn y(&self) -> f64 {
        self[1]
    }
}

impl PlanarPoint for [f64; 3] {
    fn x(&self) -> f64 {
        self[0]
    }

    fn y(&self) -> f64 {
        self[1]
    }

    fn z(&self) -> Option<f64> {
        Some(self[2])
    }
}

impl<P: PlanarPoint + ?Sized> PlanarPoint for &P {
    fn x(&self) -> f64 {
        (**self).x()
    }

    fn y(&self) -> f64 {
        (**self).y()
    }

    fn z(&self) -> Option<f64> {
        (**self).z()
    }
}

// =============================================================================
// TESTS
// =============================================================================
