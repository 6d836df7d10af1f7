//! Angular neighbourhood of a single point.
//!
//! A [`WorkSpace`] holds the candidate neighbours of a fixed origin sorted by
//! polar angle.  Every candidate owns the perpendicular bisector of the
//! segment origin–candidate; `tprev` and `tnext` are the counter-clockwise
//! parameters where that line meets the bisectors of the angular neighbours.
//! A candidate whose line segment has collapsed (`tnext < tprev`) is shadowed
//! and no longer a Delaunay neighbour of the origin.

use crate::core::collections::PointId;
use crate::geometry::point::Point;
use crate::geometry::predicates::ccw_angle_convex;
use std::f64::consts::PI;

/// Relative tolerance used when comparing intersection times.
///
/// Cocircular configurations produce exactly equal times in exact arithmetic.
/// Within this tolerance the existing edges win: a tied candidate is not
/// inserted and a tied neighbour is not removed, so the fans on both sides of
/// a cocircular quadrilateral agree on one diagonal.
pub const TIE_TOLERANCE: f64 = 1e-10;

/// Angle difference below which two candidates lie in the same direction.
pub const ANGLE_TOLERANCE: f64 = 1e-12;

/// Outcome of [`WorkSpace::try_to_add_point`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// The candidate became a neighbour (possibly shadowing others).
    Added,
    /// The candidate took the place of a neighbour that lies in the same
    /// direction but farther away.
    Replaced,
    /// The candidate is shadowed by the existing fan; nothing changed.
    Rejected,
    /// The candidate coincides with the origin; the workspace was cleared.
    Coincident,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct WorkSpacePoint {
    r: f64,
    phi: f64,
    tprev: f64,
    tnext: f64,
    id: PointId,
}

impl WorkSpacePoint {
    /// Polar coordinates of `pt` around `origin`; `None` if they coincide.
    fn relative_to(origin: Point, id: PointId, pt: Point) -> Option<Self> {
        let d = pt - origin;
        let r = d.norm();
        if r == 0.0 {
            return None;
        }
        // Lines start open-ended.
        Some(Self {
            r,
            phi: d.y.atan2(d.x),
            tprev: -f64::MAX,
            tnext: f64::MAX,
            id,
        })
    }
}

/// Intersection times of the bisector lines of `p` and `q`, where `q` follows
/// `p` counter-clockwise.  Returns (`p.tnext`, `q.tprev`).
///
/// Lines that do not meet on the counter-clockwise side, including exactly
/// opposite directions, stay open-ended.
fn intersection_times(p: &WorkSpacePoint, q: &WorkSpacePoint) -> (f64, f64) {
    let dphi = (q.phi - p.phi).rem_euclid(2.0 * PI);
    if !(dphi > 0.0 && dphi < PI) {
        return (f64::MAX, -f64::MAX);
    }
    let (sdphi, cdphi) = dphi.sin_cos();
    (
        (q.r - p.r * cdphi) / sdphi,
        (q.r * cdphi - p.r) / sdphi,
    )
}

fn same_direction(a: f64, b: f64) -> bool {
    let d = (b - a).rem_euclid(2.0 * PI);
    d <= ANGLE_TOLERANCE || d >= 2.0 * PI - ANGLE_TOLERANCE
}

/// The angular neighbourhood of one origin point.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkSpace {
    origin: Point,
    data: Vec<WorkSpacePoint>,
}

impl WorkSpace {
    /// Creates an empty workspace around `origin`.
    #[must_use]
    pub fn new(origin: Point) -> Self {
        Self {
            origin,
            data: Vec::with_capacity(32),
        }
    }

    /// Empties the workspace and moves it to a new origin.
    pub fn reset(&mut self, origin: Point) {
        self.origin = origin;
        self.data.clear();
    }

    /// Number of neighbours.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` when there are no neighbours.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Neighbour ids in counter-clockwise order.
    pub fn ids(&self) -> impl ExactSizeIterator<Item = PointId> + '_ {
        self.data.iter().map(|w| w.id)
    }

    /// Rebuilds the workspace from an already angle-sorted neighbour list.
    pub fn construct(&mut self, origin: Point, neighbours: &[PointId], points: &[Point]) {
        self.reset(origin);
        self.data.extend(
            neighbours
                .iter()
                .filter_map(|&id| WorkSpacePoint::relative_to(origin, id, points[id])),
        );
        let len = self.data.len();
        if len < 2 {
            return;
        }
        for j in 0..len {
            let k = (j + 1) % len;
            let (tnext, tprev) = intersection_times(&self.data[j], &self.data[k]);
            self.data[j].tnext = tnext;
            self.data[k].tprev = tprev;
        }
    }

    /// Offers point `id` as a neighbour of the origin.
    ///
    /// A coincident candidate clears the workspace.  A shadowed candidate is
    /// rejected without touching the fan.  An accepted candidate is inserted
    /// and then the neighbours it shadows are removed, alternating forward and
    /// backward until two consecutive checks remove nothing.
    pub fn try_to_add_point(&mut self, id: PointId, points: &[Point]) -> Insertion {
        let Some(mut x) = WorkSpacePoint::relative_to(self.origin, id, points[id]) else {
            self.data.clear();
            return Insertion::Coincident;
        };

        if self.data.is_empty() {
            self.data.push(x);
            return Insertion::Added;
        }

        let len = self.data.len();
        let i = self
            .data
            .iter()
            .position(|w| x.phi <= w.phi)
            .unwrap_or(len);
        let inext = i % len;
        let iprev = (inext + len - 1) % len;

        // A nearer point in the same direction lies on the segment to the
        // farther one, inside every circle through the origin and it.
        for k in [inext, iprev] {
            if same_direction(self.data[k].phi, x.phi) {
                if x.r >= self.data[k].r {
                    return Insertion::Rejected;
                }
                self.replace(k, x);
                return Insertion::Replaced;
            }
        }

        if len == 1 {
            return self.add_second_point(x);
        }
        if !self.to_be_inserted(iprev, &mut x, inext) {
            return Insertion::Rejected;
        }

        self.data.insert(i, x);
        self.remove_shadowed(i);
        Insertion::Added
    }

    /// Puts `x` in the slot of neighbour `k` and removes what it shadows.
    fn replace(&mut self, k: usize, mut x: WorkSpacePoint) {
        let len = self.data.len();
        if len < 2 {
            self.data[k] = x;
            return;
        }
        let ip = (k + len - 1) % len;
        let iq = (k + 1) % len;
        let (tp, tx) = intersection_times(&self.data[ip], &x);
        self.data[ip].tnext = tp;
        x.tprev = tx;
        let (tx, tq) = intersection_times(&x, &self.data[iq]);
        x.tnext = tx;
        self.data[iq].tprev = tq;
        self.data[k] = x;
        self.remove_shadowed(k);
    }

    /// The second neighbour is always accepted; same-direction candidates
    /// have been handled by the caller.
    fn add_second_point(&mut self, mut x: WorkSpacePoint) -> Insertion {
        let p = &mut self.data[0];
        let ahead = ccw_angle_convex(p.phi, x.phi);
        if ahead {
            let (tp, tx) = intersection_times(p, &x);
            p.tnext = tp;
            x.tprev = tx;
        } else {
            let (tx, tp) = intersection_times(&x, p);
            x.tnext = tx;
            p.tprev = tp;
        }
        let p_phi = p.phi;
        let at = usize::from(x.phi > p_phi);
        self.data.insert(at, x);
        Insertion::Added
    }

    fn tolerance(&self, a: usize, x: &WorkSpacePoint, b: usize) -> f64 {
        TIE_TOLERANCE * (self.data[a].r + x.r + self.data[b].r)
    }

    /// Decides whether `x` belongs between `iprev` and `inext`, updating the
    /// intersection times when it does.
    ///
    /// A tie within [`TIE_TOLERANCE`] rejects `x`, except where both lines
    /// stay open-ended.
    fn to_be_inserted(&mut self, iprev: usize, x: &mut WorkSpacePoint, inext: usize) -> bool {
        let tol = self.tolerance(iprev, x, inext);
        let (tp, txprev) = intersection_times(&self.data[iprev], x);
        let (txnext, tq) = intersection_times(x, &self.data[inext]);
        x.tprev = txprev;
        x.tnext = txnext;

        let p_tnext = self.data[iprev].tnext;
        let q_tprev = self.data[inext].tprev;
        let before_p = tp < p_tnext - tol || (tp == f64::MAX && p_tnext == f64::MAX);
        let after_q = tq > q_tprev + tol || (tq == -f64::MAX && q_tprev == -f64::MAX);
        if before_p && after_q {
            self.data[iprev].tnext = tp;
            self.data[inext].tprev = tq;
            return true;
        }
        false
    }

    /// Returns `true` if `ix` is shadowed by `ip` and `iq`; the times of the
    /// latter two are then joined.
    fn to_be_removed(&mut self, ip: usize, ix: usize, iq: usize) -> bool {
        let x = self.data[ix];
        let tol = self.tolerance(ip, &x, iq);
        if x.tnext >= x.tprev - tol {
            return false;
        }
        let (tp, tq) = intersection_times(&self.data[ip], &self.data[iq]);
        self.data[ip].tnext = tp;
        self.data[iq].tprev = tq;
        true
    }

    fn remove_shadowed(&mut self, mut i: usize) {
        let mut not_removed = 0;
        while self.data.len() > 2 {
            let len = self.data.len();
            let inext = (i + 1) % len;
            let ifar = (inext + 1) % len;
            if self.to_be_removed(i, inext, ifar) {
                self.data.remove(inext);
                if i > inext {
                    i -= 1;
                }
                not_removed = 0;
            } else {
                not_removed += 1;
                if not_removed == 2 {
                    break;
                }
            }

            let len = self.data.len();
            if len <= 2 {
                break;
            }
            let iprev = (i + len - 1) % len;
            let ifar = (iprev + len - 1) % len;
            if self.to_be_removed(ifar, iprev, i) {
                self.data.remove(iprev);
                if i > iprev {
                    i -= 1;
                }
                not_removed = 0;
            } else {
                not_removed += 1;
                if not_removed == 2 {
                    break;
                }
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(workspace: &WorkSpace) -> Vec<PointId> {
        workspace.ids().collect()
    }

    #[test]
    fn opposite_directions_are_open_ended() {
        let p = WorkSpacePoint::relative_to(Point::default(), 0, Point::new(1.0, 0.0)).unwrap();
        let q = WorkSpacePoint::relative_to(Point::default(), 1, Point::new(-1.0, 0.0)).unwrap();
        assert_eq!(intersection_times(&p, &q), (f64::MAX, -f64::MAX));
        assert_eq!(intersection_times(&q, &p), (f64::MAX, -f64::MAX));
    }

    #[test]
    fn perpendicular_neighbours_meet_at_corner() {
        let origin = Point::default();
        let p = WorkSpacePoint::relative_to(origin, 0, Point::new(2.0, 0.0)).unwrap();
        let q = WorkSpacePoint::relative_to(origin, 1, Point::new(0.0, 2.0)).unwrap();
        // Both bisectors pass through (1, 1): one unit along each line, doubled.
        let (tp, tq) = intersection_times(&p, &q);
        approx::assert_relative_eq!(tp, 2.0, epsilon = 1e-12);
        approx::assert_relative_eq!(tq, -2.0, epsilon = 1e-12);
    }

    #[test]
    fn far_point_behind_neighbour_is_rejected() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, -0.1),
            Point::new(3.0, 0.1),
        ];
        let mut workspace = WorkSpace::new(points[0]);
        for id in 1..4 {
            assert_eq!(workspace.try_to_add_point(id, &points), Insertion::Added);
        }
        assert_eq!(workspace.try_to_add_point(4, &points), Insertion::Rejected);
        assert_eq!(workspace.len(), 3);
    }

    #[test]
    fn near_point_shadows_existing_neighbour() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, -1.0),
            Point::new(4.0, 0.0),
            Point::new(1.0, 0.0),
        ];
        let mut workspace = WorkSpace::new(points[0]);
        for id in 1..4 {
            assert_eq!(workspace.try_to_add_point(id, &points), Insertion::Added);
        }
        assert!(ids(&workspace).contains(&3));

        assert_eq!(workspace.try_to_add_point(4, &points), Insertion::Added);
        let fan = ids(&workspace);
        assert!(fan.contains(&4));
        assert!(!fan.contains(&3), "far point must be shadowed: {fan:?}");
    }

    #[test]
    fn fan_is_angle_sorted() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(-1.0, 1.0),
            Point::new(-1.0, -1.0),
            Point::new(1.0, -1.0),
        ];
        let mut workspace = WorkSpace::new(points[0]);
        for id in [3, 1, 4, 2] {
            assert_eq!(workspace.try_to_add_point(id, &points), Insertion::Added);
        }
        // atan2 order: (-1,-1), (1,-1), (1,1), (-1,1).
        assert_eq!(ids(&workspace), vec![3, 4, 1, 2]);
    }

    #[test]
    fn second_point_in_same_direction_keeps_nearer() {
        let points = [Point::new(0.0, 0.0), Point::new(2.0, 2.0), Point::new(1.0, 1.0)];
        let mut workspace = WorkSpace::new(points[0]);
        workspace.try_to_add_point(1, &points);
        assert_eq!(workspace.try_to_add_point(2, &points), Insertion::Replaced);
        assert_eq!(ids(&workspace), vec![2]);
        assert_eq!(workspace.try_to_add_point(1, &points), Insertion::Rejected);
    }

    #[test]
    fn nearer_collinear_point_replaces_neighbour() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(3.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(-1.0, -1.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 1e-14),
        ];
        let mut workspace = WorkSpace::new(points[0]);
        for id in 1..4 {
            assert_eq!(workspace.try_to_add_point(id, &points), Insertion::Added);
        }
        assert_eq!(workspace.try_to_add_point(4, &points), Insertion::Replaced);
        let fan = ids(&workspace);
        assert_eq!(fan.len(), 3);
        assert!(fan.contains(&4) && !fan.contains(&1), "{fan:?}");

        // Off the axis by far less than the angle tolerance.
        assert_eq!(workspace.try_to_add_point(5, &points), Insertion::Rejected);
        assert_eq!(ids(&workspace), fan);
    }

    #[test]
    fn cocircular_candidate_keeps_existing_edges() {
        // The corners of a square share one circle; the diagonal 1–3 was
        // there first.
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 1.0),
        ];
        let mut workspace = WorkSpace::new(points[0]);
        assert_eq!(workspace.try_to_add_point(1, &points), Insertion::Added);
        assert_eq!(workspace.try_to_add_point(3, &points), Insertion::Added);
        assert_eq!(workspace.try_to_add_point(2, &points), Insertion::Rejected);
        assert_eq!(ids(&workspace), vec![1, 3]);

        // Seen from a corner on the diagonal, the opposite corner is a
        // neighbour and stays one.
        let mut workspace = WorkSpace::new(points[1]);
        for id in [2, 3, 0] {
            assert_eq!(workspace.try_to_add_point(id, &points), Insertion::Added);
        }
        assert_eq!(workspace.len(), 3);
    }

    #[test]
    fn coincident_candidate_clears_workspace() {
        let points = [Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(0.0, 0.0)];
        let mut workspace = WorkSpace::new(points[0]);
        workspace.try_to_add_point(1, &points);
        assert_eq!(workspace.try_to_add_point(2, &points), Insertion::Coincident);
        assert!(workspace.is_empty());
    }

    #[test]
    fn construct_matches_incremental_build() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.2),
            Point::new(-0.3, 1.0),
            Point::new(-0.8, -0.7),
            Point::new(0.6, -0.9),
        ];
        let mut incremental = WorkSpace::new(points[0]);
        for id in 1..points.len() {
            incremental.try_to_add_point(id, &points);
        }
        let fan = ids(&incremental);

        let mut rebuilt = WorkSpace::default();
        rebuilt.construct(points[0], &fan, &points);
        assert_eq!(rebuilt, incremental);
    }
}
