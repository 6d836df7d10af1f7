//! Property-based tests for interpolation.
//!
//! - Round interpolation at an input point returns that point's value
//! - Round interpolation anywhere returns the value of a nearest input point,
//!   also on lattices where many Voronoi vertices coincide
//! - Linear interpolation reproduces planar data inside the hull
//! - Linear interpolation never leaves the range of the input values

use approx::relative_eq;
use planar_delaunay::prelude::*;
use proptest::prelude::*;
use std::collections::BTreeSet;

// =============================================================================
// TEST CONFIGURATION
// =============================================================================

/// Strategy for generating finite coordinates in a reasonable range
fn finite_coordinate() -> impl Strategy<Value = f64> {
    (-50.0..50.0).prop_filter("must be finite", |x: &f64| x.is_finite())
}

/// Strategy for generating valued points
fn valued_point() -> impl Strategy<Value = PointXYZ> {
    (finite_coordinate(), finite_coordinate(), -10.0..10.0_f64)
        .prop_map(|(x, y, z)| PointXYZ::new(x, y, z))
}

fn distinct(points: &[PointXYZ]) -> bool {
    let keys: BTreeSet<(u64, u64)> = points
        .iter()
        .map(|p| ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits()))
        .collect();
    keys.len() == points.len()
}

/// Strategy for a cloud of 3-120 distinct valued points
fn valued_cloud() -> impl Strategy<Value = Vec<PointXYZ>> {
    prop::collection::vec(valued_point(), 3..=120)
        .prop_filter("points must be distinct", |points| distinct(points))
}

/// Strategy for an `m × n` lattice whose values are the point indices
fn valued_lattice() -> impl Strategy<Value = Vec<PointXYZ>> {
    (2..=9_u32, 2..=9_u32, 0.5..20.0_f64, finite_coordinate(), finite_coordinate()).prop_map(
        |(m, n, step, x0, y0)| {
            (0..n)
                .flat_map(|j| (0..m).map(move |i| (i, j)))
                .zip(0_u32..)
                .map(|((i, j), k)| {
                    PointXYZ::new(x0 + step * f64::from(i), y0 + step * f64::from(j), f64::from(k))
                })
                .collect()
        },
    )
}

/// Strategy for plane coefficients `z = c0 + c1·x + c2·y`
fn plane() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(-3.0..3.0_f64)
}

/// Strategy for barycentric weights strictly inside a triangle
fn weights() -> impl Strategy<Value = [f64; 3]> {
    prop::array::uniform3(0.05..1.0_f64).prop_map(|[a, b, c]| {
        let sum = a + b + c;
        [a / sum, b / sum, c / sum]
    })
}

fn triangulated(points: &[PointXYZ]) -> Result<Triangulation, TestCaseError> {
    Triangulation::new(points).map_err(|err| {
        TestCaseError::fail(format!("triangulation of {} points failed: {err}", points.len()))
    })
}

/// Grid over the bounding box of `points`, widened by a quarter on each side.
fn covering_grid(points: &[PointXYZ], xres: usize, yres: usize) -> GridSpec {
    let (mut xmin, mut xmax, mut ymin, mut ymax) = (f64::MAX, -f64::MAX, f64::MAX, -f64::MAX);
    for p in points {
        xmin = xmin.min(p.x);
        xmax = xmax.max(p.x);
        ymin = ymin.min(p.y);
        ymax = ymax.max(p.y);
    }
    let (w, h) = (xmax - xmin, ymax - ymin);
    GridSpecBuilder::default()
        .xres(xres)
        .yres(yres)
        .xreal(1.5 * w)
        .yreal(1.5 * h)
        .xoff(xmin - 0.25 * w)
        .yoff(ymin - 0.25 * h)
        .build()
        .unwrap()
}

/// Checks that every value of a round-mode fill belongs to a nearest input
/// point of its sample; values are the point indices.
fn check_nearest(points: &[PointXYZ], grid: &GridSpec, data: &[f64]) -> Result<(), TestCaseError> {
    for i in 0..grid.yres {
        for j in 0..grid.xres {
            let q = grid.sample(i, j);
            let dist = |p: &PointXYZ| (p.x - q.x).hypot(p.y - q.y);
            let best = points.iter().map(dist).fold(f64::INFINITY, f64::min);
            let found = points.iter().find(|p| p.z == data[i * grid.xres + j]);
            prop_assert!(found.is_some(), "unknown value {} at {:?}", data[i * grid.xres + j], q);
            let d = found.map_or(f64::INFINITY, dist);
            prop_assert!(d <= best * (1.0 + 1e-9) + 1e-12, "{:?}: distance {} but nearest is {}", q, d, best);
        }
    }
    Ok(())
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn prop_round_is_exact_at_input_points(points in valued_cloud()) {
        let triangulation = triangulated(&points)?;
        for p in &points {
            let z = triangulation.interpolate_at(InterpolationType::Round, p.x, p.y);
            prop_assert_eq!(z, Ok(p.z));
        }
    }

    #[test]
    fn prop_round_on_lattices_picks_a_nearest_point(points in valued_lattice()) {
        let triangulation = triangulated(&points)?;
        for p in &points {
            let z = triangulation.interpolate_at(InterpolationType::Round, p.x, p.y);
            prop_assert_eq!(z, Ok(p.z));
        }
        let grid = covering_grid(&points, 17, 13);
        let data = triangulation.interpolate(InterpolationType::Round, &grid);
        prop_assert!(data.is_ok(), "round fill failed: {:?}", data);
        check_nearest(&points, &grid, &data.unwrap_or_default())?;
    }

    #[test]
    fn prop_round_on_clouds_picks_a_nearest_point(points in valued_cloud()) {
        let points: Vec<PointXYZ> = points
            .iter()
            .zip(0_u32..)
            .map(|(p, k)| PointXYZ::new(p.x, p.y, f64::from(k)))
            .collect();
        let triangulation = triangulated(&points)?;
        let grid = covering_grid(&points, 16, 16);
        let data = triangulation.interpolate(InterpolationType::Round, &grid);
        prop_assert!(data.is_ok(), "round fill failed: {:?}", data);
        check_nearest(&points, &grid, &data.unwrap_or_default())?;
    }

    #[test]
    fn prop_linear_fills_lattice_grids(points in valued_lattice()) {
        let triangulation = triangulated(&points)?;
        let grid = covering_grid(&points, 19, 17);
        let data = triangulation.interpolate(InterpolationType::Linear, &grid);
        prop_assert!(data.is_ok(), "linear fill failed: {:?}", data);
    }

    #[test]
    fn prop_linear_reproduces_planes(
        xy in prop::collection::vec((finite_coordinate(), finite_coordinate()), 3..=120),
        [c0, c1, c2] in plane(),
        queries in prop::collection::vec(weights(), 1..=10),
    ) {
        let points: Vec<PointXYZ> = xy
            .iter()
            .map(|&(x, y)| PointXYZ::new(x, y, c0 + c1 * x + c2 * y))
            .collect();
        prop_assume!(distinct(&points));
        let triangulation = triangulated(&points)?;
        let pts = triangulation.points();
        let triangles: Vec<_> = triangulation.triangles().collect();
        for (k, w) in queries.iter().enumerate() {
            let [a, b, c] = triangles[k % triangles.len()];
            let q = Point::new(
                w[0] * pts[a].x + w[1] * pts[b].x + w[2] * pts[c].x,
                w[0] * pts[a].y + w[1] * pts[b].y + w[2] * pts[c].y,
            );
            let z = triangulation
                .interpolate_at(InterpolationType::Linear, q.x, q.y)
                .unwrap();
            let expected = c0 + c1 * q.x + c2 * q.y;
            prop_assert!(
                relative_eq!(z, expected, epsilon = 1e-6, max_relative = 1e-7),
                "z({}, {}) = {}, plane gives {}", q.x, q.y, z, expected
            );
        }
    }

    #[test]
    fn prop_linear_stays_within_value_range(
        points in valued_cloud(),
        queries in prop::collection::vec((-200.0..200.0_f64, -200.0..200.0_f64), 1..=20),
    ) {
        let triangulation = triangulated(&points)?;
        let lo = points.iter().map(|p| p.z).fold(f64::INFINITY, f64::min);
        let hi = points.iter().map(|p| p.z).fold(f64::NEG_INFINITY, f64::max);
        for (x, y) in queries {
            let z = triangulation
                .interpolate_at(InterpolationType::Linear, x, y)
                .unwrap();
            prop_assert!(z >= lo - 1e-9 && z <= hi + 1e-9, "z({}, {}) = {} outside [{}, {}]", x, y, z, lo, hi);
        }
    }
}
