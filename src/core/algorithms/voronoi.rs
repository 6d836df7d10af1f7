//! Voronoi dual of a Delaunay graph.
//!
//! Every Delaunay triangle contributes its circumcentre and every hull side a
//! vertex "at infinity", placed far out along the side's outer normal.  There
//! are `t + b = 2(v − 1)` such vertices.  They are stored in one combined
//! graph with the input points:
//!
//! - ids `0..v` are input points; their blocks list the Voronoi vertices
//!   around them counter-clockwise (one extra slot on the hull);
//! - circumcentre blocks have six slots alternating Voronoi and Delaunay ids
//!   (`[V, a, V, b, V, c]`);
//! - infinity blocks have five (`[V∞, b, V, a, V∞]` for hull side `a → b`).
//!
//! The combined graph has exactly `12(v − 1) + 2h` entries.

use crate::core::adjacency::Csr;
use crate::core::boundary::Boundary;
use crate::core::collections::{PointId, find_neighbour};
use crate::core::triangulation::TriangulationError;
use crate::geometry::point::Point;
use crate::geometry::predicates::{CircumcenterError, circumcenter};

/// Distance of the vertices at infinity, in diagonals of the bounding box of
/// the inner Voronoi vertices and the input points together.
pub const FAR_AWAY_FACTOR: f64 = 10.0;

/// Block length of a vertex at infinity.
const INFINITY_BLOCK: usize = 5;

/// Block length of a circumcentre.
const TRIANGLE_BLOCK: usize = 6;

/// Voronoi vertices and the combined adjacency.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Voronoi {
    vpoints: Vec<Point>,
    graph: Csr,
}

impl Voronoi {
    /// Voronoi vertex positions; vertex `k` has combined id `v + k`.
    #[inline]
    #[must_use]
    pub fn vpoints(&self) -> &[Point] {
        &self.vpoints
    }

    /// The combined Delaunay–Voronoi graph.
    #[inline]
    #[must_use]
    pub const fn graph(&self) -> &Csr {
        &self.graph
    }

    /// Number of Voronoi vertices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.vpoints.len()
    }

    /// Returns `true` when there are no Voronoi vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vpoints.is_empty()
    }
}

#[derive(Clone, Copy, Debug)]
struct Extent {
    xmin: f64,
    xmax: f64,
    ymin: f64,
    ymax: f64,
}

impl Extent {
    const EMPTY: Self = Self {
        xmin: f64::MAX,
        xmax: -f64::MAX,
        ymin: f64::MAX,
        ymax: -f64::MAX,
    };

    fn add(&mut self, pt: Point) {
        self.xmin = self.xmin.min(pt.x);
        self.xmax = self.xmax.max(pt.x);
        self.ymin = self.ymin.min(pt.y);
        self.ymax = self.ymax.max(pt.y);
    }

    fn diagonal(&self) -> f64 {
        (self.xmax - self.xmin).hypot(self.ymax - self.ymin)
    }
}

/// Slot storage of the combined graph while it is being filled.
struct Builder<'a> {
    csr: &'a Csr,
    vindex: Vec<usize>,
    slots: Vec<Option<PointId>>,
    vpoints: Vec<Point>,
    npoints: usize,
    nvpoints: usize,
}

impl Builder<'_> {
    fn block(&self, id: PointId) -> std::ops::Range<usize> {
        self.vindex[id]..self.vindex[id + 1]
    }

    /// Appends a Voronoi vertex with `len` empty slots.
    fn push_vertex(&mut self, pt: Point, len: usize) -> Result<(PointId, usize), TriangulationError> {
        let pos = self.vindex[self.vindex.len() - 1];
        if self.vpoints.len() == self.nvpoints || pos + len > self.slots.len() {
            return Err(mismatch("Voronoi vertices", self.nvpoints, self.vpoints.len() + 1));
        }
        let id = self.npoints + self.vpoints.len();
        self.vpoints.push(pt);
        self.vindex.push(pos + len);
        Ok((id, pos))
    }

    /// Puts `v` into the slot of Delaunay point `i` that corresponds to its
    /// neighbour `ni`.
    fn add_point_id(&mut self, i: PointId, ni: PointId, v: PointId) -> Result<(), TriangulationError> {
        let slot = find_neighbour(self.csr.block(i), ni)
            .map(|j| self.vindex[i] + j)
            .filter(|&slot| self.slots[slot].is_none())
            .ok_or_else(|| mismatch("free Voronoi slots around a point", 1, 0))?;
        self.slots[slot] = Some(v);
        Ok(())
    }

    /// Fills `addat` with the Voronoi vertex other than `ignore` shared by
    /// the Delaunay points in slots `ia` and `ib`.
    fn add_common_neighbour(
        &mut self,
        ignore: PointId,
        ia: usize,
        ib: usize,
        addat: usize,
    ) -> Result<(), TriangulationError> {
        let (Some(a), Some(b)) = (self.slots[ia], self.slots[ib]) else {
            return Err(mismatch("Delaunay slots of a Voronoi vertex", 2, 0));
        };
        let b_block = &self.slots[self.block(b)];
        let found = self.slots[self.block(a)]
            .iter()
            .flatten()
            .copied()
            .find(|&ni| ni != ignore && b_block.contains(&Some(ni)))
            .ok_or_else(|| mismatch("common Voronoi neighbours", 1, 0))?;
        self.slots[addat] = Some(found);
        Ok(())
    }

    /// Fills `addat` with a vertex at infinity other than `ignore` around the
    /// Delaunay point in slot `ia`.
    fn add_infinity_neighbour(
        &mut self,
        ignore: PointId,
        ia: usize,
        addat: usize,
    ) -> Result<(), TriangulationError> {
        let Some(a) = self.slots[ia] else {
            return Err(mismatch("Delaunay slots of a vertex at infinity", 1, 0));
        };
        let found = self.slots[self.block(a)]
            .iter()
            .flatten()
            .copied()
            .find(|&ni| ni != ignore && self.block(ni).len() == INFINITY_BLOCK)
            .ok_or_else(|| mismatch("neighbouring vertices at infinity", 1, 0))?;
        self.slots[addat] = Some(found);
        Ok(())
    }
}

fn mismatch(what: &str, expected: usize, found: usize) -> TriangulationError {
    TriangulationError::CombinatorialMismatch {
        what: what.to_string(),
        expected,
        found,
    }
}

/// Builds the Voronoi dual of the Delaunay graph `csr` over `points`.
///
/// The vertex at infinity of hull side `a → b` sits on the outer normal
/// through the side's midpoint, [`FAR_AWAY_FACTOR`] diagonals away.  The
/// bounding box spans the circumcentres and the input points, not the
/// circumcentres alone, so a triangulation whose circumcentres all cluster
/// in one spot still gets an outer ring well clear of the hull.
///
/// # Errors
///
/// Returns [`TriangulationError::GeometricSingularity`] for a numerically
/// flat Delaunay triangle and [`TriangulationError::CombinatorialMismatch`]
/// whenever a count or slot does not come out as the identities require.
pub fn delaunay_to_voronoi(
    csr: &Csr,
    boundary: &Boundary,
    points: &[Point],
) -> Result<Voronoi, TriangulationError> {
    let npoints = points.len();
    if npoints < 3 {
        return Ok(Voronoi::default());
    }
    let vm1 = npoints - 1;
    let nvpoints = 2 * vm1;
    let nvoronoi = 12 * vm1 + csr.nsize();

    // Delaunay blocks have known sizes: one slot per neighbour, plus one
    // more on the hull where two vertices at infinity meet.
    let mut vindex = Vec::with_capacity(npoints + nvpoints + 1);
    vindex.push(0);
    for i in 0..npoints {
        let len = csr.block(i).len() + usize::from(boundary.position_of(i).is_some());
        vindex.push(vindex[i] + len);
    }
    let delaunay_slots = vindex[npoints];
    if delaunay_slots != 3 * vm1 + csr.nsize() / 2 {
        return Err(mismatch(
            "Delaunay slots of the combined graph",
            3 * vm1 + csr.nsize() / 2,
            delaunay_slots,
        ));
    }

    let mut builder = Builder {
        csr,
        vindex,
        slots: vec![None; nvoronoi],
        vpoints: Vec::with_capacity(nvpoints),
        npoints,
        nvpoints,
    };

    // Circumcentres, each found from its lowest-numbered corner.
    let mut extent = Extent::EMPTY;
    for (i, &a) in points.iter().enumerate() {
        let fan = csr.block(i);
        let Some(&last) = fan.last() else {
            continue;
        };
        let mut prev = last;
        for &next in fan {
            if prev > i && next > i && csr.block(prev).contains(&next) {
                match circumcenter(a, points[prev], points[next]) {
                    Ok(centre) => {
                        extent.add(centre);
                        let (v, pos) = builder.push_vertex(centre, TRIANGLE_BLOCK)?;
                        builder.slots[pos + 1] = Some(i);
                        builder.slots[pos + 3] = Some(prev);
                        builder.slots[pos + 5] = Some(next);
                        builder.add_point_id(i, prev, v)?;
                        builder.add_point_id(prev, next, v)?;
                        builder.add_point_id(next, i, v)?;
                    }
                    Err(CircumcenterError::NotCounterClockwise) => {}
                    Err(CircumcenterError::Singular) => {
                        return Err(TriangulationError::GeometricSingularity {
                            a: i,
                            b: prev,
                            c: next,
                        });
                    }
                }
            }
            prev = next;
        }
    }
    // The input points widen the box as well.
    for &pt in points {
        extent.add(pt);
    }
    let far_away = FAR_AWAY_FACTOR * extent.diagonal();

    // Each hull point has one free slot between its outer neighbours and one
    // at the end; bring them together.
    for &i in boundary.points() {
        let block = builder.block(i);
        let slots = &mut builder.slots[block];
        let len = slots.len();
        let gap = (len > 2)
            .then(|| slots[..len - 1].iter().position(Option::is_none))
            .flatten()
            .ok_or_else(|| mismatch("free slots around a hull point", 2, 0))?;
        slots[gap + 1..].rotate_right(1);
    }

    // Vertices at infinity, one per hull side a → b, seen from outside.
    let mut remaining = Vec::with_capacity(boundary.len());
    for (k, &i) in boundary.points().iter().enumerate() {
        let next = boundary.next(k);
        let (a, b) = (points[i], points[next]);
        let normal = Point::new(b.y - a.y, a.x - b.x);
        let pt = a.midpoint(b) + normal * (far_away / normal.norm());
        let (v, pos) = builder.push_vertex(pt, INFINITY_BLOCK)?;
        builder.slots[pos + 1] = Some(next);
        builder.slots[pos + 3] = Some(i);
        builder.add_point_id(next, i, v)?;
        remaining.push(v);
    }

    let total = builder.vindex[builder.vindex.len() - 1];
    if total != nvoronoi || builder.vpoints.len() != nvpoints {
        return Err(mismatch("Voronoi vertices", nvpoints, builder.vpoints.len()));
    }

    for (&i, &v) in boundary.points().iter().zip(&remaining) {
        let block = builder.block(i);
        let slot = builder.slots[block]
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or_else(|| mismatch("free slots around a hull point", 1, 0))?;
        *slot = Some(v);
    }

    // Voronoi–Voronoi links.
    for v in npoints..npoints + nvpoints {
        let block = builder.block(v);
        let pos = block.start;
        if block.len() == INFINITY_BLOCK {
            builder.add_common_neighbour(v, pos + 1, pos + 3, pos + 2)?;
            builder.add_infinity_neighbour(v, pos + 1, pos)?;
            builder.add_infinity_neighbour(v, pos + 3, pos + 4)?;
        } else {
            builder.add_common_neighbour(v, pos + 1, pos + 3, pos + 2)?;
            builder.add_common_neighbour(v, pos + 3, pos + 5, pos + 4)?;
            builder.add_common_neighbour(v, pos + 5, pos + 1, pos)?;
        }
    }

    let neighbours: Vec<PointId> = builder
        .slots
        .iter()
        .copied()
        .collect::<Option<_>>()
        .ok_or_else(|| mismatch("filled slots of the combined graph", nvoronoi, 0))?;

    tracing::debug!(
        vertices = nvpoints,
        at_infinity = boundary.len(),
        far_away,
        "Voronoi dual built"
    );
    Ok(Voronoi {
        vpoints: builder.vpoints,
        graph: Csr::from_parts(builder.vindex, neighbours),
    })
}

// =============================================================================
// TESTS
// =============================================================================
