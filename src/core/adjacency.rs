//! Packed neighbour lists.
//!
//! Finished graphs are stored in compressed sparse row form: the neighbours
//! of vertex `i` are `neighbours[index[i]..index[i + 1]]`.  The Delaunay graph
//! and the combined Delaunay–Voronoi graph both use this layout.

use crate::core::algorithms::locate::TriangleGraph;
use crate::core::collections::{NeighbourBuffer, PointId};
use crate::core::point_list::PointList;
use crate::core::triangulation::TriangulationError;
use crate::geometry::point::Point;

/// Neighbour lists in compressed sparse row form.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::core::adjacency::Csr;
///
/// let csr = Csr::from_lists([vec![1, 2], vec![2, 0], vec![0, 1]]);
/// assert_eq!(csr.len(), 3);
/// assert_eq!(csr.block(1), &[2, 0]);
/// assert_eq!(csr.index(), &[0, 2, 4, 6]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Csr {
    index: Vec<usize>,
    neighbours: Vec<PointId>,
}

impl Csr {
    /// Packs the given lists in order.
    pub fn from_lists<I, L>(lists: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: AsRef<[PointId]>,
    {
        let mut index = vec![0];
        let mut neighbours = Vec::new();
        for list in lists {
            neighbours.extend_from_slice(list.as_ref());
            index.push(neighbours.len());
        }
        Self { index, neighbours }
    }

    /// Wraps already packed lists.  `index` must start at 0, be
    /// non-decreasing and end at `neighbours.len()`.
    pub(crate) const fn from_parts(index: Vec<usize>, neighbours: Vec<PointId>) -> Self {
        Self { index, neighbours }
    }

    /// Packs fans indexed by sorted id into caller order, translating every
    /// neighbour to its caller id.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::CombinatorialMismatch`] when the total
    /// number of entries is odd, which no symmetric graph can produce.
    pub fn compactify(
        list: &PointList,
        blocks: &[NeighbourBuffer],
    ) -> Result<Self, TriangulationError> {
        let n = list.len();
        let mut index = vec![0; n + 1];
        for (id, fan) in blocks.iter().enumerate() {
            index[list.original_id(id) + 1] = fan.len();
        }
        for i in 0..n {
            index[i + 1] += index[i];
        }

        let nsize = index[n];
        if nsize % 2 == 1 {
            return Err(TriangulationError::CombinatorialMismatch {
                what: "directed edge count parity".to_string(),
                expected: 0,
                found: 1,
            });
        }

        let mut neighbours = vec![0; nsize];
        for (id, fan) in blocks.iter().enumerate() {
            let start = index[list.original_id(id)];
            for (slot, &n) in neighbours[start..start + fan.len()].iter_mut().zip(fan) {
                *slot = list.original_id(n);
            }
        }
        Ok(Self { index, neighbours })
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len().saturating_sub(1)
    }

    /// Returns `true` when there are no vertices.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Neighbours of vertex `i`.
    #[inline]
    #[must_use]
    pub fn block(&self, i: PointId) -> &[PointId] {
        &self.neighbours[self.index[i]..self.index[i + 1]]
    }

    /// Block offsets, one more than the number of vertices.
    #[inline]
    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    /// All neighbour entries.
    #[inline]
    #[must_use]
    pub fn neighbours(&self) -> &[PointId] {
        &self.neighbours
    }

    /// Total number of entries; twice the number of undirected edges.
    #[inline]
    #[must_use]
    pub fn nsize(&self) -> usize {
        self.neighbours.len()
    }

    /// Iterates over `(vertex, neighbours)` pairs.
    pub fn blocks(&self) -> impl ExactSizeIterator<Item = (PointId, &[PointId])> + '_ {
        (0..self.len()).map(move |i| (i, self.block(i)))
    }
}

/// A [`Csr`] graph together with vertex positions, walkable by
/// [`walk`](crate::core::algorithms::locate::walk).
///
/// Ids below `points.len()` are input points; the rest address `extra`
/// (the Voronoi vertices of the combined graph).
#[derive(Clone, Copy, Debug)]
pub struct PositionedGraph<'a> {
    csr: &'a Csr,
    points: &'a [Point],
    extra: &'a [Point],
}

impl<'a> PositionedGraph<'a> {
    /// Graph over `points` only.
    #[must_use]
    pub const fn new(csr: &'a Csr, points: &'a [Point]) -> Self {
        Self {
            csr,
            points,
            extra: &[],
        }
    }

    /// Graph over `points` followed by `extra`.
    #[must_use]
    pub const fn with_extra(csr: &'a Csr, points: &'a [Point], extra: &'a [Point]) -> Self {
        Self { csr, points, extra }
    }
}

impl TriangleGraph for PositionedGraph<'_> {
    fn neighbours(&self, id: PointId) -> &[PointId] {
        self.csr.block(id)
    }

    fn position(&self, id: PointId) -> Point {
        self.points
            .get(id)
            .copied()
            .unwrap_or_else(|| self.extra[id - self.points.len()])
    }

    fn step_limit(&self) -> usize {
        // The combined graph limits walks by its Voronoi vertices.
        if self.extra.is_empty() {
            self.points.len()
        } else {
            self.extra.len()
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
