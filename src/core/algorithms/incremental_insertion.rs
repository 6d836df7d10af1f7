//! Incremental Delaunay construction over neighbour fans.
//!
//! Points are inserted in locality order.  For every new point:
//! 1. Locate the triangle containing it (or the hull triangle nearest to it)
//! 2. Offer the point to the workspaces of the triangle's corners
//! 3. Whenever a workspace accepts it, queue that vertex's old neighbours too
//! 4. Build the new point's own fan from the vertices that accepted it
//!
//! The triangulation is kept purely as per-vertex counter-clockwise neighbour
//! lists; no triangle or edge records exist.

use crate::core::algorithms::locate::{
    LocateError, TriangleGraph, make_valid_triangle, walk,
};
use crate::core::collections::{
    FastHashSet, NeighbourBuffer, PointId, fast_hash_set_with_capacity,
};
use crate::core::point_list::PointList;
use crate::core::triangulation::TriangulationError;
use crate::core::workspace::{Insertion, WorkSpace};
use crate::core::workspace_cache::WorkSpaceCache;
use crate::geometry::point::Point;

/// Vertices whose neighbourhood must be revisited for the current insertion.
#[derive(Clone, Debug, Default)]
struct WorkQueue {
    ids: Vec<PointId>,
    success: Vec<bool>,
    members: FastHashSet<PointId>,
}

impl WorkQueue {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            success: Vec::with_capacity(capacity),
            members: fast_hash_set_with_capacity(capacity),
        }
    }

    fn reset(&mut self, seed: [PointId; 3]) {
        self.ids.clear();
        self.success.clear();
        self.members.clear();
        for id in seed {
            self.push(id);
        }
    }

    fn push(&mut self, id: PointId) {
        if self.members.insert(id) {
            self.ids.push(id);
            self.success.push(false);
        }
    }

    fn len(&self) -> usize {
        self.ids.len()
    }

    fn accepted(&self) -> impl Iterator<Item = PointId> + '_ {
        self.ids
            .iter()
            .zip(&self.success)
            .filter_map(|(&id, &ok)| ok.then_some(id))
    }
}

/// Incremental builder of neighbour fans over a [`PointList`].
///
/// Ids are positions in the locality-sorted list; errors report caller ids.
#[derive(Debug)]
pub struct Triangulator<'a> {
    list: &'a PointList,
    inserted: usize,
    blocks: Vec<NeighbourBuffer>,
    cache: WorkSpaceCache,
    queue: WorkQueue,
    dropped_links: usize,
}

impl TriangleGraph for Triangulator<'_> {
    fn neighbours(&self, id: PointId) -> &[PointId] {
        &self.blocks[id]
    }

    fn position(&self, id: PointId) -> Point {
        self.list.points()[id]
    }

    fn step_limit(&self) -> usize {
        self.inserted
    }
}

impl<'a> Triangulator<'a> {
    /// Prepares an empty builder.  The list must already start with a proper
    /// triangle (see [`PointList::ensure_initial_triangle`]).
    #[must_use]
    pub fn new(list: &'a PointList) -> Self {
        Self {
            list,
            inserted: 0,
            blocks: vec![NeighbourBuffer::new(); list.len()],
            cache: WorkSpaceCache::new(),
            queue: WorkQueue::with_capacity(32),
            dropped_links: 0,
        }
    }

    /// Inserts every point and returns the neighbour fans, indexed by sorted
    /// id.
    ///
    /// # Errors
    ///
    /// Returns [`TriangulationError::DegenerateInput`] when the first three
    /// points do not form a triangle or a point coincides with a neighbour,
    /// [`TriangulationError::WalkDivergence`] when point location does not
    /// converge and [`TriangulationError::EmptyWorkspace`] when a
    /// neighbourhood collapses.
    pub fn run(mut self) -> Result<Vec<NeighbourBuffer>, TriangulationError> {
        self.create_first_triangle()?;
        for i in 3..self.list.len() {
            self.insert(i)?;
        }

        let stats = self.cache.stats();
        tracing::debug!(
            points = self.inserted,
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            dropped_links = self.dropped_links,
            "incremental insertion finished"
        );
        Ok(self.blocks)
    }

    fn original_id(&self, id: PointId) -> PointId {
        self.list.original_id(id)
    }

    fn create_first_triangle(&mut self) -> Result<(), TriangulationError> {
        let points = self.list.points();
        for i in 0..3 {
            let (workspace, _) = self.cache.get(i, points[i]);
            workspace.reset(points[i]);
            for j in (0..3).filter(|&j| j != i) {
                workspace.try_to_add_point(j, points);
            }
            if workspace.len() != 2 {
                return Err(TriangulationError::DegenerateInput {
                    message: "the first three points do not form a triangle".to_string(),
                });
            }
            self.blocks[i] = workspace.ids().collect();
        }
        self.inserted = 3;
        Ok(())
    }

    fn insert(&mut self, i: PointId) -> Result<(), TriangulationError> {
        let points = self.list.points();

        // The previous insertion may have invalidated any older triangle.
        let mut triangle = make_valid_triangle(self, i - 1).map_err(|err| match err {
            LocateError::NoValidTriangle { point } => TriangulationError::EmptyWorkspace {
                point: self.original_id(point),
            },
            other => other.into(),
        })?;
        walk(self, &mut triangle, points[i])?;

        self.queue.reset(triangle.ids);
        let mut pos = 0;
        while pos < self.queue.len() {
            let id = self.queue.ids[pos];
            let (workspace, hit) = self.cache.get(id, points[id]);
            if !hit {
                workspace.construct(points[id], &self.blocks[id], points);
            }

            match workspace.try_to_add_point(i, points) {
                Insertion::Coincident => {
                    return Err(coincident(self.list, id, i));
                }
                Insertion::Rejected => {}
                Insertion::Added | Insertion::Replaced => {
                    if workspace.is_empty() {
                        return Err(TriangulationError::EmptyWorkspace {
                            point: self.list.original_id(id),
                        });
                    }
                    // Any old neighbour of `id` may now see `i` as well.
                    for &n in &self.blocks[id] {
                        self.queue.push(n);
                    }
                    self.queue.success[pos] = true;
                    self.blocks[id].clear();
                    self.blocks[id].extend(workspace.ids());
                }
            }
            pos += 1;
        }

        let (workspace, _) = self.cache.get(i, points[i]);
        workspace.reset(points[i]);
        for id in self.queue.accepted() {
            if workspace.try_to_add_point(id, points) == Insertion::Coincident {
                return Err(coincident(self.list, i, id));
            }
        }
        if workspace.is_empty() {
            return Err(TriangulationError::EmptyWorkspace {
                point: self.list.original_id(i),
            });
        }
        self.blocks[i] = workspace.ids().collect();
        self.inserted = i + 1;

        self.drop_unreturned_links(i);
        Ok(())
    }

    /// A vertex that accepted `i` but is shadowed in `i`'s own fan loses its
    /// link to `i`, so every fan stays symmetric.
    fn drop_unreturned_links(&mut self, i: PointId) {
        for k in 0..self.queue.len() {
            let id = self.queue.ids[k];
            if !self.queue.success[k] || self.blocks[i].contains(&id) {
                continue;
            }
            self.blocks[id].retain(|n| *n != i);
            self.cache.invalidate(id);
            self.dropped_links += 1;
            tracing::debug!(
                point = self.list.original_id(i),
                neighbour = self.list.original_id(id),
                "dropped one-sided link during insertion"
            );
        }
    }
}

fn coincident(list: &PointList, a: PointId, b: PointId) -> TriangulationError {
    let pt = list.points()[a];
    TriangulationError::DegenerateInput {
        message: format!(
            "points {} and {} coincide at ({}, {})",
            list.original_id(a),
            list.original_id(b),
            pt.x,
            pt.y
        ),
    }
}

/// Rebuilds the fan of `owner` with `id` added at its angular position.
///
/// Returns `false`, leaving the fan untouched, when `owner`'s workspace does
/// not admit `id` without shadowing any current neighbour.
pub(crate) fn admit_neighbour(
    workspace: &mut WorkSpace,
    fan: &mut NeighbourBuffer,
    owner: PointId,
    id: PointId,
    points: &[Point],
) -> bool {
    workspace.construct(points[owner], fan, points);
    let before = workspace.len();
    if workspace.try_to_add_point(id, points) != Insertion::Added || workspace.len() != before + 1
    {
        return false;
    }
    fan.clear();
    fan.extend(workspace.ids());
    true
}

// =============================================================================
// TESTS
// =============================================================================
