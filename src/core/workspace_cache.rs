//! Set-associative cache of constructed [`WorkSpace`]s.
//!
//! Rebuilding a workspace from a neighbour list costs a trigonometric call
//! per neighbour.  Consecutive insertions in locality order keep touching the
//! same few points, so a small cache of ready workspaces avoids most rebuilds.
//! Slots are grouped in sets selected by `id % CACHE_SETS`; within a set the
//! most recently used entry sits in front and the last one is evicted.

use crate::core::collections::{PointId, SmallBuffer};
use crate::core::workspace::WorkSpace;
use crate::geometry::point::Point;

/// Total number of cached workspaces.
pub const CACHE_SLOTS: usize = 128;

/// Number of entries per set.
pub const CACHE_WAYS: usize = 8;

/// Number of sets.
pub const CACHE_SETS: usize = CACHE_SLOTS / CACHE_WAYS;

#[derive(Clone, Debug)]
struct Entry {
    id: PointId,
    workspace: WorkSpace,
}

/// Hit and miss counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: usize,
    /// Lookups that had to rebuild.
    pub misses: usize,
}

/// Cache of workspaces keyed by point id.
#[derive(Clone, Debug)]
pub struct WorkSpaceCache {
    sets: Vec<SmallBuffer<Entry, CACHE_WAYS>>,
    stats: CacheStats,
}

impl Default for WorkSpaceCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkSpaceCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sets: (0..CACHE_SETS).map(|_| SmallBuffer::new()).collect(),
            stats: CacheStats::default(),
        }
    }

    /// Returns the workspace cached for `id` and whether it was a hit.
    ///
    /// On a miss the returned workspace is empty, reset to `origin`, and the
    /// caller must construct it.  The entry is moved to the front of its set
    /// either way.
    pub fn get(&mut self, id: PointId, origin: Point) -> (&mut WorkSpace, bool) {
        let set = &mut self.sets[id % CACHE_SETS];
        let hit = if let Some(pos) = set.iter().position(|e| e.id == id) {
            set[..=pos].rotate_right(1);
            self.stats.hits += 1;
            true
        } else {
            // Reuse the evicted entry's allocation.
            let evicted = if set.len() == CACHE_WAYS { set.pop() } else { None };
            let entry = match evicted {
                Some(mut entry) => {
                    entry.id = id;
                    entry.workspace.reset(origin);
                    entry
                }
                None => Entry {
                    id,
                    workspace: WorkSpace::new(origin),
                },
            };
            set.insert(0, entry);
            self.stats.misses += 1;
            false
        };
        (&mut set[0].workspace, hit)
    }

    /// Drops the cached workspace of `id`, if any.
    pub fn invalidate(&mut self, id: PointId) {
        let set = &mut self.sets[id % CACHE_SETS];
        if let Some(pos) = set.iter().position(|e| e.id == id) {
            set.remove(pos);
        }
    }

    /// Hit and miss counters since creation.
    #[must_use]
    pub const fn stats(&self) -> CacheStats {
        self.stats
    }
}

// =============================================================================
// TESTS
// =============================================================================
