//! Consistency repair of neighbour fans after incremental insertion.
//!
//! Incremental updates are local, so in rare (mostly cocircular)
//! configurations a link can end up recorded on one side only, or both
//! diagonals of a cocircular quadrilateral can survive.  This pass fixes both
//! before the fans are compacted:
//!
//! 1. A one-sided link `j ∈ N(i)`, `i ∉ N(j)` is completed when `j`'s
//!    workspace admits `i` without shadowing anything, and removed otherwise.
//! 2. Two crossing diagonals `o–x` and `p–q`, with `p`, `x`, `q` consecutive
//!    around `o`, are resolved with an in-circle test.  Exact ties keep the
//!    diagonal whose lexicographically smallest endpoint is smaller.

use crate::core::algorithms::incremental_insertion::admit_neighbour;
use crate::core::collections::{NeighbourBuffer, PointId};
use crate::core::workspace::WorkSpace;
use crate::geometry::point::Point;
use crate::geometry::predicates::{InCircle, in_circle, segments_cross};
use serde::{Deserialize, Serialize};

/// What the repair pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairReport {
    /// One-sided links that were completed or removed.
    pub asymmetric_links: usize,
    /// Crossing diagonals that were removed.
    pub crossing_diagonals: usize,
}

impl RepairReport {
    /// Returns `true` when the fans were already consistent.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.asymmetric_links == 0 && self.crossing_diagonals == 0
    }
}

/// Runs both repair steps over `blocks`, whose ids index `points`.
pub fn repair(points: &[Point], blocks: &mut [NeighbourBuffer]) -> RepairReport {
    let report = RepairReport {
        asymmetric_links: restore_symmetry(points, blocks),
        crossing_diagonals: resolve_crossings(points, blocks),
    };
    if report.is_clean() {
        tracing::debug!("neighbour fans consistent, no repair needed");
    } else {
        tracing::warn!(
            asymmetric_links = report.asymmetric_links,
            crossing_diagonals = report.crossing_diagonals,
            "repaired inconsistent neighbour fans"
        );
    }
    report
}

fn restore_symmetry(points: &[Point], blocks: &mut [NeighbourBuffer]) -> usize {
    let mut workspace = WorkSpace::default();
    let mut fixed = 0;
    for owner in 0..blocks.len() {
        let mut k = 0;
        while k < blocks[owner].len() {
            let j = blocks[owner][k];
            if blocks[j].contains(&owner) {
                k += 1;
                continue;
            }
            fixed += 1;
            if admit_neighbour(&mut workspace, &mut blocks[j], j, owner, points) {
                tracing::debug!(point = j, neighbour = owner, "restored missing link");
                k += 1;
            } else {
                tracing::debug!(point = owner, neighbour = j, "removed one-sided link");
                blocks[owner].remove(k);
            }
        }
    }
    fixed
}

/// Returns the edge to drop out of two crossing diagonals `o–x` and `p–q`,
/// where `p`, `x`, `q` follow each other counter-clockwise around `o`.
fn losing_diagonal(
    points: &[Point],
    [o, x]: [PointId; 2],
    [p, q]: [PointId; 2],
) -> [PointId; 2] {
    match in_circle(points[o], points[p], points[x], points[q]) {
        InCircle::INSIDE => [o, x],
        InCircle::OUTSIDE => [p, q],
        InCircle::BOUNDARY => {
            let lowest = |a: PointId, b: PointId| {
                if points[b].lexicographic_lt(points[a]) { points[b] } else { points[a] }
            };
            if lowest(o, x).lexicographic_lt(lowest(p, q)) {
                [p, q]
            } else {
                [o, x]
            }
        }
    }
}

fn find_crossing(points: &[Point], blocks: &[NeighbourBuffer]) -> Option<[PointId; 2]> {
    for (o, fan) in blocks.iter().enumerate() {
        let len = fan.len();
        if len < 3 {
            continue;
        }
        for k in 0..len {
            let p = fan[k];
            let x = fan[(k + 1) % len];
            let q = fan[(k + 2) % len];
            if blocks[p].contains(&q)
                && segments_cross(points[o], points[x], points[p], points[q])
            {
                return Some(losing_diagonal(points, [o, x], [p, q]));
            }
        }
    }
    None
}

fn resolve_crossings(points: &[Point], blocks: &mut [NeighbourBuffer]) -> usize {
    let limit: usize = blocks.iter().map(|fan| fan.len()).sum::<usize>() / 2 + 1;
    let mut removed = 0;
    while let Some([a, b]) = find_crossing(points, blocks) {
        blocks[a].retain(|n| *n != b);
        blocks[b].retain(|n| *n != a);
        removed += 1;
        tracing::debug!(a, b, "removed crossing diagonal");
        if removed >= limit {
            tracing::warn!(removed, "crossing diagonal repair did not settle");
            break;
        }
    }
    removed
}

// =============================================================================
// TESTS
// =============================================================================
