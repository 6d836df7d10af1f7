use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher};
use smallvec::SmallVec;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Index of a point in a triangulation.
///
/// Inside the builder ids refer to the locality-sorted point list; every id
/// exposed by a finished [`Triangulation`](crate::core::triangulation::Triangulation)
/// refers to the caller's original point order.
pub type PointId = usize;

/// Inline capacity of a neighbour fan.  Planar Delaunay vertices have six
/// neighbours on average, so most fans never touch the heap.
pub const NEIGHBOURS_INLINE: usize = 8;

/// Counter-clockwise sorted neighbour fan of one point.
pub type NeighbourBuffer = SmallBuffer<PointId, NEIGHBOURS_INLINE>;

// =============================================================================
// CORE OPTIMIZED TYPES
// =============================================================================

/// Optimized `HashMap` type for performance-critical operations.
/// Uses `FastHasher` (`rustc_hash::FxHasher`) for faster hashing in non-cryptographic contexts.
///
/// # Security Warning
///
/// Not DoS-resistant: do not use with attacker-controlled keys.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// Fast non-cryptographic hasher alias for internal collections.
pub type FastHasher = FxHasher;

/// Build hasher that instantiates [`FastHasher`].
pub type FastBuildHasher = FxBuildHasher;

/// Optimized `HashSet` type for performance-critical operations.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::core::collections::FastHashSet;
///
/// let mut queued: FastHashSet<usize> = FastHashSet::default();
/// assert!(queued.insert(7));
/// assert!(!queued.insert(7));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Small-optimized Vec that uses stack allocation for small collections.
///
/// # Size Guidelines
///
/// - **N=3**: Triangle vertex lists
/// - **N=8**: Neighbour fans, cache sets
/// - **N=16**: Work queues of a single insertion
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
/// for i in 0..5 {
///     buffer.push(i);
/// }
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbour_buffer_stays_inline_for_typical_degree() {
        let fan: NeighbourBuffer = (0..6).collect();
        assert_eq!(fan.len(), 6);
        assert!(!fan.spilled());

        let wide: NeighbourBuffer = (0..12).collect();
        assert!(wide.spilled());
    }
}
