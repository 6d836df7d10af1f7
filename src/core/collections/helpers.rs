use super::{FastBuildHasher, FastHashMap, FastHashSet};

// =============================================================================
// UTILITY FUNCTIONS
// =============================================================================

/// Creates a `FastHashMap` with pre-allocated capacity using the optimal hasher.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::core::collections::fast_hash_map_with_capacity;
///
/// let map = fast_hash_map_with_capacity::<u64, usize>(1000);
/// assert!(map.capacity() >= 1000);
/// ```
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Creates a `FastHashSet` with pre-allocated capacity using the optimal hasher.
///
/// # Examples
///
/// ```rust
/// use planar_delaunay::core::collections::fast_hash_set_with_capacity;
///
/// let set = fast_hash_set_with_capacity::<usize>(500);
/// assert!(set.capacity() >= 500);
/// ```
#[inline]
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Position of `id` in a neighbour fan.
#[inline]
#[must_use]
pub fn find_neighbour(neighbours: &[usize], id: usize) -> Option<usize> {
    neighbours.iter().position(|&n| n == id)
}

/// Neighbour following position `i` in a cyclic fan.
#[inline]
#[must_use]
pub fn next_neighbour(neighbours: &[usize], i: usize) -> usize {
    neighbours[if i + 1 == neighbours.len() { 0 } else { i + 1 }]
}

/// Neighbour preceding position `i` in a cyclic fan.
#[inline]
#[must_use]
pub fn prev_neighbour(neighbours: &[usize], i: usize) -> usize {
    neighbours[if i == 0 { neighbours.len() - 1 } else { i - 1 }]
}
