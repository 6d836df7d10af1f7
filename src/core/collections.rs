//! Collection types used throughout the triangulation.
//!
//! Hash containers use the Fx hasher from `rustc_hash`; short variable-length
//! lists (neighbour fans, work queues, cache sets) use `smallvec` with an
//! inline capacity matching their typical length.

mod aliases;
mod helpers;

pub use aliases::*;
pub use helpers::*;
