//! # planar-delaunay
//!
//! This is a library for computing the Delaunay triangulation and Voronoi
//! diagram of a set of planar points, and for interpolating values scattered
//! over those points onto arbitrary locations or regular grids.
//!
//! # Features
//!
//! - Incremental Delaunay construction over counter-clockwise neighbour fans,
//!   with points inserted in a locality-preserving order
//! - Convex hull extraction and the Voronoi dual (circumcentres plus vertices
//!   at infinity) in one combined graph
//! - Nearest-value ("round") and piecewise-linear interpolation, with a
//!   clamped nearest-side fallback outside the hull
//! - Generic input through [`PlanarPoint`](geometry::point::PlanarPoint):
//!   tuples, arrays, [`PointXYZ`](geometry::point::PointXYZ) or
//!   payload-carrying [`DataPoint`](geometry::point::DataPoint) records
//! - Serialization/Deserialization of points and grid parameters with
//!   [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! ```rust
//! use planar_delaunay::prelude::*;
//!
//! // Corners of the unit square with z = x + y.
//! let points = vec![
//!     PointXYZ::new(0.0, 0.0, 0.0),
//!     PointXYZ::new(1.0, 0.0, 1.0),
//!     PointXYZ::new(1.0, 1.0, 2.0),
//!     PointXYZ::new(0.0, 1.0, 1.0),
//! ];
//!
//! let triangulation = Triangulation::new(&points).unwrap();
//! assert_eq!(triangulation.number_of_triangles(), 2);
//! assert_eq!(triangulation.boundary_len(), 4);
//!
//! let z = triangulation.interpolate_at(InterpolationType::Linear, 0.5, 0.5).unwrap();
//! assert!((z - 1.0).abs() < 1e-12);
//! ```
//!
//! # Regular Grids
//!
//! ```rust
//! use planar_delaunay::prelude::*;
//!
//! let points = [(0.0, 0.0, 1.0), (4.0, 0.0, 2.0), (0.0, 4.0, 3.0), (4.5, 4.2, 4.0)];
//! let triangulation = Triangulation::new(&points).unwrap();
//!
//! let grid = GridSpecBuilder::default()
//!     .xres(8)
//!     .yres(8)
//!     .xreal(4.0)
//!     .yreal(4.0)
//!     .build()
//!     .unwrap();
//! let data = triangulation.interpolate(InterpolationType::Round, &grid).unwrap();
//!
//! assert_eq!(data.len(), 64);
//! assert_eq!(data[0], 1.0);
//! assert_eq!(data[63], 4.0);
//! ```
//!
//! # Views
//!
//! A finished [`Triangulation`](core::triangulation::Triangulation) exposes
//! the Delaunay graph and the combined Delaunay–Voronoi graph in compressed
//! sparse row form, plus the hull:
//!
//! ```rust
//! use planar_delaunay::prelude::*;
//!
//! let triangulation = Triangulation::new(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)]).unwrap();
//!
//! let delaunay = triangulation.delaunay().unwrap();
//! assert_eq!(delaunay.index(), &[0, 2, 4, 6]);
//!
//! let boundary = triangulation.boundary().unwrap();
//! assert_eq!(boundary.points(), &[0, 1, 2]);
//!
//! // One circumcentre and three vertices at infinity.
//! let voronoi = triangulation.voronoi().unwrap();
//! assert_eq!(voronoi.len(), 4);
//! assert_eq!(voronoi.graph().len(), 7);
//! ```

#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the triangulation object, its construction
/// pipeline and interpolation.
pub mod core {
    /// Triangulation algorithms for construction, repair, duals and querying
    pub mod algorithms {
        /// Incremental insertion over neighbour fans
        pub mod incremental_insertion;
        /// Point location by triangle walking
        pub mod locate;
        /// Consistency repair of neighbour fans
        pub mod repair;
        /// Voronoi dual construction
        pub mod voronoi;
    }
    pub mod adjacency;
    pub mod boundary;
    /// High-performance collection types used by the triangulation
    pub mod collections;
    pub mod interpolation;
    pub mod point_list;
    pub mod triangulation;
    /// Structural checks of finished graphs
    pub mod util {
        pub mod validation;
        pub use validation::*;
    }
    pub mod workspace;
    pub mod workspace_cache;

    // Re-export the main `core` types.
    pub use adjacency::*;
    pub use boundary::*;
    pub use interpolation::*;
    pub use triangulation::*;
}

/// Contains the planar point types and geometric predicates.
pub mod geometry {
    pub mod point;
    pub mod predicates;
    pub mod triangle;
    pub use point::*;
    pub use predicates::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    pub use crate::core::{
        adjacency::Csr,
        algorithms::{
            repair::RepairReport,
            voronoi::{FAR_AWAY_FACTOR, Voronoi},
        },
        boundary::Boundary,
        interpolation::{
            GridSpec, GridSpecBuilder, GridSpecBuilderError, InterpolationError,
            InterpolationType,
        },
        triangulation::{Triangulation, TriangulationError, VertexRef},
    };

    pub use crate::core::collections::{
        FastHashMap, FastHashSet, NeighbourBuffer, PointId, SmallBuffer,
        fast_hash_map_with_capacity, fast_hash_set_with_capacity,
    };

    pub use crate::geometry::point::{DataPoint, PlanarPoint, Point, PointXYZ};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
