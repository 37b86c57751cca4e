//! # Shipmesh
//!
//! Builds a simulation-ready mass-spring mesh from a raster ship definition.
//!
//! A ship is drawn as a grid of cells, each holding a structural material.
//! Shipmesh turns every occupied cell into a point, joins neighboring points
//! with springs, covers the grid with clockwise triangles, traces the closed
//! boundaries of the hull and its holes, and lays everything out in memory
//! so that a simulation touching springs in order stays cache friendly.
//!
//! ## Features
//!
//! - **Raster input**: structural, rope and electrical layers on one grid
//! - **Ropes**: straight chains of points between two grid cells
//! - **Frontiers**: external hull and internal holes as closed spring loops
//! - **Layout**: stripe, tile and vertex cache orderings, with ACMR reporting
//! - **Type-safe indices**: points, springs and triangles cannot be mixed up
//!
//! ## Quick Start
//!
//! ```
//! use shipmesh::prelude::*;
//! use image::Rgba;
//!
//! let mut materials = MaterialDatabase::new();
//! let steel = materials.add_structural(StructuralMaterial::new("Steel", Rgba([90, 90, 90, 255])).hull());
//!
//! // A 6x4 hull with a 2x2 hole in the middle
//! let mut structure = Layer::new(ShipSize::new(6, 4));
//! structure.fill(steel);
//! for (x, y) in [(2, 1), (3, 1), (2, 2), (3, 2)] {
//!     structure.clear(ShipCoordinates::new(x, y));
//! }
//!
//! let ship = build_ship(&ShipDefinition::new(structure), &materials, &BuildOptions::default())?;
//!
//! assert_eq!(ship.points.len(), 20);
//! assert_eq!(ship.frontiers.count(FrontierType::External), 1);
//! assert_eq!(ship.frontiers.count(FrontierType::Internal), 1);
//!
//! for triangle in ship.triangles.iter() {
//!     let [a, b, c] = triangle.points;
//!     println!("{:?} {:?} {:?}", a, b, c);
//! }
//! # Ok::<(), BuildError>(())
//! ```
//!
//! ## Tuning the Build
//!
//! ```
//! use shipmesh::prelude::*;
//!
//! let options = BuildOptions::default()
//!     .with_layout(LayoutStrategy::Stripes { stripe_height: 8 })
//!     .with_triangle_reordering(true)
//!     .with_load(LoadOptions { flip_horizontally: true, ..LoadOptions::default() })
//!     .sequential();
//! assert!(options.validate().is_ok());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod definition;
pub mod error;
pub mod factory;
pub mod index;
pub mod physics;
pub mod progress;
pub mod texture;
pub mod vertex_cache;

pub use error::{BuildError, Result};

/// Prelude module for convenient imports.
///
/// ```
/// use shipmesh::prelude::*;
/// ```
pub mod prelude {
    pub use crate::definition::materials::{
        ElectricalElementType, ElectricalMaterial, MaterialDatabase, MaterialUniqueType,
        StructuralMaterial,
    };
    pub use crate::definition::{
        ElectricalCell, ElectricalLayer, Layer, RopeElement, ShipCoordinates, ShipDefinition,
        ShipSize,
    };
    pub use crate::error::{BuildError, Result};
    pub use crate::factory::{
        build_ship, build_ship_with, build_ship_with_progress, BuildOptions, LayoutStrategy,
        LoadOptions,
    };
    pub use crate::index::{ElectricalElementId, FrontierId, PointId, SpringId, TriangleId};
    pub use crate::physics::{FrontierType, Ship};
    pub use crate::progress::Progress;
}

// Re-export the geometry and image crates used in the public API
pub use image;
pub use nalgebra;
