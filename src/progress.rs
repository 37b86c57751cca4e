//! Progress reporting for ship construction.
//!
//! The build pipeline reports each stage it enters through an optional
//! callback, so a loader UI can show where a large ship is in its
//! construction.
//!
//! # Example
//!
//! ```
//! use shipmesh::progress::Progress;
//! use shipmesh::factory::{build_ship_with_progress, BuildOptions};
//! # use shipmesh::definition::{Layer, ShipDefinition, ShipSize};
//! # use shipmesh::definition::materials::{MaterialDatabase, StructuralMaterial};
//! # let mut materials = MaterialDatabase::new();
//! # let steel = materials.add_structural(StructuralMaterial::new("Steel", image::Rgba([90, 90, 90, 255])));
//! # let mut structure = Layer::new(ShipSize::new(3, 2));
//! # structure.fill(steel);
//! # let definition = ShipDefinition::new(structure);
//!
//! let progress = Progress::new(|current, total, message| {
//!     println!("[{}/{}] {}", current, total, message);
//! });
//!
//! let ship = build_ship_with_progress(&definition, &materials, &BuildOptions::default(), &progress)?;
//! # let _ = ship;
//! # Ok::<(), shipmesh::BuildError>(())
//! ```

/// A progress callback that receives updates during ship construction.
///
/// The callback receives:
/// - `current`: Current step (0-based)
/// - `total`: Total number of steps
/// - `message`: Description of the current stage
pub struct Progress {
    callback: Box<dyn Fn(usize, usize, &str) + Send + Sync>,
}

impl Progress {
    /// Create a new progress reporter with the given callback.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(usize, usize, &str) + Send + Sync + 'static,
    {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Report progress.
    #[inline]
    pub fn report(&self, current: usize, total: usize, message: &str) {
        (self.callback)(current, total, message);
    }

    /// Create a no-op progress reporter that discards all updates.
    pub fn none() -> Self {
        Self::new(|_, _, _| {})
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::none()
    }
}

impl std::fmt::Debug for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Progress").finish_non_exhaustive()
    }
}
