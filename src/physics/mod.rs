//! Simulation-facing containers produced by a build.
//!
//! A [`Ship`] owns dense, index-addressable containers for points, springs,
//! triangles, electrical elements and frontiers. Element ids are positions
//! in these containers and stay stable for the life of the ship.

mod electrical;
mod frontiers;
mod points;
mod springs;
mod triangles;

use image::RgbaImage;

pub use electrical::{ElectricalConnection, ElectricalElement, ElectricalElements};
pub use frontiers::{Frontier, Frontiers};
pub use points::{ConnectedSpring, ConnectedTriangle, Point, Points};
pub use springs::{Spring, Springs};
pub use triangles::{Triangle, Triangles};

use crate::definition::ShipCoordinates;

/// Classification of a frontier loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontierType {
    /// The outer boundary of a connected piece of the ship.
    External,
    /// The boundary of a hole.
    Internal,
}

/// Bounding box of the occupied grid cells, both corners inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupiedRegion {
    /// Bottom-left corner.
    pub min: ShipCoordinates,
    /// Top-right corner.
    pub max: ShipCoordinates,
}

impl OccupiedRegion {
    /// Create a region from its corners.
    pub fn new(min: ShipCoordinates, max: ShipCoordinates) -> Self {
        Self { min, max }
    }

    /// The smallest region containing both this region and `coords`.
    pub fn including(self, coords: ShipCoordinates) -> Self {
        Self {
            min: ShipCoordinates::new(self.min.x.min(coords.x), self.min.y.min(coords.y)),
            max: ShipCoordinates::new(self.max.x.max(coords.x), self.max.y.max(coords.y)),
        }
    }

    /// Width in cells.
    pub fn width(&self) -> i32 {
        self.max.x - self.min.x + 1
    }

    /// Height in cells.
    pub fn height(&self) -> i32 {
        self.max.y - self.min.y + 1
    }
}

/// Tuning applied when seeding point and spring properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationParameters {
    /// Multiplier on spring stiffness.
    pub stiffness_adjustment: f32,
    /// Multiplier on point and spring strength.
    pub strength_adjustment: f32,
    /// Multiplier on point mass.
    pub mass_adjustment: f32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            stiffness_adjustment: 1.0,
            strength_adjustment: 1.0,
            mass_adjustment: 1.0,
        }
    }
}

/// Numbers collected while building a ship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildStatistics {
    /// Spring ACMR in construction order.
    pub spring_acmr_before: f32,
    /// Spring ACMR after layout.
    pub spring_acmr_after: f32,
    /// Triangle ACMR in construction order.
    pub triangle_acmr_before: f32,
    /// Triangle ACMR after layout.
    pub triangle_acmr_after: f32,
    /// Points adjacent to empty space.
    pub leaking_points: usize,
    /// Rope points, endpoints included.
    pub rope_points: usize,
    /// Rope points created between rope endpoints.
    pub interpolated_rope_points: usize,
    /// Triangles dropped by the rope filter.
    pub filtered_triangles: usize,
    /// Springs covered by two triangles without being their edge.
    pub traverse_springs: usize,
}

/// A fully constructed ship.
#[derive(Debug, Clone)]
pub struct Ship {
    /// Mass points.
    pub points: Points,
    /// Springs between points.
    pub springs: Springs,
    /// Surface triangles.
    pub triangles: Triangles,
    /// Electrical elements, one per electrified point.
    pub electrical_elements: ElectricalElements,
    /// Closed boundary loops.
    pub frontiers: Frontiers,
    /// Bounding box of the occupied cells.
    pub occupied_region: OccupiedRegion,
    /// Texture, provided or generated.
    pub texture: RgbaImage,
    /// Build metrics.
    pub statistics: BuildStatistics,
}
