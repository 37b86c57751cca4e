//! Working records shared by the construction stages.
//!
//! These records live only for the duration of a build. They are mutable,
//! carry back-links in both directions, and are rewritten wholesale when the
//! layout stage permutes them; the final containers in [`crate::physics`]
//! are produced from them once every stage has run.

use std::collections::HashMap;

use nalgebra::{Point2, Vector4};

use crate::definition::{ShipCoordinates, ShipSize};
use crate::error::{BuildError, Result};
use crate::index::{
    ElectricalMaterialId, PointId, SpringId, StructuralMaterialId, TriangleId,
};
use crate::physics::FrontierType;

// ==================== Octants ====================

/// One of the eight neighbor directions, `0..8`, clockwise starting East.
pub type Octant = usize;

/// Octant pointing East.
pub const OCTANT_E: Octant = 0;
/// Octant pointing South.
pub const OCTANT_S: Octant = 2;
/// Octant pointing North.
pub const OCTANT_N: Octant = 6;

/// Cell offset of each octant, `y` up: E, SE, S, SW, W, NW, N, NE.
pub const OCTANT_DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The next octant clockwise.
#[inline]
pub fn rotate_cw(octant: Octant) -> Octant {
    (octant + 1) % 8
}

/// The octant pointing the other way.
#[inline]
pub fn opposite(octant: Octant) -> Octant {
    (octant + 4) % 8
}

// ==================== Records ====================

/// A point under construction.
#[derive(Debug, Clone)]
pub(crate) struct FactoryPoint {
    /// Source cell; `None` for rope interior points.
    pub definition_coordinates: Option<ShipCoordinates>,
    pub position: Point2<f32>,
    pub texture_coordinates: Point2<f32>,
    pub render_color: Vector4<f32>,
    pub structural_material: StructuralMaterialId,
    pub is_rope: bool,
    pub is_leaking: bool,
    pub water: f32,
    pub electrical_material: Option<ElectricalMaterialId>,
    pub electrical_instance: Option<u32>,
    pub connected_springs: Vec<SpringId>,
    pub connected_triangles: Vec<TriangleId>,
}

impl FactoryPoint {
    pub fn new(
        definition_coordinates: Option<ShipCoordinates>,
        position: Point2<f32>,
        texture_coordinates: Point2<f32>,
        render_color: Vector4<f32>,
        structural_material: StructuralMaterialId,
    ) -> Self {
        Self {
            definition_coordinates,
            position,
            texture_coordinates,
            render_color,
            structural_material,
            is_rope: false,
            is_leaking: false,
            water: 0.0,
            electrical_material: None,
            electrical_instance: None,
            connected_springs: Vec::new(),
            connected_triangles: Vec::new(),
        }
    }
}

/// A spring under construction.
#[derive(Debug, Clone)]
pub(crate) struct FactorySpring {
    pub point_a: PointId,
    pub point_a_octant: Octant,
    pub point_b: PointId,
    pub point_b_octant: Octant,
    /// Triangles having this spring as an edge.
    pub super_triangles: Vec<TriangleId>,
    /// Edge coverage plus two for a covered traverse.
    pub covering_triangles_count: u32,
    /// Diagonal covered by this spring's two super-triangles.
    pub covered_traverse_spring: Option<SpringId>,
}

impl FactorySpring {
    pub fn new(point_a: PointId, point_a_octant: Octant, point_b: PointId, point_b_octant: Octant) -> Self {
        Self {
            point_a,
            point_a_octant,
            point_b,
            point_b_octant,
            super_triangles: Vec::new(),
            covering_triangles_count: 0,
            covered_traverse_spring: None,
        }
    }

    /// The endpoint that is not `p`.
    #[inline]
    pub fn other_endpoint(&self, p: PointId) -> PointId {
        if self.point_a == p {
            self.point_b
        } else {
            self.point_a
        }
    }
}

/// A triangle under construction.
#[derive(Debug, Clone)]
pub(crate) struct FactoryTriangle {
    /// Vertices, clockwise.
    pub points: [PointId; 3],
    /// Edge springs, filled in by the linker.
    pub springs: Vec<SpringId>,
    pub covered_traverse_spring: Option<SpringId>,
}

impl FactoryTriangle {
    pub fn new(points: [PointId; 3]) -> Self {
        Self {
            points,
            springs: Vec::with_capacity(3),
            covered_traverse_spring: None,
        }
    }
}

/// A closed boundary loop under construction.
#[derive(Debug, Clone)]
pub(crate) struct FactoryFrontier {
    pub frontier_type: FrontierType,
    pub edges: Vec<SpringId>,
}

// ==================== Point index matrix ====================

/// Grid-cell to point lookup, padded by one empty cell on every side.
///
/// Padded coordinates `(x + 1, y + 1)` hold the point of ship cell `(x, y)`,
/// so every neighbor of an occupied cell is addressable without bounds
/// checks in the stage loops.
#[derive(Debug, Clone)]
pub(crate) struct PointIndexMatrix {
    width: i32,
    height: i32,
    cells: Vec<Option<PointId>>,
}

impl PointIndexMatrix {
    pub fn new(size: ShipSize) -> Self {
        let width = size.width + 2;
        let height = size.height + 2;
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    /// Point at padded coordinates.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<PointId> {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return None;
        }
        self.cells[(x + y * self.width) as usize]
    }

    /// Point in the given octant of padded coordinates.
    #[inline]
    pub fn neighbor(&self, x: i32, y: i32, octant: Octant) -> Option<PointId> {
        let (dx, dy) = OCTANT_DIRECTIONS[octant];
        self.get(x + dx, y + dy)
    }

    /// Point of a ship cell.
    #[inline]
    pub fn at_ship(&self, coords: ShipCoordinates) -> Option<PointId> {
        self.get(coords.x + 1, coords.y + 1)
    }

    pub fn set_ship(&mut self, coords: ShipCoordinates, point: PointId) {
        let (x, y) = (coords.x + 1, coords.y + 1);
        debug_assert!(x > 0 && y > 0 && x < self.width - 1 && y < self.height - 1);
        self.cells[(x + y * self.width) as usize] = Some(point);
    }

    /// Ship width, excluding padding.
    #[inline]
    pub fn ship_width(&self) -> i32 {
        self.width - 2
    }

    /// Ship height, excluding padding.
    #[inline]
    pub fn ship_height(&self) -> i32 {
        self.height - 2
    }

    pub fn remap_points<F>(&mut self, map: F)
    where
        F: Fn(PointId) -> PointId,
    {
        for cell in self.cells.iter_mut().flatten() {
            *cell = map(*cell);
        }
    }
}

// ==================== Point pairs ====================

/// Unordered pair of points; `(a, b)` and `(b, a)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PointPair {
    lo: PointId,
    hi: PointId,
}

impl PointPair {
    #[inline]
    pub fn new(a: PointId, b: PointId) -> Self {
        if a <= b {
            Self { lo: a, hi: b }
        } else {
            Self { lo: b, hi: a }
        }
    }
}

pub(crate) type PointPairToSpringMap = HashMap<PointPair, SpringId>;

// ==================== Working set ====================

/// Everything the stages build up, in factory order.
#[derive(Debug, Clone)]
pub(crate) struct FactoryMesh {
    pub points: Vec<FactoryPoint>,
    pub springs: Vec<FactorySpring>,
    pub triangles: Vec<FactoryTriangle>,
    pub frontiers: Vec<FactoryFrontier>,
    pub matrix: PointIndexMatrix,
    pub pair_map: PointPairToSpringMap,
}

impl FactoryMesh {
    pub fn new(size: ShipSize) -> Self {
        Self {
            points: Vec::with_capacity(size.area()),
            springs: Vec::new(),
            triangles: Vec::new(),
            frontiers: Vec::new(),
            matrix: PointIndexMatrix::new(size),
            pair_map: PointPairToSpringMap::new(),
        }
    }

    pub fn add_point(&mut self, point: FactoryPoint) -> PointId {
        let id = PointId::new(self.points.len());
        self.points.push(point);
        id
    }

    /// Create a spring, register its pair and link it to both endpoints.
    pub fn add_spring(
        &mut self,
        a: PointId,
        a_octant: Octant,
        b: PointId,
        b_octant: Octant,
    ) -> Result<SpringId> {
        let id = SpringId::new(self.springs.len());
        if self.pair_map.insert(PointPair::new(a, b), id).is_some() {
            return Err(BuildError::invariant(format!(
                "duplicate spring between {:?} and {:?}",
                a, b
            )));
        }
        self.springs.push(FactorySpring::new(a, a_octant, b, b_octant));
        self.points[a.index()].connected_springs.push(id);
        self.points[b.index()].connected_springs.push(id);
        Ok(id)
    }

    #[inline]
    pub fn spring_between(&self, a: PointId, b: PointId) -> Option<SpringId> {
        self.pair_map.get(&PointPair::new(a, b)).copied()
    }

    #[inline]
    pub fn point(&self, p: PointId) -> &FactoryPoint {
        &self.points[p.index()]
    }

    #[inline]
    pub fn spring(&self, s: SpringId) -> &FactorySpring {
        &self.springs[s.index()]
    }
}
