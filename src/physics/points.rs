//! The points container.

use std::ops::Index;

use nalgebra::{Point2, Vector4};

use crate::definition::ShipCoordinates;
use crate::factory::Octant;
use crate::index::{ElectricalElementId, PointId, SpringId, StructuralMaterialId, TriangleId};

/// A spring as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedSpring {
    /// The spring.
    pub spring: SpringId,
    /// The endpoint at the other end.
    pub other_endpoint: PointId,
    /// Direction of the spring from this point.
    pub octant: Octant,
}

/// A triangle as seen from one of its vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedTriangle {
    /// The triangle.
    pub triangle: TriangleId,
    /// Whether this point is the triangle's first vertex.
    pub is_owner: bool,
}

/// A mass point.
#[derive(Debug, Clone)]
pub struct Point {
    /// Source cell, absent for rope interpolation points.
    pub definition_coordinates: Option<ShipCoordinates>,
    /// World position.
    pub position: Point2<f32>,
    /// Texture coordinates.
    pub texture_coordinates: Point2<f32>,
    /// Render color, RGBA in `[0, 1]`.
    pub render_color: Vector4<f32>,
    /// Structural material.
    pub structural_material: StructuralMaterialId,
    /// Mass, after adjustment.
    pub mass: f32,
    /// Strength, after adjustment.
    pub strength: f32,
    /// Whether the point belongs to a rope.
    pub is_rope: bool,
    /// Whether water may enter through this point.
    pub is_leaking: bool,
    /// Initial water fraction.
    pub water: f32,
    /// The electrical element on this point, if any.
    pub electrical_element: Option<ElectricalElementId>,
    /// Springs attached to this point.
    pub connected_springs: Vec<ConnectedSpring>,
    /// Triangles having this point as a vertex.
    pub connected_triangles: Vec<ConnectedTriangle>,
}

/// Dense container of points.
#[derive(Debug, Clone, Default)]
pub struct Points {
    elements: Vec<Point>,
}

impl Points {
    /// Create an empty container sized for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Append a point.
    pub fn add(&mut self, point: Point) -> PointId {
        let id = PointId::new(self.elements.len());
        self.elements.push(point);
        id
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether there are no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get a point, if `id` is in range.
    #[inline]
    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.elements.get(id.index())
    }

    /// Iterate over all points in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.elements.iter()
    }

    /// Iterate over all point ids.
    pub fn ids(&self) -> impl Iterator<Item = PointId> {
        (0..self.elements.len()).map(PointId::new)
    }

    /// Positions of all points, in order.
    pub fn positions(&self) -> Vec<Point2<f32>> {
        self.elements.iter().map(|p| p.position).collect()
    }

    pub(crate) fn get_mut(&mut self, id: PointId) -> &mut Point {
        &mut self.elements[id.index()]
    }
}

impl Index<PointId> for Points {
    type Output = Point;

    #[inline]
    fn index(&self, id: PointId) -> &Point {
        &self.elements[id.index()]
    }
}
