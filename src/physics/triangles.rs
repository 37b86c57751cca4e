//! The triangles container.

use std::ops::Index;

use crate::index::{PointId, SpringId, TriangleId};

/// A surface triangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    /// Vertices, clockwise.
    pub points: [PointId; 3],
    /// Edge springs; `springs[i]` joins `points[i]` and `points[(i + 1) % 3]`.
    pub springs: [SpringId; 3],
    /// Diagonal this triangle covers together with its neighbor.
    pub covered_traverse_spring: Option<SpringId>,
}

/// Dense container of triangles.
#[derive(Debug, Clone, Default)]
pub struct Triangles {
    elements: Vec<Triangle>,
}

impl Triangles {
    /// Create an empty container sized for `capacity` triangles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Append a triangle.
    pub fn add(&mut self, triangle: Triangle) -> TriangleId {
        let id = TriangleId::new(self.elements.len());
        self.elements.push(triangle);
        id
    }

    /// Number of triangles.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether there are no triangles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get a triangle, if `id` is in range.
    #[inline]
    pub fn get(&self, id: TriangleId) -> Option<&Triangle> {
        self.elements.get(id.index())
    }

    /// Iterate over all triangles in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Triangle> {
        self.elements.iter()
    }

    /// Vertex triples of all triangles, in order.
    pub fn vertices(&self) -> Vec<[u32; 3]> {
        self.elements
            .iter()
            .map(|t| t.points.map(PointId::raw))
            .collect()
    }

    pub(crate) fn as_slice(&self) -> &[Triangle] {
        &self.elements
    }
}

impl Index<TriangleId> for Triangles {
    type Output = Triangle;

    #[inline]
    fn index(&self, id: TriangleId) -> &Triangle {
        &self.elements[id.index()]
    }
}
