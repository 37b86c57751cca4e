//! The springs container.

use std::ops::Index;

use crate::factory::Octant;
use crate::index::{PointId, SpringId, StructuralMaterialId, TriangleId};

/// A spring between two points.
#[derive(Debug, Clone)]
pub struct Spring {
    /// First endpoint.
    pub point_a: PointId,
    /// Direction of the spring from `point_a`.
    pub point_a_octant: Octant,
    /// Second endpoint.
    pub point_b: PointId,
    /// Direction of the spring from `point_b`.
    pub point_b_octant: Octant,
    /// Triangles having this spring as an edge, at most two.
    pub super_triangles: Vec<TriangleId>,
    /// Triangles covering this spring, as edge or traverse.
    pub covering_triangles_count: u32,
    /// Material of the weaker endpoint.
    pub material: StructuralMaterialId,
    /// Length at rest.
    pub rest_length: f32,
    /// Stiffness, after adjustment.
    pub stiffness: f32,
    /// Strength, after adjustment.
    pub strength: f32,
}

impl Spring {
    /// The endpoint that is not `p`.
    #[inline]
    pub fn other_endpoint(&self, p: PointId) -> PointId {
        if self.point_a == p {
            self.point_b
        } else {
            self.point_a
        }
    }

    /// Whether the spring lies on a frontier.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        self.super_triangles.len() == 1
    }
}

/// Dense container of springs.
#[derive(Debug, Clone, Default)]
pub struct Springs {
    elements: Vec<Spring>,
}

impl Springs {
    /// Create an empty container sized for `capacity` springs.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
        }
    }

    /// Append a spring.
    pub fn add(&mut self, spring: Spring) -> SpringId {
        let id = SpringId::new(self.elements.len());
        self.elements.push(spring);
        id
    }

    /// Number of springs.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether there are no springs.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Get a spring, if `id` is in range.
    #[inline]
    pub fn get(&self, id: SpringId) -> Option<&Spring> {
        self.elements.get(id.index())
    }

    /// Iterate over all springs in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Spring> {
        self.elements.iter()
    }

    /// Endpoint pairs of all springs, in order.
    pub fn endpoints(&self) -> Vec<[u32; 2]> {
        self.elements
            .iter()
            .map(|s| [s.point_a.raw(), s.point_b.raw()])
            .collect()
    }
}

impl Index<SpringId> for Springs {
    type Output = Spring;

    #[inline]
    fn index(&self, id: SpringId) -> &Spring {
        &self.elements[id.index()]
    }
}
