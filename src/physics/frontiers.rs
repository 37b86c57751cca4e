//! The frontiers container.

use std::collections::HashMap;
use std::ops::Index;

use super::FrontierType;
use crate::index::{FrontierId, SpringId};

/// A closed loop of boundary springs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontier {
    /// Hull or hole.
    pub frontier_type: FrontierType,
    /// Springs in walk order; consecutive springs share an endpoint, and the
    /// last one shares an endpoint with the first.
    pub edges: Vec<SpringId>,
}

/// Dense container of frontiers, with a spring to frontier lookup.
#[derive(Debug, Clone, Default)]
pub struct Frontiers {
    frontiers: Vec<Frontier>,
    by_spring: HashMap<SpringId, FrontierId>,
}

impl Frontiers {
    /// Create an empty container sized for `capacity` frontiers.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frontiers: Vec::with_capacity(capacity),
            by_spring: HashMap::new(),
        }
    }

    /// Append a frontier and index its edges.
    pub fn add(&mut self, frontier: Frontier) -> FrontierId {
        let id = FrontierId::new(self.frontiers.len());
        for &edge in &frontier.edges {
            self.by_spring.insert(edge, id);
        }
        self.frontiers.push(frontier);
        id
    }

    /// Number of frontiers.
    #[inline]
    pub fn len(&self) -> usize {
        self.frontiers.len()
    }

    /// Whether there are no frontiers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frontiers.is_empty()
    }

    /// Get a frontier, if `id` is in range.
    #[inline]
    pub fn get(&self, id: FrontierId) -> Option<&Frontier> {
        self.frontiers.get(id.index())
    }

    /// The frontier a spring lies on.
    pub fn frontier_of(&self, spring: SpringId) -> Option<FrontierId> {
        self.by_spring.get(&spring).copied()
    }

    /// Number of frontiers of a type.
    pub fn count(&self, frontier_type: FrontierType) -> usize {
        self.frontiers
            .iter()
            .filter(|f| f.frontier_type == frontier_type)
            .count()
    }

    /// Iterate over all frontiers in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Frontier> {
        self.frontiers.iter()
    }
}

impl Index<FrontierId> for Frontiers {
    type Output = Frontier;

    #[inline]
    fn index(&self, id: FrontierId) -> &Frontier {
        &self.frontiers[id.index()]
    }
}
