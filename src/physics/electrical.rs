//! The electrical elements container.

use std::collections::BTreeMap;
use std::ops::Index;

use crate::definition::materials::ElectricalElementType;
use crate::definition::PanelElementMetadata;
use crate::factory::Octant;
use crate::index::{ElectricalElementId, ElectricalMaterialId, PointId};

/// A link to another electrical element through a spring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectricalConnection {
    /// The element at the other end.
    pub element: ElectricalElementId,
    /// Direction of the connecting spring from this element's point.
    pub octant: Octant,
}

/// An electrical element sitting on a point.
#[derive(Debug, Clone)]
pub struct ElectricalElement {
    /// The point carrying the element.
    pub point: PointId,
    /// Electrical material.
    pub material: ElectricalMaterialId,
    /// Kind of element.
    pub element_type: ElectricalElementType,
    /// Instance index, for instanced elements.
    pub instance_index: Option<u32>,
    /// Panel metadata bound by instance index.
    pub panel: Option<PanelElementMetadata>,
    /// Elements this one is connected to.
    pub connections: Vec<ElectricalConnection>,
}

/// Dense container of electrical elements.
#[derive(Debug, Clone, Default)]
pub struct ElectricalElements {
    elements: Vec<ElectricalElement>,
    by_instance: BTreeMap<u32, ElectricalElementId>,
    lamp_count: usize,
}

impl ElectricalElements {
    /// Create an empty container sized for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            by_instance: BTreeMap::new(),
            lamp_count: 0,
        }
    }

    /// Append an element.
    pub fn add(&mut self, element: ElectricalElement) -> ElectricalElementId {
        let id = ElectricalElementId::new(self.elements.len());
        if element.element_type == ElectricalElementType::Lamp {
            self.lamp_count += 1;
        }
        if let Some(instance_index) = element.instance_index {
            self.by_instance.insert(instance_index, id);
        }
        self.elements.push(element);
        id
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether there are no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of lamps.
    #[inline]
    pub fn lamp_count(&self) -> usize {
        self.lamp_count
    }

    /// Get an element, if `id` is in range.
    #[inline]
    pub fn get(&self, id: ElectricalElementId) -> Option<&ElectricalElement> {
        self.elements.get(id.index())
    }

    /// Find the element with the given instance index.
    pub fn by_instance(&self, instance_index: u32) -> Option<ElectricalElementId> {
        self.by_instance.get(&instance_index).copied()
    }

    /// Iterate over all elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, ElectricalElement> {
        self.elements.iter()
    }

    pub(crate) fn get_mut(&mut self, id: ElectricalElementId) -> &mut ElectricalElement {
        &mut self.elements[id.index()]
    }
}

impl Index<ElectricalElementId> for ElectricalElements {
    type Output = ElectricalElement;

    #[inline]
    fn index(&self, id: ElectricalElementId) -> &ElectricalElement {
        &self.elements[id.index()]
    }
}
