//! Structural and electrical materials.
//!
//! A [`MaterialDatabase`] owns every material a ship definition may refer to
//! and hands out typed ids. Materials with a symbolic role in construction
//! (air, glass, rope, water) are registered as *unique* materials and can be
//! looked up by their [`MaterialUniqueType`].

use image::Rgba;
use nalgebra::Vector4;

use crate::error::{BuildError, Result};
use crate::index::{ElectricalMaterialId, StructuralMaterialId};

/// Symbolic roles a structural material can play during construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialUniqueType {
    /// Empty, breathable space.
    Air,
    /// Glass.
    Glass,
    /// The default rope material.
    Rope,
    /// Water; cells of this material become air points pre-filled with water.
    Water,
}

impl MaterialUniqueType {
    const COUNT: usize = 4;

    fn slot(self) -> usize {
        match self {
            MaterialUniqueType::Air => 0,
            MaterialUniqueType::Glass => 1,
            MaterialUniqueType::Rope => 2,
            MaterialUniqueType::Water => 3,
        }
    }
}

/// A material that points and springs are made of.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralMaterial {
    /// Human-readable name.
    pub name: String,
    /// Color used when rendering points of this material.
    pub render_color: Rgba<u8>,
    /// Breaking strength.
    pub strength: f32,
    /// Nominal mass of a point of this material.
    pub nominal_mass: f32,
    /// Spring stiffness.
    pub stiffness: f32,
    /// Whether the material is watertight.
    pub is_hull: bool,
    /// Symbolic role, if any.
    pub unique_type: Option<MaterialUniqueType>,
}

impl StructuralMaterial {
    /// Create a non-hull material with unit strength, mass and stiffness.
    pub fn new(name: impl Into<String>, render_color: Rgba<u8>) -> Self {
        Self {
            name: name.into(),
            render_color,
            strength: 1.0,
            nominal_mass: 1.0,
            stiffness: 1.0,
            is_hull: false,
            unique_type: None,
        }
    }

    /// Mark the material as watertight.
    pub fn hull(mut self) -> Self {
        self.is_hull = true;
        self
    }

    /// Set the breaking strength.
    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = strength;
        self
    }

    /// Set the nominal mass.
    pub fn with_mass(mut self, nominal_mass: f32) -> Self {
        self.nominal_mass = nominal_mass;
        self
    }

    /// Set the spring stiffness.
    pub fn with_stiffness(mut self, stiffness: f32) -> Self {
        self.stiffness = stiffness;
        self
    }

    /// Give the material a symbolic role.
    pub fn with_unique_type(mut self, unique_type: MaterialUniqueType) -> Self {
        self.unique_type = Some(unique_type);
        self
    }

    /// Whether the material plays the given symbolic role.
    #[inline]
    pub fn is_unique_type(&self, unique_type: MaterialUniqueType) -> bool {
        self.unique_type == Some(unique_type)
    }

    /// Render color as normalized RGBA.
    pub fn render_color_f32(&self) -> Vector4<f32> {
        rgba_to_vector(self.render_color)
    }
}

/// Convert an 8-bit color to normalized RGBA.
pub fn rgba_to_vector(color: Rgba<u8>) -> Vector4<f32> {
    let [r, g, b, a] = color.0;
    Vector4::new(
        r as f32 / 255.0,
        g as f32 / 255.0,
        b as f32 / 255.0,
        a as f32 / 255.0,
    )
}

/// Kinds of electrical element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElectricalElementType {
    /// Conducts current between neighbors.
    Cable,
    /// Propulsion.
    Engine,
    /// Produces current.
    Generator,
    /// Emits light when powered.
    Lamp,
    /// A switch operated from the electrical panel.
    InteractiveSwitch,
    /// A switch driven by the simulation.
    AutomaticSwitch,
    /// Shows power state on the panel.
    PowerMonitor,
    /// Any other consumer.
    OtherSink,
}

/// A material for electrical elements.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricalMaterial {
    /// Human-readable name.
    pub name: String,
    /// What the element does.
    pub electrical_type: ElectricalElementType,
    /// Whether each element of this material carries its own instance index.
    pub is_instanced: bool,
}

impl ElectricalMaterial {
    /// Create a non-instanced electrical material.
    pub fn new(name: impl Into<String>, electrical_type: ElectricalElementType) -> Self {
        Self {
            name: name.into(),
            electrical_type,
            is_instanced: false,
        }
    }

    /// Mark the material as instanced.
    pub fn instanced(mut self) -> Self {
        self.is_instanced = true;
        self
    }

    /// Whether a rope whose endpoint carries this material propagates it
    /// along its interior points.
    pub fn propagates_along_ropes(&self) -> bool {
        !self.is_instanced
            && matches!(
                self.electrical_type,
                ElectricalElementType::Cable
                    | ElectricalElementType::Generator
                    | ElectricalElementType::Lamp
            )
    }
}

/// Owns every material a ship may be built from.
#[derive(Debug, Clone, Default)]
pub struct MaterialDatabase {
    structural: Vec<StructuralMaterial>,
    electrical: Vec<ElectricalMaterial>,
    unique: [Option<StructuralMaterialId>; MaterialUniqueType::COUNT],
}

impl MaterialDatabase {
    /// Create an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a structural material, registering it as unique if it has a role.
    ///
    /// A later material with the same role replaces the earlier registration.
    pub fn add_structural(&mut self, material: StructuralMaterial) -> StructuralMaterialId {
        let id = StructuralMaterialId::new(self.structural.len());
        if let Some(unique_type) = material.unique_type {
            self.unique[unique_type.slot()] = Some(id);
        }
        self.structural.push(material);
        id
    }

    /// Add an electrical material.
    pub fn add_electrical(&mut self, material: ElectricalMaterial) -> ElectricalMaterialId {
        let id = ElectricalMaterialId::new(self.electrical.len());
        self.electrical.push(material);
        id
    }

    /// Get a structural material.
    ///
    /// # Panics
    /// Panics if the id was not issued by this database.
    #[inline]
    pub fn structural(&self, id: StructuralMaterialId) -> &StructuralMaterial {
        &self.structural[id.index()]
    }

    /// Get an electrical material.
    ///
    /// # Panics
    /// Panics if the id was not issued by this database.
    #[inline]
    pub fn electrical(&self, id: ElectricalMaterialId) -> &ElectricalMaterial {
        &self.electrical[id.index()]
    }

    /// Look up the unique material registered for a role.
    pub fn unique_structural(&self, unique_type: MaterialUniqueType) -> Result<StructuralMaterialId> {
        self.unique[unique_type.slot()].ok_or(BuildError::MissingUniqueMaterial { unique_type })
    }

    /// Number of structural materials.
    pub fn num_structural(&self) -> usize {
        self.structural.len()
    }

    /// Number of electrical materials.
    pub fn num_electrical(&self) -> usize {
        self.electrical.len()
    }
}
