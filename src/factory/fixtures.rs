//! Small hand-drawn ships for stage tests.
//!
//! Rows are given top first, the way they read on screen:
//! `#` hull steel, `o` non-hull wood, `~` water, `r` rope material,
//! `.` empty.

use image::Rgba;

use crate::definition::materials::{MaterialDatabase, MaterialUniqueType, StructuralMaterial};
use crate::definition::{Layer, RopeElement, ShipCoordinates, ShipDefinition, ShipSize};
use crate::index::StructuralMaterialId;

pub(crate) struct Fixture {
    pub materials: MaterialDatabase,
    pub steel: StructuralMaterialId,
    pub wood: StructuralMaterialId,
    pub air: StructuralMaterialId,
    pub water: StructuralMaterialId,
    pub rope: StructuralMaterialId,
}

impl Fixture {
    pub fn new() -> Self {
        let mut materials = MaterialDatabase::new();
        let steel = materials.add_structural(
            StructuralMaterial::new("Steel", Rgba([90, 90, 100, 255]))
                .hull()
                .with_strength(4.0)
                .with_mass(2.0)
                .with_stiffness(2.0),
        );
        let wood = materials.add_structural(
            StructuralMaterial::new("Wood", Rgba([140, 90, 40, 255]))
                .with_strength(1.0)
                .with_stiffness(1.0),
        );
        let air = materials.add_structural(
            StructuralMaterial::new("Air", Rgba([255, 255, 255, 0]))
                .with_unique_type(MaterialUniqueType::Air),
        );
        let water = materials.add_structural(
            StructuralMaterial::new("Water", Rgba([0, 0, 255, 255]))
                .with_unique_type(MaterialUniqueType::Water),
        );
        let rope = materials.add_structural(
            StructuralMaterial::new("Rope", Rgba([200, 160, 60, 255]))
                .with_unique_type(MaterialUniqueType::Rope)
                .with_strength(0.5),
        );
        Self {
            materials,
            steel,
            wood,
            air,
            water,
            rope,
        }
    }

    pub fn ship(&self, rows: &[&str]) -> ShipDefinition {
        let height = rows.len() as i32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as i32;
        let mut layer = Layer::new(ShipSize::new(width, height));
        for (row, line) in rows.iter().enumerate() {
            let y = height - 1 - row as i32;
            for (x, c) in line.chars().enumerate() {
                let material = match c {
                    '#' => self.steel,
                    'o' => self.wood,
                    '~' => self.water,
                    'r' => self.rope,
                    _ => continue,
                };
                layer.set(ShipCoordinates::new(x as i32, y), material);
            }
        }
        ShipDefinition::new(layer)
    }

    /// A fully occupied rectangle of one material.
    pub fn block(&self, width: i32, height: i32, material: StructuralMaterialId) -> ShipDefinition {
        let mut layer = Layer::new(ShipSize::new(width, height));
        layer.fill(material);
        ShipDefinition::new(layer)
    }
}

pub(crate) fn rope(f: &Fixture, start: (i32, i32), end: (i32, i32)) -> RopeElement {
    RopeElement {
        start: ShipCoordinates::new(start.0, start.1),
        end: ShipCoordinates::new(end.0, end.1),
        material: f.rope,
        render_color: Rgba([180, 30, 30, 255]),
    }
}
