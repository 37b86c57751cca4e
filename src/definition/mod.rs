//! Raster ship definitions.
//!
//! A [`ShipDefinition`] is the input of the construction pipeline: a
//! structural raster of material ids, a list of ropes, an optional
//! electrical overlay with its panel metadata, an optional texture, and the
//! ship-to-world transform.
//!
//! # Coordinates
//!
//! Ship coordinates are integer cell coordinates with the origin at the
//! bottom-left cell and `y` growing upward. Textures follow the image
//! convention (row 0 at the top).
//!
//! # Example
//!
//! ```
//! use shipmesh::definition::{Layer, ShipCoordinates, ShipDefinition, ShipSize};
//! use shipmesh::definition::materials::{MaterialDatabase, StructuralMaterial};
//! use image::Rgba;
//!
//! let mut materials = MaterialDatabase::new();
//! let steel = materials.add_structural(StructuralMaterial::new("Steel", Rgba([90, 90, 90, 255])).hull());
//!
//! let mut structure = Layer::new(ShipSize::new(3, 2));
//! structure.fill(steel);
//! structure.clear(ShipCoordinates::new(1, 1));
//!
//! let definition = ShipDefinition::new(structure);
//! assert_eq!(definition.size(), ShipSize::new(3, 2));
//! ```

pub mod materials;

use std::collections::BTreeMap;
use std::fmt;

use image::{imageops, Rgba, RgbaImage};
use nalgebra::Vector2;

use crate::error::{BuildError, Result};
use crate::index::{ElectricalMaterialId, StructuralMaterialId};

/// Width and height of a ship raster, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShipSize {
    /// Number of columns.
    pub width: i32,
    /// Number of rows.
    pub height: i32,
}

impl ShipSize {
    /// Create a size.
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Number of cells.
    pub fn area(self) -> usize {
        self.width.max(0) as usize * self.height.max(0) as usize
    }

    /// Whether the coordinates lie inside the raster.
    #[inline]
    pub fn contains(self, coords: ShipCoordinates) -> bool {
        coords.x >= 0 && coords.y >= 0 && coords.x < self.width && coords.y < self.height
    }

    fn transposed(self) -> Self {
        Self::new(self.height, self.width)
    }
}

/// Integer cell coordinates, `y` up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShipCoordinates {
    /// Column.
    pub x: i32,
    /// Row, counted from the bottom.
    pub y: i32,
}

impl ShipCoordinates {
    /// Create coordinates.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ShipCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A dense raster of optional cell contents.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer<T> {
    size: ShipSize,
    cells: Vec<Option<T>>,
}

impl<T: Clone> Layer<T> {
    /// Create an empty layer.
    pub fn new(size: ShipSize) -> Self {
        Self {
            size,
            cells: vec![None; size.area()],
        }
    }

    /// Size of the layer.
    #[inline]
    pub fn size(&self) -> ShipSize {
        self.size
    }

    /// Get the content of a cell; out-of-range coordinates are empty.
    #[inline]
    pub fn get(&self, coords: ShipCoordinates) -> Option<&T> {
        if self.size.contains(coords) {
            self.cells[self.offset(coords)].as_ref()
        } else {
            None
        }
    }

    /// Set the content of a cell.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the layer.
    pub fn set(&mut self, coords: ShipCoordinates, value: T) {
        assert!(self.size.contains(coords), "cell {} outside layer", coords);
        let offset = self.offset(coords);
        self.cells[offset] = Some(value);
    }

    /// Empty a cell.
    ///
    /// # Panics
    /// Panics if the coordinates are outside the layer.
    pub fn clear(&mut self, coords: ShipCoordinates) {
        assert!(self.size.contains(coords), "cell {} outside layer", coords);
        let offset = self.offset(coords);
        self.cells[offset] = None;
    }

    /// Set every cell to the same value.
    pub fn fill(&mut self, value: T) {
        self.cells.iter_mut().for_each(|c| *c = Some(value.clone()));
    }

    /// Iterate over occupied cells in row-major order, bottom row first.
    pub fn occupied(&self) -> impl Iterator<Item = (ShipCoordinates, &T)> + '_ {
        let width = self.size.width.max(1);
        self.cells.iter().enumerate().filter_map(move |(i, c)| {
            c.as_ref().map(|v| {
                let i = i as i32;
                (ShipCoordinates::new(i % width, i / width), v)
            })
        })
    }

    #[inline]
    fn offset(&self, coords: ShipCoordinates) -> usize {
        (coords.x + coords.y * self.size.width) as usize
    }

    fn remapped<F>(&self, size: ShipSize, map: F) -> Self
    where
        F: Fn(ShipCoordinates) -> ShipCoordinates,
    {
        let mut result = Layer::new(size);
        for (coords, value) in self.occupied() {
            result.set(map(coords), value.clone());
        }
        result
    }
}

/// A rope between two grid cells.
#[derive(Debug, Clone, PartialEq)]
pub struct RopeElement {
    /// First endpoint.
    pub start: ShipCoordinates,
    /// Second endpoint.
    pub end: ShipCoordinates,
    /// Material of the rope's points and springs.
    pub material: StructuralMaterialId,
    /// Render color of the rope's points.
    pub render_color: Rgba<u8>,
}

/// Content of an electrical cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElectricalCell {
    /// Electrical material.
    pub material: ElectricalMaterialId,
    /// Instance index, for instanced materials.
    pub instance_index: Option<u32>,
}

/// Panel presentation of an instanced electrical element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PanelElementMetadata {
    /// Label shown on the panel.
    pub label: Option<String>,
    /// Position on the panel.
    pub panel_coordinates: Option<(i32, i32)>,
    /// Whether the element is hidden from the panel.
    pub is_hidden: bool,
}

/// Panel metadata keyed by electrical instance index.
pub type ElectricalPanel = BTreeMap<u32, PanelElementMetadata>;

/// The electrical overlay of a ship.
#[derive(Debug, Clone, PartialEq)]
pub struct ElectricalLayer {
    /// Electrical cells.
    pub cells: Layer<ElectricalCell>,
    /// Panel metadata.
    pub panel: ElectricalPanel,
}

impl ElectricalLayer {
    /// Create an empty overlay.
    pub fn new(size: ShipSize) -> Self {
        Self {
            cells: Layer::new(size),
            panel: ElectricalPanel::new(),
        }
    }
}

/// Ratio between ship cells and world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipScale {
    /// Ship cells.
    pub ship_units: f32,
    /// World units spanned by `ship_units` cells.
    pub world_units: f32,
}

impl ShipScale {
    /// World units per ship cell.
    #[inline]
    pub fn factor(&self) -> f32 {
        self.world_units / self.ship_units
    }
}

impl Default for ShipScale {
    fn default() -> Self {
        Self {
            ship_units: 1.0,
            world_units: 1.0,
        }
    }
}

/// Everything needed to build a ship.
#[derive(Debug, Clone)]
pub struct ShipDefinition {
    /// Structural raster.
    pub structure: Layer<StructuralMaterialId>,
    /// Ropes.
    pub ropes: Vec<RopeElement>,
    /// Optional electrical overlay.
    pub electrical: Option<ElectricalLayer>,
    /// Optional texture; generated from the structure when absent.
    pub texture: Option<RgbaImage>,
    /// Ship-to-world scale.
    pub scale: ShipScale,
    /// World offset of the ship's bottom-center.
    pub offset: Vector2<f32>,
}

impl ShipDefinition {
    /// Create a definition with only a structural layer.
    pub fn new(structure: Layer<StructuralMaterialId>) -> Self {
        Self {
            structure,
            ropes: Vec::new(),
            electrical: None,
            texture: None,
            scale: ShipScale::default(),
            offset: Vector2::zeros(),
        }
    }

    /// Add a rope.
    pub fn with_rope(mut self, rope: RopeElement) -> Self {
        self.ropes.push(rope);
        self
    }

    /// Attach an electrical overlay.
    pub fn with_electrical(mut self, electrical: ElectricalLayer) -> Self {
        self.electrical = Some(electrical);
        self
    }

    /// Attach a texture.
    pub fn with_texture(mut self, texture: RgbaImage) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Set the ship-to-world transform.
    pub fn with_transform(mut self, scale: ShipScale, offset: Vector2<f32>) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    /// Size of the structural raster.
    #[inline]
    pub fn size(&self) -> ShipSize {
        self.structure.size()
    }

    /// Check that every overlay matches the structural raster.
    pub fn validate(&self) -> Result<()> {
        let expected = self.size();
        if let Some(electrical) = &self.electrical {
            let actual = electrical.cells.size();
            if actual != expected {
                return Err(BuildError::LayerSizeMismatch {
                    layer: "electrical",
                    expected_width: expected.width,
                    expected_height: expected.height,
                    actual_width: actual.width,
                    actual_height: actual.height,
                });
            }
        }
        Ok(())
    }

    /// Mirror the ship left to right.
    pub fn flip_horizontally(&mut self) {
        let size = self.size();
        self.remap(size, move |c| ShipCoordinates::new(size.width - 1 - c.x, c.y));
        if let Some(texture) = &mut self.texture {
            imageops::flip_horizontal_in_place(texture);
        }
    }

    /// Mirror the ship top to bottom.
    pub fn flip_vertically(&mut self) {
        let size = self.size();
        self.remap(size, move |c| ShipCoordinates::new(c.x, size.height - 1 - c.y));
        if let Some(texture) = &mut self.texture {
            imageops::flip_vertical_in_place(texture);
        }
    }

    /// Rotate the ship a quarter turn clockwise; width and height swap.
    pub fn rotate_90_cw(&mut self) {
        let size = self.size();
        self.remap(size.transposed(), move |c| {
            ShipCoordinates::new(c.y, size.width - 1 - c.x)
        });
        if let Some(texture) = &mut self.texture {
            *texture = imageops::rotate90(&*texture);
        }
    }

    fn remap<F>(&mut self, new_size: ShipSize, map: F)
    where
        F: Fn(ShipCoordinates) -> ShipCoordinates + Copy,
    {
        self.structure = self.structure.remapped(new_size, map);
        if let Some(electrical) = &mut self.electrical {
            electrical.cells = electrical.cells.remapped(new_size, map);
        }
        for rope in &mut self.ropes {
            rope.start = map(rope.start);
            rope.end = map(rope.end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material(i: usize) -> StructuralMaterialId {
        StructuralMaterialId::new(i)
    }

    #[test]
    fn test_layer_get_set() {
        let mut layer = Layer::new(ShipSize::new(3, 2));
        layer.set(ShipCoordinates::new(2, 1), material(4));

        assert_eq!(layer.get(ShipCoordinates::new(2, 1)), Some(&material(4)));
        assert_eq!(layer.get(ShipCoordinates::new(0, 0)), None);
        assert_eq!(layer.get(ShipCoordinates::new(3, 0)), None);
        assert_eq!(layer.get(ShipCoordinates::new(-1, 0)), None);
    }

    #[test]
    fn test_occupied_order_is_row_major_from_bottom() {
        let mut layer = Layer::new(ShipSize::new(2, 2));
        layer.fill(material(0));
        let coords: Vec<_> = layer.occupied().map(|(c, _)| c).collect();
        assert_eq!(
            coords,
            vec![
                ShipCoordinates::new(0, 0),
                ShipCoordinates::new(1, 0),
                ShipCoordinates::new(0, 1),
                ShipCoordinates::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_flips() {
        let mut layer = Layer::new(ShipSize::new(3, 2));
        layer.set(ShipCoordinates::new(0, 0), material(1));
        let mut def = ShipDefinition::new(layer).with_rope(RopeElement {
            start: ShipCoordinates::new(0, 0),
            end: ShipCoordinates::new(2, 1),
            material: material(1),
            render_color: Rgba([0, 0, 0, 255]),
        });

        def.flip_horizontally();
        assert_eq!(def.structure.get(ShipCoordinates::new(2, 0)), Some(&material(1)));
        assert_eq!(def.ropes[0].start, ShipCoordinates::new(2, 0));
        assert_eq!(def.ropes[0].end, ShipCoordinates::new(0, 1));

        def.flip_vertically();
        assert_eq!(def.structure.get(ShipCoordinates::new(2, 1)), Some(&material(1)));
        assert_eq!(def.ropes[0].end, ShipCoordinates::new(0, 0));
    }

    #[test]
    fn test_rotate_90_cw() {
        // Bottom-left cell of a 3x2 ship ends up top-left of the 2x3 result
        let mut layer = Layer::new(ShipSize::new(3, 2));
        layer.set(ShipCoordinates::new(0, 0), material(1));
        layer.set(ShipCoordinates::new(2, 1), material(2));
        let mut def = ShipDefinition::new(layer).with_texture(RgbaImage::new(3, 2));

        def.rotate_90_cw();

        assert_eq!(def.size(), ShipSize::new(2, 3));
        assert_eq!(def.structure.get(ShipCoordinates::new(0, 2)), Some(&material(1)));
        assert_eq!(def.structure.get(ShipCoordinates::new(1, 0)), Some(&material(2)));
        let texture = def.texture.as_ref().unwrap();
        assert_eq!((texture.width(), texture.height()), (2, 3));
    }

    #[test]
    fn test_validate_layer_sizes() {
        let def = ShipDefinition::new(Layer::new(ShipSize::new(3, 2)))
            .with_electrical(ElectricalLayer::new(ShipSize::new(2, 2)));
        assert!(matches!(
            def.validate(),
            Err(BuildError::LayerSizeMismatch { layer: "electrical", .. })
        ));
    }
}
