//! Ship textures.
//!
//! A ship definition may come with a pre-rendered texture. When it doesn't,
//! a [`ShipTexturizer`] generates one from the structural layer.

use image::{Rgba, RgbaImage};

use crate::definition::materials::MaterialDatabase;
use crate::definition::{ShipCoordinates, ShipDefinition};

/// Generates a texture for a ship that has none.
pub trait ShipTexturizer {
    /// Render the texture of `definition`.
    fn texturize(&self, definition: &ShipDefinition, materials: &MaterialDatabase) -> RgbaImage;
}

/// Paints each occupied cell with its material's render color.
///
/// The image has one pixel per cell, top row first; empty cells are
/// transparent.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatTexturizer;

impl ShipTexturizer for FlatTexturizer {
    fn texturize(&self, definition: &ShipDefinition, materials: &MaterialDatabase) -> RgbaImage {
        let size = definition.size();
        let width = size.width.max(0) as u32;
        let height = size.height.max(0) as u32;

        RgbaImage::from_fn(width, height, |px, py| {
            let coords = ShipCoordinates::new(px as i32, (height - 1 - py) as i32);
            definition
                .structure
                .get(coords)
                .map(|&m| materials.structural(m).render_color)
                .unwrap_or(Rgba([0, 0, 0, 0]))
        })
    }
}

/// The definition's own texture, or one made by `texturizer`.
pub(crate) fn resolve_texture(
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    texturizer: &dyn ShipTexturizer,
) -> RgbaImage {
    match &definition.texture {
        Some(texture) => texture.clone(),
        None => texturizer.texturize(definition, materials),
    }
}
