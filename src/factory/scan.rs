//! Grid scanning: one point per occupied cell.
//!
//! Cells are visited column by column, each column bottom to top, so point
//! indices follow that order. Rope endpoints turn their cells into rope
//! points even where the structural layer is empty, water cells become air
//! points pre-filled with water, and the electrical overlay decorates the
//! points beneath it.

use std::collections::HashMap;

use nalgebra::{Point2, Vector2};

use super::types::{FactoryMesh, FactoryPoint};
use crate::definition::materials::{rgba_to_vector, MaterialDatabase, MaterialUniqueType};
use crate::definition::{RopeElement, ShipCoordinates, ShipDefinition, ShipSize};
use crate::error::{BuildError, Result};
use crate::physics::OccupiedRegion;

/// Maps continuous ship-space positions to world and texture space.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ShipSpace {
    size: ShipSize,
    scale: f32,
    offset: Vector2<f32>,
}

impl ShipSpace {
    pub fn new(definition: &ShipDefinition) -> Self {
        Self {
            size: definition.size(),
            scale: definition.scale.factor(),
            offset: definition.offset,
        }
    }

    /// World position; the ship is centered horizontally on the offset.
    #[inline]
    pub fn to_world(&self, ship: Point2<f32>) -> Point2<f32> {
        let half_width = self.size.width as f32 / 2.0;
        Point2::new(ship.x - half_width, ship.y) * self.scale + self.offset
    }

    /// Texture coordinates of the center of the cell at `ship`.
    #[inline]
    pub fn texture_coordinates(&self, ship: Point2<f32>) -> Point2<f32> {
        let w = self.size.width as f32;
        let h = self.size.height as f32;
        Point2::new(ship.x / w + 0.5 / w, ship.y / h + 0.5 / h)
    }
}

#[inline]
pub(crate) fn cell_center(coords: ShipCoordinates) -> Point2<f32> {
    Point2::new(coords.x as f32, coords.y as f32)
}

/// Create a point for every occupied cell and fill the index matrix.
///
/// # Returns
/// The bounding box of the occupied cells.
pub(crate) fn scan_grid(
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    mesh: &mut FactoryMesh,
) -> Result<OccupiedRegion> {
    let size = definition.size();
    let space = ShipSpace::new(definition);
    let rope_endpoints = collect_rope_endpoints(definition)?;

    let mut region: Option<OccupiedRegion> = None;

    for x in 0..size.width {
        for y in 0..size.height {
            let coords = ShipCoordinates::new(x, y);
            let rope = rope_endpoints.get(&coords);
            let structural = definition.structure.get(coords).copied();

            let point = match (rope, structural) {
                (Some(rope), _) => {
                    let mut point = FactoryPoint::new(
                        Some(coords),
                        space.to_world(cell_center(coords)),
                        space.texture_coordinates(cell_center(coords)),
                        rgba_to_vector(rope.render_color),
                        rope.material,
                    );
                    point.is_rope = true;
                    point.is_leaking = true;
                    point
                }
                (None, Some(material_id)) => {
                    let mut material_id = material_id;
                    let mut water = 0.0;
                    if materials
                        .structural(material_id)
                        .is_unique_type(MaterialUniqueType::Water)
                    {
                        material_id = materials.unique_structural(MaterialUniqueType::Air)?;
                        water = 1.0;
                    }
                    let material = materials.structural(material_id);
                    let mut point = FactoryPoint::new(
                        Some(coords),
                        space.to_world(cell_center(coords)),
                        space.texture_coordinates(cell_center(coords)),
                        material.render_color_f32(),
                        material_id,
                    );
                    point.is_rope = material.is_unique_type(MaterialUniqueType::Rope);
                    point.is_leaking = point.is_rope;
                    point.water = water;
                    point
                }
                (None, None) => continue,
            };

            let id = mesh.add_point(point);
            mesh.matrix.set_ship(coords, id);

            region = Some(match region {
                Some(r) => r.including(coords),
                None => OccupiedRegion::new(coords, coords),
            });
        }
    }

    let region = region.ok_or(BuildError::EmptyShip)?;

    decorate_with_electrical(definition, mesh)?;

    Ok(region)
}

fn collect_rope_endpoints(
    definition: &ShipDefinition,
) -> Result<HashMap<ShipCoordinates, &RopeElement>> {
    let size = definition.size();
    let mut endpoints = HashMap::with_capacity(definition.ropes.len() * 2);
    for (index, rope) in definition.ropes.iter().enumerate() {
        for endpoint in [rope.start, rope.end] {
            if !size.contains(endpoint) {
                return Err(BuildError::MalformedRope {
                    rope: index,
                    x: endpoint.x,
                    y: endpoint.y,
                });
            }
            // A cell shared by several ropes keeps the first one
            endpoints.entry(endpoint).or_insert(rope);
        }
    }
    Ok(endpoints)
}

fn decorate_with_electrical(definition: &ShipDefinition, mesh: &mut FactoryMesh) -> Result<()> {
    let Some(electrical) = &definition.electrical else {
        return Ok(());
    };

    let mut instances: HashMap<u32, ShipCoordinates> = HashMap::new();

    for (coords, cell) in electrical.cells.occupied() {
        let point = mesh
            .matrix
            .at_ship(coords)
            .ok_or(BuildError::OrphanElectricalElement {
                x: coords.x,
                y: coords.y,
            })?;

        if let Some(instance_index) = cell.instance_index {
            if let Some(first) = instances.insert(instance_index, coords) {
                return Err(BuildError::DuplicateElectricalInstance {
                    instance_index,
                    first_x: first.x,
                    first_y: first.y,
                    second_x: coords.x,
                    second_y: coords.y,
                });
            }
        }

        let point = &mut mesh.points[point.index()];
        point.electrical_material = Some(cell.material);
        point.electrical_instance = cell.instance_index;
    }

    Ok(())
}
