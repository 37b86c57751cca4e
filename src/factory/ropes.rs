//! Rope rasterization.
//!
//! Each rope is walked from its start endpoint to its end endpoint along its
//! wider axis, one cell per step, in the manner of a DDA line. Every step
//! produces a rope point with no grid cell, chained to the previous one by a
//! spring; a final spring reaches the end endpoint. Ropes whose endpoints are
//! grid neighbors produce nothing here, since tessellation already connects
//! them.

use nalgebra::Point2;

use super::scan::{cell_center, ShipSpace};
use super::types::{FactoryMesh, FactoryPoint, Octant};
use crate::definition::materials::{rgba_to_vector, MaterialDatabase};
use crate::definition::{RopeElement, ShipDefinition};
use crate::error::{BuildError, Result};
use crate::index::{ElectricalMaterialId, PointId};

/// Rasterize every rope of the definition.
///
/// # Returns
/// The number of rope points created.
pub(crate) fn rasterize_ropes(
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    mesh: &mut FactoryMesh,
) -> Result<usize> {
    let space = ShipSpace::new(definition);
    let points_before = mesh.points.len();

    for (index, rope) in definition.ropes.iter().enumerate() {
        let endpoint = |coords: crate::definition::ShipCoordinates| {
            mesh.matrix
                .at_ship(coords)
                .ok_or(BuildError::MalformedRope {
                    rope: index,
                    x: coords.x,
                    y: coords.y,
                })
        };
        let start = endpoint(rope.start)?;
        let end = endpoint(rope.end)?;

        if (rope.end.x - rope.start.x).abs() <= 1 && (rope.end.y - rope.start.y).abs() <= 1 {
            continue;
        }

        rasterize_rope(rope, start, end, &space, materials, mesh)?;
    }

    Ok(mesh.points.len() - points_before)
}

/// Octants `(toward start, toward end)` for a rope heading `(dx, dy)`.
fn rope_octants(dx: f32, dy: f32) -> (Octant, Octant) {
    match (dx > 0.0, dy > 0.0) {
        (true, true) => (3, 7),
        (true, false) => (5, 1),
        (false, true) => (1, 5),
        (false, false) => (7, 3),
    }
}

fn rasterize_rope(
    rope: &RopeElement,
    start: PointId,
    end: PointId,
    space: &ShipSpace,
    materials: &MaterialDatabase,
    mesh: &mut FactoryMesh,
) -> Result<()> {
    let start_pos = cell_center(rope.start);
    let end_pos = cell_center(rope.end);
    let dx = end_pos.x - start_pos.x;
    let dy = end_pos.y - start_pos.y;

    // Walk along the wide axis; `n` is the narrow one
    let x_is_wide = dx.abs() > dy.abs();
    let (start_w, start_n, end_w, end_n) = if x_is_wide {
        (start_pos.x, start_pos.y, end_pos.x, end_pos.y)
    } else {
        (start_pos.y, start_pos.x, end_pos.y, end_pos.x)
    };
    let slope = (end_n - start_n) / (end_w - start_w);
    let step_w = if end_w > start_w { 1.0 } else { -1.0 };
    let half_w = (end_w - start_w).abs() / 2.0;

    let (octant_start, octant_end) = rope_octants(dx, dy);

    let propagated = |p: PointId| -> Option<ElectricalMaterialId> {
        let point = mesh.point(p);
        point
            .electrical_material
            .filter(|&m| materials.electrical(m).propagates_along_ropes())
    };
    let start_electrical = propagated(start);
    let end_electrical = propagated(end);

    let render_color = rgba_to_vector(rope.render_color);

    let mut current = start;
    let mut cur_w = start_w;
    let mut cur_n = start_n;
    loop {
        cur_w += step_w;
        cur_n += slope * step_w;
        if (end_w - cur_w).abs() <= 0.5 {
            break;
        }

        let ship = if x_is_wide {
            Point2::new(cur_w, cur_n)
        } else {
            Point2::new(cur_n, cur_w)
        };

        let mut point = FactoryPoint::new(
            None,
            space.to_world(ship),
            space.texture_coordinates(ship),
            render_color,
            rope.material,
        );
        point.is_rope = true;
        point.is_leaking = true;
        point.electrical_material = if (cur_w - start_w).abs() <= half_w {
            start_electrical
        } else {
            end_electrical
        };

        let next = mesh.add_point(point);
        mesh.add_spring(current, octant_end, next, octant_start)?;
        current = next;
    }

    mesh.add_spring(current, octant_end, end, octant_start)?;

    Ok(())
}
