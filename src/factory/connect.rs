//! Triangle filtering and spring/triangle cross-linking.

use super::types::FactoryMesh;
use crate::error::{BuildError, Result};
use crate::index::{PointId, TriangleId};

/// Drop triangles that only exist because rope endpoints happen to be
/// grid neighbors.
///
/// A triangle goes when all three vertices are rope points and at least one
/// of them has no spring to a non-rope point.
///
/// # Returns
/// The number of triangles removed.
pub(crate) fn filter_rope_triangles(mesh: &mut FactoryMesh) -> usize {
    let before = mesh.triangles.len();

    let keep: Vec<bool> = mesh
        .triangles
        .iter()
        .map(|t| {
            let all_rope = t.points.iter().all(|&p| mesh.point(p).is_rope);
            !(all_rope && t.points.iter().any(|&p| !is_connected_to_non_rope(mesh, p)))
        })
        .collect();

    let triangles = std::mem::take(&mut mesh.triangles);
    mesh.triangles = triangles
        .into_iter()
        .zip(keep)
        .filter_map(|(t, keep)| keep.then_some(t))
        .collect();

    before - mesh.triangles.len()
}

fn is_connected_to_non_rope(mesh: &FactoryMesh, p: PointId) -> bool {
    mesh.point(p).connected_springs.iter().any(|&s| {
        let spring = mesh.spring(s);
        !mesh.point(spring.point_a).is_rope || !mesh.point(spring.point_b).is_rope
    })
}

/// Record on each point the triangles it is a vertex of.
pub(crate) fn connect_points_to_triangles(mesh: &mut FactoryMesh) {
    for (t, triangle) in mesh.triangles.iter().enumerate() {
        for p in triangle.points {
            mesh.points[p.index()].connected_triangles.push(TriangleId::new(t));
        }
    }
}

/// Link every triangle with its three edge springs, then find traverse
/// springs: diagonals covered by two triangles without being an edge of
/// either.
///
/// # Returns
/// The number of traverse springs found.
pub(crate) fn link_springs_and_triangles(mesh: &mut FactoryMesh) -> Result<usize> {
    for t in 0..mesh.triangles.len() {
        let points = mesh.triangles[t].points;
        for i in 0..3 {
            let a = points[i];
            let b = points[(i + 1) % 3];
            let s = mesh.spring_between(a, b).ok_or_else(|| {
                BuildError::invariant(format!(
                    "triangle {} has no spring between {:?} and {:?}",
                    t, a, b
                ))
            })?;

            let spring = &mut mesh.springs[s.index()];
            if spring.super_triangles.len() == 2 {
                return Err(BuildError::invariant(format!(
                    "spring {:?} is an edge of more than two triangles",
                    s
                )));
            }
            spring.super_triangles.push(TriangleId::new(t));
            spring.covering_triangles_count += 1;

            mesh.triangles[t].springs.push(s);
        }
    }

    let mut traverse_count = 0;

    for s in 0..mesh.springs.len() {
        let spring = &mesh.springs[s];
        let [t0, t1] = match spring.super_triangles[..] {
            [t0, t1] => [t0, t1],
            _ => continue,
        };
        let (a, b) = (spring.point_a, spring.point_b);

        let (Some(v0), Some(v1)) = (third_vertex(mesh, t0, a, b), third_vertex(mesh, t1, a, b)) else {
            continue;
        };
        let Some(traverse) = mesh.spring_between(v0, v1) else {
            continue;
        };

        let traverse_spring = &mut mesh.springs[traverse.index()];
        if !traverse_spring.super_triangles.is_empty() {
            log::warn!(
                "spring {:?} is covered by triangles {:?} and {:?} but is already an edge",
                traverse,
                t0,
                t1
            );
            continue;
        }
        traverse_spring.covering_triangles_count += 2;

        mesh.springs[s].covered_traverse_spring = Some(traverse);
        mesh.triangles[t0.index()].covered_traverse_spring = Some(traverse);
        mesh.triangles[t1.index()].covered_traverse_spring = Some(traverse);
        traverse_count += 1;
    }

    Ok(traverse_count)
}

fn third_vertex(mesh: &FactoryMesh, t: TriangleId, a: PointId, b: PointId) -> Option<PointId> {
    mesh.triangles[t.index()]
        .points
        .iter()
        .copied()
        .find(|&p| p != a && p != b)
}
