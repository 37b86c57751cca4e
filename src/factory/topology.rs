//! Spring and triangle inference over the point grid.
//!
//! Rows are visited bottom to top, cells left to right. At each point the
//! four forward octants (E, SE, S, SW) are examined, so every pair of grid
//! neighbors is visited exactly once. A triangle is formed between the point,
//! its neighbor in octant `i` and its neighbor in octant `i + 1`; the S-SW
//! and SW-W fans are only formed at the first point of a horizontal run,
//! because elsewhere the point to the west already produced them.
//!
//! ```text
//!   W . . . P --- E
//!          /|  \  |
//!        /  |    \|
//!      SW   S --- SE
//! ```

use super::types::{opposite, FactoryMesh, FactoryTriangle, OCTANT_E};
use crate::definition::materials::MaterialDatabase;
use crate::error::Result;

/// Octants checked for emptiness when deciding whether a point leaks.
const LEAK_OCTANTS: [usize; 4] = [0, 2, 4, 6];

/// Create grid springs and triangles, and flag leaking points.
pub(crate) fn build_topology(materials: &MaterialDatabase, mesh: &mut FactoryMesh) -> Result<()> {
    let width = mesh.matrix.ship_width();
    let height = mesh.matrix.ship_height();

    for y in 1..=height {
        let mut in_run = false;

        for x in 1..=width {
            let Some(point) = mesh.matrix.get(x, y) else {
                in_run = false;
                continue;
            };

            let is_hull = materials
                .structural(mesh.point(point).structural_material)
                .is_hull;
            if !is_hull
                && LEAK_OCTANTS
                    .iter()
                    .any(|&o| mesh.matrix.neighbor(x, y, o).is_none())
            {
                mesh.points[point.index()].is_leaking = true;
            }

            for octant in 0..4 {
                let Some(other) = mesh.matrix.neighbor(x, y, octant) else {
                    continue;
                };

                mesh.add_spring(point, octant, other, opposite(octant))?;

                if !in_run || octant < 2 {
                    if let Some(next) = mesh.matrix.neighbor(x, y, octant + 1) {
                        mesh.triangles.push(FactoryTriangle::new([point, other, next]));
                    }
                }

                // E present, SE missing: (P, E, S) covers the gap left by
                // E skipping its west fan
                if octant == OCTANT_E && mesh.matrix.neighbor(x, y, 1).is_none() {
                    if let Some(south) = mesh.matrix.neighbor(x, y, 2) {
                        mesh.triangles.push(FactoryTriangle::new([point, other, south]));
                    }
                }
            }

            in_run = true;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ShipCoordinates;
    use crate::factory::fixtures::Fixture;
    use crate::factory::scan::scan_grid;
    use crate::index::PointId;
    use nalgebra::Point2;

    fn run(f: &Fixture, rows: &[&str]) -> FactoryMesh {
        let definition = f.ship(rows);
        let mut mesh = FactoryMesh::new(definition.size());
        scan_grid(&definition, &f.materials, &mut mesh).unwrap();
        build_topology(&f.materials, &mut mesh).unwrap();
        mesh
    }

    fn signed_area(mesh: &FactoryMesh, points: [PointId; 3]) -> f32 {
        let [a, b, c]: [Point2<f32>; 3] = points.map(|p| mesh.point(p).position);
        (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
    }

    #[test]
    fn test_two_by_one() {
        let f = Fixture::new();
        let mesh = run(&f, &["##"]);

        assert_eq!(mesh.points.len(), 2);
        assert_eq!(mesh.springs.len(), 1);
        assert!(mesh.triangles.is_empty());
        assert_eq!(mesh.springs[0].point_a_octant, 0);
        assert_eq!(mesh.springs[0].point_b_octant, 4);
    }

    #[test]
    fn test_two_by_two() {
        let f = Fixture::new();
        let mesh = run(&f, &["##", "##"]);

        assert_eq!(mesh.points.len(), 4);
        // 4 sides and both diagonals
        assert_eq!(mesh.springs.len(), 6);
        assert_eq!(mesh.triangles.len(), 2);
        for t in &mesh.triangles {
            assert!(signed_area(&mesh, t.points) < 0.0);
        }
    }

    #[test]
    fn test_triangles_are_clockwise_with_holes() {
        let f = Fixture::new();
        let mesh = run(&f, &["#####.##", "#.######", "##.##..#", "########"]);
        assert!(!mesh.triangles.is_empty());
        for t in &mesh.triangles {
            assert!(signed_area(&mesh, t.points) < 0.0, "{:?}", t.points);
        }
    }

    #[test]
    fn test_irregular_triangle() {
        // P has E and S but no SE
        let f = Fixture::new();
        let mesh = run(&f, &["##", "#."]);

        assert_eq!(mesh.triangles.len(), 1);
        let p = mesh.matrix.at_ship(ShipCoordinates::new(0, 1)).unwrap();
        let e = mesh.matrix.at_ship(ShipCoordinates::new(1, 1)).unwrap();
        let s = mesh.matrix.at_ship(ShipCoordinates::new(0, 0)).unwrap();
        assert_eq!(mesh.triangles[0].points, [p, e, s]);
    }

    #[test]
    fn test_full_grid_counts() {
        // w x h grid: horizontal, vertical and two diagonals per cell square
        let f = Fixture::new();
        let mesh = run(&f, &["#####", "#####", "#####"]);
        let (w, h) = (5, 3);
        let expected_springs = (w - 1) * h + w * (h - 1) + 2 * (w - 1) * (h - 1);
        assert_eq!(mesh.springs.len(), expected_springs);
        assert_eq!(mesh.triangles.len(), 2 * (w - 1) * (h - 1));
    }

    #[test]
    fn test_leaking_predicate() {
        let f = Fixture::new();
        let mesh = run(&f, &["ooo", "ooo", "ooo"]);

        let center = mesh.matrix.at_ship(ShipCoordinates::new(1, 1)).unwrap();
        for (i, p) in mesh.points.iter().enumerate() {
            assert_eq!(p.is_leaking, i != center.index());
        }
    }

    #[test]
    fn test_hull_points_do_not_leak() {
        let f = Fixture::new();
        let mesh = run(&f, &["###", "#o#", "###"]);
        assert!(mesh.points.iter().all(|p| !p.is_leaking));
    }
}
