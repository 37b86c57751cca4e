//! Final container materialization and post-build verification.
//!
//! Factory records are consumed in their final order and appended to the
//! simulation containers, so container ids equal factory positions. Point
//! and spring properties are seeded from their materials here.

use rayon::prelude::*;

use super::frontiers::is_closed_loop;
use super::types::FactoryMesh;
use crate::definition::materials::MaterialDatabase;
use crate::definition::ShipDefinition;
use crate::error::{BuildError, Result};
use crate::index::{PointId, SpringId};
use crate::physics::{
    ConnectedSpring, ConnectedTriangle, ElectricalConnection, ElectricalElement,
    ElectricalElements, Frontier, Frontiers, Point, Points, SimulationParameters, Spring, Springs,
    Triangle, Triangles,
};

/// The containers of a ship, before texture and statistics are attached.
#[derive(Debug, Clone)]
pub(crate) struct Containers {
    pub points: Points,
    pub springs: Springs,
    pub triangles: Triangles,
    pub electrical_elements: ElectricalElements,
    pub frontiers: Frontiers,
}

/// Turn the factory mesh into simulation containers.
pub(crate) fn materialize(
    mesh: FactoryMesh,
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    parameters: &SimulationParameters,
) -> Result<Containers> {
    let mut points = make_points(&mesh, materials, parameters);
    let springs = make_springs(&mesh, materials, parameters);
    let triangles = make_triangles(&mesh)?;
    let electrical_elements = make_electrical_elements(&mesh, definition, materials, &mut points)?;

    let mut frontiers = Frontiers::with_capacity(mesh.frontiers.len());
    for frontier in mesh.frontiers {
        frontiers.add(Frontier {
            frontier_type: frontier.frontier_type,
            edges: frontier.edges,
        });
    }

    Ok(Containers {
        points,
        springs,
        triangles,
        electrical_elements,
        frontiers,
    })
}

fn make_points(
    mesh: &FactoryMesh,
    materials: &MaterialDatabase,
    parameters: &SimulationParameters,
) -> Points {
    let mut points = Points::with_capacity(mesh.points.len());

    for (p, point) in mesh.points.iter().enumerate() {
        let id = PointId::new(p);
        let material = materials.structural(point.structural_material);

        let connected_springs = point
            .connected_springs
            .iter()
            .map(|&s| {
                let spring = mesh.spring(s);
                let octant = if spring.point_a == id {
                    spring.point_a_octant
                } else {
                    spring.point_b_octant
                };
                ConnectedSpring {
                    spring: s,
                    other_endpoint: spring.other_endpoint(id),
                    octant,
                }
            })
            .collect();

        let connected_triangles = point
            .connected_triangles
            .iter()
            .map(|&t| ConnectedTriangle {
                triangle: t,
                is_owner: mesh.triangles[t.index()].points[0] == id,
            })
            .collect();

        points.add(Point {
            definition_coordinates: point.definition_coordinates,
            position: point.position,
            texture_coordinates: point.texture_coordinates,
            render_color: point.render_color,
            structural_material: point.structural_material,
            mass: material.nominal_mass * parameters.mass_adjustment,
            strength: material.strength * parameters.strength_adjustment,
            is_rope: point.is_rope,
            is_leaking: point.is_leaking,
            water: point.water,
            electrical_element: None,
            connected_springs,
            connected_triangles,
        });
    }

    points
}

fn make_springs(
    mesh: &FactoryMesh,
    materials: &MaterialDatabase,
    parameters: &SimulationParameters,
) -> Springs {
    let mut springs = Springs::with_capacity(mesh.springs.len());

    for spring in &mesh.springs {
        let a = mesh.point(spring.point_a);
        let b = mesh.point(spring.point_b);
        let material_a = materials.structural(a.structural_material);
        let material_b = materials.structural(b.structural_material);

        let weaker = if material_b.strength < material_a.strength {
            b.structural_material
        } else {
            a.structural_material
        };

        springs.add(Spring {
            point_a: spring.point_a,
            point_a_octant: spring.point_a_octant,
            point_b: spring.point_b,
            point_b_octant: spring.point_b_octant,
            super_triangles: spring.super_triangles.clone(),
            covering_triangles_count: spring.covering_triangles_count,
            material: weaker,
            rest_length: (b.position - a.position).norm(),
            stiffness: (material_a.stiffness + material_b.stiffness) / 2.0
                * parameters.stiffness_adjustment,
            strength: material_a.strength.min(material_b.strength) * parameters.strength_adjustment,
        });
    }

    springs
}

fn make_triangles(mesh: &FactoryMesh) -> Result<Triangles> {
    let mut triangles = Triangles::with_capacity(mesh.triangles.len());

    for (t, triangle) in mesh.triangles.iter().enumerate() {
        let springs: [SpringId; 3] = triangle.springs.as_slice().try_into().map_err(|_| {
            BuildError::invariant(format!(
                "triangle {} has {} edge springs",
                t,
                triangle.springs.len()
            ))
        })?;
        triangles.add(Triangle {
            points: triangle.points,
            springs,
            covered_traverse_spring: triangle.covered_traverse_spring,
        });
    }

    Ok(triangles)
}

fn make_electrical_elements(
    mesh: &FactoryMesh,
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    points: &mut Points,
) -> Result<ElectricalElements> {
    let count = mesh
        .points
        .iter()
        .filter(|p| p.electrical_material.is_some())
        .count();
    let mut elements = ElectricalElements::with_capacity(count);

    for (p, point) in mesh.points.iter().enumerate() {
        let Some(material_id) = point.electrical_material else {
            continue;
        };
        let id = PointId::new(p);
        let element = elements.add(ElectricalElement {
            point: id,
            material: material_id,
            element_type: materials.electrical(material_id).electrical_type,
            instance_index: point.electrical_instance,
            panel: None,
            connections: Vec::new(),
        });
        points.get_mut(id).electrical_element = Some(element);
    }

    for spring in &mesh.springs {
        let (Some(a), Some(b)) = (
            points[spring.point_a].electrical_element,
            points[spring.point_b].electrical_element,
        ) else {
            continue;
        };
        elements.get_mut(a).connections.push(ElectricalConnection {
            element: b,
            octant: spring.point_a_octant,
        });
        elements.get_mut(b).connections.push(ElectricalConnection {
            element: a,
            octant: spring.point_b_octant,
        });
    }

    if let Some(electrical) = &definition.electrical {
        for (&instance_index, metadata) in &electrical.panel {
            let element = elements
                .by_instance(instance_index)
                .ok_or(BuildError::BrokenPanelMetadata { instance_index })?;
            elements.get_mut(element).panel = Some(metadata.clone());
        }
    }

    Ok(elements)
}

// ==================== Verification ====================

/// Twice the signed area of a triangle; negative when clockwise.
#[inline]
pub(crate) fn signed_area(points: &Points, triangle: &Triangle) -> f32 {
    let [a, b, c] = triangle.points.map(|p| points[p].position);
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

/// Check the structural invariants of a finished ship.
///
/// Every triangle must be clockwise, every spring must have at most two
/// super-triangles and every frontier must be a closed loop.
pub(crate) fn verify(containers: &Containers, parallel: bool) -> Result<()> {
    let Containers {
        points,
        springs,
        triangles,
        frontiers,
        ..
    } = containers;

    let is_counter_clockwise = |t: &Triangle| signed_area(points, t) >= 0.0;
    let bad_triangle = if parallel {
        triangles.as_slice().par_iter().position_first(is_counter_clockwise)
    } else {
        triangles.iter().position(is_counter_clockwise)
    };
    if let Some(triangle) = bad_triangle {
        return Err(BuildError::TriangleOrientation { triangle });
    }

    if let Some((s, spring)) = springs
        .iter()
        .enumerate()
        .find(|(_, s)| s.super_triangles.len() > 2)
    {
        return Err(BuildError::invariant(format!(
            "spring {:?} has {} super-triangles",
            SpringId::new(s),
            spring.super_triangles.len()
        )));
    }

    for (f, frontier) in frontiers.iter().enumerate() {
        let closed = is_closed_loop(&frontier.edges, |s| {
            let spring = &springs[s];
            (spring.point_a, spring.point_b)
        });
        if !closed {
            return Err(BuildError::frontier(format!("frontier {} is not a closed loop", f)));
        }
        if let Some(&edge) = frontier.edges.iter().find(|&&e| !springs[e].is_boundary()) {
            return Err(BuildError::frontier(format!(
                "frontier {} contains {:?}, which is not a boundary spring",
                f, edge
            )));
        }
    }

    log::debug!(
        "verified {} triangles, {} springs, {} frontiers",
        triangles.len(),
        springs.len(),
        frontiers.len()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::materials::{ElectricalElementType, ElectricalMaterial};
    use crate::definition::{ElectricalCell, ElectricalLayer, PanelElementMetadata, ShipCoordinates, ShipSize};
    use crate::factory::connect::{connect_points_to_triangles, link_springs_and_triangles};
    use crate::factory::fixtures::Fixture;
    use crate::factory::frontiers::trace_frontiers;
    use crate::factory::scan::scan_grid;
    use crate::factory::topology::build_topology;
    use crate::index::TriangleId;
    use crate::physics::FrontierType;

    fn owned_triangles(points: &Points, p: PointId) -> Vec<TriangleId> {
        points[p]
            .connected_triangles
            .iter()
            .filter(|c| c.is_owner)
            .map(|c| c.triangle)
            .collect()
    }

    fn built(f: &Fixture, definition: &ShipDefinition) -> FactoryMesh {
        let mut mesh = FactoryMesh::new(definition.size());
        scan_grid(definition, &f.materials, &mut mesh).unwrap();
        build_topology(&f.materials, &mut mesh).unwrap();
        connect_points_to_triangles(&mut mesh);
        link_springs_and_triangles(&mut mesh).unwrap();
        trace_frontiers(&mut mesh).unwrap();
        mesh
    }

    fn run(f: &Fixture, definition: &ShipDefinition) -> Result<Containers> {
        materialize(
            built(f, definition),
            definition,
            &f.materials,
            &SimulationParameters::default(),
        )
    }

    #[test]
    fn test_two_by_two_containers() {
        let f = Fixture::new();
        let containers = run(&f, &f.ship(&["##", "##"])).unwrap();

        assert_eq!(containers.points.len(), 4);
        assert_eq!(containers.springs.len(), 6);
        assert_eq!(containers.triangles.len(), 2);
        assert_eq!(containers.frontiers.len(), 1);
        assert_eq!(containers.frontiers.count(FrontierType::External), 1);
        assert!(containers.electrical_elements.is_empty());

        verify(&containers, false).unwrap();
        verify(&containers, true).unwrap();
    }

    #[test]
    fn test_spring_seeding() {
        let f = Fixture::new();
        let definition = f.ship(&["#o"]);
        let containers = materialize(
            built(&f, &definition),
            &definition,
            &f.materials,
            &SimulationParameters {
                stiffness_adjustment: 2.0,
                strength_adjustment: 0.5,
                mass_adjustment: 3.0,
            },
        )
        .unwrap();

        let spring = &containers.springs[SpringId::new(0)];
        assert_eq!(spring.rest_length, 1.0);
        // Steel 2.0 and wood 1.0
        assert_eq!(spring.stiffness, 3.0);
        // Wood is weaker: 1.0 against 4.0
        assert_eq!(spring.strength, 0.5);
        assert_eq!(spring.material, f.wood);

        let steel = &containers.points[PointId::new(0)];
        assert_eq!(steel.mass, 6.0);
        assert_eq!(steel.strength, 2.0);
    }

    #[test]
    fn test_point_back_links() {
        let f = Fixture::new();
        let containers = run(&f, &f.ship(&["##", "##"])).unwrap();

        for id in containers.points.ids() {
            let point = &containers.points[id];
            for connected in &point.connected_springs {
                let spring = &containers.springs[connected.spring];
                assert_eq!(spring.other_endpoint(id), connected.other_endpoint);
                let expected = if spring.point_a == id {
                    spring.point_a_octant
                } else {
                    spring.point_b_octant
                };
                assert_eq!(connected.octant, expected);
            }
        }

        // Every triangle has exactly one owner
        let owners: usize = containers
            .points
            .ids()
            .map(|p| owned_triangles(&containers.points, p).len())
            .sum();
        assert_eq!(owners, containers.triangles.len());
    }

    #[test]
    fn test_frontier_lookup() {
        let f = Fixture::new();
        let containers = run(&f, &f.ship(&["###", "#.#", "###"])).unwrap();

        for (i, frontier) in containers.frontiers.iter().enumerate() {
            for &edge in &frontier.edges {
                assert_eq!(
                    containers.frontiers.frontier_of(edge).map(|f| f.index()),
                    Some(i)
                );
            }
        }
        assert_eq!(containers.frontiers.len(), 2);
        for (s, spring) in containers.springs.iter().enumerate() {
            if spring.super_triangles.len() != 1 {
                assert_eq!(containers.frontiers.frontier_of(SpringId::new(s)), None);
            }
        }
    }

    fn electrified(f: &mut Fixture, with_panel: Option<u32>) -> ShipDefinition {
        let cable = f
            .materials
            .add_electrical(ElectricalMaterial::new("Cable", ElectricalElementType::Cable));
        let lamp = f
            .materials
            .add_electrical(ElectricalMaterial::new("Lamp", ElectricalElementType::Lamp).instanced());

        let mut electrical = ElectricalLayer::new(ShipSize::new(3, 2));
        electrical.cells.set(
            ShipCoordinates::new(0, 1),
            ElectricalCell {
                material: cable,
                instance_index: None,
            },
        );
        electrical.cells.set(
            ShipCoordinates::new(1, 1),
            ElectricalCell {
                material: lamp,
                instance_index: Some(3),
            },
        );
        electrical.cells.set(
            ShipCoordinates::new(2, 0),
            ElectricalCell {
                material: cable,
                instance_index: None,
            },
        );
        if let Some(instance_index) = with_panel {
            electrical.panel.insert(
                instance_index,
                PanelElementMetadata {
                    label: Some("Bridge".to_string()),
                    panel_coordinates: Some((0, 0)),
                    is_hidden: false,
                },
            );
        }
        f.ship(&["###", "###"]).with_electrical(electrical)
    }

    #[test]
    fn test_electrical_elements() {
        let mut f = Fixture::new();
        let definition = electrified(&mut f, Some(3));
        let containers = run(&f, &definition).unwrap();
        let elements = &containers.electrical_elements;

        assert_eq!(elements.len(), 3);
        assert_eq!(elements.lamp_count(), 1);

        let lamp = elements.by_instance(3).unwrap();
        assert_eq!(
            elements[lamp].panel.as_ref().and_then(|p| p.label.as_deref()),
            Some("Bridge")
        );
        assert_eq!(
            containers.points[elements[lamp].point].electrical_element,
            Some(lamp)
        );

        // Cable at (0, 1) sits west of the lamp; the cable at (2, 0) is
        // south-east of it
        let connections = &elements[lamp].connections;
        assert_eq!(connections.len(), 2);
        let octants: Vec<_> = connections.iter().map(|c| c.octant).collect();
        assert!(octants.contains(&4));
        assert!(octants.contains(&1));
        for c in connections {
            assert!(elements[c.element]
                .connections
                .iter()
                .any(|back| back.element == lamp));
        }
    }

    #[test]
    fn test_broken_panel_metadata() {
        let mut f = Fixture::new();
        let definition = electrified(&mut f, Some(9));
        assert!(matches!(
            run(&f, &definition),
            Err(BuildError::BrokenPanelMetadata { instance_index: 9 })
        ));
    }

    #[test]
    fn test_verify_catches_flipped_triangle() {
        let f = Fixture::new();
        let definition = f.ship(&["##", "##"]);
        let mut mesh = built(&f, &definition);
        mesh.triangles[1].points.swap(1, 2);
        mesh.triangles[1].springs.reverse();

        let containers =
            materialize(mesh, &definition, &f.materials, &SimulationParameters::default()).unwrap();
        assert!(matches!(
            verify(&containers, false),
            Err(BuildError::TriangleOrientation { triangle: 1 })
        ));
        assert!(matches!(
            verify(&containers, true),
            Err(BuildError::TriangleOrientation { triangle: 1 })
        ));
    }

    #[test]
    fn test_verify_catches_open_frontier() {
        let f = Fixture::new();
        let definition = f.ship(&["##", "##"]);
        let mut mesh = built(&f, &definition);
        mesh.frontiers[0].edges.pop();

        let containers =
            materialize(mesh, &definition, &f.materials, &SimulationParameters::default()).unwrap();
        assert!(matches!(
            verify(&containers, false),
            Err(BuildError::FrontierInvariant { .. })
        ));
    }
}
