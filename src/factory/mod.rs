//! Ship construction: from a raster definition to simulation containers.
//!
//! The pipeline runs these stages in order on the calling thread; only the
//! optional verification pass fans out with rayon:
//!
//! 1. **Scan**: one point per occupied cell, plus the point index matrix
//! 2. **Ropes**: rasterize each rope into a chain of points and springs
//! 3. **Topology**: springs to grid neighbors, triangles, leaking flags
//! 4. **Filter**: drop triangles made only of loosely attached rope points
//! 5. **Link**: points to triangles, springs to super-triangles, traverses
//! 6. **Frontiers**: closed loops of boundary springs, hull or hole
//! 7. **Layout**: reorder everything for cache locality
//! 8. **Materialize**: fill the final containers
//!
//! A failing stage aborts the build; no partial ship is ever returned.
//!
//! # Example
//!
//! ```
//! use shipmesh::definition::{Layer, ShipDefinition, ShipSize};
//! use shipmesh::definition::materials::{MaterialDatabase, StructuralMaterial};
//! use shipmesh::factory::{build_ship, BuildOptions};
//! use image::Rgba;
//!
//! let mut materials = MaterialDatabase::new();
//! let steel = materials.add_structural(StructuralMaterial::new("Steel", Rgba([90, 90, 90, 255])).hull());
//!
//! let mut structure = Layer::new(ShipSize::new(2, 2));
//! structure.fill(steel);
//!
//! let ship = build_ship(&ShipDefinition::new(structure), &materials, &BuildOptions::default()).unwrap();
//! assert_eq!(ship.points.len(), 4);
//! assert_eq!(ship.triangles.len(), 2);
//! assert_eq!(ship.frontiers.len(), 1);
//! ```

mod connect;
mod frontiers;
mod layout;
mod materialize;
mod ropes;
mod scan;
mod topology;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

use std::borrow::Cow;
use std::time::Instant;

pub use layout::LayoutStrategy;
pub use types::{opposite, rotate_cw, Octant, OCTANT_DIRECTIONS};

use crate::definition::materials::MaterialDatabase;
use crate::definition::ShipDefinition;
use crate::error::{BuildError, Result};
use crate::index::PointId;
use crate::physics::{BuildStatistics, SimulationParameters, Ship};
use crate::progress::Progress;
use crate::texture::{resolve_texture, FlatTexturizer, ShipTexturizer};
use crate::vertex_cache::{acmr, DEFAULT_CACHE_SIZE};

use types::FactoryMesh;

// ==================== Options ====================

/// Transforms applied to the definition before building.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Mirror left to right.
    pub flip_horizontally: bool,
    /// Mirror top to bottom.
    pub flip_vertically: bool,
    /// Rotate a quarter turn clockwise, after any flip.
    pub rotate_90_cw: bool,
}

impl LoadOptions {
    fn is_identity(&self) -> bool {
        !self.flip_horizontally && !self.flip_vertically && !self.rotate_90_cw
    }

    /// The definition with these transforms applied.
    pub fn apply<'a>(&self, definition: &'a ShipDefinition) -> Cow<'a, ShipDefinition> {
        if self.is_identity() {
            return Cow::Borrowed(definition);
        }

        let mut transformed = definition.clone();
        if self.flip_horizontally {
            transformed.flip_horizontally();
        }
        if self.flip_vertically {
            transformed.flip_vertically();
        }
        if self.rotate_90_cw {
            transformed.rotate_90_cw();
        }
        Cow::Owned(transformed)
    }
}

/// Options for ship construction.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// How to order points and springs for cache locality.
    pub layout: LayoutStrategy,

    /// Whether to reorder triangles with the vertex cache scorer. Off by
    /// default: construction order already keeps upper triangles ahead of
    /// the ones they cover.
    pub reorder_triangles: bool,

    /// Simulated vertex cache slots, for layout and ACMR (default: 32).
    pub vertex_cache_size: usize,

    /// Whether to check orientation and frontier invariants after building
    /// (default: on in debug builds).
    pub verify_invariants: bool,

    /// Whether verification may run in parallel (default: true).
    pub parallel: bool,

    /// Transforms applied to the definition first.
    pub load: LoadOptions,

    /// Tuning used to seed point and spring properties.
    pub parameters: SimulationParameters,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            layout: LayoutStrategy::default(),
            reorder_triangles: false,
            vertex_cache_size: DEFAULT_CACHE_SIZE,
            verify_invariants: cfg!(debug_assertions),
            parallel: true,
            load: LoadOptions::default(),
            parameters: SimulationParameters::default(),
        }
    }
}

impl BuildOptions {
    /// Set the layout strategy.
    pub fn with_layout(mut self, layout: LayoutStrategy) -> Self {
        self.layout = layout;
        self
    }

    /// Set whether triangles are reordered.
    pub fn with_triangle_reordering(mut self, reorder_triangles: bool) -> Self {
        self.reorder_triangles = reorder_triangles;
        self
    }

    /// Set the simulated vertex cache size.
    pub fn with_vertex_cache_size(mut self, vertex_cache_size: usize) -> Self {
        self.vertex_cache_size = vertex_cache_size;
        self
    }

    /// Set whether invariants are verified after building.
    pub fn with_verification(mut self, verify_invariants: bool) -> Self {
        self.verify_invariants = verify_invariants;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the load transforms.
    pub fn with_load(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// Set the simulation parameters.
    pub fn with_parameters(mut self, parameters: SimulationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    /// Check every option value.
    pub fn validate(&self) -> Result<()> {
        self.layout.validate()?;
        if self.vertex_cache_size <= 3 {
            return Err(BuildError::invalid_param(
                "vertex_cache_size",
                self.vertex_cache_size,
                "must be greater than 3",
            ));
        }
        let p = &self.parameters;
        for (name, value) in [
            ("stiffness_adjustment", p.stiffness_adjustment),
            ("strength_adjustment", p.strength_adjustment),
            ("mass_adjustment", p.mass_adjustment),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(BuildError::invalid_param(name, value, "must be positive"));
            }
        }
        Ok(())
    }
}

// ==================== Pipeline ====================

const STAGES: usize = 9;

/// Build a ship with the flat texturizer and no progress reporting.
///
/// # Errors
///
/// Returns an error if the options are invalid, the definition is empty or
/// inconsistent, or an internal invariant fails.
pub fn build_ship(
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    options: &BuildOptions,
) -> Result<Ship> {
    build_ship_with(definition, materials, options, &FlatTexturizer, &Progress::none())
}

/// Build a ship, reporting each stage to `progress`.
pub fn build_ship_with_progress(
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    options: &BuildOptions,
    progress: &Progress,
) -> Result<Ship> {
    build_ship_with(definition, materials, options, &FlatTexturizer, progress)
}

/// Build a ship with a custom texturizer for definitions without a texture.
pub fn build_ship_with(
    definition: &ShipDefinition,
    materials: &MaterialDatabase,
    options: &BuildOptions,
    texturizer: &dyn ShipTexturizer,
    progress: &Progress,
) -> Result<Ship> {
    let start = Instant::now();

    options.validate()?;
    let definition = options.load.apply(definition);
    definition.validate()?;

    let size = definition.size();
    let mut mesh = FactoryMesh::new(size);
    let mut stats = BuildStatistics::default();

    progress.report(0, STAGES, "Scanning grid");
    let t = Instant::now();
    let occupied_region = scan::scan_grid(&definition, materials, &mut mesh)?;
    log::debug!("scan: {} points in {:?}", mesh.points.len(), t.elapsed());

    progress.report(1, STAGES, "Rasterizing ropes");
    let t = Instant::now();
    stats.interpolated_rope_points = ropes::rasterize_ropes(&definition, materials, &mut mesh)?;
    log::debug!(
        "ropes: {} ropes, {} points in {:?}",
        definition.ropes.len(),
        stats.interpolated_rope_points,
        t.elapsed()
    );

    progress.report(2, STAGES, "Building topology");
    let t = Instant::now();
    topology::build_topology(materials, &mut mesh)?;
    log::debug!(
        "topology: {} springs, {} triangles in {:?}",
        mesh.springs.len(),
        mesh.triangles.len(),
        t.elapsed()
    );

    progress.report(3, STAGES, "Filtering rope triangles");
    stats.filtered_triangles = connect::filter_rope_triangles(&mut mesh);

    progress.report(4, STAGES, "Linking springs and triangles");
    let t = Instant::now();
    connect::connect_points_to_triangles(&mut mesh);
    stats.traverse_springs = connect::link_springs_and_triangles(&mut mesh)?;
    log::debug!(
        "link: {} filtered triangles, {} traverse springs in {:?}",
        stats.filtered_triangles,
        stats.traverse_springs,
        t.elapsed()
    );

    progress.report(5, STAGES, "Tracing frontiers");
    let t = Instant::now();
    let frontier_count = frontiers::trace_frontiers(&mut mesh)?;
    log::debug!("frontiers: {} in {:?}", frontier_count, t.elapsed());

    progress.report(6, STAGES, "Optimizing layout");
    let t = Instant::now();
    let cache_size = options.vertex_cache_size;
    stats.spring_acmr_before = spring_acmr(&mesh, cache_size);
    stats.triangle_acmr_before = triangle_acmr(&mesh, cache_size);
    let layout = layout::compute_layout(&mesh, options.layout, options.reorder_triangles, cache_size)?;
    layout::apply_layout(&mut mesh, &layout);
    stats.spring_acmr_after = spring_acmr(&mesh, cache_size);
    stats.triangle_acmr_after = triangle_acmr(&mesh, cache_size);
    log::debug!("layout ({}): {:?}", options.layout.name(), t.elapsed());

    stats.leaking_points = mesh.points.iter().filter(|p| p.is_leaking).count();
    stats.rope_points = mesh.points.iter().filter(|p| p.is_rope).count();

    progress.report(7, STAGES, "Materializing containers");
    let t = Instant::now();
    let containers = materialize::materialize(mesh, &definition, materials, &options.parameters)?;
    log::debug!("materialize: {:?}", t.elapsed());

    if options.verify_invariants {
        progress.report(8, STAGES, "Verifying");
        materialize::verify(&containers, options.parallel)?;
    }

    let texture = resolve_texture(&definition, materials, texturizer);

    log::info!(
        "Created ship: W={}, H={}, {} points, {} springs, {} triangles, {} electrical elements, {} frontiers; spring ACMR {:.3} -> {:.3} ({:?})",
        size.width,
        size.height,
        containers.points.len(),
        containers.springs.len(),
        containers.triangles.len(),
        containers.electrical_elements.len(),
        containers.frontiers.len(),
        stats.spring_acmr_before,
        stats.spring_acmr_after,
        start.elapsed()
    );
    progress.report(STAGES, STAGES, "Done");

    Ok(Ship {
        points: containers.points,
        springs: containers.springs,
        triangles: containers.triangles,
        electrical_elements: containers.electrical_elements,
        frontiers: containers.frontiers,
        occupied_region,
        texture,
        statistics: stats,
    })
}

fn spring_acmr(mesh: &FactoryMesh, cache_size: usize) -> f32 {
    let endpoints: Vec<[u32; 2]> = mesh
        .springs
        .iter()
        .map(|s| [s.point_a.raw(), s.point_b.raw()])
        .collect();
    acmr(&endpoints, cache_size)
}

fn triangle_acmr(mesh: &FactoryMesh, cache_size: usize) -> f32 {
    let vertices: Vec<[u32; 3]> = mesh
        .triangles
        .iter()
        .map(|t| t.points.map(PointId::raw))
        .collect();
    acmr(&vertices, cache_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use image::{Rgba, RgbaImage};

    use crate::definition::materials::{ElectricalElementType, ElectricalMaterial};
    use crate::definition::{ElectricalCell, ElectricalLayer, ShipCoordinates, ShipSize};
    use crate::physics::FrontierType;
    use super::fixtures::{rope, Fixture};

    fn options() -> BuildOptions {
        BuildOptions::default().with_verification(true)
    }

    #[test]
    fn test_two_by_one() {
        let f = Fixture::new();
        let ship = build_ship(&f.ship(&["##"]), &f.materials, &options()).unwrap();

        assert_eq!(ship.points.len(), 2);
        assert_eq!(ship.springs.len(), 1);
        assert!(ship.triangles.is_empty());
        assert!(ship.frontiers.is_empty());

        let spring = ship.springs.iter().next().unwrap();
        let mut octants = [spring.point_a_octant, spring.point_b_octant];
        octants.sort_unstable();
        assert_eq!(octants, [0, 4]);
    }

    #[test]
    fn test_two_by_two() {
        let f = Fixture::new();
        let ship = build_ship(&f.ship(&["##", "##"]), &f.materials, &options()).unwrap();

        assert_eq!(ship.points.len(), 4);
        assert_eq!(ship.springs.len(), 6);
        assert_eq!(ship.triangles.len(), 2);
        assert_eq!(ship.frontiers.len(), 1);
        let frontier = ship.frontiers.iter().next().unwrap();
        assert_eq!(frontier.frontier_type, FrontierType::External);
        assert_eq!(frontier.edges.len(), 4);
        assert_eq!(ship.statistics.traverse_springs, 1);
    }

    #[test]
    fn test_every_layout_builds_the_same_ship() {
        let f = Fixture::new();
        let definition = f
            .ship(&[
                "#.......#",
                "#########",
                "##..#.###",
                "##..#####",
                "#########",
            ])
            .with_rope(rope(&f, (0, 4), (8, 4)));

        let strategies = [
            LayoutStrategy::Identity,
            LayoutStrategy::default(),
            LayoutStrategy::Tiles { block_size: 3 },
            LayoutStrategy::VertexCache,
        ];
        let mut counts = Vec::new();
        for strategy in strategies {
            for reorder_triangles in [false, true] {
                let ship = build_ship(
                    &definition,
                    &f.materials,
                    &options()
                        .with_layout(strategy)
                        .with_triangle_reordering(reorder_triangles),
                )
                .unwrap();
                counts.push((
                    ship.points.len(),
                    ship.springs.len(),
                    ship.triangles.len(),
                    ship.frontiers.count(FrontierType::External),
                    ship.frontiers.count(FrontierType::Internal),
                ));
                for t in ship.triangles.iter() {
                    assert!(materialize::signed_area(&ship.points, t) < 0.0);
                }
            }
        }
        assert!(counts.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(counts[0].4, 2);
    }

    #[test]
    fn test_statistics() {
        let f = Fixture::new();
        let definition = f
            .ship(&["#......#", "oooooooo"])
            .with_rope(rope(&f, (0, 1), (7, 1)));
        let ship = build_ship(&definition, &f.materials, &options()).unwrap();

        assert_eq!(ship.statistics.interpolated_rope_points, 6);
        assert_eq!(ship.statistics.rope_points, 8);
        // Wood along the bottom edge, plus every rope point
        assert_eq!(ship.statistics.leaking_points, 8 + 8);
        assert!(ship.statistics.spring_acmr_after > 0.0);
    }

    #[test]
    fn test_water_cells() {
        let f = Fixture::new();
        let ship = build_ship(&f.ship(&["#~#", "###"]), &f.materials, &options()).unwrap();

        let watery: Vec<_> = ship.points.iter().filter(|p| p.water > 0.0).collect();
        assert_eq!(watery.len(), 1);
        assert_eq!(watery[0].structural_material, f.air);
    }

    #[test]
    fn test_electrical_survives_layout() {
        let mut f = Fixture::new();
        let lamp = f
            .materials
            .add_electrical(ElectricalMaterial::new("Lamp", ElectricalElementType::Lamp).instanced());
        let mut electrical = ElectricalLayer::new(ShipSize::new(3, 3));
        electrical.cells.set(
            ShipCoordinates::new(1, 1),
            ElectricalCell {
                material: lamp,
                instance_index: Some(0),
            },
        );
        let definition = f.ship(&["###", "###", "###"]).with_electrical(electrical);
        let ship = build_ship(&definition, &f.materials, &options()).unwrap();

        let element = ship.electrical_elements.by_instance(0).unwrap();
        let point = &ship.points[ship.electrical_elements[element].point];
        assert_eq!(point.definition_coordinates, Some(ShipCoordinates::new(1, 1)));
        assert_eq!(point.electrical_element, Some(element));
    }

    #[test]
    fn test_load_options() {
        let f = Fixture::new();
        // An L: three cells up the left side, one more to the right at the bottom
        let definition = f.ship(&["#.", "#.", "##"]);

        let flipped = build_ship(
            &definition,
            &f.materials,
            &options().with_load(LoadOptions {
                flip_horizontally: true,
                ..LoadOptions::default()
            }),
        )
        .unwrap();
        assert!(flipped
            .points
            .iter()
            .any(|p| p.definition_coordinates == Some(ShipCoordinates::new(1, 2))));

        let rotated = build_ship(
            &definition,
            &f.materials,
            &options().with_load(LoadOptions {
                rotate_90_cw: true,
                ..LoadOptions::default()
            }),
        )
        .unwrap();
        assert_eq!(rotated.texture.dimensions(), (3, 2));
        assert_eq!(rotated.occupied_region.width(), 3);
        assert_eq!(rotated.occupied_region.height(), 2);
        assert_eq!(rotated.points.len(), 4);
    }

    #[test]
    fn test_empty_ship_fails() {
        let f = Fixture::new();
        assert!(matches!(
            build_ship(&f.ship(&["...", "..."]), &f.materials, &options()),
            Err(BuildError::EmptyShip)
        ));
    }

    #[test]
    fn test_invalid_options() {
        let f = Fixture::new();
        let definition = f.ship(&["##"]);
        let bad = [
            options().with_vertex_cache_size(3),
            options().with_layout(LayoutStrategy::Stripes { stripe_height: 1 }),
            options().with_parameters(SimulationParameters {
                mass_adjustment: 0.0,
                ..SimulationParameters::default()
            }),
        ];
        for options in bad {
            assert!(matches!(
                build_ship(&definition, &f.materials, &options),
                Err(BuildError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_progress_and_texture() {
        let f = Fixture::new();
        let stages = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&stages);
        let progress = Progress::new(move |current, total, _| {
            sink.lock().unwrap().push((current, total));
        });

        let definition = f
            .ship(&["##", "##"])
            .with_texture(RgbaImage::from_pixel(4, 4, Rgba([9, 9, 9, 255])));
        let ship = build_ship_with(&definition, &f.materials, &options(), &FlatTexturizer, &progress)
            .unwrap();

        assert_eq!(ship.texture.dimensions(), (4, 4));
        let stages = stages.lock().unwrap();
        assert_eq!(stages.first(), Some(&(0, STAGES)));
        assert_eq!(stages.last(), Some(&(STAGES, STAGES)));
    }
}
