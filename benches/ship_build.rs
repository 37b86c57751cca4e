//! Benchmarks for ship construction.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use image::Rgba;
use shipmesh::prelude::*;
use shipmesh::vertex_cache::{forsyth_order, DEFAULT_CACHE_SIZE};

/// A `width` x `height` hull with a square hole every eight cells.
fn create_hull(width: i32, height: i32) -> (ShipDefinition, MaterialDatabase) {
    let mut materials = MaterialDatabase::new();
    let steel = materials.add_structural(
        StructuralMaterial::new("Steel", Rgba([90, 96, 110, 255])).hull(),
    );
    let rope = materials.add_structural(
        StructuralMaterial::new("Rope", Rgba([200, 160, 60, 255]))
            .with_unique_type(MaterialUniqueType::Rope),
    );

    let mut structure = Layer::new(ShipSize::new(width, height));
    structure.fill(steel);
    for y in (3..height - 3).step_by(8) {
        for x in (3..width - 3).step_by(8) {
            for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                structure.clear(ShipCoordinates::new(x + dx, y + dy));
            }
        }
    }

    let definition = ShipDefinition::new(structure).with_rope(RopeElement {
        start: ShipCoordinates::new(0, height - 1),
        end: ShipCoordinates::new(width - 1, height - 1),
        material: rope,
        render_color: Rgba([180, 140, 60, 255]),
    });
    (definition, materials)
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_ship");

    for size in [32, 128] {
        let (definition, materials) = create_hull(size * 2, size);
        let options = BuildOptions::default().with_verification(false);

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| build_ship(&definition, &materials, &options).unwrap());
        });
    }

    group.finish();
}

fn bench_layouts(c: &mut Criterion) {
    let (definition, materials) = create_hull(256, 96);
    let mut group = c.benchmark_group("layout");

    let strategies = [
        LayoutStrategy::Identity,
        LayoutStrategy::Stripes { stripe_height: 4 },
        LayoutStrategy::Tiles { block_size: 8 },
        LayoutStrategy::VertexCache,
    ];
    for strategy in strategies {
        let options = BuildOptions::default()
            .with_layout(strategy)
            .with_verification(false);

        group.bench_function(strategy.name(), |b| {
            b.iter(|| build_ship(&definition, &materials, &options).unwrap());
        });
    }

    group.finish();
}

fn bench_forsyth(c: &mut Criterion) {
    // Springs of a 100x100 grid, rows then columns
    let n = 100u32;
    let mut springs = Vec::new();
    for y in 0..n {
        for x in 0..n - 1 {
            springs.push([y * n + x, y * n + x + 1]);
        }
    }
    for x in 0..n {
        for y in 0..n - 1 {
            springs.push([y * n + x, (y + 1) * n + x]);
        }
    }

    c.bench_function("forsyth_springs_100x100", |b| {
        b.iter(|| forsyth_order(&springs, (n * n) as usize, DEFAULT_CACHE_SIZE));
    });
}

criterion_group!(benches, bench_build, bench_layouts, bench_forsyth);
criterion_main!(benches);
