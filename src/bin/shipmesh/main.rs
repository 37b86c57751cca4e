//! Shipmesh CLI - builds synthetic ships and reports on the resulting mesh.
//!
//! Usage: shipmesh <COMMAND> [OPTIONS]
//!
//! Run `shipmesh --help` for available commands.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::Rgba;

use shipmesh::prelude::*;
use std::result::Result;

#[derive(Parser)]
#[command(name = "shipmesh")]
#[command(author, version, about = "Ship mesh construction CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a synthetic ship and display its mesh
    Info {
        #[command(flatten)]
        hull: HullArgs,

        /// Layout strategy
        #[arg(short, long, value_enum, default_value = "stripes")]
        layout: LayoutKind,

        /// Rows per stripe, or cells per tile side
        #[arg(short, long, default_value = "4")]
        block: usize,

        /// Reorder triangles for the vertex cache
        #[arg(long)]
        reorder_triangles: bool,

        /// Mirror the ship left to right
        #[arg(long)]
        flip_horizontally: bool,

        /// Mirror the ship top to bottom
        #[arg(long)]
        flip_vertically: bool,

        /// Rotate the ship a quarter turn clockwise
        #[arg(long)]
        rotate: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,
    },

    /// Build a synthetic ship with every layout strategy and compare ACMR
    Compare {
        #[command(flatten)]
        hull: HullArgs,

        /// Simulated vertex cache size
        #[arg(short, long, default_value = "32")]
        cache_size: usize,
    },
}

#[derive(Args)]
struct HullArgs {
    /// Hull width in cells
    #[arg(long, default_value = "120")]
    width: i32,

    /// Hull height in cells
    #[arg(long, default_value = "40")]
    height: i32,

    /// Number of portholes along the hull
    #[arg(long, default_value = "4")]
    holes: i32,

    /// String a rope between the bow and stern
    #[arg(long)]
    rope: bool,

    /// Place a lamp above each porthole
    #[arg(long)]
    lamps: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutKind {
    /// Factory order
    Identity,
    /// Horizontal bands, two columns at a time
    Stripes,
    /// Square blocks
    Tiles,
    /// Vertex cache scorer on springs
    VertexCache,
}

impl LayoutKind {
    fn strategy(self, block: usize) -> LayoutStrategy {
        match self {
            LayoutKind::Identity => LayoutStrategy::Identity,
            LayoutKind::Stripes => LayoutStrategy::Stripes {
                stripe_height: block,
            },
            LayoutKind::Tiles => LayoutStrategy::Tiles { block_size: block },
            LayoutKind::VertexCache => LayoutStrategy::VertexCache,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info {
            hull,
            layout,
            block,
            reorder_triangles,
            flip_horizontally,
            flip_vertically,
            rotate,
            sequential,
        } => {
            let options = BuildOptions::default()
                .with_layout(layout.strategy(block))
                .with_triangle_reordering(reorder_triangles)
                .with_load(LoadOptions {
                    flip_horizontally,
                    flip_vertically,
                    rotate_90_cw: rotate,
                })
                .with_parallel(!sequential);
            cmd_info(&hull, &options)?;
        }

        Commands::Compare { hull, cache_size } => {
            cmd_compare(&hull, cache_size)?;
        }
    }

    Ok(())
}

/// Create a progress reporter that displays a progress bar on the terminal.
fn create_progress() -> Progress {
    let max_percent = Arc::new(AtomicUsize::new(0));

    Progress::new(move |current, total, message| {
        if total == 0 {
            return;
        }

        let percent = if current >= total {
            100
        } else {
            ((current * 100) + (total / 2)) / total
        };

        // Stages only move forward; skip repaints that would not change the bar
        if max_percent.fetch_max(percent, Ordering::Relaxed) >= percent && percent != 100 {
            return;
        }

        let bar_width = 30;
        let filled = (percent * bar_width) / 100;
        let bar = "=".repeat(filled);
        let space = " ".repeat(bar_width - filled);

        eprint!("\r[{}{}] {:3}% {:<32}", bar, space, percent, message);
        let _ = std::io::stderr().flush();

        if current >= total {
            eprintln!();
        }
    })
}

/// A steel hull with a wooden deck, portholes, and optional rope and lamps.
fn synthetic_ship(hull: &HullArgs) -> Result<(ShipDefinition, MaterialDatabase), BuildError> {
    if hull.width < 8 || hull.height < 9 {
        return Err(BuildError::invalid_param(
            "size",
            format!("{}x{}", hull.width, hull.height),
            "must be at least 8x9",
        ));
    }

    let mut materials = MaterialDatabase::new();
    let steel = materials.add_structural(
        StructuralMaterial::new("Steel", Rgba([90, 96, 110, 255]))
            .hull()
            .with_mass(2.0)
            .with_stiffness(2.0)
            .with_strength(4.0),
    );
    let wood = materials.add_structural(StructuralMaterial::new("Wood", Rgba([150, 100, 50, 255])));
    materials.add_structural(
        StructuralMaterial::new("Air", Rgba([255, 255, 255, 0]))
            .with_unique_type(MaterialUniqueType::Air),
    );
    let rope = materials.add_structural(
        StructuralMaterial::new("Rope", Rgba([200, 160, 60, 255]))
            .with_unique_type(MaterialUniqueType::Rope)
            .with_strength(0.5),
    );
    let lamp = materials
        .add_electrical(ElectricalMaterial::new("Lamp", ElectricalElementType::Lamp).instanced());

    let size = ShipSize::new(hull.width, hull.height);
    let deck = hull.height * 2 / 3;
    let mut structure = Layer::new(size);

    // The keel narrows by one cell every two rows towards the bottom
    for y in 0..deck {
        let inset = ((deck - 1 - y) / 2).min(hull.width / 4);
        for x in inset..hull.width - inset {
            structure.set(ShipCoordinates::new(x, y), steel);
        }
    }

    // Superstructure over the middle half
    for y in deck..hull.height - 1 {
        for x in hull.width / 4..hull.width * 3 / 4 {
            structure.set(ShipCoordinates::new(x, y), wood);
        }
    }

    let porthole_y = deck / 2;
    let spacing = hull.width / (hull.holes + 1).max(1);
    let mut electrical = ElectricalLayer::new(size);
    for i in 1..=hull.holes.max(0) {
        let x = i * spacing;
        if x + 1 >= hull.width - 1 {
            break;
        }
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            structure.clear(ShipCoordinates::new(x + dx, porthole_y + dy));
        }
        let above = ShipCoordinates::new(x, porthole_y + 2);
        if hull.lamps && structure.get(above).is_some() {
            electrical.cells.set(
                above,
                ElectricalCell {
                    material: lamp,
                    instance_index: Some(i as u32),
                },
            );
        }
    }

    let mut definition = ShipDefinition::new(structure);
    if hull.lamps {
        definition = definition.with_electrical(electrical);
    }
    if hull.rope {
        definition = definition.with_rope(RopeElement {
            start: ShipCoordinates::new(0, deck - 1),
            end: ShipCoordinates::new(hull.width / 4, hull.height - 2),
            material: rope,
            render_color: Rgba([180, 140, 60, 255]),
        });
    }

    Ok((definition, materials))
}

fn cmd_info(hull: &HullArgs, options: &BuildOptions) -> Result<(), Box<dyn std::error::Error>> {
    let (definition, materials) = synthetic_ship(hull)?;

    let progress = create_progress();
    let start = Instant::now();
    let ship = build_ship_with_progress(&definition, &materials, options, &progress)?;
    let elapsed = start.elapsed();

    let stats = &ship.statistics;
    println!("Ship: {}x{}", hull.width, hull.height);
    println!(
        "Occupied: ({}, {}) to ({}, {})",
        ship.occupied_region.min.x,
        ship.occupied_region.min.y,
        ship.occupied_region.max.x,
        ship.occupied_region.max.y
    );
    println!("Points: {}", ship.points.len());
    println!("  Rope: {} ({} interpolated)", stats.rope_points, stats.interpolated_rope_points);
    println!("  Leaking: {}", stats.leaking_points);
    println!("Springs: {}", ship.springs.len());
    println!("  Traverse: {}", stats.traverse_springs);
    println!("Triangles: {}", ship.triangles.len());
    println!("  Filtered: {}", stats.filtered_triangles);
    println!("Electrical elements: {}", ship.electrical_elements.len());
    println!("  Lamps: {}", ship.electrical_elements.lamp_count());
    println!(
        "Frontiers: {} external, {} internal",
        ship.frontiers.count(FrontierType::External),
        ship.frontiers.count(FrontierType::Internal)
    );
    println!("Layout: {}", options.layout.name());
    println!(
        "  Spring ACMR: {:.3} -> {:.3}",
        stats.spring_acmr_before, stats.spring_acmr_after
    );
    println!(
        "  Triangle ACMR: {:.3} -> {:.3}",
        stats.triangle_acmr_before, stats.triangle_acmr_after
    );
    println!("Texture: {}x{}", ship.texture.width(), ship.texture.height());
    println!("Completed in {:.2?}", elapsed);

    Ok(())
}

fn cmd_compare(hull: &HullArgs, cache_size: usize) -> Result<(), Box<dyn std::error::Error>> {
    let (definition, materials) = synthetic_ship(hull)?;

    let strategies = [
        LayoutStrategy::Identity,
        LayoutStrategy::Stripes { stripe_height: 2 },
        LayoutStrategy::Stripes { stripe_height: 4 },
        LayoutStrategy::Stripes { stripe_height: 8 },
        LayoutStrategy::Tiles { block_size: 4 },
        LayoutStrategy::Tiles { block_size: 8 },
        LayoutStrategy::VertexCache,
    ];

    println!(
        "{:<14} {:>6} {:>12} {:>14} {:>10}",
        "layout", "block", "spring ACMR", "triangle ACMR", "time"
    );
    for strategy in strategies {
        let block = match strategy {
            LayoutStrategy::Stripes { stripe_height } => stripe_height.to_string(),
            LayoutStrategy::Tiles { block_size } => block_size.to_string(),
            _ => "-".to_string(),
        };
        let options = BuildOptions::default()
            .with_layout(strategy)
            .with_triangle_reordering(matches!(strategy, LayoutStrategy::VertexCache))
            .with_vertex_cache_size(cache_size);

        let start = Instant::now();
        let ship = build_ship(&definition, &materials, &options)?;
        let elapsed = start.elapsed();

        println!(
            "{:<14} {:>6} {:>12.3} {:>14.3} {:>10.2?}",
            strategy.name(),
            block,
            ship.statistics.spring_acmr_after,
            ship.statistics.triangle_acmr_after,
            elapsed
        );
    }

    Ok(())
}
