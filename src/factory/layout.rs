//! Cache-locality layout of points, springs and triangles.
//!
//! The simulator sweeps the springs array once per step, touching both
//! endpoints of each spring. A layout strategy picks a new order for points
//! and springs (and optionally triangles) so that consecutive springs reuse
//! recently touched points. The result is a set of [`IndexRemap`]s that
//! [`apply_layout`] pushes through every cross-reference of the mesh.
//!
//! # Strategies
//!
//! - [`LayoutStrategy::Identity`]: keep construction order
//! - [`LayoutStrategy::Stripes`]: sweep the grid top to bottom in bands,
//!   each band left to right through two-column windows
//! - [`LayoutStrategy::Tiles`]: sweep square blocks bottom to top, emitting
//!   every spring of each point in the block
//! - [`LayoutStrategy::VertexCache`]: Forsyth ordering of springs over a
//!   simulated LRU cache
//!
//! Tiles and vertex cache order points by their first appearance in the new
//! spring order.

use super::types::{FactoryMesh, PointPair};
use crate::error::{BuildError, Result};
use crate::index::{PointId, SpringId, TriangleId};
use crate::vertex_cache::forsyth_order;

/// How to order points and springs for cache locality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStrategy {
    /// Keep construction order.
    Identity,
    /// Horizontal bands of `stripe_height` rows, consecutive bands sharing
    /// one row.
    Stripes {
        /// Rows per band; at least 2.
        stripe_height: usize,
    },
    /// Square blocks of `block_size` cells.
    Tiles {
        /// Block side; at least 1.
        block_size: usize,
    },
    /// Forsyth vertex cache ordering of springs.
    VertexCache,
}

impl Default for LayoutStrategy {
    fn default() -> Self {
        LayoutStrategy::Stripes { stripe_height: 4 }
    }
}

impl LayoutStrategy {
    /// Check the strategy's parameters.
    pub fn validate(&self) -> Result<()> {
        match *self {
            LayoutStrategy::Stripes { stripe_height } if stripe_height < 2 => Err(
                BuildError::invalid_param("stripe_height", stripe_height, "must be at least 2"),
            ),
            LayoutStrategy::Tiles { block_size } if block_size == 0 => Err(
                BuildError::invalid_param("block_size", block_size, "must be at least 1"),
            ),
            _ => Ok(()),
        }
    }

    /// Short human-readable name.
    pub fn name(&self) -> &'static str {
        match self {
            LayoutStrategy::Identity => "identity",
            LayoutStrategy::Stripes { .. } => "stripes",
            LayoutStrategy::Tiles { .. } => "tiles",
            LayoutStrategy::VertexCache => "vertex-cache",
        }
    }
}

// ==================== Index remap ====================

/// A permutation of element indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IndexRemap {
    new_to_old: Vec<usize>,
    old_to_new: Vec<usize>,
}

impl IndexRemap {
    pub fn identity(len: usize) -> Self {
        Self {
            new_to_old: (0..len).collect(),
            old_to_new: (0..len).collect(),
        }
    }

    /// Build a remap from the new order of old indices.
    ///
    /// Fails unless `new_to_old` is a permutation of `0..len`.
    pub fn from_order(new_to_old: Vec<usize>, len: usize) -> Result<Self> {
        if new_to_old.len() != len {
            return Err(BuildError::invariant(format!(
                "layout ordered {} of {} elements",
                new_to_old.len(),
                len
            )));
        }

        let mut old_to_new = vec![usize::MAX; len];
        for (new, &old) in new_to_old.iter().enumerate() {
            if old >= len || old_to_new[old] != usize::MAX {
                return Err(BuildError::invariant(format!(
                    "layout order is not a permutation at element {}",
                    old
                )));
            }
            old_to_new[old] = new;
        }

        Ok(Self {
            new_to_old,
            old_to_new,
        })
    }

    #[inline]
    pub fn new_index(&self, old: usize) -> usize {
        self.old_to_new[old]
    }

    /// Old indices in their new order.
    #[inline]
    pub fn order(&self) -> &[usize] {
        &self.new_to_old
    }

    pub fn is_identity(&self) -> bool {
        self.new_to_old.iter().enumerate().all(|(i, &o)| i == o)
    }
}

/// Remaps for every element kind.
#[derive(Debug, Clone)]
pub(crate) struct Layout {
    pub points: IndexRemap,
    pub springs: IndexRemap,
    pub triangles: IndexRemap,
}

// ==================== Strategies ====================

/// Records the order in which elements are first emitted.
struct Emitter {
    emitted: Vec<bool>,
    order: Vec<usize>,
}

impl Emitter {
    fn new(len: usize) -> Self {
        Self {
            emitted: vec![false; len],
            order: Vec::with_capacity(len),
        }
    }

    #[inline]
    fn emit(&mut self, index: usize) {
        if !self.emitted[index] {
            self.emitted[index] = true;
            self.order.push(index);
        }
    }

    #[inline]
    fn is_emitted(&self, index: usize) -> bool {
        self.emitted[index]
    }

    fn emit_remaining(&mut self) -> usize {
        let before = self.order.len();
        for index in 0..self.emitted.len() {
            self.emit(index);
        }
        self.order.len() - before
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn into_order(self) -> Vec<usize> {
        self.order
    }
}

/// Compute the layout of the mesh in its current order.
pub(crate) fn compute_layout(
    mesh: &FactoryMesh,
    strategy: LayoutStrategy,
    reorder_triangles: bool,
    cache_size: usize,
) -> Result<Layout> {
    let (point_order, spring_order) = match strategy {
        LayoutStrategy::Identity => (
            (0..mesh.points.len()).collect(),
            (0..mesh.springs.len()).collect(),
        ),
        LayoutStrategy::Stripes { stripe_height } => stripes(mesh, stripe_height),
        LayoutStrategy::Tiles { block_size } => {
            let springs = tiles(mesh, block_size);
            (points_by_first_appearance(mesh, &springs), springs)
        }
        LayoutStrategy::VertexCache => {
            let endpoints: Vec<[u32; 2]> = mesh
                .springs
                .iter()
                .map(|s| [s.point_a.raw(), s.point_b.raw()])
                .collect();
            let springs = forsyth_order(&endpoints, mesh.points.len(), cache_size);
            (points_by_first_appearance(mesh, &springs), springs)
        }
    };

    let triangles = if reorder_triangles {
        let vertices: Vec<[u32; 3]> = mesh
            .triangles
            .iter()
            .map(|t| t.points.map(PointId::raw))
            .collect();
        IndexRemap::from_order(
            forsyth_order(&vertices, mesh.points.len(), cache_size),
            mesh.triangles.len(),
        )?
    } else {
        IndexRemap::identity(mesh.triangles.len())
    };

    Ok(Layout {
        points: IndexRemap::from_order(point_order, mesh.points.len())?,
        springs: IndexRemap::from_order(spring_order, mesh.springs.len())?,
        triangles,
    })
}

fn stripes(mesh: &FactoryMesh, stripe_height: usize) -> (Vec<usize>, Vec<usize>) {
    let matrix = &mesh.matrix;
    let width = matrix.ship_width();
    let stripe_height = stripe_height.max(2) as i32;

    let mut points = Emitter::new(mesh.points.len());
    let mut springs = Emitter::new(mesh.springs.len());
    let mut window: Vec<PointId> = Vec::with_capacity(2 * stripe_height as usize);

    let mut y = matrix.ship_height();
    while y >= 1 {
        for x in 1..=width {
            window.clear();
            let mut y1 = y;
            while y1 > y - stripe_height && y1 >= 1 {
                window.extend(matrix.get(x, y1));
                window.extend(matrix.get(x + 1, y1));
                y1 -= 1;
            }

            for (i, &a) in window.iter().enumerate() {
                for &b in &window[i + 1..] {
                    if let Some(s) = mesh.spring_between(a, b) {
                        springs.emit(s.index());
                    }
                }
            }
            for &p in &window {
                points.emit(p.index());
            }
        }
        y -= stripe_height - 1;
    }

    // Rope interior points and springs off the grid
    let grid_points = points.len();
    let grid_springs = springs.len();
    for p in 0..mesh.points.len() {
        if !points.is_emitted(p) {
            points.emit(p);
            for &s in &mesh.points[p].connected_springs {
                springs.emit(s.index());
            }
        }
    }
    springs.emit_remaining();

    log::debug!(
        "stripes: {} leftover points, {} leftover springs",
        mesh.points.len() - grid_points,
        mesh.springs.len() - grid_springs
    );

    (points.into_order(), springs.into_order())
}

fn tiles(mesh: &FactoryMesh, block_size: usize) -> Vec<usize> {
    let matrix = &mesh.matrix;
    let (width, height) = (matrix.ship_width(), matrix.ship_height());
    let block = block_size.max(1) as i32;

    let mut springs = Emitter::new(mesh.springs.len());

    for y in (1..=height).step_by(block as usize) {
        for x in (1..=width).step_by(block as usize) {
            for y2 in y..(y + block).min(height + 1) {
                for x2 in x..(x + block).min(width + 1) {
                    let Some(p) = matrix.get(x2, y2) else {
                        continue;
                    };
                    for &s in &mesh.point(p).connected_springs {
                        springs.emit(s.index());
                    }
                }
            }
        }
    }

    let leftovers = springs.emit_remaining();
    log::debug!("tiles: {} leftover springs", leftovers);

    springs.into_order()
}

fn points_by_first_appearance(mesh: &FactoryMesh, spring_order: &[usize]) -> Vec<usize> {
    let mut points = Emitter::new(mesh.points.len());
    for &s in spring_order {
        let spring = &mesh.springs[s];
        points.emit(spring.point_a.index());
        points.emit(spring.point_b.index());
    }
    points.emit_remaining();
    points.into_order()
}

// ==================== Application ====================

fn permute<T>(items: Vec<T>, remap: &IndexRemap) -> Vec<T> {
    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    remap
        .order()
        .iter()
        .filter_map(|&old| slots[old].take())
        .collect()
}

/// Reorder every array of the mesh and rewrite every index through the
/// layout's remaps.
pub(crate) fn apply_layout(mesh: &mut FactoryMesh, layout: &Layout) {
    let point = |p: PointId| PointId::new(layout.points.new_index(p.index()));
    let spring = |s: SpringId| SpringId::new(layout.springs.new_index(s.index()));
    let triangle = |t: TriangleId| TriangleId::new(layout.triangles.new_index(t.index()));

    mesh.points = permute(std::mem::take(&mut mesh.points), &layout.points);
    for p in &mut mesh.points {
        for s in &mut p.connected_springs {
            *s = spring(*s);
        }
        for t in &mut p.connected_triangles {
            *t = triangle(*t);
        }
    }

    mesh.springs = permute(std::mem::take(&mut mesh.springs), &layout.springs);
    for s in &mut mesh.springs {
        s.point_a = point(s.point_a);
        s.point_b = point(s.point_b);
        for t in &mut s.super_triangles {
            *t = triangle(*t);
        }
        s.covered_traverse_spring = s.covered_traverse_spring.map(spring);
    }

    mesh.triangles = permute(std::mem::take(&mut mesh.triangles), &layout.triangles);
    for t in &mut mesh.triangles {
        t.points = t.points.map(point);
        for s in &mut t.springs {
            *s = spring(*s);
        }
        t.covered_traverse_spring = t.covered_traverse_spring.map(spring);
    }

    for frontier in &mut mesh.frontiers {
        for e in &mut frontier.edges {
            *e = spring(*e);
        }
    }

    mesh.matrix.remap_points(point);
    mesh.pair_map = mesh
        .springs
        .iter()
        .enumerate()
        .map(|(i, s)| (PointPair::new(s.point_a, s.point_b), SpringId::new(i)))
        .collect();
}
