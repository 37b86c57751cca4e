//! Frontier tracing: closed loops of boundary springs.
//!
//! A boundary spring is one with exactly one super-triangle. Columns are
//! scanned bottom to top while tracking whether the scan is inside a run of
//! triangulated points. Entering a run starts a walk from the entry point
//! with the empty side to the south, which discovers the outer boundary;
//! leaving a run starts a walk from the last point of the run with the empty
//! side to the north, which discovers a hole. Walks that immediately hit an
//! already-recorded edge belong to a known loop and yield nothing.

use std::collections::HashSet;

use super::types::{opposite, rotate_cw, FactoryFrontier, FactoryMesh, Octant, OCTANT_N, OCTANT_S};
use crate::error::{BuildError, Result};
use crate::index::{PointId, SpringId};
use crate::physics::FrontierType;

/// Trace every frontier of the mesh.
///
/// # Returns
/// The number of frontiers found.
pub(crate) fn trace_frontiers(mesh: &mut FactoryMesh) -> Result<usize> {
    let width = mesh.matrix.ship_width();
    let height = mesh.matrix.ship_height();

    let mut used_edges: HashSet<SpringId> = HashSet::new();
    let mut frontiers = Vec::new();

    for x in 1..=width {
        let mut in_region = false;

        for y in 1..=height {
            let here = mesh.matrix.get(x, y);

            if in_region {
                let previous = mesh.matrix.get(x, y - 1).ok_or_else(|| {
                    BuildError::frontier(format!("region at ({}, {}) has no point below", x, y))
                })?;

                in_region = here
                    .and_then(|p| mesh.spring_between(previous, p))
                    .is_some_and(|s| !mesh.spring(s).super_triangles.is_empty());

                if !in_region {
                    let edges = walk_boundary(mesh, previous, x, y - 1, OCTANT_N, &mut used_edges)?;
                    if !edges.is_empty() {
                        frontiers.push(FactoryFrontier {
                            frontier_type: FrontierType::Internal,
                            edges,
                        });
                    }
                }
            }

            if !in_region {
                if let Some(p) = here {
                    if !mesh.point(p).connected_triangles.is_empty() {
                        in_region = true;
                        let edges = walk_boundary(mesh, p, x, y, OCTANT_S, &mut used_edges)?;
                        if !edges.is_empty() {
                            frontiers.push(FactoryFrontier {
                                frontier_type: FrontierType::External,
                                edges,
                            });
                        }
                    }
                }
            }
        }
    }

    let count = frontiers.len();
    mesh.frontiers = frontiers;
    Ok(count)
}

/// Walk the boundary clockwise from `start` until it closes.
///
/// At each point the octants after `octant` are searched clockwise for a
/// neighbor joined by a boundary spring; the walk then continues from that
/// neighbor, searching from the direction it came from.
fn walk_boundary(
    mesh: &FactoryMesh,
    start: PointId,
    start_x: i32,
    start_y: i32,
    start_octant: Octant,
    used_edges: &mut HashSet<SpringId>,
) -> Result<Vec<SpringId>> {
    let mut edges = Vec::new();

    let mut point = start;
    let (mut x, mut y) = (start_x, start_y);
    let mut octant = start_octant;

    // Each spring is recorded at most once
    for _ in 0..=mesh.springs.len() {
        let (next, next_octant, spring) = next_boundary_step(mesh, point, x, y, octant)?;

        if !used_edges.insert(spring) {
            if !edges.is_empty() {
                return Err(BuildError::frontier(format!(
                    "boundary walk from {:?} rejoined recorded edge {:?} midway",
                    start, spring
                )));
            }
            return Ok(edges);
        }
        edges.push(spring);

        if next == start {
            if edges.len() < 3 {
                return Err(BuildError::frontier(format!(
                    "loop from {:?} closed after {} edges",
                    start,
                    edges.len()
                )));
            }
            return Ok(edges);
        }

        let (dx, dy) = super::types::OCTANT_DIRECTIONS[next_octant];
        point = next;
        x += dx;
        y += dy;
        octant = opposite(next_octant);
    }

    Err(BuildError::frontier(format!(
        "boundary walk from {:?} did not close",
        start
    )))
}

fn next_boundary_step(
    mesh: &FactoryMesh,
    point: PointId,
    x: i32,
    y: i32,
    octant: Octant,
) -> Result<(PointId, Octant, SpringId)> {
    let mut candidate = rotate_cw(octant);
    while candidate != octant {
        if let Some(next) = mesh.matrix.neighbor(x, y, candidate) {
            if let Some(s) = mesh.spring_between(point, next) {
                if mesh.spring(s).super_triangles.len() == 1 {
                    return Ok((next, candidate, s));
                }
            }
        }
        candidate = rotate_cw(candidate);
    }

    Err(BuildError::frontier(format!(
        "cannot find a frontierable point at any octant around {:?}",
        point
    )))
}

/// Whether `edges` form one closed loop visiting each spring once.
pub(crate) fn is_closed_loop<F>(edges: &[SpringId], endpoints: F) -> bool
where
    F: Fn(SpringId) -> (PointId, PointId),
{
    if edges.len() < 3 {
        return false;
    }
    let mut seen = HashSet::with_capacity(edges.len());
    if !edges.iter().all(|&e| seen.insert(e)) {
        return false;
    }

    let (a0, b0) = endpoints(edges[0]);
    let (a1, b1) = endpoints(edges[1]);
    let start = if b0 == a1 || b0 == b1 { a0 } else { b0 };

    let mut current = start;
    for &e in edges {
        let (a, b) = endpoints(e);
        current = if a == current {
            b
        } else if b == current {
            a
        } else {
            return false;
        };
    }
    current == start
}
