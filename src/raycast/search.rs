//! Grid-line walks for a single ray
//!
//! A ray is split into two independent searches: one visiting every
//! horizontal grid line it crosses (y = integer) and one visiting every
//! vertical line (x = integer). Each walk advances line by line with a fixed
//! depth increment and checks the tile on the far side of the line.

use crate::rasterizer::Vec2;
use crate::world::{GridProvider, WallType};

/// Below this |sin| (or |cos|) the ray runs parallel to the lines being searched
const AXIS_EPSILON: f32 = 1e-9;

/// Where a grid-line walk stopped
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeHit {
    /// Distance along the ray to the last line examined
    pub depth: f32,
    /// Wall found, or None if the walk ran out of steps
    pub wall: Option<WallType>,
    /// Position along the crossed line: x for horizontal lines, y for vertical
    pub crossing: f32,
}

impl EdgeHit {
    fn parallel() -> Self {
        Self {
            depth: f32::INFINITY,
            wall: None,
            crossing: 0.0,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.wall.is_some()
    }
}

/// Walk horizontal grid lines, stepping one row per iteration
pub fn horizontal<G>(grid: &G, origin: Vec2, sin_a: f32, cos_a: f32, max_steps: usize) -> EdgeHit
where
    G: GridProvider + ?Sized,
{
    walk(origin.y, origin.x, sin_a, cos_a, max_steps, |row, column| {
        grid.lookup(column, row)
    })
}

/// Walk vertical grid lines, stepping one column per iteration
pub fn vertical<G>(grid: &G, origin: Vec2, sin_a: f32, cos_a: f32, max_steps: usize) -> EdgeHit
where
    G: GridProvider + ?Sized,
{
    walk(origin.x, origin.y, cos_a, sin_a, max_steps, |column, row| {
        grid.lookup(column, row)
    })
}

/// Shared stepping loop.
///
/// `along` is the coordinate being stepped (line index axis), `across` the
/// one solved for. `lookup` receives (line-side tile index, across tile index).
fn walk<F>(along: f32, across: f32, dir_along: f32, dir_across: f32, max_steps: usize, lookup: F) -> EdgeHit
where
    F: Fn(i32, i32) -> Option<WallType>,
{
    if dir_along.abs() < AXIS_EPSILON {
        return EdgeHit::parallel();
    }

    let cell = along.floor();
    // Moving backwards the tile sits before the line, so look one index lower
    let (mut line, step, behind) = if dir_along > 0.0 {
        (cell + 1.0, 1.0, 0)
    } else {
        (cell, -1.0, -1)
    };

    let mut depth = (line - along) / dir_along;
    let mut cross = across + depth * dir_across;
    let delta_depth = step / dir_along;
    let delta_cross = delta_depth * dir_across;

    for _ in 0..max_steps {
        if let Some(wall) = lookup(line as i32 + behind, cross.floor() as i32) {
            return EdgeHit {
                depth,
                wall: Some(wall),
                crossing: cross,
            };
        }
        line += step;
        cross += delta_cross;
        depth += delta_depth;
    }

    EdgeHit {
        depth,
        wall: None,
        crossing: cross,
    }
}
