//! Per-column ray casting against the tile grid
//!
//! For every screen column a ray is cast at
//! `heading - half_fov + START_ANGLE_EPSILON + column * delta_angle`.
//! The horizontal and vertical line searches run independently and the
//! nearer one supplies depth, wall type and texture offset. Depth is then
//! fisheye-corrected and turned into an on-screen wall height.
//!
//! Columns are independent, so a frame is cast with a rayon parallel
//! iterator and collected into a fresh buffer, one slot per column.

mod search;

use search::EdgeHit;

use rayon::prelude::*;
use tracing::trace;

use crate::config::Projection;
use crate::rasterizer::Vec2;
use crate::world::{GridProvider, Pose, WallType};

/// Nudge on the first ray angle so no ray starts exactly axis-aligned
pub const START_ANGLE_EPSILON: f32 = 0.0001;

/// Added to depth before projecting so the height stays finite
pub const DEPTH_EPSILON: f32 = 0.0001;

/// Largest texture offset handed out (offsets live in [0, 1))
const MAX_OFFSET: f32 = 1.0 - f32::EPSILON;

/// Which family of grid lines the ray stopped on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// y = integer line (wall face runs along x)
    Horizontal,
    /// x = integer line (wall face runs along y)
    Vertical,
}

/// Nearest hit along a single ray, before fisheye correction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawHit {
    pub radial_depth: f32,
    pub wall: Option<WallType>,
    pub offset: f32,
    pub edge: Edge,
}

/// Result for one screen column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Perpendicular distance to the view plane
    pub depth: f32,
    /// Wall slice height in screen pixels
    pub projected_height: f32,
    pub wall: WallType,
    /// Horizontal texture coordinate in [0, 1)
    pub offset: f32,
    /// Distance along the ray, before fisheye correction
    pub radial_depth: f32,
    pub angle: f32,
    pub edge: Edge,
    /// False when both searches ran out of steps and `wall` is a fallback
    pub hit: bool,
}

/// Cast a single ray from `origin`
pub fn cast_ray<G>(grid: &G, origin: Vec2, angle: f32, max_depth: usize) -> RawHit
where
    G: GridProvider + ?Sized,
{
    let (sin_a, cos_a) = angle.sin_cos();
    let hor = search::horizontal(grid, origin, sin_a, cos_a, max_depth);
    let vert = search::vertical(grid, origin, sin_a, cos_a, max_depth);

    if vertical_is_nearer(&hor, &vert) {
        RawHit {
            radial_depth: vert.depth,
            wall: vert.wall,
            offset: texture_offset(vert.crossing, cos_a <= 0.0),
            edge: Edge::Vertical,
        }
    } else {
        RawHit {
            radial_depth: hor.depth,
            wall: hor.wall,
            offset: texture_offset(hor.crossing, sin_a > 0.0),
            edge: Edge::Horizontal,
        }
    }
}

/// A search that found a wall beats one that ran out of steps; otherwise the
/// vertical result wins only when strictly closer.
fn vertical_is_nearer(hor: &EdgeHit, vert: &EdgeHit) -> bool {
    match (hor.is_hit(), vert.is_hit()) {
        (true, false) => false,
        (false, true) => true,
        _ => vert.depth < hor.depth,
    }
}

/// Fractional position along the wall face, mirrored so every face reads
/// left to right when viewed from the open side.
fn texture_offset(crossing: f32, mirrored: bool) -> f32 {
    let frac = crossing.rem_euclid(1.0);
    if !frac.is_finite() {
        return 0.0;
    }
    let offset = if mirrored { 1.0 - frac } else { frac };
    offset.clamp(0.0, MAX_OFFSET)
}

/// Radial distance to distance from the view plane
pub fn perpendicular_depth(radial_depth: f32, heading: f32, angle: f32) -> f32 {
    radial_depth * (heading - angle).cos()
}

/// On-screen wall height in pixels for a perpendicular depth
pub fn projected_height(depth: f32, screen_dist: f32) -> f32 {
    screen_dist / (depth + DEPTH_EPSILON)
}

/// Casts a full frame of rays
pub struct RayCaster {
    projection: Projection,
    /// Wall type for columns that have never hit anything
    fallback_wall: WallType,
    results: Vec<RayHit>,
}

impl RayCaster {
    pub fn new(projection: Projection, fallback_wall: WallType) -> Self {
        Self {
            projection,
            fallback_wall,
            results: Vec::with_capacity(projection.num_rays),
        }
    }

    /// Results of the last `cast`, left to right
    #[cfg(test)]
    pub fn results(&self) -> &[RayHit] {
        &self.results
    }

    /// Angle of the ray for `column` given the viewer heading
    pub fn ray_angle(&self, heading: f32, column: usize) -> f32 {
        heading - self.projection.half_fov + START_ANGLE_EPSILON + column as f32 * self.projection.delta_angle
    }

    /// Cast one ray per column.
    ///
    /// A column whose searches both run out of steps keeps the wall type it
    /// reported last frame (or `fallback_wall` on the first frame).
    pub fn cast<G>(&mut self, grid: &G, pose: &Pose) -> &[RayHit]
    where
        G: GridProvider + Sync + ?Sized,
    {
        let previous = std::mem::take(&mut self.results);
        let projection = self.projection;
        let fallback_wall = self.fallback_wall;

        let results: Vec<RayHit> = (0..projection.num_rays)
            .into_par_iter()
            .map(|column| {
                let angle = self.ray_angle(pose.angle, column);
                let raw = cast_ray(grid, pose.pos, angle, projection.max_depth);
                let wall = raw.wall.unwrap_or_else(|| {
                    previous.get(column).map_or(fallback_wall, |last| last.wall)
                });
                let depth = perpendicular_depth(raw.radial_depth, pose.angle, angle);

                RayHit {
                    depth,
                    projected_height: projected_height(depth, projection.screen_dist),
                    wall,
                    offset: raw.offset,
                    radial_depth: raw.radial_depth,
                    angle,
                    edge: raw.edge,
                    hit: raw.wall.is_some(),
                }
            })
            .collect();

        let misses = results.iter().filter(|r| !r.hit).count();
        if misses > 0 {
            trace!(misses, "rays ran out of search depth");
        }

        self.results = results;
        &self.results
    }
}
