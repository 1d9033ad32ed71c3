//! Top-down debug overlay: wall tiles, every cast ray, and the viewer

use crate::rasterizer::{Color, FrameSink, Framebuffer};
use crate::raycast::RayHit;
use crate::world::{Grid, Pose};

pub struct Minimap {
    /// Pixels per tile
    pub tile: usize,
    pub wall_color: Color,
    pub ray_color: Color,
    pub player_color: Color,
}

impl Minimap {
    pub fn new(tile: usize) -> Self {
        Self {
            tile: tile.max(1),
            wall_color: Color::new(90, 90, 90),
            ray_color: Color::new(230, 230, 230),
            player_color: Color::new(40, 220, 40),
        }
    }

    /// Draw at the top-left corner. Rays are drawn at their radial length,
    /// capped at `max_len` tiles so misses stay on the map.
    pub fn draw(&self, fb: &mut Framebuffer, grid: &Grid, pose: &Pose, hits: &[RayHit], max_len: f32) {
        let t = self.tile as f32;

        for ((x, y), _) in grid.iter() {
            if x < 0 || y < 0 {
                continue;
            }
            fb.fill_rect(x * self.tile as i32, y * self.tile as i32, self.tile, self.tile, self.wall_color);
        }

        let ox = pose.pos.x * t;
        let oy = pose.pos.y * t;
        for hit in hits {
            let len = hit.radial_depth.min(max_len) * t;
            let (sin_a, cos_a) = hit.angle.sin_cos();
            fb.draw_line(
                ox as i32,
                oy as i32,
                (ox + len * cos_a) as i32,
                (oy + len * sin_a) as i32,
                self.ray_color,
            );
        }

        fb.draw_circle(ox as i32, oy as i32, (self.tile / 4).max(1) as i32, self.player_color);
    }
}
