//! Viewer pose and a minimal first-person controller

use serde::{Serialize, Deserialize};

use super::grid::GridProvider;
use crate::config::Settings;
use crate::rasterizer::{wrap_angle, Vec2};

/// Continuous position (grid units) and heading (radians)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pos: Vec2,
    pub angle: f32,
}

impl Pose {
    #[cfg(test)]
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            angle,
        }
    }

    /// Tile the viewer stands in
    pub fn map_pos(&self) -> (i32, i32) {
        self.pos.tile()
    }
}

/// One frame of movement intent, already decoded from the keyboard/mouse
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput {
    /// +1 forward, -1 backward
    pub forward: f32,
    /// +1 right, -1 left
    pub strafe: f32,
    /// +1 turn right (increasing angle), -1 turn left
    pub turn: f32,
    /// Horizontal mouse motion in pixels since last frame
    pub mouse_dx: f32,
}

pub struct Player {
    pub pose: Pose,
    /// Heading change this frame, in mouse pixels (drives the sky scroll)
    pub rel: f32,
}

impl Player {
    pub fn new(pose: Pose) -> Self {
        Self { pose, rel: 0.0 }
    }

    pub fn update<G: GridProvider>(&mut self, input: &MoveInput, dt: f32, grid: &G, settings: &Settings) {
        let mouse = input
            .mouse_dx
            .clamp(-settings.mouse_max_rel, settings.mouse_max_rel);
        let turn = input.turn * settings.rotation_speed * dt + mouse * settings.mouse_sensitivity;
        self.pose.angle = wrap_angle(self.pose.angle + turn);
        self.rel = if settings.mouse_sensitivity > 0.0 {
            turn / settings.mouse_sensitivity
        } else {
            mouse
        };

        let forward = Vec2::from_angle(self.pose.angle);
        let right = Vec2::new(-forward.y, forward.x);
        let mut step = forward * input.forward + right * input.strafe;
        let len = step.len();
        if len == 0.0 {
            return;
        }
        // Diagonals move no faster than straight lines
        step = step * (settings.player_speed * dt / len.max(1.0));

        self.try_move(step, grid, settings.player_radius);
    }

    /// Move one axis at a time so the player slides along walls
    fn try_move<G: GridProvider>(&mut self, step: Vec2, grid: &G, radius: f32) {
        let pos = self.pose.pos;
        let probe_x = pos.x + step.x + radius.copysign(step.x);
        if step.x != 0.0 && is_free(grid, probe_x, pos.y, radius) {
            self.pose.pos.x += step.x;
        }

        let pos = self.pose.pos;
        let probe_y = pos.y + step.y + radius.copysign(step.y);
        if step.y != 0.0 && is_free(grid, pos.x, probe_y, radius) {
            self.pose.pos.y += step.y;
        }
    }
}

/// The leading edge point and its two neighbours across the radius are all open
fn is_free<G: GridProvider>(grid: &G, x: f32, y: f32, radius: f32) -> bool {
    let samples = [
        (x, y),
        (x - radius, y - radius),
        (x + radius, y + radius),
        (x - radius, y + radius),
        (x + radius, y - radius),
    ];
    samples
        .iter()
        .all(|&(sx, sy)| grid.lookup(sx.floor() as i32, sy.floor() as i32).is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Grid;

    fn room() -> Grid {
        Grid::from_rows(&["11111", "1...1", "1...1", "1...1", "11111"]).unwrap()
    }

    #[test]
    fn test_forward_moves_along_heading() {
        let grid = room();
        let settings = Settings::default();
        let mut player = Player::new(Pose::new(2.0, 2.5, 0.0));
        let input = MoveInput { forward: 1.0, ..Default::default() };
        player.update(&input, 0.1, &grid, &settings);
        assert!((player.pose.pos.x - 2.3).abs() < 1e-4);
        assert!((player.pose.pos.y - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_wall_blocks_movement() {
        let grid = room();
        let settings = Settings::default();
        let mut player = Player::new(Pose::new(3.5, 2.5, 0.0));
        let input = MoveInput { forward: 1.0, ..Default::default() };
        for _ in 0..50 {
            player.update(&input, 0.1, &grid, &settings);
        }
        assert!(player.pose.pos.x < 4.0 - settings.player_radius + 1e-3);
        assert_eq!(player.pose.map_pos(), (3, 2));
    }

    #[test]
    fn test_turn_sets_rel_and_wraps() {
        let grid = room();
        let settings = Settings::default();
        let mut player = Player::new(Pose::new(2.5, 2.5, 0.0));
        let input = MoveInput { mouse_dx: -10.0, ..Default::default() };
        player.update(&input, 0.016, &grid, &settings);
        assert!((player.rel + 10.0).abs() < 1e-3);
        assert!(player.pose.angle > 6.0);
    }

    #[test]
    fn test_mouse_motion_is_clamped() {
        let grid = room();
        let settings = Settings::default();
        let mut player = Player::new(Pose::new(2.5, 2.5, 0.0));
        let input = MoveInput { mouse_dx: 500.0, ..Default::default() };
        player.update(&input, 0.016, &grid, &settings);
        assert!((player.rel - settings.mouse_max_rel).abs() < 1e-3);
    }
}
