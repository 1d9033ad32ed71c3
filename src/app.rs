//! Application state and the per-frame pipeline
//!
//! Player update, ray cast, composite, optional minimap. Runs strictly in
//! that order every frame; the window layer only feeds input and presents
//! the framebuffer.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::compositor::{AtlasError, Compositor, TextureAtlas};
use crate::config::{ConfigError, Settings};
use crate::minimap::Minimap;
use crate::rasterizer::{Color, Framebuffer, TextureError};
use crate::raycast::RayCaster;
use crate::world::{load_level, save_level, Level, LevelError, MoveInput, Player};

/// Anything that stops the renderer from starting
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("settings: {0}")]
    Config(#[from] ConfigError),

    #[error("level: {0}")]
    Level(#[from] LevelError),

    #[error("wall textures: {0}")]
    Atlas(#[from] AtlasError),

    #[error("sky texture: {0}")]
    Sky(#[from] TextureError),
}

pub struct AppState {
    pub settings: Settings,
    pub level: Level,
    pub player: Player,
    pub caster: RayCaster,
    pub compositor: Compositor,
    pub atlas: TextureAtlas,
    pub fb: Framebuffer,
    pub minimap: Minimap,
    pub show_minimap: bool,
}

impl AppState {
    /// Load the level named in the settings and build every renderer stage
    pub fn load(settings: Settings) -> Result<Self, StartupError> {
        let level = load_level(&settings.level)?;
        Self::from_level(settings, level)
    }

    pub fn from_level(settings: Settings, level: Level) -> Result<Self, StartupError> {
        let projection = settings.projection()?;
        let atlas = TextureAtlas::load(
            &level.textures,
            &level.grid,
            projection.texture_size,
            settings.fallback_wall,
        )?;
        let sky = settings.sky.load(projection.width, projection.half_height)?;

        info!(
            width = projection.width,
            height = projection.height,
            rays = projection.num_rays,
            scale = projection.scale,
            "renderer ready"
        );

        Ok(Self {
            player: Player::new(level.player_start),
            caster: RayCaster::new(projection, settings.fallback_wall),
            compositor: Compositor::new(projection, sky, settings.floor_color, settings.sky_scroll_factor),
            fb: Framebuffer::new(projection.width, projection.height),
            minimap: Minimap::new(settings.minimap_tile),
            show_minimap: false,
            atlas,
            level,
            settings,
        })
    }

    /// Write the level back out with the player's current pose as the start
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), LevelError> {
        let mut snapshot = self.level.clone();
        snapshot.player_start = self.player.pose;
        save_level(&snapshot, &path)?;
        info!(path = %path.as_ref().display(), "saved level snapshot");
        Ok(())
    }

    /// Advance one frame and leave the finished image in `fb`
    pub fn frame(&mut self, input: &MoveInput, dt: f32) {
        self.player.update(input, dt, &self.level.grid, &self.settings);

        self.fb.clear(Color::BLACK);
        let hits = self.caster.cast(&self.level.grid, &self.player.pose);
        self.compositor.render(hits, &self.atlas, &mut self.fb, self.player.rel);

        if self.show_minimap {
            let max_len = self.settings.max_depth as f32;
            self.minimap.draw(&mut self.fb, &self.level.grid, &self.player.pose, hits, max_len);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::load_level_from_str;

    const ROOM: &str = r#"(
        name: "room",
        rows: [
            "1111111111",
            "1........1",
            "1........1",
            "1........1",
            "1........1",
            "1........1",
            "1........1",
            "1........1",
            "1........1",
            "1111111111",
        ],
        player_start: (pos: (x: 5.0, y: 5.0), angle: 0.0),
        textures: {
            1: Solid((200, 0, 0)),
        },
    )"#;

    fn small_settings() -> Settings {
        Settings {
            width: 64,
            height: 48,
            num_rays: 32,
            texture_size: 16,
            floor_color: Color::new(10, 20, 30),
            sky: crate::compositor::TextureSource::Solid(Color::new(0, 0, 200)),
            ..Settings::default()
        }
    }

    #[test]
    fn test_frame_paints_sky_wall_and_floor() {
        let level = load_level_from_str(ROOM).unwrap();
        let mut app = AppState::from_level(small_settings(), level).unwrap();
        app.frame(&MoveInput::default(), 0.016);

        assert_eq!(app.caster.results().len(), 32);
        assert_eq!(app.fb.get_pixel(0, 0), Color::new(0, 0, 200));
        assert_eq!(app.fb.get_pixel(0, 47), Color::new(10, 20, 30));
        assert_eq!(app.fb.get_pixel(32, 24), Color::new(200, 0, 0));
    }

    #[test]
    fn test_minimap_overlay_draws_when_enabled() {
        let level = load_level_from_str(ROOM).unwrap();
        let mut app = AppState::from_level(small_settings(), level).unwrap();
        app.show_minimap = true;
        app.frame(&MoveInput::default(), 0.016);
        assert_eq!(app.fb.get_pixel(0, 0), app.minimap.wall_color);
    }

    #[test]
    fn test_missing_wall_texture_fails_startup() {
        let level = load_level_from_str(&ROOM.replace("1: Solid", "2: Solid")).unwrap();
        let result = AppState::from_level(small_settings(), level);
        assert!(matches!(result, Err(StartupError::Atlas(AtlasError::MissingTextures(_)))));
    }

    #[test]
    fn test_bundled_assets_start_up() {
        let settings = Settings::load(crate::config::SETTINGS_PATH).unwrap().unwrap();
        let mut app = AppState::load(settings).unwrap();
        assert_eq!(app.atlas.len(), 5);
        app.frame(&MoveInput::default(), 0.016);
        assert!(app.caster.results().iter().all(|hit| hit.hit));
    }

    #[test]
    fn test_snapshot_restarts_at_current_pose() {
        let level = load_level_from_str(ROOM).unwrap();
        let mut app = AppState::from_level(small_settings(), level).unwrap();
        let forward = MoveInput { forward: 1.0, ..MoveInput::default() };
        app.frame(&forward, 0.5);
        let moved = app.player.pose;
        assert!(moved.pos.x > 5.0);

        let path = std::env::temp_dir().join("gridcaster_snapshot_test.ron");
        app.save_snapshot(&path).unwrap();
        let reloaded = load_level(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(reloaded.player_start, moved);
        assert_eq!(reloaded.rows, app.level.rows);
    }
}
