//! Startup settings and the projection constants derived from them
//!
//! Settings live in a RON file next to the levels. Everything in here is
//! fixed once the window opens; nothing mutates it at runtime.

use std::f32::consts::PI;
use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;

use crate::compositor::TextureSource;
use crate::rasterizer::Color;
use crate::world::WallType;

/// Default settings file location
pub const SETTINGS_PATH: &str = "assets/settings.ron";

/// Settings errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("num_rays must be non-zero")]
    NoRays,

    #[error("screen width {width} is not a multiple of num_rays {num_rays}")]
    UnevenColumns { width: usize, num_rays: usize },

    #[error("field of view must be in (0, PI) radians, got {0}")]
    FieldOfView(f32),

    #[error("max_depth must be non-zero")]
    NoSearchDepth,

    #[error("texture_size {texture_size} is smaller than the column width {scale}")]
    TextureTooSmall { texture_size: usize, scale: usize },

    #[error("screen must be at least 1x2 pixels, got {width}x{height}")]
    ScreenTooSmall { width: usize, height: usize },

    #[error("unknown log level: {0}")]
    LogLevel(String),
}

/// User-facing settings (RON)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Internal render resolution
    pub width: usize,
    pub height: usize,
    /// Window is the render resolution multiplied by this
    pub window_scale: usize,
    /// Horizontal field of view in radians
    pub fov: f32,
    /// Columns cast per frame (width must be a multiple of this)
    pub num_rays: usize,
    /// Grid lines a single edge search may cross before giving up
    pub max_depth: usize,
    /// Wall textures are resampled to this square size at load
    pub texture_size: usize,
    /// Wall type reported when a ray finds nothing on the first frame
    pub fallback_wall: WallType,
    pub floor_color: Color,
    pub sky: TextureSource,
    /// Sky pixels scrolled per unit of player turn
    pub sky_scroll_factor: f32,
    /// Level to load at startup
    pub level: String,
    /// Tiles per second
    pub player_speed: f32,
    /// Radians per second for keyboard turning
    pub rotation_speed: f32,
    /// Radians per pixel of mouse motion
    pub mouse_sensitivity: f32,
    /// Clamp on per-frame mouse motion, in pixels
    pub mouse_max_rel: f32,
    /// Collision radius in tiles
    pub player_radius: f32,
    /// Minimap pixels per tile
    pub minimap_tile: usize,
    /// One of trace, debug, info, warn, error
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            window_scale: 2,
            fov: PI / 3.0,
            num_rays: 400,
            max_depth: 20,
            texture_size: 256,
            fallback_wall: 1,
            floor_color: Color::new(30, 30, 30),
            sky: TextureSource::Gradient {
                top: Color::new(20, 30, 70),
                bottom: Color::new(120, 140, 190),
            },
            sky_scroll_factor: 4.5,
            level: "assets/levels/default.ron".to_string(),
            player_speed: 3.0,
            rotation_speed: 2.0,
            mouse_sensitivity: 0.003,
            mouse_max_rel: 40.0,
            player_radius: 0.2,
            minimap_tile: 8,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from a RON string
    pub fn from_ron(s: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(s)?)
    }

    /// Load settings from disk; `Ok(None)` if the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_ron(&contents).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn tracing_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    /// Validate and derive the fixed projection constants
    pub fn projection(&self) -> Result<Projection, ConfigError> {
        if self.width == 0 || self.height < 2 {
            return Err(ConfigError::ScreenTooSmall { width: self.width, height: self.height });
        }
        if self.num_rays == 0 {
            return Err(ConfigError::NoRays);
        }
        if self.width % self.num_rays != 0 {
            return Err(ConfigError::UnevenColumns { width: self.width, num_rays: self.num_rays });
        }
        if !(self.fov > 0.0 && self.fov < PI) {
            return Err(ConfigError::FieldOfView(self.fov));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::NoSearchDepth);
        }
        let scale = self.width / self.num_rays;
        if self.texture_size < scale {
            return Err(ConfigError::TextureTooSmall { texture_size: self.texture_size, scale });
        }

        let half_width = self.width / 2;
        let half_fov = self.fov / 2.0;
        Ok(Projection {
            width: self.width,
            height: self.height,
            half_width,
            half_height: self.height / 2,
            fov: self.fov,
            half_fov,
            num_rays: self.num_rays,
            delta_angle: self.fov / self.num_rays as f32,
            max_depth: self.max_depth,
            screen_dist: half_width as f32 / half_fov.tan(),
            scale,
            texture_size: self.texture_size,
        })
    }
}

/// Screen geometry shared by the ray caster and the compositor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub width: usize,
    pub height: usize,
    pub half_width: usize,
    pub half_height: usize,
    pub fov: f32,
    pub half_fov: f32,
    pub num_rays: usize,
    /// Angle between neighbouring rays
    pub delta_angle: f32,
    pub max_depth: usize,
    /// Distance from the eye to the projection plane, in pixels
    pub screen_dist: f32,
    /// Screen pixels per ray column
    pub scale: usize,
    pub texture_size: usize,
}

impl Projection {
    pub fn half_texture_size(&self) -> f32 {
        self.texture_size as f32 / 2.0
    }
}
