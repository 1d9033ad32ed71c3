//! Level loading and saving
//!
//! Uses RON (Rusty Object Notation) for human-readable level files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::info;

use super::grid::{Grid, WallType};
use super::player::Pose;
use crate::compositor::TextureSource;

/// Error type for level loading
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("invalid tile {ch:?} at ({x}, {y})")]
    InvalidTile { ch: char, x: usize, y: usize },

    #[error("player starts inside a wall at tile ({x}, {y})")]
    StartInsideWall { x: i32, y: i32 },
}

/// A playable map with its texture table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    /// One string per tile row; digits 1-9 are walls, '.' is floor
    pub rows: Vec<String>,
    pub player_start: Pose,
    /// Wall type to texture; must cover every wall type in `rows`
    pub textures: BTreeMap<WallType, TextureSource>,
    /// Built from `rows` on load (not serialized)
    #[serde(skip)]
    pub grid: Grid,
}

impl Level {
    /// Rebuild the grid from `rows` and check the start position
    fn prepare(&mut self) -> Result<(), LevelError> {
        self.grid = Grid::from_rows(&self.rows)?;
        let (x, y) = self.player_start.map_pos();
        if self.grid.is_wall(x, y) {
            return Err(LevelError::StartInsideWall { x, y });
        }
        Ok(())
    }
}

/// Load a level from a RON file
pub fn load_level<P: AsRef<Path>>(path: P) -> Result<Level, LevelError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let level = load_level_from_str(&contents)?;
    let (width, height) = level.grid.dimensions();
    info!(
        path = %path.display(),
        name = %level.name,
        width,
        height,
        walls = level.grid.len(),
        "loaded level"
    );
    Ok(level)
}

/// Save a level to a RON file
pub fn save_level<P: AsRef<Path>>(level: &Level, path: P) -> Result<(), LevelError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(level, config)?;
    fs::write(path, contents)?;
    Ok(())
}

/// Load a level from a RON string (for embedded levels or testing)
pub fn load_level_from_str(s: &str) -> Result<Level, LevelError> {
    let mut level: Level = ron::from_str(s)?;
    level.prepare()?;
    Ok(level)
}
