//! Tile grid: integer tile coordinates to wall types
//!
//! Sparse storage, absent tiles are walkable. The ray caster only ever sees
//! the grid through `GridProvider`.

use std::collections::{BTreeSet, HashMap};

use super::level::LevelError;

/// Wall type identifier (small positive integer, keys the texture atlas)
pub type WallType = u8;

/// Read-only tile lookup used by the ray caster
pub trait GridProvider {
    /// Wall type at tile (x, y), or None if the tile is empty
    fn lookup(&self, tile_x: i32, tile_y: i32) -> Option<WallType>;
}

/// Sparse wall map
#[derive(Debug, Clone, Default)]
pub struct Grid {
    tiles: HashMap<(i32, i32), WallType>,
    width: i32,
    height: i32,
}

impl Grid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse text rows: digits 1-9 are walls, '.' and ' ' are empty.
    /// Row index is the tile y, character index is the tile x.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, LevelError> {
        let mut grid = Grid::new();
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.as_ref().chars().enumerate() {
                match ch {
                    '.' | ' ' => {}
                    '1'..='9' => grid.set(x as i32, y as i32, ch as u8 - b'0'),
                    other => {
                        return Err(LevelError::InvalidTile { ch: other, x, y });
                    }
                }
            }
        }
        Ok(grid)
    }

    /// Place a wall; a wall type of 0 clears the tile
    pub fn set(&mut self, x: i32, y: i32, wall: WallType) {
        if wall == 0 {
            self.clear(x, y);
            return;
        }
        self.tiles.insert((x, y), wall);
        self.width = self.width.max(x + 1);
        self.height = self.height.max(y + 1);
    }

    /// Remove a wall (destructible walls change between frames)
    pub fn clear(&mut self, x: i32, y: i32) -> Option<WallType> {
        self.tiles.remove(&(x, y))
    }

    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.tiles.contains_key(&(x, y))
    }

    /// Extent of the occupied area in tiles, starting at the origin
    pub fn dimensions(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Every distinct wall type present
    pub fn wall_types(&self) -> BTreeSet<WallType> {
        self.tiles.values().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((i32, i32), WallType)> + '_ {
        self.tiles.iter().map(|(&pos, &wall)| (pos, wall))
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }
}

impl GridProvider for Grid {
    fn lookup(&self, tile_x: i32, tile_y: i32) -> Option<WallType> {
        self.tiles.get(&(tile_x, tile_y)).copied()
    }
}
