//! Wall texture atlas
//!
//! Built once at startup from the level's texture table. Every wall type the
//! grid uses (plus the caster's fallback type) must resolve to a texture, or
//! loading fails before the first frame is drawn.

use std::collections::{BTreeMap, HashMap};

use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::rasterizer::{Color, Texture, TextureError};
use crate::world::{Grid, WallType};

/// Atlas errors
#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("no texture configured for wall types {0:?}")]
    MissingTextures(Vec<WallType>),

    #[error("texture for wall type {wall}: {source}")]
    Texture {
        wall: WallType,
        #[source]
        source: TextureError,
    },
}

/// Where a texture's pixels come from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TextureSource {
    /// Image file (PNG, JPEG, BMP), resampled to the requested size
    Image(String),
    Checker { primary: Color, secondary: Color, cell: usize },
    Solid(Color),
    /// Vertical gradient, top row to bottom row
    Gradient { top: Color, bottom: Color },
}

impl TextureSource {
    /// Produce a `width` x `height` texture
    pub fn load(&self, width: usize, height: usize) -> Result<Texture, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptySize { width, height });
        }
        let texture = match self {
            TextureSource::Image(path) => {
                let image = Texture::from_file(path)?;
                let mut scaled = image.scaled(width, height)?;
                scaled.name = image.name;
                scaled
            }
            TextureSource::Checker { primary, secondary, cell } => {
                Texture::checkerboard(width, height, *cell, *primary, *secondary)
            }
            TextureSource::Solid(color) => Texture::solid(width, height, *color),
            TextureSource::Gradient { top, bottom } => Texture::gradient(width, height, *top, *bottom),
        };
        Ok(texture)
    }
}

/// Square wall textures keyed by wall type
#[derive(Debug, Default)]
pub struct TextureAtlas {
    textures: HashMap<WallType, Texture>,
    size: usize,
}

impl TextureAtlas {
    pub fn new(size: usize) -> Self {
        Self {
            textures: HashMap::new(),
            size,
        }
    }

    /// Resolve the texture table, failing on any wall type the grid needs but
    /// the table lacks, or on any entry that cannot be produced.
    pub fn load(
        table: &BTreeMap<WallType, TextureSource>,
        grid: &Grid,
        size: usize,
        fallback_wall: WallType,
    ) -> Result<Self, AtlasError> {
        let mut required = grid.wall_types();
        required.insert(fallback_wall);

        let missing: Vec<WallType> = required
            .iter()
            .copied()
            .filter(|wall| !table.contains_key(wall))
            .collect();
        if !missing.is_empty() {
            return Err(AtlasError::MissingTextures(missing));
        }

        let mut atlas = Self::new(size);
        for (&wall, source) in table {
            if !required.contains(&wall) {
                debug!(wall, "texture configured but unused by this grid");
            }
            let texture = source
                .load(size, size)
                .map_err(|source| AtlasError::Texture { wall, source })?;
            atlas.insert(wall, texture);
        }

        info!(textures = atlas.len(), size, "loaded wall textures");
        Ok(atlas)
    }

    /// Add or replace a texture (resampled to the atlas size if needed)
    pub fn insert(&mut self, wall: WallType, texture: Texture) {
        let texture = if texture.width == self.size && texture.height == self.size {
            texture
        } else {
            texture.sample_region(
                0.0,
                0.0,
                texture.width as f32,
                texture.height as f32,
                self.size,
                self.size,
            )
        };
        self.textures.insert(wall, texture);
    }

    pub fn get(&self, wall: WallType) -> Option<&Texture> {
        self.textures.get(&wall)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(entries: &[(WallType, TextureSource)]) -> BTreeMap<WallType, TextureSource> {
        entries.iter().cloned().collect()
    }

    #[test]
    fn test_load_resolves_every_wall() {
        let grid = Grid::from_rows(&["121", "1.1", "111"]).unwrap();
        let table = table(&[
            (1, TextureSource::Solid(Color::new(255, 0, 0))),
            (2, TextureSource::Checker { primary: Color::WHITE, secondary: Color::BLACK, cell: 4 }),
            (5, TextureSource::Solid(Color::WHITE)),
        ]);
        let atlas = TextureAtlas::load(&table, &grid, 16, 1).unwrap();
        assert_eq!(atlas.len(), 3);
        let tex = atlas.get(2).unwrap();
        assert_eq!((tex.width, tex.height), (16, 16));
        assert!(grid.wall_types().iter().all(|&wall| atlas.get(wall).is_some()));
    }

    #[test]
    fn test_missing_texture_is_fatal() {
        let grid = Grid::from_rows(&["1234"]).unwrap();
        let table = table(&[
            (1, TextureSource::Solid(Color::WHITE)),
            (3, TextureSource::Solid(Color::WHITE)),
        ]);
        match TextureAtlas::load(&table, &grid, 8, 1) {
            Err(AtlasError::MissingTextures(walls)) => assert_eq!(walls, vec![2, 4]),
            other => panic!("expected missing textures, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_wall_must_be_present() {
        let grid = Grid::from_rows(&["1"]).unwrap();
        let table = table(&[(1, TextureSource::Solid(Color::WHITE))]);
        assert!(matches!(
            TextureAtlas::load(&table, &grid, 8, 6),
            Err(AtlasError::MissingTextures(walls)) if walls == vec![6]
        ));
    }

    #[test]
    fn test_unreadable_image_is_fatal() {
        let grid = Grid::from_rows(&["1"]).unwrap();
        let table = table(&[(1, TextureSource::Image("does/not/exist.png".to_string()))]);
        assert!(matches!(
            TextureAtlas::load(&table, &grid, 8, 1),
            Err(AtlasError::Texture { wall: 1, .. })
        ));
    }

    #[test]
    fn test_insert_resamples_to_atlas_size() {
        let mut atlas = TextureAtlas::new(8);
        atlas.insert(1, Texture::solid(3, 5, Color::WHITE));
        let tex = atlas.get(1).unwrap();
        assert_eq!((tex.width, tex.height), (8, 8));
    }
}
