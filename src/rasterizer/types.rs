//! Core pixel types for the renderer

use serde::{Serialize, Deserialize};
use std::path::Path;
use thiserror::Error;

/// RGBA color (0-255 per channel)
///
/// Serialized as an `(r, g, b)` tuple; deserialized colors are opaque.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(u8, u8, u8)", into = "(u8, u8, u8)")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Linear blend towards `other` (t = 0.0 keeps self, 1.0 gives other)
    pub fn lerp(self, other: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }

    /// Convert to [u8; 4] for framebuffer
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::new(r, g, b)
    }
}

impl From<Color> for (u8, u8, u8) {
    fn from(c: Color) -> Self {
        (c.r, c.g, c.b)
    }
}

/// Texture decoding errors
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to load {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture size must be non-zero, got {width}x{height}")]
    EmptySize { width: usize, height: usize },
}

/// Simple texture (array of colors, row-major)
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

impl Texture {
    #[cfg(test)]
    pub fn new(width: usize, height: usize) -> Self {
        Self::solid(width, height, Color::WHITE)
    }

    /// Single flat color
    pub fn solid(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    /// Load texture from an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self::from_image(img, name))
    }

    fn from_image(img: image::DynamicImage, name: String) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        }
    }

    /// Create a checkerboard texture with square cells of `cell` pixels
    pub fn checkerboard(width: usize, height: usize, cell: usize, color1: Color, color2: Color) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Vertical gradient from `top` to `bottom`
    pub fn gradient(width: usize, height: usize, top: Color, bottom: Color) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        let span = height.saturating_sub(1).max(1) as f32;
        for y in 0..height {
            let row = top.lerp(bottom, y as f32 / span);
            pixels.extend(std::iter::repeat(row).take(width));
        }
        Self { width, height, pixels, name: "gradient".to_string() }
    }

    /// Get pixel at x,y coordinates
    #[cfg(test)]
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::BLACK
        }
    }

    /// Resample a source rectangle into a new `out_w` x `out_h` texture (nearest neighbour).
    ///
    /// The source rectangle is in texel units and may be fractional; samples
    /// that fall outside the texture are clamped to the border.
    pub fn sample_region(
        &self,
        src_x: f32,
        src_y: f32,
        src_w: f32,
        src_h: f32,
        out_w: usize,
        out_h: usize,
    ) -> Texture {
        let mut pixels = Vec::with_capacity(out_w * out_h);
        if self.width == 0 || self.height == 0 {
            pixels.resize(out_w * out_h, Color::TRANSPARENT);
            return Texture { width: out_w, height: out_h, pixels, name: self.name.clone() };
        }

        let max_x = self.width - 1;
        let max_y = self.height - 1;
        let step_x = src_w / out_w.max(1) as f32;
        let step_y = src_h / out_h.max(1) as f32;

        // Column lookup is shared by every row
        let columns: Vec<usize> = (0..out_w)
            .map(|ox| ((src_x + ox as f32 * step_x).max(0.0) as usize).min(max_x))
            .collect();

        for oy in 0..out_h {
            let sy = ((src_y + oy as f32 * step_y).max(0.0) as usize).min(max_y);
            let row = &self.pixels[sy * self.width..(sy + 1) * self.width];
            pixels.extend(columns.iter().map(|&sx| row[sx]));
        }

        Texture { width: out_w, height: out_h, pixels, name: self.name.clone() }
    }

    /// Whole texture resampled to a new size
    pub fn scaled(&self, width: usize, height: usize) -> Result<Texture, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptySize { width, height });
        }
        Ok(self.sample_region(0.0, 0.0, self.width as f32, self.height as f32, width, height))
    }
}
