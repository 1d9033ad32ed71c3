//! Framebuffer for software rendering
//! Column strips, background fills and debug lines all land here.

use super::types::{Color, Texture};

/// Destination for blitted pixel blocks
///
/// The compositor only needs screen dimensions, rectangle fills and
/// top-left anchored blits, so anything implementing this can receive a frame.
pub trait FrameSink {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    /// Draw `image` with its top-left corner at (x, y), clipped to the screen
    fn blit(&mut self, image: &Texture, x: i32, y: i32);

    /// Fill a rectangle, clipped to the screen
    fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, color: Color);
}

/// RGBA8 framebuffer, 4 bytes per pixel
pub struct Framebuffer {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height * 4],
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        let bytes = color.to_bytes();
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&bytes);
        }
    }

    pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
        }
    }

    #[cfg(test)]
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            let idx = (y * self.width + x) * 4;
            Color::with_alpha(
                self.pixels[idx],
                self.pixels[idx + 1],
                self.pixels[idx + 2],
                self.pixels[idx + 3],
            )
        } else {
            Color::TRANSPARENT
        }
    }

    /// Draw a filled circle at (cx, cy) with given radius and color
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: Color) {
        let r_sq = radius * radius;
        for y in (cy - radius).max(0)..=(cy + radius).min(self.height as i32 - 1) {
            for x in (cx - radius).max(0)..=(cx + radius).min(self.width as i32 - 1) {
                let dx = x - cx;
                let dy = y - cy;
                if dx * dx + dy * dy <= r_sq {
                    self.set_pixel(x as usize, y as usize, color);
                }
            }
        }
    }

    /// Draw a line from (x0, y0) to (x1, y1) using Bresenham's algorithm
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
                self.set_pixel(x as usize, y as usize, color);
            }

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

impl FrameSink for Framebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn blit(&mut self, image: &Texture, x: i32, y: i32) {
        // Visible window of the image after clipping against the screen
        let x_start = (-x).max(0) as usize;
        let y_start = (-y).max(0) as usize;
        let x_end = image.width.min((self.width as i64 - x as i64).max(0) as usize);
        let y_end = image.height.min((self.height as i64 - y as i64).max(0) as usize);
        if x_start >= x_end || y_start >= y_end {
            return;
        }

        for iy in y_start..y_end {
            let dst_y = (y + iy as i32) as usize;
            let src_row = &image.pixels[iy * image.width..(iy + 1) * image.width];
            for ix in x_start..x_end {
                let color = src_row[ix];
                // Alpha-tested: fully transparent texels leave the background alone
                if color.a == 0 {
                    continue;
                }
                let idx = (dst_y * self.width + (x + ix as i32) as usize) * 4;
                self.pixels[idx..idx + 4].copy_from_slice(&color.to_bytes());
            }
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: usize, h: usize, color: Color) {
        let x0 = x.max(0) as usize;
        let y0 = y.max(0) as usize;
        let x1 = ((x as i64 + w as i64).max(0) as usize).min(self.width);
        let y1 = ((y as i64 + h as i64).max(0) as usize).min(self.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let bytes = color.to_bytes();
        for row in y0..y1 {
            let start = (row * self.width + x0) * 4;
            let end = (row * self.width + x1) * 4;
            for px in self.pixels[start..end].chunks_exact_mut(4) {
                px.copy_from_slice(&bytes);
            }
        }
    }
}
