//! Frame composition: sky and floor, then textured wall strips
//!
//! Each ray result becomes a `SCALE`-wide strip sampled from its wall
//! texture. Strips are sorted far-to-near and blitted in that order, so
//! nearer walls simply paint over farther ones (painter's algorithm, no
//! depth buffer).

mod atlas;

pub use atlas::*;

use tracing::trace;

use crate::config::Projection;
use crate::rasterizer::{Color, FrameSink, Texture};
use crate::raycast::RayHit;

/// One wall column ready to blit
#[derive(Debug, Clone)]
pub struct WallStrip {
    pub depth: f32,
    pub image: Texture,
    /// Top-left screen position
    pub x: i32,
    pub y: i32,
}

/// Sample and scale the texture column for a single ray result
pub fn wall_strip(column: usize, hit: &RayHit, texture: &Texture, projection: &Projection) -> WallStrip {
    let scale = projection.scale;
    let texture_size = projection.texture_size as f32;
    let height = projection.height as f32;
    let src_x = (hit.offset * (texture_size - scale as f32)).floor();
    let x = (column * scale) as i32;

    if hit.projected_height < height {
        let image = texture.sample_region(
            src_x,
            0.0,
            scale as f32,
            texture_size,
            scale,
            (hit.projected_height as usize).max(1),
        );
        let y = projection.half_height as i32 - (hit.projected_height / 2.0).floor() as i32;
        WallStrip { depth: hit.depth, image, x, y }
    } else {
        // Taller than the screen: crop the middle of the texture to what is visible
        let visible = texture_size * height / hit.projected_height;
        let image = texture.sample_region(
            src_x,
            projection.half_texture_size() - (visible / 2.0).floor(),
            scale as f32,
            visible,
            scale,
            projection.height,
        );
        WallStrip { depth: hit.depth, image, x, y: 0 }
    }
}

/// Owns the per-frame strip list and the sky scroll position
pub struct Compositor {
    projection: Projection,
    /// Sized to (width, half_height)
    sky: Texture,
    floor_color: Color,
    sky_scroll_factor: f32,
    sky_offset: f32,
    strips: Vec<WallStrip>,
}

impl Compositor {
    pub fn new(projection: Projection, sky: Texture, floor_color: Color, sky_scroll_factor: f32) -> Self {
        Self {
            projection,
            sky,
            floor_color,
            sky_scroll_factor,
            sky_offset: 0.0,
            strips: Vec::with_capacity(projection.num_rays),
        }
    }

    #[cfg(test)]
    pub fn sky_offset(&self) -> f32 {
        self.sky_offset
    }

    /// Strips from the last `prepare`, farthest first
    #[cfg(test)]
    pub fn strips(&self) -> &[WallStrip] {
        &self.strips
    }

    /// Build one strip per ray result and sort them far-to-near
    pub fn prepare(&mut self, hits: &[RayHit], atlas: &TextureAtlas) {
        self.strips.clear();
        for (column, hit) in hits.iter().enumerate() {
            match atlas.get(hit.wall) {
                Some(texture) => self.strips.push(wall_strip(column, hit, texture, &self.projection)),
                None => trace!(column, wall = hit.wall, "no texture for wall type, column skipped"),
            }
        }
        // Stable, so equal depths keep column order
        self.strips.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    }

    /// Advance the sky scroll by `rel` turn units and paint sky and floor
    pub fn draw_background<S: FrameSink + ?Sized>(&mut self, sink: &mut S, rel: f32) {
        let width = self.projection.width as f32;
        if rel.is_finite() {
            self.sky_offset = (self.sky_offset + self.sky_scroll_factor * rel).rem_euclid(width);
        }

        // Two copies side by side cover the wrap-around
        let offset = self.sky_offset as i32;
        sink.blit(&self.sky, -offset, 0);
        sink.blit(&self.sky, -offset + self.projection.width as i32, 0);

        // Floor fills the sink from the horizon down
        let half_height = self.projection.half_height;
        let floor_height = sink.height().saturating_sub(half_height);
        let floor_width = sink.width();
        sink.fill_rect(0, half_height as i32, floor_width, floor_height, self.floor_color);
    }

    /// Blit the prepared strips, farthest first
    pub fn draw_walls<S: FrameSink + ?Sized>(&self, sink: &mut S) {
        for strip in &self.strips {
            sink.blit(&strip.image, strip.x, strip.y);
        }
    }

    /// Full frame: strips, background, walls
    pub fn render<S: FrameSink + ?Sized>(&mut self, hits: &[RayHit], atlas: &TextureAtlas, sink: &mut S, rel: f32) {
        self.prepare(hits, atlas);
        self.draw_background(sink, rel);
        self.draw_walls(sink);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::raycast::Edge;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Blit { x: i32, y: i32, w: usize, h: usize },
        Fill { y: i32, h: usize },
    }

    #[derive(Default)]
    struct RecordingSink {
        ops: Vec<Op>,
    }

    impl FrameSink for RecordingSink {
        fn width(&self) -> usize {
            64
        }

        fn height(&self) -> usize {
            48
        }

        fn blit(&mut self, image: &Texture, x: i32, y: i32) {
            self.ops.push(Op::Blit { x, y, w: image.width, h: image.height });
        }

        fn fill_rect(&mut self, _x: i32, y: i32, _w: usize, h: usize, _color: Color) {
            self.ops.push(Op::Fill { y, h });
        }
    }

    fn test_projection() -> Projection {
        Settings {
            width: 64,
            height: 48,
            num_rays: 32,
            texture_size: 16,
            ..Settings::default()
        }
        .projection()
        .unwrap()
    }

    /// Red channel encodes x, green encodes y
    fn coordinate_texture(size: usize) -> Texture {
        let mut pixels = Vec::with_capacity(size * size);
        for y in 0..size {
            for x in 0..size {
                pixels.push(Color::new(x as u8, y as u8, 0));
            }
        }
        Texture { width: size, height: size, pixels, name: "coords".to_string() }
    }

    fn hit(depth: f32, projected_height: f32, offset: f32) -> RayHit {
        RayHit {
            depth,
            projected_height,
            wall: 1,
            offset,
            radial_depth: depth,
            angle: 0.0,
            edge: Edge::Vertical,
            hit: true,
        }
    }

    fn atlas() -> TextureAtlas {
        let mut atlas = TextureAtlas::new(16);
        atlas.insert(1, coordinate_texture(16));
        atlas
    }

    #[test]
    fn test_short_wall_is_centered() {
        let projection = test_projection();
        let strip = wall_strip(3, &hit(2.0, 20.0, 0.5), &coordinate_texture(16), &projection);

        assert_eq!(strip.x, 6);
        assert_eq!(strip.y, 24 - 10);
        assert_eq!((strip.image.width, strip.image.height), (2, 20));
        // offset 0.5 * (16 - 2) = column 7
        assert_eq!(strip.image.get_pixel(0, 0).r, 7);
        assert_eq!(strip.image.get_pixel(0, 0).g, 0);
        assert_eq!(strip.image.get_pixel(0, 19).g, 15);
    }

    #[test]
    fn test_tall_wall_is_cropped_to_screen() {
        let projection = test_projection();
        let strip = wall_strip(0, &hit(0.2, 96.0, 0.0), &coordinate_texture(16), &projection);

        assert_eq!(strip.y, 0);
        assert_eq!((strip.image.width, strip.image.height), (2, 48));
        // Visible slice is 16 * 48 / 96 = 8 texels centered on row 8
        assert_eq!(strip.image.get_pixel(0, 0).g, 4);
        assert_eq!(strip.image.get_pixel(0, 47).g, 11);
    }

    #[test]
    fn test_tall_wall_crop_starts_on_whole_texel() {
        let projection = test_projection();
        // Visible slice is 16 * 48 / 100 = 7.68 texels, half rounds down to 3
        let strip = wall_strip(0, &hit(0.2, 100.0, 0.0), &coordinate_texture(16), &projection);

        assert_eq!(strip.image.get_pixel(0, 0).g, 5);
        assert_eq!(strip.image.get_pixel(0, 47).g, 12);
    }

    #[test]
    fn test_tiny_wall_still_has_a_pixel() {
        let projection = test_projection();
        let strip = wall_strip(0, &hit(500.0, 0.3, 0.0), &coordinate_texture(16), &projection);
        assert_eq!(strip.image.height, 1);
    }

    #[test]
    fn test_strips_drawn_far_to_near_after_background() {
        let projection = test_projection();
        let sky = Texture::solid(64, 24, Color::WHITE);
        let mut compositor = Compositor::new(projection, sky, Color::BLACK, 4.5);
        let hits = [hit(3.0, 10.0, 0.1), hit(1.0, 30.0, 0.2), hit(2.0, 15.0, 0.3), hit(2.0, 15.0, 0.4)];

        let mut sink = RecordingSink::default();
        compositor.render(&hits, &atlas(), &mut sink, 0.0);

        // Sky twice, floor, then four strips
        assert_eq!(sink.ops.len(), 7);
        assert_eq!(sink.ops[0], Op::Blit { x: 0, y: 0, w: 64, h: 24 });
        assert_eq!(sink.ops[1], Op::Blit { x: 64, y: 0, w: 64, h: 24 });
        assert_eq!(sink.ops[2], Op::Fill { y: 24, h: 24 });

        let columns: Vec<i32> = sink.ops[3..]
            .iter()
            .map(|op| match op {
                Op::Blit { x, .. } => *x / 2,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        // depth 3 first, the two depth-2 strips keep column order, depth 1 last
        assert_eq!(columns, vec![0, 2, 3, 1]);

        let depths: Vec<f32> = compositor.strips().iter().map(|s| s.depth).collect();
        assert!(depths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_unknown_wall_type_is_skipped() {
        let projection = test_projection();
        let mut compositor = Compositor::new(projection, Texture::new(64, 24), Color::BLACK, 4.5);
        let mut stray = hit(1.0, 10.0, 0.0);
        stray.wall = 9;
        compositor.prepare(&[hit(1.0, 10.0, 0.0), stray], &atlas());
        assert_eq!(compositor.strips().len(), 1);
    }

    #[test]
    fn test_floor_fills_to_sink_bottom() {
        let projection = test_projection();
        let floor = Color::new(10, 20, 30);
        let mut compositor = Compositor::new(projection, Texture::solid(64, 24, Color::WHITE), floor, 4.5);

        // Taller than the projection: the floor still reaches the last row
        let mut fb = crate::rasterizer::Framebuffer::new(64, 60);
        fb.clear(Color::BLACK);
        compositor.draw_background(&mut fb, 0.0);

        assert_eq!(fb.get_pixel(0, 23), Color::WHITE);
        assert_eq!(fb.get_pixel(0, 24), floor);
        assert_eq!(fb.get_pixel(63, 59), floor);
    }

    #[test]
    fn test_sky_offset_wraps() {
        let projection = test_projection();
        let mut compositor = Compositor::new(projection, Texture::new(64, 24), Color::BLACK, 4.5);
        let mut sink = RecordingSink::default();

        compositor.draw_background(&mut sink, 20.0);
        assert!((compositor.sky_offset() - 26.0).abs() < 1e-4);

        compositor.draw_background(&mut sink, -10.0);
        assert!((compositor.sky_offset() - (26.0 - 45.0 + 64.0)).abs() < 1e-4);
        assert!(compositor.sky_offset() >= 0.0 && compositor.sky_offset() < 64.0);

        let len = sink.ops.len();
        assert_eq!(sink.ops[len - 3], Op::Blit { x: -45, y: 0, w: 64, h: 24 });
        assert_eq!(sink.ops[len - 2], Op::Blit { x: 19, y: 0, w: 64, h: 24 });
    }
}
