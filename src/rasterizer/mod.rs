//! Software framebuffer and texture primitives
//!
//! Everything the renderer draws goes through these types:
//! - `Texture`: CPU-side RGBA image with nearest-neighbour resampling
//! - `Framebuffer`: RGBA8 target uploaded to the GPU once per frame
//! - `FrameSink`: the blit interface the compositor draws through

mod math;
mod types;
mod render;

pub use math::*;
pub use types::*;
pub use render::*;
