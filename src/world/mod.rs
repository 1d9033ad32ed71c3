//! World module - tile grid levels and the viewer
//!
//! - Sparse tile grid keyed by integer coordinates
//! - RON level files carrying the grid rows and texture table
//! - Player pose and movement

mod grid;
mod level;
mod player;

pub use grid::*;
pub use level::*;
pub use player::*;
