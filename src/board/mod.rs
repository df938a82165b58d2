//! Grid model.
//!
//! Decodes incremental map patches into absolute terrain and army arrays,
//! and provides the coordinate and adjacency math the rest of the engine
//! builds on.

pub mod grid;
pub mod patch;
pub mod state;
pub mod terrain;

pub use grid::{Direction, Grid, GridError, ALL_DIRECTIONS};
pub use patch::{apply_patch, encode_patch};
pub use state::Board;
pub use terrain::{Terrain, TILE_EMPTY, TILE_FOG, TILE_FOG_OBSTACLE, TILE_MOUNTAIN};
