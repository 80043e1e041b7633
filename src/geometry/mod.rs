//! Integer positions, chunk keys, and world/chunk/local conversions.

mod position;

pub use position::{floor_mod, BlockPos, ChunkCoord};

/// Horizontal size of a chunk, in blocks. Vertical extent is unbounded.
pub const CHUNK_SIZE: i32 = 16;
