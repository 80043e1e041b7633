//! Greedy meshing (rectangle merge across same-type visible faces) and
//! atlas-safe emission (splitting merged rectangles back to unit quads so
//! every quad's UV stays inside one atlas tile).

pub mod builder;
pub mod greedy;

pub use builder::atlas_safe_quads;
pub use greedy::{mesh_chunk, Direction, FaceMask, MergedQuad};
