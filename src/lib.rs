//! Core simulation and rendering-preparation engine for a chunked voxel world.
//!
//! This crate owns chunk residency, greedy meshing, fixed-timestep collision,
//! and raycasting. Terrain generation, residency policy, windowing, input,
//! and GPU submission are supplied by the embedder through the traits in
//! [`terrain`] and [`engine`].

pub mod block;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod mesh;
pub mod physics;
pub mod player;
pub mod raycast;
pub mod terrain;
pub mod world;

/// Engine prelude.
pub mod prelude {
    pub use crate::block::{atlas_tile, BlockData};
    pub use crate::config::EngineConfig;
    pub use crate::engine::{EngineLoop, InputSource, Renderer};
    pub use crate::error::{ChunkIoError, EngineError};
    pub use crate::geometry::{floor_mod, BlockPos, ChunkCoord};
    pub use crate::physics::collision::AABB;
    pub use crate::physics::stepper::PhysicsStepper;
    pub use crate::player::Player;
    pub use crate::raycast::{RayHit, Raycaster};
    pub use crate::terrain::{ChunkGenerator, ChunkLoadPolicy};
    pub use crate::world::chunk::{Chunk, ChunkState};
    pub use crate::world::World;

    pub use glam::{Mat4, Vec2, Vec3, Vec4};
    pub use parking_lot::{Mutex, RwLock};
}

/// Current engine version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
