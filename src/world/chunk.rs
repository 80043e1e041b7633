//! A 16x16xinf block store with lifecycle state and a precomputed bounding
//! volume for frustum culling.

use std::collections::HashMap;

use glam::Vec3;
use parking_lot::RwLock;

use crate::block::BlockData;
use crate::geometry::{floor_mod, BlockPos, ChunkCoord, CHUNK_SIZE};
use crate::physics::collision::AABB;

/// Fixed vertical bounding-volume envelope used for frustum culling.
///
/// Chunks are modeled as 16x16 horizontally and unbounded vertically; a
/// production system should make the vertical extent explicit (chunk
/// sections, or a real bounded height) rather than relying on this fixed
/// envelope — see the Open Question in DESIGN.md.
pub const CULLING_Y_MIN: f32 = -10.0;
pub const CULLING_Y_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ChunkState {
    Empty,
    Generated,
    Meshed,
    Active,
}

/// A single vertex of the unified per-chunk mesh, in world-space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Unified mesh geometry for one chunk, plus a rendering handle the
/// embedder's renderer attaches (e.g. a GPU buffer id). Clearing the mesh
/// (dropping or replacing it) is the signal to release any such resources.
#[derive(Debug, Clone, Default)]
pub struct ChunkMesh {
    pub vertices: Vec<Vertex>,
    pub handle: Option<u64>,
}

impl ChunkMesh {
    pub fn new(vertices: Vec<Vertex>) -> Self {
        Self {
            vertices,
            handle: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

impl Drop for ChunkMesh {
    fn drop(&mut self) {
        if let Some(handle) = self.handle {
            log::trace!("releasing chunk mesh resources for handle {handle}");
        }
    }
}

/// A 16x16 horizontal region of block storage with unbounded vertical
/// extent. Object identity is stable for the chunk's residency lifetime:
/// neither [`crate::world::manager::ChunkManager`] nor its workers ever
/// replace the `Chunk` behind an `Arc` once inserted as a placeholder.
#[derive(Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    state: RwLock<ChunkState>,
    blocks: RwLock<HashMap<BlockPos, BlockData>>,
    mesh: RwLock<Option<ChunkMesh>>,
    bounds: AABB,
}

impl Chunk {
    pub fn new(coord: ChunkCoord) -> Self {
        let (ox, oz) = coord.world_origin();
        let center = Vec3::new(
            ox as f32 + CHUNK_SIZE as f32 / 2.0,
            (CULLING_Y_MIN + CULLING_Y_MAX) / 2.0,
            oz as f32 + CHUNK_SIZE as f32 / 2.0,
        );
        let half_extents = Vec3::new(
            CHUNK_SIZE as f32 / 2.0,
            (CULLING_Y_MAX - CULLING_Y_MIN) / 2.0,
            CHUNK_SIZE as f32 / 2.0,
        );

        Self {
            coord,
            state: RwLock::new(ChunkState::Empty),
            blocks: RwLock::new(HashMap::new()),
            mesh: RwLock::new(None),
            bounds: AABB::new(center, half_extents),
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> AABB {
        self.bounds
    }

    pub fn state(&self) -> ChunkState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ChunkState) {
        *self.state.write() = state;
    }

    /// Drops the unified mesh and regresses `Meshed`/`Active` back to
    /// `Generated` so the next rebuild pass picks this chunk up again.
    pub fn mark_mesh_dirty(&self) {
        *self.mesh.write() = None;
        let mut state = self.state.write();
        if *state >= ChunkState::Meshed {
            *state = ChunkState::Generated;
        }
    }

    pub fn install_mesh(&self, mesh: ChunkMesh) {
        *self.mesh.write() = Some(mesh);
        self.set_state(ChunkState::Meshed);
    }

    pub fn has_mesh(&self) -> bool {
        self.mesh.read().is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }

    fn in_bounds_local(lx: i32, lz: i32) -> bool {
        (0..CHUNK_SIZE).contains(&lx) && (0..CHUNK_SIZE).contains(&lz)
    }

    /// Inserts a block at local `(lx, ly, lz)`. `ly` is the world-space y,
    /// already an integer block coordinate (chunks are unbounded
    /// vertically, so there is no local-y folding). Duplicates silently
    /// overwrite.
    pub fn add_block_local(&self, lx: i32, ly: i32, lz: i32, block_type: u32) {
        debug_assert!(Self::in_bounds_local(lx, lz));
        let pos = BlockPos::new(lx, ly, lz);
        self.blocks
            .write()
            .insert(pos, BlockData::new(pos, block_type));
    }

    pub fn remove_block_local(&self, lx: i32, ly: i32, lz: i32) -> bool {
        let pos = BlockPos::new(lx, ly, lz);
        self.blocks.write().remove(&pos).is_some()
    }

    pub fn has_block_at_local(&self, lx: i32, ly: i32, lz: i32) -> bool {
        if !Self::in_bounds_local(lx, lz) {
            return false;
        }
        self.blocks.read().contains_key(&BlockPos::new(lx, ly, lz))
    }

    pub fn get_block_type_at_local(&self, lx: i32, ly: i32, lz: i32) -> Option<u32> {
        if !Self::in_bounds_local(lx, lz) {
            return None;
        }
        self.blocks
            .read()
            .get(&BlockPos::new(lx, ly, lz))
            .map(|b| b.block_type)
    }

    /// Inserts a block addressed by world-space position, folding x/z into
    /// this chunk's local range via arithmetic floor-mod.
    pub fn add_block_world(&self, world_pos: BlockPos, block_type: u32) {
        let lx = floor_mod(world_pos.x, CHUNK_SIZE);
        let lz = floor_mod(world_pos.z, CHUNK_SIZE);
        self.add_block_local(lx, world_pos.y, lz, block_type);
    }

    /// An immediately-usable copy of the stored key set. The underlying map
    /// may be written concurrently by a background worker while this chunk
    /// is mid-generation, so callers must not borrow into the map directly.
    pub fn get_block_pos_snapshot(&self) -> Vec<BlockPos> {
        self.blocks.read().keys().copied().collect()
    }

    pub fn get_blocks_snapshot(&self) -> Vec<BlockData> {
        self.blocks.read().values().copied().collect()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.read().len()
    }

    /// Replaces this chunk's contents wholesale. Used by the serializer's
    /// read-into-existing path to preserve the placeholder's identity while
    /// repopulating its data.
    pub fn replace_blocks(&self, blocks: HashMap<BlockPos, BlockData>) {
        *self.blocks.write() = blocks;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_positions_stay_within_local_xz_bounds() {
        let chunk = Chunk::new(ChunkCoord::new(3, -2));
        chunk.set_state(ChunkState::Generated);
        chunk.add_block_local(0, 5, 0, 1);
        chunk.add_block_local(15, 100, 15, 2);

        for pos in chunk.get_block_pos_snapshot() {
            assert!((0..CHUNK_SIZE).contains(&pos.x));
            assert!((0..CHUNK_SIZE).contains(&pos.z));
        }
    }

    #[test]
    fn add_then_remove_round_trips() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        assert!(!chunk.has_block_at_local(4, 10, 4));
        chunk.add_block_local(4, 10, 4, 7);
        assert!(chunk.has_block_at_local(4, 10, 4));
        assert_eq!(chunk.get_block_type_at_local(4, 10, 4), Some(7));

        assert!(chunk.remove_block_local(4, 10, 4));
        assert!(!chunk.has_block_at_local(4, 10, 4));
        assert!(!chunk.remove_block_local(4, 10, 4));
    }

    #[test]
    fn add_block_world_folds_negative_coordinates_correctly() {
        let chunk = Chunk::new(ChunkCoord::new(-1, -1));
        // World x = -1 belongs to chunk -1 with local x = 15.
        chunk.add_block_world(BlockPos::new(-1, 0, -1), 3);
        assert!(chunk.has_block_at_local(15, 0, 15));
    }

    #[test]
    fn mesh_dirty_regresses_meshed_state_but_not_generated() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.set_state(ChunkState::Generated);
        chunk.mark_mesh_dirty();
        assert_eq!(chunk.state(), ChunkState::Generated);

        chunk.install_mesh(ChunkMesh::default());
        assert_eq!(chunk.state(), ChunkState::Meshed);
        chunk.mark_mesh_dirty();
        assert_eq!(chunk.state(), ChunkState::Generated);
        assert!(!chunk.has_mesh());
    }

    #[test]
    fn duplicate_insert_overwrites_silently() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        chunk.add_block_local(1, 1, 1, 5);
        chunk.add_block_local(1, 1, 1, 9);
        assert_eq!(chunk.block_count(), 1);
        assert_eq!(chunk.get_block_type_at_local(1, 1, 1), Some(9));
    }
}
