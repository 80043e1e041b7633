//! The `World` façade: the engine's single entry point for block queries,
//! mutation, and chunk residency. Wraps [`manager::ChunkManager`] and adds
//! the block-level semantics the mesher, physics stepper, and raycaster all
//! depend on.

pub mod chunk;
pub mod manager;
pub mod serializer;

use std::path::PathBuf;
use std::sync::Arc;

use crate::block::DEFAULT_ATLAS_GRID;
use crate::geometry::{BlockPos, ChunkCoord, CHUNK_SIZE};
use crate::mesh;
use crate::terrain::{ChunkGenerator, ChunkLoadPolicy};
use crate::world::chunk::{Chunk, ChunkMesh};
use crate::world::manager::{ChunkManager, PENDING_DRAIN_BUDGET};

pub use chunk::ChunkState;

pub struct World {
    manager: ChunkManager,
    atlas_grid: u32,
}

impl World {
    pub fn new(
        world_path: impl Into<PathBuf>,
        generator: Arc<dyn ChunkGenerator>,
        policy: Arc<dyn ChunkLoadPolicy>,
        default_block_type: u32,
    ) -> Self {
        Self {
            manager: ChunkManager::new(world_path.into(), generator, policy, default_block_type),
            atlas_grid: DEFAULT_ATLAS_GRID,
        }
    }

    pub fn with_atlas_grid(mut self, atlas_grid: u32) -> Self {
        self.atlas_grid = atlas_grid;
        self
    }

    /// Call once per tick with the player's current world position. No-ops
    /// unless the player has crossed into a new chunk since the last call.
    pub fn update_residency(&self, player_x: f32, player_z: f32) {
        self.manager.update_residency(player_x, player_z);
    }

    /// Drains completed chunk-generation jobs onto the main thread, bounded
    /// by [`PENDING_DRAIN_BUDGET`] per call so a burst of completions can't
    /// stall a single frame.
    pub fn process_pending(&self) -> usize {
        self.manager.drain_pending(PENDING_DRAIN_BUDGET)
    }

    pub fn take_chunks_changed(&self) -> bool {
        self.manager.take_chunks_changed()
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.manager.get(coord)
    }

    pub fn is_chunk_loaded(&self, coord: ChunkCoord) -> bool {
        self.manager.is_loaded(coord)
    }

    pub fn loaded_chunk_coords(&self) -> Vec<ChunkCoord> {
        self.manager.loaded_coords()
    }

    /// Whether a block is solid at `pos`. Chunks that are not currently
    /// resident are treated as solid: a collision sweep or raycast that
    /// reaches unloaded terrain should stop rather than tunnel through it.
    pub fn has_block(&self, pos: BlockPos) -> bool {
        let (coord, lx, lz) = pos.chunk_and_local();
        match self.manager.get(coord) {
            Some(chunk) => chunk.has_block_at_local(lx, pos.y, lz),
            None => true,
        }
    }

    /// The block type at `pos`, or `None` if the block is absent or its
    /// chunk is not resident. Unlike [`Self::has_block`], this has no
    /// "unknown = solid" fallback — callers that need a type need the real
    /// chunk loaded.
    pub fn get_block(&self, pos: BlockPos) -> Option<u32> {
        let (coord, lx, lz) = pos.chunk_and_local();
        self.manager.get(coord)?.get_block_type_at_local(lx, pos.y, lz)
    }

    /// Sets a block, invalidating this chunk's mesh and, if `pos` sits on a
    /// chunk boundary, the mesh of the adjoining neighbor too (its greedy
    /// mesh may have culled a face against what used to be empty space).
    /// A no-op if the owning chunk is not resident.
    pub fn set_block(&self, pos: BlockPos, block_type: u32) -> bool {
        let (coord, lx, lz) = pos.chunk_and_local();
        let Some(chunk) = self.manager.get(coord) else {
            log::warn!("set_block at {pos:?} ignored: chunk {coord:?} not resident");
            return false;
        };
        chunk.add_block_local(lx, pos.y, lz, block_type);
        chunk.mark_mesh_dirty();
        self.invalidate_boundary_neighbor(coord, lx, lz);
        self.manager.flag_changed();
        true
    }

    /// Removes a block, with the same mesh-invalidation behavior as
    /// [`Self::set_block`]. Returns whether a block was actually present.
    pub fn remove_block(&self, pos: BlockPos) -> bool {
        let (coord, lx, lz) = pos.chunk_and_local();
        let Some(chunk) = self.manager.get(coord) else {
            log::warn!("remove_block at {pos:?} ignored: chunk {coord:?} not resident");
            return false;
        };
        let removed = chunk.remove_block_local(lx, pos.y, lz);
        if removed {
            chunk.mark_mesh_dirty();
            self.invalidate_boundary_neighbor(coord, lx, lz);
            self.manager.flag_changed();
        }
        removed
    }

    fn invalidate_boundary_neighbor(&self, coord: ChunkCoord, lx: i32, lz: i32) {
        let mut touched = [None; 2];
        if lx == 0 {
            touched[0] = Some(coord.west());
        } else if lx == CHUNK_SIZE - 1 {
            touched[0] = Some(coord.east());
        }
        if lz == 0 {
            touched[1] = Some(coord.north());
        } else if lz == CHUNK_SIZE - 1 {
            touched[1] = Some(coord.south());
        }
        for neighbor in touched.into_iter().flatten() {
            if let Some(chunk) = self.manager.get(neighbor) {
                chunk.mark_mesh_dirty();
            }
        }
    }

    /// Every stored block position in every resident chunk within
    /// `chunk_radius` (Chebyshev distance) of the chunk containing
    /// `(x, z)`, as a snapshot used by the physics stepper. This is a
    /// horizontal query: the full vertical column of each nearby chunk is
    /// returned regardless of how far above or below it the queried point
    /// sits, so a falling or jumping player's cache still contains the
    /// ground beneath them.
    pub fn get_nearby_block_positions(&self, x: f32, z: f32, chunk_radius: i32) -> Vec<BlockPos> {
        let center = ChunkCoord::from_world(x, z);
        let mut found = Vec::new();
        for dx in -chunk_radius..=chunk_radius {
            for dz in -chunk_radius..=chunk_radius {
                let coord = ChunkCoord::new(center.cx + dx, center.cz + dz);
                let Some(chunk) = self.manager.get(coord) else {
                    continue;
                };
                let (ox, oz) = coord.world_origin();
                for local in chunk.get_block_pos_snapshot() {
                    found.push(BlockPos::new(ox + local.x, local.y, oz + local.z));
                }
            }
        }
        found
    }

    /// Builds a fresh unified mesh for every loaded, `Generated`, unmeshed
    /// chunk: computes each block's 6-way visibility mask from world-space
    /// neighbor queries, greedily merges visible faces, splits the result
    /// back to atlas-safe unit quads, and installs it.
    pub fn rebuild_dirty_meshes(&self) {
        for coord in self.manager.loaded_coords() {
            let Some(chunk) = self.manager.get(coord) else {
                continue;
            };
            if chunk.state() != ChunkState::Generated {
                continue;
            }

            let local_positions = chunk.get_block_pos_snapshot();
            if local_positions.is_empty() {
                chunk.install_mesh(ChunkMesh::default());
                continue;
            }

            let (ox, oz) = coord.world_origin();
            let mut blocks = Vec::with_capacity(local_positions.len());
            let mut visibility = std::collections::HashMap::with_capacity(local_positions.len());

            for local in local_positions {
                let world_pos = BlockPos::new(ox + local.x, local.y, oz + local.z);
                let Some(block_type) = chunk.get_block_type_at_local(local.x, local.y, local.z) else {
                    continue;
                };

                // Canonical order: Front=+Z, Back=-Z, Left=-X, Right=+X, Top=+Y, Bottom=-Y.
                let mask = [
                    !self.has_block(world_pos.offset(0, 0, 1)),
                    !self.has_block(world_pos.offset(0, 0, -1)),
                    !self.has_block(world_pos.offset(-1, 0, 0)),
                    !self.has_block(world_pos.offset(1, 0, 0)),
                    !self.has_block(world_pos.offset(0, 1, 0)),
                    !self.has_block(world_pos.offset(0, -1, 0)),
                ];

                if mask.iter().any(|&visible| visible) {
                    blocks.push((world_pos, block_type));
                }
                visibility.insert(world_pos, mask);
            }

            let quads = mesh::mesh_chunk(&blocks, &visibility);
            let vertices = mesh::atlas_safe_quads(&quads, self.atlas_grid);
            chunk.install_mesh(ChunkMesh::new(vertices));
        }
    }

    pub fn shutdown(self) {
        self.manager.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::{FlatGroundGenerator, RadiusLoadPolicy};
    use std::time::{Duration, Instant};

    fn test_world(dir: &std::path::Path) -> World {
        World::new(
            dir,
            Arc::new(FlatGroundGenerator { ground_block_type: 1 }),
            Arc::new(RadiusLoadPolicy::new(2, 16, 64)),
            0,
        )
    }

    fn settle(world: &World) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if world.process_pending() == 0 && world.is_chunk_loaded(ChunkCoord::new(0, 0)) {
                if let Some(chunk) = world.chunk(ChunkCoord::new(0, 0)) {
                    if chunk.state() >= ChunkState::Generated {
                        break;
                    }
                }
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn unloaded_chunks_report_blocks_as_solid() {
        let dir = tempfile::tempdir().unwrap();
        let world = test_world(dir.path());
        assert!(world.has_block(BlockPos::new(10_000, 0, 10_000)));
        assert_eq!(world.get_block(BlockPos::new(10_000, 0, 10_000)), None);
    }

    #[test]
    fn loaded_flat_ground_has_blocks_only_at_y_zero() {
        let dir = tempfile::tempdir().unwrap();
        let world = test_world(dir.path());
        world.update_residency(0.0, 0.0);
        settle(&world);

        assert!(world.has_block(BlockPos::new(3, 0, 3)));
        assert!(!world.has_block(BlockPos::new(3, 1, 3)));
    }

    #[test]
    fn set_block_on_a_chunk_boundary_invalidates_the_neighbor_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let world = test_world(dir.path());
        world.update_residency(0.0, 0.0);
        settle(&world);
        world.update_residency(16.0 * 2.0, 0.0);
        settle(&world);

        let neighbor = world.chunk(ChunkCoord::new(1, 0)).expect("neighbor resident");
        neighbor.install_mesh(crate::world::chunk::ChunkMesh::default());
        assert!(neighbor.has_mesh());

        // x = 15 is the east edge of chunk (0, 0), bordering chunk (1, 0).
        let changed = world.set_block(BlockPos::new(15, 5, 0), 2);
        assert!(changed);
        assert!(!neighbor.has_mesh());
    }

    #[test]
    fn set_block_on_unresident_chunk_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let world = test_world(dir.path());
        assert!(!world.set_block(BlockPos::new(10_000, 0, 10_000), 1));
    }

    #[test]
    fn set_block_flags_chunks_changed_without_a_residency_event() {
        let dir = tempfile::tempdir().unwrap();
        let world = test_world(dir.path());
        world.update_residency(0.0, 0.0);
        settle(&world);
        assert!(world.take_chunks_changed());

        world.set_block(BlockPos::new(3, 5, 3), 2);
        assert!(world.take_chunks_changed());
    }

    #[test]
    fn nearby_block_positions_return_the_full_vertical_column_regardless_of_query_height() {
        let dir = tempfile::tempdir().unwrap();
        let world = test_world(dir.path());
        world.update_residency(0.0, 0.0);
        settle(&world);

        // Queried far above the ground at y=0; the column query must still
        // surface the ground blocks, since it is keyed on (x, z) only.
        let nearby = world.get_nearby_block_positions(3.0, 3.0, 0);
        assert!(nearby.contains(&BlockPos::new(3, 0, 3)));
    }

    #[test]
    fn rebuild_produces_one_top_face_per_flat_ground_block() {
        let dir = tempfile::tempdir().unwrap();
        let world = test_world(dir.path());
        world.update_residency(0.0, 0.0);
        settle(&world);

        world.rebuild_dirty_meshes();

        let chunk = world.chunk(ChunkCoord::new(0, 0)).unwrap();
        assert_eq!(chunk.state(), ChunkState::Meshed);
        assert!(chunk.has_mesh());
    }
}
