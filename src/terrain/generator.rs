//! Embedder-supplied terrain generation.

use noise::{NoiseFn, Perlin};

use crate::world::chunk::{Chunk, ChunkState};

/// Called from background workers to populate a freshly-inserted chunk.
/// Implementations must be thread-safe and pure with respect to the chunk
/// they write (same coordinate, same seed -> same blocks).
pub trait ChunkGenerator: Send + Sync {
    fn generate(&self, chunk: &Chunk, default_block_type: u32);
}

/// A trivial height-field generator built on Perlin noise. Real terrain
/// generation is the embedder's concern; this exists so the engine is
/// exercisable and testable without one.
pub struct NoiseTerrainGenerator {
    noise: Perlin,
    base_height: f64,
    amplitude: f64,
}

impl NoiseTerrainGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            noise: Perlin::new(seed as u32),
            base_height: 4.0,
            amplitude: 3.0,
        }
    }

    fn height_at(&self, world_x: i32, world_z: i32) -> i32 {
        let xf = world_x as f64 * 0.05;
        let zf = world_z as f64 * 0.05;
        let n = self.noise.get([xf, zf]);
        (self.base_height + n * self.amplitude).round() as i32
    }
}

impl ChunkGenerator for NoiseTerrainGenerator {
    fn generate(&self, chunk: &Chunk, default_block_type: u32) {
        let (ox, oz) = chunk.coord().world_origin();
        for lx in 0..crate::geometry::CHUNK_SIZE {
            for lz in 0..crate::geometry::CHUNK_SIZE {
                let height = self.height_at(ox + lx, oz + lz);
                for y in 0..=height {
                    chunk.add_block_local(lx, y, lz, default_block_type);
                }
            }
        }
        chunk.set_state(ChunkState::Generated);
    }
}

/// Always generates a single flat ground layer at `y = 0`. Useful for
/// deterministic tests and simple embedders.
pub struct FlatGroundGenerator {
    pub ground_block_type: u32,
}

impl ChunkGenerator for FlatGroundGenerator {
    fn generate(&self, chunk: &Chunk, default_block_type: u32) {
        let _ = default_block_type;
        for lx in 0..crate::geometry::CHUNK_SIZE {
            for lz in 0..crate::geometry::CHUNK_SIZE {
                chunk.add_block_local(lx, 0, lz, self.ground_block_type);
            }
        }
        chunk.set_state(ChunkState::Generated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::ChunkCoord;

    #[test]
    fn flat_ground_generator_fills_the_whole_column_grid() {
        let chunk = Chunk::new(ChunkCoord::new(0, 0));
        let gen = FlatGroundGenerator {
            ground_block_type: 1,
        };
        gen.generate(&chunk, 0);
        assert_eq!(chunk.block_count(), 16 * 16);
        assert_eq!(chunk.state(), ChunkState::Generated);
    }

    #[test]
    fn noise_generator_is_deterministic_for_a_fixed_seed() {
        let gen = NoiseTerrainGenerator::new(42);
        let a = Chunk::new(ChunkCoord::new(1, 1));
        let b = Chunk::new(ChunkCoord::new(1, 1));
        gen.generate(&a, 0);
        gen.generate(&b, 0);

        let mut sa = a.get_block_pos_snapshot();
        let mut sb = b.get_block_pos_snapshot();
        sa.sort_by_key(|p| (p.x, p.y, p.z));
        sb.sort_by_key(|p| (p.x, p.y, p.z));
        assert_eq!(sa, sb);
    }
}
