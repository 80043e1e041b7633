use glam::Vec3;

use super::CHUNK_SIZE;

/// Arithmetic floor-mod: for positive `m`, always returns a value in `[0, m)`,
/// unlike the sign-naive `%` operator which can return negative results for
/// negative `n`.
#[inline]
pub fn floor_mod(n: i32, m: i32) -> i32 {
    ((n % m) + m) % m
}

/// Immutable integer triple addressing a single unit block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Derives a block position from a world-space point by floor.
    pub fn from_world(p: Vec3) -> Self {
        Self {
            x: p.x.floor() as i32,
            y: p.y.floor() as i32,
            z: p.z.floor() as i32,
        }
    }

    /// The center of this block in world space.
    pub fn center(self) -> Vec3 {
        Vec3::new(self.x as f32 + 0.5, self.y as f32 + 0.5, self.z as f32 + 0.5)
    }

    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    /// Converts to the chunk this position lives in, and its local (x, z)
    /// coordinates within that chunk. `y` is left untouched (chunks are
    /// unbounded vertically).
    pub fn chunk_and_local(self) -> (ChunkCoord, i32, i32) {
        let coord = ChunkCoord::from_world(self.x as f32, self.z as f32);
        let lx = floor_mod(self.x, CHUNK_SIZE);
        let lz = floor_mod(self.z, CHUNK_SIZE);
        (coord, lx, lz)
    }
}

/// Integer (cx, cz) index of a 16x16 chunk column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    pub fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Converts world-space `x`/`z` floats to their owning chunk coordinate.
    pub fn from_world(x: f32, z: f32) -> Self {
        Self {
            cx: (x / CHUNK_SIZE as f32).floor() as i32,
            cz: (z / CHUNK_SIZE as f32).floor() as i32,
        }
    }

    pub fn north(self) -> Self {
        Self::new(self.cx, self.cz - 1)
    }

    pub fn south(self) -> Self {
        Self::new(self.cx, self.cz + 1)
    }

    pub fn east(self) -> Self {
        Self::new(self.cx + 1, self.cz)
    }

    pub fn west(self) -> Self {
        Self::new(self.cx - 1, self.cz)
    }

    /// The four cardinal neighbors, in a stable order.
    pub fn cardinal_neighbors(self) -> [Self; 4] {
        [self.north(), self.south(), self.east(), self.west()]
    }

    /// World-space origin (minimum corner) of this chunk.
    pub fn world_origin(self) -> (i32, i32) {
        (self.cx * CHUNK_SIZE, self.cz * CHUNK_SIZE)
    }

    /// Chebyshev distance in chunks, used for residency search radii.
    pub fn chebyshev_distance(self, other: Self) -> i32 {
        (self.cx - other.cx).abs().max((self.cz - other.cz).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_mod_matches_definition_for_wide_range() {
        for n in -1000..=1000 {
            let expected = {
                let r = n % 16;
                if r < 0 {
                    r + 16
                } else {
                    r
                }
            };
            assert_eq!(floor_mod(n, 16), expected, "n = {n}");
            assert!((0..16).contains(&floor_mod(n, 16)));
        }
    }

    #[test]
    fn negative_world_coords_convert_to_nonnegative_local() {
        let pos = BlockPos::new(-1, 5, -17);
        let (coord, lx, lz) = pos.chunk_and_local();
        assert_eq!(coord, ChunkCoord::new(-1, -2));
        assert!((0..16).contains(&lx));
        assert!((0..16).contains(&lz));
        assert_eq!(lx, 15);
        assert_eq!(lz, 15);
    }

    #[test]
    fn chunk_coord_from_world_floors_toward_negative_infinity() {
        assert_eq!(ChunkCoord::from_world(-0.5, -0.5), ChunkCoord::new(-1, -1));
        assert_eq!(ChunkCoord::from_world(15.9, 0.0), ChunkCoord::new(0, 0));
        assert_eq!(ChunkCoord::from_world(16.0, 0.0), ChunkCoord::new(1, 0));
    }

    #[test]
    fn cardinal_neighbors_are_the_four_adjacent_columns() {
        let c = ChunkCoord::new(2, -3);
        let neighbors = c.cardinal_neighbors();
        assert!(neighbors.contains(&ChunkCoord::new(2, -4)));
        assert!(neighbors.contains(&ChunkCoord::new(2, -2)));
        assert!(neighbors.contains(&ChunkCoord::new(3, -3)));
        assert!(neighbors.contains(&ChunkCoord::new(1, -3)));
    }
}
