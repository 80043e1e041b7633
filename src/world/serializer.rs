//! On-disk chunk format.
//!
//! ```text
//! int32  chunkX
//! int32  chunkZ
//! int32  blockCount
//! repeat blockCount times:
//!    int32 localX        // 0..15
//!    int32 blockY        // unbounded signed
//!    int32 localZ        // 0..15
//!    int32 blockType
//! ```
//!
//! All integers are little-endian. Paths are
//! `<world_path>/chunks/chunk_<cx>_<cz>.dat`; directories are created on
//! demand.

use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::error::ChunkIoError;
use crate::geometry::ChunkCoord;
use crate::world::chunk::Chunk;

pub fn chunk_file_path(world_path: &Path, coord: ChunkCoord) -> PathBuf {
    world_path
        .join("chunks")
        .join(format!("chunk_{}_{}.dat", coord.cx, coord.cz))
}

fn read_i32(r: &mut impl Read) -> Result<i32, ChunkIoError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)
        .map_err(|_| ChunkIoError::Malformed)?;
    Ok(i32::from_le_bytes(buf))
}

fn write_i32(w: &mut impl Write, v: i32) -> io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

/// Writes `chunk` to its file under `world_path`, creating the `chunks/`
/// directory if needed. Failures are the caller's to log and retry; they
/// are never fatal to the chunk's in-memory state.
pub fn save(chunk: &Chunk, world_path: &Path) -> Result<(), ChunkIoError> {
    let path = chunk_file_path(world_path, chunk.coord());
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
    }

    let file = File::create(&path).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
    let mut w = BufWriter::new(file);

    let blocks = chunk.get_blocks_snapshot();
    write_i32(&mut w, chunk.coord().cx).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
    write_i32(&mut w, chunk.coord().cz).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
    write_i32(&mut w, blocks.len() as i32).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;

    for block in &blocks {
        write_i32(&mut w, block.pos.x).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
        write_i32(&mut w, block.pos.y).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
        write_i32(&mut w, block.pos.z).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
        write_i32(&mut w, block.block_type as i32).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
    }

    w.flush().map_err(|e| ChunkIoError::Io(chunk.coord(), e))
}

struct RawChunkData {
    coord: ChunkCoord,
    blocks: Vec<(i32, i32, i32, u32)>,
}

fn read_raw(mut r: impl Read) -> Result<RawChunkData, ChunkIoError> {
    let cx = read_i32(&mut r)?;
    let cz = read_i32(&mut r)?;
    let count = read_i32(&mut r)?;
    if count < 0 {
        return Err(ChunkIoError::Malformed);
    }

    let mut blocks = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let lx = read_i32(&mut r)?;
        let by = read_i32(&mut r)?;
        let lz = read_i32(&mut r)?;
        let bt = read_i32(&mut r)?;
        blocks.push((lx, by, lz, bt as u32));
    }

    Ok(RawChunkData {
        coord: ChunkCoord::new(cx, cz),
        blocks,
    })
}

/// Reads the file for `coord` into a brand-new [`Chunk`], for synchronous
/// initial generation paths that don't need placeholder continuity.
pub fn load_new(world_path: &Path, coord: ChunkCoord) -> Result<Chunk, ChunkIoError> {
    let path = chunk_file_path(world_path, coord);
    let file = File::open(&path).map_err(|e| ChunkIoError::Io(coord, e))?;
    let raw = read_raw(BufReader::new(file))?;

    if raw.coord != coord {
        return Err(ChunkIoError::HeaderMismatch {
            expected: coord,
            found: raw.coord,
        });
    }

    let chunk = Chunk::new(coord);
    for (lx, by, lz, bt) in raw.blocks {
        chunk.add_block_local(lx, by, lz, bt);
    }
    Ok(chunk)
}

/// Reads the file for `chunk`'s coordinate directly into the already-live
/// `chunk` object, preserving its identity for threads holding a reference
/// to the placeholder. A header mismatch is fatal for this read: the
/// caller must mark the chunk `Empty` and retry at the next boundary
/// crossing rather than trust partially-read data.
pub fn read_into_existing(chunk: &Chunk, world_path: &Path) -> Result<(), ChunkIoError> {
    let path = chunk_file_path(world_path, chunk.coord());
    let file = File::open(&path).map_err(|e| ChunkIoError::Io(chunk.coord(), e))?;
    let raw = read_raw(BufReader::new(file))?;

    if raw.coord != chunk.coord() {
        return Err(ChunkIoError::HeaderMismatch {
            expected: chunk.coord(),
            found: raw.coord,
        });
    }

    let mut map = std::collections::HashMap::with_capacity(raw.blocks.len());
    for (lx, by, lz, bt) in raw.blocks {
        let pos = crate::geometry::BlockPos::new(lx, by, lz);
        map.insert(pos, crate::block::BlockData::new(pos, bt));
    }
    chunk.replace_blocks(map);
    Ok(())
}

pub fn file_exists(world_path: &Path, coord: ChunkCoord) -> bool {
    chunk_file_path(world_path, coord).is_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::chunk::ChunkState;

    #[test]
    fn round_trip_preserves_block_set() {
        let dir = tempfile::tempdir().unwrap();
        let coord = ChunkCoord::new(4, -7);
        let chunk = Chunk::new(coord);
        chunk.add_block_local(0, 0, 0, 1);
        chunk.add_block_local(5, -30, 10, 42);
        chunk.add_block_local(15, 1000, 15, 7);

        save(&chunk, dir.path()).unwrap();

        let loaded = load_new(dir.path(), coord).unwrap();
        let mut original: Vec<_> = chunk.get_blocks_snapshot();
        let mut round_tripped: Vec<_> = loaded.get_blocks_snapshot();
        original.sort_by_key(|b| (b.pos.x, b.pos.y, b.pos.z));
        round_tripped.sort_by_key(|b| (b.pos.x, b.pos.y, b.pos.z));
        assert_eq!(original.len(), round_tripped.len());
        for (a, b) in original.iter().zip(round_tripped.iter()) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.block_type, b.block_type);
        }
    }

    #[test]
    fn read_into_existing_preserves_object_identity() {
        let dir = tempfile::tempdir().unwrap();
        let coord = ChunkCoord::new(0, 0);
        let on_disk = Chunk::new(coord);
        on_disk.add_block_local(2, 2, 2, 9);
        save(&on_disk, dir.path()).unwrap();

        let placeholder = Chunk::new(coord);
        placeholder.set_state(ChunkState::Empty);
        read_into_existing(&placeholder, dir.path()).unwrap();

        assert!(placeholder.has_block_at_local(2, 2, 2));
    }

    #[test]
    fn header_mismatch_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let on_disk = Chunk::new(ChunkCoord::new(1, 1));
        save(&on_disk, dir.path()).unwrap();

        // Rename file to masquerade as chunk (2, 2)'s file.
        let wrong_path = chunk_file_path(dir.path(), ChunkCoord::new(2, 2));
        fs::rename(chunk_file_path(dir.path(), ChunkCoord::new(1, 1)), &wrong_path).unwrap();

        let placeholder = Chunk::new(ChunkCoord::new(2, 2));
        let result = read_into_existing(&placeholder, dir.path());
        assert!(matches!(result, Err(ChunkIoError::HeaderMismatch { .. })));
    }
}
