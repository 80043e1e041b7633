//! Error types.
//!
//! [`EngineError`] covers programmer-error class faults (initialize-before-use,
//! malformed embedder configuration) that are appropriate to surface to the
//! caller as a `Result::Err`. [`ChunkIoError`] covers disk/format faults that
//! are, per the residency policy, always logged and recovered from — they
//! never reach the frame loop.

use thiserror::Error;

use crate::geometry::ChunkCoord;

/// Programmer-error class faults.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("EngineLoop::update called before EngineLoop::initialize")]
    NotInitialized,
    #[error("world save path is not a valid directory: {0}")]
    InvalidSavePath(String),
}

/// Disk/format faults encountered while loading or saving a single chunk.
///
/// These are always non-fatal to the engine as a whole: a read failure falls
/// back to regeneration, a write failure is retried at the next eviction.
#[derive(Error, Debug)]
pub enum ChunkIoError {
    #[error("io error reading/writing chunk {0:?}: {1}")]
    Io(ChunkCoord, #[source] std::io::Error),
    #[error("chunk file header mismatch: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        expected: ChunkCoord,
        found: ChunkCoord,
    },
    #[error("chunk file truncated or malformed")]
    Malformed,
}
