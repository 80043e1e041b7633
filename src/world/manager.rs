//! Asynchronous chunk generation, residency policy, LRU eviction, and the
//! pending-completion queue that publishes worker results to the main
//! thread.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use parking_lot::{Mutex, RwLock};

use crate::error::ChunkIoError;
use crate::geometry::ChunkCoord;
use crate::terrain::{ChunkGenerator, ChunkLoadPolicy};
use crate::world::chunk::{Chunk, ChunkState};
use crate::world::serializer;

/// Chunks drained from `pending` per call to [`ChunkManager::drain_pending`].
/// Bounds how much residency work can land on the main thread in a single
/// frame even if many chunks finish generating at once.
pub const PENDING_DRAIN_BUDGET: usize = 4;

/// Minimum search radius (in chunks) scanned by a residency update,
/// regardless of `max_loaded_chunks`.
const MIN_SEARCH_RADIUS: i32 = 10;

/// Extra chunks evicted beyond the strict `max_loaded` overage, to reduce
/// eviction churn at the boundary.
const EVICTION_OVERSHOOT: usize = 10;

const WORKER_COUNT: usize = 2;
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

pub struct ChunkManager {
    loaded: Arc<RwLock<HashMap<ChunkCoord, Arc<Chunk>>>>,
    access_time: Arc<Mutex<HashMap<ChunkCoord, Instant>>>,
    loading: Arc<Mutex<HashSet<ChunkCoord>>>,
    pending_tx: Sender<Arc<Chunk>>,
    pending_rx: Receiver<Arc<Chunk>>,
    last_player_chunk: Mutex<Option<ChunkCoord>>,
    chunks_changed: AtomicBool,
    pool: rayon::ThreadPool,
    generator: Arc<dyn ChunkGenerator>,
    policy: Arc<dyn ChunkLoadPolicy>,
    world_path: PathBuf,
    default_block_type: u32,
}

impl ChunkManager {
    pub fn new(
        world_path: PathBuf,
        generator: Arc<dyn ChunkGenerator>,
        policy: Arc<dyn ChunkLoadPolicy>,
        default_block_type: u32,
    ) -> Self {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WORKER_COUNT)
            .thread_name(|i| format!("bloksel-chunk-worker-{i}"))
            .build()
            .expect("failed to create chunk worker pool");
        let (pending_tx, pending_rx) = crossbeam_channel::unbounded();

        Self {
            loaded: Arc::new(RwLock::new(HashMap::new())),
            access_time: Arc::new(Mutex::new(HashMap::new())),
            loading: Arc::new(Mutex::new(HashSet::new())),
            pending_tx,
            pending_rx,
            last_player_chunk: Mutex::new(None),
            chunks_changed: AtomicBool::new(false),
            pool,
            generator,
            policy,
            world_path,
            default_block_type,
        }
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<Arc<Chunk>> {
        self.loaded.read().get(&coord).cloned()
    }

    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.loaded.read().contains_key(&coord)
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.read().len()
    }

    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        self.loaded.read().keys().copied().collect()
    }

    /// Consumes the dirty flag set whenever a chunk completes loading, is
    /// evicted, or has a block mutated, so the mesher knows when a rebuild
    /// pass might be needed.
    pub fn take_chunks_changed(&self) -> bool {
        self.chunks_changed.swap(false, Ordering::AcqRel)
    }

    /// Flags that a loaded chunk's mesh was marked dirty outside of
    /// residency bookkeeping (e.g. a block edit via `World::set_block`), so
    /// the next render pass's `take_chunks_changed` check picks it up.
    pub fn flag_changed(&self) {
        self.chunks_changed.store(true, Ordering::Release);
    }

    /// Call on every physics/tick step. Only performs residency work when
    /// the player has crossed into a new chunk since the last call.
    pub fn update_residency(&self, player_x: f32, player_z: f32) {
        let player_chunk = ChunkCoord::from_world(player_x, player_z);
        {
            let mut last = self.last_player_chunk.lock();
            if *last == Some(player_chunk) {
                return;
            }
            *last = Some(player_chunk);
        }

        let max_loaded = self.policy.max_loaded_chunks();
        let radius = MIN_SEARCH_RADIUS.max((max_loaded / 10) as i32);
        let mut required = HashSet::new();

        for dx in -radius..=radius {
            for dz in -radius..=radius {
                let d = ChunkCoord::new(player_chunk.cx + dx, player_chunk.cz + dz);
                if self
                    .policy
                    .should_load_to_memory(d.cx, d.cz, player_chunk.cx, player_chunk.cz)
                {
                    required.insert(d);
                    if !self.is_loaded(d) {
                        self.start_load_or_generate(d);
                    }
                } else if self
                    .policy
                    .should_pregenerate(d.cx, d.cz, player_chunk.cx, player_chunk.cz)
                    && !serializer::file_exists(&self.world_path, d)
                {
                    self.start_pregenerate_only(d);
                }
            }
        }

        if self.loaded.read().len() > max_loaded {
            self.evict_lru(&required, max_loaded);
        }
    }

    fn start_load_or_generate(&self, coord: ChunkCoord) {
        {
            let mut loading = self.loading.lock();
            if loading.contains(&coord) {
                return;
            }
            loading.insert(coord);
        }

        let placeholder = {
            let mut loaded = self.loaded.write();
            loaded
                .entry(coord)
                .or_insert_with(|| Arc::new(Chunk::new(coord)))
                .clone()
        };

        let generator = self.generator.clone();
        let world_path = self.world_path.clone();
        let default_block_type = self.default_block_type;
        let tx = self.pending_tx.clone();
        let loading = self.loading.clone();

        self.pool.spawn(move || {
            if serializer::file_exists(&world_path, coord) {
                match serializer::read_into_existing(&placeholder, &world_path) {
                    Ok(()) => placeholder.set_state(ChunkState::Generated),
                    Err(ChunkIoError::HeaderMismatch { expected, found }) => {
                        log::error!(
                            "chunk {coord:?} header mismatch on read (expected {expected:?}, found {found:?}); dropping"
                        );
                        placeholder.set_state(ChunkState::Empty);
                        loading.lock().remove(&coord);
                        return;
                    }
                    Err(e) => {
                        log::warn!("chunk {coord:?} read failed ({e}); regenerating");
                        generator.generate(&placeholder, default_block_type);
                        if let Err(e) = serializer::save(&placeholder, &world_path) {
                            log::warn!("chunk {coord:?} save after regeneration failed: {e}");
                        }
                    }
                }
            } else {
                generator.generate(&placeholder, default_block_type);
            }

            let _ = tx.send(placeholder);
        });
    }

    fn start_pregenerate_only(&self, coord: ChunkCoord) {
        {
            let mut loading = self.loading.lock();
            if loading.contains(&coord) {
                return;
            }
            loading.insert(coord);
        }

        let generator = self.generator.clone();
        let world_path = self.world_path.clone();
        let default_block_type = self.default_block_type;
        let loading = self.loading.clone();

        self.pool.spawn(move || {
            let scratch = Chunk::new(coord);
            generator.generate(&scratch, default_block_type);
            if let Err(e) = serializer::save(&scratch, &world_path) {
                log::warn!("pregenerate save failed for {coord:?}: {e}");
            }
            loading.lock().remove(&coord);
        });
    }

    /// Drains at most `max` completed chunks from `pending`. For each:
    /// clears its `loading` entry, bumps its LRU timestamp, flags
    /// `chunks_changed`, and invalidates the mesh of its four cardinal
    /// neighbors (their boundary faces may now be culled or uncovered).
    pub fn drain_pending(&self, max: usize) -> usize {
        let mut drained = 0;
        while drained < max {
            let chunk = match self.pending_rx.try_recv() {
                Ok(chunk) => chunk,
                Err(_) => break,
            };

            let coord = chunk.coord();
            self.loading.lock().remove(&coord);
            self.access_time.lock().insert(coord, Instant::now());
            self.chunks_changed.store(true, Ordering::Release);

            for neighbor in coord.cardinal_neighbors() {
                if let Some(n) = self.loaded.read().get(&neighbor) {
                    n.mark_mesh_dirty();
                }
            }

            drained += 1;
        }
        drained
    }

    fn evict_lru(&self, required: &HashSet<ChunkCoord>, max_loaded: usize) {
        let loaded_len = self.loaded.read().len();
        if loaded_len <= max_loaded {
            return;
        }
        let target_removals = loaded_len - max_loaded + EVICTION_OVERSHOOT;

        let mut candidates: Vec<(ChunkCoord, Instant)> = self
            .access_time
            .lock()
            .iter()
            .filter(|(c, _)| !required.contains(c))
            .map(|(c, t)| (*c, *t))
            .collect();
        candidates.sort_by_key(|(_, t)| *t);

        for (coord, _) in candidates.into_iter().take(target_removals) {
            if let Some(chunk) = self.loaded.read().get(&coord).cloned() {
                if let Err(e) = serializer::save(&chunk, &self.world_path) {
                    log::warn!("eviction save failed for {coord:?}: {e}");
                }
            }
            self.loaded.write().remove(&coord);
            self.access_time.lock().remove(&coord);
            self.chunks_changed.store(true, Ordering::Release);
        }
    }

    /// Waits up to 5 seconds for outstanding worker jobs to drain, then
    /// detaches. `rayon::ThreadPool` has no forced-kill primitive, so a
    /// worker that never returns cannot be terminated short of process
    /// exit — this is a documented limitation, not a bug.
    pub fn shutdown(self) {
        let (done_tx, done_rx) = crossbeam_channel::bounded::<()>(1);
        let pool = self.pool;
        std::thread::spawn(move || {
            drop(pool);
            let _ = done_tx.send(());
        });

        match done_rx.recv_timeout(SHUTDOWN_GRACE) {
            Ok(()) => log::info!("chunk worker pool shut down cleanly"),
            Err(_) => log::warn!("chunk worker pool did not drain within {SHUTDOWN_GRACE:?}; detaching"),
        }
    }
}
