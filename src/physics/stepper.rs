//! Fixed-timestep, axis-separated collision resolution for the player's
//! kinematic body.

use glam::Vec3;

use crate::geometry::{BlockPos, ChunkCoord};
use crate::physics::collision::{Axis, AABB};
use crate::player::{Player, HEIGHT, WIDTH};
use crate::world::World;

pub const GRAVITY: f32 = -20.0;
pub const JUMP_VELOCITY: f32 = 7.0;
pub const TERMINAL_VELOCITY: f32 = -50.0;
pub const FIXED_TIMESTEP: f32 = 1.0 / 60.0;
pub const MAX_FRAME_TIME: f32 = 0.25;
pub const PHYSICS_CHUNK_RADIUS: i32 = 1;
pub const COLLISION_MARGIN: f32 = 0.001;
pub const GROUND_THRESHOLD: f32 = 0.02;
pub const MIN_XZ_OVERLAP: f32 = 0.1;

const HALF_WIDTH: f32 = WIDTH / 2.0;

/// Drives the player through the block field at a fixed 1/60s step, with an
/// accumulator absorbing the variance of real frame deltas.
pub struct PhysicsStepper {
    accumulator: f32,
    last_physics_chunk: Option<ChunkCoord>,
    nearby_cache: Vec<BlockPos>,
    cache_dirty: bool,
}

impl Default for PhysicsStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsStepper {
    pub fn new() -> Self {
        Self {
            accumulator: 0.0,
            last_physics_chunk: None,
            nearby_cache: Vec::new(),
            cache_dirty: true,
        }
    }

    /// Forces the nearby-block cache to refresh on the next step, even if
    /// the player hasn't crossed a chunk boundary. Call after a block edit
    /// near the player.
    pub fn invalidate_cache(&mut self) {
        self.cache_dirty = true;
    }

    /// Advances `player` by `dt`, clamped to [`MAX_FRAME_TIME`], running as
    /// many fixed steps as the accumulator allows and carrying the
    /// remainder to the next call.
    pub fn advance(&mut self, player: &mut Player, world: &World, dt: f32) {
        self.accumulator += dt.min(MAX_FRAME_TIME);
        while self.accumulator >= FIXED_TIMESTEP {
            self.step(player, world, FIXED_TIMESTEP);
            self.accumulator -= FIXED_TIMESTEP;
        }
    }

    pub fn try_jump(&self, player: &mut Player) {
        if player.on_ground {
            player.velocity.y = JUMP_VELOCITY;
            player.on_ground = false;
        }
    }

    fn refresh_cache_if_needed(&mut self, player: &Player, world: &World) {
        let pos = player.position();
        let current_chunk = ChunkCoord::from_world(pos.x, pos.z);
        if self.cache_dirty || self.last_physics_chunk != Some(current_chunk) {
            self.last_physics_chunk = Some(current_chunk);
            self.cache_dirty = false;
            self.nearby_cache = world.get_nearby_block_positions(pos.x, pos.z, PHYSICS_CHUNK_RADIUS);
        }
    }

    fn step(&mut self, player: &mut Player, world: &World, dt: f32) {
        self.refresh_cache_if_needed(player, world);

        if !player.on_ground {
            player.velocity.y = (player.velocity.y + GRAVITY * dt).max(TERMINAL_VELOCITY);
        }

        let displacement = player.velocity * dt;

        self.step_y(player, displacement.y);
        self.cliff_edge_check(player, displacement.y);
        self.step_x(player, displacement.x);
        self.step_z(player, displacement.z);
    }

    fn cached_block_aabbs(&self) -> impl Iterator<Item = AABB> + '_ {
        self.nearby_cache
            .iter()
            .map(|pos| AABB::unit_block(pos.center()))
    }

    fn step_y(&mut self, player: &mut Player, dy: f32) {
        let mut pos = player.position();
        pos.y += dy;
        player.set_position(pos);

        let mut collided = false;
        for block in self.cached_block_aabbs() {
            if player.aabb().intersects_on(&block, Axis::Y) {
                collided = true;
                if dy > 0.0 {
                    pos.y = block.min().y - HEIGHT;
                    player.on_ground = false;
                } else if dy < 0.0 {
                    pos.y = block.max().y;
                    player.on_ground = true;
                }
                player.velocity.y = 0.0;
                player.set_position(pos);
                break;
            }
        }

        if !collided && dy < 0.0 {
            player.on_ground = false;
        }
    }

    /// If the Y step produced no vertical motion and the player believes
    /// it's grounded, verify a block still actually supports it within
    /// [`GROUND_THRESHOLD`] and [`MIN_XZ_OVERLAP`]; otherwise clear
    /// `on_ground` so the next step starts falling immediately.
    fn cliff_edge_check(&mut self, player: &mut Player, dy: f32) {
        if !(player.on_ground && dy == 0.0) {
            return;
        }

        let aabb = player.aabb();
        let supported = self.nearby_cache.iter().any(|pos| {
            let block = AABB::unit_block(pos.center());
            let vertical_gap = aabb.min().y - block.max().y;
            if !(0.0..=GROUND_THRESHOLD).contains(&vertical_gap) {
                return false;
            }
            let x_overlap = aabb.max().x.min(block.max().x) - aabb.min().x.max(block.min().x);
            let z_overlap = aabb.max().z.min(block.max().z) - aabb.min().z.max(block.min().z);
            x_overlap > MIN_XZ_OVERLAP && z_overlap > MIN_XZ_OVERLAP
        });

        if !supported {
            player.on_ground = false;
        }
    }

    fn step_x(&mut self, player: &mut Player, dx: f32) {
        let mut pos = player.position();
        pos.x += dx;
        player.set_position(pos);

        for block in self.cached_block_aabbs() {
            if player.aabb().intersects_on(&block, Axis::X) {
                pos.x = if dx > 0.0 {
                    block.min().x - HALF_WIDTH - COLLISION_MARGIN
                } else {
                    block.max().x + HALF_WIDTH + COLLISION_MARGIN
                };
                player.velocity.x = 0.0;
                player.set_position(pos);
                break;
            }
        }
    }

    fn step_z(&mut self, player: &mut Player, dz: f32) {
        let mut pos = player.position();
        pos.z += dz;
        player.set_position(pos);

        for block in self.cached_block_aabbs() {
            if player.aabb().intersects_on(&block, Axis::Z) {
                pos.z = if dz > 0.0 {
                    block.min().z - HALF_WIDTH - COLLISION_MARGIN
                } else {
                    block.max().z + HALF_WIDTH + COLLISION_MARGIN
                };
                player.velocity.z = 0.0;
                player.set_position(pos);
                break;
            }
        }
    }
}
