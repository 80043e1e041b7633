//! Orchestrates tick-rate chunk residency updates, pending-chunk drain,
//! physics, raycasting, and mesh rebuilds, handing the result off to an
//! embedder-supplied [`Renderer`] each frame. Windowing, input capture, and
//! GPU submission are deliberately kept behind the [`InputSource`] and
//! [`Renderer`] trait objects.

use std::sync::Arc;

use glam::Vec3;

use crate::error::EngineError;
use crate::player::Player;
use crate::raycast::{RayHit, Raycaster};
use crate::physics::stepper::PhysicsStepper;
use crate::world::chunk::Chunk;
use crate::world::World;

/// Chunk residency updates run at a fixed 20Hz, decoupled from frame rate.
pub const CHUNK_UPDATE_INTERVAL: f32 = 0.05;

/// Semantic input for one frame, already translated from raw keyboard/mouse
/// state by the embedder: a camera-relative horizontal movement intent, a
/// normalized look direction for the crosshair raycast, and the jump edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputState {
    pub move_intent: Vec3,
    pub look_direction: Vec3,
    pub jump_pressed: bool,
}

pub trait InputSource {
    fn poll(&self) -> InputState;
}

/// The set the embedder's renderer needs each frame: the chunks to draw
/// (frustum culling against [`Chunk::bounds`] is the renderer's job, since
/// it owns the camera's projection) and the currently selected block.
pub trait Renderer {
    fn submit_frame(&mut self, chunks: &[Arc<Chunk>], selected: Option<RayHit>);
}

pub struct EngineLoop {
    world: Arc<World>,
    player: Player,
    stepper: PhysicsStepper,
    raycaster: Raycaster,
    move_speed: f32,
    tick_accumulator: f32,
    selected_block: Option<RayHit>,
    initialized: bool,
}

impl EngineLoop {
    pub fn new(world: Arc<World>, player: Player, move_speed: f32) -> Self {
        Self {
            world,
            player,
            stepper: PhysicsStepper::new(),
            raycaster: Raycaster::default(),
            move_speed,
            tick_accumulator: 0.0,
            selected_block: None,
            initialized: false,
        }
    }

    /// Marks the loop ready to run. [`Self::update`] and [`Self::render`]
    /// return [`EngineError::NotInitialized`] before this is called.
    pub fn initialize(&mut self) {
        self.initialized = true;
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn selected_block(&self) -> Option<RayHit> {
        self.selected_block
    }

    /// One frame's worth of simulation: tick-gated chunk residency, pending
    /// drain, fixed-step physics, and a crosshair raycast.
    pub fn update(&mut self, dt: f32, input: &dyn InputSource) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }

        self.tick_accumulator += dt;
        if self.tick_accumulator >= CHUNK_UPDATE_INTERVAL {
            let pos = self.player.position();
            self.world.update_residency(pos.x, pos.z);
            self.tick_accumulator -= CHUNK_UPDATE_INTERVAL;
        }

        self.world.process_pending();

        let state = input.poll();
        self.player.velocity.x = state.move_intent.x * self.move_speed;
        self.player.velocity.z = state.move_intent.z * self.move_speed;
        if state.jump_pressed {
            self.stepper.try_jump(&mut self.player);
        }

        self.stepper.advance(&mut self.player, &self.world, dt);

        self.selected_block = self
            .raycaster
            .cast(&self.world, self.player.eye_position(), state.look_direction);

        Ok(())
    }

    /// Rebuilds any dirty chunk meshes, then hands the loaded chunk list
    /// plus the current selection to `renderer`.
    pub fn render(&mut self, renderer: &mut dyn Renderer) -> Result<(), EngineError> {
        if !self.initialized {
            return Err(EngineError::NotInitialized);
        }

        if self.world.take_chunks_changed() {
            self.world.rebuild_dirty_meshes();
        }

        let chunks: Vec<Arc<Chunk>> = self
            .world
            .loaded_chunk_coords()
            .into_iter()
            .filter_map(|coord| self.world.chunk(coord))
            .collect();

        renderer.submit_frame(&chunks, self.selected_block);
        Ok(())
    }
}
