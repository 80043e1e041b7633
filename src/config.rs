//! Embedder-facing configuration.
//!
//! Parsing a config file (TOML, JSON, ...) into this struct is the
//! embedder's job — out of scope here. This module only defines the
//! recognized options and their semantic defaults.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub texture_atlas_path: Option<String>,
    pub atlas_grid_size: u32,
    pub player_start: (f32, f32, f32),
    pub player_move_speed: f32,
    pub field_of_view: f32,
    pub initial_pitch: f32,
    pub mouse_sensitivity: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub terminal_velocity: f32,
    pub initial_chunk_radius: u32,
    pub chunk_preload_radius: u32,
    pub world_save_path: String,
    pub default_ground_block_type: u32,
    pub world_seed: u64,
    pub auto_create_ground: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            texture_atlas_path: None,
            atlas_grid_size: 16,
            player_start: (0.0, -0.5, 0.0),
            player_move_speed: 5.0,
            field_of_view: 67.0,
            initial_pitch: -20.0,
            mouse_sensitivity: 0.1,
            gravity: -20.0,
            jump_velocity: 7.0,
            terminal_velocity: -50.0,
            initial_chunk_radius: 16,
            chunk_preload_radius: 1,
            world_save_path: "saves/world1".to_string(),
            default_ground_block_type: 0,
            world_seed: 0,
            auto_create_ground: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.atlas_grid_size, 16);
        assert_eq!(cfg.player_start, (0.0, -0.5, 0.0));
        assert_eq!(cfg.gravity, -20.0);
        assert_eq!(cfg.jump_velocity, 7.0);
        assert_eq!(cfg.terminal_velocity, -50.0);
        assert!(cfg.auto_create_ground);
    }
}
