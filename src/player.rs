//! The player's kinematic body: position, velocity, ground state, and an
//! AABB that is always kept in lock-step with position.

use glam::Vec3;

use crate::physics::collision::AABB;

pub const WIDTH: f32 = 0.6;
pub const HEIGHT: f32 = 1.8;
pub const EYE_HEIGHT: f32 = 1.62;

/// World-space foot position, velocity, ground flag, and derived AABB.
#[derive(Debug, Clone)]
pub struct Player {
    position: Vec3,
    pub velocity: Vec3,
    pub on_ground: bool,
    aabb: AABB,
}

impl Player {
    pub fn new(position: Vec3) -> Self {
        let mut player = Self {
            position,
            velocity: Vec3::ZERO,
            on_ground: false,
            aabb: AABB::new(Vec3::ZERO, Vec3::new(WIDTH / 2.0, HEIGHT / 2.0, WIDTH / 2.0)),
        };
        player.sync_aabb();
        player
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Writes a new position and immediately recomputes the AABB — position
    /// and AABB must never be allowed to drift apart.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.sync_aabb();
    }

    pub fn aabb(&self) -> &AABB {
        &self.aabb
    }

    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, EYE_HEIGHT, 0.0)
    }

    fn sync_aabb(&mut self) {
        self.aabb
            .set_center(self.position + Vec3::new(0.0, HEIGHT / 2.0, 0.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_center_tracks_position_after_every_write() {
        let mut player = Player::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(player.aabb().center(), Vec3::new(1.0, 2.0 + HEIGHT / 2.0, 3.0));

        player.set_position(Vec3::new(-4.0, 10.0, 0.5));
        assert_eq!(
            player.aabb().center(),
            Vec3::new(-4.0, 10.0 + HEIGHT / 2.0, 0.5)
        );
    }

    #[test]
    fn eye_position_is_feet_plus_eye_height() {
        let player = Player::new(Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(player.eye_position(), Vec3::new(0.0, EYE_HEIGHT, 0.0));
    }
}
