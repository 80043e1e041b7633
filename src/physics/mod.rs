//! Fixed-timestep collision resolution: [`collision`] holds the AABB
//! primitive, [`stepper`] drives the player through the block field.

pub mod collision;
pub mod stepper;

pub use collision::{Axis, AABB};
pub use stepper::PhysicsStepper;
