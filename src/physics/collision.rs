//! Axis-aligned bounding box with per-axis overlap gating.

use glam::Vec3;

/// Minimum overlap (on the two non-tested axes) required for
/// [`AABB::intersects_on`] to report a same-axis collision. Distinguishes
/// wall contact from floor landing when the player is perfectly aligned with
/// a face.
pub const MIN_OVERLAP: f32 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A box defined by center and half-extents. `min`/`max` are derived and
/// kept in sync on every mutation so hot-path reads never recompute them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    center: Vec3,
    half_extents: Vec3,
    min: Vec3,
    max: Vec3,
}

impl AABB {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        let mut aabb = Self {
            center,
            half_extents,
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        };
        aabb.recompute();
        aabb
    }

    /// An AABB for a unit block centered at `pos` (a block occupies
    /// `[pos - 0.5, pos + 0.5]` on every axis).
    pub fn unit_block(center: Vec3) -> Self {
        Self::new(center, Vec3::splat(0.5))
    }

    fn recompute(&mut self) {
        self.min = self.center - self.half_extents;
        self.max = self.center + self.half_extents;
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn set_center(&mut self, p: Vec3) {
        self.center = p;
        self.recompute();
    }

    pub fn set_size(&mut self, hx: f32, hy: f32, hz: f32) {
        self.half_extents = Vec3::new(hx, hy, hz);
        self.recompute();
    }

    pub fn offset(&mut self, dx: f32, dy: f32, dz: f32) {
        self.center += Vec3::new(dx, dy, dz);
        self.recompute();
    }

    /// Open-interval overlap on all three axes.
    pub fn intersects(&self, other: &AABB) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }

    /// Overlap on `axis` plus strict `> MIN_OVERLAP` overlap on the other
    /// two axes. Required to distinguish a wall graze from a true collision
    /// along the tested axis.
    pub fn intersects_on(&self, other: &AABB, axis: Axis) -> bool {
        let overlap = |a_min: f32, a_max: f32, b_min: f32, b_max: f32| -> f32 {
            a_max.min(b_max) - a_min.max(b_min)
        };

        let ox = overlap(self.min.x, self.max.x, other.min.x, other.max.x);
        let oy = overlap(self.min.y, self.max.y, other.min.y, other.max.y);
        let oz = overlap(self.min.z, self.max.z, other.min.z, other.max.z);

        match axis {
            Axis::X => ox > 0.0 && oy > MIN_OVERLAP && oz > MIN_OVERLAP,
            Axis::Y => oy > 0.0 && ox > MIN_OVERLAP && oz > MIN_OVERLAP,
            Axis::Z => oz > 0.0 && ox > MIN_OVERLAP && oy > MIN_OVERLAP,
        }
    }
}
