//! Capsule dimensions of an actor.
//!
//! The capsule hangs off the actor's origin (its feet) through `center`. Resizing keeps the
//! bottom of the capsule in place, so crouching shrinks the capsule towards the floor.

use collision::{CapsuleSpec, Vec3};

use crate::settings::{DEFAULT_SLOPE_LIMIT, DEFAULT_STEP_OFFSET, SKIN_WIDTH};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Capsule {
    /// Total height, cap to cap.
    pub height: f32,
    pub radius: f32,
    /// Offset of the capsule center from the actor origin.
    pub center: Vec3,
    pub skin: f32,
    /// Highest surface the actor stands on without treating it as a wall.
    pub step_offset: f32,
    /// Steepest walkable surface, in degrees.
    pub slope_limit: f32,
    original_height: f32,
}

impl Capsule {
    /// Capsule standing on the origin.
    pub fn new(height: f32, radius: f32) -> Self {
        Self {
            height,
            radius,
            center: Vec3::new(0.0, height * 0.5, 0.0),
            skin: SKIN_WIDTH,
            step_offset: DEFAULT_STEP_OFFSET,
            slope_limit: DEFAULT_SLOPE_LIMIT,
            original_height: height,
        }
    }

    #[inline]
    pub fn with_step_offset(mut self, step_offset: f32) -> Self {
        self.step_offset = step_offset;
        self
    }

    #[inline]
    pub fn with_slope_limit(mut self, slope_limit: f32) -> Self {
        self.slope_limit = slope_limit;
        self
    }

    /// Height the capsule was created with.
    #[inline]
    pub fn original_height(&self) -> f32 {
        self.original_height
    }

    #[inline]
    pub fn spec(&self) -> CapsuleSpec {
        CapsuleSpec::from_height(self.height, self.radius)
    }

    /// Change the height keeping the bottom of the capsule fixed.
    pub fn resize(&mut self, height: f32) {
        let delta = height - self.height;
        self.height = height;
        self.center.y += delta * 0.5;
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err("capsule radius must be positive");
        }
        if !self.height.is_finite() || self.height < self.radius * 2.0 {
            return Err("capsule height must be at least twice the radius");
        }
        if !self.center.iter().all(|c| c.is_finite()) {
            return Err("capsule center must be finite");
        }
        if self.skin < 0.0 || self.step_offset < 0.0 {
            return Err("capsule skin and step offset must not be negative");
        }
        if self.step_offset > self.height {
            return Err("capsule step offset must not exceed its height");
        }
        if !(0.0..=180.0).contains(&self.slope_limit) {
            return Err("capsule slope limit must be within [0, 180] degrees");
        }
        Ok(())
    }
}
