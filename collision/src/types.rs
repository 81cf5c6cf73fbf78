/*!
Core collision types and math aliases shared by the collision submodules.

This module contains no algorithms. It defines the data exchanged between:
- the query world (parry-backed collider registry)
- the `ShapeQueries` capability seen by actors
- the sweep-and-slide capsule mover

Conventions
- Units are meters, world up is +Y.
- Capsules are always Y-aligned. A capsule is described either by its two segment end points
  (`bottom`, `top`) plus radius, or by a center plus `CapsuleSpec`.
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Point = na::Point3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Iso = na::Isometry3<f32>;

/// World up axis.
#[inline]
pub fn up() -> Vec3 {
    Vec3::y()
}

/// Build an isometry from a translation and rotation.
#[inline]
pub fn iso(translation: Vec3, rotation: Quat) -> Iso {
    Iso::from_parts(na::Translation3::from(translation), rotation)
}

/// Stable identifier of a collider inside a query world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColliderId(pub u32);

/// Axis-aligned world bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Inclusive containment test.
    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    #[inline]
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Grow the bounds by `margin` on every side.
    #[inline]
    pub fn loosened(&self, margin: f32) -> Bounds {
        let m = Vec3::repeat(margin);
        Bounds::new(self.min - m, self.max + m)
    }
}

/// Y-aligned capsule dimensions for sweeps and overlaps.
///
/// half_height is the half-length of the cylinder section (aligned with +Y),
/// so the total capsule height is 2*half_height + 2*radius.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleSpec {
    pub radius: f32,
    pub half_height: f32,
}

impl CapsuleSpec {
    /// Build from a total height (cap to cap) and radius.
    #[inline]
    pub fn from_height(height: f32, radius: f32) -> Self {
        Self {
            radius,
            half_height: (height * 0.5 - radius).max(0.0),
        }
    }

    /// Segment end points `(bottom, top)` for a capsule centered at `center`.
    #[inline]
    pub fn segment(&self, center: Vec3) -> (Vec3, Vec3) {
        let h = up() * self.half_height;
        (center - h, center + h)
    }

    /// World bounds of the capsule centered at `center`.
    #[inline]
    pub fn bounds(&self, center: Vec3) -> Bounds {
        let e = Vec3::new(self.radius, self.half_height + self.radius, self.radius);
        Bounds::new(center - e, center + e)
    }
}

/// Result of a ray or shape cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    /// World-space contact point on the hit collider.
    pub point: Vec3,
    /// World-space surface normal of the hit collider at `point`.
    pub normal: Vec3,
    /// Distance travelled along the cast direction before contact.
    pub distance: f32,
    pub collider: ColliderId,
}

/// Minimum translation separating two overlapping shapes.
///
/// Applying `direction * distance` to the first shape resolves the overlap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    pub direction: Vec3,
    pub distance: f32,
}

/// Closest features of two shapes closer than a prediction distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// World-space normal pointing out of the other shape, toward the querying shape.
    pub normal: Vec3,
    /// Signed gap between the shapes; negative while they overlap.
    pub distance: f32,
}

/// A single contact result returned by a sweep.
#[derive(Clone, Copy, Debug)]
pub struct MoveHit {
    /// World-space contact normal opposing the motion.
    pub normal: Vec3,
    /// Distance travelled before contact.
    pub distance: f32,
    pub collider: ColliderId,
}

/// Result of a kinematic movement step (after sweep-and-slide).
#[derive(Clone, Copy, Debug)]
pub struct MoveResult {
    /// Final capsule center position after applying the step and sliding.
    pub end_pos: Vec3,
    /// Information about the last hit encountered during the step (if any).
    pub last_hit: Option<MoveHit>,
    /// Remaining translation that could not be consumed (usually zero on success).
    pub remaining: Vec3,
}
