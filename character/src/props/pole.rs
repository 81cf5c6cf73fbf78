use collision::{Bounds, ColliderId, ColliderInfo, Vec3};

/// A vertical climbable pole, read from a `Pole`-tagged collider.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pole {
    pub collider: ColliderId,
    pub center: Vec3,
    pub radius: f32,
    pub bounds: Bounds,
}

impl Pole {
    pub fn from_collider(info: &ColliderInfo) -> Self {
        Self {
            collider: info.id,
            center: info.translation,
            radius: (info.bounds.max.x - info.bounds.min.x) * 0.5,
            bounds: info.bounds,
        }
    }

    /// Horizontal unit direction from `point` to the pole axis, and the distance to it.
    pub fn direction_to(&self, point: Vec3) -> (Vec3, f32) {
        let target = Vec3::new(self.center.x, point.y, self.center.z) - point;
        let distance = target.norm();
        if distance == 0.0 {
            return (Vec3::zeros(), 0.0);
        }
        (target / distance, distance)
    }

    /// `point` with its height clamped to the pole, `offset` away from each end.
    pub fn clamp_to_height(&self, point: Vec3, offset: f32) -> Vec3 {
        let min = self.bounds.min.y + offset;
        let max = self.bounds.max.y - offset;
        Vec3::new(point.x, point.y.min(max).max(min), point.z)
    }
}
