//! Vector helpers shared by the motion primitives.
//!
//! Velocity is split into a lateral (XZ) and a vertical (Y) part. The split is exact:
//! `lateral(v) + vertical(v) == v` for every `v`, since each component is copied, never
//! recomputed.

use collision::{Quat, Vec3};

pub use collision::up;

#[inline]
pub fn lateral(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

#[inline]
pub fn vertical(v: Vec3) -> Vec3 {
    Vec3::new(0.0, v.y, 0.0)
}

/// `v` projected on the XZ plane and normalized, or zero when it has no planar part.
#[inline]
pub fn planar_direction(v: Vec3) -> Vec3 {
    lateral(v).try_normalize(1.0e-6).unwrap_or_else(Vec3::zeros)
}

/// Move `current` towards `target` by at most `max_delta`, never overshooting.
pub fn move_towards(current: Vec3, target: Vec3, max_delta: f32) -> Vec3 {
    let delta = target - current;
    let dist = delta.norm();
    if dist <= max_delta || dist == 0.0 {
        target
    } else {
        current + delta / dist * max_delta
    }
}

/// Scalar version of [`move_towards`].
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// `v` with its length capped at `max`.
#[inline]
pub fn clamp_magnitude(v: Vec3, max: f32) -> Vec3 {
    let len_sq = v.norm_squared();
    if len_sq > max * max && len_sq > 0.0 {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Angle between two vectors in degrees; zero when either is degenerate.
#[inline]
pub fn angle_deg(a: Vec3, b: Vec3) -> f32 {
    if a.norm_squared() == 0.0 || b.norm_squared() == 0.0 {
        return 0.0;
    }
    a.angle(&b).to_degrees()
}

/// Angle of a surface normal from world up, in degrees.
#[inline]
pub fn angle_from_up(normal: Vec3) -> f32 {
    angle_deg(normal, up())
}

/// Rotation whose forward (+Z) axis points along `dir`, keeping +Y as up.
///
/// `None` for zero directions and directions parallel to up.
pub fn look_rotation(dir: Vec3) -> Option<Quat> {
    let dir = dir.try_normalize(1.0e-6)?;
    if dir.cross(&up()).norm_squared() < 1.0e-10 {
        return None;
    }
    Some(Quat::face_towards(&dir, &up()))
}

/// Rotate `from` towards `to` by at most `max_degrees`.
pub fn rotate_towards(from: Quat, to: Quat, max_degrees: f32) -> Quat {
    let angle = from.angle_to(&to).to_degrees();
    if angle <= max_degrees || angle == 0.0 {
        return to;
    }
    from.try_slerp(&to, max_degrees / angle, 1.0e-6).unwrap_or(to)
}

#[inline]
pub fn forward(rotation: Quat) -> Vec3 {
    rotation * Vec3::z()
}

#[inline]
pub fn right(rotation: Quat) -> Vec3 {
    rotation * Vec3::x()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lateral_and_vertical_recombine_exactly() {
        for v in [
            Vec3::new(1.25, -3.5, 0.1),
            Vec3::new(-0.0, 1.0e-7, 7.0e12),
            Vec3::new(f32::MIN_POSITIVE, -2.0, -9.875),
        ] {
            assert_eq!(lateral(v) + vertical(v), v);
        }
    }

    #[test]
    fn move_towards_never_overshoots() {
        let v = move_towards(Vec3::new(3.0, 0.0, 4.0), Vec3::zeros(), 2.0);
        assert!((v.norm() - 3.0).abs() < 1.0e-5);
        assert_eq!(move_towards(Vec3::new(0.1, 0.0, 0.0), Vec3::zeros(), 2.0), Vec3::zeros());
        assert_eq!(approach(1.0, 0.0, 5.0), 0.0);
        assert_eq!(approach(-1.0, 0.0, 0.25), -0.75);
    }

    #[test]
    fn clamp_magnitude_only_shrinks() {
        let v = clamp_magnitude(Vec3::new(0.0, 0.0, 10.0), 6.0);
        assert!((v.z - 6.0).abs() < 1.0e-5);
        let w = Vec3::new(1.0, 0.0, 1.0);
        assert_eq!(clamp_magnitude(w, 6.0), w);
    }

    #[test]
    fn look_rotation_faces_direction() {
        let dir = Vec3::new(1.0, 0.0, 0.0);
        let rot = look_rotation(dir).expect("horizontal direction");
        assert!((forward(rot) - dir).norm() < 1.0e-5);
        assert!(look_rotation(Vec3::zeros()).is_none());
        assert!(look_rotation(up()).is_none());
    }

    #[test]
    fn rotate_towards_is_bounded() {
        let from = Quat::identity();
        let to = look_rotation(Vec3::x()).unwrap();
        let step = rotate_towards(from, to, 30.0);
        assert!((from.angle_to(&step).to_degrees() - 30.0).abs() < 1.0e-3);
        assert_eq!(rotate_towards(from, to, 180.0), to);
    }

    #[test]
    fn slope_angle_from_normal() {
        assert!(angle_from_up(up()).abs() < 1.0e-4);
        let n = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!((angle_from_up(n) - 45.0).abs() < 1.0e-3);
    }
}
