use crate::{
    query::{QueryFilter, ShapeQueries},
    settings::{
        DEFAULT_MAX_ITERATIONS, DEFAULT_SKIN, DIST_EPS, MIN_MOVE_SQ, STEP_ACCEPT_FRACTION,
    },
    types::{CapsuleSpec, MoveHit, MoveResult, Vec3, up},
};

/// Parameters for a single kinematic movement attempt.
///
/// - Movement is expressed as a desired translation for this tick (meters).
/// - Collision is handled by capsule-casting through [`ShapeQueries`], stopping at
///   contact minus `skin`, and sliding along the contact normal.
/// - The slide step iterates up to `max_iterations` to handle corners.
#[derive(Clone, Copy, Debug)]
pub struct MoveRequest {
    /// Starting world position of the capsule's center.
    pub start_pos: Vec3,
    /// Desired world-space translation for this step.
    pub desired_translation: Vec3,
    /// Capsule shape for the actor.
    pub capsule: CapsuleSpec,
    /// Separation to keep from surfaces to avoid jitter (meters).
    pub skin: f32,
    /// Max iterations of slide resolution (for corners).
    pub max_iterations: u32,
}

impl MoveRequest {
    #[inline]
    pub fn with_defaults(start_pos: Vec3, desired_translation: Vec3, capsule: CapsuleSpec) -> Self {
        Self {
            start_pos,
            desired_translation,
            capsule,
            skin: DEFAULT_SKIN,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    #[inline]
    pub fn with_skin(mut self, skin: f32) -> Self {
        self.skin = skin.max(0.0);
        self
    }
}

/// Kinematic sweep-and-slide for a capsule.
///
/// Algorithm:
/// - Capsule-cast along the desired translation.
/// - On hit, move to just before the contact (minus `skin`) and slide along the contact normal.
/// - Hits within two skins of the start take their normal from the closest contact instead of
///   the cast, and push the capsule back out to the skin gap.
/// - Iterate to handle corners until `max_iterations` or the remaining motion is negligible.
pub fn move_capsule(world: &dyn ShapeQueries, filter: QueryFilter, req: MoveRequest) -> MoveResult {
    let mut pos = req.start_pos;
    let mut remaining = req.desired_translation;
    let mut last_hit = None;

    for _ in 0..req.max_iterations {
        // Early out if remaining motion is too small to matter.
        if remaining.norm_squared() <= MIN_MOVE_SQ {
            break;
        }

        let len = remaining.norm();
        let dir = remaining / len;
        let (bottom, top) = req.capsule.segment(pos);

        // Cast a little further than the motion so we stop `skin` short of surfaces.
        let near = req.skin * 2.0;
        let hit = world
            .capsule_cast(bottom, top, req.capsule.radius, dir, len + req.skin, filter)
            // Far hits whose normal does not oppose the motion never block it.
            .filter(|h| h.distance <= near || h.normal.dot(&dir) < -DIST_EPS);

        let Some(hit) = hit else {
            // No hit: move fully and finish. An earlier hit of this move is kept.
            pos += remaining;
            remaining = Vec3::zeros();
            break;
        };

        // Casts starting in contact report unreliable normals; use the closest features
        // instead and restore the skin gap along them.
        let mut n = hit.normal;
        let mut pushed = false;
        if hit.distance <= near {
            if let Some(contact) = world.contact(bottom, top, req.capsule.radius, hit.collider, near) {
                n = contact.normal;
                let push = (req.skin - contact.distance).max(0.0);
                pos += n * push;
                pushed = push > DIST_EPS;
            }
        }
        if n.dot(&dir) >= -DIST_EPS && !pushed {
            // Touching, but the motion leaves the surface.
            pos += remaining;
            remaining = Vec3::zeros();
            break;
        }

        // Travel up to the contact point (minus skin).
        let travel = (hit.distance - req.skin).clamp(0.0, len);
        pos += dir * travel;

        // Slide: cancel only the part of the leftover going into the surface.
        let leftover = dir * (len - travel);
        let slide = leftover - n * leftover.dot(&n).min(0.0);

        remaining = slide;
        last_hit = Some(MoveHit {
            normal: n,
            distance: hit.distance,
            collider: hit.collider,
        });

        // If the slide is negligible, we're done.
        if slide.norm_squared() <= MIN_MOVE_SQ {
            break;
        }
    }

    MoveResult {
        end_pos: pos,
        last_hit,
        remaining,
    }
}

/// Sweep-and-slide that climbs small ledges.
///
/// The horizontal part of the motion is moved first. If it is blocked and `step_offset > 0`,
/// a step attempt is made:
/// - Up by `step_offset`
/// - Forward by the horizontal motion
/// - Down by `step_offset`
///
/// The stepped result is only kept when it gets further horizontally. The vertical part of
/// the motion is applied last.
pub fn move_capsule_with_step(
    world: &dyn ShapeQueries,
    filter: QueryFilter,
    req: MoveRequest,
    step_offset: f32,
) -> MoveResult {
    let desired = req.desired_translation;
    let horizontal = Vec3::new(desired.x, 0.0, desired.z);
    let vertical = up() * desired.y;

    let flat = move_capsule(
        world,
        filter,
        MoveRequest {
            desired_translation: horizontal,
            ..req
        },
    );

    let desired_len = horizontal.norm();
    let achieved = planar_len(flat.end_pos - req.start_pos);

    let mut after = flat;
    if step_offset > 0.0
        && desired_len > DIST_EPS
        && achieved < desired_len * STEP_ACCEPT_FRACTION
        && flat.last_hit.is_some()
    {
        let step_up = move_capsule(
            world,
            filter,
            MoveRequest {
                desired_translation: up() * step_offset,
                ..req
            },
        );
        let forward = move_capsule(
            world,
            filter,
            MoveRequest {
                start_pos: step_up.end_pos,
                desired_translation: horizontal,
                ..req
            },
        );
        let settle = move_capsule(
            world,
            filter,
            MoveRequest {
                start_pos: forward.end_pos,
                desired_translation: -up() * (forward.end_pos.y - req.start_pos.y).max(0.0),
                ..req
            },
        );

        if planar_len(settle.end_pos - req.start_pos) > achieved + 1.0e-4 {
            after = settle;
        }
    }

    if vertical.norm_squared() <= MIN_MOVE_SQ {
        return after;
    }

    let fall = move_capsule(
        world,
        filter,
        MoveRequest {
            start_pos: after.end_pos,
            desired_translation: vertical,
            ..req
        },
    );
    MoveResult {
        end_pos: fall.end_pos,
        last_hit: fall.last_hit.or(after.last_hit),
        remaining: after.remaining + fall.remaining,
    }
}

#[inline]
fn planar_len(v: Vec3) -> f32 {
    (v.x * v.x + v.z * v.z).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        types::ColliderId,
        world::{ColliderDef, ColliderShapeDef, QueryWorld},
    };

    fn capsule() -> CapsuleSpec {
        CapsuleSpec::from_height(2.0, 0.5)
    }

    fn world_with_step(step_height: f32) -> QueryWorld {
        QueryWorld::build(vec![
            ColliderDef::new(
                1,
                ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(20.0, 0.5, 20.0),
                },
                Vec3::new(0.0, -0.5, 0.0),
            ),
            // A box whose top is `step_height` above the floor, front face at z = 1.
            ColliderDef::new(
                2,
                ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(5.0, step_height * 0.5, 5.0),
                },
                Vec3::new(0.0, step_height * 0.5, 6.0),
            ),
        ])
    }

    #[test]
    fn free_move_consumes_full_translation() {
        let world = QueryWorld::build(vec![]);
        let req = MoveRequest::with_defaults(Vec3::new(0.0, 1.0, 0.0), Vec3::new(1.0, 0.0, 2.0), capsule());
        let res = move_capsule(&world, QueryFilter::default(), req);
        assert!((res.end_pos - Vec3::new(1.0, 1.0, 2.0)).norm() < 1.0e-5);
        assert!(res.last_hit.is_none());
    }

    #[test]
    fn wall_stops_motion_short_by_skin() {
        // Tall box: front face at z = 1.0.
        let world = world_with_step(3.0);
        let start = Vec3::new(0.0, 1.01, 0.0);
        let req = MoveRequest::with_defaults(start, Vec3::new(0.0, 0.0, 2.0), capsule());
        let res = move_capsule(&world, QueryFilter::default(), req);

        // Capsule front reaches the face minus skin.
        let front = res.end_pos.z + 0.5;
        assert!(front <= 1.0);
        assert!(front > 1.0 - 0.02);
        assert!(res.last_hit.is_some());
    }

    #[test]
    fn diagonal_motion_slides_along_wall() {
        let world = world_with_step(3.0);
        let start = Vec3::new(0.0, 1.01, 0.4);
        let req = MoveRequest::with_defaults(start, Vec3::new(1.0, 0.0, 1.0), capsule());
        let res = move_capsule(&world, QueryFilter::default(), req);

        // Blocked in z, but the x component survives the slide.
        assert!(res.end_pos.z + 0.5 <= 1.0);
        assert!(res.end_pos.x > 0.9);
        // The wall hit survives the clean sub-step after it.
        assert_eq!(res.last_hit.map(|h| h.collider), Some(ColliderId(2)));
    }

    #[test]
    fn resting_capsule_pressed_into_floor_stays_put() {
        let world = world_with_step(3.0);
        for start in [Vec3::new(4.0, 1.0, 0.0), Vec3::new(-7.3, 1.0, -12.1)] {
            let mut pos = start;
            for _ in 0..600 {
                let req = MoveRequest::with_defaults(pos, Vec3::new(0.0, -0.5, 0.0), capsule());
                let res = move_capsule(&world, QueryFilter::default(), req);
                assert_eq!(res.last_hit.map(|h| h.collider), Some(ColliderId(1)));
                pos = res.end_pos;
            }
            assert!((pos.x - start.x).abs() < 1.0e-5);
            assert!((pos.z - start.z).abs() < 1.0e-5);
            assert!(pos.y >= start.y - 1.0e-4);
            assert!(pos.y <= start.y + DEFAULT_SKIN + 1.0e-4);
        }
    }

    #[test]
    fn sideways_move_from_touching_the_floor_is_not_blocked() {
        let world = world_with_step(3.0);
        let start = Vec3::new(-4.0, 1.0, -6.0);
        let req = MoveRequest::with_defaults(start, Vec3::new(1.0, 0.0, 0.0), capsule());
        let res = move_capsule(&world, QueryFilter::default(), req);
        assert!((res.end_pos.x - (start.x + 1.0)).abs() < 1.0e-4);
        assert!((res.end_pos.z - start.z).abs() < 1.0e-5);
        assert!(res.end_pos.y >= start.y - 1.0e-4);
    }

    #[test]
    fn low_ledge_is_climbed_with_step_offset() {
        let world = world_with_step(0.45);
        let start = Vec3::new(0.0, 1.01, 0.0);
        let req = MoveRequest::with_defaults(start, Vec3::new(0.0, 0.0, 1.5), capsule());

        let blocked = move_capsule_with_step(&world, QueryFilter::default(), req, 0.0);
        assert!(blocked.end_pos.z < 0.7);

        let stepped = move_capsule_with_step(&world, QueryFilter::default(), req, 0.5);
        assert!(stepped.end_pos.z > 1.4);
        assert!(stepped.end_pos.y > 1.4);
    }
}
