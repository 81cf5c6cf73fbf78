//! Ground detection.
//!
//! Landing is strict (under the step height and flatter than the slope limit); standing is
//! looser (under the step height only). Entering and leaving the ground are edges: each fires
//! exactly one event, never one per frame.

use collision::{Hit, Tag, Vec3};
use log::trace;

use crate::{
    body::Body,
    events::Event,
    math::{angle_from_up, planar_direction, up},
    pipeline::{Frame, MotionHost},
    settings::GROUND_OFFSET,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundState {
    pub grounded: bool,
    pub normal: Vec3,
    /// Angle of `normal` from up, in degrees.
    pub angle: f32,
    /// Horizontal downhill direction.
    pub slope_direction: Vec3,
    pub hit: Option<Hit>,
    pub last_hit_time: f32,
    pub last_exit_time: f32,
}

impl Default for GroundState {
    /// Actors start grounded, so the first airborne frame fires a single exit.
    fn default() -> Self {
        Self {
            grounded: true,
            normal: up(),
            angle: 0.0,
            slope_direction: Vec3::zeros(),
            hit: None,
            last_hit_time: 0.0,
            last_exit_time: 0.0,
        }
    }
}

pub(crate) fn handle_ground<A: MotionHost>(actor: &mut A, frame: &Frame) {
    let body = actor.body();
    let distance = body.capsule.height * 0.5 + GROUND_OFFSET;
    let hit = body.sphere_cast(frame.world, -up(), distance);

    match hit {
        Some(hit) if body.vertical_speed() <= 0.0 => {
            if !body.ground.grounded {
                if actor.evaluate_landing(frame, &hit) {
                    enter_ground(actor, frame, &hit);
                } else {
                    actor.handle_high_ledge(frame, &hit);
                }
            } else if body.is_point_under_step(hit.point) {
                update_ground(actor.body_mut(), frame, &hit);
                if angle_from_up(hit.normal) >= actor.body().capsule.slope_limit {
                    actor.handle_slope_limit(frame, &hit);
                }
            } else {
                actor.handle_high_ledge(frame, &hit);
            }
        }
        _ => exit_ground(actor, frame),
    }
}

fn enter_ground<A: MotionHost>(actor: &mut A, frame: &Frame, hit: &Hit) {
    if actor.body().ground.grounded {
        return;
    }
    let body = actor.body_mut();
    body.ground.grounded = true;
    update_ground(body, frame, hit);
    trace!("ground entered at {:?}", hit.point);
    actor.events_mut().push(Event::GroundEntered);
    actor.on_ground_enter(frame);
}

fn exit_ground<A: MotionHost>(actor: &mut A, frame: &Frame) {
    if !actor.body().ground.grounded {
        return;
    }
    let body = actor.body_mut();
    body.ground.grounded = false;
    body.ground.last_exit_time = frame.time;
    body.detach();
    body.velocity.y = body.velocity.y.max(0.0);
    trace!("ground exited");
    actor.events_mut().push(Event::GroundExited);
    actor.on_ground_exit(frame);
}

fn update_ground(body: &mut Body, frame: &Frame, hit: &Hit) {
    if !body.ground.grounded {
        return;
    }
    body.ground.hit = Some(*hit);
    body.ground.normal = hit.normal;
    body.ground.angle = angle_from_up(hit.normal);
    body.ground.slope_direction = planar_direction(hit.normal);
    body.ground.last_hit_time = frame.time;

    match frame.world.collider(hit.collider) {
        Some(info) if info.tags.has(Tag::Platform) => body.attach(&info),
        _ => body.detach(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::Event,
        pipeline::update,
        testing::{ScriptedWorld, TestActor, test_machine},
    };
    use collision::ColliderId;

    fn frame(world: &ScriptedWorld, tick: u32) -> Frame<'_> {
        Frame {
            dt: 1.0 / 60.0,
            time: tick as f32 / 60.0,
            world,
        }
    }

    #[test]
    fn landing_fires_ground_entered_once() {
        let world = ScriptedWorld::with_floor(0.0, up());
        let mut actor = TestActor::airborne(Vec3::new(0.0, 0.5, 0.0));
        actor.body.velocity.y = -5.0;
        let mut machine = test_machine();
        machine.start(&mut actor, &frame(&world, 0));

        for tick in 1..30 {
            update(&mut actor, &mut machine, &frame(&world, tick), &mut Default::default());
        }

        assert!(actor.body.ground.grounded);
        assert_eq!(actor.events.count(Event::GroundEntered), 1);
        assert_eq!(actor.events.count(Event::GroundExited), 0);
    }

    #[test]
    fn steep_hit_is_not_a_landing() {
        let steep = Vec3::new(0.0, 1.0, 2.0).normalize();
        let world = ScriptedWorld::with_floor(0.0, steep);
        let mut actor = TestActor::airborne(Vec3::new(0.0, 0.05, 0.0));
        let f = frame(&world, 1);

        handle_ground(&mut actor, &f);
        assert!(!actor.body.ground.grounded);
        assert_eq!(actor.high_ledges, 1);
        assert!(actor.events.is_empty());
    }

    #[test]
    fn walkable_hit_within_step_lands() {
        let gentle = Vec3::new(0.0, 2.0, 1.0).normalize();
        let world = ScriptedWorld::with_floor(0.0, gentle);
        let mut actor = TestActor::airborne(Vec3::new(0.0, 0.05, 0.0));

        handle_ground(&mut actor, &frame(&world, 1));
        assert!(actor.body.ground.grounded);
        assert!((actor.body.ground.angle - angle_from_up(gentle)).abs() < 1.0e-4);
        assert!((actor.body.ground.slope_direction - Vec3::z()).norm() < 1.0e-5);
    }

    #[test]
    fn hit_above_step_height_is_not_a_landing() {
        // Edge reported above the step position (origin + 0.3).
        let world = ScriptedWorld::with_floor(0.0, up()).with_contact_height(0.45);
        let mut actor = TestActor::airborne(Vec3::new(0.0, 0.05, 0.0));

        handle_ground(&mut actor, &frame(&world, 1));
        assert!(!actor.body.ground.grounded);
        assert_eq!(actor.high_ledges, 1);
    }

    #[test]
    fn leaving_ground_floors_vertical_speed_and_fires_once() {
        let world = ScriptedWorld::default();
        let mut actor = TestActor::grounded(Vec3::new(0.0, 3.0, 0.0));
        actor.body.velocity.y = -4.0;

        handle_ground(&mut actor, &frame(&world, 1));
        handle_ground(&mut actor, &frame(&world, 2));

        assert!(!actor.body.ground.grounded);
        assert_eq!(actor.body.vertical_speed(), 0.0);
        assert!((actor.body.ground.last_exit_time - 1.0 / 60.0).abs() < 1.0e-6);
        assert_eq!(actor.events.count(Event::GroundExited), 1);
    }

    #[test]
    fn rising_actor_does_not_land() {
        let world = ScriptedWorld::with_floor(0.0, up());
        let mut actor = TestActor::airborne(Vec3::new(0.0, 0.05, 0.0));
        actor.body.velocity.y = 2.0;

        handle_ground(&mut actor, &frame(&world, 1));
        assert!(!actor.body.ground.grounded);
        assert_eq!(actor.body.vertical_speed(), 2.0);
    }

    #[test]
    fn platform_ground_attaches() {
        let world = ScriptedWorld::with_floor(0.0, up()).floor_tagged(Tag::Platform);
        let mut actor = TestActor::grounded(Vec3::new(0.0, 0.01, 0.0));

        handle_ground(&mut actor, &frame(&world, 1));
        assert_eq!(
            actor.body.attachment.map(|a| a.collider),
            Some(ColliderId(ScriptedWorld::FLOOR))
        );
    }
}
