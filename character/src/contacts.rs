//! Contact resolution and penetration correction.

use collision::TriggerPolicy;

use crate::{
    body::Body,
    fsm::StateMachine,
    pipeline::{Frame, MotionHost},
    props::Listeners,
    settings::PENETRATION_OFFSET,
};

/// Dispatch every touching non-trigger collider to the active state and to the collider's
/// listener, then stop upward motion against anything overhead.
pub(crate) fn handle_contacts<A: MotionHost>(
    actor: &mut A,
    machine: &mut StateMachine<A>,
    frame: &Frame,
    listeners: &mut Listeners,
) {
    let touching = actor.body().overlap(frame.world, 0.0, TriggerPolicy::Ignore);

    for id in touching {
        let Some(other) = frame.world.collider(id) else {
            continue;
        };
        if other.is_trigger || actor.body().collider == Some(id) {
            continue;
        }

        machine.contact(actor, frame, &other);

        if let Some(listener) = listeners.get_mut(id) {
            let subject = actor.contact_subject();
            if let Some(reaction) = listener.on_actor_contact(&subject, &other, frame) {
                actor.apply_reaction(frame, reaction);
                machine.apply_pending(actor, frame);
            }
        }

        let body = actor.body_mut();
        if other.bounds.min.y > body.bounds().max.y {
            body.velocity.y = body.velocity.y.min(0.0);
        }
    }
}

/// Push the capsule out of overlapping geometry. Runs only while the actor has no lateral
/// velocity, so it never fights intentional movement.
pub fn correct_penetration(body: &mut Body, frame: &Frame) {
    if body.lateral_velocity().norm_squared() != 0.0 {
        return;
    }

    for id in body.overlap(frame.world, PENETRATION_OFFSET, TriggerPolicy::Ignore) {
        match frame.world.collider(id) {
            Some(info) if !info.is_trigger && body.collider != Some(id) => {}
            _ => continue,
        }
        let (bottom, top) = body.segment();
        if let Some(p) = frame
            .world
            .compute_penetration(bottom, top, body.capsule.radius, id)
        {
            body.origin += p.direction * p.distance;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        math::up,
        pipeline::update,
        testing::{ScriptedWorld, TestActor, test_machine},
    };
    use collision::{Bounds, ColliderId, Penetration, Vec3};

    const WALL: u32 = 40;

    fn world_with_wall(depth: f32, normal: Vec3) -> ScriptedWorld {
        let mut world = ScriptedWorld::default();
        world.add_overlap(
            WALL,
            Bounds::new(Vec3::new(0.4, 0.0, -1.0), Vec3::new(1.0, 3.0, 1.0)),
            false,
        );
        world.penetrations.push((
            ColliderId(WALL),
            Penetration {
                direction: normal,
                distance: depth,
            },
        ));
        world
    }

    fn frame(world: &ScriptedWorld) -> Frame<'_> {
        Frame {
            dt: 1.0 / 60.0,
            time: 0.0,
            world,
        }
    }

    #[test]
    fn resting_actor_is_pushed_out_by_exact_depth() {
        let n = Vec3::new(-1.0, 0.0, 0.0);
        let world = world_with_wall(0.125, n);
        let mut body = TestActor::grounded(Vec3::zeros()).body;

        correct_penetration(&mut body, &frame(&world));
        assert_eq!(body.origin, n * 0.125);
    }

    #[test]
    fn moving_actor_is_not_corrected() {
        let world = world_with_wall(0.125, -Vec3::x());
        let mut body = TestActor::grounded(Vec3::zeros()).body;
        body.velocity = Vec3::new(0.5, 0.0, 0.0);

        correct_penetration(&mut body, &frame(&world));
        assert_eq!(body.origin, Vec3::zeros());
    }

    #[test]
    fn trigger_overlaps_are_ignored() {
        let mut world = ScriptedWorld::default();
        world.add_overlap(WALL, Bounds::new(Vec3::zeros(), Vec3::repeat(1.0)), true);
        world.penetrations.push((
            ColliderId(WALL),
            Penetration {
                direction: up(),
                distance: 1.0,
            },
        ));
        let mut body = TestActor::grounded(Vec3::zeros()).body;

        correct_penetration(&mut body, &frame(&world));
        assert_eq!(body.origin, Vec3::zeros());
    }

    #[test]
    fn contacts_reach_active_state_and_overhead_stops_rise() {
        let mut world = ScriptedWorld::default();
        // Ceiling entirely above the capsule top (2.0).
        world.add_overlap(
            WALL,
            Bounds::new(Vec3::new(-5.0, 2.5, -5.0), Vec3::new(5.0, 3.0, 5.0)),
            false,
        );
        let mut actor = TestActor::airborne(Vec3::zeros());
        let mut machine = test_machine();
        let f = frame(&world);
        machine.start(&mut actor, &f);

        actor.body.velocity.y = 4.0;
        actor.rise_each_step = 4.0;
        actor.body.set_lateral_velocity(Vec3::x());
        update(&mut actor, &mut machine, &f, &mut Listeners::default());

        assert_eq!(actor.contacts, vec![ColliderId(WALL)]);
        assert!(actor.body.vertical_speed() <= 0.0);
    }
}
