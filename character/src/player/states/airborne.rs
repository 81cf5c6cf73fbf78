use collision::{ColliderInfo, Vec3};

use super::PlayerStateId;
use crate::{events::Event, fsm::State, math::approach, pipeline::Frame, player::Player};

pub struct Fall;

impl State<Player> for Fall {
    fn step(&mut self, player: &mut Player, frame: &Frame) {
        player.gravity(frame.dt);
        player.snap_to_ground();
        let heading = player.body.lateral_velocity();
        player.face_direction_smooth(heading, frame.dt);
        player.accelerate_to_input(frame.dt);
        player.jump(frame);
        player.spin();
        player.pick_and_throw(frame);
        player.air_dive();
        player.stomp_attack();
        player.ledge_grab(frame);
        player.dash(frame);

        if player.body.ground.grounded {
            player.status.change(PlayerStateId::Idle);
        } else {
            player.glide();
        }
    }

    fn on_contact(&mut self, player: &mut Player, frame: &Frame, other: &ColliderInfo) {
        player.push_rigidbody(other);
        player.wall_drag(frame, other);
        player.grab_pole(other);
    }
}

/// Slow descent capped at the gliding fall speed, with its own turning drag.
pub struct Glide;

impl State<Player> for Glide {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        player.body.set_vertical_speed(0.0);
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let s = player.stats();
        let fall = approach(
            player.body.vertical_speed(),
            -s.gliding_max_fall_speed,
            s.gliding_gravity * frame.dt,
        );
        player.body.set_vertical_speed(fall);

        let heading = player.body.lateral_velocity();
        player.face_direction_smooth(heading, frame.dt);
        let input = player.input.movement_camera_direction();
        player.body.accelerate(
            input,
            s.gliding_turning_drag,
            s.air_acceleration,
            s.top_speed,
            frame.dt,
        );
        player.ledge_grab(frame);

        if player.body.ground.grounded {
            player.status.change(PlayerStateId::Idle);
        } else if !player.input.glide() {
            player.status.change(PlayerStateId::Fall);
        }
    }

    fn on_contact(&mut self, player: &mut Player, frame: &Frame, other: &ColliderInfo) {
        player.wall_drag(frame, other);
        player.grab_pole(other);
    }
}

pub struct Backflip;

impl State<Player> for Backflip {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        player.set_jumps(1);
        player.events.push(Event::Jumped);
        if player.stats().backflip_lock_movement {
            player.input.lock_movement();
        }
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let gravity = player.stats().backflip_gravity;
        player.body.gravity(gravity, frame.dt);
        player.backflip_accelerate(frame.dt);

        if player.body.ground.grounded {
            player.body.set_lateral_velocity(Vec3::zeros());
            player.status.change(PlayerStateId::Idle);
        } else if player.body.vertical_speed() < 0.0 {
            player.spin();
            player.air_dive();
            player.stomp_attack();
            player.glide();
        }
    }

    fn on_contact(&mut self, player: &mut Player, frame: &Frame, other: &ColliderInfo) {
        player.push_rigidbody(other);
        player.wall_drag(frame, other);
        player.grab_pole(other);
    }
}
