use collision::ColliderInfo;

use super::PlayerStateId;
use crate::{fsm::State, pipeline::Frame, player::Player};

pub struct Idle;

impl State<Player> for Idle {
    fn step(&mut self, player: &mut Player, frame: &Frame) {
        player.gravity(frame.dt);
        player.snap_to_ground();
        player.jump(frame);
        player.fall();
        player.spin();
        player.pick_and_throw(frame);
        player.dash(frame);
        player.regular_slope_factor(frame);
        player.friction(frame);

        let moving = player.input.movement_direction().norm_squared() > 0.0
            || player.body.lateral_velocity().norm_squared() > 0.0;
        if moving {
            player.status.change(PlayerStateId::Walk);
        } else if player.input.crouch() {
            player.status.change(PlayerStateId::Crouch);
        }
    }

    fn on_contact(&mut self, player: &mut Player, _frame: &Frame, other: &ColliderInfo) {
        player.push_rigidbody(other);
    }
}

pub struct Walk;

impl State<Player> for Walk {
    fn step(&mut self, player: &mut Player, frame: &Frame) {
        player.gravity(frame.dt);
        player.snap_to_ground();
        player.jump(frame);
        player.fall();
        player.spin();
        player.pick_and_throw(frame);
        player.dash(frame);
        player.regular_slope_factor(frame);

        let input = player.input.movement_camera_direction();
        if input.norm_squared() > 0.0 {
            let along = input.dot(&player.body.lateral_velocity());
            if along >= player.stats().brake_threshold {
                player.accelerate(input, frame.dt);
                let heading = player.body.lateral_velocity();
                player.face_direction_smooth(heading, frame.dt);
            } else {
                player.status.change(PlayerStateId::Brake);
            }
        } else {
            player.friction(frame);
            if player.body.lateral_velocity().norm_squared() <= 0.0 {
                player.status.change(PlayerStateId::Idle);
            }
        }

        if player.input.crouch() {
            player.status.change(PlayerStateId::Crouch);
        }
    }

    fn on_contact(&mut self, player: &mut Player, _frame: &Frame, other: &ColliderInfo) {
        player.push_rigidbody(other);
    }
}

/// Skid after reversing input at speed; a jump while skidding is a backflip.
pub struct Brake;

impl State<Player> for Brake {
    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let s = player.stats();
        let input = player.input.movement_camera_direction();
        let turned = input.dot(&player.body.forward()) < 0.0;

        if s.can_backflip && turned && player.input.jump_down() {
            player.backflip(s.backflip_backward_turn_force);
            return;
        }

        player.snap_to_ground();
        player.jump(frame);
        player.fall();
        player.decelerate(frame.dt);

        if player.body.lateral_velocity().norm_squared() == 0.0 {
            player.status.change(PlayerStateId::Idle);
        }
    }
}

/// Shrunk capsule. Crawls with input, stands up once released and there is headroom.
pub struct Crouch;

impl State<Player> for Crouch {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        let height = player.stats().crouch_height;
        player.body.capsule.resize(height);
    }

    fn exit(&mut self, player: &mut Player, _frame: &Frame) {
        let height = player.body.capsule.original_height();
        player.body.capsule.resize(height);
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let s = player.stats();
        player.gravity(frame.dt);
        player.snap_to_ground();
        player.fall();

        let input = player.input.movement_camera_direction();
        if input.norm_squared() > 0.0 {
            player.crawl_accelerate(input, frame.dt);
            let heading = player.body.lateral_velocity();
            player.face_direction_smooth(heading, frame.dt);
        } else {
            // Sliding in from a run keeps the softer crouch friction.
            let friction = if player.body.lateral_velocity().norm() > s.crawling_top_speed {
                s.crouch_friction
            } else {
                s.crawling_friction
            };
            player.body.decelerate(friction, frame.dt);
        }

        let headroom = player.can_stand_up(frame.world);
        if headroom && player.input.jump_down() {
            player.backflip(s.backflip_backward_force);
        } else if headroom && !player.input.crouch() {
            player.status.change(PlayerStateId::Idle);
        }
    }

    fn on_contact(&mut self, player: &mut Player, _frame: &Frame, other: &ColliderInfo) {
        player.push_rigidbody(other);
    }
}
