use collision::ColliderInfo;

use super::PlayerStateId;
use crate::{events::Event, fsm::State, pipeline::Frame, player::Player};

/// Fixed forward burst for `dash_duration`, ignoring gravity.
pub struct Dash;

impl State<Player> for Dash {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        player.body.set_vertical_speed(0.0);
        player.events.push(Event::DashStarted);
    }

    fn exit(&mut self, player: &mut Player, _frame: &Frame) {
        let top = player.stats().top_speed;
        player.body.clamp_lateral_speed(top);
        player.events.push(Event::DashEnded);
    }

    fn step(&mut self, player: &mut Player, _frame: &Frame) {
        let s = player.stats();
        let forward = player.body.forward();
        player.body.set_lateral_velocity(forward * s.dash_force);

        if player.status.elapsed_past(s.dash_duration) {
            let next = if player.body.ground.grounded {
                PlayerStateId::Walk
            } else {
                PlayerStateId::Fall
            };
            player.status.change(next);
        }
    }

    fn on_contact(&mut self, player: &mut Player, frame: &Frame, other: &ColliderInfo) {
        player.push_rigidbody(other);
        player.wall_drag(frame, other);
        player.grab_pole(other);
    }
}
