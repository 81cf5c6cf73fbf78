use super::PlayerStateId;
use crate::{fsm::State, pipeline::Frame, player::Player};

/// Knocked back; waits for the landing to decide between Idle and Die.
pub struct Hurt;

impl State<Player> for Hurt {
    fn step(&mut self, player: &mut Player, frame: &Frame) {
        player.gravity(frame.dt);

        if player.body.ground.grounded && player.body.vertical_speed() <= 0.0 {
            let next = if player.health.is_empty() {
                PlayerStateId::Die
            } else {
                PlayerStateId::Idle
            };
            player.status.change(next);
        }
    }
}

pub struct Die;

impl State<Player> for Die {
    fn step(&mut self, player: &mut Player, frame: &Frame) {
        player.gravity(frame.dt);
        player.friction(frame);
        player.snap_to_ground();
    }
}
