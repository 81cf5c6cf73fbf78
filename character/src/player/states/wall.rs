use collision::Vec3;

use super::PlayerStateId;
use crate::{fsm::State, math::planar_direction, pipeline::Frame, player::Player};

/// Sliding down a wall with the back against it.
pub struct WallDrag;

impl State<Player> for WallDrag {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        player.reset_jumps();
        player.reset_air_spins();
        player.reset_air_dash();
        player.body.velocity = Vec3::zeros();
        let away = planar_direction(player.last_wall_normal);
        player.body.face_direction(away);
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let s = player.stats();
        player.body.velocity.y -= s.wall_drag_gravity * frame.dt;

        if player.body.ground.grounded {
            player.status.change(PlayerStateId::Idle);
            return;
        }

        let back = -player.body.forward();
        let radius = player.body.capsule.radius;
        if player
            .body
            .capsule_cast(frame.world, back, radius, s.wall_drag_layers)
            .is_none()
        {
            player.status.change(PlayerStateId::Fall);
        } else if player.input.jump_down() {
            if s.wall_jump_lock_movement {
                player.input.lock_movement();
            }
            let forward = player.body.forward();
            player.directional_jump(forward, s.wall_jump_height, s.wall_jump_distance);
            player.status.change(PlayerStateId::Fall);
        }
    }
}
