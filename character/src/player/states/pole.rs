use collision::Vec3;

use super::PlayerStateId;
use crate::{
    fsm::State,
    pipeline::Frame,
    player::Player,
    settings::POLE_OFFSET,
};

/// Clinging to a pole: climb with forward/back, circle it with left/right, jump away from it.
#[derive(Debug, Default)]
pub struct PoleClimbing {
    /// Distance kept between the capsule center and the pole axis.
    collision_radius: f32,
}

impl State<Player> for PoleClimbing {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        player.reset_jumps();
        player.reset_air_spins();
        player.reset_air_dash();
        player.body.velocity = Vec3::zeros();

        if let Some(pole) = player.pole {
            let (_, distance) = pole.direction_to(player.body.position());
            let touching = pole.radius + player.body.capsule.radius + POLE_OFFSET;
            self.collision_radius = distance.min(touching);
        }
    }

    fn step(&mut self, player: &mut Player, _frame: &Frame) {
        let Some(pole) = player.pole else {
            player.status.change(PlayerStateId::Fall);
            return;
        };
        let s = player.stats();
        let (to_pole, _) = pole.direction_to(player.body.position());
        let input = player.input.movement_direction();

        player.body.face_direction(to_pole);
        let right = player.body.right();
        player
            .body
            .set_lateral_velocity(right * input.x * s.climb_rotation_speed);

        let climb = if input.z > 0.0 {
            s.climb_up_speed
        } else if input.z < 0.0 {
            -s.climb_down_speed
        } else {
            0.0
        };
        player.body.set_vertical_speed(climb);

        if player.input.jump_down() {
            player.body.face_direction(-to_pole);
            player.directional_jump(-to_pole, s.pole_jump_height, s.pole_jump_distance);
            player.status.change(PlayerStateId::Fall);
        }

        if player.body.ground.grounded {
            player.status.change(PlayerStateId::Idle);
        }

        let center = player.body.position();
        let axis = Vec3::new(pole.center.x, center.y, pole.center.z);
        let target = axis - to_pole * self.collision_radius;
        let half = player.body.capsule.height * 0.5;
        player.body.set_position(pole.clamp_to_height(target, half));
    }
}
