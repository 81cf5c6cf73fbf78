use collision::{ColliderInfo, Vec3};

use super::PlayerStateId;
use crate::{fsm::State, pipeline::Frame, player::Player};

/// Buoyant movement inside a water volume; jumping is only possible at the surface.
pub struct Swim;

impl State<Player> for Swim {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        let conversion = player.stats().water_conversion;
        player.body.velocity *= conversion;
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let Some(water) = player.water else {
            player.status.change(PlayerStateId::Walk);
            return;
        };
        let s = player.stats();

        let input = player.input.movement_camera_direction();
        player.water_accelerate(input, frame.dt);
        let heading = player.body.lateral_velocity();
        player.water_face_direction(heading, frame.dt);

        if player.body.position().y < water.bounds.max.y {
            if player.body.ground.grounded {
                player.body.set_vertical_speed(0.0);
            }
            player.body.velocity.y += s.water_upwards_force * frame.dt;
        } else {
            player.body.set_vertical_speed(0.0);
            if player.input.jump_down() {
                player.jump_with(s.water_jump_height);
            }
        }

        if !player.body.ground.grounded && player.input.dive() {
            player.body.velocity.y -= s.swim_dive_force * frame.dt;
        }

        if input == Vec3::zeros() {
            player.body.decelerate(s.swim_deceleration, frame.dt);
        }
    }

    fn on_contact(&mut self, player: &mut Player, _frame: &Frame, other: &ColliderInfo) {
        player.push_rigidbody(other);
    }
}
