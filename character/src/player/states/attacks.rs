use collision::{ColliderInfo, Quat, Vec3};

use super::PlayerStateId;
use crate::{fsm::State, pipeline::Frame, player::Player};

pub struct Spin;

impl State<Player> for Spin {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        if !player.body.ground.grounded {
            let upward = player.stats().air_spin_upward_force;
            player.body.set_vertical_speed(upward);
        }
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        player.gravity(frame.dt);
        player.snap_to_ground();
        player.accelerate_to_input(frame.dt);

        if player.status.elapsed_at_least(player.stats().spin_duration) {
            let next = if player.body.ground.grounded {
                PlayerStateId::Idle
            } else {
                PlayerStateId::Fall
            };
            player.status.change(next);
        }
    }
}

/// Phases of a ground pound.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
enum StompPhase {
    /// Frozen in the air.
    #[default]
    Hang,
    Plunge,
    /// On the ground, waiting before the rebound leap.
    Landed,
}

/// Hang in the air, plunge, wait on the ground, then leap back up.
#[derive(Debug, Default)]
pub struct Stomp {
    phase: StompPhase,
    elapsed: f32,
}

impl State<Player> for Stomp {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        self.phase = StompPhase::Hang;
        self.elapsed = 0.0;
        player.body.velocity = Vec3::zeros();
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let s = player.stats();
        if player.body.ground.grounded && self.phase != StompPhase::Landed {
            self.phase = StompPhase::Landed;
            self.elapsed = 0.0;
        }

        match self.phase {
            StompPhase::Hang => {
                player.body.velocity = Vec3::zeros();
                self.elapsed += frame.dt;
                if self.elapsed >= s.stomp_air_time {
                    self.phase = StompPhase::Plunge;
                }
            }
            StompPhase::Plunge => {
                player.body.set_lateral_velocity(Vec3::zeros());
                player.body.set_vertical_speed(-s.stomp_downward_force);
            }
            StompPhase::Landed => {
                player.body.set_lateral_velocity(Vec3::zeros());
                self.elapsed += frame.dt;
                if self.elapsed >= s.stomp_ground_time {
                    player.body.set_vertical_speed(s.stomp_ground_leap_height);
                    player.status.change(PlayerStateId::Fall);
                }
            }
        }
    }
}

/// Forward burst that slides along the ground once it lands.
pub struct AirDive;

impl State<Player> for AirDive {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        let force = player.stats().air_dive_forward_force;
        player.body.set_vertical_speed(0.0);
        let forward = player.body.forward();
        player.body.set_lateral_velocity(forward * force);
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let s = player.stats();
        player.gravity(frame.dt);
        player.jump(frame);
        player.body.slope_factor(
            frame.world,
            s.air_dive_slope_upward_force,
            s.air_dive_slope_downward_force,
            frame.dt,
        );
        let heading = player.body.lateral_velocity();
        player.body.face_direction(heading);

        if !player.body.ground.grounded {
            return;
        }

        // Steer the slide with sideways input.
        let input = player.input.movement_camera_direction();
        let steer = input.dot(&player.body.right()) * s.air_dive_rotation_speed * frame.dt;
        let turn = Quat::from_axis_angle(&Vec3::y_axis(), steer.to_radians());
        let turned = turn * player.body.lateral_velocity();
        player.body.set_lateral_velocity(turned);

        if player.body.on_sloping_ground(frame.world) {
            player.body.decelerate(s.air_dive_slope_friction, frame.dt);
        } else {
            player.body.decelerate(s.air_dive_friction, frame.dt);
            if player.body.lateral_velocity().norm_squared() == 0.0 {
                player.body.set_vertical_speed(s.air_dive_ground_leap_height);
                player.status.change(PlayerStateId::Fall);
            }
        }
    }

    fn on_contact(&mut self, player: &mut Player, frame: &Frame, other: &ColliderInfo) {
        if player.body.ground.grounded {
            return;
        }
        player.wall_drag(frame, other);
        player.grab_pole(other);
        let wall = !player.body.is_point_under_step(other.bounds.max);
        if wall && player.status.pending().is_none() {
            player.status.change(PlayerStateId::Fall);
        }
    }
}
