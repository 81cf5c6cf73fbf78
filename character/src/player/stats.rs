//! Player tuning.
//!
//! Speeds are m/s, accelerations m/s², rotation speeds deg/s, times seconds. Jump "heights"
//! are the vertical launch speed.

use collision::{Layer, LayerMask};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerStats {
    // General
    /// Force applied to pushable rigid bodies per m/s of lateral speed.
    pub push_force: f32,
    pub snap_force: f32,
    /// Speed of the slide down slopes steeper than the slope limit.
    pub slide_force: f32,
    pub rotation_speed: f32,
    pub gravity: f32,
    pub fall_gravity: f32,
    /// Terminal fall speed.
    pub gravity_top_speed: f32,

    // Pick and throw
    pub can_pick_up: bool,
    pub can_pick_up_in_air: bool,
    pub can_jump_while_holding: bool,
    pub pick_distance: f32,
    pub throw_velocity_multiplier: f32,

    // Motion
    pub acceleration: f32,
    pub deceleration: f32,
    pub friction: f32,
    pub slope_friction: f32,
    pub top_speed: f32,
    pub turning_drag: f32,
    pub air_acceleration: f32,
    /// Dot product between input and velocity below which walking turns into braking.
    pub brake_threshold: f32,
    pub slope_upward_force: f32,
    pub slope_downward_force: f32,

    // Running
    pub running_acceleration: f32,
    pub running_top_speed: f32,
    pub running_turning_drag: f32,

    // Jump
    /// Jumps allowed before landing again.
    pub multi_jumps: u32,
    pub coyote_jump_threshold: f32,
    pub max_jump_height: f32,
    pub min_jump_height: f32,

    // Crouch
    pub crouch_height: f32,
    pub crouch_friction: f32,
    pub crawling_acceleration: f32,
    pub crawling_friction: f32,
    pub crawling_top_speed: f32,
    pub crawling_turning_speed: f32,

    // Wall drag
    pub can_wall_drag: bool,
    pub wall_jump_lock_movement: bool,
    pub wall_drag_layers: LayerMask,
    pub wall_drag_gravity: f32,
    pub wall_jump_distance: f32,
    pub wall_jump_height: f32,

    // Pole climb
    pub can_pole_climb: bool,
    pub climb_up_speed: f32,
    pub climb_down_speed: f32,
    pub climb_rotation_speed: f32,
    pub pole_jump_distance: f32,
    pub pole_jump_height: f32,

    // Swim
    /// Fraction of the velocity kept when entering water.
    pub water_conversion: f32,
    pub water_rotation_speed: f32,
    pub water_upwards_force: f32,
    pub water_jump_height: f32,
    pub water_turning_drag: f32,
    pub swim_acceleration: f32,
    pub swim_deceleration: f32,
    pub swim_top_speed: f32,
    pub swim_dive_force: f32,

    // Spin
    pub can_spin: bool,
    pub can_air_spin: bool,
    pub spin_duration: f32,
    pub air_spin_upward_force: f32,
    pub allowed_air_spins: u32,

    // Hurt
    pub hurt_upward_force: f32,
    pub hurt_backwards_force: f32,

    // Air dive
    pub can_air_dive: bool,
    pub air_dive_forward_force: f32,
    pub air_dive_friction: f32,
    pub air_dive_slope_friction: f32,
    pub air_dive_slope_upward_force: f32,
    pub air_dive_slope_downward_force: f32,
    pub air_dive_ground_leap_height: f32,
    pub air_dive_rotation_speed: f32,

    // Stomp
    pub can_stomp_attack: bool,
    pub stomp_downward_force: f32,
    pub stomp_air_time: f32,
    pub stomp_ground_time: f32,
    pub stomp_ground_leap_height: f32,

    // Ledge hang
    pub can_ledge_hang: bool,
    pub ledge_hanging_layers: LayerMask,
    pub ledge_max_forward_distance: f32,
    pub ledge_max_downward_distance: f32,
    pub ledge_side_max_distance: f32,
    pub ledge_side_height_offset: f32,
    pub ledge_side_collision_radius: f32,
    pub ledge_movement_speed: f32,

    // Ledge climb
    pub can_climb_ledges: bool,
    pub ledge_climbing_layers: LayerMask,
    pub ledge_climbing_duration: f32,

    // Backflip
    pub can_backflip: bool,
    pub backflip_lock_movement: bool,
    pub backflip_air_acceleration: f32,
    pub backflip_turning_drag: f32,
    pub backflip_top_speed: f32,
    pub backflip_jump_height: f32,
    pub backflip_gravity: f32,
    pub backflip_backward_force: f32,
    pub backflip_backward_turn_force: f32,

    // Glide
    pub can_glide: bool,
    pub gliding_gravity: f32,
    pub gliding_max_fall_speed: f32,
    pub gliding_turning_drag: f32,

    // Dash
    pub can_air_dash: bool,
    pub can_ground_dash: bool,
    pub dash_force: f32,
    pub dash_duration: f32,
    pub ground_dash_cool_down: f32,
    pub allowed_air_dashes: u32,
}

impl Default for PlayerStats {
    fn default() -> Self {
        let solid = LayerMask::of(&[Layer::Default, Layer::Wall]);
        let ledges = LayerMask::of(&[Layer::Default, Layer::Ledge]);
        Self {
            push_force: 4.0,
            snap_force: 15.0,
            slide_force: 10.0,
            rotation_speed: 970.0,
            gravity: 38.0,
            fall_gravity: 65.0,
            gravity_top_speed: 50.0,

            can_pick_up: true,
            can_pick_up_in_air: false,
            can_jump_while_holding: true,
            pick_distance: 0.5,
            throw_velocity_multiplier: 1.5,

            acceleration: 13.0,
            deceleration: 28.0,
            friction: 28.0,
            slope_friction: 18.0,
            top_speed: 6.0,
            turning_drag: 28.0,
            air_acceleration: 32.0,
            brake_threshold: -0.8,
            slope_upward_force: 25.0,
            slope_downward_force: 28.0,

            running_acceleration: 16.0,
            running_top_speed: 7.5,
            running_turning_drag: 14.0,

            multi_jumps: 1,
            coyote_jump_threshold: 0.15,
            max_jump_height: 17.0,
            min_jump_height: 10.0,

            crouch_height: 1.0,
            crouch_friction: 10.0,
            crawling_acceleration: 8.0,
            crawling_friction: 32.0,
            crawling_top_speed: 2.5,
            crawling_turning_speed: 3.0,

            can_wall_drag: true,
            wall_jump_lock_movement: true,
            wall_drag_layers: solid,
            wall_drag_gravity: 12.0,
            wall_jump_distance: 8.0,
            wall_jump_height: 15.0,

            can_pole_climb: true,
            climb_up_speed: 3.0,
            climb_down_speed: 8.0,
            climb_rotation_speed: 2.0,
            pole_jump_distance: 8.0,
            pole_jump_height: 15.0,

            water_conversion: 0.35,
            water_rotation_speed: 360.0,
            water_upwards_force: 8.0,
            water_jump_height: 15.0,
            water_turning_drag: 2.5,
            swim_acceleration: 4.0,
            swim_deceleration: 3.0,
            swim_top_speed: 4.0,
            swim_dive_force: 15.0,

            can_spin: true,
            can_air_spin: true,
            spin_duration: 0.5,
            air_spin_upward_force: 10.0,
            allowed_air_spins: 1,

            hurt_upward_force: 10.0,
            hurt_backwards_force: 5.0,

            can_air_dive: true,
            air_dive_forward_force: 16.0,
            air_dive_friction: 32.0,
            air_dive_slope_friction: 12.0,
            air_dive_slope_upward_force: 35.0,
            air_dive_slope_downward_force: 40.0,
            air_dive_ground_leap_height: 10.0,
            air_dive_rotation_speed: 45.0,

            can_stomp_attack: true,
            stomp_downward_force: 20.0,
            stomp_air_time: 0.8,
            stomp_ground_time: 0.5,
            stomp_ground_leap_height: 10.0,

            can_ledge_hang: true,
            ledge_hanging_layers: ledges,
            ledge_max_forward_distance: 0.25,
            ledge_max_downward_distance: 0.25,
            ledge_side_max_distance: 0.5,
            ledge_side_height_offset: 0.15,
            ledge_side_collision_radius: 0.25,
            ledge_movement_speed: 1.5,

            can_climb_ledges: true,
            ledge_climbing_layers: ledges,
            ledge_climbing_duration: 1.0,

            can_backflip: true,
            backflip_lock_movement: true,
            backflip_air_acceleration: 12.0,
            backflip_turning_drag: 2.5,
            backflip_top_speed: 7.5,
            backflip_jump_height: 23.0,
            backflip_gravity: 35.0,
            backflip_backward_force: 4.0,
            backflip_backward_turn_force: 8.0,

            can_glide: true,
            gliding_gravity: 10.0,
            gliding_max_fall_speed: 2.0,
            gliding_turning_drag: 8.0,

            can_air_dash: true,
            can_ground_dash: true,
            dash_force: 25.0,
            dash_duration: 0.3,
            ground_dash_cool_down: 0.5,
            allowed_air_dashes: 1,
        }
    }
}

impl PlayerStats {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.top_speed <= 0.0 || self.running_top_speed <= 0.0 || self.crawling_top_speed <= 0.0 {
            return Err("top speeds must be positive");
        }
        if self.gravity_top_speed <= 0.0 {
            return Err("gravity top speed must be positive");
        }
        if self.min_jump_height > self.max_jump_height {
            return Err("min jump height exceeds max jump height");
        }
        if self.crouch_height <= 0.0 {
            return Err("crouch height must be positive");
        }
        if self.dash_duration <= 0.0 || self.spin_duration <= 0.0 || self.ledge_climbing_duration <= 0.0 {
            return Err("timed moves need a positive duration");
        }
        if !(0.0..=1.0).contains(&self.water_conversion) {
            return Err("water conversion must be within [0, 1]");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PlayerStats::default().validate().is_ok());
        let stats = PlayerStats {
            min_jump_height: 20.0,
            ..PlayerStats::default()
        };
        assert!(stats.validate().is_err());
    }
}
