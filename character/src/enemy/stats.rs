//! Enemy tuning. Units follow `PlayerStats`.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnemyStats {
    // General
    pub gravity: f32,
    pub snap_force: f32,
    pub rotation_speed: f32,
    pub deceleration: f32,
    pub friction: f32,
    pub turning_drag: f32,

    // Contact attack
    pub can_attack_on_contact: bool,
    pub contact_pushback: bool,
    /// Extra reach of the overlap that finds the player.
    pub contact_offset: f32,
    pub contact_damage: u32,
    pub contact_push_back_force: f32,
    /// How far below the enemy's top the player's step point may sit and still count as a stomp.
    pub contact_stepping_tolerance: f32,

    // View
    pub spot_range: f32,
    /// Distance at which a spotted player escapes.
    pub view_range: f32,

    // Follow
    pub follow_acceleration: f32,
    pub follow_top_speed: f32,

    // Waypoint
    pub face_waypoint: bool,
    pub waypoint_min_distance: f32,
    pub waypoint_acceleration: f32,
    pub waypoint_top_speed: f32,
}

impl Default for EnemyStats {
    fn default() -> Self {
        Self {
            gravity: 35.0,
            snap_force: 15.0,
            rotation_speed: 970.0,
            deceleration: 28.0,
            friction: 16.0,
            turning_drag: 28.0,

            can_attack_on_contact: true,
            contact_pushback: true,
            contact_offset: 0.15,
            contact_damage: 1,
            contact_push_back_force: 18.0,
            contact_stepping_tolerance: 0.1,

            spot_range: 5.0,
            view_range: 8.0,

            follow_acceleration: 10.0,
            follow_top_speed: 2.5,

            face_waypoint: true,
            waypoint_min_distance: 0.5,
            waypoint_acceleration: 10.0,
            waypoint_top_speed: 2.0,
        }
    }
}

impl EnemyStats {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.follow_top_speed <= 0.0 || self.waypoint_top_speed <= 0.0 {
            return Err("top speeds must be positive");
        }
        if self.spot_range < 0.0 || self.view_range < self.spot_range {
            return Err("view range must cover the spot range");
        }
        if self.waypoint_min_distance <= 0.0 {
            return Err("waypoint min distance must be positive");
        }
        Ok(())
    }
}
