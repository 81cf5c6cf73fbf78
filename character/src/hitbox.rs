//! Attack volumes of the player's offensive moves.
//!
//! A hitbox is live while the player is in the matching state; the level tests it against
//! enemy colliders once per tick and applies the attacker's recoil when a hit lands. Prop
//! listeners under the hitbox (breakables) are told about it as well.

use crate::{
    body::Body,
    player::{Player, PlayerStateId},
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    pub damage: u32,
    /// Also breaks breakable props it overlaps.
    pub break_objects: bool,
    /// Bounce the attacker up by its own fall speed, clamped to the rebound range.
    pub rebound: bool,
    pub rebound_min_force: f32,
    pub rebound_max_force: f32,
    /// Knock the attacker back by its own lateral speed, clamped to the push-back range.
    pub push_back: bool,
    pub push_back_min_magnitude: f32,
    pub push_back_max_magnitude: f32,
}

impl Default for Hitbox {
    fn default() -> Self {
        Self {
            damage: 1,
            break_objects: false,
            rebound: false,
            rebound_min_force: 10.0,
            rebound_max_force: 25.0,
            push_back: false,
            push_back_min_magnitude: 5.0,
            push_back_max_magnitude: 10.0,
        }
    }
}

impl Hitbox {
    /// Attacker reaction after a landed hit.
    pub fn recoil(&self, attacker: &mut Body) {
        if self.rebound {
            let force = (-attacker.velocity.y).clamp(self.rebound_min_force, self.rebound_max_force);
            attacker.set_vertical_speed(force);
        }
        if self.push_back {
            let magnitude = attacker
                .lateral_velocity()
                .norm()
                .clamp(self.push_back_min_magnitude, self.push_back_max_magnitude);
            let back = -attacker.forward() * magnitude;
            attacker.set_lateral_velocity(back);
        }
    }
}

/// One hitbox per attacking state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerHitboxes {
    pub spin: Hitbox,
    pub stomp: Hitbox,
    pub air_dive: Hitbox,
}

impl Default for PlayerHitboxes {
    fn default() -> Self {
        Self {
            spin: Hitbox {
                break_objects: true,
                ..Hitbox::default()
            },
            stomp: Hitbox {
                break_objects: true,
                rebound: true,
                ..Hitbox::default()
            },
            air_dive: Hitbox {
                break_objects: true,
                push_back: true,
                ..Hitbox::default()
            },
        }
    }
}

impl PlayerHitboxes {
    /// The hitbox live for the player's current state. The stomp only hurts on the way down.
    pub fn active(&self, player: &Player) -> Option<Hitbox> {
        match player.status.current() {
            PlayerStateId::Spin => Some(self.spin),
            PlayerStateId::Stomp if player.body.velocity.y < 0.0 => Some(self.stomp),
            PlayerStateId::AirDive => Some(self.air_dive),
            _ => None,
        }
    }
}
