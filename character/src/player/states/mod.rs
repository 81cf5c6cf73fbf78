/*!
Player states.

- grounded: Idle, Walk, Brake, Crouch
- airborne: Fall, Glide, Backflip
- attacks:  Spin, Stomp, AirDive
- dash:     Dash
- swim:     Swim
- pole:     PoleClimbing
- wall:     WallDrag
- ledge:    LedgeHanging, LedgeClimbing
- damage:   Hurt, Die
*/

mod airborne;
mod attacks;
mod dash;
mod damage;
mod grounded;
mod ledge;
mod pole;
mod swim;
mod wall;

use crate::fsm::{StateId, StateMachine};

use super::Player;

pub use airborne::{Backflip, Fall, Glide};
pub use attacks::{AirDive, Spin, Stomp};
pub use damage::{Die, Hurt};
pub use dash::Dash;
pub use grounded::{Brake, Crouch, Idle, Walk};
pub use ledge::{LedgeClimbing, LedgeHanging};
pub use pole::PoleClimbing;
pub use swim::Swim;
pub use wall::WallDrag;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerStateId {
    Idle,
    Walk,
    Brake,
    Crouch,
    Fall,
    Glide,
    Swim,
    PoleClimbing,
    WallDrag,
    LedgeHanging,
    LedgeClimbing,
    Dash,
    Backflip,
    Spin,
    Stomp,
    AirDive,
    Hurt,
    Die,
}

impl StateId for PlayerStateId {
    const ALL: &'static [Self] = &[
        Self::Idle,
        Self::Walk,
        Self::Brake,
        Self::Crouch,
        Self::Fall,
        Self::Glide,
        Self::Swim,
        Self::PoleClimbing,
        Self::WallDrag,
        Self::LedgeHanging,
        Self::LedgeClimbing,
        Self::Dash,
        Self::Backflip,
        Self::Spin,
        Self::Stomp,
        Self::AirDive,
        Self::Hurt,
        Self::Die,
    ];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// A machine with every player state registered.
pub fn player_machine() -> StateMachine<Player> {
    use PlayerStateId as Id;

    StateMachine::new()
        .with(Id::Idle, Idle)
        .with(Id::Walk, Walk)
        .with(Id::Brake, Brake)
        .with(Id::Crouch, Crouch)
        .with(Id::Fall, Fall)
        .with(Id::Glide, Glide)
        .with(Id::Swim, Swim)
        .with(Id::PoleClimbing, PoleClimbing::default())
        .with(Id::WallDrag, WallDrag)
        .with(Id::LedgeHanging, LedgeHanging::default())
        .with(Id::LedgeClimbing, LedgeClimbing::default())
        .with(Id::Dash, Dash)
        .with(Id::Backflip, Backflip)
        .with(Id::Spin, Spin)
        .with(Id::Stomp, Stomp::default())
        .with(Id::AirDive, AirDive)
        .with(Id::Hurt, Hurt)
        .with(Id::Die, Die)
}
