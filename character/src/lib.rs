/*!
Kinematic platformer characters.

Actors are capsules moved by intended velocity against a read-only shape-query world
(`collision`). Each frame runs the same pipeline for every actor kind; per-kind behavior lives
in states driven by a small state machine.

- body:      capsule pose, velocity and the motion primitives
- capsule:   capsule dimensions and resizing
- ground:    ground detection, landing and leaving the ground
- contacts:  contact dispatch and penetration correction
- pipeline:  the per-frame update and the `MotionHost` hook trait
- fsm:       state ids, status and the state machine
- player:    the player actor and its states
- enemy:     the enemy actor, its states and patrol route
- props:     contact-aware level props (springs, hazards, falling platforms, poles, portals,
             volumes, breakables)
- hitbox:    player attack volumes
- level:     ticks props, the player and enemies in order
- health, input, stats, events, settings, math: supporting pieces
*/

pub mod body;
pub mod capsule;
pub mod contacts;
pub mod enemy;
pub mod events;
pub mod fsm;
pub mod ground;
pub mod health;
pub mod hitbox;
pub mod input;
pub mod level;
pub mod math;
pub mod pipeline;
pub mod player;
pub mod props;
pub mod settings;
pub mod stats;

#[cfg(test)]
pub(crate) mod testing;

pub use body::{Body, Pose};
pub use capsule::Capsule;
pub use enemy::{Enemy, EnemyStateId, EnemyStats, WaypointMode, Waypoints};
pub use events::{Event, Events};
pub use fsm::{State, StateId, StateMachine, StateStatus};
pub use health::Health;
pub use input::{Action, InputFrame, PlayerInput};
pub use level::{Level, LevelEvent};
pub use pipeline::{Frame, MotionHost, update};
pub use player::{Player, PlayerStateId, PlayerStats};
pub use props::{
    Breakable, ContactListener, ContactReaction, FallingPlatform, Hazard, Listeners, Pole, Portal,
    PortalExit, PropEvent, Spring, Volume,
};
