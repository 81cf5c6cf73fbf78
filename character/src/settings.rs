/*!
Motion-core and state-machine constants.

Per-actor tuning lives in the stats structs (`PlayerStats`, `EnemyStats`); the values here are
the fixed tolerances every actor shares.

Notes
- Distances are in meters, time in seconds, angles in degrees.
*/

/// Extra distance below the capsule probed by the ground sphere cast.
pub const GROUND_OFFSET: f32 = 0.1;

/// Contact offset of the overlap used by penetration correction (shrinks the capsule).
pub const PENETRATION_OFFSET: f32 = -0.1;

/// Ground steeper than this counts as sloping ground for slope factor and friction.
pub const SLOPING_GROUND_ANGLE: f32 = 20.0;

/// Capsule skin width.
pub const SKIN_WIDTH: f32 = collision::settings::DEFAULT_SKIN;

/// Default maximum step height an actor climbs without treating it as a wall.
pub const DEFAULT_STEP_OFFSET: f32 = 0.3;

/// Default slope limit for landing and standing.
pub const DEFAULT_SLOPE_LIMIT: f32 = 45.0;

/// Upper bound of state transitions applied from one callback chain.
///
/// A chain that keeps requesting changes past this bound is cut with a warning.
pub const MAX_TRANSITIONS_PER_TICK: usize = 8;

/// Slack when comparing time in state against a duration.
///
/// Sums of fixed deltas such as 1/60 are not exact in binary; a state lasting `d` seconds
/// must see the same number of ticks as `d / dt` says.
pub const TIME_EPSILON: f64 = 1.0e-5;

/// Largest simulation step accepted by the level.
///
/// Keeps movement responsive and avoids tunneling after stalls.
pub const MAX_DT: f32 = 0.1;

/// How long a jump press stays buffered.
pub const JUMP_BUFFER: f32 = 0.15;

/// Default duration of a movement-direction lock.
pub const MOVEMENT_LOCK: f32 = 0.25;

/// Stick dead zone applied per axis.
pub const INPUT_DEADZONE: f32 = 0.125;

/// How far below the capsule center the water exit point sits.
pub const WATER_EXIT_OFFSET: f32 = 0.25;

/// Gap kept between the capsule and a climbed pole.
pub const POLE_OFFSET: f32 = 0.01;

/// Delay before a released ledge stops carrying the actor.
pub const LEDGE_PARENT_CLEAR_DELAY: f32 = 0.25;

/// Distance probed in front of the actor for wall drag.
pub const WALL_PROBE_DISTANCE: f32 = 0.25;
