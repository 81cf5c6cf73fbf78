/*!
Shape-query and sweep tolerances.

These constants centralize the parameters used by the capsule mover and the query world.
Keeping them together makes tuning easier and keeps behavior identical across platforms.

Notes
- Distances are in meters.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Separation kept from surfaces when sliding (meters).
/// Matches the character skin width so sweeps and overlap offsets agree.
pub const DEFAULT_SKIN: f32 = 0.005;

/// Extra margin added to overlap queries that look for touching colliders (meters).
pub const DEFAULT_CONTACT_OFFSET: f32 = 0.01;

/// Maximum number of slide iterations per kinematic step.
/// Higher values help with tight corners at the cost of more queries.
pub const DEFAULT_MAX_ITERATIONS: u32 = 4;

/// Minimum squared movement threshold to consider a step meaningful (m^2).
/// Movements below this are treated as zero to avoid tiny oscillations.
pub const MIN_MOVE_SQ: f32 = 1.0e-10;

/// Practical small distance for comparisons (meters).
pub const DIST_EPS: f32 = 1.0e-6;

/// Fraction of a horizontal move that must be achieved before a step-up is skipped.
pub const STEP_ACCEPT_FRACTION: f32 = 0.9;

