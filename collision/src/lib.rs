/*!
Shape queries for kinematic characters.

This crate is the physics-facing side of the character engine: a read-only
query capability over level geometry, backed by parry (through rapier's
re-export), plus the capsule sweep-and-slide mover built on top of it.
The code is split for clarity:

- types:     shared data types (Hit, Bounds, CapsuleSpec, etc.)
- flags:     generic bitmask flags, collider layers and gameplay tags
- settings:  sweep and overlap tolerances
- query:     the `ShapeQueries` capability and query filters
- world:     parry-backed collider registry implementing `ShapeQueries`
- kinematic: sweep-and-slide capsule mover with optional step-up
*/

pub mod flags;
pub mod kinematic;
pub mod query;
pub mod settings;
pub mod types;
pub mod world;

// Re-export commonly used types and functions.
pub use flags::{BitmaskFlags, FlagBitmask, Layer, LayerMask, Tag, Tags};
pub use kinematic::{MoveRequest, move_capsule, move_capsule_with_step};
pub use query::{ColliderInfo, QueryFilter, ShapeQueries, TriggerPolicy};
pub use types::{
    Bounds, CapsuleSpec, ColliderId, Contact, Hit, Iso, MoveHit, MoveResult, Penetration, Point,
    Quat, Vec3, iso, up,
};
pub use world::{ColliderDef, ColliderShapeDef, QueryWorld};
