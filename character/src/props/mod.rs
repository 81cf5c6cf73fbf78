/*!
Contact-aware level props.

Any collider may declare itself contact-aware by registering a [`ContactListener`] under its
id. The motion core calls the listener whenever an actor touches the collider; the listener
answers with a one-way [`ContactReaction`] the actor applies to itself. Props never write to
actors directly.

Time-driven props (falling platforms) also advance once per tick and describe the geometry
changes they want as [`WorldEdit`]s, which the level applies to the query world between actor
passes. Player hitboxes reach listeners through [`ContactListener::on_hitbox`].

Props that report something happening (a volume entered, an object broken) queue a
[`PropEvent`]; the level drains them once per tick.
*/

mod breakable;
mod falling_platform;
mod hazard;
mod pole;
mod portal;
mod spring;
mod volume;

use std::collections::BTreeMap;

use collision::{Bounds, ColliderId, ColliderInfo, Quat, Vec3};

use crate::{body::Body, hitbox::Hitbox, pipeline::Frame};

pub use breakable::Breakable;
pub use falling_platform::{FallingPlatform, PlatformPhase};
pub use hazard::Hazard;
pub use pole::Pole;
pub use portal::{Portal, PortalExit};
pub use spring::Spring;
pub use volume::Volume;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Enemy,
}

/// What a listener sees of the actor touching it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactSubject {
    pub kind: ActorKind,
    pub alive: bool,
    pub velocity: Vec3,
    pub position: Vec3,
    /// Capsule center at the original height.
    pub unsized_position: Vec3,
    pub step_position: Vec3,
    pub bounds: Bounds,
}

impl ContactSubject {
    pub fn new(body: &Body, kind: ActorKind, alive: bool) -> Self {
        Self {
            kind,
            alive,
            velocity: body.velocity,
            position: body.position(),
            unsized_position: body.unsized_position(),
            step_position: body.step_position(),
            bounds: body.bounds(),
        }
    }

    #[inline]
    pub fn is_point_under_step(&self, point: Vec3) -> bool {
        self.step_position.y > point.y
    }

    /// A living player.
    #[inline]
    pub fn is_player(&self) -> bool {
        self.kind == ActorKind::Player && self.alive
    }
}

/// One-way signal from a prop to the actor touching it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactReaction {
    /// Launch upwards at `vertical` m/s.
    Launch { vertical: f32 },
    Damage { amount: u32 },
    /// Move the capsule so its unsized center lands on `position`, then step `offset` out
    /// along `forward` keeping the lateral speed.
    Teleport {
        position: Vec3,
        forward: Vec3,
        offset: f32,
    },
}

/// Geometry change requested by a time-driven prop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorldEdit {
    Move {
        collider: ColliderId,
        translation: Vec3,
        rotation: Quat,
    },
    SetTrigger {
        collider: ColliderId,
        is_trigger: bool,
    },
    Remove {
        collider: ColliderId,
    },
}

/// Something a prop reports to whoever drives the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropEvent {
    VolumeEntered { volume: ColliderId },
    VolumeExited { volume: ColliderId },
    Broken { collider: ColliderId },
    Teleported { from: ColliderId, to: ColliderId },
}

pub trait ContactListener {
    /// An actor touches (or stands in) `own`, the listener's collider.
    fn on_actor_contact(
        &mut self,
        subject: &ContactSubject,
        own: &ColliderInfo,
        frame: &Frame,
    ) -> Option<ContactReaction>;

    /// Advance time-driven behavior by `dt`.
    fn advance(&mut self, _dt: f32, _time: f32, _edits: &mut Vec<WorldEdit>) {}

    /// A live player hitbox overlaps the listener's collider.
    fn on_hitbox(&mut self, _hitbox: &Hitbox, _edits: &mut Vec<WorldEdit>) {}

    /// Move queued events into `out`.
    fn drain_events(&mut self, _out: &mut Vec<PropEvent>) {}
}

/// Listeners keyed by the collider they are attached to.
#[derive(Default)]
pub struct Listeners {
    map: BTreeMap<ColliderId, Box<dyn ContactListener>>,
}

impl Listeners {
    pub fn insert(&mut self, id: ColliderId, listener: impl ContactListener + 'static) {
        self.map.insert(id, Box::new(listener));
    }

    pub fn remove(&mut self, id: ColliderId) -> bool {
        self.map.remove(&id).is_some()
    }

    pub fn get_mut(&mut self, id: ColliderId) -> Option<&mut (dyn ContactListener + 'static)> {
        self.map.get_mut(&id).map(|l| l.as_mut())
    }

    pub fn contains(&self, id: ColliderId) -> bool {
        self.map.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Advance every listener in id order and collect their edits.
    pub fn advance(&mut self, dt: f32, time: f32) -> Vec<WorldEdit> {
        let mut edits = Vec::new();
        for listener in self.map.values_mut() {
            listener.advance(dt, time, &mut edits);
        }
        edits
    }

    /// Events of every listener, in id order.
    pub fn drain_events(&mut self) -> Vec<PropEvent> {
        let mut events = Vec::new();
        for listener in self.map.values_mut() {
            listener.drain_events(&mut events);
        }
        events
    }
}
