//! Typed notifications emitted by actors.
//!
//! Every actor owns an [`Events`] outbox. The core pushes one event per edge (ground entered,
//! dash started...) and consumers drain the outbox once per tick.

use collision::{ColliderId, Vec3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    GroundEntered,
    GroundExited,
    Jumped,
    Damaged { amount: u32 },
    Died,
    Spin,
    PickedUp(ColliderId),
    Thrown {
        collider: ColliderId,
        direction: Vec3,
        force: f32,
    },
    AirDive,
    Backflip,
    DashStarted,
    DashEnded,
    LedgeGrabbed,
    LedgeClimbing,
    /// Force applied to a pushable rigid body, for the physics side to consume.
    Pushed { collider: ColliderId, force: Vec3 },
    PlayerSpotted,
    PlayerEscaped,
    PlayerContact,
}

#[derive(Debug, Default)]
pub struct Events {
    queue: Vec<Event>,
}

impl Events {
    #[inline]
    pub fn push(&mut self, event: Event) {
        self.queue.push(event);
    }

    /// Take every pending event, oldest first.
    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.queue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.queue.iter()
    }

    pub fn count(&self, event: Event) -> usize {
        self.queue.iter().filter(|e| **e == event).count()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
