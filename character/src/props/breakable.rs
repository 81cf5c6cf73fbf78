use collision::{ColliderId, ColliderInfo};
use log::debug;

use super::{ContactListener, ContactReaction, ContactSubject, PropEvent, WorldEdit};
use crate::{hitbox::Hitbox, pipeline::Frame};

/// Solid object destroyed by the first object-breaking hitbox that reaches it.
#[derive(Clone, Debug)]
pub struct Breakable {
    pub collider: ColliderId,
    broken: bool,
    events: Vec<PropEvent>,
}

impl Breakable {
    pub fn new(collider: ColliderId) -> Self {
        Self {
            collider,
            broken: false,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Break once: the collider leaves the world and a single event is queued.
    pub fn shatter(&mut self, edits: &mut Vec<WorldEdit>) {
        if self.broken {
            return;
        }
        self.broken = true;
        debug!("breakable {:?} broken", self.collider);
        edits.push(WorldEdit::Remove {
            collider: self.collider,
        });
        self.events.push(PropEvent::Broken {
            collider: self.collider,
        });
    }
}

impl ContactListener for Breakable {
    fn on_actor_contact(
        &mut self,
        _subject: &ContactSubject,
        _own: &ColliderInfo,
        _frame: &Frame,
    ) -> Option<ContactReaction> {
        None
    }

    fn on_hitbox(&mut self, hitbox: &Hitbox, edits: &mut Vec<WorldEdit>) {
        if hitbox.break_objects {
            self.shatter(edits);
        }
    }

    fn drain_events(&mut self, out: &mut Vec<PropEvent>) {
        out.append(&mut self.events);
    }
}
