use collision::{ColliderId, ColliderInfo};
use log::trace;

use super::{ActorKind, ContactListener, ContactReaction, ContactSubject, PropEvent, WorldEdit};
use crate::pipeline::Frame;

/// Trigger reporting when the player comes in and goes out.
///
/// Touches are collected during a tick; the next tick's advance decides whether the player
/// left. A player that appears fully inside (spawned or teleported there) enters silently.
#[derive(Clone, Debug)]
pub struct Volume {
    pub collider: ColliderId,
    inside: bool,
    touched: bool,
    events: Vec<PropEvent>,
}

impl Volume {
    pub fn new(collider: ColliderId) -> Self {
        Self {
            collider,
            inside: false,
            touched: false,
            events: Vec::new(),
        }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.inside
    }
}

impl ContactListener for Volume {
    fn on_actor_contact(
        &mut self,
        subject: &ContactSubject,
        own: &ColliderInfo,
        _frame: &Frame,
    ) -> Option<ContactReaction> {
        if subject.kind != ActorKind::Player {
            return None;
        }
        self.touched = true;
        if !self.inside {
            self.inside = true;
            let contained =
                own.bounds.contains(subject.bounds.min) && own.bounds.contains(subject.bounds.max);
            if !contained {
                trace!("volume {:?} entered", self.collider);
                self.events.push(PropEvent::VolumeEntered { volume: self.collider });
            }
        }
        None
    }

    fn advance(&mut self, _dt: f32, _time: f32, _edits: &mut Vec<WorldEdit>) {
        if self.inside && !self.touched {
            self.inside = false;
            trace!("volume {:?} exited", self.collider);
            self.events.push(PropEvent::VolumeExited { volume: self.collider });
        }
        self.touched = false;
    }

    fn drain_events(&mut self, out: &mut Vec<PropEvent>) {
        out.append(&mut self.events);
    }
}
