use collision::ColliderInfo;

use super::{ContactListener, ContactReaction, ContactSubject};
use crate::pipeline::Frame;

/// Launches a living player that lands on top of it.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    pub force: f32,
}

impl Default for Spring {
    fn default() -> Self {
        Self { force: 25.0 }
    }
}

impl ContactListener for Spring {
    fn on_actor_contact(
        &mut self,
        subject: &ContactSubject,
        own: &ColliderInfo,
        _frame: &Frame,
    ) -> Option<ContactReaction> {
        (subject.is_player() && subject.is_point_under_step(own.bounds.max))
            .then_some(ContactReaction::Launch { vertical: self.force })
    }
}
