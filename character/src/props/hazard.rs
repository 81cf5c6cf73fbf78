use collision::ColliderInfo;

use super::{ActorKind, ContactListener, ContactReaction, ContactSubject};
use crate::pipeline::Frame;

/// Damages players touching it. Trigger hazards are reported through the player's trigger
/// pass, solid ones through contact resolution.
#[derive(Clone, Copy, Debug)]
pub struct Hazard {
    pub damage: u32,
    /// Only hurt players landing on it from above.
    pub damage_only_from_above: bool,
}

impl Default for Hazard {
    fn default() -> Self {
        Self {
            damage: 1,
            damage_only_from_above: false,
        }
    }
}

impl ContactListener for Hazard {
    fn on_actor_contact(
        &mut self,
        subject: &ContactSubject,
        own: &ColliderInfo,
        _frame: &Frame,
    ) -> Option<ContactReaction> {
        if subject.kind != ActorKind::Player {
            return None;
        }
        let from_above =
            subject.velocity.y <= 0.0 && subject.is_point_under_step(own.bounds.max);
        (!self.damage_only_from_above || from_above).then_some(ContactReaction::Damage {
            amount: self.damage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        body::Body,
        capsule::Capsule,
        testing::{ScriptedWorld, info},
    };
    use collision::{Bounds, Vec3};

    #[test]
    fn from_above_hazard_ignores_side_contacts() {
        let world = ScriptedWorld::default();
        let frame = Frame {
            dt: 0.1,
            time: 0.0,
            world: &world,
        };
        let spikes = info(9, Bounds::new(Vec3::new(-1.0, -0.5, -1.0), Vec3::new(1.0, 0.5, 1.0)));
        let mut hazard = Hazard {
            damage: 2,
            damage_only_from_above: true,
        };

        let side = Body::new(Vec3::new(1.5, -0.5, 0.0), Capsule::new(2.0, 0.5));
        let subject = ContactSubject::new(&side, ActorKind::Player, true);
        assert_eq!(hazard.on_actor_contact(&subject, &spikes, &frame), None);

        let top = Body::new(Vec3::new(0.0, 0.5, 0.0), Capsule::new(2.0, 0.5));
        let subject = ContactSubject::new(&top, ActorKind::Player, true);
        assert_eq!(
            hazard.on_actor_contact(&subject, &spikes, &frame),
            Some(ContactReaction::Damage { amount: 2 })
        );

        hazard.damage_only_from_above = false;
        let subject = ContactSubject::new(&side, ActorKind::Player, true);
        assert!(hazard.on_actor_contact(&subject, &spikes, &frame).is_some());
    }
}
