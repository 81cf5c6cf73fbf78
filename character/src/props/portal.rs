use collision::{ColliderId, ColliderInfo, Vec3};
use log::debug;

use super::{ContactListener, ContactReaction, ContactSubject, PropEvent, WorldEdit};
use crate::{
    body::Pose,
    math::{forward, planar_direction, up},
    pipeline::Frame,
};

/// Where a portal sends the player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortalExit {
    pub collider: ColliderId,
    pub position: Vec3,
    pub forward: Vec3,
    /// Distance the player is placed in front of the exit.
    pub offset: f32,
}

impl PortalExit {
    pub fn new(collider: ColliderId, pose: Pose) -> Self {
        Self {
            collider,
            position: pose.position,
            forward: planar_direction(forward(pose.rotation)),
            offset: 1.0,
        }
    }
}

/// Trigger teleporting the player that walks in to its exit.
///
/// The player keeps its height above the portal and its lateral speed, now heading along the
/// exit's forward (or backward, when the stick points away from it).
#[derive(Clone, Debug)]
pub struct Portal {
    pub collider: ColliderId,
    pub exit: Option<PortalExit>,
    occupied: bool,
    touched: bool,
    events: Vec<PropEvent>,
}

impl Portal {
    pub fn new(collider: ColliderId, exit: Option<PortalExit>) -> Self {
        Self {
            collider,
            exit,
            occupied: false,
            touched: false,
            events: Vec::new(),
        }
    }

    /// Two portals leading into each other.
    pub fn pair(a: ColliderId, a_pose: Pose, b: ColliderId, b_pose: Pose) -> (Portal, Portal) {
        (
            Portal::new(a, Some(PortalExit::new(b, b_pose))),
            Portal::new(b, Some(PortalExit::new(a, a_pose))),
        )
    }
}

impl ContactListener for Portal {
    fn on_actor_contact(
        &mut self,
        subject: &ContactSubject,
        own: &ColliderInfo,
        _frame: &Frame,
    ) -> Option<ContactReaction> {
        if !subject.is_player() {
            return None;
        }
        self.touched = true;
        if self.occupied {
            return None;
        }
        self.occupied = true;
        let exit = self.exit?;

        let height = subject.unsized_position.y - own.translation.y;
        debug!("portal {:?} -> {:?}", self.collider, exit.collider);
        self.events.push(PropEvent::Teleported {
            from: self.collider,
            to: exit.collider,
        });
        Some(ContactReaction::Teleport {
            position: exit.position + up() * height,
            forward: exit.forward,
            offset: exit.offset,
        })
    }

    fn advance(&mut self, _dt: f32, _time: f32, _edits: &mut Vec<WorldEdit>) {
        if !self.touched {
            self.occupied = false;
        }
        self.touched = false;
    }

    fn drain_events(&mut self, out: &mut Vec<PropEvent>) {
        out.append(&mut self.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        body::Body,
        capsule::Capsule,
        props::ActorKind,
        testing::{ScriptedWorld, info},
    };
    use collision::{Bounds, Quat};

    fn gate() -> ColliderInfo {
        info(6, Bounds::new(Vec3::new(-1.0, 0.0, -0.1), Vec3::new(1.0, 3.0, 0.1)))
    }

    fn rest() -> Pose {
        Pose {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }

    #[test]
    fn teleport_keeps_height_and_fires_once_per_entry() {
        let world = ScriptedWorld::default();
        let frame = Frame {
            dt: 0.1,
            time: 0.0,
            world: &world,
        };
        let own = gate();
        let exit_pose = Pose {
            position: Vec3::new(10.0, 5.0, 0.0),
            rotation: Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2),
        };
        let (mut portal, _) = Portal::pair(own.id, rest(), ColliderId(7), exit_pose);

        let body = Body::new(Vec3::new(0.0, 0.0, 0.0), Capsule::new(2.0, 0.5));
        let player = ContactSubject::new(&body, ActorKind::Player, true);
        let reaction = portal.on_actor_contact(&player, &own, &frame);
        let Some(ContactReaction::Teleport {
            position,
            forward,
            offset,
        }) = reaction
        else {
            panic!("expected a teleport, got {reaction:?}");
        };
        // The capsule center sits half a meter below the gate's center.
        assert!((position - Vec3::new(10.0, 5.0 - 0.5, 0.0)).norm() < 1.0e-5);
        assert!((forward - Vec3::x()).norm() < 1.0e-5);
        assert_eq!(offset, 1.0);

        // Still touching next tick: no second teleport.
        let mut edits = Vec::new();
        portal.advance(0.1, 0.2, &mut edits);
        assert_eq!(portal.on_actor_contact(&player, &own, &frame), None);

        // Left and came back.
        portal.advance(0.1, 0.3, &mut edits);
        portal.advance(0.1, 0.4, &mut edits);
        assert!(portal.on_actor_contact(&player, &own, &frame).is_some());

        let mut events = Vec::new();
        portal.drain_events(&mut events);
        let hop = PropEvent::Teleported {
            from: own.id,
            to: ColliderId(7),
        };
        assert_eq!(events, vec![hop, hop]);
    }

    #[test]
    fn portal_without_exit_or_for_enemies_does_nothing() {
        let world = ScriptedWorld::default();
        let frame = Frame {
            dt: 0.1,
            time: 0.0,
            world: &world,
        };
        let own = gate();
        let body = Body::new(Vec3::zeros(), Capsule::new(2.0, 0.5));

        let mut dead_end = Portal::new(own.id, None);
        let player = ContactSubject::new(&body, ActorKind::Player, true);
        assert_eq!(dead_end.on_actor_contact(&player, &own, &frame), None);

        let (mut portal, _) = Portal::pair(own.id, rest(), ColliderId(7), rest());
        let enemy = ContactSubject::new(&body, ActorKind::Enemy, true);
        assert_eq!(portal.on_actor_contact(&enemy, &own, &frame), None);
    }
}
