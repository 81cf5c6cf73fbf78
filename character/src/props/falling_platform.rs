use collision::{ColliderId, ColliderInfo, Quat, Vec3};
use log::debug;

use super::{ActorKind, ContactListener, ContactReaction, ContactSubject, WorldEdit};
use crate::{math::up, pipeline::Frame};

/// Where a falling platform is in its shake, fall and reset routine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PlatformPhase {
    Idle,
    /// Counting down to the fall; shakes during the last half.
    Shaking { timer: f32 },
    /// Falling as a trigger until the reset delay has passed.
    Falling { elapsed: f32 },
}

/// Platform that shakes, then falls a while after a player steps on it.
#[derive(Clone, Debug)]
pub struct FallingPlatform {
    pub collider: ColliderId,
    pub auto_reset: bool,
    pub fall_delay: f32,
    pub reset_delay: f32,
    pub fall_gravity: f32,
    pub shake: bool,
    pub shake_speed: f32,
    pub shake_height: f32,
    initial: Vec3,
    rotation: Quat,
    position: Vec3,
    phase: PlatformPhase,
}

impl FallingPlatform {
    pub fn new(collider: ColliderId, position: Vec3, rotation: Quat) -> Self {
        Self {
            collider,
            auto_reset: true,
            fall_delay: 2.0,
            reset_delay: 5.0,
            fall_gravity: 40.0,
            shake: true,
            shake_speed: 45.0,
            shake_height: 0.1,
            initial: position,
            rotation,
            position,
            phase: PlatformPhase::Idle,
        }
    }

    #[inline]
    pub fn phase(&self) -> PlatformPhase {
        self.phase
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Cancel the routine and put the platform back where it started.
    pub fn restart(&mut self, edits: &mut Vec<WorldEdit>) {
        self.phase = PlatformPhase::Idle;
        self.position = self.initial;
        edits.push(self.move_edit());
        edits.push(WorldEdit::SetTrigger {
            collider: self.collider,
            is_trigger: false,
        });
    }

    fn move_edit(&self) -> WorldEdit {
        WorldEdit::Move {
            collider: self.collider,
            translation: self.position,
            rotation: self.rotation,
        }
    }
}

impl ContactListener for FallingPlatform {
    fn on_actor_contact(
        &mut self,
        subject: &ContactSubject,
        own: &ColliderInfo,
        _frame: &Frame,
    ) -> Option<ContactReaction> {
        if subject.kind == ActorKind::Player
            && subject.is_point_under_step(own.bounds.max)
            && self.phase == PlatformPhase::Idle
        {
            debug!("falling platform {:?} activated", self.collider);
            self.phase = PlatformPhase::Shaking {
                timer: self.fall_delay,
            };
        }
        None
    }

    fn advance(&mut self, dt: f32, time: f32, edits: &mut Vec<WorldEdit>) {
        match self.phase {
            PlatformPhase::Idle => {}
            PlatformPhase::Shaking { timer } => {
                if self.shake && timer <= self.fall_delay * 0.5 {
                    let offset = (time * self.shake_speed).sin() * self.shake_height;
                    self.position = self.initial + up() * offset;
                    edits.push(self.move_edit());
                }
                let timer = timer - dt;
                if timer < 0.0 {
                    debug!("falling platform {:?} falls", self.collider);
                    self.phase = PlatformPhase::Falling { elapsed: 0.0 };
                    edits.push(WorldEdit::SetTrigger {
                        collider: self.collider,
                        is_trigger: true,
                    });
                } else {
                    self.phase = PlatformPhase::Shaking { timer };
                }
            }
            PlatformPhase::Falling { elapsed } => {
                self.position -= up() * self.fall_gravity * dt;
                edits.push(self.move_edit());
                let elapsed = elapsed + dt;
                if self.auto_reset && elapsed >= self.reset_delay {
                    debug!("falling platform {:?} reset", self.collider);
                    self.restart(edits);
                } else {
                    self.phase = PlatformPhase::Falling { elapsed };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{body::Body, capsule::Capsule, testing::{ScriptedWorld, info}};
    use collision::Bounds;

    fn activate(platform: &mut FallingPlatform) {
        let world = ScriptedWorld::default();
        let frame = Frame {
            dt: 0.1,
            time: 0.0,
            world: &world,
        };
        let own = info(1, Bounds::new(Vec3::new(-1.0, -0.2, -1.0), Vec3::new(1.0, 0.0, 1.0)));
        let standing = Body::new(Vec3::zeros(), Capsule::new(2.0, 0.5));
        let subject = ContactSubject::new(&standing, ActorKind::Player, true);
        assert_eq!(platform.on_actor_contact(&subject, &own, &frame), None);
    }

    #[test]
    fn shakes_then_falls_then_resets() {
        let mut platform = FallingPlatform::new(ColliderId(1), Vec3::zeros(), Quat::identity());
        activate(&mut platform);
        assert!(matches!(platform.phase(), PlatformPhase::Shaking { .. }));

        let mut edits = Vec::new();
        let mut time = 0.0;
        // 2 s delay at 0.25 s steps: the timer goes negative on the 9th step.
        for _ in 0..9 {
            time += 0.25;
            platform.advance(0.25, time, &mut edits);
        }
        assert_eq!(platform.phase(), PlatformPhase::Falling { elapsed: 0.0 });
        assert!(edits.contains(&WorldEdit::SetTrigger {
            collider: ColliderId(1),
            is_trigger: true
        }));

        edits.clear();
        platform.advance(0.25, time + 0.25, &mut edits);
        assert!(platform.position().y < -9.0);

        for _ in 0..19 {
            platform.advance(0.25, time, &mut edits);
        }
        assert_eq!(platform.phase(), PlatformPhase::Idle);
        assert_eq!(platform.position(), Vec3::zeros());
    }

    #[test]
    fn second_contact_does_not_restart_routine() {
        let mut platform = FallingPlatform::new(ColliderId(1), Vec3::zeros(), Quat::identity());
        activate(&mut platform);
        let mut edits = Vec::new();
        platform.advance(0.5, 0.5, &mut edits);
        activate(&mut platform);
        assert_eq!(platform.phase(), PlatformPhase::Shaking { timer: 1.5 });
    }
}
