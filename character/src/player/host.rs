//! Motion-core hooks for the player and its post-update trigger pass.

use collision::{ColliderInfo, Hit, Tag, Vec3};

use super::{Player, PlayerStateId};
use crate::{
    body::{Body, Pose},
    events::Events,
    fsm::StateStatus,
    math::up,
    pipeline::{Frame, MotionHost, overlapping_triggers},
    props::{ActorKind, ContactReaction, Listeners},
    settings::WATER_EXIT_OFFSET,
};

impl MotionHost for Player {
    type Id = PlayerStateId;

    const KIND: ActorKind = ActorKind::Player;

    #[inline]
    fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    #[inline]
    fn status(&self) -> &StateStatus<PlayerStateId> {
        &self.status
    }

    #[inline]
    fn status_mut(&mut self) -> &mut StateStatus<PlayerStateId> {
        &mut self.status
    }

    #[inline]
    fn events_mut(&mut self) -> &mut Events {
        &mut self.events
    }

    fn is_alive(&self) -> bool {
        !self.health.is_empty()
    }

    /// Springs are never ground: the player bounces off them instead.
    fn evaluate_landing(&self, frame: &Frame, hit: &Hit) -> bool {
        let spring = frame
            .world
            .collider(hit.collider)
            .is_some_and(|info| info.tags.has(Tag::Spring));
        self.body.default_landing(hit) && !spring
    }

    fn handle_slope_limit(&mut self, frame: &Frame, hit: &Hit) {
        if self.on_water() {
            return;
        }
        let n = hit.normal;
        let Some(downhill) = n.cross(&n.cross(&up())).try_normalize(f32::EPSILON) else {
            return;
        };
        let slide = self.stats().slide_force;
        self.body.move_by(frame.world, downhill * slide * frame.dt);
    }

    /// Push off the edge the capsule is resting on.
    ///
    /// Not while hanging or climbing: those states place the capsule against the ledge every
    /// step, and the push would drag it off the pinned pose.
    fn handle_high_ledge(&mut self, frame: &Frame, hit: &Hit) {
        let on_ledge = matches!(
            self.status.current(),
            PlayerStateId::LedgeHanging | PlayerStateId::LedgeClimbing
        );
        if self.on_water() || on_ledge {
            return;
        }
        let edge = hit.point - self.body.position();
        let push = edge.cross(&edge.cross(&up()));
        let gravity = self.stats().gravity;
        self.body.move_by(frame.world, push * gravity * frame.dt);
    }

    fn on_ground_enter(&mut self, _frame: &Frame) {
        self.reset_jumps();
        self.reset_air_spins();
        self.reset_air_dash();
    }

    fn apply_reaction(&mut self, frame: &Frame, reaction: ContactReaction) {
        match reaction {
            ContactReaction::Launch { vertical } => self.launch(vertical),
            ContactReaction::Damage { amount } => self.apply_damage(amount, frame),
            ContactReaction::Teleport {
                position,
                forward,
                offset,
            } => self.teleport(position, forward, offset),
        }
    }

    fn on_update(&mut self, frame: &Frame, listeners: &mut Listeners) {
        self.release_ledge_attachment(frame);
        self.handle_triggers(frame, listeners);
    }
}

impl Player {
    /// Spring launch: upward speed when not already rising, one jump spent, air moves restored.
    pub fn launch(&mut self, vertical: f32) {
        if self.body.velocity.y <= 0.0 {
            self.body.set_vertical_speed(vertical);
        }
        self.set_jumps(1);
        self.reset_air_spins();
        self.reset_air_dash();
        self.status.change(PlayerStateId::Fall);
    }

    /// Put the unsized capsule center on `position` and face `forward`, or away from it when
    /// the stick points the other way; then step out by `offset` with the lateral speed turned
    /// to the new heading.
    pub fn teleport(&mut self, position: Vec3, forward: Vec3, offset: f32) {
        self.body.origin += position - self.body.unsized_position();
        let heading = if self.input.movement_camera_direction().dot(&forward) < 0.0 {
            -forward
        } else {
            forward
        };
        self.body.face_direction(heading);
        let forward = self.body.forward();
        self.body.origin += forward * offset;
        let speed = self.body.lateral_velocity().norm();
        self.body.set_lateral_velocity(forward * speed);
        self.body.detach();
    }

    /// Stop riding a released ledge once its delay ran out.
    fn release_ledge_attachment(&mut self, frame: &Frame) {
        if let Some(at) = self.ledge_release_at {
            if frame.time >= at {
                self.ledge_release_at = None;
                if !self.body.ground.grounded {
                    self.body.detach();
                }
            }
        }
    }

    /// Water, kill zones, checkpoints and trigger listeners the player stands in.
    fn handle_triggers(&mut self, frame: &Frame, listeners: &mut Listeners) {
        let triggers = overlapping_triggers(&self.body, frame.world);

        if let Some(water) = self.water {
            if !triggers.iter().any(|t| t.id == water.collider) {
                self.exit_water();
            }
        }

        for other in &triggers {
            if other.tags.has(Tag::Water) {
                self.handle_water(other);
            }
            if other.tags.has(Tag::KillZone) {
                self.die();
            }
            if other.tags.has(Tag::Checkpoint) {
                let base = Vec3::new(other.translation.x, other.bounds.min.y, other.translation.z);
                self.activate_checkpoint(
                    other.id,
                    Pose {
                        position: base,
                        rotation: other.rotation,
                    },
                );
            }
            if let Some(listener) = listeners.get_mut(other.id) {
                let subject = self.contact_subject();
                if let Some(reaction) = listener.on_actor_contact(&subject, other, frame) {
                    self.apply_reaction(frame, reaction);
                }
            }
        }
    }

    fn handle_water(&mut self, volume: &ColliderInfo) {
        match self.water {
            None => {
                if volume.bounds.contains(self.body.unsized_position()) {
                    self.enter_water(volume);
                }
            }
            Some(water) if water.collider == volume.id => {
                let exit_point = self.body.position() - up() * WATER_EXIT_OFFSET;
                if !volume.bounds.contains(exit_point) {
                    self.exit_water();
                }
            }
            Some(_) => {}
        }
    }
}
