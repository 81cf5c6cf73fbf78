//! Player actions. Each one checks its own preconditions and is a no-op when they fail.

use collision::{ColliderId, ColliderInfo, Hit, Layer, ShapeQueries, Tag, TriggerPolicy, Vec3};
use log::{debug, info};

use super::{Player, PlayerStateId, WaterVolume};
use crate::{events::Event, math::up, pipeline::Frame, props::Pole, settings::WALL_PROBE_DISTANCE};

impl Player {
    // --- Motion ---

    /// Accelerate with the run or walk tuning on ground, air acceleration otherwise.
    /// Releasing run clamps the lateral speed back to the walking top speed.
    pub fn accelerate(&mut self, direction: Vec3, dt: f32) {
        let s = self.stats();
        let grounded = self.body.ground.grounded;
        let running = self.input.run();
        let (turning_drag, acceleration) = if grounded && running {
            (s.running_turning_drag, s.running_acceleration)
        } else {
            (s.turning_drag, s.acceleration)
        };
        let acceleration = if grounded { acceleration } else { s.air_acceleration };
        let top_speed = if running { s.running_top_speed } else { s.top_speed };

        self.body.accelerate(direction, turning_drag, acceleration, top_speed, dt);
        if self.input.run_up() {
            self.body.clamp_lateral_speed(top_speed);
        }
    }

    #[inline]
    pub fn accelerate_to_input(&mut self, dt: f32) {
        let direction = self.input.movement_camera_direction();
        self.accelerate(direction, dt);
    }

    pub fn water_accelerate(&mut self, direction: Vec3, dt: f32) {
        let s = self.stats();
        self.body
            .accelerate(direction, s.water_turning_drag, s.swim_acceleration, s.swim_top_speed, dt);
    }

    pub fn crawl_accelerate(&mut self, direction: Vec3, dt: f32) {
        let s = self.stats();
        self.body.accelerate(
            direction,
            s.crawling_turning_speed,
            s.crawling_acceleration,
            s.crawling_top_speed,
            dt,
        );
    }

    pub fn backflip_accelerate(&mut self, dt: f32) {
        let s = self.stats();
        let direction = self.input.movement_camera_direction();
        self.body.accelerate(
            direction,
            s.backflip_turning_drag,
            s.backflip_air_acceleration,
            s.backflip_top_speed,
            dt,
        );
    }

    #[inline]
    pub fn decelerate(&mut self, dt: f32) {
        let rate = self.stats().deceleration;
        self.body.decelerate(rate, dt);
    }

    /// Ground friction, weaker on sloping ground.
    pub fn friction(&mut self, frame: &Frame) {
        let s = self.stats();
        let rate = if self.body.on_sloping_ground(frame.world) {
            s.slope_friction
        } else {
            s.friction
        };
        self.body.decelerate(rate, frame.dt);
    }

    #[inline]
    pub fn gravity(&mut self, dt: f32) {
        let s = self.stats();
        self.body
            .asymmetric_gravity(s.gravity, s.fall_gravity, s.gravity_top_speed, dt);
    }

    #[inline]
    pub fn snap_to_ground(&mut self) {
        let force = self.stats().snap_force;
        self.body.snap_to_ground(force);
    }

    pub fn regular_slope_factor(&mut self, frame: &Frame) {
        let s = self.stats();
        self.body.slope_factor(
            frame.world,
            s.slope_upward_force,
            s.slope_downward_force,
            frame.dt,
        );
    }

    #[inline]
    pub fn face_direction_smooth(&mut self, direction: Vec3, dt: f32) {
        let speed = self.stats().rotation_speed;
        self.body.face_direction_smooth(direction, speed, dt);
    }

    #[inline]
    pub fn water_face_direction(&mut self, direction: Vec3, dt: f32) {
        let speed = self.stats().water_rotation_speed;
        self.body.face_direction_smooth(direction, speed, dt);
    }

    // --- Jumping ---

    pub fn fall(&mut self) {
        if !self.body.ground.grounded {
            self.status.change(PlayerStateId::Fall);
        }
    }

    /// Jump on a buffered press when grounded, inside the coyote window, or with multi-jumps
    /// left. Releasing jump early cuts the ascent to the minimum jump height.
    pub fn jump(&mut self, frame: &Frame) {
        let s = self.stats();
        let can_multi_jump = self.jump_count > 0 && self.jump_count < s.multi_jumps;
        let can_coyote_jump = self.jump_count == 0
            && frame.time < self.body.ground.last_exit_time + s.coyote_jump_threshold;
        let hold_jump = self.holding.is_none() || s.can_jump_while_holding;

        if (self.body.ground.grounded || can_multi_jump || can_coyote_jump)
            && hold_jump
            && self.input.jump_down()
        {
            self.jump_with(s.max_jump_height);
        }

        if self.input.jump_up() && self.jump_count > 0 && self.body.velocity.y > s.min_jump_height {
            self.body.set_vertical_speed(s.min_jump_height);
        }
    }

    /// Launch upwards at `height` m/s and go to Fall.
    pub fn jump_with(&mut self, height: f32) {
        self.jump_count += 1;
        self.body.set_vertical_speed(height);
        self.status.change(PlayerStateId::Fall);
        self.events.push(Event::Jumped);
    }

    pub fn directional_jump(&mut self, direction: Vec3, height: f32, distance: f32) {
        self.jump_count += 1;
        self.body.set_vertical_speed(height);
        self.body.set_lateral_velocity(direction * distance);
        self.events.push(Event::Jumped);
    }

    #[inline]
    pub fn reset_jumps(&mut self) {
        self.jump_count = 0;
    }

    #[inline]
    pub fn set_jumps(&mut self, amount: u32) {
        self.jump_count = amount;
    }

    #[inline]
    pub fn reset_air_spins(&mut self) {
        self.air_spin_count = 0;
    }

    #[inline]
    pub fn reset_air_dash(&mut self) {
        self.air_dash_count = 0;
    }

    // --- Abilities ---

    pub fn spin(&mut self) {
        let s = self.stats();
        let grounded = self.body.ground.grounded;
        let can_air_spin = (grounded || s.can_air_spin) && self.air_spin_count < s.allowed_air_spins;
        if s.can_spin && can_air_spin && self.holding.is_none() && self.input.spin_down() {
            if !grounded {
                self.air_spin_count += 1;
            }
            self.status.change(PlayerStateId::Spin);
            self.events.push(Event::Spin);
        }
    }

    /// Pick up the pickable in front, or throw the one being held.
    pub fn pick_and_throw(&mut self, frame: &Frame) {
        let s = self.stats();
        if !s.can_pick_up || !self.input.pick_and_drop_down() {
            return;
        }
        if self.holding.is_some() {
            self.throw();
            return;
        }
        let forward = self.body.forward();
        let target = self
            .body
            .capsule_cast(frame.world, forward, s.pick_distance, self.body.layers)
            .and_then(|hit| frame.world.collider(hit.collider))
            .filter(|info| info.tags.has(Tag::Pickable));
        if let Some(info) = target {
            self.pick_up(info.id);
        }
    }

    pub fn pick_up(&mut self, pickable: ColliderId) {
        let s = self.stats();
        if self.holding.is_none() && (self.body.ground.grounded || s.can_pick_up_in_air) {
            self.holding = Some(pickable);
            self.events.push(Event::PickedUp(pickable));
        }
    }

    /// Release the held pickable forward, with a force scaled by the lateral speed.
    pub fn throw(&mut self) {
        let Some(collider) = self.holding.take() else {
            return;
        };
        let force = self.body.lateral_velocity().norm() * self.stats().throw_velocity_multiplier;
        self.events.push(Event::Thrown {
            collider,
            direction: self.body.forward(),
            force,
        });
    }

    /// Forget a pickable that was respawned or destroyed while held.
    pub fn remove_pickable(&mut self, pickable: ColliderId) {
        if self.holding == Some(pickable) {
            self.holding = None;
        }
    }

    pub fn air_dive(&mut self) {
        let s = self.stats();
        if s.can_air_dive
            && !self.body.ground.grounded
            && self.holding.is_none()
            && self.input.air_dive_down()
        {
            self.status.change(PlayerStateId::AirDive);
            self.events.push(Event::AirDive);
        }
    }

    pub fn stomp_attack(&mut self) {
        let s = self.stats();
        if s.can_stomp_attack
            && !self.body.ground.grounded
            && self.holding.is_none()
            && self.input.stomp_down()
        {
            self.status.change(PlayerStateId::Stomp);
        }
    }

    /// Grab a ledge in reach while falling. Round colliders (actors, poles) are never ledges.
    pub fn ledge_grab(&mut self, frame: &Frame) {
        let s = self.stats();
        if !s.can_ledge_hang
            || self.body.velocity.y >= 0.0
            || self.holding.is_some()
            || !self.status.contains(PlayerStateId::LedgeHanging)
        {
            return;
        }
        let Some(hit) = self.detecting_ledge(
            frame.world,
            s.ledge_max_forward_distance,
            s.ledge_max_downward_distance,
        ) else {
            return;
        };
        let Some(ledge) = frame.world.collider(hit.collider) else {
            return;
        };
        if ledge.layer == Layer::Actor || ledge.tags.has(Tag::Pole) {
            return;
        }

        let reach = self.body.forward() * (self.body.capsule.radius + s.ledge_max_forward_distance);
        let hang = hit.point - reach - up() * self.body.capsule.height * 0.5;
        self.body.velocity = Vec3::zeros();
        self.body.set_position(hang);
        if ledge.tags.has(Tag::Platform) {
            self.body.attach(&ledge);
        } else {
            self.body.detach();
        }
        self.status.change(PlayerStateId::LedgeHanging);
        self.events.push(Event::LedgeGrabbed);
    }

    /// Jump backwards with `force` m/s of lateral speed.
    pub fn backflip(&mut self, force: f32) {
        let s = self.stats();
        if s.can_backflip && self.holding.is_none() {
            self.body.set_vertical_speed(s.backflip_jump_height);
            self.body.set_lateral_velocity(-self.body.forward() * force);
            self.status.change(PlayerStateId::Backflip);
            self.events.push(Event::Backflip);
        }
    }

    /// Dash on the ground after the cooldown, or in the air while air dashes remain.
    pub fn dash(&mut self, frame: &Frame) {
        let s = self.stats();
        let grounded = self.body.ground.grounded;
        let can_air_dash = s.can_air_dash && !grounded && self.air_dash_count < s.allowed_air_dashes;
        let cooled_down = self
            .last_dash_time
            .is_none_or(|last| frame.time - last > s.ground_dash_cool_down);
        let can_ground_dash = s.can_ground_dash && grounded && cooled_down;

        if self.input.dash_down() && (can_air_dash || can_ground_dash) {
            if !grounded {
                self.air_dash_count += 1;
            }
            self.last_dash_time = Some(frame.time);
            self.status.change(PlayerStateId::Dash);
        }
    }

    /// Start gliding while descending with glide held.
    pub fn glide(&mut self) {
        let s = self.stats();
        if s.can_glide
            && !self.body.ground.grounded
            && self.body.velocity.y < 0.0
            && self.input.glide()
        {
            self.status.change(PlayerStateId::Glide);
        }
    }

    // --- Contact reactions ---

    /// Slide down a wall touched while descending, unless a ledge is within reach.
    pub fn wall_drag(&mut self, frame: &Frame, other: &ColliderInfo) {
        let s = self.stats();
        if !s.can_wall_drag
            || self.body.velocity.y > 0.0
            || self.holding.is_some()
            || other.tags.has(Tag::Pushable)
        {
            return;
        }
        let forward = self.body.forward();
        let Some(wall) =
            self.body
                .capsule_cast(frame.world, forward, WALL_PROBE_DISTANCE, s.wall_drag_layers)
        else {
            return;
        };
        let height = self.body.capsule.height;
        if self
            .detecting_ledge(frame.world, WALL_PROBE_DISTANCE, height)
            .is_none()
        {
            self.last_wall_normal = wall.normal;
            self.status.change(PlayerStateId::WallDrag);
        }
    }

    pub fn grab_pole(&mut self, other: &ColliderInfo) {
        let s = self.stats();
        if s.can_pole_climb
            && self.body.velocity.y <= 0.0
            && self.holding.is_none()
            && other.tags.has(Tag::Pole)
        {
            self.pole = Some(Pole::from_collider(other));
            self.status.change(PlayerStateId::PoleClimbing);
        }
    }

    /// Push a pushable body the player walks into (not one it stands on).
    pub fn push_rigidbody(&mut self, other: &ColliderInfo) {
        if !self.body.is_point_under_step(other.bounds.max) && other.tags.has(Tag::Pushable) {
            let force = self.body.lateral_velocity() * self.stats().push_force;
            self.events.push(Event::Pushed {
                collider: other.id,
                force,
            });
        }
    }

    /// Ray down from just above the head, `forward_distance` past the capsule front.
    pub fn detecting_ledge(
        &self,
        world: &dyn ShapeQueries,
        forward_distance: f32,
        downward_distance: f32,
    ) -> Option<Hit> {
        let body = &self.body;
        let reach = body.capsule.radius + forward_distance;
        let origin = body.position() + up() * body.capsule.height * 0.5 + body.forward() * reach;
        let filter = body
            .filter()
            .with_layers(self.stats().ledge_hanging_layers)
            .with_triggers(TriggerPolicy::Ignore);
        world.raycast(origin, -up(), downward_distance, filter)
    }

    /// Room above a shrunk capsule to grow back to full height.
    pub fn can_stand_up(&self, world: &dyn ShapeQueries) -> bool {
        let body = &self.body;
        let missing = body.capsule.original_height() - body.capsule.height;
        if missing <= 0.0 {
            return true;
        }
        let (_, top) = body.segment();
        world
            .sphere_cast(top, body.capsule.radius, up(), missing, body.filter())
            .is_none()
    }

    // --- Health ---

    /// Take damage unless dead or recovering: knockback, Hurt (on land), and death when
    /// health runs out.
    pub fn apply_damage(&mut self, amount: u32, frame: &Frame) {
        if self.health.is_empty() || self.health.recovering(frame.time) {
            return;
        }
        let s = self.stats();
        self.health.damage(amount, frame.time);
        self.body
            .set_lateral_velocity(-self.body.forward() * s.hurt_backwards_force);

        if !self.on_water() {
            self.body.set_vertical_speed(s.hurt_upward_force);
            self.status.change(PlayerStateId::Hurt);
        }

        debug!("player damaged by {amount}, health {}", self.health.current());
        self.events.push(Event::Damaged { amount });

        if self.health.is_empty() {
            self.throw();
            info!("player died");
            self.events.push(Event::Died);
        }
    }

    /// Empty the health outright.
    pub fn die(&mut self) {
        if self.health.is_empty() {
            return;
        }
        self.health.set(0);
        self.throw();
        info!("player died");
        self.events.push(Event::Died);
        if self.status.contains(PlayerStateId::Die) {
            self.status.change(PlayerStateId::Die);
        }
    }

    // --- Water ---

    pub fn enter_water(&mut self, volume: &ColliderInfo) {
        if self.on_water() || self.health.is_empty() {
            return;
        }
        self.throw();
        self.water = Some(WaterVolume {
            collider: volume.id,
            bounds: volume.bounds,
        });
        self.status.change(PlayerStateId::Swim);
    }

    #[inline]
    pub fn exit_water(&mut self) {
        self.water = None;
    }
}
