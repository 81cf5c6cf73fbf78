/*!
The movable part of an actor: pose, velocity, capsule and ground state, plus the motion
primitives every state builds on.

Conventions
- `origin` is the actor's pivot (its feet for a fresh capsule); `position()` is the capsule center.
- Forward is +Z of `rotation`, world up is +Y.
- Every primitive takes `dt` explicitly and acts on one velocity component (lateral or
  vertical), leaving the other untouched.
*/

use collision::{
    Bounds, ColliderId, ColliderInfo, Hit, LayerMask, MoveRequest, MoveResult, QueryFilter, Quat,
    ShapeQueries, TriggerPolicy, Vec3, move_capsule, move_capsule_with_step,
    settings::DEFAULT_CONTACT_OFFSET,
};

use crate::{
    capsule::Capsule,
    ground::GroundState,
    math::{
        angle_from_up, clamp_magnitude, forward, lateral, look_rotation, move_towards,
        planar_direction, right, rotate_towards, up,
    },
    settings::SLOPING_GROUND_ANGLE,
};

/// Scalars applied on top of tuning values, so states can reshape movement temporarily.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Multipliers {
    pub acceleration: f32,
    pub gravity: f32,
    pub top_speed: f32,
    pub turning_drag: f32,
    pub deceleration: f32,
}

impl Default for Multipliers {
    fn default() -> Self {
        Self {
            acceleration: 1.0,
            gravity: 1.0,
            top_speed: 1.0,
            turning_drag: 1.0,
            deceleration: 1.0,
        }
    }
}

/// Origin and orientation of an actor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Collider carrying the actor (moving platform, ledge on a platform).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attachment {
    pub collider: ColliderId,
    translation: Vec3,
    rotation: Quat,
}

impl Attachment {
    pub fn new(info: &ColliderInfo) -> Self {
        Self {
            collider: info.id,
            translation: info.translation,
            rotation: info.rotation,
        }
    }

    /// Point in the collider's frame as last seen.
    #[inline]
    pub fn to_local(&self, p: Vec3) -> Vec3 {
        self.rotation.inverse() * (p - self.translation)
    }

    #[inline]
    pub fn to_world(&self, p: Vec3) -> Vec3 {
        self.translation + self.rotation * p
    }

    /// Move `point` by the collider's motion since last seen and remember its new pose.
    fn carry(&mut self, info: &ColliderInfo, point: Vec3) -> (Vec3, Quat) {
        let local = self.to_local(point);
        let delta = info.rotation * self.rotation.inverse();
        self.translation = info.translation;
        self.rotation = info.rotation;
        (self.to_world(local), delta)
    }
}

#[derive(Clone, Debug)]
pub struct Body {
    pub origin: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub capsule: Capsule,
    pub ground: GroundState,
    pub multipliers: Multipliers,
    pub attachment: Option<Attachment>,
    /// The actor's own collider, skipped by every query.
    pub collider: Option<ColliderId>,
    /// Layers the actor collides with.
    pub layers: LayerMask,
    /// Disabled bodies skip the whole update pipeline.
    pub enabled: bool,
}

impl Body {
    /// Panics if the capsule is invalid: nothing may move before the capsule is sound.
    pub fn new(origin: Vec3, capsule: Capsule) -> Self {
        if let Err(e) = capsule.validate() {
            panic!("invalid capsule: {e}");
        }
        Self {
            origin,
            rotation: Quat::identity(),
            velocity: Vec3::zeros(),
            capsule,
            ground: GroundState::default(),
            multipliers: Multipliers::default(),
            attachment: None,
            collider: None,
            layers: LayerMask::all(),
            enabled: true,
        }
    }

    #[inline]
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    #[inline]
    pub fn with_collider(mut self, id: ColliderId) -> Self {
        self.collider = Some(id);
        self
    }

    #[inline]
    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    // --- Derived points ---

    /// Capsule center.
    #[inline]
    pub fn position(&self) -> Vec3 {
        self.origin + self.capsule.center
    }

    #[inline]
    pub fn set_position(&mut self, center: Vec3) {
        self.origin = center - self.capsule.center;
    }

    /// Where the capsule center would be at the original height.
    #[inline]
    pub fn unsized_position(&self) -> Vec3 {
        self.position() - up() * self.capsule.height * 0.5
            + up() * self.capsule.original_height() * 0.5
    }

    /// Top of the range of heights the actor can step on.
    #[inline]
    pub fn step_position(&self) -> Vec3 {
        self.position() - up() * (self.capsule.height * 0.5 - self.capsule.step_offset)
    }

    #[inline]
    pub fn is_point_under_step(&self, point: Vec3) -> bool {
        self.step_position().y > point.y
    }

    /// Capsule segment end points `(bottom, top)`.
    #[inline]
    pub fn segment(&self) -> (Vec3, Vec3) {
        self.capsule.spec().segment(self.position())
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.capsule.spec().bounds(self.position())
    }

    #[inline]
    pub fn forward(&self) -> Vec3 {
        forward(self.rotation)
    }

    #[inline]
    pub fn right(&self) -> Vec3 {
        right(self.rotation)
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose {
            position: self.origin,
            rotation: self.rotation,
        }
    }

    /// Teleport. Clears any attachment.
    pub fn set_pose(&mut self, pose: Pose) {
        self.origin = pose.position;
        self.rotation = pose.rotation;
        self.attachment = None;
    }

    // --- Velocity components ---

    #[inline]
    pub fn lateral_velocity(&self) -> Vec3 {
        lateral(self.velocity)
    }

    /// Replace the XZ part of the velocity; `v.y` is ignored.
    #[inline]
    pub fn set_lateral_velocity(&mut self, v: Vec3) {
        self.velocity.x = v.x;
        self.velocity.z = v.z;
    }

    #[inline]
    pub fn vertical_speed(&self) -> f32 {
        self.velocity.y
    }

    #[inline]
    pub fn set_vertical_speed(&mut self, speed: f32) {
        self.velocity.y = speed;
    }

    // --- Queries ---

    /// Default filter for the actor's physical queries.
    #[inline]
    pub fn filter(&self) -> QueryFilter {
        QueryFilter::default()
            .with_layers(self.layers)
            .excluding(self.collider)
    }

    /// Sphere of the capsule radius cast from the center by `|distance - radius|`.
    pub fn sphere_cast(&self, world: &dyn ShapeQueries, dir: Vec3, distance: f32) -> Option<Hit> {
        let cast = (distance - self.capsule.radius).abs();
        world.sphere_cast(self.position(), self.capsule.radius, dir, cast, self.filter())
    }

    /// Capsule cast starting one radius behind the actor, so touching surfaces are found.
    pub fn capsule_cast(
        &self,
        world: &dyn ShapeQueries,
        dir: Vec3,
        distance: f32,
        layers: LayerMask,
    ) -> Option<Hit> {
        let (bottom, top) = self.capsule.spec().segment(self.position() - dir * self.capsule.radius);
        let filter = self.filter().with_layers(layers);
        world.capsule_cast(bottom, top, self.capsule.radius, dir, distance + self.capsule.radius, filter)
    }

    /// Colliders overlapping the capsule grown by `offset` plus the contact margin.
    pub fn overlap(&self, world: &dyn ShapeQueries, offset: f32, triggers: TriggerPolicy) -> Vec<ColliderId> {
        let contact = offset + self.capsule.skin + DEFAULT_CONTACT_OFFSET;
        let radius = self.capsule.radius + contact;
        let half = ((self.capsule.height + contact) * 0.5 - radius).max(0.0);
        let center = self.position();
        let filter = self.filter().with_triggers(triggers);
        world.overlap_capsule(center - up() * half, center + up() * half, radius, filter)
    }

    /// Grounded on a slope steeper than the sloping-ground angle, confirmed by a ray down.
    pub fn on_sloping_ground(&self, world: &dyn ShapeQueries) -> bool {
        if !self.ground.grounded || self.ground.angle <= SLOPING_GROUND_ANGLE {
            return false;
        }
        let filter = QueryFilter::default().excluding(self.collider);
        match world.raycast(self.origin, -up(), self.capsule.height * 2.0, filter) {
            Some(hit) => angle_from_up(hit.normal) > SLOPING_GROUND_ANGLE,
            None => true,
        }
    }

    /// Landing test used unless the host overrides it.
    #[inline]
    pub fn default_landing(&self, hit: &Hit) -> bool {
        self.is_point_under_step(hit.point) && angle_from_up(hit.normal) < self.capsule.slope_limit
    }

    // --- Motion primitives ---

    /// Accelerate along `direction` up to `top_speed`; the velocity orthogonal to it decays
    /// by `turning_drag`.
    pub fn accelerate(
        &mut self,
        direction: Vec3,
        turning_drag: f32,
        acceleration: f32,
        top_speed: f32,
        dt: f32,
    ) {
        if direction.norm_squared() == 0.0 {
            return;
        }
        let lateral = self.lateral_velocity();
        let mut speed = direction.dot(&lateral);
        let turning = lateral - direction * speed;
        let top = top_speed * self.multipliers.top_speed;

        if speed < top {
            speed += acceleration * self.multipliers.acceleration * dt;
            speed = speed.clamp(-top, top);
        }

        let turning_delta = turning_drag * self.multipliers.turning_drag * dt;
        let turning = move_towards(turning, Vec3::zeros(), turning_delta);
        self.set_lateral_velocity(direction * speed + turning);
    }

    pub fn decelerate(&mut self, rate: f32, dt: f32) {
        let delta = rate * self.multipliers.deceleration * dt;
        self.set_lateral_velocity(move_towards(self.lateral_velocity(), Vec3::zeros(), delta));
    }

    /// Constant gravity while airborne.
    pub fn gravity(&mut self, gravity: f32, dt: f32) {
        if !self.ground.grounded {
            self.velocity.y -= gravity * self.multipliers.gravity * dt;
        }
    }

    /// Gravity with a rise and a fall regime, clamped at `terminal` fall speed.
    pub fn asymmetric_gravity(&mut self, rise: f32, fall: f32, terminal: f32, dt: f32) {
        if self.ground.grounded || self.velocity.y <= -terminal {
            return;
        }
        let force = if self.velocity.y > 0.0 { rise } else { fall };
        let speed = self.velocity.y - force * self.multipliers.gravity * dt;
        self.velocity.y = speed.max(-terminal);
    }

    pub fn snap_to_ground(&mut self, force: f32) {
        if self.ground.grounded && self.velocity.y <= 0.0 {
            self.velocity.y = -force;
        }
    }

    /// Push along the downhill direction on sloping ground, scaled by `1 - cos(angle)`.
    pub fn slope_factor(&mut self, world: &dyn ShapeQueries, up_force: f32, down_force: f32, dt: f32) {
        if !self.ground.grounded || !self.on_sloping_ground(world) {
            return;
        }
        let factor = 1.0 - up().dot(&self.ground.normal);
        let slope = self.ground.slope_direction;
        let lateral = self.lateral_velocity();
        let force = if slope.dot(&lateral) > 0.0 { down_force } else { up_force };
        self.set_lateral_velocity(lateral + slope * (factor * force * dt));
    }

    pub fn face_direction(&mut self, direction: Vec3) {
        if let Some(rotation) = look_rotation(direction) {
            self.rotation = rotation;
        }
    }

    pub fn face_direction_smooth(&mut self, direction: Vec3, degrees_per_second: f32, dt: f32) {
        if let Some(target) = look_rotation(direction) {
            self.rotation = rotate_towards(self.rotation, target, degrees_per_second * dt);
        }
    }

    // --- Movement ---

    /// Sweep the capsule by `translation` and slide along whatever it hits.
    pub fn move_by(&mut self, world: &dyn ShapeQueries, translation: Vec3) -> MoveResult {
        let req = self.move_request(translation);
        let result = move_capsule(world, self.filter(), req);
        self.set_position(result.end_pos);
        result
    }

    /// Integrate velocity over `dt`. Grounded actors climb steps up to the step offset.
    pub fn integrate(&mut self, world: &dyn ShapeQueries, dt: f32) -> MoveResult {
        let req = self.move_request(self.velocity * dt);
        let step = if self.ground.grounded { self.capsule.step_offset } else { 0.0 };
        let result = move_capsule_with_step(world, self.filter(), req, step);
        self.set_position(result.end_pos);
        result
    }

    fn move_request(&self, translation: Vec3) -> MoveRequest {
        MoveRequest::with_defaults(self.position(), translation, self.capsule.spec())
            .with_skin(self.capsule.skin)
    }

    // --- Attachment ---

    pub fn attach(&mut self, info: &ColliderInfo) {
        if self.attachment.map(|a| a.collider) != Some(info.id) {
            self.attachment = Some(Attachment::new(info));
        }
    }

    #[inline]
    pub fn detach(&mut self) {
        self.attachment = None;
    }

    /// Carry the actor by its attachment's motion since the last tick.
    pub fn follow_attachment(&mut self, world: &dyn ShapeQueries) {
        let Some(mut attachment) = self.attachment else {
            return;
        };
        let Some(info) = world.collider(attachment.collider) else {
            self.attachment = None;
            return;
        };
        let (origin, delta) = attachment.carry(&info, self.origin);
        self.origin = origin;
        let heading = planar_direction(delta * self.forward());
        self.face_direction(heading);
        self.attachment = Some(attachment);
    }

    /// Lateral speed capped at `max`.
    #[inline]
    pub fn clamp_lateral_speed(&mut self, max: f32) {
        self.set_lateral_velocity(clamp_magnitude(self.lateral_velocity(), max));
    }
}
