//! Scripted shape queries and a minimal actor for motion-core tests.

use collision::{
    Bounds, ColliderId, ColliderInfo, Contact, Hit, Layer, Penetration, QueryFilter, Quat,
    ShapeQueries, Tag, Tags, Vec3,
};

use crate::{
    body::Body,
    capsule::Capsule,
    events::Events,
    fsm::{State, StateId, StateMachine, StateStatus},
    pipeline::{Frame, MotionHost},
    props::{ActorKind, Listeners},
};

pub fn info(id: u32, bounds: Bounds) -> ColliderInfo {
    ColliderInfo {
        id: ColliderId(id),
        bounds,
        is_trigger: false,
        layer: Layer::Default,
        tags: Tags::default(),
        translation: bounds.center(),
        rotation: Quat::identity(),
    }
}

/// Infinite horizontal floor that reports a configurable normal.
#[derive(Clone, Copy, Debug)]
pub struct ScriptedFloor {
    pub height: f32,
    pub normal: Vec3,
    /// Height reported for hit points; defaults to `height`.
    pub contact_height: Option<f32>,
    pub tags: Tags,
}

/// Shape queries answered from a script instead of real geometry.
///
/// Casts only see the floor, overlaps return every scripted overlap that passes the filter.
#[derive(Clone, Debug, Default)]
pub struct ScriptedWorld {
    pub floor: Option<ScriptedFloor>,
    pub overlaps: Vec<ColliderInfo>,
    pub penetrations: Vec<(ColliderId, Penetration)>,
}

impl ScriptedWorld {
    pub const FLOOR: u32 = 1000;

    pub fn with_floor(height: f32, normal: Vec3) -> Self {
        Self {
            floor: Some(ScriptedFloor {
                height,
                normal,
                contact_height: None,
                tags: Tags::default(),
            }),
            ..Self::default()
        }
    }

    pub fn floor_tagged(mut self, tag: Tag) -> Self {
        if let Some(floor) = &mut self.floor {
            floor.tags.add(tag);
        }
        self
    }

    pub fn with_contact_height(mut self, height: f32) -> Self {
        if let Some(floor) = &mut self.floor {
            floor.contact_height = Some(height);
        }
        self
    }

    pub fn add_overlap(&mut self, id: u32, bounds: Bounds, is_trigger: bool) {
        let mut other = info(id, bounds);
        other.is_trigger = is_trigger;
        self.overlaps.push(other);
    }

    fn floor_info(&self, floor: &ScriptedFloor) -> ColliderInfo {
        let mut floor_info = info(
            Self::FLOOR,
            Bounds::new(
                Vec3::new(-1.0e3, floor.height - 1.0, -1.0e3),
                Vec3::new(1.0e3, floor.height, 1.0e3),
            ),
        );
        floor_info.tags = floor.tags;
        floor_info
    }

    /// Cast a point `lowest` down onto the floor.
    fn cast_down(&self, lowest: Vec3, dir: Vec3, max_dist: f32, filter: QueryFilter) -> Option<Hit> {
        let floor = self.floor?;
        if dir.y >= 0.0 || !filter.accepts(ColliderId(Self::FLOOR), Layer::Default, false) {
            return None;
        }
        let gap = lowest.y - floor.height;
        if gap < -1.0e-3 {
            return None;
        }
        let distance = gap.max(0.0) / -dir.y;
        if distance > max_dist {
            return None;
        }
        let at = lowest + dir * distance;
        Some(Hit {
            point: Vec3::new(at.x, floor.contact_height.unwrap_or(floor.height), at.z),
            normal: floor.normal,
            distance,
            collider: ColliderId(Self::FLOOR),
        })
    }
}

impl ShapeQueries for ScriptedWorld {
    fn raycast(&self, origin: Vec3, dir: Vec3, max_dist: f32, filter: QueryFilter) -> Option<Hit> {
        self.cast_down(origin, dir, max_dist, filter)
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        filter: QueryFilter,
    ) -> Option<Hit> {
        self.cast_down(origin - Vec3::y() * radius, dir, max_dist, filter)
    }

    fn capsule_cast(
        &self,
        bottom: Vec3,
        top: Vec3,
        radius: f32,
        dir: Vec3,
        max_dist: f32,
        filter: QueryFilter,
    ) -> Option<Hit> {
        let lowest = if bottom.y < top.y { bottom } else { top };
        self.cast_down(lowest - Vec3::y() * radius, dir, max_dist, filter)
    }

    fn overlap_capsule(
        &self,
        _bottom: Vec3,
        _top: Vec3,
        _radius: f32,
        filter: QueryFilter,
    ) -> Vec<ColliderId> {
        self.overlaps
            .iter()
            .filter(|o| filter.accepts(o.id, o.layer, o.is_trigger))
            .map(|o| o.id)
            .collect()
    }

    fn compute_penetration(
        &self,
        _bottom: Vec3,
        _top: Vec3,
        _radius: f32,
        other: ColliderId,
    ) -> Option<Penetration> {
        self.penetrations
            .iter()
            .find(|(id, _)| *id == other)
            .map(|(_, p)| *p)
    }

    /// Scripted casts already carry the scripted normal; there is nothing to refine.
    fn contact(
        &self,
        _bottom: Vec3,
        _top: Vec3,
        _radius: f32,
        _other: ColliderId,
        _prediction: f32,
    ) -> Option<Contact> {
        None
    }

    fn collider(&self, id: ColliderId) -> Option<ColliderInfo> {
        if id == ColliderId(Self::FLOOR) {
            return self.floor.as_ref().map(|f| self.floor_info(f));
        }
        self.overlaps.iter().find(|o| o.id == id).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TestState {
    Idle,
    Timed,
    Bounce,
    Unregistered,
}

impl StateId for TestState {
    const ALL: &'static [Self] = &[Self::Idle, Self::Timed, Self::Bounce, Self::Unregistered];

    fn index(self) -> usize {
        self as usize
    }
}

pub struct TestActor {
    pub body: Body,
    pub status: StateStatus<TestState>,
    pub events: Events,
    pub log: Vec<String>,
    pub contacts: Vec<ColliderId>,
    pub high_ledges: u32,
    pub updates: u32,
    /// Vertical speed the recorder states set on every step (0 leaves it alone).
    pub rise_each_step: f32,
    /// Recorder states request the other recorder on enter.
    pub ping_pong: bool,
}

impl TestActor {
    pub fn grounded(origin: Vec3) -> Self {
        Self {
            body: Body::new(origin, Capsule::new(2.0, 0.5)),
            status: StateStatus::new(TestState::Idle),
            events: Events::default(),
            log: Vec::new(),
            contacts: Vec::new(),
            high_ledges: 0,
            updates: 0,
            rise_each_step: 0.0,
            ping_pong: false,
        }
    }

    pub fn airborne(origin: Vec3) -> Self {
        let mut actor = Self::grounded(origin);
        actor.body.ground.grounded = false;
        actor
    }
}

impl MotionHost for TestActor {
    type Id = TestState;

    const KIND: ActorKind = ActorKind::Enemy;

    fn body(&self) -> &Body {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    fn status(&self) -> &StateStatus<TestState> {
        &self.status
    }

    fn status_mut(&mut self) -> &mut StateStatus<TestState> {
        &mut self.status
    }

    fn events_mut(&mut self) -> &mut Events {
        &mut self.events
    }

    fn handle_high_ledge(&mut self, _frame: &Frame, _hit: &Hit) {
        self.high_ledges += 1;
    }

    fn on_update(&mut self, _frame: &Frame, _listeners: &mut Listeners) {
        self.updates += 1;
    }
}

/// Logs its callbacks on the actor.
pub struct Recorder {
    name: &'static str,
}

impl Recorder {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl State<TestActor> for Recorder {
    fn enter(&mut self, actor: &mut TestActor, _frame: &Frame) {
        actor.log.push(format!("enter {}", self.name));
        if actor.ping_pong {
            let other = if self.name == "Idle" {
                TestState::Bounce
            } else {
                TestState::Idle
            };
            actor.status.change(other);
        }
    }

    fn exit(&mut self, actor: &mut TestActor, _frame: &Frame) {
        actor.log.push(format!("exit {}", self.name));
    }

    fn step(&mut self, actor: &mut TestActor, _frame: &Frame) {
        actor.log.push(format!("step {}", self.name));
        if actor.rise_each_step != 0.0 {
            actor.body.velocity.y = actor.rise_each_step;
        }
    }

    fn on_contact(&mut self, actor: &mut TestActor, _frame: &Frame, other: &ColliderInfo) {
        actor.contacts.push(other.id);
    }
}

/// Returns to Idle once more than `duration` seconds have passed.
pub struct Timed {
    pub duration: f32,
}

impl State<TestActor> for Timed {
    fn enter(&mut self, actor: &mut TestActor, _frame: &Frame) {
        actor.log.push("enter Timed".to_string());
    }

    fn step(&mut self, actor: &mut TestActor, _frame: &Frame) {
        if actor.status.elapsed_past(self.duration) {
            actor.status.change(TestState::Idle);
        }
    }
}

pub fn test_machine() -> StateMachine<TestActor> {
    StateMachine::new()
        .with(TestState::Idle, Recorder::new("Idle"))
        .with(TestState::Timed, Timed { duration: 0.25 })
        .with(TestState::Bounce, Recorder::new("Bounce"))
}
