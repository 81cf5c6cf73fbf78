/*!
The enemy actor: the same motion core with a small state set.

- stats:     tuning (`EnemyStats`)
- waypoints: patrol route with a delayed advance
- states:    Idle, Waypoint, Follow and the machine builder

Enemies never write to the player. Sight reads a snapshot of the player the level hands in
before each update; a contact attack is left in [`Enemy::take_attack`] for the level to apply.
*/

mod states;
mod stats;
mod waypoints;

use collision::{Tag, TriggerPolicy, Vec3};
use log::{debug, info};

use crate::{
    body::Body,
    events::{Event, Events},
    fsm::StateStatus,
    health::Health,
    math::up,
    pipeline::{Frame, MotionHost},
    props::{ActorKind, ContactReaction, ContactSubject, Listeners},
    stats::StatsManager,
};

pub use states::{EnemyStateId, enemy_machine};
pub use stats::EnemyStats;
pub use waypoints::{WaypointMode, Waypoints};

pub struct Enemy {
    pub body: Body,
    pub status: StateStatus<EnemyStateId>,
    pub stats: StatsManager<EnemyStats>,
    pub health: Health,
    pub events: Events,
    pub waypoints: Waypoints,
    /// Latest view of the player, refreshed by the level before each update.
    pub player: Option<ContactSubject>,

    spotted: bool,
    attack: Option<u32>,
}

impl Enemy {
    /// Panics if `stats` does not validate.
    pub fn new(body: Body, stats: EnemyStats) -> Self {
        if let Err(e) = stats.validate() {
            panic!("invalid enemy stats: {e}");
        }
        Self {
            body,
            status: StateStatus::new(EnemyStateId::Idle),
            stats: StatsManager::new(stats),
            health: Health::default(),
            events: Events::default(),
            waypoints: Waypoints::default(),
            player: None,
            spotted: false,
            attack: None,
        }
    }

    /// Patrol `waypoints`, starting in the Waypoint state.
    pub fn with_waypoints(mut self, waypoints: Waypoints) -> Self {
        self.waypoints = waypoints;
        self.status = StateStatus::new(self.home());
        self
    }

    #[inline]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    #[inline]
    pub fn stats(&self) -> EnemyStats {
        *self.stats.current()
    }

    /// Whether the player is in sight.
    #[inline]
    pub fn spotted(&self) -> bool {
        self.spotted
    }

    /// State to return to when nothing is being chased.
    pub fn home(&self) -> EnemyStateId {
        if self.waypoints.is_empty() {
            EnemyStateId::Idle
        } else {
            EnemyStateId::Waypoint
        }
    }

    /// Damage dealt to the player by this tick's contact attack.
    #[inline]
    pub fn take_attack(&mut self) -> Option<u32> {
        self.attack.take()
    }

    // --- Motion ---

    pub fn accelerate(&mut self, direction: Vec3, acceleration: f32, top_speed: f32, dt: f32) {
        let drag = self.stats().turning_drag;
        self.body.accelerate(direction, drag, acceleration, top_speed, dt);
    }

    pub fn decelerate(&mut self, dt: f32) {
        self.body.decelerate(self.stats().deceleration, dt);
    }

    pub fn friction(&mut self, dt: f32) {
        self.body.decelerate(self.stats().friction, dt);
    }

    pub fn gravity(&mut self, dt: f32) {
        self.body.gravity(self.stats().gravity, dt);
    }

    pub fn snap_to_ground(&mut self) {
        self.body.snap_to_ground(self.stats().snap_force);
    }

    pub fn face_direction_smooth(&mut self, direction: Vec3, dt: f32) {
        let speed = self.stats().rotation_speed;
        self.body.face_direction_smooth(direction, speed, dt);
    }

    // --- Health ---

    /// Returns whether the hit landed: ignored while recovering or dead. Death disables the body.
    pub fn apply_damage(&mut self, amount: u32, time: f32) -> bool {
        if self.health.is_empty() || !self.health.damage(amount, time) {
            return false;
        }
        debug!("enemy damaged by {amount}, health {}", self.health.current());
        self.events.push(Event::Damaged { amount });

        if self.health.is_empty() {
            self.body.enabled = false;
            info!("enemy died");
            self.events.push(Event::Died);
        }
        true
    }

    // --- Post-update ---

    /// Spot the player inside the spot range; lose it past the view range or once it is dead.
    fn handle_sight(&mut self, frame: &Frame) {
        let Some(player) = self.player else {
            if self.spotted {
                self.lose_player();
            }
            return;
        };

        if !self.spotted {
            let center = self.body.position();
            let filter = self.body.filter().with_triggers(TriggerPolicy::Ignore);
            let range = self.stats().spot_range;
            let seen = frame
                .world
                .overlap_capsule(center, center, range, filter)
                .into_iter()
                .filter_map(|id| frame.world.collider(id))
                .any(|info| info.tags.has(Tag::Player));

            if seen && player.alive {
                self.spotted = true;
                self.events.push(Event::PlayerSpotted);
                if self.status.contains(EnemyStateId::Follow) {
                    self.status.change(EnemyStateId::Follow);
                }
            }
        } else {
            let distance = (player.position - self.body.position()).norm();
            if !player.alive || distance > self.stats().view_range {
                self.lose_player();
            }
        }
    }

    fn lose_player(&mut self) {
        self.spotted = false;
        self.events.push(Event::PlayerEscaped);
        if self.status.is_current(EnemyStateId::Follow) {
            let home = self.home();
            self.status.change(home);
        }
    }

    /// Hurt a player touching the enemy from anywhere but the top.
    fn contact_attack(&mut self, frame: &Frame) {
        let s = self.stats();
        if !s.can_attack_on_contact {
            return;
        }
        let Some(player) = self.player.filter(|p| p.alive) else {
            return;
        };
        let touching = self
            .body
            .overlap(frame.world, s.contact_offset, TriggerPolicy::Ignore)
            .into_iter()
            .filter_map(|id| frame.world.collider(id))
            .any(|info| info.tags.has(Tag::Player));
        if !touching {
            return;
        }

        let stepping = self.body.bounds().max - up() * s.contact_stepping_tolerance;
        if player.is_point_under_step(stepping) {
            return;
        }

        if s.contact_pushback {
            let back = -self.body.forward() * s.contact_push_back_force;
            self.body.set_lateral_velocity(back);
        }
        self.attack = Some(s.contact_damage);
        self.events.push(Event::PlayerContact);
    }
}

impl MotionHost for Enemy {
    type Id = EnemyStateId;

    const KIND: ActorKind = ActorKind::Enemy;

    #[inline]
    fn body(&self) -> &Body {
        &self.body
    }

    #[inline]
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    #[inline]
    fn status(&self) -> &StateStatus<EnemyStateId> {
        &self.status
    }

    #[inline]
    fn status_mut(&mut self) -> &mut StateStatus<EnemyStateId> {
        &mut self.status
    }

    #[inline]
    fn events_mut(&mut self) -> &mut Events {
        &mut self.events
    }

    fn is_alive(&self) -> bool {
        !self.health.is_empty()
    }

    fn apply_reaction(&mut self, frame: &Frame, reaction: ContactReaction) {
        if let ContactReaction::Damage { amount } = reaction {
            self.apply_damage(amount, frame.time);
        }
    }

    fn on_update(&mut self, frame: &Frame, _listeners: &mut Listeners) {
        self.waypoints.advance(frame.dt);
        self.handle_sight(frame);
        self.contact_attack(frame);
    }
}

#[cfg(test)]
mod tests {
    use collision::{ColliderDef, ColliderId, ColliderShapeDef, Layer, QueryWorld};

    use super::*;
    use crate::{capsule::Capsule, fsm::StateMachine, pipeline::update};

    const DT: f32 = 1.0 / 30.0;
    const PLAYER: u32 = 100;

    fn floor() -> ColliderDef {
        ColliderDef::new(
            1,
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(50.0, 0.5, 50.0),
            },
            Vec3::new(0.0, -0.5, 0.0),
        )
    }

    fn player_collider(origin: Vec3) -> ColliderDef {
        ColliderDef::new(
            PLAYER,
            ColliderShapeDef::CapsuleY {
                radius: 0.5,
                half_height: 0.5,
            },
            origin + up(),
        )
        .on_layer(Layer::Actor)
        .tagged(Tag::Player)
    }

    fn player_view(origin: Vec3, alive: bool) -> ContactSubject {
        let body = Body::new(origin, Capsule::new(2.0, 0.5));
        ContactSubject::new(&body, ActorKind::Player, alive)
    }

    fn enemy_at(origin: Vec3) -> Enemy {
        let body = Body::new(origin, Capsule::new(2.0, 0.5)).with_collider(ColliderId(2));
        Enemy::new(body, EnemyStats::default())
    }

    struct Sim {
        world: QueryWorld,
        enemy: Enemy,
        machine: StateMachine<Enemy>,
        time: f32,
    }

    impl Sim {
        fn new(world: QueryWorld, mut enemy: Enemy) -> Self {
            let mut machine = enemy_machine();
            let frame = Frame {
                dt: 0.0,
                time: 0.0,
                world: &world,
            };
            machine.start(&mut enemy, &frame);
            Self {
                world,
                enemy,
                machine,
                time: 0.0,
            }
        }

        fn tick(&mut self, ticks: usize) {
            for _ in 0..ticks {
                self.time += DT;
                let frame = Frame {
                    dt: DT,
                    time: self.time,
                    world: &self.world,
                };
                update(
                    &mut self.enemy,
                    &mut self.machine,
                    &frame,
                    &mut Listeners::default(),
                );
            }
        }
    }

    #[test]
    fn patrols_between_waypoints() {
        let route = Waypoints::new(vec![Vec3::new(3.0, 0.0, 0.0), Vec3::zeros()], WaypointMode::Loop);
        let enemy = enemy_at(Vec3::zeros()).with_waypoints(route);
        let mut sim = Sim::new(QueryWorld::build(vec![floor()]), enemy);
        assert_eq!(sim.enemy.status.current(), EnemyStateId::Waypoint);

        let mut furthest: f32 = 0.0;
        for _ in 0..150 {
            sim.tick(1);
            furthest = furthest.max(sim.enemy.body.origin.x);
        }
        assert!(furthest > 2.4);
        assert!(sim.enemy.body.lateral_velocity().norm() <= 2.0 + 1.0e-3);
        assert!(sim.enemy.body.ground.grounded);
    }

    #[test]
    fn follows_spotted_player_until_it_escapes() {
        let target = Vec3::new(3.0, 0.0, 0.0);
        let world = QueryWorld::build(vec![floor(), player_collider(target)]);
        let route = Waypoints::new(vec![Vec3::new(0.0, 0.0, -3.0)], WaypointMode::Once);
        let mut enemy = enemy_at(Vec3::zeros()).with_waypoints(route);
        enemy.player = Some(player_view(target, true));
        let mut sim = Sim::new(world, enemy);

        sim.tick(1);
        assert!(sim.enemy.spotted());
        assert_eq!(sim.enemy.status.current(), EnemyStateId::Follow);
        assert_eq!(sim.enemy.events.count(Event::PlayerSpotted), 1);

        sim.tick(5);
        assert!(sim.enemy.body.velocity.x > 0.0);

        sim.enemy.player = Some(player_view(Vec3::new(30.0, 0.0, 0.0), true));
        sim.tick(1);
        assert!(!sim.enemy.spotted());
        assert_eq!(sim.enemy.status.current(), EnemyStateId::Waypoint);
        assert_eq!(sim.enemy.events.count(Event::PlayerEscaped), 1);
    }

    #[test]
    fn dead_player_is_not_spotted() {
        let target = Vec3::new(2.0, 0.0, 0.0);
        let world = QueryWorld::build(vec![floor(), player_collider(target)]);
        let mut enemy = enemy_at(Vec3::zeros());
        enemy.player = Some(player_view(target, false));
        let mut sim = Sim::new(world, enemy);

        sim.tick(1);
        assert!(!sim.enemy.spotted());
        assert_eq!(sim.enemy.status.current(), EnemyStateId::Idle);
    }

    #[test]
    fn contact_attack_spares_a_player_on_top() {
        let beside = Vec3::new(0.0, 0.0, 1.05);
        let world = QueryWorld::build(vec![floor(), player_collider(beside)]);
        let mut enemy = enemy_at(Vec3::zeros());
        enemy.player = Some(player_view(beside, true));
        let mut sim = Sim::new(world, enemy);

        sim.tick(1);
        assert_eq!(sim.enemy.take_attack(), Some(1));
        assert_eq!(sim.enemy.take_attack(), None);
        assert_eq!(sim.enemy.events.count(Event::PlayerContact), 1);
        assert!(sim.enemy.body.velocity.z < 0.0);

        let above = Vec3::new(0.0, 2.0, 0.0);
        let world = QueryWorld::build(vec![floor(), player_collider(above)]);
        let mut enemy = enemy_at(Vec3::zeros());
        enemy.player = Some(player_view(above, true));
        let mut sim = Sim::new(world, enemy);

        sim.tick(1);
        assert_eq!(sim.enemy.take_attack(), None);
    }

    #[test]
    fn lethal_damage_disables_the_body() {
        let mut enemy = enemy_at(Vec3::zeros());
        assert!(enemy.apply_damage(1, 0.0));
        assert!(!enemy.apply_damage(1, 0.5));
        assert_eq!(enemy.health.current(), 2);
        assert!(enemy.body.enabled);

        assert!(enemy.apply_damage(5, 2.0));
        assert!(!enemy.is_alive());
        assert!(!enemy.body.enabled);
        assert_eq!(enemy.events.count(Event::Died), 1);

        assert!(!enemy.apply_damage(1, 4.0));
        assert_eq!(enemy.events.count(Event::Died), 1);
    }
}
