//! Level driver: one simulation tick for every actor and prop, in a fixed order.
//!
//! Responsibilities
//! - Own the query world, the contact listeners, the player and the enemies with their machines.
//! - Clamp the tick delta and skip ticks entirely while paused.
//! - Mirror each actor's capsule into the query world so actors see and touch each other.
//! - Resolve actor-vs-actor attacks: enemy contact attacks, player hitboxes.
//! - Apply prop geometry edits and surface prop events as level events.
//!
//! Order per tick
//! 1. Props advance (falling platforms) and their geometry edits are applied
//! 2. Player update, then its collider is synced
//! 3. Each enemy update with a snapshot of the player, collider sync, contact attack applied
//! 4. Player hitboxes against enemy colliders and prop listeners
//! 5. Respawn after death, when enabled
//! 6. Prop events are drained into the level's event queue
//!
//! Determinism
//! - Enemies update in insertion order, listeners in collider id order.
//! - Nothing reads the wall clock; `time` only advances by the clamped deltas.

use collision::{
    ColliderDef, ColliderId, ColliderShapeDef, Layer, QueryWorld, Tag, TriggerPolicy,
};
use log::{debug, info, warn};

use crate::{
    body::Body,
    enemy::{Enemy, enemy_machine},
    fsm::StateMachine,
    hitbox::PlayerHitboxes,
    input::InputFrame,
    pipeline::{Frame, MotionHost, update},
    player::{Player, player_machine},
    props::{Listeners, PropEvent, WorldEdit},
    settings::MAX_DT,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelEvent {
    Paused,
    Unpaused,
    Prop(PropEvent),
}

/// Query-world collider standing in for an actor's capsule.
#[derive(Clone, Copy, Debug)]
struct ActorCollider {
    id: ColliderId,
    tag: Tag,
    /// Capsule height the registered shape was built with.
    height: f32,
}

impl ActorCollider {
    fn register(world: &mut QueryWorld, body: &mut Body, tag: Tag) -> Self {
        let id = body.collider.unwrap_or_else(|| {
            let next = world.defs().map(|d| d.id.0 + 1).max().unwrap_or(0);
            ColliderId(next)
        });
        body.collider = Some(id);
        let collider = Self {
            id,
            tag,
            height: body.capsule.height,
        };
        collider.insert(world, body);
        collider
    }

    fn def(&self, body: &Body) -> ColliderDef {
        let spec = body.capsule.spec();
        ColliderDef::new(
            self.id.0,
            ColliderShapeDef::CapsuleY {
                radius: spec.radius,
                half_height: spec.half_height,
            },
            body.position(),
        )
        .rotated(body.rotation)
        .on_layer(Layer::Actor)
        .tagged(self.tag)
    }

    fn insert(&self, world: &mut QueryWorld, body: &Body) {
        if let Err(reason) = world.insert(self.def(body)) {
            warn!("actor collider {:?} not registered: {reason}", self.id);
        }
    }

    /// Follow the body; rebuild the shape when the capsule was resized.
    fn sync(&mut self, world: &mut QueryWorld, body: &Body) {
        if body.capsule.height != self.height {
            self.height = body.capsule.height;
            world.remove(self.id);
            self.insert(world, body);
        } else {
            world.set_pose(self.id, body.position(), body.rotation);
        }
    }
}

struct EnemySlot {
    enemy: Enemy,
    machine: StateMachine<Enemy>,
    collider: Option<ActorCollider>,
}

pub struct Level {
    pub world: QueryWorld,
    pub listeners: Listeners,
    pub player: Player,
    pub hitboxes: PlayerHitboxes,
    pub can_pause: bool,
    /// Seconds between the player's death and its respawn; `None` leaves it dead.
    pub respawn_delay: Option<f32>,

    player_machine: StateMachine<Player>,
    player_collider: ActorCollider,
    enemies: Vec<EnemySlot>,
    paused: bool,
    time: f32,
    died_at: Option<f32>,
    events: Vec<LevelEvent>,
}

impl Level {
    /// Register the player's capsule in `world` and enter its initial state.
    pub fn new(mut world: QueryWorld, mut player: Player) -> Self {
        let player_collider = ActorCollider::register(&mut world, &mut player.body, Tag::Player);
        let mut player_machine = player_machine();
        let frame = Frame {
            dt: 0.0,
            time: 0.0,
            world: &world,
        };
        player_machine.start(&mut player, &frame);

        Self {
            world,
            listeners: Listeners::default(),
            player,
            hitboxes: PlayerHitboxes::default(),
            can_pause: true,
            respawn_delay: None,
            player_machine,
            player_collider,
            enemies: Vec::new(),
            paused: false,
            time: 0.0,
            died_at: None,
            events: Vec::new(),
        }
    }

    /// Add an enemy with every enemy state; returns its index.
    pub fn add_enemy(&mut self, mut enemy: Enemy) -> usize {
        let collider = ActorCollider::register(&mut self.world, &mut enemy.body, Tag::Enemy);
        let mut machine = enemy_machine();
        let frame = Frame {
            dt: 0.0,
            time: self.time,
            world: &self.world,
        };
        machine.start(&mut enemy, &frame);
        self.enemies.push(EnemySlot {
            enemy,
            machine,
            collider: Some(collider),
        });
        self.enemies.len() - 1
    }

    #[inline]
    pub fn enemy(&self, index: usize) -> Option<&Enemy> {
        self.enemies.get(index).map(|slot| &slot.enemy)
    }

    #[inline]
    pub fn enemy_mut(&mut self, index: usize) -> Option<&mut Enemy> {
        self.enemies.get_mut(index).map(|slot| &mut slot.enemy)
    }

    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().map(|slot| &slot.enemy)
    }

    /// Simulation time elapsed in unpaused ticks.
    #[inline]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Feed the player's input for the next tick. The pause button toggles the pause.
    pub fn feed_input(&mut self, input: InputFrame) {
        self.player.input.feed(input, self.time);
        if self.player.input.pause_down() {
            self.toggle_pause();
        }
    }

    /// Pausing needs `can_pause`; unpausing always works.
    pub fn pause(&mut self, value: bool) {
        if self.paused == value || (value && !self.can_pause) {
            return;
        }
        self.paused = value;
        if value {
            info!("level paused");
            self.events.push(LevelEvent::Paused);
        } else {
            info!("level unpaused");
            self.events.push(LevelEvent::Unpaused);
        }
    }

    pub fn toggle_pause(&mut self) {
        self.pause(!self.paused);
    }

    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance everything by `dt` seconds, clamped to `[0, MAX_DT]`.
    pub fn tick(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_DT)
        } else {
            warn!("non-finite tick delta {dt}, using 0");
            0.0
        };
        self.time += dt;

        self.advance_props(dt);
        self.update_player(dt);
        self.update_enemies(dt);
        self.resolve_hitboxes(dt);
        self.handle_respawn(dt);

        let props = self.listeners.drain_events();
        self.events.extend(props.into_iter().map(LevelEvent::Prop));
    }

    fn advance_props(&mut self, dt: f32) {
        let edits = self.listeners.advance(dt, self.time);
        self.apply_edits(edits);
    }

    fn apply_edits(&mut self, edits: Vec<WorldEdit>) {
        for edit in edits {
            match edit {
                WorldEdit::Move {
                    collider,
                    translation,
                    rotation,
                } => {
                    self.world.set_pose(collider, translation, rotation);
                }
                WorldEdit::SetTrigger {
                    collider,
                    is_trigger,
                } => {
                    self.world.set_trigger(collider, is_trigger);
                }
                WorldEdit::Remove { collider } => {
                    self.world.remove(collider);
                }
            }
        }
    }

    fn update_player(&mut self, dt: f32) {
        let frame = Frame {
            dt,
            time: self.time,
            world: &self.world,
        };
        update(
            &mut self.player,
            &mut self.player_machine,
            &frame,
            &mut self.listeners,
        );
        self.player_collider.sync(&mut self.world, &self.player.body);
    }

    fn update_enemies(&mut self, dt: f32) {
        for slot in &mut self.enemies {
            slot.enemy.player = Some(self.player.contact_subject());
            let frame = Frame {
                dt,
                time: self.time,
                world: &self.world,
            };
            update(&mut slot.enemy, &mut slot.machine, &frame, &mut self.listeners);

            if let Some(damage) = slot.enemy.take_attack() {
                self.player.apply_damage(damage, &frame);
                self.player_machine.apply_pending(&mut self.player, &frame);
            }

            if !slot.enemy.body.enabled {
                if let Some(collider) = slot.collider.take() {
                    self.world.remove(collider.id);
                }
            } else if let Some(collider) = slot.collider.as_mut() {
                collider.sync(&mut self.world, &slot.enemy.body);
            }
        }
    }

    /// The player's live hitbox against every enemy and prop it touches.
    fn resolve_hitboxes(&mut self, dt: f32) {
        let Some(hitbox) = self.hitboxes.active(&self.player) else {
            return;
        };
        let touching = self
            .player
            .body
            .overlap(&self.world, 0.0, TriggerPolicy::Ignore);

        for slot in &mut self.enemies {
            let Some(collider) = slot.collider else {
                continue;
            };
            if touching.contains(&collider.id) && slot.enemy.apply_damage(hitbox.damage, self.time) {
                hitbox.recoil(&mut self.player.body);
            }
            if !slot.enemy.body.enabled {
                self.world.remove(collider.id);
                slot.collider = None;
            }
        }

        let mut edits = Vec::new();
        for id in &touching {
            if let Some(listener) = self.listeners.get_mut(*id) {
                listener.on_hitbox(&hitbox, &mut edits);
            }
        }
        self.apply_edits(edits);

        let frame = Frame {
            dt,
            time: self.time,
            world: &self.world,
        };
        self.player_machine.apply_pending(&mut self.player, &frame);
    }

    fn handle_respawn(&mut self, dt: f32) {
        if !self.player.health.is_empty() {
            self.died_at = None;
            return;
        }
        let died_at = *self.died_at.get_or_insert(self.time);
        let Some(delay) = self.respawn_delay else {
            return;
        };
        if self.time - died_at < delay {
            return;
        }

        debug!("player respawned after {delay}s");
        self.died_at = None;
        self.player.respawn();
        let frame = Frame {
            dt,
            time: self.time,
            world: &self.world,
        };
        self.player_machine.apply_pending(&mut self.player, &frame);
        self.player_collider.sync(&mut self.world, &self.player.body);
    }
}

#[cfg(test)]
mod tests {
    use collision::{Quat, ShapeQueries, Vec3};

    use super::*;
    use crate::{
        body::Pose,
        capsule::Capsule,
        enemy::EnemyStats,
        events::Event,
        fsm::StateStatus,
        input::Action,
        player::{PlayerStateId, PlayerStats},
        props::{Breakable, FallingPlatform, Portal, PropEvent, Volume},
    };

    const DT: f32 = 1.0 / 30.0;

    fn floor() -> ColliderDef {
        ColliderDef::new(
            1,
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(50.0, 0.5, 50.0),
            },
            Vec3::new(0.0, -0.5, 0.0),
        )
    }

    fn player_at(origin: Vec3) -> Player {
        let body = Body::new(origin, Capsule::new(2.0, 0.5)).with_collider(ColliderId(10));
        Player::new(body, PlayerStats::default())
    }

    fn enemy_at(origin: Vec3, stats: EnemyStats) -> Enemy {
        let body = Body::new(origin, Capsule::new(2.0, 0.5)).with_collider(ColliderId(20));
        Enemy::new(body, stats)
    }

    fn level_on_floor(player: Player) -> Level {
        Level::new(QueryWorld::build(vec![floor()]), player)
    }

    #[test]
    fn player_capsule_is_mirrored_into_the_world() {
        let mut level = level_on_floor(player_at(Vec3::zeros()));
        let info = level.world.collider(ColliderId(10)).map(|i| (i.layer, i.tags));
        let Some((layer, tags)) = info else {
            panic!("player collider missing");
        };
        assert_eq!(layer, Layer::Actor);
        assert!(tags.has(Tag::Player));

        level.player.body.set_pose(Pose {
            position: Vec3::new(4.0, 0.0, 0.0),
            rotation: Quat::identity(),
        });
        level.tick(DT);
        let moved = level.world.collider(ColliderId(10)).map(|i| i.translation.x);
        assert!(moved.is_some_and(|x| (x - 4.0).abs() < 1.0e-3));
    }

    #[test]
    fn idle_player_holds_position_on_the_floor() {
        for start in [Vec3::new(4.0, 0.0, 0.0), Vec3::new(-7.3, 0.0, 12.1)] {
            let mut level = level_on_floor(player_at(start));
            level.tick(1.0 / 60.0);
            let settled = level.player.body.origin;
            for _ in 0..600 {
                level.tick(1.0 / 60.0);
            }
            let end = level.player.body.origin;
            assert!((end.x - start.x).abs() < 1.0e-4);
            assert!((end.z - start.z).abs() < 1.0e-4);
            assert!((end.y - settled.y).abs() < 1.0e-3);
            assert!(level.player.body.ground.grounded);
            assert_eq!(level.player.status.current(), PlayerStateId::Idle);
        }
    }

    #[test]
    fn paused_level_does_not_advance() {
        let mut level = level_on_floor(player_at(Vec3::zeros()));
        level.feed_input(InputFrame::default().press(Action::Pause));
        assert!(level.paused());
        level.tick(DT);
        assert_eq!(level.time(), 0.0);

        level.pause(false);
        level.tick(DT);
        assert!(level.time() > 0.0);
        assert_eq!(
            level.drain_events(),
            vec![LevelEvent::Paused, LevelEvent::Unpaused]
        );
        assert!(level.drain_events().is_empty());
    }

    #[test]
    fn pausing_requires_can_pause() {
        let mut level = level_on_floor(player_at(Vec3::zeros()));
        level.can_pause = false;
        level.toggle_pause();
        assert!(!level.paused());
        assert!(level.drain_events().is_empty());
    }

    #[test]
    fn tick_delta_is_clamped() {
        let mut level = level_on_floor(player_at(Vec3::zeros()));
        level.tick(f32::NAN);
        assert_eq!(level.time(), 0.0);
        level.tick(-1.0);
        assert_eq!(level.time(), 0.0);
        level.tick(5.0);
        assert_eq!(level.time(), MAX_DT);
    }

    #[test]
    fn standing_on_falling_platform_drops_it() {
        let platform = ColliderDef::new(
            7,
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(2.0, 0.5, 2.0),
            },
            Vec3::new(0.0, -0.5, 0.0),
        )
        .tagged(Tag::Platform);
        let mut level = Level::new(QueryWorld::build(vec![platform]), player_at(Vec3::zeros()));
        let falling = FallingPlatform::new(ColliderId(7), Vec3::new(0.0, -0.5, 0.0), Quat::identity());
        level.listeners.insert(ColliderId(7), falling);

        for _ in 0..25 {
            level.tick(0.1);
        }
        let info = level.world.collider(ColliderId(7));
        assert!(info.is_some_and(|i| i.is_trigger && i.translation.y < -0.5));
        assert!(!level.player.body.ground.grounded);
    }

    #[test]
    fn enemy_contact_hurts_player() {
        let mut level = level_on_floor(player_at(Vec3::zeros()));
        level.add_enemy(enemy_at(Vec3::new(0.0, 0.0, 1.05), EnemyStats::default()));

        level.tick(DT);
        assert_eq!(level.player.health.current(), 2);
        assert_eq!(level.player.status.current(), PlayerStateId::Hurt);
        assert_eq!(level.player.events.count(Event::Damaged { amount: 1 }), 1);
        let enemy = level.enemy(0).map(|e| e.events.count(Event::PlayerContact));
        assert_eq!(enemy, Some(1));
    }

    #[test]
    fn spin_hits_touching_enemy() {
        let mut player = player_at(Vec3::new(0.0, 0.0, 1.0));
        player.status = StateStatus::new(PlayerStateId::Spin);
        let mut level = level_on_floor(player);
        let harmless = EnemyStats {
            can_attack_on_contact: false,
            ..EnemyStats::default()
        };
        let index = level.add_enemy(enemy_at(Vec3::zeros(), harmless));

        level.tick(DT);
        let enemy = level
            .enemy(index)
            .map(|e| (e.health.current(), e.events.count(Event::Damaged { amount: 1 })));
        assert_eq!(enemy, Some((2, 1)));
        assert_eq!(level.player.health.current(), 3);
    }

    #[test]
    fn spin_breaks_a_touching_breakable() {
        let mut player = player_at(Vec3::new(0.0, 0.0, 1.0));
        player.status = StateStatus::new(PlayerStateId::Spin);
        let box_def = ColliderDef::new(
            9,
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
            Vec3::new(0.0, 0.5, 0.0),
        );
        let mut level = Level::new(QueryWorld::build(vec![floor(), box_def]), player);
        level.listeners.insert(ColliderId(9), Breakable::new(ColliderId(9)));

        level.tick(DT);
        assert!(level.world.collider(ColliderId(9)).is_none());
        assert_eq!(
            level.drain_events(),
            vec![LevelEvent::Prop(PropEvent::Broken {
                collider: ColliderId(9)
            })]
        );

        level.tick(DT);
        assert!(level.drain_events().is_empty());
    }

    #[test]
    fn walking_player_does_not_break_anything() {
        let box_def = ColliderDef::new(
            9,
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(0.5, 0.5, 0.5),
            },
            Vec3::new(0.0, 0.5, 0.0),
        );
        let player = player_at(Vec3::new(0.0, 0.0, 1.0));
        let mut level = Level::new(QueryWorld::build(vec![floor(), box_def]), player);
        level.listeners.insert(ColliderId(9), Breakable::new(ColliderId(9)));

        level.tick(DT);
        assert!(level.world.collider(ColliderId(9)).is_some());
        assert!(level.drain_events().is_empty());
    }

    #[test]
    fn portal_sends_the_player_out_of_its_pair() {
        let gate = |id: u32, x: f32, rotation: Quat| {
            ColliderDef::new(
                id,
                ColliderShapeDef::Cuboid {
                    half_extents: Vec3::new(1.0, 1.5, 0.1),
                },
                Vec3::new(x, 1.5, 0.0),
            )
            .rotated(rotation)
            .trigger()
        };
        let turned = Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_2);
        let world = QueryWorld::build(vec![floor(), gate(30, 0.0, Quat::identity()), gate(31, 20.0, turned)]);
        let mut level = Level::new(world, player_at(Vec3::zeros()));
        let (a, b) = Portal::pair(
            ColliderId(30),
            Pose {
                position: Vec3::new(0.0, 1.5, 0.0),
                rotation: Quat::identity(),
            },
            ColliderId(31),
            Pose {
                position: Vec3::new(20.0, 1.5, 0.0),
                rotation: turned,
            },
        );
        level.listeners.insert(ColliderId(30), a);
        level.listeners.insert(ColliderId(31), b);

        level.tick(1.0 / 60.0);
        let origin = level.player.body.origin;
        assert!((origin.x - 21.0).abs() < 0.05);
        assert!(origin.z.abs() < 0.05);
        assert!(origin.y.abs() < 0.05);
        assert!((level.player.body.forward() - Vec3::x()).norm() < 1.0e-4);
        assert_eq!(
            level.drain_events(),
            vec![LevelEvent::Prop(PropEvent::Teleported {
                from: ColliderId(30),
                to: ColliderId(31)
            })]
        );

        for _ in 0..10 {
            level.tick(1.0 / 60.0);
        }
        assert!(level.drain_events().is_empty());
        assert!((level.player.body.origin.x - 21.0).abs() < 0.05);
    }

    #[test]
    fn volume_reports_entering_and_leaving() {
        let room = ColliderDef::new(
            40,
            ColliderShapeDef::Cuboid {
                half_extents: Vec3::new(1.0, 1.5, 1.0),
            },
            Vec3::new(5.0, 1.5, 0.0),
        )
        .trigger();
        let mut level = Level::new(QueryWorld::build(vec![floor(), room]), player_at(Vec3::new(2.0, 0.0, 0.0)));
        level.listeners.insert(ColliderId(40), Volume::new(ColliderId(40)));
        let place = |level: &mut Level, x: f32| {
            level.player.body.set_pose(Pose {
                position: Vec3::new(x, 0.0, 0.0),
                rotation: Quat::identity(),
            });
        };

        level.tick(DT);
        place(&mut level, 4.2);
        level.tick(DT);
        level.tick(DT);
        place(&mut level, 10.0);
        level.tick(DT);
        level.tick(DT);

        let volume = ColliderId(40);
        assert_eq!(
            level.drain_events(),
            vec![
                LevelEvent::Prop(PropEvent::VolumeEntered { volume }),
                LevelEvent::Prop(PropEvent::VolumeExited { volume }),
            ]
        );
    }

    #[test]
    fn killed_enemy_leaves_the_world() {
        let mut level = level_on_floor(player_at(Vec3::new(5.0, 0.0, 0.0)));
        let index = level.add_enemy(enemy_at(Vec3::zeros(), EnemyStats::default()));
        if let Some(enemy) = level.enemy_mut(index) {
            enemy.apply_damage(3, 0.0);
        }
        level.tick(DT);
        assert!(level.world.collider(ColliderId(20)).is_none());
    }

    #[test]
    fn player_respawns_after_delay() {
        let mut level = level_on_floor(player_at(Vec3::zeros()));
        level.respawn_delay = Some(0.5);
        level.player.die();
        level.player.body.set_pose(Pose {
            position: Vec3::new(3.0, 0.0, 0.0),
            rotation: Quat::identity(),
        });

        for _ in 0..10 {
            level.tick(0.05);
        }
        assert!(level.player.health.is_empty());

        for _ in 0..2 {
            level.tick(0.05);
        }
        assert_eq!(level.player.health.current(), 3);
        assert_eq!(level.player.status.current(), PlayerStateId::Idle);
        assert!(level.player.body.origin.x.abs() < 1.0e-3);
    }
}
