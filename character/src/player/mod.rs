/*!
The player actor.

- stats:   tuning (`PlayerStats`)
- actions: movement and ability actions the states compose
- host:    motion-core hooks (landing, slopes, high ledges, reactions, trigger pass)
- states:  the player state set and its machine builder

States never touch the player's fields for anything an action already covers; actions are
no-ops when their preconditions fail, so a state can call them unconditionally.
*/

mod actions;
mod host;
mod states;
mod stats;


use std::collections::BTreeSet;

use collision::{Bounds, ColliderId, Vec3};
use log::info;

use crate::{
    body::{Body, Pose},
    events::Events,
    fsm::StateStatus,
    health::{Health, HealthSnapshot},
    input::PlayerInput,
    props::Pole,
    stats::StatsManager,
};

pub use states::{PlayerStateId, player_machine};
pub use stats::PlayerStats;

/// The water trigger the player is swimming in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WaterVolume {
    pub collider: ColliderId,
    pub bounds: Bounds,
}

pub struct Player {
    pub body: Body,
    pub status: StateStatus<PlayerStateId>,
    pub stats: StatsManager<PlayerStats>,
    pub input: PlayerInput,
    pub health: Health,
    pub events: Events,

    pub jump_count: u32,
    pub air_spin_count: u32,
    pub air_dash_count: u32,
    pub last_dash_time: Option<f32>,

    /// Pickable collider carried by the player.
    pub holding: Option<ColliderId>,
    /// Pole being climbed, set by `grab_pole`.
    pub pole: Option<Pole>,
    pub water: Option<WaterVolume>,
    /// Normal of the wall found by the last `wall_drag` probe.
    pub last_wall_normal: Vec3,

    /// When a released ledge stops carrying the player.
    ledge_release_at: Option<f32>,
    respawn: Pose,
    checkpoints: BTreeSet<ColliderId>,
}

impl Player {
    /// Panics if `stats` does not validate.
    pub fn new(body: Body, stats: PlayerStats) -> Self {
        if let Err(e) = stats.validate() {
            panic!("invalid player stats: {e}");
        }
        let respawn = body.pose();
        Self {
            body,
            status: StateStatus::new(PlayerStateId::Idle),
            stats: StatsManager::new(stats),
            input: PlayerInput::default(),
            health: Health::default(),
            events: Events::default(),
            jump_count: 0,
            air_spin_count: 0,
            air_dash_count: 0,
            last_dash_time: None,
            holding: None,
            pole: None,
            water: None,
            last_wall_normal: Vec3::zeros(),
            ledge_release_at: None,
            respawn,
            checkpoints: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn with_health(mut self, health: Health) -> Self {
        self.health = health;
        self
    }

    /// Active tuning snapshot.
    #[inline]
    pub fn stats(&self) -> PlayerStats {
        *self.stats.current()
    }

    #[inline]
    pub fn on_water(&self) -> bool {
        self.water.is_some()
    }

    // --- Persistence boundary ---

    #[inline]
    pub fn respawn_pose(&self) -> Pose {
        self.respawn
    }

    pub fn set_respawn(&mut self, pose: Pose) {
        self.respawn = pose;
    }

    #[inline]
    pub fn health_snapshot(&self) -> HealthSnapshot {
        self.health.snapshot()
    }

    pub fn restore_health(&mut self, snapshot: HealthSnapshot) {
        self.health.restore(snapshot);
    }

    /// Full health back at the respawn pose, requesting Idle.
    pub fn respawn(&mut self) {
        self.health.reset();
        self.body.set_pose(self.respawn);
        self.body.velocity = Vec3::zeros();
        self.body.enabled = true;
        self.holding = None;
        self.pole = None;
        self.water = None;
        self.ledge_release_at = None;
        self.reset_jumps();
        self.reset_air_spins();
        self.reset_air_dash();
        self.status.change(PlayerStateId::Idle);
    }

    /// Record a checkpoint. Each checkpoint activates once; returns whether this one did.
    pub fn activate_checkpoint(&mut self, id: ColliderId, pose: Pose) -> bool {
        if !self.checkpoints.insert(id) {
            return false;
        }
        info!("checkpoint {id:?} activated");
        self.set_respawn(pose);
        true
    }
}
