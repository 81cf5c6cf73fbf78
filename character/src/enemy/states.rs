use collision::Vec3;

use super::Enemy;
use crate::{
    fsm::{State, StateId, StateMachine},
    math::planar_direction,
    pipeline::Frame,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyStateId {
    Idle,
    Waypoint,
    Follow,
}

impl StateId for EnemyStateId {
    const ALL: &'static [Self] = &[Self::Idle, Self::Waypoint, Self::Follow];

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// A machine with every enemy state registered.
pub fn enemy_machine() -> StateMachine<Enemy> {
    StateMachine::new()
        .with(EnemyStateId::Idle, Idle)
        .with(EnemyStateId::Waypoint, Waypoint)
        .with(EnemyStateId::Follow, Follow)
}

pub struct Idle;

impl State<Enemy> for Idle {
    fn step(&mut self, enemy: &mut Enemy, frame: &Frame) {
        enemy.gravity(frame.dt);
        enemy.snap_to_ground();
        enemy.friction(frame.dt);
    }
}

/// Walk the patrol route, pausing at each point for the route's wait time.
pub struct Waypoint;

impl State<Enemy> for Waypoint {
    fn step(&mut self, enemy: &mut Enemy, frame: &Frame) {
        enemy.gravity(frame.dt);
        enemy.snap_to_ground();

        let Some(destination) = enemy.waypoints.current() else {
            enemy.friction(frame.dt);
            return;
        };
        let position = enemy.body.position();
        let head = Vec3::new(destination.x, position.y, destination.z) - position;
        let distance = head.norm();
        let s = enemy.stats();

        if distance <= s.waypoint_min_distance {
            enemy.decelerate(frame.dt);
            enemy.waypoints.next();
        } else {
            let direction = head / distance;
            enemy.accelerate(direction, s.waypoint_acceleration, s.waypoint_top_speed, frame.dt);
            if s.face_waypoint {
                enemy.face_direction_smooth(direction, frame.dt);
            }
        }
    }
}

/// Chase the spotted player on the ground plane.
pub struct Follow;

impl State<Enemy> for Follow {
    fn step(&mut self, enemy: &mut Enemy, frame: &Frame) {
        enemy.gravity(frame.dt);
        enemy.snap_to_ground();

        let Some(player) = enemy.player else {
            let home = enemy.home();
            enemy.status.change(home);
            return;
        };
        let s = enemy.stats();
        let direction = planar_direction(player.position - enemy.body.position());
        enemy.accelerate(direction, s.follow_acceleration, s.follow_top_speed, frame.dt);
        enemy.face_direction_smooth(direction, frame.dt);
    }
}
