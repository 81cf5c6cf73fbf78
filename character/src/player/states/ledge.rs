use collision::{Vec3, settings::DEFAULT_CONTACT_OFFSET};

use super::PlayerStateId;
use crate::{
    events::Event,
    fsm::State,
    math::{planar_direction, up},
    pipeline::Frame,
    player::Player,
    settings::{LEDGE_PARENT_CLEAR_DELAY, TIME_EPSILON},
};

/// Hanging from a ledge: shimmy sideways, drop, jump, or climb up.
#[derive(Debug, Default)]
pub struct LedgeHanging {
    /// Keep riding the ledge's collider after leaving (set when climbing up).
    keep_attachment: bool,
}

impl State<Player> for LedgeHanging {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        player.reset_jumps();
        player.reset_air_spins();
        player.reset_air_dash();
        self.keep_attachment = false;
        player.ledge_release_at = None;
    }

    fn exit(&mut self, player: &mut Player, frame: &Frame) {
        if !self.keep_attachment {
            player.ledge_release_at = Some(frame.time + LEDGE_PARENT_CLEAR_DELAY);
        }
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let s = player.stats();
        let body = &player.body;
        let (height, radius) = (body.capsule.height, body.capsule.radius);
        let position = body.position();
        let forward = body.forward();
        let filter = body.filter().with_layers(s.ledge_hanging_layers);

        let top_origin = position
            + up() * (height * 0.5 + s.ledge_max_downward_distance)
            + forward * (radius + s.ledge_max_forward_distance);
        let side_origin = position + up() * (height * 0.5 - s.ledge_side_height_offset);

        let side = frame.world.sphere_cast(
            side_origin,
            s.ledge_side_collision_radius,
            forward,
            radius + s.ledge_side_max_distance,
            filter,
        );
        let top = frame.world.raycast(top_origin, -up(), height, filter);

        let (Some(side), Some(top)) = (side, top) else {
            player.status.change(PlayerStateId::Fall);
            return;
        };

        let input = player.input.movement_direction();
        let side_forward = -planar_direction(side.normal);
        player.body.face_direction(side_forward);

        // Shimmy only while the wall continues in the input direction.
        let sign = if input.x < 0.0 { -1.0 } else { 1.0 };
        let right = player.body.right();
        let shimmy_origin = side_origin + right * sign * radius;
        let wall_ahead = frame
            .world
            .raycast(shimmy_origin, side_forward, radius + s.ledge_side_max_distance, filter)
            .is_some();
        let shimmy = if wall_ahead {
            right * input.x * s.ledge_movement_speed
        } else {
            Vec3::zeros()
        };
        player.body.set_lateral_velocity(shimmy);

        let ledge_height = top.point.y - height * 0.5;
        let hang = Vec3::new(side.point.x, ledge_height, side.point.z) - side_forward * radius;
        player.body.set_position(hang);

        let climbable = frame
            .world
            .collider(top.collider)
            .is_some_and(|info| s.ledge_climbing_layers.has(info.layer));

        if player.input.release_ledge_down() {
            player.body.face_direction(-side_forward);
            player.status.change(PlayerStateId::Fall);
        } else if player.input.jump_down() {
            player.jump_with(s.max_jump_height);
        } else if input.z > 0.0 && s.can_climb_ledges && climbable {
            self.keep_attachment = true;
            player.status.change(PlayerStateId::LedgeClimbing);
            player.events.push(Event::LedgeClimbing);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum ClimbPhase {
    Rise,
    Step,
    Done,
}

/// Timed two-leg move: straight up to the ledge height, then forward onto its top.
///
/// Points are kept in the ledge collider's frame when the player rides one.
#[derive(Clone, Copy, Debug)]
struct LedgeClimb {
    start: Vec3,
    over: Vec3,
    onto: Vec3,
    half: f32,
    elapsed: f32,
    phase: ClimbPhase,
}

impl LedgeClimb {
    fn new(player: &Player) -> Self {
        let body = &player.body;
        let over = body.origin + up() * (body.capsule.height + DEFAULT_CONTACT_OFFSET);
        let onto = over + body.forward() * body.capsule.radius * 2.0;
        let local = |p: Vec3| body.attachment.map_or(p, |a| a.to_local(p));
        Self {
            start: local(body.origin),
            over: local(over),
            onto: local(onto),
            half: player.stats().ledge_climbing_duration * 0.5,
            elapsed: 0.0,
            phase: ClimbPhase::Rise,
        }
    }

    /// Advance by `dt`; returns the origin for this tick. Time past a leg's end runs into the next.
    fn advance(&mut self, dt: f32) -> Vec3 {
        self.elapsed += dt;
        let slack = TIME_EPSILON as f32;
        while self.phase != ClimbPhase::Done && self.elapsed + slack >= self.half {
            self.elapsed = (self.elapsed - self.half).max(0.0);
            self.phase = match self.phase {
                ClimbPhase::Rise => ClimbPhase::Step,
                ClimbPhase::Step | ClimbPhase::Done => ClimbPhase::Done,
            };
        }
        let t = if self.half > 0.0 {
            (self.elapsed / self.half).min(1.0)
        } else {
            1.0
        };
        match self.phase {
            ClimbPhase::Rise => self.start.lerp(&self.over, t),
            ClimbPhase::Step => self.over.lerp(&self.onto, t),
            ClimbPhase::Done => self.onto,
        }
    }

    fn is_done(&self) -> bool {
        self.phase == ClimbPhase::Done
    }
}

#[derive(Debug, Default)]
pub struct LedgeClimbing {
    routine: Option<LedgeClimb>,
}

impl State<Player> for LedgeClimbing {
    fn enter(&mut self, player: &mut Player, _frame: &Frame) {
        player.body.velocity = Vec3::zeros();
        self.routine = Some(LedgeClimb::new(player));
    }

    fn exit(&mut self, _player: &mut Player, _frame: &Frame) {
        self.routine = None;
    }

    fn step(&mut self, player: &mut Player, frame: &Frame) {
        let Some(routine) = self.routine.as_mut() else {
            player.status.change(PlayerStateId::Idle);
            return;
        };
        player.body.velocity = Vec3::zeros();
        let point = routine.advance(frame.dt);
        player.body.origin = player.body.attachment.map_or(point, |a| a.to_world(point));

        if routine.is_done() {
            player.status.change(PlayerStateId::Idle);
        }
    }
}
