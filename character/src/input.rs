/*!
Per-frame player input.

The host feeds one [`InputFrame`] per tick (already polled from whatever device); the
[`PlayerInput`] manager turns it into the queries states use: camera-relative movement with a
cross dead zone, a short jump buffer, and temporary movement locks.
*/

use collision::{BitmaskFlags, Quat, Vec3, define_bitmask_flags};
use nalgebra as na;

use crate::settings::{INPUT_DEADZONE, JUMP_BUFFER, MOVEMENT_LOCK};

define_bitmask_flags!(Action, u16, {
    Jump,
    Run,
    Dive,
    Spin,
    PickAndDrop,
    Crouch,
    AirDive,
    Stomp,
    ReleaseLedge,
    Pause,
    Glide,
    Dash,
});

pub type Actions = BitmaskFlags<u16>;

/// Raw input for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputFrame {
    /// Stick or keys, x right and y forward, each in `[-1, 1]`.
    pub movement: na::Vector2<f32>,
    pub look: na::Vector2<f32>,
    /// Mouse look skips the dead zone.
    pub look_with_mouse: bool,
    /// Camera yaw in degrees, used to make movement camera-relative.
    pub camera_yaw: f32,
    /// Buttons held this tick.
    pub held: Actions,
    /// Buttons that went down this tick.
    pub pressed: Actions,
    /// Buttons that went up this tick.
    pub released: Actions,
}

impl InputFrame {
    pub fn moving(x: f32, y: f32) -> Self {
        Self {
            movement: na::Vector2::new(x, y),
            ..Self::default()
        }
    }

    /// Press and hold `action` this tick.
    pub fn press(mut self, action: Action) -> Self {
        self.pressed.add(action);
        self.held.add(action);
        self
    }

    pub fn hold(mut self, action: Action) -> Self {
        self.held.add(action);
        self
    }

    pub fn release(mut self, action: Action) -> Self {
        self.released.add(action);
        self.held.remove(action);
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct PlayerInput {
    frame: InputFrame,
    time: f32,
    last_jump_time: Option<f32>,
    movement_unlock_time: f32,
}

impl PlayerInput {
    /// Take this tick's input. Jump presses are buffered.
    pub fn feed(&mut self, frame: InputFrame, time: f32) {
        if frame.pressed.has(Action::Jump) {
            self.last_jump_time = Some(time);
        }
        self.frame = frame;
        self.time = time;
    }

    #[inline]
    pub fn frame(&self) -> &InputFrame {
        &self.frame
    }

    /// Movement on the XZ plane, zero while locked.
    pub fn movement_direction(&self) -> Vec3 {
        if self.time < self.movement_unlock_time {
            return Vec3::zeros();
        }
        cross_dead_zone(self.frame.movement)
    }

    /// Movement rotated by the camera yaw and normalized.
    pub fn movement_camera_direction(&self) -> Vec3 {
        let direction = self.movement_direction();
        if direction.norm_squared() == 0.0 {
            return direction;
        }
        let yaw = Quat::from_axis_angle(&Vec3::y_axis(), self.frame.camera_yaw.to_radians());
        (yaw * direction).normalize()
    }

    pub fn look_direction(&self) -> Vec3 {
        let look = self.frame.look;
        if self.frame.look_with_mouse {
            Vec3::new(look.x, 0.0, look.y)
        } else {
            cross_dead_zone(look)
        }
    }

    /// Ignore movement for `duration` seconds.
    pub fn lock_movement_direction(&mut self, duration: f32) {
        self.movement_unlock_time = self.time + duration;
    }

    /// [`PlayerInput::lock_movement_direction`] for the default lock time.
    pub fn lock_movement(&mut self) {
        self.lock_movement_direction(MOVEMENT_LOCK);
    }

    /// A jump pressed within the buffer window. Consumes the press.
    pub fn jump_down(&mut self) -> bool {
        match self.last_jump_time {
            Some(t) if self.time - t < JUMP_BUFFER => {
                self.last_jump_time = None;
                true
            }
            _ => false,
        }
    }

    #[inline]
    pub fn jump_up(&self) -> bool {
        self.frame.released.has(Action::Jump)
    }

    #[inline]
    pub fn run(&self) -> bool {
        self.frame.held.has(Action::Run)
    }

    #[inline]
    pub fn run_up(&self) -> bool {
        self.frame.released.has(Action::Run)
    }

    #[inline]
    pub fn dive(&self) -> bool {
        self.frame.held.has(Action::Dive)
    }

    #[inline]
    pub fn crouch(&self) -> bool {
        self.frame.held.has(Action::Crouch)
    }

    #[inline]
    pub fn glide(&self) -> bool {
        self.frame.held.has(Action::Glide)
    }

    #[inline]
    pub fn spin_down(&self) -> bool {
        self.frame.pressed.has(Action::Spin)
    }

    #[inline]
    pub fn pick_and_drop_down(&self) -> bool {
        self.frame.pressed.has(Action::PickAndDrop)
    }

    #[inline]
    pub fn air_dive_down(&self) -> bool {
        self.frame.pressed.has(Action::AirDive)
    }

    #[inline]
    pub fn stomp_down(&self) -> bool {
        self.frame.pressed.has(Action::Stomp)
    }

    #[inline]
    pub fn release_ledge_down(&self) -> bool {
        self.frame.pressed.has(Action::ReleaseLedge)
    }

    #[inline]
    pub fn dash_down(&self) -> bool {
        self.frame.pressed.has(Action::Dash)
    }

    #[inline]
    pub fn pause_down(&self) -> bool {
        self.frame.pressed.has(Action::Pause)
    }
}

/// Per-axis dead zone with the live range remapped to `[0, 1]`, sign preserved.
fn cross_dead_zone(axis: na::Vector2<f32>) -> Vec3 {
    let remap = |v: f32| {
        if v.abs() > INPUT_DEADZONE {
            v.signum() * (v.abs() - INPUT_DEADZONE) / (1.0 - INPUT_DEADZONE)
        } else {
            0.0
        }
    };
    Vec3::new(remap(axis.x), 0.0, remap(axis.y))
}
