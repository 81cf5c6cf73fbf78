//! Patrol route with a delayed advance between points.

use collision::Vec3;
use log::debug;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WaypointMode {
    /// Walk to the last point, then back to the first.
    #[default]
    PingPong,
    /// Wrap around to the first point.
    Loop,
    /// Stop at the last point.
    Once,
}

/// A change of current point waiting out `wait_time`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingChange {
    to: usize,
    elapsed: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Waypoints {
    pub mode: WaypointMode,
    /// Seconds spent at a point before moving on.
    pub wait_time: f32,
    points: Vec<Vec3>,
    index: usize,
    pong: bool,
    change: Option<PendingChange>,
}

impl Default for Waypoints {
    fn default() -> Self {
        Self::new(Vec::new(), WaypointMode::default())
    }
}

impl Waypoints {
    pub fn new(points: Vec<Vec3>, mode: WaypointMode) -> Self {
        Self {
            mode,
            wait_time: 0.0,
            points,
            index: 0,
            pong: false,
            change: None,
        }
    }

    #[inline]
    pub fn with_wait(mut self, wait_time: f32) -> Self {
        self.wait_time = wait_time;
        self
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn current(&self) -> Option<Vec3> {
        self.points.get(self.index).copied()
    }

    /// Waiting to switch to the next point.
    #[inline]
    pub fn is_changing(&self) -> bool {
        self.change.is_some()
    }

    /// Schedule the move to the next point. Ignored while a change is already waiting.
    pub fn next(&mut self) {
        if self.change.is_some() {
            return;
        }
        let count = self.points.len();
        let to = match self.mode {
            WaypointMode::PingPong => {
                if count < 2 {
                    return;
                }
                self.pong = if self.pong {
                    self.index > 0
                } else {
                    self.index + 1 == count
                };
                if self.pong { self.index - 1 } else { self.index + 1 }
            }
            WaypointMode::Loop => {
                if count == 0 {
                    return;
                }
                (self.index + 1) % count
            }
            WaypointMode::Once => {
                if self.index + 1 >= count {
                    return;
                }
                self.index + 1
            }
        };
        self.change = Some(PendingChange { to, elapsed: 0.0 });
    }

    /// Run the pending change forward by `dt`.
    pub fn advance(&mut self, dt: f32) {
        let Some(mut change) = self.change else {
            return;
        };
        change.elapsed += dt;
        if change.elapsed >= self.wait_time {
            debug!("waypoint {} -> {}", self.index, change.to);
            self.index = change.to;
            self.change = None;
        } else {
            self.change = Some(change);
        }
    }

    /// Cancel any pending change and go back to the first point.
    pub fn reset(&mut self) {
        self.index = 0;
        self.pong = false;
        self.change = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route(mode: WaypointMode) -> Waypoints {
        let points = (0..3).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        Waypoints::new(points, mode)
    }

    fn visit(waypoints: &mut Waypoints, steps: usize) -> Vec<usize> {
        (0..steps)
            .map(|_| {
                waypoints.next();
                waypoints.advance(0.0);
                waypoints.index()
            })
            .collect()
    }

    #[test]
    fn ping_pong_bounces_between_ends() {
        let mut waypoints = route(WaypointMode::PingPong);
        assert_eq!(visit(&mut waypoints, 6), vec![1, 2, 1, 0, 1, 2]);
    }

    #[test]
    fn loop_wraps_and_once_stops() {
        let mut looping = route(WaypointMode::Loop);
        assert_eq!(visit(&mut looping, 4), vec![1, 2, 0, 1]);

        let mut once = route(WaypointMode::Once);
        assert_eq!(visit(&mut once, 4), vec![1, 2, 2, 2]);
    }

    #[test]
    fn change_waits_and_ignores_repeated_requests() {
        let mut waypoints = route(WaypointMode::Loop).with_wait(1.0);
        waypoints.next();
        waypoints.advance(0.6);
        waypoints.next();
        assert_eq!(waypoints.index(), 0);
        assert!(waypoints.is_changing());

        waypoints.advance(0.6);
        assert_eq!(waypoints.index(), 1);
        assert!(!waypoints.is_changing());
    }

    #[test]
    fn reset_cancels_pending_change() {
        let mut waypoints = route(WaypointMode::Loop).with_wait(1.0);
        waypoints.next();
        waypoints.reset();
        waypoints.advance(2.0);
        assert_eq!(waypoints.index(), 0);
        assert_eq!(waypoints.current(), Some(Vec3::zeros()));
    }

    #[test]
    fn single_point_ping_pong_stays_put() {
        let mut waypoints = Waypoints::new(vec![Vec3::x()], WaypointMode::PingPong);
        waypoints.next();
        assert!(!waypoints.is_changing());
        assert_eq!(waypoints.current(), Some(Vec3::x()));
    }
}
