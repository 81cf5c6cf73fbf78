//! Bounded hit points with a recovery window after each hit.

use num_traits::PrimInt;

/// Saved health for checkpoint and save systems.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthSnapshot<T: PrimInt = u32> {
    pub current: T,
    pub max: T,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Health<T: PrimInt = u32> {
    initial: T,
    max: T,
    current: T,
    /// Seconds of invulnerability after taking damage.
    pub cooldown: f32,
    last_damage_time: Option<f32>,
}

impl<T: PrimInt> Health<T> {
    pub fn new(initial: T, max: T) -> Self {
        Self {
            initial,
            max,
            current: initial.min(max),
            cooldown: 1.0,
            last_damage_time: None,
        }
    }

    #[inline]
    pub fn with_cooldown(mut self, cooldown: f32) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.max == T::zero() {
            return Err("max health must be positive");
        }
        if self.initial > self.max {
            return Err("initial health exceeds max health");
        }
        if !self.cooldown.is_finite() || self.cooldown < 0.0 {
            return Err("health cooldown must be a non-negative number");
        }
        Ok(())
    }

    #[inline]
    pub fn current(&self) -> T {
        self.current
    }

    #[inline]
    pub fn max(&self) -> T {
        self.max
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.current == T::zero()
    }

    /// Still inside the cooldown of the last hit.
    #[inline]
    pub fn recovering(&self, time: f32) -> bool {
        self.last_damage_time
            .is_some_and(|last| time < last + self.cooldown)
    }

    #[inline]
    pub fn set(&mut self, amount: T) {
        self.current = amount.min(self.max);
    }

    #[inline]
    pub fn increase(&mut self, amount: T) {
        self.set(self.current.saturating_add(amount));
    }

    /// Returns whether the hit landed (it is ignored while recovering).
    pub fn damage(&mut self, amount: T, time: f32) -> bool {
        if self.recovering(time) {
            return false;
        }
        self.current = self.current.saturating_sub(amount);
        self.last_damage_time = Some(time);
        true
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
        self.last_damage_time = None;
    }

    pub fn snapshot(&self) -> HealthSnapshot<T> {
        HealthSnapshot {
            current: self.current,
            max: self.max,
        }
    }

    pub fn restore(&mut self, snapshot: HealthSnapshot<T>) {
        self.max = snapshot.max;
        self.set(snapshot.current);
    }
}

impl Default for Health<u32> {
    fn default() -> Self {
        Self::new(3, 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero_and_respects_cooldown() {
        let mut h = Health::default();
        assert!(h.damage(2, 0.0));
        assert_eq!(h.current(), 1);
        assert!(h.recovering(0.5));
        assert!(!h.damage(1, 0.5));
        assert_eq!(h.current(), 1);

        assert!(h.damage(5, 1.5));
        assert_eq!(h.current(), 0);
        assert!(h.is_empty());
    }

    #[test]
    fn increase_and_set_clamp_to_max() {
        let mut h: Health<u8> = Health::new(1, 4);
        h.increase(250);
        assert_eq!(h.current(), 4);
        h.set(9);
        assert_eq!(h.current(), 4);
        h.reset();
        assert_eq!(h.current(), 1);
    }

    #[test]
    fn snapshot_round_trips_through_restore() {
        let mut h = Health::default();
        h.damage(1, 0.0);
        let saved = h.snapshot();
        h.reset();
        h.restore(saved);
        assert_eq!(h.current(), 2);
        assert!(Health::<u32>::new(4, 3).validate().is_err());
    }
}
