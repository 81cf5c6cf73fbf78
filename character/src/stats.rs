//! Configuration provider: a stack of tuning sets with one active at a time.
//!
//! States read `current()` every frame and never write to it.

use log::warn;

#[derive(Clone, Debug)]
pub struct StatsManager<T> {
    sets: Vec<T>,
    active: usize,
}

impl<T: Default> Default for StatsManager<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> StatsManager<T> {
    pub fn new(initial: T) -> Self {
        Self {
            sets: vec![initial],
            active: 0,
        }
    }

    /// Add a tuning set; returns its index.
    pub fn push(&mut self, set: T) -> usize {
        self.sets.push(set);
        self.sets.len() - 1
    }

    #[inline]
    pub fn current(&self) -> &T {
        &self.sets[self.active]
    }

    #[inline]
    pub fn active(&self) -> usize {
        self.active
    }

    /// Switch the active set. Out-of-range indices are ignored.
    pub fn change(&mut self, index: usize) {
        if index < self.sets.len() {
            self.active = index;
        } else {
            warn!("stats set {index} does not exist ({} sets)", self.sets.len());
        }
    }
}
