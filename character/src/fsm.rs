/*!
Per-actor finite state machine.

- `StateId`:      closed enum of state identifiers for one actor kind
- `StateStatus`:  the queryable side (current, previous, time in state, pending request),
                  stored on the actor so states and outside systems can read it
- `State`:        behavior unit with enter/exit/step/contact callbacks
- `StateMachine`: behavior table indexed by id, applying transitions

Change requests are queued on the status and applied once the running callback returns; the
last request wins. A transition whose enter/exit requests yet another change is followed, up
to `MAX_TRANSITIONS_PER_TICK` links in one chain.
*/

use std::fmt::Debug;

use collision::ColliderInfo;
use log::{debug, warn};

use crate::{
    pipeline::{Frame, MotionHost},
    settings::{MAX_TRANSITIONS_PER_TICK, TIME_EPSILON},
};

/// Identifier of a state in a closed state set.
pub trait StateId: Copy + Eq + Debug + 'static {
    /// Every id, in index order.
    const ALL: &'static [Self];

    fn index(self) -> usize;
}

#[derive(Clone, Debug)]
pub struct StateStatus<I: StateId> {
    current: I,
    previous: Option<I>,
    time_since_entered: f64,
    pending: Option<I>,
    registered: Vec<bool>,
}

impl<I: StateId> StateStatus<I> {
    pub fn new(initial: I) -> Self {
        Self {
            current: initial,
            previous: None,
            time_since_entered: 0.0,
            pending: None,
            registered: vec![false; I::ALL.len()],
        }
    }

    #[inline]
    pub fn current(&self) -> I {
        self.current
    }

    #[inline]
    pub fn previous(&self) -> Option<I> {
        self.previous
    }

    #[inline]
    pub fn time_since_entered(&self) -> f32 {
        self.time_since_entered as f32
    }

    /// More than `duration` seconds spent in the current state, within [`TIME_EPSILON`].
    #[inline]
    pub fn elapsed_past(&self, duration: f32) -> bool {
        self.time_since_entered > f64::from(duration) + TIME_EPSILON
    }

    /// At least `duration` seconds spent in the current state, within [`TIME_EPSILON`].
    #[inline]
    pub fn elapsed_at_least(&self, duration: f32) -> bool {
        self.time_since_entered + TIME_EPSILON >= f64::from(duration)
    }

    #[inline]
    pub fn is_current(&self, id: I) -> bool {
        self.current == id
    }

    /// Whether the actor's state set has a behavior for `id`.
    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.registered.get(id.index()).copied().unwrap_or(false)
    }

    /// Request a transition. Applied after the running callback; the last request wins.
    #[inline]
    pub fn change(&mut self, id: I) {
        self.pending = Some(id);
    }

    #[inline]
    pub fn pending(&self) -> Option<I> {
        self.pending
    }

    fn take_pending(&mut self) -> Option<I> {
        self.pending.take()
    }

    fn swap(&mut self, next: I) {
        self.previous = Some(self.current);
        self.current = next;
        self.time_since_entered = 0.0;
    }
}

/// A behavior unit. Holds no configuration; only transient helpers for one activation.
pub trait State<A> {
    fn enter(&mut self, _actor: &mut A, _frame: &Frame) {}

    fn exit(&mut self, _actor: &mut A, _frame: &Frame) {}

    fn step(&mut self, actor: &mut A, frame: &Frame);

    /// Called zero or more times per frame, once per touching collider.
    fn on_contact(&mut self, _actor: &mut A, _frame: &Frame, _other: &ColliderInfo) {}
}

pub struct StateMachine<A: MotionHost> {
    behaviors: Vec<Option<Box<dyn State<A>>>>,
}

impl<A: MotionHost> Default for StateMachine<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: MotionHost> StateMachine<A> {
    pub fn new() -> Self {
        Self {
            behaviors: A::Id::ALL.iter().map(|_| None).collect(),
        }
    }

    /// Builder-style [`StateMachine::register`].
    pub fn with(mut self, id: A::Id, state: impl State<A> + 'static) -> Self {
        self.register(id, Box::new(state));
        self
    }

    /// Panics if `id` already has a behavior.
    pub fn register(&mut self, id: A::Id, state: Box<dyn State<A>>) {
        let slot = &mut self.behaviors[id.index()];
        assert!(slot.is_none(), "state {id:?} registered twice");
        *slot = Some(state);
    }

    #[inline]
    pub fn contains(&self, id: A::Id) -> bool {
        matches!(self.behaviors.get(id.index()), Some(Some(_)))
    }

    /// Publish the registered set and enter the actor's initial state.
    ///
    /// Panics if the initial state is not registered.
    pub fn start(&mut self, actor: &mut A, frame: &Frame) {
        let registered = A::Id::ALL.iter().map(|id| self.contains(*id)).collect();
        actor.status_mut().registered = registered;

        let initial = actor.status().current();
        self.behavior(initial).enter(actor, frame);
        self.apply_pending(actor, frame);
    }

    /// Advance time in state, run the current state's step, then apply its requests.
    pub fn step(&mut self, actor: &mut A, frame: &Frame) {
        actor.status_mut().time_since_entered += f64::from(frame.dt);
        let current = actor.status().current();
        self.behavior(current).step(actor, frame);
        self.apply_pending(actor, frame);
    }

    pub fn contact(&mut self, actor: &mut A, frame: &Frame, other: &ColliderInfo) {
        let current = actor.status().current();
        self.behavior(current).on_contact(actor, frame, other);
        self.apply_pending(actor, frame);
    }

    /// Immediate change for systems outside the state callbacks (respawn, damage).
    pub fn change(&mut self, actor: &mut A, frame: &Frame, id: A::Id) {
        actor.status_mut().change(id);
        self.apply_pending(actor, frame);
    }

    /// Apply queued change requests. A request for the current state is dropped.
    pub fn apply_pending(&mut self, actor: &mut A, frame: &Frame) {
        for _ in 0..MAX_TRANSITIONS_PER_TICK {
            let Some(next) = actor.status_mut().take_pending() else {
                return;
            };
            let current = actor.status().current();
            if next == current {
                continue;
            }
            assert!(self.contains(next), "no state registered for {next:?}");

            debug!("{current:?} -> {next:?}");
            self.behavior(current).exit(actor, frame);
            actor.status_mut().swap(next);
            self.behavior(next).enter(actor, frame);
        }

        if let Some(dropped) = actor.status_mut().take_pending() {
            warn!(
                "transition chain exceeded {MAX_TRANSITIONS_PER_TICK} changes; dropping change to {dropped:?}"
            );
        }
    }

    fn behavior(&mut self, id: A::Id) -> &mut dyn State<A> {
        match self.behaviors.get_mut(id.index()) {
            Some(Some(state)) => state.as_mut(),
            _ => panic!("no state registered for {id:?}"),
        }
    }
}
