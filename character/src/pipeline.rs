/*!
The per-frame update shared by every actor kind.

Order (fixed):
1. Carry the actor with its attachment (moving platform)
2. State step
3. Integrate velocity (sweep-and-slide)
4. Ground check
5. Contact resolution
6. Actor-specific post-update hook
7. Pending transitions
8. Penetration correction

State logic sets the intended velocity before integration; ground and contact checks see the
post-move pose; penetration correction runs last so movement never overwrites it.
*/

use collision::{ColliderInfo, Hit, ShapeQueries};

use crate::{
    body::Body,
    contacts::{correct_penetration, handle_contacts},
    events::Events,
    fsm::{StateId, StateMachine, StateStatus},
    ground::handle_ground,
    props::{ActorKind, ContactReaction, ContactSubject, Listeners},
};

/// Explicit per-tick context.
#[derive(Clone, Copy)]
pub struct Frame<'a> {
    pub dt: f32,
    /// Simulation time at the end of this tick.
    pub time: f32,
    pub world: &'a dyn ShapeQueries,
}

/// What the motion core needs from an actor, plus the hooks an actor kind may override.
///
/// Default hook bodies are the base behaviors.
pub trait MotionHost: Sized {
    type Id: StateId;

    const KIND: ActorKind;

    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;
    fn status(&self) -> &StateStatus<Self::Id>;
    fn status_mut(&mut self) -> &mut StateStatus<Self::Id>;
    fn events_mut(&mut self) -> &mut Events;

    fn is_alive(&self) -> bool {
        true
    }

    fn evaluate_landing(&self, _frame: &Frame, hit: &Hit) -> bool {
        self.body().default_landing(hit)
    }

    /// Standing on ground steeper than the slope limit.
    fn handle_slope_limit(&mut self, _frame: &Frame, _hit: &Hit) {}

    /// Ground hit above the step height (edge of a ledge, wall-like surface).
    fn handle_high_ledge(&mut self, _frame: &Frame, _hit: &Hit) {}

    fn on_ground_enter(&mut self, _frame: &Frame) {}

    fn on_ground_exit(&mut self, _frame: &Frame) {}

    /// What contact listeners see of this actor.
    fn contact_subject(&self) -> ContactSubject {
        ContactSubject::new(self.body(), Self::KIND, self.is_alive())
    }

    /// Apply a listener's reaction to touching this actor.
    fn apply_reaction(&mut self, _frame: &Frame, _reaction: ContactReaction) {}

    /// Runs after contact resolution, before penetration correction.
    fn on_update(&mut self, _frame: &Frame, _listeners: &mut Listeners) {}
}

/// Advance one actor by one frame.
pub fn update<A: MotionHost>(
    actor: &mut A,
    machine: &mut StateMachine<A>,
    frame: &Frame,
    listeners: &mut Listeners,
) {
    if !actor.body().enabled {
        return;
    }

    actor.body_mut().follow_attachment(frame.world);
    machine.step(actor, frame);
    actor.body_mut().integrate(frame.world, frame.dt);
    handle_ground(actor, frame);
    handle_contacts(actor, machine, frame, listeners);
    actor.on_update(frame, listeners);
    machine.apply_pending(actor, frame);
    correct_penetration(actor.body_mut(), frame);
}

/// Colliders tagged for gameplay that overlap the actor, triggers included.
pub fn overlapping_triggers(body: &Body, world: &dyn ShapeQueries) -> Vec<ColliderInfo> {
    body.overlap(world, 0.0, collision::TriggerPolicy::Collide)
        .into_iter()
        .filter_map(|id| world.collider(id))
        .filter(|info| info.is_trigger)
        .collect()
}
