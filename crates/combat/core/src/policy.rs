//! Behavior policy interface.
//!
//! Policies are pure deciders: they read a [`PolicyView`] of the simulation and
//! return the [`Intent`] they want executed. They cannot mutate state and they
//! never see the random source.

use crate::action::{ActionError, Intent};
use crate::actor::Actor;
use crate::catalog::Catalog;
use crate::types::{ActionId, ActorId, SimTime};

/// An intent the simulator refused during the current decision round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejection {
    pub intent: Intent,
    pub error: ActionError,
}

/// Pluggable decision logic attached to an actor.
pub trait BehaviorPolicy: Send {
    /// Return the next intent, or `None` to idle until the retry delay.
    ///
    /// After a rejection the simulator asks again within the same round with
    /// the rejection listed in [`PolicyView::rejections`].
    fn decide(&self, view: &PolicyView<'_>) -> Option<Intent>;
}

impl<F> BehaviorPolicy for F
where
    F: Fn(&PolicyView<'_>) -> Option<Intent> + Send,
{
    fn decide(&self, view: &PolicyView<'_>) -> Option<Intent> {
        self(view)
    }
}

/// Policy that never acts.
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl BehaviorPolicy for Idle {
    fn decide(&self, _view: &PolicyView<'_>) -> Option<Intent> {
        None
    }
}

/// Read-only snapshot handed to a policy.
#[derive(Clone, Copy)]
pub struct PolicyView<'a> {
    pub(crate) now: SimTime,
    pub(crate) horizon: SimTime,
    pub(crate) execute_window: SimTime,
    pub(crate) actor: &'a Actor,
    pub(crate) actors: &'a [Actor],
    pub(crate) catalog: &'a Catalog,
    pub(crate) rejections: &'a [Rejection],
}

impl<'a> PolicyView<'a> {
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Time left until the run's horizon.
    pub fn remaining(&self) -> SimTime {
        self.horizon.saturating_sub(self.now)
    }

    /// The deciding actor.
    pub fn actor(&self) -> &'a Actor {
        self.actor
    }

    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn get(&self, id: ActorId) -> Option<&'a Actor> {
        self.actors.iter().find(|actor| actor.id() == id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &'a Actor> {
        self.actors.iter()
    }

    /// Living actors hostile to the deciding actor, in registration order.
    pub fn hostiles(&self) -> impl Iterator<Item = &'a Actor> {
        let team = self.actor.team();
        self.actors
            .iter()
            .filter(move |actor| actor.is_alive() && actor.team().is_hostile_to(team))
    }

    /// The deciding actor's default target.
    pub fn target(&self) -> Option<&'a Actor> {
        self.actor.default_target().and_then(|id| self.get(id))
    }

    pub fn rejections(&self) -> &'a [Rejection] {
        self.rejections
    }

    pub fn was_rejected(&self, action: ActionId) -> bool {
        self.rejections
            .iter()
            .any(|rejection| rejection.intent.action == action)
    }

    /// True inside the trailing execute window of the horizon.
    pub fn in_execute_phase(&self) -> bool {
        self.remaining() <= self.execute_window
    }

    /// Whether `action` would pass resolution's actor-side checks right now.
    pub fn is_ready(&self, action: ActionId) -> bool {
        self.catalog
            .action(action)
            .is_some_and(|definition| self.actor.can_use(definition, self.now))
    }

    /// Time until `action`'s recast timer elapses.
    pub fn recast_remaining(&self, action: ActionId) -> SimTime {
        self.catalog
            .action(action)
            .map(|definition| self.actor.recast_remaining(definition.recast_key(), self.now))
            .unwrap_or(SimTime::ZERO)
    }
}
