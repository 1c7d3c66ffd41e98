//! Rule conditions.
//!
//! Conditions are plain data so rotations can be written as tables. Composite
//! variants short-circuit left to right like the `&&`/`||` operators.

use combat_core::{ActionId, Actor, AuraId, PolicyView, ResourceKind, SimTime};

/// Which actor a condition inspects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scope {
    /// The deciding actor.
    #[default]
    Caster,
    /// The rule's target.
    Target,
}

/// Predicate evaluated against a policy view.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// Another action is off recast and affordable.
    ActionReady(ActionId),
    AuraPresent {
        aura: AuraId,
        on: Scope,
    },
    AuraMissing {
        aura: AuraId,
        on: Scope,
    },
    /// Present with less than `below` left, or absent.
    AuraRemainsBelow {
        aura: AuraId,
        on: Scope,
        below: SimTime,
    },
    AuraStacksAtLeast {
        aura: AuraId,
        on: Scope,
        stacks: u8,
    },
    ResourceAtLeast {
        resource: ResourceKind,
        amount: u32,
    },
    ResourceBelowPercent {
        resource: ResourceKind,
        percent: u32,
    },
    TargetHealthBelowPercent(u32),
    InExecutePhase,
    Not(Box<Condition>),
    /// True when every child holds; an empty list holds.
    All(Vec<Condition>),
    /// True when any child holds; an empty list does not.
    Any(Vec<Condition>),
}

impl Condition {
    /// Evaluate against `view`, with `target` as the rule's resolved target.
    ///
    /// Conditions scoped to a missing target are false.
    pub fn evaluate(&self, view: &PolicyView<'_>, target: Option<&Actor>) -> bool {
        let scoped = |on: Scope| match on {
            Scope::Caster => Some(view.actor()),
            Scope::Target => target,
        };

        match self {
            Condition::ActionReady(action) => view.is_ready(*action),
            Condition::AuraPresent { aura, on } => {
                scoped(*on).is_some_and(|actor| actor.auras().has(*aura))
            }
            Condition::AuraMissing { aura, on } => {
                scoped(*on).is_some_and(|actor| !actor.auras().has(*aura))
            }
            Condition::AuraRemainsBelow { aura, on, below } => scoped(*on)
                .is_some_and(|actor| actor.auras().remains(*aura, view.now()) < *below),
            Condition::AuraStacksAtLeast { aura, on, stacks } => {
                scoped(*on).is_some_and(|actor| actor.auras().stacks(*aura) >= *stacks)
            }
            Condition::ResourceAtLeast { resource, amount } => {
                view.actor().resources().current(*resource) >= *amount
            }
            Condition::ResourceBelowPercent { resource, percent } => {
                below_percent(view.actor(), *resource, *percent)
            }
            Condition::TargetHealthBelowPercent(percent) => target
                .is_some_and(|actor| below_percent(actor, ResourceKind::Health, *percent)),
            Condition::InExecutePhase => view.in_execute_phase(),
            Condition::Not(inner) => !inner.evaluate(view, target),
            Condition::All(children) => children.iter().all(|child| child.evaluate(view, target)),
            Condition::Any(children) => children.iter().any(|child| child.evaluate(view, target)),
        }
    }
}

fn below_percent(actor: &Actor, resource: ResourceKind, percent: u32) -> bool {
    let meter = actor.resources().get(resource);
    meter.maximum > 0 && meter.permille() < percent.saturating_mul(10)
}
