//! Action definitions.
//!
//! An action is immutable catalog data. What it does is a list of tagged
//! [`Effect`] variants; the simulator's resolution step is the only code that
//! interprets them.

mod error;

pub use error::ActionError;

use crate::math::DamageProfile;
use crate::types::{
    ActionCategory, ActionId, ActorId, AuraId, RecastGroup, ResourceKind, SimTime,
};

/// Who receives an effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Subject {
    Caster,
    Targets,
}

/// How an action picks its targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetRule {
    /// Only the caster.
    Caster,
    /// The intent's target, falling back to the actor's default target.
    #[default]
    Single,
    /// Every living hostile actor, in registration order.
    AllHostile,
}

/// One step of an action, interpreted by resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Effect {
    /// Direct damage to every target.
    Damage(DamageProfile),
    ApplyAura { aura: AuraId, subject: Subject },
    /// Remove stacks from an active aura (procs, charges).
    ConsumeAura {
        aura: AuraId,
        stacks: u8,
        subject: Subject,
    },
    RestoreResource {
        resource: ResourceKind,
        amount: u32,
        subject: Subject,
    },
}

impl Effect {
    pub fn subject(&self) -> Subject {
        match self {
            Effect::Damage(_) => Subject::Targets,
            Effect::ApplyAura { subject, .. }
            | Effect::ConsumeAura { subject, .. }
            | Effect::RestoreResource { subject, .. } => *subject,
        }
    }
}

/// Amount of one resource spent on use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ResourceCost {
    pub resource: ResourceKind,
    pub amount: u32,
}

/// Immutable description of an action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionDefinition {
    pub id: ActionId,
    pub name: String,
    pub category: ActionCategory,
    pub cost: Option<ResourceCost>,
    /// Time until effects land.
    pub cast_time: SimTime,
    /// Time until the action (or its recast group) is usable again.
    pub recast_time: SimTime,
    /// Minimum time the caster is locked after use.
    pub animation_lock: SimTime,
    pub recast_group: Option<RecastGroup>,
    pub target_rule: TargetRule,
    pub effects: Vec<Effect>,
}

impl ActionDefinition {
    pub const DEFAULT_ANIMATION_LOCK: SimTime = SimTime::from_millis(750);

    pub fn new(id: ActionId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            category: ActionCategory::default(),
            cost: None,
            cast_time: SimTime::ZERO,
            recast_time: SimTime::ZERO,
            animation_lock: Self::DEFAULT_ANIMATION_LOCK,
            recast_group: None,
            target_rule: TargetRule::default(),
            effects: Vec::new(),
        }
    }

    #[must_use]
    pub fn category(mut self, category: ActionCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn cost(mut self, resource: ResourceKind, amount: u32) -> Self {
        self.cost = Some(ResourceCost { resource, amount });
        self
    }

    #[must_use]
    pub fn cast_time(mut self, cast_time: SimTime) -> Self {
        self.cast_time = cast_time;
        self
    }

    #[must_use]
    pub fn recast_time(mut self, recast_time: SimTime) -> Self {
        self.recast_time = recast_time;
        self
    }

    #[must_use]
    pub fn animation_lock(mut self, animation_lock: SimTime) -> Self {
        self.animation_lock = animation_lock;
        self
    }

    #[must_use]
    pub fn recast_group(mut self, group: RecastGroup) -> Self {
        self.recast_group = Some(group);
        self
    }

    #[must_use]
    pub fn target_rule(mut self, rule: TargetRule) -> Self {
        self.target_rule = rule;
        self
    }

    #[must_use]
    pub fn effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Timer this action starts and checks.
    pub fn recast_key(&self) -> RecastKey {
        match self.recast_group {
            Some(group) => RecastKey::Group(group),
            None => RecastKey::Action(self.id),
        }
    }

    /// Aura ids referenced by the effect list.
    pub fn referenced_auras(&self) -> impl Iterator<Item = AuraId> + '_ {
        self.effects.iter().filter_map(|effect| match effect {
            Effect::ApplyAura { aura, .. } | Effect::ConsumeAura { aura, .. } => Some(*aura),
            _ => None,
        })
    }
}

/// Key of a recast timer on an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RecastKey {
    Action(ActionId),
    Group(RecastGroup),
}

/// A policy's request: use `action`, optionally on `target`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Intent {
    pub action: ActionId,
    pub target: Option<ActorId>,
}

impl Intent {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            target: None,
        }
    }

    #[must_use]
    pub fn at(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recast_key_prefers_group() {
        let solo = ActionDefinition::new(ActionId(1), "Bloodletter");
        assert_eq!(solo.recast_key(), RecastKey::Action(ActionId(1)));

        let gcd = ActionDefinition::new(ActionId(2), "Heavy Shot").recast_group(RecastGroup::GLOBAL);
        assert_eq!(gcd.recast_key(), RecastKey::Group(RecastGroup::GLOBAL));
    }

    #[test]
    fn referenced_auras_lists_apply_and_consume() {
        let action = ActionDefinition::new(ActionId(3), "Refulgent Arrow")
            .effect(Effect::Damage(DamageProfile::new(300)))
            .effect(Effect::ConsumeAura {
                aura: AuraId(7),
                stacks: 1,
                subject: Subject::Caster,
            })
            .effect(Effect::ApplyAura {
                aura: AuraId(8),
                subject: Subject::Targets,
            });
        let auras: Vec<_> = action.referenced_auras().collect();
        assert_eq!(auras, vec![AuraId(7), AuraId(8)]);
        assert_eq!(action.effects[1].subject(), Subject::Caster);
        assert_eq!(action.effects[0].subject(), Subject::Targets);
    }
}
