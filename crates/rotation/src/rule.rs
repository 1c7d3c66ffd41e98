//! A single rotation entry.

use combat_core::{ActionId, Actor, ActorId, Intent, PolicyView};

use crate::condition::Condition;

/// Who a rule's action is aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleTarget {
    /// The caster's default target; the intent carries no explicit target.
    #[default]
    Default,
    Caster,
    Actor(ActorId),
}

/// Use `action` on `target` when every condition holds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub action: ActionId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: RuleTarget,
    #[cfg_attr(feature = "serde", serde(default))]
    pub conditions: Vec<Condition>,
}

impl Rule {
    pub fn new(action: ActionId) -> Self {
        Self {
            action,
            target: RuleTarget::Default,
            conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn on(mut self, target: RuleTarget) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn when(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// The actor this rule would aim at under `view`.
    pub fn resolve_target<'a>(&self, view: &PolicyView<'a>) -> Option<&'a Actor> {
        match self.target {
            RuleTarget::Default => view.target(),
            RuleTarget::Caster => Some(view.actor()),
            RuleTarget::Actor(id) => view.get(id),
        }
    }

    /// The intent this rule produces, if its action is ready and all
    /// conditions hold.
    pub fn evaluate(&self, view: &PolicyView<'_>) -> Option<Intent> {
        if !view.is_ready(self.action) {
            return None;
        }
        let target = self.resolve_target(view);
        if !self
            .conditions
            .iter()
            .all(|condition| condition.evaluate(view, target))
        {
            return None;
        }

        let intent = Intent::new(self.action);
        Some(match self.target {
            RuleTarget::Default => intent,
            RuleTarget::Caster => intent.at(view.actor().id()),
            RuleTarget::Actor(id) => intent.at(id),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use combat_core::{
        ActionDefinition, ActorSpec, Catalog, ResourceKind, SimConfig, Simulator, Team,
    };

    use super::*;

    const CASTER: ActorId = ActorId(1);
    const DUMMY: ActorId = ActorId(2);
    const ADD: ActorId = ActorId(3);
    const FIRE: ActionId = ActionId(1);
    const BLIZZARD: ActionId = ActionId(2);

    fn sim() -> Simulator {
        let catalog = Catalog::new()
            .with_action(ActionDefinition::new(FIRE, "Fire").cost(ResourceKind::Mana, 800))
            .with_action(ActionDefinition::new(BLIZZARD, "Blizzard"));
        Simulator::builder(Arc::new(catalog))
            .config(SimConfig::new().without_regen())
            .actor(
                ActorSpec::new(CASTER, "Black Mage")
                    .resource(ResourceKind::Mana, 10_000)
                    .actions([FIRE, BLIZZARD])
                    .target(DUMMY),
            )
            .actor(
                ActorSpec::new(DUMMY, "Dummy")
                    .team(Team::ENEMIES)
                    .resource(ResourceKind::Health, 1_000),
            )
            .actor(
                ActorSpec::new(ADD, "Add")
                    .team(Team::ENEMIES)
                    .resource(ResourceKind::Health, 500),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn target_selection_shapes_intent() {
        let sim = sim();
        let view = sim.policy_view(CASTER).unwrap();

        assert_eq!(Rule::new(FIRE).evaluate(&view), Some(Intent::new(FIRE)));
        assert_eq!(
            Rule::new(FIRE).on(RuleTarget::Actor(ADD)).evaluate(&view),
            Some(Intent::new(FIRE).at(ADD))
        );
        assert_eq!(
            Rule::new(BLIZZARD).on(RuleTarget::Caster).evaluate(&view),
            Some(Intent::new(BLIZZARD).at(CASTER))
        );
    }

    #[test]
    fn conditions_see_rule_target() {
        let sim = sim();
        let view = sim.policy_view(CASTER).unwrap();

        // Full health on both enemies.
        let finisher = |target| {
            Rule::new(FIRE)
                .on(target)
                .when(Condition::TargetHealthBelowPercent(50))
        };
        assert_eq!(finisher(RuleTarget::Default).evaluate(&view), None);
        assert_eq!(finisher(RuleTarget::Actor(ActorId(99))).evaluate(&view), None);
    }

    #[test]
    fn unknown_or_unready_action_never_fires() {
        let sim = sim();
        let view = sim.policy_view(CASTER).unwrap();
        assert_eq!(Rule::new(ActionId(42)).evaluate(&view), None);

        let sim = Simulator::builder(Arc::new(
            Catalog::new().with_action(
                ActionDefinition::new(FIRE, "Fire").cost(ResourceKind::Mana, 800),
            ),
        ))
        .actor(
            ActorSpec::new(CASTER, "Black Mage")
                .resource(ResourceKind::Mana, 500)
                .action(FIRE),
        )
        .build()
        .unwrap();
        let view = sim.policy_view(CASTER).unwrap();
        assert_eq!(Rule::new(FIRE).evaluate(&view), None);
    }
}
