//! Combat participants.

mod resources;

pub use resources::{ResourceError, ResourceMeter, ResourcePool};

use std::collections::BTreeMap;
use std::fmt;

use crate::action::{ActionDefinition, RecastKey};
use crate::aura::{AuraModifier, AuraSet};
use crate::catalog::Catalog;
use crate::equipment::{Equipment, Item, Weapon};
use crate::policy::{BehaviorPolicy, Idle};
use crate::simulator::SetupError;
use crate::stats::{BonusStack, StatBlock};
use crate::types::{ActionId, ActorId, Attribute, ResourceKind, SimTime, Slot, Team};

/// Everything needed to register an actor with a simulator.
pub struct ActorSpec {
    pub id: ActorId,
    pub name: String,
    pub team: Team,
    pub base_stats: StatBlock,
    pub resources: ResourcePool,
    pub equipment: Vec<(Slot, Item)>,
    pub actions: Vec<ActionId>,
    pub default_target: Option<ActorId>,
    pub policy: Box<dyn BehaviorPolicy>,
}

impl ActorSpec {
    pub fn new(id: ActorId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            team: Team::PLAYERS,
            base_stats: StatBlock::new(),
            resources: ResourcePool::new(),
            equipment: Vec::new(),
            actions: Vec::new(),
            default_target: None,
            policy: Box::new(Idle),
        }
    }

    #[must_use]
    pub fn team(mut self, team: Team) -> Self {
        self.team = team;
        self
    }

    #[must_use]
    pub fn stat(mut self, attribute: Attribute, value: i32) -> Self {
        self.base_stats.set(attribute, value);
        self
    }

    #[must_use]
    pub fn stats(mut self, stats: StatBlock) -> Self {
        self.base_stats = stats;
        self
    }

    /// Add a resource starting full.
    #[must_use]
    pub fn resource(mut self, kind: ResourceKind, maximum: u32) -> Self {
        self.resources = self.resources.with(kind, ResourceMeter::full(maximum));
        self
    }

    #[must_use]
    pub fn resource_meter(mut self, kind: ResourceKind, meter: ResourceMeter) -> Self {
        self.resources = self.resources.with(kind, meter);
        self
    }

    #[must_use]
    pub fn equip(mut self, slot: Slot, item: Item) -> Self {
        self.equipment.push((slot, item));
        self
    }

    #[must_use]
    pub fn action(mut self, action: ActionId) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = ActionId>) -> Self {
        self.actions.extend(actions);
        self
    }

    #[must_use]
    pub fn target(mut self, target: ActorId) -> Self {
        self.default_target = Some(target);
        self
    }

    #[must_use]
    pub fn policy(mut self, policy: impl BehaviorPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }
}

impl fmt::Debug for ActorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActorSpec")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("team", &self.team)
            .field("actions", &self.actions)
            .field("default_target", &self.default_target)
            .finish_non_exhaustive()
    }
}

/// A registered combatant. Owned by the simulator and mutated only through
/// event dispatch and action resolution.
pub struct Actor {
    id: ActorId,
    name: String,
    team: Team,
    base_stats: StatBlock,
    equipment: Equipment,
    /// Base stats plus equipment; fixed for the run.
    gear_stats: StatBlock,
    pub(crate) resources: ResourcePool,
    pub(crate) auras: AuraSet,
    actions: Vec<ActionId>,
    pub(crate) recasts: BTreeMap<RecastKey, SimTime>,
    pub(crate) busy_until: SimTime,
    /// Due time of the one live decision event; older ones are stale.
    pub(crate) pending_decision: Option<SimTime>,
    /// Due time of the live auto-attack; `None` when the chain has stopped.
    pub(crate) pending_swing: Option<SimTime>,
    pub(crate) alive: bool,
    default_target: Option<ActorId>,
    pub(crate) policy: Box<dyn BehaviorPolicy>,
}

impl Actor {
    pub(crate) fn from_spec(spec: ActorSpec, catalog: &Catalog) -> Result<Self, SetupError> {
        if let Some(&action) = spec
            .actions
            .iter()
            .find(|action| catalog.action(**action).is_none())
        {
            return Err(SetupError::UnknownAction {
                actor: spec.id,
                action,
            });
        }

        let equipment = Equipment::from_items(spec.equipment).map_err(|source| {
            SetupError::Equipment {
                actor: spec.id,
                source,
            }
        })?;
        let gear_stats = spec.base_stats + *equipment.modifiers();

        Ok(Self {
            id: spec.id,
            name: spec.name,
            team: spec.team,
            base_stats: spec.base_stats,
            equipment,
            gear_stats,
            resources: spec.resources,
            auras: AuraSet::new(spec.id),
            actions: spec.actions,
            recasts: BTreeMap::new(),
            busy_until: SimTime::ZERO,
            pending_decision: None,
            pending_swing: None,
            alive: true,
            default_target: spec.default_target,
            policy: spec.policy,
        })
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn team(&self) -> Team {
        self.team
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn base_stats(&self) -> &StatBlock {
        &self.base_stats
    }

    pub fn equipment(&self) -> &Equipment {
        &self.equipment
    }

    pub fn weapon(&self) -> Option<&Weapon> {
        self.equipment.weapon()
    }

    pub fn resources(&self) -> &ResourcePool {
        &self.resources
    }

    pub fn auras(&self) -> &AuraSet {
        &self.auras
    }

    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    pub fn knows(&self, action: ActionId) -> bool {
        self.actions.contains(&action)
    }

    pub fn default_target(&self) -> Option<ActorId> {
        self.default_target
    }

    pub fn busy_until(&self) -> SimTime {
        self.busy_until
    }

    pub fn health(&self) -> ResourceMeter {
        self.resources.get(ResourceKind::Health)
    }

    /// Time the recast timer under `key` elapses, if one is running.
    pub fn recast_ready_at(&self, key: RecastKey) -> Option<SimTime> {
        self.recasts.get(&key).copied()
    }

    pub fn recast_remaining(&self, key: RecastKey, now: SimTime) -> SimTime {
        self.recast_ready_at(key)
            .map(|ready_at| ready_at.saturating_sub(now))
            .unwrap_or(SimTime::ZERO)
    }

    /// Actor-side readiness: alive, known, idle, off recast and affordable.
    pub fn can_use(&self, definition: &ActionDefinition, now: SimTime) -> bool {
        self.alive
            && self.knows(definition.id)
            && now >= self.busy_until
            && self.recast_remaining(definition.recast_key(), now).is_zero()
            && definition.cost.is_none_or(|cost| {
                self.resources.check(cost.resource, cost.amount).is_ok()
            })
    }

    /// Base stats, then equipment, then aura stat modifiers layered per attribute.
    pub fn effective_stats(&self, catalog: &Catalog) -> StatBlock {
        let mut layers: BTreeMap<Attribute, BonusStack> = BTreeMap::new();
        for instance in self.auras.iter() {
            let Some(definition) = catalog.aura(instance.aura) else {
                continue;
            };
            for modifier in &definition.modifiers {
                if let AuraModifier::Stat { attribute, bonus } = modifier {
                    layers
                        .entry(*attribute)
                        .or_default()
                        .add_stacked(*bonus, instance.stacks);
                }
            }
        }

        let mut stats = self.gear_stats;
        for (attribute, layer) in layers {
            stats.set(attribute, layer.apply_unclamped(stats.get(attribute)));
        }
        stats
    }

    /// Outgoing damage percentages from active auras, one entry per stack.
    pub fn damage_dealt_modifiers(&self, catalog: &Catalog) -> Vec<i32> {
        self.aura_percentages(catalog, |modifier| match modifier {
            AuraModifier::DamageDealt(percent) => Some(*percent),
            _ => None,
        })
    }

    /// Incoming damage percentages from active auras, one entry per stack.
    pub fn damage_taken_modifiers(&self, catalog: &Catalog) -> Vec<i32> {
        self.aura_percentages(catalog, |modifier| match modifier {
            AuraModifier::DamageTaken(percent) => Some(*percent),
            _ => None,
        })
    }

    fn aura_percentages(
        &self,
        catalog: &Catalog,
        select: impl Fn(&AuraModifier) -> Option<i32>,
    ) -> Vec<i32> {
        let mut percentages = Vec::new();
        for instance in self.auras.iter() {
            let Some(definition) = catalog.aura(instance.aura) else {
                continue;
            };
            for percent in definition.modifiers.iter().filter_map(&select) {
                percentages.extend(std::iter::repeat_n(percent, usize::from(instance.stacks)));
            }
        }
        percentages
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Actor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("team", &self.team)
            .field("alive", &self.alive)
            .field("resources", &self.resources)
            .field("auras", &self.auras)
            .field("busy_until", &self.busy_until)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aura::{AuraDefinition, SourceSnapshot, StackingPolicy};
    use crate::stats::Bonus;
    use crate::types::{AuraId, SlotMask};

    fn catalog() -> Catalog {
        Catalog::new()
            .with_action(ActionDefinition::new(ActionId(1), "Heavy Shot"))
            .with_aura(
                AuraDefinition::new(AuraId(1), "Raging Strikes", SimTime::from_secs(20))
                    .modifier(AuraModifier::DamageDealt(15)),
            )
            .with_aura(
                AuraDefinition::new(AuraId(2), "Medicated", SimTime::from_secs(30))
                    .stacking(StackingPolicy::Stack { max_stacks: 3 })
                    .modifier(AuraModifier::Stat {
                        attribute: Attribute::Dexterity,
                        bonus: Bonus::Flat(100),
                    }),
            )
    }

    #[test]
    fn unknown_action_is_rejected() {
        let spec = ActorSpec::new(ActorId(1), "Archer").action(ActionId(99));
        let err = Actor::from_spec(spec, &catalog()).unwrap_err();
        assert_eq!(
            err,
            SetupError::UnknownAction {
                actor: ActorId(1),
                action: ActionId(99),
            }
        );
    }

    #[test]
    fn equipment_conflict_fails_setup() {
        let spec = ActorSpec::new(ActorId(1), "Archer")
            .equip(Slot::Head, Item::new("Cap", SlotMask::HEAD))
            .equip(Slot::Head, Item::new("Hat", SlotMask::HEAD));
        let err = Actor::from_spec(spec, &catalog()).unwrap_err();
        assert!(matches!(err, SetupError::Equipment { actor: ActorId(1), .. }));
    }

    #[test]
    fn effective_stats_layer_gear_then_auras() {
        let catalog = catalog();
        let spec = ActorSpec::new(ActorId(1), "Archer")
            .stat(Attribute::Dexterity, 1_000)
            .equip(
                Slot::MainHand,
                Item::new("Bow", SlotMask::MAIN_HAND).with_stat(Attribute::Dexterity, 200),
            );
        let mut actor = Actor::from_spec(spec, &catalog).unwrap();
        assert_eq!(actor.effective_stats(&catalog).get(Attribute::Dexterity), 1_200);

        let medicated = catalog.aura(AuraId(2)).unwrap();
        actor.auras.apply(medicated, ActorId(1), SourceSnapshot::neutral(), SimTime::ZERO);
        actor.auras.apply(medicated, ActorId(1), SourceSnapshot::neutral(), SimTime::ZERO);
        assert_eq!(actor.effective_stats(&catalog).get(Attribute::Dexterity), 1_400);
        assert_eq!(actor.base_stats().get(Attribute::Dexterity), 1_000);
    }

    #[test]
    fn damage_modifiers_come_from_auras() {
        let catalog = catalog();
        let mut actor = Actor::from_spec(ActorSpec::new(ActorId(1), "Archer"), &catalog).unwrap();
        assert!(actor.damage_dealt_modifiers(&catalog).is_empty());

        let raging = catalog.aura(AuraId(1)).unwrap();
        actor.auras.apply(raging, ActorId(1), SourceSnapshot::neutral(), SimTime::ZERO);
        assert_eq!(actor.damage_dealt_modifiers(&catalog), vec![15]);
        assert!(actor.damage_taken_modifiers(&catalog).is_empty());
    }

    #[test]
    fn can_use_checks_recast_and_cost() {
        let catalog = Catalog::new().with_action(
            ActionDefinition::new(ActionId(1), "Fire").cost(ResourceKind::Mana, 50),
        );
        let spec = ActorSpec::new(ActorId(1), "Mage")
            .resource_meter(ResourceKind::Mana, ResourceMeter::new(30, 100))
            .action(ActionId(1));
        let mut actor = Actor::from_spec(spec, &catalog).unwrap();
        let fire = catalog.action(ActionId(1)).unwrap();
        assert!(!actor.can_use(fire, SimTime::ZERO));

        actor.resources.restore(ResourceKind::Mana, 70);
        assert!(actor.can_use(fire, SimTime::ZERO));

        actor
            .recasts
            .insert(fire.recast_key(), SimTime::from_millis(2_500));
        assert!(!actor.can_use(fire, SimTime::from_secs(2)));
        assert_eq!(
            actor.recast_remaining(fire.recast_key(), SimTime::from_secs(2)),
            SimTime::from_millis(500)
        );
    }
}
