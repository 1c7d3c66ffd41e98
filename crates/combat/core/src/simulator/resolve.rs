//! Action resolution.
//!
//! Resolution validates an intent completely before it touches any state or
//! draws from the random source. Once validated it spends the cost, starts the
//! recast timer and rolls every effect immediately, scheduling the results to
//! land when the cast completes.

use std::sync::Arc;

use tracing::debug;

use super::Simulator;
use crate::action::{ActionDefinition, ActionError, Effect, Intent, Subject, TargetRule};
use crate::config::SimConfig;
use crate::event::{DamageSource, Event, EventPayload};
use crate::math::{compute_damage, roll_damage, roll_landing};
use crate::queue::EventKey;
use crate::record::{CombatRecord, RecordSink, ResourceChange};
use crate::types::{ActionId, ActorId, AuraCategory, SimTime};

/// What a successful resolution scheduled.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub action: ActionId,
    pub targets: Vec<ActorId>,
    /// When the effects land.
    pub lands_at: SimTime,
    /// When the caster may act again.
    pub ready_at: SimTime,
    pub recast_ready_at: SimTime,
    pub scheduled: Vec<EventKey>,
}

impl<S: RecordSink> Simulator<S> {
    /// Resolve `intent` for `actor` at the current time.
    ///
    /// On error nothing changed: no resource was spent, no timer started and
    /// no random value was drawn.
    pub fn perform(&mut self, actor: ActorId, intent: Intent) -> Result<Resolution, ActionError> {
        let idx = self.index_of(actor).ok_or(ActionError::ActorNotFound(actor))?;
        let catalog = Arc::clone(&self.catalog);
        let formulas = Arc::clone(&self.formulas);
        let now = self.now;

        let caster = &self.actors[idx];
        if !caster.alive {
            return Err(ActionError::ActorDefeated(actor));
        }
        let definition = catalog
            .action(intent.action)
            .ok_or(ActionError::UnknownAction(intent.action))?;
        if !caster.knows(intent.action) {
            return Err(ActionError::ActionNotKnown {
                actor,
                action: intent.action,
            });
        }
        if now < caster.busy_until {
            return Err(ActionError::Busy {
                until: caster.busy_until,
            });
        }
        if let Some(cost) = definition.cost {
            caster.resources.check(cost.resource, cost.amount)?;
        }
        let recast_key = definition.recast_key();
        if let Some(ready_at) = caster
            .recast_ready_at(recast_key)
            .filter(|ready_at| *ready_at > now)
        {
            return Err(ActionError::StillRecovering {
                action: intent.action,
                ready_at,
            });
        }
        let targets = self.resolve_targets(idx, definition, intent.target)?;

        // Validated; mutation starts here.
        let speed = definition
            .category
            .hastened_by()
            .map(|attribute| caster.effective_stats(&catalog).get(attribute))
            .unwrap_or(0);
        let cast_time = formulas.scaled_duration(definition.cast_time, speed);
        let recast_time = formulas.scaled_duration(definition.recast_time, speed);
        let lands_at = now + cast_time;
        // Strictly after `now`; a caster ready at `now` decides again at `now`.
        let ready_at = now
            + cast_time
                .max(definition.animation_lock)
                .max(SimConfig::MIN_IDLE_RETRY);
        let recast_ready_at = now + recast_time;

        if let Some(cost) = definition.cost {
            let caster = &mut self.actors[idx];
            caster.resources.spend(cost.resource, cost.amount)?;
            let current = caster.resources.current(cost.resource);
            self.record(CombatRecord::ResourceChanged {
                at: now,
                actor,
                resource: cost.resource,
                change: ResourceChange::Spent,
                amount: cost.amount,
                current,
            });
        }
        let caster = &mut self.actors[idx];
        caster.busy_until = ready_at;
        caster.recasts.insert(recast_key, recast_ready_at);

        let mut scheduled = Vec::new();
        for effect in &definition.effects {
            let subjects = match effect.subject() {
                Subject::Caster => vec![actor],
                Subject::Targets => targets.clone(),
            };
            for subject in subjects {
                if !self.is_alive(subject) {
                    self.anomaly(
                        Some(actor),
                        &ActionError::InvalidTarget {
                            target: Some(subject),
                        },
                    );
                    continue;
                }
                let Some(event) = self.roll_effect(idx, definition, effect, subject, lands_at)
                else {
                    continue;
                };
                scheduled.extend(self.push(event));
            }
        }

        scheduled.extend(self.push(Event::new(
            recast_ready_at,
            actor,
            EventPayload::RecastReady {
                key: recast_key,
                ready_at: recast_ready_at,
            },
        )));

        debug!(
            target: "combat::resolve",
            at = %now,
            actor = %actor,
            action = %definition.name,
            lands_at = %lands_at,
            ready_at = %ready_at,
            "action resolved"
        );
        self.record(CombatRecord::ActionUsed {
            at: now,
            actor,
            action: intent.action,
            targets: targets.clone(),
        });

        Ok(Resolution {
            action: intent.action,
            targets,
            lands_at,
            ready_at,
            recast_ready_at,
            scheduled,
        })
    }

    fn resolve_targets(
        &self,
        idx: usize,
        definition: &ActionDefinition,
        requested: Option<ActorId>,
    ) -> Result<Vec<ActorId>, ActionError> {
        let caster = &self.actors[idx];
        match definition.target_rule {
            TargetRule::Caster => Ok(vec![caster.id()]),
            TargetRule::Single => requested
                .or(caster.default_target())
                .map(|target| vec![target])
                .ok_or(ActionError::InvalidTarget { target: None }),
            TargetRule::AllHostile => {
                let team = caster.team();
                let targets: Vec<ActorId> = self
                    .actors
                    .iter()
                    .filter(|actor| actor.alive && actor.team().is_hostile_to(team))
                    .map(|actor| actor.id())
                    .collect();
                if targets.is_empty() {
                    return Err(ActionError::InvalidTarget { target: None });
                }
                Ok(targets)
            }
        }
    }

    /// Roll one effect against one living subject and build the event that
    /// delivers it. `None` when the effect was avoided.
    fn roll_effect(
        &mut self,
        idx: usize,
        definition: &ActionDefinition,
        effect: &Effect,
        subject: ActorId,
        lands_at: SimTime,
    ) -> Option<Event> {
        let source = self.actors[idx].id();
        let payload = match effect {
            Effect::Damage(profile) => {
                let target_idx = self.index_of(subject)?;
                let catalog = Arc::clone(&self.catalog);
                let caster = &self.actors[idx];
                let target = &self.actors[target_idx];
                let source_stats = caster.effective_stats(&catalog);
                let target_stats = target.effective_stats(&catalog);
                let outgoing = caster.damage_dealt_modifiers(&catalog);
                let incoming = target.damage_taken_modifiers(&catalog);

                let roll = roll_damage(
                    &*self.formulas,
                    profile,
                    &source_stats,
                    &target_stats,
                    &mut self.rng,
                );
                let amount = compute_damage(
                    &*self.formulas,
                    profile,
                    &source_stats,
                    &target_stats,
                    &roll,
                    &outgoing,
                    &incoming,
                );
                EventPayload::Damage {
                    source,
                    origin: DamageSource::Action(definition.id),
                    amount,
                    outcome: roll.outcome,
                }
            }
            Effect::ApplyAura { aura, .. } => {
                let hostile = subject != source
                    && self
                        .catalog
                        .aura(*aura)
                        .is_some_and(|aura| aura.category == AuraCategory::Debuff);
                if hostile {
                    let target_idx = self.index_of(subject)?;
                    let source_stats = self.actors[idx].effective_stats(&self.catalog);
                    let target_stats = self.actors[target_idx].effective_stats(&self.catalog);
                    let outcome =
                        roll_landing(&*self.formulas, &source_stats, &target_stats, &mut self.rng);
                    if !outcome.landed() {
                        self.record(CombatRecord::AuraAvoided {
                            at: self.now,
                            source,
                            target: subject,
                            aura: *aura,
                            outcome,
                        });
                        return None;
                    }
                }
                EventPayload::AuraApply {
                    source,
                    aura: *aura,
                }
            }
            Effect::ConsumeAura { aura, stacks, .. } => EventPayload::AuraConsume {
                source,
                aura: *aura,
                stacks: *stacks,
            },
            Effect::RestoreResource {
                resource, amount, ..
            } => EventPayload::ResourceRestore {
                source,
                resource: *resource,
                amount: *amount,
            },
        };
        Some(Event::new(lands_at, subject, payload))
    }
}
