//! Event handlers.
//!
//! Every handler validates its own preconditions against the current state.
//! Events that were superseded (a refreshed aura's old expiry, a decision
//! pulled forward by a recast) are dropped silently here rather than removed
//! from the queue.

use std::sync::Arc;

use tracing::{debug, info, trace};

use super::{Simulator, StopReason};
use crate::action::{ActionError, RecastKey};
use crate::aura::{AuraError, AuraTransition, ConsumeOutcome, ExpireOutcome, SourceSnapshot};
use crate::config::SimConfig;
use crate::error::{ErrorSeverity, SimError};
use crate::event::{DamageSource, Event, EventPayload};
use crate::math::{compute_damage, roll_damage, roll_periodic};
use crate::policy::{BehaviorPolicy, Rejection};
use crate::record::{AuraChange, CombatRecord, RecordSink, ResourceChange};
use crate::types::{ActorId, Attribute, AuraId, HitResult, ResourceKind, SimTime};

/// Raised when an event names an actor the simulator does not know.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("event for unregistered actor {0}")]
struct UnknownActor(ActorId);

impl SimError for UnknownActor {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        "DISPATCH_UNKNOWN_ACTOR"
    }
}

impl<S: RecordSink> Simulator<S> {
    pub(super) fn dispatch(&mut self, event: Event) {
        let target = event.target;
        let Some(idx) = self.index_of(target) else {
            self.anomaly(Some(target), &UnknownActor(target));
            return;
        };

        match event.payload {
            EventPayload::ActorReady => self.on_actor_ready(idx, event.at),
            EventPayload::Damage {
                source,
                origin,
                amount,
                outcome,
            } => {
                if !self.actors[idx].alive {
                    self.anomaly(
                        Some(source),
                        &ActionError::InvalidTarget {
                            target: Some(target),
                        },
                    );
                    return;
                }
                self.apply_damage(idx, source, origin, amount, outcome);
            }
            EventPayload::AuraApply { source, aura } => self.on_aura_apply(idx, source, aura),
            EventPayload::AuraTick { aura, due } => self.on_aura_tick(idx, aura, due),
            EventPayload::AuraExpire { aura, expires_at } => {
                self.on_aura_expire(idx, aura, expires_at)
            }
            EventPayload::AuraConsume {
                source,
                aura,
                stacks,
            } => self.on_aura_consume(idx, source, aura, stacks),
            EventPayload::ResourceRestore {
                source,
                resource,
                amount,
            } => self.on_resource_restore(idx, source, resource, amount),
            EventPayload::ResourceRegen => self.on_regen(idx),
            EventPayload::AutoAttack => self.on_auto_attack(idx, event.at),
            EventPayload::RecastReady { key, ready_at } => self.on_recast_ready(idx, key, ready_at),
        }
    }

    fn on_actor_ready(&mut self, idx: usize, at: SimTime) {
        let actor = &mut self.actors[idx];
        if !actor.alive || actor.pending_decision != Some(at) {
            trace!(target: "combat::sim", actor = %actor.id(), at = %at, "stale decision");
            return;
        }
        actor.pending_decision = None;

        let busy_until = actor.busy_until;
        if self.now < busy_until {
            self.schedule_decision(idx, busy_until);
            return;
        }
        self.decide(idx);
    }

    /// Ask the policy for intents until one resolves or the round runs out.
    fn decide(&mut self, idx: usize) {
        let actor = self.actors[idx].id();
        let mut rejections: Vec<Rejection> = Vec::new();

        for _ in 0..self.config.max_decision_attempts {
            let intent = self.actors[idx].policy.decide(&self.view(idx, &rejections));
            let Some(intent) = intent else {
                break;
            };
            if self.config.log.decisions {
                debug!(
                    target: "combat::policy",
                    at = %self.now,
                    actor = %actor,
                    action = %intent.action,
                    requested = ?intent.target,
                    "decision"
                );
            }

            match self.perform(actor, intent) {
                Ok(resolution) => {
                    self.schedule_decision(idx, resolution.ready_at);
                    return;
                }
                Err(error) => {
                    self.anomaly(Some(actor), &error);
                    rejections.push(Rejection { intent, error });
                }
            }
        }

        let retry = self.now + self.config.idle_retry.max(SimConfig::MIN_IDLE_RETRY);
        self.schedule_decision(idx, retry);
    }

    fn on_recast_ready(&mut self, idx: usize, key: RecastKey, ready_at: SimTime) {
        let now = self.now;
        let actor = &mut self.actors[idx];
        if actor.recasts.get(&key) != Some(&ready_at) {
            return;
        }
        actor.recasts.remove(&key);

        // An idle actor waiting on a later retry gets to decide now.
        let idle = actor.alive && now >= actor.busy_until;
        let waiting = actor.pending_decision.is_some_and(|pending| pending > now);
        if idle && waiting {
            self.schedule_decision(idx, now);
        }
    }

    fn apply_damage(
        &mut self,
        idx: usize,
        source: ActorId,
        origin: DamageSource,
        amount: u32,
        outcome: HitResult,
    ) {
        let now = self.now;
        let target = &mut self.actors[idx];
        let id = target.id();
        target.resources.drain(ResourceKind::Health, amount);
        let health = target.resources.get(ResourceKind::Health);

        self.record(CombatRecord::DamageDealt {
            at: now,
            source,
            target: id,
            origin,
            amount,
            outcome,
        });

        if health.maximum > 0 && health.is_empty() {
            self.defeat(idx, Some(source));
        }
    }

    fn defeat(&mut self, idx: usize, by: Option<ActorId>) {
        let now = self.now;
        let actor = &mut self.actors[idx];
        let id = actor.id();
        actor.alive = false;
        actor.pending_decision = None;
        actor.pending_swing = None;
        actor.auras.clear();

        info!(target: "combat::sim", at = %now, actor = %id, by = ?by, "actor defeated");
        self.record(CombatRecord::ActorDefeated { at: now, actor: id, by });

        if self.config.end_on_defeat {
            self.abort();
            self.halted = Some(StopReason::Defeat(id));
        }
    }

    fn on_aura_apply(&mut self, idx: usize, source: ActorId, aura: AuraId) {
        let target = self.actors[idx].id();
        if !self.actors[idx].alive {
            self.anomaly(
                Some(source),
                &ActionError::InvalidTarget {
                    target: Some(target),
                },
            );
            return;
        }
        let catalog = Arc::clone(&self.catalog);
        let Some(definition) = catalog.aura(aura) else {
            self.anomaly(Some(source), &AuraError::UnknownAura(aura));
            return;
        };

        let snapshot = match self.actor(source) {
            Some(dealer) => SourceSnapshot::new(
                dealer.effective_stats(&catalog),
                dealer.damage_dealt_modifiers(&catalog),
            ),
            None => SourceSnapshot::neutral(),
        };
        let now = self.now;
        let outcome = self.actors[idx].auras.apply(definition, source, snapshot, now);
        self.push(Event::new(
            outcome.expires_at,
            target,
            EventPayload::AuraExpire {
                aura,
                expires_at: outcome.expires_at,
            },
        ));
        if let Some(due) = outcome.start_tick {
            self.push(Event::new(due, target, EventPayload::AuraTick { aura, due }));
        }

        let change = match outcome.transition {
            AuraTransition::Applied => AuraChange::Applied,
            AuraTransition::Refreshed => AuraChange::Refreshed,
            AuraTransition::Stacked { .. } => AuraChange::Stacked,
        };
        debug!(
            target: "combat::aura",
            at = %now,
            aura = %definition.name,
            bearer = %target,
            %change,
            stacks = outcome.stacks,
            expires_at = %outcome.expires_at,
            "aura applied"
        );
        self.record(CombatRecord::AuraChanged {
            at: now,
            target,
            source,
            aura,
            change,
            stacks: outcome.stacks,
        });
    }

    fn on_aura_tick(&mut self, idx: usize, aura: AuraId, due: SimTime) {
        if !self.actors[idx].alive {
            return;
        }
        let Some(next) = self.actors[idx].auras.tick(aura, due) else {
            trace!(target: "combat::aura", %aura, due = %due, "stale tick");
            return;
        };
        let target = self.actors[idx].id();
        if let Some(next) = next {
            self.push(Event::new(
                next,
                target,
                EventPayload::AuraTick { aura, due: next },
            ));
        }

        let catalog = Arc::clone(&self.catalog);
        let Some(definition) = catalog.aura(aura) else {
            self.anomaly(Some(target), &AuraError::UnknownAura(aura));
            return;
        };
        let Some(periodic) = definition.periodic else {
            return;
        };
        let Some(instance) = self.actors[idx].auras.get(aura) else {
            self.anomaly(Some(target), &AuraError::ExpiredAura { aura, target });
            return;
        };
        let source = instance.source;
        let snapshot = instance.snapshot.clone();
        let mut profile = periodic.damage;
        profile.potency = profile.potency.saturating_mul(u32::from(instance.stacks));

        let target_stats = self.actors[idx].effective_stats(&catalog);
        let incoming = self.actors[idx].damage_taken_modifiers(&catalog);

        let roll = roll_periodic(&*self.formulas, &profile, &snapshot.stats, &mut self.rng);
        let amount = compute_damage(
            &*self.formulas,
            &profile,
            &snapshot.stats,
            &target_stats,
            &roll,
            &snapshot.outgoing,
            &incoming,
        );
        self.apply_damage(idx, source, DamageSource::Aura(aura), amount, roll.outcome);
    }

    fn on_aura_expire(&mut self, idx: usize, aura: AuraId, expires_at: SimTime) {
        let ExpireOutcome::Removed(instance) = self.actors[idx].auras.expire(aura, expires_at)
        else {
            return;
        };
        debug!(
            target: "combat::aura",
            at = %self.now,
            %aura,
            bearer = %instance.target,
            "aura expired"
        );
        self.record(CombatRecord::AuraChanged {
            at: self.now,
            target: instance.target,
            source: instance.source,
            aura,
            change: AuraChange::Expired,
            stacks: 0,
        });
    }

    fn on_aura_consume(&mut self, idx: usize, source: ActorId, aura: AuraId, stacks: u8) {
        let target = self.actors[idx].id();
        if !self.actors[idx].alive {
            self.anomaly(
                Some(source),
                &ActionError::InvalidTarget {
                    target: Some(target),
                },
            );
            return;
        }
        let remaining = match self.actors[idx].auras.consume(aura, stacks) {
            Ok(ConsumeOutcome::Removed(_)) => 0,
            Ok(ConsumeOutcome::Decremented { remaining }) => remaining,
            Err(error) => {
                self.anomaly(Some(source), &error);
                return;
            }
        };
        self.record(CombatRecord::AuraChanged {
            at: self.now,
            target,
            source,
            aura,
            change: AuraChange::Consumed,
            stacks: remaining,
        });
    }

    fn on_resource_restore(
        &mut self,
        idx: usize,
        source: ActorId,
        resource: ResourceKind,
        amount: u32,
    ) {
        let target = self.actors[idx].id();
        if !self.actors[idx].alive {
            self.anomaly(
                Some(source),
                &ActionError::InvalidTarget {
                    target: Some(target),
                },
            );
            return;
        }
        let gained = self.actors[idx].resources.restore(resource, amount);
        let current = self.actors[idx].resources.current(resource);
        self.record(CombatRecord::ResourceChanged {
            at: self.now,
            actor: target,
            resource,
            change: ResourceChange::Restored,
            amount: gained,
            current,
        });
    }

    /// Swing at the default target, then re-arm after the hastened weapon
    /// delay. Runs beside the policy: casts and animation locks never delay
    /// a swing. The chain ends with the attacker.
    fn on_auto_attack(&mut self, idx: usize, at: SimTime) {
        let attacker = &self.actors[idx];
        if !attacker.alive || attacker.pending_swing != Some(at) {
            trace!(target: "combat::sim", actor = %attacker.id(), at = %at, "stale swing");
            return;
        }
        let Some(weapon) = attacker.weapon().copied() else {
            self.actors[idx].pending_swing = None;
            return;
        };
        let id = attacker.id();
        let catalog = Arc::clone(&self.catalog);
        let source_stats = attacker.effective_stats(&catalog);
        let outgoing = attacker.damage_dealt_modifiers(&catalog);
        let default_target = attacker.default_target();

        let delay = self
            .formulas
            .scaled_duration(weapon.delay, source_stats.get(Attribute::SkillSpeed))
            .max(SimConfig::MIN_IDLE_RETRY);
        self.schedule_swing(idx, self.now + delay);

        let Some(target_idx) = default_target
            .and_then(|target| self.index_of(target))
            .filter(|&target_idx| self.actors[target_idx].alive)
        else {
            trace!(target: "combat::sim", actor = %id, at = %at, "swing without target");
            return;
        };
        let target_stats = self.actors[target_idx].effective_stats(&catalog);
        let incoming = self.actors[target_idx].damage_taken_modifiers(&catalog);
        let profile = self.formulas.auto_attack_profile(&weapon);

        let roll = roll_damage(
            &*self.formulas,
            &profile,
            &source_stats,
            &target_stats,
            &mut self.rng,
        );
        let amount = compute_damage(
            &*self.formulas,
            &profile,
            &source_stats,
            &target_stats,
            &roll,
            &outgoing,
            &incoming,
        );
        self.apply_damage(target_idx, id, DamageSource::AutoAttack, amount, roll.outcome);
    }

    /// Regen every configured resource, then re-arm. The chain ends with the actor.
    fn on_regen(&mut self, idx: usize) {
        if !self.actors[idx].alive {
            return;
        }
        let now = self.now;
        let actor = self.actors[idx].id();
        for rule_idx in 0..self.config.regen.len() {
            let rule = self.config.regen[rule_idx];
            let resources = &mut self.actors[idx].resources;
            let amount = rule.amount_for(resources.maximum(rule.resource));
            let gained = resources.restore(rule.resource, amount);
            if gained == 0 {
                continue;
            }
            let current = resources.current(rule.resource);
            self.record(CombatRecord::ResourceChanged {
                at: now,
                actor,
                resource: rule.resource,
                change: ResourceChange::Regenerated,
                amount: gained,
                current,
            });
        }
        if self.config.regen_enabled() {
            let next = now + self.config.regen_interval;
            self.push(Event::new(next, actor, EventPayload::ResourceRegen));
        }
    }
}
