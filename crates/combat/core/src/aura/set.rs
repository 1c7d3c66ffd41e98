use std::collections::BTreeMap;

use crate::error::{ErrorSeverity, SimError};
use crate::types::{ActorId, AuraId, SimTime};

use super::{AuraDefinition, AuraInstance, SourceSnapshot, StackingPolicy};

/// Errors raised by aura lookups.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuraError {
    /// The referenced aura is no longer (or never was) active on the target.
    #[error("{aura} is not active on {target}")]
    ExpiredAura { aura: AuraId, target: ActorId },

    /// An event referenced an aura the catalog does not define.
    #[error("{0} is not in the catalog")]
    UnknownAura(AuraId),
}

impl SimError for AuraError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ExpiredAura { .. } => ErrorSeverity::Recoverable,
            Self::UnknownAura(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ExpiredAura { .. } => "AURA_EXPIRED",
            Self::UnknownAura(_) => "AURA_UNKNOWN",
        }
    }
}

/// State change caused by an application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuraTransition {
    Applied,
    Refreshed,
    Stacked { stacks: u8 },
}

/// Result of [`AuraSet::apply`]: the new schedule the simulator must arm.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub transition: AuraTransition,
    pub expires_at: SimTime,
    pub stacks: u8,
    /// Tick that must be scheduled. `None` when the existing chain continues.
    pub start_tick: Option<SimTime>,
}

/// Result of [`AuraSet::expire`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExpireOutcome {
    Removed(AuraInstance),
    /// The aura was refreshed or removed after the expiry was scheduled.
    Stale,
}

/// Result of [`AuraSet::consume`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsumeOutcome {
    Removed(AuraInstance),
    Decremented { remaining: u8 },
}

/// Active auras on one actor, at most one instance per aura kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuraSet {
    owner: ActorId,
    active: BTreeMap<AuraId, AuraInstance>,
}

impl AuraSet {
    pub fn new(owner: ActorId) -> Self {
        Self {
            owner,
            active: BTreeMap::new(),
        }
    }

    pub fn get(&self, aura: AuraId) -> Option<&AuraInstance> {
        self.active.get(&aura)
    }

    pub fn has(&self, aura: AuraId) -> bool {
        self.active.contains_key(&aura)
    }

    /// Remaining duration, or zero when absent.
    pub fn remains(&self, aura: AuraId, now: SimTime) -> SimTime {
        self.get(aura)
            .map(|instance| instance.remains(now))
            .unwrap_or(SimTime::ZERO)
    }

    pub fn stacks(&self, aura: AuraId) -> u8 {
        self.get(aura).map(|instance| instance.stacks).unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuraInstance> {
        self.active.values()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Apply `definition` from `source` at `now`, following its stacking policy.
    pub fn apply(
        &mut self,
        definition: &AuraDefinition,
        source: ActorId,
        snapshot: SourceSnapshot,
        now: SimTime,
    ) -> ApplyOutcome {
        let duration = definition.duration;
        let interval = definition.periodic.as_ref().map(|periodic| periodic.interval);

        let Some(instance) = self.active.get_mut(&definition.id) else {
            let expires_at = now + duration;
            let next_tick_at = first_tick(now, interval, expires_at);
            self.active.insert(
                definition.id,
                AuraInstance {
                    aura: definition.id,
                    source,
                    target: self.owner,
                    applied_at: now,
                    expires_at,
                    stacks: 1,
                    snapshot,
                    tick_interval: interval,
                    next_tick_at,
                },
            );
            return ApplyOutcome {
                transition: AuraTransition::Applied,
                expires_at,
                stacks: 1,
                start_tick: next_tick_at,
            };
        };

        let transition = match definition.stacking {
            StackingPolicy::Reset => {
                instance.expires_at = now + duration;
                AuraTransition::Refreshed
            }
            StackingPolicy::ExtendToMax { max_duration } => {
                let extended = (instance.remains(now) + duration).min(max_duration);
                instance.expires_at = now + extended;
                AuraTransition::Refreshed
            }
            StackingPolicy::Stack { max_stacks } => {
                instance.stacks = instance.stacks.saturating_add(1).min(max_stacks.max(1));
                instance.expires_at = now + duration;
                AuraTransition::Stacked {
                    stacks: instance.stacks,
                }
            }
        };
        instance.source = source;
        instance.snapshot = snapshot;

        // A chain that already ran out restarts from this application.
        let start_tick = if instance.next_tick_at.is_none() {
            instance.next_tick_at = first_tick(now, interval, instance.expires_at);
            instance.next_tick_at
        } else {
            None
        };

        ApplyOutcome {
            transition,
            expires_at: instance.expires_at,
            stacks: instance.stacks,
            start_tick,
        }
    }

    /// Advance the tick chain if `due` is the pending tick.
    ///
    /// Returns `None` for a stale tick. Otherwise returns the following tick,
    /// which is `None` once it would land after expiry.
    pub fn tick(&mut self, aura: AuraId, due: SimTime) -> Option<Option<SimTime>> {
        let instance = self.active.get_mut(&aura)?;
        if instance.next_tick_at != Some(due) {
            return None;
        }
        let next = instance
            .tick_interval
            .map(|interval| due + interval)
            .filter(|next| *next <= instance.expires_at);
        instance.next_tick_at = next;
        Some(next)
    }

    /// Remove the aura if `expires_at` still matches its current expiry.
    pub fn expire(&mut self, aura: AuraId, expires_at: SimTime) -> ExpireOutcome {
        let current = self
            .active
            .get(&aura)
            .is_some_and(|instance| instance.expires_at == expires_at);
        if !current {
            return ExpireOutcome::Stale;
        }
        self.active
            .remove(&aura)
            .map(ExpireOutcome::Removed)
            .unwrap_or(ExpireOutcome::Stale)
    }

    /// Remove `stacks` stacks; the aura leaves the set when none remain.
    pub fn consume(&mut self, aura: AuraId, stacks: u8) -> Result<ConsumeOutcome, AuraError> {
        let Some(instance) = self.active.get_mut(&aura) else {
            return Err(AuraError::ExpiredAura {
                aura,
                target: self.owner,
            });
        };
        instance.stacks = instance.stacks.saturating_sub(stacks);
        if instance.stacks == 0 {
            let removed = self.active.remove(&aura).ok_or(AuraError::ExpiredAura {
                aura,
                target: self.owner,
            })?;
            return Ok(ConsumeOutcome::Removed(removed));
        }
        Ok(ConsumeOutcome::Decremented {
            remaining: instance.stacks,
        })
    }

    /// Drop every aura, returning how many were active.
    pub fn clear(&mut self) -> usize {
        let count = self.active.len();
        self.active.clear();
        count
    }
}

fn first_tick(now: SimTime, interval: Option<SimTime>, expires_at: SimTime) -> Option<SimTime> {
    interval
        .filter(|interval| !interval.is_zero())
        .map(|interval| now + interval)
        .filter(|tick| *tick <= expires_at)
}
