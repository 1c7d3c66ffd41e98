//! Timed buffs and debuffs.
//!
//! An [`AuraDefinition`] is shared catalog data; an [`AuraInstance`] is one
//! application living in its target's [`AuraSet`]. The set owns the state
//! machine (`absent → active → refreshed | stacked | ticking → removed`); the
//! simulator owns the timers and guards every timer event against the
//! instance's current schedule.

mod set;

pub use set::{AuraError, AuraSet, ApplyOutcome, AuraTransition, ConsumeOutcome, ExpireOutcome};

use crate::math::DamageProfile;
use crate::stats::{Bonus, StatBlock};
use crate::types::{ActorId, Attribute, AuraCategory, AuraId, SimTime};

/// What happens when an aura is applied to a target already carrying it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StackingPolicy {
    /// Replace the remaining duration with a fresh one.
    Reset,
    /// Add a full duration to what remains, capped at `max_duration`.
    ExtendToMax { max_duration: SimTime },
    /// Add a stack up to `max_stacks` and reset the duration.
    Stack { max_stacks: u8 },
}

impl StackingPolicy {
    pub const fn max_stacks(&self) -> u8 {
        match self {
            Self::Stack { max_stacks } => *max_stacks,
            _ => 1,
        }
    }
}

/// Effect of an active aura on its bearer. Values scale with stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AuraModifier {
    Stat { attribute: Attribute, bonus: Bonus },
    /// Percent change to damage the bearer deals.
    DamageDealt(i32),
    /// Percent change to damage the bearer takes.
    DamageTaken(i32),
}

/// Damage dealt every `interval` while the aura is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PeriodicEffect {
    pub interval: SimTime,
    pub damage: DamageProfile,
}

/// Immutable description of an aura kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraDefinition {
    pub id: AuraId,
    pub name: String,
    pub category: AuraCategory,
    pub duration: SimTime,
    pub stacking: StackingPolicy,
    pub periodic: Option<PeriodicEffect>,
    pub modifiers: Vec<AuraModifier>,
}

impl AuraDefinition {
    pub fn new(id: AuraId, name: impl Into<String>, duration: SimTime) -> Self {
        Self {
            id,
            name: name.into(),
            category: AuraCategory::Buff,
            duration,
            stacking: StackingPolicy::Reset,
            periodic: None,
            modifiers: Vec::new(),
        }
    }

    #[must_use]
    pub fn debuff(mut self) -> Self {
        self.category = AuraCategory::Debuff;
        self
    }

    #[must_use]
    pub fn stacking(mut self, stacking: StackingPolicy) -> Self {
        self.stacking = stacking;
        self
    }

    #[must_use]
    pub fn periodic(mut self, interval: SimTime, damage: DamageProfile) -> Self {
        self.periodic = Some(PeriodicEffect { interval, damage });
        self
    }

    #[must_use]
    pub fn modifier(mut self, modifier: AuraModifier) -> Self {
        self.modifiers.push(modifier);
        self
    }

    /// Number of ticks a fresh application produces.
    pub fn tick_count(&self) -> u64 {
        match &self.periodic {
            Some(periodic) if !periodic.interval.is_zero() => {
                self.duration.as_millis() / periodic.interval.as_millis()
            }
            _ => 0,
        }
    }
}

/// Source state frozen when an aura lands.
///
/// Periodic damage is computed from this, so buffs the source gains or loses
/// after application do not change ticks already running.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceSnapshot {
    pub stats: StatBlock,
    /// Outgoing damage percentages, one entry per stack.
    pub outgoing: Vec<i32>,
}

impl SourceSnapshot {
    pub fn new(stats: StatBlock, outgoing: Vec<i32>) -> Self {
        Self { stats, outgoing }
    }

    /// Zero stats, no modifiers.
    pub fn neutral() -> Self {
        Self::new(StatBlock::new(), Vec::new())
    }
}

/// One application of an aura on a target.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AuraInstance {
    pub aura: AuraId,
    /// Attribution only; never used to reach into the source actor.
    pub source: ActorId,
    pub target: ActorId,
    pub applied_at: SimTime,
    pub expires_at: SimTime,
    pub stacks: u8,
    /// Taken at the latest application; refreshes and stacks retake it.
    pub snapshot: SourceSnapshot,
    pub tick_interval: Option<SimTime>,
    /// Due time of the pending tick, if the tick chain is still running.
    pub next_tick_at: Option<SimTime>,
}

impl AuraInstance {
    pub fn remains(&self, now: SimTime) -> SimTime {
        self.expires_at.saturating_sub(now)
    }

    pub fn is_periodic(&self) -> bool {
        self.tick_interval.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_count_divides_duration_by_interval() {
        let dot = AuraDefinition::new(AuraId(1), "Venom", SimTime::from_secs(6))
            .periodic(SimTime::from_secs(2), DamageProfile::new(10));
        assert_eq!(dot.tick_count(), 3);

        let buff = AuraDefinition::new(AuraId(2), "Haste", SimTime::from_secs(20));
        assert_eq!(buff.tick_count(), 0);
    }

    #[test]
    fn max_stacks_defaults_to_one() {
        assert_eq!(StackingPolicy::Reset.max_stacks(), 1);
        assert_eq!(StackingPolicy::Stack { max_stacks: 5 }.max_stacks(), 5);
    }
}
