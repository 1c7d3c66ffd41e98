//! Structured combat records.
//!
//! The simulator never logs combat outcomes as text. Every observable change
//! becomes a [`CombatRecord`] pushed into a [`RecordSink`], and aggregation is
//! the consumer's business.

use crate::error::ErrorSeverity;
use crate::event::DamageSource;
use crate::types::{ActionId, ActorId, AuraId, HitResult, ResourceKind, SimTime};

/// Why a resource level changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[strum(serialize_all = "snake_case")]
pub enum ResourceChange {
    Spent,
    Regenerated,
    Restored,
}

/// Lifecycle step of an aura instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[strum(serialize_all = "snake_case")]
pub enum AuraChange {
    Applied,
    Refreshed,
    Stacked,
    Consumed,
    Expired,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CombatRecord {
    ActionUsed {
        at: SimTime,
        actor: ActorId,
        action: ActionId,
        targets: Vec<ActorId>,
    },
    /// Damage as computed at resolution or tick time, before overkill.
    DamageDealt {
        at: SimTime,
        source: ActorId,
        target: ActorId,
        origin: DamageSource,
        amount: u32,
        outcome: HitResult,
    },
    /// A hostile aura application that missed or was dodged.
    AuraAvoided {
        at: SimTime,
        source: ActorId,
        target: ActorId,
        aura: AuraId,
        outcome: HitResult,
    },
    ResourceChanged {
        at: SimTime,
        actor: ActorId,
        resource: ResourceKind,
        change: ResourceChange,
        amount: u32,
        current: u32,
    },
    AuraChanged {
        at: SimTime,
        target: ActorId,
        source: ActorId,
        aura: AuraId,
        change: AuraChange,
        stacks: u8,
    },
    ActorDefeated {
        at: SimTime,
        actor: ActorId,
        by: Option<ActorId>,
    },
    /// A recoverable failure absorbed by the engine.
    Anomaly {
        at: SimTime,
        actor: Option<ActorId>,
        code: &'static str,
        severity: ErrorSeverity,
        detail: String,
    },
}

impl CombatRecord {
    pub fn at(&self) -> SimTime {
        match self {
            Self::ActionUsed { at, .. }
            | Self::DamageDealt { at, .. }
            | Self::AuraAvoided { at, .. }
            | Self::ResourceChanged { at, .. }
            | Self::AuraChanged { at, .. }
            | Self::ActorDefeated { at, .. }
            | Self::Anomaly { at, .. } => *at,
        }
    }
}

/// Destination of combat records.
pub trait RecordSink {
    fn record(&mut self, record: CombatRecord);
}

impl RecordSink for Vec<CombatRecord> {
    fn record(&mut self, record: CombatRecord) {
        self.push(record);
    }
}

/// In-memory sink with a few aggregate queries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct RecordLog {
    records: Vec<CombatRecord>,
}

impl RecordLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CombatRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<CombatRecord> {
        self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total damage dealt by `source`.
    pub fn damage_by(&self, source: ActorId) -> u64 {
        self.records
            .iter()
            .filter_map(|record| match record {
                CombatRecord::DamageDealt {
                    source: dealer,
                    amount,
                    ..
                } if *dealer == source => Some(u64::from(*amount)),
                _ => None,
            })
            .sum()
    }

    pub fn anomalies(&self) -> impl Iterator<Item = &CombatRecord> {
        self.records
            .iter()
            .filter(|record| matches!(record, CombatRecord::Anomaly { .. }))
    }
}

impl RecordSink for RecordLog {
    fn record(&mut self, record: CombatRecord) {
        self.records.push(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(source: u32, amount: u32) -> CombatRecord {
        CombatRecord::DamageDealt {
            at: SimTime::from_secs(1),
            source: ActorId(source),
            target: ActorId(9),
            origin: DamageSource::Action(ActionId(1)),
            amount,
            outcome: HitResult::Hit,
        }
    }

    #[test]
    fn damage_by_sums_one_source() {
        let mut log = RecordLog::new();
        log.record(hit(1, 100));
        log.record(hit(2, 50));
        log.record(hit(1, 25));
        assert_eq!(log.damage_by(ActorId(1)), 125);
        assert_eq!(log.damage_by(ActorId(3)), 0);
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn anomalies_filter() {
        let mut log = RecordLog::new();
        log.record(hit(1, 10));
        log.record(CombatRecord::Anomaly {
            at: SimTime::ZERO,
            actor: None,
            code: "AURA_EXPIRED",
            severity: ErrorSeverity::Recoverable,
            detail: String::new(),
        });
        assert_eq!(log.anomalies().count(), 1);
        assert_eq!(log.records()[0].at(), SimTime::from_secs(1));
    }
}
