//! Per-iteration results and cross-iteration aggregates.

use std::collections::BTreeMap;

use combat_core::{ActorId, CombatRecord, DamageSource, RecordLog, RunSummary, TraceDigest};

/// Everything one iteration produced.
#[derive(Clone, Debug, serde::Serialize)]
pub struct IterationReport {
    pub iteration: u32,
    pub seed: u64,
    pub summary: RunSummary,
    pub digest: TraceDigest,
    pub rng_draws: u64,
    pub log: RecordLog,
}

impl IterationReport {
    pub fn records(&self) -> &[CombatRecord] {
        self.log.records()
    }

    pub fn damage_by(&self, actor: ActorId) -> u64 {
        self.log.damage_by(actor)
    }

    /// Damage per second over the run's end time; zero for an empty run.
    pub fn dps(&self, actor: ActorId) -> f64 {
        let secs = self.summary.end_time.as_secs_f64();
        if secs > 0.0 {
            self.damage_by(actor) as f64 / secs
        } else {
            0.0
        }
    }

    /// `actor`'s damage split by the action or aura it came from.
    pub fn damage_by_origin(&self, actor: ActorId) -> BTreeMap<DamageSource, u64> {
        let mut split = BTreeMap::new();
        for record in self.records() {
            match record {
                CombatRecord::DamageDealt {
                    source,
                    origin,
                    amount,
                    ..
                } if *source == actor => {
                    *split.entry(*origin).or_insert(0) += u64::from(*amount);
                }
                _ => {}
            }
        }
        split
    }
}

/// DPS spread for one actor across a batch.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct BatchSummary {
    pub actor: ActorId,
    pub iterations: usize,
    pub mean_dps: f64,
    pub min_dps: f64,
    pub max_dps: f64,
}

impl BatchSummary {
    /// `None` when `reports` is empty.
    pub fn for_actor(reports: &[IterationReport], actor: ActorId) -> Option<Self> {
        if reports.is_empty() {
            return None;
        }
        let samples: Vec<f64> = reports.iter().map(|report| report.dps(actor)).collect();
        let total: f64 = samples.iter().sum();
        Some(Self {
            actor,
            iterations: samples.len(),
            mean_dps: total / samples.len() as f64,
            min_dps: samples.iter().copied().fold(f64::INFINITY, f64::min),
            max_dps: samples.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[cfg(test)]
mod tests {
    use combat_core::{
        ActionId, AuraId, HitResult, RecordSink, SimTime, StopReason,
    };

    use super::*;

    const BARD: ActorId = ActorId(2);
    const DUMMY: ActorId = ActorId(1);

    fn hit(origin: DamageSource, amount: u32) -> CombatRecord {
        CombatRecord::DamageDealt {
            at: SimTime::ZERO,
            source: BARD,
            target: DUMMY,
            origin,
            amount,
            outcome: HitResult::Hit,
        }
    }

    fn report(iteration: u32, end_secs: u64, hits: &[(DamageSource, u32)]) -> IterationReport {
        let mut log = RecordLog::new();
        for (origin, amount) in hits {
            log.record(hit(*origin, *amount));
        }
        IterationReport {
            iteration,
            seed: u64::from(iteration),
            summary: RunSummary {
                reason: StopReason::TimeLimit,
                end_time: SimTime::from_secs(end_secs),
                dispatched: 0,
                dropped: 0,
            },
            digest: TraceDigest([0; 32]),
            rng_draws: 0,
            log,
        }
    }

    #[test]
    fn damage_splits_by_origin() {
        let shot = DamageSource::Action(ActionId(1));
        let dot = DamageSource::Aura(AuraId(1));
        let report = report(0, 10, &[(shot, 300), (dot, 50), (shot, 200)]);

        let split = report.damage_by_origin(BARD);
        assert_eq!(split.get(&shot), Some(&500));
        assert_eq!(split.get(&dot), Some(&50));
        assert_eq!(report.dps(BARD), 55.0);
        assert!(report.damage_by_origin(DUMMY).is_empty());
    }

    #[test]
    fn summary_spans_iterations() {
        let shot = DamageSource::Action(ActionId(1));
        let reports = [
            report(0, 10, &[(shot, 1_000)]),
            report(1, 10, &[(shot, 2_000)]),
            report(2, 0, &[]),
        ];
        let summary = BatchSummary::for_actor(&reports, BARD).unwrap();
        assert_eq!(summary.iterations, 3);
        assert_eq!(summary.min_dps, 0.0);
        assert_eq!(summary.max_dps, 200.0);
        assert_eq!(summary.mean_dps, 100.0);
        assert!(BatchSummary::for_actor(&[], BARD).is_none());
    }
}
