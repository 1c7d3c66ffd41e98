//! Discrete-event simulator.
//!
//! The simulator owns every actor, the event queue, the random source and the
//! record sink of one run. Time only advances by popping the next event; each
//! dispatch may schedule further events at or after the current time.

mod dispatch;
mod error;
mod resolve;

pub use error::SetupError;
pub use resolve::Resolution;

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::actor::{Actor, ActorSpec};
use crate::catalog::Catalog;
use crate::config::SimConfig;
use crate::error::{ErrorSeverity, SimError};
use crate::event::{Event, EventKind, EventPayload};
use crate::math::{CombatFormulas, CombatParams, StandardFormulas};
use crate::policy::{PolicyView, Rejection};
use crate::queue::{EventKey, EventQueue, ScheduleError};
use crate::record::{CombatRecord, RecordLog, RecordSink};
use crate::rng::PcgRng;
use crate::trace::EventTrace;
use crate::types::{ActorId, SimTime};

/// Why a run stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StopReason {
    /// Nothing left to dispatch.
    QueueEmpty,
    /// The next event lies beyond the horizon.
    TimeLimit,
    /// An actor fell with `end_on_defeat` set.
    Defeat(ActorId),
    Aborted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunSummary {
    pub reason: StopReason,
    pub end_time: SimTime,
    /// Events dispatched during this run.
    pub dispatched: u64,
    /// Pending events discarded when the run stopped.
    pub dropped: usize,
}

/// Assembles a [`Simulator`] from a catalog and actor specs.
pub struct SimulatorBuilder<S = RecordLog> {
    catalog: Arc<Catalog>,
    config: SimConfig,
    formulas: Option<Arc<dyn CombatFormulas>>,
    seed: u64,
    actors: Vec<ActorSpec>,
    sink: S,
}

impl SimulatorBuilder<RecordLog> {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            config: SimConfig::default(),
            formulas: None,
            seed: 0,
            actors: Vec::new(),
            sink: RecordLog::new(),
        }
    }
}

impl<S: RecordSink> SimulatorBuilder<S> {
    #[must_use]
    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn formulas(mut self, formulas: Arc<dyn CombatFormulas>) -> Self {
        self.formulas = Some(formulas);
        self
    }

    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Register an actor. Registration order is the tie-break order for
    /// simultaneous decisions and multi-target resolution.
    #[must_use]
    pub fn actor(mut self, spec: ActorSpec) -> Self {
        self.actors.push(spec);
        self
    }

    /// Replace the record sink.
    pub fn sink<T: RecordSink>(self, sink: T) -> SimulatorBuilder<T> {
        SimulatorBuilder {
            catalog: self.catalog,
            config: self.config,
            formulas: self.formulas,
            seed: self.seed,
            actors: self.actors,
            sink,
        }
    }

    pub fn build(self) -> Result<Simulator<S>, SetupError> {
        self.catalog.validate()?;

        let mut actors: Vec<Actor> = Vec::with_capacity(self.actors.len());
        let mut index = BTreeMap::new();
        for spec in self.actors {
            if index.insert(spec.id, actors.len()).is_some() {
                return Err(SetupError::DuplicateActor(spec.id));
            }
            actors.push(Actor::from_spec(spec, &self.catalog)?);
        }
        for actor in &actors {
            match actor.default_target() {
                Some(target) if !index.contains_key(&target) => {
                    return Err(SetupError::UnknownTarget {
                        actor: actor.id(),
                        target,
                    });
                }
                _ => {}
            }
        }

        let formulas = self
            .formulas
            .unwrap_or_else(|| Arc::new(StandardFormulas::new(CombatParams::default())));
        let trace = EventTrace::new(self.config.capture_trace);

        debug!(
            target: "combat::sim",
            seed = self.seed,
            actors = actors.len(),
            "simulator built"
        );

        Ok(Simulator {
            config: self.config,
            catalog: self.catalog,
            formulas,
            rng: PcgRng::new(self.seed),
            seed: self.seed,
            now: SimTime::ZERO,
            horizon: SimTime::MAX,
            queue: EventQueue::new(),
            actors,
            index,
            sink: self.sink,
            trace,
            started: false,
            halted: None,
            dispatched: 0,
            dropped: 0,
        })
    }
}

/// One deterministic combat run.
pub struct Simulator<S = RecordLog> {
    config: SimConfig,
    catalog: Arc<Catalog>,
    formulas: Arc<dyn CombatFormulas>,
    rng: PcgRng,
    seed: u64,
    now: SimTime,
    horizon: SimTime,
    queue: EventQueue,
    actors: Vec<Actor>,
    index: BTreeMap<ActorId, usize>,
    sink: S,
    trace: EventTrace,
    started: bool,
    halted: Option<StopReason>,
    dispatched: u64,
    dropped: usize,
}

impl Simulator<RecordLog> {
    pub fn builder(catalog: Arc<Catalog>) -> SimulatorBuilder<RecordLog> {
        SimulatorBuilder::new(catalog)
    }
}

impl<S: RecordSink> Simulator<S> {
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.index.get(&id).map(|&idx| &self.actors[idx])
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Pending events in no particular order.
    pub fn pending(&self) -> impl Iterator<Item = &Event> {
        self.queue.pending()
    }

    pub fn trace(&self) -> &EventTrace {
        &self.trace
    }

    /// Random values consumed so far.
    pub fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// The snapshot `actor`'s policy would receive right now.
    pub fn policy_view(&self, actor: ActorId) -> Option<PolicyView<'_>> {
        self.index_of(actor).map(|idx| self.view(idx, &[]))
    }

    fn view<'a>(&'a self, idx: usize, rejections: &'a [Rejection]) -> PolicyView<'a> {
        PolicyView {
            now: self.now,
            horizon: self.horizon,
            execute_window: self.config.execute_window,
            actor: &self.actors[idx],
            actors: &self.actors,
            catalog: &self.catalog,
            rejections,
        }
    }

    /// Queue an event. Events may not be scheduled before the current time.
    pub fn schedule(&mut self, event: Event) -> Result<EventKey, ScheduleError> {
        if event.at < self.now {
            return Err(ScheduleError::InvalidTimestamp {
                at: event.at,
                now: self.now,
            });
        }
        if self.config.log.pushes {
            trace!(
                target: "combat::queue",
                at = %event.at,
                kind = %event.kind(),
                actor = %event.target,
                "push"
            );
        }
        Ok(self.queue.push(event))
    }

    /// Seed the queue with an initial decision for every living actor, their
    /// regen chains and, for armed actors, the first swing. Called by
    /// [`run`](Self::run) if needed.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let now = self.now;
        let regen_at = self
            .config
            .regen_enabled()
            .then(|| now + self.config.regen_interval);
        for idx in 0..self.actors.len() {
            if !self.actors[idx].alive {
                continue;
            }
            self.schedule_decision(idx, now);
            if self.actors[idx].weapon().is_some() {
                self.schedule_swing(idx, now);
            }
            if let Some(at) = regen_at {
                let id = self.actors[idx].id();
                self.push(Event::new(at, id, EventPayload::ResourceRegen));
            }
        }
    }

    /// Dispatch the next event. Returns its kind, or `None` when the queue is empty.
    pub fn step(&mut self) -> Option<EventKind> {
        let (key, event) = self.queue.pop()?;
        self.now = key.at;
        self.dispatched += 1;

        let kind = event.kind();
        if self.config.log.pops {
            trace!(
                target: "combat::queue",
                at = %key.at,
                tier = %key.tier,
                seq = key.seq,
                kind = %kind,
                actor = %event.target,
                "pop"
            );
        }
        self.trace.record(&key, &event);
        self.dispatch(event);
        Some(kind)
    }

    /// Dispatch events until the queue empties, the next event lies past
    /// `max_time`, or a defeat ends the run. Remaining events are dropped.
    pub fn run(&mut self, max_time: SimTime) -> RunSummary {
        self.start();
        self.horizon = max_time;
        let dispatched_before = self.dispatched;

        info!(
            target: "combat::sim",
            seed = self.seed,
            max_time = %max_time,
            actors = self.actors.len(),
            "run started"
        );

        let reason = loop {
            if let Some(reason) = self.halted.take() {
                break reason;
            }
            let Some(next) = self.queue.peek_key() else {
                break StopReason::QueueEmpty;
            };
            if next.at > max_time {
                break StopReason::TimeLimit;
            }
            self.step();
        };

        self.dropped += self.queue.clear();
        if reason == StopReason::TimeLimit {
            self.now = self.now.max(max_time);
        }
        let summary = RunSummary {
            reason,
            end_time: self.now,
            dispatched: self.dispatched - dispatched_before,
            dropped: std::mem::take(&mut self.dropped),
        };

        info!(
            target: "combat::sim",
            reason = ?summary.reason,
            end_time = %summary.end_time,
            dispatched = summary.dispatched,
            dropped = summary.dropped,
            "run finished"
        );
        summary
    }

    /// Discard every pending event; the next [`run`](Self::run) reports
    /// [`StopReason::Aborted`].
    pub fn abort(&mut self) -> usize {
        let dropped = self.queue.clear();
        self.dropped += dropped;
        self.halted = Some(StopReason::Aborted);
        dropped
    }

    fn index_of(&self, id: ActorId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    fn is_alive(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(Actor::is_alive)
    }

    /// Schedule from inside dispatch; a failure becomes an anomaly.
    fn push(&mut self, event: Event) -> Option<EventKey> {
        let target = event.target;
        match self.schedule(event) {
            Ok(key) => Some(key),
            Err(error) => {
                self.anomaly(Some(target), &error);
                None
            }
        }
    }

    fn schedule_decision(&mut self, idx: usize, at: SimTime) {
        let actor = &mut self.actors[idx];
        actor.pending_decision = Some(at);
        let id = actor.id();
        self.push(Event::new(at, id, EventPayload::ActorReady));
    }

    fn schedule_swing(&mut self, idx: usize, at: SimTime) {
        let actor = &mut self.actors[idx];
        actor.pending_swing = Some(at);
        let id = actor.id();
        self.push(Event::new(at, id, EventPayload::AutoAttack));
    }

    fn record(&mut self, record: CombatRecord) {
        self.sink.record(record);
    }

    fn anomaly(&mut self, actor: Option<ActorId>, error: &dyn SimError) {
        let severity = error.severity();
        let code = error.error_code();
        if severity == ErrorSeverity::Recoverable {
            debug!(target: "combat::sim", at = %self.now, ?actor, code, %error, "anomaly");
        } else {
            warn!(
                target: "combat::sim",
                at = %self.now,
                ?actor,
                code,
                severity = severity.as_str(),
                %error,
                "anomaly"
            );
        }
        self.record(CombatRecord::Anomaly {
            at: self.now,
            actor,
            code,
            severity,
            detail: error.to_string(),
        });
    }
}

impl<S> std::fmt::Debug for Simulator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulator")
            .field("seed", &self.seed)
            .field("now", &self.now)
            .field("queue_len", &self.queue.len())
            .field("actors", &self.actors)
            .field("dispatched", &self.dispatched)
            .finish_non_exhaustive()
    }
}
