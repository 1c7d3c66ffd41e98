//! Deterministic discrete-event combat simulation.
//!
//! `combat-core` holds the combat rules (actions, auras, resources, damage
//! formulas) and the event-driven [`Simulator`] that applies them. A run is a
//! pure function of its catalog, actor setup, configuration and seed; batch
//! orchestration lives in `combat-runtime`, decision logic in `rotation`.
pub mod action;
pub mod actor;
pub mod aura;
pub mod catalog;
pub mod config;
pub mod equipment;
pub mod error;
pub mod event;
pub mod math;
pub mod policy;
pub mod queue;
pub mod record;
pub mod rng;
pub mod simulator;
pub mod stats;
pub mod trace;
pub mod types;
pub use action::{
    ActionDefinition, ActionError, Effect, Intent, RecastKey, ResourceCost, Subject, TargetRule,
};
pub use actor::{Actor, ActorSpec, ResourceError, ResourceMeter, ResourcePool};
pub use aura::{
    AuraDefinition, AuraError, AuraInstance, AuraModifier, AuraSet, PeriodicEffect,
    SourceSnapshot, StackingPolicy,
};
pub use catalog::Catalog;
pub use config::{LogOptions, RegenAmount, RegenRule, SimConfig};
pub use equipment::{Equipment, EquipmentError, Item, Materia, Weapon};
pub use error::{ErrorSeverity, SimError};
pub use event::{DamageSource, Event, EventKind, EventPayload, PriorityTier};
pub use math::{CombatFormulas, CombatParams, DamageProfile, Permille, Rounding, StandardFormulas};
pub use policy::{BehaviorPolicy, Idle, PolicyView, Rejection};
pub use queue::{EventKey, EventQueue, ScheduleError};
pub use record::{AuraChange, CombatRecord, RecordLog, RecordSink, ResourceChange};
pub use rng::{PcgRng, RandomSource, compute_seed};
pub use simulator::{
    Resolution, RunSummary, SetupError, Simulator, SimulatorBuilder, StopReason,
};
pub use stats::{Bonus, BonusStack, StatBlock};
pub use trace::{EventTrace, TraceDigest, TraceEntry};
pub use types::{
    ActionCategory, ActionId, ActorId, Attribute, AuraCategory, AuraId, DamageKind, HitResult,
    RecastGroup, ResourceKind, SimTime, Slot, SlotMask, Team,
};
