//! Scheduled occurrences.

use crate::action::RecastKey;
use crate::types::{ActionId, ActorId, AuraId, HitResult, ResourceKind, SimTime};

/// Precedence among events sharing a timestamp; lower tiers dispatch first.
///
/// Ticks run before expiry so a tick due exactly at expiry still lands.
/// Expiry runs before application so a reapplication at the expiry instant
/// starts a fresh aura. Decisions come last and see the settled state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, strum::Display, strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PriorityTier {
    Periodic = 0,
    Expiry = 1,
    Application = 2,
    Impact = 3,
    Recovery = 4,
    Decision = 5,
}

/// What a damage event is attributed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DamageSource {
    Action(ActionId),
    Aura(AuraId),
    /// A weapon swing.
    AutoAttack,
}

/// Typed payload of an event. The discriminant is the event's [`EventKind`].
#[derive(Clone, Debug, PartialEq, Eq, strum::EnumDiscriminants)]
#[strum_discriminants(name(EventKind))]
#[strum_discriminants(derive(Hash, PartialOrd, Ord, strum::Display, strum::EnumIter))]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    strum_discriminants(derive(serde::Serialize, serde::Deserialize))
)]
pub enum EventPayload {
    /// The target actor asks its policy for an action and executes it.
    ActorReady,
    Damage {
        source: ActorId,
        origin: DamageSource,
        amount: u32,
        outcome: HitResult,
    },
    AuraApply {
        source: ActorId,
        aura: AuraId,
    },
    /// Guarded by the instance's pending tick time.
    AuraTick {
        aura: AuraId,
        due: SimTime,
    },
    /// Guarded by the instance's expiry captured at scheduling time.
    AuraExpire {
        aura: AuraId,
        expires_at: SimTime,
    },
    AuraConsume {
        source: ActorId,
        aura: AuraId,
        stacks: u8,
    },
    ResourceRestore {
        source: ActorId,
        resource: ResourceKind,
        amount: u32,
    },
    ResourceRegen,
    /// One weapon swing at the target actor's default target. Guarded like
    /// [`ActorReady`](Self::ActorReady) by the actor's pending swing time.
    AutoAttack,
    RecastReady {
        key: RecastKey,
        ready_at: SimTime,
    },
}

impl EventPayload {
    pub const fn tier(&self) -> PriorityTier {
        match self {
            Self::AuraTick { .. } | Self::ResourceRegen => PriorityTier::Periodic,
            Self::AuraExpire { .. } => PriorityTier::Expiry,
            Self::AuraApply { .. } | Self::AuraConsume { .. } => PriorityTier::Application,
            Self::Damage { .. } | Self::ResourceRestore { .. } | Self::AutoAttack => {
                PriorityTier::Impact
            }
            Self::RecastReady { .. } => PriorityTier::Recovery,
            Self::ActorReady => PriorityTier::Decision,
        }
    }
}

/// A timestamped occurrence targeting one actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Event {
    pub at: SimTime,
    pub tier: PriorityTier,
    pub target: ActorId,
    pub payload: EventPayload,
}

impl Event {
    /// Build an event; the tier follows from the payload.
    pub fn new(at: SimTime, target: ActorId, payload: EventPayload) -> Self {
        Self {
            at,
            tier: payload.tier(),
            target,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::from(&self.payload)
    }
}
