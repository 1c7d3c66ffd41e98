//! Identifiers, simulation time and shared enumerations.

mod common;
pub mod enums;

pub use common::{ActionId, ActorId, AuraId, RecastGroup, SimTime, Team};
pub use enums::{
    ActionCategory, Attribute, AuraCategory, DamageKind, HitResult, ResourceKind, Slot, SlotMask,
};
