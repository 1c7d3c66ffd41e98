//! Shared action and aura definitions.

use std::collections::BTreeMap;

use crate::action::ActionDefinition;
use crate::aura::AuraDefinition;
use crate::simulator::SetupError;
use crate::types::{ActionId, AuraId};

/// Read-only registry every actor of a run resolves ids against.
///
/// Wrap it in an `Arc` to share one catalog across many simulators.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    actions: BTreeMap<ActionId, ActionDefinition>,
    auras: BTreeMap<AuraId, AuraDefinition>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_action(mut self, action: ActionDefinition) -> Self {
        self.insert_action(action);
        self
    }

    #[must_use]
    pub fn with_aura(mut self, aura: AuraDefinition) -> Self {
        self.insert_aura(aura);
        self
    }

    /// Insert or replace an action definition.
    pub fn insert_action(&mut self, action: ActionDefinition) -> Option<ActionDefinition> {
        self.actions.insert(action.id, action)
    }

    /// Insert or replace an aura definition.
    pub fn insert_aura(&mut self, aura: AuraDefinition) -> Option<AuraDefinition> {
        self.auras.insert(aura.id, aura)
    }

    pub fn action(&self, id: ActionId) -> Option<&ActionDefinition> {
        self.actions.get(&id)
    }

    pub fn aura(&self, id: AuraId) -> Option<&AuraDefinition> {
        self.auras.get(&id)
    }

    pub fn actions(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.values()
    }

    pub fn auras(&self) -> impl Iterator<Item = &AuraDefinition> {
        self.auras.values()
    }

    /// Every aura an action references must be defined.
    pub fn validate(&self) -> Result<(), SetupError> {
        for action in self.actions.values() {
            for aura in action.referenced_auras() {
                if !self.auras.contains_key(&aura) {
                    return Err(SetupError::UnknownAura {
                        action: action.id,
                        aura,
                    });
                }
            }
        }
        Ok(())
    }
}
