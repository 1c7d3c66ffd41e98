use crate::equipment::EquipmentError;
use crate::error::{ErrorSeverity, SimError};
use crate::types::{ActionId, ActorId, AuraId};

/// Errors that prevent a simulator from being built.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("actor {actor} has an invalid loadout")]
    Equipment {
        actor: ActorId,
        #[source]
        source: EquipmentError,
    },

    #[error("actor {0} registered twice")]
    DuplicateActor(ActorId),

    #[error("actor {actor} knows {action}, which is not in the catalog")]
    UnknownAction { actor: ActorId, action: ActionId },

    #[error("{action} references {aura}, which is not in the catalog")]
    UnknownAura { action: ActionId, aura: AuraId },

    #[error("actor {actor} targets unregistered actor {target}")]
    UnknownTarget { actor: ActorId, target: ActorId },
}

impl SimError for SetupError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Equipment { source, .. } => source.error_code(),
            Self::DuplicateActor(_) => "SETUP_DUPLICATE_ACTOR",
            Self::UnknownAction { .. } => "SETUP_UNKNOWN_ACTION",
            Self::UnknownAura { .. } => "SETUP_UNKNOWN_AURA",
            Self::UnknownTarget { .. } => "SETUP_UNKNOWN_TARGET",
        }
    }
}
