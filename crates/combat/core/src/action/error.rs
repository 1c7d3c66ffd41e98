//! Action resolution errors.

use crate::actor::ResourceError;
use crate::error::{ErrorSeverity, SimError};
use crate::types::{ActionId, ActorId, ResourceKind, SimTime};

/// Errors that can occur while resolving an action.
///
/// Every variant is raised before resolution mutates anything, so a failed
/// attempt leaves the simulator exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionError {
    #[error("actor {0} not found")]
    ActorNotFound(ActorId),

    #[error("actor {0} is defeated")]
    ActorDefeated(ActorId),

    #[error("{0} is not in the catalog")]
    UnknownAction(ActionId),

    #[error("actor {actor} does not know {action}")]
    ActionNotKnown { actor: ActorId, action: ActionId },

    /// Actor is still casting or animation locked.
    #[error("actor is busy until {until}")]
    Busy { until: SimTime },

    /// Recast timer has not elapsed.
    #[error("{action} is recovering until {ready_at}")]
    StillRecovering { action: ActionId, ready_at: SimTime },

    /// Cost exceeds the actor's current resource.
    #[error("insufficient {resource}: need {required}, have {available}")]
    ResourceShortfall {
        resource: ResourceKind,
        required: u32,
        available: u32,
    },

    /// No usable target for the action's target rule.
    #[error("invalid target {target:?}")]
    InvalidTarget { target: Option<ActorId> },
}

impl From<ResourceError> for ActionError {
    fn from(err: ResourceError) -> Self {
        match err {
            ResourceError::InsufficientResource {
                resource,
                required,
                available,
            } => ActionError::ResourceShortfall {
                resource,
                required,
                available,
            },
        }
    }
}

impl SimError for ActionError {
    fn severity(&self) -> ErrorSeverity {
        use ActionError::*;
        match self {
            ActorNotFound(_) | UnknownAction(_) | ActionNotKnown { .. } => {
                ErrorSeverity::Validation
            }
            ActorDefeated(_) | Busy { .. } => ErrorSeverity::Recoverable,
            StillRecovering { .. } | ResourceShortfall { .. } => ErrorSeverity::Recoverable,
            InvalidTarget { .. } => ErrorSeverity::Recoverable,
        }
    }

    fn error_code(&self) -> &'static str {
        use ActionError::*;
        match self {
            ActorNotFound(_) => "ACTION_ACTOR_NOT_FOUND",
            ActorDefeated(_) => "ACTION_ACTOR_DEFEATED",
            UnknownAction(_) => "ACTION_UNKNOWN",
            ActionNotKnown { .. } => "ACTION_NOT_KNOWN",
            Busy { .. } => "ACTION_ACTOR_BUSY",
            StillRecovering { .. } => "ACTION_STILL_RECOVERING",
            ResourceShortfall { .. } => "ACTION_RESOURCE_SHORTFALL",
            InvalidTarget { .. } => "ACTION_INVALID_TARGET",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_error_maps_to_shortfall() {
        let err: ActionError = ResourceError::InsufficientResource {
            resource: ResourceKind::Mana,
            required: 50,
            available: 30,
        }
        .into();
        assert_eq!(err.error_code(), "ACTION_RESOURCE_SHORTFALL");
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "insufficient mana: need 50, have 30");
    }

    #[test]
    fn lookup_failures_are_validation_errors() {
        assert_eq!(
            ActionError::UnknownAction(ActionId(9)).severity(),
            ErrorSeverity::Validation
        );
    }
}
