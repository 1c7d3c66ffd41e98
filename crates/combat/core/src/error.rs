//! Common error infrastructure for combat-core.
//!
//! Domain errors (`ActionError`, `ScheduleError`, `EquipmentError`, ...) live
//! next to the component that raises them. Each implements [`SimError`] so the
//! simulator can classify failures and surface them as anomaly records with a
//! stable code.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the behavior policy may pick another action, or the
///   single affected effect is skipped
/// - **Validation**: malformed input that should not be retried unchanged
/// - **Internal**: engine state inconsistency
/// - **Fatal**: the run cannot start or continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: action still recovering, resource shortfall, dead target.
    Recoverable,

    /// Examples: unknown action id, actor not found.
    Validation,

    /// Examples: actor index desync. These indicate bugs.
    Internal,

    /// Examples: scheduling into the past, incompatible equipment slots.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all combat-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait SimError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Anomaly records carry this code. Default implementation uses the type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("probe")]
    struct Probe;

    impl SimError for Probe {
        fn severity(&self) -> ErrorSeverity {
            ErrorSeverity::Validation
        }
    }

    #[test]
    fn default_error_code_is_type_name() {
        assert!(Probe.error_code().ends_with("Probe"));
    }

    #[test]
    fn severity_classification() {
        assert!(ErrorSeverity::Recoverable.is_recoverable());
        assert!(!ErrorSeverity::Validation.is_recoverable());
        assert!(ErrorSeverity::Fatal.is_internal());
        assert_eq!(ErrorSeverity::Internal.as_str(), "internal");
    }
}
