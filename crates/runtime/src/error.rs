//! Errors surfaced by batch runs.
use combat_core::{ErrorSeverity, SetupError, SimError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("iteration {iteration} failed to set up")]
    Setup {
        iteration: u32,
        #[source]
        source: SetupError,
    },

    #[error("iteration worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl SimError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Setup { .. } => ErrorSeverity::Fatal,
            Self::WorkerJoin(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Setup { source, .. } => source.error_code(),
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}
