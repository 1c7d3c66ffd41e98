//! Batch orchestration for combat simulations.
//!
//! Each iteration is an independent [`Simulator`](combat_core::Simulator) run
//! with its own derived seed. Iterations execute on tokio's blocking pool,
//! bounded by a semaphore, and their reports stream back over a channel.
//!
//! Modules are organized by responsibility:
//! - [`config`] holds batch parameters
//! - [`factory`] defines how an encounter is assembled per iteration
//! - [`runner`] drives iterations and streams [`IterationReport`]s
//! - [`report`] carries per-iteration results and aggregates
pub mod config;
pub mod error;
pub mod factory;
pub mod report;
pub mod runner;

pub use config::BatchConfig;
pub use error::{Result, RuntimeError};
pub use factory::EncounterFactory;
pub use report::{BatchSummary, IterationReport};
pub use runner::BatchRunner;
