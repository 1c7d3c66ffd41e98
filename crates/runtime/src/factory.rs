//! Encounter assembly.

use combat_core::SimulatorBuilder;

/// Builds a fresh encounter for each iteration.
///
/// The runner applies the iteration seed to the returned builder, so
/// factories describe the fight and never pick a seed themselves. Called
/// from blocking worker threads.
pub trait EncounterFactory: Send + Sync + 'static {
    fn encounter(&self, iteration: u32) -> SimulatorBuilder;
}

impl<F> EncounterFactory for F
where
    F: Fn(u32) -> SimulatorBuilder + Send + Sync + 'static,
{
    fn encounter(&self, iteration: u32) -> SimulatorBuilder {
        self(iteration)
    }
}
