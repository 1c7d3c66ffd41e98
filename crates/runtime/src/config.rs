use std::num::NonZeroUsize;

use combat_core::SimTime;

/// Batch configuration shared by the runner and its workers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub iterations: u32,
    /// Iteration seeds are derived from this with `compute_seed`.
    pub base_seed: u64,
    /// Horizon handed to every run.
    pub max_time: SimTime,
    /// Upper bound on concurrently running iterations.
    pub parallelism: usize,
    /// Capacity of the report channel.
    pub report_buffer: usize,
}

impl BatchConfig {
    pub const DEFAULT_ITERATIONS: u32 = 100;
    pub const DEFAULT_MAX_TIME: SimTime = SimTime::from_secs(300);
    pub const DEFAULT_REPORT_BUFFER: usize = 64;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_base_seed(mut self, base_seed: u64) -> Self {
        self.base_seed = base_seed;
        self
    }

    pub fn with_max_time(mut self, max_time: SimTime) -> Self {
        self.max_time = max_time;
        self
    }

    /// Clamped to at least one worker.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn with_report_buffer(mut self, report_buffer: usize) -> Self {
        self.report_buffer = report_buffer.max(1);
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            iterations: Self::DEFAULT_ITERATIONS,
            base_seed: 0,
            max_time: Self::DEFAULT_MAX_TIME,
            parallelism: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            report_buffer: Self::DEFAULT_REPORT_BUFFER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_clamp_to_one() {
        let config = BatchConfig::new()
            .with_parallelism(0)
            .with_report_buffer(0);
        assert_eq!(config.parallelism, 1);
        assert_eq!(config.report_buffer, 1);
        assert_eq!(config.iterations, 100);
        assert_eq!(config.max_time, SimTime::from_secs(300));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: BatchConfig =
            serde_json::from_str(r#"{ "iterations": 5, "base_seed": 7 }"#).unwrap();
        assert_eq!(config.iterations, 5);
        assert_eq!(config.base_seed, 7);
        assert_eq!(config.report_buffer, BatchConfig::DEFAULT_REPORT_BUFFER);
    }
}
