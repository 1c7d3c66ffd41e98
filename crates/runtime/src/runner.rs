//! Parallel iteration driver.
//!
//! The driver task acquires a semaphore permit per iteration, runs the
//! iteration on the blocking pool and forwards its report. Reports arrive in
//! completion order; [`BatchRunner::collect`] restores iteration order.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use combat_core::{SimTime, compute_seed};

use crate::config::BatchConfig;
use crate::error::{Result, RuntimeError};
use crate::factory::EncounterFactory;
use crate::report::IterationReport;

/// Runs a batch of independent encounters.
pub struct BatchRunner<F> {
    config: BatchConfig,
    factory: Arc<F>,
}

impl<F: EncounterFactory> BatchRunner<F> {
    pub fn new(config: BatchConfig, factory: F) -> Self {
        Self {
            config,
            factory: Arc::new(factory),
        }
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Start the batch and return the report stream.
    ///
    /// Must be called within a tokio runtime. Dropping the receiver stops
    /// scheduling further iterations.
    pub fn stream(&self) -> mpsc::Receiver<Result<IterationReport>> {
        let (tx, rx) = mpsc::channel(self.config.report_buffer.max(1));
        tokio::spawn(drive(self.config.clone(), Arc::clone(&self.factory), tx));
        rx
    }

    /// Run every iteration and return the reports in iteration order.
    ///
    /// Fails on the first iteration error; remaining iterations are abandoned.
    pub async fn collect(&self) -> Result<Vec<IterationReport>> {
        let mut rx = self.stream();
        let mut reports = Vec::with_capacity(self.config.iterations as usize);
        while let Some(report) = rx.recv().await {
            reports.push(report?);
        }
        reports.sort_by_key(|report| report.iteration);
        Ok(reports)
    }
}

#[tracing::instrument(
    name = "batch",
    skip_all,
    fields(iterations = config.iterations, base_seed = config.base_seed)
)]
async fn drive<F: EncounterFactory>(
    config: BatchConfig,
    factory: Arc<F>,
    tx: mpsc::Sender<Result<IterationReport>>,
) {
    info!(
        target: "combat::batch",
        parallelism = config.parallelism,
        max_time = %config.max_time,
        "batch started"
    );

    let permits = Arc::new(Semaphore::new(config.parallelism.max(1)));
    let mut workers = JoinSet::new();
    let mut completed = 0u32;

    for iteration in 0..config.iterations {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let factory = Arc::clone(&factory);
        let seed = compute_seed(config.base_seed, u64::from(iteration));
        let max_time = config.max_time;
        workers.spawn_blocking(move || {
            let _permit = permit;
            run_iteration(factory.as_ref(), iteration, seed, max_time)
        });

        while let Some(joined) = workers.try_join_next() {
            if !forward(&tx, joined).await {
                warn!(target: "combat::batch", "report receiver dropped; stopping");
                return;
            }
            completed += 1;
        }
    }

    while let Some(joined) = workers.join_next().await {
        if !forward(&tx, joined).await {
            warn!(target: "combat::batch", "report receiver dropped; stopping");
            return;
        }
        completed += 1;
    }

    info!(target: "combat::batch", completed, "batch finished");
}

/// Send one worker outcome. Returns false once the receiver is gone.
async fn forward(
    tx: &mpsc::Sender<Result<IterationReport>>,
    joined: std::result::Result<Result<IterationReport>, JoinError>,
) -> bool {
    let report = joined.unwrap_or_else(|err| Err(RuntimeError::WorkerJoin(err)));
    tx.send(report).await.is_ok()
}

fn run_iteration<F: EncounterFactory>(
    factory: &F,
    iteration: u32,
    seed: u64,
    max_time: SimTime,
) -> Result<IterationReport> {
    let mut sim = factory
        .encounter(iteration)
        .seed(seed)
        .build()
        .map_err(|source| {
            warn!(target: "combat::batch", iteration, seed, %source, "iteration setup failed");
            RuntimeError::Setup { iteration, source }
        })?;

    let summary = sim.run(max_time);
    let digest = sim.trace().digest();
    let rng_draws = sim.rng_draws();
    debug!(
        target: "combat::batch",
        iteration,
        seed,
        reason = ?summary.reason,
        end = %summary.end_time,
        digest = %digest,
        "iteration finished"
    );

    Ok(IterationReport {
        iteration,
        seed,
        summary,
        digest,
        rng_draws,
        log: sim.into_sink(),
    })
}
