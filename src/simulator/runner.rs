//! Drives a configured simulation from drop table to report.

use super::config::SimConfig;
use super::distribution::SuccessCounts;
use super::engine::DropSimulator;
use super::parallel::ParallelOptions;
use super::report::SimReport;
use crate::drops::RngSampler;
use crate::error::Result;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

/// Run the full simulation and return a report.
pub fn run_simulation(config: &SimConfig) -> Result<SimReport> {
    run_simulation_with_stop(config, &AtomicBool::new(false))
}

/// Same as [`run_simulation`], but a sequential run stops between
/// repetitions once `stop` is set. Parallel runs always finish.
pub fn run_simulation_with_stop(config: &SimConfig, stop: &AtomicBool) -> Result<SimReport> {
    config.validate()?;
    let mut simulator = DropSimulator::new(config.categories.clone())?;

    // Draw a seed up front so every report can be reproduced
    let seed = config.seed.unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        seed,
        max_runs = config.max_runs,
        repetitions = config.repetitions,
        parallel = config.parallel,
        "running drop simulation"
    );

    let counts = run_counts(&mut simulator, config, seed, stop)?;
    let distribution = simulator.compute_distributions(&counts)?;

    Ok(SimReport::new(
        config,
        seed,
        simulator.category_reports(),
        &counts,
        distribution,
    ))
}

fn run_counts(
    simulator: &mut DropSimulator,
    config: &SimConfig,
    seed: u64,
    stop: &AtomicBool,
) -> Result<SuccessCounts> {
    if config.parallel {
        return simulator.run_repeated_trials_parallel(
            config.max_runs,
            config.repetitions,
            ParallelOptions {
                seed,
                chunk_size: config.chunk_size,
                threads: config.threads,
            },
        );
    }

    let mut sampler = RngSampler::new(ChaCha8Rng::seed_from_u64(seed));
    let counts = simulator.run_repeated_trials_until(
        config.max_runs,
        config.repetitions,
        &mut sampler,
        || stop.load(Ordering::Relaxed),
    )?;
    Ok(counts)
}
