//! Simulation defaults and numeric tolerances.

/// Allowed deviation of the summed category probabilities from 1.0.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Default upper bound on runs per repetition.
pub const DEFAULT_MAX_RUNS: u32 = 50;

/// Default number of independent repetitions.
pub const DEFAULT_REPETITIONS: u64 = 10_000;

/// Repetitions per parallel work unit. Seeds are derived per chunk, so this
/// value (not the thread count) determines the random stream of a seeded run.
pub const DEFAULT_CHUNK_SIZE: u64 = 1_024;

/// Repetition count used by [`crate::simulator::SimConfig::precise`].
pub const PRECISE_REPETITIONS: u64 = 100_000;

/// Repetition count used by [`crate::simulator::SimConfig::quick`].
pub const QUICK_REPETITIONS: u64 = 1_000;
