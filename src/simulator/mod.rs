//! Monte Carlo estimation of how many runs it takes to collect every wanted drop.
//!
//! Thousands of independent repetitions each draw from the drop table until
//! all wanted items have appeared or the run bound is reached. The number of
//! repetitions that finished at each run index becomes an exact and a
//! cumulative probability distribution.

mod config;
mod distribution;
mod engine;
mod parallel;
mod report;
mod runner;

pub use config::{default_drop_table, SimConfig};
pub use distribution::{cumulative_sum, RepetitionOutcome, RunDistribution, SuccessCounts};
pub use engine::DropSimulator;
pub use parallel::ParallelOptions;
pub use report::{SimReport, CONFIDENCE_LEVELS};
pub use runner::{run_simulation, run_simulation_with_stop};
