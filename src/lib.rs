//! droprate - how many runs until every wanted drop has appeared?
//!
//! Monte Carlo estimation of coupon-collector style completion times for a
//! weighted drop table where only some outcomes are wanted.

pub mod build_info;
pub mod constants;
pub mod drops;
pub mod error;
pub mod logging;
pub mod simulator;

pub use drops::{Category, RngSampler, Sampler, ScriptedSampler};
pub use error::{ConfigError, SimError};
pub use simulator::{run_simulation, DropSimulator, RunDistribution, SimConfig, SimReport};
