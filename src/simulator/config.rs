//! Simulation configuration.

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_MAX_RUNS, DEFAULT_REPETITIONS, PRECISE_REPETITIONS,
    QUICK_REPETITIONS,
};
use crate::drops::Category;
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// The drop table to sample
    pub categories: Vec<Category>,

    /// Maximum runs per repetition before it counts as censored
    pub max_runs: u32,

    /// Number of independent repetitions
    pub repetitions: u64,

    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,

    /// Spread repetitions over a rayon pool
    pub parallel: bool,

    /// Repetitions per parallel chunk
    pub chunk_size: u64,

    /// Worker threads for parallel runs (None = rayon default)
    pub threads: Option<usize>,

    /// Log verbosity (0 = warnings only, 1 = summary, 2 = detailed)
    pub verbosity: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            categories: default_drop_table(),
            max_runs: DEFAULT_MAX_RUNS,
            repetitions: DEFAULT_REPETITIONS,
            seed: None,
            parallel: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
            threads: None,
            verbosity: 1,
        }
    }
}

impl SimConfig {
    /// Quick config for eyeballing a table
    pub fn quick() -> Self {
        Self {
            repetitions: QUICK_REPETITIONS,
            ..Default::default()
        }
    }

    /// Many repetitions, spread across threads
    pub fn precise() -> Self {
        Self {
            repetitions: PRECISE_REPETITIONS,
            parallel: true,
            ..Default::default()
        }
    }

    /// Reads a JSON config; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: SimConfig = serde_json::from_str(text)?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks run bounds. The drop table itself is validated by the simulator.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_runs == 0 {
            return Err(ConfigError::ZeroMaxRuns);
        }
        if self.repetitions == 0 {
            return Err(ConfigError::ZeroRepetitions);
        }
        Ok(())
    }
}

/// Three equally likely drops, two of them wanted.
pub fn default_drop_table() -> Vec<Category> {
    vec![
        Category::unwanted(1.0 / 3.0),
        Category::wanted(1.0 / 3.0),
        Category::wanted(1.0 / 3.0),
    ]
}
