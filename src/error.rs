//! Error types for simulation setup and aggregation.

/// Invalid inputs detected before any sampling happens.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("category set is empty")]
    EmptyCategorySet,

    #[error("category {index} has non-positive probability {probability}")]
    NonPositiveProbability { index: usize, probability: f64 },

    #[error("category {index} has probability {probability} outside (0, 1]")]
    ProbabilityOutOfRange { index: usize, probability: f64 },

    #[error("category probabilities sum to {sum}, expected 1 within {tolerance}")]
    ProbabilitySum { sum: f64, tolerance: f64 },

    #[error("max runs must be at least 1")]
    ZeroMaxRuns,

    #[error("repetitions must be at least 1")]
    ZeroRepetitions,

    #[error("invalid category spec '{spec}': {reason}")]
    InvalidCategorySpec { spec: String, reason: String },

    #[error("{flag}: {reason}")]
    InvalidArgument { flag: String, reason: String },
}

/// Top-level error for simulation and reporting.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Distributions were requested from counts that cover no repetitions.
    #[error("cannot compute distributions: no repetitions have been executed")]
    NoRepetitions,

    #[error("cannot merge counts over {found} runs into counts over {expected} runs")]
    RunBoundMismatch { expected: u32, found: u32 },

    #[error("completion run {run} is outside 1..={max_runs}")]
    RunOutOfRange { run: u32, max_runs: u32 },

    /// An injected sampler picked an index the drop table does not have.
    #[error("sampler returned index {index} for a table of {categories} categories")]
    SamplerOutOfRange { index: usize, categories: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T, E = SimError> = std::result::Result<T, E>;
