//! Drop table primitives: categories, their counters, and the weighted sampler.

pub mod sampler;
pub mod types;

pub use sampler::{RngSampler, Sampler, ScriptedSampler};
pub use types::{category_label, Category, CategoryReport, CategoryStats};
