//! Drop table data: categories, their lifetime counters, and report rows.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// One outcome of a weighted drop table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub probability: f64,
    #[serde(default)]
    pub wanted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Category {
    pub fn new(probability: f64, wanted: bool) -> Self {
        Self {
            probability,
            wanted,
            label: None,
        }
    }

    pub fn wanted(probability: f64) -> Self {
        Self::new(probability, true)
    }

    pub fn unwanted(probability: f64) -> Self {
        Self::new(probability, false)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Parses `PROB[:wanted][:LABEL]`, e.g. `0.25`, `1/3:wanted`, `0.1:wanted:Sword`.
    ///
    /// The second field also accepts `w`, `y`, `yes`, `true` and their
    /// negatives. Probabilities may be decimals or simple fractions.
    pub fn parse(spec: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidCategorySpec {
            spec: spec.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = spec.splitn(3, ':');
        let prob_text = parts.next().unwrap_or("").trim();
        if prob_text.is_empty() {
            return Err(invalid("missing probability"));
        }
        let probability = parse_probability(prob_text).ok_or_else(|| invalid("bad probability"))?;

        let wanted = match parts.next().map(|s| s.trim().to_ascii_lowercase()) {
            None => false,
            Some(flag) => match flag.as_str() {
                "" | "n" | "no" | "false" | "unwanted" => false,
                "w" | "y" | "yes" | "true" | "wanted" => true,
                _ => return Err(invalid("wanted flag must be 'wanted' or 'unwanted'")),
            },
        };

        let mut category = Category::new(probability, wanted);
        if let Some(label) = parts.next().map(str::trim).filter(|l| !l.is_empty()) {
            category = category.with_label(label);
        }
        Ok(category)
    }
}

fn parse_probability(text: &str) -> Option<f64> {
    match text.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => text.parse().ok(),
    }
}

/// Positional letter label: 0 -> "A", 25 -> "Z", 26 -> "AA", 27 -> "AB".
pub fn category_label(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Lifetime counters for one category, owned by the simulator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total_occurrences: u64,
    /// Every trial counts for every category, whichever one was drawn.
    pub total_trials_observed: u64,
}

impl CategoryStats {
    pub fn drop_rate(&self) -> Option<f64> {
        if self.total_trials_observed == 0 {
            None
        } else {
            Some(self.total_occurrences as f64 / self.total_trials_observed as f64)
        }
    }

    pub fn merge(&mut self, other: &CategoryStats) {
        self.total_occurrences += other.total_occurrences;
        self.total_trials_observed += other.total_trials_observed;
    }
}

/// Per-category view handed to reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    pub label: String,
    pub probability: f64,
    pub wanted: bool,
    pub drop_rate: Option<f64>,
    pub total_occurrences: u64,
    pub total_trials_observed: u64,
}
