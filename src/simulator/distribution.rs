//! Success counts and the probability distributions derived from them.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};

/// How one repetition ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepetitionOutcome {
    /// Every wanted category had appeared by this (1-based) run.
    Succeeded(u32),
    /// `max_runs` was exhausted first.
    Censored,
}

/// Number of repetitions that completed at each run index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessCounts {
    /// Index 0 holds run 1.
    by_run: Vec<u64>,
    repetitions: u64,
    censored: u64,
}

impl SuccessCounts {
    pub fn new(max_runs: u32) -> Self {
        Self {
            by_run: vec![0; max_runs as usize],
            repetitions: 0,
            censored: 0,
        }
    }

    /// Counts one finished repetition. A success past `max_runs` (or at run
    /// 0) is rejected and leaves the counts untouched.
    pub fn record(&mut self, outcome: RepetitionOutcome) -> Result<()> {
        match outcome {
            RepetitionOutcome::Succeeded(run) => {
                let max_runs = self.by_run.len() as u32;
                let slot = run
                    .checked_sub(1)
                    .and_then(|i| self.by_run.get_mut(i as usize))
                    .ok_or(SimError::RunOutOfRange {
                        run,
                        max_runs,
                    })?;
                *slot += 1;
            }
            RepetitionOutcome::Censored => self.censored += 1,
        }
        self.repetitions += 1;
        Ok(())
    }

    /// Sums `other` into `self`. Both must cover the same `max_runs`;
    /// otherwise nothing is merged.
    pub fn merge(&mut self, other: &SuccessCounts) -> Result<()> {
        if self.max_runs() != other.max_runs() {
            return Err(SimError::RunBoundMismatch {
                expected: self.max_runs(),
                found: other.max_runs(),
            });
        }
        for (mine, theirs) in self.by_run.iter_mut().zip(&other.by_run) {
            *mine += theirs;
        }
        self.repetitions += other.repetitions;
        self.censored += other.censored;
        Ok(())
    }

    pub fn max_runs(&self) -> u32 {
        self.by_run.len() as u32
    }

    /// Successes at `run` (1-based); 0 outside `1..=max_runs`.
    pub fn get(&self, run: u32) -> u64 {
        run.checked_sub(1)
            .and_then(|i| self.by_run.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn repetitions(&self) -> u64 {
        self.repetitions
    }

    pub fn censored(&self) -> u64 {
        self.censored
    }

    pub fn successes(&self) -> u64 {
        self.repetitions - self.censored
    }

    /// `(run, count)` pairs in ascending run order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u64)> + '_ {
        self.by_run
            .iter()
            .enumerate()
            .map(|(i, &count)| (i as u32 + 1, count))
    }
}

/// Run-indexed exact and cumulative completion probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDistribution {
    pub run_indices: Vec<u32>,
    pub exact_probability: Vec<f64>,
    pub cumulative_probability: Vec<f64>,
    pub repetitions: u64,
}

impl RunDistribution {
    /// Divides each run's successes by the number of repetitions behind them.
    pub fn from_counts(counts: &SuccessCounts) -> Result<Self> {
        if counts.repetitions() == 0 {
            return Err(SimError::NoRepetitions);
        }
        let total = counts.repetitions() as f64;

        let (run_indices, exact_probability): (Vec<u32>, Vec<f64>) = counts
            .iter()
            .map(|(run, count)| (run, count as f64 / total))
            .unzip();
        let cumulative_probability = cumulative_sum(&exact_probability);

        Ok(Self {
            run_indices,
            exact_probability,
            cumulative_probability,
            repetitions: counts.repetitions(),
        })
    }

    pub fn len(&self) -> usize {
        self.run_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.run_indices.is_empty()
    }

    /// `(run, exact, cumulative)` rows in run order.
    pub fn rows(&self) -> impl Iterator<Item = (u32, f64, f64)> + '_ {
        self.run_indices
            .iter()
            .zip(&self.exact_probability)
            .zip(&self.cumulative_probability)
            .map(|((&run, &exact), &cumulative)| (run, exact, cumulative))
    }

    /// Probability of having everything wanted within `run` runs.
    pub fn probability_within(&self, run: u32) -> f64 {
        if run == 0 || self.is_empty() {
            return 0.0;
        }
        let idx = (run as usize).min(self.len()) - 1;
        self.cumulative_probability.get(idx).copied().unwrap_or(0.0)
    }

    /// Fraction of repetitions that never completed within the run bound.
    pub fn censored_probability(&self) -> f64 {
        let reached = self.cumulative_probability.last().copied().unwrap_or(0.0);
        (1.0 - reached).max(0.0)
    }

    /// Smallest run count whose cumulative probability reaches `confidence`.
    pub fn runs_for_confidence(&self, confidence: f64) -> Option<u32> {
        self.rows()
            .find(|&(_, _, cumulative)| cumulative >= confidence)
            .map(|(run, _, _)| run)
    }

    /// Mean completion run among repetitions that completed.
    pub fn mean_completion_run(&self) -> Option<f64> {
        let reached = self.cumulative_probability.last().copied().unwrap_or(0.0);
        if reached <= 0.0 {
            return None;
        }
        let weighted: f64 = self.rows().map(|(run, exact, _)| run as f64 * exact).sum();
        Some(weighted / reached)
    }
}

/// Running left-to-right sum.
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}
