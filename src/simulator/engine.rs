//! Repeated bounded trial sequences over a weighted drop table.
//!
//! Each repetition draws from the table until every wanted category has
//! appeared at least once or the run bound is hit. Per-repetition state is a
//! scratch buffer separate from the lifetime counters, and counters reach the
//! simulator only once a batch of whole repetitions is finished.

use super::distribution::{RepetitionOutcome, RunDistribution, SuccessCounts};
use crate::constants::PROBABILITY_SUM_TOLERANCE;
use crate::drops::{category_label, Category, CategoryReport, CategoryStats, Sampler};
use crate::error::{ConfigError, Result, SimError};
use tracing::{debug, info, warn};

/// Owns a validated drop table and everything counted while sampling it.
#[derive(Debug, Clone)]
pub struct DropSimulator {
    categories: Vec<Category>,
    labels: Vec<String>,
    weights: Vec<f64>,
    wanted: Vec<bool>,
    total_wanted: usize,
    stats: Vec<CategoryStats>,
    repetitions_executed: u64,
}

impl DropSimulator {
    /// Validates the table: non-empty, every probability in (0, 1], sum ~1.
    pub fn new(categories: Vec<Category>) -> Result<Self, ConfigError> {
        validate_categories(&categories)?;

        let labels = categories
            .iter()
            .enumerate()
            .map(|(i, c)| c.label.clone().unwrap_or_else(|| category_label(i)))
            .collect();
        let weights: Vec<f64> = categories.iter().map(|c| c.probability).collect();
        let wanted: Vec<bool> = categories.iter().map(|c| c.wanted).collect();
        let total_wanted = wanted.iter().filter(|&&w| w).count();
        let stats = vec![CategoryStats::default(); categories.len()];

        debug!(
            categories = categories.len(),
            total_wanted, "drop simulator created"
        );

        Ok(Self {
            categories,
            labels,
            weights,
            wanted,
            total_wanted,
            stats,
            repetitions_executed: 0,
        })
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn total_wanted(&self) -> usize {
        self.total_wanted
    }

    pub fn stats(&self) -> &[CategoryStats] {
        &self.stats
    }

    /// Repetitions run over this simulator's lifetime, across all batches.
    pub fn repetitions_executed(&self) -> u64 {
        self.repetitions_executed
    }

    /// Runs `repetitions` independent sequences of at most `max_runs` draws.
    pub fn run_repeated_trials<S: Sampler + ?Sized>(
        &mut self,
        max_runs: u32,
        repetitions: u64,
        sampler: &mut S,
    ) -> Result<SuccessCounts> {
        self.run_repeated_trials_until(max_runs, repetitions, sampler, || false)
    }

    /// Like [`run_repeated_trials`](Self::run_repeated_trials), but checks
    /// `should_stop` before each repetition. Only finished repetitions are
    /// counted, so the returned counts and the lifetime counters agree.
    pub fn run_repeated_trials_until<S, F>(
        &mut self,
        max_runs: u32,
        repetitions: u64,
        sampler: &mut S,
        should_stop: F,
    ) -> Result<SuccessCounts>
    where
        S: Sampler + ?Sized,
        F: Fn() -> bool,
    {
        validate_bounds(max_runs, repetitions)?;
        debug!(max_runs, repetitions, "starting repeated trials");

        let mut tally = BatchTally::new(max_runs, self.categories.len());
        let mut state = RepetitionState::new(self.categories.len());

        for _ in 0..repetitions {
            if should_stop() {
                warn!(
                    completed = tally.counts.repetitions(),
                    requested = repetitions,
                    "repeated trials stopped early"
                );
                break;
            }
            let outcome = self.run_repetition(max_runs, sampler, &mut state)?;
            tally.record(&state, outcome)?;
        }

        let counts = self.commit(tally);
        info!(
            repetitions = counts.repetitions(),
            successes = counts.successes(),
            censored = counts.censored(),
            "repeated trials finished"
        );
        Ok(counts)
    }

    /// One repetition: AwaitingDraw(1) until Succeeded(run) or Censored.
    ///
    /// A sampler index outside the table aborts the repetition; nothing from
    /// it reaches the batch.
    pub(crate) fn run_repetition<S: Sampler + ?Sized>(
        &self,
        max_runs: u32,
        sampler: &mut S,
        state: &mut RepetitionState,
    ) -> Result<RepetitionOutcome> {
        state.reset();
        let mut wanted_seen = 0;

        for run in 1..=max_runs {
            let index = sampler.sample(&self.weights);
            if index >= self.weights.len() {
                return Err(SimError::SamplerOutOfRange {
                    index,
                    categories: self.weights.len(),
                });
            }

            if !state.seen[index] {
                state.seen[index] = true;
                if self.wanted[index] {
                    wanted_seen += 1;
                }
            }
            state.drawn[index] += 1;
            state.trials += 1;

            if wanted_seen == self.total_wanted {
                return Ok(RepetitionOutcome::Succeeded(run));
            }
        }

        Ok(RepetitionOutcome::Censored)
    }

    /// Folds a finished batch into the lifetime counters.
    pub(crate) fn commit(&mut self, tally: BatchTally) -> SuccessCounts {
        for (mine, theirs) in self.stats.iter_mut().zip(&tally.stats) {
            mine.merge(theirs);
        }
        self.repetitions_executed += tally.counts.repetitions();
        tally.counts
    }

    /// Exact and cumulative completion probability per run index.
    pub fn compute_distributions(&self, counts: &SuccessCounts) -> Result<RunDistribution> {
        RunDistribution::from_counts(counts)
    }

    /// Runs the trials and turns them into distributions in one call.
    pub fn generate_data<S: Sampler + ?Sized>(
        &mut self,
        max_runs: u32,
        repetitions: u64,
        sampler: &mut S,
    ) -> Result<RunDistribution> {
        let counts = self.run_repeated_trials(max_runs, repetitions, sampler)?;
        self.compute_distributions(&counts)
    }

    /// Empirical drop rate per category, `None` before any trial.
    ///
    /// The denominator is every trial ever run, not just the trials where a
    /// category could have been picked; with one draw per trial both are
    /// the same number.
    pub fn drop_rates(&self) -> Vec<Option<f64>> {
        self.stats.iter().map(CategoryStats::drop_rate).collect()
    }

    pub fn category_reports(&self) -> Vec<CategoryReport> {
        self.categories
            .iter()
            .zip(&self.labels)
            .zip(&self.stats)
            .map(|((category, label), stats)| CategoryReport {
                label: label.clone(),
                probability: category.probability,
                wanted: category.wanted,
                drop_rate: stats.drop_rate(),
                total_occurrences: stats.total_occurrences,
                total_trials_observed: stats.total_trials_observed,
            })
            .collect()
    }

    /// Clears lifetime counters; the table itself is kept.
    pub fn reset_statistics(&mut self) {
        self.stats.fill(CategoryStats::default());
        self.repetitions_executed = 0;
    }
}

/// Scratch buffers for a single repetition, reused between repetitions.
#[derive(Debug, Clone)]
pub(crate) struct RepetitionState {
    seen: Vec<bool>,
    drawn: Vec<u64>,
    trials: u64,
}

impl RepetitionState {
    pub(crate) fn new(n_categories: usize) -> Self {
        Self {
            seen: vec![false; n_categories],
            drawn: vec![0; n_categories],
            trials: 0,
        }
    }

    fn reset(&mut self) {
        self.seen.fill(false);
        self.drawn.fill(0);
        self.trials = 0;
    }
}

/// Counts from whole repetitions that have not been committed yet.
#[derive(Debug, Clone)]
pub(crate) struct BatchTally {
    counts: SuccessCounts,
    stats: Vec<CategoryStats>,
}

impl BatchTally {
    pub(crate) fn new(max_runs: u32, n_categories: usize) -> Self {
        Self {
            counts: SuccessCounts::new(max_runs),
            stats: vec![CategoryStats::default(); n_categories],
        }
    }

    pub(crate) fn record(
        &mut self,
        state: &RepetitionState,
        outcome: RepetitionOutcome,
    ) -> Result<()> {
        self.counts.record(outcome)?;
        for (stats, &drawn) in self.stats.iter_mut().zip(&state.drawn) {
            stats.total_occurrences += drawn;
            stats.total_trials_observed += state.trials;
        }
        Ok(())
    }

    pub(crate) fn merge(mut self, other: BatchTally) -> Result<Self> {
        self.counts.merge(&other.counts)?;
        for (mine, theirs) in self.stats.iter_mut().zip(&other.stats) {
            mine.merge(theirs);
        }
        Ok(self)
    }
}

pub(crate) fn validate_bounds(max_runs: u32, repetitions: u64) -> Result<(), ConfigError> {
    if max_runs == 0 {
        return Err(ConfigError::ZeroMaxRuns);
    }
    if repetitions == 0 {
        return Err(ConfigError::ZeroRepetitions);
    }
    Ok(())
}

fn validate_categories(categories: &[Category]) -> Result<(), ConfigError> {
    if categories.is_empty() {
        return Err(ConfigError::EmptyCategorySet);
    }

    for (index, category) in categories.iter().enumerate() {
        let probability = category.probability;
        if probability.is_nan() || probability <= 0.0 {
            return Err(ConfigError::NonPositiveProbability { index, probability });
        }
        if !probability.is_finite() || probability > 1.0 {
            return Err(ConfigError::ProbabilityOutOfRange { index, probability });
        }
    }

    let sum: f64 = categories.iter().map(|c| c.probability).sum();
    if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
        return Err(ConfigError::ProbabilitySum {
            sum,
            tolerance: PROBABILITY_SUM_TOLERANCE,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drops::{RngSampler, ScriptedSampler};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn three_thirds() -> Vec<Category> {
        vec![
            Category::unwanted(1.0 / 3.0),
            Category::wanted(1.0 / 3.0),
            Category::wanted(1.0 / 3.0),
        ]
    }

    fn seeded(seed: u64) -> RngSampler<ChaCha8Rng> {
        RngSampler::new(ChaCha8Rng::seed_from_u64(seed))
    }

    // =====================================================================
    // Construction
    // =====================================================================

    #[test]
    fn test_new_counts_wanted_and_labels() {
        let sim = DropSimulator::new(three_thirds()).unwrap();
        assert_eq!(sim.total_wanted(), 2);
        assert_eq!(sim.labels(), &["A", "B", "C"]);
        assert_eq!(sim.weights().len(), 3);
        assert_eq!(sim.repetitions_executed(), 0);
    }

    #[test]
    fn test_explicit_labels_are_kept() {
        let sim = DropSimulator::new(vec![
            Category::wanted(0.5).with_label("Sword"),
            Category::unwanted(0.5),
        ])
        .unwrap();
        assert_eq!(sim.labels(), &["Sword", "B"]);
    }

    #[test]
    fn test_new_rejects_empty() {
        assert_eq!(
            DropSimulator::new(Vec::new()).unwrap_err(),
            ConfigError::EmptyCategorySet
        );
    }

    #[test]
    fn test_new_rejects_non_positive_probability() {
        let err =
            DropSimulator::new(vec![Category::wanted(1.0), Category::wanted(0.0)]).unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonPositiveProbability {
                index: 1,
                probability: 0.0
            }
        );

        let err =
            DropSimulator::new(vec![Category::wanted(1.5), Category::wanted(-0.5)]).unwrap_err();
        assert!(matches!(err, ConfigError::ProbabilityOutOfRange { index: 0, .. }));

        let err = DropSimulator::new(vec![Category::wanted(f64::NAN)]).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveProbability { index: 0, .. }));
    }

    #[test]
    fn test_new_rejects_bad_sum() {
        let err =
            DropSimulator::new(vec![Category::wanted(0.5), Category::wanted(0.4)]).unwrap_err();
        assert!(matches!(err, ConfigError::ProbabilitySum { .. }));
    }

    #[test]
    fn test_new_accepts_sum_within_tolerance() {
        let sim = DropSimulator::new(vec![
            Category::wanted(0.1),
            Category::wanted(0.2),
            Category::wanted(0.7 + 5e-7),
        ]);
        assert!(sim.is_ok());
    }

    #[test]
    fn test_zero_bounds_rejected() {
        let mut sim = DropSimulator::new(three_thirds()).unwrap();
        let mut sampler = seeded(1);
        assert!(matches!(
            sim.run_repeated_trials(0, 10, &mut sampler),
            Err(SimError::Config(ConfigError::ZeroMaxRuns))
        ));
        assert!(matches!(
            sim.run_repeated_trials(10, 0, &mut sampler),
            Err(SimError::Config(ConfigError::ZeroRepetitions))
        ));
        assert_eq!(sim.repetitions_executed(), 0);
    }

    // =====================================================================
    // Single repetitions with scripted draws
    // =====================================================================

    #[test]
    fn test_scripted_success_at_exact_run() {
        let sim = DropSimulator::new(three_thirds()).unwrap();
        let mut state = RepetitionState::new(3);

        // Unwanted, wanted B, B again, wanted C -> complete on run 4
        let mut sampler = ScriptedSampler::new(vec![0, 1, 1, 2]);
        let outcome = sim.run_repetition(10, &mut sampler, &mut state).unwrap();
        assert_eq!(outcome, RepetitionOutcome::Succeeded(4));
        assert_eq!(state.drawn, vec![1, 2, 1]);
        assert_eq!(state.trials, 4);
    }

    #[test]
    fn test_repeat_draws_do_not_double_count() {
        let sim = DropSimulator::new(three_thirds()).unwrap();
        let mut state = RepetitionState::new(3);

        let mut sampler = ScriptedSampler::new(vec![1]);
        let outcome = sim.run_repetition(5, &mut sampler, &mut state).unwrap();
        assert_eq!(outcome, RepetitionOutcome::Censored);
        assert_eq!(state.trials, 5);
        assert_eq!(state.drawn, vec![0, 5, 0]);
    }

    #[test]
    fn test_success_on_last_allowed_run_is_not_censored() {
        let sim = DropSimulator::new(three_thirds()).unwrap();
        let mut state = RepetitionState::new(3);
        let mut sampler = ScriptedSampler::new(vec![1, 2]);
        assert_eq!(
            sim.run_repetition(2, &mut sampler, &mut state).unwrap(),
            RepetitionOutcome::Succeeded(2)
        );
    }

    #[test]
    fn test_state_is_reset_between_repetitions() {
        let mut sim = DropSimulator::new(three_thirds()).unwrap();
        // Rep 1: B, C -> run 2. Rep 2: B, B, C -> run 3. Rep 3 censored at 2: C, C.
        let mut sampler = ScriptedSampler::new(vec![1, 2, 1, 1, 2, 2, 2]);
        let counts = sim.run_repeated_trials(3, 2, &mut sampler).unwrap();
        assert_eq!(counts.get(2), 1);
        assert_eq!(counts.get(3), 1);

        // Flags from earlier repetitions must not leak into the next one
        let counts = sim.run_repeated_trials(2, 1, &mut sampler).unwrap();
        assert_eq!(counts.censored(), 1);
        assert_eq!(sim.repetitions_executed(), 3);
    }

    #[test]
    fn test_sampler_index_outside_table_is_an_error() {
        let mut sim =
            DropSimulator::new(vec![Category::wanted(0.5), Category::unwanted(0.5)]).unwrap();
        let mut sampler = ScriptedSampler::new(vec![0, 5]);

        assert!(matches!(
            sim.run_repeated_trials(10, 3, &mut sampler),
            Err(SimError::SamplerOutOfRange {
                index: 5,
                categories: 2
            })
        ));
        // The failed batch is not committed
        assert_eq!(sim.repetitions_executed(), 0);
        assert!(sim.stats().iter().all(|s| s.total_trials_observed == 0));
    }

    #[test]
    fn test_no_wanted_categories_completes_on_first_run() {
        let mut sim =
            DropSimulator::new(vec![Category::unwanted(0.5), Category::unwanted(0.5)]).unwrap();
        let counts = sim.run_repeated_trials(5, 100, &mut seeded(3)).unwrap();
        assert_eq!(counts.get(1), 100);
    }

    // =====================================================================
    // Lifetime counters
    // =====================================================================

    #[test]
    fn test_every_category_observes_every_trial() {
        let mut sim = DropSimulator::new(three_thirds()).unwrap();
        let mut sampler = ScriptedSampler::new(vec![0, 1, 2]);
        sim.run_repeated_trials(10, 1, &mut sampler).unwrap();

        for stats in sim.stats() {
            assert_eq!(stats.total_trials_observed, 3);
            assert_eq!(stats.total_occurrences, 1);
        }
    }

    #[test]
    fn test_stop_predicate_keeps_counters_consistent() {
        use std::cell::Cell;

        let mut sim = DropSimulator::new(three_thirds()).unwrap();
        let calls = Cell::new(0u64);
        let counts = sim
            .run_repeated_trials_until(20, 1_000, &mut seeded(8), || {
                calls.set(calls.get() + 1);
                calls.get() > 10
            })
            .unwrap();

        assert_eq!(counts.repetitions(), 10);
        assert_eq!(sim.repetitions_executed(), 10);
        let occurrences: u64 = sim.stats().iter().map(|s| s.total_occurrences).sum();
        assert_eq!(occurrences, sim.stats()[0].total_trials_observed);
    }

    #[test]
    fn test_reset_statistics() {
        let mut sim = DropSimulator::new(three_thirds()).unwrap();
        sim.run_repeated_trials(10, 50, &mut seeded(4)).unwrap();
        assert!(sim.repetitions_executed() > 0);

        sim.reset_statistics();
        assert_eq!(sim.repetitions_executed(), 0);
        assert!(sim.drop_rates().iter().all(Option::is_none));
    }

    #[test]
    fn test_category_reports_line_up_with_table() {
        let mut sim = DropSimulator::new(three_thirds()).unwrap();
        sim.run_repeated_trials(10, 100, &mut seeded(5)).unwrap();

        let reports = sim.category_reports();
        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].label, "A");
        assert!(!reports[0].wanted);
        assert!(reports[1].wanted);
        let total: f64 = reports.iter().filter_map(|r| r.drop_rate).sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    // =====================================================================
    // Distributions
    // =====================================================================

    #[test]
    fn test_compute_distributions_with_no_repetitions_fails() {
        let sim = DropSimulator::new(three_thirds()).unwrap();
        let err = sim.compute_distributions(&SuccessCounts::new(5)).unwrap_err();
        assert!(matches!(err, SimError::NoRepetitions));
    }

    #[test]
    fn test_generate_data_shapes() {
        let mut sim = DropSimulator::new(three_thirds()).unwrap();
        let dist = sim.generate_data(50, 2_000, &mut seeded(6)).unwrap();
        assert_eq!(dist.len(), 50);
        assert_eq!(dist.run_indices.first(), Some(&1));
        assert_eq!(dist.run_indices.last(), Some(&50));
        // Two wanted items can never both appear on run 1
        assert_eq!(dist.exact_probability[0], 0.0);
    }
}
