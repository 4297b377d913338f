//! Rayon-parallel repetitions with per-chunk seeding.
//!
//! Repetitions are split into fixed-size chunks. Chunk `i` samples from its
//! own `ChaCha8Rng` seeded with `seed + i` and keeps private counters, which
//! are summed once every chunk is done. The chunk layout depends only on
//! `chunk_size`, so a seeded run gives the same totals on any thread count.

use super::distribution::SuccessCounts;
use super::engine::{validate_bounds, BatchTally, DropSimulator, RepetitionState};
use crate::drops::RngSampler;
use crate::error::Result;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::{debug, info};

/// Options for a parallel batch.
#[derive(Debug, Clone, Copy)]
pub struct ParallelOptions {
    pub seed: u64,
    pub chunk_size: u64,
    /// `None` uses rayon's global pool.
    pub threads: Option<usize>,
}

impl DropSimulator {
    /// Parallel counterpart of [`run_repeated_trials`](Self::run_repeated_trials).
    pub fn run_repeated_trials_parallel(
        &mut self,
        max_runs: u32,
        repetitions: u64,
        options: ParallelOptions,
    ) -> Result<SuccessCounts> {
        validate_bounds(max_runs, repetitions)?;
        let chunk_size = options.chunk_size.max(1);
        let n_chunks = repetitions.div_ceil(chunk_size);

        debug!(
            max_runs,
            repetitions,
            chunk_size,
            n_chunks,
            threads = ?options.threads,
            "starting parallel repeated trials"
        );

        let tally = match options.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()?;
                pool.install(|| {
                    self.tally_chunks(max_runs, repetitions, chunk_size, n_chunks, options.seed)
                })?
            }
            None => self.tally_chunks(max_runs, repetitions, chunk_size, n_chunks, options.seed)?,
        };

        let counts = self.commit(tally);
        info!(
            repetitions = counts.repetitions(),
            successes = counts.successes(),
            censored = counts.censored(),
            "parallel repeated trials finished"
        );
        Ok(counts)
    }

    fn tally_chunks(
        &self,
        max_runs: u32,
        repetitions: u64,
        chunk_size: u64,
        n_chunks: u64,
        seed: u64,
    ) -> Result<BatchTally> {
        let n_categories = self.categories().len();

        (0..n_chunks)
            .into_par_iter()
            .map(|chunk_idx| -> Result<BatchTally> {
                let start = chunk_idx * chunk_size;
                let end = (start + chunk_size).min(repetitions);
                let mut sampler = RngSampler::new(chunk_rng(seed, chunk_idx));
                let mut state = RepetitionState::new(n_categories);
                let mut tally = BatchTally::new(max_runs, n_categories);

                for _ in start..end {
                    let outcome = self.run_repetition(max_runs, &mut sampler, &mut state)?;
                    tally.record(&state, outcome)?;
                }
                Ok(tally)
            })
            .try_reduce(
                || BatchTally::new(max_runs, n_categories),
                BatchTally::merge,
            )
    }
}

fn chunk_rng(seed: u64, chunk_idx: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(chunk_idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drops::Category;

    fn two_halves() -> DropSimulator {
        DropSimulator::new(vec![Category::wanted(0.5), Category::wanted(0.5)]).unwrap()
    }

    fn options(seed: u64, threads: Option<usize>) -> ParallelOptions {
        ParallelOptions {
            seed,
            chunk_size: 500,
            threads,
        }
    }

    #[test]
    fn test_parallel_counts_every_repetition() {
        let mut sim = two_halves();
        let counts = sim
            .run_repeated_trials_parallel(10, 2_345, options(1, None))
            .unwrap();
        assert_eq!(counts.repetitions(), 2_345);
        assert_eq!(sim.repetitions_executed(), 2_345);
        assert_eq!(counts.get(1), 0);
    }

    #[test]
    fn test_parallel_same_result_on_any_thread_count() {
        let mut one = two_halves();
        let mut four = two_halves();

        let a = one
            .run_repeated_trials_parallel(20, 5_000, options(77, Some(1)))
            .unwrap();
        let b = four
            .run_repeated_trials_parallel(20, 5_000, options(77, Some(4)))
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(one.stats(), four.stats());
    }

    #[test]
    fn test_parallel_rejects_zero_bounds() {
        let mut sim = two_halves();
        assert!(sim
            .run_repeated_trials_parallel(0, 10, options(1, None))
            .is_err());
        assert!(sim
            .run_repeated_trials_parallel(10, 0, options(1, None))
            .is_err());
    }

    #[test]
    fn test_zero_chunk_size_is_treated_as_one() {
        let mut sim = two_halves();
        let counts = sim
            .run_repeated_trials_parallel(
                5,
                10,
                ParallelOptions {
                    seed: 9,
                    chunk_size: 0,
                    threads: Some(2),
                },
            )
            .unwrap();
        assert_eq!(counts.repetitions(), 10);
    }
}
