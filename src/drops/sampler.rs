//! Weighted draw with replacement.

use rand::Rng;

/// Draws one index from a categorical distribution given by `weights`.
///
/// Implementations may assume the weights are positive and sum to 1; the
/// simulator validates that before sampling starts. The returned index must
/// be below `weights.len()`, anything else fails the batch with
/// `SimError::SamplerOutOfRange`.
pub trait Sampler {
    fn sample(&mut self, weights: &[f64]) -> usize;
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn sample(&mut self, weights: &[f64]) -> usize {
        (**self).sample(weights)
    }
}

/// Sampler backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Sampler for RngSampler<R> {
    fn sample(&mut self, weights: &[f64]) -> usize {
        let mut remaining: f64 = self.rng.gen();
        for (index, weight) in weights.iter().enumerate() {
            if remaining < *weight {
                return index;
            }
            remaining -= weight;
        }
        // Rounding residue goes to the last category
        weights.len().saturating_sub(1)
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    draws: Vec<usize>,
    cursor: usize,
}

impl ScriptedSampler {
    /// Panics if `draws` is empty.
    pub fn new(draws: Vec<usize>) -> Self {
        assert!(!draws.is_empty(), "scripted sampler needs at least one draw");
        Self { draws, cursor: 0 }
    }

    pub fn draws_made(&self) -> usize {
        self.cursor
    }
}

impl Sampler for ScriptedSampler {
    fn sample(&mut self, _weights: &[f64]) -> usize {
        let index = self.draws[self.cursor % self.draws.len()];
        self.cursor += 1;
        index
    }
}
