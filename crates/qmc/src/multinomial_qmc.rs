//! Quasi-Monte Carlo sampling from a multinomial distribution.
//!
//! Grounded on `original_source`'s `MultinomialQMC`, `_fill_p_cumulative`
//! and `_categorize`: draws `n` scalar QMC points (1-D scrambled Sobol' by
//! default) and buckets each one against the cumulative distribution of
//! `pvals`.

use crate::engine::QmcEngine;
use crate::rng::Seed;
use crate::sobol::Sobol;
use qmc_core::{ensure, errors::Result};

/// QMC sampler for a multinomial distribution over `k` categories.
pub struct MultinomialQmc {
    pvals: Vec<f64>,
    cumulative: Vec<f64>,
    engine: Box<dyn QmcEngine>,
}

impl MultinomialQmc {
    /// Construct from category probabilities `pvals` (must be non-negative
    /// and sum to 1, within `1e-9`).
    pub fn new(pvals: Vec<f64>, seed: Seed) -> Result<Self> {
        ensure!(!pvals.is_empty(), "pvals must not be empty");
        for &p in &pvals {
            ensure!(p >= 0.0, "elements of pvals must be non-negative, got {p}");
        }
        let total: f64 = pvals.iter().sum();
        ensure!(
            (total - 1.0).abs() < 1e-9,
            "elements of pvals must sum to 1, got {total}"
        );
        let mut cumulative = Vec::with_capacity(pvals.len());
        let mut running = 0.0;
        for &p in &pvals {
            running += p;
            cumulative.push(running);
        }
        let engine: Box<dyn QmcEngine> = Box::new(Sobol::new(1, true, &seed)?);
        Ok(Self {
            pvals,
            cumulative,
            engine,
        })
    }

    /// Use a caller-supplied one-dimensional base engine instead of the
    /// default scrambled Sobol' sequence.
    pub fn with_engine(mut self, engine: Box<dyn QmcEngine>) -> Result<Self> {
        ensure!(engine.d() == 1, "multinomial base engine must be 1-dimensional");
        self.engine = engine;
        Ok(self)
    }

    /// Draw `n` QMC samples from the multinomial, returning per-category
    /// counts (length `pvals.len()`, summing to `n`).
    pub fn random(&mut self, n: usize) -> Result<Vec<u64>> {
        let draws = self.engine.random(n)?;
        let mut counts = vec![0u64; self.pvals.len()];
        for i in 0..n {
            let u = draws[(i, 0)];
            let bucket = self
                .cumulative
                .iter()
                .position(|&c| u < c)
                .unwrap_or(self.pvals.len() - 1);
            counts[bucket] += 1;
        }
        Ok(counts)
    }

    /// Reset the underlying base engine to its construction-time state.
    pub fn reset(&mut self) -> &mut Self {
        self.engine.reset();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_11_scenario_e6_counts_sum_to_n_and_respect_k() {
        let mut m = MultinomialQmc::new(vec![0.2, 0.4, 0.4], Seed::Int(5)).unwrap();
        let counts = m.random(10).unwrap();
        assert_eq!(counts.len(), 3);
        assert_eq!(counts.iter().sum::<u64>(), 10);

        let mut larger = MultinomialQmc::new(vec![0.2, 0.4, 0.4], Seed::Int(6)).unwrap();
        let counts = larger.random(100).unwrap();
        assert_eq!(counts.iter().sum::<u64>(), 100);
    }

    #[test]
    fn rejects_non_normalized_pvals() {
        assert!(MultinomialQmc::new(vec![0.2, 0.2], Seed::None).is_err());
    }

    #[test]
    fn rejects_negative_pvals() {
        assert!(MultinomialQmc::new(vec![-0.1, 1.1], Seed::None).is_err());
    }
}
