//! The capability contract shared by every sampling engine in this crate.
//!
//! Grounded on the spec's "flatten the abstract base class into a trait"
//! design note (§9): rather than an inheritance hierarchy, each concrete
//! engine (Sobol, Halton, LatinHypercube, OrthogonalLatinHypercube,
//! OptimalDesign) embeds its own state and implements this trait; derived
//! samplers ([`crate::normal_qmc`], [`crate::multinomial_qmc`]) hold a
//! `Box<dyn QmcEngine>` for their base stream.

use crate::matrix::Matrix;
use qmc_core::errors::Result;

/// A quasi- (or pseudo-) random sequence generator over `[0,1)^d`.
pub trait QmcEngine {
    /// The dimension of the points this engine produces.
    fn d(&self) -> usize;

    /// Draw the next `n` points, advancing the cursor by `n`.
    fn random(&mut self, n: usize) -> Result<Matrix>;

    /// Restore construction-time state (cursor and, for Sobol, the running
    /// XOR accumulator). Does not re-derive the scramble.
    fn reset(&mut self) -> &mut Self;

    /// Advance the cursor by `n` without materializing the skipped points.
    fn fast_forward(&mut self, n: usize) -> &mut Self;
}
