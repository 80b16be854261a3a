//! Quasi-Monte Carlo sampling from a multivariate Normal distribution.
//!
//! Grounded on `original_source`'s `MultivariateNormalQMC`: draws a base
//! sequence from any [`QmcEngine`] (Sobol' by default, scrambled), maps it
//! to standard-normal coordinates (inverse-transform or Box–Muller), then
//! applies an affine correlation via a covariance root.

use crate::array::Array;
use crate::distributions::normal_cdf_inverse;
use crate::engine::QmcEngine;
use crate::matrix::Matrix;
use crate::matrix_utilities::{cholesky_decomposition, symmetric_eigen};
use crate::rng::Seed;
use crate::sobol::Sobol;
use qmc_core::{ensure, errors::Result, Real};
use std::f64::consts::PI;

/// How the standard-normal samples are derived from the base `[0,1)^d`
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Inverse-CDF (probit) transform, one base dimension per output
    /// dimension.
    InverseTransform,
    /// Box–Muller transform, consuming base dimensions in pairs.
    BoxMuller,
}

/// QMC sampler for `N(mean, cov)`.
pub struct MultivariateNormalQmc {
    d: usize,
    mean: Array,
    /// Covariance root (may be `None` for an implicit identity covariance).
    cov_root: Option<Matrix>,
    transform: Transform,
    engine: Box<dyn QmcEngine>,
}

impl MultivariateNormalQmc {
    /// Construct from an explicit covariance matrix, using Cholesky and
    /// falling back to a symmetric eigendecomposition when the matrix is not
    /// (numerically) positive-definite.
    pub fn with_covariance(
        mean: Array,
        cov: &Matrix,
        transform: Transform,
        seed: Seed,
    ) -> Result<Self> {
        let d = mean.size();
        ensure!(
            cov.rows() == d && cov.cols() == d,
            "covariance must be {d}x{d}, got {}x{}",
            cov.rows(),
            cov.cols()
        );
        for i in 0..d {
            for j in 0..d {
                ensure!(
                    (cov[(i, j)] - cov[(j, i)]).abs() < 1e-8,
                    "covariance matrix is not symmetric"
                );
            }
        }
        let cov_root = match cholesky_decomposition(cov) {
            Ok(l) => l.transpose(),
            Err(_) => {
                let (eigvals, eigvecs) = symmetric_eigen(cov)?;
                for i in 0..eigvals.size() {
                    ensure!(eigvals[i] >= -1.0e-8, "covariance matrix not PSD");
                }
                let mut root = eigvecs.clone();
                for i in 0..root.rows() {
                    for j in 0..root.cols() {
                        let clipped = eigvals[j].max(0.0).sqrt();
                        root[(i, j)] = eigvecs[(i, j)] * clipped;
                    }
                }
                root.transpose()
            }
        };
        Self::new(mean, Some(cov_root), transform, seed)
    }

    /// Construct from a covariance root directly (`cov = cov_root^T cov_root`
    /// is not required to be square — a lower-rank root is accepted).
    pub fn with_covariance_root(
        mean: Array,
        cov_root: Matrix,
        transform: Transform,
        seed: Seed,
    ) -> Result<Self> {
        Self::new(mean, Some(cov_root), transform, seed)
    }

    /// Construct with an implicit identity covariance.
    pub fn standard(mean: Array, transform: Transform, seed: Seed) -> Result<Self> {
        Self::new(mean, None, transform, seed)
    }

    fn new(mean: Array, cov_root: Option<Matrix>, transform: Transform, seed: Seed) -> Result<Self> {
        let d = mean.size();
        if let Some(root) = &cov_root {
            ensure!(
                root.rows() == d,
                "covariance root must have {d} rows, got {}",
                root.rows()
            );
        }
        let engine_dim = match transform {
            Transform::InverseTransform => d,
            Transform::BoxMuller => 2 * d.div_ceil(2),
        };
        let engine: Box<dyn QmcEngine> = Box::new(Sobol::new(engine_dim.max(1), true, &seed)?);
        Ok(Self {
            d,
            mean,
            cov_root,
            transform,
            engine,
        })
    }

    /// Use a caller-supplied base engine instead of the default scrambled
    /// Sobol' sequence.
    pub fn with_engine(mut self, engine: Box<dyn QmcEngine>) -> Result<Self> {
        ensure!(
            engine.d() >= self.d,
            "engine dimension {} is smaller than the Normal's dimension {}",
            engine.d(),
            self.d
        );
        self.engine = engine;
        Ok(self)
    }

    /// Draw `n` standard-normal samples (before the affine correlation step).
    fn standard_normal_samples(&mut self, n: usize) -> Result<Matrix> {
        let base = self.engine.random(n)?;
        match self.transform {
            Transform::InverseTransform => {
                let mut out = Matrix::zeros(n, self.d);
                for i in 0..n {
                    for j in 0..self.d {
                        let u = 0.5 + (1.0 - 1e-10) * (base[(i, j)] - 0.5);
                        out[(i, j)] = normal_cdf_inverse(u)?;
                    }
                }
                Ok(out)
            }
            Transform::BoxMuller => {
                let mut out = Matrix::zeros(n, self.d);
                let pairs = self.d.div_ceil(2);
                for i in 0..n {
                    for p in 0..pairs {
                        let u1 = base[(i, 2 * p)];
                        let u2 = base[(i, 2 * p + 1)];
                        let r = (-2.0 * u1.ln()).sqrt();
                        let theta = 2.0 * PI * u2;
                        let (sin, cos) = theta.sin_cos();
                        let col0 = 2 * p;
                        out[(i, col0)] = r * cos;
                        if col0 + 1 < self.d {
                            out[(i, col0 + 1)] = r * sin;
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    /// Draw `n` samples from `N(mean, cov)`.
    pub fn random(&mut self, n: usize) -> Result<Matrix> {
        let base = self.standard_normal_samples(n)?;
        let correlated = match &self.cov_root {
            Some(root) => &base * root,
            None => base,
        };
        let mut out = correlated;
        for i in 0..out.rows() {
            for j in 0..out.cols() {
                out[(i, j)] += self.mean[j];
            }
        }
        Ok(out)
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
    fn property_12_identity_covariance_matches_mean_shifted_standard_normal() {
        let mean = Array::from_slice(&[0.0, 5.0]);
        let mut qmc = MultivariateNormalQmc::standard(mean, Transform::InverseTransform, Seed::Int(1))
            .unwrap();
        let sample = qmc.random(64).unwrap();
        let mut avg_y = 0.0;
        for i in 0..64 {
            avg_y += sample[(i, 1)];
        }
        avg_y /= 64.0;
        assert!((avg_y - 5.0).abs() < 1.0, "mean should center near 5, got {avg_y}");
    }

    #[test]
    fn property_12_explicit_covariance_matches_empirical_covariance() {
        let mean = Array::from_slice(&[0.0, 0.0]);
        let cov = Matrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let mut qmc = MultivariateNormalQmc::with_covariance(
            mean,
            &cov,
            Transform::InverseTransform,
            Seed::Int(11),
        )
        .unwrap();
        let n = 512;
        let sample = qmc.random(n).unwrap();

        let mut mean_emp = [0.0; 2];
        for i in 0..n {
            mean_emp[0] += sample[(i, 0)];
            mean_emp[1] += sample[(i, 1)];
        }
        mean_emp[0] /= n as f64;
        mean_emp[1] /= n as f64;

        let mut cov_emp = [[0.0; 2]; 2];
        for i in 0..n {
            let x0 = sample[(i, 0)] - mean_emp[0];
            let x1 = sample[(i, 1)] - mean_emp[1];
            cov_emp[0][0] += x0 * x0;
            cov_emp[0][1] += x0 * x1;
            cov_emp[1][1] += x1 * x1;
        }
        cov_emp[0][0] /= (n - 1) as f64;
        cov_emp[0][1] /= (n - 1) as f64;
        cov_emp[1][1] /= (n - 1) as f64;

        assert!((cov_emp[0][0] - 2.0).abs() < 0.5, "got {}", cov_emp[0][0]);
        assert!((cov_emp[1][1] - 1.0).abs() < 0.5, "got {}", cov_emp[1][1]);
        assert!((cov_emp[0][1] - 0.5).abs() < 0.5, "got {}", cov_emp[0][1]);
    }

    #[test]
    fn covariance_shape_and_symmetry_rejection() {
        let mean = Array::from_slice(&[0.0, 0.0]);
        let bad_cov = Matrix::from_row_slice(2, 2, &[1.0, 0.5, 0.0, 1.0]);
        assert!(MultivariateNormalQmc::with_covariance(
            mean,
            &bad_cov,
            Transform::InverseTransform,
            Seed::None
        )
        .is_err());
    }

    #[test]
    fn scenario_e7_empirical_covariance_within_tolerance() {
        let mean = Array::from_slice(&[0.0, 0.0]);
        let cov = Matrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 1.0]);
        let mut qmc = MultivariateNormalQmc::with_covariance(
            mean,
            &cov,
            Transform::InverseTransform,
            Seed::Int(7),
        )
        .unwrap();
        let n = 1usize << 14;
        let sample = qmc.random(n).unwrap();

        let mut mean_emp = [0.0; 2];
        for i in 0..n {
            mean_emp[0] += sample[(i, 0)];
            mean_emp[1] += sample[(i, 1)];
        }
        mean_emp[0] /= n as f64;
        mean_emp[1] /= n as f64;

        let mut cov_emp = [[0.0; 2]; 2];
        for i in 0..n {
            let x0 = sample[(i, 0)] - mean_emp[0];
            let x1 = sample[(i, 1)] - mean_emp[1];
            cov_emp[0][0] += x0 * x0;
            cov_emp[0][1] += x0 * x1;
            cov_emp[1][1] += x1 * x1;
        }
        cov_emp[0][0] /= (n - 1) as f64;
        cov_emp[0][1] /= (n - 1) as f64;
        cov_emp[1][1] /= (n - 1) as f64;

        assert!((cov_emp[0][0] - 1.0).abs() < 0.05, "got {}", cov_emp[0][0]);
        assert!((cov_emp[1][1] - 1.0).abs() < 0.05, "got {}", cov_emp[1][1]);
        assert!((cov_emp[0][1] - 0.5).abs() < 0.05, "got {}", cov_emp[0][1]);
    }

    #[test]
    fn box_muller_produces_requested_dimension() {
        let mean = Array::from_slice(&[0.0, 0.0, 0.0]);
        let mut qmc = MultivariateNormalQmc::standard(mean, Transform::BoxMuller, Seed::Int(2)).unwrap();
        let sample = qmc.random(5).unwrap();
        assert_eq!(sample.cols(), 3);
        assert_eq!(sample.rows(), 5);
    }
}
