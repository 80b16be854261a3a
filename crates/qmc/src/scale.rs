//! Affine mapping between the unit hypercube and an arbitrary bounding box.
//!
//! Grounded on `original_source`'s `scale`: `(b - a) * sample + a` per
//! column, with a `reverse` mode for mapping back into `[0, 1)`.

use crate::matrix::Matrix;
use qmc_core::{ensure, errors::Result, Real};

/// Scale `sample` (points in `[0,1)^d`) into the box with per-dimension
/// bounds `lower[j]..upper[j]`.
pub fn scale(sample: &Matrix, lower: &[Real], upper: &[Real]) -> Result<Matrix> {
    apply(sample, lower, upper, false)
}

/// Inverse of [`scale`]: map points from the box back into `[0,1)^d`.
pub fn scale_reverse(sample: &Matrix, lower: &[Real], upper: &[Real]) -> Result<Matrix> {
    apply(sample, lower, upper, true)
}

fn apply(sample: &Matrix, lower: &[Real], upper: &[Real], reverse: bool) -> Result<Matrix> {
    let d = sample.cols();
    ensure!(
        lower.len() == d && upper.len() == d,
        "bounds must have {d} entries, got {} lower / {} upper",
        lower.len(),
        upper.len()
    );
    for j in 0..d {
        ensure!(upper[j] > lower[j], "upper bound must exceed lower bound in dimension {j}");
    }
    let mut out = Matrix::zeros(sample.rows(), d);
    for i in 0..sample.rows() {
        for j in 0..d {
            let span = upper[j] - lower[j];
            out[(i, j)] = if reverse {
                (sample[(i, j)] - lower[j]) / span
            } else {
                sample[(i, j)] * span + lower[j]
            };
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_e3_scale_matches_affine_example() {
        let sample = Matrix::from_row_slice(2, 2, &[0.5, 0.5, 0.75, 0.25]);
        let scaled = scale(&sample, &[-2.0, 0.0], &[6.0, 5.0]).unwrap();
        assert!((scaled[(0, 0)] - 2.0).abs() < 1e-12);
        assert!((scaled[(0, 1)] - 2.5).abs() < 1e-12);
        assert!((scaled[(1, 0)] - 4.0).abs() < 1e-12);
        assert!((scaled[(1, 1)] - 1.25).abs() < 1e-12);
    }

    #[test]
    fn property_7_scale_reverse_round_trip() {
        let sample = Matrix::from_row_slice(3, 1, &[0.1, 0.5, 0.9]);
        let scaled = scale(&sample, &[10.0], &[20.0]).unwrap();
        let back = scale_reverse(&scaled, &[10.0], &[20.0]).unwrap();
        for i in 0..3 {
            assert!((back[(i, 0)] - sample[(i, 0)]).abs() < 1e-10);
        }
    }

    #[test]
    fn rejects_mismatched_bounds_length() {
        let sample = Matrix::zeros(2, 2);
        assert!(scale(&sample, &[0.0], &[1.0]).is_err());
    }
}
