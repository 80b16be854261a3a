//! Matrix decompositions needed for the covariance root used by
//! [`crate::normal_qmc::MultivariateNormalQmc`].
//!
//! Wraps nalgebra's decompositions; anything QuantLib exposed that this
//! crate has no caller for (SVD, QR, LU, pseudo-inverse, rank, covariance
//! extraction) was dropped — see DESIGN.md.

use crate::array::Array;
use crate::matrix::Matrix;
use qmc_core::errors::{Error, Result};

/// Cholesky decomposition of a symmetric positive-definite matrix.
///
/// Returns the lower-triangular factor `L` such that `A = L * Lᵀ`.
pub fn cholesky_decomposition(m: &Matrix) -> Result<Matrix> {
    let inner = m.inner();
    if inner.nrows() != inner.ncols() {
        return Err(Error::InvalidArgument("matrix must be square".into()));
    }
    match inner.clone().cholesky() {
        Some(chol) => Ok(Matrix::from(chol.l())),
        None => Err(Error::Runtime(
            "Cholesky decomposition failed — matrix is not positive-definite".into(),
        )),
    }
}

/// Eigenvalue decomposition of a symmetric real matrix.
///
/// Returns `(eigenvalues, eigenvectors)` where the eigenvalues are sorted in
/// ascending order (nalgebra's native ordering) and each column of the
/// eigenvectors matrix is the corresponding eigenvector. Used as the
/// fallback covariance root when the covariance matrix is not (numerically)
/// positive-definite.
pub fn symmetric_eigen(m: &Matrix) -> Result<(Array, Matrix)> {
    let inner = m.inner();
    if inner.nrows() != inner.ncols() {
        return Err(Error::InvalidArgument("matrix must be square".into()));
    }
    let eigen = inner.clone().symmetric_eigen();
    Ok((
        Array::from(eigen.eigenvalues.clone_owned()),
        Matrix::from(eigen.eigenvectors),
    ))
}
