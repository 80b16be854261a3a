//! Error types for qmc-rs.
//!
//! A single `thiserror`-derived enum, with `ensure!`/`ensure_post!`/`fail!`
//! convenience macros for the three ways an operation in this workspace can
//! fail: a bad argument from the caller, a precondition the implementation
//! itself expects, or an unrecoverable runtime condition (arithmetic
//! overflow, a construction step that cannot produce a valid result).

use thiserror::Error;

/// The top-level error type used throughout qmc-rs.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// General runtime error — used for conditions the spec marks as "must
    /// not occur" (e.g. arithmetic overflow while drawing a Sobol' point).
    #[error("{0}")]
    Runtime(String),

    /// Precondition violated by an internal caller.
    #[error("precondition not satisfied: {0}")]
    Precondition(String),

    /// Postcondition violated — an operation produced a result that
    /// violates its own invariants.
    #[error("postcondition not satisfied: {0}")]
    Postcondition(String),

    /// Invalid argument supplied by the caller (dimension out of range,
    /// non-positive sample count, malformed bounds, etc.).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// Shorthand `Result` type used throughout qmc-rs.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Returns `Err(Error::InvalidArgument(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use qmc_core::{ensure, errors::Error};
/// fn positive(x: f64) -> qmc_core::errors::Result<f64> {
///     ensure!(x > 0.0, "x must be positive, got {x}");
///     Ok(x)
/// }
/// assert!(positive(1.0).is_ok());
/// assert!(positive(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::InvalidArgument(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Postcondition(...))` if `$cond` is false.
///
/// # Example
/// ```
/// use qmc_core::{ensure_post, errors::Error};
/// fn compute(x: f64) -> qmc_core::errors::Result<f64> {
///     let result = x * 2.0;
///     ensure_post!(result > 0.0, "result must be positive, got {result}");
///     Ok(result)
/// }
/// assert!(compute(1.0).is_ok());
/// assert!(compute(-1.0).is_err());
/// ```
#[macro_export]
macro_rules! ensure_post {
    ($cond:expr, $($msg:tt)*) => {
        if !$cond {
            return Err($crate::errors::Error::Postcondition(
                format!($($msg)*)
            ));
        }
    };
}

/// Returns `Err(Error::Runtime(...))` immediately.
///
/// # Example
/// ```
/// use qmc_core::{fail, errors::Error};
/// fn always_err() -> qmc_core::errors::Result<()> {
///     fail!("something went wrong");
/// }
/// assert!(always_err().is_err());
/// ```
#[macro_export]
macro_rules! fail {
    ($($msg:tt)*) => {
        return Err($crate::errors::Error::Runtime(format!($($msg)*)))
    };
}
