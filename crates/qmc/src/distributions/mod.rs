//! Probability distributions needed by the QMC samplers.
//!
//! Only the standard normal distribution is needed here (for the
//! inverse-transform mapping used by [`crate::normal_qmc`]); the other
//! distributions the teacher crate carried (beta, binomial, chi-square,
//! gamma, poisson, student-t, bivariate normal) have no caller in this
//! crate — see DESIGN.md.

pub mod normal;

pub use normal::{normal_cdf, normal_cdf_inverse, normal_pdf};
