//! Scrambled base-`b` radical-inverse stream, the one-dimensional building
//! block behind [`crate::halton`].
//!
//! Grounded on the teacher's `random_numbers::mod::van_der_corput` (a plain,
//! unscrambled radical inverse) generalized with permutation scrambling, and
//! on the spec's own termination-criterion design note: rather than stopping
//! once the integer's own base-`b` digits are exhausted (which is wrong
//! *under* scrambling — a permutation that doesn't fix 0 gives every one of
//! the infinitely many leading zero digits a nonzero contribution), this
//! walks a fixed number of digit positions sized to `f64`'s precision, so
//! the unscrambled case still reduces to the exact finite radical inverse
//! (testable property 15) and the scrambled case correctly accounts for the
//! zero-digit tail.

use crate::rng::Seed;
use qmc_core::{ensure, errors::Result, Real};

/// Enough base-2 digits to exhaust `f64`'s 52-bit mantissa for any base
/// `>= 2`; used to bound the digit loop for every base.
fn digit_count_for_base(base: u64) -> u32 {
    let bits_per_digit = (base as f64).log2();
    (53.0 / bits_per_digit).ceil() as u32 + 1
}

/// The base-`base` radical inverse of `k`, optionally scrambled by `perm`
/// (a permutation of `0..base`, applied to every digit).
fn radical_inverse(mut k: u64, base: u64, perm: Option<&[usize]>) -> Real {
    let mut result = 0.0_f64;
    let mut bk = 1.0_f64 / base as f64;
    for _ in 0..digit_count_for_base(base) {
        let mut digit = (k % base) as usize;
        if let Some(p) = perm {
            digit = p[digit];
        }
        result += digit as Real * bk;
        k /= base;
        bk /= base as f64;
        if k == 0 && perm.is_none() {
            break;
        }
    }
    result
}

/// Produce the base-`base` radical inverse of `start_index, .., start_index
/// + n - 1`. When `scramble` is true, a single permutation of `0..base` is
/// drawn from `seed` and applied to every digit of every point in this call.
pub fn van_der_corput(
    n: usize,
    base: u64,
    start_index: u64,
    scramble: bool,
    seed: &Seed,
) -> Result<Vec<Real>> {
    ensure!(base >= 2, "van der Corput base must be >= 2, got {base}");
    let perm = if scramble {
        let handle = seed.resolve()?;
        Some(handle.borrow_mut().permutation(base as usize))
    } else {
        None
    };
    Ok((0..n as u64)
        .map(|i| radical_inverse(start_index + i, base, perm.as_deref()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_15_matches_radical_inverse() {
        // van_der_corput(1, base=2, start_index=5) = radicalInverse_2(5)
        // 5 = 101b -> reversed around the point: 0.101b = 0.625
        let v = van_der_corput(1, 2, 5, false, &Seed::None).unwrap();
        assert!((v[0] - 0.625).abs() < 1e-15);
    }

    #[test]
    fn entries_in_unit_interval() {
        let v = van_der_corput(100, 3, 0, false, &Seed::None).unwrap();
        for x in v {
            assert!(x >= 0.0 && x < 1.0);
        }
    }

    #[test]
    fn scramble_is_reproducible_under_same_seed() {
        let a = van_der_corput(20, 5, 0, true, &Seed::Int(11)).unwrap();
        let b = van_der_corput(20, 5, 0, true, &Seed::Int(11)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_base_below_two() {
        assert!(van_der_corput(1, 1, 0, false, &Seed::None).is_err());
    }
}
