// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Utility functions for coefficient reduction.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};

/// Reduces a number modulo a modulus.
///
/// # Returns
///
/// The reduced number in the range [0, modulus)
pub fn reduce(x: &BigInt, modulus: &BigInt) -> BigInt {
    let mut r = x % modulus;
    if r < BigInt::zero() {
        r += modulus;
    }
    r
}

/// Reduces a signed integer into `[0, q)` for a word-sized modulus.
pub fn reduce_to_u64(x: &BigInt, q: u64) -> u64 {
    let r = reduce(x, &BigInt::from(q));
    // `r` lies in [0, q) so the conversion cannot fail.
    r.to_u64().unwrap_or_default()
}

/// Maps a residue in `[0, modulus)` to the symmetric range `(-modulus/2, modulus/2]`.
pub fn center(x: &BigUint, modulus: &BigUint, half_modulus: &BigUint) -> BigInt {
    if x > half_modulus {
        BigInt::from_biguint(Sign::Minus, modulus - x)
    } else {
        BigInt::from_biguint(Sign::Plus, x.clone())
    }
}

/// Centers a word-sized residue modulo `q` into `(-q/2, q/2]`.
pub fn center_u64(x: u64, q: u64) -> i64 {
    if x > q / 2 {
        -((q - x) as i64)
    } else {
        x as i64
    }
}

/// Bit length of the largest magnitude in `coefficients`.
pub fn max_bits(coefficients: &[BigInt]) -> u64 {
    coefficients
        .iter()
        .map(|c| c.magnitude().bits())
        .max()
        .unwrap_or(0)
}

/// Inverse of `a` modulo the prime `q`.
pub(crate) fn inverse_mod_prime(a: u64, q: u64) -> u64 {
    let a = BigUint::from(a % q);
    let q_big = BigUint::from(q);
    a.modpow(&BigUint::from(q - 2), &q_big)
        .to_u64()
        .unwrap_or_default()
}
