// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Private set membership over packed ciphertexts.
//!
//! The query sits in slot 0. It is replicated across the first `size` slots, the set is
//! subtracted slot-wise, and x^(p-1) maps every slot to 0 (equal) or 1 (different) by
//! Fermat's little theorem. Summing the slots and subtracting `size - 1` leaves 0 in
//! slot 0 exactly when the query is a member.

use crate::context::SfdkContext;
use crate::errors::{Result, SfdkError};
use crate::features::Feature;
use fhe::bfv::{Ciphertext, SecretKey};
use tracing::{debug, info, warn};

impl SfdkContext {
    /// Generates the relinearization key and the rotation keys for every power of two up
    /// to `min(max_size, slots)`, in both directions.
    pub fn prepare_psm(&self, sk: &SecretKey, max_size: usize) -> Result<()> {
        self.require(Feature::LeveledShe)?;
        self.require(Feature::KeySwitch)?;
        self.check_plaintext_modulus()?;

        let slots = self.params().row_size();
        if max_size > slots {
            warn!(max_size, slots, "membership sets are capped at one row of slots");
        }
        let max_size = max_size.min(slots);
        let mut indices = Vec::new();
        let mut i = 1usize;
        while i < max_size {
            indices.push(i as i32);
            indices.push(-(i as i32));
            i <<= 1;
        }
        indices.push(i as i32);
        indices.push(-(i as i32));

        self.eval_at_index_key_gen(sk, &indices)?;
        self.eval_mult_key_gen(sk)?;
        info!(max_size, rotations = indices.len(), "prepared private set membership");
        Ok(())
    }

    /// Encrypts 0 in slot 0 when the query in slot 0 of `ct` belongs to `set`, and a
    /// non-zero value otherwise.
    pub fn private_set_membership(&self, ct: &Ciphertext, set: &[i64]) -> Result<Ciphertext> {
        self.require(Feature::LeveledShe)?;
        self.require(Feature::KeySwitch)?;
        self.check_plaintext_modulus()?;
        if set.is_empty() {
            return Err(SfdkError::EmptySet);
        }
        let slots = self.params().row_size();
        if set.len() > slots {
            return Err(SfdkError::TooManyValues {
                count: set.len(),
                slots,
            });
        }

        let size = set.len();
        let replicated = self.replicate(ct, size)?;
        let diff = self.eval_sub_plain(&replicated, &self.make_packed_plaintext(set)?)?;
        let masked = self.fermat_mask(&diff)?;
        debug!(size, "evaluated membership against an explicit set");
        self.count_matches(&masked, size)
    }

    /// Membership in the integer range `[start, start + size)`.
    ///
    /// The range is split into `size.div_ceil(slots)` chunks of at most one row of
    /// consecutive integers; the per-chunk differences are multiplied together before
    /// masking. When the last chunk is partial its unused slots hold 0, so a query
    /// congruent to 0 modulo p that lies in the range reads as a non-member.
    pub fn private_set_membership_range(
        &self,
        ct: &Ciphertext,
        start: i64,
        size: usize,
    ) -> Result<Ciphertext> {
        self.require(Feature::LeveledShe)?;
        self.require(Feature::KeySwitch)?;
        self.check_plaintext_modulus()?;
        if size == 0 {
            return Err(SfdkError::EmptySet);
        }
        i64::try_from(size)
            .ok()
            .and_then(|len| start.checked_add(len))
            .ok_or_else(|| {
                SfdkError::InvalidParameters(format!(
                    "range of {size} values starting at {start} overflows i64"
                ))
            })?;

        let slots = self.params().row_size();
        let width = size.min(slots);
        let replicated = self.replicate(ct, width)?;

        let chunks = size.div_ceil(slots);
        let mut product: Option<Ciphertext> = None;
        for chunk in 0..chunks {
            let offset = chunk * slots;
            let len = (size - offset).min(slots);
            // start + size fits in i64, so these cannot overflow
            let first = start + offset as i64;
            let values: Vec<i64> = (first..first + len as i64).collect();
            let diff = self.eval_sub_plain(&replicated, &self.make_packed_plaintext(&values)?)?;
            product = Some(match product {
                None => diff,
                Some(acc) => self.eval_mult(&acc, &diff)?,
            });
        }
        let product = product.ok_or(SfdkError::EmptySet)?;

        let masked = self.fermat_mask(&product)?;
        debug!(start, size, chunks, "evaluated membership against a range");
        self.count_matches(&masked, width)
    }

    /// Raises every slot to the power p - 1: zero stays zero, everything else becomes 1.
    pub fn fermat_mask(&self, ct: &Ciphertext) -> Result<Ciphertext> {
        let p = self.params().plaintext_modulus();
        let mut power = self.eval_mult(ct, ct)?;
        let mut result = (p & 2 != 0).then(|| power.clone());
        let mut mask = 4u64;
        while mask < p {
            power = self.eval_mult(&power, &power)?;
            if p & mask != 0 {
                result = Some(match result {
                    None => power.clone(),
                    Some(acc) => self.eval_mult(&acc, &power)?,
                });
            }
            mask <<= 1;
        }
        result.ok_or_else(|| {
            SfdkError::InvalidParameters(format!("plaintext modulus {p} is too small"))
        })
    }

    /// Copies slot 0 into the first `size` slots with O(log size) rotations.
    fn replicate(&self, ct: &Ciphertext, size: usize) -> Result<Ciphertext> {
        let mut ct = ct.clone();
        let mut result = (size & 1 != 0).then(|| ct.clone());
        let mut previous = 1usize;
        let mut rot = 2usize;
        while rot <= size {
            ct = self.eval_add(&ct, &self.eval_at_index(&ct, -(previous as i32))?)?;
            if size & rot != 0 {
                result = Some(match result {
                    None => ct.clone(),
                    Some(acc) => self.eval_add(&ct, &self.eval_at_index(&acc, -(rot as i32))?)?,
                });
            }
            previous = rot;
            rot <<= 1;
        }
        result.ok_or(SfdkError::EmptySet)
    }

    /// Sums the first `size` masked slots into slot 0, clears the other slots and
    /// subtracts `size - 1`.
    fn count_matches(&self, masked: &Ciphertext, size: usize) -> Result<Ciphertext> {
        let window = size.next_power_of_two().min(self.params().row_size());
        let mut result = masked.clone();
        let mut shift = window / 2;
        while shift > 0 {
            result = self.eval_add(&result, &self.eval_at_index(&result, shift as i32)?)?;
            shift /= 2;
        }
        let result = self.eval_mult_plain(&result, &self.make_packed_plaintext(&[1])?)?;
        self.eval_sub_plain(&result, &self.make_packed_plaintext(&[size as i64 - 1])?)
    }

    fn check_plaintext_modulus(&self) -> Result<()> {
        let p = self.params().plaintext_modulus();
        if is_prime(p) {
            Ok(())
        } else {
            Err(SfdkError::NonPrimePlaintextModulus(p))
        }
    }
}

/// Deterministic Miller-Rabin for 64-bit integers.
fn is_prime(n: u64) -> bool {
    const WITNESSES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    if n < 2 {
        return false;
    }
    for p in WITNESSES {
        if n % p == 0 {
            return n == p;
        }
    }
    let d = (n - 1) >> (n - 1).trailing_zeros();
    let s = (n - 1).trailing_zeros();
    let mul = |a: u64, b: u64| ((a as u128 * b as u128) % n as u128) as u64;
    let pow = |mut base: u64, mut exp: u64| {
        let mut acc = 1u64;
        while exp > 0 {
            if exp & 1 == 1 {
                acc = mul(acc, base);
            }
            base = mul(base, base);
            exp >>= 1;
        }
        acc
    };
    'witness: for a in WITNESSES {
        let mut x = pow(a, d);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..s {
            x = mul(x, x);
            if x == n - 1 {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
