// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Gadget vector g = (1, b, ..., b^(ℓ-1)) and Gaussian sampling on the cosets of
//! Λ⊥_Q(g^T) for an arbitrary modulus Q (Genise–Micciancio).

use crate::errors::{Result, TrapdoorError};
use crate::gaussian::sample_z;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive};
use rand::Rng;

/// Smallest ℓ with b^ℓ > Q for a power-of-two base.
pub fn gadget_digits(modulus: &BigUint, base: u64) -> Result<usize> {
    if base < 2 || !base.is_power_of_two() {
        return Err(TrapdoorError::InvalidBase(base));
    }
    let log_base = base.trailing_zeros() as u64;
    Ok(modulus.bits().div_ceil(log_base) as usize)
}

#[derive(Clone, Debug)]
pub struct Gadget {
    base: u64,
    log_base: u32,
    digits: usize,
    modulus_digits: Vec<i64>,
    /// Diagonal of the perturbation factor.
    l: Vec<f64>,
    /// Sub-diagonal of the perturbation factor.
    h: Vec<f64>,
    /// Last column of the D factor of the Λ⊥ basis.
    d: Vec<f64>,
}

impl Gadget {
    pub fn new(modulus: &BigUint, base: u64) -> Result<Self> {
        let digits = gadget_digits(modulus, base)?;
        if digits < 2 {
            return Err(TrapdoorError::InvalidBase(base));
        }
        let log_base = base.trailing_zeros();
        let modulus_digits = base_digits(modulus, log_base, digits);

        let k = digits as f64;
        let b = base as f64;

        let mut l = Vec::with_capacity(digits);
        l.push((b * (1.0 + 1.0 / k) + 1.0).sqrt());
        for i in 1..digits {
            l.push((b * (1.0 + 1.0 / (k - i as f64))).sqrt());
        }

        let mut h = Vec::with_capacity(digits + 1);
        h.push(0.0);
        for i in 1..=digits {
            h.push((b * (1.0 - 1.0 / (k - i as f64 + 1.0))).sqrt());
        }

        let mut d = Vec::with_capacity(digits);
        d.push(modulus_digits[0] as f64 / b);
        for i in 1..digits {
            d.push((d[i - 1] + modulus_digits[i] as f64) / b);
        }

        Ok(Self {
            base,
            log_base,
            digits,
            modulus_digits,
            l,
            h,
            d,
        })
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    /// Number of gadget entries ℓ.
    pub fn digits(&self) -> usize {
        self.digits
    }

    /// The entries b^i, i < ℓ.
    pub fn powers(&self) -> Vec<BigUint> {
        (0..self.digits)
            .map(|i| BigUint::one() << (i as u64 * self.log_base as u64))
            .collect()
    }

    /// Base-b digits of `v`, least significant first.
    pub fn decompose(&self, v: &BigUint) -> Vec<i64> {
        base_digits(v, self.log_base, self.digits)
    }

    /// <g, z> over the integers.
    pub fn recompose(&self, z: &[i64]) -> BigInt {
        z.iter()
            .enumerate()
            .map(|(i, zi)| BigInt::from(*zi) << (i as u64 * self.log_base as u64))
            .sum()
    }

    /// Samples a short z with <g, z> ≡ v (mod Q), distributed as a discrete Gaussian
    /// with parameter about (b+1)·σ.
    pub fn sample_preimage<R: Rng + ?Sized>(
        &self,
        v: &BigUint,
        sigma: f64,
        rng: &mut R,
    ) -> Result<Vec<i64>> {
        let k = self.digits;
        let b = self.base as i64;
        let bf = self.base as f64;
        let v_digits = self.decompose(v);

        let p = self.perturb(sigma, rng)?;

        let mut a = vec![0.0f64; k];
        a[0] = (v_digits[0] - p[0]) as f64 / bf;
        for t in 1..k {
            a[t] = (a[t - 1] + (v_digits[t] - p[t]) as f64) / bf;
        }

        let zj = self.sample_c(&a, sigma, rng)?;

        let last = zj[k - 1];
        let mut z = vec![0i64; k];
        z[0] = b * zj[0] + self.modulus_digits[0] * last + v_digits[0];
        for t in 1..k - 1 {
            z[t] = b * zj[t] - zj[t - 1] + self.modulus_digits[t] * last + v_digits[t];
        }
        z[k - 1] = self.modulus_digits[k - 1] * last - zj[k - 2] + v_digits[k - 1];
        Ok(z)
    }

    fn perturb<R: Rng + ?Sized>(&self, sigma: f64, rng: &mut R) -> Result<Vec<i64>> {
        let k = self.digits;
        let b = self.base as i64;

        let mut z = vec![0i64; k];
        let mut beta = 0.0;
        for i in 0..k {
            z[i] = sample_z(beta / self.l[i], sigma / self.l[i], rng)?;
            beta = -(z[i] as f64) * self.h[i + 1];
        }

        let mut p = vec![0i64; k];
        p[0] = (2 * b + 1) * z[0] + b * z[1];
        for i in 1..k - 1 {
            p[i] = b * (z[i - 1] + 2 * z[i] + z[i + 1]);
        }
        p[k - 1] = b * (z[k - 2] + 2 * z[k - 1]);
        Ok(p)
    }

    fn sample_c<R: Rng + ?Sized>(&self, a: &[f64], sigma: f64, rng: &mut R) -> Result<Vec<i64>> {
        let k = self.digits;
        let mut z = vec![0i64; k];
        z[k - 1] = sample_z(-a[k - 1] / self.d[k - 1], sigma / self.d[k - 1], rng)?;
        let last = z[k - 1] as f64;
        for i in 0..k - 1 {
            z[i] = sample_z(-(a[i] + last * self.d[i]), sigma, rng)?;
        }
        Ok(z)
    }
}

fn base_digits(v: &BigUint, log_base: u32, count: usize) -> Vec<i64> {
    let mask = (BigUint::one() << log_base) - BigUint::one();
    (0..count)
        .map(|i| {
            ((v >> (i as u64 * log_base as u64)) & &mask)
                .to_i64()
                .unwrap_or_default()
        })
        .collect()
}
