// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Elements of R[x]/(x^n + 1) in evaluation form.
//!
//! An element is stored as its values at the primitive 2n-th roots of unity
//! ω^(2j+1), so products, inverses and adjoints are pointwise. The adjoint
//! f(x^-1) is the complex conjugate of every evaluation.

use num::complex::Complex64;
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

#[derive(Clone, Debug, PartialEq)]
pub struct RingField {
    evals: Vec<Complex64>,
}

impl RingField {
    /// Evaluates a real coefficient vector whose length is a power of two.
    pub fn from_coefficients(coefficients: &[f64]) -> Self {
        let n = coefficients.len();
        let mut values: Vec<Complex64> = coefficients
            .iter()
            .enumerate()
            .map(|(k, c)| Complex64::from_polar(*c, PI * k as f64 / n as f64))
            .collect();
        dft(&mut values, false);
        Self { evals: values }
    }

    pub fn from_i64(coefficients: &[i64]) -> Self {
        let real: Vec<f64> = coefficients.iter().map(|c| *c as f64).collect();
        Self::from_coefficients(&real)
    }

    /// The constant `value` in a ring of dimension `n`.
    pub fn constant(value: f64, n: usize) -> Self {
        Self {
            evals: vec![Complex64::new(value, 0.0); n],
        }
    }

    pub fn len(&self) -> usize {
        self.evals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evals.is_empty()
    }

    pub fn evaluations(&self) -> &[Complex64] {
        &self.evals
    }

    /// Interpolates back to (real) coefficients.
    pub fn to_coefficients(&self) -> Vec<f64> {
        let n = self.evals.len();
        let mut values = self.evals.clone();
        dft(&mut values, true);
        values
            .iter()
            .enumerate()
            .map(|(k, v)| (v * Complex64::from_polar(1.0, -PI * k as f64 / n as f64)).re)
            .collect()
    }

    /// f(x^-1), the transpose of the multiplication matrix of f.
    pub fn adjoint(&self) -> Self {
        Self {
            evals: self.evals.iter().map(|v| v.conj()).collect(),
        }
    }

    pub fn inverse(&self) -> Self {
        Self {
            evals: self.evals.iter().map(|v| v.inv()).collect(),
        }
    }

    pub fn scale(&self, factor: f64) -> Self {
        Self {
            evals: self.evals.iter().map(|v| v * factor).collect(),
        }
    }

    pub fn add_scalar(&self, value: f64) -> Self {
        Self {
            evals: self.evals.iter().map(|v| v + value).collect(),
        }
    }

    /// f · f^T, a self-adjoint element with non-negative evaluations.
    pub fn gram(&self) -> Self {
        Self {
            evals: self
                .evals
                .iter()
                .map(|v| Complex64::new(v.norm_sqr(), 0.0))
                .collect(),
        }
    }

    /// Smallest real part over all evaluations.
    pub fn min_real(&self) -> f64 {
        self.evals
            .iter()
            .map(|v| v.re)
            .fold(f64::INFINITY, f64::min)
    }
}

impl Add for &RingField {
    type Output = RingField;

    fn add(self, rhs: &RingField) -> RingField {
        RingField {
            evals: self
                .evals
                .iter()
                .zip(rhs.evals.iter())
                .map(|(a, b)| a + b)
                .collect(),
        }
    }
}

impl Sub for &RingField {
    type Output = RingField;

    fn sub(self, rhs: &RingField) -> RingField {
        RingField {
            evals: self
                .evals
                .iter()
                .zip(rhs.evals.iter())
                .map(|(a, b)| a - b)
                .collect(),
        }
    }
}

impl Mul for &RingField {
    type Output = RingField;

    fn mul(self, rhs: &RingField) -> RingField {
        RingField {
            evals: self
                .evals
                .iter()
                .zip(rhs.evals.iter())
                .map(|(a, b)| a * b)
                .collect(),
        }
    }
}

/// Splits a coefficient vector f into (f0, f1) with f(x) = f0(x^2) + x·f1(x^2).
pub fn split_even_odd<T: Copy>(values: &[T]) -> (Vec<T>, Vec<T>) {
    let even = values.iter().step_by(2).copied().collect();
    let odd = values.iter().skip(1).step_by(2).copied().collect();
    (even, odd)
}

/// Inverse of [`split_even_odd`].
pub fn interleave<T: Copy>(even: &[T], odd: &[T]) -> Vec<T> {
    even.iter()
        .zip(odd.iter())
        .flat_map(|(e, o)| [*e, *o])
        .collect()
}

/// Multiplies a coefficient vector by x in R[x]/(x^m + 1).
pub fn mul_by_x(coefficients: &[f64]) -> Vec<f64> {
    let m = coefficients.len();
    if m == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(m);
    out.push(-coefficients[m - 1]);
    out.extend_from_slice(&coefficients[..m - 1]);
    out
}

/// In-place radix-2 DFT with kernel e^{+2πi jk/n}; the inverse includes the 1/n factor.
fn dft(values: &mut [Complex64], inverse: bool) {
    let n = values.len();
    if n <= 1 {
        return;
    }

    let mut j = 0;
    for i in 1..n {
        let mut bit = n >> 1;
        while j & bit != 0 {
            j ^= bit;
            bit >>= 1;
        }
        j |= bit;
        if i < j {
            values.swap(i, j);
        }
    }

    let sign = if inverse { -1.0 } else { 1.0 };
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let twiddles: Vec<Complex64> = (0..half)
            .map(|k| Complex64::from_polar(1.0, sign * 2.0 * PI * k as f64 / len as f64))
            .collect();
        for start in (0..n).step_by(len) {
            for k in 0..half {
                let u = values[start + k];
                let v = values[start + k + half] * twiddles[k];
                values[start + k] = u + v;
                values[start + k + half] = u - v;
            }
        }
        len <<= 1;
    }

    if inverse {
        let scale = 1.0 / n as f64;
        values.iter_mut().for_each(|v| *v *= scale);
    }
}
