// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Discrete Gaussian sampling over Z
//!
//! Samples from D_{Z, c, σ} with arbitrary real centers, as needed by the gadget and
//! perturbation samplers. Small deviations use inversion over a normalised table;
//! larger ones use rejection sampling from the tail-cut interval.

use crate::errors::{Result, TrapdoorError};
use rand::Rng;

/// Samples farther than this many standard deviations from the center are never produced.
pub const TAILCUT: f64 = 6.0;

/// Below this deviation the support is small enough to tabulate.
const TABLE_SIGMA_THRESHOLD: f64 = 8.0;

/// Discrete Gaussian sampler with a fixed standard deviation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DiscreteGaussian {
    sigma: f64,
}

impl DiscreteGaussian {
    pub fn new(sigma: f64) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(TrapdoorError::InvalidSigma(sigma));
        }
        Ok(Self { sigma })
    }

    /// Sampler whose variance matches fhe.rs's `variance` parameter.
    pub fn from_variance(variance: usize) -> Result<Self> {
        Self::new((variance as f64).sqrt())
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Sample from D_{Z, 0, σ}.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> i64 {
        self.sample_centered(0.0, rng)
    }

    /// Sample from D_{Z, center, σ}.
    pub fn sample_centered<R: Rng + ?Sized>(&self, center: f64, rng: &mut R) -> i64 {
        if self.sigma < TABLE_SIGMA_THRESHOLD {
            self.sample_inversion(center, rng)
        } else {
            self.sample_rejection(center, rng)
        }
    }

    pub fn sample_vec<R: Rng + ?Sized>(&self, len: usize, rng: &mut R) -> Vec<i64> {
        (0..len).map(|_| self.sample(rng)).collect()
    }

    fn support(&self, center: f64) -> (i64, i64) {
        let lo = (center - TAILCUT * self.sigma).floor() as i64;
        let hi = (center + TAILCUT * self.sigma).ceil() as i64;
        (lo, hi)
    }

    fn log_weight(&self, x: i64, center: f64) -> f64 {
        let d = x as f64 - center;
        -(d * d) / (2.0 * self.sigma * self.sigma)
    }

    /// Inversion over the tabulated support. Weights are taken relative to the
    /// heaviest point so that very narrow distributions do not underflow.
    fn sample_inversion<R: Rng + ?Sized>(&self, center: f64, rng: &mut R) -> i64 {
        let (lo, hi) = self.support(center);
        let log_weights: Vec<f64> = (lo..=hi).map(|x| self.log_weight(x, center)).collect();
        let max = log_weights
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<f64> = log_weights.iter().map(|w| (w - max).exp()).collect();
        let total: f64 = weights.iter().sum();

        let mut u = rng.gen::<f64>() * total;
        for (x, w) in (lo..=hi).zip(weights.iter()) {
            if u < *w {
                return x;
            }
            u -= w;
        }
        center.round() as i64
    }

    fn sample_rejection<R: Rng + ?Sized>(&self, center: f64, rng: &mut R) -> i64 {
        let (lo, hi) = self.support(center);
        loop {
            let x = rng.gen_range(lo..=hi);
            let prob = self.log_weight(x, center).exp();
            let u: f64 = rng.gen();
            if u < prob {
                return x;
            }
        }
    }
}

/// Sample a single value from D_{Z, center, σ}.
pub fn sample_z<R: Rng + ?Sized>(center: f64, sigma: f64, rng: &mut R) -> Result<i64> {
    Ok(DiscreteGaussian::new(sigma)?.sample_centered(center, rng))
}
