// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::errors::Result;
use fhe::bfv::BfvParameters;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use sfdk_fhe_params::{constants::defaults, SfdkPreset};
use sfdk_polynomial::CrtContext;
use sfdk_trapdoor::TrapdoorSampler;
use std::fmt;
use std::sync::Arc;

/// Distribution of the scalar secret key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecretKeyDist {
    #[default]
    Gaussian,
    UniformTernary,
}

/// Public-key encryption variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncryptionTechnique {
    #[default]
    Standard,
    /// Accepted in configuration, rejected by SFDK encryption.
    Extended,
}

impl fmt::Display for EncryptionTechnique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EncryptionTechnique::Standard => f.write_str("STANDARD"),
            EncryptionTechnique::Extended => f.write_str("EXTENDED"),
        }
    }
}

/// Immutable snapshot of everything the SFDK layer needs from a context.
///
/// The trapdoor width `k` is fixed here, once, when the snapshot is built.
#[derive(Debug, Clone)]
pub struct SfdkParameters {
    bfv: Arc<BfvParameters>,
    sampler: TrapdoorSampler,
    noise_scale: u64,
    secret_key_dist: SecretKeyDist,
    encryption_technique: EncryptionTechnique,
}

impl SfdkParameters {
    /// Snapshot over `bfv` with gadget base `base` and the BFV error width as σ.
    pub fn new(bfv: Arc<BfvParameters>, base: u64) -> Result<Self> {
        let crt = Arc::new(CrtContext::new(bfv.ctx_at_level(0)?));
        let sigma = (bfv.variance() as f64).sqrt();
        let sampler = TrapdoorSampler::new(crt, base, sigma)?;
        Ok(Self {
            bfv,
            sampler,
            noise_scale: defaults::NOISE_SCALE,
            secret_key_dist: SecretKeyDist::default(),
            encryption_technique: EncryptionTechnique::default(),
        })
    }

    pub fn from_preset(preset: SfdkPreset) -> Result<Self> {
        let set = preset.param_set();
        Self::new(set.build_arc()?, set.base)
    }

    pub fn with_noise_scale(mut self, noise_scale: u64) -> Self {
        self.noise_scale = noise_scale;
        self
    }

    pub fn with_secret_key_dist(mut self, dist: SecretKeyDist) -> Self {
        self.secret_key_dist = dist;
        self
    }

    pub fn with_encryption_technique(mut self, technique: EncryptionTechnique) -> Self {
        self.encryption_technique = technique;
        self
    }

    pub fn bfv(&self) -> &Arc<BfvParameters> {
        &self.bfv
    }

    pub fn sampler(&self) -> &TrapdoorSampler {
        &self.sampler
    }

    pub fn crt(&self) -> &Arc<CrtContext> {
        self.sampler.crt()
    }

    /// The ciphertext modulus Q.
    pub fn modulus(&self) -> &BigUint {
        self.crt().modulus()
    }

    pub fn base(&self) -> u64 {
        self.sampler.base()
    }

    /// Width k of the public rows and of every one-time key.
    pub fn width(&self) -> usize {
        self.sampler.width()
    }

    pub fn sigma(&self) -> f64 {
        self.sampler.sigma()
    }

    pub fn noise_scale(&self) -> u64 {
        self.noise_scale
    }

    pub fn secret_key_dist(&self) -> SecretKeyDist {
        self.secret_key_dist
    }

    pub fn encryption_technique(&self) -> EncryptionTechnique {
        self.encryption_technique
    }

    pub fn degree(&self) -> usize {
        self.bfv.degree()
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.bfv.plaintext()
    }

    /// Slots per row of the SIMD encoding; rotations act within a row.
    pub fn row_size(&self) -> usize {
        self.bfv.degree() / 2
    }
}
