// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::builder::{build_bfv_params_from_set, build_bfv_params_from_set_arc};
use crate::constants::{defaults, insecure_1024, insecure_2048, secure_32768};
use crate::depth::psm_depth;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error as ThisError;

use fhe::bfv::BfvParameters;

/// BFV preset configurations for one-time decryption keys and private set membership.
///
/// All presets use the plaintext modulus p = 65537, which is prime (required by the
/// Fermat equality test) and admits SIMD packing for every supported degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SfdkPreset {
    /// Insecure parameters (degree 1024) - DO NOT USE IN PRODUCTION
    ///
    /// Sized for one-time-key round trips, zero sponges and shallow circuits.
    #[default]
    #[serde(rename = "INSECURE_SFDK_1024")]
    InsecureSfdk1024,
    /// Insecure parameters (degree 2048) - DO NOT USE IN PRODUCTION
    ///
    /// Deep enough to evaluate the full membership circuit over p = 65537.
    #[serde(rename = "INSECURE_PSM_2048")]
    InsecurePsm2048,
    /// Parameters at degree 32768 targeting 128-bit security, with the depth the
    /// membership circuit needs.
    #[serde(rename = "SECURE_PSM_32768")]
    SecurePsm32768,
}

/// Coarse security classification of a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SecurityTier {
    Insecure,
    Secure,
}

/// Metadata describing a preset configuration
#[derive(Debug, Clone, Copy)]
pub struct PresetMetadata {
    /// The canonical name of the preset (e.g., "INSECURE_SFDK_1024")
    pub name: &'static str,
    pub security_tier: SecurityTier,
    /// Degree of the ring R_q = Z_q[X]/(X^d + 1)
    pub degree: usize,
    /// Total bit length of the ciphertext modulus q
    pub modulus_bits: usize,
    /// Multiplicative depth required by the membership circuit for this plaintext modulus
    pub psm_depth: usize,
}

#[derive(ThisError, Debug)]
pub enum PresetError {
    #[error("Unknown preset: {0}")]
    UnknownPreset(String),
    #[error("Failed to build BFV parameters: {0}")]
    Build(#[from] fhe::Error),
}

/// A complete parameter set definition
///
/// Holds everything needed to construct `BfvParameters` plus the default trapdoor
/// gadget base used by the SFDK layer.
#[derive(Debug, Clone, Copy)]
pub struct SfdkParamSet {
    /// Degree of the polynomial ring, a power of two
    pub degree: usize,
    /// Plaintext modulus t
    pub plaintext_modulus: u64,
    /// Ciphertext moduli q_i, NTT-friendly primes; q = ∏q_i
    pub moduli: &'static [u64],
    /// Variance of the error distribution
    pub variance: usize,
    /// Gadget base of the trapdoor
    pub base: u64,
}

impl SfdkParamSet {
    pub fn build(self) -> Result<BfvParameters, PresetError> {
        build_bfv_params_from_set(self)
    }

    pub fn build_arc(self) -> Result<Arc<BfvParameters>, PresetError> {
        build_bfv_params_from_set_arc(self)
    }

    /// Bit length of q = ∏q_i.
    pub fn modulus_bits(&self) -> usize {
        self.moduli
            .iter()
            .map(|q| (u64::BITS - q.leading_zeros()) as usize)
            .sum()
    }
}

impl SfdkPreset {
    pub const ALL: [SfdkPreset; 3] = [
        SfdkPreset::InsecureSfdk1024,
        SfdkPreset::InsecurePsm2048,
        SfdkPreset::SecurePsm32768,
    ];

    pub fn from_name(name: &str) -> Result<Self, PresetError> {
        let normalized = name.trim().to_ascii_uppercase();
        match normalized.as_str() {
            "INSECURE_SFDK_1024" => Ok(Self::InsecureSfdk1024),
            "INSECURE_PSM_2048" => Ok(Self::InsecurePsm2048),
            "SECURE_PSM_32768" => Ok(Self::SecurePsm32768),
            _ => Err(PresetError::UnknownPreset(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SfdkPreset::InsecureSfdk1024 => "INSECURE_SFDK_1024",
            SfdkPreset::InsecurePsm2048 => "INSECURE_PSM_2048",
            SfdkPreset::SecurePsm32768 => "SECURE_PSM_32768",
        }
    }

    pub fn list() -> Vec<&'static str> {
        Self::ALL.iter().map(SfdkPreset::name).collect()
    }

    pub fn param_set(&self) -> SfdkParamSet {
        (*self).into()
    }

    pub fn metadata(&self) -> PresetMetadata {
        let set = self.param_set();
        let security_tier = match self {
            SfdkPreset::InsecureSfdk1024 | SfdkPreset::InsecurePsm2048 => SecurityTier::Insecure,
            SfdkPreset::SecurePsm32768 => SecurityTier::Secure,
        };
        PresetMetadata {
            name: self.name(),
            security_tier,
            degree: set.degree,
            modulus_bits: set.modulus_bits(),
            psm_depth: psm_depth(set.plaintext_modulus),
        }
    }

    pub fn build_arc(&self) -> Result<Arc<BfvParameters>, PresetError> {
        self.param_set().build_arc()
    }
}

impl From<SfdkPreset> for SfdkParamSet {
    fn from(value: SfdkPreset) -> Self {
        match value {
            SfdkPreset::InsecureSfdk1024 => SfdkParamSet {
                degree: insecure_1024::DEGREE,
                plaintext_modulus: insecure_1024::PLAINTEXT_MODULUS,
                moduli: insecure_1024::MODULI,
                variance: defaults::VARIANCE,
                base: defaults::BASE,
            },
            SfdkPreset::InsecurePsm2048 => SfdkParamSet {
                degree: insecure_2048::DEGREE,
                plaintext_modulus: insecure_2048::PLAINTEXT_MODULUS,
                moduli: insecure_2048::MODULI,
                variance: defaults::VARIANCE,
                base: defaults::BASE,
            },
            SfdkPreset::SecurePsm32768 => SfdkParamSet {
                degree: secure_32768::DEGREE,
                plaintext_modulus: secure_32768::PLAINTEXT_MODULUS,
                moduli: secure_32768::MODULI,
                variance: defaults::VARIANCE,
                base: defaults::BASE,
            },
        }
    }
}
