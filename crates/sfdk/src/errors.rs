// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::features::Feature;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SfdkError>;

#[derive(Error, Debug)]
pub enum SfdkError {
    // Configuration
    #[error("Not supported: {0} encryption technique")]
    UnsupportedEncryptionTechnique(String),
    #[error("Not supported: plaintext encoded with {plaintext} RNS limbs, public key has {key}")]
    LimbMismatch { plaintext: usize, key: usize },
    #[error("Plaintext modulus {0} is not prime")]
    NonPrimePlaintextModulus(u64),
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    // Preconditions
    #[error("Expected a ciphertext with {expected} components, found {actual}")]
    ComponentCount { expected: usize, actual: usize },
    #[error("Key tag mismatch: {expected} != {actual}")]
    KeyTagMismatch { expected: String, actual: String },
    #[error("Key pair is missing its {0}")]
    IncompleteKeyPair(&'static str),
    #[error("Public key width {actual} does not match the context width {expected}")]
    WidthMismatch { expected: usize, actual: usize },
    #[error("The set to test against is empty")]
    EmptySet,
    #[error("Too many values for a packed plaintext: {count} > {slots}")]
    TooManyValues { count: usize, slots: usize },
    #[error("Rotation key for index {0} not found, call prepare_psm or eval_at_index_key_gen first")]
    MissingRotationKey(i32),
    #[error("Relinearization key not found, call prepare_psm or eval_mult_key_gen first")]
    MissingRelinearizationKey,

    // Capabilities
    #[error("Feature {0} is not enabled on this context")]
    FeatureNotEnabled(Feature),

    // Persistence
    #[error("Expected a serialized {expected}, found {found}")]
    WrongObject { expected: String, found: String },
    #[error("Serialized {name} is from a later version of the library ({version} > {supported})")]
    LaterVersion {
        name: String,
        version: u32,
        supported: u32,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    // Engine
    #[error("BFV error: {0}")]
    Fhe(#[from] fhe::Error),
    #[error("Ring arithmetic error: {0}")]
    Math(#[from] fhe_math::Error),
    #[error("CRT error: {0}")]
    Crt(#[from] sfdk_polynomial::CrtPolynomialError),
    #[error("Trapdoor error: {0}")]
    Trapdoor(#[from] sfdk_trapdoor::TrapdoorError),
    #[error("Preset error: {0}")]
    Preset(#[from] sfdk_fhe_params::PresetError),
    #[error("Lock poisoned: {0}")]
    Poisoned(&'static str),
}
