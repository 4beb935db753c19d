// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! One-time decryption keys and private set membership over BFV.
//!
//! Keys come from a ring trapdoor: the public key is a pair of wide rows
//! `(b, a) = (-e - A·s, A)`, and for every ciphertext `(c0, c1)` the trapdoor holder can
//! sample a short `zHat` with `A·zHat = c1` that opens exactly that ciphertext.

mod context;
pub mod envelope;
mod errors;
mod eval;
mod features;
mod keygen;
mod keys;
mod noise;
mod one_time;
mod parameters;
mod psm;
pub mod ring;

pub use context::{SfdkContext, SharedRng};
pub use errors::{Result, SfdkError};
pub use features::{Feature, FeatureSet};
pub use keygen::{sample_sparse_ternary, SPARSE_HAMMING_WEIGHT};
pub use keys::{KeyCipher, KeyCipherGenKey, KeyPairSfdk, KeyTag, PublicKeySfdk};
pub use one_time::DecryptResult;
pub use parameters::{EncryptionTechnique, SecretKeyDist, SfdkParameters};

pub use sfdk_fhe_params::{psm_depth, SfdkPreset};
