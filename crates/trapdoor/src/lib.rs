// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Ring trapdoors over RNS moduli and the Gaussian preimage sampler (GaussSamp) used
//! to derive one-time decryption keys.
//!
//! The public row is `A = [1, a, g_i - (a·r_i + e_i)]` with gadget `g_i = b^i`.
//! Preimages are sampled as `z = p + [e; r; I]·ẑ` where `p` is a perturbation drawn
//! with the spectral-bound covariance and `ẑ` is a gadget-coset sample for the
//! perturbed syndrome.

pub mod errors;
pub mod field;
pub mod gadget;
pub mod gaussian;
pub mod perturbation;
pub mod trapdoor;

pub use errors::{Result, TrapdoorError};
pub use gadget::{gadget_digits, Gadget};
pub use gaussian::{sample_z, DiscreteGaussian, TAILCUT};
pub use trapdoor::{Trapdoor, TrapdoorSampler, TrapdoorSecret};
