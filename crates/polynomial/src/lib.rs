// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! # CRT polynomial helpers
//!
//! Exact big-integer views of the RNS ring elements used by fhe.rs:
//!
//! - CRT reconstruction of `fhe_math::rq::Poly` coefficients modulo `Q = ∏q_i`, in the
//!   standard `[0, Q)` or centered `(-Q/2, Q/2]` range.
//! - Conversions from signed or big-integer coefficient vectors back into RNS limbs.
//! - Constant ring elements for arbitrary big-integer scalars.

pub mod crt_polynomial;
pub mod errors;
pub mod utils;

pub use crt_polynomial::{CrtContext, CrtPolynomial};
pub use errors::CrtPolynomialError;
pub use utils::*;
