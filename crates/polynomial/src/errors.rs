// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Error types for CRT polynomial operations.

use thiserror::Error;

/// Errors that can occur while moving between RNS and big-integer coefficients.
#[derive(Debug, Error)]
pub enum CrtPolynomialError {
    /// Coefficient vector length does not match the ring degree.
    #[error("expected {expected} coefficients, got {actual}")]
    DegreeMismatch { expected: usize, actual: usize },

    /// The polynomial lives over a different context than the CRT helper.
    #[error("polynomial context does not match the CRT context")]
    ContextMismatch,

    /// Failure reported by the ring arithmetic engine
    #[error("ring arithmetic error: {0}")]
    Math(#[from] fhe_math::Error),
}
