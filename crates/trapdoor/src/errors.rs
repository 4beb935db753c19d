// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use sfdk_polynomial::CrtPolynomialError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrapdoorError {
    #[error("gadget base must be a power of two greater than one, got {0}")]
    InvalidBase(u64),

    #[error("standard deviation must be positive and finite, got {0}")]
    InvalidSigma(f64),

    #[error("perturbation covariance is not positive definite (variance {0})")]
    NonPositiveVariance(f64),

    #[error("expected {expected} ring elements, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("CRT conversion failed: {0}")]
    Crt(#[from] CrtPolynomialError),

    #[error("ring arithmetic error: {0}")]
    Math(#[from] fhe_math::Error),
}

pub type Result<T> = std::result::Result<T, TrapdoorError>;
