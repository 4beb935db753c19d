// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Constants for SFDK presets
//!
//! Every modulus below is a 62-bit prime congruent to 1 modulo 2^16, so the same list is
//! NTT-friendly for every ring degree up to 32768. The plaintext modulus 65537 is prime and
//! congruent to 1 modulo 2^16 as well, which enables SIMD packing on all presets.

/// Insecure preset constants (degree 1024) - DO NOT USE IN PRODUCTION
///
/// Small enough for fast one-time-key round trips; supports a couple of multiplications.
pub mod insecure_1024 {
    pub const DEGREE: usize = 1024;
    pub const PLAINTEXT_MODULUS: u64 = 65537;
    pub const MODULI: &[u64] = &[0x3fffffffffff0001, 0x3fffffffffe80001, 0x3fffffffffc30001];
}

/// Insecure preset constants (degree 2048) - DO NOT USE IN PRODUCTION
///
/// Deep enough for the Fermat evaluator over p = 65537 plus the range folding used in tests.
pub mod insecure_2048 {
    pub const DEGREE: usize = 2048;
    pub const PLAINTEXT_MODULUS: u64 = 65537;
    pub const MODULI: &[u64] = &[
        0x3fffffffffff0001,
        0x3fffffffffe80001,
        0x3fffffffffc30001,
        0x3fffffffffbe0001,
        0x3fffffffffb80001,
        0x3fffffffffa30001,
        0x3fffffffff730001,
        0x3fffffffff540001,
        0x3fffffffff270001,
        0x3ffffffffedd0001,
        0x3ffffffffeda0001,
        0x3ffffffffed30001,
    ];
}

/// Secure preset constants (degree 32768)
///
/// log2(q) = 868 stays below the 881-bit bound of the HE standard for 128-bit security
/// with a ternary secret at this degree.
pub mod secure_32768 {
    pub const DEGREE: usize = 32768;
    pub const PLAINTEXT_MODULUS: u64 = 65537;
    pub const MODULI: &[u64] = &[
        0x3fffffffffff0001,
        0x3fffffffffe80001,
        0x3fffffffffc30001,
        0x3fffffffffbe0001,
        0x3fffffffffb80001,
        0x3fffffffffa30001,
        0x3fffffffff730001,
        0x3fffffffff540001,
        0x3fffffffff270001,
        0x3ffffffffedd0001,
        0x3ffffffffeda0001,
        0x3ffffffffed30001,
        0x3ffffffffecb0001,
        0x3ffffffffec80001,
    ];
}

/// Default values for SFDK parameters
pub mod defaults {
    /// Variance of the error distribution, the fhe.rs default (sigma ~ 3.16).
    pub const VARIANCE: usize = 10;
    /// Gadget base of the trapdoor, 2^22.
    pub const BASE: u64 = 4_194_304;
    /// Scale applied to the encryption error terms.
    pub const NOISE_SCALE: u64 = 1;
}
