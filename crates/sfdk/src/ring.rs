// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Ring-level building blocks shared by the SFDK operations.

use crate::errors::Result;
use crate::parameters::SfdkParameters;
use fhe::bfv::{Ciphertext, Plaintext, SecretKey};
use fhe_math::rq::{Context, Poly, Representation};
use num_bigint::BigUint;
use rand::Rng;
use rayon::prelude::*;
use sfdk_polynomial::center_u64;
use sfdk_trapdoor::DiscreteGaussian;
use std::sync::Arc;

/// Σ x_i·y_i over NTT-form ring elements.
pub fn dot(x: &[Poly], y: &[Poly], ctx: &Arc<Context>) -> Poly {
    x.par_iter()
        .zip(y.par_iter())
        .map(|(a, b)| a * b)
        .reduce_with(|a, b| &a + &b)
        .unwrap_or_else(|| Poly::zero(ctx, Representation::Ntt))
}

/// ⌊Q·m/t⌋ for the coefficients of `pt`, in NTT form.
pub fn scaled_message(params: &SfdkParameters, pt: &Plaintext) -> Result<Poly> {
    let q = params.modulus();
    let t = BigUint::from(params.plaintext_modulus());
    let scaled: Vec<BigUint> = pt
        .value
        .par_iter()
        .map(|m| (q * BigUint::from(*m)) / &t)
        .collect();
    Ok(params
        .crt()
        .poly_from_biguints(&scaled, Representation::Ntt)?)
}

/// `width` ring elements with discrete Gaussian coefficients, in NTT form.
pub fn gaussian_row<R: Rng + ?Sized>(
    params: &SfdkParameters,
    width: usize,
    rng: &mut R,
) -> Result<Vec<Poly>> {
    let gaussian = DiscreteGaussian::new(params.sigma())?;
    (0..width)
        .map(|_| gaussian_poly(params, &gaussian, 1, rng))
        .collect()
}

/// A single Gaussian ring element with coefficients multiplied by `scale`.
pub fn gaussian_poly<R: Rng + ?Sized>(
    params: &SfdkParameters,
    gaussian: &DiscreteGaussian,
    scale: i64,
    rng: &mut R,
) -> Result<Poly> {
    let coefficients: Vec<i64> = gaussian
        .sample_vec(params.degree(), rng)
        .into_iter()
        .map(|c| c * scale)
        .collect();
    Ok(params
        .crt()
        .poly_from_i64(&coefficients, Representation::Ntt)?)
}

/// The secret key as a ring element in NTT form.
pub fn secret_poly(params: &SfdkParameters, sk: &SecretKey) -> Result<Poly> {
    Ok(params.crt().poly_from_i64(&sk.coeffs, Representation::Ntt)?)
}

/// The plaintext polynomial with centered coefficients, in NTT form.
pub fn plaintext_poly(params: &SfdkParameters, pt: &Plaintext) -> Result<Poly> {
    let t = params.plaintext_modulus();
    let centered: Vec<i64> = pt.value.iter().map(|m| center_u64(*m, t)).collect();
    Ok(params.crt().poly_from_i64(&centered, Representation::Ntt)?)
}

/// c_0 + c_1·s + c_2·s² + ... in NTT form.
pub fn phase(params: &SfdkParameters, sk: &SecretKey, ct: &Ciphertext) -> Result<Poly> {
    let s = secret_poly(params, sk)?;
    let mut power = s.clone();
    let mut b = ntt(&ct.c[0]);
    for c in &ct.c[1..] {
        b += &(&power * &ntt(c));
        power = &power * &s;
    }
    Ok(b)
}

/// A copy of `p` in NTT form.
pub fn ntt(p: &Poly) -> Poly {
    let mut p = p.clone();
    if *p.representation() != Representation::Ntt {
        p.change_representation(Representation::Ntt);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhe::bfv::Encoding;
    use fhe_traits::FheEncoder;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use sfdk_fhe_params::SfdkPreset;
    use sfdk_polynomial::CrtPolynomial;

    fn params() -> SfdkParameters {
        SfdkParameters::from_preset(SfdkPreset::InsecureSfdk1024).unwrap()
    }

    #[test]
    fn dot_of_empty_rows_is_zero() {
        let params = params();
        let ctx = params.crt().ctx();
        assert_eq!(dot(&[], &[], ctx), Poly::zero(ctx, Representation::Ntt));
    }

    #[test]
    fn dot_matches_a_sequential_sum() {
        let params = params();
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let ctx = params.crt().ctx();
        let x: Vec<Poly> = (0..5)
            .map(|_| Poly::random(ctx, Representation::Ntt, &mut rng))
            .collect();
        let y: Vec<Poly> = (0..5)
            .map(|_| Poly::random(ctx, Representation::Ntt, &mut rng))
            .collect();
        let mut expected = Poly::zero(ctx, Representation::Ntt);
        for (a, b) in x.iter().zip(y.iter()) {
            expected += &(a * b);
        }
        assert_eq!(dot(&x, &y, ctx), expected);
    }

    #[test]
    fn scaled_message_is_delta_times_m() {
        let params = params();
        let pt = Plaintext::try_encode(&vec![3u64, 0, 1], Encoding::poly(), params.bfv()).unwrap();
        let scaled = scaled_message(&params, &pt).unwrap();
        let lifted = params.crt().reconstruct(&scaled).unwrap();
        let delta = params.modulus() / BigUint::from(params.plaintext_modulus());
        assert_eq!(lifted[1], BigUint::from(0u32));
        assert_eq!(lifted[2], delta);
        assert!(lifted[0] >= &delta * 3u32 && lifted[0] < &delta * 3u32 + 3u32);
    }

    #[test]
    fn gaussian_row_is_short() {
        let params = params();
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let row = gaussian_row(&params, params.width(), &mut rng).unwrap();
        assert_eq!(row.len(), params.width());
        for p in &row {
            let lifted = CrtPolynomial::from_fhe_polynomial(p, params.crt()).unwrap();
            assert!(lifted.max_bits() <= 5);
        }
    }
}
