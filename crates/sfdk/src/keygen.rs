// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::context::SfdkContext;
use crate::errors::{Result, SfdkError};
use crate::features::Feature;
use crate::keys::{KeyCipherGenKey, KeyPairSfdk, KeyTag, PublicKeySfdk};
use crate::parameters::{SecretKeyDist, SfdkParameters};
use crate::ring::{gaussian_row, secret_poly};
use fhe::bfv::SecretKey;
use fhe_math::rq::{Poly, Representation};
use rand::seq::index::sample;
use rand::Rng;
use sfdk_trapdoor::DiscreteGaussian;
use tracing::info;
use zeroize::Zeroizing;

/// Hamming weight of sparse secrets.
pub const SPARSE_HAMMING_WEIGHT: usize = 192;

impl SfdkContext {
    /// Generates a trapdoor-backed key pair with a secret drawn from the configured
    /// distribution.
    pub fn key_gen_sfdk(&self) -> Result<KeyPairSfdk> {
        self.key_gen_internal(false)
    }

    /// Like [`SfdkContext::key_gen_sfdk`], with a sparse ternary secret.
    pub fn sparse_key_gen_sfdk(&self) -> Result<KeyPairSfdk> {
        self.key_gen_internal(true)
    }

    fn key_gen_internal(&self, sparse: bool) -> Result<KeyPairSfdk> {
        self.require(Feature::Pke)?;
        self.require(Feature::Sfdk)?;
        let params = self.params();

        self.with_rng(|rng| {
            let trapdoor = params.sampler().trapdoor_gen(rng)?;
            if trapdoor.public.len() != params.width() {
                return Err(SfdkError::WidthMismatch {
                    expected: params.width(),
                    actual: trapdoor.public.len(),
                });
            }

            let coefficients = if sparse {
                sample_sparse_ternary(params.degree(), SPARSE_HAMMING_WEIGHT, rng)
            } else {
                sample_secret(params, rng)?
            };
            let sk = SecretKey::new(coefficients.to_vec(), params.bfv());
            let s = secret_poly(params, &sk)?;

            let a_row = trapdoor.public;
            let e = gaussian_row(params, a_row.len(), rng)?;
            let b_row: Vec<Poly> = a_row
                .iter()
                .zip(e.iter())
                .map(|(a, e)| {
                    let mut b = Poly::zero(params.crt().ctx(), Representation::Ntt);
                    b -= e;
                    b -= &(a * &s);
                    b
                })
                .collect();

            let key_tag = KeyTag::random(rng);
            info!(
                width = a_row.len(),
                base = params.base(),
                sparse,
                key_tag = %key_tag,
                "generated SFDK key pair"
            );
            Ok(KeyPairSfdk::new(
                PublicKeySfdk::new(b_row, a_row, params.base(), key_tag.clone()),
                sk,
                KeyCipherGenKey::new(trapdoor.secret, params.base(), key_tag),
            ))
        })
    }
}

fn sample_secret<R: Rng + ?Sized>(
    params: &SfdkParameters,
    rng: &mut R,
) -> Result<Zeroizing<Vec<i64>>> {
    let n = params.degree();
    Ok(Zeroizing::new(match params.secret_key_dist() {
        SecretKeyDist::Gaussian => DiscreteGaussian::new(params.sigma())?.sample_vec(n, rng),
        SecretKeyDist::UniformTernary => (0..n).map(|_| rng.gen_range(-1..=1)).collect(),
    }))
}

/// Ternary vector with exactly `min(weight, n/2)` non-zero entries.
pub fn sample_sparse_ternary<R: Rng + ?Sized>(
    n: usize,
    weight: usize,
    rng: &mut R,
) -> Zeroizing<Vec<i64>> {
    let weight = weight.min(n / 2);
    let mut coefficients = Zeroizing::new(vec![0i64; n]);
    for i in sample(rng, n, weight) {
        coefficients[i] = if rng.gen_bool(0.5) { 1 } else { -1 };
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn sparse_secret_has_the_requested_weight() {
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let s = sample_sparse_ternary(1024, SPARSE_HAMMING_WEIGHT, &mut rng);
        assert_eq!(s.iter().filter(|c| **c != 0).count(), SPARSE_HAMMING_WEIGHT);
        assert!(s.iter().all(|c| (-1..=1).contains(c)));
    }

    #[test]
    fn sparse_weight_is_capped_at_half_the_degree() {
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let s = sample_sparse_ternary(64, SPARSE_HAMMING_WEIGHT, &mut rng);
        assert_eq!(s.iter().filter(|c| **c != 0).count(), 32);
    }
}
