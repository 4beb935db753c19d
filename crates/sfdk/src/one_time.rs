// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Encryption under the wide public key and decryption with one-time keys.

use crate::context::SfdkContext;
use crate::errors::{Result, SfdkError};
use crate::features::Feature;
use crate::keys::{KeyCipher, KeyCipherGenKey, PublicKeySfdk};
use crate::parameters::EncryptionTechnique;
use crate::ring::{dot, gaussian_poly, gaussian_row, ntt, scaled_message};
use fhe::bfv::{Ciphertext, Plaintext, SecretKey};
use fhe_math::rq::{Poly, Representation};
use fhe_traits::FheDecrypter;
use sfdk_trapdoor::DiscreteGaussian;
use tracing::{debug, info};

/// Outcome of a decryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecryptResult {
    pub is_valid: bool,
    /// Number of plaintext coefficients recovered.
    pub message_length: usize,
}

impl SfdkContext {
    /// Encrypts `pt` under the wide public key:
    /// `c0 = <b, u> + ns·e1 + ⌊Q·m/t⌋`, `c1 = <a, u> + ns·e2`.
    pub fn encrypt(&self, pt: &Plaintext, pk: &PublicKeySfdk) -> Result<Ciphertext> {
        self.require(Feature::Pke)?;
        let params = self.params();
        let technique = params.encryption_technique();
        if technique != EncryptionTechnique::Standard {
            return Err(SfdkError::UnsupportedEncryptionTechnique(
                technique.to_string(),
            ));
        }
        let limbs = params.bfv().ctx_at_level(pt.level())?.moduli().len();
        if limbs != pk.limbs() {
            return Err(SfdkError::LimbMismatch {
                plaintext: limbs,
                key: pk.limbs(),
            });
        }
        self.check_width(pk)?;

        let delta_m = scaled_message(params, pt)?;
        let noise_scale = params.noise_scale() as i64;
        let ctx = params.crt().ctx();

        let (u, e1, e2) = self.with_rng(|rng| {
            let gaussian = DiscreteGaussian::new(params.sigma())?;
            let u = gaussian_row(params, pk.width(), rng)?;
            let e1 = gaussian_poly(params, &gaussian, noise_scale, rng)?;
            let e2 = gaussian_poly(params, &gaussian, noise_scale, rng)?;
            Ok((u, e1, e2))
        })?;

        let mut c0 = dot(pk.b_row(), &u, ctx);
        c0 += &e1;
        c0 += &delta_m;
        let mut c1 = dot(pk.a_row(), &u, ctx);
        c1 += &e2;

        debug!(width = pk.width(), key_tag = %pk.key_tag(), "encrypted under SFDK key");
        Ok(Ciphertext::new(vec![c0, c1], params.bfv())?)
    }

    /// Derives the one-time decryption key of `ct`: a short `zHat` with `A·zHat = c1`.
    pub fn gen_dec_key_for(
        &self,
        ct: &Ciphertext,
        key_gen: &KeyCipherGenKey,
        pk: &PublicKeySfdk,
    ) -> Result<KeyCipher> {
        self.require(Feature::Sfdk)?;
        check_components(ct)?;
        key_gen.key_tag().check(pk.key_tag())?;
        self.check_width(pk)?;

        let syndrome = ntt(&ct.c[1]);
        let sampler = self.params().sampler();
        let z_hat = self.with_rng(|rng| {
            Ok(sampler.gauss_samp(pk.a_row(), key_gen.secret(), &syndrome, rng)?)
        })?;

        info!(
            width = z_hat.len(),
            digits = sampler.digits(),
            key_tag = %pk.key_tag(),
            "derived one-time decryption key"
        );
        Ok(KeyCipher::new(z_hat, pk.key_tag().clone()))
    }

    /// Opens `ct` with its one-time key: `r = c0 - <b, zHat>` is scaled by t/Q and rounded.
    pub fn decrypt_sfdk(
        &self,
        ct: &Ciphertext,
        key: &KeyCipher,
        pk: &PublicKeySfdk,
    ) -> Result<(Plaintext, DecryptResult)> {
        self.require(Feature::Sfdk)?;
        check_components(ct)?;
        key.key_tag().check(pk.key_tag())?;
        if key.z_hat().len() != pk.width() {
            return Err(SfdkError::WidthMismatch {
                expected: pk.width(),
                actual: key.z_hat().len(),
            });
        }

        let params = self.params();
        let ctx = params.crt().ctx();
        let mut r = ntt(&ct.c[0]);
        r -= &dot(pk.b_row(), key.z_hat(), ctx);

        // With a zero secret, decryption of (r, 0) is exactly scale-and-round of r.
        let zero_key = SecretKey::new(vec![0; params.degree()], params.bfv());
        let phase = Ciphertext::new(
            vec![r, Poly::zero(ctx, Representation::Ntt)],
            params.bfv(),
        )?;
        let pt = zero_key.try_decrypt(&phase)?;

        let result = DecryptResult {
            is_valid: true,
            message_length: pt.value.len(),
        };
        debug!(key_tag = %pk.key_tag(), "decrypted with one-time key");
        Ok((pt, result))
    }

    fn check_width(&self, pk: &PublicKeySfdk) -> Result<()> {
        let expected = self.params().width();
        if pk.width() != expected || pk.b_row().len() != expected {
            return Err(SfdkError::WidthMismatch {
                expected,
                actual: pk.width(),
            });
        }
        Ok(())
    }
}

fn check_components(ct: &Ciphertext) -> Result<()> {
    if ct.c.len() != 2 {
        return Err(SfdkError::ComponentCount {
            expected: 2,
            actual: ct.c.len(),
        });
    }
    Ok(())
}
