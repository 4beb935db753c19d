// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Noise extraction and the zero sponge.
//!
//! A zero sponge is a fresh encryption of zero whose error approximates the error of a
//! given ciphertext divided by 2^scale. Adding `scale_by_bits(sponge, scale)` to that
//! ciphertext cancels the high bits of its noise.

use crate::context::SfdkContext;
use crate::errors::Result;
use crate::features::Feature;
use crate::keys::PublicKeySfdk;
use crate::ring::{dot, gaussian_row, ntt, phase, scaled_message, secret_poly};
use fhe::bfv::{Ciphertext, Plaintext, SecretKey};
use fhe_math::rq::{Poly, Representation};
use fhe_traits::FheDecrypter;
use num_bigint::BigUint;
use num_traits::One;
use sfdk_polynomial::CrtPolynomial;
use tracing::{debug, info};

impl SfdkContext {
    /// Returns a zero encryption carrying the sponge error of `ct` together with the
    /// shift `scale` used to derive it.
    ///
    /// With `is_not_zero` the decrypted message of `ct` is removed first, so only the
    /// noise is captured.
    pub fn get_zero_sponge_encryption(
        &self,
        sk: &SecretKey,
        pk: &PublicKeySfdk,
        ct: &Ciphertext,
        is_not_zero: bool,
    ) -> Result<(Ciphertext, u32)> {
        self.require(Feature::Sfdk)?;
        let params = self.params();
        let crt = params.crt();
        let ctx = crt.ctx();

        let mut b = phase(params, sk, ct)?;
        if is_not_zero {
            let pt = sk.try_decrypt(ct)?;
            b -= &scaled_message(params, &pt)?;
        }

        let noise = CrtPolynomial::from_fhe_polynomial(&b, crt)?;
        let scale = (noise.max_bits() / 2) as u32;
        let error = noise
            .shift_magnitudes_right(scale)
            .to_fhe_polynomial(crt, Representation::Ntt)?;

        let s = secret_poly(params, sk)?;
        let base: Vec<Poly> = pk
            .a_row()
            .iter()
            .map(|a| {
                let mut p = Poly::zero(ctx, Representation::Ntt);
                p -= &(a * &s);
                p
            })
            .collect();
        let u = self.with_rng(|rng| gaussian_row(params, pk.width(), rng))?;

        let c1 = dot(pk.a_row(), &u, ctx);
        let mut c0 = dot(&base, &u, ctx);
        c0 -= &error;

        info!(
            noise_bits = noise.max_bits(),
            scale, is_not_zero, "built zero sponge"
        );
        Ok((Ciphertext::new(vec![c0, c1], params.bfv())?, scale))
    }

    /// Multiplies every component of `ct` by 2^bits.
    pub fn scale_by_bits(&self, ct: &Ciphertext, bits: u32) -> Result<Ciphertext> {
        self.require(Feature::Sfdk)?;
        let factor = self
            .params()
            .crt()
            .constant(&(BigUint::one() << bits), Representation::Ntt)?;
        let c = ct.c.iter().map(|ci| &ntt(ci) * &factor).collect();
        Ok(Ciphertext::new(c, self.params().bfv())?)
    }

    /// The error of `ct` under `sk`: its phase minus ⌊Q·m/t⌋, in power basis.
    ///
    /// `m` is `pt` when given, otherwise the decryption of `ct`.
    pub fn get_decryption_error(
        &self,
        sk: &SecretKey,
        ct: &Ciphertext,
        pt: Option<&Plaintext>,
    ) -> Result<Poly> {
        self.require(Feature::Sfdk)?;
        let params = self.params();
        let message = match pt {
            Some(pt) => scaled_message(params, pt)?,
            None => scaled_message(params, &sk.try_decrypt(ct)?)?,
        };
        let mut error = phase(params, sk, ct)?;
        error -= &message;
        error.change_representation(Representation::PowerBasis);
        Ok(error)
    }

    /// Bit length of the largest centered coefficient of the decryption error.
    pub fn max_noise_bits(&self, sk: &SecretKey, ct: &Ciphertext) -> Result<u64> {
        let error = self.get_decryption_error(sk, ct, None)?;
        let bits = CrtPolynomial::from_fhe_polynomial(&error, self.params().crt())?.max_bits();
        debug!(bits, "measured decryption noise");
        Ok(bits)
    }
}
