// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Base-scheme operations exposed on the context: packing, encryption under the
//! scalar secret, rotations and multiplications.

use crate::context::SfdkContext;
use crate::errors::{Result, SfdkError};
use crate::features::Feature;
use crate::ring::{ntt, plaintext_poly, scaled_message};
use fhe::bfv::{
    Ciphertext, Encoding, EvaluationKeyBuilder, Plaintext, RelinearizationKey, SecretKey,
};
use fhe_traits::{FheDecoder, FheDecrypter, FheEncoder, FheEncrypter};
use sfdk_polynomial::center_u64;
use tracing::{debug, trace};

impl SfdkContext {
    /// Packs `values` into the SIMD slots; negative values are taken modulo t.
    pub fn make_packed_plaintext(&self, values: &[i64]) -> Result<Plaintext> {
        let slots = self.params().degree();
        if values.len() > slots {
            return Err(SfdkError::TooManyValues {
                count: values.len(),
                slots,
            });
        }
        let t = self.params().plaintext_modulus() as i64;
        let reduced: Vec<u64> = values.iter().map(|v| v.rem_euclid(t) as u64).collect();
        Ok(Plaintext::try_encode(
            &reduced,
            Encoding::simd(),
            self.params().bfv(),
        )?)
    }

    /// Slot values of a packed plaintext, centered modulo t.
    pub fn decode_packed(&self, pt: &Plaintext) -> Result<Vec<i64>> {
        let t = self.params().plaintext_modulus();
        let values = Vec::<u64>::try_decode(pt, Encoding::simd())?;
        Ok(values.into_iter().map(|v| center_u64(v, t)).collect())
    }

    /// Base-scheme encryption under the scalar secret key.
    pub fn encrypt_with_secret(&self, sk: &SecretKey, pt: &Plaintext) -> Result<Ciphertext> {
        self.require(Feature::Pke)?;
        self.with_rng(|rng| Ok(sk.try_encrypt(pt, rng)?))
    }

    /// Base-scheme decryption under the scalar secret key.
    pub fn decrypt(&self, sk: &SecretKey, ct: &Ciphertext) -> Result<Plaintext> {
        self.require(Feature::Pke)?;
        Ok(sk.try_decrypt(ct)?)
    }

    pub fn eval_mult_key_gen(&self, sk: &SecretKey) -> Result<()> {
        self.require(Feature::LeveledShe)?;
        let key = self.with_rng(|rng| Ok(RelinearizationKey::new(sk, rng)?))?;
        self.eval_keys_mut()?.relinearization = Some(key);
        debug!("generated relinearization key");
        Ok(())
    }

    /// Generates rotation keys for the signed slot indices in `indices`.
    pub fn eval_at_index_key_gen(&self, sk: &SecretKey, indices: &[i32]) -> Result<()> {
        self.require(Feature::KeySwitch)?;
        for index in indices {
            let shift = self.left_shift(*index);
            if shift == 0 || self.eval_keys()?.rotations.contains_key(&shift) {
                continue;
            }
            let mut builder = EvaluationKeyBuilder::new(sk)?;
            builder.enable_column_rotation(shift)?;
            let key = self.with_rng(|rng| Ok(builder.build(rng)?))?;
            self.eval_keys_mut()?.rotations.insert(shift, key);
            trace!(index, shift, "generated rotation key");
        }
        debug!(count = indices.len(), "rotation keys ready");
        Ok(())
    }

    /// Rotates the slots of every row left by `index` (right when negative).
    pub fn eval_at_index(&self, ct: &Ciphertext, index: i32) -> Result<Ciphertext> {
        self.require(Feature::KeySwitch)?;
        let shift = self.left_shift(index);
        if shift == 0 {
            return Ok(ct.clone());
        }
        let keys = self.eval_keys()?;
        let key = keys
            .rotations
            .get(&shift)
            .ok_or(SfdkError::MissingRotationKey(index))?;
        Ok(key.rotates_columns_by(ct, shift)?)
    }

    pub fn eval_add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(a + b)
    }

    pub fn eval_sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        Ok(a - b)
    }

    /// Product of two ciphertexts, relinearized back to two components.
    pub fn eval_mult(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.require(Feature::LeveledShe)?;
        let keys = self.eval_keys()?;
        let rk = keys
            .relinearization
            .as_ref()
            .ok_or(SfdkError::MissingRelinearizationKey)?;
        let mut product = a * b;
        rk.relinearizes(&mut product)?;
        Ok(product)
    }

    /// `ct - pt`, subtracting ⌊Q·m/t⌋ from the first component.
    pub fn eval_sub_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let delta_m = scaled_message(self.params(), pt)?;
        let mut c: Vec<_> = ct.c.iter().map(ntt).collect();
        c[0] = &c[0] - &delta_m;
        Ok(Ciphertext::new(c, self.params().bfv())?)
    }

    /// `ct · pt`, multiplying every component by the centered plaintext polynomial.
    pub fn eval_mult_plain(&self, ct: &Ciphertext, pt: &Plaintext) -> Result<Ciphertext> {
        let m = plaintext_poly(self.params(), pt)?;
        let c = ct.c.iter().map(|ci| &ntt(ci) * &m).collect();
        Ok(Ciphertext::new(c, self.params().bfv())?)
    }
}
