// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::create_shared_rng_from_u64;
use anyhow::{Context, Result};
use fhe::bfv::Ciphertext;
use sfdk::{KeyPairSfdk, SfdkContext, SfdkPreset};

/// A context over `preset` with every feature enabled and a seeded rng.
pub fn ready_context(preset: SfdkPreset, seed: u64) -> Result<SfdkContext> {
    SfdkContext::from_preset(preset, create_shared_rng_from_u64(seed))
        .with_context(|| format!("building context for {}", preset.name()))
}

/// A context with a fresh key pair.
pub fn context_with_keys(preset: SfdkPreset, seed: u64) -> Result<(SfdkContext, KeyPairSfdk)> {
    let cc = ready_context(preset, seed)?;
    let keys = cc.key_gen_sfdk().context("generating SFDK keys")?;
    Ok((cc, keys))
}

/// A context with keys and the evaluation keys needed for sets of up to `max_size`.
pub fn psm_context(seed: u64, max_size: usize) -> Result<(SfdkContext, KeyPairSfdk)> {
    let (cc, keys) = context_with_keys(SfdkPreset::InsecurePsm2048, seed)?;
    cc.prepare_psm(keys.secret_key()?, max_size)
        .context("preparing membership evaluation keys")?;
    Ok((cc, keys))
}

/// Encrypts `values` packed into the first slots under the SFDK public key.
pub fn encrypt_packed(cc: &SfdkContext, keys: &KeyPairSfdk, values: &[i64]) -> Result<Ciphertext> {
    let pt = cc.make_packed_plaintext(values)?;
    Ok(cc.encrypt(&pt, keys.public_key()?)?)
}

/// Opens `ct` with a one-time key derived for it and returns the slot values.
pub fn open_packed(cc: &SfdkContext, keys: &KeyPairSfdk, ct: &Ciphertext) -> Result<Vec<i64>> {
    let pk = keys.public_key()?;
    let otk = cc.gen_dec_key_for(ct, keys.cipher_key_gen()?, pk)?;
    let (pt, _) = cc.decrypt_sfdk(ct, &otk, pk)?;
    Ok(cc.decode_packed(&pt)?)
}
