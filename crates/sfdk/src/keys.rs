// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use crate::envelope::Envelope;
use crate::errors::{Result, SfdkError};
use crate::parameters::SfdkParameters;
use fhe::bfv::SecretKey;
use fhe_math::rq::Poly;
use fhe_traits::{DeserializeWithContext, Serialize as FheSerialize};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sfdk_trapdoor::TrapdoorSecret;
use std::fmt;
use zeroize::Zeroizing;

const PUBLIC_KEY_NAME: &str = "PublicKeySFDK";
const CIPHER_KEY_GEN_NAME: &str = "KeyCipherGenKey";
const KEY_CIPHER_NAME: &str = "KeyCipher";
const SERIALIZED_VERSION: u32 = 1;

/// Identifies the key pair a key object belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyTag(String);

impl KeyTag {
    pub fn random<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; 16];
        rng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fails unless both tags are equal.
    pub fn check(&self, other: &KeyTag) -> Result<()> {
        if self == other {
            Ok(())
        } else {
            Err(SfdkError::KeyTagMismatch {
                expected: self.0.clone(),
                actual: other.0.clone(),
            })
        }
    }
}

impl fmt::Display for KeyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public key: the two wide rows `b = -e - A·s` and `a = A`.
#[derive(Debug, Clone, PartialEq)]
pub struct PublicKeySfdk {
    b_row: Vec<Poly>,
    a_row: Vec<Poly>,
    base: u64,
    key_tag: KeyTag,
}

#[derive(Serialize, Deserialize)]
struct PublicKeyData {
    b_row: Vec<Vec<u8>>,
    a_row: Vec<Vec<u8>>,
    base: u64,
    key_tag: KeyTag,
}

impl PublicKeySfdk {
    pub(crate) fn new(b_row: Vec<Poly>, a_row: Vec<Poly>, base: u64, key_tag: KeyTag) -> Self {
        Self {
            b_row,
            a_row,
            base,
            key_tag,
        }
    }

    pub fn b_row(&self) -> &[Poly] {
        &self.b_row
    }

    pub fn a_row(&self) -> &[Poly] {
        &self.a_row
    }

    /// Width k of both rows.
    pub fn width(&self) -> usize {
        self.a_row.len()
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn key_tag(&self) -> &KeyTag {
        &self.key_tag
    }

    /// Number of RNS limbs of the key's ring.
    pub fn limbs(&self) -> usize {
        self.b_row
            .first()
            .map(|p| p.ctx().moduli().len())
            .unwrap_or_default()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let data = PublicKeyData {
            b_row: self.b_row.iter().map(|p| p.to_bytes()).collect(),
            a_row: self.a_row.iter().map(|p| p.to_bytes()).collect(),
            base: self.base,
            key_tag: self.key_tag.clone(),
        };
        Envelope::seal(PUBLIC_KEY_NAME, SERIALIZED_VERSION, &data)
    }

    pub fn from_bytes(bytes: &[u8], params: &SfdkParameters) -> Result<Self> {
        let data: PublicKeyData = Envelope::open(PUBLIC_KEY_NAME, SERIALIZED_VERSION, bytes)?;
        Ok(Self {
            b_row: polys_from_bytes(&data.b_row, params)?,
            a_row: polys_from_bytes(&data.a_row, params)?,
            base: data.base,
            key_tag: data.key_tag,
        })
    }
}

/// Trapdoor secret that derives one-time decryption keys for a public key.
///
/// Not `Clone`. Leaves the process only through [`KeyCipherGenKey::export_secret`].
#[derive(Debug)]
pub struct KeyCipherGenKey {
    secret: TrapdoorSecret,
    base: u64,
    key_tag: KeyTag,
}

#[derive(Serialize, Deserialize)]
struct KeyCipherGenKeyData {
    r: Vec<Vec<i64>>,
    e: Vec<Vec<i64>>,
    base: u64,
    key_tag: KeyTag,
}

impl KeyCipherGenKey {
    pub(crate) fn new(secret: TrapdoorSecret, base: u64, key_tag: KeyTag) -> Self {
        Self {
            secret,
            base,
            key_tag,
        }
    }

    pub fn secret(&self) -> &TrapdoorSecret {
        &self.secret
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn key_tag(&self) -> &KeyTag {
        &self.key_tag
    }

    /// Serializes the trapdoor secret. Only the key owner should ever call this.
    pub fn export_secret(&self) -> Result<Zeroizing<Vec<u8>>> {
        let data = Zeroizing::new(KeyCipherGenKeyData {
            r: self.secret.r().iter().map(|v| v.to_vec()).collect(),
            e: self.secret.e().iter().map(|v| v.to_vec()).collect(),
            base: self.base,
            key_tag: self.key_tag.clone(),
        });
        Ok(Zeroizing::new(Envelope::seal(
            CIPHER_KEY_GEN_NAME,
            SERIALIZED_VERSION,
            &*data,
        )?))
    }

    pub fn import_secret(bytes: &[u8]) -> Result<Self> {
        let data: KeyCipherGenKeyData =
            Envelope::open(CIPHER_KEY_GEN_NAME, SERIALIZED_VERSION, bytes)?;
        let KeyCipherGenKeyData { r, e, base, key_tag } = data;
        Ok(Self {
            secret: TrapdoorSecret::new(r, e)?,
            base,
            key_tag,
        })
    }
}

impl zeroize::Zeroize for KeyCipherGenKeyData {
    fn zeroize(&mut self) {
        self.r.iter_mut().for_each(|v| v.zeroize());
        self.e.iter_mut().for_each(|v| v.zeroize());
    }
}

/// One-time decryption key: a short preimage `zHat` with `A·zHat = c1` for one ciphertext.
///
/// Decrypting any other ciphertext with it reveals information about the public key's
/// error and must be avoided.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCipher {
    z_hat: Vec<Poly>,
    key_tag: KeyTag,
}

#[derive(Serialize, Deserialize)]
struct KeyCipherData {
    z_hat: Vec<Vec<u8>>,
    key_tag: KeyTag,
}

impl KeyCipher {
    pub(crate) fn new(z_hat: Vec<Poly>, key_tag: KeyTag) -> Self {
        Self { z_hat, key_tag }
    }

    pub fn z_hat(&self) -> &[Poly] {
        &self.z_hat
    }

    pub fn key_tag(&self) -> &KeyTag {
        &self.key_tag
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let data = KeyCipherData {
            z_hat: self.z_hat.iter().map(|p| p.to_bytes()).collect(),
            key_tag: self.key_tag.clone(),
        };
        Envelope::seal(KEY_CIPHER_NAME, SERIALIZED_VERSION, &data)
    }

    pub fn from_bytes(bytes: &[u8], params: &SfdkParameters) -> Result<Self> {
        let data: KeyCipherData = Envelope::open(KEY_CIPHER_NAME, SERIALIZED_VERSION, bytes)?;
        Ok(Self {
            z_hat: polys_from_bytes(&data.z_hat, params)?,
            key_tag: data.key_tag,
        })
    }
}

/// The three keys of a party. Each is optional while the pair is being assembled.
#[derive(Default)]
pub struct KeyPairSfdk {
    pub public_key: Option<PublicKeySfdk>,
    pub secret_key: Option<SecretKey>,
    pub cipher_key_gen: Option<KeyCipherGenKey>,
}

impl KeyPairSfdk {
    pub fn new(
        public_key: PublicKeySfdk,
        secret_key: SecretKey,
        cipher_key_gen: KeyCipherGenKey,
    ) -> Self {
        Self {
            public_key: Some(public_key),
            secret_key: Some(secret_key),
            cipher_key_gen: Some(cipher_key_gen),
        }
    }

    /// True when all three keys are present.
    pub fn good(&self) -> bool {
        self.public_key.is_some() && self.secret_key.is_some() && self.cipher_key_gen.is_some()
    }

    pub fn public_key(&self) -> Result<&PublicKeySfdk> {
        self.public_key
            .as_ref()
            .ok_or(SfdkError::IncompleteKeyPair("public key"))
    }

    pub fn secret_key(&self) -> Result<&SecretKey> {
        self.secret_key
            .as_ref()
            .ok_or(SfdkError::IncompleteKeyPair("secret key"))
    }

    pub fn cipher_key_gen(&self) -> Result<&KeyCipherGenKey> {
        self.cipher_key_gen
            .as_ref()
            .ok_or(SfdkError::IncompleteKeyPair("decryption key generator"))
    }
}

impl fmt::Debug for KeyPairSfdk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPairSfdk")
            .field(
                "key_tag",
                &self.public_key.as_ref().map(|pk| pk.key_tag().as_str()),
            )
            .field("secret_key", &self.secret_key.is_some())
            .field("cipher_key_gen", &self.cipher_key_gen.is_some())
            .finish()
    }
}

fn polys_from_bytes(bytes: &[Vec<u8>], params: &SfdkParameters) -> Result<Vec<Poly>> {
    let ctx = params.bfv().ctx_at_level(0)?;
    bytes
        .iter()
        .map(|b| Ok(Poly::from_bytes(b, ctx)?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn key_tags_are_random_hex() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let a = KeyTag::random(&mut rng);
        let b = KeyTag::random(&mut rng);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(a.check(&a.clone()).is_ok());
        assert!(matches!(
            a.check(&b),
            Err(SfdkError::KeyTagMismatch { .. })
        ));
    }

    #[test]
    fn empty_pair_is_not_good() {
        let pair = KeyPairSfdk::default();
        assert!(!pair.good());
        assert!(matches!(
            pair.public_key(),
            Err(SfdkError::IncompleteKeyPair("public key"))
        ));
        assert!(pair.secret_key().is_err());
        assert!(pair.cipher_key_gen().is_err());
    }

    #[test]
    fn exported_secret_round_trips() {
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let tag = KeyTag::random(&mut rng);
        let secret = TrapdoorSecret::new(vec![vec![1, -2]], vec![vec![3, 0]]).unwrap();
        let key = KeyCipherGenKey::new(secret, 1024, tag.clone());

        let bytes = key.export_secret().unwrap();
        let restored = KeyCipherGenKey::import_secret(&bytes).unwrap();
        assert_eq!(restored.key_tag(), &tag);
        assert_eq!(restored.base(), 1024);
        assert_eq!(restored.secret().r(), vec![&[1i64, -2][..]]);
        assert_eq!(restored.secret().e(), vec![&[3i64, 0][..]]);
    }
}
