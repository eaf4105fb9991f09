//! Per-value encryption for the secret cache
//!
//! Cached values are encrypted with AES-256-CBC. The cipher key is the
//! SHA-256 digest of the configured key material, and every value gets a
//! fresh random 16-byte IV. The stored form is `hex(iv) + hex(ciphertext)`,
//! so the first 32 hex characters always hold the IV. There is no
//! authentication tag; corruption or mismatched key material surfaces as a
//! padding or UTF-8 decode failure.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::{SecretEnvError, SecretEnvResult};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const IV_SIZE: usize = 16;
const IV_HEX_LEN: usize = IV_SIZE * 2;

/// Symmetric cipher for cache values.
///
/// Constructed without key material, it passes values through unchanged so
/// the cache file stays plaintext.
#[derive(Clone)]
pub struct ValueCipher {
    key: Option<[u8; 32]>,
}

impl ValueCipher {
    /// Create a cipher from raw key material, or an identity cipher if none
    pub fn new(key_material: Option<&str>) -> Self {
        let key = key_material.map(|material| Sha256::digest(material.as_bytes()).into());
        Self { key }
    }

    /// Encrypt a value into its stored form
    pub fn encrypt(&self, plaintext: &str) -> String {
        let Some(key) = &self.key else {
            return plaintext.to_string();
        };

        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let ciphertext = Aes256CbcEnc::new(key.into(), (&iv).into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        // IV is prepended so decrypt can split it back out
        format!("{}{}", hex::encode(iv), hex::encode(ciphertext))
    }

    /// Decrypt a stored value back to plaintext.
    ///
    /// Fails on malformed hex, bad padding (typically wrong key material),
    /// or non-UTF-8 plaintext.
    pub fn decrypt(&self, stored: &str) -> SecretEnvResult<String> {
        let Some(key) = &self.key else {
            return Ok(stored.to_string());
        };

        if stored.len() < IV_HEX_LEN {
            return Err(SecretEnvError::Decrypt(
                "stored value shorter than IV prefix".to_string(),
            ));
        }

        let (iv_hex, ct_hex) = stored.split_at(IV_HEX_LEN);
        let iv = hex::decode(iv_hex)
            .map_err(|e| SecretEnvError::Decrypt(format!("invalid IV hex: {e}")))?;
        let ciphertext = hex::decode(ct_hex)
            .map_err(|e| SecretEnvError::Decrypt(format!("invalid ciphertext hex: {e}")))?;

        let iv: [u8; IV_SIZE] = iv
            .try_into()
            .map_err(|_| SecretEnvError::Decrypt("IV is not 16 bytes".to_string()))?;

        let plaintext = Aes256CbcDec::new(key.into(), (&iv).into())
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| SecretEnvError::Decrypt("bad padding, likely wrong key material".to_string()))?;

        String::from_utf8(plaintext)
            .map_err(|e| SecretEnvError::Decrypt(format!("invalid UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let cipher = ValueCipher::new(Some("k1"));
        let stored = cipher.encrypt("3000");
        assert_ne!(stored, "3000");
        assert_eq!(cipher.decrypt(&stored).unwrap(), "3000");
    }

    #[test]
    fn round_trip_multibyte_utf8() {
        let cipher = ValueCipher::new(Some("k1"));
        let stored = cipher.encrypt("Việt nam");
        assert_eq!(cipher.decrypt(&stored).unwrap(), "Việt nam");
    }

    #[test]
    fn round_trip_coerced_scalars() {
        let cipher = ValueCipher::new(Some("material"));
        for value in ["true", "false", "42", "-3.25", ""] {
            let stored = cipher.encrypt(value);
            assert_eq!(cipher.decrypt(&stored).unwrap(), value);
        }
    }

    #[test]
    fn identity_without_key_material() {
        let cipher = ValueCipher::new(None);
        assert_eq!(cipher.encrypt("plain"), "plain");
        assert_eq!(cipher.decrypt("plain").unwrap(), "plain");
    }

    #[test]
    fn stored_form_is_hex_with_iv_prefix() {
        let cipher = ValueCipher::new(Some("k1"));
        let stored = cipher.encrypt("value");
        assert!(stored.len() > IV_HEX_LEN);
        assert!(stored.chars().all(|c| c.is_ascii_hexdigit()));
        // One AES block of padded ciphertext after the IV
        assert_eq!((stored.len() - IV_HEX_LEN) % 32, 0);
    }

    #[test]
    fn fresh_iv_per_value() {
        let cipher = ValueCipher::new(Some("k1"));
        let a = cipher.encrypt("same");
        let b = cipher.encrypt("same");
        assert_ne!(a, b);
        assert_ne!(&a[..IV_HEX_LEN], &b[..IV_HEX_LEN]);
    }

    #[test]
    fn wrong_key_material_never_reproduces_plaintext() {
        let cipher = ValueCipher::new(Some("k1"));
        let other = ValueCipher::new(Some("k2"));
        let stored = cipher.encrypt("PORT=3000 secret");

        match other.decrypt(&stored) {
            Err(SecretEnvError::Decrypt(_)) => {}
            Ok(decrypted) => assert_ne!(decrypted, "PORT=3000 secret"),
            Err(e) => panic!("unexpected error kind: {e}"),
        }
    }

    #[test]
    fn truncated_stored_value_errors() {
        let cipher = ValueCipher::new(Some("k1"));
        assert!(matches!(
            cipher.decrypt("deadbeef"),
            Err(SecretEnvError::Decrypt(_))
        ));
    }

    #[test]
    fn non_hex_stored_value_errors() {
        let cipher = ValueCipher::new(Some("k1"));
        let bogus = "zz".repeat(32);
        assert!(matches!(
            cipher.decrypt(&bogus),
            Err(SecretEnvError::Decrypt(_))
        ));
    }
}
