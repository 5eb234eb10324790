//! Cryptographic primitives for secret envelopes
//!
//! This module provides the AES-256-GCM master key, the `iv:tag:ciphertext`
//! envelope format and the cipher that moves secrets in and out of it.

use std::fmt;
use std::str::FromStr;

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, VaultError};

/// AES-256 key size in bytes (256 bits)
pub const AES_256_KEY_SIZE: usize = 32;

/// AES-GCM nonce size in bytes (96 bits)
pub const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size in bytes (128 bits)
pub const TAG_SIZE: usize = 16;

/// Separator between the hex segments of a serialized envelope
pub const ENVELOPE_SEPARATOR: char = ':';

/// The vault master key, zeroized on drop
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterKey {
    bytes: [u8; AES_256_KEY_SIZE],
}

impl MasterKey {
    /// Import a master key from its hex configuration value.
    ///
    /// Surrounding whitespace is ignored. Anything that does not decode to
    /// exactly 32 bytes is a configuration error.
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let trimmed = key_hex.trim();
        if trimmed.is_empty() {
            return Err(VaultError::Configuration("Master key is empty".into()));
        }

        let decoded = Zeroizing::new(hex::decode(trimmed).map_err(|e| {
            VaultError::Configuration(format!("Master key is not valid hex: {}", e))
        })?);

        if decoded.len() != AES_256_KEY_SIZE {
            return Err(VaultError::Configuration(format!(
                "Master key must decode to exactly {} bytes, got {}",
                AES_256_KEY_SIZE,
                decoded.len()
            )));
        }

        let mut bytes = [0u8; AES_256_KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        Ok(Self { bytes })
    }

    /// Generate a new random AES-256 key
    pub fn generate() -> Self {
        let mut bytes = [0u8; AES_256_KEY_SIZE];
        OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Hex form suitable for the master key configuration value
    pub fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(&self.bytes))
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.bytes))
    }
}

impl fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterKey([REDACTED])")
    }
}

/// One encrypted secret: random IV, GCM tag and ciphertext.
///
/// The wire form is `<iv_hex>:<tag_hex>:<ciphertext_hex>` in lowercase hex.
/// The segment order is part of the stored format and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Envelope {
    iv: [u8; NONCE_SIZE],
    tag: [u8; TAG_SIZE],
    ciphertext: Vec<u8>,
}

impl Envelope {
    pub fn iv(&self) -> &[u8; NONCE_SIZE] {
        &self.iv
    }

    pub fn tag(&self) -> &[u8; TAG_SIZE] {
        &self.tag
    }

    pub fn ciphertext(&self) -> &[u8] {
        &self.ciphertext
    }

    /// Length of the wire string for a plaintext of `plaintext_len` UTF-8 bytes
    pub const fn wire_len(plaintext_len: usize) -> usize {
        2 * NONCE_SIZE + 1 + 2 * TAG_SIZE + 1 + 2 * plaintext_len
    }

    fn decode_fixed<const N: usize>(segment: &str, name: &str) -> Result<[u8; N]> {
        let bytes = hex::decode(segment).map_err(|e| {
            VaultError::MalformedEnvelope(format!("{} segment is not valid hex: {}", name, e))
        })?;

        <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
            VaultError::MalformedEnvelope(format!(
                "{} must be {} bytes, got {}",
                name,
                N,
                bytes.len()
            ))
        })
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{sep}{}{sep}{}",
            hex::encode(self.iv),
            hex::encode(self.tag),
            hex::encode(&self.ciphertext),
            sep = ENVELOPE_SEPARATOR
        )
    }
}

impl FromStr for Envelope {
    type Err = VaultError;

    fn from_str(s: &str) -> Result<Self> {
        let segments: Vec<&str> = s.split(ENVELOPE_SEPARATOR).collect();
        let [iv_hex, tag_hex, ciphertext_hex] = segments.as_slice() else {
            return Err(VaultError::MalformedEnvelope(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        };

        let iv = Self::decode_fixed::<NONCE_SIZE>(iv_hex, "iv")?;
        let tag = Self::decode_fixed::<TAG_SIZE>(tag_hex, "tag")?;
        let ciphertext = hex::decode(ciphertext_hex).map_err(|e| {
            VaultError::MalformedEnvelope(format!("ciphertext segment is not valid hex: {}", e))
        })?;

        Ok(Self { iv, tag, ciphertext })
    }
}

impl TryFrom<String> for Envelope {
    type Error = VaultError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Envelope> for String {
    fn from(envelope: Envelope) -> Self {
        envelope.to_string()
    }
}

/// AES-256-GCM envelope cipher
pub struct EnvelopeCipher;

impl EnvelopeCipher {
    /// Encrypt a secret under the master key with a fresh random IV
    pub fn encrypt(key: &MasterKey, plaintext: &str) -> Result<Envelope> {
        Self::seal(key, plaintext.as_bytes())
    }

    /// Parse and decrypt a serialized envelope
    pub fn decrypt(key: &MasterKey, envelope: &str) -> Result<String> {
        let envelope: Envelope = envelope.parse()?;
        Self::decrypt_envelope(key, &envelope)
    }

    /// Decrypt an already parsed envelope
    pub fn decrypt_envelope(key: &MasterKey, envelope: &Envelope) -> Result<String> {
        // The primitive expects ciphertext || tag
        let mut sealed = Vec::with_capacity(envelope.ciphertext.len() + TAG_SIZE);
        sealed.extend_from_slice(&envelope.ciphertext);
        sealed.extend_from_slice(&envelope.tag);

        let plaintext = key
            .cipher()
            .decrypt(Nonce::from_slice(&envelope.iv), sealed.as_slice())
            .map_err(|_| VaultError::Authentication)?;
        let plaintext = Zeroizing::new(plaintext);

        Ok(std::str::from_utf8(&plaintext)?.to_owned())
    }

    pub(crate) fn seal(key: &MasterKey, plaintext: &[u8]) -> Result<Envelope> {
        let mut iv = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut iv);

        let mut sealed = key
            .cipher()
            .encrypt(Nonce::from_slice(&iv), plaintext)
            .map_err(|e| VaultError::Crypto(format!("Encryption error: {}", e)))?;

        if sealed.len() < TAG_SIZE {
            return Err(VaultError::Crypto("Cipher output shorter than tag".into()));
        }

        // Detach the trailing tag
        let tag_bytes = sealed.split_off(sealed.len() - TAG_SIZE);
        let mut tag = [0u8; TAG_SIZE];
        tag.copy_from_slice(&tag_bytes);

        Ok(Envelope { iv, tag, ciphertext: sealed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> MasterKey {
        MasterKey::from_hex(&"42".repeat(AES_256_KEY_SIZE)).unwrap()
    }

    #[test]
    fn test_encrypt_decrypt() {
        let key = test_key();
        let envelope = EnvelopeCipher::encrypt(&key, "hunter2").unwrap();
        let decrypted = EnvelopeCipher::decrypt(&key, &envelope.to_string()).unwrap();
        assert_eq!(decrypted, "hunter2");
    }

    #[test]
    fn test_encrypt_decrypt_empty_and_multibyte() {
        let key = test_key();
        for plaintext in ["", "pässwörd", "密码🔐", "line\nbreak:colon"] {
            let wire = EnvelopeCipher::encrypt(&key, plaintext).unwrap().to_string();
            assert_eq!(EnvelopeCipher::decrypt(&key, &wire).unwrap(), plaintext);
        }
    }

    #[test]
    fn test_same_plaintext_yields_different_envelopes() {
        let key = test_key();
        let first = EnvelopeCipher::encrypt(&key, "same").unwrap();
        let second = EnvelopeCipher::encrypt(&key, "same").unwrap();

        assert_ne!(first.iv(), second.iv());
        assert_ne!(first.to_string(), second.to_string());
        assert_eq!(EnvelopeCipher::decrypt_envelope(&key, &first).unwrap(), "same");
        assert_eq!(EnvelopeCipher::decrypt_envelope(&key, &second).unwrap(), "same");
    }

    #[test]
    fn test_wire_format() {
        let key = test_key();
        let plaintext = "é-secret";
        let wire = EnvelopeCipher::encrypt(&key, plaintext).unwrap().to_string();
        let segments: Vec<&str> = wire.split(':').collect();

        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].len(), 24);
        assert_eq!(segments[1].len(), 32);
        assert_eq!(segments[2].len(), 2 * plaintext.len());
        assert_eq!(wire.len(), Envelope::wire_len(plaintext.len()));
        assert!(wire.chars().all(|c| c == ':' || c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn test_known_answer_vectors() {
        let key = MasterKey::from_hex(&"00".repeat(AES_256_KEY_SIZE)).unwrap();
        let zero_iv = "00".repeat(NONCE_SIZE);

        // AES-256-GCM, zero key and IV, empty plaintext
        let empty = format!("{}:530f8afbc74536b9a963b4f1c4cb738b:", zero_iv);
        assert_eq!(EnvelopeCipher::decrypt(&key, &empty).unwrap(), "");

        // Same key and IV, sixteen zero bytes
        let block = format!(
            "{}:d0d1c8a799996bf0265b98b5d48ab919:cea7403d4d606b6e074ec5d3baf39d18",
            zero_iv
        );
        assert_eq!(EnvelopeCipher::decrypt(&key, &block).unwrap(), "\0".repeat(16));
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let key = test_key();
        let wire = EnvelopeCipher::encrypt(&key, "upper").unwrap().to_string().to_uppercase();
        assert_eq!(EnvelopeCipher::decrypt(&key, &wire).unwrap(), "upper");
    }

    #[test]
    fn test_tampered_tag_fails_authentication() {
        let key = test_key();
        let mut envelope = EnvelopeCipher::encrypt(&key, "payload").unwrap();
        envelope.tag[0] ^= 0x01;
        let result = EnvelopeCipher::decrypt(&key, &envelope.to_string());
        assert!(matches!(result, Err(VaultError::Authentication)));
    }

    #[test]
    fn test_tampered_ciphertext_fails_authentication() {
        let key = test_key();
        let mut envelope = EnvelopeCipher::encrypt(&key, "payload").unwrap();
        let last = envelope.ciphertext.len() - 1;
        envelope.ciphertext[last] ^= 0x80;
        let result = EnvelopeCipher::decrypt_envelope(&key, &envelope);
        assert!(matches!(result, Err(VaultError::Authentication)));
    }

    #[test]
    fn test_tampered_iv_fails_authentication() {
        let key = test_key();
        let mut envelope = EnvelopeCipher::encrypt(&key, "payload").unwrap();
        envelope.iv[5] ^= 0x10;
        let result = EnvelopeCipher::decrypt_envelope(&key, &envelope);
        assert!(matches!(result, Err(VaultError::Authentication)));
    }

    #[test]
    fn test_wrong_key_fails_authentication() {
        let envelope = EnvelopeCipher::encrypt(&test_key(), "payload").unwrap();
        let other = MasterKey::generate();
        let result = EnvelopeCipher::decrypt_envelope(&other, &envelope);
        assert!(matches!(result, Err(VaultError::Authentication)));
    }

    #[test]
    fn test_malformed_envelopes() {
        let key = test_key();
        let iv = "00".repeat(NONCE_SIZE);
        let tag = "00".repeat(TAG_SIZE);
        let cases = [
            String::new(),
            "abcd".to_string(),
            format!("{}:{}", iv, tag),
            format!("{}:{}:00:00", iv, tag),
            format!("zz{}:{}:00", &iv[2..], tag),
            format!("{}:{}:0", iv, tag),
            format!("{}:{}:xyz1", iv, tag),
            format!("{}:{}:00", &iv[2..], tag),
            format!("{}:{}00:00", iv, tag),
            format!("{}:{}zz:00", iv, &tag[2..]),
            format!("{}:{}:00", iv, &tag[2..]),
        ];

        for case in cases {
            let result = EnvelopeCipher::decrypt(&key, &case);
            assert!(
                matches!(result, Err(VaultError::MalformedEnvelope(_))),
                "expected malformed for {:?}, got {:?}",
                case,
                result
            );
        }
    }

    #[test]
    fn test_invalid_utf8_plaintext_is_encoding_error() {
        let key = test_key();
        let envelope = EnvelopeCipher::seal(&key, &[0xc3, 0x28, 0xff]).unwrap();
        let result = EnvelopeCipher::decrypt_envelope(&key, &envelope);
        assert!(matches!(result, Err(VaultError::Encoding(_))));
    }

    #[test]
    fn test_master_key_from_hex_rejects_bad_input() {
        let cases = [
            String::new(),
            "   ".to_string(),
            "zz".repeat(32),
            "ab".repeat(16),
            "ab".repeat(33),
            "abc".to_string(),
        ];
        for bad in &cases {
            let result = MasterKey::from_hex(bad);
            assert!(matches!(result, Err(VaultError::Configuration(_))), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_master_key_hex_round_trip() {
        let key = MasterKey::generate();
        let hex = key.to_hex();
        assert_eq!(hex.len(), 64);

        let reimported = MasterKey::from_hex(&format!("  {}\n", hex.as_str())).unwrap();
        let envelope = EnvelopeCipher::encrypt(&key, "portable").unwrap();
        assert_eq!(EnvelopeCipher::decrypt_envelope(&reimported, &envelope).unwrap(), "portable");
    }

    #[test]
    fn test_master_key_debug_redacted() {
        assert_eq!(format!("{:?}", test_key()), "MasterKey([REDACTED])");
    }

    #[test]
    fn test_envelope_serde_as_wire_string() {
        let key = test_key();
        let envelope = EnvelopeCipher::encrypt(&key, "json").unwrap();
        let json = serde_json::to_string(&envelope).unwrap();
        assert_eq!(json, format!("\"{}\"", envelope));

        let parsed: Envelope = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, envelope);

        assert!(serde_json::from_str::<Envelope>("\"not:an:envelope\"").is_err());
    }
}
