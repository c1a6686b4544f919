use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use argon2::Argon2;
use base64::{engine::general_purpose, Engine as _};
use rand::RngCore;
use std::fmt;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Salt used when a passphrase rather than a raw key is configured.
const PASSPHRASE_SALT: &[u8; 32] = b"anycheckin-session-encryption-v1";

/// Encryption for stored session cookies, AES-256-GCM.
///
/// Ciphertexts are `base64(nonce || ciphertext)` with a fresh 96-bit nonce
/// per call.
pub struct EncryptionService {
    cipher: Aes256Gcm,
}

impl EncryptionService {
    pub fn from_key(key: &[u8; 32]) -> Result<Self, EncryptionError> {
        let cipher = Aes256Gcm::new_from_slice(key)
            .map_err(|e| EncryptionError::InvalidKey(e.to_string()))?;
        Ok(Self { cipher })
    }

    /// Derives the key from a password with Argon2id.
    pub fn from_password(password: &str, salt: &[u8; 32]) -> Result<Self, EncryptionError> {
        let mut key = [0u8; 32];
        Argon2::default()
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| EncryptionError::KeyDerivation(e.to_string()))?;
        Self::from_key(&key)
    }

    /// A secret of exactly 32 bytes is used as the key itself; anything
    /// else is treated as a passphrase.
    pub fn from_secret(secret: &str) -> Result<Self, EncryptionError> {
        if secret.is_empty() {
            return Err(EncryptionError::InvalidKey(
                "encryption secret is empty".to_string(),
            ));
        }
        match <&[u8; 32]>::try_from(secret.as_bytes()) {
            Ok(key) => Self::from_key(key),
            Err(_) => Self::from_password(secret, PASSPHRASE_SALT),
        }
    }

    pub fn encrypt(&self, plaintext: &str) -> Result<String, EncryptionError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        let mut result = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);

        Ok(general_purpose::STANDARD.encode(&result))
    }

    pub fn decrypt(&self, encrypted: &str) -> Result<String, EncryptionError> {
        let data = general_purpose::STANDARD
            .decode(encrypted)
            .map_err(|e| EncryptionError::InvalidFormat(format!("Base64 decode failed: {}", e)))?;

        if data.len() < NONCE_LEN + TAG_LEN {
            return Err(EncryptionError::InvalidFormat(
                "Data too short (expected at least nonce + tag)".to_string(),
            ));
        }

        let (nonce_bytes, ciphertext) = data.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|e| {
                EncryptionError::DecryptionFailed(format!(
                    "Decryption failed (data may be tampered): {}",
                    e
                ))
            })?;

        String::from_utf8(plaintext).map_err(|e| EncryptionError::InvalidUtf8(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EncryptionError {
    #[error("Key derivation failed: {0}")]
    KeyDerivation(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Invalid UTF-8: {0}")]
    InvalidUtf8(String),
}

impl fmt::Display for EncryptionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncryptionService(AES-256-GCM)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW_KEY: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_raw_key_roundtrip() {
        let service = EncryptionService::from_secret(RAW_KEY).unwrap();
        let encrypted = service.encrypt("session=abc|def").unwrap();
        assert_eq!(service.decrypt(&encrypted).unwrap(), "session=abc|def");
    }

    #[test]
    fn test_passphrase_is_deterministic() {
        let first = EncryptionService::from_secret("correct horse").unwrap();
        let second = EncryptionService::from_secret("correct horse").unwrap();
        let encrypted = first.encrypt("payload").unwrap();
        assert_eq!(second.decrypt(&encrypted).unwrap(), "payload");
    }

    #[test]
    fn test_nonce_is_fresh() {
        let service = EncryptionService::from_secret(RAW_KEY).unwrap();
        assert_ne!(service.encrypt("same").unwrap(), service.encrypt("same").unwrap());
    }

    #[test]
    fn test_wrong_key_fails() {
        let service = EncryptionService::from_secret(RAW_KEY).unwrap();
        let other = EncryptionService::from_secret("fedcba9876543210fedcba9876543210").unwrap();
        let encrypted = service.encrypt("secret").unwrap();
        assert!(matches!(
            other.decrypt(&encrypted),
            Err(EncryptionError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn test_malformed_input() {
        let service = EncryptionService::from_secret(RAW_KEY).unwrap();
        assert!(matches!(
            service.decrypt("not valid base64!!!"),
            Err(EncryptionError::InvalidFormat(_))
        ));
        let short = general_purpose::STANDARD.encode([0u8; 10]);
        assert!(matches!(
            service.decrypt(&short),
            Err(EncryptionError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(matches!(
            EncryptionService::from_secret(""),
            Err(EncryptionError::InvalidKey(_))
        ));
    }
}
