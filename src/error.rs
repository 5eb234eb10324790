//! Error types for the credential vault

use thiserror::Error;

/// Result type alias for vault operations
pub type Result<T> = std::result::Result<T, VaultError>;

/// Errors that can occur while handling vault secrets
#[derive(Error, Debug)]
pub enum VaultError {
    /// Master key material is missing or invalid
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Envelope string does not follow the `iv:tag:ciphertext` hex format
    #[error("Malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// GCM tag verification failed (tampered data or wrong key)
    #[error("Authentication failed: envelope was modified or encrypted under a different key")]
    Authentication,

    /// Decrypted bytes are not valid UTF-8
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Underlying cipher primitive failed
    #[error("Cryptographic error: {0}")]
    Crypto(String),

    /// Secret not found in the credential store
    #[error("Secret not found: {0}")]
    NotFound(String),

    /// Credential store operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl VaultError {
    /// Configuration failures cannot be recovered per call; the process has no usable key.
    pub fn is_fatal(&self) -> bool {
        matches!(self, VaultError::Configuration(_))
    }
}

impl From<serde_json::Error> for VaultError {
    fn from(err: serde_json::Error) -> Self {
        VaultError::Serialization(err.to_string())
    }
}
