//! Master key configuration
//!
//! The vault reads exactly one value at startup: the hex-encoded AES-256
//! master key. Binaries load `.env` through `dotenvy` before calling
//! [`VaultConfig::from_env`].

use zeroize::Zeroizing;

use crate::crypto::AES_256_KEY_SIZE;
use crate::error::{Result, VaultError};

/// Environment variable holding the 64-character hex master key
pub const MASTER_KEY_ENV: &str = "VAULT_MASTER_KEY";

/// Startup configuration for the vault
#[derive(Clone)]
pub struct VaultConfig {
    master_key_hex: Zeroizing<String>,
}

impl VaultConfig {
    /// Create a config from an already obtained hex key string
    pub fn new(master_key_hex: impl Into<String>) -> Self {
        Self { master_key_hex: Zeroizing::new(master_key_hex.into()) }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// The value is checked for shape (64 hex digits after trimming) so a
    /// malformed key fails here; the key itself is imported lazily.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = lookup(MASTER_KEY_ENV)
            .ok_or_else(|| VaultError::Configuration(format!("{} is not set", MASTER_KEY_ENV)))?;

        let value = Zeroizing::new(value);
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(VaultError::Configuration(format!("{} is empty", MASTER_KEY_ENV)));
        }

        if trimmed.len() != 2 * AES_256_KEY_SIZE {
            return Err(VaultError::Configuration(format!(
                "{} must be {} hex characters, got {}",
                MASTER_KEY_ENV,
                2 * AES_256_KEY_SIZE,
                trimmed.len()
            )));
        }

        if !trimmed.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VaultError::Configuration(format!("{} is not valid hex", MASTER_KEY_ENV)));
        }

        Ok(Self::new(trimmed))
    }

    /// Raw hex key string (use with caution)
    pub fn master_key_hex(&self) -> &str {
        &self.master_key_hex
    }
}

impl std::fmt::Debug for VaultConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultConfig")
            .field("master_key_hex", &"[REDACTED]")
            .finish()
    }
}
