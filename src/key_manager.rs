use once_cell::sync::OnceCell;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::config::VaultConfig;
use crate::crypto::MasterKey;
use crate::error::{Result, VaultError};

type KeyLoader = Box<dyn Fn() -> Result<Zeroizing<String>> + Send + Sync>;

/// Key Manager: hex configuration value → cached AES-256 master key.
///
/// The key is imported lazily on the first call to [`KeyManager::master_key`]
/// and kept for the life of the manager. Concurrent first callers block on
/// the same initialization, so the import runs at most once per successful
/// load and every caller sees the same key. A failed import is not cached.
pub struct KeyManager {
    loader: KeyLoader,
    key: OnceCell<MasterKey>,
}

impl KeyManager {
    /// Build a manager that imports the key from startup configuration
    pub fn from_config(config: &VaultConfig) -> Self {
        let config = config.clone();
        Self::with_loader(move || Ok(Zeroizing::new(config.master_key_hex().to_owned())))
    }

    /// Build a manager around an arbitrary source of hex key material
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<Zeroizing<String>> + Send + Sync + 'static,
    {
        Self { loader: Box::new(loader), key: OnceCell::new() }
    }

    /// Build a manager around an already imported key
    pub fn with_key(key: MasterKey) -> Self {
        let key_cell = OnceCell::new();
        let _ = key_cell.set(key);
        Self {
            loader: Box::new(|| Err(VaultError::Configuration("Master key was preloaded".into()))),
            key: key_cell,
        }
    }

    /// Get the master key, importing it on first use
    pub fn master_key(&self) -> Result<&MasterKey> {
        self.key.get_or_try_init(|| {
            debug!("Importing vault master key");
            let key_hex = (self.loader)()?;
            MasterKey::from_hex(&key_hex).map_err(|e| {
                warn!(error = %e, "Master key import failed");
                e
            })
        })
    }

    /// Whether the master key has been imported
    pub fn is_loaded(&self) -> bool {
        self.key.get().is_some()
    }
}

impl std::fmt::Debug for KeyManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyManager")
            .field("loaded", &self.is_loaded())
            .finish()
    }
}
