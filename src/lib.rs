pub mod config;
pub mod crypto;
pub mod error;
pub mod key_manager;
pub mod matcher;
pub mod record;
pub mod search;
pub mod storage;
pub mod vault;

pub use config::{VaultConfig, MASTER_KEY_ENV};
pub use crypto::{Envelope, EnvelopeCipher, MasterKey, AES_256_KEY_SIZE, NONCE_SIZE, TAG_SIZE};
pub use error::{Result, VaultError};
pub use key_manager::KeyManager;
pub use matcher::{
    hostname_from_url, DomainMatcher, HostSuffixMatcher, Listing, MatchResult, SubstringMatcher,
};
pub use record::{NewSecret, SecretRecord, SecretType};
pub use storage::{CredentialStore, InMemoryCredentialStore};
pub use vault::{Credentials, Vault};
