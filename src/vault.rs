use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto::EnvelopeCipher;
use crate::error::{Result, VaultError};
use crate::key_manager::KeyManager;
use crate::matcher::{hostname_from_url, DomainMatcher, Listing};
use crate::record::{NewSecret, SecretRecord};
use crate::search;
use crate::storage::CredentialStore;

/// Credential vault: master key → envelope per secret → credential store.
///
/// Secrets are encrypted on save and decrypted on reveal, copy or autofill.
/// Decryption failures are returned as typed errors; rendering a fallback is
/// left to the caller.
pub struct Vault<S: CredentialStore> {
    keys: Arc<KeyManager>,
    storage: Arc<S>,
}

impl<S: CredentialStore> Vault<S> {
    pub fn new(storage: Arc<S>, keys: Arc<KeyManager>) -> Self {
        Self { keys, storage }
    }

    pub fn key_manager(&self) -> &KeyManager {
        &self.keys
    }

    /// Encrypt the password and store a new secret
    pub fn add_secret(&self, secret: NewSecret) -> Result<SecretRecord> {
        let key = self.keys.master_key()?;
        let envelope = EnvelopeCipher::encrypt(key, &secret.password)?;
        let now = Utc::now();

        let record = SecretRecord {
            id: Uuid::new_v4(),
            title: secret.title,
            secret_type: secret.secret_type,
            username: secret.username,
            envelope: envelope.to_string(),
            url: secret.url,
            client_name: secret.client_name,
            project_name: secret.project_name,
            notes: secret.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        self.storage.insert(record.clone())?;
        info!(secret_id = %record.id, secret_type = %record.secret_type, "Secret saved");
        Ok(record)
    }

    /// Decrypt the password of a stored secret
    pub fn reveal(&self, id: &Uuid) -> Result<Zeroizing<String>> {
        let record = self
            .storage
            .get(id)?
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;
        self.reveal_record(&record)
    }

    /// Decrypt the password of an already fetched record
    pub fn reveal_record(&self, record: &SecretRecord) -> Result<Zeroizing<String>> {
        let key = self.keys.master_key()?;
        match EnvelopeCipher::decrypt(key, &record.envelope) {
            Ok(plaintext) => {
                debug!(secret_id = %record.id, "Secret decrypted");
                Ok(Zeroizing::new(plaintext))
            }
            Err(e) => {
                warn!(secret_id = %record.id, error = %e, "Secret could not be decrypted");
                Err(e)
            }
        }
    }

    /// Re-encrypt a secret with a new password under a fresh IV
    pub fn update_password(&self, id: &Uuid, password: &str) -> Result<()> {
        let key = self.keys.master_key()?;
        let envelope = EnvelopeCipher::encrypt(key, password)?;
        self.storage.update_envelope(id, envelope.to_string())?;
        info!(secret_id = %id, "Secret password updated");
        Ok(())
    }

    pub fn delete(&self, id: &Uuid) -> Result<()> {
        self.storage.soft_delete(id)?;
        info!(secret_id = %id, "Secret deleted");
        Ok(())
    }

    /// Listing for the current page: domain suggestions, or search results when a query is active
    pub fn listing(
        &self,
        hostname: &str,
        query: Option<&str>,
        matcher: &dyn DomainMatcher,
    ) -> Result<Listing> {
        let records = self.storage.list()?;
        let listing = search::listing(matcher, hostname, query, &records).into_owned();
        debug!(
            hostname,
            suggested = listing.suggested.len(),
            other = listing.other.len(),
            "Vault listing built"
        );
        Ok(listing)
    }

    /// Live secrets whose URL mentions the host of `page_url`
    pub fn autofill_candidates(&self, page_url: &str) -> Result<Vec<SecretRecord>> {
        let Some(hostname) = hostname_from_url(page_url) else {
            debug!(page_url, "No hostname for autofill");
            return Ok(Vec::new());
        };
        self.storage.find_by_url(&hostname)
    }

    /// Username and decrypted password for filling a login form
    pub fn fill(&self, id: &Uuid) -> Result<Credentials> {
        let record = self
            .storage
            .get(id)?
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;
        let password = self.reveal_record(&record)?;
        Ok(Credentials { username: record.username, password })
    }
}

/// Decrypted login pair for autofill
pub struct Credentials {
    pub username: Option<String>,
    pub password: Zeroizing<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
