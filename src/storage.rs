//! Storage abstraction for secret records
//!
//! The vault persists secrets through a trait-based store so the remote
//! database client stays outside this crate. Envelopes pass through the
//! store as opaque strings; it never sees plaintext.

use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::record::SecretRecord;

/// Storage trait for the credential store backend
pub trait CredentialStore: Send + Sync {
    /// Store a new record
    fn insert(&self, record: SecretRecord) -> Result<()>;

    /// Retrieve a live record by ID
    fn get(&self, id: &Uuid) -> Result<Option<SecretRecord>>;

    /// All live records in insertion order
    fn list(&self) -> Result<Vec<SecretRecord>>;

    /// Replace the envelope of a live record
    fn update_envelope(&self, id: &Uuid, envelope: String) -> Result<()>;

    /// Mark a record deleted; it disappears from `get`, `list` and `find_by_url`
    fn soft_delete(&self, id: &Uuid) -> Result<()>;

    /// Live records whose URL contains `fragment`, ignoring case
    fn find_by_url(&self, fragment: &str) -> Result<Vec<SecretRecord>>;
}

/// In-memory implementation of CredentialStore
///
/// Suitable for development, testing, and the CLI. Data is lost when the
/// process terminates.
pub struct InMemoryCredentialStore {
    records: RwLock<Vec<SecretRecord>>,
}

impl InMemoryCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self { records: RwLock::new(Vec::new()) }
    }

    /// Create a store pre-populated with records, e.g. loaded from a JSON export
    pub fn with_records(records: Vec<SecretRecord>) -> Self {
        Self { records: RwLock::new(records) }
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn insert(&self, record: SecretRecord) -> Result<()> {
        let mut records = self.records.write();
        if records.iter().any(|r| r.id == record.id) {
            return Err(VaultError::Storage(format!("Duplicate secret id {}", record.id)));
        }
        records.push(record);
        Ok(())
    }

    fn get(&self, id: &Uuid) -> Result<Option<SecretRecord>> {
        let records = self.records.read();
        Ok(records.iter().find(|r| &r.id == id && !r.is_deleted()).cloned())
    }

    fn list(&self) -> Result<Vec<SecretRecord>> {
        let records = self.records.read();
        Ok(records.iter().filter(|r| !r.is_deleted()).cloned().collect())
    }

    fn update_envelope(&self, id: &Uuid, envelope: String) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id && !r.is_deleted())
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        record.envelope = envelope;
        record.updated_at = Utc::now();
        Ok(())
    }

    fn soft_delete(&self, id: &Uuid) -> Result<()> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| &r.id == id && !r.is_deleted())
            .ok_or_else(|| VaultError::NotFound(id.to_string()))?;

        record.deleted_at = Some(Utc::now());
        Ok(())
    }

    fn find_by_url(&self, fragment: &str) -> Result<Vec<SecretRecord>> {
        let fragment = fragment.to_lowercase();
        let records = self.records.read();
        let found = records
            .iter()
            .filter(|r| !r.is_deleted())
            .filter(|r| {
                r.url()
                    .map(|url| url.to_lowercase().contains(&fragment))
                    .unwrap_or(false)
            })
            .cloned()
            .collect();
        Ok(found)
    }
}
