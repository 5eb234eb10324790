//! Secret records as held by the credential store

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use zeroize::Zeroizing;

/// Kind of credential a secret holds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SecretType {
    Ssh,
    Ftp,
    Db,
    Cms,
    Api,
    #[default]
    Other,
}

impl std::fmt::Display for SecretType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretType::Ssh => write!(f, "ssh"),
            SecretType::Ftp => write!(f, "ftp"),
            SecretType::Db => write!(f, "db"),
            SecretType::Cms => write!(f, "cms"),
            SecretType::Api => write!(f, "api"),
            SecretType::Other => write!(f, "other"),
        }
    }
}

/// One stored secret.
///
/// `envelope` is the serialized `iv:tag:ciphertext` string, kept opaque here
/// so a single corrupt row does not prevent a listing from loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretRecord {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type", default)]
    pub secret_type: SecretType,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(rename = "encrypted_password")]
    pub envelope: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SecretRecord {
    /// Non-empty URL, if the record has one
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }

    /// Whether the record has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for saving a new secret; the password is still plaintext here
#[derive(Clone, Default)]
pub struct NewSecret {
    pub title: String,
    pub secret_type: SecretType,
    pub username: Option<String>,
    pub password: Zeroizing<String>,
    pub url: Option<String>,
    pub client_name: Option<String>,
    pub project_name: Option<String>,
    pub notes: Option<String>,
}

impl NewSecret {
    pub fn new(title: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            password: Zeroizing::new(password.into()),
            ..Default::default()
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_type(mut self, secret_type: SecretType) -> Self {
        self.secret_type = secret_type;
        self
    }

    pub fn with_client(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }

    pub fn with_project(mut self, project_name: impl Into<String>) -> Self {
        self.project_name = Some(project_name.into());
        self
    }
}

impl std::fmt::Debug for NewSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewSecret")
            .field("title", &self.title)
            .field("secret_type", &self.secret_type)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}
