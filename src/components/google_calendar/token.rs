use crate::error::{token_store_error, CrmResult};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the single stored credentials record
const CREDENTIALS_FILE: &str = "google_calendar_credentials.json";

/// OAuth credentials as returned by the backend token exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: String,
    /// Unix timestamp (seconds) after which the token is unusable
    pub expires_at: i64,
    pub scope: String,
}

impl Credentials {
    /// A token is usable only while `now < expires_at`
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

/// Persists the single calendar credentials record as a JSON file.
///
/// Expiry is terminal: `load` deletes an expired record and reports it as
/// absent, forcing the caller back through the login flow. There is no
/// refresh path.
#[derive(Debug, Clone)]
pub struct TokenStore {
    path: PathBuf,
}

impl TokenStore {
    /// Store backed by a file in the user's config directory
    pub fn new() -> CrmResult<Self> {
        let base = dirs::config_dir()
            .ok_or_else(|| token_store_error("Could not determine config directory"))?;
        Ok(Self {
            path: base.join("casebook").join(CREDENTIALS_FILE),
        })
    }

    /// Store backed by an explicit file path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the credentials record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist credentials, replacing any previous record
    pub fn save(&self, credentials: &Credentials) -> CrmResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(credentials)?;
        fs::write(&self.path, json)?;
        info!("Saved calendar credentials");
        Ok(())
    }

    /// Load the stored credentials, if present and unexpired.
    ///
    /// An expired record is cleared as a side effect so later reads do not
    /// keep tripping over it.
    pub fn load(&self) -> CrmResult<Option<Credentials>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let credentials: Credentials = serde_json::from_str(&content)
            .map_err(|e| token_store_error(&format!("Failed to parse credentials: {}", e)))?;

        if credentials.is_expired(Utc::now().timestamp()) {
            info!("Stored calendar credentials expired, clearing");
            self.clear()?;
            return Ok(None);
        }

        Ok(Some(credentials))
    }

    /// Delete the stored record; doing so twice is not an error
    pub fn clear(&self) -> CrmResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
