use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

/// Persisted slot for the backend access token. Presence of a token is what
/// the auth presence signal reports, so reads must always hit the store.
pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> AppResult<Option<SecretString>>;
    fn put_access_token(&self, token: SecretString) -> AppResult<()>;
    fn clear(&self) -> AppResult<()>;
}

#[derive(Debug, Deserialize, Serialize)]
struct TokenRecord {
    access_token: String,
}

/// JSON file under the configured storage directory.
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(storage_dir: &std::path::Path) -> AppResult<Self> {
        fs::create_dir_all(storage_dir)?;
        Ok(Self {
            path: storage_dir.join("auth_token.json"),
            lock: Mutex::new(()),
        })
    }
}

impl TokenStore for FileTokenStore {
    fn access_token(&self) -> AppResult<Option<SecretString>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::Storage("token store lock poisoned".to_string()))?;

        if !self.path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&self.path)?;
        let record: TokenRecord = serde_json::from_str(&raw)?;
        if record.access_token.is_empty() {
            return Ok(None);
        }
        Ok(Some(SecretString::from(record.access_token)))
    }

    fn put_access_token(&self, token: SecretString) -> AppResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::Storage("token store lock poisoned".to_string()))?;

        let record = TokenRecord {
            access_token: token.expose_secret().to_string(),
        };
        fs::write(&self.path, serde_json::to_string(&record)?)?;
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| AppError::Storage("token store lock poisoned".to_string()))?;

        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
