//! Durable storage for the persisted subset of the session.
//!
//! Only the token pair and the user survive a restart. Loading, error and
//! authenticated flags are never written; the session store recomputes them
//! on startup.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::models::user::{TokenPair, User};

pub const STORAGE_KEY: &str = "auth-storage";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedSession {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

impl PersistedSession {
    /// Token pair and user, when all three pieces are present.
    pub fn complete(self) -> Option<(TokenPair, User)> {
        match (self.access_token, self.refresh_token, self.user) {
            (Some(access), Some(refresh), Some(user)) => {
                Some((TokenPair { access, refresh }, user))
            }
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none() && self.user.is_none()
    }
}

pub trait SessionStorage: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>, ClientError>;
    fn save(&self, session: &PersistedSession) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Serialize, Deserialize)]
struct StorageFile {
    #[serde(rename = "auth-storage")]
    session: PersistedSession,
}

/// JSON file holding `{"auth-storage": {...}}`.
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStorage for FileSessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, ClientError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(ClientError::Storage(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        let file: StorageFile = serde_json::from_slice(&raw).map_err(|err| {
            ClientError::Storage(format!("corrupt {STORAGE_KEY} in {}: {err}", self.path.display()))
        })?;

        Ok(Some(file.session))
    }

    fn save(&self, session: &PersistedSession) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                ClientError::Storage(format!("failed to create {}: {err}", parent.display()))
            })?;
        }

        let body = serde_json::to_vec_pretty(&StorageFile {
            session: session.clone(),
        })
        .map_err(|err| ClientError::Storage(format!("failed to encode session: {err}")))?;

        fs::write(&self.path, body).map_err(|err| {
            ClientError::Storage(format!("failed to write {}: {err}", self.path.display()))
        })
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::Storage(format!(
                "failed to remove {}: {err}",
                self.path.display()
            ))),
        }
    }
}

/// Process-local storage; nothing outlives the process.
#[derive(Default)]
pub struct MemorySessionStorage {
    session: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }
}

impl SessionStorage for MemorySessionStorage {
    fn load(&self) -> Result<Option<PersistedSession>, ClientError> {
        Ok(self
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), ClientError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use uuid::Uuid;

    use super::{FileSessionStorage, PersistedSession, SessionStorage};

    fn scratch_file() -> PathBuf {
        std::env::temp_dir()
            .join(format!("deliveet-{}", Uuid::new_v4()))
            .join("auth-storage.json")
    }

    #[test]
    fn missing_file_loads_as_none() {
        let storage = FileSessionStorage::new(scratch_file());
        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn file_storage_writes_under_fixed_key() {
        let path = scratch_file();
        let storage = FileSessionStorage::new(&path);
        let session = PersistedSession {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            user: None,
        };

        storage.save(&session).unwrap();

        let raw: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(raw["auth-storage"]["access_token"], "access");
        assert!(raw["auth-storage"].get("is_authenticated").is_none());

        assert_eq!(storage.load().unwrap(), Some(session));

        storage.clear().unwrap();
        assert!(storage.load().unwrap().is_none());
        storage.clear().unwrap();
    }

    #[test]
    fn corrupt_file_is_a_storage_error() {
        let path = scratch_file();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"not json").unwrap();

        let storage = FileSessionStorage::new(&path);
        assert!(storage.load().is_err());
    }

    #[test]
    fn partial_session_is_not_complete() {
        let session = PersistedSession {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            user: None,
        };

        assert!(!session.is_empty());
        assert!(session.complete().is_none());
    }
}
