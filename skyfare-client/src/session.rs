//! Client-side session storage.
//!
//! The token lives in exactly one injectable [`SessionStore`]; the API client
//! reads it before each request and writes or clears it on auth changes.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use skyfare_core::{PublicProfile, Sensitive};

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    pub token: Sensitive<String>,
    pub user: Option<PublicProfile>,
}

pub trait SessionStore: Send + Sync {
    fn read(&self) -> ClientResult<Option<StoredSession>>;
    fn write(&self, session: &StoredSession) -> ClientResult<()>;
    fn clear(&self) -> ClientResult<()>;
}

#[derive(Default)]
pub struct MemorySessionStore {
    inner: Mutex<Option<StoredSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> ClientError {
    ClientError::Session("session lock poisoned".to_string())
}

impl SessionStore for MemorySessionStore {
    fn read(&self) -> ClientResult<Option<StoredSession>> {
        Ok(self.inner.lock().map_err(poisoned)?.clone())
    }

    fn write(&self, session: &StoredSession) -> ClientResult<()> {
        *self.inner.lock().map_err(poisoned)? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        *self.inner.lock().map_err(poisoned)? = None;
        Ok(())
    }
}

/// Persists the session as a small JSON file, the CLI's stand-in for browser
/// local storage.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Opens `path` for writing, readable by the owner only.
#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // mode only applies on creation
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    OpenOptions::new().write(true).create(true).truncate(true).open(path)
}

impl SessionStore for FileSessionStore {
    fn read(&self) -> ClientResult<Option<StoredSession>> {
        match fs::read(&self.path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|e| ClientError::Session(format!("corrupt session file: {}", e))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ClientError::Session(e.to_string())),
        }
    }

    fn write(&self, session: &StoredSession) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ClientError::Session(e.to_string()))?;
        }
        let json = serde_json::to_vec_pretty(session).map_err(|e| ClientError::Session(e.to_string()))?;
        let mut file = open_private(&self.path).map_err(|e| ClientError::Session(e.to_string()))?;
        file.write_all(&json).map_err(|e| ClientError::Session(e.to_string()))
    }

    fn clear(&self) -> ClientResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample() -> StoredSession {
        StoredSession {
            token: Sensitive::new("header.payload.sig".into()),
            user: Some(PublicProfile {
                id: Uuid::new_v4(),
                name: "Ada".into(),
                email: "ada@example.com".into(),
            }),
        }
    }

    fn exercise(store: &dyn SessionStore) {
        assert_eq!(store.read().unwrap(), None);
        store.write(&sample()).unwrap();
        assert_eq!(store.read().unwrap().unwrap().token.expose(), "header.payload.sig");
        store.clear().unwrap();
        assert_eq!(store.read().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemorySessionStore::new());
    }

    #[test]
    fn test_file_store() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileSessionStore::new(dir.path().join("nested").join("session.json")));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{}").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        FileSessionStore::new(path.clone()).write(&sample()).unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_file_store_reports_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(FileSessionStore::new(path).read(), Err(ClientError::Session(_))));
    }
}
