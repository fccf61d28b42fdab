//! Durable session persistence.
//!
//! # Design
//! The session lives in a string key-value store that outlives the process
//! (a JSON file in production, a map in tests). Pages never touch the store
//! directly; they are handed a [`SessionStore`], which writes and removes the
//! token, username and avatar keys together in one batch so a reader never sees
//! a username without a token.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::error::StoreError;
use crate::model::Session;

pub const TOKEN_KEY: &str = "authToken";
pub const USERNAME_KEY: &str = "authUsername";
pub const PROFILE_IMAGE_KEY: &str = "authProfileImageUrl";

/// A string key-value store that persists across restarts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Apply every change in one step. `None` removes the key.
    fn write_batch(&self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.write_batch(&[(key, Some(value))])
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.write_batch(&[(key, None)])
    }
}

fn apply_changes(map: &mut BTreeMap<String, String>, changes: &[(&str, Option<&str>)]) {
    for (key, value) in changes {
        match value {
            Some(value) => {
                map.insert(key.to_string(), value.to_string());
            }
            None => {
                map.remove(*key);
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write_batch(&self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        apply_changes(&mut entries, changes);
        Ok(())
    }
}

/// Store backed by a JSON object on disk. Each batch rewrites the file through
/// a temporary sibling and a rename.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn write_batch(&self, changes: &[(&str, Option<&str>)]) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        apply_changes(&mut next, changes);

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&next)?)?;
        fs::rename(&tmp, &self.path)?;

        *entries = next;
        Ok(())
    }
}

/// What a reload can see of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    pub token: String,
    pub username: String,
    pub profile_image_url: Option<String>,
}

pub struct SessionStore<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for SessionStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: KeyValueStore + ?Sized> SessionStore<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Persist `session`, replacing any previous one. A session without an
    /// avatar removes the stored avatar key.
    pub fn save(&self, session: &Session) -> Result<(), StoreError> {
        self.store.write_batch(&[
            (TOKEN_KEY, Some(session.token.as_str())),
            (USERNAME_KEY, Some(session.username.as_str())),
            (PROFILE_IMAGE_KEY, session.profile_image_url.as_deref()),
        ])?;
        info!(username = %session.username, "session saved");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.write_batch(&[
            (TOKEN_KEY, None),
            (USERNAME_KEY, None),
            (PROFILE_IMAGE_KEY, None),
        ])?;
        info!("session cleared");
        Ok(())
    }

    /// The stored session. A token alone decides whether one exists; expiry is
    /// not checked.
    pub fn load(&self) -> Option<StoredSession> {
        let token = self.store.get(TOKEN_KEY)?;
        Some(StoredSession {
            token,
            username: self.store.get(USERNAME_KEY).unwrap_or_default(),
            profile_image_url: self.store.get(PROFILE_IMAGE_KEY),
        })
    }

    pub fn is_signed_in(&self) -> bool {
        self.store.get(TOKEN_KEY).is_some()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn session(avatar: Option<&str>) -> Session {
        Session {
            token: "tok-1".to_string(),
            username: "jordan".to_string(),
            email: "jordan@example.com".to_string(),
            profile_image_url: avatar.map(str::to_string),
            expires_at: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn save_then_clear_round_trip() {
        let kv = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(Arc::clone(&kv));
        assert!(!sessions.is_signed_in());

        sessions.save(&session(Some("https://cdn.example/a.png"))).unwrap();
        assert_eq!(
            sessions.load(),
            Some(StoredSession {
                token: "tok-1".to_string(),
                username: "jordan".to_string(),
                profile_image_url: Some("https://cdn.example/a.png".to_string()),
            })
        );

        sessions.clear().unwrap();
        assert!(sessions.load().is_none());
        assert!(kv.is_empty());
    }

    #[test]
    fn new_session_without_avatar_drops_stale_one() {
        let kv = Arc::new(MemoryStore::new());
        let sessions = SessionStore::new(Arc::clone(&kv));
        sessions.save(&session(Some("https://cdn.example/old.png"))).unwrap();
        sessions.save(&session(None)).unwrap();
        assert_eq!(kv.get(PROFILE_IMAGE_KEY), None);
        assert_eq!(kv.len(), 2);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = std::env::temp_dir().join(format!("booking-session-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");

        {
            let sessions = SessionStore::new(Arc::new(FileStore::open(&path).unwrap()));
            sessions.save(&session(None)).unwrap();
        }
        let reopened = SessionStore::new(Arc::new(FileStore::open(&path).unwrap()));
        assert_eq!(reopened.load().unwrap().username, "jordan");

        reopened.clear().unwrap();
        let again = SessionStore::new(Arc::new(FileStore::open(&path).unwrap()));
        assert!(!again.is_signed_in());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = std::env::temp_dir().join(format!("booking-session-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        fs::write(&path, b"{not json").unwrap();

        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
        fs::remove_dir_all(&dir).unwrap();
    }
}
