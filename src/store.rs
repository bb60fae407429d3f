//! Pluggable persistence for cached token records.
//!
//! Tokens are keyed by the account's openid. The default store keeps
//! records in memory; [`FileTokenStore`] mirrors the behavior of the
//! classic one-file-per-account layout under the system temp directory.
//! Serializing concurrent read-modify-write of the same key across
//! processes is the store implementor's responsibility.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::warn;

/// Key-value persistence for serialized token records.
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Returns the serialized record for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Persists `value` under `key`, replacing any previous record.
    fn put(&self, key: &str, value: &str);
}

/// In-memory token store; the default for new clients.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        self.records.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.insert(key.to_string(), value.to_string());
        }
    }
}

/// File-backed token store, one file per openid.
///
/// Write failures are logged and otherwise ignored; a lost cache write
/// only costs a future refresh round-trip.
#[derive(Debug)]
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    /// Creates a store rooted at the system temp directory.
    pub fn new() -> Self {
        Self::in_dir(std::env::temp_dir())
    }

    /// Creates a store rooted at `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn token_file(&self, key: &str) -> PathBuf {
        self.dir.join(format!("om_access_token_for_{key}"))
    }
}

impl Default for FileTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.token_file(key)).ok()
    }

    fn put(&self, key: &str, value: &str) {
        let path = self.token_file(key);
        if let Err(err) = std::fs::write(&path, value) {
            warn!("failed to persist token record to {}: {err}", path.display());
        }
    }
}
