use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;

pub const USER_ID_KEY: &str = "userId";
pub const AUTH_TOKEN_KEY: &str = "authToken";
pub const DEFAULT_USER_ID: &str = "default_user";

/// Small persistent key-value store, one JSON object on disk
#[derive(Debug, Clone)]
pub struct LocalStorage {
    path: PathBuf,
}

impl LocalStorage {
    pub fn new() -> Self {
        Self::with_path(AppDirs::storage_path())
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    pub fn set(&self, key: &str, value: &str) -> std::io::Result<()> {
        let mut entries = self.read_all();
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    pub fn remove(&self, key: &str) -> std::io::Result<()> {
        let mut entries = self.read_all();
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        fs::read(&self.path)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .unwrap_or_default()
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(entries).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

/// Who the progress calls are made for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub auth_token: Option<String>,
}

impl Identity {
    pub fn load(storage: &LocalStorage) -> Self {
        Self {
            user_id: storage
                .get(USER_ID_KEY)
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| DEFAULT_USER_ID.to_string()),
            auth_token: storage.get(AUTH_TOKEN_KEY),
        }
    }

    /// Token sent after `Bearer`; empty when none is stored
    pub fn bearer_token(&self) -> &str {
        self.auth_token.as_deref().unwrap_or_default()
    }
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_string(),
            auth_token: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_identity_defaults_when_store_is_empty() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::with_path(dir.path().join("storage.json"));
        let identity = Identity::load(&storage);
        assert_eq!(identity.user_id, "default_user");
        assert_eq!(identity.auth_token, None);
        assert_eq!(identity.bearer_token(), "");
    }

    #[test]
    fn test_identity_reads_both_keys() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::with_path(dir.path().join("storage.json"));
        storage.set(USER_ID_KEY, "teen42").unwrap();
        storage.set(AUTH_TOKEN_KEY, "abc.def").unwrap();

        let identity = Identity::load(&storage);
        assert_eq!(identity.user_id, "teen42");
        assert_eq!(identity.bearer_token(), "abc.def");
    }

    #[test]
    fn test_storage_set_get_remove() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::with_path(dir.path().join("nested").join("storage.json"));
        assert_eq!(storage.get("k"), None);

        storage.set("k", "v1").unwrap();
        storage.set("k", "v2").unwrap();
        storage.set("other", "x").unwrap();
        assert_eq!(storage.get("k"), Some("v2".to_string()));

        storage.remove("k").unwrap();
        assert_eq!(storage.get("k"), None);
        assert_eq!(storage.get("other"), Some("x".to_string()));
    }

    #[test]
    fn test_empty_user_id_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::with_path(dir.path().join("storage.json"));
        storage.set(USER_ID_KEY, "").unwrap();
        assert_eq!(Identity::load(&storage).user_id, DEFAULT_USER_ID);
    }
}
