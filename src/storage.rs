//! Durable key-value storage capability
//!
//! Every component that persists state receives a [`KeyValueStore`] handle
//! chosen once at process start. Values are opaque strings (JSON-serialized
//! records or stringified scalars); the store only guarantees read-your-writes
//! consistency within a single process.

use crate::constants::STORAGE_FILE_PERMISSIONS;
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Storage capability: three operations, read-your-writes within a process.
pub trait KeyValueStore: Send + Sync {
    /// Returns the stored value, or `None` if the key has never been set.
    fn get(&self, key: &str) -> Result<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
    /// Removes `key`; removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// File-backed store: one file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at the standard data directory.
    ///
    /// - macOS: `~/Library/Application Support/calcvault/`
    /// - Linux: `~/.local/share/calcvault/`
    /// - Windows: `%LOCALAPPDATA%\calcvault\`
    pub fn open_default() -> Result<Self> {
        let dir = dirs::data_local_dir()
            .context("Failed to determine data directory")?
            .join("calcvault");
        Self::open(dir)
    }

    /// Open a store rooted at a specific directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create storage directory: {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    #[cfg(unix)]
    fn restrict_permissions(path: &Path) -> Result<()> {
        let mut permissions = fs::metadata(path)?.permissions();
        permissions.set_mode(STORAGE_FILE_PERMISSIONS);
        fs::set_permissions(path, permissions).context("Failed to set storage file permissions")
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        // Warn if another user could read the value (should be 600)
        #[cfg(unix)]
        {
            let mode = fs::metadata(&path)
                .context("Failed to read storage file metadata")?
                .permissions()
                .mode();
            if mode & 0o077 != 0 {
                log::warn!(
                    "Storage file {} has permissive permissions: {:o}. Should be 600.",
                    path.display(),
                    mode & 0o777
                );
            }
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read storage file: {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write storage file: {}", path.display()))?;

        #[cfg(unix)]
        Self::restrict_permissions(&path)?;

        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.key_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove storage file: {}", path.display()))
            }
        }
    }
}

/// In-memory store for tests and isolated instances.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}
