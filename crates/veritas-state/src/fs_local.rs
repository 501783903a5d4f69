//! Filesystem-backed local store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::LocalError;
use crate::storage_traits::{LocalResult, LocalStore};

/// Local key-value store keeping one file per key.
///
/// Layout: `<root>/<key>.json`
#[derive(Debug, Clone)]
pub struct FsLocalStore {
    root: PathBuf,
}

impl FsLocalStore {
    /// Create a new `FsLocalStore` rooted at `root`. Creates `root` if needed.
    pub fn new(root: impl AsRef<Path>) -> LocalResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn slot_path(&self, key: &str) -> LocalResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
            && !key.starts_with('.');
        if !valid {
            return Err(LocalError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

impl LocalStore for FsLocalStore {
    fn get(&self, key: &str) -> LocalResult<Option<String>> {
        let path = self.slot_path(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LocalError::Io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> LocalResult<()> {
        let path = self.slot_path(key)?;

        // Atomic write: write to temp file in the same directory, then rename.
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        tmp.write_all(value.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(key, bytes = value.len(), "local slot written");
        Ok(())
    }

    fn remove(&self, key: &str) -> LocalResult<()> {
        let path = self.slot_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LocalError::Io(e)),
        }
    }
}
