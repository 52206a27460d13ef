//! File-backed [`BlobStore`]: one `<key>.json` file per key.
//!
//! Writes go to a hidden temp file in the same directory and are renamed
//! over the target, so a crash mid-write leaves the previous blob intact.

use std::path::{Path, PathBuf};

use crate::{BlobStore, StoreError};

/// A [`BlobStore`] rooted at a data directory.
///
/// The directory is created on the first write.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the file path holding `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidKey`] unless `key` is a non-empty run of
    /// ASCII letters, digits, `-` or `_`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        if !valid {
            return Err(StoreError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        ensure_dir(&self.root)?;

        let tmp = self.root.join(format!(".{key}.json.tmp"));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        log::trace!("Wrote {} bytes to {}", value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Ensures a directory exists, creating it if necessary.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileBlobStore::new(dir.path().join("nested"));

        assert_eq!(store.get("incidences").unwrap(), None);
        store.set("incidences", "[]").unwrap();
        assert_eq!(store.get("incidences").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/incidences.json").exists());

        store.set("incidences", "[1]").unwrap();
        assert_eq!(store.get("incidences").unwrap().as_deref(), Some("[1]"));
        assert!(
            !dir.path().join("nested/.incidences.json.tmp").exists(),
            "temp file should be renamed away"
        );

        store.remove("incidences").unwrap();
        store.remove("incidences").unwrap();
        assert_eq!(store.get("incidences").unwrap(), None);
    }

    #[test]
    fn rejects_path_like_keys() {
        let store = FileBlobStore::new("data");
        for key in ["", "../etc", "a/b", "a.b"] {
            assert!(
                matches!(store.path_for(key), Err(StoreError::InvalidKey { .. })),
                "{key:?} should be rejected"
            );
        }
    }
}
