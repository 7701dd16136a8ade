//! Named text blob storage for the persisted document.
//!
//! The session keeps the current document as a single JSON blob under
//! [`DOCUMENT_KEY`]. Any key/value store that can hold text satisfies
//! [`BlobStore`]; two are provided:
//!
//! - [`FileStore`] - one file per key in a directory.
//! - [`MemoryStore`] - a map, for tests and throwaway sessions.

use std::{
    collections::HashMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, trace};
use tempfile::NamedTempFile;
use thiserror::Error;

/// The key the current document is stored under.
pub const DOCUMENT_KEY: &str = "runSheetData";

/// Errors raised by a [`BlobStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid blob key `{0}`")]
    InvalidKey(String),

    #[error("Failed to read `{}`: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to write `{}`: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// A store of named text blobs.
pub trait BlobStore {
    /// Returns the blob stored under `key`, or `None` if there is none.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Stores `value` under `key`, replacing any previous blob.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<S: BlobStore + ?Sized> BlobStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// A blob store keeping each key in `<dir>/<key>.json`.
///
/// The directory is created on first write. Writes go to a uniquely named
/// temporary file in the same directory that is persisted over the previous
/// blob, so a crash never leaves a truncated document behind. A temporary
/// file that cannot be persisted is removed.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the file a key is stored in.
    ///
    /// # Errors
    ///
    /// Keys must be non-empty and made of ASCII letters, digits, `-` and `_`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl BlobStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => {
                trace!(path:? = path, bytes = text.len(); "Blob read");
                Ok(Some(text))
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path:? = path; "Blob not found");
                Ok(None)
            }
            Err(source) => Err(StoreError::Read { path, source }),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;

        let write = || -> io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            let mut staging = NamedTempFile::new_in(&self.dir)?;
            staging.write_all(value.as_bytes())?;
            staging.persist(&path).map_err(|err| err.error)?;
            Ok(())
        };
        write().map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        trace!(path:? = path, bytes = value.len(); "Blob written");
        Ok(())
    }
}

/// An in-memory blob store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
