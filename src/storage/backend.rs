//! Key-value persistence for serialized collections.
//!
//! A [`Backend`] stores opaque string blobs by key. A missing key is not an
//! error; it reads as `None` and the store decides what "absent" means.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

/// Failure of the underlying persistence medium.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A stored value could not be read.
    #[error("failed to read '{key}': {source}")]
    Read {
        /// The key being read.
        key: String,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// A value could not be written.
    #[error("failed to write '{key}': {source}")]
    Write {
        /// The key being written.
        key: String,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// A value could not be removed.
    #[error("failed to remove '{key}': {source}")]
    Remove {
        /// The key being removed.
        key: String,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
}

/// A string-keyed blob store.
pub trait Backend {
    /// Reads the value stored under `key`, or `None` if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    fn set(&mut self, key: &str, value: String) -> Result<(), BackendError>;

    /// Removes the value stored under `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the medium cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), BackendError>;
}

/// A backend held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    /// An empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), BackendError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// A backend storing each key as `<key>.json` in a directory.
///
/// The directory is created on first write. Writes replace the file through
/// a staging file and a rename.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// A backend rooted at `dir`.
    #[must_use]
    pub const fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// The directory values are stored in.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BackendError::Read {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), BackendError> {
        let write = || -> io::Result<()> {
            fs::create_dir_all(&self.dir)?;
            let path = self.path_for(key);
            let staging = path.with_extension("json.tmp");
            fs::write(&staging, value)?;
            fs::rename(&staging, &path)
        };

        write().map_err(|source| BackendError::Write {
            key: key.to_string(),
            source,
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), BackendError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(BackendError::Remove {
                key: key.to_string(),
                source,
            }),
        }
    }
}
