//! The shared document library.
//!
//! Documents are plain files in a single folder. Listing is flat and sorted by
//! name; uploads never overwrite an existing file.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

/// A file in the document library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    /// File name.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Path relative to the workspace root, with `/` separators.
    pub relative_url: String,
    /// When the file was last written.
    pub last_modified: DateTime<Utc>,
}

/// Failure of a document library operation.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The library folder does not exist.
    #[error("document folder '{}' not found", .0.display())]
    FolderNotFound(PathBuf),

    /// A document with the same name is already in the library.
    #[error("a document named '{0}' already exists")]
    AlreadyExists(String),

    /// The upload source has no usable file name.
    #[error("'{}' is not a file that can be uploaded", .0.display())]
    InvalidName(PathBuf),

    /// Reading or writing a file failed.
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// Listing the folder failed.
    #[error("failed to list documents: {0}")]
    Walk(#[from] walkdir::Error),
}

/// A collection of shared documents.
pub trait DocumentLibrary {
    /// Every document, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the library cannot be read.
    fn list(&self) -> Result<Vec<DocumentInfo>, DocumentError>;

    /// Copies the file at `source` into the library under its own name.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::AlreadyExists`] if the name is taken, leaving
    /// the existing document untouched.
    fn upload(&self, source: &Path) -> Result<DocumentInfo, DocumentError>;
}

/// A document library backed by a folder.
#[derive(Debug, Clone)]
pub struct FolderLibrary {
    root: PathBuf,
    folder: String,
}

impl FolderLibrary {
    /// A library over `<root>/<folder>`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, folder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            folder: folder.into(),
        }
    }

    /// The folder documents are kept in.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.root.join(&self.folder)
    }

    fn describe(&self, path: &Path) -> Result<DocumentInfo, DocumentError> {
        let io_error = |source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        };
        let metadata = fs::metadata(path).map_err(io_error)?;
        let modified = metadata.modified().map_err(io_error)?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(DocumentInfo {
            relative_url: format!("{}/{name}", self.folder),
            name,
            size: metadata.len(),
            last_modified: DateTime::<Utc>::from(modified),
        })
    }
}

impl DocumentLibrary for FolderLibrary {
    fn list(&self) -> Result<Vec<DocumentInfo>, DocumentError> {
        let folder = self.path();
        if !folder.is_dir() {
            return Err(DocumentError::FolderNotFound(folder));
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(&folder)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                documents.push(self.describe(entry.path())?);
            }
        }
        tracing::debug!("found {} documents in {}", documents.len(), folder.display());
        Ok(documents)
    }

    fn upload(&self, source: &Path) -> Result<DocumentInfo, DocumentError> {
        let name = source
            .file_name()
            .filter(|_| source.is_file())
            .ok_or_else(|| DocumentError::InvalidName(source.to_path_buf()))?;

        let folder = self.path();
        if !folder.is_dir() {
            return Err(DocumentError::FolderNotFound(folder));
        }

        let target = folder.join(name);
        let mut reader = fs::File::open(source).map_err(|e| DocumentError::Io {
            path: source.to_path_buf(),
            source: e,
        })?;
        write_new(&mut reader, &target)?;

        tracing::info!("uploaded {}", target.display());
        self.describe(&target)
    }
}

/// Copies `reader` into a file at `target` that must not exist yet.
///
/// A failed copy removes the partial file again.
fn write_new(reader: &mut impl io::Read, target: &Path) -> Result<u64, DocumentError> {
    let mut writer = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            let name = target.file_name().unwrap_or_default();
            return Err(DocumentError::AlreadyExists(
                name.to_string_lossy().into_owned(),
            ));
        }
        Err(e) => {
            return Err(DocumentError::Io {
                path: target.to_path_buf(),
                source: e,
            });
        }
    };

    match io::copy(reader, &mut writer) {
        Ok(written) => Ok(written),
        Err(e) => {
            drop(writer);
            if let Err(cleanup) = fs::remove_file(target) {
                tracing::warn!("failed to remove partial upload {}: {cleanup}", target.display());
            }
            Err(DocumentError::Io {
                path: target.to_path_buf(),
                source: e,
            })
        }
    }
}
