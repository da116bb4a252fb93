//! A tracker workspace on disk.
//!
//! A workspace is a root directory holding `.qt/config.toml`, the collection
//! snapshots under `.qt/storage/`, and the shared document folder.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    domain::{Config, ConfigError},
    identity::ConfiguredIdentity,
    storage::{
        backend::FileBackend,
        documents::FolderLibrary,
        store::{StorageKeys, Store},
    },
};

const META_DIR: &str = ".qt";

/// Failure to initialise a workspace.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The root already holds a workspace.
    #[error("a workspace already exists at '{}'", .0.display())]
    AlreadyInitialised(PathBuf),

    /// A workspace directory could not be created.
    #[error("failed to create '{}': {source}", path.display())]
    CreateDir {
        /// The directory being created.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },

    /// The configuration could not be written.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A tracker workspace rooted at a directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens the workspace at `root`.
    ///
    /// A missing or unreadable configuration falls back to the defaults.
    #[must_use]
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let config = load_config(&root);
        Self { root, config }
    }

    /// Creates a workspace at `root` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration already exists or if any of the
    /// workspace files cannot be written.
    pub fn init(root: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let root = root.into();
        let config_path = config_path(&root);
        if config_path.exists() {
            return Err(WorkspaceError::AlreadyInitialised(root));
        }

        let config = Config::default();
        let workspace = Self { root, config };
        for dir in [workspace.storage_dir(), workspace.documents().path()] {
            fs::create_dir_all(&dir).map_err(|source| WorkspaceError::CreateDir {
                path: dir.clone(),
                source,
            })?;
        }
        workspace.config.save(&config_path)?;

        tracing::info!("initialised workspace at {}", workspace.root.display());
        Ok(workspace)
    }

    /// The workspace root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The loaded configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        config_path(&self.root)
    }

    /// Directory holding the collection snapshots.
    #[must_use]
    pub fn storage_dir(&self) -> PathBuf {
        self.root.join(META_DIR).join("storage")
    }

    /// A record store over this workspace's snapshots.
    #[must_use]
    pub fn store(&self) -> Store<FileBackend> {
        Store::new(FileBackend::new(self.storage_dir())).with_keys(StorageKeys::from(&self.config))
    }

    /// The shared document library.
    #[must_use]
    pub fn documents(&self) -> FolderLibrary {
        FolderLibrary::new(&self.root, self.config.documents_folder())
    }

    /// The current user's identity.
    #[must_use]
    pub fn identity(&self) -> ConfiguredIdentity {
        ConfiguredIdentity::from_config(&self.config)
    }
}

fn config_path(root: &Path) -> PathBuf {
    root.join(META_DIR).join("config.toml")
}

fn load_config(root: &Path) -> Config {
    let path = config_path(root);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::storage::documents::DocumentLibrary;

    use super::*;

    #[test]
    fn init_creates_layout() {
        let tmp = TempDir::new().unwrap();
        let workspace = Workspace::init(tmp.path()).unwrap();

        assert!(workspace.config_path().is_file());
        assert!(workspace.storage_dir().is_dir());
        assert!(tmp.path().join("Shared Documents").is_dir());
        assert!(workspace.documents().list().unwrap().is_empty());
    }

    #[test]
    fn init_twice_fails() {
        let tmp = TempDir::new().unwrap();
        Workspace::init(tmp.path()).unwrap();
        assert!(matches!(
            Workspace::init(tmp.path()).unwrap_err(),
            WorkspaceError::AlreadyInitialised(_)
        ));
    }

    #[test]
    fn open_without_config_uses_defaults() {
        let tmp = TempDir::new().unwrap();
        let workspace = Workspace::open(tmp.path());
        assert_eq!(workspace.config(), &Config::default());
    }

    #[test]
    fn store_persists_across_opens() {
        let tmp = TempDir::new().unwrap();
        Workspace::init(tmp.path()).unwrap();

        let mut store = Workspace::open(tmp.path()).store();
        store.delete::<crate::Questionnaire>("1").unwrap();

        let mut reopened = Workspace::open(tmp.path()).store();
        assert_eq!(reopened.questionnaires().unwrap().len(), 7);
        assert!(tmp
            .path()
            .join(".qt/storage/INA_OECD_QUESTIONNAIRES.json")
            .is_file());
    }

    #[test]
    fn configured_keys_are_used() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".qt")).unwrap();
        fs::write(
            tmp.path().join(".qt/config.toml"),
            "_version = \"1\"\nquestionnaire_key = \"Q\"\n",
        )
        .unwrap();

        let mut store = Workspace::open(tmp.path()).store();
        store.questionnaires().unwrap();
        assert!(tmp.path().join(".qt/storage/Q.json").is_file());
    }
}
