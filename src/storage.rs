/// Key-value persistence backends.
pub mod backend;
/// The shared document library.
pub mod documents;
pub(crate) mod seed;
/// The record store.
pub mod store;
/// Workspace layout and initialisation.
pub mod workspace;

pub use backend::{Backend, BackendError, FileBackend, MemoryBackend};
pub use documents::{DocumentError, DocumentInfo, DocumentLibrary, FolderLibrary};
pub use store::{Record, StorageKeys, Store, StoreError};
pub use workspace::{Workspace, WorkspaceError};
