//! Questionnaire and follow-up tracking
//!
//! Questionnaires and the follow-up requests raised against them are kept in a
//! [`Store`], persisted as JSON collections in a workspace directory.
//! [`summary`] derives progress and deadline figures from them.

pub mod domain;
pub use domain::{
    Clock, Config, FollowUp, FollowUpStatus, FollowUpType, FollowUpTypes, LinkCategory,
    NewFollowUp, NewLink, NewQuestionnaire, Questionnaire, QuestionnaireStatus, Section,
    ValidationError,
};

pub mod identity;
pub use identity::{ConfiguredIdentity, IdentityError, IdentityProvider, Profile};

pub mod route;
pub use route::Route;

/// Persistence, documents and workspace layout.
pub mod storage;
pub use storage::{
    Backend, DocumentError, DocumentLibrary, FileBackend, MemoryBackend, Store, StoreError,
    Workspace,
};

pub mod summary;
pub use summary::{Deadline, Summary};
