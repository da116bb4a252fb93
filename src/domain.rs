//! Domain models for questionnaire tracking.
//!
//! This module contains the two record types (questionnaires and follow-ups),
//! their closed vocabularies, validation rules, and configuration.

mod clock;
pub use clock::{Clock, SystemClock};

mod config;
pub use config::{Config, ConfigError, GroupConfig, ProfileConfig};

mod date;

mod enums;
pub use enums::{
    FollowUpStatus, FollowUpType, LinkCategory, QuestionnaireStatus, Section, UnknownVariantError,
};

/// Follow-up requests and their links.
pub mod follow_up;
pub use follow_up::{FollowUp, FollowUpLink, FollowUpTypes, NewFollowUp, NewLink};

/// Questionnaire records.
pub mod questionnaire;
pub use questionnaire::{NewQuestionnaire, Questionnaire};

mod validation;
pub use validation::ValidationError;
