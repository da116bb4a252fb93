use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{
    date,
    validation::{check_counts, required},
    QuestionnaireStatus, Section, ValidationError,
};

/// A tracked review document with a completion metric and a workflow status.
///
/// The identifier, the last-modified date and the unanswered count are owned
/// by the store. Everything else may be edited freely and written back with
/// [`Store::update`](crate::Store::update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub(crate) id: String,
    /// Human-readable title. Required.
    pub title: String,
    /// Where the questionnaire lives. Required.
    pub url: String,
    /// Workflow status.
    pub status: QuestionnaireStatus,
    /// Number of responses collected so far.
    #[serde(default)]
    pub responses: u32,
    pub(crate) last_modified: NaiveDate,
    /// When the questionnaire arrived.
    pub date_received: NaiveDate,
    /// When answers are due.
    #[serde(default, with = "date::optional", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    /// When review finished.
    #[serde(default, with = "date::optional", skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<NaiveDate>,
    /// When the answers were delivered to the OECD.
    #[serde(
        rename = "dateSubmittedToOECD",
        default,
        with = "date::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_submitted_to_oecd: Option<NaiveDate>,
    /// Free-form batch label, for example `Batch 1`.
    #[serde(default)]
    pub batch_id: String,
    /// Number of questions in the questionnaire.
    pub total_questions: u32,
    /// Number of questions answered.
    pub answered_questions: u32,
    pub(crate) unanswered_questions: u32,
    /// The section this questionnaire reports under.
    pub section_name: Section,
}

impl Questionnaire {
    /// The stable identifier assigned at creation.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the record was last written.
    #[must_use]
    pub const fn last_modified(&self) -> NaiveDate {
        self.last_modified
    }

    /// Questions still to answer.
    ///
    /// Always `total_questions - answered_questions` for records that have
    /// passed through the store.
    #[must_use]
    pub const fn unanswered_questions(&self) -> u32 {
        self.unanswered_questions
    }

    /// Percentage of questions answered, rounded to the nearest integer.
    #[must_use]
    pub fn completion_rate(&self) -> u32 {
        crate::summary::completion_rate(self.answered_questions, self.total_questions)
    }

    /// Checks the fields a caller may edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the title or URL is blank, or if more questions
    /// are answered than exist.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("title", self.title.clone())?;
        required("url", self.url.clone())?;
        check_counts(self.answered_questions, self.total_questions)
    }

    /// Recomputes store-owned fields ahead of a write.
    pub(crate) fn stamp(&mut self, today: NaiveDate) {
        self.unanswered_questions = self.total_questions.saturating_sub(self.answered_questions);
        self.last_modified = today;
    }
}

/// The caller-supplied fields of a questionnaire about to be created.
///
/// Omitted fields take their defaults: status `Draft`, section
/// `Environment`, counts zero, date received today.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewQuestionnaire {
    /// Human-readable title. Required.
    pub title: String,
    /// Where the questionnaire lives. Required.
    pub url: String,
    /// Initial status.
    pub status: Option<QuestionnaireStatus>,
    /// Responses collected so far.
    pub responses: u32,
    /// Batch label.
    pub batch_id: String,
    /// Reporting section.
    pub section: Option<Section>,
    /// Number of questions.
    pub total_questions: u32,
    /// Number answered.
    pub answered_questions: u32,
    /// Arrival date.
    pub date_received: Option<NaiveDate>,
    /// Due date.
    pub deadline: Option<NaiveDate>,
    /// Completion date.
    pub date_completed: Option<NaiveDate>,
    /// Delivery date.
    pub date_submitted_to_oecd: Option<NaiveDate>,
}

impl NewQuestionnaire {
    /// Starts a questionnaire with its two required fields.
    #[must_use]
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    pub(crate) fn build(self, id: String, today: NaiveDate) -> Result<Questionnaire, ValidationError> {
        let title = required("title", self.title)?;
        let url = required("url", self.url)?;
        check_counts(self.answered_questions, self.total_questions)?;

        let mut questionnaire = Questionnaire {
            id,
            title: title.to_string(),
            url: url.to_string(),
            status: self.status.unwrap_or_default(),
            responses: self.responses,
            last_modified: today,
            date_received: self.date_received.unwrap_or(today),
            deadline: self.deadline,
            date_completed: self.date_completed,
            date_submitted_to_oecd: self.date_submitted_to_oecd,
            batch_id: self.batch_id,
            total_questions: self.total_questions,
            answered_questions: self.answered_questions,
            unanswered_questions: 0,
            section_name: self.section.unwrap_or_default(),
        };
        questionnaire.stamp(today);
        Ok(questionnaire)
    }
}
