use chrono::NaiveDate;
use nonempty::NonEmpty;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    date, validation::required, FollowUpStatus, FollowUpType, LinkCategory, ValidationError,
};

/// A request or clarification item raised against a questionnaire.
///
/// The questionnaire reference is weak: deleting the questionnaire leaves it
/// pointing at nothing, and views render such a reference as unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowUp {
    pub(crate) id: String,
    /// Identifier of the questionnaire this follow-up concerns. Required.
    pub questionnaire_id: String,
    /// One-line subject. Required.
    pub subject: String,
    /// What kind of request this is. Never empty.
    #[serde(default)]
    pub types: FollowUpTypes,
    /// Progress of the request.
    pub status: FollowUpStatus,
    /// When the request arrived.
    pub date_received: NaiveDate,
    /// When a response is due.
    #[serde(default, with = "date::optional", skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    /// Longer description of the request.
    #[serde(default)]
    pub description: String,
    /// Reference links, in the order they were added.
    #[serde(default)]
    pub links: Vec<FollowUpLink>,
}

impl FollowUp {
    /// The stable identifier assigned at creation.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Checks the fields a caller may edit.
    ///
    /// # Errors
    ///
    /// Returns an error if the subject or questionnaire reference is blank,
    /// or if any link lacks a label or URL.
    pub fn validate(&self) -> Result<(), ValidationError> {
        required("subject", self.subject.clone())?;
        required("questionnaire", self.questionnaire_id.clone())?;
        self.links.iter().try_for_each(FollowUpLink::validate)
    }

    /// Appends a reference link, assigning it a fresh identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the label or URL is blank. The follow-up is left
    /// unchanged in that case.
    pub fn add_link(&mut self, link: NewLink) -> Result<&FollowUpLink, ValidationError> {
        let link = link.build()?;
        let index = self.links.len();
        self.links.push(link);
        Ok(&self.links[index])
    }

    /// Removes the link with the given identifier, returning it if present.
    pub fn remove_link(&mut self, link_id: &str) -> Option<FollowUpLink> {
        let position = self.links.iter().position(|link| link.id == link_id)?;
        Some(self.links.remove(position))
    }
}

/// The non-empty set of types carried by a follow-up.
///
/// Insertion order is kept and duplicates are dropped. The set can never be
/// emptied: removing the last remaining type is refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FollowUpType>", into = "Vec<FollowUpType>")]
pub struct FollowUpTypes(NonEmpty<FollowUpType>);

impl FollowUpTypes {
    /// A set containing a single type.
    #[must_use]
    pub fn new(first: FollowUpType) -> Self {
        Self(NonEmpty::new(first))
    }

    /// Whether the set contains `kind`.
    #[must_use]
    pub fn contains(&self, kind: FollowUpType) -> bool {
        self.0.iter().any(|&existing| existing == kind)
    }

    /// Adds `kind` to the set.
    ///
    /// Returns `true` if it was not already present.
    pub fn insert(&mut self, kind: FollowUpType) -> bool {
        if self.contains(kind) {
            return false;
        }
        self.0.push(kind);
        true
    }

    /// Removes `kind` from the set.
    ///
    /// Returns `Ok(false)` if it was not present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::LastType`] if `kind` is the only type left.
    pub fn remove(&mut self, kind: FollowUpType) -> Result<bool, ValidationError> {
        if !self.contains(kind) {
            return Ok(false);
        }
        let remaining: Vec<_> = self.iter().filter(|&existing| existing != kind).collect();
        self.0 = NonEmpty::from_vec(remaining).ok_or(ValidationError::LastType(kind))?;
        Ok(true)
    }

    /// Iterates over the types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = FollowUpType> + '_ {
        self.0.iter().copied()
    }
}

impl Default for FollowUpTypes {
    fn default() -> Self {
        Self::new(FollowUpType::default())
    }
}

impl TryFrom<Vec<FollowUpType>> for FollowUpTypes {
    type Error = ValidationError;

    fn try_from(kinds: Vec<FollowUpType>) -> Result<Self, Self::Error> {
        let mut unique: Vec<FollowUpType> = Vec::with_capacity(kinds.len());
        for kind in kinds {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        NonEmpty::from_vec(unique)
            .map(Self)
            .ok_or(ValidationError::NoTypes)
    }
}

impl From<FollowUpTypes> for Vec<FollowUpType> {
    fn from(types: FollowUpTypes) -> Self {
        types.0.into()
    }
}

/// A reference link attached to a follow-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpLink {
    /// Identifier of the link within its follow-up.
    pub id: String,
    /// Text shown for the link.
    pub label: String,
    /// Target of the link.
    pub url: String,
    /// Which side of the exchange the link belongs to.
    pub category: LinkCategory,
}

impl FollowUpLink {
    fn validate(&self) -> Result<(), ValidationError> {
        required("link label", self.label.clone())?;
        required("link url", self.url.clone())?;
        Ok(())
    }
}

/// The caller-supplied fields of a link about to be attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLink {
    /// Text shown for the link. Required.
    pub label: String,
    /// Target of the link. Required.
    pub url: String,
    /// Defaults to `OECD Request`.
    pub category: Option<LinkCategory>,
}

impl NewLink {
    /// A link with the default category.
    #[must_use]
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
            category: None,
        }
    }

    fn build(self) -> Result<FollowUpLink, ValidationError> {
        let label = required("link label", self.label)?;
        let url = required("link url", self.url)?;
        Ok(FollowUpLink {
            id: Uuid::new_v4().to_string(),
            label: label.to_string(),
            url: url.to_string(),
            category: self.category.unwrap_or_default(),
        })
    }
}

/// The caller-supplied fields of a follow-up about to be created.
///
/// Omitted fields take their defaults: types `[Clarification]`, status
/// `Open`, date received today, no links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFollowUp {
    /// Identifier of the questionnaire concerned. Required.
    pub questionnaire_id: String,
    /// One-line subject. Required.
    pub subject: String,
    /// Request types.
    pub types: Option<FollowUpTypes>,
    /// Initial status.
    pub status: Option<FollowUpStatus>,
    /// Arrival date.
    pub date_received: Option<NaiveDate>,
    /// Due date.
    pub deadline: Option<NaiveDate>,
    /// Longer description.
    pub description: String,
    /// Initial links, in order.
    pub links: Vec<NewLink>,
}

impl NewFollowUp {
    /// Starts a follow-up with its two required fields.
    #[must_use]
    pub fn new(questionnaire_id: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            questionnaire_id: questionnaire_id.into(),
            subject: subject.into(),
            ..Self::default()
        }
    }

    pub(crate) fn build(self, id: String, today: NaiveDate) -> Result<FollowUp, ValidationError> {
        let questionnaire_id = required("questionnaire", self.questionnaire_id)?;
        let subject = required("subject", self.subject)?;
        let links = self
            .links
            .into_iter()
            .map(NewLink::build)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FollowUp {
            id,
            questionnaire_id: questionnaire_id.to_string(),
            subject: subject.to_string(),
            types: self.types.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            date_received: self.date_received.unwrap_or(today),
            deadline: self.deadline,
            description: self.description,
            links,
        })
    }
}
