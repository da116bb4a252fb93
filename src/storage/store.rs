//! The record store.
//!
//! [`Store`] is the sole owner of persisted questionnaires and follow-ups.
//! Each collection is serialized as one JSON array under its own key, and the
//! whole collection is re-read on every access and rewritten on every
//! mutation. There is no cache: two stores over the same backend always see
//! each other's writes, and the last writer wins.

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::{
    domain::{
        Clock, Config, FollowUp, NewFollowUp, NewQuestionnaire, Questionnaire, SystemClock,
        ValidationError,
    },
    storage::{
        backend::{Backend, BackendError},
        seed,
    },
};

/// A record type the store can hold.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Human-readable name of the record type, used in messages.
    const KIND: &'static str;

    /// The record's identifier.
    fn id(&self) -> &str;

    /// The key this record type's collection is stored under.
    fn storage_key(keys: &StorageKeys) -> &str;

    /// The collection returned when nothing has been stored yet.
    ///
    /// A non-empty default is persisted the first time it is returned.
    fn defaults() -> Vec<Self> {
        Vec::new()
    }

    /// Checks caller-editable fields before a write.
    ///
    /// # Errors
    ///
    /// Returns an error describing the first invalid field.
    fn validate(&self) -> Result<(), ValidationError>;

    /// Recomputes store-owned fields ahead of an update.
    fn prepare_update(&mut self, _today: NaiveDate) {}
}

impl Record for Questionnaire {
    const KIND: &'static str = "questionnaire";

    fn id(&self) -> &str {
        self.id()
    }

    fn storage_key(keys: &StorageKeys) -> &str {
        &keys.questionnaires
    }

    fn defaults() -> Vec<Self> {
        seed::questionnaires()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.validate()
    }

    fn prepare_update(&mut self, today: NaiveDate) {
        self.stamp(today);
    }
}

impl Record for FollowUp {
    const KIND: &'static str = "follow-up";

    fn id(&self) -> &str {
        self.id()
    }

    fn storage_key(keys: &StorageKeys) -> &str {
        &keys.follow_ups
    }

    fn validate(&self) -> Result<(), ValidationError> {
        self.validate()
    }
}

/// The keys each collection is persisted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    /// Key of the questionnaire collection.
    pub questionnaires: String,
    /// Key of the follow-up collection.
    pub follow_ups: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for StorageKeys {
    fn from(config: &Config) -> Self {
        Self {
            questionnaires: config.questionnaire_key().to_string(),
            follow_ups: config.follow_up_key().to_string(),
        }
    }
}

/// Failure of a store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The persistence medium failed.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// A stored collection could not be parsed.
    ///
    /// Corrupt collections are reported, never repaired or discarded.
    #[error("stored {kind} collection under '{key}' is corrupt: {source}")]
    Corrupt {
        /// The record type of the collection.
        kind: &'static str,
        /// The storage key read.
        key: String,
        /// The parse failure.
        #[source]
        source: serde_json::Error,
    },

    /// A collection could not be serialized.
    #[error("failed to encode {kind} collection: {source}")]
    Encode {
        /// The record type of the collection.
        kind: &'static str,
        /// The encoding failure.
        #[source]
        source: serde_json::Error,
    },

    /// No record has the requested identifier.
    #[error("{kind} '{id}' not found")]
    NotFound {
        /// The record type searched.
        kind: &'static str,
        /// The identifier searched for.
        id: String,
    },

    /// The record was rejected before anything was written.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl StoreError {
    /// Whether this error reports a missing record.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    fn not_found<T: Record>(id: &str) -> Self {
        Self::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }
}

/// The record store.
///
/// The store is passed explicitly to whatever needs it; it is never global.
#[derive(Debug)]
pub struct Store<B, C = SystemClock> {
    backend: B,
    clock: C,
    keys: StorageKeys,
}

impl<B: Backend> Store<B> {
    /// A store over `backend` using the default keys and the system clock.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: SystemClock,
            keys: StorageKeys::default(),
        }
    }
}

impl<B: Backend, C: Clock> Store<B, C> {
    /// Replaces the clock used to stamp records.
    pub fn with_clock<C2: Clock>(self, clock: C2) -> Store<B, C2> {
        Store {
            backend: self.backend,
            clock,
            keys: self.keys,
        }
    }

    /// Replaces the keys collections are stored under.
    #[must_use]
    pub fn with_keys(mut self, keys: StorageKeys) -> Self {
        self.keys = keys;
        self
    }

    /// The underlying backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Today's date according to the store's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Returns every record of type `T`.
    ///
    /// When nothing has been stored yet, the type's defaults are returned,
    /// and persisted first if there are any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or the stored collection cannot
    /// be parsed.
    pub fn list<T: Record>(&mut self) -> Result<Vec<T>, StoreError> {
        let key = T::storage_key(&self.keys).to_string();
        let Some(raw) = self.backend.get(&key)? else {
            let defaults = T::defaults();
            if !defaults.is_empty() {
                tracing::debug!("seeding {} default {} records", defaults.len(), T::KIND);
                self.persist(&defaults)?;
            }
            return Ok(defaults);
        };

        serde_json::from_str(&raw).map_err(|source| StoreError::Corrupt {
            kind: T::KIND,
            key,
            source,
        })
    }

    /// Finds the record of type `T` with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be read. A missing record
    /// is `Ok(None)`.
    pub fn get<T: Record>(&mut self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.list::<T>()?.into_iter().find(|record| record.id() == id))
    }

    /// Creates a questionnaire.
    ///
    /// Omitted fields take their defaults, a fresh identifier is assigned,
    /// and the unanswered count is derived.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (nothing is written), or if the
    /// collection cannot be read or written.
    pub fn add_questionnaire(
        &mut self,
        new: NewQuestionnaire,
    ) -> Result<Questionnaire, StoreError> {
        let questionnaire = new.build(Uuid::new_v4().to_string(), self.today())?;
        self.append(questionnaire)
    }

    /// Creates a follow-up.
    ///
    /// The referenced questionnaire is not required to exist.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails (nothing is written), or if the
    /// collection cannot be read or written.
    pub fn add_follow_up(&mut self, new: NewFollowUp) -> Result<FollowUp, StoreError> {
        let follow_up = new.build(Uuid::new_v4().to_string(), self.today())?;
        self.append(follow_up)
    }

    fn append<T: Record>(&mut self, record: T) -> Result<T, StoreError> {
        let mut records = self.list::<T>()?;
        records.push(record.clone());
        self.persist(&records)?;
        tracing::info!("added {} {}", T::KIND, record.id());
        Ok(record)
    }

    /// Replaces the stored record that has the same identifier as `record`.
    ///
    /// Store-owned fields are recomputed: for questionnaires the unanswered
    /// count is derived again and the last-modified date is set to today,
    /// whatever the caller supplied. The record as written is returned.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has that identifier, in
    /// which case nothing is written. Also fails on validation or backend
    /// errors.
    pub fn update<T: Record>(&mut self, mut record: T) -> Result<T, StoreError> {
        record.validate()?;

        let mut records = self.list::<T>()?;
        let Some(slot) = records.iter_mut().find(|existing| existing.id() == record.id()) else {
            return Err(StoreError::not_found::<T>(record.id()));
        };

        record.prepare_update(self.clock.today());
        slot.clone_from(&record);
        self.persist(&records)?;
        tracing::info!("updated {} {}", T::KIND, record.id());
        Ok(record)
    }

    /// Removes the record of type `T` with the given identifier, returning it.
    ///
    /// Deleting a questionnaire leaves follow-ups that reference it untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no record has that identifier.
    /// Also fails on backend errors.
    pub fn delete<T: Record>(&mut self, id: &str) -> Result<T, StoreError> {
        let mut records = self.list::<T>()?;
        let Some(position) = records.iter().position(|record| record.id() == id) else {
            return Err(StoreError::not_found::<T>(id));
        };

        let removed = records.remove(position);
        self.persist(&records)?;
        tracing::info!("deleted {} {id}", T::KIND);
        Ok(removed)
    }

    /// Discards the stored questionnaires so the defaults are seeded again on
    /// next access. Follow-ups are not touched.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot remove the collection.
    pub fn reset(&mut self) -> Result<(), StoreError> {
        let key = Questionnaire::storage_key(&self.keys);
        self.backend.remove(key)?;
        tracing::info!("reset questionnaires to defaults");
        Ok(())
    }

    /// Every questionnaire.
    ///
    /// # Errors
    ///
    /// See [`Store::list`].
    pub fn questionnaires(&mut self) -> Result<Vec<Questionnaire>, StoreError> {
        self.list()
    }

    /// Every follow-up.
    ///
    /// # Errors
    ///
    /// See [`Store::list`].
    pub fn follow_ups(&mut self) -> Result<Vec<FollowUp>, StoreError> {
        self.list()
    }

    /// The questionnaire with the given identifier.
    ///
    /// # Errors
    ///
    /// See [`Store::get`].
    pub fn questionnaire(&mut self, id: &str) -> Result<Option<Questionnaire>, StoreError> {
        self.get(id)
    }

    /// The follow-up with the given identifier.
    ///
    /// # Errors
    ///
    /// See [`Store::get`].
    pub fn follow_up(&mut self, id: &str) -> Result<Option<FollowUp>, StoreError> {
        self.get(id)
    }

    /// Follow-ups referencing the given questionnaire, in stored order.
    ///
    /// # Errors
    ///
    /// See [`Store::list`].
    pub fn follow_ups_for(&mut self, questionnaire_id: &str) -> Result<Vec<FollowUp>, StoreError> {
        let mut follow_ups = self.follow_ups()?;
        follow_ups.retain(|follow_up| follow_up.questionnaire_id == questionnaire_id);
        Ok(follow_ups)
    }

    fn persist<T: Record>(&mut self, records: &[T]) -> Result<(), StoreError> {
        let key = T::storage_key(&self.keys);
        let encoded = serde_json::to_string(records).map_err(|source| StoreError::Encode {
            kind: T::KIND,
            source,
        })?;
        self.backend.set(key, encoded)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        domain::{FollowUpStatus, QuestionnaireStatus, Section},
        storage::backend::MemoryBackend,
    };

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn store() -> Store<MemoryBackend, NaiveDate> {
        Store::new(MemoryBackend::new()).with_clock(date(2025, 3, 1))
    }

    fn trade_questionnaire(total: u32, answered: u32) -> NewQuestionnaire {
        NewQuestionnaire {
            section: Some(Section::Trade),
            total_questions: total,
            answered_questions: answered,
            ..NewQuestionnaire::new("Trade Review", "https://example.org/trade")
        }
    }

    #[test]
    fn first_list_seeds_and_persists_defaults() {
        let mut store = store();
        let first = store.questionnaires().unwrap();
        assert_eq!(first.len(), 8);
        assert!(store.backend().get("INA_OECD_QUESTIONNAIRES").unwrap().is_some());

        let second = store.questionnaires().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn follow_ups_default_to_empty_without_persisting() {
        let mut store = store();
        assert!(store.follow_ups().unwrap().is_empty());
        assert!(store.backend().get("INA_OECD_FOLLOWUPS").unwrap().is_none());
    }

    #[test]
    fn add_derives_unanswered_and_persists() {
        let mut store = store();
        let added = store.add_questionnaire(trade_questionnaire(20, 8)).unwrap();

        assert_eq!(added.unanswered_questions(), 12);
        assert_eq!(added.last_modified(), date(2025, 3, 1));
        assert_eq!(store.questionnaires().unwrap().len(), 9);
        assert_eq!(store.questionnaire(added.id()).unwrap(), Some(added));
    }

    #[test]
    fn add_assigns_distinct_ids() {
        let mut store = store();
        let a = store.add_questionnaire(trade_questionnaire(1, 0)).unwrap();
        let b = store.add_questionnaire(trade_questionnaire(1, 0)).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn invalid_add_writes_nothing() {
        let mut store = store();
        let before = store.questionnaires().unwrap();

        let err = store
            .add_questionnaire(NewQuestionnaire::new("", "https://example.org"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(ValidationError::Missing("title"))));

        let err = store.add_questionnaire(trade_questionnaire(5, 6)).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::AnsweredExceedsTotal { .. })
        ));

        assert_eq!(store.questionnaires().unwrap(), before);
    }

    #[test]
    fn update_recomputes_store_owned_fields() {
        let mut store = store();
        let mut q = store.questionnaire("3").unwrap().unwrap();
        q.answered_questions = 30;
        q.unanswered_questions = 99;
        q.last_modified = date(1999, 1, 1);
        q.status = QuestionnaireStatus::SubmitForReview;

        let written = store.update(q).unwrap();
        assert_eq!(written.unanswered_questions(), 0);
        assert_eq!(written.last_modified(), date(2025, 3, 1));

        let reloaded = store.questionnaire("3").unwrap().unwrap();
        assert_eq!(reloaded, written);
        assert_eq!(reloaded.status, QuestionnaireStatus::SubmitForReview);
    }

    #[test]
    fn update_keeps_position_in_collection() {
        let mut store = store();
        let mut q = store.questionnaire("4").unwrap().unwrap();
        q.title = "Renamed".to_string();
        store.update(q).unwrap();

        let ids: Vec<_> = store
            .questionnaires()
            .unwrap()
            .iter()
            .map(|q| q.id().to_string())
            .collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn update_of_unknown_id_is_not_found_and_writes_nothing() {
        let mut store = store();
        let mut q = store.questionnaire("1").unwrap().unwrap();
        q.id = "missing".to_string();
        q.title = "Changed".to_string();
        let before = store.backend().get("INA_OECD_QUESTIONNAIRES").unwrap();

        let err = store.update(q).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "questionnaire 'missing' not found");
        assert_eq!(store.backend().get("INA_OECD_QUESTIONNAIRES").unwrap(), before);
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let mut store = store();
        let removed: Questionnaire = store.delete("2").unwrap();
        assert_eq!(removed.title, "Market Access Review");

        let remaining = store.questionnaires().unwrap();
        assert_eq!(remaining.len(), 7);
        assert!(store.questionnaire("2").unwrap().is_none());

        assert!(store.delete::<Questionnaire>("2").unwrap_err().is_not_found());
    }

    #[test]
    fn deleting_a_questionnaire_leaves_follow_ups_dangling() {
        let mut store = store();
        let follow_up = store
            .add_follow_up(NewFollowUp::new("8", "Clarification on Digital Tax Section"))
            .unwrap();

        store.delete::<Questionnaire>("8").unwrap();

        let kept = store.follow_up(follow_up.id()).unwrap().unwrap();
        assert_eq!(kept.questionnaire_id, "8");
        assert_eq!(store.follow_ups_for("8").unwrap().len(), 1);
    }

    #[test]
    fn reset_restores_defaults_but_keeps_follow_ups() {
        let mut store = store();
        store.delete::<Questionnaire>("1").unwrap();
        let mut q = store.questionnaire("2").unwrap().unwrap();
        q.title = "Edited".to_string();
        store.update(q).unwrap();
        store.add_questionnaire(trade_questionnaire(3, 1)).unwrap();
        store.add_follow_up(NewFollowUp::new("2", "Data request")).unwrap();

        store.reset().unwrap();

        assert_eq!(store.questionnaires().unwrap(), seed::questionnaires());
        assert_eq!(store.follow_ups().unwrap().len(), 1);
    }

    #[test]
    fn follow_up_update_replaces_whole_record() {
        let mut store = store();
        let mut f = store.add_follow_up(NewFollowUp::new("1", "Subject")).unwrap();
        f.status = FollowUpStatus::Answered;
        f.description = "Sent the figures".to_string();

        store.update(f.clone()).unwrap();
        assert_eq!(store.follow_up(f.id()).unwrap(), Some(f));
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let mut backend = MemoryBackend::new();
        backend
            .set("INA_OECD_QUESTIONNAIRES", "not json".to_string())
            .unwrap();
        let mut store = Store::new(backend);

        let err = store.questionnaires().unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { kind: "questionnaire", .. }));
    }

    #[test]
    fn unknown_enum_value_in_snapshot_is_rejected() {
        let mut backend = MemoryBackend::new();
        backend
            .set(
                "INA_OECD_FOLLOWUPS",
                r#"[{"id":"1","questionnaireId":"8","subject":"s","types":["Clarification"],"status":"Pending","dateReceived":"2025-01-01"}]"#.to_string(),
            )
            .unwrap();
        let mut store = Store::new(backend);

        assert!(matches!(
            store.follow_ups().unwrap_err(),
            StoreError::Corrupt { kind: "follow-up", .. }
        ));
    }

    #[test]
    fn legacy_snapshot_fields_are_tolerated() {
        let mut backend = MemoryBackend::new();
        backend
            .set(
                "INA_OECD_FOLLOWUPS",
                r#"[{"id":"1","questionnaireId":"8","subject":"s","status":"Open","dateReceived":"2025-01-01","deadline":"","description":"","links":[]}]"#.to_string(),
            )
            .unwrap();
        let mut store = Store::new(backend);

        let follow_up = store.follow_up("1").unwrap().unwrap();
        assert_eq!(follow_up.deadline, None);
        assert_eq!(follow_up.types, crate::domain::FollowUpTypes::default());
    }

    #[test]
    fn custom_keys_isolate_collections() {
        let keys = StorageKeys {
            questionnaires: "Q".to_string(),
            follow_ups: "F".to_string(),
        };
        let mut store = store().with_keys(keys);
        store.questionnaires().unwrap();

        assert!(store.backend().get("Q").unwrap().is_some());
        assert!(store.backend().get("INA_OECD_QUESTIONNAIRES").unwrap().is_none());
    }
}
