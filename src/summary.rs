//! Aggregates over questionnaires and follow-ups.
//!
//! Everything here is a pure function of the records passed in and of an
//! explicit `today`. Nothing is cached; callers re-read the store and
//! recompute.

use std::fmt;

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::domain::{FollowUp, FollowUpStatus, FollowUpType, Questionnaire, QuestionnaireStatus, Section};

/// Title shown for a follow-up whose questionnaire no longer exists.
pub const UNKNOWN_QUESTIONNAIRE: &str = "Unknown Questionnaire";

/// Percentage of `answered` over `total`, rounded half up.
///
/// Zero when `total` is zero.
#[must_use]
pub fn completion_rate(answered: u32, total: u32) -> u32 {
    percent(u64::from(answered), u64::from(total))
}

fn percent(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let rounded = (part * 200 + whole) / (whole * 2);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// A record with a deadline and a workflow that can finish.
pub trait Deadline {
    /// When the record is due, if ever.
    fn deadline(&self) -> Option<NaiveDate>;

    /// Whether the record has reached a final status.
    fn is_terminal(&self) -> bool;

    /// Whether the deadline has passed without the record finishing.
    ///
    /// A deadline of today is not yet overdue.
    fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_terminal() && self.deadline().is_some_and(|deadline| deadline < today)
    }

    /// Whether the deadline falls within the next `days` days, today included.
    fn is_due_soon(&self, today: NaiveDate, days: u32) -> bool {
        if self.is_terminal() {
            return false;
        }
        let horizon = today.checked_add_days(Days::new(u64::from(days)));
        self.deadline().is_some_and(|deadline| {
            today <= deadline && horizon.is_none_or(|horizon| deadline <= horizon)
        })
    }
}

impl Deadline for Questionnaire {
    fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl Deadline for FollowUp {
    fn deadline(&self) -> Option<NaiveDate> {
        self.deadline
    }

    fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

/// A record whose status comes from a closed vocabulary.
pub trait Tracked {
    /// The status vocabulary.
    type Status: Copy + Eq + fmt::Display + Serialize + 'static;

    /// Every status, in declaration order.
    const STATUSES: &'static [Self::Status];

    /// The record's current status.
    fn status(&self) -> Self::Status;
}

impl Tracked for Questionnaire {
    type Status = QuestionnaireStatus;
    const STATUSES: &'static [QuestionnaireStatus] = QuestionnaireStatus::ALL;

    fn status(&self) -> QuestionnaireStatus {
        self.status
    }
}

impl Tracked for FollowUp {
    type Status = FollowUpStatus;
    const STATUSES: &'static [FollowUpStatus] = FollowUpStatus::ALL;

    fn status(&self) -> FollowUpStatus {
        self.status
    }
}

/// How many records are overdue and how many are due soon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeadlineCounts {
    /// Records past their deadline.
    pub overdue: usize,
    /// Records due within the window.
    pub due_soon: usize,
}

/// Counts overdue and due-soon records.
#[must_use]
pub fn deadline_counts<T: Deadline>(records: &[T], today: NaiveDate, days: u32) -> DeadlineCounts {
    records
        .iter()
        .fold(DeadlineCounts::default(), |mut counts, record| {
            if record.is_overdue(today) {
                counts.overdue += 1;
            }
            if record.is_due_soon(today, days) {
                counts.due_soon += 1;
            }
            counts
        })
}

/// Answered questions over total questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Questions answered.
    pub answered: u64,
    /// Questions in total.
    pub total: u64,
    /// Rounded percentage answered.
    pub rate: u32,
}

impl<'a> FromIterator<&'a Questionnaire> for Progress {
    fn from_iter<I: IntoIterator<Item = &'a Questionnaire>>(iter: I) -> Self {
        let (answered, total) = iter.into_iter().fold((0, 0), |(answered, total), q| {
            (
                answered + u64::from(q.answered_questions),
                total + u64::from(q.total_questions),
            )
        });
        Self {
            answered,
            total,
            rate: percent(answered, total),
        }
    }
}

/// Progress across every questionnaire.
#[must_use]
pub fn overall_progress(questionnaires: &[Questionnaire]) -> Progress {
    questionnaires.iter().collect()
}

/// Progress of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionProgress {
    /// The section.
    pub section: Section,
    /// Number of questionnaires in the section.
    pub questionnaires: usize,
    /// Combined progress of those questionnaires.
    #[serde(flatten)]
    pub progress: Progress,
}

/// Progress per section, in section order.
///
/// Each section's rate is computed over its own combined totals. Sections
/// without questionnaires are left out.
#[must_use]
pub fn section_progress(questionnaires: &[Questionnaire]) -> Vec<SectionProgress> {
    Section::ALL
        .iter()
        .filter_map(|&section| {
            let members: Vec<_> = questionnaires
                .iter()
                .filter(|q| q.section_name == section)
                .collect();
            (!members.is_empty()).then(|| SectionProgress {
                section,
                questionnaires: members.len(),
                progress: members.into_iter().collect(),
            })
        })
        .collect()
}

/// One bar of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bucket<K> {
    /// The value counted.
    pub key: K,
    /// Occurrences.
    pub count: usize,
    /// `count` as a percentage of the number of records. Zero when there are
    /// no records.
    pub percentage: f64,
}

fn histogram<K: Copy + Eq>(keys: &[K], records: usize, counts: impl Fn(K) -> usize) -> Vec<Bucket<K>> {
    keys.iter()
        .map(|&key| {
            let count = counts(key);
            #[allow(clippy::cast_precision_loss)]
            let percentage = if records == 0 {
                0.0
            } else {
                count as f64 / records as f64 * 100.0
            };
            Bucket {
                key,
                count,
                percentage,
            }
        })
        .collect()
}

/// Records per status, one bucket per status in declaration order.
#[must_use]
pub fn status_histogram<T: Tracked>(records: &[T]) -> Vec<Bucket<T::Status>> {
    histogram(T::STATUSES, records.len(), |status| {
        records.iter().filter(|record| record.status() == status).count()
    })
}

/// Follow-ups per type.
///
/// A follow-up counts towards every type it carries, so the counts can add up
/// to more than the number of follow-ups.
#[must_use]
pub fn type_histogram(follow_ups: &[FollowUp]) -> Vec<Bucket<FollowUpType>> {
    histogram(FollowUpType::ALL, follow_ups.len(), |kind| {
        follow_ups.iter().filter(|f| f.types.contains(kind)).count()
    })
}

/// How many follow-ups have been answered or closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Follow-ups answered or closed.
    pub resolved: usize,
    /// All follow-ups.
    pub total: usize,
    /// Rounded percentage resolved.
    pub rate: u32,
}

/// The resolution rate of a set of follow-ups.
#[must_use]
pub fn resolution(follow_ups: &[FollowUp]) -> Resolution {
    let resolved = follow_ups.iter().filter(|f| f.status.is_terminal()).count();
    let total = follow_ups.len();
    Resolution {
        resolved,
        total,
        rate: percent(resolved as u64, total as u64),
    }
}

/// The title of the questionnaire with the given identifier, or
/// [`UNKNOWN_QUESTIONNAIRE`] if there is none.
#[must_use]
pub fn questionnaire_title<'a>(questionnaires: &'a [Questionnaire], id: &str) -> &'a str {
    questionnaires
        .iter()
        .find(|q| q.id() == id)
        .map_or(UNKNOWN_QUESTIONNAIRE, |q| q.title.as_str())
}

/// The dashboard: every aggregate at once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// The date deadlines were evaluated against.
    pub today: NaiveDate,
    /// Width of the due-soon window.
    pub due_soon_days: u32,
    /// Number of questionnaires.
    pub questionnaire_count: usize,
    /// Number of follow-ups.
    pub follow_up_count: usize,
    /// Progress across every questionnaire.
    pub overall: Progress,
    /// Progress per section.
    pub sections: Vec<SectionProgress>,
    /// Questionnaire deadline counts.
    pub questionnaire_deadlines: DeadlineCounts,
    /// Follow-up deadline counts.
    pub follow_up_deadlines: DeadlineCounts,
    /// Questionnaires per status.
    pub questionnaire_statuses: Vec<Bucket<QuestionnaireStatus>>,
    /// Follow-ups per status.
    pub follow_up_statuses: Vec<Bucket<FollowUpStatus>>,
    /// Follow-ups per type.
    pub follow_up_types: Vec<Bucket<FollowUpType>>,
    /// Follow-up resolution.
    pub resolution: Resolution,
}

impl Summary {
    /// Computes the dashboard.
    #[must_use]
    pub fn compute(
        questionnaires: &[Questionnaire],
        follow_ups: &[FollowUp],
        today: NaiveDate,
        due_soon_days: u32,
    ) -> Self {
        Self {
            today,
            due_soon_days,
            questionnaire_count: questionnaires.len(),
            follow_up_count: follow_ups.len(),
            overall: overall_progress(questionnaires),
            sections: section_progress(questionnaires),
            questionnaire_deadlines: deadline_counts(questionnaires, today, due_soon_days),
            follow_up_deadlines: deadline_counts(follow_ups, today, due_soon_days),
            questionnaire_statuses: status_histogram(questionnaires),
            follow_up_statuses: status_histogram(follow_ups),
            follow_up_types: type_histogram(follow_ups),
            resolution: resolution(follow_ups),
        }
    }

    /// Total overdue records of either kind.
    #[must_use]
    pub const fn overdue(&self) -> usize {
        self.questionnaire_deadlines.overdue + self.follow_up_deadlines.overdue
    }
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use crate::domain::{NewFollowUp, NewQuestionnaire};

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn questionnaire(
        section: Section,
        answered: u32,
        total: u32,
        status: QuestionnaireStatus,
        deadline: Option<NaiveDate>,
    ) -> Questionnaire {
        NewQuestionnaire {
            status: Some(status),
            section: Some(section),
            answered_questions: answered,
            total_questions: total,
            deadline,
            ..NewQuestionnaire::new("Q", "https://example.org/q")
        }
        .build("q".to_string(), date(2025, 1, 1))
        .unwrap()
    }

    fn follow_up(status: FollowUpStatus, types: &[FollowUpType]) -> FollowUp {
        NewFollowUp {
            status: Some(status),
            types: Some(types.to_vec().try_into().unwrap()),
            ..NewFollowUp::new("1", "S")
        }
        .build("f".to_string(), date(2025, 1, 1))
        .unwrap()
    }

    #[test_case(0, 0 => 0; "empty questionnaire")]
    #[test_case(0, 25 => 0; "nothing answered")]
    #[test_case(22, 30 => 73; "rounds down")]
    #[test_case(1, 8 => 13; "rounds half up")]
    #[test_case(50, 50 => 100; "all answered")]
    fn completion(answered: u32, total: u32) -> u32 {
        completion_rate(answered, total)
    }

    #[test]
    fn draft_past_deadline_is_overdue_but_completed_is_not() {
        let today = date(2025, 2, 1);
        let deadline = Some(date(2025, 1, 1));

        let draft = questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Draft, deadline);
        assert!(draft.is_overdue(today));

        let completed = questionnaire(Section::Trade, 1, 1, QuestionnaireStatus::Completed, deadline);
        assert!(!completed.is_overdue(today));
        let sent = questionnaire(Section::Trade, 1, 1, QuestionnaireStatus::SentToOecd, deadline);
        assert!(!sent.is_overdue(today));
    }

    #[test_case(None => (false, false); "no deadline")]
    #[test_case(Some(date(2025, 1, 31)) => (true, false); "yesterday")]
    #[test_case(Some(date(2025, 2, 1)) => (false, true); "today")]
    #[test_case(Some(date(2025, 2, 8)) => (false, true); "edge of window")]
    #[test_case(Some(date(2025, 2, 9)) => (false, false); "beyond window")]
    fn deadline_classification(deadline: Option<NaiveDate>) -> (bool, bool) {
        let today = date(2025, 2, 1);
        let q = questionnaire(Section::Health, 0, 1, QuestionnaireStatus::UnderReview, deadline);
        (q.is_overdue(today), q.is_due_soon(today, 7))
    }

    #[test]
    fn finished_follow_ups_are_never_due() {
        let today = date(2025, 2, 1);
        for status in [FollowUpStatus::Answered, FollowUpStatus::Closed] {
            let mut f = follow_up(status, &[FollowUpType::Clarification]);
            f.deadline = Some(date(2025, 1, 1));
            assert!(!f.is_overdue(today));
            f.deadline = Some(today);
            assert!(!f.is_due_soon(today, 7));
        }
    }

    #[test]
    fn counts_deadlines() {
        let today = date(2025, 2, 1);
        let records = [
            questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Draft, Some(date(2025, 1, 1))),
            questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Draft, Some(date(2025, 2, 3))),
            questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Draft, None),
        ];
        assert_eq!(
            deadline_counts(&records, today, 7),
            DeadlineCounts {
                overdue: 1,
                due_soon: 1
            }
        );
    }

    #[test]
    fn section_progress_combines_totals() {
        let records = [
            questionnaire(Section::Trade, 10, 20, QuestionnaireStatus::Draft, None),
            questionnaire(Section::Trade, 5, 10, QuestionnaireStatus::Draft, None),
            questionnaire(Section::Health, 1, 3, QuestionnaireStatus::Draft, None),
        ];

        let sections = section_progress(&records);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].section, Section::Trade);
        assert_eq!(sections[0].questionnaires, 2);
        assert_eq!(sections[0].progress.rate, 50);
        assert_eq!(sections[1].section, Section::Health);
        assert_eq!(sections[1].progress.rate, 33);
    }

    #[test]
    fn overall_progress_of_nothing_is_zero() {
        assert_eq!(overall_progress(&[]), Progress::default());
    }

    #[test]
    fn status_histogram_covers_every_status() {
        let records = [
            questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Draft, None),
            questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Draft, None),
            questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Completed, None),
            questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Published, None),
        ];
        let histogram = status_histogram(&records);

        assert_eq!(histogram.len(), QuestionnaireStatus::ALL.len());
        assert_eq!(histogram[0].key, QuestionnaireStatus::Draft);
        assert_eq!(histogram[0].count, 2);
        assert!((histogram[0].percentage - 50.0).abs() < f64::EPSILON);
        assert_eq!(histogram.iter().map(|b| b.count).sum::<usize>(), 4);
    }

    #[test]
    fn empty_histogram_has_zero_percentages() {
        let histogram = status_histogram::<FollowUp>(&[]);
        assert!(histogram.iter().all(|b| b.count == 0 && b.percentage == 0.0));
    }

    #[test]
    fn follow_ups_count_towards_every_type() {
        let records = [
            follow_up(
                FollowUpStatus::Open,
                &[FollowUpType::Clarification, FollowUpType::DataRequest],
            ),
            follow_up(FollowUpStatus::Open, &[FollowUpType::DataRequest]),
        ];
        let histogram = type_histogram(&records);
        let counts: Vec<_> = histogram.iter().map(|b| b.count).collect();
        assert_eq!(counts, [1, 0, 2]);
        assert!((histogram[2].percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn resolution_counts_answered_and_closed() {
        let records = [
            follow_up(FollowUpStatus::Answered, &[FollowUpType::Clarification]),
            follow_up(FollowUpStatus::Closed, &[FollowUpType::Clarification]),
            follow_up(FollowUpStatus::InProgress, &[FollowUpType::Clarification]),
        ];
        assert_eq!(
            resolution(&records),
            Resolution {
                resolved: 2,
                total: 3,
                rate: 67
            }
        );
        assert_eq!(resolution(&[]).rate, 0);
    }

    #[test]
    fn dangling_reference_has_unknown_title() {
        let records = [questionnaire(Section::Trade, 0, 1, QuestionnaireStatus::Draft, None)];
        assert_eq!(questionnaire_title(&records, "q"), "Q");
        assert_eq!(questionnaire_title(&records, "gone"), UNKNOWN_QUESTIONNAIRE);
    }

    #[test]
    fn summary_of_seed_data() {
        let questionnaires = crate::storage::seed::questionnaires();
        let summary = Summary::compute(&questionnaires, &[], date(2025, 2, 1), 7);

        assert_eq!(summary.questionnaire_count, 8);
        assert_eq!(summary.overall.total, 210);
        assert_eq!(summary.overall.answered, 162);
        assert_eq!(summary.overall.rate, 77);
        // only the Under Review seed is past due; two deadlines land in the window
        assert_eq!(summary.questionnaire_deadlines.overdue, 1);
        assert_eq!(summary.questionnaire_deadlines.due_soon, 2);
        assert_eq!(summary.overdue(), 1);
        assert_eq!(summary.resolution.total, 0);
    }
}
