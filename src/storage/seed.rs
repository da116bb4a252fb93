// The default questionnaire collection, written on first access and restored
// by a reset. One record per workflow status.

use chrono::NaiveDate;

use crate::domain::{Questionnaire, QuestionnaireStatus as Status, Section};

const fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid seed date"),
    }
}

struct Seed {
    id: &'static str,
    title: &'static str,
    url: &'static str,
    status: Status,
    responses: u32,
    last_modified: NaiveDate,
    date_received: NaiveDate,
    deadline: NaiveDate,
    date_completed: Option<NaiveDate>,
    date_submitted_to_oecd: Option<NaiveDate>,
    batch_id: &'static str,
    total_questions: u32,
    answered_questions: u32,
    section: Section,
}

const SEEDS: [Seed; 8] = [
    Seed {
        id: "1",
        title: "Employee Engagement Survey",
        url: "https://tenant.sharepoint.com/sites/hr/surveys/ees2025",
        status: Status::Draft,
        responses: 0,
        last_modified: ymd(2025, 1, 28),
        date_received: ymd(2025, 1, 20),
        deadline: ymd(2025, 2, 20),
        date_completed: None,
        date_submitted_to_oecd: None,
        batch_id: "Batch 1",
        total_questions: 25,
        answered_questions: 0,
        section: Section::Employment,
    },
    Seed {
        id: "2",
        title: "Market Access Review",
        url: "https://tenant.sharepoint.com/sites/trade/reviews/ma2025",
        status: Status::Published,
        responses: 12,
        last_modified: ymd(2025, 1, 25),
        date_received: ymd(2025, 1, 15),
        deadline: ymd(2025, 2, 15),
        date_completed: None,
        date_submitted_to_oecd: None,
        batch_id: "Batch 1",
        total_questions: 15,
        answered_questions: 5,
        section: Section::Trade,
    },
    Seed {
        id: "3",
        title: "Fiscal Policy Assessment",
        url: "https://tenant.sharepoint.com/sites/finance/assessments/fp2025",
        status: Status::WorkInProgress,
        responses: 45,
        last_modified: ymd(2025, 1, 29),
        date_received: ymd(2025, 1, 10),
        deadline: ymd(2025, 2, 10),
        date_completed: None,
        date_submitted_to_oecd: None,
        batch_id: "Batch 2",
        total_questions: 30,
        answered_questions: 22,
        section: Section::Finance,
    },
    Seed {
        id: "4",
        title: "Curriculum Quality Audit",
        url: "https://tenant.sharepoint.com/sites/edu/audits/cq2025",
        status: Status::SubmitForReview,
        responses: 150,
        last_modified: ymd(2025, 1, 20),
        date_received: ymd(2025, 1, 5),
        deadline: ymd(2025, 2, 5),
        date_completed: None,
        date_submitted_to_oecd: None,
        batch_id: "Batch 1",
        total_questions: 20,
        answered_questions: 20,
        section: Section::Education,
    },
    Seed {
        id: "5",
        title: "Environmental Impact Study",
        url: "https://tenant.sharepoint.com/sites/env/studies/ei2025",
        status: Status::NeedRevision,
        responses: 30,
        last_modified: ymd(2025, 1, 30),
        date_received: ymd(2025, 1, 1),
        deadline: ymd(2025, 2, 1),
        date_completed: None,
        date_submitted_to_oecd: None,
        batch_id: "Batch 2",
        total_questions: 40,
        answered_questions: 35,
        section: Section::Environment,
    },
    Seed {
        id: "6",
        title: "Healthcare Accessibility Poll",
        url: "https://tenant.sharepoint.com/sites/health/polls/ha2025",
        status: Status::UnderReview,
        responses: 210,
        last_modified: ymd(2025, 1, 15),
        date_received: ymd(2024, 12, 15),
        deadline: ymd(2025, 1, 15),
        date_completed: None,
        date_submitted_to_oecd: None,
        batch_id: "Batch 1",
        total_questions: 12,
        answered_questions: 12,
        section: Section::Health,
    },
    Seed {
        id: "7",
        title: "Trade Barrier Analysis",
        url: "https://tenant.sharepoint.com/sites/trade/analysis/tb2025",
        status: Status::Completed,
        responses: 85,
        last_modified: ymd(2025, 1, 10),
        date_received: ymd(2024, 12, 10),
        deadline: ymd(2025, 1, 10),
        date_completed: Some(ymd(2025, 1, 10)),
        date_submitted_to_oecd: None,
        batch_id: "Batch 1",
        total_questions: 18,
        answered_questions: 18,
        section: Section::Trade,
    },
    Seed {
        id: "8",
        title: "OECD Digital Economy Review",
        url: "https://tenant.sharepoint.com/sites/digital/reviews/oecd2025",
        status: Status::SentToOecd,
        responses: 120,
        last_modified: ymd(2025, 1, 5),
        date_received: ymd(2024, 12, 5),
        deadline: ymd(2025, 1, 5),
        date_completed: Some(ymd(2025, 1, 2)),
        date_submitted_to_oecd: Some(ymd(2025, 1, 5)),
        batch_id: "Batch 1",
        total_questions: 50,
        answered_questions: 50,
        section: Section::Finance,
    },
];

pub(crate) fn questionnaires() -> Vec<Questionnaire> {
    SEEDS
        .iter()
        .map(|seed| Questionnaire {
            id: seed.id.to_string(),
            title: seed.title.to_string(),
            url: seed.url.to_string(),
            status: seed.status,
            responses: seed.responses,
            last_modified: seed.last_modified,
            date_received: seed.date_received,
            deadline: Some(seed.deadline),
            date_completed: seed.date_completed,
            date_submitted_to_oecd: seed.date_submitted_to_oecd,
            batch_id: seed.batch_id.to_string(),
            total_questions: seed.total_questions,
            answered_questions: seed.answered_questions,
            unanswered_questions: seed.total_questions - seed.answered_questions,
            section_name: seed.section,
        })
        .collect()
}
