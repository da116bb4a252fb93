use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use questrack::{
    storage::FileBackend, summary::UNKNOWN_QUESTIONNAIRE, Deadline, NewQuestionnaire,
    Questionnaire, QuestionnaireStatus, Section, Store, Workspace,
};
use regex::Regex;
use tracing::instrument;

use super::{
    confirm,
    table::{render_csv, render_table, truncate, OutputFormat},
    terminal::{bar, Colorize},
};

#[derive(Debug, Subcommand)]
pub enum QuestionnaireCommand {
    /// List questionnaires
    #[command(alias = "ls")]
    List(List),

    /// Show one questionnaire and its follow-ups
    Show(Show),

    /// Create a questionnaire
    Add(Add),

    /// Change fields of a questionnaire
    Edit(Edit),

    /// Delete a questionnaire
    ///
    /// Follow-ups raised against it are kept.
    #[command(alias = "rm")]
    Delete(Delete),
}

impl QuestionnaireCommand {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root),
            Self::Show(command) => command.run(root),
            Self::Add(command) => command.run(root),
            Self::Edit(command) => command.run(root),
            Self::Delete(command) => command.run(root),
        }
    }
}

/// Looks up a questionnaire, pointing the user back at the listing if it is
/// gone.
pub fn find(store: &mut Store<FileBackend>, id: &str) -> anyhow::Result<Questionnaire> {
    if let Some(questionnaire) = store.questionnaire(id)? {
        return Ok(questionnaire);
    }
    eprintln!(
        "{}",
        "Run 'qt questionnaire list' to see available questionnaires.".dim()
    );
    anyhow::bail!("questionnaire '{id}' not found")
}

#[derive(Debug, Default, Parser)]
pub struct List {
    /// Filter by status (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "STATUS")]
    status: Vec<QuestionnaireStatus>,

    /// Filter by section (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "SECTION")]
    section: Vec<Section>,

    /// Filter by batch label
    #[arg(long)]
    batch: Option<String>,

    /// Case-insensitive substring match against title/url
    #[arg(long, conflicts_with = "regex")]
    contains: Option<String>,

    /// Regular expression match against title/url
    #[arg(long)]
    regex: Option<String>,

    /// Show only questionnaires past their deadline
    #[arg(long)]
    overdue: bool,

    /// Evaluate deadlines as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    today: Option<NaiveDate>,

    /// Output format (default: table)
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Suppress headers and format rows for scripting
    #[arg(long)]
    quiet: bool,
}

struct Filters {
    statuses: Vec<QuestionnaireStatus>,
    sections: Vec<Section>,
    batch: Option<String>,
    contains: Option<String>,
    regex: Option<Regex>,
    overdue: Option<NaiveDate>,
}

impl Filters {
    fn new(cmd: &List, today: NaiveDate) -> anyhow::Result<Self> {
        let regex = if let Some(pattern) = &cmd.regex {
            Some(Regex::new(pattern).with_context(|| format!("invalid regex: {pattern}"))?)
        } else {
            None
        };

        Ok(Self {
            statuses: cmd.status.clone(),
            sections: cmd.section.clone(),
            batch: cmd.batch.as_deref().map(str::to_lowercase),
            contains: cmd.contains.as_deref().map(str::to_lowercase),
            regex,
            overdue: cmd.overdue.then_some(today),
        })
    }

    fn matches(&self, q: &Questionnaire) -> bool {
        if !self.statuses.is_empty() && !self.statuses.contains(&q.status) {
            return false;
        }

        if !self.sections.is_empty() && !self.sections.contains(&q.section_name) {
            return false;
        }

        if let Some(batch) = &self.batch {
            if q.batch_id.to_lowercase() != *batch {
                return false;
            }
        }

        if let Some(search) = &self.contains {
            if !q.title.to_lowercase().contains(search) && !q.url.to_lowercase().contains(search) {
                return false;
            }
        }

        if let Some(regex) = &self.regex {
            if !regex.is_match(&format!("{}\n{}", q.title, q.url)) {
                return false;
            }
        }

        if let Some(today) = self.overdue {
            if !q.is_overdue(today) {
                return false;
            }
        }

        true
    }
}

const HEADERS: [&str; 7] = ["ID", "Title", "Status", "Section", "Progress", "Deadline", "Batch"];

fn row(q: &Questionnaire, today: NaiveDate, full: bool) -> Vec<String> {
    let deadline = q.deadline.map_or_else(String::new, |deadline| {
        if q.is_overdue(today) && !full {
            format!("{deadline} (overdue)")
        } else {
            deadline.to_string()
        }
    });
    vec![
        if full { q.id().to_string() } else { truncate(q.id(), 8) },
        if full { q.title.clone() } else { truncate(&q.title, 40) },
        q.status.to_string(),
        q.section_name.to_string(),
        format!(
            "{}% ({}/{})",
            q.completion_rate(),
            q.answered_questions,
            q.total_questions
        ),
        deadline,
        q.batch_id.clone(),
    ]
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let today = self.today.unwrap_or_else(|| store.today());
        let filters = Filters::new(&self, today)?;

        let questionnaires: Vec<Questionnaire> = store
            .questionnaires()?
            .into_iter()
            .filter(|q| filters.matches(q))
            .collect();

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &questionnaires)
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Csv => {
                let rows: Vec<_> = questionnaires.iter().map(|q| row(q, today, true)).collect();
                render_csv(&HEADERS, &rows, self.quiet);
            }
            OutputFormat::Table => {
                if questionnaires.is_empty() && !self.quiet {
                    println!("{}", "No questionnaires match.".dim());
                    return Ok(());
                }
                let rows: Vec<_> = questionnaires
                    .iter()
                    .map(|q| row(q, today, self.quiet))
                    .collect();
                render_table(&HEADERS, &rows, self.quiet);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Show {
    /// The questionnaire's ID
    id: String,

    /// Print the stored record as JSON
    #[arg(long)]
    json: bool,
}

impl Show {
    pub const fn new(id: String) -> Self {
        Self { id, json: false }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root);
        let mut store = workspace.store();
        let q = find(&mut store, &self.id)?;
        let follow_ups = store.follow_ups_for(q.id())?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&q)?);
            return Ok(());
        }

        let today = store.today();
        println!("# {}", q.title);
        println!("{}\n", q.url.info());

        println!("{}", "Details".dim());
        println!("  ID:            {}", q.id());
        println!("  Status:        {}", q.status);
        println!("  Section:       {}", q.section_name);
        if !q.batch_id.is_empty() {
            println!("  Batch:         {}", q.batch_id);
        }
        println!("  Responses:     {}", q.responses);
        println!("  Last modified: {}", q.last_modified());

        println!("\n{}", "Progress".dim());
        println!(
            "  {} {}% ({} of {} answered, {} remaining)",
            bar(q.completion_rate(), 20),
            q.completion_rate(),
            q.answered_questions,
            q.total_questions,
            q.unanswered_questions()
        );

        println!("\n{}", "Dates".dim());
        println!("  Received:      {}", q.date_received);
        match q.deadline {
            Some(deadline) if q.is_overdue(today) => {
                println!("  Deadline:      {}", format!("{deadline} (overdue)").error());
            }
            Some(deadline) if q.is_due_soon(today, workspace.config().due_soon_days()) => {
                println!("  Deadline:      {}", format!("{deadline} (due soon)").warning());
            }
            Some(deadline) => println!("  Deadline:      {deadline}"),
            None => println!("  Deadline:      {}", "none".dim()),
        }
        if let Some(completed) = q.date_completed {
            println!("  Completed:     {completed}");
        }
        if let Some(submitted) = q.date_submitted_to_oecd {
            println!("  Sent to OECD:  {submitted}");
        }

        if !follow_ups.is_empty() {
            println!("\n{}", format!("Follow-ups ({})", follow_ups.len()).dim());
            for follow_up in &follow_ups {
                println!(
                    "  • {} [{}] {}",
                    follow_up.subject,
                    follow_up.status,
                    truncate(follow_up.id(), 8).dim()
                );
            }
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Add {
    /// Title of the questionnaire
    #[arg(long, short)]
    title: String,

    /// Where the questionnaire lives
    #[arg(long, short)]
    url: String,

    /// Initial status (default: Draft)
    #[arg(long)]
    status: Option<QuestionnaireStatus>,

    /// Reporting section (default: Environment)
    #[arg(long)]
    section: Option<Section>,

    /// Batch label, for example "Batch 1"
    #[arg(long, default_value = "")]
    batch: String,

    /// Number of questions
    #[arg(long, default_value_t = 0)]
    total: u32,

    /// Number of questions answered
    #[arg(long, default_value_t = 0)]
    answered: u32,

    /// Responses collected so far
    #[arg(long, default_value_t = 0)]
    responses: u32,

    /// Arrival date (default: today)
    #[arg(long, value_name = "DATE")]
    received: Option<NaiveDate>,

    /// Due date
    #[arg(long, value_name = "DATE")]
    deadline: Option<NaiveDate>,
}

impl Add {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let q = store.add_questionnaire(NewQuestionnaire {
            status: self.status,
            responses: self.responses,
            batch_id: self.batch,
            section: self.section,
            total_questions: self.total,
            answered_questions: self.answered,
            date_received: self.received,
            deadline: self.deadline,
            ..NewQuestionnaire::new(self.title, self.url)
        })?;

        println!("{}", format!("✅ Added questionnaire {}", q.id()).success());
        Ok(())
    }
}

#[derive(Debug, Default, Parser)]
pub struct Edit {
    /// The questionnaire's ID
    id: String,

    /// New title
    #[arg(long)]
    title: Option<String>,

    /// New URL
    #[arg(long)]
    url: Option<String>,

    /// New status
    #[arg(long)]
    status: Option<QuestionnaireStatus>,

    /// New section
    #[arg(long)]
    section: Option<Section>,

    /// New batch label
    #[arg(long)]
    batch: Option<String>,

    /// New number of questions
    #[arg(long)]
    total: Option<u32>,

    /// New number of questions answered
    #[arg(long)]
    answered: Option<u32>,

    /// New response count
    #[arg(long)]
    responses: Option<u32>,

    /// New arrival date
    #[arg(long, value_name = "DATE")]
    received: Option<NaiveDate>,

    /// New due date
    #[arg(long, value_name = "DATE", conflicts_with = "clear_deadline")]
    deadline: Option<NaiveDate>,

    /// Remove the due date
    #[arg(long)]
    clear_deadline: bool,

    /// Date review finished
    #[arg(long, value_name = "DATE", conflicts_with = "clear_completed")]
    completed: Option<NaiveDate>,

    /// Remove the completion date
    #[arg(long)]
    clear_completed: bool,

    /// Date the answers were sent to the OECD
    #[arg(long, value_name = "DATE", conflicts_with = "clear_submitted")]
    submitted: Option<NaiveDate>,

    /// Remove the date the answers were sent to the OECD
    #[arg(long)]
    clear_submitted: bool,
}

impl Edit {
    fn apply(self, q: &mut Questionnaire) {
        if let Some(title) = self.title {
            q.title = title;
        }
        if let Some(url) = self.url {
            q.url = url;
        }
        if let Some(status) = self.status {
            q.status = status;
        }
        if let Some(section) = self.section {
            q.section_name = section;
        }
        if let Some(batch) = self.batch {
            q.batch_id = batch;
        }
        if let Some(total) = self.total {
            q.total_questions = total;
        }
        if let Some(answered) = self.answered {
            q.answered_questions = answered;
        }
        if let Some(responses) = self.responses {
            q.responses = responses;
        }
        if let Some(received) = self.received {
            q.date_received = received;
        }
        if self.clear_deadline {
            q.deadline = None;
        } else if let Some(deadline) = self.deadline {
            q.deadline = Some(deadline);
        }
        if self.clear_completed {
            q.date_completed = None;
        } else if let Some(completed) = self.completed {
            q.date_completed = Some(completed);
        }
        if self.clear_submitted {
            q.date_submitted_to_oecd = None;
        } else if let Some(submitted) = self.submitted {
            q.date_submitted_to_oecd = Some(submitted);
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let mut q = find(&mut store, &self.id)?;
        self.apply(&mut q);
        let q = store.update(q)?;

        println!("{}", format!("✅ Updated questionnaire {}", q.id()).success());
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Delete {
    /// The questionnaire's ID
    id: String,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let q = find(&mut store, &self.id)?;
        let follow_ups = store.follow_ups_for(q.id())?;

        if !self.yes {
            println!("Will delete questionnaire '{}'", q.title);
            if !follow_ups.is_empty() {
                println!(
                    "{}",
                    format!(
                        "{} follow-up(s) will keep referring to it and show as '{}'",
                        follow_ups.len(),
                        UNKNOWN_QUESTIONNAIRE
                    )
                    .warning()
                );
            }
            if !confirm("Proceed?")? {
                println!("Cancelled");
                return Ok(());
            }
        }

        store.delete::<Questionnaire>(q.id())?;
        if !follow_ups.is_empty() {
            tracing::warn!(
                "{} follow-up(s) now reference missing questionnaire {}",
                follow_ups.len(),
                q.id()
            );
        }

        println!("{}", format!("✅ Deleted questionnaire {}", q.id()).success());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use questrack::NewFollowUp;
    use tempfile::tempdir;

    use super::*;

    fn store(root: &std::path::Path) -> Store<FileBackend> {
        Workspace::open(root).store()
    }

    fn list() -> List {
        List {
            status: Vec::new(),
            section: Vec::new(),
            batch: None,
            contains: None,
            regex: None,
            overdue: false,
            today: None,
            output: OutputFormat::Table,
            quiet: true,
        }
    }

    fn matching(cmd: &List, today: &str) -> Vec<String> {
        let filters = Filters::new(cmd, today.parse().unwrap()).unwrap();
        let tmp = tempdir().unwrap();
        store(tmp.path())
            .questionnaires()
            .unwrap()
            .into_iter()
            .filter(|q| filters.matches(q))
            .map(|q| q.id().to_string())
            .collect()
    }

    #[test]
    fn add_then_edit_recomputes_unanswered() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        Add {
            title: "Digital Services Review".to_string(),
            url: "https://example.org/dsr".to_string(),
            status: None,
            section: Some(Section::Trade),
            batch: "Batch 3".to_string(),
            total: 10,
            answered: 2,
            responses: 0,
            received: None,
            deadline: None,
        }
        .run(root.clone())
        .unwrap();

        let added = store(&root)
            .questionnaires()
            .unwrap()
            .into_iter()
            .find(|q| q.title == "Digital Services Review")
            .unwrap();
        assert_eq!(added.status, QuestionnaireStatus::Draft);
        assert_eq!(added.unanswered_questions(), 8);

        Edit {
            id: added.id().to_string(),
            title: None,
            url: None,
            status: Some(QuestionnaireStatus::WorkInProgress),
            section: None,
            batch: None,
            total: None,
            answered: Some(7),
            responses: None,
            received: None,
            deadline: Some("2025-03-01".parse().unwrap()),
            ..Edit::default()
        }
        .run(root.clone())
        .unwrap();

        let edited = store(&root).questionnaire(added.id()).unwrap().unwrap();
        assert_eq!(edited.status, QuestionnaireStatus::WorkInProgress);
        assert_eq!(edited.unanswered_questions(), 3);
        assert_eq!(edited.deadline, Some("2025-03-01".parse().unwrap()));
    }

    #[test]
    fn edit_rejects_more_answers_than_questions() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let before = store(&root).questionnaire("1").unwrap().unwrap();

        let result = Edit {
            id: "1".to_string(),
            title: None,
            url: None,
            status: None,
            section: None,
            batch: None,
            total: None,
            answered: Some(99),
            ..Edit::default()
        }
        .run(root.clone());

        assert!(result.is_err());
        assert_eq!(store(&root).questionnaire("1").unwrap().unwrap(), before);
    }

    #[test]
    fn edit_clears_completion_dates() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        Edit {
            id: "8".to_string(),
            status: Some(QuestionnaireStatus::UnderReview),
            clear_completed: true,
            clear_submitted: true,
            ..Edit::default()
        }
        .run(root.clone())
        .unwrap();

        let edited = store(&root).questionnaire("8").unwrap().unwrap();
        assert_eq!(edited.status, QuestionnaireStatus::UnderReview);
        assert_eq!(edited.date_completed, None);
        assert_eq!(edited.date_submitted_to_oecd, None);
    }

    #[test]
    fn show_of_missing_questionnaire_fails() {
        let tmp = tempdir().unwrap();
        let err = Show {
            id: "missing".to_string(),
            json: false,
        }
        .run(tmp.path().to_path_buf())
        .unwrap_err();
        assert_eq!(err.to_string(), "questionnaire 'missing' not found");
    }

    #[test]
    fn delete_keeps_follow_ups() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        store(&root)
            .add_follow_up(NewFollowUp::new("8", "Clarification on Digital Tax Section"))
            .unwrap();

        Delete {
            id: "8".to_string(),
            yes: true,
        }
        .run(root.clone())
        .unwrap();

        let mut store = store(&root);
        assert!(store.questionnaire("8").unwrap().is_none());
        assert_eq!(store.follow_ups_for("8").unwrap().len(), 1);
    }

    #[test]
    fn filters_by_status_and_section() {
        let mut cmd = list();
        cmd.status = vec![QuestionnaireStatus::Draft, QuestionnaireStatus::Completed];
        assert_eq!(matching(&cmd, "2025-02-01"), ["1", "7"]);

        let mut cmd = list();
        cmd.section = vec![Section::Trade];
        assert_eq!(matching(&cmd, "2025-02-01"), ["2", "7"]);
    }

    #[test]
    fn filters_by_text() {
        let mut cmd = list();
        cmd.contains = Some("REVIEW".to_string());
        assert_eq!(matching(&cmd, "2025-02-01"), ["2", "8"]);

        let mut cmd = list();
        cmd.regex = Some("^(Fiscal|Trade) ".to_string());
        assert_eq!(matching(&cmd, "2025-02-01"), ["3", "7"]);
    }

    #[test]
    fn filters_overdue() {
        let mut cmd = list();
        cmd.overdue = true;
        assert_eq!(matching(&cmd, "2025-02-01"), ["6"]);
        assert_eq!(matching(&cmd, "2025-02-11"), ["3", "4", "5", "6"]);
    }

    #[test]
    fn invalid_regex_is_reported() {
        let mut cmd = list();
        cmd.regex = Some("(".to_string());
        assert!(Filters::new(&cmd, "2025-02-01".parse().unwrap()).is_err());
    }
}
