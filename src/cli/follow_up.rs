use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use questrack::{
    storage::FileBackend, summary::questionnaire_title, Deadline, FollowUp, FollowUpStatus,
    FollowUpType, FollowUpTypes, LinkCategory, NewFollowUp, NewLink, Store, Workspace,
};
use tracing::instrument;

use super::{
    confirm,
    table::{render_csv, render_table, truncate, OutputFormat},
    terminal::Colorize,
};

#[derive(Debug, Subcommand)]
pub enum FollowUpCommand {
    /// List follow-ups
    #[command(alias = "ls")]
    List(List),

    /// Show one follow-up and its links
    Show(Show),

    /// Raise a follow-up against a questionnaire
    Add(Add),

    /// Change fields of a follow-up
    Edit(Edit),

    /// Delete a follow-up
    #[command(alias = "rm")]
    Delete(Delete),

    /// Manage the reference links of a follow-up
    #[command(subcommand)]
    Link(LinkCommand),

    /// Manage the types of a follow-up
    #[command(subcommand)]
    Type(TypeCommand),
}

impl FollowUpCommand {
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root),
            Self::Show(command) => command.run(root),
            Self::Add(command) => command.run(root),
            Self::Edit(command) => command.run(root),
            Self::Delete(command) => command.run(root),
            Self::Link(command) => command.run(root),
            Self::Type(command) => command.run(root),
        }
    }
}

/// Looks up a follow-up, pointing the user back at the listing if it is gone.
pub fn find(store: &mut Store<FileBackend>, id: &str) -> anyhow::Result<FollowUp> {
    if let Some(follow_up) = store.follow_up(id)? {
        return Ok(follow_up);
    }
    eprintln!(
        "{}",
        "Run 'qt follow-up list' to see available follow-ups.".dim()
    );
    anyhow::bail!("follow-up '{id}' not found")
}

fn warn_if_dangling(store: &mut Store<FileBackend>, questionnaire_id: &str) -> anyhow::Result<()> {
    if store.questionnaire(questionnaire_id)?.is_none() {
        tracing::warn!("questionnaire {questionnaire_id} does not exist");
    }
    Ok(())
}

fn join_types(types: &FollowUpTypes) -> String {
    types
        .iter()
        .map(FollowUpType::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default, Parser)]
pub struct List {
    /// Filter by status (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "STATUS")]
    status: Vec<FollowUpStatus>,

    /// Filter by type (comma-separated); matches follow-ups carrying any of them
    #[arg(long = "type", value_delimiter = ',', value_name = "TYPE")]
    types: Vec<FollowUpType>,

    /// Show only follow-ups raised against this questionnaire
    #[arg(long, value_name = "ID")]
    questionnaire: Option<String>,

    /// Case-insensitive substring match against subject/description
    #[arg(long)]
    contains: Option<String>,

    /// Show only follow-ups past their deadline
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

impl List {
    fn matches(&self, f: &FollowUp, today: NaiveDate) -> bool {
        if !self.status.is_empty() && !self.status.contains(&f.status) {
            return false;
        }
        if !self.types.is_empty() && !self.types.iter().any(|&kind| f.types.contains(kind)) {
            return false;
        }
        if self
            .questionnaire
            .as_ref()
            .is_some_and(|id| *id != f.questionnaire_id)
        {
            return false;
        }
        if let Some(search) = &self.contains {
            let search = search.to_lowercase();
            if !f.subject.to_lowercase().contains(&search)
                && !f.description.to_lowercase().contains(&search)
            {
                return false;
            }
        }
        !self.overdue || f.is_overdue(today)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let today = self.today.unwrap_or_else(|| store.today());
        let questionnaires = store.questionnaires()?;

        let follow_ups: Vec<FollowUp> = store
            .follow_ups()?
            .into_iter()
            .filter(|f| self.matches(f, today))
            .collect();

        let headers = ["ID", "Subject", "Questionnaire", "Types", "Status", "Deadline"];
        let rows = |full: bool| -> Vec<Vec<String>> {
            follow_ups
                .iter()
                .map(|f| {
                    let title = questionnaire_title(&questionnaires, &f.questionnaire_id);
                    let deadline = f.deadline.map_or_else(String::new, |deadline| {
                        if f.is_overdue(today) && !full {
                            format!("{deadline} (overdue)")
                        } else {
                            deadline.to_string()
                        }
                    });
                    vec![
                        if full { f.id().to_string() } else { truncate(f.id(), 8) },
                        if full { f.subject.clone() } else { truncate(&f.subject, 36) },
                        if full { title.to_string() } else { truncate(title, 28) },
                        join_types(&f.types),
                        f.status.to_string(),
                        deadline,
                    ]
                })
                .collect()
        };

        match self.output {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &follow_ups)
                    .context("failed to render json output")?;
                println!();
            }
            OutputFormat::Csv => render_csv(&headers, &rows(true), self.quiet),
            OutputFormat::Table => {
                if follow_ups.is_empty() && !self.quiet {
                    println!("{}", "No follow-ups match.".dim());
                    return Ok(());
                }
                render_table(&headers, &rows(self.quiet), self.quiet);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Show {
    /// The follow-up's ID
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
        let f = find(&mut store, &self.id)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&f)?);
            return Ok(());
        }

        let questionnaires = store.questionnaires()?;
        let today = store.today();

        println!("# {}", f.subject);
        println!(
            "{}\n",
            format!(
                "on {}",
                questionnaire_title(&questionnaires, &f.questionnaire_id)
            )
            .dim()
        );

        println!("{}", "Details".dim());
        println!("  ID:       {}", f.id());
        println!("  Status:   {}", f.status);
        println!("  Types:    {}", join_types(&f.types));
        println!("  Received: {}", f.date_received);
        match f.deadline {
            Some(deadline) if f.is_overdue(today) => {
                println!("  Deadline: {}", format!("{deadline} (overdue)").error());
            }
            Some(deadline) if f.is_due_soon(today, workspace.config().due_soon_days()) => {
                println!("  Deadline: {}", format!("{deadline} (due soon)").warning());
            }
            Some(deadline) => println!("  Deadline: {deadline}"),
            None => println!("  Deadline: {}", "none".dim()),
        }

        if !f.description.is_empty() {
            println!("\n{}", "Description".dim());
            for line in f.description.lines() {
                println!("  {line}");
            }
        }

        for category in LinkCategory::ALL {
            let links: Vec<_> = f.links.iter().filter(|l| l.category == *category).collect();
            if links.is_empty() {
                continue;
            }
            println!("\n{}", category.as_str().dim());
            for link in links {
                println!(
                    "  • {} {} {}",
                    link.label,
                    link.url.info(),
                    truncate(&link.id, 8).dim()
                );
            }
        }

        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Add {
    /// ID of the questionnaire the follow-up concerns
    #[arg(long, short)]
    questionnaire: String,

    /// One-line subject
    #[arg(long, short)]
    subject: String,

    /// Request types (comma-separated, default: Clarification)
    #[arg(long = "type", value_delimiter = ',', value_name = "TYPE")]
    types: Vec<FollowUpType>,

    /// Initial status (default: Open)
    #[arg(long)]
    status: Option<FollowUpStatus>,

    /// Arrival date (default: today)
    #[arg(long, value_name = "DATE")]
    received: Option<NaiveDate>,

    /// Due date
    #[arg(long, value_name = "DATE")]
    deadline: Option<NaiveDate>,

    /// Longer description
    #[arg(long, short, default_value = "")]
    description: String,
}

impl Add {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        warn_if_dangling(&mut store, &self.questionnaire)?;

        let types = if self.types.is_empty() {
            None
        } else {
            Some(FollowUpTypes::try_from(self.types)?)
        };

        let f = store.add_follow_up(NewFollowUp {
            types,
            status: self.status,
            date_received: self.received,
            deadline: self.deadline,
            description: self.description,
            ..NewFollowUp::new(self.questionnaire, self.subject)
        })?;

        println!("{}", format!("✅ Added follow-up {}", f.id()).success());
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Edit {
    /// The follow-up's ID
    id: String,

    /// Move the follow-up to another questionnaire
    #[arg(long, value_name = "ID")]
    questionnaire: Option<String>,

    /// New subject
    #[arg(long)]
    subject: Option<String>,

    /// New status
    #[arg(long)]
    status: Option<FollowUpStatus>,

    /// New description
    #[arg(long)]
    description: Option<String>,

    /// New arrival date
    #[arg(long, value_name = "DATE")]
    received: Option<NaiveDate>,

    /// New due date
    #[arg(long, value_name = "DATE", conflicts_with = "clear_deadline")]
    deadline: Option<NaiveDate>,

    /// Remove the due date
    #[arg(long)]
    clear_deadline: bool,
}

impl Edit {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let mut f = find(&mut store, &self.id)?;

        if let Some(questionnaire) = self.questionnaire {
            warn_if_dangling(&mut store, &questionnaire)?;
            f.questionnaire_id = questionnaire;
        }
        if let Some(subject) = self.subject {
            f.subject = subject;
        }
        if let Some(status) = self.status {
            f.status = status;
        }
        if let Some(description) = self.description {
            f.description = description;
        }
        if let Some(received) = self.received {
            f.date_received = received;
        }
        if self.clear_deadline {
            f.deadline = None;
        } else if let Some(deadline) = self.deadline {
            f.deadline = Some(deadline);
        }

        let f = store.update(f)?;
        println!("{}", format!("✅ Updated follow-up {}", f.id()).success());
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Delete {
    /// The follow-up's ID
    id: String,

    /// Skip confirmation prompts
    #[arg(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let f = find(&mut store, &self.id)?;

        if !self.yes {
            println!("Will delete follow-up '{}'", f.subject);
            if !confirm("Proceed?")? {
                println!("Cancelled");
                return Ok(());
            }
        }

        store.delete::<FollowUp>(f.id())?;
        println!("{}", format!("✅ Deleted follow-up {}", f.id()).success());
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Attach a reference link
    Add(LinkAdd),

    /// Detach a reference link
    #[command(alias = "rm")]
    Remove(LinkRemove),
}

impl LinkCommand {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Add(command) => command.run(root),
            Self::Remove(command) => command.run(root),
        }
    }
}

#[derive(Debug, Parser)]
pub struct LinkAdd {
    /// The follow-up's ID
    id: String,

    /// Text shown for the link
    label: String,

    /// Target of the link
    url: String,

    /// Which side of the exchange the link belongs to (default: OECD Request)
    #[arg(long)]
    category: Option<LinkCategory>,
}

impl LinkAdd {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let mut f = find(&mut store, &self.id)?;

        let link_id = f
            .add_link(NewLink {
                category: self.category,
                ..NewLink::new(self.label, self.url)
            })?
            .id
            .clone();
        store.update(f)?;

        println!("{}", format!("✅ Added link {link_id}").success());
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct LinkRemove {
    /// The follow-up's ID
    id: String,

    /// The link's ID
    link: String,
}

impl LinkRemove {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();
        let mut f = find(&mut store, &self.id)?;

        let Some(link) = f.remove_link(&self.link) else {
            anyhow::bail!("link '{}' not found on follow-up {}", self.link, self.id);
        };
        store.update(f)?;

        println!("{}", format!("✅ Removed link '{}'", link.label).success());
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
pub enum TypeCommand {
    /// Add a type
    Add(TypeArgs),

    /// Remove a type; the last one cannot be removed
    #[command(alias = "rm")]
    Remove(TypeArgs),
}

#[derive(Debug, Parser)]
pub struct TypeArgs {
    /// The follow-up's ID
    id: String,

    /// The type
    #[arg(value_name = "TYPE")]
    kind: FollowUpType,
}

impl TypeCommand {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut store = Workspace::open(root).store();

        let (args, changed) = match self {
            Self::Add(args) => {
                let mut f = find(&mut store, &args.id)?;
                let changed = f.types.insert(args.kind);
                if changed {
                    store.update(f)?;
                }
                (args, changed)
            }
            Self::Remove(args) => {
                let mut f = find(&mut store, &args.id)?;
                let changed = f.types.remove(args.kind)?;
                if changed {
                    store.update(f)?;
                }
                (args, changed)
            }
        };

        if changed {
            println!("{}", format!("✅ Updated types of follow-up {}", args.id).success());
        } else {
            println!("{}", "Nothing to change".dim());
        }
        Ok(())
    }
}
