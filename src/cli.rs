use std::path::PathBuf;

mod documents;
mod follow_up;
mod open;
mod profile;
mod questionnaire;
mod status;
mod table;
mod terminal;

use clap::ArgAction;
use documents::DocumentsCommand;
use follow_up::FollowUpCommand;
use open::Open;
use profile::Whoami;
use questionnaire::QuestionnaireCommand;
use questrack::Workspace;
use status::Status;
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the tracker workspace
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::Status(Status::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Show progress and deadlines (default)
    Status(Status),

    /// Initialize a new tracker workspace
    Init,

    /// Manage questionnaires
    #[command(subcommand, alias = "q")]
    Questionnaire(QuestionnaireCommand),

    /// Manage follow-ups
    #[command(subcommand, alias = "f")]
    FollowUp(FollowUpCommand),

    /// Restore the sample questionnaires, keeping follow-ups
    Reset(Reset),

    /// Browse and upload shared documents
    #[command(subcommand)]
    Documents(DocumentsCommand),

    /// Show the current user
    Whoami(Whoami),

    /// Open a view by path
    Open(Open),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init => Init::run(root)?,
            Self::Questionnaire(command) => command.run(root)?,
            Self::FollowUp(command) => command.run(root)?,
            Self::Reset(command) => command.run(root)?,
            Self::Documents(command) => command.run(root)?,
            Self::Whoami(command) => command.run(root)?,
            Self::Open(command) => command.run(root)?,
        }
        Ok(())
    }
}

/// Asks a yes/no question on the terminal. Anything but an explicit yes is a no.
pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    let answer = dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()?;
    Ok(answer)
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument(level = "debug")]
    fn run(root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::init(root)?;

        println!(
            "{}",
            format!(
                "✅ Initialized tracker workspace in {}",
                workspace.root().display()
            )
            .success()
        );
        println!("  Created: .qt/config.toml");
        println!("  Created: .qt/storage/");
        println!("  Created: {}/", workspace.config().documents_folder());
        println!();
        println!("Next steps:");
        println!("  qt status                        # Sample questionnaires are loaded on first use");
        println!("  qt questionnaire add --title \"Title\" --url https://example.org/form");
        println!("  qt follow-up add -q <QUESTIONNAIRE> -s \"Subject\" --type data-request");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Reset {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    yes: bool,
}

impl Reset {
    #[instrument(level = "debug", skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        if !self.yes
            && !confirm("Replace all questionnaires with the samples?")?
        {
            println!("Cancelled");
            return Ok(());
        }

        let mut store = Workspace::open(root).store();
        store.reset()?;

        println!("{}", "✅ Restored the sample questionnaires".success());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use questrack::{NewFollowUp, Questionnaire};
    use tempfile::tempdir;
    use test_case::test_case;

    use super::*;

    #[test]
    fn init_creates_workspace_once() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        Init::run(root.clone()).unwrap();
        assert!(root.join(".qt/config.toml").is_file());
        assert!(root.join(".qt/storage").is_dir());
        assert!(root.join("Shared Documents").is_dir());

        let err = Init::run(root).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn reset_restores_samples_and_keeps_follow_ups() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let mut store = Workspace::open(&root).store();
        store.delete::<Questionnaire>("1").unwrap();
        store
            .add_follow_up(NewFollowUp::new("2", "Clarify scope"))
            .unwrap();

        Reset { yes: true }.run(root.clone()).unwrap();

        let mut store = Workspace::open(&root).store();
        assert_eq!(store.questionnaires().unwrap().len(), 8);
        assert_eq!(store.follow_ups().unwrap().len(), 1);
    }

    #[test_case(&["qt", "questionnaire", "add", "--title", "Title", "--url", "https://example.org/form"]; "questionnaire add")]
    #[test_case(&["qt", "follow-up", "add", "-q", "1", "-s", "Subject", "--type", "data-request"]; "follow-up add")]
    #[test_case(&["qt", "follow-up", "add", "-q", "1", "-s", "Subject"]; "follow-up add without type")]
    fn suggested_commands_parse(args: &[&str]) {
        Cli::try_parse_from(args.iter().copied()).unwrap();
    }
}
