use std::path::PathBuf;

use clap::{Parser, Subcommand};
use questrack::{storage::DocumentInfo, DocumentError, DocumentLibrary, Workspace};
use tracing::instrument;

use super::{
    table::{render_table, truncate},
    terminal::{is_narrow, Colorize},
};

#[derive(Debug, Subcommand)]
pub enum DocumentsCommand {
    /// List shared documents
    #[command(alias = "ls")]
    List(List),

    /// Copy a file into the shared documents folder
    Upload(Upload),
}

impl DocumentsCommand {
    pub const fn list() -> Self {
        Self::List(List { quiet: false })
    }

    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::List(command) => command.run(root),
            Self::Upload(command) => command.run(root),
        }
    }
}

/// Prints a document library failure with a hint on how to retry.
fn report(error: DocumentError) -> anyhow::Error {
    let hint = match &error {
        DocumentError::FolderNotFound(_) => {
            "Create the folder or run 'qt init', then try again.".to_string()
        }
        DocumentError::AlreadyExists(name) => {
            format!("Rename the file or remove the existing '{name}', then try again.")
        }
        DocumentError::InvalidName(_) => "Pass the path of a regular file.".to_string(),
        DocumentError::Io { .. } | DocumentError::Walk(_) => {
            "Check the folder's permissions and try again.".to_string()
        }
    };
    eprintln!("{}", format!("⚠️  {error}").warning());
    eprintln!("{}", hint.dim());
    error.into()
}

#[derive(Debug, Parser)]
pub struct List {
    /// Suppress headers and format rows for scripting
    #[arg(long)]
    quiet: bool,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let library = Workspace::open(root).documents();
        let documents = library.list().map_err(report)?;

        if documents.is_empty() && !self.quiet {
            println!(
                "{}",
                "No documents yet. Add one with 'qt documents upload <FILE>'.".dim()
            );
            return Ok(());
        }

        let rows = rows(&documents, is_narrow());
        render_table(&["Name", "Size", "Modified", "URL"], &rows, self.quiet);
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct Upload {
    /// The file to upload
    file: PathBuf,
}

impl Upload {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let library = Workspace::open(root).documents();
        let document = library.upload(&self.file).map_err(report)?;

        println!(
            "{}",
            format!(
                "✅ Uploaded {} ({})",
                document.relative_url,
                format_bytes(document.size)
            )
            .success()
        );
        Ok(())
    }
}

fn rows(documents: &[DocumentInfo], narrow: bool) -> Vec<Vec<String>> {
    documents
        .iter()
        .map(|doc| {
            vec![
                if narrow { truncate(&doc.name, 24) } else { doc.name.clone() },
                format_bytes(doc.size),
                doc.last_modified.format("%Y-%m-%d %H:%M").to_string(),
                doc.relative_url.clone(),
            ]
        })
        .collect()
}

/// Human-readable file size using binary units.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64 / 1024.0;
    let mut unit = UNITS[0];
    for next in &UNITS[1..] {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }
    format!("{size:.1} {unit}")
}
