use std::{path::PathBuf, process};

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use questrack::{
    summary::{Bucket, DeadlineCounts, Progress, Resolution, SectionProgress},
    Summary, Workspace,
};
use serde::Serialize;
use tracing::instrument;

use super::terminal::{bar, is_narrow, Colorize};

#[derive(Debug, Parser, Default)]
#[command(about = "Show progress, deadlines and status breakdowns")]
pub struct Status {
    /// Which records to report on
    #[arg(long, value_enum, default_value_t)]
    view: View,

    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,

    /// Evaluate deadlines as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum View {
    Questionnaires,
    FollowUps,
    #[default]
    All,
}

impl View {
    const fn questionnaires(self) -> bool {
        matches!(self, Self::Questionnaires | Self::All)
    }

    const fn follow_ups(self) -> bool {
        matches!(self, Self::FollowUps | Self::All)
    }
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    today: NaiveDate,
    due_soon_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    questionnaires: Option<QuestionnaireReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    follow_ups: Option<FollowUpReport<'a>>,
}

#[derive(Debug, Serialize)]
struct QuestionnaireReport<'a> {
    count: usize,
    progress: Progress,
    sections: &'a [SectionProgress],
    deadlines: DeadlineCounts,
    statuses: &'a [Bucket<questrack::QuestionnaireStatus>],
}

#[derive(Debug, Serialize)]
struct FollowUpReport<'a> {
    count: usize,
    resolution: Resolution,
    deadlines: DeadlineCounts,
    statuses: &'a [Bucket<questrack::FollowUpStatus>],
    types: &'a [Bucket<questrack::FollowUpType>],
}

impl<'a> Report<'a> {
    fn new(summary: &'a Summary, view: View) -> Self {
        Self {
            today: summary.today,
            due_soon_days: summary.due_soon_days,
            questionnaires: view.questionnaires().then(|| QuestionnaireReport {
                count: summary.questionnaire_count,
                progress: summary.overall,
                sections: &summary.sections,
                deadlines: summary.questionnaire_deadlines,
                statuses: &summary.questionnaire_statuses,
            }),
            follow_ups: view.follow_ups().then(|| FollowUpReport {
                count: summary.follow_up_count,
                resolution: summary.resolution,
                deadlines: summary.follow_up_deadlines,
                statuses: &summary.follow_up_statuses,
                types: &summary.follow_up_types,
            }),
        }
    }

    fn overdue(&self) -> usize {
        self.questionnaires.as_ref().map_or(0, |q| q.deadlines.overdue)
            + self.follow_ups.as_ref().map_or(0, |f| f.deadlines.overdue)
    }
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let overdue = self.render(root)?;

        // Exit with a non-zero code when something is overdue.
        if overdue > 0 {
            process::exit(2);
        }

        Ok(())
    }

    /// Prints the dashboard and returns the number of overdue records shown.
    fn render(&self, root: PathBuf) -> anyhow::Result<usize> {
        let workspace = Workspace::open(root);
        let mut store = workspace.store();
        let today = self.today.unwrap_or_else(|| store.today());

        let questionnaires = store.questionnaires()?;
        let follow_ups = store.follow_ups()?;
        let summary = Summary::compute(
            &questionnaires,
            &follow_ups,
            today,
            workspace.config().due_soon_days(),
        );
        let report = Report::new(&summary, self.view);

        match self.output {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Table => {
                if self.quiet {
                    output_quiet(&report);
                } else {
                    output_table(&report);
                }
            }
        }

        Ok(report.overdue())
    }
}

fn output_quiet(report: &Report<'_>) {
    let mut fields = Vec::new();
    if let Some(q) = &report.questionnaires {
        fields.push(format!("questionnaires={}", q.count));
        fields.push(format!("progress={}", q.progress.rate));
        fields.push(format!("overdue={}", q.deadlines.overdue));
        fields.push(format!("due_soon={}", q.deadlines.due_soon));
    }
    if let Some(f) = &report.follow_ups {
        fields.push(format!("follow_ups={}", f.count));
        fields.push(format!("resolved={}", f.resolution.resolved));
        fields.push(format!("follow_ups_overdue={}", f.deadlines.overdue));
        fields.push(format!("follow_ups_due_soon={}", f.deadlines.due_soon));
    }
    println!("{}", fields.join(" "));
}

fn output_table(report: &Report<'_>) {
    let narrow = is_narrow();
    let bar_width = if narrow { 10 } else { 20 };

    println!("{}", format!("As of {}", report.today).dim());

    if let Some(q) = &report.questionnaires {
        println!();
        println!("Questionnaires ({})", q.count);
        println!("{}", "──────────────".dim());
        println!(
            "Overall      {} {:>3}% ({}/{})",
            bar(q.progress.rate, bar_width),
            q.progress.rate,
            q.progress.answered,
            q.progress.total
        );
        for section in q.sections {
            let label = section.section.to_string();
            println!(
                "{label:<12} {} {:>3}%",
                bar(section.progress.rate, bar_width),
                section.progress.rate
            );
        }
        println!();
        print_deadlines(q.deadlines, report.due_soon_days, "qt questionnaire list --overdue");
        println!();
        print_histogram(q.statuses, narrow);
    }

    if let Some(f) = &report.follow_ups {
        println!();
        println!("Follow-ups ({})", f.count);
        println!("{}", "──────────".dim());
        if f.count == 0 {
            println!("{}", "No follow-ups yet. Create one with 'qt follow-up add'.".dim());
            return;
        }
        println!(
            "Resolved     {} {:>3}% ({}/{})",
            bar(f.resolution.rate, bar_width),
            f.resolution.rate,
            f.resolution.resolved,
            f.resolution.total
        );
        println!();
        print_deadlines(f.deadlines, report.due_soon_days, "qt follow-up list --overdue");
        println!();
        print_histogram(f.statuses, narrow);
        println!();
        print_histogram(f.types, narrow);
    }
}

fn print_deadlines(deadlines: DeadlineCounts, days: u32, hint: &str) {
    if deadlines.overdue == 0 {
        println!("Overdue: {} ✅", "0".success());
    } else {
        println!("Overdue: {} ⚠️", deadlines.overdue.to_string().error());
        println!("{}", format!("Run '{hint}' to see them.").dim());
    }

    let due_soon = deadlines.due_soon.to_string();
    if deadlines.due_soon == 0 {
        println!("Due within {days} days: {}", due_soon.success());
    } else {
        println!("Due within {days} days: {}", due_soon.warning());
    }
}

fn print_histogram<K: std::fmt::Display>(buckets: &[Bucket<K>], narrow: bool) {
    for bucket in buckets {
        let label = bucket.key.to_string();
        if narrow {
            println!("{label}: {}", bucket.count);
        } else {
            println!("{label:<20} {:>4}  {:>5.1}%", bucket.count, bucket.percentage);
        }
    }
}
