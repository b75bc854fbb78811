use std::path::PathBuf;

use clap::Parser;
use sheet::Workspace;
use tracing::instrument;

use super::terminal::{Colorize, is_narrow};

#[derive(Debug, Parser, Default)]
#[command(about = "Show completion counts per topic")]
pub struct Status {
    /// Output format (table, json)
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress headers and format for scripting
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Status {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let sheet = workspace.sheet();

        let rows: Vec<(&str, sheet::Progress)> = sheet
            .topics()
            .iter()
            .map(|topic| (topic.title.as_str(), topic.progress()))
            .collect();
        let total = sheet.progress();

        if rows.is_empty() {
            println!("No topics yet. Create one with 'qsheet add'.");
            return Ok(());
        }

        match self.output {
            OutputFormat::Json => Self::output_json(&rows, total)?,
            OutputFormat::Table => {
                if self.quiet {
                    println!("completed={} total={}", total.completed, total.total);
                } else {
                    Self::output_table(&rows, total);
                }
            }
        }

        Ok(())
    }

    fn output_json(rows: &[(&str, sheet::Progress)], total: sheet::Progress) -> anyhow::Result<()> {
        use serde_json::json;

        let topics: Vec<_> = rows
            .iter()
            .map(|(title, progress)| {
                json!({
                    "title": title,
                    "completed": progress.completed,
                    "total": progress.total,
                })
            })
            .collect();

        let output = json!({
            "topics": topics,
            "total": total,
            "percent": total.percent(),
        });

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }

    fn output_table(rows: &[(&str, sheet::Progress)], total: sheet::Progress) {
        println!("Progress");
        println!("{}", "────────".dim());

        if is_narrow() {
            for (title, progress) in rows {
                println!("{title}: {}/{}", progress.completed, progress.total);
            }
        } else {
            let width = rows
                .iter()
                .map(|(title, _)| title.chars().count())
                .max()
                .unwrap_or(0)
                .max("Topic".len());
            println!("{:<width$}  {:>9}  {:>4}", "Topic", "Done", "%");
            for (title, progress) in rows {
                let done = format!("{}/{}", progress.completed, progress.total);
                println!("{title:<width$}  {done:>9}  {:>3}%", progress.percent());
            }
        }

        println!();

        let summary = format!(
            "{}/{} questions completed ({}%)",
            total.completed,
            total.total,
            total.percent()
        );
        if total.total > 0 && total.completed == total.total {
            println!("{} ✅", summary.success());
        } else {
            println!("{summary}");
        }
    }
}
