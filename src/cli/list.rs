use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use sheet::{Topic, Workspace};
use tracing::instrument;

use super::terminal::{self, Colorize};

/// Command arguments for `qsheet list`.
#[derive(Debug, Parser, Default)]
#[command(about = "Show the sheet as a tree, optionally filtered by a search")]
pub struct List {
    /// Case-insensitive substring match against question titles.
    #[arg(long, short)]
    search: Option<String>,

    /// Output format (default: tree).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,

    /// Show node ids alongside titles.
    #[arg(long)]
    ids: bool,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Tree,
    Json,
}

impl List {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let sheet = workspace.sheet_mut();
        if let Some(query) = self.search {
            sheet.set_search_query(query);
        }

        let topics = sheet.filtered_topics();

        match self.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(topics.as_ref())?),
            OutputFormat::Tree => {
                if topics.is_empty() {
                    if sheet.search_query().is_empty() {
                        println!("The sheet is empty. Add a topic with 'qsheet add'.");
                    } else {
                        println!("No questions match '{}'.", sheet.search_query());
                    }
                    return Ok(());
                }
                print!("{}", render_tree(&topics, self.ids));
            }
        }

        Ok(())
    }
}

/// Renders topics as a numbered tree.
///
/// Positions shown are those within the rendered list, so when a search is
/// active they may not match the positions in the full sheet.
fn render_tree(topics: &[Topic], show_ids: bool) -> String {
    use std::fmt::Write;

    let id = |id: &sheet::Id| {
        if show_ids {
            format!("  {}", id.as_str().dim())
        } else {
            String::new()
        }
    };

    let mut out = String::new();
    for (t, topic) in topics.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {}  {}{}",
            t + 1,
            topic.title.info(),
            terminal::progress(topic.progress()),
            id(&topic.id)
        );
        for (s, subtopic) in topic.subtopics.iter().enumerate() {
            let _ = writeln!(
                out,
                "   {}. {}  {}{}",
                s + 1,
                subtopic.title,
                terminal::progress(subtopic.progress()),
                id(&subtopic.id)
            );
            for (q, question) in subtopic.questions.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "      {}. {} {}{}",
                    q + 1,
                    terminal::checkbox(question.completed),
                    question.title,
                    id(&question.id)
                );
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use sheet::{Id, Question, Subtopic};

    use super::*;

    #[test]
    fn renders_numbered_tree() {
        let topics = vec![Topic {
            id: Id::from("t1"),
            title: "Arrays".to_string(),
            subtopics: vec![Subtopic {
                id: Id::from("s1"),
                title: "Basics".to_string(),
                questions: vec![
                    Question {
                        id: Id::from("q1"),
                        title: "Two Sum".to_string(),
                        completed: true,
                    },
                    Question::new(Id::from("q2"), "Three Sum"),
                ],
            }],
        }];

        let rendered = render_tree(&topics, false);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("1. "));
        assert!(lines[0].contains("Arrays"));
        assert!(lines[1].contains("1. Basics"));
        assert!(lines[2].contains("Two Sum"));
        assert!(lines[3].contains("2. [ ] Three Sum"));
        assert!(!rendered.contains("q1"));

        assert!(render_tree(&topics, true).contains("q2"));
    }
}
