use std::{
    num::NonZeroUsize,
    path::{Path, PathBuf},
};

mod list;
mod locator;
mod status;
mod terminal;

use clap::ArgAction;
use list::List;
use locator::{Locator, Node};
use non_empty_string::NonEmptyString;
use sheet::{Workspace, storage::source};
use status::Status;
use terminal::Colorize;
use tracing::instrument;

/// Parse a title, trimming surrounding whitespace.
///
/// Blank titles are rejected here rather than stored.
fn parse_title(s: &str) -> Result<NonEmptyString, String> {
    NonEmptyString::new(s.trim().to_string()).map_err(|_| "title must not be empty".to_string())
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The directory holding the question sheet
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
    /// Show completion progress (default)
    Status(Status),

    /// Create a new question sheet
    ///
    /// The sheet is seeded from a source file if one is given, falling back
    /// to a small built-in sample when the file is missing or unusable.
    Init(Init),

    /// Show the sheet, optionally filtered by a search
    List(List),

    /// Add a topic, subtopic or question
    ///
    /// Without a locator a topic is added at the top of the sheet. Given a
    /// topic, a subtopic is added at the top of it; given a subtopic, a
    /// question is added at the top of it.
    Add(Add),

    /// Rename a topic, subtopic or question
    Edit(Edit),

    /// Flip a question between done and not done
    Toggle(Toggle),

    /// Delete a topic, subtopic or question
    Delete(Delete),

    /// Move an item to a new position among its siblings
    Move(Move),

    /// Copy a topic or subtopic, with fresh ids
    Duplicate(Duplicate),

    /// Print the sheet as JSON
    Export(Export),

    /// Replace the sheet with the contents of a source file
    Load(Load),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Status(command) => command.run(root)?,
            Self::Init(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Add(command) => command.run(root)?,
            Self::Edit(command) => command.run(root)?,
            Self::Toggle(command) => command.run(root)?,
            Self::Delete(command) => command.run(root)?,
            Self::Move(command) => command.run(root)?,
            Self::Duplicate(command) => command.run(root)?,
            Self::Export(command) => command.run(root)?,
            Self::Load(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {
    /// A JSON file to seed the sheet from.
    ///
    /// Accepts the export format, `{"data": {"questions": [...]}}` or
    /// `{"data": {"topics": [...]}}`.
    #[clap(long, short)]
    source: Option<PathBuf>,
}

impl Init {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::init(root, self.source.as_deref())?;
        let progress = workspace.sheet().progress();

        println!(
            "Initialized question sheet in {}",
            workspace.root().display()
        );
        println!(
            "  {} topics, {} questions",
            workspace.sheet().topics().len(),
            progress.total
        );
        println!("  Created: {}", workspace.data_path().display());
        println!();
        println!("Next steps:");
        println!("  qsheet list");

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Add {
    /// Where to add: nothing for a topic, `TOPIC` for a subtopic, or
    /// `TOPIC/SUBTOPIC` for a question.
    locator: Option<Locator>,

    /// Title for the new item, instead of the configured placeholder.
    #[clap(long, short, value_parser = parse_title)]
    title: Option<NonEmptyString>,
}

impl Add {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;

        let parent = self
            .locator
            .as_ref()
            .map(|locator| locator.resolve(workspace.sheet()))
            .transpose()?;

        let sheet = workspace.sheet_mut();
        let (kind, id) = match parent.map(|resolved| resolved.node) {
            None => {
                let id = sheet.add_topic();
                if let Some(title) = &self.title {
                    sheet.edit_topic(&id, title.as_str());
                }
                ("topic", id)
            }
            Some(Node::Topic { topic }) => {
                let id = sheet
                    .add_subtopic(&topic)
                    .ok_or_else(|| anyhow::anyhow!("topic '{topic}' disappeared"))?;
                if let Some(title) = &self.title {
                    sheet.edit_subtopic(&topic, &id, title.as_str());
                }
                ("subtopic", id)
            }
            Some(Node::Subtopic { topic, subtopic }) => {
                let id = sheet
                    .add_question(&topic, &subtopic)
                    .ok_or_else(|| anyhow::anyhow!("subtopic '{subtopic}' disappeared"))?;
                if let Some(title) = &self.title {
                    sheet.edit_question(&topic, &subtopic, &id, title.as_str());
                }
                ("question", id)
            }
            Some(Node::Question { .. }) => {
                anyhow::bail!("questions cannot contain other items");
            }
        };

        workspace.flush()?;
        println!("{}", format!("Added {kind} {id}").success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Edit {
    /// The item to rename.
    locator: Locator,

    /// The new title.
    #[clap(value_parser = parse_title)]
    title: NonEmptyString,
}

impl Edit {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let resolved = self.locator.resolve(workspace.sheet())?;

        let sheet = workspace.sheet_mut();
        let title = self.title.as_str();
        let changed = match &resolved.node {
            Node::Topic { topic } => sheet.edit_topic(topic, title),
            Node::Subtopic { topic, subtopic } => sheet.edit_subtopic(topic, subtopic, title),
            Node::Question {
                topic,
                subtopic,
                question,
            } => sheet.edit_question(topic, subtopic, question, title),
        };
        if !changed {
            anyhow::bail!("failed to rename {} '{}'", resolved.node.kind(), self.locator);
        }

        workspace.flush()?;
        println!("Renamed '{}' to '{}'", resolved.title, title);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Toggle {
    /// The question to toggle, as `TOPIC/SUBTOPIC/QUESTION`.
    locator: Locator,
}

impl Toggle {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let resolved = self.locator.resolve(workspace.sheet())?;

        let Node::Question {
            topic,
            subtopic,
            question,
        } = &resolved.node
        else {
            anyhow::bail!(
                "only questions can be toggled, '{}' is a {}",
                self.locator,
                resolved.node.kind()
            );
        };

        let sheet = workspace.sheet_mut();
        sheet.toggle_question(topic, subtopic, question);
        let completed = sheet
            .question(topic, subtopic, question)
            .is_some_and(|q| q.completed);

        workspace.flush()?;
        println!("{} {}", terminal::checkbox(completed), resolved.title);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Delete {
    /// The item to delete.
    locator: Locator,

    /// Skip the confirmation prompt.
    #[clap(long, short)]
    yes: bool,
}

impl Delete {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let resolved = self.locator.resolve(workspace.sheet())?;

        let sheet = workspace.sheet_mut();
        sheet.open_delete(resolved.node.delete_target());

        let confirmed = self.yes
            || terminal::confirm(&format!(
                "Delete {} '{}'? This cannot be undone.",
                resolved.node.kind(),
                resolved.title
            ))?;

        if !confirmed {
            sheet.close_delete();
            println!("Cancelled.");
            return Ok(());
        }

        if !sheet.confirm_delete() {
            anyhow::bail!("failed to delete {} '{}'", resolved.node.kind(), self.locator);
        }

        workspace.flush()?;
        println!("{}", format!("Deleted {} '{}'", resolved.node.kind(), resolved.title).warning());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Move {
    /// The item to move.
    locator: Locator,

    /// Its new 1-based position among its siblings.
    position: NonZeroUsize,
}

impl Move {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let resolved = self.locator.resolve(workspace.sheet())?;

        let from = resolved.index;
        let to = self.position.get() - 1;

        let sheet = workspace.sheet_mut();
        let moved = match &resolved.node {
            Node::Topic { .. } => sheet.move_topic(from, to),
            Node::Subtopic { topic, .. } => sheet.move_subtopic(topic, from, to),
            Node::Question {
                topic, subtopic, ..
            } => sheet.move_question(topic, subtopic, from, to),
        };
        if !moved {
            anyhow::bail!("position {} is out of range", self.position);
        }

        workspace.flush()?;
        println!("Moved '{}' to position {}", resolved.title, self.position);
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Duplicate {
    /// The topic or subtopic to copy.
    locator: Locator,
}

impl Duplicate {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let resolved = self.locator.resolve(workspace.sheet())?;

        let sheet = workspace.sheet_mut();
        let copy = match &resolved.node {
            Node::Topic { topic } => sheet.duplicate_topic(topic),
            Node::Subtopic { topic, subtopic } => sheet.duplicate_subtopic(topic, subtopic),
            Node::Question { .. } => anyhow::bail!("questions cannot be duplicated"),
        };
        let Some(id) = copy else {
            anyhow::bail!("failed to duplicate {} '{}'", resolved.node.kind(), self.locator);
        };

        workspace.flush()?;
        println!("{}", format!("Duplicated '{}' as {id}", resolved.title).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Export {
    /// Write to this file instead of stdout.
    #[clap(long, short)]
    out: Option<PathBuf>,
}

impl Export {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let workspace = Workspace::open(root)?;
        let json = workspace.sheet().export_json()?;

        match &self.out {
            Some(path) => {
                write_file(path, &json)?;
                eprintln!("Exported sheet to {}", path.display());
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    std::fs::write(path, format!("{contents}\n"))
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", path.display()))
}

#[derive(Debug, clap::Parser)]
pub struct Load {
    /// The JSON file to load.
    file: PathBuf,
}

impl Load {
    #[instrument]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut workspace = Workspace::open(root)?;
        let topics = source::load(&self.file, &mut sheet::UuidIds)?;
        let count = topics.len();

        workspace.sheet_mut().load_data(topics);
        workspace.flush()?;

        println!("Loaded {count} topics from {}", self.file.display());
        Ok(())
    }
}
