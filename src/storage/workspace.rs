//! A filesystem backed question sheet
//!
//! The [`Workspace`] pairs a root directory with the [`Sheet`] stored in it.
//! The sheet itself knows nothing about the filesystem; the workspace reads
//! it at [`open`](Workspace::open) and writes it back, in the export format,
//! at [`flush`](Workspace::flush).
//!
//! Layout:
//!
//! ```text
//! <root>/.sheet/config.toml
//! <root>/sheet.json          (name configurable)
//! ```

use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::{
    domain::{Config, IdGenerator, Sheet, UuidIds, import_json},
    storage::source,
};

const CONFIG_DIR: &str = ".sheet";
const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur when opening, creating or saving a workspace.
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// No sheet has been created in the directory yet.
    #[error("no question sheet found in {}", .0.display())]
    NotInitialized(PathBuf),

    /// A sheet already exists in the directory.
    #[error("question sheet already initialized (found {})", .0.display())]
    AlreadyInitialized(PathBuf),

    /// A file or directory could not be read or written.
    #[error("failed to access {}", .path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The sheet file is not valid export-format JSON.
    #[error("failed to parse {}", .path.display())]
    Parse {
        /// The sheet file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The sheet could not be serialized.
    #[error("failed to serialize sheet")]
    Serialize(#[source] serde_json::Error),

    /// The configuration could not be written.
    #[error("{0}")]
    Config(String),
}

/// A question sheet stored in a directory.
#[derive(Debug)]
pub struct Workspace<G = UuidIds> {
    root: PathBuf,
    sheet: Sheet<G>,
}

impl Workspace<UuidIds> {
    /// Opens the sheet stored under `root`.
    ///
    /// # Errors
    ///
    /// Fails if the sheet file does not exist or cannot be parsed.
    pub fn open(root: PathBuf) -> Result<Self, WorkspaceError> {
        Self::open_with(root, UuidIds)
    }

    /// Creates a new sheet under `root`.
    ///
    /// The initial topics are read from the `seed` file when given, falling
    /// back to the built-in sample data if it cannot be used. Without a seed
    /// file, the sample data is used directly.
    ///
    /// # Errors
    ///
    /// Fails if a sheet already exists under `root`, or if the configuration
    /// or sheet file cannot be written.
    pub fn init(root: PathBuf, seed: Option<&Path>) -> Result<Self, WorkspaceError> {
        Self::init_with(root, seed, UuidIds)
    }
}

impl<G: IdGenerator> Workspace<G> {
    /// Opens the sheet stored under `root`, generating new ids with `ids`.
    ///
    /// # Errors
    ///
    /// Fails if the sheet file does not exist or cannot be parsed.
    #[instrument(skip(ids))]
    pub fn open_with(root: PathBuf, ids: G) -> Result<Self, WorkspaceError> {
        let config = load_config(&root);
        let path = root.join(config.data_file());

        if !path.exists() {
            return Err(WorkspaceError::NotInitialized(root));
        }

        let text = std::fs::read_to_string(&path).map_err(|source| WorkspaceError::Io {
            path: path.clone(),
            source,
        })?;
        let topics = import_json(&text).map_err(|source| WorkspaceError::Parse { path, source })?;
        tracing::debug!(topics = topics.len(), "opened sheet");

        Ok(Self {
            root,
            sheet: Sheet::with_topics(config, ids, topics),
        })
    }

    /// Creates a new sheet under `root`, generating ids with `ids`.
    ///
    /// # Errors
    ///
    /// Fails if a sheet (or any file with the sheet's name) already exists
    /// under `root`, or if the configuration or sheet file cannot be
    /// written. Nothing is written unless both checks pass.
    #[instrument(skip(ids))]
    pub fn init_with(
        root: PathBuf,
        seed: Option<&Path>,
        mut ids: G,
    ) -> Result<Self, WorkspaceError> {
        let config_dir = root.join(CONFIG_DIR);
        if config_dir.exists() {
            return Err(WorkspaceError::AlreadyInitialized(config_dir));
        }

        let config = Config::default();
        let data_path = root.join(config.data_file());
        if data_path.exists() {
            return Err(WorkspaceError::AlreadyInitialized(data_path));
        }

        std::fs::create_dir_all(&config_dir).map_err(|source| WorkspaceError::Io {
            path: config_dir.clone(),
            source,
        })?;

        config
            .save(&config_dir.join(CONFIG_FILE))
            .map_err(WorkspaceError::Config)?;

        let topics = match seed {
            Some(path) => source::load_or_default(path, &mut ids),
            None => source::default_topics(&mut ids),
        };

        let workspace = Self {
            root,
            sheet: Sheet::with_topics(config, ids, topics),
        };
        workspace.flush()?;
        Ok(workspace)
    }

    /// The root directory of the workspace.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file the sheet is stored in.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.root.join(self.sheet.config().data_file())
    }

    /// The loaded sheet.
    #[must_use]
    pub const fn sheet(&self) -> &Sheet<G> {
        &self.sheet
    }

    /// Mutable access to the loaded sheet. Changes are not persisted until
    /// [`flush`](Self::flush) is called.
    pub const fn sheet_mut(&mut self) -> &mut Sheet<G> {
        &mut self.sheet
    }

    /// Writes the sheet back to disk in the export format.
    ///
    /// # Errors
    ///
    /// Fails if the sheet file cannot be written.
    #[instrument(skip(self), fields(path = %self.data_path().display()))]
    pub fn flush(&self) -> Result<(), WorkspaceError> {
        let path = self.data_path();
        let json = self
            .sheet
            .export_json()
            .map_err(WorkspaceError::Serialize)?;
        std::fs::write(&path, json + "\n").map_err(|source| WorkspaceError::Io { path, source })
    }
}

fn load_config(root: &Path) -> Config {
    let path = root.join(CONFIG_DIR).join(CONFIG_FILE);
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::tempdir;

    use super::*;
    use crate::domain::{Id, SequentialIds};

    #[test]
    fn init_writes_sample_data_and_config() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let workspace =
            Workspace::init_with(root.clone(), None, SequentialIds::default()).unwrap();

        assert!(root.join(".sheet/config.toml").exists());
        assert!(root.join("sheet.json").exists());
        assert_eq!(workspace.sheet().topics().len(), 2);
        assert_eq!(workspace.sheet().topics()[0].title, "Arrays & Hashing");
    }

    #[test]
    fn init_twice_fails() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        Workspace::init(root.clone(), None).unwrap();
        let err = Workspace::init(root, None).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyInitialized(_)));
    }

    #[test]
    fn init_from_source_file() {
        let tmp = tempdir().unwrap();
        let source = tmp.path().join("questions.json");
        let mut file = std::fs::File::create(&source).unwrap();
        file.write_all(
            br#"{"data": {"questions": [
                {"_id": "x1", "topic": "Graphs", "title": "BFS",
                 "questionId": {"name": "Rotting Oranges"}}
            ]}}"#,
        )
        .unwrap();

        let root = tmp.path().join("sheet");
        let workspace = Workspace::init(root, Some(&source)).unwrap();

        let topics = workspace.sheet().topics();
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].subtopics[0].questions[0].id, Id::from("x1"));
    }

    #[test]
    fn init_keeps_existing_sheet_file() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let existing = r#"[{"id": "mine", "title": "My Work", "subtopics": []}]"#;
        std::fs::write(root.join("sheet.json"), existing).unwrap();

        let err = Workspace::init(root.clone(), None).unwrap_err();
        assert!(matches!(err, WorkspaceError::AlreadyInitialized(_)));
        assert_eq!(std::fs::read_to_string(root.join("sheet.json")).unwrap(), existing);
        assert!(!root.join(".sheet").exists());
    }

    #[test]
    fn init_never_overwrites_its_own_seed() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        let seed = root.join("sheet.json");
        let raw = r#"{"data": {"questions": []}}"#;
        std::fs::write(&seed, raw).unwrap();

        assert!(Workspace::init(root, Some(&seed)).is_err());
        assert_eq!(std::fs::read_to_string(&seed).unwrap(), raw);
    }

    #[test]
    fn init_with_broken_source_uses_sample_data() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let workspace = Workspace::init(root.clone(), Some(&root.join("missing.json"))).unwrap();
        assert_eq!(workspace.sheet().topics()[1].title, "Trees & Graphs");
    }

    #[test]
    fn open_uninitialized_fails() {
        let tmp = tempdir().unwrap();
        let err = Workspace::open(tmp.path().to_path_buf()).unwrap_err();
        assert!(matches!(err, WorkspaceError::NotInitialized(_)));
    }

    #[test]
    fn open_reports_corrupt_sheet() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        Workspace::init(root.clone(), None).unwrap();
        std::fs::write(root.join("sheet.json"), "{ not json").unwrap();

        let err = Workspace::open(root).unwrap_err();
        assert!(matches!(err, WorkspaceError::Parse { .. }));
    }

    #[test]
    fn changes_survive_flush_and_reopen() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();

        let mut workspace = Workspace::init(root.clone(), None).unwrap();
        let topic = workspace.sheet().topics()[0].clone();
        let subtopic = &topic.subtopics[0];
        let question = &subtopic.questions[0];

        let sheet = workspace.sheet_mut();
        assert!(sheet.toggle_question(&topic.id, &subtopic.id, &question.id));
        let added = sheet.add_topic();
        workspace.flush().unwrap();

        let reopened = Workspace::open(root).unwrap();
        assert_eq!(reopened.sheet().topics(), workspace.sheet().topics());
        assert_eq!(reopened.sheet().topics()[0].id, added);
        assert!(
            reopened
                .sheet()
                .question(&topic.id, &subtopic.id, &question.id)
                .unwrap()
                .completed
        );
    }

    #[test]
    fn honours_configured_data_file() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().to_path_buf();
        Workspace::init(root.clone(), None).unwrap();

        let mut config = Config::load(&root.join(".sheet/config.toml")).unwrap();
        config.set_data_file("renamed.json");
        config.save(&root.join(".sheet/config.toml")).unwrap();
        std::fs::rename(root.join("sheet.json"), root.join("renamed.json")).unwrap();

        let workspace = Workspace::open(root.clone()).unwrap();
        assert_eq!(workspace.data_path(), root.join("renamed.json"));
        assert_eq!(workspace.sheet().topics().len(), 2);
    }
}
