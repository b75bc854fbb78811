//! Interview Question Sheet
//!
//! Practice questions organised as topics, subtopics and questions, with
//! completion tracking, reordering, search, duplication and JSON export.

pub mod domain;
pub use domain::{
    Config, DeleteKind, DeleteTarget, Id, IdGenerator, Progress, Question, SequentialIds, Sheet,
    Subtopic, Topic, UuidIds,
};

/// Loading initial data and keeping a sheet on disk.
pub mod storage;
pub use storage::{LoadError, Workspace, WorkspaceError};
