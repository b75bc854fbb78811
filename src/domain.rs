//! Domain models for the question sheet.
//!
//! This module contains the question tree, the store that owns it, and the
//! small algorithms the store is built from.

mod config;
pub use config::Config;

/// Two-step delete confirmation.
pub mod delete;
pub use delete::{DeleteConfirmation, DeleteKind, DeleteTarget};

/// Identifiers and identifier generation.
pub mod id;
pub use id::{Id, IdGenerator, SequentialIds, UuidIds};

pub mod reorder;

pub mod store;
pub use store::{Sheet, import_json};

pub mod topic;
pub use topic::{Progress, Question, Subtopic, Topic};
