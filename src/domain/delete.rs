//! Two-step delete confirmation.
//!
//! Destructive deletes are split into "what to delete", captured when the
//! user asks, and "whether to delete", decided when they confirm. The target
//! is recorded as a [`DeleteTarget`] and held in a [`DeleteConfirmation`]
//! until the caller confirms or cancels.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::id::Id;

/// The level of the tree a delete target lives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteKind {
    /// A topic and its entire subtree.
    Topic,
    /// A subtopic and its questions.
    Subtopic,
    /// A single question.
    Question,
}

impl fmt::Display for DeleteKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::Topic => "topic",
            Self::Subtopic => "subtopic",
            Self::Question => "question",
        };
        f.write_str(name)
    }
}

/// Describes what a pending confirmation would delete.
///
/// For a subtopic, `parent_id` is the owning topic. For a question,
/// `parent_id` is the owning subtopic and `grandparent_id` the owning topic.
/// A target missing an id its kind requires is malformed; confirming it
/// deletes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTarget {
    /// Which level the target is at.
    pub kind: DeleteKind,
    /// The id of the node to delete.
    pub id: Id,
    /// The id of the node's parent, where its kind has one.
    pub parent_id: Option<Id>,
    /// The id of the node's grandparent, where its kind has one.
    pub grandparent_id: Option<Id>,
}

impl DeleteTarget {
    /// Targets a topic.
    #[must_use]
    pub const fn topic(id: Id) -> Self {
        Self {
            kind: DeleteKind::Topic,
            id,
            parent_id: None,
            grandparent_id: None,
        }
    }

    /// Targets a subtopic within a topic.
    #[must_use]
    pub const fn subtopic(topic_id: Id, id: Id) -> Self {
        Self {
            kind: DeleteKind::Subtopic,
            id,
            parent_id: Some(topic_id),
            grandparent_id: None,
        }
    }

    /// Targets a question within a subtopic of a topic.
    #[must_use]
    pub const fn question(topic_id: Id, subtopic_id: Id, id: Id) -> Self {
        Self {
            kind: DeleteKind::Question,
            id,
            parent_id: Some(subtopic_id),
            grandparent_id: Some(topic_id),
        }
    }
}

/// State of the delete confirmation workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteConfirmation {
    /// Nothing is awaiting confirmation.
    #[default]
    Idle,
    /// A delete has been requested and awaits confirmation.
    Pending(DeleteTarget),
}

impl DeleteConfirmation {
    /// Records a target, replacing any target already pending.
    pub fn open(&mut self, target: DeleteTarget) {
        *self = Self::Pending(target);
    }

    /// Returns to [`Idle`](Self::Idle), handing back the target that was
    /// pending, if any.
    pub fn take(&mut self) -> Option<DeleteTarget> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Pending(target) => Some(target),
        }
    }

    /// The target awaiting confirmation.
    #[must_use]
    pub const fn pending(&self) -> Option<&DeleteTarget> {
        match self {
            Self::Idle => None,
            Self::Pending(target) => Some(target),
        }
    }

    /// Whether a delete is awaiting confirmation.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_fill_scope_ids() {
        let target = DeleteTarget::question(Id::from("t"), Id::from("s"), Id::from("q"));
        assert_eq!(target.kind, DeleteKind::Question);
        assert_eq!(target.parent_id, Some(Id::from("s")));
        assert_eq!(target.grandparent_id, Some(Id::from("t")));

        let target = DeleteTarget::subtopic(Id::from("t"), Id::from("s"));
        assert_eq!(target.parent_id, Some(Id::from("t")));
        assert_eq!(target.grandparent_id, None);
    }

    #[test]
    fn take_resets_to_idle() {
        let mut state = DeleteConfirmation::default();
        assert!(state.take().is_none());

        state.open(DeleteTarget::topic(Id::from("t")));
        assert!(state.is_pending());

        let target = state.take().unwrap();
        assert_eq!(target.id, Id::from("t"));
        assert_eq!(state, DeleteConfirmation::Idle);
    }

    #[test]
    fn open_replaces_pending_target() {
        let mut state = DeleteConfirmation::default();
        state.open(DeleteTarget::topic(Id::from("a")));
        state.open(DeleteTarget::topic(Id::from("b")));
        assert_eq!(state.pending().unwrap().id, Id::from("b"));
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DeleteKind::Subtopic).unwrap(),
            r#""subtopic""#
        );
    }
}
