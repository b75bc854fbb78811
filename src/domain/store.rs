//! The question sheet store.
//!
//! [`Sheet`] is the single source of truth for the topic tree. It also holds
//! the transient state a front end needs while the user works: the current
//! search text and the delete awaiting confirmation.
//!
//! # Missing ids
//!
//! Every operation that addresses a node by id has the precondition that the
//! id (and every ancestor id passed alongside it) exists. When it does not,
//! the operation is a no-op: nothing is changed, nothing panics, and the
//! return value (`false` or `None`) reports that nothing happened. Ids are
//! generated by the sheet itself, so a stale id means the caller's view was
//! out of date and there is nothing useful to do.

use std::borrow::Cow;

use tracing::instrument;

use crate::domain::{
    Config,
    delete::{DeleteConfirmation, DeleteKind, DeleteTarget},
    id::{Id, IdGenerator, UuidIds},
    reorder::{is_permutation, reorder},
    topic::{Progress, Question, Subtopic, Topic},
};

/// An in-memory question sheet.
#[derive(Debug, Clone)]
pub struct Sheet<G = UuidIds> {
    topics: Vec<Topic>,
    search_query: String,
    delete: DeleteConfirmation,
    config: Config,
    ids: G,
}

impl Default for Sheet<UuidIds> {
    fn default() -> Self {
        Self::new(Config::default(), UuidIds)
    }
}

impl<G: IdGenerator> Sheet<G> {
    /// Creates an empty sheet.
    #[must_use]
    pub const fn new(config: Config, ids: G) -> Self {
        Self {
            topics: Vec::new(),
            search_query: String::new(),
            delete: DeleteConfirmation::Idle,
            config,
            ids,
        }
    }

    /// Creates a sheet holding `topics`.
    #[must_use]
    pub fn with_topics(config: Config, ids: G, topics: Vec<Topic>) -> Self {
        let mut sheet = Self::new(config, ids);
        sheet.load_data(topics);
        sheet
    }

    /// The configuration the sheet was created with.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The full topic tree, in display order.
    #[must_use]
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Looks up a topic.
    #[must_use]
    pub fn topic(&self, id: &Id) -> Option<&Topic> {
        self.topics.iter().find(|t| &t.id == id)
    }

    /// Looks up a subtopic.
    #[must_use]
    pub fn subtopic(&self, topic_id: &Id, subtopic_id: &Id) -> Option<&Subtopic> {
        self.topic(topic_id)?.subtopic(subtopic_id)
    }

    /// Looks up a question.
    #[must_use]
    pub fn question(&self, topic_id: &Id, subtopic_id: &Id, question_id: &Id) -> Option<&Question> {
        self.subtopic(topic_id, subtopic_id)?.question(question_id)
    }

    /// Completion counts across the whole sheet.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.topics.iter().map(Topic::progress).sum()
    }

    fn topic_mut(&mut self, id: &Id) -> Option<&mut Topic> {
        self.topics.iter_mut().find(|t| &t.id == id)
    }

    fn subtopic_mut(&mut self, topic_id: &Id, subtopic_id: &Id) -> Option<&mut Subtopic> {
        self.topic_mut(topic_id)?.subtopic_mut(subtopic_id)
    }

    // Topics

    /// Adds a topic with the placeholder title at the start of the sheet.
    #[instrument(level = "debug", skip(self))]
    pub fn add_topic(&mut self) -> Id {
        let topic = Topic::new(self.ids.next_id(), self.config.new_topic_title.clone());
        let id = topic.id.clone();
        self.topics.insert(0, topic);
        tracing::debug!(%id, "added topic");
        id
    }

    /// Renames a topic.
    #[instrument(level = "debug", skip(self, title))]
    pub fn edit_topic(&mut self, id: &Id, title: impl Into<String>) -> bool {
        let Some(topic) = self.topic_mut(id) else {
            return ignored("edit topic");
        };
        topic.title = title.into();
        true
    }

    /// Removes a topic and everything beneath it.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_topic(&mut self, id: &Id) -> bool {
        remove_where(&mut self.topics, |t| &t.id == id) || ignored("delete topic")
    }

    /// Replaces the topic order.
    ///
    /// `topics` must be a permutation of the current topics (matched by id).
    /// Anything else is rejected and leaves the sheet unchanged.
    #[instrument(level = "debug", skip_all)]
    pub fn reorder_topics(&mut self, topics: Vec<Topic>) -> bool {
        replace_ordered(&mut self.topics, topics, |t| t.id.clone())
    }

    /// Moves the topic at `from` to position `to`.
    ///
    /// The moved order is always a permutation of the current one, so it is
    /// applied without the check [`reorder_topics`](Self::reorder_topics)
    /// makes.
    #[instrument(level = "debug", skip(self))]
    pub fn move_topic(&mut self, from: usize, to: usize) -> bool {
        move_within(&mut self.topics, from, to) || ignored("move topic")
    }

    /// Appends a deep copy of a topic to the end of the sheet.
    ///
    /// Every node in the copy gets a fresh id, every question in it is marked
    /// incomplete, and the copy's title gets the configured suffix.
    #[instrument(level = "debug", skip(self))]
    pub fn duplicate_topic(&mut self, id: &Id) -> Option<Id> {
        let Some(source) = self.topics.iter().find(|t| &t.id == id) else {
            ignored("duplicate topic");
            return None;
        };
        let copy = source.duplicate(&mut self.ids, &self.config.copy_suffix);
        let copy_id = copy.id.clone();
        self.topics.push(copy);
        tracing::debug!(%copy_id, "duplicated topic");
        Some(copy_id)
    }

    // Subtopics

    /// Adds a subtopic with the placeholder title at the start of a topic.
    #[instrument(level = "debug", skip(self))]
    pub fn add_subtopic(&mut self, topic_id: &Id) -> Option<Id> {
        let id = self.ids.next_id();
        let title = self.config.new_subtopic_title.clone();
        let Some(topic) = self.topic_mut(topic_id) else {
            ignored("add subtopic");
            return None;
        };
        topic.subtopics.insert(0, Subtopic::new(id.clone(), title));
        tracing::debug!(%id, "added subtopic");
        Some(id)
    }

    /// Renames a subtopic.
    #[instrument(level = "debug", skip(self, title))]
    pub fn edit_subtopic(
        &mut self,
        topic_id: &Id,
        subtopic_id: &Id,
        title: impl Into<String>,
    ) -> bool {
        let Some(subtopic) = self.subtopic_mut(topic_id, subtopic_id) else {
            return ignored("edit subtopic");
        };
        subtopic.title = title.into();
        true
    }

    /// Removes a subtopic and its questions. Sibling subtopics are untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_subtopic(&mut self, topic_id: &Id, subtopic_id: &Id) -> bool {
        self.topic_mut(topic_id)
            .is_some_and(|topic| remove_where(&mut topic.subtopics, |s| &s.id == subtopic_id))
            || ignored("delete subtopic")
    }

    /// Replaces the subtopic order within a topic.
    ///
    /// `subtopics` must be a permutation of the topic's current subtopics.
    #[instrument(level = "debug", skip(self, subtopics))]
    pub fn reorder_subtopics(&mut self, topic_id: &Id, subtopics: Vec<Subtopic>) -> bool {
        let Some(topic) = self.topic_mut(topic_id) else {
            return ignored("reorder subtopics");
        };
        replace_ordered(&mut topic.subtopics, subtopics, |s| s.id.clone())
    }

    /// Moves the subtopic at `from` to position `to` within a topic.
    #[instrument(level = "debug", skip(self))]
    pub fn move_subtopic(&mut self, topic_id: &Id, from: usize, to: usize) -> bool {
        self.topic_mut(topic_id)
            .is_some_and(|topic| move_within(&mut topic.subtopics, from, to))
            || ignored("move subtopic")
    }

    /// Appends a deep copy of a subtopic to the end of its topic.
    ///
    /// The copy and its questions get fresh ids, questions are marked
    /// incomplete, and the copy's title gets the configured suffix.
    #[instrument(level = "debug", skip(self))]
    pub fn duplicate_subtopic(&mut self, topic_id: &Id, subtopic_id: &Id) -> Option<Id> {
        let Some(topic) = self.topics.iter_mut().find(|t| &t.id == topic_id) else {
            ignored("duplicate subtopic");
            return None;
        };
        let Some(source) = topic.subtopic(subtopic_id) else {
            ignored("duplicate subtopic");
            return None;
        };
        let copy = source.duplicate(&mut self.ids, &self.config.copy_suffix);
        let copy_id = copy.id.clone();
        topic.subtopics.push(copy);
        tracing::debug!(%copy_id, "duplicated subtopic");
        Some(copy_id)
    }

    // Questions

    /// Adds a question with the placeholder title at the start of a subtopic.
    #[instrument(level = "debug", skip(self))]
    pub fn add_question(&mut self, topic_id: &Id, subtopic_id: &Id) -> Option<Id> {
        let id = self.ids.next_id();
        let title = self.config.new_question_title.clone();
        let Some(subtopic) = self.subtopic_mut(topic_id, subtopic_id) else {
            ignored("add question");
            return None;
        };
        subtopic.questions.insert(0, Question::new(id.clone(), title));
        tracing::debug!(%id, "added question");
        Some(id)
    }

    /// Renames a question.
    #[instrument(level = "debug", skip(self, title))]
    pub fn edit_question(
        &mut self,
        topic_id: &Id,
        subtopic_id: &Id,
        question_id: &Id,
        title: impl Into<String>,
    ) -> bool {
        let Some(question) = self
            .subtopic_mut(topic_id, subtopic_id)
            .and_then(|s| s.question_mut(question_id))
        else {
            return ignored("edit question");
        };
        question.title = title.into();
        true
    }

    /// Removes a question.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_question(&mut self, topic_id: &Id, subtopic_id: &Id, question_id: &Id) -> bool {
        self.subtopic_mut(topic_id, subtopic_id)
            .is_some_and(|s| remove_where(&mut s.questions, |q| &q.id == question_id))
            || ignored("delete question")
    }

    /// Flips a question between complete and incomplete.
    #[instrument(level = "debug", skip(self))]
    pub fn toggle_question(&mut self, topic_id: &Id, subtopic_id: &Id, question_id: &Id) -> bool {
        let Some(question) = self
            .subtopic_mut(topic_id, subtopic_id)
            .and_then(|s| s.question_mut(question_id))
        else {
            return ignored("toggle question");
        };
        question.completed = !question.completed;
        tracing::debug!(completed = question.completed, "toggled question");
        true
    }

    /// Replaces the question order within a subtopic.
    ///
    /// `questions` must be a permutation of the subtopic's current questions.
    #[instrument(level = "debug", skip(self, questions))]
    pub fn reorder_questions(
        &mut self,
        topic_id: &Id,
        subtopic_id: &Id,
        questions: Vec<Question>,
    ) -> bool {
        let Some(subtopic) = self.subtopic_mut(topic_id, subtopic_id) else {
            return ignored("reorder questions");
        };
        replace_ordered(&mut subtopic.questions, questions, |q| q.id.clone())
    }

    /// Moves the question at `from` to position `to` within a subtopic.
    #[instrument(level = "debug", skip(self))]
    pub fn move_question(
        &mut self,
        topic_id: &Id,
        subtopic_id: &Id,
        from: usize,
        to: usize,
    ) -> bool {
        self.subtopic_mut(topic_id, subtopic_id)
            .is_some_and(|subtopic| move_within(&mut subtopic.questions, from, to))
            || ignored("move question")
    }

    // Search

    /// Sets the search text. Case is ignored when filtering.
    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// The current search text, exactly as it was set.
    #[must_use]
    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    /// The part of the tree matching the current search.
    ///
    /// With an empty query this is the whole tree. Otherwise only questions
    /// whose title contains the query (ignoring case) are kept, and subtopics
    /// and topics left with nothing in them are dropped.
    #[must_use]
    pub fn filtered_topics(&self) -> Cow<'_, [Topic]> {
        if self.search_query.is_empty() {
            return Cow::Borrowed(self.topics.as_slice());
        }

        let needle = self.search_query.to_lowercase();
        Cow::Owned(
            self.topics
                .iter()
                .filter_map(|topic| topic.matching(&needle))
                .collect(),
        )
    }

    // Delete confirmation

    /// Records what to delete, pending confirmation.
    ///
    /// Replaces any delete already pending. The tree is not changed.
    #[instrument(level = "debug", skip(self))]
    pub fn open_delete(&mut self, target: DeleteTarget) {
        self.delete.open(target);
    }

    /// Abandons the pending delete without touching the tree.
    #[instrument(level = "debug", skip(self))]
    pub fn close_delete(&mut self) {
        self.delete = DeleteConfirmation::Idle;
    }

    /// The delete awaiting confirmation, if any.
    #[must_use]
    pub const fn pending_delete(&self) -> Option<&DeleteTarget> {
        self.delete.pending()
    }

    /// Carries out the pending delete and returns to idle.
    ///
    /// A target missing an ancestor id its kind requires deletes nothing, but
    /// the pending delete is still cleared. Returns `true` if a node was
    /// removed.
    #[instrument(level = "debug", skip(self))]
    pub fn confirm_delete(&mut self) -> bool {
        let Some(target) = self.delete.take() else {
            return false;
        };

        match (target.kind, &target.parent_id, &target.grandparent_id) {
            (DeleteKind::Topic, _, _) => self.delete_topic(&target.id),
            (DeleteKind::Subtopic, Some(topic_id), _) => self.delete_subtopic(topic_id, &target.id),
            (DeleteKind::Question, Some(subtopic_id), Some(topic_id)) => {
                self.delete_question(topic_id, subtopic_id, &target.id)
            }
            (kind, _, _) => {
                tracing::warn!(%kind, id = %target.id, "delete target is missing a scope id");
                false
            }
        }
    }

    // Data management

    /// Replaces the entire tree.
    ///
    /// No merging and no validation: the caller is responsible for handing
    /// over a well-formed tree.
    #[instrument(level = "debug", skip_all, fields(topics = topics.len()))]
    pub fn load_data(&mut self, topics: Vec<Topic>) {
        self.topics = topics;
    }

    /// Serializes the full tree as pretty-printed JSON (2-space indent).
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the tree cannot be serialized.
    pub fn export_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.topics)
    }
}

/// Parses text in the export format back into a tree, ready for
/// [`Sheet::load_data`].
///
/// # Errors
///
/// Returns an error if the text is not valid JSON or does not have the shape
/// of the export format.
pub fn import_json(text: &str) -> serde_json::Result<Vec<Topic>> {
    serde_json::from_str(text)
}

/// Removes the first element matching `predicate`, reporting whether one was
/// found.
fn remove_where<T>(items: &mut Vec<T>, predicate: impl Fn(&T) -> bool) -> bool {
    items
        .iter()
        .position(predicate)
        .map(|index| items.remove(index))
        .is_some()
}

/// Applies a [`reorder`] in place, reporting whether the indices were valid.
fn move_within<T: Clone>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    reorder(items, from, to).map(|moved| *items = moved).is_some()
}

fn replace_ordered<T, K>(current: &mut Vec<T>, proposed: Vec<T>, key: impl Fn(&T) -> K) -> bool
where
    K: Eq + std::hash::Hash,
{
    if !is_permutation(current, &proposed, key) {
        tracing::warn!(
            current = current.len(),
            proposed = proposed.len(),
            "rejected reorder: new order is not a permutation of the current items"
        );
        return false;
    }
    *current = proposed;
    true
}

fn ignored(operation: &str) -> bool {
    tracing::debug!("{operation}: target not found, nothing changed");
    false
}
