//! The three levels of the question tree.
//!
//! A [`Topic`] owns an ordered list of [`Subtopic`]s, which in turn own an
//! ordered list of [`Question`]s. Order is significant and is exactly the
//! order of the vectors; there is no separate sort key.
//!
//! The serialized form of these types is the export format, so field names
//! and nesting must not change.

use serde::{Deserialize, Serialize};

use crate::domain::id::{Id, IdGenerator};

/// A top-level grouping of subtopics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Unique identifier.
    pub id: Id,
    /// Display title.
    pub title: String,
    /// Subtopics in display order.
    pub subtopics: Vec<Subtopic>,
}

/// A grouping of questions within a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtopic {
    /// Unique identifier.
    pub id: Id,
    /// Display title.
    pub title: String,
    /// Questions in display order.
    pub questions: Vec<Question>,
}

/// A single practice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier.
    pub id: Id,
    /// Display title.
    pub title: String,
    /// Whether the question has been completed.
    pub completed: bool,
}

/// Completed and total question counts for part of the tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Number of completed questions.
    pub completed: usize,
    /// Total number of questions.
    pub total: usize,
}

impl Progress {
    /// Percentage of completed questions, rounded down. An empty part of the
    /// tree is reported as 0%.
    #[must_use]
    pub const fn percent(self) -> usize {
        if self.total == 0 {
            0
        } else {
            self.completed * 100 / self.total
        }
    }
}

impl std::ops::Add for Progress {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            completed: self.completed + rhs.completed,
            total: self.total + rhs.total,
        }
    }
}

impl std::iter::Sum for Progress {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, p| acc + p)
    }
}

impl Topic {
    /// Creates an empty topic.
    #[must_use]
    pub fn new(id: Id, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            subtopics: Vec::new(),
        }
    }

    /// Looks up a subtopic by id.
    #[must_use]
    pub fn subtopic(&self, id: &Id) -> Option<&Subtopic> {
        self.subtopics.iter().find(|s| &s.id == id)
    }

    pub(crate) fn subtopic_mut(&mut self, id: &Id) -> Option<&mut Subtopic> {
        self.subtopics.iter_mut().find(|s| &s.id == id)
    }

    /// Deep-copies this topic, giving the copy and every node beneath it a
    /// fresh id. Copied questions are marked incomplete and the copy's title
    /// gets `suffix` appended. Subtopic titles are copied unchanged.
    #[must_use]
    pub fn duplicate(&self, ids: &mut impl IdGenerator, suffix: &str) -> Self {
        Self {
            id: ids.next_id(),
            title: format!("{}{suffix}", self.title),
            subtopics: self
                .subtopics
                .iter()
                .map(|subtopic| subtopic.duplicate(ids, ""))
                .collect(),
        }
    }

    /// Returns a copy containing only the questions whose title contains
    /// `needle`, or `None` if nothing matched.
    ///
    /// `needle` must already be lowercase.
    pub(crate) fn matching(&self, needle: &str) -> Option<Self> {
        let subtopics: Vec<Subtopic> = self
            .subtopics
            .iter()
            .filter_map(|subtopic| subtopic.matching(needle))
            .collect();

        (!subtopics.is_empty()).then(|| Self {
            id: self.id.clone(),
            title: self.title.clone(),
            subtopics,
        })
    }

    /// Completion counts across every subtopic.
    #[must_use]
    pub fn progress(&self) -> Progress {
        self.subtopics.iter().map(Subtopic::progress).sum()
    }
}

impl Subtopic {
    /// Creates an empty subtopic.
    #[must_use]
    pub fn new(id: Id, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            questions: Vec::new(),
        }
    }

    /// Looks up a question by id.
    #[must_use]
    pub fn question(&self, id: &Id) -> Option<&Question> {
        self.questions.iter().find(|q| &q.id == id)
    }

    pub(crate) fn question_mut(&mut self, id: &Id) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| &q.id == id)
    }

    /// Deep-copies this subtopic with fresh ids, all questions incomplete,
    /// and `suffix` appended to the title.
    #[must_use]
    pub fn duplicate(&self, ids: &mut impl IdGenerator, suffix: &str) -> Self {
        Self {
            id: ids.next_id(),
            title: format!("{}{suffix}", self.title),
            questions: self
                .questions
                .iter()
                .map(|question| Question::new(ids.next_id(), question.title.clone()))
                .collect(),
        }
    }

    fn matching(&self, needle: &str) -> Option<Self> {
        let questions: Vec<Question> = self
            .questions
            .iter()
            .filter(|question| question.title.to_lowercase().contains(needle))
            .cloned()
            .collect();

        (!questions.is_empty()).then(|| Self {
            id: self.id.clone(),
            title: self.title.clone(),
            questions,
        })
    }

    /// Completion counts for this subtopic's questions.
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.questions.iter().filter(|q| q.completed).count(),
            total: self.questions.len(),
        }
    }
}

impl Question {
    /// Creates an incomplete question.
    #[must_use]
    pub fn new(id: Id, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            completed: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::domain::id::SequentialIds;

    fn question(id: &str, title: &str, completed: bool) -> Question {
        Question {
            id: Id::from(id),
            title: title.to_string(),
            completed,
        }
    }

    fn sample() -> Topic {
        Topic {
            id: Id::from("t1"),
            title: "Arrays".to_string(),
            subtopics: vec![
                Subtopic {
                    id: Id::from("s1"),
                    title: "Basics".to_string(),
                    questions: vec![
                        question("q1", "Two Sum", true),
                        question("q2", "Three Sum", false),
                    ],
                },
                Subtopic {
                    id: Id::from("s2"),
                    title: "Sliding Window".to_string(),
                    questions: vec![question("q3", "Max Window", true)],
                },
            ],
        }
    }

    fn all_ids(topic: &Topic) -> Vec<Id> {
        let mut ids = vec![topic.id.clone()];
        for subtopic in &topic.subtopics {
            ids.push(subtopic.id.clone());
            ids.extend(subtopic.questions.iter().map(|q| q.id.clone()));
        }
        ids
    }

    #[test]
    fn duplicate_keeps_shape_and_resets_completion() {
        let original = sample();
        let copy = original.duplicate(&mut SequentialIds::new("copy"), " (Copy)");

        assert_eq!(copy.title, "Arrays (Copy)");
        assert_eq!(copy.subtopics.len(), original.subtopics.len());
        for (copied, source) in copy.subtopics.iter().zip(&original.subtopics) {
            assert_eq!(copied.title, source.title);
            let titles: Vec<_> = copied.questions.iter().map(|q| &q.title).collect();
            let expected: Vec<_> = source.questions.iter().map(|q| &q.title).collect();
            assert_eq!(titles, expected);
            assert!(copied.questions.iter().all(|q| !q.completed));
        }
    }

    #[test]
    fn duplicate_assigns_fresh_distinct_ids() {
        let original = sample();
        let copy = original.duplicate(&mut SequentialIds::new("copy"), " (Copy)");

        let original_ids: HashSet<Id> = all_ids(&original).into_iter().collect();
        let copy_ids = all_ids(&copy);
        let unique: HashSet<&Id> = copy_ids.iter().collect();

        assert_eq!(unique.len(), copy_ids.len());
        assert!(copy_ids.iter().all(|id| !original_ids.contains(id)));
    }

    #[test]
    fn matching_drops_empty_branches() {
        let filtered = sample().matching("two").unwrap();

        assert_eq!(filtered.subtopics.len(), 1);
        assert_eq!(filtered.subtopics[0].id, Id::from("s1"));
        assert_eq!(filtered.subtopics[0].questions, vec![question("q1", "Two Sum", true)]);
    }

    #[test]
    fn matching_returns_none_without_hits() {
        assert!(sample().matching("graph").is_none());
    }

    #[test]
    fn progress_sums_subtopics() {
        let progress = sample().progress();
        assert_eq!(
            progress,
            Progress {
                completed: 2,
                total: 3
            }
        );
        assert_eq!(progress.percent(), 66);
        assert_eq!(Progress::default().percent(), 0);
    }
}
