//! Initial data for a new sheet.
//!
//! A source file may be any of:
//!
//! - a flat question list, `{"data": {"questions": [...]}}`, where each record
//!   carries a topic label, a title label (the subtopic) and a nested
//!   question name;
//! - a topic tree, `{"data": {"topics": [...]}}`, where subtopics hold
//!   `problems`;
//! - a previous export (a bare array of topics).
//!
//! [`load_or_default`] never fails: if the source cannot be used for any
//! reason, the built-in [`default_topics`] are returned instead.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use serde::Deserialize;
use tracing::instrument;

use crate::domain::{Id, IdGenerator, Question, Subtopic, Topic};

const UNCATEGORIZED: &str = "Uncategorized";
const UNTITLED_TOPIC: &str = "Untitled Topic";
const UNTITLED_SUBTOPIC: &str = "Untitled Sub-Topic";
const UNTITLED_QUESTION: &str = "Untitled Question";

/// Errors that can occur when reading a source file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// The file that was being read.
        path: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not JSON in one of the recognised shapes.
    #[error("unrecognised source format")]
    Parse(#[from] serde_json::Error),

    /// The file was understood but holds no topics.
    #[error("source contains no topics")]
    Empty,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Source {
    Export(Vec<Topic>),
    Envelope {
        #[serde(default)]
        data: Payload,
    },
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    questions: Option<Vec<QuestionRecord>>,
    #[serde(default)]
    topics: Option<Vec<TopicRecord>>,
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    #[serde(default)]
    topic: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(rename = "questionId", default)]
    question: Option<QuestionRef>,
}

#[derive(Debug, Deserialize)]
struct QuestionRef {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TopicRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtopics: Vec<SubtopicRecord>,
}

#[derive(Debug, Deserialize)]
struct SubtopicRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    problems: Vec<ProblemRecord>,
}

#[derive(Debug, Deserialize)]
struct ProblemRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Reads topics from a source file, falling back to [`default_topics`] if
/// the file is missing, unreadable, malformed or empty.
#[instrument(skip(ids))]
pub fn load_or_default(path: &Path, ids: &mut impl IdGenerator) -> Vec<Topic> {
    match load(path, ids) {
        Ok(topics) => {
            tracing::info!(topics = topics.len(), "loaded source data");
            topics
        }
        Err(e) => {
            tracing::warn!("failed to load {}: {e}; using default data", path.display());
            default_topics(ids)
        }
    }
}

/// Reads topics from a source file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not in a recognised
/// format, or contains no topics.
pub fn load(path: &Path, ids: &mut impl IdGenerator) -> Result<Vec<Topic>, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text, ids)
}

/// Parses source text into topics.
///
/// # Errors
///
/// Returns an error if the text is not in a recognised format or contains
/// no topics.
pub fn parse(text: &str, ids: &mut impl IdGenerator) -> Result<Vec<Topic>, LoadError> {
    let mut topics = match serde_json::from_str::<Source>(text)? {
        Source::Export(topics) => topics,
        Source::Envelope { data } => match (data.topics, data.questions) {
            (Some(topics), _) => from_topic_records(topics, ids),
            (None, Some(questions)) => group_questions(questions, ids),
            (None, None) => Vec::new(),
        },
    };

    if topics.is_empty() {
        return Err(LoadError::Empty);
    }
    dedupe_ids(&mut topics, ids);
    Ok(topics)
}

/// Replaces every id that has already been seen elsewhere in the tree with a
/// fresh one. The first node to carry an id keeps it.
fn dedupe_ids(topics: &mut [Topic], ids: &mut impl IdGenerator) {
    let mut seen = HashSet::new();
    let mut claim = |id: &mut Id| {
        if !seen.insert(id.clone()) {
            let fresh = loop {
                let candidate = ids.next_id();
                if seen.insert(candidate.clone()) {
                    break candidate;
                }
            };
            tracing::warn!(
                duplicate = %id.as_str(),
                replacement = %fresh.as_str(),
                "replaced repeated id"
            );
            *id = fresh;
        }
    };

    for topic in topics {
        claim(&mut topic.id);
        for subtopic in &mut topic.subtopics {
            claim(&mut subtopic.id);
            for question in &mut subtopic.questions {
                claim(&mut question.id);
            }
        }
    }
}

/// Groups flat question records by topic label, then by title label.
///
/// Topics and subtopics appear in the order their labels are first seen.
fn group_questions(records: Vec<QuestionRecord>, ids: &mut impl IdGenerator) -> Vec<Topic> {
    tracing::debug!(records = records.len(), "grouping question records");

    let mut topics: Vec<Topic> = Vec::new();
    let mut topic_index: HashMap<String, usize> = HashMap::new();
    let mut subtopic_index: HashMap<(usize, String), usize> = HashMap::new();

    for record in records {
        let topic_name = label(record.topic, UNCATEGORIZED);
        let subtopic_name = label(record.title, UNTITLED_SUBTOPIC);
        let question_name = label(record.question.and_then(|q| q.name), UNTITLED_QUESTION);

        let t = *topic_index.entry(topic_name.clone()).or_insert_with(|| {
            topics.push(Topic::new(ids.next_id(), topic_name));
            topics.len() - 1
        });

        let subtopics = &mut topics[t].subtopics;
        let s = *subtopic_index
            .entry((t, subtopic_name.clone()))
            .or_insert_with(|| {
                subtopics.push(Subtopic::new(ids.next_id(), subtopic_name));
                subtopics.len() - 1
            });

        let id = fresh_or(record.id, ids);
        subtopics[s].questions.push(Question::new(id, question_name));
    }

    topics
}

fn from_topic_records(records: Vec<TopicRecord>, ids: &mut impl IdGenerator) -> Vec<Topic> {
    records
        .into_iter()
        .map(|topic| Topic {
            id: fresh_or(topic.id, ids),
            title: label(topic.title, UNTITLED_TOPIC),
            subtopics: topic
                .subtopics
                .into_iter()
                .map(|subtopic| Subtopic {
                    id: fresh_or(subtopic.id, ids),
                    title: label(subtopic.title, UNTITLED_SUBTOPIC),
                    questions: subtopic
                        .problems
                        .into_iter()
                        .map(|problem| {
                            Question::new(
                                fresh_or(problem.id, ids),
                                label(problem.title, UNTITLED_QUESTION),
                            )
                        })
                        .collect(),
                })
                .collect(),
        })
        .collect()
}

/// Missing and empty labels both fall back to `default`.
fn label(value: Option<String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn fresh_or(id: Option<String>, ids: &mut impl IdGenerator) -> Id {
    id.filter(|v| !v.is_empty())
        .map_or_else(|| ids.next_id(), Id::from)
}

/// The built-in sample sheet, used whenever no usable source is available.
pub fn default_topics(ids: &mut impl IdGenerator) -> Vec<Topic> {
    let basic = sample_subtopic(
        ids,
        "Basic Array Operations",
        &["Two Sum", "Best Time to Buy and Sell Stock"],
    );
    let window = sample_subtopic(
        ids,
        "Sliding Window",
        &["Longest Substring Without Repeating Characters"],
    );
    let trees = sample_subtopic(ids, "Binary Trees", &["Inorder Traversal"]);

    vec![
        Topic {
            id: ids.next_id(),
            title: "Arrays & Hashing".to_string(),
            subtopics: vec![basic, window],
        },
        Topic {
            id: ids.next_id(),
            title: "Trees & Graphs".to_string(),
            subtopics: vec![trees],
        },
    ]
}

fn sample_subtopic(ids: &mut impl IdGenerator, title: &str, questions: &[&str]) -> Subtopic {
    Subtopic {
        id: ids.next_id(),
        title: title.to_string(),
        questions: questions
            .iter()
            .map(|q| Question::new(ids.next_id(), *q))
            .collect(),
    }
}
