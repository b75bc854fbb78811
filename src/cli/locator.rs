//! Addressing nodes of the sheet from the command line.
//!
//! A locator is `TOPIC[/SUBTOPIC[/QUESTION]]`. Each segment is either a
//! 1-based position within its parent or the node's id, so `2/1/3` and
//! `2/9f3c.../3` may refer to the same question.

use std::{fmt, num::NonZeroUsize, str::FromStr};

use sheet::{DeleteTarget, Id, IdGenerator, Sheet};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Position(NonZeroUsize),
    Id(Id),
}

impl Segment {
    fn find<'a, T>(&self, items: &'a [T], id_of: impl Fn(&T) -> &Id) -> Option<(usize, &'a T)> {
        match self {
            Self::Position(position) => {
                let index = position.get() - 1;
                items.get(index).map(|item| (index, item))
            }
            Self::Id(id) => items.iter().enumerate().find(|&(_, item)| id_of(item) == id),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Position(position) => write!(f, "{position}"),
            Self::Id(id) => write!(f, "{id}"),
        }
    }
}

/// A parsed `TOPIC[/SUBTOPIC[/QUESTION]]` address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    segments: Vec<Segment>,
}

/// Error returned when a locator cannot be parsed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("invalid locator '{0}': expected TOPIC[/SUBTOPIC[/QUESTION]]")]
pub struct InvalidLocator(String);

impl FromStr for Locator {
    type Err = InvalidLocator;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<Segment> = s
            .split('/')
            .map(|part| {
                let part = part.trim();
                if part.is_empty() {
                    return Err(InvalidLocator(s.to_string()));
                }
                Ok(part
                    .parse::<NonZeroUsize>()
                    .map_or_else(|_| Segment::Id(Id::from(part)), Segment::Position))
            })
            .collect::<Result<_, _>>()?;

        if segments.len() > 3 {
            return Err(InvalidLocator(s.to_string()));
        }
        Ok(Self { segments })
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// A node of the sheet, identified by its id and those of its ancestors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Topic {
        topic: Id,
    },
    Subtopic {
        topic: Id,
        subtopic: Id,
    },
    Question {
        topic: Id,
        subtopic: Id,
        question: Id,
    },
}

impl Node {
    /// The delete confirmation target for this node.
    pub fn delete_target(&self) -> DeleteTarget {
        match self.clone() {
            Self::Topic { topic } => DeleteTarget::topic(topic),
            Self::Subtopic { topic, subtopic } => DeleteTarget::subtopic(topic, subtopic),
            Self::Question {
                topic,
                subtopic,
                question,
            } => DeleteTarget::question(topic, subtopic, question),
        }
    }

    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Topic { .. } => "topic",
            Self::Subtopic { .. } => "subtopic",
            Self::Question { .. } => "question",
        }
    }
}

/// A located node together with its position and title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub node: Node,
    /// 0-based position within the parent collection.
    pub index: usize,
    pub title: String,
}

impl Locator {
    /// Finds the node this locator refers to.
    ///
    /// # Errors
    ///
    /// Fails if any segment does not match a node.
    pub fn resolve<G: IdGenerator>(&self, sheet: &Sheet<G>) -> anyhow::Result<Resolved> {
        let not_found = || anyhow::anyhow!("nothing found at '{}'", self);

        let [first, rest @ ..] = self.segments.as_slice() else {
            return Err(not_found());
        };

        let (index, topic) = first
            .find(sheet.topics(), |t| &t.id)
            .ok_or_else(not_found)?;

        let Some((second, rest)) = rest.split_first() else {
            return Ok(Resolved {
                node: Node::Topic {
                    topic: topic.id.clone(),
                },
                index,
                title: topic.title.clone(),
            });
        };

        let (index, subtopic) = second
            .find(&topic.subtopics, |s| &s.id)
            .ok_or_else(not_found)?;

        let Some(third) = rest.first() else {
            return Ok(Resolved {
                node: Node::Subtopic {
                    topic: topic.id.clone(),
                    subtopic: subtopic.id.clone(),
                },
                index,
                title: subtopic.title.clone(),
            });
        };

        let (index, question) = third
            .find(&subtopic.questions, |q| &q.id)
            .ok_or_else(not_found)?;

        Ok(Resolved {
            node: Node::Question {
                topic: topic.id.clone(),
                subtopic: subtopic.id.clone(),
                question: question.id.clone(),
            },
            index,
            title: question.title.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use sheet::{Config, Question, SequentialIds, Subtopic, Topic};
    use test_case::test_case;

    use super::*;

    fn sheet() -> Sheet<SequentialIds> {
        Sheet::with_topics(
            Config::default(),
            SequentialIds::default(),
            vec![
                Topic::new(Id::from("t1"), "Arrays"),
                Topic {
                    id: Id::from("t2"),
                    title: "Trees".to_string(),
                    subtopics: vec![Subtopic {
                        id: Id::from("s1"),
                        title: "Binary Trees".to_string(),
                        questions: vec![
                            Question::new(Id::from("q1"), "Inorder"),
                            Question::new(Id::from("q2"), "Preorder"),
                        ],
                    }],
                },
            ],
        )
    }

    #[test_case("1"; "single position")]
    #[test_case("2/1/2"; "positions")]
    #[test_case("t2/s1/q2"; "ids")]
    #[test_case("abc/1"; "mixed")]
    fn parses_and_displays(input: &str) {
        let locator: Locator = input.parse().unwrap();
        assert_eq!(locator.to_string(), input);
    }

    #[test_case(""; "empty")]
    #[test_case("1//2"; "empty segment")]
    #[test_case("1/2/3/4"; "too deep")]
    fn rejects_malformed(input: &str) {
        assert!(input.parse::<Locator>().is_err());
    }

    #[test]
    fn zero_is_treated_as_an_id() {
        let locator: Locator = "0".parse().unwrap();
        assert!(locator.resolve(&sheet()).is_err());
    }

    #[test]
    fn resolves_positions_and_ids_alike() {
        let sheet = sheet();
        let by_position = "2/1/2".parse::<Locator>().unwrap().resolve(&sheet).unwrap();
        let by_id = "t2/s1/q2".parse::<Locator>().unwrap().resolve(&sheet).unwrap();

        assert_eq!(by_position, by_id);
        assert_eq!(by_id.index, 1);
        assert_eq!(by_id.title, "Preorder");
        assert_eq!(
            by_id.node.delete_target(),
            DeleteTarget::question(Id::from("t2"), Id::from("s1"), Id::from("q2"))
        );
    }

    #[test]
    fn resolves_each_depth() {
        let sheet = sheet();
        let topic = "t1".parse::<Locator>().unwrap().resolve(&sheet).unwrap();
        assert_eq!(topic.node.kind(), "topic");
        assert_eq!(topic.index, 0);

        let subtopic = "2/1".parse::<Locator>().unwrap().resolve(&sheet).unwrap();
        assert_eq!(subtopic.node.kind(), "subtopic");
        assert_eq!(subtopic.title, "Binary Trees");
    }

    #[test]
    fn missing_nodes_are_errors() {
        let sheet = sheet();
        assert!("3".parse::<Locator>().unwrap().resolve(&sheet).is_err());
        assert!("1/1".parse::<Locator>().unwrap().resolve(&sheet).is_err());
        assert!("2/1/q9".parse::<Locator>().unwrap().resolve(&sheet).is_err());
    }
}
