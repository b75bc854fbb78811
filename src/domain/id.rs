use std::{fmt, ops::Deref};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An opaque identifier for a topic, subtopic or question.
///
/// Identifiers are assigned at creation time and never reused. They are
/// stored as strings so that identifiers coming from external sources (for
/// example database object ids in an imported question list) survive a round
/// trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(String);

impl Id {
    /// Wraps an existing identifier string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<Uuid> for Id {
    fn from(value: Uuid) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Id {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for Id {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A source of fresh identifiers.
///
/// Every identifier returned must differ from every identifier previously
/// returned by the same generator.
pub trait IdGenerator {
    /// Produces the next fresh identifier.
    fn next_id(&mut self) -> Id;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_id(&mut self) -> Id {
        (**self).next_id()
    }
}

/// Generates random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self) -> Id {
        Uuid::new_v4().into()
    }
}

/// Generates `prefix-1`, `prefix-2`, ...
///
/// Deterministic, which makes it useful for tests and benchmarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    /// Creates a generator whose identifiers start with `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("id")
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Id {
        let id = Id(format!("{}-{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}
