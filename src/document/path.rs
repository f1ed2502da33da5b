//! Key paths addressing locations inside a [`Document`](super::Document).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::DocumentError;

/// A single step of a [`KeyPath`].
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Segment {
    /// Looks up a mapping entry. When the current node is a sequence the
    /// lookup is broadcast to every element.
    Key(String),
    /// Addresses one element of a sequence.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for Segment {
    fn from(value: &str) -> Self {
        Self::Key(value.to_owned())
    }
}

impl From<String> for Segment {
    fn from(value: String) -> Self {
        Self::Key(value)
    }
}

impl From<usize> for Segment {
    fn from(value: usize) -> Self {
        Self::Index(value)
    }
}

/// Non-empty sequence of [`Segment`]s.
///
/// Paths render as dot-separated keys with bracketed indices, for example
/// `nodes.[0].role`, and parse back from the same syntax.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct KeyPath {
    segments: Vec<Segment>,
}

impl KeyPath {
    /// Builds a key path from its segments.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::EmptyPath`] when `segments` is empty.
    pub fn new<I, S>(segments: I) -> Result<Self, DocumentError>
    where
        I: IntoIterator<Item = S>,
        S: Into<Segment>,
    {
        let collected: Vec<Segment> = segments.into_iter().map(Into::into).collect();
        Self::try_from(collected)
    }

    /// Returns the segments in traversal order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Renders the first `len` segments, used to locate traversal failures.
    pub(super) fn render_prefix(&self, len: usize) -> String {
        if len == 0 {
            return String::from("<root>");
        }
        let prefix = Self {
            segments: self.segments.iter().take(len).cloned().collect(),
        };
        prefix.to_string()
    }
}

impl TryFrom<Vec<Segment>> for KeyPath {
    type Error = DocumentError;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        if segments.is_empty() {
            return Err(DocumentError::EmptyPath);
        }
        Ok(Self { segments })
    }
}

impl From<KeyPath> for Vec<Segment> {
    fn from(value: KeyPath) -> Self {
        value.segments
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for segment in &self.segments {
            if first {
                first = false;
            } else {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for KeyPath {
    type Err = DocumentError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| DocumentError::InvalidPath {
            input: input.to_owned(),
            reason: reason.to_owned(),
        };

        if input.trim().is_empty() {
            return Err(DocumentError::EmptyPath);
        }

        let mut segments = Vec::new();
        for raw in input.split('.') {
            if raw.is_empty() {
                return Err(invalid("empty segment"));
            }
            let segment = match raw.strip_prefix('[') {
                Some(rest) => {
                    let digits = rest
                        .strip_suffix(']')
                        .ok_or_else(|| invalid("unterminated index segment"))?;
                    let index = digits
                        .parse::<usize>()
                        .map_err(|_| invalid("index segment is not a non-negative integer"))?;
                    Segment::Index(index)
                }
                None => Segment::Key(raw.to_owned()),
            };
            segments.push(segment);
        }

        Self::try_from(segments)
    }
}
