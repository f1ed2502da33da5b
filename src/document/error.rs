//! Error types for document traversal and conversion.

use thiserror::Error;

/// Errors raised while reading, writing, or converting documents.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum DocumentError {
    /// Raised when a key path has no segments.
    #[error("key path must contain at least one segment")]
    EmptyPath,
    /// Raised when textual key path syntax is malformed.
    #[error("invalid key path {input:?}: {reason}")]
    InvalidPath {
        /// Text that failed to parse.
        input: String,
        /// Description of the problem.
        reason: String,
    },
    /// Raised when a mapping lacks the requested key.
    #[error("missing key at {path}")]
    MissingKey {
        /// Path up to and including the missing key.
        path: String,
    },
    /// Raised when an index segment exceeds the sequence length.
    #[error("index {index} out of range at {path} (sequence has {len} elements)")]
    IndexOutOfRange {
        /// Path up to and including the index segment.
        path: String,
        /// Requested index.
        index: usize,
        /// Length of the sequence found.
        len: usize,
    },
    /// Raised when a segment meets a node of the wrong shape.
    #[error("expected {expected} at {path}, found {found}")]
    TypeMismatch {
        /// Path up to and including the offending segment.
        path: String,
        /// Shape the segment requires.
        expected: &'static str,
        /// Shape actually present.
        found: &'static str,
    },
    /// Raised when a broadcast read reaches a sequence with no elements.
    #[error("cannot read through empty sequence at {path}")]
    EmptySequence {
        /// Path to the empty sequence.
        path: String,
    },
    /// Raised when a broadcast read finds different values across elements.
    #[error("sequence elements disagree at {path}; address one element with an index segment")]
    DivergentSequence {
        /// Path to the sequence whose elements disagree.
        path: String,
    },
    /// Raised when a value cannot round-trip through the document model.
    #[error("serialization failed: {message}")]
    Serialization {
        /// Serializer or deserializer message.
        message: String,
    },
}

impl From<serde_json::Error> for DocumentError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            message: value.to_string(),
        }
    }
}
