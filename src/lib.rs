//! Configuration permutation engine for test matrices.
//!
//! The crate expands a base configuration document into every concrete
//! variant described by a set of axes of variation (permutation →
//! conditional relationships → flattened list of documents). Documents are
//! addressed by key paths, so the engine works without knowing the shape of
//! the configuration in advance.

pub mod config;
pub mod document;
pub mod matrix;
pub mod permutation;
pub mod render;
pub mod source;
pub mod test_support;

pub use config::{ConfigError, MatrixConfig};
pub use document::{
    Document, DocumentError, KeyPath, Segment, deep_copy, get_value, load_into, replace_value,
};
pub use matrix::{Matrix, MatrixError, MatrixFile, MatrixLimits};
pub use permutation::{
    ChildAssignment, Permutation, PermutationError, Relationship, expected_count, permute,
};
pub use render::{OutputFormat, RenderError};
pub use source::{SourceError, read_document, write_documents};
