//! Error types for permutation expansion.

use thiserror::Error;

use crate::document::DocumentError;

/// Errors raised while expanding or sizing a set of permutations.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum PermutationError {
    /// Raised when expansion is requested with no axes.
    #[error("no permutations supplied")]
    NoPermutations,
    /// Raised when the number of generated documents exceeds `u64`.
    #[error("permutation count overflows a 64-bit counter")]
    CountOverflow,
    /// Raised when writing a candidate value into a document fails.
    #[error(transparent)]
    Document(#[from] DocumentError),
}
