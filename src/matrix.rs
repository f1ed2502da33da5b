//! Declarative matrix definitions and guarded expansion.
//!
//! A matrix file lists axes in the same shape as [`Permutation`] and
//! [`Relationship`], with one addition: an axis may take its candidates from
//! a sequence in the base document (`values_from`) instead of listing them
//! inline. [`Matrix::resolve`] turns the file into engine descriptors, and
//! [`Matrix::expand`] refuses to materialise more documents than the
//! configured [`MatrixLimits`] allow.

use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::document::{Document, DocumentError, KeyPath};
use crate::permutation::{Permutation, PermutationError, Relationship, expected_count, permute};

/// Default ceiling on the number of generated documents.
pub const DEFAULT_MAX_DOCUMENTS: u64 = 1024;

/// Top-level shape of a matrix file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MatrixFile {
    /// Axes expanded in order.
    pub permutations: Vec<AxisSpec>,
}

/// Declarative form of a [`Permutation`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AxisSpec {
    /// Location the candidate values are written to.
    pub key_path: KeyPath,
    /// Inline candidate values.
    #[serde(default)]
    pub values: Option<Vec<Document>>,
    /// Location of a sequence in the base document holding the candidates.
    #[serde(default)]
    pub values_from: Option<KeyPath>,
    /// Conditional child axes.
    #[serde(default)]
    pub relationships: Vec<RelationshipSpec>,
}

/// Declarative form of a [`Relationship`].
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RelationshipSpec {
    /// Parent candidate value that activates the relationship.
    pub parent_value: Document,
    /// Fixed value pinned when the relationship is active.
    #[serde(default)]
    pub assign: Option<AssignmentSpec>,
    /// Axes expanded when the relationship is active.
    #[serde(default)]
    pub child_permutations: Vec<AxisSpec>,
}

/// Declarative form of a child assignment.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AssignmentSpec {
    /// Location to overwrite.
    pub key_path: KeyPath,
    /// Value written there.
    pub value: Document,
}

impl MatrixFile {
    /// Decodes a matrix file from an already parsed document.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Decode`] when the document does not describe a
    /// matrix.
    pub fn from_document(document: &Document) -> Result<Self, MatrixError> {
        Self::deserialize(document).map_err(|err| MatrixError::Decode {
            message: err.to_string(),
        })
    }
}

/// Upper bounds applied before expansion.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatrixLimits {
    /// Largest number of documents a single expansion may produce.
    pub max_documents: u64,
}

impl Default for MatrixLimits {
    fn default() -> Self {
        Self {
            max_documents: DEFAULT_MAX_DOCUMENTS,
        }
    }
}

/// Errors raised while resolving or expanding a matrix.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum MatrixError {
    /// Raised when the matrix document has the wrong shape.
    #[error("invalid matrix definition: {message}")]
    Decode {
        /// Decoder message.
        message: String,
    },
    /// Raised when an axis does not name exactly one candidate source.
    #[error("axis {key_path}: {reason}")]
    InvalidAxis {
        /// Key path of the offending axis.
        key_path: String,
        /// Description of the problem.
        reason: &'static str,
    },
    /// Raised when expansion would exceed [`MatrixLimits::max_documents`].
    #[error("matrix would produce {expected} documents, above the limit of {limit}")]
    TooManyDocuments {
        /// Number of documents the matrix describes.
        expected: u64,
        /// Configured ceiling.
        limit: u64,
    },
    /// Raised when `values_from` cannot be resolved.
    #[error("resolving candidates: {0}")]
    Document(#[from] DocumentError),
    /// Raised when expansion or counting fails.
    #[error(transparent)]
    Permutation(#[from] PermutationError),
}

/// Resolved set of axes ready for expansion.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    permutations: Vec<Permutation>,
}

impl Matrix {
    /// Wraps already built descriptors.
    #[must_use]
    pub const fn new(permutations: Vec<Permutation>) -> Self {
        Self { permutations }
    }

    /// Resolves a matrix file against the base document supplying any
    /// `values_from` candidate lists.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::InvalidAxis`] when an axis sets both or neither
    /// of `values` and `values_from`, and [`MatrixError::Document`] when a
    /// candidate list cannot be read.
    pub fn resolve(file: &MatrixFile, base: &Document) -> Result<Self, MatrixError> {
        let permutations = resolve_axes(&file.permutations, base)?;
        Ok(Self { permutations })
    }

    /// Returns the resolved axes.
    #[must_use]
    pub fn permutations(&self) -> &[Permutation] {
        &self.permutations
    }

    /// Counts the documents this matrix describes.
    ///
    /// # Errors
    ///
    /// Propagates [`PermutationError`] from [`expected_count`].
    pub fn expected_count(&self) -> Result<u64, MatrixError> {
        Ok(expected_count(&self.permutations)?)
    }

    /// Expands `base`, checking the document count against `limits` first.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::TooManyDocuments`] before any document is built
    /// when the limit would be exceeded, and propagates expansion failures.
    pub fn expand(
        &self,
        base: &Document,
        limits: MatrixLimits,
    ) -> Result<Vec<Document>, MatrixError> {
        let expected = self.expected_count()?;
        if expected > limits.max_documents {
            return Err(MatrixError::TooManyDocuments {
                expected,
                limit: limits.max_documents,
            });
        }

        let documents = permute(&self.permutations, base)?;
        info!(
            axes = self.permutations.len(),
            documents = documents.len(),
            "expanded configuration matrix"
        );
        Ok(documents)
    }
}

fn resolve_axes(declared: &[AxisSpec], base: &Document) -> Result<Vec<Permutation>, MatrixError> {
    declared.iter().map(|axis| resolve_axis(axis, base)).collect()
}

fn resolve_axis(declared: &AxisSpec, base: &Document) -> Result<Permutation, MatrixError> {
    let invalid = |reason: &'static str| MatrixError::InvalidAxis {
        key_path: declared.key_path.to_string(),
        reason,
    };

    let mut permutation = match (&declared.values, &declared.values_from) {
        (Some(values), None) => Permutation::new(declared.key_path.clone(), values.clone()),
        (None, Some(source)) => {
            Permutation::from_candidates(declared.key_path.clone(), source, base)?
        }
        (Some(_), Some(_)) => return Err(invalid("set only one of values and values_from")),
        (None, None) => return Err(invalid("one of values or values_from is required")),
    };

    for relationship in &declared.relationships {
        permutation = permutation.with_relationship(resolve_relationship(relationship, base)?);
    }
    Ok(permutation)
}

fn resolve_relationship(
    declared: &RelationshipSpec,
    base: &Document,
) -> Result<Relationship, MatrixError> {
    let mut relationship = Relationship::new(declared.parent_value.clone());
    if let Some(assign) = &declared.assign {
        relationship = relationship.with_assignment(assign.key_path.clone(), assign.value.clone());
    }
    for child in resolve_axes(&declared.child_permutations, base)? {
        relationship = relationship.with_child_permutation(child);
    }
    Ok(relationship)
}
