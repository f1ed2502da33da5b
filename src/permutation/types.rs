//! Descriptor types for axes of variation.

use crate::document::{Document, DocumentError, KeyPath, describe, get_value};

/// One axis of variation: a location plus the candidate values it takes.
#[derive(Clone, Debug, PartialEq)]
pub struct Permutation {
    /// Location the candidate values are written to.
    pub key_path: KeyPath,
    /// Candidate values, expanded in order.
    pub values: Vec<Document>,
    /// Conditional child axes keyed by the chosen candidate value.
    pub relationships: Vec<Relationship>,
}

impl Permutation {
    /// Creates an axis without conditional children.
    #[must_use]
    pub const fn new(key_path: KeyPath, values: Vec<Document>) -> Self {
        Self {
            key_path,
            values,
            relationships: Vec::new(),
        }
    }

    /// Creates an axis whose candidates are the elements of the sequence
    /// stored at `source_path` in `document`.
    ///
    /// # Errors
    ///
    /// Returns the traversal errors of [`get_value`], or
    /// [`DocumentError::TypeMismatch`] when `source_path` does not hold a
    /// sequence.
    pub fn from_candidates(
        key_path: KeyPath,
        source_path: &KeyPath,
        document: &Document,
    ) -> Result<Self, DocumentError> {
        let source = get_value(source_path, document)?;
        let Some(candidates) = source.as_array() else {
            return Err(DocumentError::TypeMismatch {
                path: source_path.to_string(),
                expected: "sequence",
                found: describe(source),
            });
        };
        Ok(Self::new(key_path, candidates.clone()))
    }

    /// Attaches a conditional relationship.
    #[must_use]
    pub fn with_relationship(mut self, relationship: Relationship) -> Self {
        self.relationships.push(relationship);
        self
    }
}

/// Fixed value written to a child location when a relationship matches.
#[derive(Clone, Debug, PartialEq)]
pub struct ChildAssignment {
    /// Location to overwrite.
    pub key_path: KeyPath,
    /// Value written there.
    pub value: Document,
}

/// Child axes that apply only when the parent axis takes `parent_value`.
#[derive(Clone, Debug, PartialEq)]
pub struct Relationship {
    /// Candidate value of the enclosing axis that activates this relationship.
    pub parent_value: Document,
    /// Optional fixed assignment applied before the child axes expand.
    pub assignment: Option<ChildAssignment>,
    /// Axes expanded when the relationship is active.
    pub child_permutations: Vec<Permutation>,
}

impl Relationship {
    /// Creates an inert relationship for `parent_value`.
    #[must_use]
    pub const fn new(parent_value: Document) -> Self {
        Self {
            parent_value,
            assignment: None,
            child_permutations: Vec::new(),
        }
    }

    /// Adds a child axis.
    #[must_use]
    pub fn with_child_permutation(mut self, permutation: Permutation) -> Self {
        self.child_permutations.push(permutation);
        self
    }

    /// Pins `key_path` to `value` whenever the relationship is active.
    #[must_use]
    pub fn with_assignment(mut self, key_path: KeyPath, value: Document) -> Self {
        self.assignment = Some(ChildAssignment { key_path, value });
        self
    }

    /// Reports whether the relationship fires for the chosen parent value.
    /// Matching compares values, so `1` and `1.0` are distinct.
    #[must_use]
    pub fn matches(&self, chosen: &Document) -> bool {
        self.parent_value == *chosen
    }
}
