//! Combinatorial expansion of a base document over declared axes.
//!
//! Each [`Permutation`] names a key path and the candidate values written
//! there. [`permute`] produces one document per combination of candidates,
//! outer axes varying slowest. A [`Relationship`] attaches child axes that
//! are only expanded on branches where the parent axis chose a particular
//! value, so unmatched branches contribute a single document instead of a
//! product.
//!
//! Expansion is a pure recursive function. Recursion depth equals the number
//! of top-level axes plus the deepest chain of nested relationships, which is
//! expected to stay in the tens; no explicit depth guard is applied. Output
//! size is multiplicative, so callers handling untrusted axis definitions
//! should check [`expected_count`] before expanding.

use tracing::debug;

use crate::document::{Document, replace_value};

mod error;
mod types;

pub use error::PermutationError;
pub use types::{ChildAssignment, Permutation, Relationship};

/// Expands `base` into every combination of the supplied axes.
///
/// Output order follows axis order, then candidate order within each axis.
/// Every returned document is an independent copy; `base` is never
/// modified. An axis with no candidate values yields no documents.
///
/// # Errors
///
/// Returns [`PermutationError::NoPermutations`] when `permutations` is
/// empty, and [`PermutationError::Document`] when a candidate value cannot
/// be written. No partial results are returned on failure.
pub fn permute(
    permutations: &[Permutation],
    base: &Document,
) -> Result<Vec<Document>, PermutationError> {
    let Some((axis, rest)) = permutations.split_first() else {
        return Err(PermutationError::NoPermutations);
    };
    debug!(
        key_path = %axis.key_path,
        candidates = axis.values.len(),
        remaining_axes = rest.len(),
        "expanding axis"
    );

    let expanded = concat(
        axis.values
            .iter()
            .map(|value| expand_candidate(axis, value, base)),
    )?;
    if rest.is_empty() {
        return Ok(expanded);
    }

    concat(expanded.iter().map(|branch| permute(rest, branch)))
}

/// Counts the documents [`permute`] would produce, without building them.
///
/// # Errors
///
/// Returns [`PermutationError::NoPermutations`] when `permutations` is
/// empty, and [`PermutationError::CountOverflow`] when the count does not
/// fit in a `u64`.
pub fn expected_count(permutations: &[Permutation]) -> Result<u64, PermutationError> {
    let Some((axis, rest)) = permutations.split_first() else {
        return Err(PermutationError::NoPermutations);
    };

    let mut axis_total: u64 = 0;
    for value in &axis.values {
        let branches = relationship_factor(&axis.relationships, value)?;
        axis_total = axis_total
            .checked_add(branches)
            .ok_or(PermutationError::CountOverflow)?;
    }
    if rest.is_empty() || axis_total == 0 {
        return Ok(axis_total);
    }

    let tail = expected_count(rest)?;
    axis_total
        .checked_mul(tail)
        .ok_or(PermutationError::CountOverflow)
}

fn expand_candidate(
    axis: &Permutation,
    value: &Document,
    base: &Document,
) -> Result<Vec<Document>, PermutationError> {
    let mut branch = base.clone();
    replace_value(&axis.key_path, value, &mut branch)?;
    if axis.relationships.is_empty() {
        return Ok(vec![branch]);
    }
    apply_relationships(branch, &axis.relationships, value)
}

/// Applies each relationship in turn to every branch produced so far, so
/// independent relationships on the same parent value multiply.
fn apply_relationships(
    document: Document,
    relationships: &[Relationship],
    chosen: &Document,
) -> Result<Vec<Document>, PermutationError> {
    let Some((relationship, rest)) = relationships.split_first() else {
        return Ok(vec![document]);
    };

    let branches = apply_relationship(document, relationship, chosen)?;
    if rest.is_empty() {
        return Ok(branches);
    }

    concat(
        branches
            .into_iter()
            .map(|branch| apply_relationships(branch, rest, chosen)),
    )
}

fn apply_relationship(
    mut document: Document,
    relationship: &Relationship,
    chosen: &Document,
) -> Result<Vec<Document>, PermutationError> {
    if !relationship.matches(chosen) {
        return Ok(vec![document]);
    }

    if let Some(assignment) = &relationship.assignment {
        replace_value(&assignment.key_path, &assignment.value, &mut document)?;
    }
    if relationship.child_permutations.is_empty() {
        return Ok(vec![document]);
    }

    debug!(
        parent_value = %chosen,
        child_axes = relationship.child_permutations.len(),
        "relationship matched"
    );
    permute(&relationship.child_permutations, &document)
}

fn relationship_factor(
    relationships: &[Relationship],
    chosen: &Document,
) -> Result<u64, PermutationError> {
    relationships
        .iter()
        .filter(|relationship| {
            relationship.matches(chosen) && !relationship.child_permutations.is_empty()
        })
        .try_fold(1_u64, |product, relationship| {
            let branches = expected_count(&relationship.child_permutations)?;
            product
                .checked_mul(branches)
                .ok_or(PermutationError::CountOverflow)
        })
}

fn concat<I>(parts: I) -> Result<Vec<Document>, PermutationError>
where
    I: Iterator<Item = Result<Vec<Document>, PermutationError>>,
{
    parts
        .collect::<Result<Vec<_>, _>>()
        .map(|nested| nested.into_iter().flatten().collect())
}
