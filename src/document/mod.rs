//! Path-addressed access to nested configuration documents.
//!
//! A [`Document`] is a tree of scalars, string-keyed mappings, and ordered
//! sequences. Locations inside it are addressed by a [`KeyPath`], which lets
//! callers read and write values without knowing the concrete shape of the
//! configuration in advance.
//!
//! A key segment that reaches a sequence is broadcast: writes apply the rest
//! of the path to every element, and reads succeed only when every element
//! yields the same value. Index segments address a single element.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

mod error;
mod path;

pub use error::DocumentError;
pub use path::{KeyPath, Segment};

/// Nested configuration value.
///
/// `Value` owns its entire tree, so cloning a document yields a structurally
/// independent copy.
pub type Document = Value;

/// Reads the value addressed by `key_path`.
///
/// # Errors
///
/// Returns [`DocumentError::MissingKey`], [`DocumentError::IndexOutOfRange`],
/// or [`DocumentError::TypeMismatch`] when the path does not resolve, and
/// [`DocumentError::EmptySequence`] or [`DocumentError::DivergentSequence`]
/// when a key segment is broadcast over a sequence that has no elements or
/// whose elements disagree.
pub fn get_value<'doc>(
    key_path: &KeyPath,
    document: &'doc Document,
) -> Result<&'doc Document, DocumentError> {
    lookup(key_path, 0, document)
}

/// Overwrites the value addressed by `key_path` with a copy of `new_value`.
///
/// The final key of a mapping is inserted when absent. Key segments that
/// reach a sequence apply the remainder of the path to every element; an
/// empty sequence is left untouched. On error the document may already be
/// partially updated, so callers needing isolation should work on a copy.
///
/// # Errors
///
/// Returns [`DocumentError::MissingKey`] for absent intermediate keys,
/// [`DocumentError::IndexOutOfRange`] for out-of-range indices, and
/// [`DocumentError::TypeMismatch`] when a segment meets a node of the wrong
/// shape.
pub fn replace_value(
    key_path: &KeyPath,
    new_value: &Document,
    document: &mut Document,
) -> Result<(), DocumentError> {
    assign(key_path, 0, new_value, document)
}

/// Produces an independent copy of `value` by round-tripping it through the
/// document model.
///
/// # Errors
///
/// Returns [`DocumentError::Serialization`] when `value` cannot be
/// represented as a [`Document`] or read back from one.
pub fn deep_copy<T>(value: &T) -> Result<T, DocumentError>
where
    T: Serialize + DeserializeOwned,
{
    let interchange = serde_json::to_value(value)?;
    Ok(serde_json::from_value(interchange)?)
}

/// Decodes the value addressed by `key_path` into a typed destination.
///
/// # Errors
///
/// Returns the traversal errors of [`get_value`], or
/// [`DocumentError::Serialization`] when the value does not match the shape
/// of `T`.
pub fn load_into<T>(key_path: &KeyPath, document: &Document) -> Result<T, DocumentError>
where
    T: DeserializeOwned,
{
    let value = get_value(key_path, document)?;
    T::deserialize(value).map_err(|err| DocumentError::Serialization {
        message: format!("decoding {key_path}: {err}"),
    })
}

/// Names the shape of a node for error messages.
#[must_use]
pub const fn describe(node: &Document) -> &'static str {
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "mapping",
    }
}

fn lookup<'doc>(
    key_path: &KeyPath,
    depth: usize,
    node: &'doc Document,
) -> Result<&'doc Document, DocumentError> {
    let Some(segment) = key_path.segments().get(depth) else {
        return Ok(node);
    };

    match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => {
            let child = map.get(key).ok_or_else(|| DocumentError::MissingKey {
                path: key_path.render_prefix(depth + 1),
            })?;
            lookup(key_path, depth + 1, child)
        }
        (Segment::Key(_), Value::Array(items)) => broadcast_lookup(key_path, depth, items),
        (Segment::Index(index), Value::Array(items)) => {
            let child = items
                .get(*index)
                .ok_or_else(|| out_of_range(key_path, depth, *index, items.len()))?;
            lookup(key_path, depth + 1, child)
        }
        (Segment::Key(_), other) => Err(mismatch(key_path, depth, "mapping", other)),
        (Segment::Index(_), other) => Err(mismatch(key_path, depth, "sequence", other)),
    }
}

fn broadcast_lookup<'doc>(
    key_path: &KeyPath,
    depth: usize,
    items: &'doc [Document],
) -> Result<&'doc Document, DocumentError> {
    let mut agreed: Option<&Document> = None;
    for item in items {
        let value = lookup(key_path, depth, item)?;
        match agreed {
            Some(previous) if previous != value => {
                return Err(DocumentError::DivergentSequence {
                    path: key_path.render_prefix(depth),
                });
            }
            _ => agreed = Some(value),
        }
    }

    agreed.ok_or_else(|| DocumentError::EmptySequence {
        path: key_path.render_prefix(depth),
    })
}

fn assign(
    key_path: &KeyPath,
    depth: usize,
    new_value: &Document,
    node: &mut Document,
) -> Result<(), DocumentError> {
    let Some(segment) = key_path.segments().get(depth) else {
        new_value.clone_into(node);
        return Ok(());
    };
    let is_last = depth + 1 == key_path.segments().len();

    match (segment, node) {
        (Segment::Key(key), Value::Object(map)) => {
            if is_last {
                map.insert(key.clone(), new_value.clone());
                return Ok(());
            }
            let child = map
                .get_mut(key)
                .ok_or_else(|| DocumentError::MissingKey {
                    path: key_path.render_prefix(depth + 1),
                })?;
            assign(key_path, depth + 1, new_value, child)
        }
        (Segment::Key(_), Value::Array(items)) => items
            .iter_mut()
            .try_for_each(|item| assign(key_path, depth, new_value, item)),
        (Segment::Index(index), Value::Array(items)) => {
            let len = items.len();
            let child = items
                .get_mut(*index)
                .ok_or_else(|| out_of_range(key_path, depth, *index, len))?;
            assign(key_path, depth + 1, new_value, child)
        }
        (Segment::Key(_), other) => Err(mismatch(key_path, depth, "mapping", other)),
        (Segment::Index(_), other) => Err(mismatch(key_path, depth, "sequence", other)),
    }
}

fn mismatch(
    key_path: &KeyPath,
    depth: usize,
    expected: &'static str,
    found: &Document,
) -> DocumentError {
    DocumentError::TypeMismatch {
        path: key_path.render_prefix(depth + 1),
        expected,
        found: describe(found),
    }
}

fn out_of_range(key_path: &KeyPath, depth: usize, index: usize, len: usize) -> DocumentError {
    DocumentError::IndexOutOfRange {
        path: key_path.render_prefix(depth + 1),
        index,
        len,
    }
}
