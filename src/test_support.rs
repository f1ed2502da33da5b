//! Test support utilities shared across unit and integration tests.

use std::collections::BTreeSet;
use std::env;
use std::ffi::OsString;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::document::{Document, DocumentError, KeyPath, Segment, replace_value};

/// Lists the path of every scalar leaf, using index segments for sequence
/// elements. Empty mappings and sequences contribute no paths.
#[must_use]
pub fn leaf_paths(document: &Document) -> Vec<KeyPath> {
    let mut paths = Vec::new();
    collect_leaves(document, &mut Vec::new(), &mut paths);
    paths
}

fn collect_leaves(node: &Document, prefix: &mut Vec<Segment>, paths: &mut Vec<KeyPath>) {
    match node {
        Value::Object(map) => {
            for (key, child) in map {
                prefix.push(Segment::Key(key.clone()));
                collect_leaves(child, prefix, paths);
                prefix.pop();
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                prefix.push(Segment::Index(index));
                collect_leaves(child, prefix, paths);
                prefix.pop();
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            if let Ok(path) = KeyPath::new(prefix.iter().cloned()) {
                paths.push(path);
            }
        }
    }
}

/// Overwrites every scalar leaf of `document` with `marker`.
///
/// Used to show that mutating one expanded document leaves its siblings and
/// the base document untouched.
///
/// # Errors
///
/// Returns [`DocumentError`] if a discovered leaf cannot be rewritten.
pub fn poison_leaves(document: &mut Document, marker: &Document) -> Result<(), DocumentError> {
    for path in leaf_paths(document) {
        replace_value(&path, marker, document)?;
    }
    Ok(())
}

/// Global mutex used to serialise environment mutation in tests.
pub static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Guard that holds the env mutex and restores variables on drop.
pub struct EnvGuard {
    previous: Vec<(String, Option<OsString>)>,
    _guard: MutexGuard<'static, ()>,
}

impl EnvGuard {
    /// Sets multiple environment variables while holding a global mutex.
    #[must_use]
    pub fn set_vars(pairs: &[(&str, &str)]) -> Self {
        debug_assert!(
            {
                let mut seen = BTreeSet::new();
                pairs.iter().all(|(key, _)| seen.insert(*key))
            },
            "duplicate environment variable keys passed to EnvGuard::set_vars"
        );

        let guard = ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let mut previous = Vec::with_capacity(pairs.len());
        for (key, value) in pairs {
            let old = env::var_os(key);
            // SAFETY: Environment mutation is serialised by `ENV_LOCK`, preventing races.
            unsafe { env::set_var(key, value) };
            previous.push(((*key).to_owned(), old));
        }

        Self {
            previous,
            _guard: guard,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, old) in &self.previous {
            // SAFETY: Environment mutation is serialised by holding `_guard`.
            unsafe {
                match old {
                    Some(val) => env::set_var(key, val),
                    None => env::remove_var(key),
                }
            }
        }
    }
}
