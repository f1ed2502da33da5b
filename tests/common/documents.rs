//! Shared document fixtures for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared fixtures under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/documents.rs"]
//! mod documents;
//! ```

use confmatrix::{Document, KeyPath, Permutation};
use serde_json::json;

/// Cluster-shaped base configuration with a repeated node pool block.
pub fn cluster_base() -> Document {
    json!({
        "provider": "",
        "region": "",
        "kubernetes": { "version": "", "cni": "calico" },
        "node_pools": [
            { "name": "control-plane", "os": "linux" },
            { "name": "workers", "os": "linux" }
        ],
        "available_versions": ["v1.28", "v1.29", "v1.30"]
    })
}

/// Parses a dot-separated key path, panicking on malformed test input.
pub fn path(text: &str) -> KeyPath {
    text.parse()
        .unwrap_or_else(|err| panic!("key path {text:?} should parse: {err}"))
}

/// Builds an axis over string candidates.
pub fn string_axis(key_path: &str, values: &[&str]) -> Permutation {
    Permutation::new(
        path(key_path),
        values.iter().map(|value| json!(value)).collect(),
    )
}
