//! Reading base documents and matrix files, and writing expanded output.
//!
//! Files ending in `.json` are parsed as JSON; everything else is parsed as
//! YAML.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use thiserror::Error;
use tracing::debug;

use crate::document::Document;
use crate::render::{OutputFormat, render_document};

/// Prefix of files written by [`write_documents`].
pub const OUTPUT_FILE_PREFIX: &str = "matrix-";

/// Errors raised while reading or writing documents on disk.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when file contents cannot be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that could not be parsed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a path cannot name a file.
    #[error("invalid path {path}: {message}")]
    InvalidPath {
        /// Offending path.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

/// Reads and parses the document stored at `path`.
///
/// # Errors
///
/// Returns [`SourceError::Io`] when the file cannot be read and
/// [`SourceError::Parse`] when it is not valid JSON or YAML.
pub fn read_document(path: &Utf8Path) -> Result<Document, SourceError> {
    let contents = read_file(path)?;
    debug!(%path, bytes = contents.len(), "read document");
    parse_document(path, &contents)
}

/// Parses `contents` using the format implied by `path`'s extension.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] when the contents are malformed.
pub fn parse_document(path: &Utf8Path, contents: &str) -> Result<Document, SourceError> {
    let parse_error = |message: String| SourceError::Parse {
        path: path.to_path_buf(),
        message,
    };

    if path.extension() == Some("json") {
        serde_json::from_str(contents).map_err(|err| parse_error(err.to_string()))
    } else {
        serde_yaml::from_str(contents).map_err(|err| parse_error(err.to_string()))
    }
}

/// Writes each document to `directory` as `matrix-NNNN.<ext>`, numbered
/// from one in output order, creating the directory when needed.
///
/// # Errors
///
/// Returns [`SourceError::Io`] when the directory or a file cannot be
/// written, and [`SourceError::Parse`] when a document cannot be encoded.
pub fn write_documents(
    directory: &Utf8Path,
    documents: &[Document],
    format: OutputFormat,
) -> Result<Vec<Utf8PathBuf>, SourceError> {
    Dir::create_ambient_dir_all(directory, ambient_authority()).map_err(|err| {
        SourceError::Io {
            path: directory.to_path_buf(),
            message: err.to_string(),
        }
    })?;
    let dir = open_dir(directory)?;

    let mut written = Vec::with_capacity(documents.len());
    for (index, document) in documents.iter().enumerate() {
        let file_name = format!(
            "{OUTPUT_FILE_PREFIX}{:04}.{}",
            index + 1,
            format.extension()
        );
        let path = directory.join(&file_name);
        let body = render_document(document, format).map_err(|err| SourceError::Parse {
            path: path.clone(),
            message: err.to_string(),
        })?;
        dir.write(&file_name, body).map_err(|err| SourceError::Io {
            path: path.clone(),
            message: err.to_string(),
        })?;
        written.push(path);
    }

    Ok(written)
}

fn read_file(path: &Utf8Path) -> Result<String, SourceError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| SourceError::InvalidPath {
        path: path.to_path_buf(),
        message: String::from("path is missing a filename"),
    })?;

    open_dir(parent)?
        .read_to_string(file_name)
        .map_err(|err| SourceError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

fn open_dir(path: &Utf8Path) -> Result<Dir, SourceError> {
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|err| SourceError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::TempDir;

    struct Workspace {
        _tmp: TempDir,
        root: Utf8PathBuf,
    }

    #[fixture]
    fn workspace() -> Workspace {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
            .unwrap_or_else(|err| panic!("temp path should be utf8: {}", err.display()));
        Workspace { _tmp: tmp, root }
    }

    #[rstest]
    #[case("base.yaml", "provider: aws\nnodes: [1, 2]\n")]
    #[case("base.json", "{\"provider\": \"aws\", \"nodes\": [1, 2]}")]
    fn read_document_parses_by_extension(
        workspace: Workspace,
        #[case] name: &str,
        #[case] contents: &str,
    ) {
        let path = workspace.root.join(name);
        std::fs::write(&path, contents).unwrap_or_else(|err| panic!("write fixture: {err}"));

        let document = read_document(&path).unwrap_or_else(|err| panic!("read failed: {err}"));

        assert_eq!(document, json!({ "provider": "aws", "nodes": [1, 2] }));
    }

    #[rstest]
    fn read_document_reports_missing_files(workspace: Workspace) {
        let path = workspace.root.join("absent.yaml");
        let err = read_document(&path).expect_err("file does not exist");
        assert!(matches!(err, SourceError::Io { .. }), "unexpected: {err}");
    }

    #[test]
    fn parse_document_reports_malformed_json() {
        let err = parse_document(Utf8Path::new("bad.json"), "{ nope")
            .expect_err("malformed JSON should fail");
        let SourceError::Parse { path, .. } = err else {
            panic!("expected Parse error, got {err:?}");
        };
        assert_eq!(path, Utf8PathBuf::from("bad.json"));
    }

    #[rstest]
    fn write_documents_numbers_files_in_order(workspace: Workspace) {
        let out = workspace.root.join("out");
        let written = write_documents(
            &out,
            &[json!({ "a": 1 }), json!({ "a": 2 })],
            OutputFormat::Yaml,
        )
        .unwrap_or_else(|err| panic!("write failed: {err}"));

        assert_eq!(
            written,
            vec![out.join("matrix-0001.yaml"), out.join("matrix-0002.yaml")]
        );
        let second = read_document(&out.join("matrix-0002.yaml"))
            .unwrap_or_else(|err| panic!("read back failed: {err}"));
        assert_eq!(second, json!({ "a": 2 }));
    }
}
