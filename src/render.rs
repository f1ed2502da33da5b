//! Serialisation of expanded documents for downstream tooling.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::document::Document;

/// Output encodings supported by the CLI.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum OutputFormat {
    /// One compact JSON document per line.
    #[default]
    Json,
    /// YAML documents separated by `---` markers.
    Yaml,
}

impl OutputFormat {
    /// File extension used when writing one document per file.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(RenderError::UnknownFormat(other.to_owned())),
        }
    }
}

/// Errors raised while rendering documents.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RenderError {
    /// Raised when an output format name is not recognised.
    #[error("unknown output format {0:?}; expected json or yaml")]
    UnknownFormat(String),
    /// Raised when a document cannot be encoded.
    #[error("failed to encode document: {0}")]
    Encode(String),
}

/// Renders a single document as a standalone file body.
///
/// # Errors
///
/// Returns [`RenderError::Encode`] when the serializer rejects the document.
pub fn render_document(document: &Document, format: OutputFormat) -> Result<String, RenderError> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(document)
            .map(|mut body| {
                body.push('\n');
                body
            })
            .map_err(|err| RenderError::Encode(err.to_string())),
        OutputFormat::Yaml => {
            serde_yaml::to_string(document).map_err(|err| RenderError::Encode(err.to_string()))
        }
    }
}

/// Renders every document into one stream: JSON lines, or a multi-document
/// YAML stream.
///
/// # Errors
///
/// Returns [`RenderError::Encode`] when any document fails to encode.
pub fn render_stream(documents: &[Document], format: OutputFormat) -> Result<String, RenderError> {
    let mut stream = String::new();
    for document in documents {
        match format {
            OutputFormat::Json => {
                let line = serde_json::to_string(document)
                    .map_err(|err| RenderError::Encode(err.to_string()))?;
                stream.push_str(&line);
                stream.push('\n');
            }
            OutputFormat::Yaml => {
                stream.push_str("---\n");
                stream.push_str(&render_document(document, format)?);
            }
        }
    }
    Ok(stream)
}
