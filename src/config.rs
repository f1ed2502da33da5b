//! Configuration loading via `ortho-config`.

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::matrix::{DEFAULT_MAX_DOCUMENTS, MatrixLimits};
use crate::render::OutputFormat;

/// Expansion settings derived from configuration files and environment
/// variables. CLI flags override individual fields after loading.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "CONFMATRIX",
    discovery(
        app_name = "confmatrix",
        env_var = "CONFMATRIX_CONFIG_PATH",
        config_file_name = "confmatrix.toml",
        dotfile_name = ".confmatrix.toml",
        project_file_name = "confmatrix.toml"
    )
)]
pub struct MatrixConfig {
    /// Path to the base configuration document (YAML or JSON).
    pub base_document: Option<String>,
    /// Path to the matrix file describing the axes of variation.
    pub matrix_file: Option<String>,
    /// Largest number of documents a single expansion may produce.
    #[ortho_config(default = DEFAULT_MAX_DOCUMENTS)]
    pub max_documents: u64,
    /// Output encoding: `json` for JSON lines or `yaml` for a document
    /// stream.
    #[ortho_config(default = "json".to_owned())]
    pub output_format: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
    flag: &'static str,
}

impl FieldMetadata {
    const fn new(
        description: &'static str,
        env_var: &'static str,
        toml_key: &'static str,
        flag: &'static str,
    ) -> Self {
        Self {
            description,
            env_var,
            toml_key,
            flag,
        }
    }
}

const BASE_DOCUMENT: FieldMetadata = FieldMetadata::new(
    "base document path",
    "CONFMATRIX_BASE_DOCUMENT",
    "base_document",
    "--base",
);

const MATRIX_FILE: FieldMetadata = FieldMetadata::new(
    "matrix file path",
    "CONFMATRIX_MATRIX_FILE",
    "matrix_file",
    "--matrix",
);

impl MatrixConfig {
    fn require_path(
        value: Option<&str>,
        metadata: &FieldMetadata,
    ) -> Result<Utf8PathBuf, ConfigError> {
        match value.map(str::trim) {
            Some(path) if !path.is_empty() => Ok(Utf8PathBuf::from(path)),
            _ => Err(ConfigError::MissingField(format!(
                "missing {}: pass {}, set {}, or add {} to confmatrix.toml",
                metadata.description, metadata.flag, metadata.env_var, metadata.toml_key
            ))),
        }
    }

    /// Loads configuration from defaults, configuration files, and
    /// environment variables without parsing process arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("confmatrix")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Returns the base document path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no path is configured.
    pub fn base_document_path(&self) -> Result<Utf8PathBuf, ConfigError> {
        Self::require_path(self.base_document.as_deref(), &BASE_DOCUMENT)
    }

    /// Returns the matrix file path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when no path is configured.
    pub fn matrix_file_path(&self) -> Result<Utf8PathBuf, ConfigError> {
        Self::require_path(self.matrix_file.as_deref(), &MATRIX_FILE)
    }

    /// Parses the configured output format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unrecognised format names.
    pub fn format(&self) -> Result<OutputFormat, ConfigError> {
        self.output_format
            .parse::<OutputFormat>()
            .map_err(|err| ConfigError::Invalid {
                field: String::from("output_format"),
                message: err.to_string(),
            })
    }

    /// Builds the expansion limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `max_documents` is zero.
    pub fn limits(&self) -> Result<MatrixLimits, ConfigError> {
        if self.max_documents == 0 {
            return Err(ConfigError::Invalid {
                field: String::from("max_documents"),
                message: String::from(
                    "must be greater than zero (CONFMATRIX_MAX_DOCUMENTS or --max-documents)",
                ),
            });
        }
        Ok(MatrixLimits {
            max_documents: self.max_documents,
        })
    }

    /// Performs semantic validation of the settings every command needs.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the output format or limit is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.format()?;
        self.limits()?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates a configured value is present but unusable.
    #[error("invalid {field}: {message}")]
    Invalid {
        /// Name of the offending field.
        field: String,
        /// Description of the problem.
        message: String,
    },
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
