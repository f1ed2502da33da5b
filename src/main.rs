//! Binary entry point for the confmatrix CLI.

use std::io::{self, Write};
use std::process;

use camino::Utf8PathBuf;
use clap::Parser;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use confmatrix::config::ConfigError;
use confmatrix::document::{DocumentError, KeyPath, get_value};
use confmatrix::matrix::{Matrix, MatrixError, MatrixFile};
use confmatrix::render::{RenderError, render_document, render_stream};
use confmatrix::source::{SourceError, read_document, write_documents};
use confmatrix::{Document, MatrixConfig};

mod cli;

use cli::{Cli, CountCommand, ExpandCommand, GetCommand, SourceArgs};

#[derive(Debug, Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Matrix(#[from] MatrixError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("failed to write output: {0}")]
    Output(String),
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = match dispatch(cli) {
        Ok(()) => 0,
        Err(err) => {
            report_error(&err);
            1
        }
    };

    process::exit(exit_code);
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn dispatch(cli: Cli) -> Result<(), CliError> {
    let config = MatrixConfig::load_without_cli_args()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli, config, &mut out)
}

fn execute(cli: Cli, config: MatrixConfig, out: &mut impl Write) -> Result<(), CliError> {
    match cli {
        Cli::Expand(command) => expand(command, config, out),
        Cli::Count(command) => count(command, config, out),
        Cli::Get(command) => get(command, config, out),
    }
}

fn expand(
    command: ExpandCommand,
    mut config: MatrixConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    apply_source_overrides(&mut config, command.sources);
    if let Some(format) = command.format {
        config.output_format = format;
    }
    if let Some(max_documents) = command.max_documents {
        config.max_documents = max_documents;
    }
    config.validate()?;

    let (base, matrix) = load_matrix(&config)?;
    let documents = matrix.expand(&base, config.limits()?)?;
    let format = config.format()?;

    if let Some(dir) = command.output_dir {
        let written = write_documents(&Utf8PathBuf::from(dir), &documents, format)?;
        for path in written {
            writeln!(out, "{path}").map_err(|err| CliError::Output(err.to_string()))?;
        }
        return Ok(());
    }

    let stream = render_stream(&documents, format)?;
    out.write_all(stream.as_bytes())
        .map_err(|err| CliError::Output(err.to_string()))
}

fn count(
    command: CountCommand,
    mut config: MatrixConfig,
    out: &mut impl Write,
) -> Result<(), CliError> {
    apply_source_overrides(&mut config, command.sources);
    let (_, matrix) = load_matrix(&config)?;
    let total = matrix.expected_count()?;
    writeln!(out, "{total}").map_err(|err| CliError::Output(err.to_string()))
}

fn get(command: GetCommand, mut config: MatrixConfig, out: &mut impl Write) -> Result<(), CliError> {
    if let Some(base) = command.base {
        config.base_document = Some(base);
    }
    if let Some(format) = command.format {
        config.output_format = format;
    }

    let key_path: KeyPath = command.key_path.parse()?;
    let base = read_document(&config.base_document_path()?)?;
    let value = get_value(&key_path, &base)?;
    let rendered = render_document(value, config.format()?)?;
    out.write_all(rendered.as_bytes())
        .map_err(|err| CliError::Output(err.to_string()))
}

fn apply_source_overrides(config: &mut MatrixConfig, sources: SourceArgs) {
    if let Some(base) = sources.base {
        config.base_document = Some(base);
    }
    if let Some(matrix) = sources.matrix {
        config.matrix_file = Some(matrix);
    }
}

fn load_matrix(config: &MatrixConfig) -> Result<(Document, Matrix), CliError> {
    let base_path = config.base_document_path()?;
    let matrix_path = config.matrix_file_path()?;
    debug!(base = %base_path, matrix = %matrix_path, "loading matrix inputs");

    let base = read_document(&base_path)?;
    let file = MatrixFile::from_document(&read_document(&matrix_path)?)?;
    let matrix = Matrix::resolve(&file, &base)?;
    Ok((base, matrix))
}

fn report_error(err: &CliError) {
    write_error(io::stderr(), err);
}

fn write_error(mut target: impl Write, err: &CliError) {
    writeln!(target, "{err}").ok();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct Inputs {
        _tmp: TempDir,
        root: Utf8PathBuf,
    }

    impl Inputs {
        fn path(&self, name: &str) -> String {
            self.root.join(name).to_string()
        }
    }

    #[fixture]
    fn inputs() -> Inputs {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf())
            .unwrap_or_else(|err| panic!("temp path should be utf8: {}", err.display()));
        std::fs::write(root.join("base.yaml"), "mode: ''\nopt: ''\n")
            .unwrap_or_else(|err| panic!("write base: {err}"));
        std::fs::write(
            root.join("matrix.yaml"),
            concat!(
                "permutations:\n",
                "  - key_path: [mode]\n",
                "    values: [a, b]\n",
                "    relationships:\n",
                "      - parent_value: a\n",
                "        child_permutations:\n",
                "          - key_path: [opt]\n",
                "            values: [x, y]\n",
            ),
        )
        .unwrap_or_else(|err| panic!("write matrix: {err}"));
        Inputs { _tmp: tmp, root }
    }

    fn config() -> MatrixConfig {
        MatrixConfig {
            base_document: None,
            matrix_file: None,
            max_documents: 1024,
            output_format: String::from("json"),
        }
    }

    fn sources(inputs: &Inputs) -> SourceArgs {
        SourceArgs {
            base: Some(inputs.path("base.yaml")),
            matrix: Some(inputs.path("matrix.yaml")),
        }
    }

    fn run(cli: Cli, config: MatrixConfig) -> Result<String, CliError> {
        let mut out = Vec::new();
        execute(cli, config, &mut out)?;
        Ok(String::from_utf8(out).unwrap_or_else(|err| panic!("output should be utf8: {err}")))
    }

    #[rstest]
    fn expand_prints_json_lines(inputs: Inputs) {
        let cli = Cli::Expand(ExpandCommand {
            sources: sources(&inputs),
            format: None,
            max_documents: None,
            output_dir: None,
        });

        let output = run(cli, config()).unwrap_or_else(|err| panic!("expand failed: {err}"));

        assert_eq!(
            output,
            concat!(
                "{\"mode\":\"a\",\"opt\":\"x\"}\n",
                "{\"mode\":\"a\",\"opt\":\"y\"}\n",
                "{\"mode\":\"b\",\"opt\":\"\"}\n",
            )
        );
    }

    #[rstest]
    fn expand_honours_max_documents_override(inputs: Inputs) {
        let cli = Cli::Expand(ExpandCommand {
            sources: sources(&inputs),
            format: None,
            max_documents: Some(2),
            output_dir: None,
        });

        let err = run(cli, config()).expect_err("three documents exceed two");

        assert!(
            matches!(
                err,
                CliError::Matrix(MatrixError::TooManyDocuments {
                    expected: 3,
                    limit: 2
                })
            ),
            "unexpected error: {err}"
        );
    }

    #[rstest]
    fn count_prints_expected_total(inputs: Inputs) {
        let cli = Cli::Count(CountCommand {
            sources: sources(&inputs),
        });

        let output = run(cli, config()).unwrap_or_else(|err| panic!("count failed: {err}"));

        assert_eq!(output, "3\n");
    }

    #[rstest]
    fn get_prints_value_at_key_path(inputs: Inputs) {
        let cli = Cli::Get(GetCommand {
            base: Some(inputs.path("matrix.yaml")),
            format: None,
            key_path: String::from("permutations.[0].values"),
        });

        let output = run(cli, config()).unwrap_or_else(|err| panic!("get failed: {err}"));

        assert_eq!(output, "[\n  \"a\",\n  \"b\"\n]\n");
    }

    #[test]
    fn missing_base_document_mentions_every_source() {
        let cli = Cli::Count(CountCommand {
            sources: SourceArgs {
                base: None,
                matrix: None,
            },
        });

        let err = run(cli, config()).expect_err("no base document configured");
        let message = err.to_string();

        for fragment in ["--base", "CONFMATRIX_BASE_DOCUMENT", "base_document"] {
            assert!(message.contains(fragment), "missing {fragment}: {message}");
        }
    }

    #[test]
    fn write_error_emits_message_line() {
        let mut buffer = Vec::new();
        write_error(&mut buffer, &CliError::Output(String::from("broken pipe")));
        assert_eq!(
            String::from_utf8_lossy(&buffer),
            "failed to write output: broken pipe\n"
        );
    }
}
