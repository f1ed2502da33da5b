//! Behavioural smoke tests for the CLI entrypoint.

use assert_cmd::cargo::cargo_bin_cmd;
use camino::Utf8PathBuf;
use predicates::prelude::*;
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
    std::fs::write(root.join("base.json"), r#"{"os": "", "arch": "x86_64"}"#)
        .unwrap_or_else(|err| panic!("write base: {err}"));
    std::fs::write(
        root.join("matrix.yaml"),
        concat!(
            "permutations:\n",
            "  - key_path: [os]\n",
            "    values: [linux, windows]\n",
            "  - key_path: [arch]\n",
            "    values: [x86_64, arm64]\n",
        ),
    )
    .unwrap_or_else(|err| panic!("write matrix: {err}"));
    Inputs { _tmp: tmp, root }
}

#[test]
fn cli_without_arguments_prints_usage() {
    let mut cmd = cargo_bin_cmd!("confmatrix");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[rstest]
fn expand_streams_json_lines(inputs: Inputs) {
    let mut cmd = cargo_bin_cmd!("confmatrix");
    cmd.env_remove("RUST_LOG")
        .args(["expand", "--base"])
        .arg(inputs.path("base.json"))
        .arg("--matrix")
        .arg(inputs.path("matrix.yaml"));

    cmd.assert()
        .success()
        .stdout(concat!(
            "{\"arch\":\"x86_64\",\"os\":\"linux\"}\n",
            "{\"arch\":\"arm64\",\"os\":\"linux\"}\n",
            "{\"arch\":\"x86_64\",\"os\":\"windows\"}\n",
            "{\"arch\":\"arm64\",\"os\":\"windows\"}\n",
        ))
        .stderr("");
}

#[rstest]
fn expand_writes_numbered_files(inputs: Inputs) {
    let out_dir = inputs.root.join("out");
    let mut cmd = cargo_bin_cmd!("confmatrix");
    cmd.args(["expand", "--format", "yaml", "--base"])
        .arg(inputs.path("base.json"))
        .arg("--matrix")
        .arg(inputs.path("matrix.yaml"))
        .arg("--output-dir")
        .arg(out_dir.as_str());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("matrix-0004.yaml"));

    let last = std::fs::read_to_string(out_dir.join("matrix-0004.yaml"))
        .unwrap_or_else(|err| panic!("read rendered document: {err}"));
    assert!(last.contains("os: windows"), "unexpected document: {last}");
    assert!(last.contains("arch: arm64"), "unexpected document: {last}");
}

#[rstest]
fn count_prints_total(inputs: Inputs) {
    let mut cmd = cargo_bin_cmd!("confmatrix");
    cmd.args(["count", "--base"])
        .arg(inputs.path("base.json"))
        .arg("--matrix")
        .arg(inputs.path("matrix.yaml"));

    cmd.assert().success().stdout("4\n");
}

#[rstest]
fn missing_base_document_fails_with_message(inputs: Inputs) {
    let mut cmd = cargo_bin_cmd!("confmatrix");
    cmd.args(["count", "--base"])
        .arg(inputs.path("absent.yaml"))
        .arg("--matrix")
        .arg(inputs.path("matrix.yaml"));

    cmd.assert()
        .code(1)
        .stdout("")
        .stderr(predicate::str::contains("absent.yaml"));
}
