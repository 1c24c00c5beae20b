//! End-to-end CLI tests for the paperfetch binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

mod support;
use support::socket_guard::start_mock_server_or_skip;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const SAMPLE: &str = "Intro text.\n\nReferences\n\
    Smith et al. (Smith2020 2020)\n\
    doi:10.1/xyz. Published.\n\
    Lee (Lee2019 2019)\n\
    no identifier here\n";

/// Command isolated from the caller's config and environment.
fn paperfetch(config_home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("paperfetch").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("PAPERFETCH_EMAIL")
        .env_remove("RUST_LOG");
    cmd
}

fn write_document(dir: &std::path::Path, contents: &str) -> std::path::PathBuf {
    let path = dir.join("paper.md");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_binary_help_displays_usage() {
    let tempdir = TempDir::new().unwrap();
    paperfetch(tempdir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("open-access PDFs"));
}

#[test]
fn test_binary_version_displays_version() {
    let tempdir = TempDir::new().unwrap();
    paperfetch(tempdir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("paperfetch"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let tempdir = TempDir::new().unwrap();
    paperfetch(tempdir.path())
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_dry_run_lists_pairs_without_network() {
    let tempdir = TempDir::new().unwrap();
    let document = write_document(tempdir.path(), SAMPLE);

    paperfetch(tempdir.path())
        .arg("--dry-run")
        .arg(&document)
        .assert()
        .success()
        .stdout(predicate::str::contains("- Smith2020 -> 10.1/xyz"))
        .stdout(predicate::str::contains("[skipped] Lee2019"))
        .stdout(predicate::str::contains("Dry run - no files downloaded"));
}

#[test]
fn test_dry_run_reads_stdin() {
    let tempdir = TempDir::new().unwrap();
    paperfetch(tempdir.path())
        .args(["--dry-run", "--json", "-"])
        .write_stdin(SAMPLE)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"identifier\": \"Smith2020\""));
}

#[test]
fn test_missing_email_aborts_before_any_request() {
    let tempdir = TempDir::new().unwrap();
    let document = write_document(tempdir.path(), SAMPLE);
    let output_dir = tempdir.path().join("out");

    paperfetch(tempdir.path())
        .arg(&document)
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no contact email configured"));
    assert!(!output_dir.exists());
}

#[test]
fn test_invalid_config_file_reports_line() {
    let tempdir = TempDir::new().unwrap();
    let config_dir = tempdir.path().join("paperfetch");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "# comment\nconcurrency = lots\n").unwrap();
    let document = write_document(tempdir.path(), SAMPLE);

    paperfetch(tempdir.path())
        .arg("--dry-run")
        .arg(&document)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_unreadable_document_is_fatal() {
    let tempdir = TempDir::new().unwrap();
    paperfetch(tempdir.path())
        .arg(tempdir.path().join("missing.md"))
        .arg("--dry-run")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read document"));
}

#[tokio::test]
async fn test_no_bibliography_exits_zero_with_message() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let document = write_document(tempdir.path(), "Nothing cited here.\n");
    let output_dir = tempdir.path().join("out");

    paperfetch(tempdir.path())
        .arg(&document)
        .args(["-e", "tester@example.org", "--lookup-url", server.uri().as_str()])
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("No bibliography section found"));
    assert!(!output_dir.exists());
}

#[tokio::test]
async fn test_full_run_saves_pdf_and_reports_json() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/v2/10.1/xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "best_oa_location": { "url_for_pdf": format!("{}/xyz.pdf", server.uri()) }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/xyz.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.5 body".to_vec()))
        .mount(&server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let document = write_document(tempdir.path(), SAMPLE);
    let output_dir = tempdir.path().join("out");

    let assert = paperfetch(tempdir.path())
        .arg(&document)
        .env("PAPERFETCH_EMAIL", "tester@example.org")
        .args(["--lookup-url", server.uri().as_str(), "--json", "-q"])
        .arg("--output-dir")
        .arg(&output_dir)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    let report: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["status"]["kind"], "retrieved");
    assert_eq!(report["outcomes"][0]["identifier"], "Smith2020");
    assert_eq!(report["outcomes"][0]["status"], "saved");
    assert_eq!(report["outcomes"][1]["identifier"], "Lee2019");
    assert_eq!(report["outcomes"][1]["status"], "no_doi_found");
    assert_eq!(
        std::fs::read(output_dir.join("Smith2020.pdf")).unwrap(),
        b"%PDF-1.5 body"
    );
}

#[tokio::test]
async fn test_all_lookups_failing_exits_one() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let document = write_document(tempdir.path(), SAMPLE);

    let assert = paperfetch(tempdir.path())
        .arg(&document)
        .args(["-e", "tester@example.org", "--lookup-url", server.uri().as_str()])
        .arg("--output-dir")
        .arg(tempdir.path().join("out"))
        .assert()
        .failure();

    assert_eq!(assert.get_output().status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("metadata lookup failed"), "got: {stdout}");
    assert!(stdout.contains("0 of 1"), "got: {stdout}");
}
