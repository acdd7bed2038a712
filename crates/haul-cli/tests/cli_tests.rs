//! Runs the `haul` binary against a local mock server

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn haul() -> Command {
    let mut cmd = Command::cargo_bin("haul").unwrap();
    cmd.arg("--ignore-config").env_remove("RUST_LOG");
    cmd
}

/// Run a prepared command off the async runtime so the mock server keeps serving
async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

async fn file_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/img/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/gone.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/img/broken.jpg"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

#[test]
fn no_targets_is_a_usage_error() {
    haul()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn unsupported_targets_set_bit_64_and_are_logged() {
    let dir = TempDir::new().unwrap();
    let log = dir.path().join("unsupported.txt");

    haul()
        .arg("--write-unsupported")
        .arg(&log)
        .args(["not-a-url", "https://example.invalid/albums/"])
        .assert()
        .code(64);

    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "not-a-url\nhttps://example.invalid/albums/\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn downloads_files_and_combines_failure_bits() {
    let server = file_server().await;
    let dir = TempDir::new().unwrap();

    let mut cmd = haul();
    cmd.arg("-d")
        .arg(dir.path())
        .arg(format!("{}/img/a.jpg", server.uri()))
        .arg(format!("{}/img/gone.jpg", server.uri()))
        .arg(format!("{}/img/broken.jpg", server.uri()));
    run(cmd).await.code(8 | 4);

    assert_eq!(fs::read(dir.path().join("a.jpg")).unwrap(), b"jpeg-bytes");
    assert!(!dir.path().join("gone.jpg").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn local_directives_apply_to_one_target() {
    let server = file_server().await;
    let base = TempDir::new().unwrap();
    let other = TempDir::new().unwrap();

    let input = format!(
        "# first target goes elsewhere\n-base-directory=\"{}\"\n{uri}/img/a.jpg\n-filename=\"copy.{{extension}}\"\n{uri}/img/a.jpg\n",
        other.path().display(),
        uri = server.uri(),
    );

    let mut cmd = haul();
    cmd.arg("-d").arg(base.path()).args(["-i", "-"]).write_stdin(input);
    run(cmd).await.success();

    assert!(other.path().join("a.jpg").exists());
    assert!(!other.path().join("copy.jpg").exists());
    assert!(base.path().join("copy.jpg").exists());
    assert!(!base.path().join("a.jpg").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn existing_files_are_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.jpg"), "old").unwrap();

    let mut cmd = haul();
    cmd.arg("-d")
        .arg(dir.path())
        .args(["--abort", "1"])
        .arg(format!("{}/img/a.jpg", server.uri()));
    run(cmd).await.success();

    assert_eq!(fs::read_to_string(dir.path().join("a.jpg")).unwrap(), "old");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_urls_lists_playlist_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list.m3u"))
        .respond_with(ResponseTemplate::new(200).set_body_string("#EXTM3U\none.png\nunknown/\n"))
        .mount(&server)
        .await;

    let mut cmd = haul();
    cmd.args(["-gg", "-q"]).arg(format!("{}/list.m3u", server.uri()));
    run(cmd)
        .await
        .code(64)
        .stdout(format!("{}/one.png\n", server.uri()));
}

fn two_unsupported_targets() -> Command {
    let mut cmd = haul();
    cmd.args(["not-a-url", "also-not-a-url"]);
    cmd
}

#[test]
fn progress_lines_for_several_targets() {
    two_unsupported_targets()
        .assert()
        .code(64)
        .stderr(predicate::str::contains("[1/2] not-a-url"))
        .stderr(predicate::str::contains("[2/2] also-not-a-url"));
}

#[test]
fn no_progress_for_a_single_target() {
    haul()
        .arg("not-a-url")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("[1/1]").not());
}

#[test]
fn no_progress_when_quiet() {
    two_unsupported_targets()
        .arg("-q")
        .assert()
        .code(64)
        .stderr(predicate::str::contains("[1/2]").not());
}

#[test]
fn no_progress_when_disabled_in_config() {
    for setting in ["output.progress=false", "output.progress="] {
        two_unsupported_targets()
            .args(["-o", setting])
            .assert()
            .code(64)
            .stderr(predicate::str::contains("[1/2]").not());
    }
}

#[test]
fn no_progress_when_rust_log_silences_logging() {
    two_unsupported_targets()
        .env("RUST_LOG", "off")
        .assert()
        .code(64)
        .stderr(predicate::str::is_empty());
}

#[test]
fn custom_progress_template() {
    two_unsupported_targets()
        .args(["-o", "output.progress={current} of {total}: {url}"])
        .assert()
        .code(64)
        .stderr(predicate::str::contains("2 of 2: also-not-a-url"));
}
