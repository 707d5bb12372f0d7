// ABOUTME: Integration tests for the nyaya CLI binary.
// ABOUTME: Runs the normalize, run and status subcommands against temp files and a mock portal.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn nyaya_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("nyaya").unwrap();
    cmd.arg("--log").arg(dir.join("nyaya.log"));
    cmd
}

fn write_config(dir: &Path, server: &MockServer) -> std::path::PathBuf {
    let path = dir.join("config.json");
    let config = serde_json::json!({
        "case_source": {"list": ["080-CR-0096"]},
        "store_path": dir.join("case_details.json"),
        "status_path": dir.join("daily_case_status.csv"),
        "portal": {
            "base_url": server.url("/lic/"),
            "status_url": server.url("/web/eng/index"),
            "timeout_secs": 5
        }
    });
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    path
}

#[test]
fn normalize_rewrites_store() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("case_details.json");
    fs::write(
        &store,
        r#"{"080-CR-0096": {"मुद्दाको विवरण": {"दर्ता मिती": "२०८०।०४।१९", "मुद्दा": " कर्तव्य   ज्यान "}}}"#,
    )
    .unwrap();

    nyaya_cmd(dir.path())
        .arg("normalize")
        .arg("--store")
        .arg(&store)
        .assert()
        .success()
        .stdout(predicate::str::contains("normalized 1 records"));

    let written = fs::read_to_string(&store).unwrap();
    assert!(written.contains("\"दर्ता मिती\": \"२०८०-०४-१९\""));
    assert!(written.contains("\"मुद्दा\": \"कर्तव्य ज्यान\""));
    assert!(written.starts_with("{\n    \"080-CR-0096\": {\n        \""));

    let log = fs::read_to_string(dir.path().join("nyaya.log")).unwrap();
    assert!(log.contains("store normalized"));
}

#[test]
fn run_fetches_and_merges() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(POST).path("/lic/sys.php");
        then.status(200).body(
            r#"<table class="table"><tr><th>#</th></tr>
               <tr><td><a href="detail.php?id=96">मुद्दाको बिस्तृत विवरण</a></td></tr></table>"#,
        );
    });
    let detail = server.mock(|when, then| {
        when.method(GET).path("/lic/detail.php");
        then.status(200).body(
            r#"<table class="table table-hover"><tr><td class="caption">दर्ता नं:</td><td>080-CR-0096</td></tr></table>"#,
        );
    });

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);
    fs::write(
        dir.path().join("case_details.json"),
        r#"{"080-CR-0126": {"untouched": true}}"#,
    )
    .unwrap();

    nyaya_cmd(dir.path())
        .arg("run")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("fetched 1 of 1 cases"));

    search.assert();
    detail.assert();

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("case_details.json")).unwrap())
            .unwrap();
    assert_eq!(stored["080-CR-0126"]["untouched"], true);
    assert_eq!(stored["080-CR-0096"]["मुद्दाको विवरण"]["दर्ता नं"], "080-CR-0096");
}

#[test]
fn status_updates_counts_table() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/web/eng/index");
        then.status(200)
            .body(r#"<table width="100%"><tr><td>रिट</td><td>५</td></tr></table>"#);
    });

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server);

    nyaya_cmd(dir.path())
        .arg("status")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("0 updated, 1 appended"));

    assert_eq!(
        fs::read_to_string(dir.path().join("daily_case_status.csv")).unwrap(),
        "Case Type,Count\nरिट,5\n"
    );
}

#[test]
fn invalid_schedule_time_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, r#"{"schedule_times": ["25:00"]}"#).unwrap();

    nyaya_cmd(dir.path())
        .arg("schedule")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid schedule time"));
}
