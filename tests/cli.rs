use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn scribewatch(workdir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scribewatch").unwrap();
    cmd.current_dir(workdir).env("RUST_LOG", "off");
    cmd
}

fn write_config(dir: &Path) {
    fs_err::write(
        dir.join("scribewatch.yaml"),
        "observer:\n  settle_delay_secs: 0\n  poll_interval_secs: 1\n  max_wait_secs: 30\n  max_attempts: null\nreport:\n  output_dir: outputs\n",
    )
    .unwrap();
}

#[test]
fn replay_success_writes_report() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    fs_err::write(
        dir.path().join("rows.json"),
        r#"[
            null,
            {"cells": ["", ""]},
            {"cells": ["", "Call 1", "", "", "", ""], "markers": ["animate-spin"]},
            {"cells": ["", "Call 1", "", "", "", ""], "markers": ["text-success"], "link": "https://x/y"}
        ]"#,
    )
    .unwrap();

    scribewatch(dir.path())
        .args(["-q", "replay", "rows.json", "--id", "job-1", "-o", "out", "-l", "ar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("report_job-1.json"));

    let report: serde_json::Value =
        serde_json::from_str(&fs_err::read_to_string(dir.path().join("out/report_job-1.json")).unwrap()).unwrap();
    assert_eq!(report["job_metadata"]["status"], "done");
    assert_eq!(report["job_metadata"]["title"], "Call 1");
    assert!(report["job_metadata"]["finished_at"].is_string());
    assert_eq!(report["options"]["language"], "ar");
    assert!(report["status_log"].as_array().unwrap().is_empty());
}

#[test]
fn replay_failure_exits_non_zero() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    fs_err::write(
        dir.path().join("rows.json"),
        r#"[{"cells": ["", "Call 1", "", "", "", ""], "markers": ["text-error"]}]"#,
    )
    .unwrap();

    scribewatch(dir.path())
        .args(["-q", "replay", "rows.json", "--id", "job-2", "-o", "out", "-l", "en"])
        .assert()
        .failure()
        .code(1);

    assert!(dir.path().join("out/report_job-2.json").exists());
}

#[test]
fn report_renders_saved_file() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    fs_err::write(
        dir.path().join("rows.json"),
        r#"[{"cells": ["", "Standup", "", "", "", ""], "markers": ["text-success"]}]"#,
    )
    .unwrap();

    scribewatch(dir.path())
        .args(["-q", "replay", "rows.json", "--id", "job-3", "-o", "out", "-l", "en"])
        .assert()
        .success();

    scribewatch(dir.path())
        .args(["report", "out/report_job-3.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Job job-3").and(predicate::str::contains("Standup")));
}

#[test]
fn plan_lists_steps_with_outputs() {
    let dir = tempfile::tempdir().unwrap();

    scribewatch(dir.path())
        .args(["plan", "--file", "talk.mp3", "-l", "ar", "--timestamps", "--translate", "en"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("upload_file")
                .and(predicate::str::contains("trigger_export -> transcription"))
                .and(predicate::str::contains("translate -> translate")),
        );
}

#[test]
fn plan_rejects_unknown_language() {
    let dir = tempfile::tempdir().unwrap();

    scribewatch(dir.path())
        .args(["plan", "--link", "https://x/y", "-l", "xx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown language code: xx"));
}

#[test]
fn languages_lists_catalogue() {
    let dir = tempfile::tempdir().unwrap();

    scribewatch(dir.path())
        .arg("languages")
        .assert()
        .success()
        .stdout(predicate::str::contains("Arabic"));
}

#[test]
fn replay_rejects_zero_interval_override() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    fs_err::write(dir.path().join("rows.json"), "[]").unwrap();

    scribewatch(dir.path())
        .args(["-q", "replay", "rows.json", "--id", "job-4", "-l", "en", "--interval", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("poll interval must be at least 1s"));

    assert!(!dir.path().join("outputs").exists());
}

#[test]
fn replay_requires_language() {
    let dir = tempfile::tempdir().unwrap();
    write_config(dir.path());
    fs_err::write(dir.path().join("rows.json"), "[]").unwrap();

    scribewatch(dir.path())
        .args(["-q", "replay", "rows.json", "--id", "job-5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--language is required"));
}

#[test]
fn plan_fetch_only_source_without_language() {
    let dir = tempfile::tempdir().unwrap();

    scribewatch(dir.path())
        .args(["plan", "--source", "zoom", "--link", "https://zoom.us/rec/share/abc"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("zoom_link -> source_files")
                .and(predicate::str::contains("login").not()),
        );
}

#[test]
fn plan_transcription_requires_language() {
    let dir = tempfile::tempdir().unwrap();

    scribewatch(dir.path())
        .args(["plan", "--link", "https://x/y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--language is required"));

    scribewatch(dir.path())
        .args([
            "plan",
            "--source",
            "onedrive",
            "--link",
            "https://1drv.ms/v/abc",
            "--with-transcription",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--language is required"));
}
