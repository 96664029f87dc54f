#[path = "common/mod.rs"]
mod common;

use std::fs;

use assert_cmd::Command;
use common::FakeSystemctl;
use predicates::{boolean::PredicateBooleanExt, str::contains};

fn svcready() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("svcready"));
    cmd.env("RUST_LOG", "info");
    cmd
}

#[test]
fn ensure_leaves_active_unit_alone() {
    let fake = FakeSystemctl::new();
    fake.set_active();

    svcready()
        .current_dir(fake.dir())
        .args(["ensure", "--manager", fake.path_str()])
        .assert()
        .success()
        .stderr(contains("pigpiod is already running"));

    assert_eq!(fake.calls(), vec!["is-active --quiet pigpiod"]);
}

#[test]
fn ensure_restarts_and_waits_for_active() {
    let fake = FakeSystemctl::new();
    fake.active_after_polls(2);

    svcready()
        .current_dir(fake.dir())
        .args([
            "ensure",
            "--manager",
            fake.path_str(),
            "--service",
            "gpio",
            "--poll-interval",
            "100ms",
        ])
        .assert()
        .success()
        .stderr(contains("gpio is running after restart"));

    assert_eq!(
        fake.calls(),
        vec![
            "is-active --quiet gpio",
            "restart gpio",
            "is-active --quiet gpio",
            "is-active --quiet gpio",
        ]
    );
}

#[test]
fn ensure_reports_failed_restart_without_polling() {
    let fake = FakeSystemctl::new();
    fake.fail_restart();

    svcready()
        .current_dir(fake.dir())
        .args(["ensure", "--manager", fake.path_str()])
        .assert()
        .failure()
        .stderr(contains("failed to restart pigpiod"));

    assert_eq!(fake.calls(), vec!["is-active --quiet pigpiod", "restart pigpiod"]);
}

#[test]
fn ensure_times_out_when_unit_never_activates() {
    let fake = FakeSystemctl::new();

    svcready()
        .current_dir(fake.dir())
        .args([
            "ensure",
            "--manager",
            fake.path_str(),
            "--timeout",
            "500ms",
            "--poll-interval",
            "100ms",
        ])
        .assert()
        .failure()
        .stderr(contains("timeout reached: pigpiod did not become active"));

    assert_eq!(fake.calls()[1], "restart pigpiod");
}

#[test]
fn ensure_failure_is_reported_once() {
    let fake = FakeSystemctl::new();
    fake.fail_restart();

    let output = svcready()
        .current_dir(fake.dir())
        .args(["ensure", "--manager", fake.path_str()])
        .assert()
        .failure()
        .stderr(contains("RestartFailed").not())
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(stderr.matches("failed to restart pigpiod").count(), 1);
}

#[test]
fn ensure_reads_config_file() {
    let fake = FakeSystemctl::new();
    fake.set_active();
    let config_path = fake.dir().join("svcready.yaml");
    fs::write(
        &config_path,
        format!(
            "service: camera\nmanager: \"{}\"\ntimeout: 2s\npoll_interval: 100ms\n",
            fake.path_str()
        ),
    )
    .unwrap();

    svcready()
        .args(["ensure", "-c", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stderr(contains("camera is already running"));

    assert_eq!(fake.calls(), vec!["is-active --quiet camera"]);
}

#[test]
fn ensure_picks_up_default_config_in_working_directory() {
    let fake = FakeSystemctl::new();
    fake.set_active();
    fs::write(
        fake.dir().join("svcready.yaml"),
        format!("service: lidar\nmanager: \"{}\"\n", fake.path_str()),
    )
    .unwrap();

    svcready()
        .current_dir(fake.dir())
        .arg("ensure")
        .assert()
        .success();

    assert_eq!(fake.calls(), vec!["is-active --quiet lidar"]);
}

#[test]
fn ensure_rejects_invalid_duration() {
    let fake = FakeSystemctl::new();

    svcready()
        .current_dir(fake.dir())
        .args(["ensure", "--manager", fake.path_str(), "--timeout", "soon"])
        .assert()
        .failure()
        .stderr(contains("soon"));

    assert!(fake.calls().is_empty());
}

#[test]
fn status_prints_json() {
    let fake = FakeSystemctl::new();
    fake.set_active();

    svcready()
        .current_dir(fake.dir())
        .args(["status", "--json", "-s", "gpio", "--manager", fake.path_str()])
        .assert()
        .success()
        .stdout(contains(r#"{"service":"gpio","active":true}"#));
}

#[test]
fn status_reports_inactive_without_restarting() {
    let fake = FakeSystemctl::new();

    svcready()
        .current_dir(fake.dir())
        .args(["status", "--manager", fake.path_str()])
        .assert()
        .success()
        .stdout(contains("inactive"));

    assert_eq!(fake.calls(), vec!["is-active --quiet pigpiod"]);
}
