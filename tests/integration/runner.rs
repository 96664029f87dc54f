#[path = "common/mod.rs"]
mod common;

use std::time::{Duration, Instant};

use common::FakeSystemctl;
use svcready::{
    Context, Readiness, ReadinessAssurer, ReadinessError,
    clock::SystemClock,
    config::Settings,
    context::DoneReason,
    error::RunError,
    runner::CommandRunner,
    service::ServiceManager,
    test_utils::RecordingLogger,
};

fn settings(fake: &FakeSystemctl, timeout: Duration, interval: Duration) -> Settings {
    Settings {
        service: "pigpiod".into(),
        manager: fake.path_str().into(),
        timeout,
        poll_interval: interval,
    }
}

#[test]
fn service_manager_reflects_fake_state() {
    let fake = FakeSystemctl::new();
    let runner = CommandRunner;
    let manager = ServiceManager::new(&runner, fake.path_str(), "pigpiod");
    let ctx = Context::background();

    assert!(!manager.is_active(&ctx));
    fake.set_active();
    assert!(manager.is_active(&ctx));
}

#[test]
fn restart_then_third_poll_succeeds_against_real_processes() {
    let fake = FakeSystemctl::new();
    fake.active_after_polls(3);
    let interval = Duration::from_millis(100);
    let assurer = ReadinessAssurer::new(
        CommandRunner,
        SystemClock,
        RecordingLogger::new(),
        settings(&fake, Duration::from_secs(5), interval),
    )
    .unwrap();

    let start = Instant::now();
    let readiness = assurer.ensure_running(&Context::background()).unwrap();

    assert_eq!(readiness, Readiness::ActiveAfterRestart { polls: 3 });
    assert!(start.elapsed() >= interval * 3);
    assert_eq!(
        fake.calls().iter().filter(|c| c.starts_with("is-active")).count(),
        4
    );
    assert_eq!(
        assurer.logger().messages(),
        vec!["pigpiod is running after restart".to_string()]
    );
}

#[test]
fn hanging_query_is_abandoned_at_deadline() {
    let fake = FakeSystemctl::new();
    fake.hang_queries();
    let timeout = Duration::from_millis(600);
    let assurer = ReadinessAssurer::new(
        CommandRunner,
        SystemClock,
        RecordingLogger::new(),
        settings(&fake, timeout, Duration::from_millis(100)),
    )
    .unwrap();

    let start = Instant::now();
    let err = assurer.ensure_running(&Context::background()).unwrap_err();

    // The query is killed at the deadline, so the restart never gets to run.
    assert!(matches!(
        err,
        ReadinessError::RestartFailed {
            source: RunError::Aborted(DoneReason::DeadlineExceeded),
            ..
        }
    ));
    assert!(start.elapsed() >= timeout);
    assert!(start.elapsed() < Duration::from_secs(5));
    assert_eq!(fake.calls(), vec!["is-active --quiet pigpiod"]);
    assert!(assurer.logger().messages().is_empty());
}

#[test]
fn parent_cancellation_stops_polling_promptly() {
    let fake = FakeSystemctl::new();
    let assurer = ReadinessAssurer::new(
        CommandRunner,
        SystemClock,
        RecordingLogger::new(),
        settings(&fake, Duration::from_secs(30), Duration::from_millis(200)),
    )
    .unwrap();

    let ctx = Context::background();
    let token = ctx.cancel_token().clone();
    let canceller = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(500));
        token.cancel();
    });

    let start = Instant::now();
    let err = assurer.ensure_running(&ctx).unwrap_err();
    canceller.join().unwrap();

    assert!(matches!(err, ReadinessError::TimeoutWaitingForActive { .. }));
    assert!(start.elapsed() < Duration::from_secs(5));
}
