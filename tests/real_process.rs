// tests/real_process.rs
//
// Drives the production spawner against real `sh` processes.

#![cfg(unix)]

mod common;
use crate::common::{init_tracing, with_timeout};

use std::error::Error;

use tokio::sync::mpsc;

use syncserver::engine::RuntimeEvent;
use syncserver::exec::{ExitOutcome, LaunchSpec, ProcessSupervisor, RealSpawner};

type TestResult = Result<(), Box<dyn Error>>;

fn sh(script: &str) -> LaunchSpec {
    LaunchSpec::new("sh", vec!["-c".to_string(), script.to_string()])
}

async fn next_exit(rx: &mut mpsc::Receiver<RuntimeEvent>) -> (u64, ExitOutcome) {
    loop {
        match with_timeout(rx.recv()).await {
            Some(RuntimeEvent::ProcessExited { generation, outcome }) => {
                return (generation, outcome);
            }
            Some(_) => continue,
            None => panic!("event channel closed"),
        }
    }
}

#[tokio::test]
async fn stop_terminates_a_long_running_child() -> TestResult {
    init_tracing();
    let (tx, mut rx) = mpsc::channel(8);
    let mut supervisor = ProcessSupervisor::new(RealSpawner, tx);

    let pid = supervisor.start(sh("sleep 30"))?.pid();
    assert!(pid.is_some());
    assert!(supervisor.is_live());

    with_timeout(supervisor.stop()).await;
    assert!(!supervisor.is_live());

    let (generation, outcome) = next_exit(&mut rx).await;
    assert_eq!(generation, 1);
    // Killed by SIGTERM: no exit code.
    assert_eq!(outcome, ExitOutcome::Exited { code: None });
    Ok(())
}

#[tokio::test]
async fn self_exit_is_reported_with_its_code() -> TestResult {
    init_tracing();
    let (tx, mut rx) = mpsc::channel(8);
    let mut supervisor = ProcessSupervisor::new(RealSpawner, tx);

    supervisor.start(sh("exit 3"))?;
    let (_, outcome) = next_exit(&mut rx).await;
    assert_eq!(outcome, ExitOutcome::Exited { code: Some(3) });

    // Already closed: stopping is immediate and the next start is allowed.
    with_timeout(supervisor.stop()).await;
    assert_eq!(supervisor.start(sh("exit 0"))?.generation(), 2);
    Ok(())
}

#[tokio::test]
async fn missing_program_is_a_reported_launch_failure() -> TestResult {
    init_tracing();
    let (tx, mut rx) = mpsc::channel(8);
    let mut supervisor = ProcessSupervisor::new(RealSpawner, tx);

    let process = supervisor.start(LaunchSpec::new("./definitely-not-here-syncserver", vec![]))?;
    assert!(process.is_closed());

    let (_, outcome) = next_exit(&mut rx).await;
    assert!(matches!(outcome, ExitOutcome::LaunchFailed(_)), "got {outcome:?}");
    Ok(())
}

#[tokio::test]
async fn restart_never_overlaps_real_children() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let marker = dir.path().join("running");
    // Each child refuses to start while the marker exists, and removes it
    // when terminated.
    let script = format!(
        "if [ -e '{m}' ]; then exit 9; fi; touch '{m}'; trap \"rm -f '{m}'; exit 0\" TERM; while true; do sleep 0.05; done",
        m = marker.display()
    );

    let (tx, mut rx) = mpsc::channel(8);
    let mut supervisor = ProcessSupervisor::new(RealSpawner, tx);

    for generation in 1..=3u64 {
        supervisor.start(sh(&script))?;
        // Give the shell time to install its trap.
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        assert!(marker.exists(), "generation {generation} should be running");

        with_timeout(supervisor.stop()).await;
        let (exited, outcome) = next_exit(&mut rx).await;
        assert_eq!(exited, generation);
        assert_eq!(outcome, ExitOutcome::Exited { code: Some(0) });
        assert!(!marker.exists());
    }
    Ok(())
}
