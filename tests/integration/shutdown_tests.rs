//! Shutdown-sequence tests: cancellation, graceful stop, forced escalation.

#![cfg(unix)]

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use devserve::models::session::SessionState;
use devserve::session::supervisor::{Session, SessionEvent};

use super::test_helpers::{pid_alive, write_fake_server, SLEEPER, TERM_RESISTANT};

const TEST_PORT: u16 = 48889;

#[tokio::test]
async fn cancellation_runs_the_graceful_stop_sequence() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_fake_server(dir.path(), SLEEPER);

    let mut session =
        Session::new(dir.path().to_path_buf()).with_poll_interval(Duration::from_millis(50));
    session
        .launch(script.to_str().expect("utf8 path"), TEST_PORT)
        .await
        .expect("launch");
    let pid = session.info().pid.expect("pid");

    let cancel = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::channel(4);
    let handle = tokio::spawn(session.supervise(event_tx, cancel.clone()));

    cancel.cancel();

    let event = tokio::time::timeout(Duration::from_secs(6), event_rx.recv())
        .await
        .expect("stop completes within graceful timeout plus slack")
        .expect("event channel open");
    assert_eq!(event, SessionEvent::Stopped { forced: false });

    let info = handle.await.expect("supervise task");
    assert_eq!(info.state, SessionState::Stopped);
    assert!(!pid_alive(pid), "server process must be gone");
}

#[tokio::test]
async fn cancellation_interrupts_without_waiting_for_a_poll_tick() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_fake_server(dir.path(), SLEEPER);

    // A poll cadence far longer than the test: the stop must not wait for it.
    let mut session =
        Session::new(dir.path().to_path_buf()).with_poll_interval(Duration::from_secs(60));
    session
        .launch(script.to_str().expect("utf8 path"), TEST_PORT)
        .await
        .expect("launch");

    let cancel = CancellationToken::new();
    let (event_tx, _event_rx) = mpsc::channel(4);
    let handle = tokio::spawn(session.supervise(event_tx, cancel.clone()));

    cancel.cancel();

    let info = tokio::time::timeout(Duration::from_secs(6), handle)
        .await
        .expect("supervision ends promptly on cancel")
        .expect("supervise task");
    assert_eq!(info.state, SessionState::Stopped);
}

#[tokio::test]
async fn term_resistant_child_is_force_killed_after_timeout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = write_fake_server(dir.path(), TERM_RESISTANT);

    let mut session = Session::new(dir.path().to_path_buf())
        .with_graceful_timeout(Duration::from_millis(300));
    session
        .launch(script.to_str().expect("utf8 path"), TEST_PORT)
        .await
        .expect("launch");
    let pid = session.info().pid.expect("pid");

    let forced = session.stop().await;
    assert!(forced, "TERM-resistant child requires escalation");
    assert_eq!(session.state(), SessionState::Stopped);
    assert!(!pid_alive(pid), "SIGKILL must have taken effect");
}
