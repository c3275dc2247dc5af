//! Session state machine and liveness supervision loop.
//!
//! A `Session` owns at most one server process. The supervision loop polls
//! child liveness on a fixed cadence and is interruptible at every tick by
//! a cancellation token, which triggers the graceful-stop sequence instead
//! of waiting for the next poll.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::launcher::{self, Liveness, ServerProcess};
use crate::models::session::{SessionInfo, SessionState};
use crate::{AppError, Result};

/// Default interval between child liveness polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);
/// Default bounded wait for graceful termination before the forced kill.
pub const DEFAULT_GRACEFUL_TIMEOUT: Duration = Duration::from_secs(5);

/// Asynchronous notifications from the supervision loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The child exited without a stop request; the session is `Failed`.
    Exited {
        /// Exit code, when the platform provided one.
        code: Option<i32>,
    },
    /// The stop sequence completed; the session is `Stopped`.
    Stopped {
        /// Whether graceful termination timed out and a kill was forced.
        forced: bool,
    },
}

/// One managed instance of a locally running dev server.
///
/// Terminal sessions (`Stopped`, `Failed`) are never reused; construct a
/// new `Session` for a new attempt.
#[derive(Debug)]
pub struct Session {
    id: String,
    working_directory: PathBuf,
    port: Option<u16>,
    process: Option<ServerProcess>,
    state: SessionState,
    exit_code: Option<i32>,
    created_at: DateTime<Utc>,
    poll_interval: Duration,
    graceful_timeout: Duration,
}

impl Session {
    /// Construct an idle session for the given document root.
    #[must_use]
    pub fn new(working_directory: PathBuf) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            working_directory,
            port: None,
            process: None,
            state: SessionState::Idle,
            exit_code: None,
            created_at: Utc::now(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            graceful_timeout: DEFAULT_GRACEFUL_TIMEOUT,
        }
    }

    /// Override the liveness poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the graceful-termination timeout.
    #[must_use]
    pub fn with_graceful_timeout(mut self, timeout: Duration) -> Self {
        self.graceful_timeout = timeout;
        self
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Port assigned at launch, if any.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Point-in-time snapshot of the session.
    #[must_use]
    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id.clone(),
            working_directory: self.working_directory.clone(),
            port: self.port,
            state: self.state,
            pid: self.process.as_ref().and_then(ServerProcess::pid),
            created_at: self.created_at,
            exit_code: self.exit_code,
        }
    }

    /// Spawn the server process and move the session to `Running`.
    ///
    /// Atomic from the caller's perspective: internally spawn-then-verify,
    /// but the observable outcome is `Running` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Launch` if the session was already launched or the
    /// spawn fails; the session is left in `Failed` in the latter case.
    pub async fn launch(&mut self, binary: &str, port: u16) -> Result<()> {
        if !self.state.can_transition_to(SessionState::Starting) {
            return Err(AppError::Launch(format!(
                "session is {:?}, expected Idle",
                self.state
            )));
        }
        self.state = SessionState::Starting;

        match launcher::spawn_server(binary, &self.working_directory, port).await {
            Ok(process) => {
                self.port = Some(port);
                self.process = Some(process);
                self.state = SessionState::Running;
                info!(session_id = self.id, port, "session running");
                Ok(())
            }
            Err(err) => {
                self.state = SessionState::Failed;
                error!(session_id = self.id, %err, "session launch failed");
                Err(err)
            }
        }
    }

    /// Stop the session: graceful termination, then a forced kill once the
    /// graceful timeout elapses. Idempotent; a session that is not running
    /// is left untouched.
    ///
    /// Returns whether the kill had to be forced.
    pub async fn stop(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.state = SessionState::Stopping;

        let forced = if let Some(mut process) = self.process.take() {
            process.terminate();
            match process.wait_timeout(self.graceful_timeout).await {
                Some(status) => {
                    self.exit_code = status.code();
                    info!(
                        session_id = self.id,
                        status = %launcher::status_text(Some(status)),
                        "server terminated gracefully"
                    );
                    false
                }
                None => {
                    // Degraded shutdown, not a failure.
                    warn!(
                        session_id = self.id,
                        timeout_secs = self.graceful_timeout.as_secs(),
                        "graceful termination timed out, forcing kill"
                    );
                    process.kill().await;
                    true
                }
            }
        } else {
            false
        };

        self.state = SessionState::Stopped;
        forced
    }

    /// Drive the supervision loop until the session reaches a terminal
    /// state, then return the final snapshot.
    ///
    /// Each tick polls child liveness; an unexpected exit moves the session
    /// to `Failed` and emits [`SessionEvent::Exited`]. Cancellation fires at
    /// any suspension point and runs the stop sequence immediately, emitting
    /// [`SessionEvent::Stopped`]. The loop never blocks without a bound.
    pub async fn supervise(
        mut self,
        events: mpsc::Sender<SessionEvent>,
        cancel: CancellationToken,
    ) -> SessionInfo {
        while self.state == SessionState::Running {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!(session_id = self.id, "stop requested");
                    let forced = self.stop().await;
                    let _ = events.send(SessionEvent::Stopped { forced }).await;
                }
                () = tokio::time::sleep(self.poll_interval) => {
                    self.poll_once(&events).await;
                }
            }
        }
        self.info()
    }

    /// One liveness poll tick. Transitions to `Failed` on unexpected exit.
    async fn poll_once(&mut self, events: &mpsc::Sender<SessionEvent>) {
        let Some(process) = self.process.as_mut() else {
            return;
        };
        if let Liveness::Exited(status) = process.poll() {
            self.exit_code = status.and_then(|s| s.code());
            self.process = None;
            self.state = SessionState::Failed;
            error!(
                session_id = self.id,
                status = %launcher::status_text(status),
                "server process exited unexpectedly"
            );
            let _ = events
                .send(SessionEvent::Exited {
                    code: self.exit_code,
                })
                .await;
        }
    }
}
