//! Session model and lifecycle helpers.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state for a managed dev-server session.
///
/// `Stopped` and `Failed` are terminal: a finished session is never relaunched
/// and a new session must be constructed for a new attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Session constructed, no process spawned yet.
    Idle,
    /// Spawn in flight; only observable inside `launch`.
    Starting,
    /// Child process running and being polled for liveness.
    Running,
    /// Stop requested; graceful termination in progress.
    Stopping,
    /// Child terminated on request.
    Stopped,
    /// Launch failed or the child exited unexpectedly.
    Failed,
}

impl SessionState {
    /// Determine whether a lifecycle transition is permitted.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Starting)
                | (Self::Starting, Self::Running | Self::Failed)
                | (Self::Running, Self::Stopping | Self::Failed)
                | (Self::Stopping, Self::Stopped)
        )
    }

    /// Whether the session has reached a terminal state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Failed)
    }
}

/// Point-in-time snapshot of a session, safe to clone and serialize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SessionInfo {
    /// Unique session identifier.
    pub id: String,
    /// Document root served by the child; immutable after creation.
    pub working_directory: PathBuf,
    /// Port the child is bound to; assigned exactly once at launch.
    pub port: Option<u16>,
    /// Current lifecycle state.
    pub state: SessionState,
    /// OS process id of the child, while one exists.
    pub pid: Option<u32>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Exit code of the child, when the platform provided one.
    pub exit_code: Option<i32>,
}
