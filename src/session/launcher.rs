//! Server process launcher.
//!
//! Spawns the PHP built-in server for a session with `kill_on_drop(true)`
//! for safety. Output is piped rather than inherited so the launcher's own
//! console stays clean.

use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::{AppError, Result};

/// Window after spawn in which an immediate child exit is treated as a
/// launch failure (bad binary semantics, lost bind race).
const STARTUP_VERIFY: Duration = Duration::from_millis(150);

/// Spawn the dev server bound to `localhost:port` with `document_root` as
/// its document root and working directory.
///
/// # Errors
///
/// Returns `AppError::Launch` if the document root is not a readable
/// directory, the binary cannot be spawned, or the child exits within the
/// startup verification window.
pub async fn spawn_server(
    binary: &str,
    document_root: &Path,
    port: u16,
) -> Result<ServerProcess> {
    if !document_root.is_dir() {
        return Err(AppError::Launch(format!(
            "document root is not a directory: {}",
            document_root.display()
        )));
    }

    let mut cmd = Command::new(binary);
    cmd.arg("-S")
        .arg(format!("localhost:{port}"))
        .arg("-t")
        .arg(document_root)
        .current_dir(document_root)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .map_err(|err| AppError::Launch(format!("failed to spawn {binary}: {err}")))?;

    // Drain both pipes so the child never blocks on a full buffer. Request
    // logs stay out of the console unless debug logging is on.
    if let Some(stdout) = child.stdout.take() {
        drain_output("stdout", stdout);
    }
    if let Some(stderr) = child.stderr.take() {
        drain_output("stderr", stderr);
    }

    let mut process = ServerProcess { child };

    info!(
        binary,
        port,
        pid = process.pid().unwrap_or(0),
        root = %document_root.display(),
        "server process spawned"
    );

    // Spawn-then-verify: a child that dies this quickly never served anything.
    tokio::time::sleep(STARTUP_VERIFY).await;
    if let Liveness::Exited(status) = process.poll() {
        return Err(AppError::Launch(format!(
            "server exited during startup: {}",
            status_text(status)
        )));
    }

    Ok(process)
}

/// Forward one child output stream to debug-level logs until it closes.
fn drain_output(stream: &'static str, pipe: impl AsyncRead + Unpin + Send + 'static) {
    tokio::spawn(async move {
        let mut lines = BufReader::new(pipe).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            debug!(stream, "{line}");
        }
    });
}

/// Outcome of a non-blocking liveness poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    /// The child is still running.
    Running,
    /// The child has exited, with its status when the platform provided one.
    Exited(Option<ExitStatus>),
}

/// Owned handle to a spawned server process.
///
/// At most one live handle exists per session; dropping it kills the child.
#[derive(Debug)]
pub struct ServerProcess {
    child: Child,
}

impl ServerProcess {
    /// OS process id, while the child has not been reaped.
    #[must_use]
    pub fn pid(&self) -> Option<u32> {
        self.child.id()
    }

    /// Non-blocking liveness check.
    ///
    /// A poll error is treated as an exit with unknown status so a dead
    /// entry is never polled forever.
    pub fn poll(&mut self) -> Liveness {
        match self.child.try_wait() {
            Ok(Some(status)) => Liveness::Exited(Some(status)),
            Ok(None) => Liveness::Running,
            Err(err) => {
                warn!(%err, "failed to poll server process status");
                Liveness::Exited(None)
            }
        }
    }

    /// Request graceful termination.
    ///
    /// Sends SIGTERM on unix; on other platforms there is no graceful
    /// signal for a detached child, so this starts a kill directly.
    pub fn terminate(&mut self) {
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(pid) = self.child.id() {
                #[allow(clippy::cast_possible_wrap)]
                let res = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
                if let Err(err) = res {
                    warn!(pid, %err, "failed to send SIGTERM");
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(err) = self.child.start_kill() {
                warn!(%err, "failed to start kill");
            }
        }
    }

    /// Block on child exit for at most `dur`. Returns `None` on timeout.
    pub async fn wait_timeout(&mut self, dur: Duration) -> Option<ExitStatus> {
        match timeout(dur, self.child.wait()).await {
            Ok(Ok(status)) => Some(status),
            Ok(Err(err)) => {
                warn!(%err, "error waiting for server process");
                None
            }
            Err(_) => None,
        }
    }

    /// Forcibly kill the child and reap it.
    pub async fn kill(&mut self) {
        if let Err(err) = self.child.kill().await {
            warn!(%err, "failed to kill server process");
        }
        let _ = self.child.wait().await;
        debug!("server process killed");
    }
}

/// Human-readable exit status, matching what the supervisor logs.
#[must_use]
pub fn status_text(status: Option<ExitStatus>) -> String {
    status.map_or_else(
        || "status unknown".to_owned(),
        |s| {
            if s.success() {
                "exited normally (code 0)".to_owned()
            } else {
                s.code().map_or_else(
                    || "terminated by signal".to_owned(),
                    |c| format!("exited with code {c}"),
                )
            }
        },
    )
}
