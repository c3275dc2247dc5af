//! Shared helpers for process lifecycle tests.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Fake server that stays up until signalled; TERM kills it promptly.
pub const SLEEPER: &str = "#!/bin/sh\nexec sleep 30\n";

/// Fake server that ignores SIGTERM; only SIGKILL stops it.
pub const TERM_RESISTANT: &str = "#!/bin/sh\ntrap '' TERM\nsleep 30\n";

/// Fake server that exits immediately with code 7.
pub const EARLY_EXIT: &str = "#!/bin/sh\nexit 7\n";

/// Write an executable fake-server script into `dir`.
pub fn write_fake_server(dir: &Path, script: &str) -> PathBuf {
    let path = dir.join("fake-server.sh");
    fs::write(&path, script).expect("write fake server script");
    let mut perms = fs::metadata(&path).expect("stat script").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Signal-0 probe: whether a PID still refers to a live process.
pub fn pid_alive(pid: u32) -> bool {
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    #[allow(clippy::cast_possible_wrap)]
    kill(Pid::from_raw(pid as i32), None).is_ok()
}

/// Send SIGKILL to a PID, ignoring errors.
pub fn kill_hard(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    #[allow(clippy::cast_possible_wrap)]
    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
}
