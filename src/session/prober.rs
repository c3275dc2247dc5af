//! Free-port probing for the dev-server bind address.

use std::net::{Ipv4Addr, TcpListener};

use tracing::debug;

use crate::{AppError, Result};

/// Default starting port for the availability probe.
pub const DEFAULT_PORT_RANGE_START: u16 = 8000;
/// Default number of candidate ports to probe.
pub const DEFAULT_PORT_RANGE_SIZE: u16 = 100;

/// Check whether a loopback port can be bound right now.
///
/// This is a bind-then-release probe, not a reservation: the listener is
/// dropped immediately, so another process can claim the port between the
/// probe and the real server bind. That gap is an accepted limitation; a
/// lost race surfaces later as a launch failure.
#[must_use]
pub fn probe(port: u16) -> bool {
    TcpListener::bind((Ipv4Addr::LOCALHOST, port)).is_ok()
}

/// Find the first bindable loopback port in `start..start + count`.
///
/// Candidates are probed in ascending order, at most `count` of them.
/// Arithmetic saturates at the maximum port number rather than wrapping.
///
/// # Errors
///
/// Returns `AppError::NoPortAvailable` when every candidate in the range is
/// already bound (or the range is empty).
pub fn find_free_port(start: u16, count: u16) -> Result<u16> {
    for offset in 0..count {
        let Some(port) = start.checked_add(offset) else {
            break;
        };
        if probe(port) {
            debug!(port, attempts = offset + 1, "found free port");
            return Ok(port);
        }
    }
    Err(AppError::NoPortAvailable { start, count })
}
