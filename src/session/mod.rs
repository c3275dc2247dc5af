//! Local server session management.
//!
//! Covers free-port probing, server process launch, and the liveness
//! supervision loop that drives the session state machine.

pub mod launcher;
pub mod prober;
pub mod supervisor;
