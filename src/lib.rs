#![forbid(unsafe_code)]

//! `devserve` — local PHP development-server launcher.
//!
//! Probes for a free loopback port, spawns the PHP built-in server bound to
//! a document root, and supervises the child process until stopped.

pub mod config;
pub mod errors;
pub mod models;
pub mod preflight;
pub mod session;

pub use config::LauncherConfig;
pub use errors::{AppError, Result};
