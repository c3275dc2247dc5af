//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
///
/// Runtime conditions are intentionally not represented here: an unexpected
/// child exit surfaces asynchronously as a `Failed` session state plus an
/// event, and a graceful-termination timeout is handled locally by
/// escalating to a forced kill.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Every candidate port in the probing range was unavailable.
    NoPortAvailable {
        /// First candidate port (inclusive).
        start: u16,
        /// Number of candidates probed.
        count: u16,
    },
    /// Server process failed to launch: missing executable, invalid
    /// document root, or immediate exit at actual bind time.
    Launch(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::NoPortAvailable { start, count } => {
                let end = u32::from(*start) + u32::from(*count);
                write!(f, "no free port in range {start}..{end} ({count} probed)")
            }
            Self::Launch(msg) => write!(f, "launch failed: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
