#![forbid(unsafe_code)]

//! `devserve` — local PHP development-server launcher binary.
//!
//! Probes for a free port, spawns the PHP built-in server for a document
//! root, opens the URL in a browser, and supervises the child until the
//! user interrupts.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use devserve::config::LauncherConfig;
use devserve::models::session::SessionState;
use devserve::preflight;
use devserve::session::prober;
use devserve::session::supervisor::{Session, SessionEvent};
use devserve::{AppError, Result};

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "devserve", about = "Local PHP development-server launcher", version, long_about = None)]
struct Cli {
    /// Document root to serve.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Path to an optional TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the first candidate port.
    #[arg(long)]
    port_start: Option<u16>,

    /// Override the number of candidate ports probed.
    #[arg(long)]
    port_count: Option<u16>,

    /// Override the PHP binary.
    #[arg(long)]
    php_binary: Option<String>,

    /// Do not open the served URL in a browser.
    #[arg(long)]
    no_browser: bool,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("devserve bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = match args.config {
        Some(ref path) => LauncherConfig::load_from_path(path)?,
        None => LauncherConfig::default(),
    };
    if let Some(start) = args.port_start {
        config.port_range_start = start;
    }
    if let Some(count) = args.port_count {
        config.port_range_size = count;
    }
    if let Some(binary) = args.php_binary {
        config.php_binary = binary;
    }
    if args.no_browser {
        config.open_browser = false;
    }
    config.validate()?;

    let root = args
        .root
        .canonicalize()
        .map_err(|err| AppError::Launch(format!("invalid document root: {err}")))?;
    info!(root = %root.display(), "document root selected");

    // ── Probe for a free port ───────────────────────────
    let port = prober::find_free_port(config.port_range_start, config.port_range_size)?;
    info!(port, "free port selected");

    // ── Ensure a landing page exists ────────────────────
    if config.create_landing_page {
        preflight::ensure_landing_page(&root)?;
    }

    // ── Launch the server ───────────────────────────────
    let mut session = Session::new(root)
        .with_poll_interval(config.poll_interval())
        .with_graceful_timeout(config.graceful_timeout());
    session.launch(&config.php_binary, port).await?;

    let url = format!("http://localhost:{port}");
    info!(url, "server started, press ctrl-c to stop");

    if config.open_browser {
        if let Err(err) = open::that(&url) {
            warn!(%err, "failed to open browser");
        }
    }

    // ── Supervise until exit or interrupt ───────────────
    let ct = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::channel(16);
    let supervise_handle = tokio::spawn(session.supervise(event_tx, ct.clone()));

    tokio::select! {
        () = shutdown_signal() => {
            info!("shutdown signal received");
            ct.cancel();
        }
        ev = event_rx.recv() => {
            if let Some(SessionEvent::Exited { code }) = ev {
                error!(?code, "server exited unexpectedly");
            }
        }
    }

    let final_info = supervise_handle
        .await
        .map_err(|err| AppError::Launch(format!("supervision task failed: {err}")))?;

    while let Ok(ev) = event_rx.try_recv() {
        if let SessionEvent::Stopped { forced: true } = ev {
            warn!("shutdown was degraded: kill had to be forced");
        }
    }

    match final_info.state {
        SessionState::Stopped => info!("server stopped"),
        state => error!(?state, exit_code = ?final_info.exit_code, "session ended abnormally"),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
