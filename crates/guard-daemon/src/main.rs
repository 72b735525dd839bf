//! guardiand — the guardian daemon binary.
//!
//! Loads configuration, prepares the state directory, wires termination
//! signals to graceful shutdown, and runs the loop until told to stop.

use anyhow::{Context, Result};
use guard_core::config::Config;
use guard_core::journal::PidFile;
use guard_daemon::daemon::Daemon;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    guard_daemon::logging::init_logging(&config.guardian.log_level, config.guardian.json_logs);

    // Creating the state directory is the one fatal failure class: without
    // it there is nowhere to log or persist, so exit non-zero before the
    // loop ever starts.
    let state_dir = config.state_dir();
    std::fs::create_dir_all(&state_dir)
        .with_context(|| format!("failed to create state directory {}", state_dir.display()))?;

    let daemon = Daemon::new(&config)?;
    let shutdown = daemon.shutdown_handle();

    let pid_file = PidFile::write(&state_dir).context("failed to write pid file")?;
    info!(
        pid = std::process::id(),
        state_dir = %state_dir.display(),
        interval_secs = config.guardian.interval_secs,
        history_limit = config.guardian.history_limit,
        "guardian daemon starting"
    );

    // Wire SIGINT and SIGTERM to graceful shutdown.
    tokio::spawn(async move {
        if let Err(e) = wait_for_signal().await {
            error!(error = %e, "failed to listen for termination signals");
            return;
        }
        info!("termination signal received, initiating shutdown");
        shutdown.trigger();
    });

    let result = daemon.run().await;
    pid_file.remove();

    let cycles = result?;
    info!(cycles, "guardian daemon stopped");
    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};
    let mut sigterm = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = sigterm.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
