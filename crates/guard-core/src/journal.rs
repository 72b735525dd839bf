use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use tracing::warn;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Journal
// ---------------------------------------------------------------------------

/// Line-oriented, append-only journals inside the state directory.
///
/// The daemon runs detached, so `guardian.log` and `error.log` are the
/// user-visible record alongside `tracing` output. Every line carries an
/// RFC 3339 UTC timestamp. Call sites inside the loop use the best-effort
/// variants: an impaired journal must never stop a cycle.
pub struct Journal {
    log_path: PathBuf,
    error_path: PathBuf,
}

impl Journal {
    /// File name of the main journal within the state directory.
    pub const LOG_FILE: &'static str = "guardian.log";
    /// File name of the analyzer-failure journal.
    pub const ERROR_FILE: &'static str = "error.log";

    pub fn new(state_dir: &Path) -> Self {
        Self {
            log_path: state_dir.join(Self::LOG_FILE),
            error_path: state_dir.join(Self::ERROR_FILE),
        }
    }

    /// Append one timestamped line to `guardian.log`.
    pub fn event(&self, message: &str) -> Result<(), JournalError> {
        append_line(&self.log_path, message)
    }

    /// Append one timestamped line to `error.log`.
    pub fn error(&self, message: &str) -> Result<(), JournalError> {
        append_line(&self.error_path, message)
    }

    /// Best-effort [`Journal::event`]: a failing write is reported through
    /// `tracing` and otherwise dropped.
    pub fn event_best_effort(&self, message: &str) {
        if let Err(e) = self.event(message) {
            warn!(error = %e, "journal write failed");
        }
    }

    /// Best-effort [`Journal::error`].
    pub fn error_best_effort(&self, message: &str) {
        if let Err(e) = self.error(message) {
            warn!(error = %e, "error-journal write failed");
        }
    }

    /// Path of `guardian.log`.
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Path of `error.log`.
    pub fn error_path(&self) -> &Path {
        &self.error_path
    }
}

fn append_line(path: &Path, message: &str) -> Result<(), JournalError> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    writeln!(file, "{stamp} {message}")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// PidFile
// ---------------------------------------------------------------------------

/// `guardian.pid` handling.
///
/// Written at startup so external tooling can locate the daemon for
/// kill-based deactivation; removed again on graceful shutdown.
pub struct PidFile {
    path: PathBuf,
}

impl PidFile {
    /// File name of the pid file within the state directory.
    pub const FILE: &'static str = "guardian.pid";

    /// Write the current process id under `state_dir`.
    pub fn write(state_dir: &Path) -> Result<Self, JournalError> {
        let path = state_dir.join(Self::FILE);
        std::fs::write(&path, format!("{}\n", std::process::id()))?;
        Ok(Self { path })
    }

    /// Remove the pid file. A missing file is not an error.
    pub fn remove(self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(error = %e, "failed to remove pid file");
            }
        }
    }

    /// Path of the pid file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
