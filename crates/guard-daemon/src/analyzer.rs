use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use guard_core::config::AnalyzerConfig;
use guard_core::journal::Journal;
use guard_core::runner::{CommandRunner, CommandSpec};
use guard_core::snapshot::{AnalysisSnapshot, SnapshotStore};
use tracing::{debug, info, warn};

/// Outcome of one analyzer invocation.
///
/// Failures are values, not errors: the loop records them and moves on, so
/// an unreachable or broken analyzer can never take the daemon down.
#[derive(Debug)]
pub enum AnalysisOutcome {
    /// Exit code 0 — the snapshot was recorded and the latest pointer advanced.
    Recorded(AnalysisSnapshot),
    /// Non-zero exit, spawn failure, or a storage failure while recording.
    /// Nothing was written except the error log.
    Failed { detail: String },
}

/// Invokes the external analyzer and persists successful runs.
pub struct AnalyzerInvoker {
    spec: CommandSpec,
    runner: Arc<dyn CommandRunner>,
}

impl AnalyzerInvoker {
    pub fn new(config: &AnalyzerConfig, workdir: PathBuf, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            spec: CommandSpec {
                command: config.command.clone(),
                args: config.args.clone(),
                workdir: Some(workdir),
            },
            runner,
        }
    }

    /// Run the analyzer once.
    ///
    /// On exit code 0 the captured stdout becomes a new snapshot and the
    /// latest pointer is updated — exactly one history file plus the pointer
    /// copy. Otherwise one line is appended to the error log and the store
    /// is left untouched.
    pub async fn run_once(&self, store: &SnapshotStore, journal: &Journal) -> AnalysisOutcome {
        debug!(command = %self.spec.command, "analyzer starting");

        let output = match self.runner.run(&self.spec).await {
            Ok(output) => output,
            Err(e) => {
                let detail = format!("analyzer could not be spawned: {e}");
                warn!(error = %e, "analyzer spawn failed");
                journal.error_best_effort(&detail);
                return AnalysisOutcome::Failed { detail };
            }
        };

        if !output.success() {
            let code = output
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            let stderr = output.stderr_lossy();
            let detail = format!("analyzer exited with code {code}: {}", stderr.trim());
            warn!(exit_code = %code, "analyzer failed");
            journal.error_best_effort(&detail);
            return AnalysisOutcome::Failed { detail };
        }

        match store.record(&output.stdout, Utc::now()) {
            Ok(snapshot) => {
                info!(
                    snapshot_id = %snapshot.id,
                    bytes = snapshot.raw.len(),
                    "analysis recorded"
                );
                AnalysisOutcome::Recorded(snapshot)
            }
            Err(e) => {
                let detail = format!("failed to store analysis snapshot: {e}");
                warn!(error = %e, "snapshot write failed");
                journal.error_best_effort(&detail);
                AnalysisOutcome::Failed { detail }
            }
        }
    }
}
