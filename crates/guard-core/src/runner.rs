use std::path::PathBuf;

use async_trait::async_trait;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from running an external command.
///
/// A command that runs and exits non-zero is NOT an error here — callers get
/// the exit code in [`CommandOutput`] and decide what it means. Only failing
/// to run the command at all lands in this enum.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to spawn {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Command types
// ---------------------------------------------------------------------------

/// What to run: program, arguments, optional working directory.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    pub command: String,
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
}

/// Captured result of one external command run, stdout and stderr separate.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was killed by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Whether the command exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Captured stderr as a lossy string, for log lines.
    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

// ---------------------------------------------------------------------------
// CommandRunner
// ---------------------------------------------------------------------------

/// Capability seam for external command execution.
///
/// Production code goes through [`ProcessRunner`]; tests substitute
/// deterministic fakes so no real processes are spawned.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion, capturing stdout and stderr.
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunnerError>;
}

/// Real runner that spawns the command via `tokio::process`.
///
/// Children are spawned with `kill_on_drop`, so an aborted wait cannot leave
/// an orphaned process behind; in normal operation the daemon waits for
/// completion.
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunnerError> {
        let mut cmd = tokio::process::Command::new(&spec.command);
        cmd.args(&spec.args).kill_on_drop(true);
        if let Some(dir) = &spec.workdir {
            cmd.current_dir(dir);
        }
        let output = cmd.output().await.map_err(|source| RunnerError::Spawn {
            command: spec.command.clone(),
            source,
        })?;
        Ok(CommandOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
