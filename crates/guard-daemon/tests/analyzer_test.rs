use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use guard_core::config::AnalyzerConfig;
use guard_core::journal::Journal;
use guard_core::runner::{CommandOutput, CommandRunner, CommandSpec, RunnerError};
use guard_core::snapshot::SnapshotStore;
use guard_daemon::analyzer::{AnalysisOutcome, AnalyzerInvoker};

// ===========================================================================
// Scripted runner
// ===========================================================================

enum Scripted {
    Exit(i32, &'static [u8], &'static [u8]),
    SpawnFailure,
}

/// Pops one canned response per call and records the specs it saw.
struct ScriptedRunner {
    responses: Mutex<Vec<Scripted>>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    fn new(responses: Vec<Scripted>) -> Self {
        Self {
            responses: Mutex::new(responses),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, RunnerError> {
        self.calls.lock().unwrap().push(spec.clone());
        match self.responses.lock().unwrap().remove(0) {
            Scripted::Exit(code, stdout, stderr) => Ok(CommandOutput {
                code: Some(code),
                stdout: stdout.to_vec(),
                stderr: stderr.to_vec(),
            }),
            Scripted::SpawnFailure => Err(RunnerError::Spawn {
                command: spec.command.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such command"),
            }),
        }
    }
}

// ===========================================================================
// Helpers
// ===========================================================================

fn analyzer_config() -> AnalyzerConfig {
    AnalyzerConfig {
        command: "fake-analyzer".to_string(),
        args: vec!["--format".to_string(), "json".to_string()],
        workdir: ".".to_string(),
    }
}

fn error_lines(journal: &Journal) -> Vec<String> {
    if !journal.error_path().exists() {
        return Vec::new();
    }
    std::fs::read_to_string(journal.error_path())
        .expect("read error log")
        .lines()
        .map(|l| l.to_string())
        .collect()
}

fn invoker(runner: std::sync::Arc<ScriptedRunner>) -> AnalyzerInvoker {
    AnalyzerInvoker::new(&analyzer_config(), PathBuf::from("/repo"), runner)
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn successful_run_records_snapshot_and_advances_latest() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SnapshotStore::open(dir.path(), 10).expect("open store");
    let journal = Journal::new(dir.path());

    let report = br#"{"health_score": 0.9, "issues": []}"#;
    let runner = std::sync::Arc::new(ScriptedRunner::new(vec![Scripted::Exit(0, report, b"")]));

    let outcome = invoker(runner).run_once(&store, &journal).await;

    match outcome {
        AnalysisOutcome::Recorded(snapshot) => {
            assert_eq!(snapshot.raw, report.to_vec());
            assert!(snapshot.path.exists());
        }
        AnalysisOutcome::Failed { detail } => panic!("expected success, got failure: {detail}"),
    }
    assert_eq!(store.latest().expect("latest"), Some(report.to_vec()));
    assert_eq!(store.len().expect("len"), 1);
    assert!(error_lines(&journal).is_empty(), "no error-log entry on success");
}

#[tokio::test]
async fn failed_run_leaves_history_and_latest_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SnapshotStore::open(dir.path(), 10).expect("open store");
    let journal = Journal::new(dir.path());

    // Seed one good snapshot so there is prior state to preserve.
    let seeded = br#"{"health_score": 0.8, "issues": []}"#;
    store.record(seeded, chrono::Utc::now()).expect("seed snapshot");

    let runner = std::sync::Arc::new(ScriptedRunner::new(vec![Scripted::Exit(
        1,
        b"",
        b"analysis blew up",
    )]));
    let outcome = invoker(runner).run_once(&store, &journal).await;

    assert!(matches!(outcome, AnalysisOutcome::Failed { .. }));
    assert_eq!(
        store.latest().expect("latest"),
        Some(seeded.to_vec()),
        "latest pointer must not advance on failure"
    );
    assert_eq!(store.len().expect("len"), 1, "no new history entry on failure");

    let errors = error_lines(&journal);
    assert_eq!(errors.len(), 1, "exactly one error-log line per failure");
    assert!(errors[0].contains("exited with code 1"));
    assert!(errors[0].contains("analysis blew up"));
}

#[tokio::test]
async fn spawn_failure_is_isolated_and_journaled() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SnapshotStore::open(dir.path(), 10).expect("open store");
    let journal = Journal::new(dir.path());

    let runner = std::sync::Arc::new(ScriptedRunner::new(vec![Scripted::SpawnFailure]));
    let outcome = invoker(runner).run_once(&store, &journal).await;

    assert!(matches!(outcome, AnalysisOutcome::Failed { .. }));
    assert!(store.latest().expect("latest").is_none());
    assert!(store.is_empty().expect("is_empty"));

    let errors = error_lines(&journal);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("could not be spawned"));
}

#[tokio::test]
async fn invoker_passes_command_args_and_workdir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SnapshotStore::open(dir.path(), 10).expect("open store");
    let journal = Journal::new(dir.path());

    let runner = std::sync::Arc::new(ScriptedRunner::new(vec![Scripted::Exit(
        0,
        br#"{"health_score": 1.0}"#,
        b"",
    )]));
    invoker(runner.clone()).run_once(&store, &journal).await;

    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].command, "fake-analyzer");
    assert_eq!(calls[0].args, vec!["--format", "json"]);
    assert_eq!(calls[0].workdir, Some(PathBuf::from("/repo")));
}

#[tokio::test]
async fn stderr_is_captured_separately_from_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SnapshotStore::open(dir.path(), 10).expect("open store");
    let journal = Journal::new(dir.path());

    // Noise on stderr does not contaminate the recorded snapshot.
    let report = br#"{"health_score": 0.7, "issues": []}"#;
    let runner = std::sync::Arc::new(ScriptedRunner::new(vec![Scripted::Exit(
        0,
        report,
        b"progress: scanning 42 files",
    )]));
    invoker(runner).run_once(&store, &journal).await;

    assert_eq!(store.latest().expect("latest"), Some(report.to_vec()));
}
