use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use guard_core::config::Config;
use guard_core::journal::Journal;
use guard_core::runner::{CommandRunner, ProcessRunner};
use guard_core::snapshot::SnapshotStore;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::analyzer::{AnalysisOutcome, AnalyzerInvoker};
use crate::metrics::MetricsExtractor;
use crate::probe::HealthProbe;
use crate::shutdown::ShutdownSignal;

/// The guardian background daemon.
///
/// Drives strictly sequential cycles of analyze → store → extract-metrics →
/// probe → sleep at a fixed interval until the shutdown signal fires. The
/// analyzer and probe are potentially heavy external processes, so no two
/// cycles — and no two steps within a cycle — ever overlap.
///
/// In-flight external commands run to completion; cancellation is honored
/// between steps and interrupts the interval sleep immediately.
pub struct Daemon {
    interval: Duration,
    store: SnapshotStore,
    journal: Journal,
    analyzer: AnalyzerInvoker,
    metrics: MetricsExtractor,
    probe: HealthProbe,
    shutdown: ShutdownSignal,
    cycles: AtomicU64,
    running: AtomicBool,
}

impl Daemon {
    /// Build a daemon from config with the production process runner.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    /// Build a daemon with an injected command runner (used by tests).
    pub fn with_runner(config: &Config, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let state_dir = config.state_dir();
        let store = SnapshotStore::open(&state_dir, config.guardian.history_limit)
            .with_context(|| {
                format!("failed to create state directory {}", state_dir.display())
            })?;
        let journal = Journal::new(&state_dir);
        let analyzer = AnalyzerInvoker::new(
            &config.analyzer,
            config.analyzer_workdir(),
            Arc::clone(&runner),
        );
        let probe = HealthProbe::new(&config.probe, runner);
        Ok(Self {
            interval: Duration::from_secs(config.guardian.interval_secs),
            store,
            journal,
            analyzer,
            metrics: MetricsExtractor::new(),
            probe,
            shutdown: ShutdownSignal::new(),
            cycles: AtomicU64::new(0),
            running: AtomicBool::new(false),
        })
    }

    /// Handle for triggering shutdown from signal handlers or other tasks.
    pub fn shutdown_handle(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Number of cycles started so far.
    pub fn cycles_started(&self) -> u64 {
        self.cycles.load(Ordering::Relaxed)
    }

    /// Whether the run loop is currently active.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Read access to the snapshot store.
    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Run cycles until the shutdown signal fires.
    ///
    /// Returns the number of completed cycles. The interval is measured from
    /// cycle start: slow work shortens the following sleep, and a cycle that
    /// overruns the interval triggers the next one immediately with a logged
    /// warning — cycles are never skipped.
    pub async fn run(&self) -> Result<u64> {
        let mut shutdown_rx = self.shutdown.subscribe();
        self.running.store(true, Ordering::Relaxed);

        info!(
            pid = std::process::id(),
            interval_secs = self.interval.as_secs(),
            "guardian loop starting"
        );
        self.journal
            .event_best_effort(&format!("guardian loop started pid={}", std::process::id()));

        loop {
            // Completes no new work once the signal has fired, even when it
            // arrived while a cycle was mid-flight.
            if self.shutdown.is_shutting_down() {
                break;
            }

            let cycle = self.cycles.fetch_add(1, Ordering::Relaxed) + 1;
            let cycle_start = Instant::now();
            info!(cycle, "cycle starting");

            match self.analyzer.run_once(&self.store, &self.journal).await {
                AnalysisOutcome::Recorded(snapshot) => {
                    self.metrics.extract(&snapshot, &self.journal);
                }
                AnalysisOutcome::Failed { .. } => {
                    // Already journaled; the cycle carries on to the probe.
                }
            }

            self.probe.run_once(&self.journal).await;

            let deadline = cycle_start + self.interval;
            if Instant::now() >= deadline {
                warn!(
                    cycle,
                    interval_secs = self.interval.as_secs(),
                    "cycle exceeded the interval, starting next cycle immediately"
                );
                continue;
            }
            tokio::select! {
                _ = tokio::time::sleep_until(deadline) => {}
                _ = shutdown_rx.recv() => break,
            }
        }

        self.running.store(false, Ordering::Relaxed);
        let cycles = self.cycles.load(Ordering::Relaxed);
        info!(cycles, "guardian loop stopped");
        self.journal
            .event_best_effort(&format!("guardian loop stopped after {cycles} cycles"));
        Ok(cycles)
    }
}
