use std::sync::Arc;

use chrono::{DateTime, Utc};
use guard_core::config::ProbeConfig;
use guard_core::journal::Journal;
use guard_core::runner::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Result of one compliance probe run. Logged each cycle, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceRecord {
    pub compliant: bool,
    pub timestamp: DateTime<Utc>,
}

/// Runs the external verification command and reports compliance.
///
/// Exit-code-only contract: 0 is compliant; any non-zero exit — or failing
/// to spawn the command at all — is non-compliant. Non-compliance is a
/// warning and never interrupts the loop.
pub struct HealthProbe {
    spec: CommandSpec,
    runner: Arc<dyn CommandRunner>,
}

impl HealthProbe {
    pub fn new(config: &ProbeConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            spec: CommandSpec {
                command: config.command.clone(),
                args: config.args.clone(),
                workdir: None,
            },
            runner,
        }
    }

    /// Run the probe once and log exactly one compliance record.
    pub async fn run_once(&self, journal: &Journal) -> ComplianceRecord {
        debug!(command = %self.spec.command, "health probe starting");

        let compliant = match self.runner.run(&self.spec).await {
            Ok(output) => {
                if !output.success() {
                    warn!(exit_code = ?output.code, "health probe non-compliant");
                }
                output.success()
            }
            Err(e) => {
                warn!(error = %e, "health probe could not be spawned");
                false
            }
        };

        let record = ComplianceRecord {
            compliant,
            timestamp: Utc::now(),
        };
        if record.compliant {
            info!("compliance check passed");
            journal.event_best_effort("compliance=pass");
        } else {
            journal.event_best_effort("compliance=fail");
        }
        record
    }
}
