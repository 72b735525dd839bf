use guard_core::journal::Journal;
use guard_core::report::{AnalysisReport, MetricsSummary};
use guard_core::snapshot::AnalysisSnapshot;
use tracing::{info, warn};

/// Extracts and logs summary health metrics from a recorded snapshot.
///
/// Pure read/log step: it mutates neither the store nor the snapshot.
pub struct MetricsExtractor;

impl MetricsExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Parse the snapshot's report and log its summary.
    ///
    /// A malformed report is recoverable: a degraded-metrics warning is
    /// emitted, `None` is returned, and the raw snapshot stays retained for
    /// later inspection.
    pub fn extract(
        &self,
        snapshot: &AnalysisSnapshot,
        journal: &Journal,
    ) -> Option<MetricsSummary> {
        let report = match AnalysisReport::parse(&snapshot.raw) {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    snapshot_id = %snapshot.id,
                    error = %e,
                    "degraded metrics: analyzer output did not match the report contract"
                );
                journal.event_best_effort(&format!(
                    "metrics degraded for snapshot {}: {e}",
                    snapshot.id
                ));
                return None;
            }
        };

        let summary = report.summary();
        info!(
            snapshot_id = %snapshot.id,
            health_score = summary.health_score,
            total_issues = summary.total_issues,
            critical_issues = summary.critical_issues,
            "analysis summary"
        );
        journal.event_best_effort(&format!(
            "health={:.2} issues={} critical={}",
            summary.health_score, summary.total_issues, summary.critical_issues
        ));

        if summary.critical_issues > 0 {
            warn!(
                critical_issues = summary.critical_issues,
                "analyzer reported critical issues"
            );
        }

        Some(summary)
    }
}

impl Default for MetricsExtractor {
    fn default() -> Self {
        Self::new()
    }
}
