use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a snapshot could not be turned into metrics.
///
/// Both variants are recoverable at the call site: the raw snapshot stays
/// retained and the cycle logs a degraded-metrics warning instead of numbers.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// The output was not valid JSON, or required fields were missing.
    #[error("malformed analyzer output: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The JSON parsed but violated the report contract.
    #[error("analyzer contract violation: {0}")]
    Contract(String),
}

// ---------------------------------------------------------------------------
// Report schema
// ---------------------------------------------------------------------------

/// Severity of a single analyzer issue.
///
/// The analyzer contract is open-ended: severity strings this daemon does not
/// know about map to [`Severity::Unknown`] instead of failing the parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
    #[serde(other)]
    Unknown,
}

/// A single issue reported by the analyzer.
///
/// Only `severity` is part of the stable contract; the descriptive fields are
/// optional and any further fields the analyzer emits are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
}

/// Machine-readable analyzer output.
///
/// Versioned, tolerant contract: `health_score` is required and must lie in
/// [0, 1]; the issue list defaults to empty; unknown top-level fields are
/// ignored; an optional `schema_version` is accepted for forward evolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    #[serde(default)]
    pub schema_version: Option<String>,
    pub health_score: f64,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

impl AnalysisReport {
    /// Parse raw analyzer stdout into a report, enforcing the contract.
    pub fn parse(raw: &[u8]) -> Result<Self, ReportError> {
        let report: AnalysisReport = serde_json::from_slice(raw)?;
        if !(0.0..=1.0).contains(&report.health_score) {
            return Err(ReportError::Contract(format!(
                "health_score {} outside [0, 1]",
                report.health_score
            )));
        }
        Ok(report)
    }

    /// Derive the summary fields logged each cycle.
    pub fn summary(&self) -> MetricsSummary {
        let critical_issues = self
            .issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
            .count();
        MetricsSummary {
            health_score: self.health_score,
            total_issues: self.issues.len(),
            critical_issues,
        }
    }
}

// ---------------------------------------------------------------------------
// MetricsSummary
// ---------------------------------------------------------------------------

/// Summary health metrics derived from one report.
///
/// Invariant: `critical_issues <= total_issues`, since criticals are counted
/// out of the same issue list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub health_score: f64,
    pub total_issues: usize,
    pub critical_issues: usize,
}
