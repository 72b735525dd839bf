use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from snapshot persistence.
///
/// Pruning is deliberately not represented here: deletion failures are logged
/// and tolerated, so the store drifts rather than fails.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// AnalysisSnapshot
// ---------------------------------------------------------------------------

/// Filename timestamp format, zero-padded UTC down to milliseconds so that
/// lexicographic file-name order equals creation order.
const ID_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

/// One persisted analyzer run. Immutable once recorded; removed only by
/// retention pruning.
#[derive(Debug, Clone)]
pub struct AnalysisSnapshot {
    /// Timestamp-derived identifier (also the history file stem).
    pub id: String,
    /// Location of the history file.
    pub path: PathBuf,
    /// Wall-clock creation time.
    pub created_at: DateTime<Utc>,
    /// The raw analyzer output exactly as captured.
    pub raw: Vec<u8>,
}

// ---------------------------------------------------------------------------
// SnapshotStore
// ---------------------------------------------------------------------------

/// File-backed snapshot history with bounded retention.
///
/// Layout under the state directory:
/// - `history/<id>.json` — one file per successful analyzer run
/// - `latest_analysis.json` — byte copy of the most recent snapshot
///
/// The store assumes a single writing daemon process. Concurrent external
/// readers are tolerated (files are written whole and never rewritten); a
/// second daemon instance would race on the pointer file — a known
/// limitation, not defended against.
pub struct SnapshotStore {
    history_dir: PathBuf,
    latest_path: PathBuf,
    retain: usize,
}

impl SnapshotStore {
    /// File name of the latest-snapshot pointer within the state directory.
    pub const LATEST_FILE: &'static str = "latest_analysis.json";
    /// Name of the history subdirectory.
    pub const HISTORY_DIR: &'static str = "history";

    /// Open a store rooted at `state_dir`, retaining at most `retain`
    /// snapshots. Creates the history directory if needed.
    pub fn open(state_dir: &Path, retain: usize) -> Result<Self> {
        let history_dir = state_dir.join(Self::HISTORY_DIR);
        std::fs::create_dir_all(&history_dir)?;
        Ok(Self {
            history_dir,
            latest_path: state_dir.join(Self::LATEST_FILE),
            retain,
        })
    }

    /// Record a successful analyzer run.
    ///
    /// Writes the history file, mirrors the bytes to the latest pointer, then
    /// prunes the oldest entries past the retention bound. Prune failures are
    /// logged and tolerated.
    pub fn record(&self, raw: &[u8], created_at: DateTime<Utc>) -> Result<AnalysisSnapshot> {
        let (id, path, created_at) = self.unique_path(created_at);
        std::fs::write(&path, raw)?;
        std::fs::write(&self.latest_path, raw)?;
        debug!(snapshot_id = %id, "snapshot recorded");
        self.prune();
        Ok(AnalysisSnapshot {
            id,
            path,
            created_at,
            raw: raw.to_vec(),
        })
    }

    /// Raw bytes of the most recent successful snapshot, or `None` before
    /// the first successful run.
    pub fn latest(&self) -> Result<Option<Vec<u8>>> {
        if !self.latest_path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(&self.latest_path)?))
    }

    /// History file paths in chronological (oldest-first) order.
    pub fn list(&self) -> Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.history_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                entries.push(path);
            }
        }
        // Timestamp-named files: file-name order is creation order.
        entries.sort();
        Ok(entries)
    }

    /// Number of snapshots currently retained.
    pub fn len(&self) -> Result<usize> {
        self.list().map(|entries| entries.len())
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> Result<bool> {
        self.len().map(|n| n == 0)
    }

    /// Path of the latest pointer file.
    pub fn latest_path(&self) -> &Path {
        &self.latest_path
    }

    /// Two runs within the same millisecond would collide on the timestamp
    /// id; bump the stamp forward until the name is free, so files stay
    /// uniformly named and file-name order stays creation order.
    fn unique_path(&self, created_at: DateTime<Utc>) -> (String, PathBuf, DateTime<Utc>) {
        let mut stamp = created_at;
        loop {
            let id = stamp.format(ID_FORMAT).to_string();
            let path = self.history_dir.join(format!("{id}.json"));
            if !path.exists() {
                return (id, path, stamp);
            }
            stamp += chrono::Duration::milliseconds(1);
        }
    }

    /// Delete the oldest entries until at most `retain` remain. Failures are
    /// logged and otherwise ignored; retention drift is acceptable.
    fn prune(&self) {
        let entries = match self.list() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "failed to enumerate history for pruning");
                return;
            }
        };
        if entries.len() <= self.retain {
            return;
        }
        let excess = entries.len() - self.retain;
        for path in entries.iter().take(excess) {
            match std::fs::remove_file(path) {
                Ok(()) => debug!(path = %path.display(), "pruned snapshot"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to prune snapshot")
                }
            }
        }
    }
}
