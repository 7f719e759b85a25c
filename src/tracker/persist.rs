//! JSON-file-backed tracker.
//!
//! File layout (`provider_stats.json`):
//!
//! ```json
//! {"providers":{"Wixmp":{"success_count":3,"failure_count":1,"avg_latency_ms":412.5,"last_used":"..."}}}
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{rank_stats, PerformanceTracker, ProviderRanking, ProviderStats};

#[derive(Debug, Default, Serialize, Deserialize)]
struct StatsFile {
    #[serde(default)]
    providers: BTreeMap<String, ProviderStats>,
}

/// In-memory counters plus the number of updates applied so far.
#[derive(Debug, Default)]
struct Live {
    stats: StatsFile,
    seq: u64,
}

/// Tracker that rewrites its JSON file after every recorded attempt.
///
/// Counters are updated and serialized under `state`; the file write
/// happens under `written` only, which holds the sequence number of the
/// snapshot on disk. A snapshot older than that is never written.
///
/// I/O failures are logged and otherwise ignored: a tracker must never make
/// a resolve call fail.
#[derive(Debug)]
pub struct JsonFileTracker {
    path: PathBuf,
    state: Mutex<Live>,
    written: Mutex<u64>,
}

impl JsonFileTracker {
    /// Default location: `<data_dir>/anilink/provider_stats.json`.
    pub fn default_path() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("anilink")
            .join("provider_stats.json")
    }

    /// Open (or start) the stats file at `path`.
    ///
    /// A missing file starts empty. So does an unreadable or corrupt one,
    /// with a warning; it is overwritten on the next record.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stats = match load(&path) {
            Ok(Some(state)) => state,
            Ok(None) => StatsFile::default(),
            Err(e) => {
                warn!(path = %path.display(), "discarding provider stats: {e:#}");
                StatsFile::default()
            }
        };
        Self {
            path,
            state: Mutex::new(Live { stats, seq: 0 }),
            written: Mutex::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PerformanceTracker for JsonFileTracker {
    fn record(&self, provider: &str, success: bool, latency: Duration) {
        let (seq, snapshot) = {
            let mut live = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            live.stats
                .providers
                .entry(provider.to_string())
                .or_default()
                .apply(success, latency, Utc::now());
            live.seq += 1;
            (live.seq, serde_json::to_string_pretty(&live.stats))
        };

        let snapshot = match snapshot {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize provider stats: {e}");
                return;
            }
        };

        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        if seq <= *written {
            debug!(seq, "newer provider stats already saved");
            return;
        }
        match save(&self.path, &snapshot) {
            Ok(()) => {
                *written = seq;
                debug!(provider, seq, "provider stats saved");
            }
            Err(e) => warn!(path = %self.path.display(), "failed to save provider stats: {e:#}"),
        }
    }

    fn rankings(&self) -> Vec<ProviderRanking> {
        rank_stats(&self.state.lock().unwrap_or_else(PoisonError::into_inner).stats.providers)
    }
}

fn load(path: &Path) -> Result<Option<StatsFile>> {
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read {}", path.display())),
    };
    let state = serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(state))
}

fn save(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("provider_stats.json");

        let tracker = JsonFileTracker::open(&path);
        tracker.record("SharePoint", true, Duration::from_millis(120));
        tracker.record("SharePoint", false, Duration::from_millis(80));
        assert!(path.exists());

        let reopened = JsonFileTracker::open(&path);
        let rankings = reopened.rankings();
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].provider, "SharePoint");
        assert_eq!(rankings[0].success_count, 1);
        assert_eq!(rankings[0].failure_count, 1);
        assert!((rankings[0].avg_latency_ms - 100.0).abs() < 1e-9);
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider_stats.json");
        std::fs::write(&path, "{ not json").unwrap();

        let tracker = JsonFileTracker::open(&path);
        assert!(tracker.rankings().is_empty());

        tracker.record("HiAnime", true, Duration::from_millis(10));
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"HiAnime\""));
    }

    #[test]
    fn missing_file_is_not_created_until_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider_stats.json");
        let tracker = JsonFileTracker::open(&path);
        assert!(!path.exists());
        assert_eq!(tracker.path(), path.as_path());
    }

    #[test]
    fn concurrent_records_leave_latest_snapshot_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("provider_stats.json");
        let tracker = JsonFileTracker::open(&path);

        std::thread::scope(|scope| {
            for i in 0..8 {
                let tracker = &tracker;
                scope.spawn(move || {
                    for _ in 0..25 {
                        tracker.record("Wixmp", i % 2 == 0, Duration::from_millis(50));
                    }
                });
            }
        });

        let reopened = JsonFileTracker::open(&path);
        let rankings = reopened.rankings();
        assert_eq!(rankings[0].success_count, 100);
        assert_eq!(rankings[0].failure_count, 100);
        assert!((rankings[0].success_rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rankings_readable_while_file_is_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be makes every write fail.
        let path = dir.path().join("provider_stats.json");
        std::fs::create_dir(&path).unwrap();

        let tracker = JsonFileTracker::open(&path);
        tracker.record("YouTube", true, Duration::from_millis(5));
        tracker.record("YouTube", false, Duration::from_millis(15));

        let rankings = tracker.rankings();
        assert_eq!(rankings[0].success_count, 1);
        assert_eq!(rankings[0].failure_count, 1);
    }

    #[test]
    fn default_path_ends_with_file_name() {
        assert!(JsonFileTracker::default_path().ends_with("anilink/provider_stats.json"));
    }
}
