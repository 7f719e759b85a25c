//! Provider reliability tracking.
//!
//! The resolver reports every provider fetch through
//! [`PerformanceTracker::record`]; nothing in the resolver reads the
//! numbers back. [`PerformanceTracker::rankings`] is for presentation code
//! (the `rankings` CLI command, a UI, ...).
//!
//! Two implementations ship with the crate:
//!
//! - [`InMemoryTracker`]: process-local counters.
//! - [`JsonFileTracker`]: the same counters persisted to a JSON file so they
//!   survive across runs.
//!
//! Trackers are created by the caller and handed to the resolver as
//! `Arc<dyn PerformanceTracker>`; there is no global instance.

mod persist;

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use persist::JsonFileTracker;

/// Receives fetch outcomes and reports provider reliability.
pub trait PerformanceTracker: Send + Sync {
    /// Record one fetch attempt against `provider`.
    fn record(&self, provider: &str, success: bool, latency: Duration);

    /// Providers with at least one attempt, most reliable first.
    fn rankings(&self) -> Vec<ProviderRanking>;
}

/// Counters kept per provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderStats {
    pub success_count: u64,
    pub failure_count: u64,
    /// Running mean over every attempt, successful or not.
    pub avg_latency_ms: f64,
    pub last_used: Option<DateTime<Utc>>,
}

impl ProviderStats {
    pub fn attempts(&self) -> u64 {
        self.success_count + self.failure_count
    }

    /// Fold one attempt into the counters and the running mean.
    pub fn apply(&mut self, success: bool, latency: Duration, now: DateTime<Utc>) {
        if success {
            self.success_count += 1;
        } else {
            self.failure_count += 1;
        }

        let latency_ms = latency.as_secs_f64() * 1000.0;
        let n = self.attempts();
        self.avg_latency_ms = if n <= 1 {
            latency_ms
        } else {
            #[allow(clippy::cast_precision_loss)]
            let n = n as f64;
            (self.avg_latency_ms * (n - 1.0) + latency_ms) / n
        };
        self.last_used = Some(now);
    }

    /// Success percentage rounded to two decimals; `None` before any attempt.
    pub fn success_rate(&self) -> Option<f64> {
        let total = self.attempts();
        if total == 0 {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.success_count as f64 * 100.0 / total as f64;
        Some((rate * 100.0).round() / 100.0)
    }
}

/// One row of [`PerformanceTracker::rankings`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderRanking {
    pub provider: String,
    pub success_count: u64,
    pub failure_count: u64,
    pub avg_latency_ms: f64,
    /// Percent, 0.0..=100.0.
    pub success_rate: f64,
}

/// Build rankings: success rate descending, then mean latency ascending,
/// then provider name.
pub(crate) fn rank_stats(stats: &BTreeMap<String, ProviderStats>) -> Vec<ProviderRanking> {
    let mut rows: Vec<ProviderRanking> = stats
        .iter()
        .filter_map(|(name, s)| {
            s.success_rate().map(|success_rate| ProviderRanking {
                provider: name.clone(),
                success_count: s.success_count,
                failure_count: s.failure_count,
                avg_latency_ms: s.avg_latency_ms,
                success_rate,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        b.success_rate
            .total_cmp(&a.success_rate)
            .then(a.avg_latency_ms.total_cmp(&b.avg_latency_ms))
            .then_with(|| a.provider.cmp(&b.provider))
    });
    rows
}

/// Process-local tracker.
#[derive(Debug, Default)]
pub struct InMemoryTracker {
    stats: Mutex<BTreeMap<String, ProviderStats>>,
}

impl InMemoryTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of one provider's counters.
    pub fn stats(&self, provider: &str) -> Option<ProviderStats> {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(provider)
            .cloned()
    }
}

impl PerformanceTracker for InMemoryTracker {
    fn record(&self, provider: &str, success: bool, latency: Duration) {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(provider.to_string())
            .or_default()
            .apply(success, latency, Utc::now());
    }

    fn rankings(&self) -> Vec<ProviderRanking> {
        rank_stats(&self.stats.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
