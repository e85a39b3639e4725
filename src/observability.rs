use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{info, warn};

/// Ledger and job-queue usage counters
#[derive(Debug, Default)]
pub struct LedgerMetrics {
    pub reads: AtomicU64,
    pub writes: AtomicU64,
    pub deletes: AtomicU64,
    pub version_conflicts: AtomicU64,
    pub cache_hits: AtomicU64,
    pub cache_misses: AtomicU64,
    pub jobs_completed: AtomicU64,
    pub jobs_failed: AtomicU64,
}

impl LedgerMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_read(&self) {
        self.reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delete(&self) {
        self.deletes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_conflict(&self, record_id: &str) {
        self.version_conflicts.fetch_add(1, Ordering::Relaxed);
        warn!(record_id = %record_id, "Ledger version conflict");
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_completed(&self) {
        self.jobs_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_job_failed(&self) {
        self.jobs_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get_stats(&self) -> LedgerStats {
        LedgerStats {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            version_conflicts: self.version_conflicts.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            jobs_completed: self.jobs_completed.load(Ordering::Relaxed),
            jobs_failed: self.jobs_failed.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            reads = stats.reads,
            writes = stats.writes,
            deletes = stats.deletes,
            conflicts = stats.version_conflicts,
            cache_hits = stats.cache_hits,
            cache_misses = stats.cache_misses,
            jobs_completed = stats.jobs_completed,
            jobs_failed = stats.jobs_failed,
            "Ledger metrics"
        );
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedgerStats {
    pub reads: u64,
    pub writes: u64,
    pub deletes: u64,
    pub version_conflicts: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub jobs_completed: u64,
    pub jobs_failed: u64,
}

/// Span carrying the correlation id of one registry operation
pub fn create_workflow_span(operation: &str, record_id: &str, correlation_id: &str) -> tracing::Span {
    tracing::info_span!(
        "workflow",
        workflow.operation = operation,
        record.id = record_id,
        correlation.id = correlation_id,
    )
}

/// Time an operation and log its duration when finished
pub struct OperationTimer {
    operation: String,
    start: Instant,
}

impl OperationTimer {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            start: Instant::now(),
        }
    }

    pub fn finish(self) {
        let duration = self.start.elapsed();
        info!(
            operation = %self.operation,
            duration_ms = duration.as_millis() as u64,
            "Operation completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let metrics = LedgerMetrics::new();
        metrics.record_read();
        metrics.record_read();
        metrics.record_conflict("asset1");
        metrics.record_cache_hit();

        let stats = metrics.get_stats();
        assert_eq!(stats.reads, 2);
        assert_eq!(stats.version_conflicts, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.writes, 0);
    }
}
