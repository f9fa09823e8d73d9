//! AuditLogger - high-level decision trail service
//!
//! Wraps an [`IAuditSink`] with convenience methods for each type of
//! auditable merge event. All methods are non-fatal: errors in trail
//! persistence are logged via `tracing::warn!` but never propagated, so
//! the trail can never break a merge.

use std::sync::Arc;

use serde_json::json;

use filemerge_core::domain::{
    audit::{AuditResult, MergeAction, MergeAuditEntry},
    newtypes::{ContentDigest, DatasetName, FileName, RunId},
};

use crate::sink::{IAuditSink, NullAuditSink};

/// High-level audit logger that wraps trail persistence.
///
/// All methods silently swallow errors (logging a warning) to ensure
/// audit failures never break merge operations.
pub struct AuditLogger {
    sink: Arc<dyn IAuditSink>,
    run_id: RunId,
}

impl AuditLogger {
    /// Creates a new `AuditLogger` backed by the given sink.
    pub fn new(sink: Arc<dyn IAuditSink>, run_id: RunId) -> Self {
        Self { sink, run_id }
    }

    /// Creates a logger that records nothing (trail disabled).
    #[must_use]
    pub fn disabled(run_id: RunId) -> Self {
        Self {
            sink: Arc::new(NullAuditSink),
            run_id,
        }
    }

    /// The run this logger stamps onto every entry.
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// Persist an entry, swallowing errors with a tracing warning.
    async fn save(&self, entry: &MergeAuditEntry) {
        if let Err(e) = self.sink.append(entry).await {
            tracing::warn!(error = %e, "Failed to append audit entry");
        }
    }

    // ========================================================================
    // Run lifecycle
    // ========================================================================

    /// Log the start of a merge run.
    pub async fn log_run_start(&self, datasets: &[DatasetName], seeded_files: usize) {
        let entry = MergeAuditEntry::new(self.run_id, MergeAction::RunStart, AuditResult::success())
            .with_details(json!({
                "datasets": datasets.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                "seeded_files": seeded_files,
            }));
        self.save(&entry).await;
    }

    /// Log the completion of a merge run.
    #[allow(clippy::too_many_arguments)]
    pub async fn log_run_complete(
        &self,
        duration_ms: u64,
        accepted_new: u32,
        duplicate_noop: u32,
        conflict_retained: u32,
        conflict_superseded: u32,
        variants_rejected: u32,
        errors: usize,
    ) {
        let entry =
            MergeAuditEntry::new(self.run_id, MergeAction::RunComplete, AuditResult::success())
                .with_details(json!({
                    "duration_ms": duration_ms,
                    "accepted_new": accepted_new,
                    "duplicate_noop": duplicate_noop,
                    "conflict_retained": conflict_retained,
                    "conflict_superseded": conflict_superseded,
                    "variants_rejected": variants_rejected,
                    "errors": errors,
                }));
        self.save(&entry).await;
    }

    /// Log the start of one dataset's processing.
    pub async fn log_dataset_start(&self, dataset: &DatasetName, file_count: usize) {
        let entry =
            MergeAuditEntry::new(self.run_id, MergeAction::DatasetStart, AuditResult::success())
                .with_details(json!({
                    "dataset": dataset.as_str(),
                    "file_count": file_count,
                }));
        self.save(&entry).await;
    }

    // ========================================================================
    // Per-file decisions
    // ========================================================================

    /// Log acceptance of a newly seen filename.
    pub async fn log_file_accepted(&self, filename: &FileName, digest: &ContentDigest) {
        let entry =
            MergeAuditEntry::new(self.run_id, MergeAction::FileAccepted, AuditResult::success())
                .with_details(json!({
                    "filename": filename.as_str(),
                    "digest": digest.as_str(),
                }));
        self.save(&entry).await;
    }

    /// Log an observation that exactly matched the accepted content.
    pub async fn log_duplicate_skipped(&self, filename: &FileName, digest: &ContentDigest) {
        let entry = MergeAuditEntry::new(
            self.run_id,
            MergeAction::DuplicateSkipped,
            AuditResult::success(),
        )
        .with_details(json!({
            "filename": filename.as_str(),
            "digest": digest.as_str(),
        }));
        self.save(&entry).await;
    }

    /// Log a conflict in which the incumbent kept its acceptance.
    pub async fn log_conflict_retained(
        &self,
        filename: &FileName,
        candidate: &ContentDigest,
        incumbent: &ContentDigest,
        candidate_votes: u32,
        incumbent_votes: u32,
    ) {
        let entry = MergeAuditEntry::new(
            self.run_id,
            MergeAction::ConflictRetained,
            AuditResult::success(),
        )
        .with_details(json!({
            "filename": filename.as_str(),
            "candidate": candidate.as_str(),
            "incumbent": incumbent.as_str(),
            "candidate_votes": candidate_votes,
            "incumbent_votes": incumbent_votes,
        }));
        self.save(&entry).await;
    }

    /// Log a conflict in which the candidate superseded the incumbent.
    pub async fn log_conflict_superseded(
        &self,
        filename: &FileName,
        new_accepted: &ContentDigest,
        old_accepted: &ContentDigest,
        candidate_votes: u32,
        incumbent_votes: u32,
    ) {
        let entry = MergeAuditEntry::new(
            self.run_id,
            MergeAction::ConflictSuperseded,
            AuditResult::success(),
        )
        .with_details(json!({
            "filename": filename.as_str(),
            "new_accepted": new_accepted.as_str(),
            "old_accepted": old_accepted.as_str(),
            "candidate_votes": candidate_votes,
            "incumbent_votes": incumbent_votes,
        }));
        self.save(&entry).await;
    }

    /// Log preservation of a losing variant in the reject area.
    pub async fn log_variant_rejected(&self, filename: &FileName, digest: &ContentDigest) {
        let entry = MergeAuditEntry::new(
            self.run_id,
            MergeAction::VariantRejected,
            AuditResult::success(),
        )
        .with_details(json!({
            "filename": filename.as_str(),
            "digest": digest.as_str(),
        }));
        self.save(&entry).await;
    }

    /// Log a per-file failure (read or copy).
    pub async fn log_file_error(&self, path: &str, code: &str, message: &str) {
        let entry = MergeAuditEntry::new(
            self.run_id,
            MergeAction::FileError,
            AuditResult::failed(code, message),
        )
        .with_details(json!({
            "path": path,
        }));
        self.save(&entry).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    /// In-memory mock sink that records appended entries
    struct MockSink {
        entries: Mutex<Vec<MergeAuditEntry>>,
        fail: bool,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                entries: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn entries(&self) -> Vec<MergeAuditEntry> {
            self.entries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IAuditSink for MockSink {
        async fn append(&self, entry: &MergeAuditEntry) -> anyhow::Result<()> {
            if self.fail {
                anyhow::bail!("sink unavailable");
            }
            self.entries.lock().unwrap().push(entry.clone());
            Ok(())
        }
    }

    fn filename() -> FileName {
        FileName::new("a.txt".to_string()).unwrap()
    }

    fn digest(seed: u8) -> ContentDigest {
        ContentDigest::new(format!("{:02x}", seed).repeat(32)).unwrap()
    }

    #[tokio::test]
    async fn test_decisions_are_recorded_with_run_id() {
        let sink = Arc::new(MockSink::new());
        let run_id = RunId::new();
        let logger = AuditLogger::new(Arc::clone(&sink) as Arc<dyn IAuditSink>, run_id);

        logger.log_file_accepted(&filename(), &digest(1)).await;
        logger
            .log_conflict_retained(&filename(), &digest(2), &digest(1), 1, 1)
            .await;
        logger.log_variant_rejected(&filename(), &digest(2)).await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.run_id() == run_id));
        assert_eq!(entries[0].action(), &MergeAction::FileAccepted);
        assert_eq!(entries[1].action(), &MergeAction::ConflictRetained);
        assert_eq!(entries[1].details()["candidate_votes"], 1);
        assert_eq!(entries[2].action(), &MergeAction::VariantRejected);
    }

    #[tokio::test]
    async fn test_file_error_carries_code_and_message() {
        let sink = Arc::new(MockSink::new());
        let logger = AuditLogger::new(Arc::clone(&sink) as Arc<dyn IAuditSink>, RunId::new());

        logger
            .log_file_error("/in/ds1/bad.bin", "READ_FAILURE", "unexpected EOF")
            .await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert!(!entries[0].result().is_success());
        assert_eq!(entries[0].details()["path"], "/in/ds1/bad.bin");
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed() {
        let sink = Arc::new(MockSink::failing());
        let logger = AuditLogger::new(Arc::clone(&sink) as Arc<dyn IAuditSink>, RunId::new());

        // Must not panic or propagate.
        logger.log_duplicate_skipped(&filename(), &digest(1)).await;
        assert!(sink.entries().is_empty());
    }
}
