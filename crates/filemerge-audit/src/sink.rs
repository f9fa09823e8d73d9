//! Audit sink port and implementations
//!
//! The trail is write-only evidence: filemerge never queries it back, so
//! persistence is a flat append-only JSON-lines file rather than a
//! database. The port keeps the seam mockable in tests.

use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use filemerge_core::domain::audit::MergeAuditEntry;

/// Port trait for audit trail persistence
#[async_trait::async_trait]
pub trait IAuditSink: Send + Sync {
    /// Append one entry to the trail
    ///
    /// # Errors
    /// Returns an error if the entry cannot be serialized or written
    async fn append(&self, entry: &MergeAuditEntry) -> anyhow::Result<()>;
}

/// Append-only JSON-lines trail file
///
/// One JSON object per line. The file and its parent directories are
/// created on first append.
pub struct JsonlAuditSink {
    path: PathBuf,
}

impl JsonlAuditSink {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Path of the trail file
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait::async_trait]
impl IAuditSink for JsonlAuditSink {
    async fn append(&self, entry: &MergeAuditEntry) -> anyhow::Result<()> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        Ok(())
    }
}

/// Sink that discards every entry
///
/// Used when the trail is disabled in configuration and by tests that
/// don't care about auditing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAuditSink;

#[async_trait::async_trait]
impl IAuditSink for NullAuditSink {
    async fn append(&self, _entry: &MergeAuditEntry) -> anyhow::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filemerge_core::domain::audit::{AuditResult, MergeAction};
    use filemerge_core::domain::newtypes::RunId;

    #[tokio::test]
    async fn test_jsonl_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trail").join("audit.jsonl");
        let sink = JsonlAuditSink::new(path.clone());

        let run_id = RunId::new();
        for action in [MergeAction::RunStart, MergeAction::RunComplete] {
            let entry = MergeAuditEntry::new(run_id, action, AuditResult::success());
            sink.append(&entry).await.unwrap();
        }

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: MergeAuditEntry = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.action(), &MergeAction::RunStart);
        assert_eq!(first.run_id(), run_id);
    }

    #[tokio::test]
    async fn test_null_sink_accepts_everything() {
        let sink = NullAuditSink;
        let entry = MergeAuditEntry::new(
            RunId::new(),
            MergeAction::FileAccepted,
            AuditResult::success(),
        );
        sink.append(&entry).await.unwrap();
    }
}
