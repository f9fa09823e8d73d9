//! Dataset processor
//!
//! Drives one dataset's files through the merge pipeline, strictly one at
//! a time: compute the digest, resolve against the ledger, execute the
//! returned directives, and only then advance to the next file. The
//! sequential drive guarantees that repeated sightings of a filename -
//! including repeats within a single dataset - reach the ledger in a
//! stable order.
//!
//! ## Error isolation
//!
//! A file that cannot be read or whose copies fail is abandoned, logged,
//! recorded in the run report, and does not stop the dataset. Only an
//! unlistable dataset directory aborts the run; without the full file set
//! the merge cannot proceed.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use filemerge_audit::AuditLogger;
use filemerge_core::{
    domain::{
        decision::{CopyDirective, MergeOutcome},
        ledger::MergeLedger,
        newtypes::{DatasetName, FileName},
    },
    ports::file_store::IFileStore,
};
use filemerge_resolve::{ConflictResolver, DirectiveExecutor, ResolveError};

use crate::engine::MergeReport;
use crate::MergeError;

/// Processes the files of one dataset sequentially
pub struct DatasetProcessor {
    store: Arc<dyn IFileStore>,
    resolver: ConflictResolver,
    executor: DirectiveExecutor,
}

impl DatasetProcessor {
    pub fn new(store: Arc<dyn IFileStore>, executor: DirectiveExecutor) -> Self {
        Self {
            store,
            resolver: ConflictResolver::new(),
            executor,
        }
    }

    /// Process every file in `dataset_dir`, mutating the ledger and report
    ///
    /// # Errors
    /// Returns [`MergeError::Enumeration`] if the dataset directory cannot
    /// be listed; per-file failures are collected in the report instead.
    pub async fn process_dataset(
        &self,
        ledger: &mut MergeLedger,
        dataset: &DatasetName,
        dataset_dir: &Path,
        audit: &AuditLogger,
        report: &mut MergeReport,
    ) -> Result<(), MergeError> {
        let files = self
            .store
            .list_files(dataset_dir)
            .await
            .map_err(|e| MergeError::Enumeration {
                dir: dataset_dir.to_path_buf(),
                source: e,
            })?;

        info!(dataset = %dataset, files = files.len(), "Starting dataset");
        audit.log_dataset_start(dataset, files.len()).await;

        for path in files {
            self.process_file(ledger, &path, audit, report).await?;
        }

        Ok(())
    }

    /// Digest, resolve, and execute directives for a single file
    async fn process_file(
        &self,
        ledger: &mut MergeLedger,
        path: &Path,
        audit: &AuditLogger,
        report: &mut MergeReport,
    ) -> Result<(), MergeError> {
        let path_str = path.display().to_string();

        let filename = match path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|n| FileName::new(n.to_string()))
        {
            Some(Ok(name)) => name,
            _ => {
                warn!(path = %path_str, "skipping file with unusable name");
                report.record_error(&path_str, "invalid file name");
                audit
                    .log_file_error(&path_str, "INVALID_NAME", "invalid file name")
                    .await;
                return Ok(());
            }
        };

        let digest = match self.store.compute_digest(path).await {
            Ok(digest) => digest,
            Err(e) => {
                warn!(path = %path_str, error = %e, "skipping unreadable file");
                report.record_error(&path_str, &format!("read failure: {e:#}"));
                audit
                    .log_file_error(&path_str, "READ_FAILURE", &format!("{e:#}"))
                    .await;
                return Ok(());
            }
        };

        // Captured before resolution flips acceptance, for the audit trail.
        let incumbent_before = ledger.accepted(&filename).cloned();

        let resolution = self.resolver.resolve(ledger, &filename, &digest, path)?;

        if let Err(e) = self.executor.execute(&resolution.directives).await {
            let code = match &e {
                ResolveError::RejectCollision { .. } => "REJECT_COLLISION",
                _ => "COPY_FAILURE",
            };
            warn!(path = %path_str, error = %e, "abandoning file after copy failure");
            report.record_error(&path_str, &e.to_string());
            audit.log_file_error(&path_str, code, &e.to_string()).await;
            return Ok(());
        }

        report.record_outcome(resolution.outcome);
        for directive in &resolution.directives {
            match directive {
                CopyDirective::RejectCandidate { digest, .. }
                | CopyDirective::RejectIncumbent { digest, .. } => {
                    report.variants_rejected += 1;
                    audit.log_variant_rejected(&filename, digest).await;
                }
                CopyDirective::InstallOutput { .. } => {}
            }
        }

        match resolution.outcome {
            MergeOutcome::AcceptedNew => {
                audit.log_file_accepted(&filename, &digest).await;
            }
            MergeOutcome::DuplicateNoop => {
                audit.log_duplicate_skipped(&filename, &digest).await;
            }
            // Conflict outcomes always have an incumbent.
            MergeOutcome::ConflictRetained => {
                if let Some(incumbent) = incumbent_before {
                    audit
                        .log_conflict_retained(
                            &filename,
                            &digest,
                            &incumbent,
                            ledger.observation_count(&filename, &digest),
                            ledger.observation_count(&filename, &incumbent),
                        )
                        .await;
                }
            }
            MergeOutcome::ConflictSuperseded => {
                if let Some(old) = incumbent_before {
                    audit
                        .log_conflict_superseded(
                            &filename,
                            &digest,
                            &old,
                            ledger.observation_count(&filename, &digest),
                            ledger.observation_count(&filename, &old),
                        )
                        .await;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use filemerge_core::domain::newtypes::{ContentDigest, RunId};

    fn digest(seed: u8) -> ContentDigest {
        ContentDigest::new(format!("{:02x}", seed).repeat(32)).unwrap()
    }

    /// Store whose digests come from a fixed table; unknown paths fail.
    struct ScriptedStore {
        digests: Mutex<HashMap<PathBuf, ContentDigest>>,
        listing: Vec<PathBuf>,
    }

    impl ScriptedStore {
        fn new(listing: Vec<(&str, Option<ContentDigest>)>) -> Self {
            let mut digests = HashMap::new();
            let mut paths = Vec::new();
            for (path, digest) in listing {
                let path = PathBuf::from(path);
                if let Some(d) = digest {
                    digests.insert(path.clone(), d);
                }
                paths.push(path);
            }
            Self {
                digests: Mutex::new(digests),
                listing: paths,
            }
        }
    }

    #[async_trait]
    impl IFileStore for ScriptedStore {
        async fn list_subdirs(&self, _dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
            Ok(vec![])
        }

        async fn list_files(&self, _dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
            Ok(self.listing.clone())
        }

        async fn compute_digest(&self, path: &Path) -> anyhow::Result<ContentDigest> {
            self.digests
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unreadable: {}", path.display()))
        }

        async fn copy_file(&self, source: &Path, target: &Path) -> anyhow::Result<u64> {
            let mut digests = self.digests.lock().unwrap();
            let digest = digests
                .get(source)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("unreadable: {}", source.display()))?;
            digests.insert(target.to_path_buf(), digest);
            Ok(1)
        }

        async fn exists(&self, path: &Path) -> anyhow::Result<bool> {
            Ok(self.digests.lock().unwrap().contains_key(path))
        }

        async fn create_dir_all(&self, _dir: &Path) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn processor(store: Arc<ScriptedStore>) -> DatasetProcessor {
        let executor = DirectiveExecutor::new(
            Arc::clone(&store) as Arc<dyn IFileStore>,
            PathBuf::from("/out"),
            PathBuf::from("/reject"),
        );
        DatasetProcessor::new(store, executor)
    }

    #[tokio::test]
    async fn test_unreadable_file_is_isolated() {
        let store = Arc::new(ScriptedStore::new(vec![
            ("/in/ds1/bad.txt", None),
            ("/in/ds1/good.txt", Some(digest(1))),
        ]));
        let mut ledger = MergeLedger::new();
        let mut report = MergeReport::default();
        let audit = AuditLogger::disabled(RunId::new());
        let dataset = DatasetName::new("ds1".to_string()).unwrap();

        processor(Arc::clone(&store))
            .process_dataset(&mut ledger, &dataset, Path::new("/in/ds1"), &audit, &mut report)
            .await
            .unwrap();

        // The bad file is reported; the good file still lands.
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("bad.txt"));
        assert_eq!(report.accepted_new, 1);
        let good = FileName::new("good.txt".to_string()).unwrap();
        assert_eq!(ledger.accepted(&good), Some(&digest(1)));
    }

    #[tokio::test]
    async fn test_repeated_filename_within_one_dataset() {
        // The same filename can surface more than once in one dataset's
        // listing; observations land sequentially, in listing order.
        let store = Arc::new(ScriptedStore::new(vec![
            ("/in/ds1/sub_a/a.txt", Some(digest(1))),
            ("/in/ds1/sub_b/a.txt", Some(digest(2))),
        ]));
        let mut ledger = MergeLedger::new();
        let mut report = MergeReport::default();
        let audit = AuditLogger::disabled(RunId::new());
        let dataset = DatasetName::new("ds1".to_string()).unwrap();

        processor(Arc::clone(&store))
            .process_dataset(&mut ledger, &dataset, Path::new("/in/ds1"), &audit, &mut report)
            .await
            .unwrap();

        let name = FileName::new("a.txt".to_string()).unwrap();
        assert_eq!(report.accepted_new, 1);
        assert_eq!(report.conflict_retained, 1);
        assert_eq!(ledger.accepted(&name), Some(&digest(1)));
    }
}

