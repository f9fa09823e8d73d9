//! Merge engine
//!
//! The [`MergeEngine`] orchestrates a full merge run:
//!
//! 1. **Seed**: digest every pre-existing output file and register it in
//!    the ledger as the incumbent for its filename
//! 2. **Enumerate**: list the dataset subdirectories of the input root
//! 3. **Process**: drive datasets through the [`DatasetProcessor`] one at
//!    a time, in ascending lexicographic order of dataset name
//! 4. **Report**: summarize outcomes, rejects, errors, and duration
//!
//! ## Processing order
//!
//! Datasets run in ascending lexicographic order of directory name. The
//! order is observable: the first dataset to contribute a brand-new
//! filename becomes its incumbent, and the incumbent wins conflict ties.
//! Callers relying on a particular winner should name datasets
//! accordingly.
//!
//! ## Concurrency
//!
//! The entire run executes on one sequential path - the ledger and the
//! output/reject directories have a single logical writer, so no two
//! resolutions are ever in flight at once.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use filemerge_audit::AuditLogger;
use filemerge_core::{
    config::RootsConfig,
    domain::{
        decision::MergeOutcome,
        ledger::MergeLedger,
        newtypes::{DatasetName, FileName},
    },
    ports::file_store::IFileStore,
};
use filemerge_resolve::DirectiveExecutor;

use crate::processor::DatasetProcessor;
use crate::MergeError;

/// Summary of a completed merge run
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    /// Number of dataset directories processed
    pub datasets_processed: u32,
    /// Number of pre-existing output files seeded into the ledger
    pub files_seeded: u32,
    /// Files accepted on first sighting
    pub accepted_new: u32,
    /// Observations identical to the accepted content
    pub duplicate_noop: u32,
    /// Conflicts where the incumbent kept its acceptance
    pub conflict_retained: u32,
    /// Conflicts where the candidate took over acceptance
    pub conflict_superseded: u32,
    /// Variant copies written to the reject area
    pub variants_rejected: u32,
    /// Per-file failures (non-fatal)
    pub errors: Vec<String>,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl MergeReport {
    /// Total observations resolved across all datasets
    #[must_use]
    pub fn files_processed(&self) -> u32 {
        self.accepted_new + self.duplicate_noop + self.conflict_retained + self.conflict_superseded
    }

    /// True if the run saw no per-file failures
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn record_outcome(&mut self, outcome: MergeOutcome) {
        match outcome {
            MergeOutcome::AcceptedNew => self.accepted_new += 1,
            MergeOutcome::DuplicateNoop => self.duplicate_noop += 1,
            MergeOutcome::ConflictRetained => self.conflict_retained += 1,
            MergeOutcome::ConflictSuperseded => self.conflict_superseded += 1,
        }
    }

    pub(crate) fn record_error(&mut self, path: &str, message: &str) {
        self.errors.push(format!("{path}: {message}"));
    }
}

/// Top-level driver for a merge run
pub struct MergeEngine {
    store: Arc<dyn IFileStore>,
    audit: AuditLogger,
    roots: RootsConfig,
    dry_run: bool,
}

impl MergeEngine {
    pub fn new(store: Arc<dyn IFileStore>, audit: AuditLogger, roots: RootsConfig) -> Self {
        Self {
            store,
            audit,
            roots,
            dry_run: false,
        }
    }

    /// Resolve and report without performing any copies.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute a full merge run
    ///
    /// # Errors
    /// Returns [`MergeError`] on fatal failures (an unlistable directory,
    /// ledger misuse). Per-file failures are collected in the report.
    pub async fn merge(&self) -> Result<MergeReport, MergeError> {
        let started = Instant::now();
        let mut report = MergeReport::default();
        let mut ledger = MergeLedger::new();

        if !self.dry_run {
            for dir in [&self.roots.output, &self.roots.reject] {
                self.store
                    .create_dir_all(dir)
                    .await
                    .map_err(|source| MergeError::Setup {
                        dir: dir.clone(),
                        source,
                    })?;
            }
        }

        self.seed_ledger(&mut ledger, &mut report).await?;

        let datasets = self.enumerate_datasets().await?;
        info!(
            datasets = datasets.len(),
            names = ?datasets.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>(),
            "Reading files from dataset directories"
        );

        let dataset_names: Vec<DatasetName> =
            datasets.iter().map(|(name, _)| name.clone()).collect();
        self.audit
            .log_run_start(&dataset_names, report.files_seeded as usize)
            .await;

        let executor = DirectiveExecutor::new(
            Arc::clone(&self.store),
            self.roots.output.clone(),
            self.roots.reject.clone(),
        )
        .with_dry_run(self.dry_run);
        let processor = DatasetProcessor::new(Arc::clone(&self.store), executor);

        for (name, dir) in &datasets {
            processor
                .process_dataset(&mut ledger, name, dir, &self.audit, &mut report)
                .await?;
            report.datasets_processed += 1;
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        self.audit
            .log_run_complete(
                report.duration_ms,
                report.accepted_new,
                report.duplicate_noop,
                report.conflict_retained,
                report.conflict_superseded,
                report.variants_rejected,
                report.errors.len(),
            )
            .await;

        info!(
            datasets = report.datasets_processed,
            files = report.files_processed(),
            rejected = report.variants_rejected,
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "Merge run complete"
        );

        Ok(report)
    }

    /// Digest pre-existing output files and register them as incumbents
    async fn seed_ledger(
        &self,
        ledger: &mut MergeLedger,
        report: &mut MergeReport,
    ) -> Result<(), MergeError> {
        let output_exists = self
            .store
            .exists(&self.roots.output)
            .await
            .map_err(MergeError::from_enumeration(&self.roots.output))?;
        if !output_exists {
            info!("Output directory is empty, moving on to datasets");
            return Ok(());
        }

        let files = self
            .store
            .list_files(&self.roots.output)
            .await
            .map_err(MergeError::from_enumeration(&self.roots.output))?;

        if files.is_empty() {
            info!("Output directory is empty, moving on to datasets");
            return Ok(());
        }

        info!(
            files = files.len(),
            "Digesting files that already exist in the output directory"
        );

        for path in files {
            let path_str = path.display().to_string();
            let filename = match path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| FileName::new(n.to_string()))
            {
                Some(Ok(name)) => name,
                _ => {
                    warn!(path = %path_str, "skipping output file with unusable name");
                    report.record_error(&path_str, "invalid file name");
                    continue;
                }
            };

            match self.store.compute_digest(&path).await {
                Ok(digest) => {
                    ledger.seed(filename, digest);
                    report.files_seeded += 1;
                }
                Err(e) => {
                    warn!(path = %path_str, error = %e, "could not digest existing output file");
                    report.record_error(&path_str, &format!("seed failure: {e:#}"));
                    self.audit
                        .log_file_error(&path_str, "SEED_FAILURE", &format!("{e:#}"))
                        .await;
                }
            }
        }

        Ok(())
    }

    /// List dataset subdirectories, sorted ascending by name
    async fn enumerate_datasets(&self) -> Result<Vec<(DatasetName, PathBuf)>, MergeError> {
        let dirs = self
            .store
            .list_subdirs(&self.roots.input)
            .await
            .map_err(MergeError::from_enumeration(&self.roots.input))?;

        let mut datasets = Vec::with_capacity(dirs.len());
        for dir in dirs {
            match dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| DatasetName::new(n.to_string()))
            {
                Some(Ok(name)) => datasets.push((name, dir)),
                _ => {
                    warn!(path = %dir.display(), "skipping dataset with unusable name");
                }
            }
        }

        // The adapter sorts paths; dataset names inherit that order.
        Ok(datasets)
    }
}

impl MergeError {
    /// Adapter from listing errors to the fatal enumeration variant
    fn from_enumeration(dir: &std::path::Path) -> impl FnOnce(anyhow::Error) -> MergeError + '_ {
        move |source| MergeError::Enumeration {
            dir: dir.to_path_buf(),
            source,
        }
    }
}
