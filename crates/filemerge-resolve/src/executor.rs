//! Copy directive executor
//!
//! Applies the directives a [`crate::ConflictResolver`] emits by performing
//! the actual file operations through the [`IFileStore`] port:
//! - `InstallOutput`: copy candidate bytes over the canonical output path
//! - `RejectCandidate` / `RejectIncumbent`: preserve a variant in the
//!   reject area under `<filename>.<digest>`
//!
//! Reject targets that already exist are verified by digest before being
//! skipped: identical content means a prior (possibly aborted) run already
//! preserved the variant, while different content is a collision that is
//! reported, never overwritten.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use filemerge_core::{
    domain::{
        decision::CopyDirective,
        newtypes::{ContentDigest, FileName},
    },
    ports::file_store::IFileStore,
};

use crate::{error::ResolveError, namer::RejectNamer};

/// Applies copy directives with real file operations
pub struct DirectiveExecutor {
    store: Arc<dyn IFileStore>,
    output_root: PathBuf,
    reject_root: PathBuf,
    dry_run: bool,
}

impl DirectiveExecutor {
    pub fn new(store: Arc<dyn IFileStore>, output_root: PathBuf, reject_root: PathBuf) -> Self {
        Self {
            store,
            output_root,
            reject_root,
            dry_run: false,
        }
    }

    /// Suppress all copies; directives are logged instead of executed.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Execute directives in order, stopping at the first failure
    ///
    /// Directives already applied are not rolled back; they are
    /// idempotent-safe and a re-run will converge.
    pub async fn execute(&self, directives: &[CopyDirective]) -> Result<(), ResolveError> {
        for directive in directives {
            self.apply(directive).await?;
        }
        Ok(())
    }

    async fn apply(&self, directive: &CopyDirective) -> Result<(), ResolveError> {
        match directive {
            CopyDirective::InstallOutput { source, filename } => {
                let target = self.output_root.join(filename.as_str());
                if self.dry_run {
                    info!(source = %source.display(), target = %target.display(),
                        "dry-run: would install output");
                    return Ok(());
                }
                debug!(source = %source.display(), target = %target.display(),
                    "installing canonical output");
                self.store
                    .copy_file(source, &target)
                    .await
                    .map_err(|e| ResolveError::CopyFailed { target, source: e })?;
                Ok(())
            }
            CopyDirective::RejectCandidate {
                source,
                filename,
                digest,
            } => self.reject_copy(source.clone(), filename, digest).await,
            CopyDirective::RejectIncumbent { filename, digest } => {
                let source = self.output_root.join(filename.as_str());
                self.reject_copy(source, filename, digest).await
            }
        }
    }

    /// Copy a variant into the reject area, verifying any existing target
    async fn reject_copy(
        &self,
        source: PathBuf,
        filename: &FileName,
        digest: &ContentDigest,
    ) -> Result<(), ResolveError> {
        let target = RejectNamer::reject_path(&self.reject_root, filename, digest);

        let target_exists = self
            .store
            .exists(&target)
            .await
            .map_err(|e| ResolveError::VerifyFailed {
                path: target.clone(),
                source: e,
            })?;

        if target_exists {
            let found = self
                .store
                .compute_digest(&target)
                .await
                .map_err(|e| ResolveError::VerifyFailed {
                    path: target.clone(),
                    source: e,
                })?;

            if &found == digest {
                debug!(target = %target.display(), "reject copy already present, skipping");
                return Ok(());
            }

            warn!(
                target = %target.display(),
                expected = %digest.short(),
                found = %found.short(),
                "reject target collision detected"
            );
            return Err(ResolveError::RejectCollision {
                path: target,
                expected: digest.clone(),
                found,
            });
        }

        if self.dry_run {
            info!(source = %source.display(), target = %target.display(),
                "dry-run: would preserve rejected variant");
            return Ok(());
        }

        debug!(source = %source.display(), target = %target.display(),
            "preserving rejected variant");
        self.store
            .copy_file(&source, &target)
            .await
            .map_err(|e| ResolveError::CopyFailed { target, source: e })?;
        Ok(())
    }
}
