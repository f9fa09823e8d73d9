//! Error types for the resolution engine

use std::path::PathBuf;

use thiserror::Error;

use filemerge_core::domain::newtypes::ContentDigest;

/// Errors that can occur while executing copy directives
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A reject target exists with content other than the expected variant
    ///
    /// The first-sight guard means this should never happen within a run;
    /// it is detected defensively so a colliding file is reported instead
    /// of silently overwritten.
    #[error(
        "reject target {path} already exists with different content \
         (expected digest {expected}, found {found})"
    )]
    RejectCollision {
        path: PathBuf,
        expected: ContentDigest,
        found: ContentDigest,
    },

    /// A directive's copy could not complete
    #[error("copy to {target} failed: {source}")]
    CopyFailed {
        target: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// An existing reject target could not be verified by digest
    #[error("could not verify existing reject target {path}: {source}")]
    VerifyFailed {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A domain-level error propagated from filemerge-core
    #[error("domain error: {0}")]
    Domain(#[from] filemerge_core::domain::errors::DomainError),
}
