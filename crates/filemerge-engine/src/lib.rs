//! Filemerge Engine - Dataset merge orchestration
//!
//! Provides:
//! - Sequential dataset processing with per-file error isolation
//! - Ledger seeding from pre-existing output content
//! - The filesystem adapter (atomic copies, SHA-256 digests)
//!
//! ## Modules
//!
//! - [`engine`] - Merge engine orchestrating seeding and dataset processing
//! - [`processor`] - Per-dataset file drive (digest → resolve → execute)
//! - [`filesystem`] - Local filesystem adapter

pub mod engine;
pub mod filesystem;
pub mod processor;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can abort a merge run
///
/// Per-file failures are not represented here; they are isolated, logged,
/// and collected in the run report. These variants are the fatal ones.
#[derive(Debug, Error)]
pub enum MergeError {
    /// An I/O error occurred during setup
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An output or reject root could not be created
    #[error("cannot prepare directory {dir}: {source}")]
    Setup {
        dir: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A directory listing failed; the run cannot proceed without knowing
    /// the full file set
    #[error("cannot enumerate directory {dir}: {source}")]
    Enumeration {
        dir: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// A domain-level error propagated from filemerge-core
    #[error("domain error: {0}")]
    Domain(#[from] filemerge_core::domain::errors::DomainError),
}
