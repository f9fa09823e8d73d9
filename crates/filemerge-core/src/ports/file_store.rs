//! File store port (driven/secondary port)
//!
//! This module defines the interface the merge engine uses to talk to the
//! filesystem: listing directories, computing content digests, and copying
//! bytes. The resolution logic itself never touches the filesystem; it only
//! emits directives that the engine executes through this port.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because filesystem errors are adapter-specific.
//! - Listing methods must return entries in ascending lexicographic order
//!   of file name. Dataset processing order and first-arrival acceptance
//!   both depend on enumeration order, so determinism is part of the
//!   contract rather than an adapter detail.
//! - `copy_file` is an atomic "copy bytes from A to B" primitive;
//!   implementations should not leave partially-written targets visible.

use std::path::{Path, PathBuf};

use crate::domain::newtypes::ContentDigest;

/// Port trait for filesystem operations
#[async_trait::async_trait]
pub trait IFileStore: Send + Sync {
    /// Lists the immediate subdirectories of `dir`
    ///
    /// Non-directory entries are skipped. Results are sorted ascending by
    /// name.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read
    async fn list_subdirs(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>>;

    /// Lists the regular files directly inside `dir`
    ///
    /// Subdirectories and other non-file entries are skipped. Results are
    /// sorted ascending by name.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read
    async fn list_files(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>>;

    /// Computes the content digest of a file
    ///
    /// Reads the full file contents; byte-identical files always produce
    /// identical digests.
    ///
    /// # Errors
    /// Returns an error if the file cannot be fully read
    async fn compute_digest(&self, path: &Path) -> anyhow::Result<ContentDigest>;

    /// Copies a file's bytes from `source` to `target`
    ///
    /// Parent directories of `target` are created as needed. An existing
    /// target is replaced.
    ///
    /// # Returns
    /// The number of bytes copied
    ///
    /// # Errors
    /// Returns an error if the source cannot be read or the target cannot
    /// be written
    async fn copy_file(&self, source: &Path, target: &Path) -> anyhow::Result<u64>;

    /// Whether a path exists
    ///
    /// # Errors
    /// Returns an error only if existence cannot be determined (e.g. a
    /// permission failure on the parent); a missing path is `Ok(false)`
    async fn exists(&self, path: &Path) -> anyhow::Result<bool>;

    /// Creates a directory and all parent directories as needed
    async fn create_dir_all(&self, dir: &Path) -> anyhow::Result<()>;
}
