//! Local filesystem adapter (secondary/driven adapter)
//!
//! Implements [`IFileStore`] using `tokio::fs` for async file operations.
//!
//! ## Design Decisions
//!
//! - **Atomic copies**: Copies go to a temporary file in the target
//!   directory followed by a rename, so a crash mid-copy never leaves a
//!   partially-written file at the target path.
//! - **Sorted listings**: Directory entries are returned in ascending
//!   lexicographic order. Enumeration order decides dataset processing
//!   order and first-arrival acceptance, so it is part of the port
//!   contract, not left to readdir.
//! - **Streaming digests**: SHA-256 is computed over fixed-size chunks so
//!   arbitrarily large files never need to fit in memory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::{debug, instrument};

use filemerge_core::{domain::newtypes::ContentDigest, ports::file_store::IFileStore};

/// Read chunk size for digest computation
const DIGEST_CHUNK_BYTES: usize = 64 * 1024;

/// Adapter that bridges the [`IFileStore`] port to the real filesystem.
///
/// This is a zero-sized struct because all operations derive their context
/// from the path arguments. Configuration (the three roots) lives at a
/// higher layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStoreAdapter;

impl FileStoreAdapter {
    /// Create a new `FileStoreAdapter`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Shared listing logic; `want_dir` selects directories or files.
    async fn list_entries(&self, dir: &Path, want_dir: bool) -> anyhow::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        let mut read_dir = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = read_dir.next_entry().await? {
            let file_type = entry.file_type().await?;
            let keep = if want_dir {
                file_type.is_dir()
            } else {
                file_type.is_file()
            };
            if keep {
                entries.push(entry.path());
            }
        }

        // Same parent directory, so comparing full paths orders by name.
        entries.sort();
        Ok(entries)
    }
}

#[async_trait::async_trait]
impl IFileStore for FileStoreAdapter {
    #[instrument(skip(self), fields(dir = %dir.display()))]
    async fn list_subdirs(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let dirs = self.list_entries(dir, true).await?;
        debug!(count = dirs.len(), "listed subdirectories");
        Ok(dirs)
    }

    #[instrument(skip(self), fields(dir = %dir.display()))]
    async fn list_files(&self, dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
        let files = self.list_entries(dir, false).await?;
        debug!(count = files.len(), "listed files");
        Ok(files)
    }

    #[instrument(skip(self), fields(path = %path.display()))]
    async fn compute_digest(&self, path: &Path) -> anyhow::Result<ContentDigest> {
        let mut file = tokio::fs::File::open(path).await?;
        let mut hasher = Sha256::new();
        let mut buffer = vec![0u8; DIGEST_CHUNK_BYTES];
        let mut total = 0u64;

        loop {
            let read = file.read(&mut buffer).await?;
            if read == 0 {
                break;
            }
            hasher.update(&buffer[..read]);
            total += read as u64;
        }

        let digest = ContentDigest::new(format!("{:x}", hasher.finalize()))
            .map_err(anyhow::Error::from)?;
        debug!(bytes = total, digest = %digest.short(), "digest computed");
        Ok(digest)
    }

    #[instrument(skip(self), fields(source = %source.display(), target = %target.display()))]
    async fn copy_file(&self, source: &Path, target: &Path) -> anyhow::Result<u64> {
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Copy to a temporary file in the same directory so the final
        // rename is atomic (same filesystem).
        let tmp_path = {
            let mut p = target.as_os_str().to_owned();
            p.push(".tmp");
            PathBuf::from(p)
        };

        let bytes = tokio::fs::copy(source, &tmp_path).await?;
        tokio::fs::rename(&tmp_path, target).await?;

        debug!(bytes, "copy complete");
        Ok(bytes)
    }

    async fn exists(&self, path: &Path) -> anyhow::Result<bool> {
        match tokio::fs::metadata(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn create_dir_all(&self, dir: &Path) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str =
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    #[tokio::test]
    async fn test_digest_matches_known_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        tokio::fs::write(&path, b"hello").await.unwrap();

        let digest = FileStoreAdapter::new().compute_digest(&path).await.unwrap();
        assert_eq!(digest.as_str(), HELLO_SHA256);
    }

    #[tokio::test]
    async fn test_digest_streams_across_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.bin");
        // Larger than one read chunk, so the loop runs more than once.
        let content = vec![0xabu8; DIGEST_CHUNK_BYTES + 17];
        tokio::fs::write(&path, &content).await.unwrap();

        let streamed = FileStoreAdapter::new().compute_digest(&path).await.unwrap();
        let oneshot = format!("{:x}", Sha256::digest(&content));
        assert_eq!(streamed.as_str(), oneshot);
    }

    #[tokio::test]
    async fn test_digest_of_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileStoreAdapter::new()
            .compute_digest(&dir.path().join("missing"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_list_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("b.txt"), b"b").await.unwrap();
        tokio::fs::write(dir.path().join("a.txt"), b"a").await.unwrap();
        tokio::fs::create_dir(dir.path().join("subdir")).await.unwrap();

        let adapter = FileStoreAdapter::new();
        let files = adapter.list_files(dir.path()).await.unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        let dirs = adapter.list_subdirs(dir.path()).await.unwrap();
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with("subdir"));
    }

    #[tokio::test]
    async fn test_list_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = FileStoreAdapter::new()
            .list_files(&dir.path().join("missing"))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_copy_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.txt");
        let target = dir.path().join("deep").join("nested").join("dst.txt");
        tokio::fs::write(&source, b"first").await.unwrap();

        let adapter = FileStoreAdapter::new();
        let bytes = adapter.copy_file(&source, &target).await.unwrap();
        assert_eq!(bytes, 5);
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"first");

        tokio::fs::write(&source, b"second").await.unwrap();
        adapter.copy_file(&source, &target).await.unwrap();
        assert_eq!(tokio::fs::read(&target).await.unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_exists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("present");
        tokio::fs::write(&path, b"x").await.unwrap();

        let adapter = FileStoreAdapter::new();
        assert!(adapter.exists(&path).await.unwrap());
        assert!(!adapter.exists(&dir.path().join("absent")).await.unwrap());
    }
}
