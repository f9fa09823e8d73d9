//! Reject-area naming
//!
//! Losing variants are preserved under a name that encodes both the
//! original filename and the variant's digest: `<filename>.<digest_hex>`.
//! The digest suffix makes repeated sightings of the same losing content
//! land on the same path, which is what keeps reject copies idempotent.

use std::path::{Path, PathBuf};

use filemerge_core::domain::newtypes::{ContentDigest, FileName};

/// Builds and parses reject-area file names
pub struct RejectNamer;

impl RejectNamer {
    /// The reject-area name for a (filename, digest) pair
    ///
    /// Given "a.txt" and a digest starting "2cf24d…", produces
    /// "a.txt.2cf24d…" (full 64-char digest).
    #[must_use]
    pub fn reject_name(filename: &FileName, digest: &ContentDigest) -> String {
        format!("{}.{}", filename, digest)
    }

    /// The full reject-area path under `reject_root`
    #[must_use]
    pub fn reject_path(
        reject_root: &Path,
        filename: &FileName,
        digest: &ContentDigest,
    ) -> PathBuf {
        reject_root.join(Self::reject_name(filename, digest))
    }

    /// Splits a reject-area name back into filename and digest
    ///
    /// Returns `None` if the name does not end in a valid digest suffix.
    #[must_use]
    pub fn parse(name: &str) -> Option<(FileName, ContentDigest)> {
        let (stem, suffix) = name.rsplit_once('.')?;
        let digest = ContentDigest::new(suffix.to_string()).ok()?;
        let filename = FileName::new(stem.to_string()).ok()?;
        Some((filename, digest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HELLO_SHA256: &str =
        "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn name(s: &str) -> FileName {
        FileName::new(s.to_string()).unwrap()
    }

    fn digest() -> ContentDigest {
        ContentDigest::new(HELLO_SHA256.to_string()).unwrap()
    }

    #[test]
    fn test_reject_name_encodes_both_parts() {
        let reject = RejectNamer::reject_name(&name("a.txt"), &digest());
        assert_eq!(reject, format!("a.txt.{HELLO_SHA256}"));
    }

    #[test]
    fn test_reject_path() {
        let path = RejectNamer::reject_path(Path::new("/reject"), &name("a.txt"), &digest());
        assert_eq!(
            path,
            PathBuf::from(format!("/reject/a.txt.{HELLO_SHA256}"))
        );
    }

    #[test]
    fn test_same_pair_same_name() {
        let a = RejectNamer::reject_name(&name("a.txt"), &digest());
        let b = RejectNamer::reject_name(&name("a.txt"), &digest());
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_roundtrip() {
        let reject = RejectNamer::reject_name(&name("archive.tar.gz"), &digest());
        let (parsed_name, parsed_digest) = RejectNamer::parse(&reject).unwrap();
        assert_eq!(parsed_name, name("archive.tar.gz"));
        assert_eq!(parsed_digest, digest());
    }

    #[test]
    fn test_parse_rejects_plain_names() {
        assert!(RejectNamer::parse("a.txt").is_none());
        assert!(RejectNamer::parse("noextension").is_none());
    }
}
