//! Domain newtypes with validation
//!
//! This module provides strongly-typed wrappers for domain identifiers and values.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::DomainError;

// ============================================================================
// Run identifier
// ============================================================================

/// Identifier for a single merge run
///
/// Every invocation of the merge engine gets a fresh RunId, which ties
/// together the audit entries the run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new random RunId
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a RunId from an existing UUID
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID value
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RunId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| DomainError::InvalidId(format!("Invalid RunId: {e}")))
    }
}

impl From<Uuid> for RunId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

// ============================================================================
// Name types
// ============================================================================

/// Validates a single path component: non-empty, no separators, no traversal
fn validate_component(value: &str, what: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::InvalidName(format!("{what} cannot be empty")));
    }
    if value == "." || value == ".." {
        return Err(DomainError::InvalidName(format!(
            "{what} cannot be a relative path component: {value}"
        )));
    }
    if value.contains('/') || value.contains('\\') {
        return Err(DomainError::InvalidName(format!(
            "{what} cannot contain path separators: {value}"
        )));
    }
    if value.contains('\0') {
        return Err(DomainError::InvalidName(format!(
            "{what} cannot contain NUL bytes"
        )));
    }
    Ok(())
}

/// A validated file name (single path component, the ledger key)
///
/// FileName ensures the name is:
/// - Non-empty
/// - A single component (no `/` or `\`)
/// - Not `.` or `..`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileName(String);

impl FileName {
    /// Create a new FileName
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if the name is empty, contains
    /// a path separator, or is a relative path component
    pub fn new(name: String) -> Result<Self, DomainError> {
        validate_component(&name, "File name")?;
        Ok(Self(name))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FileName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FileName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for FileName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<FileName> for String {
    fn from(name: FileName) -> Self {
        name.0
    }
}

/// A validated dataset directory name (single path component)
///
/// Dataset names are the immediate subdirectory names of the input root.
/// The same component rules as [`FileName`] apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetName(String);

impl DatasetName {
    /// Create a new DatasetName
    ///
    /// # Errors
    /// Returns `DomainError::InvalidName` if the name is empty, contains
    /// a path separator, or is a relative path component
    pub fn new(name: String) -> Result<Self, DomainError> {
        validate_component(&name, "Dataset name")?;
        Ok(Self(name))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DatasetName {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DatasetName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for DatasetName {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<DatasetName> for String {
    fn from(name: DatasetName) -> Self {
        name.0
    }
}

// ============================================================================
// Content digest
// ============================================================================

/// SHA-256 content digest in lowercase hex format
///
/// The digest identifies a file's exact byte content. Two byte-identical
/// inputs always yield the same digest; the fingerprint is used for
/// duplicate detection and conflict tallying, not for security.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentDigest(String);

impl ContentDigest {
    /// Expected length of a SHA-256 digest in hex characters
    const HEX_LEN: usize = 64;

    /// Create a new ContentDigest from a hex string
    ///
    /// Uppercase hex digits are normalized to lowercase.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidDigest` if the string is not exactly
    /// 64 hex characters
    pub fn new(hex: String) -> Result<Self, DomainError> {
        if hex.len() != Self::HEX_LEN {
            return Err(DomainError::InvalidDigest(format!(
                "Digest has wrong length: expected {} hex chars, got {}",
                Self::HEX_LEN,
                hex.len()
            )));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidDigest(format!(
                "Digest is not valid hex: {hex}"
            )));
        }
        Ok(Self(hex.to_lowercase()))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 8 hex characters, for compact log lines
    #[must_use]
    pub fn short(&self) -> &str {
        &self.0[..8]
    }
}

impl Display for ContentDigest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContentDigest {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for ContentDigest {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<ContentDigest> for String {
    fn from(digest: ContentDigest) -> Self {
        digest.0
    }
}

// ============================================================================
// Tests
// ============================================================================
