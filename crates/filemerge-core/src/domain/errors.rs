//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including validation failures and ledger misuse.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid file or dataset name
    #[error("Invalid name: {0}")]
    InvalidName(String),

    /// Invalid content digest format
    #[error("Invalid digest format: {0}")]
    InvalidDigest(String),

    /// ID parsing error
    #[error("Invalid ID format: {0}")]
    InvalidId(String),

    /// A ledger operation was called against a filename in the wrong state
    #[error("Ledger misuse for '{filename}': {reason}")]
    LedgerMisuse {
        /// The filename the operation targeted
        filename: String,
        /// What went wrong
        reason: String,
    },
}
