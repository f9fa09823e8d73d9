//! Domain entities and business logic
//!
//! This module contains the core domain types for filemerge:
//! - Newtypes for type-safe identifiers and validated domain values
//! - The resolution ledger tracking accepted content per filename
//! - Copy directives and merge outcomes produced by conflict resolution
//! - Audit entries for the decision trail
//! - Domain-specific error types

pub mod audit;
pub mod decision;
pub mod errors;
pub mod ledger;
pub mod newtypes;

// Re-export commonly used types
pub use audit::{AuditResult, MergeAction, MergeAuditEntry};
pub use decision::{CopyDirective, MergeOutcome, Resolution};
pub use errors::DomainError;
pub use ledger::{ConflictTally, MergeLedger};
pub use newtypes::*;
