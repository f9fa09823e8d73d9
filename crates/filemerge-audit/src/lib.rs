//! Filemerge Audit - Merge decision trail
//!
//! Provides:
//! - `AuditLogger`: High-level service for recording merge decisions
//! - `IAuditSink`: Port for trail persistence
//! - `JsonlAuditSink`: Append-only JSON-lines trail file

pub mod logger;
pub mod sink;

pub use logger::AuditLogger;
pub use sink::{IAuditSink, JsonlAuditSink, NullAuditSink};
