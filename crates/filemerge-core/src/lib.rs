//! Filemerge Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain entities** - `MergeLedger`, `Resolution`, `CopyDirective`, `MergeAuditEntry`
//! - **Newtypes** - `FileName`, `DatasetName`, `ContentDigest`, `RunId`
//! - **Port definitions** - Traits for adapters: `IFileStore`, `IAuditSink` (in filemerge-audit)
//!
//! # Architecture
//!
//! This crate follows the hexagonal (ports & adapters) architecture pattern.
//! The domain module contains pure business logic with no I/O: the ledger
//! tracks which content is accepted per filename and how often each variant
//! has been observed. Ports define trait interfaces that adapter crates
//! implement; the merge engine drives everything through those seams.

pub mod config;
pub mod domain;
pub mod ports;
