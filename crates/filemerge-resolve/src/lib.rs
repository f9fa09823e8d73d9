//! Filemerge Resolve - Conflict resolution
//!
//! Provides:
//! - Majority-vote conflict resolution over the merge ledger
//! - Directive execution against the output and reject areas
//! - Reject-area naming (`<filename>.<digest>`)

pub mod error;
pub mod executor;
pub mod namer;
pub mod resolver;

pub use error::ResolveError;
pub use executor::DirectiveExecutor;
pub use namer::RejectNamer;
pub use resolver::ConflictResolver;
