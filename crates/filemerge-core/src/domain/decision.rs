//! Merge decisions - outcomes and copy directives
//!
//! The conflict resolver reduces every observation to a [`Resolution`]:
//! what happened ([`MergeOutcome`]) and which filesystem copies must be
//! performed ([`CopyDirective`]). Directives are plain data; executing
//! them is the engine's job, which keeps the decision logic free of I/O.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::newtypes::{ContentDigest, FileName};

/// Outcome of resolving one observed file against the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// First sighting of the filename; content accepted as canonical
    AcceptedNew,
    /// Byte-identical to the accepted content; nothing to do
    DuplicateNoop,
    /// Content conflicts with the incumbent, which keeps its acceptance
    ConflictRetained,
    /// Content conflicts with the incumbent and out-counts it; the
    /// candidate becomes the accepted digest
    ConflictSuperseded,
}

impl MergeOutcome {
    /// True if the observation conflicted with accepted content
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            MergeOutcome::ConflictRetained | MergeOutcome::ConflictSuperseded
        )
    }
}

impl std::fmt::Display for MergeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MergeOutcome::AcceptedNew => "accepted_new",
            MergeOutcome::DuplicateNoop => "duplicate_noop",
            MergeOutcome::ConflictRetained => "conflict_retained",
            MergeOutcome::ConflictSuperseded => "conflict_superseded",
        };
        write!(f, "{s}")
    }
}

/// A single filesystem copy the engine must perform
///
/// Directives are independent, idempotent-safe operations: reject copies
/// are only emitted on first sight of a digest, and installing the same
/// bytes over the output path twice is harmless. Re-running a resolution
/// after a failed copy is therefore safe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyDirective {
    /// Copy the candidate's bytes over the canonical output path
    InstallOutput {
        /// Path of the candidate file inside its dataset
        source: PathBuf,
        /// Output filename
        filename: FileName,
    },
    /// Copy the candidate's bytes into the reject area
    RejectCandidate {
        /// Path of the candidate file inside its dataset
        source: PathBuf,
        /// Filename the variant was observed under
        filename: FileName,
        /// The losing variant's digest (part of the reject name)
        digest: ContentDigest,
    },
    /// Copy the current output file into the reject area
    ///
    /// Emitted once per filename, when the incumbent is first flagged as
    /// conflicting, so the incumbent variant is preserved even if it is
    /// later superseded.
    RejectIncumbent {
        /// Filename whose output copy is being preserved
        filename: FileName,
        /// The incumbent's digest (part of the reject name)
        digest: ContentDigest,
    },
}

impl CopyDirective {
    /// True for directives that write into the reject area
    #[must_use]
    pub fn is_reject(&self) -> bool {
        matches!(
            self,
            CopyDirective::RejectCandidate { .. } | CopyDirective::RejectIncumbent { .. }
        )
    }
}

/// Result of resolving one observation: outcome plus 0-3 copy directives
/// in execution order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// What the resolver decided
    pub outcome: MergeOutcome,
    /// Copies the engine must perform, in order
    pub directives: Vec<CopyDirective>,
}

impl Resolution {
    /// A resolution that requires no filesystem work
    #[must_use]
    pub fn noop(outcome: MergeOutcome) -> Self {
        Self {
            outcome,
            directives: Vec::new(),
        }
    }

    /// Number of reject-area copies this resolution requests
    #[must_use]
    pub fn reject_count(&self) -> usize {
        self.directives.iter().filter(|d| d.is_reject()).count()
    }
}
