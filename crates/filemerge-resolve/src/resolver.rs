//! Majority-vote conflict resolution
//!
//! The [`ConflictResolver`] decides, for one observed file, what the merge
//! must do: accept it as new, ignore it as a duplicate, or tally a conflict
//! and possibly supersede the incumbent. It mutates only the ledger and
//! returns copy directives as data; executing them is the engine's job.
//!
//! ## Decision table
//!
//! | ledger state                       | decision                          |
//! |------------------------------------|-----------------------------------|
//! | no accepted digest                 | accept, install to output         |
//! | candidate equals accepted          | no-op                             |
//! | conflict, candidate count <= incumbent | retain incumbent, reject copies |
//! | conflict, candidate count > incumbent  | supersede, reject copies, install |
//!
//! Reject copies are emitted at most once per (filename, digest) pair: the
//! candidate on its first sighting, the incumbent when its count is first
//! made explicit. Ties always favor the incumbent, so two equally
//! represented variants never flap.

use std::path::Path;

use tracing::{debug, info};

use filemerge_core::domain::{
    decision::{CopyDirective, MergeOutcome, Resolution},
    errors::DomainError,
    ledger::MergeLedger,
    newtypes::{ContentDigest, FileName},
};

/// Resolves observed files against the merge ledger
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictResolver;

impl ConflictResolver {
    /// Create a new `ConflictResolver`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolve one observation of `filename` with content `candidate`.
    ///
    /// `candidate_source` is the path of the observed file inside its
    /// dataset; it is threaded into the directives so the engine knows
    /// which bytes to copy.
    ///
    /// # Errors
    /// Returns [`DomainError`] only on ledger misuse, which the call
    /// sequence here rules out; propagation keeps the invariant checks
    /// honest instead of asserting them away.
    pub fn resolve(
        &self,
        ledger: &mut MergeLedger,
        filename: &FileName,
        candidate: &ContentDigest,
        candidate_source: &Path,
    ) -> Result<Resolution, DomainError> {
        let incumbent = match ledger.accepted(filename) {
            None => {
                // First arrival wins: establish acceptance and install.
                ledger.record_observation(filename, candidate);
                debug!(
                    filename = %filename,
                    digest = %candidate.short(),
                    "First sighting, accepting as canonical"
                );
                return Ok(Resolution {
                    outcome: MergeOutcome::AcceptedNew,
                    directives: vec![CopyDirective::InstallOutput {
                        source: candidate_source.to_path_buf(),
                        filename: filename.clone(),
                    }],
                });
            }
            Some(accepted) if accepted == candidate => {
                debug!(
                    filename = %filename,
                    digest = %candidate.short(),
                    "Exact duplicate of accepted content, nothing to do"
                );
                return Ok(Resolution::noop(MergeOutcome::DuplicateNoop));
            }
            Some(accepted) => accepted.clone(),
        };

        let tally = ledger.tally_conflict(filename, candidate)?;
        let mut directives = Vec::with_capacity(3);

        if tally.candidate_first_sight {
            directives.push(CopyDirective::RejectCandidate {
                source: candidate_source.to_path_buf(),
                filename: filename.clone(),
                digest: candidate.clone(),
            });
        }
        if tally.incumbent_first_flag {
            directives.push(CopyDirective::RejectIncumbent {
                filename: filename.clone(),
                digest: incumbent.clone(),
            });
        }

        let outcome = if tally.candidate_count > tally.incumbent_count {
            ledger.promote(filename, candidate.clone())?;
            directives.push(CopyDirective::InstallOutput {
                source: candidate_source.to_path_buf(),
                filename: filename.clone(),
            });
            info!(
                filename = %filename,
                new = %candidate.short(),
                old = %incumbent.short(),
                votes = tally.candidate_count,
                against = tally.incumbent_count,
                "Conflict resolved: candidate supersedes incumbent"
            );
            MergeOutcome::ConflictSuperseded
        } else {
            info!(
                filename = %filename,
                candidate = %candidate.short(),
                incumbent = %incumbent.short(),
                votes = tally.candidate_count,
                against = tally.incumbent_count,
                "Conflict resolved: incumbent retained"
            );
            MergeOutcome::ConflictRetained
        };

        Ok(Resolution { outcome, directives })
    }
}
