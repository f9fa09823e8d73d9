//! Resolution ledger - per-filename acceptance state and conflict tallies
//!
//! The [`MergeLedger`] is the single source of truth for which content is
//! currently accepted under each filename, and for how often each distinct
//! variant has been observed once a conflict exists.
//!
//! ## Counting discipline
//!
//! Before any conflict, an accepted digest has an implicit count of 1 and
//! no tally map is allocated. The tally map is created lazily on the first
//! mismatching observation, at which point the incumbent's count is made
//! explicit (initialized to 1) before the candidate is counted. Duplicates
//! of the accepted content are never tallied; only mismatching observations
//! feed the vote.
//!
//! ## Mutation discipline
//!
//! The ledger is plain owned state mutated through `&mut self`. All callers
//! run on a single sequential path; there is no interior mutability and no
//! locking to get wrong. Counts only increase and acceptance only flips
//! forward (to a strictly better-supported digest), never back.

use std::collections::HashMap;

use super::errors::DomainError;
use super::newtypes::{ContentDigest, FileName};

/// Result of tallying one conflicting observation
///
/// Reports the updated counts plus whether this call was the first sighting
/// of the candidate digest and whether it was the call that made the
/// incumbent's count explicit. The resolver turns these flags into
/// reject-area copy directives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictTally {
    /// Observation count of the candidate digest after this call
    pub candidate_count: u32,
    /// Observation count of the incumbent (accepted) digest
    pub incumbent_count: u32,
    /// True if the candidate digest had never been seen for this filename
    pub candidate_first_sight: bool,
    /// True if this call created the tally map (first conflict ever for
    /// this filename)
    pub incumbent_first_flag: bool,
}

/// Per-filename ledger state
#[derive(Debug, Clone)]
struct LedgerEntry {
    /// The digest currently considered canonical for this filename
    accepted: ContentDigest,
    /// Explicit observation counts, allocated on first conflict only
    tallies: Option<HashMap<ContentDigest, u32>>,
}

/// Process-wide mapping from filename to resolution state
///
/// Created empty (or seeded from pre-existing output content) at the start
/// of a run, mutated monotonically while datasets are processed, and
/// discarded at the end. Nothing is persisted across runs; the seeding step
/// recomputes state from the output directory.
#[derive(Debug, Clone, Default)]
pub struct MergeLedger {
    entries: HashMap<FileName, LedgerEntry>,
}

impl MergeLedger {
    /// Create an empty ledger
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pre-existing output file's digest as the initial accepted
    /// digest, with implicit count 1
    ///
    /// Called once per pre-existing output file before any dataset
    /// processing begins. Seeding an already-seeded filename replaces the
    /// entry (the output directory holds one file per name, so this cannot
    /// happen in practice).
    pub fn seed(&mut self, filename: FileName, digest: ContentDigest) {
        self.entries.insert(
            filename,
            LedgerEntry {
                accepted: digest,
                tallies: None,
            },
        );
    }

    /// The digest currently accepted for `filename`, if any
    #[must_use]
    pub fn accepted(&self, filename: &FileName) -> Option<&ContentDigest> {
        self.entries.get(filename).map(|e| &e.accepted)
    }

    /// Record an observation for a filename with no accepted digest yet
    ///
    /// Establishes `digest` as accepted with count 1 (first-arrival-wins
    /// for genuinely new files) and returns the count. If an accepted
    /// digest already exists, returns the current count of the observed
    /// digest without mutating anything; duplicates of accepted content
    /// add no tie-break evidence beyond the first acceptance.
    pub fn record_observation(&mut self, filename: &FileName, digest: &ContentDigest) -> u32 {
        match self.entries.get(filename) {
            None => {
                self.seed(filename.clone(), digest.clone());
                1
            }
            Some(_) => self.observation_count(filename, digest),
        }
    }

    /// Tally one conflicting observation of `candidate` for `filename`
    ///
    /// Lazily creates the tally map on the first conflict, initializing the
    /// incumbent's explicit count to 1, then increments the candidate's
    /// count. Returns the updated counts plus first-sight flags.
    ///
    /// # Errors
    /// Returns [`DomainError::LedgerMisuse`] if the filename has no
    /// accepted digest or if `candidate` equals the accepted digest
    /// (duplicates must not be tallied).
    pub fn tally_conflict(
        &mut self,
        filename: &FileName,
        candidate: &ContentDigest,
    ) -> Result<ConflictTally, DomainError> {
        let entry = self
            .entries
            .get_mut(filename)
            .ok_or_else(|| DomainError::LedgerMisuse {
                filename: filename.to_string(),
                reason: "tally_conflict on filename with no accepted digest".to_string(),
            })?;

        if &entry.accepted == candidate {
            return Err(DomainError::LedgerMisuse {
                filename: filename.to_string(),
                reason: "tally_conflict with candidate equal to accepted digest".to_string(),
            });
        }

        let incumbent_first_flag = entry.tallies.is_none();
        let tallies = entry.tallies.get_or_insert_with(HashMap::new);
        // Make the incumbent's implicit count of 1 explicit before counting
        // the candidate, so both sides rank on the same basis.
        tallies.entry(entry.accepted.clone()).or_insert(1);

        let candidate_first_sight = !tallies.contains_key(candidate);
        let count = tallies.entry(candidate.clone()).or_insert(0);
        *count += 1;
        let candidate_count = *count;
        let incumbent_count = tallies[&entry.accepted];

        Ok(ConflictTally {
            candidate_count,
            incumbent_count,
            candidate_first_sight,
            incumbent_first_flag,
        })
    }

    /// Flip the accepted digest for `filename` to `digest`
    ///
    /// # Errors
    /// Returns [`DomainError::LedgerMisuse`] if the filename has no entry
    /// or if `digest` does not strictly out-count the current incumbent -
    /// ties always favor the incumbent.
    pub fn promote(
        &mut self,
        filename: &FileName,
        digest: ContentDigest,
    ) -> Result<(), DomainError> {
        let entry = self
            .entries
            .get_mut(filename)
            .ok_or_else(|| DomainError::LedgerMisuse {
                filename: filename.to_string(),
                reason: "promote on filename with no accepted digest".to_string(),
            })?;

        let tallies = entry.tallies.as_ref().ok_or_else(|| DomainError::LedgerMisuse {
            filename: filename.to_string(),
            reason: "promote before any conflict was tallied".to_string(),
        })?;

        let candidate_count = tallies.get(&digest).copied().unwrap_or(0);
        let incumbent_count = tallies.get(&entry.accepted).copied().unwrap_or(1);
        if candidate_count <= incumbent_count {
            return Err(DomainError::LedgerMisuse {
                filename: filename.to_string(),
                reason: format!(
                    "promote without strict majority ({candidate_count} vs {incumbent_count})"
                ),
            });
        }

        entry.accepted = digest;
        Ok(())
    }

    /// Observation count for an exact (filename, digest) pair
    ///
    /// Reports the explicit tally when one exists; the accepted digest of a
    /// conflict-free filename reports its implicit count of 1; everything
    /// else reports 0.
    #[must_use]
    pub fn observation_count(&self, filename: &FileName, digest: &ContentDigest) -> u32 {
        match self.entries.get(filename) {
            None => 0,
            Some(entry) => match &entry.tallies {
                Some(tallies) => tallies.get(digest).copied().unwrap_or(0),
                None => u32::from(&entry.accepted == digest),
            },
        }
    }

    /// Number of filenames tracked by the ledger
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if the ledger tracks no filenames
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> FileName {
        FileName::new(s.to_string()).unwrap()
    }

    fn digest(seed: u8) -> ContentDigest {
        ContentDigest::new(format!("{:02x}", seed).repeat(32)).unwrap()
    }

    #[test]
    fn test_first_arrival_wins() {
        let mut ledger = MergeLedger::new();
        let count = ledger.record_observation(&name("a.txt"), &digest(1));
        assert_eq!(count, 1);
        assert_eq!(ledger.accepted(&name("a.txt")), Some(&digest(1)));
    }

    #[test]
    fn test_duplicate_observation_does_not_mutate() {
        let mut ledger = MergeLedger::new();
        ledger.record_observation(&name("a.txt"), &digest(1));
        let count = ledger.record_observation(&name("a.txt"), &digest(1));
        assert_eq!(count, 1);
        assert_eq!(ledger.observation_count(&name("a.txt"), &digest(1)), 1);
    }

    #[test]
    fn test_seed_has_implicit_count_one() {
        let mut ledger = MergeLedger::new();
        ledger.seed(name("x.txt"), digest(9));
        assert_eq!(ledger.observation_count(&name("x.txt"), &digest(9)), 1);
        assert_eq!(ledger.observation_count(&name("x.txt"), &digest(8)), 0);
    }

    #[test]
    fn test_first_conflict_initializes_both_sides() {
        let mut ledger = MergeLedger::new();
        ledger.seed(name("a.txt"), digest(1));

        let tally = ledger.tally_conflict(&name("a.txt"), &digest(2)).unwrap();
        assert_eq!(tally.candidate_count, 1);
        assert_eq!(tally.incumbent_count, 1);
        assert!(tally.candidate_first_sight);
        assert!(tally.incumbent_first_flag);

        // Tie: acceptance is untouched
        assert_eq!(ledger.accepted(&name("a.txt")), Some(&digest(1)));
    }

    #[test]
    fn test_repeat_conflict_counts_up_without_flags() {
        let mut ledger = MergeLedger::new();
        ledger.seed(name("a.txt"), digest(1));
        ledger.tally_conflict(&name("a.txt"), &digest(2)).unwrap();

        let tally = ledger.tally_conflict(&name("a.txt"), &digest(2)).unwrap();
        assert_eq!(tally.candidate_count, 2);
        assert_eq!(tally.incumbent_count, 1);
        assert!(!tally.candidate_first_sight);
        assert!(!tally.incumbent_first_flag);
    }

    #[test]
    fn test_lazy_and_explicit_paths_rank_identically() {
        // Lazy path: seeded incumbent, implicit count 1.
        let mut lazy = MergeLedger::new();
        lazy.seed(name("f"), digest(1));
        let t_lazy = lazy.tally_conflict(&name("f"), &digest(2)).unwrap();

        // Explicit path: incumbent arrived through record_observation.
        let mut explicit = MergeLedger::new();
        explicit.record_observation(&name("f"), &digest(1));
        let t_explicit = explicit.tally_conflict(&name("f"), &digest(2)).unwrap();

        assert_eq!(t_lazy, t_explicit);
        assert_eq!(
            lazy.observation_count(&name("f"), &digest(1)),
            explicit.observation_count(&name("f"), &digest(1)),
        );
    }

    #[test]
    fn test_promote_requires_strict_majority() {
        let mut ledger = MergeLedger::new();
        ledger.seed(name("a.txt"), digest(1));
        ledger.tally_conflict(&name("a.txt"), &digest(2)).unwrap();

        // 1 vs 1: tie favors the incumbent.
        assert!(ledger.promote(&name("a.txt"), digest(2)).is_err());

        let tally = ledger.tally_conflict(&name("a.txt"), &digest(2)).unwrap();
        assert_eq!(tally.candidate_count, 2);
        ledger.promote(&name("a.txt"), digest(2)).unwrap();
        assert_eq!(ledger.accepted(&name("a.txt")), Some(&digest(2)));
    }

    #[test]
    fn test_promoted_digest_keeps_its_count() {
        let mut ledger = MergeLedger::new();
        ledger.seed(name("a.txt"), digest(1));
        ledger.tally_conflict(&name("a.txt"), &digest(2)).unwrap();
        ledger.tally_conflict(&name("a.txt"), &digest(2)).unwrap();
        ledger.promote(&name("a.txt"), digest(2)).unwrap();

        // A third variant now conflicts against the promoted incumbent.
        let tally = ledger.tally_conflict(&name("a.txt"), &digest(3)).unwrap();
        assert_eq!(tally.incumbent_count, 2);
        assert_eq!(tally.candidate_count, 1);
        assert!(tally.candidate_first_sight);
        assert!(!tally.incumbent_first_flag);
    }

    #[test]
    fn test_tally_misuse_rejected() {
        let mut ledger = MergeLedger::new();
        assert!(ledger.tally_conflict(&name("nope"), &digest(1)).is_err());

        ledger.seed(name("a.txt"), digest(1));
        let result = ledger.tally_conflict(&name("a.txt"), &digest(1));
        assert!(matches!(result, Err(DomainError::LedgerMisuse { .. })));
    }

    #[test]
    fn test_filenames_are_independent() {
        let mut ledger = MergeLedger::new();
        ledger.record_observation(&name("a.txt"), &digest(1));
        ledger.record_observation(&name("b.txt"), &digest(2));
        ledger.tally_conflict(&name("a.txt"), &digest(3)).unwrap();

        assert_eq!(ledger.observation_count(&name("b.txt"), &digest(2)), 1);
        assert_eq!(ledger.observation_count(&name("b.txt"), &digest(3)), 0);
        assert_eq!(ledger.len(), 2);
    }
}
