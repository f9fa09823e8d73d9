//! Audit entry domain entities
//!
//! This module defines the types for filemerge's decision trail: every
//! significant event of a merge run (datasets started, files accepted,
//! variants rejected, errors) becomes a [`MergeAuditEntry`], giving an
//! auditable record of why the output directory looks the way it does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::newtypes::RunId;

/// Actions that can be recorded in the merge audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeAction {
    /// A merge run started
    RunStart,
    /// A merge run completed
    RunComplete,
    /// Processing of a dataset directory started
    DatasetStart,
    /// A filename was seen for the first time and accepted
    FileAccepted,
    /// An observation matched the accepted content exactly
    DuplicateSkipped,
    /// A conflict was tallied and the incumbent kept its acceptance
    ConflictRetained,
    /// A conflict was tallied and the candidate took over acceptance
    ConflictSuperseded,
    /// A losing variant was copied into the reject area
    VariantRejected,
    /// A file could not be processed (read or copy failure)
    FileError,
}

impl std::fmt::Display for MergeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MergeAction::RunStart => "run_start",
            MergeAction::RunComplete => "run_complete",
            MergeAction::DatasetStart => "dataset_start",
            MergeAction::FileAccepted => "file_accepted",
            MergeAction::DuplicateSkipped => "duplicate_skipped",
            MergeAction::ConflictRetained => "conflict_retained",
            MergeAction::ConflictSuperseded => "conflict_superseded",
            MergeAction::VariantRejected => "variant_rejected",
            MergeAction::FileError => "file_error",
        };
        write!(f, "{s}")
    }
}

/// Result of an audited action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditResult {
    /// The action completed successfully
    Success,
    /// The action failed with an error code and message
    Failed {
        /// Error code for categorization
        code: String,
        /// Human-readable error message
        message: String,
    },
}

impl AuditResult {
    /// Creates a successful result
    #[must_use]
    pub fn success() -> Self {
        AuditResult::Success
    }

    /// Creates a failed result with the given code and message
    pub fn failed(code: impl Into<String>, message: impl Into<String>) -> Self {
        AuditResult::Failed {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Returns true if the result is a success
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, AuditResult::Success)
    }
}

/// One entry of the merge decision trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeAuditEntry {
    /// When the action occurred
    timestamp: DateTime<Utc>,
    /// The run this entry belongs to
    run_id: RunId,
    /// The type of action that was performed
    action: MergeAction,
    /// The result of the action
    result: AuditResult,
    /// Additional structured details about the action
    details: Value,
}

impl MergeAuditEntry {
    /// Creates a new audit entry stamped with the current time
    #[must_use]
    pub fn new(run_id: RunId, action: MergeAction, result: AuditResult) -> Self {
        Self {
            timestamp: Utc::now(),
            run_id,
            action,
            result,
            details: Value::Null,
        }
    }

    /// Attaches structured details to the entry
    #[must_use]
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// When the action occurred
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// The run this entry belongs to
    #[must_use]
    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The recorded action
    #[must_use]
    pub fn action(&self) -> &MergeAction {
        &self.action
    }

    /// The recorded result
    #[must_use]
    pub fn result(&self) -> &AuditResult {
        &self.result
    }

    /// The structured details
    #[must_use]
    pub fn details(&self) -> &Value {
        &self.details
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_action_display() {
        assert_eq!(MergeAction::RunStart.to_string(), "run_start");
        assert_eq!(MergeAction::VariantRejected.to_string(), "variant_rejected");
        assert_eq!(
            MergeAction::ConflictSuperseded.to_string(),
            "conflict_superseded"
        );
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&MergeAction::DuplicateSkipped).unwrap();
        assert_eq!(json, "\"duplicate_skipped\"");
    }

    #[test]
    fn test_result_constructors() {
        assert!(AuditResult::success().is_success());

        let failed = AuditResult::failed("READ_FAILURE", "boom");
        assert!(!failed.is_success());
        match failed {
            AuditResult::Failed { code, message } => {
                assert_eq!(code, "READ_FAILURE");
                assert_eq!(message, "boom");
            }
            AuditResult::Success => panic!("expected Failed"),
        }
    }

    #[test]
    fn test_entry_roundtrip() {
        let entry = MergeAuditEntry::new(
            RunId::new(),
            MergeAction::FileAccepted,
            AuditResult::success(),
        )
        .with_details(json!({"filename": "a.txt"}));

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: MergeAuditEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, parsed);
        assert_eq!(parsed.details()["filename"], "a.txt");
    }
}
