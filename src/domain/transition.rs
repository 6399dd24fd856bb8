use serde::{Deserialize, Serialize};

use crate::domain::{TransitionRejection, WithdrawalRecord, WithdrawalStatus};

/// An administrator's proposed status change, as received from the review
/// form or the PUT body. Evidence fields are optional here; `validate`
/// decides which ones the target status legally requires.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionCommand {
    pub expected_current_status: WithdrawalStatus,
    pub status: WithdrawalStatus,
    pub settlement_reference: Option<String>,
    pub failure_reason: Option<String>,
    pub note: Option<String>,
    pub actor_id: String,
}

impl TransitionCommand {
    pub fn new(
        expected: WithdrawalStatus,
        target: WithdrawalStatus,
        actor_id: impl Into<String>,
    ) -> Self {
        Self {
            expected_current_status: expected,
            status: target,
            settlement_reference: None,
            failure_reason: None,
            note: None,
            actor_id: actor_id.into(),
        }
    }

    pub fn with_settlement_reference(mut self, reference: impl Into<String>) -> Self {
        self.settlement_reference = Some(reference.into());
        self
    }

    pub fn with_failure_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// The validator's output: trimmed, status-consistent fields ready to be
/// applied. Evidence is present exactly when the target status requires it.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTransition {
    pub status: WithdrawalStatus,
    pub settlement_reference: Option<String>,
    pub failure_reason: Option<String>,
    pub note: Option<String>,
}

fn normalize(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Decide whether a proposed status change is legal for `record`.
///
/// Pure function - no clock, no I/O, no side effects. Both the review
/// orchestrator (pre-flight) and the store (at commit time, under its write
/// lock) run the same rules, so a stale client cannot sneak an illegal
/// transition past the server.
pub fn validate(
    record: &WithdrawalRecord,
    proposed: &TransitionCommand,
) -> Result<NormalizedTransition, TransitionRejection> {
    if record.status.is_terminal() {
        return Err(TransitionRejection::TerminalState);
    }

    let settlement_reference = normalize(&proposed.settlement_reference);
    let failure_reason = normalize(&proposed.failure_reason);
    let note = normalize(&proposed.note);

    if proposed.status == record.status {
        // Note-only self-transition: evidence must not change.
        if settlement_reference.is_some() || failure_reason.is_some() {
            return Err(TransitionRejection::NoteOnlySelfTransition);
        }
        return Ok(NormalizedTransition {
            status: record.status,
            settlement_reference: record.settlement_reference.clone(),
            failure_reason: record.failure_reason.clone(),
            note,
        });
    }

    match proposed.status {
        WithdrawalStatus::Completed => {
            if settlement_reference.is_none() {
                return Err(TransitionRejection::MissingSettlementReference);
            }
            Ok(NormalizedTransition {
                status: WithdrawalStatus::Completed,
                settlement_reference,
                failure_reason: None,
                note,
            })
        }
        WithdrawalStatus::Failed | WithdrawalStatus::Cancelled => {
            if failure_reason.is_none() {
                return Err(TransitionRejection::MissingFailureReason);
            }
            Ok(NormalizedTransition {
                status: proposed.status,
                settlement_reference: None,
                failure_reason,
                note,
            })
        }
        WithdrawalStatus::Pending | WithdrawalStatus::Processing => {
            // A record cannot move into a non-terminal state while still
            // carrying terminal-state evidence.
            if settlement_reference.is_some() || failure_reason.is_some() {
                return Err(TransitionRejection::EvidenceNotAllowed);
            }
            Ok(NormalizedTransition {
                status: proposed.status,
                settlement_reference: None,
                failure_reason: None,
                note,
            })
        }
    }
}
