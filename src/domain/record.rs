use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::NormalizedTransition;

/// Opaque identifier for a withdrawal record, assigned at creation.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct WithdrawalId(Uuid);

impl WithdrawalId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for WithdrawalId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle status of a withdrawal.
///
/// `Pending` is the initial state. `Completed`, `Failed` and `Cancelled` are
/// terminal: once a record reaches one of them, no further status change is
/// legal. Unknown status strings fail to parse rather than being coerced to
/// a known value.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawalStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Cancelled,
}

impl WithdrawalStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl Display for WithdrawalStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WithdrawalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(format!("unknown withdrawal status: {}", other)),
        }
    }
}

/// One committed status change (or note-only append, where from == to).
///
/// Entries are append-only: existing entries are never edited or removed,
/// and the trail only grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub from_status: WithdrawalStatus,
    pub to_status: WithdrawalStatus,
    pub actor_id: String,
    pub timestamp: DateTime<Utc>,
    pub note: Option<String>,
}

/// Free-text note attached by a reviewer. Never changes status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewerNote {
    pub actor_id: String,
    pub text: String,
    pub noted_at: DateTime<Utc>,
}

/// A withdrawal request as persisted. Permanent ledger entry - never deleted.
///
/// Money-relevant evidence fields are tied to status:
/// - `settlement_reference` is present iff `status == Completed`
/// - `failure_reason` is present iff `status` is `Failed` or `Cancelled`
/// - `settled_at` is set exactly once, on entering a terminal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRecord {
    pub id: WithdrawalId,
    pub owner_id: String,
    pub owner_display_name: String,
    pub amount: f64,
    pub currency: String,
    /// Network / payment rail the funds leave on.
    pub method: String,
    pub destination_address: String,
    pub status: WithdrawalStatus,
    pub settlement_reference: Option<String>,
    pub failure_reason: Option<String>,
    pub reviewer_notes: Vec<ReviewerNote>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
    pub audit_trail: Vec<AuditEntry>,
}

impl WithdrawalRecord {
    /// Apply a validated transition functionally - returns the next record
    /// value without mutating the input. The caller (the store) is
    /// responsible for committing the result atomically.
    pub fn apply(
        &self,
        transition: &NormalizedTransition,
        actor_id: &str,
        now: DateTime<Utc>,
    ) -> WithdrawalRecord {
        let mut next = self.clone();

        next.status = transition.status;
        next.settlement_reference = transition.settlement_reference.clone();
        next.failure_reason = transition.failure_reason.clone();
        next.updated_at = now;

        if transition.status.is_terminal() && next.settled_at.is_none() {
            next.settled_at = Some(now);
        }

        next.audit_trail.push(AuditEntry {
            from_status: self.status,
            to_status: transition.status,
            actor_id: actor_id.to_string(),
            timestamp: now,
            note: transition.note.clone(),
        });

        next
    }

    /// Append a reviewer note without touching status. Legal in any state,
    /// including terminal ones. Records a from == to audit entry.
    pub fn with_note(&self, actor_id: &str, text: &str, now: DateTime<Utc>) -> WithdrawalRecord {
        let mut next = self.clone();

        next.reviewer_notes.push(ReviewerNote {
            actor_id: actor_id.to_string(),
            text: text.to_string(),
            noted_at: now,
        });
        next.audit_trail.push(AuditEntry {
            from_status: self.status,
            to_status: self.status,
            actor_id: actor_id.to_string(),
            timestamp: now,
            note: Some(text.to_string()),
        });

        next
    }

    /// Verify the evidence/status invariants. Returns the first violation.
    ///
    /// The store runs this after every commit; a violation here means a bug
    /// in the validator or apply logic, not bad user input.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        match self.status {
            WithdrawalStatus::Completed => {
                if self
                    .settlement_reference
                    .as_deref()
                    .is_none_or(|r| r.trim().is_empty())
                {
                    return Err(InvariantViolation::CompletedWithoutReference);
                }
            }
            WithdrawalStatus::Failed | WithdrawalStatus::Cancelled => {
                if self
                    .failure_reason
                    .as_deref()
                    .is_none_or(|r| r.trim().is_empty())
                {
                    return Err(InvariantViolation::TerminalWithoutReason);
                }
            }
            WithdrawalStatus::Pending | WithdrawalStatus::Processing => {
                if self.settlement_reference.is_some() || self.failure_reason.is_some() {
                    return Err(InvariantViolation::EvidenceOnNonTerminal);
                }
            }
        }

        if self.settled_at.is_some() != self.status.is_terminal() {
            return Err(InvariantViolation::SettledAtMismatch);
        }

        Ok(())
    }
}

/// Violation of a record-level invariant, detected post-commit.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum InvariantViolation {
    CompletedWithoutReference,
    TerminalWithoutReason,
    EvidenceOnNonTerminal,
    SettledAtMismatch,
}

impl Display for InvariantViolation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::CompletedWithoutReference => "completed record without settlement reference",
            Self::TerminalWithoutReason => "failed/cancelled record without failure reason",
            Self::EvidenceOnNonTerminal => "non-terminal record carrying terminal evidence",
            Self::SettledAtMismatch => "settled_at does not match terminal status",
        };
        f.write_str(msg)
    }
}
