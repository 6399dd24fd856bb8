use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Local (pre-network) validation failures on a withdrawal form.
/// Always recoverable - the user corrects input and retries.
#[derive(Error, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ValidationError {
    #[error("Amount must be positive")]
    NonPositiveAmount,
    #[error("Destination address must not be empty")]
    MissingDestination,
    #[error("Currency must be selected")]
    MissingCurrency,
    #[error("Network must be selected")]
    MissingNetwork,
    #[error("Owner identity is required")]
    MissingOwner,
}

/// Why a proposed status transition was refused.
///
/// Carries a stable machine-readable code so the API layer and tests agree
/// on exact strings regardless of the human-facing message.
#[derive(Error, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum TransitionRejection {
    #[error("Record is in a terminal state and cannot change status")]
    TerminalState,
    #[error("Completing a withdrawal requires a settlement reference")]
    MissingSettlementReference,
    #[error("Failing or cancelling a withdrawal requires a failure reason")]
    MissingFailureReason,
    #[error("Terminal evidence is not allowed on a non-terminal status")]
    EvidenceNotAllowed,
    #[error("A same-status transition may only attach a note")]
    NoteOnlySelfTransition,
}

impl TransitionRejection {
    pub fn code(&self) -> &'static str {
        match self {
            Self::TerminalState => "TERMINAL_STATE",
            Self::MissingSettlementReference => "MISSING_SETTLEMENT_REFERENCE",
            Self::MissingFailureReason => "MISSING_FAILURE_REASON",
            Self::EvidenceNotAllowed => "EVIDENCE_NOT_ALLOWED",
            Self::NoteOnlySelfTransition => "NOTE_ONLY_SELF_TRANSITION",
        }
    }
}

/// Transport-level failures. `AmbiguousOutcome` is the one the orchestrators
/// must treat specially: the request may have landed, so the caller re-reads
/// ground truth instead of retrying blindly.
#[derive(Error, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum TransportError {
    #[error("Service unreachable - the request was never sent")]
    Unreachable,
    #[error("Timed out awaiting a response - outcome unknown")]
    AmbiguousOutcome,
    #[error("Malformed response from server: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum WithdrawalError {
    Validation(ValidationError),
    Transition(TransitionRejection),
    Transport(TransportError),
    NotFound(String),
    Internal(String),
}

impl Display for WithdrawalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalError::Validation(e) => e.fmt(f),
            WithdrawalError::Transition(e) => e.fmt(f),
            WithdrawalError::Transport(e) => e.fmt(f),
            WithdrawalError::NotFound(id) => write!(f, "Withdrawal not found: {}", id),
            WithdrawalError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl From<ValidationError> for WithdrawalError {
    fn from(e: ValidationError) -> Self {
        WithdrawalError::Validation(e)
    }
}

impl From<TransitionRejection> for WithdrawalError {
    fn from(e: TransitionRejection) -> Self {
        WithdrawalError::Transition(e)
    }
}

impl From<TransportError> for WithdrawalError {
    fn from(e: TransportError) -> Self {
        WithdrawalError::Transport(e)
    }
}
