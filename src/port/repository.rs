use async_trait::async_trait;

use crate::domain::{
    CreateWithdrawal, OwnerIdentity, PageRequest, RecordFilter, RecordPage, TransitionCommand,
    TransitionRejection, WithdrawalError, WithdrawalId, WithdrawalRecord, WithdrawalStatus,
};

/// Result of a compare-and-set transition attempt.
///
/// `Conflict` and `Rejected` are expected outcomes the caller must present,
/// not transport failures, so they live in the Ok branch of the port result.
#[derive(Debug, Clone)]
pub enum TransitionOutcome {
    /// The transition committed; this is the authoritative updated record.
    Applied(WithdrawalRecord),
    /// The stored status no longer matched `expected_current_status`.
    /// Another actor won; re-fetch before deciding again.
    Conflict { current: WithdrawalStatus },
    /// The transition is illegal for the record's current state.
    Rejected(TransitionRejection),
}

/// Persistence boundary for withdrawal records.
///
/// This is the only place concurrent actors can race; `apply_transition`
/// must be atomic at the storage layer. Both orchestrators consume this
/// trait and nothing else mutates a record's status.
#[async_trait]
pub trait WithdrawalRepository: Send + Sync {
    /// Fetch a single record with its full audit trail.
    async fn fetch_by_id(&self, id: &WithdrawalId) -> Result<WithdrawalRecord, WithdrawalError>;

    /// Paginated list with per-status summary counts over the filtered set.
    async fn list(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<RecordPage, WithdrawalError>;

    /// Create a new withdrawal. Always produces a `pending` record.
    async fn create(
        &self,
        request: CreateWithdrawal,
        owner: OwnerIdentity,
    ) -> Result<WithdrawalRecord, WithdrawalError>;

    /// Apply a status transition if and only if the stored status still
    /// equals `command.expected_current_status` at commit time.
    ///
    /// The status change and its audit entry commit together or not at all.
    async fn apply_transition(
        &self,
        id: &WithdrawalId,
        command: TransitionCommand,
    ) -> Result<TransitionOutcome, WithdrawalError>;

    /// Append a reviewer note without changing status. Legal on terminal
    /// records too.
    async fn append_note(
        &self,
        id: &WithdrawalId,
        actor_id: &str,
        text: &str,
    ) -> Result<WithdrawalRecord, WithdrawalError>;
}
