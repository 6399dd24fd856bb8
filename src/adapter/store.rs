use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    domain::{
        self, CreateWithdrawal, OwnerIdentity, PageRequest, RecordFilter, RecordPage,
        StatusSummary, TransitionCommand, WithdrawalError, WithdrawalId, WithdrawalRecord,
        WithdrawalStatus,
    },
    port::{AuditTrailAppender, NotificationGateway, TransitionOutcome, WithdrawalRepository},
};

struct StoreData {
    /// id -> record. Records are never removed.
    records: HashMap<WithdrawalId, WithdrawalRecord>,
    /// Creation order, for stable listing.
    insertion_order: Vec<WithdrawalId>,
}

/// In-memory withdrawal store.
///
/// All mutation happens under a single write lock, which is what makes
/// `apply_transition` a true compare-and-set: the status comparison, the
/// validator run, the record replacement and the audit append are one
/// critical section. Post-commit hooks (audit sink, notifications) run
/// after the lock is released, in commit order.
pub struct InMemoryWithdrawalStore {
    data: Arc<RwLock<StoreData>>,
    audit: Arc<dyn AuditTrailAppender>,
    notifier: Arc<dyn NotificationGateway>,
}

impl InMemoryWithdrawalStore {
    pub fn new(audit: Arc<dyn AuditTrailAppender>, notifier: Arc<dyn NotificationGateway>) -> Self {
        Self {
            data: Arc::new(RwLock::new(StoreData {
                records: HashMap::new(),
                insertion_order: Vec::new(),
            })),
            audit,
            notifier,
        }
    }

    async fn forward_audit(&self, record: &WithdrawalRecord) {
        // The entry was already committed into the record's trail; the sink
        // is a compliance copy. Sink failures are logged, never propagated.
        if let Some(entry) = record.audit_trail.last() {
            if let Err(e) = self.audit.append(&record.id, entry).await {
                tracing::error!(id = %record.id, error = %e, "audit sink append failed");
            }
        }
    }
}

#[async_trait]
impl WithdrawalRepository for InMemoryWithdrawalStore {
    async fn fetch_by_id(&self, id: &WithdrawalId) -> Result<WithdrawalRecord, WithdrawalError> {
        let data = self.data.read().await;
        data.records
            .get(id)
            .cloned()
            .ok_or_else(|| WithdrawalError::NotFound(id.to_string()))
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<RecordPage, WithdrawalError> {
        let data = self.data.read().await;

        let mut summary = StatusSummary::default();
        let matching: Vec<&WithdrawalRecord> = data
            .insertion_order
            .iter()
            .filter_map(|id| data.records.get(id))
            .filter(|r| filter.matches(r))
            .inspect(|r| summary.tally(r.status))
            .collect();

        let total_matching = matching.len();
        let records = matching
            .into_iter()
            .skip(page.offset())
            .take(page.limit)
            .cloned()
            .collect();

        Ok(RecordPage {
            records,
            page: page.page,
            limit: page.limit,
            total_matching,
            summary,
        })
    }

    async fn create(
        &self,
        request: CreateWithdrawal,
        owner: OwnerIdentity,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        // Server-side validation: defense in depth against clients that
        // skipped the form checks.
        request.validate()?;
        owner.validate()?;

        let now = Utc::now();
        let record = WithdrawalRecord {
            id: WithdrawalId::generate(),
            owner_id: owner.owner_id,
            owner_display_name: owner.display_name,
            amount: request.amount,
            currency: request.currency.trim().to_string(),
            method: request.network.trim().to_string(),
            destination_address: request.destination_address.trim().to_string(),
            status: WithdrawalStatus::Pending,
            settlement_reference: None,
            failure_reason: None,
            reviewer_notes: Vec::new(),
            created_at: now,
            updated_at: now,
            settled_at: None,
            audit_trail: Vec::new(),
        };

        {
            let mut data = self.data.write().await;
            data.insertion_order.push(record.id.clone());
            data.records.insert(record.id.clone(), record.clone());
        }

        tracing::info!(id = %record.id, owner = %record.owner_id, amount = record.amount,
            currency = %record.currency, "withdrawal created");

        if let Err(e) = self.notifier.withdrawal_submitted(&record).await {
            tracing::warn!(id = %record.id, error = %e, "submission notification failed");
        }

        Ok(record)
    }

    async fn apply_transition(
        &self,
        id: &WithdrawalId,
        command: TransitionCommand,
    ) -> Result<TransitionOutcome, WithdrawalError> {
        let committed = {
            let mut data = self.data.write().await;

            let current = data
                .records
                .get(id)
                .ok_or_else(|| WithdrawalError::NotFound(id.to_string()))?;

            // Compare-and-set: exactly one of two racing reviewers with the
            // same expectation can pass this check, because the lock is held
            // through the record replacement below.
            if current.status != command.expected_current_status {
                tracing::warn!(id = %id, expected = %command.expected_current_status,
                    actual = %current.status, actor = %command.actor_id,
                    "transition conflict");
                return Ok(TransitionOutcome::Conflict {
                    current: current.status,
                });
            }

            let normalized = match domain::validate(current, &command) {
                Ok(n) => n,
                Err(rejection) => return Ok(TransitionOutcome::Rejected(rejection)),
            };

            let next = current.apply(&normalized, &command.actor_id, Utc::now());
            if let Err(violation) = next.check_invariants() {
                // Validator and apply disagree - refuse to commit.
                return Err(WithdrawalError::Internal(violation.to_string()));
            }

            data.records.insert(id.clone(), next.clone());
            next
        };

        tracing::info!(id = %id, from = %command.expected_current_status,
            to = %committed.status, actor = %command.actor_id, "transition committed");

        self.forward_audit(&committed).await;

        if committed.status.is_terminal() {
            if let Err(e) = self.notifier.withdrawal_settled(&committed).await {
                tracing::warn!(id = %id, error = %e, "settlement notification failed");
            }
        }

        Ok(TransitionOutcome::Applied(committed))
    }

    async fn append_note(
        &self,
        id: &WithdrawalId,
        actor_id: &str,
        text: &str,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        if text.trim().is_empty() {
            return Err(WithdrawalError::Internal(
                "reviewer note must not be empty".to_string(),
            ));
        }

        let committed = {
            let mut data = self.data.write().await;

            let current = data
                .records
                .get(id)
                .ok_or_else(|| WithdrawalError::NotFound(id.to_string()))?;

            let next = current.with_note(actor_id, text.trim(), Utc::now());
            data.records.insert(id.clone(), next.clone());
            next
        };

        self.forward_audit(&committed).await;

        Ok(committed)
    }
}
