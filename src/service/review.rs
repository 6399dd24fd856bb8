use std::sync::Arc;

use crate::{
    domain::{
        self, TransitionCommand, TransitionRejection, WithdrawalError, WithdrawalId,
        WithdrawalRecord, WithdrawalStatus,
    },
    port::{TransitionOutcome, WithdrawalRepository},
};

/// The administrator's working copy of the transition form, seeded from the
/// fetched record so unrelated fields are not accidentally cleared.
#[derive(Debug, Clone, Default)]
pub struct ReviewForm {
    pub target_status: Option<WithdrawalStatus>,
    pub settlement_reference: Option<String>,
    pub failure_reason: Option<String>,
    pub note: Option<String>,
}

/// What happened when the administrator's decision was submitted.
#[derive(Debug, Clone)]
pub enum ReviewOutcome {
    /// Committed; the local record is now the server's authoritative copy
    /// and any list view containing it should refresh.
    Applied,
    /// Another actor changed the record first. `current` is the freshly
    /// re-fetched truth, already adopted locally; re-decide from there.
    Conflict { current: WithdrawalStatus },
    /// The server refused the transition. If local validation passed, this
    /// firing is a bug signal (stale client or rule drift).
    RejectedByServer(TransitionRejection),
}

/// Administrator-side coordinator for one record under review.
///
/// Local pre-validation runs the same pure rules the store enforces, so the
/// specific missing-field error surfaces without a network round trip.
pub struct ReviewOrchestrator {
    gateway: Arc<dyn WithdrawalRepository>,
    actor_id: String,
    record: Option<WithdrawalRecord>,
    form: ReviewForm,
    proposal: Option<TransitionCommand>,
    /// Latest-wins guard: a fetch result is only adopted if no newer fetch
    /// was issued while it was in flight.
    fetch_generation: u64,
    needs_list_refresh: bool,
}

impl ReviewOrchestrator {
    pub fn new(gateway: Arc<dyn WithdrawalRepository>, actor_id: impl Into<String>) -> Self {
        Self {
            gateway,
            actor_id: actor_id.into(),
            record: None,
            form: ReviewForm::default(),
            proposal: None,
            fetch_generation: 0,
            needs_list_refresh: false,
        }
    }

    pub fn record(&self) -> Option<&WithdrawalRecord> {
        self.record.as_ref()
    }

    pub fn form(&self) -> &ReviewForm {
        &self.form
    }

    /// True once a committed transition made any cached list stale; reading
    /// it clears the flag.
    pub fn take_list_refresh(&mut self) -> bool {
        std::mem::take(&mut self.needs_list_refresh)
    }

    /// Fetch the record and seed the form from it.
    ///
    /// If a newer `open` was issued while this fetch was in flight, the
    /// stale result is discarded rather than overwriting the newer state.
    pub async fn open(&mut self, id: &WithdrawalId) -> Result<(), WithdrawalError> {
        self.fetch_generation += 1;
        let generation = self.fetch_generation;

        let fetched = self.gateway.fetch_by_id(id).await?;

        if generation != self.fetch_generation {
            tracing::debug!(id = %id, "discarding superseded fetch result");
            return Ok(());
        }

        self.adopt(fetched);
        Ok(())
    }

    /// Replace local truth with a server copy and re-seed the form.
    fn adopt(&mut self, record: WithdrawalRecord) {
        self.form = ReviewForm {
            target_status: Some(record.status),
            settlement_reference: record.settlement_reference.clone(),
            failure_reason: record.failure_reason.clone(),
            note: None,
        };
        self.proposal = None;
        self.record = Some(record);
    }

    /// Run the transition rules locally against the fetched record. On
    /// success the normalized proposal is staged for `confirm_and_submit`;
    /// on rejection the specific missing-field error is returned and nothing
    /// contacts the server.
    pub fn propose_transition(
        &mut self,
        target: WithdrawalStatus,
        form: ReviewForm,
    ) -> Result<(), WithdrawalError> {
        let record = self
            .record
            .as_ref()
            .ok_or_else(|| WithdrawalError::Internal("no record open for review".to_string()))?;

        let mut command = TransitionCommand::new(record.status, target, self.actor_id.clone());
        command.settlement_reference = form.settlement_reference.clone();
        command.failure_reason = form.failure_reason.clone();
        command.note = form.note.clone();

        domain::validate(record, &command)?;

        self.form = ReviewForm {
            target_status: Some(target),
            ..form
        };
        self.proposal = Some(command);
        Ok(())
    }

    /// Submit the staged proposal and reconcile local state with the
    /// server's answer.
    pub async fn confirm_and_submit(&mut self) -> Result<ReviewOutcome, WithdrawalError> {
        let record_id = self
            .record
            .as_ref()
            .map(|r| r.id.clone())
            .ok_or_else(|| WithdrawalError::Internal("no record open for review".to_string()))?;
        let command = self
            .proposal
            .clone()
            .ok_or_else(|| WithdrawalError::Internal("no staged transition".to_string()))?;

        match self.gateway.apply_transition(&record_id, command).await? {
            TransitionOutcome::Applied(updated) => {
                // Adopt the server's authoritative copy, not a local merge.
                self.adopt(updated);
                self.needs_list_refresh = true;
                Ok(ReviewOutcome::Applied)
            }
            TransitionOutcome::Conflict { current } => {
                tracing::warn!(id = %record_id, current = %current,
                    "another actor already changed this record");
                // Show current truth instead of silently retrying with
                // stale assumptions.
                let fresh = self.gateway.fetch_by_id(&record_id).await?;
                self.adopt(fresh);
                Ok(ReviewOutcome::Conflict { current })
            }
            TransitionOutcome::Rejected(rejection) => {
                tracing::error!(id = %record_id, code = rejection.code(),
                    "server rejected a locally-validated transition");
                self.proposal = None;
                Ok(ReviewOutcome::RejectedByServer(rejection))
            }
        }
    }

    /// Attach a reviewer note without changing status. Works on terminal
    /// records as well.
    pub async fn append_note(&mut self, text: &str) -> Result<(), WithdrawalError> {
        let record_id = self
            .record
            .as_ref()
            .map(|r| r.id.clone())
            .ok_or_else(|| WithdrawalError::Internal("no record open for review".to_string()))?;

        let updated = self
            .gateway
            .append_note(&record_id, &self.actor_id, text)
            .await?;
        self.adopt(updated);
        Ok(())
    }
}
