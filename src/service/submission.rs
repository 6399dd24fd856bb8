use std::sync::Arc;

use crate::{
    domain::{
        CreateWithdrawal, OwnerIdentity, TransportError, ValidationError, WithdrawalError,
        WithdrawalId,
    },
    port::WithdrawalRepository,
};

/// Where the submission flow currently is. One orchestrator instance drives
/// exactly one form through confirmation -> processing -> result.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SubmissionPhase {
    /// Form filled in, waiting for the user to confirm.
    Confirming,
    /// One request is in flight. A re-entrant confirm is a no-op.
    Processing,
    /// Finished, one way or another.
    Result(SubmissionOutcome),
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum SubmissionOutcome {
    /// The record was created and is pending review.
    Created { id: WithdrawalId },
    /// The request definitively failed; safe to correct and retry.
    Failed(WithdrawalError),
    /// The response was lost after the request may have landed. Retrying
    /// could double-submit, so the user is told to check their history.
    Unknown,
}

/// Client-side coordinator for one withdrawal form.
///
/// Serialized by construction: `confirm` takes `&mut self`, and the
/// Processing phase guard means a form instance can never have two requests
/// in flight.
pub struct SubmissionOrchestrator {
    gateway: Arc<dyn WithdrawalRepository>,
    owner: OwnerIdentity,
    form: CreateWithdrawal,
    phase: SubmissionPhase,
}

impl SubmissionOrchestrator {
    /// Build the orchestrator for a locally-validated form. Validation
    /// failures are reported synchronously and never reach the network.
    pub fn new(
        gateway: Arc<dyn WithdrawalRepository>,
        owner: OwnerIdentity,
        form: CreateWithdrawal,
    ) -> Result<Self, ValidationError> {
        form.validate()?;
        owner.validate()?;

        Ok(Self {
            gateway,
            owner,
            form,
            phase: SubmissionPhase::Confirming,
        })
    }

    pub fn phase(&self) -> &SubmissionPhase {
        &self.phase
    }

    /// Confirm the form and issue exactly one create request.
    ///
    /// Re-entrant calls while a request is in flight, and calls after a
    /// result is already in, return the current phase without issuing
    /// anything.
    pub async fn confirm(&mut self) -> SubmissionPhase {
        match self.phase {
            SubmissionPhase::Confirming => {}
            SubmissionPhase::Processing | SubmissionPhase::Result(_) => {
                return self.phase.clone();
            }
        }

        self.phase = SubmissionPhase::Processing;

        let outcome = match self
            .gateway
            .create(self.form.clone(), self.owner.clone())
            .await
        {
            Ok(record) => {
                tracing::info!(id = %record.id, owner = %record.owner_id,
                    "withdrawal submitted");
                SubmissionOutcome::Created { id: record.id }
            }
            Err(WithdrawalError::Transport(TransportError::AmbiguousOutcome)) => {
                // The request may have landed but the response was lost.
                // Do not retry: surface "check your history" instead.
                tracing::warn!(owner = %self.owner.owner_id,
                    "submission outcome unknown - response lost");
                SubmissionOutcome::Unknown
            }
            Err(e) => {
                tracing::warn!(owner = %self.owner.owner_id, error = %e,
                    "submission failed");
                SubmissionOutcome::Failed(e)
            }
        };

        self.phase = SubmissionPhase::Result(outcome);
        self.phase.clone()
    }
}
