use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;

use crate::{
    domain::{
        CreateWithdrawal, OwnerIdentity, PageRequest, RecordFilter, RecordPage, TransitionCommand,
        TransportError, WithdrawalError, WithdrawalId, WithdrawalRecord,
    },
    port::{RequestSigner, TransitionOutcome, WithdrawalRepository},
};

/// Decorator that turns a repository into the authenticated, bounded-latency
/// boundary the orchestrators talk to.
///
/// Every logical call is signed (the envelope is what a real transport would
/// attach as headers) and wrapped in a timeout. An elapsed timeout maps to
/// `TransportError::AmbiguousOutcome`: the request may have landed, so the
/// caller must re-derive truth from a fresh fetch instead of retrying
/// blindly.
pub struct SignedGateway<R> {
    inner: Arc<R>,
    signer: Arc<dyn RequestSigner>,
    call_timeout: Duration,
}

impl<R> SignedGateway<R>
where
    R: WithdrawalRepository,
{
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

    pub fn new(inner: Arc<R>, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            inner,
            signer,
            call_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, call_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self
    }

    fn sign_payload<T: serde::Serialize>(
        &self,
        actor_id: &str,
        payload: &T,
    ) -> Result<(), WithdrawalError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| WithdrawalError::Internal(format!("payload serialization: {}", e)))?;
        let envelope = self.signer.sign(actor_id, &body)?;
        tracing::debug!(key = %envelope.key_id, actor = %envelope.actor_id,
            nonce = %envelope.nonce, "request signed");
        Ok(())
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, WithdrawalError>>,
    ) -> Result<T, WithdrawalError> {
        match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::AmbiguousOutcome.into()),
        }
    }
}

#[async_trait]
impl<R> WithdrawalRepository for SignedGateway<R>
where
    R: WithdrawalRepository,
{
    async fn fetch_by_id(&self, id: &WithdrawalId) -> Result<WithdrawalRecord, WithdrawalError> {
        self.sign_payload("anonymous", &id)?;
        self.bounded(self.inner.fetch_by_id(id)).await
    }

    async fn list(
        &self,
        filter: &RecordFilter,
        page: PageRequest,
    ) -> Result<RecordPage, WithdrawalError> {
        self.sign_payload("anonymous", &filter)?;
        self.bounded(self.inner.list(filter, page)).await
    }

    async fn create(
        &self,
        request: CreateWithdrawal,
        owner: OwnerIdentity,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        self.sign_payload(&owner.owner_id, &request)?;
        self.bounded(self.inner.create(request, owner)).await
    }

    async fn apply_transition(
        &self,
        id: &WithdrawalId,
        command: TransitionCommand,
    ) -> Result<TransitionOutcome, WithdrawalError> {
        self.sign_payload(&command.actor_id, &command)?;
        self.bounded(self.inner.apply_transition(id, command)).await
    }

    async fn append_note(
        &self,
        id: &WithdrawalId,
        actor_id: &str,
        text: &str,
    ) -> Result<WithdrawalRecord, WithdrawalError> {
        self.sign_payload(actor_id, &text)?;
        self.bounded(self.inner.append_note(id, actor_id, text)).await
    }
}
