use std::sync::Arc;
use std::time::Duration;

use crate::context::*;
use payout::adapter::{KeyedSigner, SignedGateway};
use payout::domain::{TransportError, WithdrawalError, WithdrawalStatus};
use payout::port::{RequestSigner, TransitionOutcome, WithdrawalRepository};
use payout::service::boot;

#[tokio::test]
async fn test_full_flow_through_the_signed_gateway() {
    let system = boot("test-key", "test-secret");

    let record = system
        .gateway
        .create(form(40.0, "ETH"), identity("user-1"))
        .await
        .unwrap();
    assert_eq!(record.status, WithdrawalStatus::Pending);

    let outcome = system
        .gateway
        .apply_transition(&record.id, to_completed(WithdrawalStatus::Pending, "0xgw"))
        .await
        .unwrap();
    assert!(matches!(outcome, TransitionOutcome::Applied(_)));

    // The audit sink saw the commit even through the decorator.
    assert_eq!(system.audit_log.entries_for(&record.id).await.len(), 1);
}

#[tokio::test]
async fn test_elapsed_timeout_surfaces_ambiguous_outcome() {
    // A store this slow can only mean the response was lost.
    let ctx = TestContext::new();
    let slow = Arc::new(SlowRepository { inner: ctx.repo() });
    let gateway = SignedGateway::new(slow, Arc::new(KeyedSigner::new("k", "s")))
        .with_timeout(Duration::from_millis(10));

    let result = gateway.create(form(40.0, "ETH"), identity("user-1")).await;
    assert!(matches!(
        result,
        Err(WithdrawalError::Transport(TransportError::AmbiguousOutcome))
    ));
}

#[tokio::test]
async fn test_signer_produces_distinct_nonces() {
    let signer = KeyedSigner::new("key-1", "secret");

    let a = signer.sign("admin-1", "{\"x\":1}").unwrap();
    let b = signer.sign("admin-1", "{\"x\":1}").unwrap();

    assert_eq!(a.key_id, "key-1");
    assert_eq!(a.actor_id, "admin-1");
    assert_ne!(a.nonce, b.nonce);
}

/// Repository whose calls stall past any reasonable timeout.
struct SlowRepository {
    inner: Arc<dyn WithdrawalRepository>,
}

#[async_trait::async_trait]
impl WithdrawalRepository for SlowRepository {
    async fn fetch_by_id(
        &self,
        id: &payout::domain::WithdrawalId,
    ) -> Result<payout::domain::WithdrawalRecord, WithdrawalError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.inner.fetch_by_id(id).await
    }

    async fn list(
        &self,
        filter: &payout::domain::RecordFilter,
        page: payout::domain::PageRequest,
    ) -> Result<payout::domain::RecordPage, WithdrawalError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.inner.list(filter, page).await
    }

    async fn create(
        &self,
        request: payout::domain::CreateWithdrawal,
        owner: payout::domain::OwnerIdentity,
    ) -> Result<payout::domain::WithdrawalRecord, WithdrawalError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.inner.create(request, owner).await
    }

    async fn apply_transition(
        &self,
        id: &payout::domain::WithdrawalId,
        command: payout::domain::TransitionCommand,
    ) -> Result<TransitionOutcome, WithdrawalError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.inner.apply_transition(id, command).await
    }

    async fn append_note(
        &self,
        id: &payout::domain::WithdrawalId,
        actor_id: &str,
        text: &str,
    ) -> Result<payout::domain::WithdrawalRecord, WithdrawalError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        self.inner.append_note(id, actor_id, text).await
    }
}
