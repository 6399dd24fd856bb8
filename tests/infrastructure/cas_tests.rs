use crate::context::*;
use payout::domain::{WithdrawalError, WithdrawalId, WithdrawalStatus};
use payout::port::{TransitionOutcome, WithdrawalRepository};

#[tokio::test]
async fn test_two_simultaneous_reviewers_exactly_one_wins() {
    let ctx = TestContext::new();
    let record = ctx.create_pending("user-1", 50.0, "USDT").await;

    // Both reviewers hold the same pending snapshot.
    let complete = to_completed(WithdrawalStatus::Pending, "0xwinner");
    let fail = to_failed(WithdrawalStatus::Pending, "suspicious destination");

    let (a, b) = tokio::join!(
        ctx.store.apply_transition(&record.id, complete),
        ctx.store.apply_transition(&record.id, fail),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    let applied = |o: &TransitionOutcome| matches!(o, TransitionOutcome::Applied(_));
    let conflicted = |o: &TransitionOutcome| matches!(o, TransitionOutcome::Conflict { .. });

    assert!(
        (applied(&a) && conflicted(&b)) || (applied(&b) && conflicted(&a)),
        "expected exactly one Applied and one Conflict, got {:?} / {:?}",
        a,
        b
    );

    // The committed record is terminal and self-consistent; one transition,
    // one audit entry.
    let committed = ctx.fetch(&record.id).await;
    assert!(committed.status.is_terminal());
    assert!(committed.check_invariants().is_ok());
    assert_eq!(committed.audit_trail.len(), 1);
}

#[tokio::test]
async fn test_loser_can_retry_after_refetch() {
    let ctx = TestContext::new();
    let record = ctx.create_pending("user-1", 50.0, "USDT").await;

    let outcome = ctx
        .transition(&record.id, to_processing(WithdrawalStatus::Pending))
        .await;
    assert!(matches!(outcome, TransitionOutcome::Applied(_)));

    // Stale expectation loses.
    let outcome = ctx
        .transition(&record.id, to_completed(WithdrawalStatus::Pending, "0x1"))
        .await;
    let current = match outcome {
        TransitionOutcome::Conflict { current } => current,
        other => panic!("expected Conflict, got {:?}", other),
    };
    assert_eq!(current, WithdrawalStatus::Processing);

    // Re-fetch, re-decide with the fresh status: now it commits.
    let fresh = ctx.fetch(&record.id).await;
    let outcome = ctx
        .transition(&record.id, to_completed(fresh.status, "0x1"))
        .await;
    assert!(matches!(outcome, TransitionOutcome::Applied(_)));
}

#[tokio::test]
async fn test_transition_on_missing_record_is_not_found() {
    let ctx = TestContext::new();

    let missing = WithdrawalId::generate();
    let result = ctx
        .store
        .apply_transition(&missing, to_processing(WithdrawalStatus::Pending))
        .await;

    assert!(matches!(result, Err(WithdrawalError::NotFound(_))));
}

#[tokio::test]
async fn test_transitions_on_different_records_proceed_independently() {
    let ctx = TestContext::new();
    let a = ctx.create_pending("alice", 10.0, "USDT").await;
    let b = ctx.create_pending("bob", 20.0, "USDT").await;

    let (ra, rb) = tokio::join!(
        ctx.store
            .apply_transition(&a.id, to_completed(WithdrawalStatus::Pending, "0xa")),
        ctx.store
            .apply_transition(&b.id, to_failed(WithdrawalStatus::Pending, "limit exceeded")),
    );

    assert!(matches!(ra.unwrap(), TransitionOutcome::Applied(_)));
    assert!(matches!(rb.unwrap(), TransitionOutcome::Applied(_)));
}
