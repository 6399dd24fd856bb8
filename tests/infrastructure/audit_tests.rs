use crate::assert_applied;
use crate::context::*;
use payout::domain::WithdrawalStatus;
use payout::port::WithdrawalRepository;

#[tokio::test]
async fn test_audit_trail_length_tracks_committed_transitions() {
    let ctx = TestContext::new();
    let record = ctx.create_pending("user-1", 50.0, "USDT").await;

    assert_applied!(
        ctx.transition(&record.id, to_processing(WithdrawalStatus::Pending))
            .await
    );
    assert_applied!(
        ctx.transition(&record.id, to_completed(WithdrawalStatus::Processing, "0x1"))
            .await
    );

    let committed = ctx.fetch(&record.id).await;
    assert_eq!(committed.audit_trail.len(), 2);

    // The sink received exactly the committed entries, in commit order.
    let sink = ctx.audit_log.entries_for(&record.id).await;
    assert_eq!(sink.len(), 2);
    assert_eq!(sink[0].to_status, WithdrawalStatus::Processing);
    assert_eq!(sink[1].to_status, WithdrawalStatus::Completed);
    assert_eq!(ctx.audit_log.len().await, 2);
}

#[tokio::test]
async fn test_rejected_transitions_leave_no_audit_entry() {
    let ctx = TestContext::new();
    let record = ctx.create_pending("user-1", 50.0, "USDT").await;

    // Missing settlement reference - rejected, nothing committed.
    let command = payout::domain::TransitionCommand::new(
        WithdrawalStatus::Pending,
        WithdrawalStatus::Completed,
        "admin-1",
    );
    ctx.transition(&record.id, command).await;

    assert!(ctx.audit_log.is_empty().await);
    assert!(ctx.fetch(&record.id).await.audit_trail.is_empty());
}

#[tokio::test]
async fn test_existing_entries_never_change() {
    let ctx = TestContext::new();
    let record = ctx.create_pending("user-1", 50.0, "USDT").await;

    assert_applied!(
        ctx.transition(&record.id, to_processing(WithdrawalStatus::Pending))
            .await
    );
    let first_snapshot =
        serde_json::to_string(&ctx.fetch(&record.id).await.audit_trail[0]).unwrap();

    assert_applied!(
        ctx.transition(
            &record.id,
            to_cancelled(WithdrawalStatus::Processing, "owner asked to cancel")
        )
        .await
    );
    let noted = ctx
        .store
        .append_note(&record.id, "admin-2", "refund confirmed")
        .await
        .unwrap();

    // Trail grew monotonically and the first entry is byte-identical.
    assert_eq!(noted.audit_trail.len(), 3);
    assert_eq!(
        serde_json::to_string(&noted.audit_trail[0]).unwrap(),
        first_snapshot
    );
}

#[tokio::test]
async fn test_note_appends_reach_the_sink() {
    let ctx = TestContext::new();
    let record = ctx.create_pending("user-1", 50.0, "USDT").await;

    ctx.store
        .append_note(&record.id, "admin-1", "kyc re-checked")
        .await
        .unwrap();

    let sink = ctx.audit_log.entries_for(&record.id).await;
    assert_eq!(sink.len(), 1);
    assert_eq!(sink[0].from_status, sink[0].to_status);
    assert_eq!(sink[0].note.as_deref(), Some("kyc re-checked"));
}
