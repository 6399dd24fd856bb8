use chrono::Utc;
use payout::domain::{
    validate, TransitionCommand, TransitionRejection, WithdrawalId, WithdrawalRecord,
    WithdrawalStatus,
};

fn record_with_status(status: WithdrawalStatus) -> WithdrawalRecord {
    let now = Utc::now();
    let terminal = status.is_terminal();
    WithdrawalRecord {
        id: WithdrawalId::generate(),
        owner_id: "user-1".to_string(),
        owner_display_name: "User One".to_string(),
        amount: 50.0,
        currency: "USDT".to_string(),
        method: "TRC20".to_string(),
        destination_address: "0xabc".to_string(),
        status,
        settlement_reference: (status == WithdrawalStatus::Completed).then(|| "0x1".to_string()),
        failure_reason: matches!(
            status,
            WithdrawalStatus::Failed | WithdrawalStatus::Cancelled
        )
        .then(|| "reason".to_string()),
        reviewer_notes: Vec::new(),
        created_at: now,
        updated_at: now,
        settled_at: terminal.then_some(now),
        audit_trail: Vec::new(),
    }
}

#[test]
fn test_terminal_states_reject_everything() {
    for terminal in [
        WithdrawalStatus::Completed,
        WithdrawalStatus::Failed,
        WithdrawalStatus::Cancelled,
    ] {
        let record = record_with_status(terminal);
        for target in [
            WithdrawalStatus::Pending,
            WithdrawalStatus::Processing,
            WithdrawalStatus::Completed,
            WithdrawalStatus::Failed,
            WithdrawalStatus::Cancelled,
        ] {
            let mut command = TransitionCommand::new(terminal, target, "admin-1");
            command.settlement_reference = Some("0x1".to_string());
            command.failure_reason = Some("reason".to_string());

            let result = validate(&record, &command);
            assert_eq!(result, Err(TransitionRejection::TerminalState));
        }
    }
}

#[test]
fn test_completed_requires_settlement_reference() {
    let record = record_with_status(WithdrawalStatus::Pending);

    let command = TransitionCommand::new(
        WithdrawalStatus::Pending,
        WithdrawalStatus::Completed,
        "admin-1",
    );
    assert_eq!(
        validate(&record, &command),
        Err(TransitionRejection::MissingSettlementReference)
    );

    // Whitespace is not evidence.
    let command = command.with_settlement_reference("   ");
    assert_eq!(
        validate(&record, &command),
        Err(TransitionRejection::MissingSettlementReference)
    );
}

#[test]
fn test_completed_normalizes_and_drops_stray_reason() {
    let record = record_with_status(WithdrawalStatus::Processing);

    let command = TransitionCommand::new(
        WithdrawalStatus::Processing,
        WithdrawalStatus::Completed,
        "admin-1",
    )
    .with_settlement_reference("  0xabc123  ")
    .with_failure_reason("leftover from a previous form state");

    let normalized = validate(&record, &command).expect("transition is legal");
    assert_eq!(normalized.settlement_reference.as_deref(), Some("0xabc123"));
    // Evidence not required by the target status is cleared, not stored.
    assert!(normalized.failure_reason.is_none());
}

#[test]
fn test_failed_and_cancelled_require_reason() {
    let record = record_with_status(WithdrawalStatus::Pending);

    for target in [WithdrawalStatus::Failed, WithdrawalStatus::Cancelled] {
        let command = TransitionCommand::new(WithdrawalStatus::Pending, target, "admin-1");
        assert_eq!(
            validate(&record, &command),
            Err(TransitionRejection::MissingFailureReason)
        );

        let command = command.with_failure_reason("destination rejected");
        let normalized = validate(&record, &command).expect("transition is legal");
        assert_eq!(normalized.status, target);
        assert!(normalized.settlement_reference.is_none());
    }
}

#[test]
fn test_non_terminal_targets_refuse_evidence() {
    let record = record_with_status(WithdrawalStatus::Pending);

    let command = TransitionCommand::new(
        WithdrawalStatus::Pending,
        WithdrawalStatus::Processing,
        "admin-1",
    )
    .with_failure_reason("should not be here");
    assert_eq!(
        validate(&record, &command),
        Err(TransitionRejection::EvidenceNotAllowed)
    );

    // Empty strings count as cleared.
    let mut command = TransitionCommand::new(
        WithdrawalStatus::Pending,
        WithdrawalStatus::Processing,
        "admin-1",
    );
    command.settlement_reference = Some("".to_string());
    command.failure_reason = Some("  ".to_string());
    let normalized = validate(&record, &command).expect("cleared evidence is fine");
    assert!(normalized.settlement_reference.is_none());
    assert!(normalized.failure_reason.is_none());
}

#[test]
fn test_self_transition_is_note_only() {
    let record = record_with_status(WithdrawalStatus::Processing);

    let command = TransitionCommand::new(
        WithdrawalStatus::Processing,
        WithdrawalStatus::Processing,
        "admin-1",
    )
    .with_note("still waiting on the rail");
    let normalized = validate(&record, &command).expect("note-only self-transition is legal");
    assert_eq!(normalized.status, WithdrawalStatus::Processing);
    assert_eq!(normalized.note.as_deref(), Some("still waiting on the rail"));

    let command = TransitionCommand::new(
        WithdrawalStatus::Processing,
        WithdrawalStatus::Processing,
        "admin-1",
    )
    .with_failure_reason("sneaky evidence change");
    assert_eq!(
        validate(&record, &command),
        Err(TransitionRejection::NoteOnlySelfTransition)
    );
}

#[test]
fn test_validator_has_no_side_effects() {
    let record = record_with_status(WithdrawalStatus::Pending);
    let before = serde_json::to_string(&record).unwrap();

    let command = TransitionCommand::new(
        WithdrawalStatus::Pending,
        WithdrawalStatus::Completed,
        "admin-1",
    )
    .with_settlement_reference("0x1");
    let _ = validate(&record, &command);

    assert_eq!(serde_json::to_string(&record).unwrap(), before);
}
