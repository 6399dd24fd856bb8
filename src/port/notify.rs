use async_trait::async_trait;

use crate::domain::{WithdrawalError, WithdrawalRecord};

/// Outbound notification boundary - consumed, not implemented, by this core.
///
/// Message content and delivery (email templates, push, etc.) live behind
/// this trait. Failures here must never roll back a committed transition;
/// callers log and continue.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    /// The owner's withdrawal was accepted and is now pending review.
    async fn withdrawal_submitted(&self, record: &WithdrawalRecord)
        -> Result<(), WithdrawalError>;

    /// The record reached a terminal state; tell the owner the outcome.
    async fn withdrawal_settled(&self, record: &WithdrawalRecord) -> Result<(), WithdrawalError>;
}
