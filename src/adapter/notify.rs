use async_trait::async_trait;

use crate::{
    domain::{WithdrawalError, WithdrawalRecord},
    port::NotificationGateway,
};

/// Notification gateway that logs instead of sending. Delivery content and
/// transport are external collaborators; this adapter stands in for them in
/// the binary and in local runs.
pub struct TracingNotificationGateway;

#[async_trait]
impl NotificationGateway for TracingNotificationGateway {
    async fn withdrawal_submitted(
        &self,
        record: &WithdrawalRecord,
    ) -> Result<(), WithdrawalError> {
        tracing::info!(id = %record.id, owner = %record.owner_id,
            amount = record.amount, currency = %record.currency,
            "notify: withdrawal submitted");
        Ok(())
    }

    async fn withdrawal_settled(&self, record: &WithdrawalRecord) -> Result<(), WithdrawalError> {
        tracing::info!(id = %record.id, owner = %record.owner_id,
            status = %record.status, "notify: withdrawal settled");
        Ok(())
    }
}
