use async_trait::async_trait;

use crate::domain::{AuditEntry, WithdrawalError, WithdrawalId};

/// Sink for committed audit entries.
///
/// The store writes the entry into the record's own trail under its lock and
/// then hands a copy to this appender, so external compliance storage sees
/// exactly the committed history in commit order. Implementations can use an
/// in-memory log, a database table, an append-only file, etc.
#[async_trait]
pub trait AuditTrailAppender: Send + Sync {
    async fn append(&self, id: &WithdrawalId, entry: &AuditEntry) -> Result<(), WithdrawalError>;
}
