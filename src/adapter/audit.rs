use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    domain::{AuditEntry, WithdrawalError, WithdrawalId},
    port::AuditTrailAppender,
};

struct AuditLogData {
    /// Every committed entry, in arrival order.
    entries: Vec<(WithdrawalId, AuditEntry)>,
    /// Per-record index for queries.
    by_record: HashMap<WithdrawalId, Vec<AuditEntry>>,
}

/// In-memory audit sink. Append-only: nothing is ever edited or removed.
pub struct InMemoryAuditLog {
    data: Arc<RwLock<AuditLogData>>,
}

impl InMemoryAuditLog {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(AuditLogData {
                entries: Vec::new(),
                by_record: HashMap::new(),
            })),
        }
    }

    /// Entries for one record, in commit order.
    pub async fn entries_for(&self, id: &WithdrawalId) -> Vec<AuditEntry> {
        let data = self.data.read().await;
        data.by_record.get(id).cloned().unwrap_or_default()
    }

    /// Total committed entries across all records.
    pub async fn len(&self) -> usize {
        self.data.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuditTrailAppender for InMemoryAuditLog {
    async fn append(&self, id: &WithdrawalId, entry: &AuditEntry) -> Result<(), WithdrawalError> {
        let mut data = self.data.write().await;
        data.entries.push((id.clone(), entry.clone()));
        data.by_record
            .entry(id.clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }
}
