use std::sync::Arc;

use crate::{
    adapter::{InMemoryAuditLog, InMemoryWithdrawalStore, KeyedSigner, SignedGateway,
        TracingNotificationGateway},
    port::WithdrawalRepository,
};

/// Wired infrastructure handles.
pub struct System {
    pub gateway: Arc<dyn WithdrawalRepository>,
    pub audit_log: Arc<InMemoryAuditLog>,
}

/// Set up the withdrawal system:
/// - InMemoryWithdrawalStore (compare-and-set persistence)
/// - InMemoryAuditLog (compliance copy of every committed entry)
/// - TracingNotificationGateway (logs instead of emailing)
/// - SignedGateway (auth envelope + bounded timeout in front of the store)
///
/// Orchestrators talk to the returned gateway only.
pub fn boot(signing_key_id: &str, signing_secret: &str) -> System {
    let audit_log = Arc::new(InMemoryAuditLog::new());
    let store = Arc::new(InMemoryWithdrawalStore::new(
        audit_log.clone(),
        Arc::new(TracingNotificationGateway),
    ));
    let signer = Arc::new(KeyedSigner::new(signing_key_id, signing_secret));
    let gateway: Arc<dyn WithdrawalRepository> = Arc::new(SignedGateway::new(store, signer));

    tracing::info!("withdrawal system initialized");

    System { gateway, audit_log }
}
