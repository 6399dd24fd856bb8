use serde::{Deserialize, Serialize};

use crate::domain::WithdrawalError;

/// Opaque authentication envelope attached to every outbound call.
/// The signing scheme itself is external; this core only carries the result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedEnvelope {
    pub key_id: String,
    pub actor_id: String,
    pub nonce: String,
    pub signature: String,
}

/// Produces the authentication envelope for a serialized request payload.
///
/// Synchronous by design: signing is local key material work, not I/O.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, actor_id: &str, payload: &str) -> Result<SignedEnvelope, WithdrawalError>;
}
