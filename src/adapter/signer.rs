use rand::RngCore;

use crate::{
    domain::WithdrawalError,
    port::{RequestSigner, SignedEnvelope},
};

/// Assembles the opaque request envelope from local key material.
///
/// This is deliberately not a cryptographic implementation - the real
/// signing scheme is an already-trusted external module. The envelope shape
/// (key id, actor, nonce, payload digest) is what the rest of the system
/// depends on.
pub struct KeyedSigner {
    key_id: String,
    secret: String,
}

impl KeyedSigner {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }

    fn digest(&self, payload: &str) -> String {
        // Stand-in digest: stable per (secret, payload), good enough to
        // exercise the envelope plumbing.
        let mut acc: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in self.secret.bytes().chain(payload.bytes()) {
            acc ^= u64::from(byte);
            acc = acc.wrapping_mul(0x0000_0100_0000_01b3);
        }
        format!("{:016x}", acc)
    }
}

impl RequestSigner for KeyedSigner {
    fn sign(&self, actor_id: &str, payload: &str) -> Result<SignedEnvelope, WithdrawalError> {
        let mut nonce_bytes = [0u8; 8];
        rand::rng().fill_bytes(&mut nonce_bytes);
        let nonce = format!("{:016x}", u64::from_be_bytes(nonce_bytes));

        let signature = self.digest(&format!("{}:{}:{}", actor_id, nonce, payload));

        Ok(SignedEnvelope {
            key_id: self.key_id.clone(),
            actor_id: actor_id.to_string(),
            nonce,
            signature,
        })
    }
}
