//! The shared secret pair that authorizes token issuance.

use crate::error::CredentialError;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;

pub(crate) type HmacSha256 = Hmac<Sha256>;

/// Immutable `(id, key)` pair loaded at startup.
///
/// The id is mixed into every token message; the key signs it. Candidate
/// credentials are only ever compared against this pair.
#[derive(Clone)]
pub struct SharedSecret {
    id: String,
    key: String,
    signer: HmacSha256,
}

impl SharedSecret {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Result<Self, CredentialError> {
        let id = id.into();
        let key = key.into();
        if id.is_empty() {
            return Err(CredentialError::Empty("id"));
        }
        if key.is_empty() {
            return Err(CredentialError::Empty("key"));
        }
        let signer = HmacSha256::new_from_slice(key.as_bytes())
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))?;
        Ok(Self { id, key, signer })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Constant-time check of a candidate pair.
    ///
    /// Both halves are hashed to a fixed width first so that neither the
    /// position of a mismatch nor the candidate length shows up in timing.
    /// Both comparisons always run.
    pub fn matches(&self, candidate_id: &str, candidate_key: &str) -> bool {
        let id_eq = digest(candidate_id).ct_eq(&digest(&self.id));
        let key_eq = digest(candidate_key).ct_eq(&digest(&self.key));
        (id_eq & key_eq).into()
    }

    /// Lowercase hex HMAC-SHA256 of `message` under the shared key.
    pub(crate) fn sign(&self, message: &[u8]) -> String {
        let mut mac = self.signer.clone();
        mac.update(message);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSecret")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}
