//! Credential exchange: valid `(id, key)` in, current token out.

use crate::authority::{IssuedToken, TokenAuthority};
use crate::error::AuthError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Body of an issuance request.
#[derive(Clone, Serialize, Deserialize)]
pub struct TokenRequest {
    pub secret_id: String,
    pub secret_key: String,
}

impl fmt::Debug for TokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenRequest")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Wire shape of a successful issuance: `{access_token, expires_in}`.
pub type TokenResponse = IssuedToken;

impl TokenAuthority {
    /// Exchange credentials for the current token.
    ///
    /// Mismatched credentials leave the record untouched. Matching ones
    /// reuse the live token or mint a new one, so repeated calls inside the
    /// TTL return the same token with a non-increasing `expires_in`.
    pub fn issue(&self, candidate_id: &str, candidate_key: &str) -> Result<IssuedToken, AuthError> {
        if !self.secret().matches(candidate_id, candidate_key) {
            tracing::warn!("Token issuance rejected: credentials do not match");
            return Err(AuthError::BadCredentials);
        }
        Ok(self.issue_or_reuse())
    }

    pub fn issue_for(&self, request: &TokenRequest) -> Result<TokenResponse, AuthError> {
        self.issue(&request.secret_id, &request.secret_key)
    }
}
