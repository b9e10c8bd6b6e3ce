//! Error types for token issuance and verification.

use thiserror::Error;

/// Rejections produced by issuance and verification.
///
/// All variants are client-facing and reported synchronously; nothing in this
/// crate retries on the caller's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Issuance credentials do not match the shared secret.
    #[error("Invalid credentials")]
    BadCredentials,

    /// No token has been issued yet in this process.
    #[error("Token not initialized or missing")]
    NotInitialized,

    /// The current token has passed its expiry.
    #[error("Token has expired")]
    Expired,

    /// Wrong scheme, or a token that does not match the current one.
    #[error("Invalid or missing token")]
    Invalid,
}

impl AuthError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::BadCredentials => "BAD_CREDENTIALS",
            AuthError::NotInitialized => "NOT_INITIALIZED",
            AuthError::Expired => "EXPIRED",
            AuthError::Invalid => "INVALID_TOKEN",
        }
    }

    /// Whether the caller can recover by issuing a token with the
    /// credentials it already has.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AuthError::NotInitialized | AuthError::Expired)
    }
}

/// Errors building the credential store.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// A required secret value is empty.
    #[error("shared secret {0} must not be empty")]
    Empty(&'static str),

    /// The key cannot be used as an HMAC key.
    #[error("invalid signing key: {0}")]
    InvalidKey(String),
}
