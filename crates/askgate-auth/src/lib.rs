//! # askgate-auth
//!
//! Short-lived bearer tokens for the askgate API.
//!
//! This crate provides:
//! - A credential store holding the static `(id, key)` shared secret
//! - A token authority that mints, caches and expires a single process-wide token
//! - A bearer verifier that gates every protected call
//! - The issuance operation that exchanges credentials for the current token
//!
//! ## Token Model
//!
//! | Piece | Holds | Lifetime |
//! |-------|-------|----------|
//! | **Shared secret** | `(id, key)` from the environment | Process |
//! | **Token record** | `(token, expires_at)` | TTL, superseded on refresh |
//!
//! All callers share one token. Repeated issuance within the TTL returns the
//! same token with a shrinking `expires_in`; the first issuance after expiry
//! mints a new one. The record sits behind a single mutex, so at most one
//! refresh happens per expiry window.
//!
//! Tokens are `hex(HMAC-SHA256(key, "{id}:{unix_seconds}:{salt}"))` with a
//! 16-hex-char random salt. They are opaque to callers and only ever compared
//! for equality, in constant time.

pub mod authority;
pub mod clock;
pub mod error;
pub mod issuance;
pub mod secret;
pub mod verifier;

pub use authority::{DEFAULT_TOKEN_TTL_SECS, IssuedToken, TokenAuthority, TokenRecord};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AuthError, CredentialError};
pub use issuance::{TokenRequest, TokenResponse};
pub use secret::SharedSecret;
pub use verifier::{BEARER_SCHEME, split_authorization};
