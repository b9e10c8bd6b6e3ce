//! Bearer verification, run before every protected operation.

use crate::authority::TokenAuthority;
use crate::error::AuthError;
use subtle::ConstantTimeEq;

/// The only accepted authorization scheme. Matched case-sensitively.
pub const BEARER_SCHEME: &str = "Bearer";

/// Split an `Authorization` header value into `(scheme, credentials)`.
///
/// The split happens at the first whitespace; a value with no credentials
/// yields an empty token.
pub fn split_authorization(value: &str) -> (&str, &str) {
    let value = value.trim();
    match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) => (scheme, rest.trim()),
        None => (value, ""),
    }
}

impl TokenAuthority {
    /// Check a presented scheme and token against the current record.
    ///
    /// Precedence: no record yet, then expiry, then scheme/token mismatch.
    /// Read-only; the record is never touched.
    pub fn verify(&self, presented_scheme: &str, presented_token: &str) -> Result<(), AuthError> {
        let result = {
            let slot = self.lock_record();
            let now = self.now();
            match slot.as_ref() {
                None => Err(AuthError::NotInitialized),
                Some(record) if record.is_expired_at(now) => Err(AuthError::Expired),
                Some(record) => {
                    let scheme_ok = presented_scheme == BEARER_SCHEME;
                    let token_ok: bool = presented_token
                        .as_bytes()
                        .ct_eq(record.token.as_bytes())
                        .into();
                    if scheme_ok && token_ok {
                        Ok(())
                    } else {
                        Err(AuthError::Invalid)
                    }
                }
            }
        };

        if let Err(err) = &result {
            tracing::debug!(reason = err.code(), "Bearer verification rejected");
        }
        result
    }

    /// Verify a raw `Authorization` header value. A missing header is
    /// treated as an empty scheme and token.
    pub fn verify_header(&self, header: Option<&str>) -> Result<(), AuthError> {
        let (scheme, token) = header.map(split_authorization).unwrap_or(("", ""));
        self.verify(scheme, token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::secret::SharedSecret;
    use chrono::Duration;
    use std::sync::Arc;

    fn setup() -> (ManualClock, TokenAuthority) {
        let clock = ManualClock::at_unix(0);
        let secret = SharedSecret::new("id1", "key1").unwrap();
        let authority = TokenAuthority::with_clock(secret, 360, Arc::new(clock.clone()));
        (clock, authority)
    }

    #[test]
    fn test_split_authorization() {
        assert_eq!(split_authorization("Bearer abc"), ("Bearer", "abc"));
        assert_eq!(split_authorization("  Bearer   abc  "), ("Bearer", "abc"));
        assert_eq!(split_authorization("Bearer"), ("Bearer", ""));
        assert_eq!(split_authorization(""), ("", ""));
        assert_eq!(split_authorization("Basic dXNlcjpwYXNz"), ("Basic", "dXNlcjpwYXNz"));
    }

    #[test]
    fn test_not_initialized_before_any_issue() {
        let (_, authority) = setup();
        assert_eq!(authority.verify("Bearer", "anything"), Err(AuthError::NotInitialized));
        assert_eq!(authority.verify_header(None), Err(AuthError::NotInitialized));
    }

    #[test]
    fn test_accepts_current_token() {
        let (_, authority) = setup();
        let issued = authority.issue_or_reuse();
        assert_eq!(authority.verify("Bearer", &issued.access_token), Ok(()));
        let header = format!("Bearer {}", issued.access_token);
        assert_eq!(authority.verify_header(Some(&header)), Ok(()));
    }

    #[test]
    fn test_rejects_wrong_scheme_and_token() {
        let (_, authority) = setup();
        let issued = authority.issue_or_reuse();

        assert_eq!(authority.verify("bearer", &issued.access_token), Err(AuthError::Invalid));
        assert_eq!(authority.verify("Basic", &issued.access_token), Err(AuthError::Invalid));

        let mut forged = issued.access_token.clone();
        forged.replace_range(0..1, if forged.starts_with('0') { "1" } else { "0" });
        assert_eq!(authority.verify("Bearer", &forged), Err(AuthError::Invalid));
        assert_eq!(authority.verify("Bearer", ""), Err(AuthError::Invalid));
        assert_eq!(authority.verify_header(None), Err(AuthError::Invalid));
    }

    #[test]
    fn test_expiry_boundary() {
        let (clock, authority) = setup();
        let issued = authority.issue_or_reuse();

        clock.advance(Duration::seconds(359));
        assert_eq!(authority.verify("Bearer", &issued.access_token), Ok(()));

        clock.advance(Duration::seconds(1));
        assert_eq!(authority.verify("Bearer", &issued.access_token), Err(AuthError::Expired));
    }

    #[test]
    fn test_expiry_checked_before_token() {
        let (clock, authority) = setup();
        authority.issue_or_reuse();
        clock.advance(Duration::seconds(400));
        assert_eq!(authority.verify("Basic", "junk"), Err(AuthError::Expired));
    }

    #[test]
    fn test_verify_does_not_mutate_record() {
        let (_, authority) = setup();
        authority.issue_or_reuse();
        let before = authority.current_record();
        let _ = authority.verify("Bearer", "wrong");
        assert_eq!(authority.current_record(), before);
    }
}
