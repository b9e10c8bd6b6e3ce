//! The token authority: mints, caches and expires the process-wide token.

use crate::clock::{Clock, SystemClock};
use crate::secret::SharedSecret;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Token lifetime used when none is configured.
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 360;

/// Random bytes in each token salt (rendered as twice as many hex chars).
const SALT_BYTES: usize = 8;

/// The currently issued token and its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRecord {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Expired once `now` reaches `expires_at`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whole seconds left before expiry, rounded down.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u64 {
        (self.expires_at - now).num_seconds().max(0) as u64
    }
}

/// A token handed to a caller along with its remaining validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub expires_in: u64,
}

/// Owner of the single token record.
///
/// One authority is shared by every caller (the record is process-wide, not
/// per client). The record lives behind one mutex: a refresh happens entirely
/// under the lock, so concurrent issuers arriving after expiry all observe the
/// same new token.
pub struct TokenAuthority {
    secret: SharedSecret,
    ttl_secs: u64,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    record: Mutex<Option<TokenRecord>>,
}

impl TokenAuthority {
    /// Authority on wall-clock time.
    pub fn new(secret: SharedSecret, ttl_secs: u64) -> Self {
        Self::with_clock(secret, ttl_secs, Arc::new(SystemClock))
    }

    pub fn with_clock(secret: SharedSecret, ttl_secs: u64, clock: Arc<dyn Clock>) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            secret,
            ttl_secs,
            ttl,
            clock,
            record: Mutex::new(None),
        }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    pub(crate) fn secret(&self) -> &SharedSecret {
        &self.secret
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn lock_record(&self) -> MutexGuard<'_, Option<TokenRecord>> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current record, if a token was ever issued.
    pub fn current_record(&self) -> Option<TokenRecord> {
        self.lock_record().clone()
    }

    /// Return the current token if it is still valid, otherwise mint a new one.
    ///
    /// Reuse has no side effect. A token is reused only while
    /// `now < expires_at`, so the result is never already expired.
    pub fn issue_or_reuse(&self) -> IssuedToken {
        // Read the clock under the lock so a refresh by another caller is
        // never judged against an earlier instant.
        let mut slot = self.lock_record();
        let now = self.now();

        if let Some(record) = slot.as_ref()
            && !record.is_expired_at(now)
        {
            return IssuedToken {
                access_token: record.token.clone(),
                expires_in: record.remaining_secs(now),
            };
        }

        let token = self.mint(now);
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        tracing::info!(
            expires_at = %expires_at,
            ttl_secs = self.ttl_secs,
            "Issued new bearer token"
        );
        *slot = Some(TokenRecord {
            token: token.clone(),
            expires_at,
        });

        IssuedToken {
            access_token: token,
            expires_in: self.ttl_secs,
        }
    }

    fn mint(&self, now: DateTime<Utc>) -> String {
        let message = token_message(self.secret.id(), now.timestamp(), &random_salt());
        self.secret.sign(message.as_bytes())
    }
}

/// The signed message: `"{secret_id}:{unix_seconds}:{salt}"`.
pub fn token_message(secret_id: &str, unix_secs: i64, salt: &str) -> String {
    format!("{}:{}:{}", secret_id, unix_secs, salt)
}

fn random_salt() -> String {
    let mut bytes = [0u8; SALT_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
