//! End-to-end token lifecycle: issue, reuse, verify, expire, refresh.

use askgate_auth::{AuthError, Clock, IssuedToken, ManualClock, SharedSecret, TokenAuthority};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, OnceLock, mpsc};
use std::thread;

fn authority_at_zero() -> (ManualClock, Arc<TokenAuthority>) {
    let clock = ManualClock::at_unix(0);
    let secret = SharedSecret::new("id1", "key1").unwrap();
    let authority = TokenAuthority::with_clock(secret, 360, Arc::new(clock.clone()));
    (clock, Arc::new(authority))
}

/// Walk through issuance at t=0, reuse at t=100 and refresh at t=361.
#[test]
fn test_reference_timeline() {
    let (clock, authority) = authority_at_zero();

    let t0 = authority.issue("id1", "key1").unwrap();
    assert_eq!(t0.expires_in, 360);

    clock.advance(Duration::seconds(100));
    assert_eq!(authority.verify("Bearer", &t0.access_token), Ok(()));

    let again = authority.issue("id1", "key1").unwrap();
    assert_eq!(again.access_token, t0.access_token);
    assert_eq!(again.expires_in, 260);

    clock.advance(Duration::seconds(261));
    assert_eq!(
        authority.verify("Bearer", &t0.access_token),
        Err(AuthError::Expired)
    );

    let t1 = authority.issue("id1", "key1").unwrap();
    assert_ne!(t1.access_token, t0.access_token);
    assert_eq!(t1.expires_in, 360);
    assert_eq!(authority.verify("Bearer", &t1.access_token), Ok(()));
    assert_eq!(
        authority.verify("Bearer", &t0.access_token),
        Err(AuthError::Invalid)
    );
}

#[test]
fn test_expires_in_strictly_decreases() {
    let (clock, authority) = authority_at_zero();
    let mut last = authority.issue("id1", "key1").unwrap().expires_in;
    for _ in 0..5 {
        clock.advance(Duration::seconds(30));
        let next = authority.issue("id1", "key1").unwrap().expires_in;
        assert!(next < last, "{} should be below {}", next, last);
        last = next;
    }
}

#[test]
fn test_wrong_credentials_any_time() {
    let (clock, authority) = authority_at_zero();
    assert_eq!(
        authority.issue("wrong", "creds"),
        Err(AuthError::BadCredentials)
    );
    assert!(authority.current_record().is_none());
    assert_eq!(
        authority.verify("Bearer", "deadbeef"),
        Err(AuthError::NotInitialized)
    );

    authority.issue("id1", "key1").unwrap();
    clock.advance(Duration::seconds(1_000));
    assert_eq!(
        authority.issue("wrong", "creds"),
        Err(AuthError::BadCredentials)
    );
}

/// Concurrent issuers after expiry must all observe one refreshed token.
#[test]
fn test_concurrent_refresh_yields_single_token() {
    let (clock, authority) = authority_at_zero();
    let stale = authority.issue("id1", "key1").unwrap().access_token;
    clock.advance(Duration::seconds(400));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let authority = Arc::clone(&authority);
            thread::spawn(move || authority.issue("id1", "key1").unwrap().access_token)
        })
        .collect();

    let tokens: HashSet<String> = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect();

    assert_eq!(tokens.len(), 1);
    assert!(!tokens.contains(&stale));
    let current = tokens.into_iter().next().unwrap();
    assert_eq!(authority.verify("Bearer", &current), Ok(()));
}

#[test]
fn test_instances_are_isolated() {
    let (_, first) = authority_at_zero();
    let (_, second) = authority_at_zero();

    let token = first.issue("id1", "key1").unwrap().access_token;
    assert_eq!(
        second.verify("Bearer", &token),
        Err(AuthError::NotInitialized)
    );
}

/// Reads t=0, then t=355, then t=400 forever. During the t=355 reading it
/// starts a competing issuer on another thread and gives it up to 200 ms to
/// finish before answering.
struct RacingClock {
    calls: AtomicUsize,
    authority: OnceLock<Arc<TokenAuthority>>,
    competitor: Mutex<Option<thread::JoinHandle<IssuedToken>>>,
}

impl Clock for RacingClock {
    fn now(&self) -> DateTime<Utc> {
        let secs = match self.calls.fetch_add(1, Ordering::SeqCst) {
            0 => 0,
            1 => {
                let authority = self.authority.get().unwrap().clone();
                let (done_tx, done_rx) = mpsc::channel();
                let handle = thread::spawn(move || {
                    let token = authority.issue_or_reuse();
                    let _ = done_tx.send(());
                    token
                });
                let _ = done_rx.recv_timeout(std::time::Duration::from_millis(200));
                *self.competitor.lock().unwrap() = Some(handle);
                355
            }
            _ => 400,
        };
        DateTime::from_timestamp(secs, 0).unwrap()
    }
}

#[test]
fn test_refresh_by_another_caller_never_raises_expires_in() {
    let clock = Arc::new(RacingClock {
        calls: AtomicUsize::new(0),
        authority: OnceLock::new(),
        competitor: Mutex::new(None),
    });
    let secret = SharedSecret::new("id1", "key1").unwrap();
    let authority = Arc::new(TokenAuthority::with_clock(secret, 360, clock.clone()));
    assert!(clock.authority.set(authority.clone()).is_ok());

    let first = authority.issue_or_reuse();
    assert_eq!(first.expires_in, 360);

    let slow = authority.issue_or_reuse();
    let competitor = clock
        .competitor
        .lock()
        .unwrap()
        .take()
        .unwrap()
        .join()
        .unwrap();

    assert!(slow.expires_in <= 360, "expires_in {} exceeds the TTL", slow.expires_in);
    assert_eq!(slow.access_token, first.access_token);
    assert_eq!(slow.expires_in, 5);
    assert_ne!(competitor.access_token, first.access_token);
    assert_eq!(competitor.expires_in, 360);
}
