//! In-memory admin sessions.
//!
//! A successful login issues an opaque bearer token bound to the verified
//! identity. Sessions expire after a configurable time and are lost on
//! restart.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::models::Identity;

#[derive(Debug, Clone)]
struct Session {
    identity: Identity,
    expires_at: Instant,
}

/// Token-to-identity map with expiry.
///
/// Thread-safe via internal RwLock.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_minutes: u64) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl: Duration::from_secs(ttl_minutes * 60),
        }
    }

    /// Starts a session and returns its token (32 bytes, base64url encoded).
    pub fn issue(&self, identity: Identity) -> String {
        self.issue_with_ttl(identity, self.ttl)
    }

    pub fn issue_with_ttl(&self, identity: Identity, ttl: Duration) -> String {
        let token = generate_token();
        let session = Session {
            identity,
            expires_at: Instant::now() + ttl,
        };

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), session);

        token
    }

    /// The identity behind a live token. Expired sessions are dropped here.
    pub fn resolve(&self, token: &str) -> Option<Identity> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);

        let session = sessions.get(token)?;
        if Instant::now() >= session.expires_at {
            sessions.remove(token);
            return None;
        }
        Some(session.identity.clone())
    }

    /// Ends a session. Returns `false` for an unknown token.
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(token)
            .is_some()
    }

    /// Removes all expired sessions and returns how many there were.
    pub fn cleanup_expired(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        before - sessions.len()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn admin() -> Identity {
        Identity {
            id: 1,
            name: "admin".into(),
        }
    }

    #[test]
    fn test_issue_returns_unique_tokens() {
        let store = SessionStore::new(10);

        let first = store.issue(admin());
        let second = store.issue(admin());

        assert_ne!(first, second);
        assert_eq!(first.len(), 43);
        assert!(first
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_resolve_is_repeatable() {
        let store = SessionStore::new(10);
        let token = store.issue(admin());

        assert_eq!(store.resolve(&token), Some(admin()));
        assert_eq!(store.resolve(&token), Some(admin()));
        assert_eq!(store.resolve("nonexistent"), None);
    }

    #[test]
    fn test_expired_session_is_rejected_and_dropped() {
        let store = SessionStore::new(10);
        let token = store.issue_with_ttl(admin(), Duration::from_secs(0));

        thread::sleep(Duration::from_millis(10));

        assert_eq!(store.resolve(&token), None);
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::new(10);
        let token = store.issue(admin());

        assert!(store.revoke(&token));
        assert!(!store.revoke(&token));
        assert_eq!(store.resolve(&token), None);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = SessionStore::new(10);
        store.issue_with_ttl(admin(), Duration::from_secs(0));
        store.issue_with_ttl(admin(), Duration::from_secs(0));
        store.issue(admin());

        thread::sleep(Duration::from_millis(10));

        assert_eq!(store.cleanup_expired(), 2);
        assert_eq!(store.len(), 1);
    }
}
