//! Admin session management.
//!
//! ARCHITECTURE
//! ============
//! Sessions are opaque random tokens held in process memory, set as an
//! HttpOnly cookie by the admin login routes. A restart signs every admin
//! out, which is acceptable for a single-instance marketing site.
//!
//! TRADE-OFFS
//! ==========
//! Expired entries are pruned lazily on `create`/`validate` instead of by a
//! background task; the map stays tiny because only staff sign in.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::Rng;
use serde::Serialize;

const DEFAULT_SESSION_TTL_SECS: u64 = 8 * 60 * 60;
const MAX_SESSION_TTL_SECS: u64 = 30 * 24 * 60 * 60;

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// A signed-in admin.
#[derive(Debug, Clone, Serialize)]
pub struct AdminSession {
    pub username: String,
    #[serde(skip)]
    expires_at: Instant,
}

#[derive(Clone)]
pub struct AdminSessions {
    inner: Arc<Mutex<HashMap<String, AdminSession>>>,
    ttl: Duration,
}

impl AdminSessions {
    /// `ttl` is capped at 30 days.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let ttl = ttl.min(Duration::from_secs(MAX_SESSION_TTL_SECS));
        Self { inner: Arc::new(Mutex::new(HashMap::new())), ttl }
    }

    /// TTL from `ADMIN_SESSION_TTL_SECS` (default 8 hours, at most 30 days).
    #[must_use]
    pub fn from_env() -> Self {
        let secs = std::env::var("ADMIN_SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);
        Self::new(Duration::from_secs(secs))
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `username`, returning its token.
    #[must_use]
    pub fn create(&self, username: &str) -> String {
        self.create_at(username, Instant::now())
    }

    fn create_at(&self, username: &str, now: Instant) -> String {
        let token = generate_token();
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        inner.retain(|_, s| s.expires_at > now);
        inner.insert(token.clone(), AdminSession { username: username.to_owned(), expires_at: now + self.ttl });
        token
    }

    /// Look up a live session. Expired sessions are removed and yield `None`.
    #[must_use]
    pub fn validate(&self, token: &str) -> Option<AdminSession> {
        self.validate_at(token, Instant::now())
    }

    fn validate_at(&self, token: &str, now: Instant) -> Option<AdminSession> {
        if token.is_empty() {
            return None;
        }
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        match inner.get(token) {
            Some(session) if session.expires_at > now => Some(session.clone()),
            Some(_) => {
                inner.remove(token);
                None
            }
            None => None,
        }
    }

    /// End a session. Unknown tokens are ignored.
    pub fn revoke(&self, token: &str) {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(token);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
