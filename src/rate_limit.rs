//! In-memory rate limiting for enquiry submissions and admin logins.
//!
//! DESIGN
//! ======
//! Sliding-window counters backed by `HashMap<IpAddr, VecDeque<Instant>>`.
//! Each limiter enforces two windows:
//! - Per-client: requests per client IP within `per_client_window`
//! - Global: requests across all clients within `global_window`
//!
//! Two limiters are built at startup, one guarding `POST /contact` and
//! `POST /api/enquiries`, one guarding admin logins.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const ENQUIRY_PER_CLIENT_LIMIT: usize = 5;
const ENQUIRY_PER_CLIENT_WINDOW_SECS: u64 = 600;
const ENQUIRY_GLOBAL_LIMIT: usize = 100;
const ENQUIRY_GLOBAL_WINDOW_SECS: u64 = 60;

const LOGIN_PER_CLIENT_LIMIT: usize = 5;
const LOGIN_PER_CLIENT_WINDOW_SECS: u64 = 300;
const LOGIN_GLOBAL_LIMIT: usize = 50;
const LOGIN_GLOBAL_WINDOW_SECS: u64 = 60;

/// Client map size above which idle entries are swept.
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub per_client_limit: usize,
    pub per_client_window: Duration,
    pub global_limit: usize,
    pub global_window: Duration,
}

impl RateLimitConfig {
    /// Enquiry limits; override with `ENQUIRY_RATE_PER_CLIENT`,
    /// `ENQUIRY_RATE_PER_CLIENT_WINDOW_SECS`, `ENQUIRY_RATE_GLOBAL`,
    /// `ENQUIRY_RATE_GLOBAL_WINDOW_SECS`.
    #[must_use]
    pub fn enquiries_from_env() -> Self {
        Self::from_env_with_prefix(
            "ENQUIRY_RATE",
            Self {
                per_client_limit: ENQUIRY_PER_CLIENT_LIMIT,
                per_client_window: Duration::from_secs(ENQUIRY_PER_CLIENT_WINDOW_SECS),
                global_limit: ENQUIRY_GLOBAL_LIMIT,
                global_window: Duration::from_secs(ENQUIRY_GLOBAL_WINDOW_SECS),
            },
        )
    }

    /// Admin login limits; override with the `LOGIN_RATE_*` equivalents.
    #[must_use]
    pub fn logins_from_env() -> Self {
        Self::from_env_with_prefix(
            "LOGIN_RATE",
            Self {
                per_client_limit: LOGIN_PER_CLIENT_LIMIT,
                per_client_window: Duration::from_secs(LOGIN_PER_CLIENT_WINDOW_SECS),
                global_limit: LOGIN_GLOBAL_LIMIT,
                global_window: Duration::from_secs(LOGIN_GLOBAL_WINDOW_SECS),
            },
        )
    }

    fn from_env_with_prefix(prefix: &str, defaults: Self) -> Self {
        let per_client_window_secs = env_parse(
            &format!("{prefix}_PER_CLIENT_WINDOW_SECS"),
            defaults.per_client_window.as_secs(),
        );
        let global_window_secs = env_parse(&format!("{prefix}_GLOBAL_WINDOW_SECS"), defaults.global_window.as_secs());
        Self {
            per_client_limit: env_parse(&format!("{prefix}_PER_CLIENT"), defaults.per_client_limit),
            per_client_window: Duration::from_secs(per_client_window_secs),
            global_limit: env_parse(&format!("{prefix}_GLOBAL"), defaults.global_limit),
            global_window: Duration::from_secs(global_window_secs),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum RateLimitError {
    #[error("too many requests from this address (max {limit} per {window_secs}s)")]
    PerClientExceeded { limit: usize, window_secs: u64 },
    #[error("too many requests right now (max {limit} per {window_secs}s)")]
    GlobalExceeded { limit: usize, window_secs: u64 },
}

impl RateLimitError {
    /// Seconds a client should wait before retrying (the window length).
    #[must_use]
    pub fn retry_after_secs(&self) -> u64 {
        match self {
            Self::PerClientExceeded { window_secs, .. } | Self::GlobalExceeded { window_secs, .. } => *window_secs,
        }
    }
}

// =============================================================================
// RATE LIMITER
// =============================================================================

#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Mutex<RateLimiterInner>>,
    config: RateLimitConfig,
}

struct RateLimiterInner {
    /// Per-client request timestamps.
    client_requests: HashMap<IpAddr, VecDeque<Instant>>,
    /// Global request timestamps.
    global_requests: VecDeque<Instant>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RateLimiterInner {
                client_requests: HashMap::new(),
                global_requests: VecDeque::new(),
            })),
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Check both per-client and global limits, then record the request.
    ///
    /// # Errors
    ///
    /// Returns which limit was exceeded; nothing is recorded in that case.
    pub fn check_and_record(&self, client: IpAddr) -> Result<(), RateLimitError> {
        self.check_and_record_at(client, Instant::now())
    }

    /// Internal: check + record with explicit timestamp (for testing).
    fn check_and_record_at(&self, client: IpAddr, now: Instant) -> Result<(), RateLimitError> {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let cfg = self.config;

        // Prune and check global first (no borrow conflict).
        prune_window(&mut inner.global_requests, now, cfg.global_window);
        if inner.global_requests.len() >= cfg.global_limit {
            return Err(RateLimitError::GlobalExceeded {
                limit: cfg.global_limit,
                window_secs: cfg.global_window.as_secs(),
            });
        }

        if inner.client_requests.len() > SWEEP_THRESHOLD {
            inner.client_requests.retain(|_, deque| {
                prune_window(deque, now, cfg.per_client_window);
                !deque.is_empty()
            });
        }

        // Prune and check per-client.
        let client_deque = inner.client_requests.entry(client).or_default();
        prune_window(client_deque, now, cfg.per_client_window);
        if client_deque.len() >= cfg.per_client_limit {
            return Err(RateLimitError::PerClientExceeded {
                limit: cfg.per_client_limit,
                window_secs: cfg.per_client_window.as_secs(),
            });
        }

        // Record.
        client_deque.push_back(now);
        inner.global_requests.push_back(now);

        Ok(())
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn prune_window(deque: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = deque.front() {
        if now.duration_since(front) > window {
            deque.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
#[path = "rate_limit_test.rs"]
mod tests;
