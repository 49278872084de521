//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the catalog store, the optional outbound integrations (mail,
//! image hosting), admin credentials and sessions, the rate limiters, and
//! the site identity used by every rendered page.

use std::path::PathBuf;
use std::sync::Arc;

use crate::rate_limit::{RateLimitConfig, RateLimiter};
use crate::services::admin::AdminCredentials;
use crate::services::cloudinary::ImageHost;
use crate::services::emailjs::Mailer;
use crate::services::enquiry;
use crate::services::session::AdminSessions;
use crate::services::store::CatalogStore;

const DEFAULT_AGENCY_NAME: &str = "Wayfarer Travel";
const DEFAULT_AGENCY_EMAIL: &str = "hello@wayfarer.travel";
const DEFAULT_AGENCY_PHONE: &str = "+1 555 010 2030";
const DEFAULT_AGENCY_ADDRESS: &str = "12 Harbour Street, Lisbon";
const DEFAULT_STATIC_DIR: &str = "static";

// =============================================================================
// SITE CONFIG
// =============================================================================

/// Agency identity shown in the layout, contact page, and outbound messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    pub agency_name: String,
    pub agency_email: String,
    pub agency_phone: String,
    pub agency_address: String,
    /// Digits-only target for `wa.me` links. `None` hides WhatsApp buttons.
    pub whatsapp_number: Option<String>,
    pub static_dir: PathBuf,
    /// Take the client address from `X-Forwarded-For` (behind a reverse proxy).
    pub trust_forwarded_for: bool,
    /// Mark admin session cookies `Secure`.
    pub secure_cookies: bool,
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

impl SiteConfig {
    /// Load from `AGENCY_NAME`, `AGENCY_EMAIL`, `AGENCY_PHONE`, `AGENCY_ADDRESS`,
    /// `WHATSAPP_NUMBER`, `STATIC_DIR`, `TRUST_FORWARDED_FOR`, and `COOKIE_SECURE`.
    /// Unset values fall back to defaults.
    #[must_use]
    pub fn from_env() -> Self {
        let whatsapp_number = std::env::var("WHATSAPP_NUMBER")
            .ok()
            .map(|v| v.chars().filter(char::is_ascii_digit).collect::<String>())
            .filter(|v| !v.is_empty());
        Self {
            agency_name: env_or("AGENCY_NAME", DEFAULT_AGENCY_NAME),
            agency_email: env_or("AGENCY_EMAIL", DEFAULT_AGENCY_EMAIL),
            agency_phone: env_or("AGENCY_PHONE", DEFAULT_AGENCY_PHONE),
            agency_address: env_or("AGENCY_ADDRESS", DEFAULT_AGENCY_ADDRESS),
            whatsapp_number,
            static_dir: PathBuf::from(env_or("STATIC_DIR", DEFAULT_STATIC_DIR)),
            trust_forwarded_for: env_bool("TRUST_FORWARDED_FOR").unwrap_or(false),
            secure_cookies: env_bool("COOKIE_SECURE").unwrap_or(false),
        }
    }
}

impl SiteConfig {
    /// Plain chat link to the agency's WhatsApp.
    #[must_use]
    pub fn whatsapp_chat_url(&self) -> Option<String> {
        self.whatsapp_number.as_deref().and_then(enquiry::whatsapp_chat_link)
    }

    /// Chat link that opens with `text` typed in.
    #[must_use]
    pub fn whatsapp_message_url(&self, text: &str) -> Option<String> {
        self.whatsapp_number.as_deref().and_then(|number| enquiry::whatsapp_link(number, text))
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            agency_name: DEFAULT_AGENCY_NAME.to_owned(),
            agency_email: DEFAULT_AGENCY_EMAIL.to_owned(),
            agency_phone: DEFAULT_AGENCY_PHONE.to_owned(),
            agency_address: DEFAULT_AGENCY_ADDRESS.to_owned(),
            whatsapp_number: None,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            trust_forwarded_for: false,
            secure_cookies: false,
        }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub store: CatalogStore,
    /// Optional EmailJS client. `None` if EmailJS env vars are not configured.
    pub mailer: Option<Arc<dyn Mailer>>,
    /// Optional Cloudinary client. `None` disables image uploads.
    pub images: Option<Arc<dyn ImageHost>>,
    /// Bootstrap admin. `None` leaves only database-registered admins.
    pub admin_credentials: Option<AdminCredentials>,
    pub sessions: AdminSessions,
    pub enquiry_limiter: RateLimiter,
    pub login_limiter: RateLimiter,
    pub site: Arc<SiteConfig>,
}

impl AppState {
    /// Build state with sessions and rate limits read from the environment.
    #[must_use]
    pub fn new(
        store: CatalogStore,
        site: SiteConfig,
        mailer: Option<Arc<dyn Mailer>>,
        images: Option<Arc<dyn ImageHost>>,
        admin_credentials: Option<AdminCredentials>,
    ) -> Self {
        Self {
            store,
            mailer,
            images,
            admin_credentials,
            sessions: AdminSessions::from_env(),
            enquiry_limiter: RateLimiter::new(RateLimitConfig::enquiries_from_env()),
            login_limiter: RateLimiter::new(RateLimitConfig::logins_from_env()),
            site: Arc::new(site),
        }
    }

    /// Admin login is possible with a bootstrap credential or a database of admins.
    #[must_use]
    pub fn admin_enabled(&self) -> bool {
        self.admin_credentials.is_some() || self.store.has_database()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
#[path = "state_helpers_test.rs"]
pub mod test_helpers;

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
