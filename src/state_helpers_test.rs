use super::*;
use std::sync::Mutex;
use std::time::Duration;

use crate::services::cloudinary::{UploadError, UploadedImage, validate_source};
use crate::services::emailjs::MailError;
use crate::services::enquiry::Enquiry;
use crate::services::seed::default_catalog;

pub const TEST_ADMIN_USERNAME: &str = "admin";
pub const TEST_ADMIN_PASSWORD: &str = "s3cret-pass";

/// Limits small enough for tests to trip deliberately.
pub const TEST_RATE_LIMITS: RateLimitConfig = RateLimitConfig {
    per_client_limit: 3,
    per_client_window: Duration::from_secs(600),
    global_limit: 50,
    global_window: Duration::from_secs(60),
};

/// Records every enquiry it is asked to deliver; optionally fails instead.
#[derive(Default)]
pub struct MockMailer {
    pub sent: Mutex<Vec<Enquiry>>,
    pub fail: bool,
}

impl MockMailer {
    #[must_use]
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("mock mutex should lock").len()
    }
}

#[async_trait::async_trait]
impl Mailer for MockMailer {
    async fn send_enquiry(&self, enquiry: &Enquiry, _agency: &str) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Rejected { status: 400, body: "mock failure".into() });
        }
        self.sent.lock().expect("mock mutex should lock").push(enquiry.clone());
        Ok(())
    }
}

/// Accepts any valid source and returns a fixed hosted image.
pub struct MockImageHost;

#[async_trait::async_trait]
impl ImageHost for MockImageHost {
    async fn upload(&self, source: &str) -> Result<UploadedImage, UploadError> {
        validate_source(source)?;
        Ok(UploadedImage {
            secure_url: "https://res.cloudinary.com/demo/image/upload/v1/wayfarer/mock.jpg".into(),
            public_id: "wayfarer/mock".into(),
            width: Some(1200),
            height: Some(800),
        })
    }
}

fn build(mailer: Option<Arc<dyn Mailer>>, images: Option<Arc<dyn ImageHost>>) -> AppState {
    let catalog = default_catalog().expect("embedded catalog should parse");
    AppState {
        store: CatalogStore::in_memory(catalog),
        mailer,
        images,
        admin_credentials: Some(AdminCredentials::new(TEST_ADMIN_USERNAME, TEST_ADMIN_PASSWORD)),
        sessions: AdminSessions::new(Duration::from_secs(3600)),
        enquiry_limiter: RateLimiter::new(TEST_RATE_LIMITS),
        login_limiter: RateLimiter::new(TEST_RATE_LIMITS),
        site: Arc::new(SiteConfig { whatsapp_number: Some("15550102030".into()), ..SiteConfig::default() }),
    }
}

/// Create a test `AppState` over the embedded catalog, with no database and
/// no outbound integrations.
#[must_use]
pub fn test_app_state() -> AppState {
    build(None, None)
}

/// Create a test `AppState` with a mock mailer.
#[must_use]
pub fn test_app_state_with_mailer(mailer: Arc<dyn Mailer>) -> AppState {
    build(Some(mailer), None)
}

/// Create a test `AppState` with a mock image host.
#[must_use]
pub fn test_app_state_with_images(images: Arc<dyn ImageHost>) -> AppState {
    build(None, Some(images))
}

/// Issue a live admin session token for `state`.
#[must_use]
pub fn admin_token(state: &AppState) -> String {
    state.sessions.create(TEST_ADMIN_USERNAME)
}
