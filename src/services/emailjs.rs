//! EmailJS client: forwards validated enquiries to the agency inbox.
//!
//! Thin HTTP wrapper around `POST /api/v1.0/email/send`. The account must
//! allow API calls from non-browser applications; the private key (access
//! token) is sent when configured, which EmailJS requires in strict mode.

use std::time::Duration;

use serde::Serialize;
use serde_json::{Map, Value};

use super::enquiry::{self, Enquiry};

const DEFAULT_API_URL: &str = "https://api.emailjs.com";
const SEND_PATH: &str = "/api/v1.0/email/send";
const REQUEST_TIMEOUT_SECS: u64 = 15;
const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email request failed: {0}")]
    Request(String),
    #[error("email rejected: status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Outbound enquiry delivery. Routes hold this as `Arc<dyn Mailer>`.
#[async_trait::async_trait]
pub trait Mailer: Send + Sync {
    async fn send_enquiry(&self, enquiry: &Enquiry, agency: &str) -> Result<(), MailError>;
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailJsConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
    pub private_key: Option<String>,
    pub api_url: String,
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

impl EmailJsConfig {
    /// Load from `EMAILJS_SERVICE_ID`, `EMAILJS_TEMPLATE_ID`, `EMAILJS_PUBLIC_KEY`.
    /// Optional: `EMAILJS_PRIVATE_KEY`, `EMAILJS_API_URL`.
    /// Returns `None` if any required value is missing (email forwarding disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        Some(Self {
            service_id: env_non_empty("EMAILJS_SERVICE_ID")?,
            template_id: env_non_empty("EMAILJS_TEMPLATE_ID")?,
            public_key: env_non_empty("EMAILJS_PUBLIC_KEY")?,
            private_key: env_non_empty("EMAILJS_PRIVATE_KEY"),
            api_url: env_non_empty("EMAILJS_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_owned())
                .trim_end_matches('/')
                .to_owned(),
        })
    }

    #[must_use]
    pub fn send_url(&self) -> String {
        format!("{}{SEND_PATH}", self.api_url)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: Map<String, Value>,
}

pub struct EmailJsClient {
    http: reqwest::Client,
    config: EmailJsConfig,
}

impl EmailJsClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: EmailJsConfig) -> Result<Self, MailError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| MailError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }
}

#[async_trait::async_trait]
impl Mailer for EmailJsClient {
    async fn send_enquiry(&self, enquiry: &Enquiry, agency: &str) -> Result<(), MailError> {
        let body = SendRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.public_key,
            access_token: self.config.private_key.as_deref(),
            template_params: enquiry::template_params(enquiry, agency),
        };

        let response = self
            .http
            .post(self.config.send_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected { status: status.as_u16(), body });
        }

        tracing::info!(enquiry_id = %enquiry.id, "enquiry email accepted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "emailjs_test.rs"]
mod tests;
