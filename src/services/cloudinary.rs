//! Cloudinary image hosting: unsigned uploads for tour and offer images.
//!
//! Uses an upload preset configured as "unsigned" in the Cloudinary console,
//! so no API secret lives on this server. The source may be a base64 data URI
//! (admin file picker) or a remote URL for Cloudinary to fetch.

use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;
/// ~10 MB decoded, the free-plan image limit, plus base64 overhead.
const MAX_SOURCE_LEN: usize = 14 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("unsupported image source")]
    UnsupportedSource,
    #[error("image is too large")]
    TooLarge,
    #[error("upload request failed: {0}")]
    Request(String),
    #[error("upload rejected: status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("upload response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub secure_url: String,
    pub public_id: String,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

#[async_trait::async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, source: &str) -> Result<UploadedImage, UploadError>;
}

/// Accept `data:image/<type>;base64,<payload>` or an `http(s)://` URL.
///
/// # Errors
///
/// Returns `UnsupportedSource` or `TooLarge`.
pub fn validate_source(source: &str) -> Result<(), UploadError> {
    if source.len() > MAX_SOURCE_LEN {
        return Err(UploadError::TooLarge);
    }
    if source.starts_with("https://") || source.starts_with("http://") {
        return Ok(());
    }
    let Some(rest) = source.strip_prefix("data:image/") else {
        return Err(UploadError::UnsupportedSource);
    };
    let Some((media, payload)) = rest.split_once(',') else {
        return Err(UploadError::UnsupportedSource);
    };
    if !media.ends_with(";base64") || payload.is_empty() {
        return Err(UploadError::UnsupportedSource);
    }
    Ok(())
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub upload_preset: String,
    pub folder: Option<String>,
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Load from `CLOUDINARY_CLOUD_NAME` and `CLOUDINARY_UPLOAD_PRESET`.
    /// Optional: `CLOUDINARY_FOLDER`, `CLOUDINARY_API_BASE`.
    /// Returns `None` if either required value is missing (uploads disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let cloud_name = std::env::var("CLOUDINARY_CLOUD_NAME").ok().filter(|v| !v.trim().is_empty())?;
        let upload_preset = std::env::var("CLOUDINARY_UPLOAD_PRESET").ok().filter(|v| !v.trim().is_empty())?;
        let folder = std::env::var("CLOUDINARY_FOLDER").ok().filter(|v| !v.trim().is_empty());
        let api_base = std::env::var("CLOUDINARY_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.to_owned())
            .trim_end_matches('/')
            .to_owned();
        Some(Self { cloud_name, upload_preset, folder, api_base })
    }

    #[must_use]
    pub fn upload_url(&self) -> String {
        format!("{}/{}/image/upload", self.api_base, self.cloud_name)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: CloudinaryConfig) -> Result<Self, UploadError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config })
    }
}

fn parse_upload_response(body: &str) -> Result<UploadedImage, UploadError> {
    serde_json::from_str(body).map_err(|e| UploadError::Parse(e.to_string()))
}

#[async_trait::async_trait]
impl ImageHost for CloudinaryClient {
    async fn upload(&self, source: &str) -> Result<UploadedImage, UploadError> {
        validate_source(source)?;

        let mut form: Vec<(&str, &str)> = vec![("file", source), ("upload_preset", self.config.upload_preset.as_str())];
        if let Some(folder) = &self.config.folder {
            form.push(("folder", folder.as_str()));
        }

        let response = self
            .http
            .post(self.config.upload_url())
            .form(&form)
            .send()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(UploadError::Rejected { status: status.as_u16(), body });
        }

        let image = parse_upload_response(&body)?;
        tracing::info!(public_id = %image.public_id, "image uploaded");
        Ok(image)
    }
}

#[cfg(test)]
#[path = "cloudinary_test.rs"]
mod tests;
