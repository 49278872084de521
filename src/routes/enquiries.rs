//! Enquiry routes: JSON submission plus the processing shared with `POST /contact`.
//!
//! Processing is validate, build the WhatsApp link, then forward by email when
//! a mailer is configured. Mail failures are reported but never retried; the
//! WhatsApp link is always returned so the visitor has a fallback.

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{ClientIp, ErrorBody};
use crate::rate_limit::RateLimitError;
use crate::services::emailjs::MailError;
use crate::services::enquiry::{self, Enquiry, EnquiryError, EnquiryForm};
use crate::state::AppState;

/// A processed enquiry.
#[derive(Debug)]
pub struct EnquiryOutcome {
    pub enquiry: Enquiry,
    pub emailed: bool,
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] EnquiryError),
    #[error("email delivery failed: {error}")]
    Mail {
        enquiry_id: Uuid,
        whatsapp_url: Option<String>,
        error: MailError,
    },
}

#[must_use]
pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}

/// Validate and forward one enquiry.
///
/// # Errors
///
/// Returns `Invalid` for validation failures and `Mail` when the mailer fails.
pub async fn process_enquiry(state: &AppState, form: &EnquiryForm, today: Date) -> Result<EnquiryOutcome, SubmitError> {
    let enquiry = {
        let catalog = state.store.read().await;
        enquiry::validate(form, &catalog, today)?
    };

    let site = &state.site;
    let whatsapp_url = site.whatsapp_message_url(&enquiry::compose_message(&enquiry, &site.agency_name));

    let Some(mailer) = &state.mailer else {
        tracing::info!(enquiry_id = %enquiry.id, topic = enquiry.topic(), "enquiry received (email forwarding disabled)");
        return Ok(EnquiryOutcome { enquiry, emailed: false, whatsapp_url });
    };

    match mailer.send_enquiry(&enquiry, &site.agency_name).await {
        Ok(()) => {
            tracing::info!(enquiry_id = %enquiry.id, topic = enquiry.topic(), "enquiry forwarded by email");
            Ok(EnquiryOutcome { enquiry, emailed: true, whatsapp_url })
        }
        Err(error) => {
            tracing::error!(enquiry_id = %enquiry.id, error = %error, "enquiry email failed");
            Err(SubmitError::Mail { enquiry_id: enquiry.id, whatsapp_url, error })
        }
    }
}

pub(crate) fn rate_limited_response(err: &RateLimitError) -> Response {
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(ErrorBody { error: err.to_string(), field: None }),
    )
        .into_response();
    if let Ok(value) = HeaderValue::from_str(&err.retry_after_secs().to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

#[derive(Debug, Serialize)]
pub struct EnquiryResponse {
    pub id: Uuid,
    pub emailed: bool,
    pub whatsapp_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MailFailureResponse {
    pub error: String,
    pub id: Uuid,
    pub whatsapp_url: Option<String>,
}

/// `POST /api/enquiries`: validate and forward an enquiry.
pub async fn create_enquiry(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    payload: Result<Json<EnquiryForm>, JsonRejection>,
) -> Response {
    let Json(form) = match payload {
        Ok(form) => form,
        Err(rejection) => return json_rejection_response(&rejection),
    };
    if let Err(e) = state.enquiry_limiter.check_and_record(ip) {
        tracing::warn!(%ip, error = %e, "enquiry rate limited");
        return rate_limited_response(&e);
    }
    submit_response(process_enquiry(&state, &form, today()).await)
}

/// Malformed bodies keep the `{error, field}` shape of validation errors.
pub(crate) fn json_rejection_response(rejection: &JsonRejection) -> Response {
    (rejection.status(), Json(ErrorBody { error: rejection.body_text(), field: None })).into_response()
}

fn submit_response(result: Result<EnquiryOutcome, SubmitError>) -> Response {
    match result {
        Ok(outcome) => (
            StatusCode::CREATED,
            Json(EnquiryResponse {
                id: outcome.enquiry.id,
                emailed: outcome.emailed,
                whatsapp_url: outcome.whatsapp_url,
            }),
        )
            .into_response(),
        Err(SubmitError::Invalid(e)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorBody { error: e.to_string(), field: Some(e.field()) }),
        )
            .into_response(),
        Err(SubmitError::Mail { enquiry_id, whatsapp_url, .. }) => (
            StatusCode::BAD_GATEWAY,
            Json(MailFailureResponse {
                error: "We could not send your enquiry by email. Please contact us on WhatsApp instead.".into(),
                id: enquiry_id,
                whatsapp_url,
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
#[path = "enquiries_test.rs"]
mod tests;
