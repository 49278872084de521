use super::*;
use crate::services::enquiry::{EnquiryForm, validate};
use crate::services::seed;
use httpmock::prelude::*;
use time::macros::date;

fn config(api_url: &str, private_key: Option<&str>) -> EmailJsConfig {
    EmailJsConfig {
        service_id: "service_abc".into(),
        template_id: "template_xyz".into(),
        public_key: "pk_123".into(),
        private_key: private_key.map(str::to_owned),
        api_url: api_url.into(),
    }
}

fn enquiry() -> Enquiry {
    let form = EnquiryForm {
        name: "Sam".into(),
        email: "sam@example.com".into(),
        message: "Two adults, one child.".into(),
        tour_id: Some("santorini-sunsets".into()),
        ..Default::default()
    };
    validate(&form, &seed::default_catalog().unwrap(), date!(2026 - 01 - 01)).unwrap()
}

// =============================================================================
// EmailJsConfig::from_env: shared globals, so clear before and after.
// =============================================================================

unsafe fn clear_emailjs_env() {
    unsafe {
        for key in [
            "EMAILJS_SERVICE_ID",
            "EMAILJS_TEMPLATE_ID",
            "EMAILJS_PUBLIC_KEY",
            "EMAILJS_PRIVATE_KEY",
            "EMAILJS_API_URL",
        ] {
            std::env::remove_var(key);
        }
    }
}

#[test]
fn from_env_requires_all_ids() {
    unsafe {
        clear_emailjs_env();
        std::env::set_var("EMAILJS_SERVICE_ID", "svc");
        std::env::set_var("EMAILJS_TEMPLATE_ID", "tpl");
    }
    assert!(EmailJsConfig::from_env().is_none());

    unsafe {
        std::env::set_var("EMAILJS_PUBLIC_KEY", "pk");
        std::env::set_var("EMAILJS_API_URL", "http://localhost:9999/");
    }
    let config = EmailJsConfig::from_env().expect("config should load");
    assert_eq!(config.public_key, "pk");
    assert!(config.private_key.is_none());
    assert_eq!(config.send_url(), "http://localhost:9999/api/v1.0/email/send");
    unsafe { clear_emailjs_env() };
}

#[test]
fn default_send_url_points_at_emailjs() {
    let config = config(DEFAULT_API_URL, None);
    assert_eq!(config.send_url(), "https://api.emailjs.com/api/v1.0/email/send");
}

#[test]
fn mail_error_display() {
    let err = MailError::Rejected { status: 400, body: "The user_id parameter is required".into() };
    let msg = err.to_string();
    assert!(msg.contains("400"));
    assert!(msg.contains("user_id"));
}

// =============================================================================
// send_enquiry against a mock EmailJS
// =============================================================================

#[tokio::test]
async fn send_posts_ids_and_template_params() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1.0/email/send")
                .json_body_partial(
                    r#"{
                        "service_id": "service_abc",
                        "template_id": "template_xyz",
                        "user_id": "pk_123",
                        "accessToken": "secret",
                        "template_params": { "from_email": "sam@example.com", "tour_title": "Santorini Sunsets" }
                    }"#,
                );
            then.status(200).body("OK");
        })
        .await;

    let client = EmailJsClient::new(config(&server.base_url(), Some("secret"))).unwrap();
    client.send_enquiry(&enquiry(), "Wayfarer Travel").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn send_surfaces_rejection_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1.0/email/send");
            then.status(403).body("API calls are disabled for non-browser applications");
        })
        .await;

    let client = EmailJsClient::new(config(&server.base_url(), None)).unwrap();
    let err = client.send_enquiry(&enquiry(), "Wayfarer Travel").await.unwrap_err();
    match err {
        MailError::Rejected { status, body } => {
            assert_eq!(status, 403);
            assert!(body.contains("non-browser"));
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn send_to_unreachable_host_is_request_error() {
    let client = EmailJsClient::new(config("http://127.0.0.1:1", None)).unwrap();
    let err = client.send_enquiry(&enquiry(), "Wayfarer Travel").await.unwrap_err();
    assert!(matches!(err, MailError::Request(_)));
}
