use super::*;
use httpmock::prelude::*;

const PNG_DATA_URI: &str = "data:image/png;base64,iVBORw0KGgo=";

fn config(api_base: &str) -> CloudinaryConfig {
    CloudinaryConfig {
        cloud_name: "demo".into(),
        upload_preset: "tours_unsigned".into(),
        folder: Some("tours".into()),
        api_base: api_base.into(),
    }
}

// =============================================================================
// validate_source
// =============================================================================

#[test]
fn validate_source_accepts_data_uri_and_urls() {
    assert!(validate_source(PNG_DATA_URI).is_ok());
    assert!(validate_source("https://images.example.com/a.jpg").is_ok());
    assert!(validate_source("http://images.example.com/a.jpg").is_ok());
}

#[test]
fn validate_source_rejects_other_shapes() {
    for source in [
        "",
        "ftp://example.com/a.jpg",
        "data:text/plain;base64,aGk=",
        "data:image/png,rawbytes",
        "data:image/png;base64,",
        "data:image/png;base64",
        "/static/img/a.jpg",
    ] {
        assert!(
            matches!(validate_source(source), Err(UploadError::UnsupportedSource)),
            "expected rejection for {source:?}"
        );
    }
}

#[test]
fn validate_source_rejects_oversized_payload() {
    let huge = format!("data:image/png;base64,{}", "A".repeat(MAX_SOURCE_LEN));
    assert!(matches!(validate_source(&huge), Err(UploadError::TooLarge)));
}

#[test]
fn upload_url_includes_cloud_name() {
    assert_eq!(
        config(DEFAULT_API_BASE).upload_url(),
        "https://api.cloudinary.com/v1_1/demo/image/upload"
    );
}

#[test]
fn parse_upload_response_reads_fields() {
    let image = parse_upload_response(
        r#"{"public_id":"tours/abc","secure_url":"https://res.cloudinary.com/demo/image/upload/tours/abc.jpg","width":800,"height":600,"format":"jpg"}"#,
    )
    .unwrap();
    assert_eq!(image.public_id, "tours/abc");
    assert_eq!(image.width, Some(800));
    assert!(parse_upload_response("{}").is_err());
}

// =============================================================================
// upload against a mock Cloudinary
// =============================================================================

#[tokio::test]
async fn upload_posts_form_and_returns_secure_url() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/demo/image/upload")
                .x_www_form_urlencoded_tuple("upload_preset", "tours_unsigned")
                .x_www_form_urlencoded_tuple("folder", "tours")
                .x_www_form_urlencoded_tuple("file", PNG_DATA_URI);
            then.status(200).json_body(serde_json::json!({
                "public_id": "tours/new",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/tours/new.png",
                "width": 1,
                "height": 1
            }));
        })
        .await;

    let client = CloudinaryClient::new(config(&server.base_url())).unwrap();
    let image = client.upload(PNG_DATA_URI).await.unwrap();
    mock.assert_async().await;
    assert_eq!(image.public_id, "tours/new");
    assert!(image.secure_url.starts_with("https://res.cloudinary.com/"));
}

#[tokio::test]
async fn upload_surfaces_rejection() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/demo/image/upload");
            then.status(400)
                .json_body(serde_json::json!({"error": {"message": "Upload preset not found"}}));
        })
        .await;

    let client = CloudinaryClient::new(config(&server.base_url())).unwrap();
    let err = client.upload(PNG_DATA_URI).await.unwrap_err();
    assert!(matches!(err, UploadError::Rejected { status: 400, ref body } if body.contains("preset")));
}

#[tokio::test]
async fn upload_rejects_bad_source_before_network() {
    let client = CloudinaryClient::new(config("http://127.0.0.1:1")).unwrap();
    assert!(matches!(client.upload("not-an-image").await, Err(UploadError::UnsupportedSource)));
}
