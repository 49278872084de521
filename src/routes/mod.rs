//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the public HTML pages, the JSON catalog and
//! enquiry API, the admin API and pages, and static assets from
//! `STATIC_DIR` under `/static`. Anything else falls through to an HTML 404.

pub mod admin;
pub mod admin_pages;
pub mod catalog;
pub mod enquiries;
pub mod pages;

use std::convert::Infallible;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::Router;
use axum::extract::{ConnectInfo, DefaultBodyLimit, FromRef, FromRequestParts, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use serde::Serialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::render;
use crate::state::AppState;

/// Data URIs for uploads can be large; everything else keeps Axum's default.
const UPLOAD_BODY_LIMIT: usize = 16 * 1024 * 1024;

/// JSON API routes: public catalog, enquiries, and the admin API.
fn api_routes() -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/tours", get(catalog::list_tours))
        .route("/api/tours/{id}", get(catalog::get_tour))
        .route("/api/offers", get(catalog::list_offers))
        .route("/api/offers/{id}", get(catalog::get_offer))
        .route("/api/categories", get(catalog::categories))
        .route("/api/enquiries", post(enquiries::create_enquiry))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/me", get(admin::me))
        .route("/api/admin/admins", post(admin::register))
        .route("/api/admin/tours", post(admin::create_tour))
        .route("/api/admin/tours/{id}", put(admin::update_tour).delete(admin::delete_tour))
        .route("/api/admin/offers", post(admin::create_offer))
        .route("/api/admin/offers/{id}", put(admin::update_offer).delete(admin::delete_offer))
        .route(
            "/api/admin/images",
            post(admin::upload_image).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .layer(cors)
}

/// HTML pages, public and admin.
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::home))
        .route("/tours", get(pages::tours))
        .route("/tours/{id}", get(pages::tour))
        .route("/offers/{id}", get(pages::offer))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact).post(pages::submit_contact))
        .route("/admin", get(admin_pages::dashboard))
        .route("/admin/login", get(admin_pages::login_page).post(admin_pages::login_submit))
        .route("/admin/logout", post(admin_pages::logout_submit))
        .route("/admin/{*rest}", get(admin_pages::redirect_to_dashboard))
}

/// Full application router.
pub fn app(state: AppState) -> Router {
    let static_dir = ServeDir::new(&state.site.static_dir);

    page_routes()
        .merge(api_routes())
        .route("/healthz", get(healthz))
        .nest_service("/static", static_dir)
        .fallback(not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found(State(state): State<AppState>) -> Response {
    let html = render::not_found(&state.site, "We could not find the page you were looking for.");
    (StatusCode::NOT_FOUND, Html(html)).into_response()
}

// =============================================================================
// SHARED RESPONSE SHAPES
// =============================================================================

/// JSON error body. `field` names the offending input when there is one.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

pub(crate) fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into(), field: None })).into_response()
}

// =============================================================================
// CLIENT ADDRESS EXTRACTOR
// =============================================================================

/// Client address used as the rate-limit key.
///
/// Uses the first `X-Forwarded-For` entry when `TRUST_FORWARDED_FOR` is set,
/// otherwise the socket peer. Never rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientIp(pub IpAddr);

pub(crate) fn resolve_client_ip(headers: &HeaderMap, peer: Option<IpAddr>, trust_forwarded_for: bool) -> IpAddr {
    let forwarded = trust_forwarded_for
        .then(|| headers.get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|v| v.trim().parse::<IpAddr>().ok());
    forwarded
        .or(peer)
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

impl<S> FromRequestParts<S> for ClientIp
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Self(resolve_client_ip(&parts.headers, peer, app_state.site.trust_forwarded_for)))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
