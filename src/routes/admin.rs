//! Admin API: login, sessions, admin registration, catalog CRUD, image uploads.

use axum::extract::{FromRef, Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enquiries::rate_limited_response;
use super::{ClientIp, ErrorBody, json_error};
use crate::rate_limit::RateLimitError;
use crate::services::admin::{self as admin_svc, AdminError};
use crate::services::catalog::{CatalogError, Offer, OfferDraft, Tour, TourDraft};
use crate::services::cloudinary::{UploadError, UploadedImage};
use crate::services::session::AdminSession;
use crate::state::AppState;

pub(crate) const SESSION_COOKIE: &str = "admin_session";

// =============================================================================
// COOKIES
// =============================================================================

pub(crate) fn session_cookie(token: String, secure: bool, ttl_secs: u64) -> Cookie<'static> {
    let max_age = time::Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX));
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

pub(crate) fn clear_session_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

fn bearer_token(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Live session for the request's cookie, if any.
pub(crate) fn session_from_jar(state: &AppState, jar: &CookieJar) -> Option<(String, AdminSession)> {
    let token = jar.get(SESSION_COOKIE).map(Cookie::value)?;
    state.sessions.validate(token).map(|s| (token.to_owned(), s))
}

// =============================================================================
// AUTH EXTRACTOR
// =============================================================================

/// Signed-in admin, from the session cookie or an `Authorization: Bearer` token.
/// Use as a handler parameter to require an admin.
pub struct AdminUser {
    pub session: AdminSession,
    pub token: String,
}

impl<S> axum::extract::FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut axum::http::request::Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(SESSION_COOKIE)
            .map(Cookie::value)
            .filter(|t| !t.is_empty())
            .or_else(|| bearer_token(&parts.headers))
            .ok_or(StatusCode::UNAUTHORIZED)?;

        let session = app_state.sessions.validate(token).ok_or(StatusCode::UNAUTHORIZED)?;
        Ok(Self { session, token: token.to_owned() })
    }
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn catalog_error_to_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::DuplicateId(_) => StatusCode::CONFLICT,
        CatalogError::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn admin_error_to_status(err: &AdminError) -> StatusCode {
    match err {
        AdminError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        AdminError::InvalidUsername | AdminError::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
        AdminError::Duplicate(_) => StatusCode::CONFLICT,
        AdminError::NoDatabase => StatusCode::SERVICE_UNAVAILABLE,
        AdminError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn upload_error_to_status(err: &UploadError) -> StatusCode {
    match err {
        UploadError::UnsupportedSource => StatusCode::UNPROCESSABLE_ENTITY,
        UploadError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        UploadError::Request(_) | UploadError::Rejected { .. } | UploadError::Parse(_) => StatusCode::BAD_GATEWAY,
        UploadError::HttpClientBuild(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn catalog_error_response(err: &CatalogError) -> Response {
    let status = catalog_error_to_status(err);
    let field = match err {
        CatalogError::Invalid { field, .. } => Some(*field),
        _ => None,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "catalog write failed");
        return json_error(status, "failed to save changes");
    }
    (status, Json(ErrorBody { error: err.to_string(), field })).into_response()
}

// =============================================================================
// LOGIN
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("admin login is not configured")]
    Disabled,
    #[error(transparent)]
    RateLimited(#[from] RateLimitError),
    #[error(transparent)]
    Admin(#[from] AdminError),
}

impl LoginError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Disabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Admin(e) => admin_error_to_status(e),
        }
    }
}

/// Check credentials and open a session. Returns `(token, username)`.
///
/// # Errors
///
/// Returns `Disabled`, `RateLimited`, or the underlying `AdminError`.
pub async fn attempt_login(
    state: &AppState,
    client: ClientIp,
    username: &str,
    password: &str,
) -> Result<(String, String), LoginError> {
    if !state.admin_enabled() {
        return Err(LoginError::Disabled);
    }
    state.login_limiter.check_and_record(client.0)?;

    let username = admin_svc::authenticate(state.admin_credentials.as_ref(), state.store.pool(), username, password)
        .await
        .inspect_err(|e| tracing::warn!(ip = %client.0, error = %e, "admin login failed"))?;

    let token = state.sessions.create(&username);
    tracing::info!(%username, active_sessions = state.sessions.len(), "admin signed in");
    Ok((token, username))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
    pub expires_in: u64,
}

/// `POST /api/admin/login`: set the session cookie and return the token.
pub async fn login(State(state): State<AppState>, client: ClientIp, Json(body): Json<LoginRequest>) -> Response {
    match attempt_login(&state, client, &body.username, &body.password).await {
        Ok((token, username)) => {
            let ttl = state.sessions.ttl().as_secs();
            let jar = CookieJar::new().add(session_cookie(token.clone(), state.site.secure_cookies, ttl));
            (jar, Json(LoginResponse { username, token, expires_in: ttl })).into_response()
        }
        Err(LoginError::RateLimited(e)) => rate_limited_response(&e),
        Err(LoginError::Admin(AdminError::Database(_))) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "login is temporarily unavailable")
        }
        Err(e) => json_error(e.status(), e.to_string()),
    }
}

/// `POST /api/admin/logout`: revoke the session, clear the cookie.
pub async fn logout(State(state): State<AppState>, admin: AdminUser) -> impl IntoResponse {
    state.sessions.revoke(&admin.token);
    let jar = CookieJar::new().add(clear_session_cookie(state.site.secure_cookies));
    (jar, StatusCode::NO_CONTENT)
}

/// `GET /api/admin/me`: current admin.
pub async fn me(admin: AdminUser) -> Json<AdminSession> {
    Json(admin.session)
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub username: String,
}

/// `POST /api/admin/admins`: register another admin (database required).
pub async fn register(State(state): State<AppState>, admin: AdminUser, Json(body): Json<RegisterRequest>) -> Response {
    let result = admin_svc::register_admin(
        state.admin_credentials.as_ref(),
        state.store.pool(),
        &body.username,
        &body.password,
    )
    .await;
    match result {
        Ok(id) => {
            let username = body.username.trim().to_ascii_lowercase();
            tracing::info!(%username, by = %admin.session.username, "admin account created");
            (StatusCode::CREATED, Json(RegisterResponse { id, username })).into_response()
        }
        Err(AdminError::Database(e)) => {
            tracing::error!(error = %e, "admin registration failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "failed to register admin")
        }
        Err(e) => json_error(admin_error_to_status(&e), e.to_string()),
    }
}

// =============================================================================
// CATALOG CRUD
// =============================================================================

/// `POST /api/admin/tours`
pub async fn create_tour(State(state): State<AppState>, admin: AdminUser, Json(draft): Json<TourDraft>) -> Response {
    match state.store.create_tour(draft).await {
        Ok(tour) => {
            tracing::info!(tour_id = %tour.id, admin = %admin.session.username, "tour created");
            (StatusCode::CREATED, Json(tour)).into_response()
        }
        Err(e) => catalog_error_response(&e),
    }
}

/// `PUT /api/admin/tours/{id}`
pub async fn update_tour(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<TourDraft>,
) -> Response {
    match state.store.update_tour(&id, draft).await {
        Ok(tour) => {
            tracing::info!(tour_id = %tour.id, admin = %admin.session.username, "tour updated");
            Json::<Tour>(tour).into_response()
        }
        Err(e) => catalog_error_response(&e),
    }
}

/// `DELETE /api/admin/tours/{id}`
pub async fn delete_tour(State(state): State<AppState>, admin: AdminUser, Path(id): Path<String>) -> Response {
    match state.store.delete_tour(&id).await {
        Ok(tour) => {
            tracing::info!(tour_id = %tour.id, admin = %admin.session.username, "tour deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => catalog_error_response(&e),
    }
}

/// `POST /api/admin/offers`
pub async fn create_offer(State(state): State<AppState>, admin: AdminUser, Json(draft): Json<OfferDraft>) -> Response {
    match state.store.create_offer(draft).await {
        Ok(offer) => {
            tracing::info!(offer_id = %offer.id, admin = %admin.session.username, "offer created");
            (StatusCode::CREATED, Json(offer)).into_response()
        }
        Err(e) => catalog_error_response(&e),
    }
}

/// `PUT /api/admin/offers/{id}`
pub async fn update_offer(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<OfferDraft>,
) -> Response {
    match state.store.update_offer(&id, draft).await {
        Ok(offer) => {
            tracing::info!(offer_id = %offer.id, admin = %admin.session.username, "offer updated");
            Json::<Offer>(offer).into_response()
        }
        Err(e) => catalog_error_response(&e),
    }
}

/// `DELETE /api/admin/offers/{id}`
pub async fn delete_offer(State(state): State<AppState>, admin: AdminUser, Path(id): Path<String>) -> Response {
    match state.store.delete_offer(&id).await {
        Ok(offer) => {
            tracing::info!(offer_id = %offer.id, admin = %admin.session.username, "offer deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => catalog_error_response(&e),
    }
}

// =============================================================================
// IMAGES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    /// `data:image/...;base64,...` or an `http(s)://` URL.
    pub source: String,
}

/// `POST /api/admin/images`: upload to Cloudinary and return the hosted URL.
pub async fn upload_image(State(state): State<AppState>, admin: AdminUser, Json(body): Json<UploadRequest>) -> Response {
    let Some(images) = &state.images else {
        return json_error(StatusCode::SERVICE_UNAVAILABLE, "image uploads are not configured");
    };
    match images.upload(&body.source).await {
        Ok(image) => {
            tracing::info!(public_id = %image.public_id, admin = %admin.session.username, "image uploaded");
            (StatusCode::CREATED, Json::<UploadedImage>(image)).into_response()
        }
        Err(e) => {
            let status = upload_error_to_status(&e);
            if status == StatusCode::BAD_GATEWAY || status == StatusCode::INTERNAL_SERVER_ERROR {
                tracing::error!(error = %e, "image upload failed");
            }
            json_error(status, e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
