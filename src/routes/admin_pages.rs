//! Admin HTML pages: sign-in form and catalog dashboard.
//!
//! The dashboard itself edits records through the JSON admin API
//! (`static/js/admin.js`), authenticated by the same session cookie.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::ClientIp;
use super::admin::{LoginError, attempt_login, clear_session_cookie, session_cookie, session_from_jar};
use crate::render::admin::DashboardStatus;
use crate::render::{self, Notice};
use crate::services::admin::AdminError;
use crate::state::AppState;

fn login_notice(err: &LoginError) -> String {
    match err {
        LoginError::Disabled => "Admin sign-in is not configured on this server.".into(),
        LoginError::RateLimited(_) => "Too many sign-in attempts. Please wait a few minutes.".into(),
        LoginError::Admin(AdminError::InvalidCredentials) => "Invalid username or password.".into(),
        LoginError::Admin(_) => "Sign-in is temporarily unavailable.".into(),
    }
}

/// `GET /admin/login`
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    if session_from_jar(&state, &jar).is_some() {
        return Redirect::to("/admin").into_response();
    }
    let notice = (!state.admin_enabled()).then(|| Notice::Error {
        message: login_notice(&LoginError::Disabled),
        whatsapp_url: None,
    });
    Html(render::admin::login(&state.site, "", notice.as_ref())).into_response()
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// `POST /admin/login`: on success set the cookie and go to the dashboard.
pub async fn login_submit(State(state): State<AppState>, client: ClientIp, Form(form): Form<LoginForm>) -> Response {
    match attempt_login(&state, client, &form.username, &form.password).await {
        Ok((token, _)) => {
            let cookie = session_cookie(token, state.site.secure_cookies, state.sessions.ttl().as_secs());
            (CookieJar::new().add(cookie), Redirect::to("/admin")).into_response()
        }
        Err(e) => {
            let notice = Notice::Error { message: login_notice(&e), whatsapp_url: None };
            let html = render::admin::login(&state.site, form.username.trim(), Some(&notice));
            (e.status(), Html(html)).into_response()
        }
    }
}

/// `GET /admin`: dashboard, or a redirect to the sign-in form.
pub async fn dashboard(State(state): State<AppState>, jar: CookieJar) -> Response {
    let Some((_, session)) = session_from_jar(&state, &jar) else {
        return Redirect::to("/admin/login").into_response();
    };
    let status = DashboardStatus { has_database: state.store.has_database(), uploads_enabled: state.images.is_some() };
    let catalog = state.store.read().await;
    Html(render::admin::dashboard(&state.site, &catalog, &session.username, status)).into_response()
}

/// `POST /admin/logout`
pub async fn logout_submit(State(state): State<AppState>, jar: CookieJar) -> Response {
    if let Some((token, session)) = session_from_jar(&state, &jar) {
        state.sessions.revoke(&token);
        tracing::info!(username = %session.username, "admin signed out");
    }
    let jar = CookieJar::new().add(clear_session_cookie(state.site.secure_cookies));
    (jar, Redirect::to("/")).into_response()
}

/// `GET /admin/{*rest}`: unknown admin paths land on the dashboard.
pub async fn redirect_to_dashboard() -> Redirect {
    Redirect::to("/admin")
}

#[cfg(test)]
#[path = "admin_pages_test.rs"]
mod tests;
