//! Public HTML pages.

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use serde::Deserialize;

use super::ClientIp;
use super::enquiries::{SubmitError, process_enquiry, today};
use crate::render::{self, Notice, RenderedPage};
use crate::services::catalog::TourFilterParams;
use crate::services::enquiry::EnquiryForm;
use crate::state::AppState;

/// HTML response carrying a `Link` preload header for the page's images.
fn with_preload(page: RenderedPage) -> Response {
    let mut response = Html(page.html).into_response();
    if let Some(value) = render::preload_link_header(&page.preload).and_then(|link| HeaderValue::from_str(&link).ok()) {
        response.headers_mut().insert(header::LINK, value);
    }
    response
}

fn not_found(state: &AppState, message: &str) -> Response {
    (StatusCode::NOT_FOUND, Html(render::not_found(&state.site, message))).into_response()
}

/// `GET /`
pub async fn home(State(state): State<AppState>) -> Html<String> {
    let catalog = state.store.read().await;
    Html(render::catalog::home(&state.site, &catalog))
}

/// `GET /tours`: list with search, facets, and sort.
pub async fn tours(State(state): State<AppState>, Query(params): Query<TourFilterParams>) -> Html<String> {
    let catalog = state.store.read().await;
    Html(render::catalog::tours(&state.site, &catalog, &params))
}

/// `GET /tours/{id}`
pub async fn tour(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let catalog = state.store.read().await;
    match catalog.tour(&id) {
        Some(tour) => with_preload(render::catalog::tour_detail(&state.site, &catalog, tour)),
        None => not_found(&state, "That tour is no longer available."),
    }
}

/// `GET /offers/{id}`
pub async fn offer(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let catalog = state.store.read().await;
    match catalog.offer(&id) {
        Some(offer) => with_preload(render::catalog::offer_detail(&state.site, offer)),
        None => not_found(&state, "That offer is no longer available."),
    }
}

/// `GET /about`
pub async fn about(State(state): State<AppState>) -> Html<String> {
    let catalog = state.store.read().await;
    Html(render::catalog::about(&state.site, &catalog))
}

/// Optional topic for a pre-filled contact form.
#[derive(Debug, Default, Deserialize)]
pub struct ContactQuery {
    pub tour: Option<String>,
    pub offer: Option<String>,
}

/// `GET /contact`
pub async fn contact(State(state): State<AppState>, Query(query): Query<ContactQuery>) -> Html<String> {
    let catalog = state.store.read().await;
    let tour = query.tour.as_deref().and_then(|id| catalog.tour(id));
    let offer = query.offer.as_deref().and_then(|id| catalog.offer(id));
    let form = EnquiryForm {
        tour_id: tour.map(|t| t.id.clone()),
        offer_id: offer.map(|o| o.id.clone()),
        subject: tour.map(|t| t.title.clone()).or_else(|| offer.map(|o| o.title.clone())),
        ..EnquiryForm::default()
    };
    Html(render::forms::contact(&state.site, &catalog, &form, None))
}

fn sentence_case(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `POST /contact`: validate, forward, and re-render with an inline notice.
pub async fn submit_contact(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    Form(form): Form<EnquiryForm>,
) -> Response {
    if let Err(e) = state.enquiry_limiter.check_and_record(ip) {
        tracing::warn!(%ip, error = %e, "contact form rate limited");
        let notice = Notice::Error {
            message: "You have sent several enquiries in a short time. Please try again later.".into(),
            whatsapp_url: state.site.whatsapp_chat_url(),
        };
        return render_contact(&state, StatusCode::TOO_MANY_REQUESTS, &form, &notice).await;
    }

    match process_enquiry(&state, &form, today()).await {
        Ok(outcome) => {
            let first_name = outcome.enquiry.name.split_whitespace().next().unwrap_or_default();
            let message = if outcome.emailed {
                format!(
                    "Thanks, {first_name}! Your enquiry is on its way. We will reply to {} shortly.",
                    outcome.enquiry.email
                )
            } else {
                format!("Thanks, {first_name}! Send your enquiry to us on WhatsApp to reach a planner straight away.")
            };
            let notice = Notice::Success { message, whatsapp_url: outcome.whatsapp_url };
            let fresh = EnquiryForm { tour_id: form.tour_id, offer_id: form.offer_id, ..EnquiryForm::default() };
            render_contact(&state, StatusCode::OK, &fresh, &notice).await
        }
        Err(SubmitError::Invalid(e)) => {
            let notice = Notice::Error { message: sentence_case(&e.to_string()), whatsapp_url: None };
            render_contact(&state, StatusCode::UNPROCESSABLE_ENTITY, &form, &notice).await
        }
        Err(SubmitError::Mail { whatsapp_url, .. }) => {
            let notice = Notice::Error {
                message: "We could not send your enquiry by email. Please reach us on WhatsApp instead.".into(),
                whatsapp_url,
            };
            render_contact(&state, StatusCode::BAD_GATEWAY, &form, &notice).await
        }
    }
}

async fn render_contact(state: &AppState, status: StatusCode, form: &EnquiryForm, notice: &Notice) -> Response {
    let catalog = state.store.read().await;
    (status, Html(render::forms::contact(&state.site, &catalog, form, Some(notice)))).into_response()
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
