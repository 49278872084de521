//! Public JSON catalog API.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;

use crate::services::catalog::{Difficulty, Offer, Tour, TourFilter, TourFilterParams};
use crate::state::AppState;

/// `GET /api/tours`: tours matching the same filters as `/tours`.
pub async fn list_tours(State(state): State<AppState>, Query(params): Query<TourFilterParams>) -> Json<Vec<Tour>> {
    let filter = TourFilter::from_params(&params);
    let catalog = state.store.read().await;
    Json(catalog.search(&filter).into_iter().cloned().collect())
}

/// `GET /api/tours/{id}`
pub async fn get_tour(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Tour>, StatusCode> {
    let catalog = state.store.read().await;
    catalog.tour(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

/// `GET /api/offers`
pub async fn list_offers(State(state): State<AppState>) -> Json<Vec<Offer>> {
    let catalog = state.store.read().await;
    Json(catalog.offers().to_vec())
}

/// `GET /api/offers/{id}`
pub async fn get_offer(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Offer>, StatusCode> {
    let catalog = state.store.read().await;
    catalog.offer(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

#[derive(Debug, Serialize)]
pub struct FacetsResponse {
    pub categories: Vec<String>,
    pub locations: Vec<String>,
    pub difficulties: Vec<Difficulty>,
}

/// `GET /api/categories`: facet values for building filter UIs.
pub async fn categories(State(state): State<AppState>) -> Json<FacetsResponse> {
    let catalog = state.store.read().await;
    Json(FacetsResponse {
        categories: catalog.categories(),
        locations: catalog.locations(),
        difficulties: Difficulty::ALL.to_vec(),
    })
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
