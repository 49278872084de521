use super::*;
use crate::state::test_helpers;

#[tokio::test]
async fn list_tours_unfiltered_keeps_catalog_order() {
    let state = test_helpers::test_app_state();
    let Json(tours) = list_tours(State(state), Query(TourFilterParams::default())).await;
    let ids: Vec<&str> = tours.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids.first(), Some(&"bali-island-escape"));
    assert_eq!(ids.len(), 6);
}

#[tokio::test]
async fn list_tours_applies_filters_and_sort() {
    let state = test_helpers::test_app_state();
    let params = TourFilterParams {
        max_price: Some("1500".into()),
        sort: Some("price_desc".into()),
        ..TourFilterParams::default()
    };
    let Json(tours) = list_tours(State(state), Query(params)).await;
    let prices: Vec<u32> = tours.iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![1499, 1299, 899, 699]);
}

#[tokio::test]
async fn list_tours_ignores_garbage_params() {
    let state = test_helpers::test_app_state();
    let params = TourFilterParams {
        min_price: Some("cheap".into()),
        difficulty: Some("extreme".into()),
        ..TourFilterParams::default()
    };
    let Json(tours) = list_tours(State(state), Query(params)).await;
    assert_eq!(tours.len(), 6);
}

#[tokio::test]
async fn get_tour_found_and_missing() {
    let state = test_helpers::test_app_state();
    let Json(tour) = get_tour(State(state.clone()), Path("kyoto-heritage-walk".into())).await.unwrap();
    assert_eq!(tour.location, "Kyoto, Japan");
    assert_eq!(get_tour(State(state), Path("nowhere".into())).await.unwrap_err(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn offers_list_and_get() {
    let state = test_helpers::test_app_state();
    let Json(offers) = list_offers(State(state.clone())).await;
    assert_eq!(offers.len(), 3);
    let Json(offer) = get_offer(State(state.clone()), Path("visa-assistance".into())).await.unwrap();
    assert_eq!(offer.icon, "passport");
    assert_eq!(get_offer(State(state), Path("nope".into())).await.unwrap_err(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_lists_sorted_facets() {
    let state = test_helpers::test_app_state();
    let Json(facets) = categories(State(state)).await;
    assert_eq!(facets.categories, vec!["Adventure", "Beach", "City", "Cultural", "Wildlife"]);
    assert_eq!(facets.locations.len(), 6);
    let json = serde_json::to_value(&facets.difficulties).unwrap();
    assert_eq!(json, serde_json::json!(["easy", "moderate", "challenging"]));
}
