use super::*;
#[cfg(feature = "live-db-tests")]
use crate::services::seed;

// =============================================================================
// Column conversions
// =============================================================================

#[test]
fn count_to_column_is_lossless_for_catalog_values() {
    use crate::services::catalog::MAX_STORED_COUNT;

    for value in [0, 2499, MAX_STORED_COUNT] {
        assert_eq!(count_from_column(count_to_column(value)), value);
    }
}

#[test]
fn count_from_column_clamps_negative_to_zero() {
    assert_eq!(count_from_column(42), 42);
    assert_eq!(count_from_column(-1), 0);
}

#[test]
fn difficulty_from_column_falls_back_to_moderate() {
    assert_eq!(difficulty_from_column("easy"), Difficulty::Easy);
    assert_eq!(difficulty_from_column("CHALLENGING"), Difficulty::Challenging);
    assert_eq!(difficulty_from_column("???"), Difficulty::Moderate);
}

// =============================================================================
// Live database round trip (requires DATABASE_URL and --features live-db-tests)
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
async fn seed_then_load_preserves_order() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required for live-db-tests");
    let pool = crate::db::init_pool(&url).await.expect("pool");
    sqlx::query("TRUNCATE tours, offers").execute(&pool).await.expect("truncate");

    let catalog = seed::default_catalog().expect("seed");
    seed_catalog(&pool, &catalog).await.expect("seed catalog");

    let loaded = load_catalog(&pool).await.expect("load").expect("non-empty");
    let expected: Vec<&str> = catalog.tours().iter().map(|t| t.id.as_str()).collect();
    let actual: Vec<&str> = loaded.tours().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(actual, expected);

    let mut tour = loaded.tours()[0].clone();
    tour.price += 1;
    update_tour(&pool, &tour).await.expect("update");
    delete_tour(&pool, &loaded.tours()[1].id).await.expect("delete");

    let reloaded = load_catalog(&pool).await.expect("reload").expect("non-empty");
    assert_eq!(reloaded.tours()[0].price, tour.price);
    assert_eq!(reloaded.tours().len(), catalog.tours().len() - 1);
}
