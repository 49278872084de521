//! Persistence service: catalog and admin rows in Postgres.
//!
//! DESIGN
//! ======
//! The database mirrors the in-memory catalog. Rows carry a `position`
//! column so catalog order survives restarts: inserts take `MAX(position)+1`,
//! updates never touch it, deletes leave gaps that ordering ignores.
//!
//! ERROR HANDLING
//! ==============
//! Every function returns the raw `sqlx::Error`; the catalog store decides
//! whether to roll back its in-memory change.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, warn};

use super::catalog::{Catalog, Difficulty, Offer, Tour};

// =============================================================================
// COLUMN CONVERSIONS
// =============================================================================

pub(crate) fn count_to_column(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

pub(crate) fn count_from_column(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

pub(crate) fn difficulty_from_column(raw: &str) -> Difficulty {
    Difficulty::from_str(raw).unwrap_or_else(|| {
        warn!(difficulty = raw, "unknown difficulty in database; using moderate");
        Difficulty::Moderate
    })
}

fn tour_from_row(row: &PgRow) -> Tour {
    let difficulty: String = row.get("difficulty");
    Tour {
        id: row.get("id"),
        title: row.get("title"),
        location: row.get("location"),
        price: count_from_column(row.get("price")),
        duration: row.get("duration"),
        description: row.get("description"),
        images: row.get("images"),
        rating: row.get("rating"),
        reviews: count_from_column(row.get("reviews")),
        difficulty: difficulty_from_column(&difficulty),
        category: row.get("category"),
    }
}

fn offer_from_row(row: &PgRow) -> Offer {
    Offer {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        details: row.get("details"),
        image: row.get("image"),
        icon: row.get("icon"),
        color: row.get("color"),
    }
}

// =============================================================================
// HYDRATION
// =============================================================================

/// Load the full catalog in stored order. `None` when both tables are empty.
///
/// # Errors
///
/// Returns a database error if either query fails.
pub async fn load_catalog(pool: &PgPool) -> Result<Option<Catalog>, sqlx::Error> {
    let tours: Vec<Tour> = sqlx::query(
        "SELECT id, title, location, price, duration, description, images, rating, reviews, difficulty, category
         FROM tours
         ORDER BY position ASC, id ASC",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(tour_from_row)
    .collect();

    let offers: Vec<Offer> = sqlx::query(
        "SELECT id, title, description, details, image, icon, color
         FROM offers
         ORDER BY position ASC, id ASC",
    )
    .fetch_all(pool)
    .await?
    .iter()
    .map(offer_from_row)
    .collect();

    if tours.is_empty() && offers.is_empty() {
        return Ok(None);
    }
    Ok(Some(Catalog::new(tours, offers)))
}

/// Write every record of `catalog` in one transaction, preserving order.
///
/// # Errors
///
/// Returns a database error; the transaction is rolled back on failure.
pub async fn seed_catalog(pool: &PgPool, catalog: &Catalog) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    for (position, tour) in catalog.tours().iter().enumerate() {
        sqlx::query(
            "INSERT INTO tours
                (id, position, title, location, price, duration, description, images, rating, reviews, difficulty, category)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&tour.id)
        .bind(count_to_column(u32::try_from(position).unwrap_or(u32::MAX)))
        .bind(&tour.title)
        .bind(&tour.location)
        .bind(count_to_column(tour.price))
        .bind(&tour.duration)
        .bind(&tour.description)
        .bind(&tour.images)
        .bind(tour.rating)
        .bind(count_to_column(tour.reviews))
        .bind(tour.difficulty.as_str())
        .bind(&tour.category)
        .execute(&mut *tx)
        .await?;
    }

    for (position, offer) in catalog.offers().iter().enumerate() {
        sqlx::query(
            "INSERT INTO offers (id, position, title, description, details, image, icon, color)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(&offer.id)
        .bind(count_to_column(u32::try_from(position).unwrap_or(u32::MAX)))
        .bind(&offer.title)
        .bind(&offer.description)
        .bind(&offer.details)
        .bind(&offer.image)
        .bind(&offer.icon)
        .bind(&offer.color)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    info!(tours = catalog.tours().len(), offers = catalog.offers().len(), "seeded catalog tables");
    Ok(())
}

// =============================================================================
// TOURS
// =============================================================================

/// Append a tour after the current last position.
///
/// # Errors
///
/// Returns a database error, including a unique violation for a taken id.
pub async fn insert_tour(pool: &PgPool, tour: &Tour) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO tours
            (id, position, title, location, price, duration, description, images, rating, reviews, difficulty, category)
         VALUES ($1, (SELECT COALESCE(MAX(position) + 1, 0) FROM tours), $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(&tour.id)
    .bind(&tour.title)
    .bind(&tour.location)
    .bind(count_to_column(tour.price))
    .bind(&tour.duration)
    .bind(&tour.description)
    .bind(&tour.images)
    .bind(tour.rating)
    .bind(count_to_column(tour.reviews))
    .bind(tour.difficulty.as_str())
    .bind(&tour.category)
    .execute(pool)
    .await?;
    Ok(())
}

/// Overwrite a tour's fields, keeping its position.
///
/// # Errors
///
/// Returns `RowNotFound` if no row has this id.
pub async fn update_tour(pool: &PgPool, tour: &Tour) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        "UPDATE tours
         SET title = $2, location = $3, price = $4, duration = $5, description = $6,
             images = $7, rating = $8, reviews = $9, difficulty = $10, category = $11,
             updated_at = now()
         WHERE id = $1",
    )
    .bind(&tour.id)
    .bind(&tour.title)
    .bind(&tour.location)
    .bind(count_to_column(tour.price))
    .bind(&tour.duration)
    .bind(&tour.description)
    .bind(&tour.images)
    .bind(tour.rating)
    .bind(count_to_column(tour.reviews))
    .bind(tour.difficulty.as_str())
    .bind(&tour.category)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete_tour(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM tours WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// =============================================================================
// OFFERS
// =============================================================================

/// # Errors
///
/// Returns a database error, including a unique violation for a taken id.
pub async fn insert_offer(pool: &PgPool, offer: &Offer) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO offers (id, position, title, description, details, image, icon, color)
         VALUES ($1, (SELECT COALESCE(MAX(position) + 1, 0) FROM offers), $2, $3, $4, $5, $6, $7)",
    )
    .bind(&offer.id)
    .bind(&offer.title)
    .bind(&offer.description)
    .bind(&offer.details)
    .bind(&offer.image)
    .bind(&offer.icon)
    .bind(&offer.color)
    .execute(pool)
    .await?;
    Ok(())
}

/// # Errors
///
/// Returns `RowNotFound` if no row has this id.
pub async fn update_offer(pool: &PgPool, offer: &Offer) -> Result<(), sqlx::Error> {
    let result = sqlx::query(
        "UPDATE offers
         SET title = $2, description = $3, details = $4, image = $5, icon = $6, color = $7,
             updated_at = now()
         WHERE id = $1",
    )
    .bind(&offer.id)
    .bind(&offer.title)
    .bind(&offer.description)
    .bind(&offer.details)
    .bind(&offer.image)
    .bind(&offer.icon)
    .bind(&offer.color)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(sqlx::Error::RowNotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns a database error if the delete fails.
pub async fn delete_offer(pool: &PgPool, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM offers WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
#[path = "persistence_test.rs"]
mod tests;
