//! Catalog store: shared in-memory catalog with optional write-through.
//!
//! DESIGN
//! ======
//! Pages read the catalog under a `RwLock` read guard. Admin writes take the
//! write lock, apply the change in memory, then persist it while still holding
//! the lock so concurrent admin writes serialize against the database too.
//!
//! ERROR HANDLING
//! ==============
//! A failed database write undoes the in-memory change before the error is
//! returned. Nothing is retried; the admin sees the failure and resubmits.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::{RwLock, RwLockReadGuard};
use tracing::{error, info};

use super::catalog::{Catalog, CatalogError, Offer, OfferDraft, Tour, TourDraft};
use super::persistence;

#[derive(Clone)]
pub struct CatalogStore {
    catalog: Arc<RwLock<Catalog>>,
    pool: Option<PgPool>,
}

fn map_write_error(err: sqlx::Error, id: &str) -> CatalogError {
    match err {
        sqlx::Error::RowNotFound => CatalogError::NotFound(id.to_owned()),
        sqlx::Error::Database(db) if db.is_unique_violation() => CatalogError::DuplicateId(id.to_owned()),
        other => CatalogError::Database(other),
    }
}

impl CatalogStore {
    #[must_use]
    pub fn new(catalog: Catalog, pool: Option<PgPool>) -> Self {
        Self { catalog: Arc::new(RwLock::new(catalog)), pool }
    }

    #[must_use]
    pub fn in_memory(catalog: Catalog) -> Self {
        Self::new(catalog, None)
    }

    /// Build the store for startup. With a database, stored rows win; an empty
    /// database is filled from `seed`. Without one, `seed` is used as-is.
    ///
    /// # Errors
    ///
    /// Returns a database error if loading or seeding fails.
    pub async fn hydrate(pool: Option<PgPool>, seed: Catalog) -> Result<Self, CatalogError> {
        let Some(pool) = pool else {
            info!(tours = seed.tours().len(), offers = seed.offers().len(), "catalog running in memory only");
            return Ok(Self::in_memory(seed));
        };

        let catalog = match persistence::load_catalog(&pool).await? {
            Some(stored) => {
                info!(tours = stored.tours().len(), offers = stored.offers().len(), "catalog hydrated from database");
                stored
            }
            None => {
                persistence::seed_catalog(&pool, &seed).await?;
                seed
            }
        };
        Ok(Self::new(catalog, Some(pool)))
    }

    #[must_use]
    pub fn has_database(&self) -> bool {
        self.pool.is_some()
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Read access for renderers and API handlers.
    pub async fn read(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.read().await
    }

    // -------------------------------------------------------------------------
    // Tours
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns validation, duplicate-id, or database errors.
    pub async fn create_tour(&self, draft: TourDraft) -> Result<Tour, CatalogError> {
        let mut catalog = self.catalog.write().await;
        let tour = catalog.insert_tour(draft)?;
        if let Some(pool) = &self.pool {
            if let Err(e) = persistence::insert_tour(pool, &tour).await {
                error!(error = %e, tour_id = %tour.id, "tour insert failed; rolling back");
                let _ = catalog.remove_tour(&tour.id);
                return Err(map_write_error(e, &tour.id));
            }
        }
        Ok(tour)
    }

    /// # Errors
    ///
    /// Returns not-found, validation, or database errors.
    pub async fn update_tour(&self, id: &str, draft: TourDraft) -> Result<Tour, CatalogError> {
        let mut catalog = self.catalog.write().await;
        let (tour, previous) = catalog.replace_tour(id, draft)?;
        if let Some(pool) = &self.pool {
            if let Err(e) = persistence::update_tour(pool, &tour).await {
                error!(error = %e, tour_id = %id, "tour update failed; rolling back");
                catalog.revert_tour(previous);
                return Err(map_write_error(e, id));
            }
        }
        Ok(tour)
    }

    /// # Errors
    ///
    /// Returns not-found or database errors.
    pub async fn delete_tour(&self, id: &str) -> Result<Tour, CatalogError> {
        let mut catalog = self.catalog.write().await;
        let (index, tour) = catalog.remove_tour(id)?;
        if let Some(pool) = &self.pool {
            if let Err(e) = persistence::delete_tour(pool, id).await {
                error!(error = %e, tour_id = %id, "tour delete failed; rolling back");
                catalog.restore_tour(index, tour);
                return Err(map_write_error(e, id));
            }
        }
        Ok(tour)
    }

    // -------------------------------------------------------------------------
    // Offers
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns validation, duplicate-id, or database errors.
    pub async fn create_offer(&self, draft: OfferDraft) -> Result<Offer, CatalogError> {
        let mut catalog = self.catalog.write().await;
        let offer = catalog.insert_offer(draft)?;
        if let Some(pool) = &self.pool {
            if let Err(e) = persistence::insert_offer(pool, &offer).await {
                error!(error = %e, offer_id = %offer.id, "offer insert failed; rolling back");
                let _ = catalog.remove_offer(&offer.id);
                return Err(map_write_error(e, &offer.id));
            }
        }
        Ok(offer)
    }

    /// # Errors
    ///
    /// Returns not-found, validation, or database errors.
    pub async fn update_offer(&self, id: &str, draft: OfferDraft) -> Result<Offer, CatalogError> {
        let mut catalog = self.catalog.write().await;
        let (offer, previous) = catalog.replace_offer(id, draft)?;
        if let Some(pool) = &self.pool {
            if let Err(e) = persistence::update_offer(pool, &offer).await {
                error!(error = %e, offer_id = %id, "offer update failed; rolling back");
                catalog.revert_offer(previous);
                return Err(map_write_error(e, id));
            }
        }
        Ok(offer)
    }

    /// # Errors
    ///
    /// Returns not-found or database errors.
    pub async fn delete_offer(&self, id: &str) -> Result<Offer, CatalogError> {
        let mut catalog = self.catalog.write().await;
        let (index, offer) = catalog.remove_offer(id)?;
        if let Some(pool) = &self.pool {
            if let Err(e) = persistence::delete_offer(pool, id).await {
                error!(error = %e, offer_id = %id, "offer delete failed; rolling back");
                catalog.restore_offer(index, offer);
                return Err(map_write_error(e, id));
            }
        }
        Ok(offer)
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
