//! Optional Postgres storage for the catalog and registered admins.
//!
//! Without `DATABASE_URL` the site runs from the seed catalog in memory.
//! With it, startup connects, applies the `tours`/`offers`/`admins` schema,
//! and the catalog store hydrates from those tables.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::rate_limit::env_parse;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// `DATABASE_URL`, ignoring blank values.
#[must_use]
pub fn database_url() -> Option<String> {
    std::env::var("DATABASE_URL")
        .ok()
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Connect with `DB_MAX_CONNECTIONS` / `DB_ACQUIRE_TIMEOUT_SECS` and migrate.
///
/// # Errors
///
/// Returns an error if the connection or a migration fails.
pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(env_parse("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS))
        .acquire_timeout(Duration::from_secs(env_parse(
            "DB_ACQUIRE_TIMEOUT_SECS",
            DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )))
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;
    tracing::info!("catalog schema up to date");

    Ok(pool)
}

/// Pool for `DATABASE_URL`, or `None` when the site runs in memory.
///
/// # Errors
///
/// Returns an error if a database is configured but unreachable.
pub async fn connect_from_env() -> Result<Option<PgPool>, sqlx::Error> {
    match database_url() {
        Some(url) => init_pool(&url).await.map(Some),
        None => Ok(None),
    }
}
