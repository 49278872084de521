//! Admin credential service: bootstrap login, registered admins, hashing.
//!
//! The bootstrap admin comes from `ADMIN_USERNAME`/`ADMIN_PASSWORD`. Further
//! admins live in the `admins` table and can only be added by a signed-in
//! admin. This gate keeps casual visitors out of the catalog editor; it is
//! not meant to withstand a determined attacker.

use rand::Rng;
use sha2::{Digest, Sha256};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::session::bytes_to_hex;

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 32;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("username must be 3-32 characters of a-z, 0-9, '.', '_' or '-'")]
    InvalidUsername,
    #[error("password must be at least 8 characters")]
    WeakPassword,
    #[error("admin already exists: {0}")]
    Duplicate(String),
    #[error("admin registration requires a database")]
    NoDatabase,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// HASHING
// =============================================================================

#[must_use]
pub fn generate_salt() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Hex SHA-256 of `salt || password`.
#[must_use]
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    bytes_to_hex(&hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[must_use]
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    constant_time_eq(hash_password(password, salt).as_bytes(), expected_hash.as_bytes())
}

#[must_use]
pub fn normalize_username(raw: &str) -> Option<String> {
    let normalized = raw.trim().to_ascii_lowercase();
    let len_ok = (MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&normalized.len());
    let chars_ok = normalized
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || matches!(b, b'.' | b'_' | b'-'));
    (len_ok && chars_ok).then_some(normalized)
}

// =============================================================================
// BOOTSTRAP CREDENTIALS
// =============================================================================

/// The configured bootstrap admin. Only the salted hash is kept in memory.
#[derive(Debug, Clone)]
pub struct AdminCredentials {
    pub username: String,
    salt: String,
    password_hash: String,
}

impl AdminCredentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        let salt = generate_salt();
        let password_hash = hash_password(password, &salt);
        Self { username: username.trim().to_ascii_lowercase(), salt, password_hash }
    }

    /// Load from `ADMIN_USERNAME` and `ADMIN_PASSWORD`.
    /// Returns `None` if either is missing (admin login disabled).
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let username = std::env::var("ADMIN_USERNAME").ok().filter(|v| !v.trim().is_empty())?;
        let password = std::env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty())?;
        Some(Self::new(&username, &password))
    }

    #[must_use]
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let username_ok = constant_time_eq(self.username.as_bytes(), username.trim().to_ascii_lowercase().as_bytes());
        let password_ok = verify_password(password, &self.salt, &self.password_hash);
        username_ok && password_ok
    }
}

// =============================================================================
// AUTHENTICATION / REGISTRATION
// =============================================================================

/// Check a login against the bootstrap admin, then registered admins.
/// Returns the canonical username.
///
/// # Errors
///
/// Returns `InvalidCredentials` on mismatch, or a database error.
pub async fn authenticate(
    bootstrap: Option<&AdminCredentials>,
    pool: Option<&PgPool>,
    username: &str,
    password: &str,
) -> Result<String, AdminError> {
    if let Some(creds) = bootstrap {
        if creds.matches(username, password) {
            return Ok(creds.username.clone());
        }
    }

    let (Some(pool), Some(username)) = (pool, normalize_username(username)) else {
        return Err(AdminError::InvalidCredentials);
    };

    let row = sqlx::query("SELECT password_salt, password_hash FROM admins WHERE username = $1")
        .bind(&username)
        .fetch_optional(pool)
        .await?;

    let Some(row) = row else {
        return Err(AdminError::InvalidCredentials);
    };
    let salt: String = row.get("password_salt");
    let hash: String = row.get("password_hash");
    if !verify_password(password, &salt, &hash) {
        return Err(AdminError::InvalidCredentials);
    }
    Ok(username)
}

/// Validate a new admin's username and password without touching storage.
///
/// # Errors
///
/// Returns `InvalidUsername`, `WeakPassword`, or `Duplicate` for the bootstrap name.
pub fn check_registration(
    bootstrap: Option<&AdminCredentials>,
    username: &str,
    password: &str,
) -> Result<String, AdminError> {
    let username = normalize_username(username).ok_or(AdminError::InvalidUsername)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AdminError::WeakPassword);
    }
    if bootstrap.is_some_and(|c| c.username == username) {
        return Err(AdminError::Duplicate(username));
    }
    Ok(username)
}

/// Register a new admin account.
///
/// # Errors
///
/// Returns validation errors, `NoDatabase`, `Duplicate`, or a database error.
pub async fn register_admin(
    bootstrap: Option<&AdminCredentials>,
    pool: Option<&PgPool>,
    username: &str,
    password: &str,
) -> Result<Uuid, AdminError> {
    let username = check_registration(bootstrap, username, password)?;
    let pool = pool.ok_or(AdminError::NoDatabase)?;

    let id = Uuid::new_v4();
    let salt = generate_salt();
    let result = sqlx::query(
        "INSERT INTO admins (id, username, password_salt, password_hash)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(id)
    .bind(&username)
    .bind(&salt)
    .bind(hash_password(password, &salt))
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            tracing::info!(%username, "admin registered");
            Ok(id)
        }
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(AdminError::Duplicate(username)),
        Err(e) => Err(AdminError::Database(e)),
    }
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
