//! Seed catalog loading.
//!
//! The default catalog ships inside the binary (`data/catalog.yaml`).
//! `CATALOG_PATH` points at a replacement YAML file on disk.

use serde::Deserialize;

use super::catalog::{Catalog, CatalogError, OfferDraft, TourDraft};

const DEFAULT_CATALOG: &str = include_str!("../../data/catalog.yaml");

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("malformed catalog yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid catalog entry: {0}")]
    Catalog(#[from] CatalogError),
}

#[derive(Debug, Default, Deserialize)]
struct SeedFile {
    #[serde(default)]
    tours: Vec<TourDraft>,
    #[serde(default)]
    offers: Vec<OfferDraft>,
}

/// Parse a YAML catalog document.
///
/// # Errors
///
/// Returns an error on malformed YAML or when an entry fails catalog validation.
pub fn parse_catalog(yaml: &str) -> Result<Catalog, SeedError> {
    let file: SeedFile = serde_yaml::from_str(yaml)?;
    Ok(Catalog::from_drafts(file.tours, file.offers)?)
}

/// Load the seed catalog, honoring `CATALOG_PATH` when set.
///
/// # Errors
///
/// Returns an error if the override file cannot be read or parsed.
pub fn load_seed_catalog() -> Result<Catalog, SeedError> {
    match std::env::var("CATALOG_PATH") {
        Ok(path) if !path.trim().is_empty() => {
            let yaml = std::fs::read_to_string(&path).map_err(|source| SeedError::Read { path: path.clone(), source })?;
            tracing::info!(%path, "loading catalog override");
            parse_catalog(&yaml)
        }
        _ => default_catalog(),
    }
}

/// The embedded default catalog.
///
/// # Errors
///
/// Returns an error only if the embedded file is broken.
pub fn default_catalog() -> Result<Catalog, SeedError> {
    parse_catalog(DEFAULT_CATALOG)
}

#[cfg(test)]
#[path = "seed_test.rs"]
mod tests;
