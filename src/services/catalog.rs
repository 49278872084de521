//! Catalog service: tours, offers, search, and CRUD over the in-memory list.
//!
//! DESIGN
//! ======
//! The catalog is a pair of ordered vectors. Order is insertion order: new
//! records are appended, replacements keep their slot, and removals splice the
//! record out. `id` uniqueness within each collection is the only invariant.
//!
//! Removal returns the vacated index so a caller whose write-through failed
//! can put the record back exactly where it was.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

const MAX_RATING: f32 = 5.0;
const MAX_ID_LEN: usize = 80;
const MAX_COLOR_NAME_LEN: usize = 24;

/// Largest price or review count the `INTEGER` columns can hold.
pub const MAX_STORED_COUNT: u32 = i32::MAX.unsigned_abs();

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: &'static str },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Moderate,
    Challenging,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Challenging => "challenging",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Moderate => "Moderate",
            Self::Challenging => "Challenging",
        }
    }

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Self::Easy),
            "moderate" => Some(Self::Moderate),
            "challenging" | "hard" => Some(Self::Challenging),
            _ => None,
        }
    }

    pub const ALL: [Self; 3] = [Self::Easy, Self::Moderate, Self::Challenging];
}

/// A bookable travel package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: String,
    pub title: String,
    pub location: String,
    /// Whole currency units.
    pub price: u32,
    pub duration: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: u32,
    pub difficulty: Difficulty,
    pub category: String,
}

impl Tour {
    /// First gallery image, used for cards and social previews.
    #[must_use]
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// A promotional service shown on the home page and at `/offers/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

/// Admin/seed input for a tour. `id` is derived from the title when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct TourDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub location: String,
    pub price: u32,
    pub duration: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub reviews: u32,
    pub difficulty: Difficulty,
    pub category: String,
}

/// Admin/seed input for an offer.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferDraft {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub details: Vec<String>,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
}

// =============================================================================
// FILTERING
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TourSort {
    /// Catalog order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    Rating,
    Title,
}

impl TourSort {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Rating => "rating",
            Self::Title => "title",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
            Self::Rating => "Top rated",
            Self::Title => "Name",
        }
    }

    pub const ALL: [Self; 5] = [Self::Featured, Self::PriceAsc, Self::PriceDesc, Self::Rating, Self::Title];

    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from_str(raw: &str) -> Option<Self> {
        match raw.trim() {
            "featured" => Some(Self::Featured),
            "price_asc" => Some(Self::PriceAsc),
            "price_desc" => Some(Self::PriceDesc),
            "rating" => Some(Self::Rating),
            "title" => Some(Self::Title),
            _ => None,
        }
    }
}

/// Raw filter values as they arrive from a query string or form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TourFilterParams {
    pub q: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub difficulty: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub min_rating: Option<String>,
    pub sort: Option<String>,
}

/// Typed tour filter. Every populated field narrows the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourFilter {
    pub q: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub min_rating: Option<f32>,
    pub sort: TourSort,
}

fn non_blank(raw: Option<&String>) -> Option<&str> {
    raw.map(|v| v.trim()).filter(|v| !v.is_empty())
}

impl TourFilter {
    /// Build a filter from raw params. Blank and unparsable values are ignored.
    #[must_use]
    pub fn from_params(params: &TourFilterParams) -> Self {
        Self {
            q: non_blank(params.q.as_ref()).map(str::to_lowercase),
            category: non_blank(params.category.as_ref())
                .filter(|v| !v.eq_ignore_ascii_case("all"))
                .map(str::to_owned),
            location: non_blank(params.location.as_ref()).map(str::to_owned),
            difficulty: non_blank(params.difficulty.as_ref()).and_then(Difficulty::from_str),
            min_price: non_blank(params.min_price.as_ref()).and_then(|v| v.parse().ok()),
            max_price: non_blank(params.max_price.as_ref()).and_then(|v| v.parse().ok()),
            min_rating: non_blank(params.min_rating.as_ref())
                .and_then(|v| v.parse::<f32>().ok())
                .filter(|v| v.is_finite()),
            sort: non_blank(params.sort.as_ref())
                .and_then(TourSort::from_str)
                .unwrap_or_default(),
        }
    }

    /// True when no predicate is set (sort alone does not count).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.q.is_none()
            && self.category.is_none()
            && self.location.is_none()
            && self.difficulty.is_none()
            && self.min_price.is_none()
            && self.max_price.is_none()
            && self.min_rating.is_none()
    }

    #[must_use]
    pub fn matches(&self, tour: &Tour) -> bool {
        if let Some(q) = &self.q {
            let hit = [&tour.title, &tour.location, &tour.description, &tour.category]
                .iter()
                .any(|field| field.to_lowercase().contains(q.as_str()));
            if !hit {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !tour.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        if let Some(location) = &self.location {
            if !tour.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }
        if self.difficulty.is_some_and(|d| d != tour.difficulty) {
            return false;
        }
        if self.min_price.is_some_and(|min| tour.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| tour.price > max) {
            return false;
        }
        if self.min_rating.is_some_and(|min| tour.rating < min) {
            return false;
        }
        true
    }
}

fn by_rating_desc(a: &Tour, b: &Tour) -> Ordering {
    b.rating
        .total_cmp(&a.rating)
        .then_with(|| b.reviews.cmp(&a.reviews))
}

// =============================================================================
// IDS
// =============================================================================

/// Lowercase, hyphen-separated slug built from the alphanumeric runs of `title`.
#[must_use]
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
        if slug.len() >= MAX_ID_LEN {
            break;
        }
    }
    slug
}

/// `base` if free, else the first free `base-2`, `base-3`, ...
#[must_use]
pub fn unique_id(base: &str, taken: &HashSet<&str>) -> String {
    let base = if base.is_empty() { "item" } else { base };
    if !taken.contains(base) {
        return base.to_owned();
    }
    (2..)
        .map(|n| format!("{base}-{n}"))
        .find(|candidate| !taken.contains(candidate.as_str()))
        .unwrap_or_else(|| base.to_owned())
}

#[must_use]
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_ID_LEN
        && !id.starts_with('-')
        && !id.ends_with('-')
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn is_valid_image_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://") || (url.starts_with('/') && !url.starts_with("//"))
}

fn required(field: &'static str, value: &str) -> Result<String, CatalogError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CatalogError::Invalid { field, reason: "must not be empty" });
    }
    Ok(trimmed.to_owned())
}

fn resolve_id<'a>(
    explicit: Option<&str>,
    title: &str,
    taken: impl Iterator<Item = &'a str>,
) -> Result<String, CatalogError> {
    let taken: HashSet<&str> = taken.collect();
    match explicit.map(str::trim).filter(|v| !v.is_empty()) {
        Some(id) => {
            if !is_valid_id(id) {
                return Err(CatalogError::Invalid { field: "id", reason: "must be a lowercase slug" });
            }
            if taken.contains(id) {
                return Err(CatalogError::DuplicateId(id.to_owned()));
            }
            Ok(id.to_owned())
        }
        None => Ok(unique_id(&slugify(title), &taken)),
    }
}

// =============================================================================
// VALIDATION
// =============================================================================

fn build_tour(id: String, draft: TourDraft) -> Result<Tour, CatalogError> {
    let title = required("title", &draft.title)?;
    let location = required("location", &draft.location)?;
    let duration = required("duration", &draft.duration)?;
    let category = required("category", &draft.category)?;
    if draft.price == 0 {
        return Err(CatalogError::Invalid { field: "price", reason: "must be greater than zero" });
    }
    if draft.price > MAX_STORED_COUNT {
        return Err(CatalogError::Invalid { field: "price", reason: "is too large" });
    }
    if draft.reviews > MAX_STORED_COUNT {
        return Err(CatalogError::Invalid { field: "reviews", reason: "is too large" });
    }
    if !draft.rating.is_finite() || !(0.0..=MAX_RATING).contains(&draft.rating) {
        return Err(CatalogError::Invalid { field: "rating", reason: "must be between 0 and 5" });
    }
    let images: Vec<String> = draft
        .images
        .iter()
        .map(|url| url.trim())
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .collect();
    if !images.iter().all(|url| is_valid_image_url(url)) {
        return Err(CatalogError::Invalid { field: "images", reason: "must be http(s) or site-relative URLs" });
    }

    Ok(Tour {
        id,
        title,
        location,
        price: draft.price,
        duration,
        description: draft.description.trim().to_owned(),
        images,
        rating: draft.rating,
        reviews: draft.reviews,
        difficulty: draft.difficulty,
        category,
    })
}

/// `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, or a CSS colour keyword.
#[must_use]
pub fn is_valid_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => {
            !color.is_empty() && color.len() <= MAX_COLOR_NAME_LEN && color.chars().all(|c| c.is_ascii_alphabetic())
        }
    }
}

fn build_offer(id: String, draft: OfferDraft) -> Result<Offer, CatalogError> {
    let title = required("title", &draft.title)?;
    let description = required("description", &draft.description)?;
    let image = draft.image.trim().to_owned();
    if !image.is_empty() && !is_valid_image_url(&image) {
        return Err(CatalogError::Invalid { field: "image", reason: "must be an http(s) or site-relative URL" });
    }
    let color = draft.color.trim().to_owned();
    if !color.is_empty() && !is_valid_color(&color) {
        return Err(CatalogError::Invalid { field: "color", reason: "must be a #hex value or a colour name" });
    }
    Ok(Offer {
        id,
        title,
        description,
        details: draft
            .details
            .into_iter()
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty())
            .collect(),
        image,
        icon: draft.icon.trim().to_owned(),
        color,
    })
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tours: Vec<Tour>,
    offers: Vec<Offer>,
}

impl Catalog {
    /// Build a catalog from already-validated records (e.g. database rows).
    #[must_use]
    pub fn new(tours: Vec<Tour>, offers: Vec<Offer>) -> Self {
        Self { tours, offers }
    }

    /// Build a catalog from drafts, applying the same rules as admin writes.
    ///
    /// # Errors
    ///
    /// Returns the first validation or duplicate-id error.
    pub fn from_drafts(tours: Vec<TourDraft>, offers: Vec<OfferDraft>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for draft in tours {
            catalog.insert_tour(draft)?;
        }
        for draft in offers {
            catalog.insert_offer(draft)?;
        }
        Ok(catalog)
    }

    #[must_use]
    pub fn tours(&self) -> &[Tour] {
        &self.tours
    }

    #[must_use]
    pub fn offers(&self) -> &[Offer] {
        &self.offers
    }

    #[must_use]
    pub fn tour(&self, id: &str) -> Option<&Tour> {
        self.tours.iter().find(|t| t.id == id)
    }

    #[must_use]
    pub fn offer(&self, id: &str) -> Option<&Offer> {
        self.offers.iter().find(|o| o.id == id)
    }

    #[must_use]
    pub fn search(&self, filter: &TourFilter) -> Vec<&Tour> {
        let mut hits: Vec<&Tour> = self.tours.iter().filter(|t| filter.matches(t)).collect();
        match filter.sort {
            TourSort::Featured => {}
            TourSort::PriceAsc => hits.sort_by_key(|t| t.price),
            TourSort::PriceDesc => hits.sort_by(|a, b| b.price.cmp(&a.price)),
            TourSort::Rating => hits.sort_by(|a, b| by_rating_desc(a, b)),
            TourSort::Title => hits.sort_by_key(|t| t.title.to_lowercase()),
        }
        hits
    }

    /// Top `n` tours by rating, then review count.
    #[must_use]
    pub fn featured(&self, n: usize) -> Vec<&Tour> {
        let mut ranked: Vec<&Tour> = self.tours.iter().collect();
        ranked.sort_by(|a, b| by_rating_desc(a, b));
        ranked.truncate(n);
        ranked
    }

    /// Other tours sharing `tour`'s category, in catalog order.
    #[must_use]
    pub fn related(&self, tour: &Tour, n: usize) -> Vec<&Tour> {
        self.tours
            .iter()
            .filter(|t| t.id != tour.id && t.category.eq_ignore_ascii_case(&tour.category))
            .take(n)
            .collect()
    }

    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.tours
            .iter()
            .map(|t| t.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    #[must_use]
    pub fn locations(&self) -> Vec<String> {
        self.tours
            .iter()
            .map(|t| t.location.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    // -------------------------------------------------------------------------
    // Tour CRUD
    // -------------------------------------------------------------------------

    /// Validate and append a tour.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` or `DuplicateId`.
    pub fn insert_tour(&mut self, draft: TourDraft) -> Result<Tour, CatalogError> {
        let id = resolve_id(
            draft.id.as_deref(),
            &draft.title,
            self.tours.iter().map(|t| t.id.as_str()),
        )?;
        let tour = build_tour(id, draft)?;
        self.tours.push(tour.clone());
        Ok(tour)
    }

    /// Replace the tour with `id` in place. The id itself never changes.
    /// Returns `(new, previous)`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` or `Invalid`.
    pub fn replace_tour(&mut self, id: &str, draft: TourDraft) -> Result<(Tour, Tour), CatalogError> {
        let slot = self
            .tours
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_owned()))?;
        let tour = build_tour(id.to_owned(), draft)?;
        let previous = std::mem::replace(&mut self.tours[slot], tour.clone());
        Ok((tour, previous))
    }

    /// Splice out the tour with `id`, returning its former index.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`.
    pub fn remove_tour(&mut self, id: &str) -> Result<(usize, Tour), CatalogError> {
        let slot = self
            .tours
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_owned()))?;
        Ok((slot, self.tours.remove(slot)))
    }

    /// Re-insert a tour at `index` (clamped), undoing `remove_tour`.
    pub fn restore_tour(&mut self, index: usize, tour: Tour) {
        let index = index.min(self.tours.len());
        self.tours.insert(index, tour);
    }

    /// Put back the previous version of a replaced tour.
    pub fn revert_tour(&mut self, previous: Tour) {
        if let Some(slot) = self.tours.iter_mut().find(|t| t.id == previous.id) {
            *slot = previous;
        }
    }

    // -------------------------------------------------------------------------
    // Offer CRUD
    // -------------------------------------------------------------------------

    /// Validate and append an offer.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` or `DuplicateId`.
    pub fn insert_offer(&mut self, draft: OfferDraft) -> Result<Offer, CatalogError> {
        let id = resolve_id(
            draft.id.as_deref(),
            &draft.title,
            self.offers.iter().map(|o| o.id.as_str()),
        )?;
        let offer = build_offer(id, draft)?;
        self.offers.push(offer.clone());
        Ok(offer)
    }

    /// # Errors
    ///
    /// Returns `NotFound` or `Invalid`.
    pub fn replace_offer(&mut self, id: &str, draft: OfferDraft) -> Result<(Offer, Offer), CatalogError> {
        let slot = self
            .offers
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_owned()))?;
        let offer = build_offer(id.to_owned(), draft)?;
        let previous = std::mem::replace(&mut self.offers[slot], offer.clone());
        Ok((offer, previous))
    }

    /// # Errors
    ///
    /// Returns `NotFound`.
    pub fn remove_offer(&mut self, id: &str) -> Result<(usize, Offer), CatalogError> {
        let slot = self
            .offers
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_owned()))?;
        Ok((slot, self.offers.remove(slot)))
    }

    pub fn restore_offer(&mut self, index: usize, offer: Offer) {
        let index = index.min(self.offers.len());
        self.offers.insert(index, offer);
    }

    pub fn revert_offer(&mut self, previous: Offer) {
        if let Some(slot) = self.offers.iter_mut().find(|o| o.id == previous.id) {
            *slot = previous;
        }
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
