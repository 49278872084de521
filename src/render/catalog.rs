//! Catalog pages: home, tour list, tour detail, offer detail, about.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use super::forms::enquiry_form;
use super::{Nav, RenderedPage, escape_html, fill, format_price, format_rating, is_safe_url, layout, whatsapp_button};
use crate::services::catalog::{Catalog, Difficulty, Offer, Tour, TourFilter, TourFilterParams, TourSort};
use crate::services::enquiry::{EnquiryForm, encode_component};
use crate::state::SiteConfig;

const HOME_TEMPLATE: &str = include_str!("../../templates/home.html");
const TOURS_TEMPLATE: &str = include_str!("../../templates/tours.html");
const TOUR_TEMPLATE: &str = include_str!("../../templates/tour.html");
const OFFER_TEMPLATE: &str = include_str!("../../templates/offer.html");
const ABOUT_TEMPLATE: &str = include_str!("../../templates/about.html");

const FEATURED_COUNT: usize = 3;
const RELATED_COUNT: usize = 3;

// =============================================================================
// FRAGMENTS
// =============================================================================

fn image_tag(url: &str, alt: &str, class: &str) -> String {
    if !is_safe_url(url) {
        return String::new();
    }
    format!(
        "<img class=\"{class}\" src=\"{}\" alt=\"{}\" loading=\"lazy\">",
        escape_html(url),
        escape_html(alt)
    )
}

#[must_use]
pub fn tour_card(tour: &Tour) -> String {
    let image = tour
        .cover_image()
        .map(|url| image_tag(url, &tour.title, "card-image"))
        .unwrap_or_default();
    format!(
        "<a class=\"card tour-card\" href=\"/tours/{id}\">{image}<div class=\"card-body\">\
         <p class=\"eyebrow\">{location}</p><h3>{title}</h3>\
         <p class=\"meta\">{duration} &middot; {difficulty}</p>\
         <p class=\"card-footer\"><span class=\"price\">{price}</span>\
         <span class=\"rating\">&#9733; {rating} ({reviews})</span></p></div></a>",
        id = escape_html(&tour.id),
        location = escape_html(&tour.location),
        title = escape_html(&tour.title),
        duration = escape_html(&tour.duration),
        difficulty = tour.difficulty.label(),
        price = format_price(tour.price),
        rating = format_rating(tour.rating),
        reviews = tour.reviews,
    )
}

#[must_use]
pub fn offer_card(offer: &Offer) -> String {
    let image = image_tag(&offer.image, &offer.title, "card-image");
    format!(
        "<a class=\"card offer-card\" href=\"/offers/{id}\" style=\"--accent: {color}\">{image}\
         <div class=\"card-body\"><p class=\"eyebrow\"><span class=\"icon icon-{icon}\"></span></p>\
         <h3>{title}</h3><p>{description}</p></div></a>",
        id = escape_html(&offer.id),
        color = escape_html(&offer.color),
        icon = escape_html(&offer.icon),
        title = escape_html(&offer.title),
        description = escape_html(&offer.description),
    )
}

fn cards<'a, T: 'a>(items: impl IntoIterator<Item = &'a T>, card: fn(&T) -> String) -> String {
    items.into_iter().map(card).collect()
}

fn option_tags<'a>(values: impl IntoIterator<Item = (&'a str, &'a str)>, selected: Option<&str>) -> String {
    let mut out = String::new();
    for (value, label) in values {
        let attr = if selected.is_some_and(|s| s.eq_ignore_ascii_case(value)) { " selected" } else { "" };
        let _ = write!(out, "<option value=\"{}\"{attr}>{}</option>", escape_html(value), escape_html(label));
    }
    out
}

fn whatsapp_about(site: &SiteConfig, topic: &str) -> String {
    let url = site.whatsapp_message_url(&format!("Hi {}, I'd like to know more about {topic}.", site.agency_name));
    whatsapp_button(url.as_deref(), "Ask on WhatsApp")
}

// =============================================================================
// PAGES
// =============================================================================

#[must_use]
pub fn home(site: &SiteConfig, catalog: &Catalog) -> String {
    let category_links: String = catalog
        .categories()
        .iter()
        .map(|c| {
            format!(
                "<a class=\"chip\" href=\"/tours?category={}\">{}</a>",
                encode_component(c),
                escape_html(c)
            )
        })
        .collect();
    let main = fill(
        HOME_TEMPLATE,
        &[
            ("AGENCY_NAME", &escape_html(&site.agency_name)),
            ("CATEGORY_LINKS", &category_links),
            ("FEATURED_TOURS", &cards(catalog.featured(FEATURED_COUNT), tour_card)),
            ("TOUR_COUNT", &catalog.tours().len().to_string()),
            ("OFFERS", &cards(catalog.offers(), offer_card)),
        ],
    );
    let description = format!("{}: tours, holidays and travel offers.", site.agency_name);
    layout(site, "", &description, Nav::Home, &[], &main)
}

fn result_summary(count: usize, filter: &TourFilter) -> String {
    let (noun, verb) = if count == 1 { ("tour", "matches") } else { ("tours", "match") };
    if filter.is_empty() {
        format!("{count} {noun} available")
    } else {
        format!("{count} {noun} {verb} your search")
    }
}

/// The tour list with its search form pre-filled from the raw params.
#[must_use]
pub fn tours(site: &SiteConfig, catalog: &Catalog, params: &TourFilterParams) -> String {
    let filter = TourFilter::from_params(params);
    let hits = catalog.search(&filter);

    let results = if hits.is_empty() {
        "<div class=\"empty-state\"><p>No tours match those filters.</p>\
         <p><a href=\"/tours\">Clear filters</a> or <a href=\"/contact\">tell us what you are looking for</a>.</p></div>"
            .to_owned()
    } else {
        cards(hits.iter().copied(), tour_card)
    };

    let categories = catalog.categories();
    let locations = catalog.locations();
    let difficulty_options = option_tags(
        Difficulty::ALL.iter().map(|d| (d.as_str(), d.label())),
        filter.difficulty.map(Difficulty::as_str),
    );
    let sort_options = option_tags(TourSort::ALL.iter().map(|s| (s.as_str(), s.label())), Some(filter.sort.as_str()));
    let raw = |v: &Option<String>| escape_html(v.as_deref().unwrap_or_default().trim());

    let main = fill(
        TOURS_TEMPLATE,
        &[
            ("RESULT_SUMMARY", &result_summary(hits.len(), &filter)),
            ("Q", &raw(&params.q)),
            (
                "CATEGORY_OPTIONS",
                &option_tags(categories.iter().map(|c| (c.as_str(), c.as_str())), filter.category.as_deref()),
            ),
            (
                "LOCATION_OPTIONS",
                &option_tags(locations.iter().map(|l| (l.as_str(), l.as_str())), filter.location.as_deref()),
            ),
            ("DIFFICULTY_OPTIONS", &difficulty_options),
            ("MIN_PRICE", &filter.min_price.map(|v| v.to_string()).unwrap_or_default()),
            ("MAX_PRICE", &filter.max_price.map(|v| v.to_string()).unwrap_or_default()),
            ("MIN_RATING", &filter.min_rating.map(|v| v.to_string()).unwrap_or_default()),
            ("SORT_OPTIONS", &sort_options),
            ("RESULTS", &results),
        ],
    );
    layout(site, "Tours", "Browse and search every tour we run.", Nav::Tours, &[], &main)
}

/// Tour detail. Gallery images are returned for preloading.
#[must_use]
pub fn tour_detail(site: &SiteConfig, catalog: &Catalog, tour: &Tour) -> RenderedPage {
    let preload: Vec<String> = tour.images.iter().filter(|u| is_safe_url(u)).cloned().collect();
    let gallery: String = preload
        .iter()
        .enumerate()
        .map(|(i, url)| {
            let class = if i == 0 { "gallery-image gallery-cover" } else { "gallery-image" };
            image_tag(url, &tour.title, class)
        })
        .collect();
    let related = catalog.related(tour, RELATED_COUNT);
    let related_html = if related.is_empty() {
        cards(catalog.featured(RELATED_COUNT).into_iter().filter(|t| t.id != tour.id), tour_card)
    } else {
        cards(related, tour_card)
    };
    let form = EnquiryForm { tour_id: Some(tour.id.clone()), subject: Some(tour.title.clone()), ..EnquiryForm::default() };

    let main = fill(
        TOUR_TEMPLATE,
        &[
            ("CATEGORY", &escape_html(&tour.category)),
            ("LOCATION", &escape_html(&tour.location)),
            ("TITLE", &escape_html(&tour.title)),
            ("RATING", &format_rating(tour.rating)),
            ("REVIEWS", &tour.reviews.to_string()),
            ("GALLERY", &gallery),
            ("DESCRIPTION", &escape_html(&tour.description)),
            ("PRICE", &format_price(tour.price)),
            ("DURATION", &escape_html(&tour.duration)),
            ("DIFFICULTY", tour.difficulty.label()),
            ("WHATSAPP", &whatsapp_about(site, &tour.title)),
            ("ENQUIRY_FORM", &enquiry_form(&form)),
            ("RELATED", &related_html),
        ],
    );
    let description = format!("{} in {}, {}.", tour.title, tour.location, tour.duration);
    RenderedPage { html: layout(site, &tour.title, &description, Nav::Tours, &preload, &main), preload }
}

#[must_use]
pub fn offer_detail(site: &SiteConfig, offer: &Offer) -> RenderedPage {
    let preload: Vec<String> = Some(&offer.image).filter(|u| is_safe_url(u)).cloned().into_iter().collect();
    let details: String = offer.details.iter().map(|d| format!("<li>{}</li>", escape_html(d))).collect();
    let form = EnquiryForm { offer_id: Some(offer.id.clone()), subject: Some(offer.title.clone()), ..EnquiryForm::default() };

    let main = fill(
        OFFER_TEMPLATE,
        &[
            ("COLOR", &escape_html(&offer.color)),
            ("ICON", &escape_html(&offer.icon)),
            ("TITLE", &escape_html(&offer.title)),
            ("IMAGE", &image_tag(&offer.image, &offer.title, "offer-image")),
            ("DESCRIPTION", &escape_html(&offer.description)),
            ("DETAILS", &details),
            ("WHATSAPP", &whatsapp_about(site, &offer.title)),
            ("ENQUIRY_FORM", &enquiry_form(&form)),
        ],
    );
    RenderedPage { html: layout(site, &offer.title, &offer.description, Nav::None, &preload, &main), preload }
}

#[must_use]
pub fn about(site: &SiteConfig, catalog: &Catalog) -> String {
    let destinations: BTreeSet<&str> = catalog.tours().iter().map(|t| t.location.as_str()).collect();
    let main = fill(
        ABOUT_TEMPLATE,
        &[
            ("AGENCY_NAME", &escape_html(&site.agency_name)),
            ("TOUR_COUNT", &catalog.tours().len().to_string()),
            ("DESTINATION_COUNT", &destinations.len().to_string()),
            ("CATEGORY_COUNT", &catalog.categories().len().to_string()),
        ],
    );
    layout(site, "About", "Who we are and how we plan trips.", Nav::About, &[], &main)
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
