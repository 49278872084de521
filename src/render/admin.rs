//! Admin login and dashboard pages.

use std::fmt::Write as _;

use super::{Nav, Notice, escape_html, fill, format_price, format_rating, layout, notice_html};
use crate::services::catalog::Catalog;
use crate::state::SiteConfig;

const LOGIN_TEMPLATE: &str = include_str!("../../templates/admin_login.html");
const DASHBOARD_TEMPLATE: &str = include_str!("../../templates/admin_dashboard.html");

#[must_use]
pub fn login(site: &SiteConfig, username: &str, notice: Option<&Notice>) -> String {
    let main = fill(
        LOGIN_TEMPLATE,
        &[("NOTICE", &notice_html(notice)), ("USERNAME", &escape_html(username))],
    );
    layout(site, "Admin sign in", "Catalog administration.", Nav::Admin, &[], &main)
}

/// Capabilities shown at the top of the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct DashboardStatus {
    pub has_database: bool,
    pub uploads_enabled: bool,
}

fn tour_rows(catalog: &Catalog) -> String {
    let mut out = String::new();
    for tour in catalog.tours() {
        let id = escape_html(&tour.id);
        let _ = write!(
            out,
            "<tr data-kind=\"tours\" data-id=\"{id}\"><td><a href=\"/tours/{id}\">{id}</a></td><td>{}</td><td>{}</td>\
             <td>{}</td><td>{}</td><td><button class=\"link\" data-action=\"edit\">Edit</button> \
             <button class=\"link danger\" data-action=\"delete\">Delete</button></td></tr>",
            escape_html(&tour.title),
            escape_html(&tour.location),
            format_price(tour.price),
            format_rating(tour.rating),
        );
    }
    out
}

fn offer_rows(catalog: &Catalog) -> String {
    let mut out = String::new();
    for offer in catalog.offers() {
        let id = escape_html(&offer.id);
        let _ = write!(
            out,
            "<tr data-kind=\"offers\" data-id=\"{id}\"><td><a href=\"/offers/{id}\">{id}</a></td><td>{}</td><td>{}</td>\
             <td><button class=\"link\" data-action=\"edit\">Edit</button> \
             <button class=\"link danger\" data-action=\"delete\">Delete</button></td></tr>",
            escape_html(&offer.title),
            offer.details.len(),
        );
    }
    out
}

#[must_use]
pub fn dashboard(site: &SiteConfig, catalog: &Catalog, username: &str, status: DashboardStatus) -> String {
    let storage = if status.has_database {
        "Changes are saved to the database."
    } else {
        "No database configured: changes last until the server restarts."
    };
    let uploads = if status.uploads_enabled { "Image uploads are enabled." } else { "Image uploads are disabled." };
    let main = fill(
        DASHBOARD_TEMPLATE,
        &[
            ("USERNAME", &escape_html(username)),
            ("STORAGE_STATUS", storage),
            ("UPLOAD_STATUS", uploads),
            ("TOUR_COUNT", &catalog.tours().len().to_string()),
            ("TOUR_ROWS", &tour_rows(catalog)),
            ("OFFER_COUNT", &catalog.offers().len().to_string()),
            ("OFFER_ROWS", &offer_rows(catalog)),
        ],
    );
    layout(site, "Admin", "Catalog administration.", Nav::Admin, &[], &main)
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
