//! Server-side HTML rendering.
//!
//! DESIGN
//! ======
//! Pages are embedded HTML templates with `{{TOKEN}}` placeholders. `fill`
//! substitutes in a single pass, so values are never re-scanned for tokens.
//! Every value that originates from the catalog or a visitor goes through
//! `escape_html` before it reaches a template; fragments built here are
//! assembled from already-escaped parts.

pub mod admin;
pub mod catalog;
pub mod forms;

use std::fmt::Write as _;

use crate::state::SiteConfig;

const LAYOUT_TEMPLATE: &str = include_str!("../../templates/layout.html");
const NOT_FOUND_TEMPLATE: &str = include_str!("../../templates/not_found.html");

/// Rendered HTML plus the images the browser should fetch before paint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub preload: Vec<String>,
}

/// Top-level navigation entries; the active one is highlighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Tours,
    About,
    Contact,
    Admin,
    None,
}

const NAV_ITEMS: [(Nav, &str, &str); 4] = [
    (Nav::Home, "/", "Home"),
    (Nav::Tours, "/tours", "Tours"),
    (Nav::About, "/about", "About"),
    (Nav::Contact, "/contact", "Contact"),
];

/// Inline outcome banner for form submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success { message: String, whatsapp_url: Option<String> },
    Error { message: String, whatsapp_url: Option<String> },
}

// =============================================================================
// PRIMITIVES
// =============================================================================

#[must_use]
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replace `{{KEY}}` placeholders in one pass. Unknown keys are left intact.
#[must_use]
pub fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let key = &after[..end];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// `1250` -> `$1,250`.
#[must_use]
pub fn format_price(price: u32) -> String {
    let digits = price.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[must_use]
pub fn format_rating(rating: f32) -> String {
    format!("{rating:.1}")
}

/// URLs allowed into `src`/`href` attributes and `Link` headers.
#[must_use]
pub fn is_safe_url(url: &str) -> bool {
    let scheme_ok = url.starts_with("https://") || url.starts_with("http://") || (url.starts_with('/') && !url.starts_with("//"));
    scheme_ok && !url.chars().any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>' | '"' | '\''))
}

/// `Link` header value announcing image preloads, or `None` when empty.
#[must_use]
pub fn preload_link_header(urls: &[String]) -> Option<String> {
    let parts: Vec<String> = urls
        .iter()
        .filter(|u| is_safe_url(u) && !u.contains(','))
        .map(|u| format!("<{u}>; rel=preload; as=image"))
        .collect();
    (!parts.is_empty()).then(|| parts.join(", "))
}

// =============================================================================
// LAYOUT
// =============================================================================

fn nav_html(active: Nav) -> String {
    let mut out = String::new();
    for (item, href, label) in NAV_ITEMS {
        let class = if item == active { " class=\"active\"" } else { "" };
        let _ = write!(out, "<li><a href=\"{href}\"{class}>{label}</a></li>");
    }
    out
}

fn preload_tags(urls: &[String]) -> String {
    urls.iter()
        .filter(|u| is_safe_url(u))
        .map(|u| format!("<link rel=\"preload\" as=\"image\" href=\"{}\">", escape_html(u)))
        .collect::<Vec<_>>()
        .join("\n    ")
}

#[must_use]
pub fn whatsapp_button(url: Option<&str>, label: &str) -> String {
    match url {
        Some(url) => format!(
            "<a class=\"btn btn-whatsapp\" href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
            escape_html(url),
            escape_html(label)
        ),
        None => String::new(),
    }
}

/// Wrap `main` (already HTML) in the site chrome.
#[must_use]
pub fn layout(site: &SiteConfig, title: &str, description: &str, active: Nav, preload: &[String], main: &str) -> String {
    let full_title = if title.is_empty() {
        escape_html(&site.agency_name)
    } else {
        format!("{} | {}", escape_html(title), escape_html(&site.agency_name))
    };
    let whatsapp = site.whatsapp_chat_url();
    fill(
        LAYOUT_TEMPLATE,
        &[
            ("TITLE", &full_title),
            ("DESCRIPTION", &escape_html(description)),
            ("PRELOADS", &preload_tags(preload)),
            ("AGENCY_NAME", &escape_html(&site.agency_name)),
            ("NAV", &nav_html(active)),
            ("MAIN", main),
            ("AGENCY_EMAIL", &escape_html(&site.agency_email)),
            ("AGENCY_PHONE", &escape_html(&site.agency_phone)),
            ("AGENCY_ADDRESS", &escape_html(&site.agency_address)),
            ("WHATSAPP", &whatsapp_button(whatsapp.as_deref(), "Chat on WhatsApp")),
        ],
    )
}

#[must_use]
pub fn notice_html(notice: Option<&Notice>) -> String {
    let Some(notice) = notice else {
        return String::new();
    };
    let (class, message, whatsapp_url) = match notice {
        Notice::Success { message, whatsapp_url } => ("notice notice-success", message, whatsapp_url),
        Notice::Error { message, whatsapp_url } => ("notice notice-error", message, whatsapp_url),
    };
    format!(
        "<div class=\"{class}\" role=\"status\"><p>{}</p>{}</div>",
        escape_html(message),
        whatsapp_button(whatsapp_url.as_deref(), "Continue on WhatsApp")
    )
}

#[must_use]
pub fn not_found(site: &SiteConfig, message: &str) -> String {
    let main = fill(NOT_FOUND_TEMPLATE, &[("MESSAGE", &escape_html(message))]);
    layout(site, "Page not found", message, Nav::None, &[], &main)
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
