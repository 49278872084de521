//! Enquiry form and contact page.

use super::{Nav, Notice, escape_html, fill, layout, notice_html, whatsapp_button};
use crate::services::catalog::Catalog;
use crate::services::enquiry::EnquiryForm;
use crate::state::SiteConfig;

const ENQUIRY_FORM_TEMPLATE: &str = include_str!("../../templates/enquiry_form.html");
const CONTACT_TEMPLATE: &str = include_str!("../../templates/contact.html");

fn value(raw: Option<&String>) -> String {
    escape_html(raw.map(String::as_str).unwrap_or_default())
}

/// The enquiry form, echoing whatever the visitor already typed.
#[must_use]
pub fn enquiry_form(form: &EnquiryForm) -> String {
    fill(
        ENQUIRY_FORM_TEMPLATE,
        &[
            ("TOUR_ID", &value(form.tour_id.as_ref())),
            ("OFFER_ID", &value(form.offer_id.as_ref())),
            ("NAME", &escape_html(&form.name)),
            ("EMAIL", &escape_html(&form.email)),
            ("PHONE", &value(form.phone.as_ref())),
            ("SUBJECT", &value(form.subject.as_ref())),
            ("TRAVEL_DATE", &value(form.travel_date.as_ref())),
            ("TRAVELLERS", &value(form.travellers.as_ref())),
            ("MESSAGE", &escape_html(&form.message)),
        ],
    )
}

fn topic_line(catalog: &Catalog, form: &EnquiryForm) -> String {
    let tour = form.tour_id.as_deref().and_then(|id| catalog.tour(id)).map(|t| t.title.as_str());
    let offer = form.offer_id.as_deref().and_then(|id| catalog.offer(id)).map(|o| o.title.as_str());
    match tour.or(offer) {
        Some(title) => format!("You are enquiring about {}.", escape_html(title)),
        None => "Tell us where you want to go and we will put a trip together.".to_owned(),
    }
}

/// Contact page. `notice` reports the outcome of a submission.
#[must_use]
pub fn contact(site: &SiteConfig, catalog: &Catalog, form: &EnquiryForm, notice: Option<&Notice>) -> String {
    let whatsapp = site.whatsapp_chat_url();
    let main = fill(
        CONTACT_TEMPLATE,
        &[
            ("TOPIC", &topic_line(catalog, form)),
            ("NOTICE", &notice_html(notice)),
            ("ENQUIRY_FORM", &enquiry_form(form)),
            ("AGENCY_EMAIL", &escape_html(&site.agency_email)),
            ("AGENCY_PHONE", &escape_html(&site.agency_phone)),
            ("AGENCY_ADDRESS", &escape_html(&site.agency_address)),
            ("WHATSAPP", &whatsapp_button(whatsapp.as_deref(), "Chat on WhatsApp")),
        ],
    );
    layout(site, "Contact", "Send us an enquiry by email or WhatsApp.", Nav::Contact, &[], &main)
}

#[cfg(test)]
#[path = "forms_test.rs"]
mod tests;
