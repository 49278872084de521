//! Enquiry service: validates contact/booking forms and builds the
//! outbound message text, WhatsApp deep link, and email template params.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};
use time::Date;
use time::macros::format_description;
use uuid::Uuid;

use super::catalog::Catalog;

const MAX_NAME_LEN: usize = 100;
const MAX_SUBJECT_LEN: usize = 150;
const MAX_MESSAGE_LEN: usize = 2000;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;
const MAX_TRAVELLERS: u32 = 50;
const WHATSAPP_BASE_URL: &str = "https://wa.me";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnquiryError {
    #[error("please enter your name")]
    MissingName,
    #[error("name is too long")]
    NameTooLong,
    #[error("please enter a valid email address")]
    InvalidEmail,
    #[error("please enter a valid phone number")]
    InvalidPhone,
    #[error("subject is too long")]
    SubjectTooLong,
    #[error("please enter a message")]
    MissingMessage,
    #[error("message must be at most 2000 characters")]
    MessageTooLong,
    #[error("unknown tour: {0}")]
    UnknownTour(String),
    #[error("unknown offer: {0}")]
    UnknownOffer(String),
    #[error("travel date must look like YYYY-MM-DD")]
    InvalidDate,
    #[error("travel date is in the past")]
    DateInPast,
    #[error("travellers must be between 1 and 50")]
    InvalidTravellers,
}

impl EnquiryError {
    /// Form field the error belongs to, for inline messages.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingName | Self::NameTooLong => "name",
            Self::InvalidEmail => "email",
            Self::InvalidPhone => "phone",
            Self::SubjectTooLong => "subject",
            Self::MissingMessage | Self::MessageTooLong => "message",
            Self::UnknownTour(_) => "tour_id",
            Self::UnknownOffer(_) => "offer_id",
            Self::InvalidDate | Self::DateInPast => "travel_date",
            Self::InvalidTravellers => "travellers",
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Accept `travellers` as any JSON number or a (possibly blank) form string.
/// Out-of-range numbers are left for `validate` to reject.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(serde_json::Number),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Number(n) => n.to_string(),
        Raw::Text(s) => s,
    }))
}

/// Enquiry as posted by the contact form, tour form, or JSON API.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EnquiryForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub tour_id: Option<String>,
    #[serde(default)]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub travel_date: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub travellers: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnquiryRef {
    pub id: String,
    pub title: String,
}

/// A validated enquiry.
#[derive(Debug, Clone, Serialize)]
pub struct Enquiry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub tour: Option<EnquiryRef>,
    pub offer: Option<EnquiryRef>,
    pub travel_date: Option<String>,
    pub travellers: Option<u32>,
}

impl Enquiry {
    /// What the enquiry is about, most specific first.
    #[must_use]
    pub fn topic(&self) -> &str {
        self.tour
            .as_ref()
            .map(|t| t.title.as_str())
            .or_else(|| self.offer.as_ref().map(|o| o.title.as_str()))
            .or(self.subject.as_deref())
            .unwrap_or("a trip")
    }
}

// =============================================================================
// NORMALIZATION
// =============================================================================

#[must_use]
pub fn normalize_email(email: &str) -> Option<String> {
    let normalized = email.trim().to_ascii_lowercase();
    if normalized.is_empty() || normalized.chars().any(char::is_whitespace) {
        return None;
    }
    let parts = normalized.split('@').collect::<Vec<_>>();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return None;
    }
    let domain = parts[1];
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return None;
    }
    Some(normalized)
}

/// Strip common separators; keep an optional leading `+` and 7–15 digits.
#[must_use]
pub fn normalize_phone(phone: &str) -> Option<String> {
    let trimmed = phone.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let mut digits = String::with_capacity(rest.len());
    for c in rest.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '-' | '(' | ')' | '.' => {}
            _ => return None,
        }
    }
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return None;
    }
    Some(if plus { format!("+{digits}") } else { digits })
}

fn optional(raw: Option<&String>) -> Option<&str> {
    raw.map(|v| v.trim()).filter(|v| !v.is_empty())
}

// =============================================================================
// VALIDATION
// =============================================================================

/// Validate a submitted form against the catalog. `today` bounds `travel_date`.
///
/// # Errors
///
/// Returns the first failing field.
pub fn validate(form: &EnquiryForm, catalog: &Catalog, today: Date) -> Result<Enquiry, EnquiryError> {
    let name = form.name.trim();
    if name.is_empty() {
        return Err(EnquiryError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(EnquiryError::NameTooLong);
    }

    let email = normalize_email(&form.email).ok_or(EnquiryError::InvalidEmail)?;

    let phone = match optional(form.phone.as_ref()) {
        Some(raw) => Some(normalize_phone(raw).ok_or(EnquiryError::InvalidPhone)?),
        None => None,
    };

    let subject = optional(form.subject.as_ref()).map(str::to_owned);
    if subject.as_ref().is_some_and(|s| s.chars().count() > MAX_SUBJECT_LEN) {
        return Err(EnquiryError::SubjectTooLong);
    }

    let message = form.message.trim();
    if message.is_empty() {
        return Err(EnquiryError::MissingMessage);
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(EnquiryError::MessageTooLong);
    }

    let tour = match optional(form.tour_id.as_ref()) {
        Some(id) => {
            let tour = catalog
                .tour(id)
                .ok_or_else(|| EnquiryError::UnknownTour(id.to_owned()))?;
            Some(EnquiryRef { id: tour.id.clone(), title: tour.title.clone() })
        }
        None => None,
    };

    let offer = match optional(form.offer_id.as_ref()) {
        Some(id) => {
            let offer = catalog
                .offer(id)
                .ok_or_else(|| EnquiryError::UnknownOffer(id.to_owned()))?;
            Some(EnquiryRef { id: offer.id.clone(), title: offer.title.clone() })
        }
        None => None,
    };

    let travel_date = match optional(form.travel_date.as_ref()) {
        Some(raw) => {
            let date =
                Date::parse(raw, format_description!("[year]-[month]-[day]")).map_err(|_| EnquiryError::InvalidDate)?;
            if date < today {
                return Err(EnquiryError::DateInPast);
            }
            Some(raw.to_owned())
        }
        None => None,
    };

    let travellers = match optional(form.travellers.as_ref()) {
        Some(raw) => {
            let n: u32 = raw.parse().map_err(|_| EnquiryError::InvalidTravellers)?;
            if !(1..=MAX_TRAVELLERS).contains(&n) {
                return Err(EnquiryError::InvalidTravellers);
            }
            Some(n)
        }
        None => None,
    };

    Ok(Enquiry {
        id: Uuid::new_v4(),
        name: name.to_owned(),
        email,
        phone,
        subject,
        message: message.to_owned(),
        tour,
        offer,
        travel_date,
        travellers,
    })
}

// =============================================================================
// OUTBOUND TEXT
// =============================================================================

/// Plain-text summary used as the WhatsApp message and the email body.
#[must_use]
pub fn compose_message(enquiry: &Enquiry, agency: &str) -> String {
    let mut lines = vec![
        format!("Hello {agency}! I'd like to enquire about {}.", enquiry.topic()),
        String::new(),
        format!("Name: {}", enquiry.name),
        format!("Email: {}", enquiry.email),
    ];
    if let Some(phone) = &enquiry.phone {
        lines.push(format!("Phone: {phone}"));
    }
    if let Some(date) = &enquiry.travel_date {
        lines.push(format!("Travel date: {date}"));
    }
    if let Some(n) = enquiry.travellers {
        lines.push(format!("Travellers: {n}"));
    }
    lines.push(String::new());
    lines.push(enquiry.message.clone());
    lines.join("\n")
}

/// Percent-encode a URL component. Spaces become `%20`, not `+`; every byte
/// outside `A-Za-z0-9*-._` is escaped, which is stricter than `encodeURIComponent`.
#[must_use]
pub fn encode_component(text: &str) -> String {
    url::form_urlencoded::byte_serialize(text.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn whatsapp_digits(number: &str) -> Option<String> {
    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    (!digits.is_empty()).then_some(digits)
}

/// `https://wa.me/<digits>`; `None` if `number` has no digits.
#[must_use]
pub fn whatsapp_chat_link(number: &str) -> Option<String> {
    whatsapp_digits(number).map(|digits| format!("{WHATSAPP_BASE_URL}/{digits}"))
}

/// `https://wa.me/<digits>?text=<encoded>`; `None` if `number` has no digits.
#[must_use]
pub fn whatsapp_link(number: &str, text: &str) -> Option<String> {
    whatsapp_chat_link(number).map(|base| format!("{base}?text={}", encode_component(text)))
}

/// Template parameters for the transactional email template.
#[must_use]
pub fn template_params(enquiry: &Enquiry, agency: &str) -> Map<String, Value> {
    let mut params = Map::new();
    params.insert("enquiry_id".into(), json!(enquiry.id.to_string()));
    params.insert("to_name".into(), json!(agency));
    params.insert("from_name".into(), json!(enquiry.name));
    params.insert("from_email".into(), json!(enquiry.email));
    params.insert("reply_to".into(), json!(enquiry.email));
    params.insert("phone".into(), json!(enquiry.phone.as_deref().unwrap_or("")));
    params.insert("subject".into(), json!(format!("Enquiry: {}", enquiry.topic())));
    params.insert("message".into(), json!(enquiry.message));
    params.insert(
        "tour_title".into(),
        json!(enquiry.tour.as_ref().map_or("", |t| t.title.as_str())),
    );
    params.insert(
        "offer_title".into(),
        json!(enquiry.offer.as_ref().map_or("", |o| o.title.as_str())),
    );
    params.insert("travel_date".into(), json!(enquiry.travel_date.as_deref().unwrap_or("")));
    params.insert(
        "travellers".into(),
        json!(enquiry.travellers.map(|n| n.to_string()).unwrap_or_default()),
    );
    params.insert("message_text".into(), json!(compose_message(enquiry, agency)));
    params
}

#[cfg(test)]
#[path = "enquiry_test.rs"]
mod tests;
