use super::*;
use crate::services::seed::default_catalog;

#[test]
fn enquiry_form_echoes_escaped_values() {
    let form = EnquiryForm {
        name: "Ana \"Ace\"".into(),
        message: "</textarea><script>".into(),
        travellers: Some("2".into()),
        ..EnquiryForm::default()
    };
    let html = enquiry_form(&form);
    assert!(html.contains("value=\"Ana &quot;Ace&quot;\""));
    assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;</textarea>"));
    assert!(html.contains("name=\"travellers\" min=\"1\" max=\"50\" value=\"2\""));
    assert!(!html.contains("{{"));
}

#[test]
fn contact_names_the_tour_being_enquired_about() {
    let catalog = default_catalog().unwrap();
    let form = EnquiryForm { tour_id: Some("kyoto-heritage-walk".into()), ..EnquiryForm::default() };
    let html = contact(&SiteConfig::default(), &catalog, &form, None);
    assert!(html.contains("You are enquiring about Kyoto Heritage Walk."));
}

#[test]
fn contact_ignores_unknown_topic() {
    let catalog = default_catalog().unwrap();
    let form = EnquiryForm { tour_id: Some("atlantis".into()), ..EnquiryForm::default() };
    let html = contact(&SiteConfig::default(), &catalog, &form, None);
    assert!(html.contains("Tell us where you want to go"));
}

#[test]
fn contact_shows_notice() {
    let catalog = default_catalog().unwrap();
    let notice = Notice::Success { message: "Thanks!".into(), whatsapp_url: None };
    let html = contact(&SiteConfig::default(), &catalog, &EnquiryForm::default(), Some(&notice));
    assert!(html.contains("notice-success"));
    assert!(html.contains("Thanks!"));
}
