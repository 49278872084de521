use super::*;
use crate::services::seed::default_catalog;

#[test]
fn login_prefills_username_and_shows_notice() {
    let notice = Notice::Error { message: "Invalid username or password".into(), whatsapp_url: None };
    let html = login(&SiteConfig::default(), "ops<", Some(&notice));
    assert!(html.contains("value=\"ops&lt;\""));
    assert!(html.contains("Invalid username or password"));
}

#[test]
fn dashboard_lists_every_record() {
    let catalog = default_catalog().unwrap();
    let status = DashboardStatus { has_database: false, uploads_enabled: true };
    let html = dashboard(&SiteConfig::default(), &catalog, "admin", status);
    assert!(html.contains("Tours (6)"));
    assert!(html.contains("Offers (3)"));
    assert!(html.contains("data-id=\"serengeti-safari\""));
    assert!(html.contains("data-id=\"group-tours\""));
    assert!(html.contains("changes last until the server restarts"));
    assert!(html.contains("Image uploads are enabled."));
}
