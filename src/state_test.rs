use super::*;

#[test]
fn site_config_defaults() {
    let site = SiteConfig::default();
    assert_eq!(site.agency_name, "Wayfarer Travel");
    assert!(site.whatsapp_number.is_none());
    assert_eq!(site.static_dir, PathBuf::from("static"));
}

#[test]
fn whatsapp_urls_follow_configured_number() {
    let mut site = SiteConfig::default();
    assert!(site.whatsapp_chat_url().is_none());
    assert!(site.whatsapp_message_url("hi").is_none());

    site.whatsapp_number = Some("15550102030".into());
    assert_eq!(site.whatsapp_chat_url().as_deref(), Some("https://wa.me/15550102030"));
    assert_eq!(site.whatsapp_message_url("Hi there").as_deref(), Some("https://wa.me/15550102030?text=Hi%20there"));
}

#[test]
fn env_or_ignores_blank_values() {
    unsafe { std::env::set_var("__TEST_STATE_ENV_OR__", "   ") };
    assert_eq!(env_or("__TEST_STATE_ENV_OR__", "fallback"), "fallback");
    unsafe { std::env::set_var("__TEST_STATE_ENV_OR__", " Blue Lagoon Tours ") };
    assert_eq!(env_or("__TEST_STATE_ENV_OR__", "fallback"), "Blue Lagoon Tours");
    unsafe { std::env::remove_var("__TEST_STATE_ENV_OR__") };
}

#[test]
fn whatsapp_number_is_reduced_to_digits() {
    unsafe { std::env::set_var("WHATSAPP_NUMBER", "+1 (555) 010-2030") };
    let site = SiteConfig::from_env();
    assert_eq!(site.whatsapp_number.as_deref(), Some("15550102030"));
    unsafe { std::env::remove_var("WHATSAPP_NUMBER") };
}

#[tokio::test]
async fn test_state_has_seeded_catalog() {
    let state = test_helpers::test_app_state();
    let catalog = state.store.read().await;
    assert!(!catalog.tours().is_empty());
    assert!(!catalog.offers().is_empty());
    assert!(state.mailer.is_none());
    assert!(state.images.is_none());
}

#[test]
fn admin_enabled_follows_credentials() {
    let mut state = test_helpers::test_app_state();
    assert!(state.admin_enabled());
    state.admin_credentials = None;
    assert!(!state.admin_enabled());
}

#[test]
fn admin_token_validates() {
    let state = test_helpers::test_app_state();
    let token = test_helpers::admin_token(&state);
    let session = state.sessions.validate(&token).expect("token should be live");
    assert_eq!(session.username, test_helpers::TEST_ADMIN_USERNAME);
}

#[test]
fn env_bool_variants() {
    for (i, (val, expected)) in [("1", Some(true)), ("Yes", Some(true)), ("off", Some(false)), ("maybe", None)]
        .iter()
        .enumerate()
    {
        let key = format!("__TEST_STATE_EB_{i}__");
        unsafe { std::env::set_var(&key, val) };
        assert_eq!(env_bool(&key), *expected, "unexpected result for {val:?}");
        unsafe { std::env::remove_var(&key) };
    }
    assert_eq!(env_bool("__TEST_STATE_EB_UNSET__"), None);
}
