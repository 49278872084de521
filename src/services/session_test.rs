use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_known_values() {
    assert_eq!(bytes_to_hex(&[0x00, 0x0f, 0xab, 0xff]), "000fabff");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_unique() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// AdminSessions
// =============================================================================

#[test]
fn create_then_validate() {
    let sessions = AdminSessions::new(Duration::from_secs(60));
    let token = sessions.create("admin");
    let session = sessions.validate(&token).expect("session should be live");
    assert_eq!(session.username, "admin");
    assert_eq!(sessions.len(), 1);
}

#[test]
fn unknown_and_empty_tokens_are_rejected() {
    let sessions = AdminSessions::new(Duration::from_secs(60));
    assert!(sessions.validate("deadbeef").is_none());
    assert!(sessions.validate("").is_none());
}

#[test]
fn expired_session_is_removed_on_validate() {
    let sessions = AdminSessions::new(Duration::from_secs(60));
    let start = Instant::now();
    let token = sessions.create_at("admin", start);

    assert!(sessions.validate_at(&token, start + Duration::from_secs(59)).is_some());
    assert!(sessions.validate_at(&token, start + Duration::from_secs(60)).is_none());
    assert!(sessions.is_empty());
}

#[test]
fn create_prunes_expired_sessions() {
    let sessions = AdminSessions::new(Duration::from_secs(10));
    let start = Instant::now();
    let _old = sessions.create_at("a", start);
    let _new = sessions.create_at("b", start + Duration::from_secs(11));
    assert_eq!(sessions.len(), 1);
}

#[test]
fn revoke_ends_session() {
    let sessions = AdminSessions::new(Duration::from_secs(60));
    let token = sessions.create("admin");
    sessions.revoke(&token);
    assert!(sessions.validate(&token).is_none());
    sessions.revoke("never-issued");
}

#[test]
fn clones_share_state() {
    let sessions = AdminSessions::new(Duration::from_secs(60));
    let clone = sessions.clone();
    let token = sessions.create("admin");
    assert!(clone.validate(&token).is_some());
}

#[test]
fn session_serializes_username_only() {
    let sessions = AdminSessions::new(Duration::from_secs(60));
    let token = sessions.create("ops");
    let json = serde_json::to_value(sessions.validate(&token).unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({ "username": "ops" }));
}

#[test]
fn huge_ttl_is_capped_and_sessions_still_open() {
    let sessions = AdminSessions::new(Duration::from_secs(u64::MAX));
    assert_eq!(sessions.ttl(), Duration::from_secs(30 * 24 * 60 * 60));
    let token = sessions.create("admin");
    assert_eq!(sessions.validate(&token).map(|s| s.username), Some("admin".to_owned()));
}
