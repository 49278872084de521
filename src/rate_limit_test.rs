use super::*;
use std::net::{Ipv4Addr, Ipv6Addr};

const CONFIG: RateLimitConfig = RateLimitConfig {
    per_client_limit: 3,
    per_client_window: Duration::from_secs(60),
    global_limit: 5,
    global_window: Duration::from_secs(60),
};

fn ip(n: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(203, 0, 113, n))
}

#[test]
fn per_client_allows_up_to_limit() {
    let rl = RateLimiter::new(CONFIG);
    let client = ip(1);
    let now = Instant::now();

    for i in 0..CONFIG.per_client_limit {
        assert!(rl.check_and_record_at(client, now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at(client, now),
        Err(RateLimitError::PerClientExceeded { limit: 3, window_secs: 60 })
    ));
}

#[test]
fn global_allows_up_to_limit() {
    let rl = RateLimiter::new(CONFIG);
    let now = Instant::now();

    // Use distinct clients to avoid hitting per-client limit first.
    for i in 0..CONFIG.global_limit {
        let n = u8::try_from(i).unwrap();
        assert!(rl.check_and_record_at(ip(n), now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at(ip(200), now),
        Err(RateLimitError::GlobalExceeded { limit: 5, .. })
    ));
}

#[test]
fn window_expiry_allows_new_requests() {
    let rl = RateLimiter::new(CONFIG);
    let client = ip(7);
    let start = Instant::now();

    for _ in 0..CONFIG.per_client_limit {
        rl.check_and_record_at(client, start).unwrap();
    }
    assert!(rl.check_and_record_at(client, start).is_err());

    let after_window = start + CONFIG.per_client_window + Duration::from_millis(1);
    assert!(rl.check_and_record_at(client, after_window).is_ok());
}

#[test]
fn distinct_clients_do_not_interfere() {
    let rl = RateLimiter::new(CONFIG);
    let client_a = IpAddr::V6(Ipv6Addr::LOCALHOST);
    let client_b = ip(9);
    let now = Instant::now();

    for _ in 0..CONFIG.per_client_limit {
        rl.check_and_record_at(client_a, now).unwrap();
    }
    assert!(rl.check_and_record_at(client_a, now).is_err());
    assert!(rl.check_and_record_at(client_b, now).is_ok());
}

#[test]
fn rejected_requests_are_not_recorded() {
    let rl = RateLimiter::new(CONFIG);
    let client = ip(3);
    let start = Instant::now();

    for _ in 0..CONFIG.per_client_limit {
        rl.check_and_record_at(client, start).unwrap();
    }
    for _ in 0..10 {
        assert!(rl.check_and_record_at(client, start).is_err());
    }
    // Only the three accepted requests count toward the global window.
    assert!(rl.check_and_record_at(ip(4), start).is_ok());
    assert!(rl.check_and_record_at(ip(5), start).is_ok());
    assert!(rl.check_and_record_at(ip(6), start).is_err());
}

#[test]
fn clones_share_counters() {
    let rl = RateLimiter::new(CONFIG);
    let clone = rl.clone();
    let now = Instant::now();
    for _ in 0..CONFIG.per_client_limit {
        rl.check_and_record_at(ip(1), now).unwrap();
    }
    assert!(clone.check_and_record_at(ip(1), now).is_err());
}

#[test]
fn retry_after_is_window_length() {
    let err = RateLimitError::PerClientExceeded { limit: 5, window_secs: 600 };
    assert_eq!(err.retry_after_secs(), 600);
    assert!(err.to_string().contains("600s"));
}

#[test]
fn env_overrides_apply_per_prefix() {
    unsafe {
        std::env::set_var("__TEST_RL_PER_CLIENT", "9");
        std::env::set_var("__TEST_RL_GLOBAL_WINDOW_SECS", "30");
    }
    let defaults = CONFIG;
    let cfg = RateLimitConfig::from_env_with_prefix("__TEST_RL", defaults);
    assert_eq!(cfg.per_client_limit, 9);
    assert_eq!(cfg.global_window, Duration::from_secs(30));
    assert_eq!(cfg.global_limit, defaults.global_limit);
    unsafe {
        std::env::remove_var("__TEST_RL_PER_CLIENT");
        std::env::remove_var("__TEST_RL_GLOBAL_WINDOW_SECS");
    }
}

#[test]
fn env_parse_invalid_returns_default() {
    unsafe { std::env::set_var("__TEST_RL_EP_INVALID__", "many") };
    let val: usize = env_parse("__TEST_RL_EP_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__TEST_RL_EP_INVALID__") };
}
