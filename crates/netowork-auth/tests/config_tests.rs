use std::collections::HashMap;
use std::time::Duration;

use netowork_auth::config::{Config, ConfigError};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults() {
    let config = Config::from_lookup(|_| None).expect("defaults are valid");

    assert_eq!(config.database_max_connections, 4);
    assert_eq!(config.environment, "development");
    assert!(config.is_dev());
    assert!(config.redis_url.is_none());
    assert!(config.smtp.is_none());

    assert_eq!(config.auth.verification_token_ttl, Duration::from_secs(86_400));
    assert_eq!(config.auth.password_reset_token_ttl, Duration::from_secs(600));
    assert_eq!(config.auth.user_session_ttl, Duration::from_secs(720 * 3600));
    assert_eq!(config.auth.password_hash_cost, 14);
    assert_eq!(config.auth.session_cookie_name, "session");
    assert!(config.auth.secure_cookies);
}

#[test]
fn test_overrides() {
    let config = Config::from_lookup(lookup(&[
        ("DATABASE_URL", "postgres://localhost/netowork"),
        ("DATABASE_MAX_CONNECTIONS", "10"),
        ("REDIS_URL", "redis://127.0.0.1:6379"),
        ("ENVIRONMENT", "production"),
        ("CLIENT_URL", "https://netowork.app"),
        ("USER_SESSION_TTL", "1h30m"),
        ("PASSWORD_RESET_TOKEN_TTL", "15m"),
        ("SECURE_COOKIES", "false"),
    ]))
    .expect("valid overrides");

    assert_eq!(config.database_url, "postgres://localhost/netowork");
    assert_eq!(config.database_max_connections, 10);
    assert_eq!(config.redis_url.as_deref(), Some("redis://127.0.0.1:6379"));
    assert!(!config.is_dev());
    assert_eq!(config.auth.client_url, "https://netowork.app");
    assert_eq!(config.auth.user_session_ttl, Duration::from_secs(5_400));
    assert_eq!(config.auth.password_reset_token_ttl, Duration::from_secs(900));
    assert!(!config.auth.secure_cookies);
}

#[test]
fn test_empty_values_fall_back_to_defaults() {
    let config = Config::from_lookup(lookup(&[("REDIS_URL", ""), ("USER_SESSION_TTL", "  ")]))
        .expect("blank values are ignored");
    assert!(config.redis_url.is_none());
    assert_eq!(config.auth.user_session_ttl, Duration::from_secs(720 * 3600));
}

#[test]
fn test_malformed_values_are_errors() {
    let cases = [
        ("DATABASE_MAX_CONNECTIONS", "many"),
        ("PASSWORD_HASH_COST", "-1"),
        ("VERIFICATION_TOKEN_TTL", "1 week"),
        ("SECURE_COOKIES", "maybe"),
    ];

    for (key, value) in cases {
        let err = Config::from_lookup(lookup(&[(key, value)]))
            .expect_err("malformed value must be rejected");
        let ConfigError::Invalid { key: reported, .. } = err;
        assert_eq!(reported, key, "error should name {}", key);
    }
}

#[test]
fn test_smtp_requires_sender() {
    let err = Config::from_lookup(lookup(&[("SMTP_HOST", "smtp.example.com")]))
        .expect_err("sender is mandatory");
    assert!(err.to_string().contains("SMTP_SENDER"));

    let config = Config::from_lookup(lookup(&[
        ("SMTP_HOST", "smtp.example.com"),
        ("SMTP_SENDER", "no-reply@netowork.app"),
    ]))
    .unwrap();
    let smtp = config.smtp.expect("smtp configured");
    assert_eq!(smtp.port, 587);
    assert_eq!(smtp.sender, "no-reply@netowork.app");
}

#[test]
fn test_test_config() {
    let config = Config::test();
    assert_eq!(config.database_url, "sqlite::memory:");
    assert_eq!(config.auth.password_hash_cost, 4);
    assert!(!config.is_dev());
}
