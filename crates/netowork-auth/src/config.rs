use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration could not be read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Database connection URL (e.g. sqlite://netowork.db, postgres://...)
    pub database_url: String,

    /// Upper bound of the connection pool (default: 4)
    pub database_max_connections: u32,

    /// Redis URL for the session cache (optional, in-memory when absent)
    pub redis_url: Option<String>,

    /// Environment: development, production, test
    pub environment: String,

    /// SMTP settings (optional, emails are only logged when absent)
    pub smtp: Option<SmtpConfig>,

    pub auth: AuthConfig,
}

/// Settings for token lifetimes, email links and session cookies.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Frontend base URL that email links point to
    pub client_url: String,

    /// Path of the account verification page (relative to `client_url`)
    pub verification_token_path: String,

    /// Path of the password reset page (relative to `client_url`)
    pub password_reset_path: String,

    pub verification_token_ttl: Duration,

    pub password_reset_token_ttl: Duration,

    /// Logical lifetime of a session before it is refreshed
    pub user_session_ttl: Duration,

    /// Password hasher work factor
    pub password_hash_cost: u32,

    pub session_cookie_name: String,

    /// Whether session cookies carry the `Secure` attribute
    pub secure_cookies: bool,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Mailbox used in the `From` header
    pub sender: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        AuthConfig {
            client_url: "http://localhost:5173".to_string(),
            verification_token_path: "verify-account".to_string(),
            password_reset_path: "reset-password".to_string(),
            verification_token_ttl: Duration::from_secs(24 * 60 * 60),
            password_reset_token_ttl: Duration::from_secs(10 * 60),
            user_session_ttl: Duration::from_secs(720 * 60 * 60),
            password_hash_cost: 14,
            session_cookie_name: "session".to_string(),
            secure_cookies: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables (with .env support).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if missing)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = AuthConfig::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let auth = AuthConfig {
            client_url: get("CLIENT_URL").unwrap_or(defaults.client_url),
            verification_token_path: get("VERIFICATION_TOKEN_PATH")
                .unwrap_or(defaults.verification_token_path),
            password_reset_path: get("PASSWORD_RESET_PATH")
                .unwrap_or(defaults.password_reset_path),
            verification_token_ttl: duration_var(
                "VERIFICATION_TOKEN_TTL",
                get("VERIFICATION_TOKEN_TTL"),
                defaults.verification_token_ttl,
            )?,
            password_reset_token_ttl: duration_var(
                "PASSWORD_RESET_TOKEN_TTL",
                get("PASSWORD_RESET_TOKEN_TTL"),
                defaults.password_reset_token_ttl,
            )?,
            user_session_ttl: duration_var(
                "USER_SESSION_TTL",
                get("USER_SESSION_TTL"),
                defaults.user_session_ttl,
            )?,
            password_hash_cost: parse_var(
                "PASSWORD_HASH_COST",
                get("PASSWORD_HASH_COST"),
                defaults.password_hash_cost,
            )?,
            session_cookie_name: get("SESSION_COOKIE_NAME")
                .unwrap_or(defaults.session_cookie_name),
            secure_cookies: bool_var("SECURE_COOKIES", get("SECURE_COOKIES"), true)?,
        };

        let smtp = match get("SMTP_HOST") {
            Some(host) => Some(SmtpConfig {
                host,
                port: parse_var("SMTP_PORT", get("SMTP_PORT"), 587)?,
                username: get("SMTP_USERNAME").unwrap_or_default(),
                password: get("SMTP_PASSWORD").unwrap_or_default(),
                sender: get("SMTP_SENDER").ok_or(ConfigError::Invalid {
                    key: "SMTP_SENDER",
                    reason: "required when SMTP_HOST is set".to_string(),
                })?,
            }),
            None => None,
        };

        Ok(Config {
            database_url: get("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://netowork.db?mode=rwc".to_string()),
            database_max_connections: parse_var(
                "DATABASE_MAX_CONNECTIONS",
                get("DATABASE_MAX_CONNECTIONS"),
                4,
            )?,
            redis_url: get("REDIS_URL"),
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            smtp,
            auth,
        })
    }

    /// In-memory sqlite, in-memory cache and a cheap hash cost. Meant for tests.
    pub fn test() -> Self {
        Config {
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            redis_url: None,
            environment: "test".to_string(),
            smtp: None,
            auth: AuthConfig {
                password_hash_cost: 4,
                secure_cookies: false,
                ..AuthConfig::default()
            },
        }
    }

    /// Check if running in development mode.
    pub fn is_dev(&self) -> bool {
        self.environment == "development"
    }
}

fn parse_var<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn bool_var(key: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                reason: format!("expected a boolean, got {:?}", v),
            }),
        },
    }
}

fn duration_var(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    match raw {
        Some(raw) => parse_duration(&raw).map_err(|reason| ConfigError::Invalid { key, reason }),
        None => Ok(default),
    }
}

/// Parse durations such as `90`, `30s`, `10m`, `720h`, `1d` or `1h30m`.
/// A bare number is seconds.
pub fn parse_duration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty duration".to_string());
    }
    if let Ok(secs) = raw.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }

    let mut total: u64 = 0;
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            'd' => 24 * 60 * 60,
            _ => return Err(format!("unknown duration unit {:?} in {:?}", c, raw)),
        };
        let value: u64 = digits
            .parse()
            .map_err(|_| format!("missing number before {:?} in {:?}", c, raw))?;
        total = value
            .checked_mul(unit)
            .and_then(|v| total.checked_add(v))
            .ok_or_else(|| format!("duration {:?} is too large", raw))?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(format!("trailing number without unit in {:?}", raw));
    }

    Ok(Duration::from_secs(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("720h").unwrap(), Duration::from_secs(720 * 3600));
        assert_eq!(parse_duration("1d").unwrap(), Duration::from_secs(86_400));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5_400));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("1h30").is_err());
    }
}
