use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::RngCore;
use rand::rngs::OsRng;
use thiserror::Error;

/// Random bytes behind an account verification token.
pub const VERIFICATION_TOKEN_BYTES: usize = 36;

/// Random bytes behind a password reset token.
pub const RESET_TOKEN_BYTES: usize = 36;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Random source failure: {0}")]
    Random(#[from] rand::Error),
}

/// Generate a cryptographically secure token of `len` random bytes,
/// hex-encoded (so the string is `2 * len` characters long).
pub fn generate_token(len: usize) -> Result<String, TokenError> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(hex::encode(bytes))
}

/// Opaque identifier for a cached session.
pub fn generate_session_key() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// `now + ttl`, saturating at the largest representable instant.
pub fn expiry_from_now(ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|ttl| Utc::now().checked_add_signed(ttl))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_length_and_alphabet() {
        let token = generate_token(VERIFICATION_TOKEN_BYTES).unwrap();
        assert_eq!(token.len(), VERIFICATION_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_zero_length_token_is_empty() {
        assert_eq!(generate_token(0).unwrap(), "");
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..256)
            .map(|_| generate_token(RESET_TOKEN_BYTES).unwrap())
            .collect();
        assert_eq!(tokens.len(), 256);
    }

    #[test]
    fn test_session_keys_are_uuids() {
        let key = generate_session_key();
        assert!(uuid::Uuid::parse_str(&key).is_ok());
        assert_ne!(key, generate_session_key());
    }

    #[test]
    fn test_expiry_saturates() {
        assert_eq!(expiry_from_now(Duration::MAX), DateTime::<Utc>::MAX_UTC);
        assert!(expiry_from_now(Duration::from_secs(60)) > Utc::now());
    }
}
