use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::auth::password::HashError;
use crate::auth::token::TokenError;
use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::notifier::NotifierError;

/// Coarse classification of an [`AuthError`], used by callers to pick a
/// user-facing response without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Unauthenticated,
    Infrastructure,
}

/// Failure of a relational store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. duplicate email).
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict(detail),
            _ => StoreError::Database(err),
        }
    }
}

/// Error returned by every [`AuthService`](crate::auth::AuthService) operation.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("User already exists")]
    UserExists,

    #[error("User does not exist")]
    UserDoesNotExist,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account email has not been verified")]
    AccountNotVerified,

    #[error("Verification token does not exist")]
    TokenDoesNotExist,

    #[error("Verification token has expired")]
    TokenExpired,

    #[error("Password reset token does not exist")]
    ResetTokenDoesNotExist,

    #[error("Password reset token has expired")]
    ResetTokenExpired,

    #[error("Session does not exist")]
    SessionDoesNotExist,

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Notifier error: {0}")]
    Notifier(#[from] NotifierError),

    #[error("Password hashing error: {0}")]
    Hash(#[from] HashError),

    #[error("Token generation error: {0}")]
    Token(#[from] TokenError),
}

impl AuthError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::UserDoesNotExist
            | AuthError::TokenDoesNotExist
            | AuthError::ResetTokenDoesNotExist => ErrorKind::NotFound,
            AuthError::UserExists => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::AccountNotVerified
            | AuthError::TokenExpired
            | AuthError::ResetTokenExpired => ErrorKind::Invalid,
            AuthError::SessionDoesNotExist | AuthError::Unauthenticated => {
                ErrorKind::Unauthenticated
            }
            AuthError::Store(_)
            | AuthError::Cache(_)
            | AuthError::Notifier(_)
            | AuthError::Hash(_)
            | AuthError::Token(_) => ErrorKind::Infrastructure,
        }
    }

    /// Get the stable error code string for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::UserExists => "USER_EXISTS",
            AuthError::UserDoesNotExist => "USER_DOES_NOT_EXIST",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthError::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            AuthError::TokenDoesNotExist => "VERIFICATION_TOKEN_DOES_NOT_EXIST",
            AuthError::TokenExpired => "VERIFICATION_TOKEN_EXPIRED",
            AuthError::ResetTokenDoesNotExist => "RESET_TOKEN_DOES_NOT_EXIST",
            AuthError::ResetTokenExpired => "RESET_TOKEN_EXPIRED",
            AuthError::SessionDoesNotExist => "SESSION_DOES_NOT_EXIST",
            AuthError::Unauthenticated => "UNAUTHENTICATED",
            AuthError::Store(_) => "STORE_ERROR",
            AuthError::Cache(_) => "CACHE_ERROR",
            AuthError::Notifier(_) => "NOTIFIER_ERROR",
            AuthError::Hash(_) => "HASH_ERROR",
            AuthError::Token(_) => "TOKEN_ERROR",
        }
    }

    /// Message safe to show to an end user. Infrastructure details never
    /// leak through here.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Infrastructure => "An internal server error occurred".to_string(),
            _ => self.to_string(),
        }
    }

    pub fn is_infrastructure(&self) -> bool {
        self.kind() == ErrorKind::Infrastructure
    }
}

/// Failure while assembling an [`App`](crate::app::App) from configuration.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Notifier error: {0}")]
    Notifier(#[from] NotifierError),

    #[error("Password hashing error: {0}")]
    Hash(#[from] HashError),
}
