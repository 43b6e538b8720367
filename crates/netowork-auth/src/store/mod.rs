//! Relational store: repository traits and their sea-orm implementations.
//!
//! Lookups return `Ok(None)` when no row matches. Errors are reserved for
//! constraint violations ([`StoreError::Conflict`]) and transport failures.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::error::StoreError;
use crate::models::{password_reset_token, user, verification_token, Role};

mod reset_tokens;
mod transactions;
mod users;
mod verification_tokens;

pub use reset_tokens::SeaPasswordResetTokenRepository;
pub use transactions::SeaTransactionRepository;
pub use users::SeaUserRepository;
pub use verification_tokens::SeaVerificationTokenRepository;

/// Unverified accounts older than this are removed by the maintenance sweep.
pub const UNVERIFIED_USER_RETENTION: chrono::TimeDelta = chrono::TimeDelta::days(1);

/// Fields of a user row supplied at sign-up.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub hashed_password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// A one-time token about to be persisted.
#[derive(Debug, Clone)]
pub struct NewToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_by_email(&self, email: &str) -> Result<Option<user::Model>, StoreError>;

    async fn get_by_id(&self, id: i32) -> Result<Option<user::Model>, StoreError>;

    /// Insert a user and return its id. A duplicate email is a `Conflict`.
    async fn create(&self, new_user: &NewUser) -> Result<i32, StoreError>;

    async fn update_is_verified(&self, id: i32, is_verified: bool) -> Result<(), StoreError>;

    async fn update_password(&self, id: i32, hashed_password: &str) -> Result<(), StoreError>;

    /// Delete unverified users created more than a day ago. Returns the number removed.
    async fn delete_unverified_stale(&self) -> Result<u64, StoreError>;
}

#[async_trait::async_trait]
pub trait VerificationTokenRepository: Send + Sync {
    async fn get_by_token(
        &self,
        token: &str,
    ) -> Result<Option<verification_token::Model>, StoreError>;

    async fn create(&self, user_id: i32, token: &NewToken) -> Result<(), StoreError>;

    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
pub trait PasswordResetTokenRepository: Send + Sync {
    async fn get_by_token(
        &self,
        token: &str,
    ) -> Result<Option<password_reset_token::Model>, StoreError>;

    async fn create(&self, user_id: i32, token: &NewToken) -> Result<(), StoreError>;

    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError>;

    /// Delete every token whose expiry has passed. Returns the number removed.
    async fn delete_all_expired(&self) -> Result<u64, StoreError>;
}

/// Writes that must land together or not at all.
#[async_trait::async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn create_user_and_verification_token(
        &self,
        new_user: &NewUser,
        token: &NewToken,
    ) -> Result<i32, StoreError>;

    /// Mark the user verified and delete the token. Fails with `Conflict`
    /// (and changes nothing) when the token row is already gone.
    async fn set_verified_and_consume_token(
        &self,
        user_id: i32,
        token: &str,
    ) -> Result<(), StoreError>;

    /// Replace the password hash and delete the reset token. Fails with
    /// `Conflict` (and changes nothing) when the token row is already gone.
    async fn set_password_and_consume_reset_token(
        &self,
        user_id: i32,
        hashed_password: &str,
        token: &str,
    ) -> Result<(), StoreError>;
}

/// All repositories over one connection pool.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserRepository>,
    pub verification_tokens: Arc<dyn VerificationTokenRepository>,
    pub reset_tokens: Arc<dyn PasswordResetTokenRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
}

impl Store {
    pub fn new(db: DatabaseConnection) -> Self {
        Store {
            users: Arc::new(SeaUserRepository::new(db.clone())),
            verification_tokens: Arc::new(SeaVerificationTokenRepository::new(db.clone())),
            reset_tokens: Arc::new(SeaPasswordResetTokenRepository::new(db.clone())),
            transactions: Arc::new(SeaTransactionRepository::new(db)),
        }
    }
}
