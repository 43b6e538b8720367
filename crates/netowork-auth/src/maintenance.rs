//! Periodic cleanup, driven from outside (e.g. `netowork sweep` under cron).

use std::sync::Arc;

use crate::error::StoreError;
use crate::store::{PasswordResetTokenRepository, Store, UserRepository};

/// Rows removed by one [`Maintenance::run`]. `None` marks a sweep that failed
/// (the failure has already been logged).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted_users: Option<u64>,
    pub deleted_reset_tokens: Option<u64>,
}

impl SweepReport {
    pub fn is_success(&self) -> bool {
        self.deleted_users.is_some() && self.deleted_reset_tokens.is_some()
    }
}

#[derive(Clone)]
pub struct Maintenance {
    users: Arc<dyn UserRepository>,
    reset_tokens: Arc<dyn PasswordResetTokenRepository>,
}

impl Maintenance {
    pub fn new(
        users: Arc<dyn UserRepository>,
        reset_tokens: Arc<dyn PasswordResetTokenRepository>,
    ) -> Self {
        Maintenance {
            users,
            reset_tokens,
        }
    }

    pub fn from_store(store: &Store) -> Self {
        Self::new(store.users.clone(), store.reset_tokens.clone())
    }

    /// Remove accounts that were never verified within a day of sign-up.
    /// Their verification tokens go with them.
    pub async fn delete_unverified_stale(&self) -> Result<u64, StoreError> {
        self.users.delete_unverified_stale().await
    }

    pub async fn delete_expired_reset_tokens(&self) -> Result<u64, StoreError> {
        self.reset_tokens.delete_all_expired().await
    }

    /// Run both sweeps. They are independent: one failing does not stop the other.
    #[tracing::instrument(name = "maintenance_sweep", skip_all)]
    pub async fn run(&self) -> SweepReport {
        let deleted_users = match self.delete_unverified_stale().await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete stale unverified users");
                None
            }
        };

        let deleted_reset_tokens = match self.delete_expired_reset_tokens().await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete expired password reset tokens");
                None
            }
        };

        tracing::info!(?deleted_users, ?deleted_reset_tokens, "Maintenance sweep finished");
        SweepReport {
            deleted_users,
            deleted_reset_tokens,
        }
    }
}
