use sea_orm::{DatabaseConnection, TransactionTrait};

use super::{NewToken, NewUser, TransactionRepository, reset_tokens, users, verification_tokens};
use crate::error::StoreError;

/// Compound writes. Each method opens its own transaction; an early return
/// drops the transaction uncommitted, which rolls it back.
#[derive(Clone)]
pub struct SeaTransactionRepository {
    db: DatabaseConnection,
}

impl SeaTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        SeaTransactionRepository { db }
    }
}

#[async_trait::async_trait]
impl TransactionRepository for SeaTransactionRepository {
    async fn create_user_and_verification_token(
        &self,
        new_user: &NewUser,
        token: &NewToken,
    ) -> Result<i32, StoreError> {
        let txn = self.db.begin().await?;

        let user_id = users::insert_user(&txn, new_user).await?;
        verification_tokens::insert_token(&txn, user_id, token).await?;

        txn.commit().await?;
        Ok(user_id)
    }

    async fn set_verified_and_consume_token(
        &self,
        user_id: i32,
        token: &str,
    ) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        users::set_verified(&txn, user_id, true).await?;
        if verification_tokens::remove_token(&txn, token).await? == 0 {
            return Err(StoreError::Conflict(
                "verification token was already consumed".to_string(),
            ));
        }

        txn.commit().await?;
        Ok(())
    }

    async fn set_password_and_consume_reset_token(
        &self,
        user_id: i32,
        hashed_password: &str,
        token: &str,
    ) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;

        users::set_password(&txn, user_id, hashed_password).await?;
        if reset_tokens::remove_token(&txn, token).await? == 0 {
            return Err(StoreError::Conflict(
                "password reset token was already consumed".to_string(),
            ));
        }

        txn.commit().await?;
        Ok(())
    }
}
