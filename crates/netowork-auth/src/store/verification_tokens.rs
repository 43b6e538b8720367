use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

use super::{NewToken, VerificationTokenRepository};
use crate::error::StoreError;
use crate::models::verification_token;

#[derive(Clone)]
pub struct SeaVerificationTokenRepository {
    db: DatabaseConnection,
}

impl SeaVerificationTokenRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        SeaVerificationTokenRepository { db }
    }
}

pub(super) async fn insert_token<C: ConnectionTrait>(
    conn: &C,
    user_id: i32,
    token: &NewToken,
) -> Result<(), StoreError> {
    verification_token::ActiveModel {
        user_id: Set(user_id),
        token: Set(token.token.clone()),
        expires: Set(token.expires),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Returns the number of rows removed (0 or 1).
pub(super) async fn remove_token<C: ConnectionTrait>(
    conn: &C,
    token: &str,
) -> Result<u64, StoreError> {
    let result = verification_token::Entity::delete_many()
        .filter(verification_token::Column::Token.eq(token))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

#[async_trait::async_trait]
impl VerificationTokenRepository for SeaVerificationTokenRepository {
    async fn get_by_token(
        &self,
        token: &str,
    ) -> Result<Option<verification_token::Model>, StoreError> {
        Ok(verification_token::Entity::find()
            .filter(verification_token::Column::Token.eq(token))
            .one(&self.db)
            .await?)
    }

    async fn create(&self, user_id: i32, token: &NewToken) -> Result<(), StoreError> {
        insert_token(&self.db, user_id, token).await
    }

    async fn delete_by_token(&self, token: &str) -> Result<(), StoreError> {
        remove_token(&self.db, token).await?;
        Ok(())
    }
}
