use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};

use super::{NewUser, UNVERIFIED_USER_RETENTION, UserRepository};
use crate::error::StoreError;
use crate::models::user;

#[derive(Clone)]
pub struct SeaUserRepository {
    db: DatabaseConnection,
}

impl SeaUserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        SeaUserRepository { db }
    }
}

/// Insert a user on any connection, including an open transaction.
pub(super) async fn insert_user<C: ConnectionTrait>(
    conn: &C,
    new_user: &NewUser,
) -> Result<i32, StoreError> {
    let now = Utc::now();
    let model = user::ActiveModel {
        email: Set(new_user.email.clone()),
        hashed_password: Set(new_user.hashed_password.clone()),
        first_name: Set(new_user.first_name.clone()),
        last_name: Set(new_user.last_name.clone()),
        role: Set(new_user.role),
        avatar: Set(None),
        is_verified: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let inserted = model.insert(conn).await?;
    Ok(inserted.id)
}

pub(super) async fn set_verified<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    is_verified: bool,
) -> Result<(), StoreError> {
    user::Entity::update_many()
        .col_expr(user::Column::IsVerified, Expr::value(is_verified))
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

pub(super) async fn set_password<C: ConnectionTrait>(
    conn: &C,
    id: i32,
    hashed_password: &str,
) -> Result<(), StoreError> {
    user::Entity::update_many()
        .col_expr(user::Column::HashedPassword, Expr::value(hashed_password))
        .col_expr(user::Column::UpdatedAt, Expr::value(Utc::now()))
        .filter(user::Column::Id.eq(id))
        .exec(conn)
        .await?;
    Ok(())
}

#[async_trait::async_trait]
impl UserRepository for SeaUserRepository {
    async fn get_by_email(&self, email: &str) -> Result<Option<user::Model>, StoreError> {
        Ok(user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await?)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<user::Model>, StoreError> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    async fn create(&self, new_user: &NewUser) -> Result<i32, StoreError> {
        insert_user(&self.db, new_user).await
    }

    async fn update_is_verified(&self, id: i32, is_verified: bool) -> Result<(), StoreError> {
        set_verified(&self.db, id, is_verified).await
    }

    async fn update_password(&self, id: i32, hashed_password: &str) -> Result<(), StoreError> {
        set_password(&self.db, id, hashed_password).await
    }

    async fn delete_unverified_stale(&self) -> Result<u64, StoreError> {
        let cutoff = Utc::now() - UNVERIFIED_USER_RETENTION;
        let result = user::Entity::delete_many()
            .filter(user::Column::IsVerified.eq(false))
            .filter(user::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }
}
