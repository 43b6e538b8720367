use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role chosen at sign-up.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "freelancer")]
    Freelancer,
}

/// User entity.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub email: String,

    /// Password hash (excluded from serialization via serde skip)
    #[serde(skip_serializing)]
    pub hashed_password: String,

    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub avatar: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::verification_token::Entity")]
    VerificationToken,
    #[sea_orm(has_many = "super::password_reset_token::Entity")]
    PasswordResetToken,
}

impl Related<super::verification_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VerificationToken.def()
    }
}

impl Related<super::password_reset_token::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PasswordResetToken.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Public user data (safe to return to clients).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub avatar: Option<String>,
}

impl From<&Model> for UserResponse {
    fn from(user: &Model) -> Self {
        UserResponse {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            avatar: user.avatar.clone(),
        }
    }
}

impl From<Model> for UserResponse {
    fn from(user: Model) -> Self {
        UserResponse {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            role: user.role,
            avatar: user.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_hides_credentials() {
        let now = Utc::now();
        let user = Model {
            id: 7,
            email: "ann@example.com".to_string(),
            hashed_password: "$argon2id$secret".to_string(),
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            role: Role::Freelancer,
            avatar: None,
            is_verified: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(UserResponse::from(&user)).unwrap();
        assert_eq!(json["firstName"], "Ann");
        assert_eq!(json["role"], "freelancer");
        assert!(json.get("hashedPassword").is_none());
        assert!(json.get("id").is_none());

        let raw = serde_json::to_value(&user).unwrap();
        assert!(raw.get("hashed_password").is_none());
    }
}
