use sea_orm_migration::prelude::*;

use super::m20250314_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(VerificationToken::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VerificationToken::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VerificationToken::UserId).integer().not_null())
                    .col(ColumnDef::new(VerificationToken::Token).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(VerificationToken::Expires)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_verification_token_user")
                            .from(VerificationToken::Table, VerificationToken::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(VerificationToken::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum VerificationToken {
    #[iden = "verification_token"]
    Table,
    Id,
    UserId,
    Token,
    Expires,
}
