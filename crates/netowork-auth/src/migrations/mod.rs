pub use sea_orm_migration::prelude::*;

mod m20250314_000001_create_users_table;
mod m20250314_000002_create_verification_token_table;
mod m20250405_000003_create_password_reset_token_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250314_000001_create_users_table::Migration),
            Box::new(m20250314_000002_create_verification_token_table::Migration),
            Box::new(m20250405_000003_create_password_reset_token_table::Migration),
        ]
    }
}
