//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000021_create_agency;
mod m20240101_000022_create_user;
mod m20240101_000023_create_allocation;
mod m20240101_000024_create_release;
mod m20240101_000025_create_project;
mod m20240101_000026_create_expenditure;
mod m20240101_000027_create_document;
mod m20240101_000028_create_audit_log;
mod m20240101_000002_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000021_create_agency::Migration),
            Box::new(m20240101_000022_create_user::Migration),
            Box::new(m20240101_000023_create_allocation::Migration),
            Box::new(m20240101_000024_create_release::Migration),
            Box::new(m20240101_000025_create_project::Migration),
            Box::new(m20240101_000026_create_expenditure::Migration),
            Box::new(m20240101_000027_create_document::Migration),
            Box::new(m20240101_000028_create_audit_log::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000002_add_indexes::Migration),
        ]
    }
}
