//! Create `audit_log` table. One row per mutating action, with a JSON
//! snapshot of the new values.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AuditLog::Table)
                    .if_not_exists()
                    .col(big_integer(AuditLog::Id).primary_key().auto_increment())
                    .col(string_len(AuditLog::Action, 128).not_null())
                    .col(string_len(AuditLog::EntityType, 64).not_null())
                    .col(string_len(AuditLog::EntityId, 64).not_null())
                    .col(ColumnDef::new(AuditLog::NewValues).text().null())
                    .col(ColumnDef::new(AuditLog::IpAddress).string_len(64).null())
                    .col(ColumnDef::new(AuditLog::UserAgent).string_len(256).null())
                    .col(timestamp_with_time_zone(AuditLog::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AuditLog::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AuditLog { Table, Id, Action, EntityType, EntityId, NewValues, IpAddress, UserAgent, CreatedAt }
