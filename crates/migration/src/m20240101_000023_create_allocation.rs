//! Create `allocation` table. Amounts are stored as double precision,
//! matching the upstream data feed.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Allocation::Table)
                    .if_not_exists()
                    .col(uuid(Allocation::Id).primary_key())
                    .col(uuid(Allocation::AgencyId).not_null())
                    .col(string_len(Allocation::Title, 512).not_null())
                    .col(ColumnDef::new(Allocation::Description).text().null())
                    .col(double(Allocation::Amount).not_null())
                    .col(integer(Allocation::FiscalYear).not_null())
                    .col(ColumnDef::new(Allocation::UacsCode).string_len(32).null())
                    .col(string_len(Allocation::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Allocation::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Allocation::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_allocation_agency")
                            .from(Allocation::Table, Allocation::AgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Allocation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Allocation {
    Table,
    Id,
    AgencyId,
    Title,
    Description,
    Amount,
    FiscalYear,
    UacsCode,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Agency { Table, Id }
