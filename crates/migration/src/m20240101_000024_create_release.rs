use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Release::Table)
                    .if_not_exists()
                    .col(uuid(Release::Id).primary_key())
                    .col(uuid(Release::AllocationId).not_null())
                    .col(uuid(Release::AgencyId).not_null())
                    .col(double(Release::Amount).not_null())
                    .col(ColumnDef::new(Release::Description).text().null())
                    .col(ColumnDef::new(Release::ReferenceNo).string_len(64).null())
                    .col(string_len(Release::Status, 32).not_null())
                    .col(ColumnDef::new(Release::ReleasedAt).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Release::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Release::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_release_allocation")
                            .from(Release::Table, Release::AllocationId)
                            .to(Allocation::Table, Allocation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_release_agency")
                            .from(Release::Table, Release::AgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Release::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Release {
    Table,
    Id,
    AllocationId,
    AgencyId,
    Amount,
    Description,
    ReferenceNo,
    Status,
    ReleasedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Allocation { Table, Id }

#[derive(DeriveIden)]
enum Agency { Table, Id }
