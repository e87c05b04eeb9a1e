//! Create `agency` table. Agencies may nest through `parent_agency_id`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Agency::Table)
                    .if_not_exists()
                    .col(uuid(Agency::Id).primary_key())
                    .col(string_len(Agency::Name, 256).not_null())
                    .col(ColumnDef::new(Agency::Acronym).string_len(32).null())
                    .col(string_len(Agency::Category, 32).not_null())
                    .col(ColumnDef::new(Agency::Description).text().null())
                    .col(ColumnDef::new(Agency::ParentAgencyId).uuid().null())
                    .col(ColumnDef::new(Agency::Address).string_len(512).null())
                    .col(ColumnDef::new(Agency::ContactEmail).string_len(256).null())
                    .col(ColumnDef::new(Agency::ContactPhone).string_len(64).null())
                    .col(ColumnDef::new(Agency::Website).string_len(256).null())
                    .col(timestamp_with_time_zone(Agency::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Agency::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agency_parent")
                            .from(Agency::Table, Agency::ParentAgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Agency::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Agency {
    Table,
    Id,
    Name,
    Acronym,
    Category,
    Description,
    ParentAgencyId,
    Address,
    ContactEmail,
    ContactPhone,
    Website,
    CreatedAt,
    UpdatedAt,
}
