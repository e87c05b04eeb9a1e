use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenditure::Table)
                    .if_not_exists()
                    .col(uuid(Expenditure::Id).primary_key())
                    .col(uuid(Expenditure::ReleaseId).not_null())
                    .col(ColumnDef::new(Expenditure::ProjectId).uuid().null())
                    .col(double(Expenditure::Amount).not_null())
                    .col(string_len(Expenditure::Beneficiary, 256).not_null())
                    .col(ColumnDef::new(Expenditure::Description).text().null())
                    .col(ColumnDef::new(Expenditure::DocumentHash).string_len(64).null())
                    .col(string_len(Expenditure::Category, 32).not_null())
                    .col(string_len(Expenditure::Status, 32).not_null())
                    .col(ColumnDef::new(Expenditure::SpentAt).timestamp_with_time_zone().null())
                    .col(timestamp_with_time_zone(Expenditure::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenditure_release")
                            .from(Expenditure::Table, Expenditure::ReleaseId)
                            .to(Release::Table, Release::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenditure_project")
                            .from(Expenditure::Table, Expenditure::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Expenditure::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Expenditure {
    Table,
    Id,
    ReleaseId,
    ProjectId,
    Amount,
    Beneficiary,
    Description,
    DocumentHash,
    Category,
    Status,
    SpentAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Release { Table, Id }

#[derive(DeriveIden)]
enum Project { Table, Id }
