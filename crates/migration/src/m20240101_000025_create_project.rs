use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(uuid(Project::AllocationId).not_null())
                    .col(uuid(Project::AgencyId).not_null())
                    .col(ColumnDef::new(Project::ReleaseId).uuid().null())
                    .col(string_len(Project::Name, 512).not_null())
                    .col(ColumnDef::new(Project::Description).text().null())
                    .col(double(Project::Budget).not_null())
                    .col(ColumnDef::new(Project::Location).string_len(256).null())
                    .col(ColumnDef::new(Project::StartDate).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(Project::EndDate).timestamp_with_time_zone().null())
                    .col(string_len(Project::Status, 32).not_null())
                    .col(timestamp_with_time_zone(Project::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Project::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_allocation")
                            .from(Project::Table, Project::AllocationId)
                            .to(Allocation::Table, Allocation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_agency")
                            .from(Project::Table, Project::AgencyId)
                            .to(Agency::Table, Agency::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_release")
                            .from(Project::Table, Project::ReleaseId)
                            .to(Release::Table, Release::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Project::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Project {
    Table,
    Id,
    AllocationId,
    AgencyId,
    ReleaseId,
    Name,
    Description,
    Budget,
    Location,
    StartDate,
    EndDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Allocation { Table, Id }

#[derive(DeriveIden)]
enum Agency { Table, Id }

#[derive(DeriveIden)]
enum Release { Table, Id }
