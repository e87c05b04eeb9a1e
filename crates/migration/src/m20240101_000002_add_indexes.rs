//! Secondary indexes for the hot listing and filtering paths.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_allocation_agency")
                    .table(Allocation::Table)
                    .col(Allocation::AgencyId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_allocation_fiscal_year")
                    .table(Allocation::Table)
                    .col(Allocation::FiscalYear)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_release_allocation")
                    .table(Release::Table)
                    .col(Release::AllocationId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_expenditure_release")
                    .table(Expenditure::Table)
                    .col(Expenditure::ReleaseId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_project_allocation")
                    .table(Project::Table)
                    .col(Project::AllocationId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_document_reference")
                    .table(Document::Table)
                    .col(Document::ReferenceId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_log_action")
                    .table(AuditLog::Table)
                    .col(AuditLog::Action)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_audit_log_created_at")
                    .table(AuditLog::Table)
                    .col(AuditLog::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_allocation_agency").table(Allocation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_allocation_fiscal_year").table(Allocation::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_release_allocation").table(Release::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_expenditure_release").table(Expenditure::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_project_allocation").table(Project::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_document_reference").table(Document::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_audit_log_action").table(AuditLog::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_audit_log_created_at").table(AuditLog::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Allocation { Table, AgencyId, FiscalYear }

#[derive(DeriveIden)]
enum Release { Table, AllocationId }

#[derive(DeriveIden)]
enum Expenditure { Table, ReleaseId }

#[derive(DeriveIden)]
enum Project { Table, AllocationId }

#[derive(DeriveIden)]
enum Document { Table, ReferenceId }

#[derive(DeriveIden)]
enum AuditLog { Table, Action, CreatedAt }
