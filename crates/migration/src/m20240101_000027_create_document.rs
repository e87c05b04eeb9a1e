//! Create `document` table. `reference_id` is an opaque key linking the
//! document to whichever record it supports.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Document::Table)
                    .if_not_exists()
                    .col(uuid(Document::Id).primary_key())
                    .col(string_len(Document::FileName, 256).not_null())
                    .col(string_len(Document::FileType, 128).not_null())
                    .col(big_integer(Document::FileSize).not_null())
                    .col(string_len(Document::IpfsHash, 64).not_null())
                    .col(string_len(Document::IpfsUrl, 256).not_null())
                    .col(string_len(Document::DocumentType, 32).not_null())
                    .col(string_len(Document::ReferenceId, 64).not_null())
                    .col(ColumnDef::new(Document::Description).text().null())
                    .col(string_len(Document::Status, 32).not_null())
                    .col(string_len(Document::UploadedBy, 256).not_null())
                    .col(timestamp_with_time_zone(Document::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Document::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Document {
    Table,
    Id,
    FileName,
    FileType,
    FileSize,
    IpfsHash,
    IpfsUrl,
    DocumentType,
    ReferenceId,
    Description,
    Status,
    UploadedBy,
    CreatedAt,
}
