use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::pagination::Pagination;
use crate::errors::ServiceError;
use crate::ipfs;
use models::document;

#[derive(Debug, Default, Deserialize)]
pub struct DocumentFilter {
    pub reference_id: Option<String>,
    pub document_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UploadDocument {
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub document_type: String,
    pub reference_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
}

/// Slim confirmation returned to uploaders.
#[derive(Debug, Serialize)]
pub struct DocumentReceipt {
    pub id: Uuid,
    pub file_name: String,
    pub ipfs_hash: String,
    pub ipfs_url: String,
    pub uploaded_at: sea_orm::prelude::DateTimeWithTimeZone,
}

/// Document metadata newest-first, paginated.
pub async fn list_documents(
    db: &DatabaseConnection,
    filter: DocumentFilter,
    page: Pagination,
) -> Result<Vec<document::Model>, ServiceError> {
    let mut query = document::Entity::find().order_by_desc(document::Column::CreatedAt);
    if let Some(reference_id) = filter.reference_id.as_deref() {
        query = query.filter(document::Column::ReferenceId.eq(reference_id));
    }
    if let Some(document_type) = filter.document_type.as_deref() {
        if let Ok(valid) = document::validate_document_type(document_type) {
            query = query.filter(document::Column::DocumentType.eq(valid));
        }
    }
    let (page_idx, per_page) = page.normalize();
    query
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Pin the file through the mock store and persist its metadata.
pub async fn upload_document(db: &DatabaseConnection, input: UploadDocument) -> Result<DocumentReceipt, ServiceError> {
    if input.file_name.trim().is_empty()
        || input.document_type.trim().is_empty()
        || input.reference_id.trim().is_empty()
    {
        return Err(ServiceError::Validation(
            "file name, document type, and reference id are required".into(),
        ));
    }

    let pinned = ipfs::pin();
    let uploaded_by = input.uploaded_by.unwrap_or_else(|| "system".to_string());
    let created = document::create(
        db,
        &input.file_name,
        &input.file_type,
        input.file_size,
        &pinned.hash,
        &pinned.url,
        &input.document_type,
        &input.reference_id,
        input.description,
        &uploaded_by,
    )
    .await?;

    Ok(DocumentReceipt {
        id: created.id,
        file_name: created.file_name,
        ipfs_hash: created.ipfs_hash,
        ipfs_url: created.ipfs_url,
        uploaded_at: created.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn upload_pins_and_persists_metadata() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let reference_id = Uuid::new_v4().to_string();
        let receipt = upload_document(
            &db,
            UploadDocument {
                file_name: "contract-2024-001.pdf".into(),
                file_type: "application/pdf".into(),
                file_size: 482_113,
                document_type: "CONTRACT".into(),
                reference_id: reference_id.clone(),
                description: None,
                uploaded_by: None,
            },
        )
        .await?;
        assert!(receipt.ipfs_hash.starts_with("Qm"));
        assert!(receipt.ipfs_url.contains(&receipt.ipfs_hash));

        let listed = list_documents(
            &db,
            DocumentFilter { reference_id: Some(reference_id), document_type: Some("CONTRACT".into()) },
            Pagination::default(),
        )
        .await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].uploaded_by, "system");
        assert_eq!(listed[0].status, "ACTIVE");

        document::Entity::delete_by_id(receipt.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn upload_requires_reference_fields() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let missing = upload_document(
            &db,
            UploadDocument {
                file_name: "".into(),
                file_type: "application/pdf".into(),
                file_size: 1,
                document_type: "CONTRACT".into(),
                reference_id: "ref".into(),
                description: None,
                uploaded_by: None,
            },
        )
        .await;
        assert!(matches!(missing, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
