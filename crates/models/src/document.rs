use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const TYPES: &[&str] = &["BUDGET", "CONTRACT", "REPORT", "RECEIPT", "INVOICE", "COMPLIANCE", "OTHER"];
pub const STATUSES: &[&str] = &["ACTIVE", "ARCHIVED"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "document")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub ipfs_hash: String,
    pub ipfs_url: String,
    pub document_type: String,
    pub reference_id: String,
    pub description: Option<String>,
    pub status: String,
    pub uploaded_by: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_document_type(t: &str) -> Result<String, errors::ModelError> {
    let up = t.to_ascii_uppercase();
    if !TYPES.contains(&up.as_str()) {
        return Err(errors::ModelError::Validation("invalid document type".into()));
    }
    Ok(up)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    db: &DatabaseConnection,
    file_name: &str,
    file_type: &str,
    file_size: i64,
    ipfs_hash: &str,
    ipfs_url: &str,
    document_type: &str,
    reference_id: &str,
    description: Option<String>,
    uploaded_by: &str,
) -> Result<Model, errors::ModelError> {
    if file_name.trim().is_empty() {
        return Err(errors::ModelError::Validation("file name required".into()));
    }
    if reference_id.trim().is_empty() {
        return Err(errors::ModelError::Validation("reference id required".into()));
    }
    let document_type = validate_document_type(document_type)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        file_name: Set(file_name.to_string()),
        file_type: Set(file_type.to_string()),
        file_size: Set(file_size),
        ipfs_hash: Set(ipfs_hash.to_string()),
        ipfs_url: Set(ipfs_url.to_string()),
        document_type: Set(document_type),
        reference_id: Set(reference_id.to_string()),
        description: Set(description),
        status: Set("ACTIVE".into()),
        uploaded_by: Set(uploaded_by.to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_set_is_closed() {
        assert_eq!(validate_document_type("contract").unwrap(), "CONTRACT");
        assert!(validate_document_type("MEMO").is_err());
    }
}
