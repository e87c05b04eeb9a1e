use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{errors, project, release};

pub const STATUSES: &[&str] = &["PENDING", "SPENT", "VERIFIED", "REJECTED"];
pub const CATEGORIES: &[&str] = &["PERSONNEL", "MOOE", "CAPITAL_OUTLAY", "FINANCIAL_EXPENSE"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenditure")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub release_id: Uuid,
    pub project_id: Option<Uuid>,
    pub amount: f64,
    pub beneficiary: String,
    pub description: Option<String>,
    pub document_hash: Option<String>,
    pub category: String,
    pub status: String,
    pub spent_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Release,
    Project,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Release => Entity::belongs_to(release::Entity)
                .from(Column::ReleaseId)
                .to(release::Column::Id)
                .into(),
            Relation::Project => Entity::belongs_to(project::Entity)
                .from(Column::ProjectId)
                .to(project::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_status(s: &str) -> Result<String, errors::ModelError> {
    let up = s.to_ascii_uppercase();
    if !STATUSES.contains(&up.as_str()) {
        return Err(errors::ModelError::Validation("invalid expenditure status".into()));
    }
    Ok(up)
}

pub fn validate_category(c: &str) -> Result<String, errors::ModelError> {
    let up = c.to_ascii_uppercase();
    if !CATEGORIES.contains(&up.as_str()) {
        return Err(errors::ModelError::Validation("invalid expenditure category".into()));
    }
    Ok(up)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    db: &DatabaseConnection,
    release_id: Uuid,
    project_id: Option<Uuid>,
    amount: f64,
    beneficiary: &str,
    description: Option<String>,
    document_hash: Option<String>,
    category: &str,
) -> Result<Model, errors::ModelError> {
    if !(amount > 0.0) {
        return Err(errors::ModelError::Validation("amount must be greater than 0".into()));
    }
    if beneficiary.trim().is_empty() {
        return Err(errors::ModelError::Validation("beneficiary required".into()));
    }
    let category = validate_category(category)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        release_id: Set(release_id),
        project_id: Set(project_id),
        amount: Set(amount),
        beneficiary: Set(beneficiary.to_string()),
        description: Set(description),
        document_hash: Set(document_hash),
        category: Set(category),
        status: Set("PENDING".into()),
        spent_at: Set(None),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_set_is_closed() {
        assert_eq!(validate_category("mooe").unwrap(), "MOOE");
        assert!(validate_category("TRAVEL").is_err());
    }

    #[test]
    fn status_set_is_closed() {
        assert!(validate_status("VERIFIED").is_ok());
        assert!(validate_status("PAID").is_err());
    }
}
