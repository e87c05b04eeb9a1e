use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const CATEGORIES: &[&str] = &["NATIONAL", "LOCAL", "CONSTITUTIONAL", "SECTORAL"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "agency")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub acronym: Option<String>,
    pub category: String,
    pub description: Option<String>,
    pub parent_agency_id: Option<Uuid>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    ParentAgency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::ParentAgency => Entity::belongs_to(Entity)
                .from(Column::ParentAgencyId)
                .to(Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    Ok(())
}

/// Normalize to uppercase and check membership in the closed category set.
pub fn validate_category(c: &str) -> Result<String, errors::ModelError> {
    let up = c.to_ascii_uppercase();
    if !CATEGORIES.contains(&up.as_str()) {
        return Err(errors::ModelError::Validation("invalid agency category".into()));
    }
    Ok(up)
}

pub async fn create(
    db: &DatabaseConnection,
    name: &str,
    acronym: Option<String>,
    category: &str,
) -> Result<Model, errors::ModelError> {
    validate_name(name)?;
    let category = validate_category(category)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        acronym: Set(acronym),
        category: Set(category),
        description: Set(None),
        parent_agency_id: Set(None),
        address: Set(None),
        contact_email: Set(None),
        contact_phone: Set(None),
        website: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_normalizes_case() {
        assert_eq!(validate_category("national").unwrap(), "NATIONAL");
    }

    #[test]
    fn category_rejects_unknown_value() {
        assert!(validate_category("REGIONAL").is_err());
    }

    #[test]
    fn name_rejects_blank() {
        assert!(validate_name("  ").is_err());
    }
}
