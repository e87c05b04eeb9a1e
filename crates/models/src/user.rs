use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::agency;

pub const ROLES: &[&str] = &["SYSTEM_ADMIN", "DBM_ADMIN", "AGENCY_HEAD", "COA_AUDITOR"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    pub agency_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Agency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Agency => Entity::belongs_to(agency::Entity)
                .from(Column::AgencyId)
                .to(agency::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') {
        return Err(errors::ModelError::Validation("invalid email".into()));
    }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<String, errors::ModelError> {
    let up = role.to_ascii_uppercase();
    if !ROLES.contains(&up.as_str()) {
        return Err(errors::ModelError::Validation("invalid user role".into()));
    }
    Ok(up)
}

pub async fn create(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    role: &str,
    agency_id: Option<Uuid>,
) -> Result<Model, errors::ModelError> {
    validate_email(email)?;
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    let role = validate_role(role)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        name: Set(name.to_string()),
        role: Set(role),
        agency_id: Set(agency_id),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_rejects_unknown_value() {
        assert!(validate_role("INTERN").is_err());
        assert_eq!(validate_role("coa_auditor").unwrap(), "COA_AUDITOR");
    }

    #[test]
    fn email_requires_at_sign() {
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("a@b.gov.ph").is_ok());
    }
}
