use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::{agency, errors};

pub const STATUSES: &[&str] = &["PROPOSED", "APPROVED", "RELEASED", "COMPLETED", "CANCELLED"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "allocation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub agency_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub fiscal_year: i32,
    pub uacs_code: Option<String>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
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

pub fn validate_status(s: &str) -> Result<String, errors::ModelError> {
    let up = s.to_ascii_uppercase();
    if !STATUSES.contains(&up.as_str()) {
        return Err(errors::ModelError::Validation("invalid allocation status".into()));
    }
    Ok(up)
}

pub fn validate_amount(amount: f64) -> Result<(), errors::ModelError> {
    if !(amount > 0.0) {
        return Err(errors::ModelError::Validation("amount must be greater than 0".into()));
    }
    Ok(())
}

/// Accept fiscal years from last year through ten years out.
pub fn validate_fiscal_year(year: i32) -> Result<(), errors::ModelError> {
    let current = Utc::now().year();
    if year < current - 1 || year > current + 10 {
        return Err(errors::ModelError::Validation("invalid fiscal year".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    agency_id: Uuid,
    title: &str,
    description: Option<String>,
    amount: f64,
    fiscal_year: i32,
    uacs_code: Option<String>,
) -> Result<Model, errors::ModelError> {
    if title.trim().is_empty() {
        return Err(errors::ModelError::Validation("title required".into()));
    }
    validate_amount(amount)?;
    validate_fiscal_year(fiscal_year)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        agency_id: Set(agency_id),
        title: Set(title.to_string()),
        description: Set(description),
        amount: Set(amount),
        fiscal_year: Set(fiscal_year),
        uacs_code: Set(uacs_code),
        status: Set("PROPOSED".into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_set_is_closed() {
        assert!(validate_status("approved").is_ok());
        assert!(validate_status("DRAFT").is_err());
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(validate_amount(0.0).is_err());
        assert!(validate_amount(-5.0).is_err());
        assert!(validate_amount(0.01).is_ok());
    }

    #[test]
    fn fiscal_year_window() {
        let current = Utc::now().year();
        assert!(validate_fiscal_year(current).is_ok());
        assert!(validate_fiscal_year(current - 1).is_ok());
        assert!(validate_fiscal_year(current + 10).is_ok());
        assert!(validate_fiscal_year(current - 2).is_err());
        assert!(validate_fiscal_year(current + 11).is_err());
    }
}
