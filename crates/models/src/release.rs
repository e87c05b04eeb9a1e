use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{agency, allocation, errors};

pub const STATUSES: &[&str] = &["PENDING", "APPROVED", "RELEASED", "CANCELLED"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "release")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub allocation_id: Uuid,
    pub agency_id: Uuid,
    pub amount: f64,
    pub description: Option<String>,
    pub reference_no: Option<String>,
    pub status: String,
    pub released_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Allocation,
    Agency,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Allocation => Entity::belongs_to(allocation::Entity)
                .from(Column::AllocationId)
                .to(allocation::Column::Id)
                .into(),
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
        return Err(errors::ModelError::Validation("invalid release status".into()));
    }
    Ok(up)
}

pub async fn create(
    db: &DatabaseConnection,
    allocation_id: Uuid,
    agency_id: Uuid,
    amount: f64,
    description: Option<String>,
    reference_no: Option<String>,
) -> Result<Model, errors::ModelError> {
    if !(amount > 0.0) {
        return Err(errors::ModelError::Validation("amount must be greater than 0".into()));
    }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        allocation_id: Set(allocation_id),
        agency_id: Set(agency_id),
        amount: Set(amount),
        description: Set(description),
        reference_no: Set(reference_no),
        status: Set("PENDING".into()),
        released_at: Set(None),
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
        assert_eq!(validate_status("released").unwrap(), "RELEASED");
        assert!(validate_status("QUEUED").is_err());
    }
}
