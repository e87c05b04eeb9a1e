use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{agency, allocation, errors, release};

pub const STATUSES: &[&str] = &["PLANNING", "ONGOING", "COMPLETED", "SUSPENDED", "CANCELLED"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub allocation_id: Uuid,
    pub agency_id: Uuid,
    pub release_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub budget: f64,
    pub location: Option<String>,
    pub start_date: Option<DateTimeWithTimeZone>,
    pub end_date: Option<DateTimeWithTimeZone>,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Allocation,
    Agency,
    Release,
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
            Relation::Release => Entity::belongs_to(release::Entity)
                .from(Column::ReleaseId)
                .to(release::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_status(s: &str) -> Result<String, errors::ModelError> {
    let up = s.to_ascii_uppercase();
    if !STATUSES.contains(&up.as_str()) {
        return Err(errors::ModelError::Validation("invalid project status".into()));
    }
    Ok(up)
}

pub fn validate_dates(
    start: Option<DateTimeWithTimeZone>,
    end: Option<DateTimeWithTimeZone>,
) -> Result<(), errors::ModelError> {
    if let (Some(s), Some(e)) = (start, end) {
        if s >= e {
            return Err(errors::ModelError::Validation("start date must be before end date".into()));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    db: &DatabaseConnection,
    allocation_id: Uuid,
    agency_id: Uuid,
    release_id: Option<Uuid>,
    name: &str,
    description: Option<String>,
    budget: f64,
    location: Option<String>,
    start_date: Option<DateTimeWithTimeZone>,
    end_date: Option<DateTimeWithTimeZone>,
) -> Result<Model, errors::ModelError> {
    if name.trim().is_empty() {
        return Err(errors::ModelError::Validation("name required".into()));
    }
    if !(budget > 0.0) {
        return Err(errors::ModelError::Validation("budget must be greater than 0".into()));
    }
    validate_dates(start_date, end_date)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        allocation_id: Set(allocation_id),
        agency_id: Set(agency_id),
        release_id: Set(release_id),
        name: Set(name.to_string()),
        description: Set(description),
        budget: Set(budget),
        location: Set(location),
        start_date: Set(start_date),
        end_date: Set(end_date),
        status: Set("PLANNING".into()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn dates_must_be_ordered() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap().into();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap().into();
        assert!(validate_dates(Some(early), Some(late)).is_ok());
        assert!(validate_dates(Some(late), Some(early)).is_err());
        assert!(validate_dates(Some(early), Some(early)).is_err());
        assert!(validate_dates(None, Some(late)).is_ok());
    }

    #[test]
    fn status_set_is_closed() {
        assert!(validate_status("ongoing").is_ok());
        assert!(validate_status("STALLED").is_err());
    }
}
