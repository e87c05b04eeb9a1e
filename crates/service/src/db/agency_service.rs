use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::audit_log_service::{self, RequestMeta};
use crate::errors::ServiceError;
use models::{agency, allocation, project, release};

#[derive(Debug, Deserialize)]
pub struct CreateAgency {
    pub name: String,
    #[serde(default)]
    pub acronym: Option<String>,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_agency_id: Option<Uuid>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgencyWithCounts {
    #[serde(flatten)]
    pub agency: agency::Model,
    pub allocation_count: i64,
    pub release_count: i64,
    pub project_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct GroupCount {
    key: Uuid,
    count: i64,
}

async fn counts_by<E, C>(db: &DatabaseConnection, key_col: C, id_col: C) -> Result<HashMap<Uuid, i64>, ServiceError>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let rows = E::find()
        .select_only()
        .column_as(key_col, "key")
        .column_as(id_col.count(), "count")
        .group_by(key_col)
        .into_model::<GroupCount>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(|r| (r.key, r.count)).collect())
}

/// All agencies, name-ascending, with child record counts.
pub async fn list_agencies(db: &DatabaseConnection) -> Result<Vec<AgencyWithCounts>, ServiceError> {
    let agencies = agency::Entity::find()
        .order_by_asc(agency::Column::Name)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let allocations =
        counts_by::<allocation::Entity, _>(db, allocation::Column::AgencyId, allocation::Column::Id).await?;
    let releases = counts_by::<release::Entity, _>(db, release::Column::AgencyId, release::Column::Id).await?;
    let projects = counts_by::<project::Entity, _>(db, project::Column::AgencyId, project::Column::Id).await?;

    Ok(agencies
        .into_iter()
        .map(|a| {
            let id = a.id;
            AgencyWithCounts {
                agency: a,
                allocation_count: allocations.get(&id).copied().unwrap_or(0),
                release_count: releases.get(&id).copied().unwrap_or(0),
                project_count: projects.get(&id).copied().unwrap_or(0),
            }
        })
        .collect())
}

pub async fn create_agency(
    db: &DatabaseConnection,
    input: CreateAgency,
    meta: &RequestMeta,
) -> Result<agency::Model, ServiceError> {
    agency::validate_name(&input.name)?;
    let category = agency::validate_category(&input.category)?;

    if let Some(parent_id) = input.parent_agency_id {
        let parent = agency::Entity::find_by_id(parent_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if parent.is_none() {
            return Err(ServiceError::not_found("parent agency"));
        }
    }

    let now = Utc::now().into();
    let am = agency::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        acronym: Set(input.acronym),
        category: Set(category),
        description: Set(input.description),
        parent_agency_id: Set(input.parent_agency_id),
        address: Set(input.address),
        contact_email: Set(input.contact_email),
        contact_phone: Set(input.contact_phone),
        website: Set(input.website),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    let snapshot = serde_json::to_string(&created).ok();
    audit_log_service::append(db, "CREATE_AGENCY", "Agency", &created.id.to_string(), snapshot, meta).await?;

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn create_agency_validates_and_audits() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();

        let bad = CreateAgency {
            name: "Bureau of Nothing".into(),
            acronym: None,
            category: "MUNICIPAL".into(),
            description: None,
            parent_agency_id: None,
            address: None,
            contact_email: None,
            contact_phone: None,
            website: None,
        };
        assert!(matches!(create_agency(&db, bad, &meta).await, Err(ServiceError::Model(_))));

        let missing_parent = CreateAgency {
            name: "Sub Bureau".into(),
            acronym: None,
            category: "NATIONAL".into(),
            description: None,
            parent_agency_id: Some(Uuid::new_v4()),
            address: None,
            contact_email: None,
            contact_phone: None,
            website: None,
        };
        assert!(matches!(create_agency(&db, missing_parent, &meta).await, Err(ServiceError::NotFound(_))));

        let name = format!("Department of Testing {}", Uuid::new_v4());
        let ok = CreateAgency {
            name: name.clone(),
            acronym: Some("DOT".into()),
            category: "national".into(),
            description: Some("Test department".into()),
            parent_agency_id: None,
            address: None,
            contact_email: Some("info@dot.gov.ph".into()),
            contact_phone: None,
            website: None,
        };
        let created = create_agency(&db, ok, &meta).await?;
        assert_eq!(created.category, "NATIONAL");

        let listed = list_agencies(&db).await?;
        let row = listed.iter().find(|a| a.agency.id == created.id).expect("created agency listed");
        assert_eq!(row.allocation_count, 0);

        agency::Entity::delete_by_id(created.id).exec(&db).await?;
        Ok(())
    }
}
