use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::audit_log_service::{self, RequestMeta};
use crate::db::expenditure_service::ReleaseRef;
use crate::db::release_service::AllocationRef;
use crate::db::AgencyRef;
use crate::errors::ServiceError;
use models::{agency, allocation, expenditure, project, release};

#[derive(Debug, Default, Deserialize)]
pub struct ProjectFilter {
    pub allocation_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub release_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateProject {
    pub allocation_id: Uuid,
    pub agency_id: Uuid,
    #[serde(default)]
    pub release_id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub budget: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start_date: Option<sea_orm::prelude::DateTimeWithTimeZone>,
    #[serde(default)]
    pub end_date: Option<sea_orm::prelude::DateTimeWithTimeZone>,
}

#[derive(Debug, Serialize)]
pub struct ProjectView {
    #[serde(flatten)]
    pub project: project::Model,
    pub allocation: Option<AllocationRef>,
    pub agency: Option<AgencyRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release: Option<ReleaseRef>,
    pub expenditure_count: i64,
}

#[derive(Debug, FromQueryResult)]
struct GroupCount {
    key: Uuid,
    count: i64,
}

/// Projects newest-first with parent refs and expenditure counts.
pub async fn list_projects(db: &DatabaseConnection, filter: ProjectFilter) -> Result<Vec<ProjectView>, ServiceError> {
    let mut query = project::Entity::find().order_by_desc(project::Column::CreatedAt);
    if let Some(allocation_id) = filter.allocation_id {
        query = query.filter(project::Column::AllocationId.eq(allocation_id));
    }
    if let Some(agency_id) = filter.agency_id {
        query = query.filter(project::Column::AgencyId.eq(agency_id));
    }
    if let Some(release_id) = filter.release_id {
        query = query.filter(project::Column::ReleaseId.eq(release_id));
    }
    if let Some(status) = filter.status.as_deref() {
        if let Ok(valid) = project::validate_status(status) {
            query = query.filter(project::Column::Status.eq(valid));
        }
    }
    let projects = query.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let project_ids: Vec<Uuid> = projects.iter().map(|p| p.id).collect();

    let allocation_ids: Vec<Uuid> = projects.iter().map(|p| p.allocation_id).collect();
    let allocations: HashMap<Uuid, allocation::Model> = allocation::Entity::find()
        .filter(allocation::Column::Id.is_in(allocation_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    let agency_ids: Vec<Uuid> = projects.iter().map(|p| p.agency_id).collect();
    let agencies: HashMap<Uuid, AgencyRef> = agency::Entity::find()
        .filter(agency::Column::Id.is_in(agency_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|a| (a.id, AgencyRef::from(a)))
        .collect();

    let release_ids: Vec<Uuid> = projects.iter().filter_map(|p| p.release_id).collect();
    let releases: HashMap<Uuid, release::Model> = release::Entity::find()
        .filter(release::Column::Id.is_in(release_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|r| (r.id, r))
        .collect();

    let expenditure_counts: HashMap<Uuid, i64> = expenditure::Entity::find()
        .select_only()
        .column_as(expenditure::Column::ProjectId, "key")
        .column_as(expenditure::Column::Id.count(), "count")
        .filter(expenditure::Column::ProjectId.is_in(project_ids))
        .group_by(expenditure::Column::ProjectId)
        .into_model::<GroupCount>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|r| (r.key, r.count))
        .collect();

    Ok(projects
        .into_iter()
        .map(|p| ProjectView {
            allocation: allocations.get(&p.allocation_id).cloned().map(AllocationRef::from),
            agency: agencies.get(&p.agency_id).cloned(),
            release: p
                .release_id
                .and_then(|rid| releases.get(&rid).cloned())
                .map(ReleaseRef::from),
            expenditure_count: expenditure_counts.get(&p.id).copied().unwrap_or(0),
            project: p,
        })
        .collect())
}

pub async fn create_project(
    db: &DatabaseConnection,
    input: CreateProject,
    meta: &RequestMeta,
) -> Result<project::Model, ServiceError> {
    let allocation = allocation::Entity::find_by_id(input.allocation_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if allocation.is_none() {
        return Err(ServiceError::not_found("allocation"));
    }

    let agency = agency::Entity::find_by_id(input.agency_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if agency.is_none() {
        return Err(ServiceError::not_found("agency"));
    }

    if let Some(release_id) = input.release_id {
        let release = release::Entity::find_by_id(release_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if release.is_none() {
            return Err(ServiceError::not_found("release"));
        }
    }

    let created = project::create(
        db,
        input.allocation_id,
        input.agency_id,
        input.release_id,
        &input.name,
        input.description,
        input.budget,
        input.location,
        input.start_date,
        input.end_date,
    )
    .await?;

    let snapshot = serde_json::to_string(&created).ok();
    audit_log_service::append(db, "CREATE_PROJECT", "Project", &created.id.to_string(), snapshot, meta).await?;

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::allocation_service::{create_allocation, CreateAllocation};
    use crate::test_support::get_db;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn project_validates_parents_and_dates() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();

        let a = agency::create(&db, &format!("Project Agency {}", Uuid::new_v4()), None, "SECTORAL").await?;
        let year: i32 = Utc::now().format("%Y").to_string().parse()?;
        let alloc = create_allocation(
            &db,
            CreateAllocation {
                agency_id: a.id,
                title: "Project Allocation".into(),
                description: None,
                amount: 10_000.0,
                fiscal_year: year,
                uacs_code: None,
            },
            &meta,
        )
        .await?;

        let inverted = create_project(
            &db,
            CreateProject {
                allocation_id: alloc.id,
                agency_id: a.id,
                release_id: None,
                name: "Backwards Project".into(),
                description: None,
                budget: 100.0,
                location: None,
                start_date: Some(Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap().into()),
                end_date: Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap().into()),
            },
            &meta,
        )
        .await;
        assert!(inverted.is_err());

        let missing_release = create_project(
            &db,
            CreateProject {
                allocation_id: alloc.id,
                agency_id: a.id,
                release_id: Some(Uuid::new_v4()),
                name: "Detached Project".into(),
                description: None,
                budget: 100.0,
                location: None,
                start_date: None,
                end_date: None,
            },
            &meta,
        )
        .await;
        assert!(matches!(missing_release, Err(ServiceError::NotFound(_))));

        let created = create_project(
            &db,
            CreateProject {
                allocation_id: alloc.id,
                agency_id: a.id,
                release_id: None,
                name: "Valid Project".into(),
                description: None,
                budget: 100.0,
                location: Some("Region I".into()),
                start_date: None,
                end_date: None,
            },
            &meta,
        )
        .await?;
        assert_eq!(created.status, "PLANNING");

        let views = list_projects(&db, ProjectFilter { agency_id: Some(a.id), ..Default::default() }).await?;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].expenditure_count, 0);

        agency::Entity::delete_by_id(a.id).exec(&db).await?;
        Ok(())
    }
}
