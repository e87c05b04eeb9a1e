use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::audit_log_service::{self, RequestMeta};
use crate::db::AgencyRef;
use crate::errors::ServiceError;
use models::{agency, allocation, expenditure, project, release};

#[derive(Debug, Default, Deserialize)]
pub struct AllocationFilter {
    pub agency_id: Option<Uuid>,
    pub fiscal_year: Option<i32>,
    pub status: Option<String>,
    pub include_releases: bool,
    pub include_projects: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateAllocation {
    pub agency_id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: f64,
    pub fiscal_year: i32,
    #[serde(default)]
    pub uacs_code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReleaseWithExpenditures {
    #[serde(flatten)]
    pub release: release::Model,
    pub expenditures: Vec<expenditure::Model>,
}

#[derive(Debug, Serialize)]
pub struct AllocationView {
    #[serde(flatten)]
    pub allocation: allocation::Model,
    pub agency: Option<AgencyRef>,
    pub release_count: i64,
    pub project_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub releases: Option<Vec<ReleaseWithExpenditures>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projects: Option<Vec<project::Model>>,
}

#[derive(Debug, FromQueryResult)]
struct GroupCount {
    key: Uuid,
    count: i64,
}

pub async fn get_allocation(db: &DatabaseConnection, id: Uuid) -> Result<Option<allocation::Model>, ServiceError> {
    allocation::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Allocations newest-first with agency refs, child counts, and optionally
/// the child collections themselves. An unrecognized status filter value is
/// dropped rather than rejected.
pub async fn list_allocations(
    db: &DatabaseConnection,
    filter: AllocationFilter,
) -> Result<Vec<AllocationView>, ServiceError> {
    let mut query = allocation::Entity::find().order_by_desc(allocation::Column::CreatedAt);
    if let Some(agency_id) = filter.agency_id {
        query = query.filter(allocation::Column::AgencyId.eq(agency_id));
    }
    if let Some(year) = filter.fiscal_year {
        query = query.filter(allocation::Column::FiscalYear.eq(year));
    }
    if let Some(status) = filter.status.as_deref() {
        if let Ok(valid) = allocation::validate_status(status) {
            query = query.filter(allocation::Column::Status.eq(valid));
        }
    }
    let allocations = query.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    let allocation_ids: Vec<Uuid> = allocations.iter().map(|a| a.id).collect();

    // Agency refs for every listed allocation
    let agency_ids: Vec<Uuid> = allocations.iter().map(|a| a.agency_id).collect();
    let agencies: HashMap<Uuid, AgencyRef> = agency::Entity::find()
        .filter(agency::Column::Id.is_in(agency_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|a| (a.id, AgencyRef::from(a)))
        .collect();

    let release_counts = child_counts(db, &allocation_ids, Child::Releases).await?;
    let project_counts = child_counts(db, &allocation_ids, Child::Projects).await?;

    let mut releases_by_allocation: HashMap<Uuid, Vec<ReleaseWithExpenditures>> = HashMap::new();
    if filter.include_releases {
        let releases = release::Entity::find()
            .filter(release::Column::AllocationId.is_in(allocation_ids.clone()))
            .all(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        let release_ids: Vec<Uuid> = releases.iter().map(|r| r.id).collect();
        let mut expenditures_by_release: HashMap<Uuid, Vec<expenditure::Model>> = HashMap::new();
        for e in expenditure::Entity::find()
            .filter(expenditure::Column::ReleaseId.is_in(release_ids))
            .all(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
        {
            expenditures_by_release.entry(e.release_id).or_default().push(e);
        }
        for r in releases {
            let expenditures = expenditures_by_release.remove(&r.id).unwrap_or_default();
            releases_by_allocation
                .entry(r.allocation_id)
                .or_default()
                .push(ReleaseWithExpenditures { release: r, expenditures });
        }
    }

    let mut projects_by_allocation: HashMap<Uuid, Vec<project::Model>> = HashMap::new();
    if filter.include_projects {
        for p in project::Entity::find()
            .filter(project::Column::AllocationId.is_in(allocation_ids))
            .all(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
        {
            projects_by_allocation.entry(p.allocation_id).or_default().push(p);
        }
    }

    Ok(allocations
        .into_iter()
        .map(|a| {
            let id = a.id;
            AllocationView {
                agency: agencies.get(&a.agency_id).cloned(),
                release_count: release_counts.get(&id).copied().unwrap_or(0),
                project_count: project_counts.get(&id).copied().unwrap_or(0),
                releases: filter
                    .include_releases
                    .then(|| releases_by_allocation.remove(&id).unwrap_or_default()),
                projects: filter
                    .include_projects
                    .then(|| projects_by_allocation.remove(&id).unwrap_or_default()),
                allocation: a,
            }
        })
        .collect())
}

enum Child {
    Releases,
    Projects,
}

async fn child_counts(
    db: &DatabaseConnection,
    allocation_ids: &[Uuid],
    child: Child,
) -> Result<HashMap<Uuid, i64>, ServiceError> {
    let rows = match child {
        Child::Releases => {
            release::Entity::find()
                .select_only()
                .column_as(release::Column::AllocationId, "key")
                .column_as(release::Column::Id.count(), "count")
                .filter(release::Column::AllocationId.is_in(allocation_ids.to_vec()))
                .group_by(release::Column::AllocationId)
                .into_model::<GroupCount>()
                .all(db)
                .await
        }
        Child::Projects => {
            project::Entity::find()
                .select_only()
                .column_as(project::Column::AllocationId, "key")
                .column_as(project::Column::Id.count(), "count")
                .filter(project::Column::AllocationId.is_in(allocation_ids.to_vec()))
                .group_by(project::Column::AllocationId)
                .into_model::<GroupCount>()
                .all(db)
                .await
        }
    }
    .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(|r| (r.key, r.count)).collect())
}

pub async fn create_allocation(
    db: &DatabaseConnection,
    input: CreateAllocation,
    meta: &RequestMeta,
) -> Result<allocation::Model, ServiceError> {
    let agency = agency::Entity::find_by_id(input.agency_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if agency.is_none() {
        return Err(ServiceError::not_found("agency"));
    }

    let created = allocation::create(
        db,
        input.agency_id,
        &input.title,
        input.description,
        input.amount,
        input.fiscal_year,
        input.uacs_code,
    )
    .await?;

    let snapshot = serde_json::to_string(&created).ok();
    audit_log_service::append(db, "CREATE_ALLOCATION", "Allocation", &created.id.to_string(), snapshot, meta)
        .await?;

    Ok(created)
}

/// Sum of release amounts already drawn against an allocation.
pub async fn total_released(db: &DatabaseConnection, allocation_id: Uuid) -> Result<f64, ServiceError> {
    let total: Option<Option<f64>> = release::Entity::find()
        .select_only()
        .column_as(release::Column::Amount.sum(), "total")
        .filter(release::Column::AllocationId.eq(allocation_id))
        .into_tuple()
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(total.flatten().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn create_allocation_requires_existing_agency() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();

        let input = CreateAllocation {
            agency_id: Uuid::new_v4(),
            title: "Orphan Allocation".into(),
            description: None,
            amount: 1000.0,
            fiscal_year: chrono::Utc::now().format("%Y").to_string().parse()?,
            uacs_code: None,
        };
        assert!(matches!(create_allocation(&db, input, &meta).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_and_counts() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();

        let a = agency::create(&db, &format!("List Agency {}", Uuid::new_v4()), None, "LOCAL").await?;
        let year: i32 = chrono::Utc::now().format("%Y").to_string().parse()?;
        let created = create_allocation(
            &db,
            CreateAllocation {
                agency_id: a.id,
                title: "Listed Allocation".into(),
                description: None,
                amount: 500_000.0,
                fiscal_year: year,
                uacs_code: None,
            },
            &meta,
        )
        .await?;

        let views = list_allocations(
            &db,
            AllocationFilter { agency_id: Some(a.id), ..Default::default() },
        )
        .await?;
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].allocation.id, created.id);
        assert_eq!(views[0].release_count, 0);
        assert!(views[0].releases.is_none());
        let agency_ref = views[0].agency.as_ref().expect("agency ref");
        assert_eq!(agency_ref.id, a.id);

        // Unknown status filter is ignored, not an error
        let views = list_allocations(
            &db,
            AllocationFilter { agency_id: Some(a.id), status: Some("BOGUS".into()), ..Default::default() },
        )
        .await?;
        assert_eq!(views.len(), 1);

        agency::Entity::delete_by_id(a.id).exec(&db).await?;
        Ok(())
    }
}
