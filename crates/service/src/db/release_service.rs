use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::allocation_service::total_released;
use crate::db::audit_log_service::{self, RequestMeta};
use crate::db::AgencyRef;
use crate::errors::ServiceError;
use models::{agency, allocation, expenditure, release};

#[derive(Debug, Default, Deserialize)]
pub struct ReleaseFilter {
    pub allocation_id: Option<Uuid>,
    pub agency_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRelease {
    pub allocation_id: Uuid,
    pub agency_id: Uuid,
    pub amount: f64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference_no: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllocationRef {
    pub id: Uuid,
    pub title: String,
    pub amount: f64,
    pub status: String,
}

impl From<allocation::Model> for AllocationRef {
    fn from(m: allocation::Model) -> Self {
        Self { id: m.id, title: m.title, amount: m.amount, status: m.status }
    }
}

#[derive(Debug, Serialize)]
pub struct ReleaseView {
    #[serde(flatten)]
    pub release: release::Model,
    pub allocation: Option<AllocationRef>,
    pub agency: Option<AgencyRef>,
    pub expenditures: Vec<expenditure::Model>,
    pub expenditure_count: usize,
}

pub async fn get_release(db: &DatabaseConnection, id: Uuid) -> Result<Option<release::Model>, ServiceError> {
    release::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Releases newest-first with parent refs and their expenditures.
pub async fn list_releases(db: &DatabaseConnection, filter: ReleaseFilter) -> Result<Vec<ReleaseView>, ServiceError> {
    let mut query = release::Entity::find().order_by_desc(release::Column::CreatedAt);
    if let Some(allocation_id) = filter.allocation_id {
        query = query.filter(release::Column::AllocationId.eq(allocation_id));
    }
    if let Some(agency_id) = filter.agency_id {
        query = query.filter(release::Column::AgencyId.eq(agency_id));
    }
    if let Some(status) = filter.status.as_deref() {
        if let Ok(valid) = release::validate_status(status) {
            query = query.filter(release::Column::Status.eq(valid));
        }
    }
    let releases = query.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    let allocation_ids: Vec<Uuid> = releases.iter().map(|r| r.allocation_id).collect();
    let allocations: HashMap<Uuid, AllocationRef> = allocation::Entity::find()
        .filter(allocation::Column::Id.is_in(allocation_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|a| (a.id, AllocationRef::from(a)))
        .collect();

    let agency_ids: Vec<Uuid> = releases.iter().map(|r| r.agency_id).collect();
    let agencies: HashMap<Uuid, AgencyRef> = agency::Entity::find()
        .filter(agency::Column::Id.is_in(agency_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|a| (a.id, AgencyRef::from(a)))
        .collect();

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

    Ok(releases
        .into_iter()
        .map(|r| {
            let expenditures = expenditures_by_release.remove(&r.id).unwrap_or_default();
            ReleaseView {
                allocation: allocations.get(&r.allocation_id).map(|a| AllocationRef {
                    id: a.id,
                    title: a.title.clone(),
                    amount: a.amount,
                    status: a.status.clone(),
                }),
                agency: agencies.get(&r.agency_id).cloned(),
                expenditure_count: expenditures.len(),
                expenditures,
                release: r,
            }
        })
        .collect())
}

/// Create a release, capped by the allocation's remaining budget.
pub async fn create_release(
    db: &DatabaseConnection,
    input: CreateRelease,
    meta: &RequestMeta,
) -> Result<release::Model, ServiceError> {
    let allocation = allocation::Entity::find_by_id(input.allocation_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("allocation"))?;

    let agency = agency::Entity::find_by_id(input.agency_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if agency.is_none() {
        return Err(ServiceError::not_found("agency"));
    }

    if !(input.amount > 0.0) {
        return Err(ServiceError::Validation("amount must be greater than 0".into()));
    }

    let already_released = total_released(db, allocation.id).await?;
    if already_released + input.amount > allocation.amount {
        return Err(ServiceError::Validation(
            "release amount exceeds remaining allocation budget".into(),
        ));
    }

    let created = release::create(
        db,
        input.allocation_id,
        input.agency_id,
        input.amount,
        input.description,
        input.reference_no,
    )
    .await?;

    let snapshot = serde_json::to_string(&created).ok();
    audit_log_service::append(db, "CREATE_RELEASE", "Release", &created.id.to_string(), snapshot, meta).await?;

    Ok(created)
}

/// Sum of expenditure amounts already drawn against a release.
pub async fn total_spent(db: &DatabaseConnection, release_id: Uuid) -> Result<f64, ServiceError> {
    let total: Option<Option<f64>> = expenditure::Entity::find()
        .select_only()
        .column_as(expenditure::Column::Amount.sum(), "total")
        .filter(expenditure::Column::ReleaseId.eq(release_id))
        .into_tuple()
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(total.flatten().unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::allocation_service::{create_allocation, CreateAllocation};
    use crate::test_support::get_db;

    async fn seed_allocation(db: &DatabaseConnection, amount: f64) -> Result<(agency::Model, allocation::Model), anyhow::Error> {
        let meta = RequestMeta::default();
        let a = agency::create(db, &format!("Release Agency {}", Uuid::new_v4()), None, "NATIONAL").await?;
        let year: i32 = chrono::Utc::now().format("%Y").to_string().parse()?;
        let alloc = create_allocation(
            db,
            CreateAllocation {
                agency_id: a.id,
                title: "Capped Allocation".into(),
                description: None,
                amount,
                fiscal_year: year,
                uacs_code: None,
            },
            &meta,
        )
        .await?;
        Ok((a, alloc))
    }

    #[tokio::test]
    async fn release_respects_allocation_cap() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();
        let (a, alloc) = seed_allocation(&db, 1000.0).await?;

        // First draw fits
        let first = create_release(
            &db,
            CreateRelease {
                allocation_id: alloc.id,
                agency_id: a.id,
                amount: 600.0,
                description: None,
                reference_no: None,
            },
            &meta,
        )
        .await?;
        assert_eq!(first.amount, 600.0);

        // Overdraw rejected
        let over = create_release(
            &db,
            CreateRelease {
                allocation_id: alloc.id,
                agency_id: a.id,
                amount: 500.0,
                description: None,
                reference_no: None,
            },
            &meta,
        )
        .await;
        assert!(matches!(over, Err(ServiceError::Validation(_))));

        // Exactly exhausting the remainder is allowed
        let exact = create_release(
            &db,
            CreateRelease {
                allocation_id: alloc.id,
                agency_id: a.id,
                amount: 400.0,
                description: None,
                reference_no: None,
            },
            &meta,
        )
        .await?;
        assert_eq!(total_released(&db, alloc.id).await?, 1000.0);
        let _ = exact;

        agency::Entity::delete_by_id(a.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn release_requires_existing_parents() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();

        let missing = create_release(
            &db,
            CreateRelease {
                allocation_id: Uuid::new_v4(),
                agency_id: Uuid::new_v4(),
                amount: 10.0,
                description: None,
                reference_no: None,
            },
            &meta,
        )
        .await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
