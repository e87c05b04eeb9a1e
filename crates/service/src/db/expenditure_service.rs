use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::audit_log_service::{self, RequestMeta};
use crate::db::release_service::total_spent;
use crate::errors::ServiceError;
use models::{expenditure, project, release};

#[derive(Debug, Default, Deserialize)]
pub struct ExpenditureFilter {
    pub release_id: Option<Uuid>,
    pub project_id: Option<Uuid>,
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateExpenditure {
    pub release_id: Uuid,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    pub amount: f64,
    pub beneficiary: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub document_hash: Option<String>,
    pub category: String,
}

#[derive(Debug, Serialize)]
pub struct ReleaseRef {
    pub id: Uuid,
    pub reference_no: Option<String>,
    pub amount: f64,
    pub status: String,
}

impl From<release::Model> for ReleaseRef {
    fn from(m: release::Model) -> Self {
        Self { id: m.id, reference_no: m.reference_no, amount: m.amount, status: m.status }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectRef {
    pub id: Uuid,
    pub name: String,
    pub location: Option<String>,
}

impl From<project::Model> for ProjectRef {
    fn from(m: project::Model) -> Self {
        Self { id: m.id, name: m.name, location: m.location }
    }
}

#[derive(Debug, Serialize)]
pub struct ExpenditureView {
    #[serde(flatten)]
    pub expenditure: expenditure::Model,
    pub release: Option<ReleaseRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<ProjectRef>,
}

/// Expenditures newest-first with release and project refs.
pub async fn list_expenditures(
    db: &DatabaseConnection,
    filter: ExpenditureFilter,
) -> Result<Vec<ExpenditureView>, ServiceError> {
    let mut query = expenditure::Entity::find().order_by_desc(expenditure::Column::CreatedAt);
    if let Some(release_id) = filter.release_id {
        query = query.filter(expenditure::Column::ReleaseId.eq(release_id));
    }
    if let Some(project_id) = filter.project_id {
        query = query.filter(expenditure::Column::ProjectId.eq(project_id));
    }
    if let Some(status) = filter.status.as_deref() {
        if let Ok(valid) = expenditure::validate_status(status) {
            query = query.filter(expenditure::Column::Status.eq(valid));
        }
    }
    if let Some(category) = filter.category.as_deref() {
        if let Ok(valid) = expenditure::validate_category(category) {
            query = query.filter(expenditure::Column::Category.eq(valid));
        }
    }
    let expenditures = query.all(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    let release_ids: Vec<Uuid> = expenditures.iter().map(|e| e.release_id).collect();
    let releases: HashMap<Uuid, ReleaseRef> = release::Entity::find()
        .filter(release::Column::Id.is_in(release_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|r| (r.id, ReleaseRef::from(r)))
        .collect();

    let project_ids: Vec<Uuid> = expenditures.iter().filter_map(|e| e.project_id).collect();
    let projects: HashMap<Uuid, ProjectRef> = project::Entity::find()
        .filter(project::Column::Id.is_in(project_ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|p| (p.id, ProjectRef::from(p)))
        .collect();

    Ok(expenditures
        .into_iter()
        .map(|e| ExpenditureView {
            release: releases.get(&e.release_id).map(|r| ReleaseRef {
                id: r.id,
                reference_no: r.reference_no.clone(),
                amount: r.amount,
                status: r.status.clone(),
            }),
            project: e.project_id.and_then(|pid| {
                projects.get(&pid).map(|p| ProjectRef {
                    id: p.id,
                    name: p.name.clone(),
                    location: p.location.clone(),
                })
            }),
            expenditure: e,
        })
        .collect())
}

/// Create an expenditure, capped by the release's remaining budget.
pub async fn create_expenditure(
    db: &DatabaseConnection,
    input: CreateExpenditure,
    meta: &RequestMeta,
) -> Result<expenditure::Model, ServiceError> {
    let release = release::Entity::find_by_id(input.release_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("release"))?;

    if let Some(project_id) = input.project_id {
        let project = project::Entity::find_by_id(project_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        if project.is_none() {
            return Err(ServiceError::not_found("project"));
        }
    }

    if !(input.amount > 0.0) {
        return Err(ServiceError::Validation("amount must be greater than 0".into()));
    }
    expenditure::validate_category(&input.category)?;

    let already_spent = total_spent(db, release.id).await?;
    if already_spent + input.amount > release.amount {
        return Err(ServiceError::Validation(
            "expenditure amount exceeds remaining release budget".into(),
        ));
    }

    let created = expenditure::create(
        db,
        input.release_id,
        input.project_id,
        input.amount,
        &input.beneficiary,
        input.description,
        input.document_hash,
        &input.category,
    )
    .await?;

    let snapshot = serde_json::to_string(&created).ok();
    audit_log_service::append(db, "CREATE_EXPENDITURE", "Expenditure", &created.id.to_string(), snapshot, meta)
        .await?;

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::allocation_service::{create_allocation, CreateAllocation};
    use crate::db::release_service::{create_release, CreateRelease};
    use crate::test_support::get_db;
    use models::agency;

    #[tokio::test]
    async fn expenditure_respects_release_cap() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();

        let a = agency::create(&db, &format!("Spend Agency {}", Uuid::new_v4()), None, "NATIONAL").await?;
        let year: i32 = chrono::Utc::now().format("%Y").to_string().parse()?;
        let alloc = create_allocation(
            &db,
            CreateAllocation {
                agency_id: a.id,
                title: "Spend Allocation".into(),
                description: None,
                amount: 1000.0,
                fiscal_year: year,
                uacs_code: None,
            },
            &meta,
        )
        .await?;
        let rel = create_release(
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
        .await?;

        let ok = create_expenditure(
            &db,
            CreateExpenditure {
                release_id: rel.id,
                project_id: None,
                amount: 300.0,
                beneficiary: "ABC Construction Corp".into(),
                description: None,
                document_hash: None,
                category: "MOOE".into(),
            },
            &meta,
        )
        .await?;
        assert_eq!(ok.category, "MOOE");

        let over = create_expenditure(
            &db,
            CreateExpenditure {
                release_id: rel.id,
                project_id: None,
                amount: 300.0,
                beneficiary: "ABC Construction Corp".into(),
                description: None,
                document_hash: None,
                category: "MOOE".into(),
            },
            &meta,
        )
        .await;
        assert!(matches!(over, Err(ServiceError::Validation(_))));

        let bad_category = create_expenditure(
            &db,
            CreateExpenditure {
                release_id: rel.id,
                project_id: None,
                amount: 10.0,
                beneficiary: "ABC Construction Corp".into(),
                description: None,
                document_hash: None,
                category: "TRAVEL".into(),
            },
            &meta,
        )
        .await;
        assert!(bad_category.is_err());

        let missing_project = create_expenditure(
            &db,
            CreateExpenditure {
                release_id: rel.id,
                project_id: Some(Uuid::new_v4()),
                amount: 10.0,
                beneficiary: "ABC Construction Corp".into(),
                description: None,
                document_hash: None,
                category: "MOOE".into(),
            },
            &meta,
        )
        .await;
        assert!(matches!(missing_project, Err(ServiceError::NotFound(_))));

        agency::Entity::delete_by_id(a.id).exec(&db).await?;
        Ok(())
    }
}
