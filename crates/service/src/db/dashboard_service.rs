use std::collections::HashMap;

use chrono::{Datelike, Utc};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use serde::Serialize;
use uuid::Uuid;

use crate::db::audit_log_service::{self, ActivityEntry, MonthlyActivity};
use crate::errors::ServiceError;
use models::{agency, allocation, expenditure, project, release};

#[derive(Debug, Serialize)]
pub struct CountSummary {
    pub agencies: u64,
    pub allocations: u64,
    pub releases: u64,
    pub expenditures: u64,
    pub projects: u64,
}

#[derive(Debug, Serialize)]
pub struct FinancialSummary {
    pub total_allocated: f64,
    pub total_released: f64,
    pub total_spent: f64,
    pub average_allocation: f64,
    pub average_release: f64,
    pub average_expenditure: f64,
}

#[derive(Debug, Serialize)]
pub struct UtilizationRates {
    pub release_rate: f64,
    pub expenditure_rate: f64,
    pub overall_utilization: f64,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct StatusBreakdown {
    pub status: String,
    pub count: i64,
    pub total: Option<f64>,
}

#[derive(Debug, FromQueryResult, Serialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub count: i64,
    pub total: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct Breakdowns {
    pub allocation_status: Vec<StatusBreakdown>,
    pub release_status: Vec<StatusBreakdown>,
    pub project_status: Vec<StatusBreakdown>,
    pub expenditure_category: Vec<CategoryBreakdown>,
}

#[derive(Debug, Serialize)]
pub struct TopAgency {
    pub id: Uuid,
    pub name: String,
    pub acronym: Option<String>,
    pub category: String,
    pub allocation_count: i64,
    pub total_allocation: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardData {
    pub counts: CountSummary,
    pub financials: FinancialSummary,
    pub utilization_rates: UtilizationRates,
    pub breakdowns: Breakdowns,
    pub top_agencies: Vec<TopAgency>,
    pub recent_activity: Vec<ActivityEntry>,
    pub monthly_trends: Vec<MonthlyActivity>,
}

#[derive(Debug, FromQueryResult)]
struct AgencyAllocationSum {
    agency_id: Uuid,
    count: i64,
    total: Option<f64>,
}

async fn sum_and_avg<E, C>(db: &DatabaseConnection, col: C) -> Result<(f64, f64), ServiceError>
where
    E: EntityTrait,
    C: ColumnTrait,
{
    let row: Option<(Option<f64>, Option<f64>)> = E::find()
        .select_only()
        .column_as(col.sum(), "sum")
        .column_as(
            Into::<sea_orm::sea_query::SimpleExpr>::into(sea_orm::sea_query::Func::avg(col.into_expr())),
            "avg",
        )
        .into_tuple()
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let (sum, avg) = row.unwrap_or((None, None));
    Ok((sum.unwrap_or(0.0), avg.unwrap_or(0.0)))
}

fn rate(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { (part / whole) * 100.0 } else { 0.0 }
}

/// The whole dashboard payload: counts, totals, rates, breakdowns, leaders,
/// and activity trends.
pub async fn overview(db: &DatabaseConnection) -> Result<DashboardData, ServiceError> {
    let counts = CountSummary {
        agencies: agency::Entity::find().count(db).await.map_err(|e| ServiceError::Db(e.to_string()))?,
        allocations: allocation::Entity::find().count(db).await.map_err(|e| ServiceError::Db(e.to_string()))?,
        releases: release::Entity::find().count(db).await.map_err(|e| ServiceError::Db(e.to_string()))?,
        expenditures: expenditure::Entity::find().count(db).await.map_err(|e| ServiceError::Db(e.to_string()))?,
        projects: project::Entity::find().count(db).await.map_err(|e| ServiceError::Db(e.to_string()))?,
    };

    let (total_allocated, average_allocation) =
        sum_and_avg::<allocation::Entity, _>(db, allocation::Column::Amount).await?;
    let (total_released, average_release) =
        sum_and_avg::<release::Entity, _>(db, release::Column::Amount).await?;
    let (total_spent, average_expenditure) =
        sum_and_avg::<expenditure::Entity, _>(db, expenditure::Column::Amount).await?;

    let financials = FinancialSummary {
        total_allocated,
        total_released,
        total_spent,
        average_allocation,
        average_release,
        average_expenditure,
    };

    let utilization_rates = UtilizationRates {
        release_rate: rate(total_released, total_allocated),
        expenditure_rate: rate(total_spent, total_released),
        overall_utilization: rate(total_spent, total_allocated),
    };

    let allocation_status = allocation::Entity::find()
        .select_only()
        .column(allocation::Column::Status)
        .column_as(allocation::Column::Id.count(), "count")
        .column_as(allocation::Column::Amount.sum(), "total")
        .group_by(allocation::Column::Status)
        .into_model::<StatusBreakdown>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let release_status = release::Entity::find()
        .select_only()
        .column(release::Column::Status)
        .column_as(release::Column::Id.count(), "count")
        .column_as(release::Column::Amount.sum(), "total")
        .group_by(release::Column::Status)
        .into_model::<StatusBreakdown>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let project_status = project::Entity::find()
        .select_only()
        .column(project::Column::Status)
        .column_as(project::Column::Id.count(), "count")
        .column_as(project::Column::Budget.sum(), "total")
        .group_by(project::Column::Status)
        .into_model::<StatusBreakdown>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let expenditure_category = expenditure::Entity::find()
        .select_only()
        .column(expenditure::Column::Category)
        .column_as(expenditure::Column::Id.count(), "count")
        .column_as(expenditure::Column::Amount.sum(), "total")
        .group_by(expenditure::Column::Category)
        .into_model::<CategoryBreakdown>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let top_agencies = top_agencies_by_allocation(db, 10).await?;
    let recent_activity = audit_log_service::recent_activity(db, 10).await?;
    let monthly_trends = audit_log_service::monthly_activity(db, Utc::now().year()).await?;

    Ok(DashboardData {
        counts,
        financials,
        utilization_rates,
        breakdowns: Breakdowns {
            allocation_status,
            release_status,
            project_status,
            expenditure_category,
        },
        top_agencies,
        recent_activity,
        monthly_trends,
    })
}

async fn top_agencies_by_allocation(db: &DatabaseConnection, limit: usize) -> Result<Vec<TopAgency>, ServiceError> {
    let mut sums = allocation::Entity::find()
        .select_only()
        .column(allocation::Column::AgencyId)
        .column_as(allocation::Column::Id.count(), "count")
        .column_as(allocation::Column::Amount.sum(), "total")
        .group_by(allocation::Column::AgencyId)
        .into_model::<AgencyAllocationSum>()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    sums.sort_by(|a, b| {
        b.total
            .unwrap_or(0.0)
            .partial_cmp(&a.total.unwrap_or(0.0))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    sums.truncate(limit);

    let ids: Vec<Uuid> = sums.iter().map(|s| s.agency_id).collect();
    let agencies: HashMap<Uuid, agency::Model> = agency::Entity::find()
        .filter(agency::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();

    Ok(sums
        .into_iter()
        .filter_map(|s| {
            agencies.get(&s.agency_id).map(|a| TopAgency {
                id: a.id,
                name: a.name.clone(),
                acronym: a.acronym.clone(),
                category: a.category.clone(),
                allocation_count: s.count,
                total_allocation: s.total.unwrap_or(0.0),
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::allocation_service::{create_allocation, CreateAllocation};
    use crate::db::audit_log_service::RequestMeta;
    use crate::test_support::get_db;

    #[test]
    fn rate_handles_zero_denominator() {
        assert_eq!(rate(50.0, 0.0), 0.0);
        assert_eq!(rate(50.0, 200.0), 25.0);
    }

    #[tokio::test]
    async fn overview_reflects_created_rows() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let meta = RequestMeta::default();

        let before = overview(&db).await?;

        let a = agency::create(&db, &format!("Dashboard Agency {}", Uuid::new_v4()), None, "NATIONAL").await?;
        let year: i32 = Utc::now().format("%Y").to_string().parse()?;
        create_allocation(
            &db,
            CreateAllocation {
                agency_id: a.id,
                title: "Dashboard Allocation".into(),
                description: None,
                amount: 123_456.0,
                fiscal_year: year,
                uacs_code: None,
            },
            &meta,
        )
        .await?;

        let after = overview(&db).await?;
        assert_eq!(after.counts.agencies, before.counts.agencies + 1);
        assert_eq!(after.counts.allocations, before.counts.allocations + 1);
        assert!(after.financials.total_allocated >= before.financials.total_allocated + 123_456.0 - 1e-6);
        assert_eq!(after.monthly_trends.len(), 12);
        assert!(!after.recent_activity.is_empty());

        agency::Entity::delete_by_id(a.id).exec(&db).await?;
        Ok(())
    }
}
