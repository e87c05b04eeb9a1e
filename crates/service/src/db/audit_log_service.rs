use chrono::{Datelike, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::Serialize;

use crate::errors::ServiceError;
use models::audit_log;

const BROADCAST_PREFIX: &str = "BROADCAST:";

/// Caller context captured on every mutating request.
#[derive(Clone, Debug, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Append one audit row. This is a second, independent write after the
/// entity insert; a failure here does not roll the entity back.
pub async fn append(
    db: &DatabaseConnection,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    new_values: Option<String>,
    meta: &RequestMeta,
) -> Result<audit_log::Model, ServiceError> {
    let am = audit_log::ActiveModel {
        id: Set(0), // auto-increment by DB
        action: Set(action.to_string()),
        entity_type: Set(entity_type.to_string()),
        entity_id: Set(entity_id.to_string()),
        new_values: Set(new_values),
        ip_address: Set(meta.ip_address.clone()),
        user_agent: Set(meta.user_agent.clone()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| ServiceError::Db(e.to_string()))
}

#[derive(Clone, Debug, Serialize)]
pub struct ActivityEntry {
    pub id: i64,
    pub action: String,
    pub entity_type: String,
    pub created_at: sea_orm::prelude::DateTimeWithTimeZone,
}

pub async fn recent_activity(db: &DatabaseConnection, limit: u64) -> Result<Vec<ActivityEntry>, ServiceError> {
    let rows = audit_log::Entity::find()
        .order_by_desc(audit_log::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows
        .into_iter()
        .map(|r| ActivityEntry { id: r.id, action: r.action, entity_type: r.entity_type, created_at: r.created_at })
        .collect())
}

/// Record a broadcast event as an audit row so pollers can read it back.
pub async fn record_broadcast(
    db: &DatabaseConnection,
    event: &str,
    data: &serde_json::Value,
    room: Option<&str>,
) -> Result<(), ServiceError> {
    let payload = serde_json::json!({ "event": event, "data": data, "room": room }).to_string();
    let meta = RequestMeta {
        ip_address: Some("system".into()),
        user_agent: Some("budget-system".into()),
    };
    append(db, &format!("{}{}", BROADCAST_PREFIX, event), "RealTimeUpdate", "global", Some(payload), &meta)
        .await?;
    Ok(())
}

#[derive(Clone, Debug, Serialize)]
pub struct BroadcastUpdate {
    pub id: i64,
    pub event: Option<String>,
    pub data: Option<serde_json::Value>,
    pub room: Option<String>,
    pub timestamp: sea_orm::prelude::DateTimeWithTimeZone,
}

/// Latest broadcast rows, newest first.
pub async fn recent_broadcasts(db: &DatabaseConnection, limit: u64) -> Result<Vec<BroadcastUpdate>, ServiceError> {
    let rows = audit_log::Entity::find()
        .filter(audit_log::Column::Action.starts_with(BROADCAST_PREFIX))
        .order_by_desc(audit_log::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    Ok(rows
        .into_iter()
        .map(|r| {
            let payload: serde_json::Value = r
                .new_values
                .as_deref()
                .and_then(|v| serde_json::from_str(v).ok())
                .unwrap_or_else(|| serde_json::json!({}));
            BroadcastUpdate {
                id: r.id,
                event: payload.get("event").and_then(|v| v.as_str()).map(String::from),
                data: payload.get("data").cloned(),
                room: payload.get("room").and_then(|v| v.as_str()).map(String::from),
                timestamp: r.created_at,
            }
        })
        .collect())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct MonthlyActivity {
    pub month: u32,
    pub allocations: u64,
    pub releases: u64,
    pub expenditures: u64,
    pub projects: u64,
}

/// Per-month counts of mutating actions for one calendar year, bucketed from
/// the audit trail.
pub async fn monthly_activity(db: &DatabaseConnection, year: i32) -> Result<Vec<MonthlyActivity>, ServiceError> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single().ok_or_else(|| {
        ServiceError::Validation(format!("invalid year {}", year))
    })?;
    let end = Utc.with_ymd_and_hms(year + 1, 1, 1, 0, 0, 0).single().ok_or_else(|| {
        ServiceError::Validation(format!("invalid year {}", year))
    })?;

    let rows = audit_log::Entity::find()
        .filter(audit_log::Column::CreatedAt.gte(start))
        .filter(audit_log::Column::CreatedAt.lt(end))
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let mut months: Vec<MonthlyActivity> = (1..=12)
        .map(|m| MonthlyActivity { month: m, ..Default::default() })
        .collect();
    for row in rows {
        let bucket = &mut months[(row.created_at.month() - 1) as usize];
        match row.entity_type.as_str() {
            "Allocation" => bucket.allocations += 1,
            "Release" => bucket.releases += 1,
            "Expenditure" => bucket.expenditures += 1,
            "Project" => bucket.projects += 1,
            _ => {}
        }
    }
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn broadcast_rows_roundtrip() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let marker = uuid::Uuid::new_v4().to_string();
        record_broadcast(&db, "allocation_created", &serde_json::json!({ "marker": marker }), Some("budget")).await?;

        let updates = recent_broadcasts(&db, 50).await?;
        let found = updates.iter().find(|u| {
            u.data
                .as_ref()
                .and_then(|d| d.get("marker"))
                .and_then(|m| m.as_str())
                == Some(marker.as_str())
        });
        let found = found.expect("broadcast row present");
        assert_eq!(found.event.as_deref(), Some("allocation_created"));
        assert_eq!(found.room.as_deref(), Some("budget"));
        Ok(())
    }

    #[tokio::test]
    async fn append_writes_one_row() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let meta = RequestMeta { ip_address: Some("127.0.0.1".into()), user_agent: None };
        let row = append(&db, "CREATE_AGENCY", "Agency", "test-entity", None, &meta).await?;
        assert!(row.id > 0);
        assert_eq!(row.action, "CREATE_AGENCY");
        Ok(())
    }
}
