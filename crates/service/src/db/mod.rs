pub mod audit_log_service;
pub mod agency_service;
pub mod allocation_service;
pub mod release_service;
pub mod expenditure_service;
pub mod project_service;
pub mod document_service;
pub mod dashboard_service;

/// Shared reference to the requesting agency row as embedded in listings.
#[derive(Clone, Debug, serde::Serialize)]
pub struct AgencyRef {
    pub id: uuid::Uuid,
    pub name: String,
    pub acronym: Option<String>,
    pub category: String,
}

impl From<models::agency::Model> for AgencyRef {
    fn from(m: models::agency::Model) -> Self {
        Self { id: m.id, name: m.name, acronym: m.acronym, category: m.category }
    }
}
